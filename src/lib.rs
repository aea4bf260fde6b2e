// src/lib.rs
pub mod error;
pub mod hash;
pub mod pairs;
pub mod params;
pub mod salt;

pub use error::{Error, Result};
pub use hash::HashRecord;
pub use params::HashParams;
