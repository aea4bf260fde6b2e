// src/salt.rs
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::Result;

/// Fill a salt of `length` bytes from the operating system CSPRNG.
pub fn generate(length: usize) -> Result<Vec<u8>> {
    let mut salt = vec![0u8; length];
    OsRng.try_fill_bytes(&mut salt)?;
    Ok(salt)
}
