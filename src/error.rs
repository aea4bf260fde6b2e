// src/error.rs

use std::num::ParseIntError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read from the random source: {0}")]
    RandomSource(#[from] rand::Error),
    #[error("hash format not understood or invalid")]
    MalformedToken,
    #[error("only the argon2id algorithm is supported")]
    UnsupportedAlgorithm,
    #[error("couldn't find the version key (v)")]
    MissingVersion,
    #[error("couldn't find the memory key (m)")]
    MissingMemory,
    #[error("couldn't find the iterations key (t)")]
    MissingIterations,
    #[error("couldn't find the parallelism key (p)")]
    MissingParallelism,
    #[error("pair is not in key=value format: {0:?}")]
    InvalidPair(String),
    #[error("invalid unsigned integer: {0}")]
    InvalidInteger(#[from] ParseIntError),
    #[error("parameter {key} out of range: {value}")]
    ParameterOutOfRange { key: &'static str, value: u64 },
    #[error("invalid base64 encoding: {0}")]
    Encoding(#[from] base64ct::Error),
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    #[error("argon2 rejected the parameters: {0}")]
    Argon2(#[from] argon2::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
