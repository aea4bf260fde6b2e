// src/params.rs

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_MEMORY_COST: u32 = 64 * 1024;
pub const DEFAULT_TIME_COST: u32 = 1;
pub const DEFAULT_PARALLELISM: u8 = 4;
pub const DEFAULT_SALT_LENGTH: usize = 16;
pub const DEFAULT_DIGEST_LENGTH: usize = 32;

/// Cost and size settings used when hashing a secret.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct HashParams {
    pub memory_cost: u32,     // KiB
    pub time_cost: u32,       // Iterations
    pub parallelism: u8,      // Lanes
    pub salt_length: usize,   // Bytes
    pub digest_length: usize, // Bytes
}

impl Default for HashParams {
    fn default() -> Self {
        HashParams {
            memory_cost: DEFAULT_MEMORY_COST,
            time_cost: DEFAULT_TIME_COST,
            parallelism: DEFAULT_PARALLELISM,
            salt_length: DEFAULT_SALT_LENGTH,
            digest_length: DEFAULT_DIGEST_LENGTH,
        }
    }
}

impl HashParams {
    /// Convert to argon2 params, letting the primitive validate the costs.
    pub fn to_argon2_params(&self) -> Result<argon2::Params> {
        Ok(argon2::Params::new(
            self.memory_cost,
            self.time_cost,
            u32::from(self.parallelism),
            Some(self.digest_length),
        )?)
    }

    /// Check if self meets or exceeds the min params
    pub fn meets_min(&self, min: &HashParams) -> bool {
        self.memory_cost >= min.memory_cost
            && self.time_cost >= min.time_cost
            && self.parallelism >= min.parallelism
            && self.salt_length >= min.salt_length
            && self.digest_length >= min.digest_length
    }
}
