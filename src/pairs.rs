// src/pairs.rs

//! Parser for comma separated `key=value` lists such as `m=65536,t=1,p=4`.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// A value type that can appear on the right hand side of a pair.
pub trait PairValue: Sized {
    fn parse_value(raw: &str) -> Result<Self>;
}

impl PairValue for String {
    fn parse_value(raw: &str) -> Result<Self> {
        Ok(raw.to_string())
    }
}

impl PairValue for u64 {
    fn parse_value(raw: &str) -> Result<Self> {
        Ok(raw.parse::<u64>()?)
    }
}

/// Parses `input` into a map. Each pair is split on its first `=`, so values
/// may contain `=` but keys may not. A later duplicate key overwrites an
/// earlier one.
pub fn parse_pairs<T: PairValue>(input: &str) -> Result<HashMap<String, T>> {
    let mut map = HashMap::new();

    for pair in input.split(',') {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| Error::InvalidPair(pair.to_string()))?;
        map.insert(key.to_string(), T::parse_value(raw)?);
    }

    Ok(map)
}
