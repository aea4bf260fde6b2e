// src/hash.rs

use std::fmt;
use std::str::FromStr;

use argon2::{Algorithm, Argon2, Version};
use base64ct::{Base64Unpadded, Encoding};
use log::debug;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use subtle::ConstantTimeEq;

use crate::error::{Error, Result};
use crate::pairs::parse_pairs;
use crate::params::HashParams;
use crate::salt;

pub const SUPPORTED_ALGORITHM: &str = "argon2id";

const TOKEN_SEPARATOR: char = '$';
const SEGMENT_COUNT: usize = 5;

/// A salted Argon2id digest together with the parameters that produced it.
///
/// Records are created by hashing a secret ([`HashRecord::new`]) or by parsing
/// a token ([`HashRecord::parse`]) and are not mutated afterwards. The token
/// form is the PHC string used by other Argon2 implementations:
///
/// `$argon2id$v=19$m=65536,t=1,p=4$<salt>$<digest>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashRecord {
    digest: Vec<u8>,
    salt: Vec<u8>,
    memory_cost: u32,
    time_cost: u32,
    parallelism: u8,
    version: String,
    algorithm: String,
}

fn argon2id(params: argon2::Params) -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

impl HashRecord {
    /// Hashes `secret` with a fresh 16 byte salt and the default parameters.
    pub fn new(secret: &str) -> Result<Self> {
        Self::with_params(secret, &HashParams::default())
    }

    /// Hashes `secret` with a fresh salt and caller supplied parameters.
    pub fn with_params(secret: &str, params: &HashParams) -> Result<Self> {
        let argon2_params = params.to_argon2_params()?;
        let salt = salt::generate(params.salt_length)?;

        let mut digest = vec![0u8; params.digest_length];
        argon2id(argon2_params).hash_password_into(secret.as_bytes(), &salt, &mut digest)?;

        debug!(
            "Hashed secret with m={}, t={}, p={}",
            params.memory_cost, params.time_cost, params.parallelism
        );

        Ok(HashRecord {
            digest,
            salt,
            memory_cost: params.memory_cost,
            time_cost: params.time_cost,
            parallelism: params.parallelism,
            version: u32::from(Version::V0x13).to_string(),
            algorithm: SUPPORTED_ALGORITHM.to_string(),
        })
    }

    /// Parses a token produced by [`HashRecord::serialize`] or by any other
    /// Argon2id implementation using the same format.
    pub fn parse(token: &str) -> Result<Self> {
        let segments: Vec<&str> = token
            .strip_prefix(TOKEN_SEPARATOR)
            .unwrap_or(token)
            .split(TOKEN_SEPARATOR)
            .collect();
        if segments.len() != SEGMENT_COUNT {
            return Err(Error::MalformedToken);
        }

        if segments[0] != SUPPORTED_ALGORITHM {
            return Err(Error::UnsupportedAlgorithm);
        }

        let mut version_pairs = parse_pairs::<String>(segments[1])?;
        let version = version_pairs.remove("v").ok_or(Error::MissingVersion)?;

        let cost_pairs = parse_pairs::<u64>(segments[2])?;
        let memory = *cost_pairs.get("m").ok_or(Error::MissingMemory)?;
        let iterations = *cost_pairs.get("t").ok_or(Error::MissingIterations)?;
        let lanes = *cost_pairs.get("p").ok_or(Error::MissingParallelism)?;

        let memory_cost = narrow::<u32>("m", memory)?;
        let time_cost = narrow::<u32>("t", iterations)?;
        let parallelism = narrow::<u8>("p", lanes)?;
        if parallelism == 0 {
            return Err(Error::ParameterOutOfRange { key: "p", value: lanes });
        }

        let salt = Base64Unpadded::decode_vec(segments[3])?;
        if salt.is_empty() {
            return Err(Error::EmptyField("salt"));
        }

        let digest = Base64Unpadded::decode_vec(segments[4])?;
        if digest.is_empty() {
            return Err(Error::EmptyField("digest"));
        }

        Ok(HashRecord {
            digest,
            salt,
            memory_cost,
            time_cost,
            parallelism,
            version,
            algorithm: segments[0].to_string(),
        })
    }

    /// Replaces `self` with the record decoded from `token`. On error `self`
    /// is left untouched.
    pub fn deserialize(&mut self, token: &str) -> Result<()> {
        *self = Self::parse(token)?;
        Ok(())
    }

    /// Encodes the record as `$argon2id$v=..$m=..,t=..,p=..$<salt>$<digest>`
    /// using unpadded standard base64.
    pub fn serialize(&self) -> String {
        format!(
            "${}$v={}$m={},t={},p={}${}${}",
            self.algorithm,
            self.version,
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            Base64Unpadded::encode_string(&self.salt),
            Base64Unpadded::encode_string(&self.digest),
        )
    }

    /// Recomputes the digest of `candidate` with the stored salt and costs and
    /// compares it to the stored digest in constant time.
    pub fn compare(&self, candidate: &str) -> bool {
        let params = match argon2::Params::new(
            self.memory_cost,
            self.time_cost,
            u32::from(self.parallelism),
            Some(self.digest.len()),
        ) {
            Ok(params) => params,
            Err(_) => return false,
        };

        let mut computed = vec![0u8; self.digest.len()];
        if argon2id(params)
            .hash_password_into(candidate.as_bytes(), &self.salt, &mut computed)
            .is_err()
        {
            return false;
        }

        computed.ct_eq(&self.digest).into()
    }

    /// Parameters describing this record, e.g. for a rehash policy.
    pub fn params(&self) -> HashParams {
        HashParams {
            memory_cost: self.memory_cost,
            time_cost: self.time_cost,
            parallelism: self.parallelism,
            salt_length: self.salt.len(),
            digest_length: self.digest.len(),
        }
    }

    /// True when the record was produced with weaker settings than `min`.
    pub fn needs_rehash(&self, min: &HashParams) -> bool {
        !self.params().meets_min(min)
    }

    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn memory_cost(&self) -> u32 {
        self.memory_cost
    }

    pub fn time_cost(&self) -> u32 {
        self.time_cost
    }

    pub fn parallelism(&self) -> u8 {
        self.parallelism
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }
}

fn narrow<T: TryFrom<u64>>(key: &'static str, value: u64) -> Result<T> {
    T::try_from(value).map_err(|_| Error::ParameterOutOfRange { key, value })
}

impl fmt::Display for HashRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl FromStr for HashRecord {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// Embedded in serde documents as the token string.
impl Serialize for HashRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&HashRecord::serialize(self))
    }
}

impl<'de> Deserialize<'de> for HashRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        HashRecord::parse(&token).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_params() -> HashParams {
        HashParams {
            memory_cost: 256,
            time_cost: 1,
            parallelism: 1,
            ..HashParams::default()
        }
    }

    const VALID: &str = "$argon2id$v=19$m=65536,t=1,p=4$c29tZXNhbHRzb21lc2FsdA$ZGlnZXN0ZGlnZXN0ZGlnZXN0ZGlnZXN0ZGlnZXN0";

    #[test]
    fn test_parse_valid_token() {
        let record = HashRecord::parse(VALID).unwrap();
        assert_eq!(record.algorithm(), "argon2id");
        assert_eq!(record.version(), "19");
        assert_eq!(record.memory_cost(), 65536);
        assert_eq!(record.time_cost(), 1);
        assert_eq!(record.parallelism(), 4);
        assert_eq!(record.salt(), b"somesaltsomesalt");
        assert_eq!(record.digest(), b"digestdigestdigestdigestdigest");
        assert_eq!(record.serialize(), VALID);
    }

    #[test]
    fn test_leading_separator_is_optional() {
        let with = HashRecord::parse(VALID).unwrap();
        let without = HashRecord::parse(&VALID[1..]).unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn test_segment_count() {
        assert!(matches!(
            HashRecord::parse("$argon2id$v=19$m=65536,t=1,p=4$c2FsdA"),
            Err(Error::MalformedToken)
        ));
        let six = format!("{VALID}$extra");
        assert!(matches!(HashRecord::parse(&six), Err(Error::MalformedToken)));
        assert!(matches!(HashRecord::parse(""), Err(Error::MalformedToken)));
    }

    #[test]
    fn test_unsupported_algorithm() {
        let token = VALID.replacen("argon2id", "argon2i", 1);
        assert!(matches!(HashRecord::parse(&token), Err(Error::UnsupportedAlgorithm)));
    }

    #[test]
    fn test_missing_keys_reported_in_order() {
        let cases = [
            ("$argon2id$x=19$m=1,t=1,p=1$c2FsdA$ZGln", "v"),
            ("$argon2id$v=19$t=1,p=1$c2FsdA$ZGln", "m"),
            ("$argon2id$v=19$m=65536,p=4$c2FsdA$ZGln", "t"),
            ("$argon2id$v=19$m=1,t=1$c2FsdA$ZGln", "p"),
            ("$argon2id$v=19$x=1$c2FsdA$ZGln", "m"),
            ("$argon2id$v=19$m=1,x=1$c2FsdA$ZGln", "t"),
        ];
        for (token, key) in cases {
            let err = HashRecord::parse(token).unwrap_err();
            let matched = match key {
                "v" => matches!(err, Error::MissingVersion),
                "m" => matches!(err, Error::MissingMemory),
                "t" => matches!(err, Error::MissingIterations),
                _ => matches!(err, Error::MissingParallelism),
            };
            assert!(matched, "{token}: {err}");
        }
    }

    #[test]
    fn test_invalid_pairs_and_numbers() {
        assert!(matches!(
            HashRecord::parse("$argon2id$19$m=1,t=1,p=1$c2FsdA$ZGln"),
            Err(Error::InvalidPair(_))
        ));
        assert!(matches!(
            HashRecord::parse("$argon2id$v=19$m=lots,t=1,p=1$c2FsdA$ZGln"),
            Err(Error::InvalidInteger(_))
        ));
    }

    #[test]
    fn test_out_of_range_parameters() {
        assert!(matches!(
            HashRecord::parse("$argon2id$v=19$m=4294967296,t=1,p=1$c2FsdA$ZGln"),
            Err(Error::ParameterOutOfRange { key: "m", .. })
        ));
        assert!(matches!(
            HashRecord::parse("$argon2id$v=19$m=8,t=1,p=256$c2FsdA$ZGln"),
            Err(Error::ParameterOutOfRange { key: "p", value: 256 })
        ));
        assert!(matches!(
            HashRecord::parse("$argon2id$v=19$m=8,t=1,p=0$c2FsdA$ZGln"),
            Err(Error::ParameterOutOfRange { key: "p", value: 0 })
        ));
    }

    #[test]
    fn test_bad_base64_and_empty_fields() {
        assert!(matches!(
            HashRecord::parse("$argon2id$v=19$m=8,t=1,p=1$c2Fsd=$ZGln"),
            Err(Error::Encoding(_))
        ));
        assert!(matches!(
            HashRecord::parse("$argon2id$v=19$m=8,t=1,p=1$c2FsdA$!!"),
            Err(Error::Encoding(_))
        ));
        assert!(matches!(
            HashRecord::parse("$argon2id$v=19$m=8,t=1,p=1$$ZGln"),
            Err(Error::EmptyField("salt"))
        ));
        assert!(matches!(
            HashRecord::parse("$argon2id$v=19$m=8,t=1,p=1$c2FsdA$"),
            Err(Error::EmptyField("digest"))
        ));
    }

    #[test]
    fn test_deserialize_keeps_record_on_error() {
        let mut record = HashRecord::parse(VALID).unwrap();
        assert!(record.deserialize("$argon2i$garbage").is_err());
        assert_eq!(record.serialize(), VALID);

        let other = HashRecord::with_params("secret", &cheap_params()).unwrap();
        record.deserialize(&other.serialize()).unwrap();
        assert_eq!(record, other);
    }

    #[test]
    fn test_compare_with_cheap_params() {
        let record = HashRecord::with_params("hunter2", &cheap_params()).unwrap();
        assert_eq!(record.salt().len(), 16);
        assert_eq!(record.digest().len(), 32);
        assert!(record.compare("hunter2"));
        assert!(!record.compare("hunter3"));
        assert!(!record.compare(""));
    }

    #[test]
    fn test_compare_rejects_unusable_parameters() {
        // A 3 byte digest is below the primitive's minimum output length.
        let record = HashRecord::parse("$argon2id$v=19$m=256,t=1,p=1$c29tZXNhbHRzb21lc2FsdA$ZGln").unwrap();
        assert!(!record.compare("anything"));
    }

    #[test]
    fn test_construction_rejects_invalid_params() {
        let params = HashParams { salt_length: 4, ..cheap_params() };
        assert!(matches!(
            HashRecord::with_params("secret", &params),
            Err(Error::Argon2(_))
        ));
    }

    #[test]
    fn test_needs_rehash() {
        let record = HashRecord::with_params("secret", &cheap_params()).unwrap();
        assert!(!record.needs_rehash(&cheap_params()));
        assert!(record.needs_rehash(&HashParams::default()));
        assert_eq!(record.params(), cheap_params());
    }

    #[test]
    fn test_display_and_from_str() {
        let record: HashRecord = VALID.parse().unwrap();
        assert_eq!(record.to_string(), VALID);
    }
}
