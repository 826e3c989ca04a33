//! Tag identifier types for the RFID tag simulator
//!
//! This module contains the [`Epc`] identifier used for every simulated tag.
//! Configured EPCs may have any non-zero length; generated EPCs are always
//! [`GENERATED_EPC_BYTES`] random bytes rendered as uppercase hexadecimal.

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of random bytes in a generated EPC (two hex characters per byte)
pub const GENERATED_EPC_BYTES: usize = 13;

/// Length in characters of a generated EPC
pub const GENERATED_EPC_LEN: usize = GENERATED_EPC_BYTES * 2;

/// Errors produced when parsing an EPC from text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EpcParseError {
    /// The identifier was empty or whitespace only
    #[error("EPC must not be empty")]
    Empty,

    /// The identifier contained a character outside `[0-9A-Fa-f]`
    #[error("EPC '{value}' contains non-hexadecimal character '{character}'")]
    InvalidCharacter {
        /// The rejected identifier
        value: String,
        /// The first offending character
        character: char,
    },
}

/// Electronic Product Code identifying one simulated tag
///
/// The value is always stored in uppercase; identity is the string itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Epc(String);

impl Epc {
    /// Parse an EPC, normalizing it to uppercase
    pub fn parse(value: &str) -> Result<Self, EpcParseError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(EpcParseError::Empty);
        }

        if let Some(character) = trimmed.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(EpcParseError::InvalidCharacter { value: trimmed.to_string(), character });
        }

        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Generate a random EPC of [`GENERATED_EPC_LEN`] hex characters, drawn byte by byte
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut value = String::with_capacity(GENERATED_EPC_LEN);
        for _ in 0..GENERATED_EPC_BYTES {
            let byte: u8 = rng.gen();
            value.push_str(&format!("{:02X}", byte));
        }
        Self(value)
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Epc {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Epc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Epc {
    type Err = EpcParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Epc {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Epc {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Epc::parse(&s).map_err(serde::de::Error::custom)
    }
}
