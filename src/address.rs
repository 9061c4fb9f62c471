//! Account addresses, signatures and block hashes
//!
//! All three are fixed-length byte strings that travel as base58 text.
//! Parsing is the only validation point: once an [`Address`] exists it is
//! guaranteed to decode to exactly 32 bytes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Public key length in bytes
pub const ADDRESS_LEN: usize = 32;
/// Ed25519 signature length in bytes
pub const SIGNATURE_LEN: usize = 64;
/// Block hash length in bytes
pub const HASH_LEN: usize = 32;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Empty input")]
    Empty,

    #[error("Invalid base58 encoding: {0}")]
    InvalidEncoding(String),

    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], AddressError> {
    if s.is_empty() {
        return Err(AddressError::Empty);
    }
    let bytes = bs58::decode(s)
        .into_vec()
        .map_err(|e| AddressError::InvalidEncoding(e.to_string()))?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| AddressError::InvalidLength {
        expected: N,
        actual: bytes.len(),
    })
}

macro_rules! base58_string_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

// ============================================================================
// Address
// ============================================================================

/// Account address (32-byte public key, base58 text form)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The system program, owner of every plain SOL account
    pub const SYSTEM_PROGRAM: Address = Address([0u8; ADDRESS_LEN]);

    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Four-and-four display form used by the wallet card
    pub fn short(&self) -> String {
        shorten_address(&self.to_string(), 4, 4)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<ADDRESS_LEN>(s).map(Self)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

base58_string_serde!(Address);

// ============================================================================
// Signature (submission id)
// ============================================================================

/// Transaction signature; the first signature doubles as the submission id
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_LEN]);

impl Signature {
    pub const fn new(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }
}

impl FromStr for Signature {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<SIGNATURE_LEN>(s).map(Self)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self)
    }
}

base58_string_serde!(Signature);

// ============================================================================
// Hash (recency marker)
// ============================================================================

/// Block hash carried by a transaction as its recency marker
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash([u8; HASH_LEN]);

impl Hash {
    pub const fn new(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }
}

impl FromStr for Hash {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<HASH_LEN>(s).map(Self)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self)
    }
}

base58_string_serde!(Hash);

// ============================================================================
// Helpers
// ============================================================================

/// Returns `true` iff `s` decodes to a 32-byte public key. Never panics.
pub fn is_valid_address(s: &str) -> bool {
    s.parse::<Address>().is_ok()
}

/// Shorten an address to `head...tail` for display.
///
/// Empty input yields an empty string. Input no longer than `head + tail`
/// characters is returned unchanged.
pub fn shorten_address(address: &str, head: usize, tail: usize) -> String {
    if address.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= head + tail {
        return address.to_string();
    }

    let start: String = chars[..head].iter().collect();
    let end: String = chars[chars.len() - tail..].iter().collect();
    format!("{}...{}", start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";

    #[test]
    fn test_shorten_address() {
        assert_eq!(shorten_address("ABCDEFGHIJ", 4, 4), "ABCD...GHIJ");
        assert_eq!(shorten_address("", 4, 4), "");
        assert_eq!(shorten_address("ABCDEFGH", 4, 4), "ABCDEFGH");
        assert_eq!(shorten_address("ABCDEFGHIJ", 2, 0), "AB...");
    }

    #[test]
    fn test_valid_address() {
        assert!(is_valid_address(SAMPLE));
        assert!(is_valid_address("11111111111111111111111111111111"));

        let addr: Address = SAMPLE.parse().unwrap();
        assert_eq!(addr.to_string(), SAMPLE);
        assert_eq!(addr.short(), "9WzD...AWWM");
    }

    #[test]
    fn test_malformed_addresses_rejected() {
        let cases = [
            "",
            "0x742d35Cc6634C0532925a3b844Bc454e4438f44e",
            "not an address",
            "O0Il",        // characters outside the base58 alphabet
            "3yZe7d",      // decodes, wrong length
            &SAMPLE[..20], // truncated
            "🦀🦀🦀",
            " 9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM ",
            "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM\n",
        ];
        for case in cases {
            assert!(!is_valid_address(case), "accepted {:?}", case);
        }
    }

    #[test]
    fn test_system_program_encoding() {
        assert_eq!(
            Address::SYSTEM_PROGRAM.to_string(),
            "11111111111111111111111111111111"
        );
    }

    #[test]
    fn test_length_error_reports_sizes() {
        let err = "3yZe7d".parse::<Address>().unwrap_err();
        assert!(matches!(err, AddressError::InvalidLength { expected: 32, .. }));
    }

    #[test]
    fn test_serde_as_string() {
        let addr: Address = SAMPLE.parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", SAMPLE));

        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);

        assert!(serde_json::from_str::<Address>("\"bogus\"").is_err());
    }

    #[test]
    fn test_signature_parse() {
        let sig = Signature::new([7u8; SIGNATURE_LEN]);
        let text = sig.to_string();
        assert_eq!(text.parse::<Signature>().unwrap(), sig);
        assert!(SAMPLE.parse::<Signature>().is_err());
    }
}
