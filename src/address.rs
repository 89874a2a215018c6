//! Filecoin wallet addresses
//!
//! An address is a protocol tag plus a payload. For SECP256K1 (`f1`/`t1`)
//! addresses the payload is the BLAKE2b-160 hash of the uncompressed
//! public key. The textual form is:
//!
//! ```text
//! <network char><protocol digit><base32(payload || checksum)>
//! ```
//!
//! where the checksum is BLAKE2b-32 over `protocol byte || payload`. ID
//! addresses are the exception: their textual form is the decimal id.
//!
//! # Example
//! ```rust
//! use filjwt::address::{Address, Protocol};
//!
//! let addr: Address = "t1yu5umbmxehc5w32svhlpruvsb5ml6ya7puvy4uq".parse().unwrap();
//! assert_eq!(addr.protocol(), Protocol::Secp256k1);
//! assert_eq!(addr.payload().len(), 20);
//! ```

use std::fmt;
use std::str::FromStr;

use blake2::digest::consts::{U20, U4};
use blake2::{Blake2b, Digest};
use data_encoding::BASE32_NOPAD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{AuthError, Result};

/// Length of SECP256K1 and Actor payloads
pub const PAYLOAD_HASH_LEN: usize = 20;
/// Length of a BLS public key payload
pub const BLS_PUBLIC_KEY_LEN: usize = 48;
/// Length of the trailing checksum in the textual encoding
pub const CHECKSUM_LEN: usize = 4;
/// Length of an uncompressed SEC1 public key
pub const UNCOMPRESSED_PUBLIC_KEY_LEN: usize = 65;

const MAX_ADDRESS_STRING_LEN: usize = 2 + 84;
const MAX_ID_DIGITS: usize = 20;

/// Address protocol tag
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Protocol {
    Id = 0,
    Secp256k1 = 1,
    Actor = 2,
    Bls = 3,
}

impl Protocol {
    fn from_digit(c: char) -> Option<Self> {
        match c {
            '0' => Some(Protocol::Id),
            '1' => Some(Protocol::Secp256k1),
            '2' => Some(Protocol::Actor),
            '3' => Some(Protocol::Bls),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// Network the textual address is rendered for
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
}

impl Network {
    pub fn prefix(self) -> char {
        match self {
            Network::Mainnet => 'f',
            Network::Testnet => 't',
        }
    }

    fn from_prefix(c: char) -> Option<Self> {
        match c {
            'f' => Some(Network::Mainnet),
            't' => Some(Network::Testnet),
            _ => None,
        }
    }
}

/// A Filecoin address
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Address {
    network: Network,
    protocol: Protocol,
    payload: Vec<u8>,
}

impl Address {
    /// Derive a SECP256K1 address from a 65-byte uncompressed public key
    pub fn new_secp256k1(uncompressed_public_key: &[u8]) -> Result<Self> {
        if uncompressed_public_key.len() != UNCOMPRESSED_PUBLIC_KEY_LEN {
            return Err(AuthError::InvalidAddress(format!(
                "secp256k1 public key must be {} bytes, got {}",
                UNCOMPRESSED_PUBLIC_KEY_LEN,
                uncompressed_public_key.len()
            )));
        }
        Ok(Self {
            network: Network::default(),
            protocol: Protocol::Secp256k1,
            payload: address_hash(uncompressed_public_key),
        })
    }

    /// Derive an actor address from arbitrary actor data
    pub fn new_actor(data: &[u8]) -> Self {
        Self {
            network: Network::default(),
            protocol: Protocol::Actor,
            payload: address_hash(data),
        }
    }

    /// Wrap a 48-byte BLS public key
    pub fn new_bls(public_key: &[u8]) -> Result<Self> {
        if public_key.len() != BLS_PUBLIC_KEY_LEN {
            return Err(AuthError::InvalidAddress(format!(
                "bls public key must be {} bytes, got {}",
                BLS_PUBLIC_KEY_LEN,
                public_key.len()
            )));
        }
        Ok(Self {
            network: Network::default(),
            protocol: Protocol::Bls,
            payload: public_key.to_vec(),
        })
    }

    pub fn new_id(id: u64) -> Self {
        Self {
            network: Network::default(),
            protocol: Protocol::Id,
            payload: encode_uvarint(id),
        }
    }

    /// Re-tag the address for another network. The payload is unchanged.
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Identity bytes, independent of network and checksum
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// BLAKE2b-32 over `protocol byte || payload`
    pub fn checksum(&self) -> [u8; CHECKSUM_LEN] {
        let mut hasher = Blake2b::<U4>::new();
        hasher.update([self.protocol.as_byte()]);
        hasher.update(&self.payload);
        hasher.finalize().into()
    }

    /// The numeric id of an ID address
    pub fn id(&self) -> Option<u64> {
        match self.protocol {
            Protocol::Id => decode_uvarint(&self.payload),
            _ => None,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.network.prefix(), self.protocol.as_byte())?;
        match self.protocol {
            Protocol::Id => {
                let id = decode_uvarint(&self.payload).ok_or(fmt::Error)?;
                write!(f, "{id}")
            }
            _ => {
                let mut raw = self.payload.clone();
                raw.extend_from_slice(&self.checksum());
                f.write_str(&BASE32_NOPAD.encode(&raw).to_ascii_lowercase())
            }
        }
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() < 3 || s.len() > MAX_ADDRESS_STRING_LEN {
            return Err(AuthError::InvalidAddress(format!(
                "invalid address length: {}",
                s.len()
            )));
        }
        let mut chars = s.chars();
        let network = chars
            .next()
            .and_then(Network::from_prefix)
            .ok_or_else(|| AuthError::InvalidAddress("unknown network prefix".to_string()))?;
        let protocol = chars
            .next()
            .and_then(Protocol::from_digit)
            .ok_or_else(|| AuthError::InvalidAddress("unknown address protocol".to_string()))?;
        let raw = chars.as_str();

        if protocol == Protocol::Id {
            if raw.len() > MAX_ID_DIGITS || !raw.bytes().all(|b| b.is_ascii_digit()) {
                return Err(AuthError::InvalidAddress(format!("invalid id: {raw}")));
            }
            let id = raw
                .parse::<u64>()
                .map_err(|e| AuthError::InvalidAddress(format!("invalid id: {e}")))?;
            return Ok(Address::new_id(id).with_network(network));
        }

        if !raw
            .bytes()
            .all(|b| b.is_ascii_lowercase() || (b'2'..=b'7').contains(&b))
        {
            return Err(AuthError::InvalidAddress(
                "payload is not lowercase base32".to_string(),
            ));
        }
        let decoded = BASE32_NOPAD
            .decode(raw.to_ascii_uppercase().as_bytes())
            .map_err(|e| AuthError::InvalidAddress(format!("invalid base32: {e}")))?;
        if decoded.len() <= CHECKSUM_LEN {
            return Err(AuthError::InvalidAddress("payload too short".to_string()));
        }
        let (payload, checksum) = decoded.split_at(decoded.len() - CHECKSUM_LEN);

        let expected_len = match protocol {
            Protocol::Bls => BLS_PUBLIC_KEY_LEN,
            _ => PAYLOAD_HASH_LEN,
        };
        if payload.len() != expected_len {
            return Err(AuthError::InvalidAddress(format!(
                "payload must be {} bytes, got {}",
                expected_len,
                payload.len()
            )));
        }

        let addr = Address {
            network,
            protocol,
            payload: payload.to_vec(),
        };
        if addr.checksum() != checksum {
            return Err(AuthError::InvalidAddress("checksum mismatch".to_string()));
        }
        Ok(addr)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// BLAKE2b-160
fn address_hash(data: &[u8]) -> Vec<u8> {
    let mut hasher = Blake2b::<U20>::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

fn encode_uvarint(mut value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(10);
    while value >= 0x80 {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
    out
}

fn decode_uvarint(bytes: &[u8]) -> Option<u64> {
    let mut value: u64 = 0;
    for (i, byte) in bytes.iter().enumerate() {
        let shift = 7 * i as u32;
        if shift >= 64 {
            return None;
        }
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return (i + 1 == bytes.len()).then_some(value);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_ADDRESS: &str = "t1yu5umbmxehc5w32svhlpruvsb5ml6ya7puvy4uq";

    #[test]
    fn test_parse_format_roundtrip() {
        let addr: Address = SAMPLE_ADDRESS.parse().unwrap();
        assert_eq!(addr.network(), Network::Testnet);
        assert_eq!(addr.protocol(), Protocol::Secp256k1);
        assert_eq!(addr.to_string(), SAMPLE_ADDRESS);
    }

    #[test]
    fn test_network_does_not_change_payload() {
        let testnet: Address = SAMPLE_ADDRESS.parse().unwrap();
        let mainnet = testnet.clone().with_network(Network::Mainnet);

        assert!(mainnet.to_string().starts_with("f1"));
        assert_eq!(mainnet.payload(), testnet.payload());

        let reparsed: Address = mainnet.to_string().parse().unwrap();
        assert_eq!(reparsed, mainnet);
    }

    #[test]
    fn test_checksum_mismatch_rejected() {
        // last character altered
        let tampered = "t1yu5umbmxehc5w32svhlpruvsb5ml6ya7puvy4ua";
        let result = tampered.parse::<Address>();
        assert!(matches!(result, Err(AuthError::InvalidAddress(_))));
    }

    #[test]
    fn test_uppercase_rejected() {
        let upper = format!("t1{}", SAMPLE_ADDRESS[2..].to_ascii_uppercase());
        assert!(upper.parse::<Address>().is_err());
    }

    #[test]
    fn test_unknown_network_and_protocol_rejected() {
        assert!("x1yu5umbmxehc5w32svhlpruvsb5ml6ya7puvy4uq".parse::<Address>().is_err());
        assert!("t9yu5umbmxehc5w32svhlpruvsb5ml6ya7puvy4uq".parse::<Address>().is_err());
        assert!("t1".parse::<Address>().is_err());
    }

    #[test]
    fn test_id_address() {
        let addr: Address = "f01729".parse().unwrap();
        assert_eq!(addr.protocol(), Protocol::Id);
        assert_eq!(addr.id(), Some(1729));
        assert_eq!(addr.to_string(), "f01729");

        let max = Address::new_id(u64::MAX);
        assert_eq!(max.to_string().parse::<Address>().unwrap(), max);
        assert!("f018446744073709551616".parse::<Address>().is_err());
    }

    #[test]
    fn test_actor_and_bls_roundtrip() {
        let actor = Address::new_actor(b"some actor data");
        assert!(actor.to_string().starts_with("t2"));
        assert_eq!(actor.to_string().parse::<Address>().unwrap(), actor);

        let bls = Address::new_bls(&[7u8; BLS_PUBLIC_KEY_LEN]).unwrap();
        assert!(bls.to_string().starts_with("t3"));
        assert_eq!(bls.to_string().parse::<Address>().unwrap(), bls);
    }

    #[test]
    fn test_secp256k1_requires_uncompressed_key() {
        let result = Address::new_secp256k1(&[2u8; 33]);
        assert!(matches!(result, Err(AuthError::InvalidAddress(_))));
    }

    #[test]
    fn test_serde_as_string() {
        let addr: Address = SAMPLE_ADDRESS.parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{SAMPLE_ADDRESS}\""));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
