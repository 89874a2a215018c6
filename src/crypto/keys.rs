use k256::ecdsa::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use secrecy::SecretVec;

use crate::{
    address::{Address, UNCOMPRESSED_PUBLIC_KEY_LEN},
    error::{AuthError, Result},
};

pub const PRIVATE_KEY_LEN: usize = 32;

/// A secp256k1 private key
///
/// Key material is only ever exposed through [`PrivateKey::to_bytes`], wrapped
/// in a [`secrecy::Secret`]. `Debug` prints the derived address instead.
#[derive(Clone)]
pub struct PrivateKey {
    inner: SigningKey,
}

impl PrivateKey {
    /// Build a key from a 32-byte big-endian scalar
    ///
    /// # Errors
    /// * `MalformedExport` - bytes are not a valid non-zero scalar below the curve order
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PRIVATE_KEY_LEN {
            return Err(AuthError::MalformedExport(format!(
                "Private key must be {} bytes, got {}",
                PRIVATE_KEY_LEN,
                bytes.len()
            )));
        }
        let inner = SigningKey::from_slice(bytes)
            .map_err(|e| AuthError::MalformedExport(format!("Invalid secp256k1 private key: {}", e)))?;
        Ok(Self { inner })
    }

    /// Generate a new key from the operating system RNG
    pub fn random() -> Self {
        Self {
            inner: SigningKey::random(&mut OsRng),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            inner: VerifyingKey::from(&self.inner),
        }
    }

    /// SECP256K1 address of this key, rendered for the default network
    pub fn address(&self) -> Result<Address> {
        self.public_key().address()
    }

    pub fn to_bytes(&self) -> SecretVec<u8> {
        SecretVec::new(self.inner.to_bytes().to_vec())
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.inner
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.address() {
            Ok(addr) => write!(f, "PrivateKey({addr})"),
            Err(_) => f.write_str("PrivateKey(..)"),
        }
    }
}

/// A secp256k1 public key
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    inner: VerifyingKey,
}

impl PublicKey {
    /// Parse a SEC1 encoded point (compressed or uncompressed)
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self> {
        let inner = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|e| AuthError::CryptoError(format!("Invalid secp256k1 public key: {}", e)))?;
        Ok(Self { inner })
    }

    /// `0x04 || X || Y`
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_PUBLIC_KEY_LEN] {
        let point = self.inner.to_encoded_point(false);
        let mut out = [0u8; UNCOMPRESSED_PUBLIC_KEY_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    pub fn address(&self) -> Result<Address> {
        Address::new_secp256k1(&self.to_uncompressed())
    }
}

impl From<VerifyingKey> for PublicKey {
    fn from(inner: VerifyingKey) -> Self {
        Self { inner }
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.inner.to_encoded_point(true).as_bytes()))
    }
}

/// Identity a verifier checks a signature against
///
/// All three forms are interchangeable: verification compares address
/// payloads, so a public key, its address, and the address string accept
/// exactly the same signatures.
#[derive(Clone, Debug)]
pub enum KeyReference {
    PublicKey(PublicKey),
    Address(Address),
    AddressString(String),
}

impl From<PublicKey> for KeyReference {
    fn from(key: PublicKey) -> Self {
        KeyReference::PublicKey(key)
    }
}

impl From<Address> for KeyReference {
    fn from(addr: Address) -> Self {
        KeyReference::Address(addr)
    }
}

impl From<String> for KeyReference {
    fn from(addr: String) -> Self {
        KeyReference::AddressString(addr)
    }
}

impl From<&str> for KeyReference {
    fn from(addr: &str) -> Self {
        KeyReference::AddressString(addr.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Protocol;
    use secrecy::ExposeSecret;

    #[test]
    fn test_private_key_bytes_roundtrip() {
        let key = PrivateKey::random();
        let bytes = key.to_bytes();
        let restored = PrivateKey::from_bytes(bytes.expose_secret()).unwrap();
        assert_eq!(restored.public_key(), key.public_key());
    }

    #[test]
    fn test_invalid_scalars_rejected() {
        assert!(matches!(
            PrivateKey::from_bytes(&[0u8; 32]),
            Err(AuthError::MalformedExport(_))
        ));
        assert!(matches!(
            PrivateKey::from_bytes(&[0xffu8; 32]),
            Err(AuthError::MalformedExport(_))
        ));
        assert!(PrivateKey::from_bytes(&[1u8; 31]).is_err());
    }

    #[test]
    fn test_public_key_sec1_roundtrip() {
        let public = PrivateKey::random().public_key();
        let uncompressed = public.to_uncompressed();
        assert_eq!(uncompressed[0], 0x04);
        assert_eq!(PublicKey::from_sec1_bytes(&uncompressed).unwrap(), public);
    }

    #[test]
    fn test_address_is_secp256k1() {
        let key = PrivateKey::random();
        let addr = key.address().unwrap();
        assert_eq!(addr.protocol(), Protocol::Secp256k1);
        assert_eq!(addr, key.public_key().address().unwrap());
    }

    #[test]
    fn test_debug_hides_key_material() {
        let key = PrivateKey::random();
        let secret_hex = hex::encode(key.to_bytes().expose_secret());
        let rendered = format!("{:?}", key);
        assert!(!rendered.contains(&secret_hex));
        assert!(rendered.starts_with("PrivateKey(t1"));
    }
}
