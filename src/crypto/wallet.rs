use base64::prelude::*;
use secrecy::{ExposeSecret, SecretVec};
use serde::{Deserialize, Serialize};

use crate::{
    address::Address,
    crypto::keys::PrivateKey,
    error::{AuthError, Result},
};

/// Key type tag accepted by this crate
pub const SECP256K1_KEY_TYPE: &str = "secp256k1";

/// A Lotus wallet export: `hex(json({"Type": .., "PrivateKey": ..}))`
///
/// The private key bytes are held in a [`SecretVec`] and are only turned
/// into a usable key by [`WalletExport::into_secp256k1`], which refuses any
/// key type other than `secp256k1`.
pub struct WalletExport {
    pub key_type: String,
    private_key: SecretVec<u8>,
}

#[derive(Deserialize)]
struct RawExport {
    #[serde(rename = "Type")]
    key_type: String,
    #[serde(rename = "PrivateKey")]
    private_key: RawKeyBytes,
}

/// Lotus writes key bytes as base64; plain byte arrays are accepted too
#[derive(Deserialize)]
#[serde(untagged)]
enum RawKeyBytes {
    Base64(String),
    Bytes(Vec<u8>),
}

#[derive(Serialize)]
struct ExportJson<'a> {
    #[serde(rename = "Type")]
    key_type: &'a str,
    #[serde(rename = "PrivateKey")]
    private_key: String,
}

impl WalletExport {
    /// Wrap a secp256k1 key for export
    pub fn from_private_key(key: &PrivateKey) -> Self {
        Self {
            key_type: SECP256K1_KEY_TYPE.to_string(),
            private_key: key.to_bytes(),
        }
    }

    /// Decode the hex/JSON framing without interpreting the key
    ///
    /// # Errors
    /// * `MalformedExport` - invalid hex (including surrounding whitespace), invalid JSON, missing fields, or
    ///   key bytes that are neither base64 nor a byte array
    pub fn from_hex(hex_blob: &str) -> Result<Self> {
        let decoded = hex::decode(hex_blob)
            .map_err(|e| AuthError::MalformedExport(format!("Invalid hex: {}", e)))?;
        let raw: RawExport = serde_json::from_slice(&decoded)
            .map_err(|e| AuthError::MalformedExport(format!("Invalid JSON: {}", e)))?;

        let private_key = match raw.private_key {
            RawKeyBytes::Base64(encoded) => BASE64_STANDARD.decode(encoded).map_err(|e| {
                AuthError::MalformedExport(format!("Invalid private key encoding: {}", e))
            })?,
            RawKeyBytes::Bytes(bytes) => bytes,
        };

        Ok(Self {
            key_type: raw.key_type,
            private_key: SecretVec::new(private_key),
        })
    }

    /// Turn the export into a private key and its SECP256K1 address
    ///
    /// # Errors
    /// * `UnsupportedKeyType` - the export is not a secp256k1 key
    /// * `MalformedExport` - the key bytes are not a valid scalar
    pub fn into_secp256k1(self) -> Result<(Address, PrivateKey)> {
        if self.key_type != SECP256K1_KEY_TYPE {
            return Err(AuthError::UnsupportedKeyType(self.key_type));
        }
        let key = PrivateKey::from_bytes(self.private_key.expose_secret())?;
        let addr = key.address()?;
        Ok((addr, key))
    }

    /// Hex encoded JSON, in the same layout Lotus writes
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(&ExportJson {
            key_type: &self.key_type,
            private_key: BASE64_STANDARD.encode(self.private_key.expose_secret()),
        })
        .map_err(|e| AuthError::JsonError(format!("Failed to encode wallet export: {}", e)))?;
        Ok(hex::encode(json))
    }
}

impl std::fmt::Debug for WalletExport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletExport")
            .field("key_type", &self.key_type)
            .finish_non_exhaustive()
    }
}

/// Decode a Lotus secp256k1 wallet export into its address and private key
///
/// # Arguments
/// * `hex_blob` - output of `lotus wallet export`
///
/// # Returns
/// * `Ok((Address, PrivateKey))` - address rendered for the default (test) network
/// * `Err(AuthError)` - `MalformedExport` or `UnsupportedKeyType`
///
/// # Example
/// ```rust
/// use filjwt::crypto::wallet::decode_wallet_export;
///
/// let export = "7b2254797065223a22736563703235366b31222c22507269766174654b6579223a226f784132746e774378426552303055734561766f56637551722b6d4133596b7346567543346254416873303d227d";
/// let (addr, _key) = decode_wallet_export(export).unwrap();
/// assert_eq!(addr.to_string(), "t1yu5umbmxehc5w32svhlpruvsb5ml6ya7puvy4uq");
/// ```
pub fn decode_wallet_export(hex_blob: &str) -> Result<(Address, PrivateKey)> {
    let (addr, key) = WalletExport::from_hex(hex_blob)?.into_secp256k1()?;
    tracing::debug!(address = %addr, "decoded secp256k1 wallet export");
    Ok((addr, key))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_SECP256K1_EXPORT: &str = "7b2254797065223a22736563703235366b31222c22507269766174654b6579223a226f784132746e774378426552303055734561766f56637551722b6d4133596b7346567543346254416873303d227d";
    const SAMPLE_BLS_EXPORT: &str = "7b2254797065223a22626c73222c22507269766174654b6579223a22314f615368333576326e65756b654e76624e574231566d444c52357a6371534c6e6a6277756a6e4d426b453d227d";

    #[test]
    fn test_decode_secp256k1_export() {
        let (addr, key) = decode_wallet_export(SAMPLE_SECP256K1_EXPORT).unwrap();
        assert_eq!(addr.to_string(), "t1yu5umbmxehc5w32svhlpruvsb5ml6ya7puvy4uq");

        // Address derived independently from the key must agree
        assert_eq!(key.public_key().address().unwrap(), addr);
    }

    #[test]
    fn test_bls_export_rejected() {
        let result = decode_wallet_export(SAMPLE_BLS_EXPORT);
        assert!(matches!(result, Err(AuthError::UnsupportedKeyType(t)) if t == "bls"));
    }

    #[test]
    fn test_invalid_hex_rejected() {
        let result = decode_wallet_export("not hex at all");
        assert!(matches!(result, Err(AuthError::MalformedExport(_))));
    }

    #[test]
    fn test_surrounding_whitespace_rejected() {
        for blob in [
            format!("{}\n", SAMPLE_SECP256K1_EXPORT),
            format!(" {}", SAMPLE_SECP256K1_EXPORT),
        ] {
            let result = decode_wallet_export(&blob);
            assert!(matches!(result, Err(AuthError::MalformedExport(_))));
        }
    }

    #[test]
    fn test_invalid_json_rejected() {
        let result = decode_wallet_export(&hex::encode(b"{\"Type\":"));
        assert!(matches!(result, Err(AuthError::MalformedExport(_))));

        let missing_key = hex::encode(br#"{"Type":"secp256k1"}"#);
        assert!(matches!(
            decode_wallet_export(&missing_key),
            Err(AuthError::MalformedExport(_))
        ));
    }

    #[test]
    fn test_byte_array_private_key_accepted() {
        let (_, key) = decode_wallet_export(SAMPLE_SECP256K1_EXPORT).unwrap();
        let bytes: Vec<u8> = key.to_bytes().expose_secret().clone();
        let json = serde_json::json!({ "Type": "secp256k1", "PrivateKey": bytes });
        let blob = hex::encode(serde_json::to_vec(&json).unwrap());

        let (addr, _) = decode_wallet_export(&blob).unwrap();
        assert_eq!(addr.to_string(), "t1yu5umbmxehc5w32svhlpruvsb5ml6ya7puvy4uq");
    }

    #[test]
    fn test_encode_matches_lotus_layout() {
        let (_, key) = decode_wallet_export(SAMPLE_SECP256K1_EXPORT).unwrap();
        let encoded = WalletExport::from_private_key(&key).encode().unwrap();
        assert_eq!(encoded, SAMPLE_SECP256K1_EXPORT);
    }

    #[test]
    fn test_random_key_export_roundtrip() {
        let key = PrivateKey::random();
        let encoded = WalletExport::from_private_key(&key).encode().unwrap();
        let (addr, restored) = decode_wallet_export(&encoded).unwrap();
        assert_eq!(restored.public_key(), key.public_key());
        assert_eq!(addr, key.address().unwrap());
    }
}
