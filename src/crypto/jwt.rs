use std::collections::BTreeMap;

use base64::prelude::*;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{
    crypto::{
        keys::{KeyReference, PrivateKey},
        registry,
    },
    error::{AuthError, Result},
};

/// JOSE header
///
/// Serializes with `alg` first and every other field in sorted key order,
/// e.g. `{"alg":"ES256K-R","crv":"secp256k1","kid":"t1...","typ":"JWT"}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub alg: String,
    #[serde(flatten)]
    fields: BTreeMap<String, Value>,
}

impl Header {
    /// Header for `alg` with `typ` set to `JWT`
    pub fn new(alg: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("typ".to_string(), Value::String("JWT".to_string()));
        Self {
            alg: alg.into(),
            fields,
        }
    }

    /// Set a header field other than `alg`
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let name = name.into();
        if name != "alg" {
            self.fields.insert(name, value.into());
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn kid(&self) -> Option<&str> {
        self.get("kid").and_then(Value::as_str)
    }

    pub fn typ(&self) -> Option<&str> {
        self.get("typ").and_then(Value::as_str)
    }
}

/// Header and claims of a verified token
#[derive(Clone, Debug, PartialEq)]
pub struct TokenData<C> {
    pub header: Header,
    pub claims: C,
}

/// Creates a signed compact JWS token
///
/// The signing method is looked up in the algorithm registry by
/// `header.alg`.
///
/// # Arguments
/// * `header` - JOSE header, usually with a `kid` naming the signer
/// * `claims` - any serializable claims; they are not validated
/// * `key` - signer's private key
///
/// # Returns
/// * `Ok(String)` - `header.claims.signature`, each segment base64url without padding
/// * `Err(AuthError)` - unknown algorithm or JSON encoding error
///
/// # Example
/// ```rust
/// use filjwt::crypto::{jwt::{encode, Header}, keys::PrivateKey};
///
/// let key = PrivateKey::random();
/// let mut header = Header::new("ES256K-R");
/// header.set("kid", key.address().unwrap().to_string());
///
/// let token = encode(&header, &serde_json::json!({ "iss": "example" }), &key).unwrap();
/// assert_eq!(token.split('.').count(), 3);
/// ```
pub fn encode<C: Serialize>(header: &Header, claims: &C, key: &PrivateKey) -> Result<String> {
    let method = registry::lookup(&header.alg)?;

    let header_json = serde_json::to_vec(header)
        .map_err(|e| AuthError::JsonError(format!("Failed to encode header: {}", e)))?;
    let claims_json = serde_json::to_vec(claims)
        .map_err(|e| AuthError::JsonError(format!("Failed to encode claims: {}", e)))?;

    let signing_input = format!(
        "{}.{}",
        BASE64_URL_SAFE_NO_PAD.encode(header_json),
        BASE64_URL_SAFE_NO_PAD.encode(claims_json)
    );
    let signature = method.sign(signing_input.as_bytes(), key)?;

    Ok(format!(
        "{}.{}",
        signing_input,
        BASE64_URL_SAFE_NO_PAD.encode(signature.as_bytes())
    ))
}

/// Decode only the header of a token, without verifying anything
pub fn decode_header(token: &str) -> Result<Header> {
    let (header_b64, _, _) = split_token(token)?;
    parse_segment(header_b64, "header")
}

/// Verifies a compact JWS token and extracts header and claims
///
/// # Arguments
/// * `token` - compact token string
/// * `key_fn` - picks the key reference to verify against, given the header
/// * `valid_algs` - `alg` values the caller accepts
///
/// # Returns
/// * `Ok(TokenData)` - signature verified; claims are returned as-is
/// * `Err(AuthError)` - framing, algorithm, key or signature error
///
/// # Example
/// ```rust
/// use filjwt::crypto::{jwt::{decode, encode, kid_address_key, Header}, keys::PrivateKey};
///
/// let key = PrivateKey::random();
/// let mut header = Header::new("ES256K-R");
/// header.set("kid", key.address().unwrap().to_string());
/// let token = encode(&header, &serde_json::json!({ "iss": "example" }), &key).unwrap();
///
/// let data = decode::<serde_json::Value, _>(&token, kid_address_key, &["ES256K-R"]).unwrap();
/// assert_eq!(data.claims["iss"], "example");
/// ```
pub fn decode<C, F>(token: &str, key_fn: F, valid_algs: &[&str]) -> Result<TokenData<C>>
where
    C: DeserializeOwned,
    F: FnOnce(&Header) -> Result<KeyReference>,
{
    let (header_b64, claims_b64, signature_b64) = split_token(token)?;
    let header: Header = parse_segment(header_b64, "header")?;

    if !valid_algs.contains(&header.alg.as_str()) {
        return Err(AuthError::UnsupportedAlgorithm(header.alg));
    }
    let method = registry::lookup(&header.alg)?;
    let key = key_fn(&header)?;

    let signature = BASE64_URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|e| AuthError::Base64Error(format!("Failed to decode signature: {}", e)))?;
    let signing_input = &token[..header_b64.len() + 1 + claims_b64.len()];
    method.verify(signing_input.as_bytes(), &signature, &key)?;

    let claims = parse_segment(claims_b64, "claims")?;
    Ok(TokenData { header, claims })
}

/// Key function that verifies against the address in the `kid` header
///
/// # Errors
/// * `MissingKeyIdentifier` - `kid` is absent or not a string
pub fn kid_address_key(header: &Header) -> Result<KeyReference> {
    match header.get("kid") {
        Some(Value::String(addr)) => Ok(KeyReference::AddressString(addr.clone())),
        _ => Err(AuthError::MissingKeyIdentifier),
    }
}

fn split_token(token: &str) -> Result<(&str, &str, &str)> {
    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(claims), Some(signature), None) => Ok((header, claims, signature)),
        _ => Err(AuthError::InvalidToken(
            "Token must have three segments".to_string(),
        )),
    }
}

fn parse_segment<T: DeserializeOwned>(segment: &str, name: &str) -> Result<T> {
    let bytes = BASE64_URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| AuthError::Base64Error(format!("Failed to decode {}: {}", name, e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::InvalidToken(format!("Invalid {} JSON: {}", name, e)))
}
