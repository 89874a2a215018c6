use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    address::Address,
    config::TokenConfig,
    crypto::{
        es256kr::ES256K_R,
        jwt::{decode, encode, kid_address_key, Header, TokenData},
        keys::{KeyReference, PrivateKey},
        wallet::{decode_wallet_export, SECP256K1_KEY_TYPE},
    },
    error::{AuthError, Result},
};

/// Token service that issues and validates ES256K-R tokens for one wallet
///
/// This service provides stateless token operations:
/// - Token issuing, signed with the configured wallet key and carrying its
///   address in the `kid` header
/// - Token validation against the `kid` header or an explicit key reference
///
/// Claims are passed through untouched: expiry, issuer and audience checks
/// belong to the caller.
pub struct TokenService {
    address: Address,
    private_key: PrivateKey,
    include_curve_header: bool,
}

impl TokenService {
    /// Create a token service from a wallet export
    ///
    /// # Arguments
    /// * `config` - wallet export, network and header options
    ///
    /// # Errors
    /// - `MalformedExport` - the wallet export cannot be decoded
    /// - `UnsupportedKeyType` - the wallet is not a secp256k1 wallet
    ///
    /// # Example
    /// ```rust
    /// use filjwt::{TokenConfig, TokenService};
    ///
    /// let config = TokenConfig::new("7b2254797065223a22736563703235366b31222c22507269766174654b6579223a226f784132746e774378426552303055734561766f56637551722b6d4133596b7346567543346254416873303d227d");
    /// let service = TokenService::new(&config).unwrap();
    /// assert_eq!(service.address().to_string(), "t1yu5umbmxehc5w32svhlpruvsb5ml6ya7puvy4uq");
    /// ```
    pub fn new(config: &TokenConfig) -> Result<Self> {
        let (address, private_key) = decode_wallet_export(config.wallet_export.expose_secret())?;
        Ok(Self {
            address: address.with_network(config.network),
            private_key,
            include_curve_header: config.include_curve_header,
        })
    }

    /// Address of the signing wallet, as written into `kid`
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Issue a token for the given claims
    ///
    /// The header carries `alg`, `kid` (this wallet's address), `typ` and,
    /// if configured, `crv`.
    ///
    /// # Example
    /// ```rust
    /// use filjwt::{TokenConfig, TokenService};
    /// use serde_json::json;
    ///
    /// let config = TokenConfig::new("7b2254797065223a22736563703235366b31222c22507269766174654b6579223a226f784132746e774378426552303055734561766f56637551722b6d4133596b7346567543346254416873303d227d");
    /// let service = TokenService::new(&config).unwrap();
    ///
    /// let token = service.issue(&json!({ "iss": "filjwt-example" })).unwrap();
    /// let data = service.validate::<serde_json::Value>(&token).unwrap();
    /// assert_eq!(data.claims["iss"], "filjwt-example");
    /// ```
    pub fn issue<C: Serialize>(&self, claims: &C) -> Result<String> {
        let mut header = Header::new(ES256K_R);
        if self.include_curve_header {
            header.set("crv", SECP256K1_KEY_TYPE);
        }
        header.set("kid", self.address.to_string());

        let token = encode(&header, claims, &self.private_key)?;
        tracing::debug!(kid = %self.address, "issued ES256K-R token");
        Ok(token)
    }

    /// Validate a token against the address in its own `kid` header
    ///
    /// Any wallet can produce a token that passes this check for its own
    /// address; callers authorize on the returned `kid`.
    ///
    /// # Errors
    /// - `InvalidToken` - empty or malformed token
    /// - `UnsupportedAlgorithm` - `alg` is not `ES256K-R`
    /// - `MissingKeyIdentifier` - no string `kid` header
    /// - `InvalidKeyType` - `kid` is not a SECP256K1 address
    /// - `EcdsaVerificationFailed` - signature does not recover to `kid`
    pub fn validate<C: DeserializeOwned>(&self, token: &str) -> Result<TokenData<C>> {
        if token.trim().is_empty() {
            return Err(AuthError::InvalidToken("Empty token".to_string()));
        }
        let data = decode(token, kid_address_key, &[ES256K_R])?;
        tracing::debug!(kid = ?data.header.kid(), "validated ES256K-R token");
        Ok(data)
    }

    /// Validate a token against a caller-supplied key, ignoring `kid`
    pub fn validate_from<C: DeserializeOwned>(
        &self,
        token: &str,
        key: impl Into<KeyReference>,
    ) -> Result<TokenData<C>> {
        if token.trim().is_empty() {
            return Err(AuthError::InvalidToken("Empty token".to_string()));
        }
        let key = key.into();
        decode(token, move |_| Ok(key), &[ES256K_R])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Network;
    use serde::Deserialize;
    use serde_json::json;

    const SAMPLE_EXPORT: &str = "7b2254797065223a22736563703235366b31222c22507269766174654b6579223a226f784132746e774378426552303055734561766f56637551722b6d4133596b7346567543346254416873303d227d";

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Claims {
        iss: String,
    }

    fn create_test_token_service() -> TokenService {
        TokenService::new(&TokenConfig::new(SAMPLE_EXPORT)).unwrap()
    }

    #[test]
    fn test_issue_and_validate() {
        let service = create_test_token_service();
        let claims = Claims {
            iss: "filjwt-example".to_string(),
        };
        let token = service.issue(&claims).unwrap();

        let data = service.validate::<Claims>(&token).unwrap();
        assert_eq!(data.claims, claims);
        assert_eq!(data.header.alg, ES256K_R);
        assert_eq!(data.header.kid(), Some("t1yu5umbmxehc5w32svhlpruvsb5ml6ya7puvy4uq"));
        assert_eq!(data.header.get("crv"), Some(&json!("secp256k1")));
    }

    #[test]
    fn test_curve_header_optional() {
        let mut config = TokenConfig::new(SAMPLE_EXPORT);
        config.include_curve_header = false;
        let service = TokenService::new(&config).unwrap();

        let token = service.issue(&json!({})).unwrap();
        let data = service.validate::<serde_json::Value>(&token).unwrap();
        assert!(data.header.get("crv").is_none());
    }

    #[test]
    fn test_mainnet_kid() {
        let mut config = TokenConfig::new(SAMPLE_EXPORT);
        config.network = Network::Mainnet;
        let service = TokenService::new(&config).unwrap();

        let token = service.issue(&json!({})).unwrap();
        let data = service.validate::<serde_json::Value>(&token).unwrap();
        assert_eq!(data.header.kid(), Some("f1yu5umbmxehc5w32svhlpruvsb5ml6ya7puvy4uq"));
    }

    #[test]
    fn test_validate_from_explicit_key() {
        let service = create_test_token_service();
        let token = service.issue(&json!({ "iss": "x" })).unwrap();

        assert!(service
            .validate_from::<serde_json::Value>(&token, service.address().clone())
            .is_ok());

        let stranger = PrivateKey::random().address().unwrap();
        let result = service.validate_from::<serde_json::Value>(&token, stranger);
        assert!(matches!(result, Err(AuthError::EcdsaVerificationFailed)));
    }

    #[test]
    fn test_validate_empty_token() {
        let service = create_test_token_service();
        let result = service.validate::<serde_json::Value>("  ");
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_bls_wallet_rejected() {
        let bls_export = "7b2254797065223a22626c73222c22507269766174654b6579223a22314f615368333576326e65756b654e76624e574231566d444c52357a6371534c6e6a6277756a6e4d426b453d227d";
        let result = TokenService::new(&TokenConfig::new(bls_export));
        assert!(matches!(result, Err(AuthError::UnsupportedKeyType(_))));
    }
}
