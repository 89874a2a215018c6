use secrecy::Secret;
use serde::Deserialize;

use crate::address::Network;

/// Configuration for issuing and validating ES256K-R tokens
///
/// This struct contains the settings needed by [`crate::TokenService`]:
/// - The signer's Lotus wallet export (`lotus wallet export <address>`)
/// - The network the signer's address is rendered for in the `kid` header
/// - Whether to add a `crv` header
///
/// # Security Note
/// The wallet export is a private key. Keep it out of version control and
/// load it from a secret store or environment variable.
///
/// # Example
/// ```rust
/// use filjwt::{address::Network, TokenConfig};
/// use secrecy::Secret;
///
/// let config = TokenConfig {
///     wallet_export: Secret::new("7b2254797065223a22736563703235366b31222c22507269766174654b6579223a226f784132746e774378426552303055734561766f56637551722b6d4133596b7346567543346254416873303d227d".to_string()),
///     network: Network::Testnet,
///     include_curve_header: true,
/// };
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct TokenConfig {
    /// Hex encoded Lotus wallet export of a secp256k1 key
    pub wallet_export: Secret<String>,
    /// Network prefix for the `kid` address
    ///
    /// Verification compares address payloads only, so tokens issued for
    /// either network validate the same way.
    #[serde(default)]
    pub network: Network,
    /// Add `"crv": "secp256k1"` to issued token headers
    #[serde(default = "default_include_curve_header")]
    pub include_curve_header: bool,
}

fn default_include_curve_header() -> bool {
    true
}

impl TokenConfig {
    /// Testnet configuration with the `crv` header enabled
    pub fn new(wallet_export: impl Into<String>) -> Self {
        Self {
            wallet_export: Secret::new(wallet_export.into()),
            network: Network::default(),
            include_curve_header: default_include_curve_header(),
        }
    }
}
