use thiserror::Error;

/// Signing, verification and key-ingestion errors
///
/// Every operation in this crate is a deterministic computation, so none of
/// these are retried or logged internally. Callers (typically a token
/// validation layer) decide how to surface them.
///
/// # Example
/// ```rust
/// use filjwt::{AuthError, Result};
///
/// fn handle_verify_result(result: Result<()>) {
///     match result {
///         Ok(()) => println!("Signature recovers to the claimed address"),
///         Err(AuthError::EcdsaVerificationFailed) => println!("Wrong signer"),
///         Err(AuthError::InvalidSignatureLength { len }) => println!("Bad length: {}", len),
///         Err(e) => println!("Other error: {}", e),
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum AuthError {
    /// The key reference cannot be used with ES256K-R
    ///
    /// This error occurs when:
    /// - An address string does not parse
    /// - The address is not a SECP256K1 (protocol 1) address
    #[error("Invalid key type for ES256K-R")]
    InvalidKeyType,

    /// Signature is not exactly 65 bytes (R || S || V)
    #[error("Invalid signature length: expected 65 bytes, got {len}")]
    InvalidSignatureLength { len: usize },

    /// Wallet export blob could not be decoded
    ///
    /// This error occurs when:
    /// - The blob is not valid hex
    /// - The decoded bytes are not the expected JSON object
    /// - The private key bytes are not a valid secp256k1 scalar
    #[error("Malformed wallet export: {0}")]
    MalformedExport(String),

    /// Wallet export carries a key type other than `secp256k1`
    #[error("Key must be of type secp256k1, got: {0}")]
    UnsupportedKeyType(String),

    /// Token header has no usable `kid`
    #[error("Token header is missing a string 'kid'")]
    MissingKeyIdentifier,

    /// Recovery failed or the recovered address does not match the claim
    #[error("ECDSA verification failed")]
    EcdsaVerificationFailed,

    /// Filecoin address could not be constructed or parsed
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Token framing is invalid
    ///
    /// This error occurs when:
    /// - The token does not have three dot-separated segments
    /// - The header or claims segment is not a JSON object
    #[error("Invalid or malformed token: {0}")]
    InvalidToken(String),

    /// Token names an algorithm that is not registered or not allowed
    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Base64 decoding failed
    #[error("Base64 decode error: {0}")]
    Base64Error(String),

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    JsonError(String),

    /// Generic cryptographic operation error
    ///
    /// This error occurs for unexpected failures inside the curve
    /// implementation that don't fit into other categories.
    #[error("Cryptographic error: {0}")]
    CryptoError(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;
