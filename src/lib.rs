//! # filjwt
//!
//! ES256K-R JWT signing and verification for **Filecoin secp256k1 wallets**.
//!
//! ES256K-R signatures are 65 bytes: a deterministic (RFC 6979) ECDSA
//! signature over SHA-256 (`R || S`) followed by a recovery byte `V`. The
//! verifier recovers the signer's public key from the signature, derives its
//! Filecoin address and compares it with the claimed one, so a token only
//! needs to carry the signer's address (in the `kid` header), never the
//! public key.
//!
//! ## Features
//!
//! - **Wallet Import** - Decode `lotus wallet export` blobs into a key and its `t1`/`f1` address
//! - **Recoverable Signatures** - Sign and verify ES256K-R over arbitrary messages
//! - **Address-based Verification** - Verify against a public key, an [`Address`] or an address string
//! - **Token Framing** - Issue and validate compact JWS tokens with the address in `kid`
//! - **Stateless Design** - All operations are pure and thread-safe
//!
//! ## Quick Start
//!
//! ```rust
//! use filjwt::{TokenConfig, TokenService};
//! use serde_json::json;
//!
//! // `lotus wallet export <address>` output
//! let config = TokenConfig::new("7b2254797065223a22736563703235366b31222c22507269766174654b6579223a226f784132746e774378426552303055734561766f56637551722b6d4133596b7346567543346254416873303d227d");
//! let service = TokenService::new(&config).unwrap();
//!
//! let token = service.issue(&json!({ "iss": "filjwt-example" })).unwrap();
//!
//! match service.validate::<serde_json::Value>(&token) {
//!     Ok(data) => println!("Token signed by {:?}", data.header.kid()),
//!     Err(e) => println!("Validation failed: {}", e),
//! }
//! ```
//!
//! ## Examples
//!
//! See the [basic_workflow example](demos/basic_workflow.rs) for a complete flow:
//!
//! ```bash
//! cargo run --example basic_workflow
//! ```

pub mod address;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;

// Re-export main types for easier access
pub use address::{Address, Network, Protocol};
pub use auth::TokenService;
pub use config::TokenConfig;
pub use crypto::es256kr::{sign, verify, ES256K_R};
pub use crypto::jwt::{decode, encode, kid_address_key, Header, TokenData};
pub use crypto::keys::{KeyReference, PrivateKey, PublicKey};
pub use crypto::signature::Signature;
pub use crypto::wallet::{decode_wallet_export, WalletExport};
pub use error::{AuthError, Result};
