pub mod es256kr;
pub mod jwt;
pub mod keys;
pub mod registry;
pub mod signature;
pub mod wallet;

// Re-export main functions for easier access
pub use es256kr::{sign, verify, Es256kR, ES256K_R};
pub use keys::{KeyReference, PrivateKey, PublicKey};
