// demos/basic_workflow.rs

use filjwt::{
    crypto::registry, AuthError, PrivateKey, TokenConfig, TokenService, WalletExport,
};
use serde_json::json;

const SAMPLE_LOTUS_WALLET_EXPORT: &str = "7b2254797065223a22736563703235366b31222c22507269766174654b6579223a226f784132746e774378426552303055734561766f56637551722b6d4133596b7346567543346254416873303d227d";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).try_init();

    println!("filjwt ES256K-R Example");

    // 1. Register signing methods before any traffic
    let algorithms = registry::init().algorithms();
    println!("Registered algorithms: {:?}", algorithms);

    // 2. Setup token service from a Lotus wallet export
    let service = TokenService::new(&TokenConfig::new(SAMPLE_LOTUS_WALLET_EXPORT))?;
    println!("Filecoin wallet address: {}", service.address());

    // 3. Issue a token
    let token = service.issue(&json!({ "iss": "filjwt-example" }))?;
    println!("Generated JWT token:\n  {}", token);

    // 4. Validate using only the address in the `kid` header
    let data = service.validate::<serde_json::Value>(&token)?;
    println!("Successfully validated token:");
    println!("  Headers:");
    println!("    alg:{}", data.header.alg);
    println!("    crv:{}", data.header.get("crv").cloned().unwrap_or_default());
    println!("    kid:{}", data.header.kid().unwrap_or_default());
    println!("    typ:{}", data.header.typ().unwrap_or_default());
    println!("  Claims:");
    println!("    iss:{}", data.claims["iss"]);

    // 5. A token checked against someone else's address is rejected
    let stranger = PrivateKey::random();
    match service.validate_from::<serde_json::Value>(&token, stranger.address()?) {
        Err(AuthError::EcdsaVerificationFailed) => {
            println!("\nToken rejected for a different wallet (expected)")
        }
        other => println!("\nUnexpected result for a different wallet: {:?}", other.map(|d| d.claims)),
    }

    // 6. Export a freshly generated key in Lotus format
    let export = WalletExport::from_private_key(&stranger).encode()?;
    println!("New wallet {} export: {}...", stranger.address()?, &export[..32]);

    println!("\nExample completed!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_runs() {
        // Test that the example runs without panicking
        main().unwrap();
    }

    #[test]
    fn test_issue_validate() {
        let service = TokenService::new(&TokenConfig::new(SAMPLE_LOTUS_WALLET_EXPORT)).unwrap();
        let token = service.issue(&json!({ "iss": "test" })).unwrap();
        assert!(service.validate::<serde_json::Value>(&token).is_ok());
    }
}
