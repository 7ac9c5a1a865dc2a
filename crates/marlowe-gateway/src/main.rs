//! Marlowe Gateway CLI
//!
//! Starts the gateway HTTP server that streams investigation events.

use marlowe_gateway::{config::GatewayConfig, start_server, GatewayError};
use std::env;
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), GatewayError> {
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        let config_path = &args[2];
        GatewayConfig::from_file(config_path)?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        eprintln!("Warning: No config file specified, using default test configuration");
        eprintln!("Usage: marlowe-gateway --config <path-to-config.toml>");
        eprintln!();
        GatewayConfig::default_test_config()
    };

    start_server(config).await?;

    Ok(())
}

fn print_help() {
    println!("Marlowe Gateway - Fraud-Investigation Event Streaming");
    println!();
    println!("USAGE:");
    println!("    marlowe-gateway --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("CONFIGURATION:");
    println!("    The TOML config file should contain:");
    println!("    - bind_address / bind_port: where the server listens");
    println!("    - [llm]: reasoning-model endpoint, api_key, model");
    println!("    - [intel]: whois/threat/forum endpoints and credentials");
    println!("    - [search]: shopping-search endpoint and api_key");
    println!("    - [session]: idle_ttl_secs, max_sessions");
    println!("    - allowlist_extra: additional trusted domains");
    println!();
}
