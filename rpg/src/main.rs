//! Text RPG session bootstrapper.
//!
//! Sends one prompt to an OpenAI-compatible chat completions endpoint and
//! prints the reply on stdout. Configuration comes from the environment
//! (or a `.env` file):
//!
//! ```bash
//! OPENAI_BASE_URL=http://127.0.0.1:1234/v1 cargo run -p rpg
//! ```
//!
//! Logs go to stderr; set `RUST_LOG=debug` to see the request.

use log::debug;
use rpg_core::{Catalogue, Session, SessionConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    if args.iter().any(|a| a == "--tables") {
        let catalogue = Catalogue::standard();
        catalogue.validate()?;
        println!("{}", catalogue.to_json()?);
        return Ok(());
    }

    if !args.is_empty() {
        debug!("Ignoring arguments: {args:?}");
    }

    let catalogue = Catalogue::standard();
    debug!(
        "Loaded {} stages and {} encounter tables",
        catalogue.track.stages().len(),
        catalogue.encounters.len()
    );

    let session = Session::new(SessionConfig::from_env());
    let text = session.run().await?;
    println!("{text}");

    Ok(())
}

fn print_help() {
    println!("rpg - text RPG session bootstrapper");
    println!();
    println!("USAGE:");
    println!("  rpg [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help       Show this help message");
    println!("  --tables         Print the stage, equipment and monster tables as JSON");
    println!();
    println!("ENVIRONMENT:");
    println!("  OPENAI_BASE_URL  API base URL (default: http://127.0.0.1:1234/v1)");
    println!("  OPENAI_API_KEY   Bearer token (default: unused)");
    println!("  OPENAI_MODEL     Model name (default: openai/gpt-oss-20b)");
    println!("  RUST_LOG         Log filter for stderr output (default: warn)");
}
