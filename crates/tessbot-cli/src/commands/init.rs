//! The `tessbot init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("tessbot.toml").exists() {
        println!("tessbot.toml already exists, skipping.");
    } else {
        std::fs::write("tessbot.toml", SAMPLE_CONFIG)?;
        println!("Created tessbot.toml");
    }

    println!("\nNext steps:");
    println!("  1. Export TESSBOT_TOKEN with your access token");
    println!("  2. Run: tessbot units <subject id>");
    println!("  3. Run: tessbot run <unit id> [<unit id> ...]");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# tessbot configuration

base_url = "https://api.tesseractonline.com"
access_token = "${TESSBOT_TOKEN}"

# Per-request timeout and retry on transient errors
timeout_secs = 30
max_retries = 3
retry_delay_ms = 500

# Topics of a unit processed concurrently
parallelism = 1

output_dir = "./tessbot-results"
"#;
