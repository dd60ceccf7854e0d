use anyhow::Result;
use recipe_genai::cli::{execute, parse_args};
use recipe_genai::config::AppConfig;
use recipe_genai::error::GenerationError;
use recipe_genai::orchestrator::Generator;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = parse_args();
    let config = AppConfig::from_env();
    let generator = Generator::from_config(&config);

    match execute(&generator, cli.command).await {
        Ok(payload) => {
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(())
        }
        Err(e) => match e.downcast_ref::<GenerationError>() {
            Some(failure) => {
                eprintln!("Error ({}): {}", failure.status_code(), failure.user_message());
                std::process::exit(1);
            }
            None => Err(e),
        },
    }
}
