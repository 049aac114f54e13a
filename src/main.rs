use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use askai::Provider;
use askai::core::config::{self, CliOverrides};
use clap::Parser;
use log::{error, info, warn};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "askai", about = "Chat with an AI about a piece of code")]
struct Args {
    /// LLM provider to use (overrides config and ASKAI_PROVIDER)
    #[arg(short, long, value_enum)]
    provider: Option<Provider>,

    /// Model name (overrides config and ASKAI_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// File holding the code to discuss, or `-` for stdin
    file: PathBuf,
}

fn read_code(file: &PathBuf) -> std::io::Result<String> {
    if file.as_os_str() == "-" {
        let mut code = String::new();
        std::io::stdin().read_to_string(&mut code)?;
        Ok(code)
    } else {
        std::fs::read_to_string(file)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to askai.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("askai.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        warn!("Config error, using defaults: {}", e);
        eprintln!("Warning: {e}. Using defaults.");
        Default::default()
    });
    let cli = CliOverrides {
        provider: args.provider.map(|p| p.as_str().to_string()),
        model: args.model,
    };
    let resolved = config::resolve(&file_config, &cli);

    info!(
        "askai starting up with provider: {}, model: {}",
        resolved.provider, resolved.model_name
    );

    let code = match read_code(&args.file) {
        Ok(code) => code,
        Err(e) => {
            error!("Failed to read {}: {}", args.file.display(), e);
            eprintln!("Error: cannot read {}: {e}", args.file.display());
            return ExitCode::from(2);
        }
    };

    let provider = match askai::tui::build_provider(&resolved) {
        Ok(provider) => provider,
        Err(e) => {
            error!("Provider setup failed: {}", e);
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match askai::tui::run(resolved, provider, code) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Terminal error: {}", e);
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
