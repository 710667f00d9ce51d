use std::process::ExitCode;

use clap::Parser;
use jackc::{Driver, cli::Cli};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.with_writer(std::io::stderr)
		.init();

	let cli = Cli::parse();
	let mut driver = Driver::new();
	if let Some(dir) = cli.output_dir {
		driver = driver.with_output_dir(dir);
	}

	match driver.compile_path(&cli.path) {
		Ok(outcomes) => {
			let failed = outcomes.iter().filter(|outcome| outcome.is_err()).count();
			if failed == 0 {
				ExitCode::SUCCESS
			} else {
				eprintln!("{failed} of {} units failed", outcomes.len());
				ExitCode::FAILURE
			}
		}
		Err(e) => {
			eprintln!("Failed compile {}: {e}", cli.path.display());
			ExitCode::FAILURE
		}
	}
}
