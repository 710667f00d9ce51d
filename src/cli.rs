use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "jackc", version, about = "Compile Jack classes to VM code")]
pub struct Cli {
	/// A `.jack` file, or a directory whose `.jack` files are compiled
	pub path:       PathBuf,
	/// Write `.vm` files here instead of next to their sources
	#[arg(short, long)]
	pub output_dir: Option<PathBuf>,
}
