use std::{fs, path::{Path, PathBuf}};

use anyhow::Context;
use rayon::prelude::*;
use tracing::{error, info};

use crate::{DriverError, compile_unit};

const SOURCE_EXTENSION: &str = "jack";
const OUTPUT_EXTENSION: &str = "vm";

/// Driver maps `.jack` files on disk to `.vm` files.
#[derive(Debug, Clone, Default)]
pub struct Driver {
	/// Where outputs go, next to each source when `None`
	output_dir: Option<PathBuf>,
}

impl Driver {
	pub fn new() -> Self { Self::default() }

	pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.output_dir = Some(dir.into());
		self
	}

	/// Compile a single `.jack` file, or every `.jack` file directly inside a
	/// directory. Units are compiled in parallel and each one succeeds or fails
	/// on its own; the returned outcomes follow the sorted source order.
	pub fn compile_path<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Result<PathBuf, DriverError>>, DriverError> {
		let path = path.as_ref();
		let sources = self.sources(path)?;
		if let Some(dir) = &self.output_dir {
			fs::create_dir_all(dir).with_context(|| format!("Failed create output directory {}", dir.display()))?;
		}

		Ok(sources
			.par_iter()
			.map(|source| {
				self.compile_file(source).inspect_err(|e| error!(source = %source.display(), "{e}"))
			})
			.collect())
	}

	/// Compile one file and write its output. Nothing is written when the unit
	/// fails.
	pub fn compile_file<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf, DriverError> {
		let path = path.as_ref();
		let class_name =
			path.file_stem().and_then(|stem| stem.to_str()).ok_or_else(|| DriverError::InvalidInput(path.to_path_buf()))?;
		let source = fs::read_to_string(path).with_context(|| format!("Failed read {}", path.display()))?;

		let stream = compile_unit(&source, class_name)
			.map_err(|source| DriverError::Compile { path: path.to_path_buf(), source })?;

		let output = self.output_path(path, class_name);
		fs::write(&output, stream.to_string()).with_context(|| format!("Failed write {}", output.display()))?;
		info!(source = %path.display(), output = %output.display(), instructions = stream.len(), "compiled");
		Ok(output)
	}

	fn output_path(&self, source: &Path, class_name: &str) -> PathBuf {
		let file_name = format!("{class_name}.{OUTPUT_EXTENSION}");
		match &self.output_dir {
			Some(dir) => dir.join(file_name),
			None => source.with_file_name(file_name),
		}
	}

	/// The units named by `path`, sorted.
	fn sources(&self, path: &Path) -> Result<Vec<PathBuf>, DriverError> {
		if path.is_file() && is_source(path) {
			return Ok(vec![path.to_path_buf()]);
		}
		if !path.is_dir() {
			return Err(DriverError::InvalidInput(path.to_path_buf()));
		}

		let mut sources = Vec::new();
		for entry in fs::read_dir(path).with_context(|| format!("Failed read directory {}", path.display()))? {
			let entry = entry.with_context(|| format!("Failed read directory {}", path.display()))?;
			let candidate = entry.path();
			if candidate.is_file() && is_source(&candidate) {
				sources.push(candidate);
			}
		}
		if sources.is_empty() {
			return Err(DriverError::NoSources(path.to_path_buf()));
		}
		sources.sort();
		Ok(sources)
	}
}

fn is_source(path: &Path) -> bool { path.extension().is_some_and(|extension| extension == SOURCE_EXTENSION) }
