//! Command line interface that checks reaction network models, written as JSON,
//! for overdetermination.

use std::{
	fs,
	io::{self, Write},
	path::PathBuf,
	time::Instant,
};

use humantime::format_duration;
use overdet::{CheckConfig, Model, OverdeterminationChecker};
use pico_args::Arguments;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Usage information printed for `--help` and after argument errors.
pub const HELP: &str = "\
Check a reaction network model, written as JSON, for overdetermination.

USAGE:
  json-overdet [OPTIONS] <MODEL.json>

OPTIONS:
  -s, --statistics       Print statistics about the check
  -v, --verbose          Increase the level of logging (can be repeated)
      --path-limit <n>   Maximum number of alternating paths per search pass
      --max-length <n>   Maximum length of the alternating paths searched
  -h, --help             Print this help message

The exit status is 0 if the model is not overdetermined, 1 if it is
overdetermined, and 2 if an error occurred.
";

#[derive(Debug, Clone)]
/// Parsed command line arguments, and the stream to which results are written.
pub struct Cli<Stdout> {
	/// Path of the model file.
	path: PathBuf,
	/// Whether to print statistics after the result.
	statistics: bool,
	/// Number of times the verbose flag was given.
	verbose: u8,
	/// Configuration passed on to the checker.
	config: CheckConfig,
	/// Stream to which the result is written.
	stdout: Stdout,
}

#[derive(Error, Debug)]
/// Errors that can occur while running the command line interface.
pub enum CliError {
	#[error("invalid arguments: {0}")]
	/// The command line arguments could not be parsed.
	Args(#[from] pico_args::Error),
	#[error("unexpected arguments: {0}")]
	/// Arguments were given that are not recognized.
	UnusedArguments(String),
	#[error("unable to read `{path}`: {source}")]
	/// The model file could not be read.
	Io {
		/// The path of the model file.
		path: PathBuf,
		/// The underlying error.
		source: io::Error,
	},
	#[error("invalid model: {0}")]
	/// The model file does not contain a valid model.
	Json(#[from] serde_json::Error),
	#[error("unable to write the result: {0}")]
	/// The result could not be written.
	Output(#[from] io::Error),
}

impl<Stdout: Write> Cli<Stdout> {
	/// Replace the stream to which the result is written.
	pub fn with_stdout<W: Write>(self, stdout: W) -> Cli<W> {
		Cli {
			path: self.path,
			statistics: self.statistics,
			verbose: self.verbose,
			config: self.config,
			stdout,
		}
	}

	/// The log level filter to use when `RUST_LOG` is not set.
	fn log_level(&self) -> &'static str {
		match self.verbose {
			0 => "warn",
			1 => "info",
			2 => "debug",
			_ => "trace",
		}
	}

	/// Read the model, check it, and write the result.
	///
	/// Returns whether the model is overdetermined.
	pub fn run(&mut self) -> Result<bool, CliError> {
		let filter = EnvFilter::try_from_default_env()
			.unwrap_or_else(|_| EnvFilter::new(self.log_level()));
		let subscriber = tracing_subscriber::fmt()
			.with_env_filter(filter)
			.with_writer(io::stderr)
			.finish();
		let _guard = tracing::subscriber::set_default(subscriber);

		let start = Instant::now();
		let text = fs::read_to_string(&self.path).map_err(|source| CliError::Io {
			path: self.path.clone(),
			source,
		})?;
		let model: Model = serde_json::from_str(&text)?;
		info!(
			path = %self.path.display(),
			level = model.level(),
			rules = model.rules().len(),
			"loaded model"
		);
		self.check(&model, start)
	}

	/// Check the model and write the result, including the time elapsed since
	/// `start` when statistics are requested.
	fn check(&mut self, model: &Model, start: Instant) -> Result<bool, CliError> {
		let checker = OverdeterminationChecker::with_config(model, &self.config);
		debug!(
			overdetermined = checker.is_overdetermined(),
			"finished check"
		);
		self.write_result(model, &checker, start)?;
		Ok(checker.is_overdetermined())
	}

	/// Write the verdict, the matching, and (optionally) the statistics.
	fn write_result(
		&mut self,
		model: &Model,
		checker: &OverdeterminationChecker,
		start: Instant,
	) -> io::Result<()> {
		let out = &mut self.stdout;
		writeln!(out, "overdetermined: {}", checker.is_overdetermined())?;
		for (var, eq) in checker.matched_pairs() {
			writeln!(out, "{} -> {}", model.element_id(var), eq.describe(model))?;
		}
		for eq in checker.unmatched_equations() {
			writeln!(out, "unmatched: {}", eq.describe(model))?;
		}

		if self.statistics {
			let stats = checker.statistics();
			for (key, value) in [
				("variables", stats.variables()),
				("equations", stats.equations()),
				("edges", stats.edges()),
				("initial_matching", stats.initial_matching()),
				("final_matching", stats.final_matching()),
				("passes", stats.passes()),
				("paths_found", stats.paths_found()),
				("augmentations", stats.augmentations()),
			] {
				writeln!(out, "stat: {key}={value}")?;
			}
			writeln!(out, "stat: elapsed={}", format_duration(start.elapsed()))?;
		}
		out.flush()
	}
}

impl TryFrom<Arguments> for Cli<io::Stdout> {
	type Error = CliError;

	fn try_from(mut args: Arguments) -> Result<Self, Self::Error> {
		let statistics = args.contains(["-s", "--statistics"]);
		let mut verbose = 0_u8;
		while args.contains(["-v", "--verbose"]) {
			verbose = u8::saturating_add(verbose, 1);
		}

		let mut config = CheckConfig::default();
		if let Some(limit) = args.opt_value_from_str("--path-limit")? {
			config = config.with_path_limit(limit);
		}
		if let Some(length) = args.opt_value_from_str("--max-length")? {
			config = config.with_max_length(length);
		}

		let path: PathBuf = args.free_from_str()?;
		let remaining = args.finish();
		if !remaining.is_empty() {
			return Err(CliError::UnusedArguments(
				remaining
					.iter()
					.map(|arg| arg.to_string_lossy())
					.collect::<Vec<_>>()
					.join(" "),
			));
		}

		Ok(Self {
			path,
			statistics,
			verbose,
			config,
			stdout: io::stdout(),
		})
	}
}
