//! Binary that checks a reaction network model, written as JSON, for
//! overdetermination.

use std::{io::Stdout, process::ExitCode};

use json_overdet::{Cli, HELP};
use pico_args::Arguments;

/// Exit status used when the model is overdetermined.
const EXIT_OVERDETERMINED: u8 = 1;
/// Exit status used when an error occurred.
const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
	let mut args = Arguments::from_env();
	if args.contains(["-h", "--help"]) {
		print!("{HELP}");
		return ExitCode::SUCCESS;
	}

	let mut cli = match Cli::<Stdout>::try_from(args) {
		Ok(cli) => cli,
		Err(err) => {
			eprintln!("error: {err}\n\n{HELP}");
			return ExitCode::from(EXIT_ERROR);
		}
	};
	match cli.run() {
		Ok(false) => ExitCode::SUCCESS,
		Ok(true) => ExitCode::from(EXIT_OVERDETERMINED),
		Err(err) => {
			eprintln!("error: {err}");
			ExitCode::from(EXIT_ERROR)
		}
	}
}
