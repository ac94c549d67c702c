use std::io;
use std::process::ExitCode;

use clap::Parser;
use linfa_train::cli::Cli;
use linfa_train::report::Outcome;
use linfa_train::{logging, pipeline, TrainError};

fn main() -> ExitCode {
    logging::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                err.exit()
            }
            _ => {
                let rendered = err.to_string();
                let message = rendered
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .trim_start_matches("error: ")
                    .to_string();
                return emit(Outcome::failure(&TrainError::Arguments(message)));
            }
        },
    };

    let config = cli.into_config();
    emit(Outcome::from(pipeline::run(&config)))
}

fn emit(outcome: Outcome) -> ExitCode {
    if let Err(err) = outcome.write_to(io::stdout().lock()) {
        tracing::error!(error = %err, "failed to write outcome");
        return ExitCode::FAILURE;
    }
    ExitCode::from(outcome.exit_code())
}
