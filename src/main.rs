//! tst - command-line entry point for treestate.

use std::process::ExitCode;

use treestate::ui::output;

fn main() -> ExitCode {
    match treestate::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
