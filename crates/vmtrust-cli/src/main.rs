//! vmtrust - per-VM SUDI credential issuance

use std::process::ExitCode;

fn main() -> ExitCode {
    match vmtrust_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
