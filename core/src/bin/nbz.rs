/// NBZ CLI
///
/// Runs instruction trees produced by the NBZ parser. The script's own
/// `exit(code)` becomes the process exit code.

use nbz_core::cli;

fn main() {
    match cli::run_cli() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
