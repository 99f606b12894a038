//! promocite entry point: parse arguments, run one evaluation, report.

use promocite_lib::cli;

fn main() {
    promocite_lib::init_logging();
    if let Err(e) = cli::run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
