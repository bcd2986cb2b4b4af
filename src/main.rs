//! weekboard binary
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error

use tracing_subscriber::EnvFilter;

use weekboard::cli::{self, Cli};
use weekboard::ui::output;

fn main() {
    let cli = Cli::parse_args();

    let filter = if cli.debug {
        EnvFilter::new("weekboard=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::run(cli) {
        output::error(format!("{:#}", e));
        std::process::exit(1);
    }
}
