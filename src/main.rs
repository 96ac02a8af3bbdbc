use clap::Parser;
use niftytrader::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
