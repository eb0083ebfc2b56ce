//! CLI entry point for bladecon.

mod app;
mod cli;

use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = cli::Args::parse();
    let code = app::entry::run(args).await;
    // Exit without waiting on the blocking stdin reader.
    std::process::exit(code);
}
