use clap::Parser;

use studydesk_lib::cli::{self, Cli};

#[tokio::main]
async fn main() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    if let Err(err) = cli::run(cli).await {
        log::error!("{err:#}");
        eprintln!("studydesk: {err:#}");
        std::process::exit(1);
    }
}
