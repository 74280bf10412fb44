use clap::Parser;

use sharestore::cli;
use sharestore::error::Result;
use sharestore::storage::{OpendalShare, Storage};

use sharestore::cli::Args;
use sharestore::config::load_storage_config;

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run_app(args).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_app(args: Args) -> Result<()> {
    let config = load_storage_config()?;
    let storage = Storage::<OpendalShare>::connect(config).await?;
    cli::run(args, storage).await?;
    Ok(())
}
