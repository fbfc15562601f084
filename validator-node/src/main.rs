//! Cross-chain bridge validator node binary: loads config, wires every
//! component and runs until a supervised task exits.

mod cli;
mod config;
mod service;

use structopt::StructOpt;

fn main() {
    env_logger::init();

    let cli = cli::Cli::from_args();
    let overrides = cli.parse_overrides();
    let config = match config::Config::load(std::path::Path::new(&cli.config_path), &overrides) {
        Ok(config) => config,
        Err(e) => {
            log::error!("failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    let runtime = tokio::runtime::Runtime::new().expect("failed to start the tokio runtime");
    let result = runtime.block_on(service::run(config));
    if let Err(e) = result {
        log::error!("validator node exited with an error: {:?}", e);
        std::process::exit(1);
    }
}
