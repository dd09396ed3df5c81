use std::net::SocketAddr;

use clap::Parser;
use realwage::api::{self, Cli, Command};

#[tokio::main]
async fn main() {
    realwage::logging::init_logging("info");
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Compute(args) => api::run_compute(&args).map(|json| println!("{json}")),
        Command::Share(args) => api::run_share(&args).map(|query| println!("{query}")),
        Command::Serve(args) => match api::load_inflation(&args.inflation) {
            Ok(inflation) => {
                let addr = SocketAddr::new(args.bind, args.port);
                api::run_http_server(addr, inflation)
                    .await
                    .map_err(|e| format!("Server error: {e}"))
            }
            Err(e) => Err(e),
        },
    };

    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
