//! `sd-server`: stdio tool server, or `--export` for one-shot deck export.
//!
//! Logs go to stderr (`RUST_LOG`, default `info`) so stdout carries only
//! replies.

use sd_server::cli::{self, Command, USAGE};
use sd_server::{ServerConfig, ToolServer, serve_stdio};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match cli::parse_args(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("sd-server: {e}\n{USAGE}");
            std::process::exit(2);
        }
    };
    let config = ServerConfig::from_env();

    let result = match command {
        Command::Help => {
            println!("{USAGE}");
            Ok(())
        }
        Command::Serve => serve_stdio(ToolServer::new(&config))
            .await
            .map_err(|e| e.to_string()),
        Command::Export { deck, aspect, out } => cli::run_export(&config, &deck, aspect, &out)
            .await
            .map_err(|e| e.to_string()),
    };

    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(1);
    }
}
