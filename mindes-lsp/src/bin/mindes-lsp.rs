use clap::Parser;
use mindes_config::Loader;
use mindes_lsp::features::completion::{default_search_paths, load_or_empty};
use mindes_lsp::MindesLanguageServer;
use std::path::PathBuf;
use tokio::io::{stdin, stdout};
use tower_lsp::{LspService, Server};
use tracing_subscriber::EnvFilter;

/// Language server for MInDes documents and input reports.
#[derive(Parser)]
#[command(name = "mindes-lsp", version)]
struct Args {
    /// TOML file layered over the built-in defaults
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Accepted for editor compatibility; stdio is the only transport
    #[arg(long, hide = true)]
    stdio: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // stdout carries the protocol
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    tracing::debug!(stdio = args.stdio, "starting mindes-lsp");

    let mut loader = Loader::new();
    if let Some(path) = &args.config {
        loader = loader.with_file(path);
    }
    let config = loader.build().unwrap_or_else(|err| {
        eprintln!("Configuration error: {}", err);
        std::process::exit(1);
    });

    let dictionary = load_or_empty(
        config.server.completion_dictionary.as_deref(),
        &default_search_paths(),
    );

    let (service, socket) =
        LspService::new(move |client| MindesLanguageServer::new(client, dictionary, &config));
    Server::new(stdin(), stdout(), socket).serve(service).await;
}
