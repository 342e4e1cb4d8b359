//! SlideDraft tool server: deck mutations, server-side rendering, and
//! whole-deck export over line-delimited JSON on stdio.

pub mod cli;
pub mod config;
pub mod export;
pub mod tools;

pub use config::ServerConfig;
pub use export::{ExportError, export_deck};
pub use tools::{ToolError, ToolRequest, ToolServer};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Answer one JSON request per stdin line with one JSON reply per stdout
/// line, until stdin closes.
pub async fn serve_stdio(mut server: ToolServer) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    log::info!("serving tools on stdio");

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let mut reply = server.handle_line(&line).await.to_string();
        reply.push('\n');
        stdout.write_all(reply.as_bytes()).await?;
        stdout.flush().await?;
    }
    log::info!("stdin closed; shutting down");
    Ok(())
}
