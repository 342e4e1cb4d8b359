//! Command-line modes: the stdio tool server (default) and one-shot export.

use crate::config::ServerConfig;
use crate::export::{ExportError, export_deck};
use crate::tools::build_renderer;
use sd_core::{AspectRatio, Deck, LayoutError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

pub const USAGE: &str = "\
usage: sd-server                       serve tools over stdin/stdout
       sd-server --export <deck.json> [--aspect 9:16|1:1|16:9] [--out deck.zip]";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Serve,
    Help,
    Export {
        deck: PathBuf,
        aspect: AspectRatio,
        out: PathBuf,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid deck JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Renderer(#[from] LayoutError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parse arguments (without the program name).
pub fn parse_args(args: &[String]) -> Result<Command, CliError> {
    let mut iter = args.iter().map(String::as_str);
    let Some(first) = iter.next() else {
        return Ok(Command::Serve);
    };
    match first {
        "-h" | "--help" => return Ok(Command::Help),
        "--export" => {}
        other => return Err(CliError::Usage(format!("unexpected argument `{other}`"))),
    }

    let deck = iter
        .next()
        .map(PathBuf::from)
        .ok_or_else(|| CliError::Usage("--export needs a deck path".into()))?;
    let mut aspect = AspectRatio::default();
    let mut out = PathBuf::from("deck.zip");

    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| CliError::Usage(format!("{flag} needs a value")))?;
        match flag {
            "--aspect" => aspect = value.parse().map_err(CliError::Usage)?,
            "--out" => out = PathBuf::from(value),
            other => return Err(CliError::Usage(format!("unknown flag `{other}`"))),
        }
    }
    Ok(Command::Export { deck, aspect, out })
}

/// Export every slide of the deck at `deck_path` into a zip at `out`.
pub async fn run_export(
    config: &ServerConfig,
    deck_path: &Path,
    aspect: AspectRatio,
    out: &Path,
) -> Result<(), CliError> {
    let text = tokio::fs::read_to_string(deck_path)
        .await
        .map_err(|source| CliError::Read {
            path: deck_path.to_path_buf(),
            source,
        })?;
    let deck: Deck = serde_json::from_str(&text)?;
    let renderer = Arc::new(build_renderer(config)?);

    log::info!(
        "exporting {} slide(s) from {} at {aspect}",
        deck.len(),
        deck_path.display()
    );
    let archive = export_deck(renderer, deck.slides, aspect).await?;
    tokio::fs::write(out, &archive)
        .await
        .map_err(|source| CliError::Write {
            path: out.to_path_buf(),
            source,
        })?;
    log::info!("wrote {} ({} bytes)", out.display(), archive.len());
    Ok(())
}
