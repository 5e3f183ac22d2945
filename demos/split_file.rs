//! Нарезка файла с диска на секции.
//!
//! ```text
//! cargo run --example split_file -- <audio> [section_length] [config.json]
//! ```
//!
//! Архив `<base>_sections.zip` сохраняется рядом с исходным файлом.

use std::path::Path;

use anyhow::{bail, Context, Result};
use audio_splitter::{init_logger, ProgressUpdate, SourceAudio, SplitSession, SplitterConfig};
use log::info;
use tokio::sync::mpsc;

/// Медиа-тип по расширению файла
fn guess_media_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "wav" | "wave" => Some("audio/wav"),
        "mp3" => Some("audio/mpeg"),
        "m4a" => Some("audio/x-m4a"),
        "mp4" => Some("audio/mp4"),
        "aac" => Some("audio/aac"),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();

    let mut args = std::env::args().skip(1);
    let Some(input) = args.next() else {
        bail!("usage: split_file <audio> [section_length] [config.json]");
    };
    let input = Path::new(&input);
    let section_length: Option<u32> = args
        .next()
        .map(|s| s.parse().context("section length must be a whole number of seconds"))
        .transpose()?;
    let config = match args.next() {
        Some(path) => SplitterConfig::load(&path).with_context(|| format!("loading {}", path))?,
        None => SplitterConfig::default(),
    };

    let media_type = guess_media_type(input)
        .with_context(|| format!("unknown audio extension: {}", input.display()))?;
    let data = tokio::fs::read(input)
        .await
        .with_context(|| format!("reading {}", input.display()))?;
    let name = input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("audio");
    let source = SourceAudio::accept(data, media_type, name)?;

    let (tx, mut rx) = mpsc::channel(32);
    let printer = tokio::spawn(async move {
        while let Some(update) = rx.recv().await {
            match update {
                ProgressUpdate::Encoding { index, total } => {
                    println!("  section {}/{}", index + 1, total)
                }
                other => println!("{:?}", other),
            }
        }
    });

    let session = SplitSession::with_progress(config, tx);
    let length = section_length.unwrap_or_else(|| session.config().section_length);
    session.submit(source, length).await?;
    let archive = session.archive()?;
    drop(session);
    printer.await?;

    let output = input.with_file_name(&archive.name);
    tokio::fs::write(&output, &archive.bytes)
        .await
        .with_context(|| format!("writing {}", output.display()))?;

    info!("Wrote {} entries to {}", archive.entries.len(), output.display());
    for name in archive.entry_names() {
        println!("{}", name);
    }
    Ok(())
}
