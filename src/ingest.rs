use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::db::{self, NewDocument};

/// Ingest stats returned after completion.
pub struct IngestStats {
    pub total: usize,
    pub added: usize,
    pub skipped: usize,
}

/// Load extracted syllabus text from a file or a directory of .txt files.
/// Files with no readable text are skipped with a warning, never fatal.
/// Already-ingested filenames are skipped too (dedup happens in the DB).
pub fn ingest_path(conn: &Connection, path: &Path, limit: Option<usize>) -> Result<IngestStats> {
    let mut files = collect_files(path)?;
    if let Some(n) = limit {
        files.truncate(n);
    }
    let total = files.len();

    let mut docs = Vec::with_capacity(total);
    let mut skipped = 0;

    for file in &files {
        let text = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        if text.trim().is_empty() {
            warn!("No readable text in {}, skipping", file.display());
            skipped += 1;
            continue;
        }
        let filename = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file.display().to_string());
        docs.push(NewDocument {
            filename,
            raw_text: text,
        });
    }

    let added = db::insert_documents(conn, &docs)?;
    skipped += docs.len() - added;
    info!("Ingested {} of {} files ({} skipped)", added, total, skipped);

    Ok(IngestStats { total, added, skipped })
}

fn collect_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        anyhow::bail!("{} is neither a file nor a directory", path.display());
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(path)
        .with_context(|| format!("Failed to read directory {}", path.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
        })
        .collect();
    files.sort();
    Ok(files)
}
