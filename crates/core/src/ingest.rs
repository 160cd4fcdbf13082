//! SOP text ingestion and offline index rebuilding.
//!
//! Source files are plain text with header lines followed by a free-text
//! body:
//!
//! ```text
//! SOP_ID: SOP-001
//! VERSION: 2.0
//! EFFECTIVE_DATE: 2024-03-01
//! TITLE: Machine startup
//! 1. Check the emergency stop.
//! 2. ...
//! ```
//!
//! Blank lines are ignored and every line is trimmed. Headers are read until
//! `TITLE:`; everything after the title line is the body. Missing headers
//! leave the field absent. A rebuild always replaces the whole index.

use std::fs;
use std::path::Path;

use crate::config::SOP_FILE_EXTENSION;
use crate::document::DocumentRecord;
use crate::error::{Result, SopError};
use crate::provider::EmbeddingProvider;
use crate::storage::{save_index, EmbeddingMatrix};

const ID_HEADER: &str = "SOP_ID:";
const VERSION_HEADER: &str = "VERSION:";
const DATE_HEADER: &str = "EFFECTIVE_DATE:";
const TITLE_HEADER: &str = "TITLE:";

/// Summary of an index rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Number of records written.
    pub documents: usize,
    /// Embedding width.
    pub dimension: usize,
}

/// Parses one SOP file's content into a record.
pub fn parse_sop(content: &str, source_file: &str) -> DocumentRecord {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let header = |line: &str, name: &str| {
        line.strip_prefix(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    let mut record = DocumentRecord {
        source_file: source_file.to_string(),
        ..DocumentRecord::default()
    };
    for (i, &line) in lines.iter().enumerate() {
        if line.starts_with(ID_HEADER) {
            record.id = header(line, ID_HEADER);
        } else if line.starts_with(VERSION_HEADER) {
            record.version = header(line, VERSION_HEADER);
        } else if line.starts_with(DATE_HEADER) {
            record.effective_date = header(line, DATE_HEADER);
        } else if line.starts_with(TITLE_HEADER) {
            record.title = header(line, TITLE_HEADER).unwrap_or_default();
            record.text = lines[i + 1..].join("\n");
            break;
        }
    }
    record
}

/// Reads every `*.md` file in `dir`, in file-name order.
///
/// Fails if the directory is missing or contains no SOP files.
pub fn load_sop_directory(dir: &Path) -> Result<Vec<DocumentRecord>> {
    if !dir.is_dir() {
        return Err(SopError::Ingestion(format!(
            "SOP source directory {:?} does not exist",
            dir
        )));
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file()
            && path.extension().and_then(|s| s.to_str()) == Some(SOP_FILE_EXTENSION)
        {
            paths.push(path);
        }
    }
    paths.sort();

    if paths.is_empty() {
        return Err(SopError::Ingestion(format!(
            "no .{} SOP files found in {:?}",
            SOP_FILE_EXTENSION, dir
        )));
    }

    let mut records = Vec::with_capacity(paths.len());
    for path in &paths {
        let content = fs::read_to_string(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let record = parse_sop(&content, &file_name);
        if record.family_id().is_none() {
            tracing::warn!("{} has no SOP_ID header; it will never be resolved", file_name);
        }
        records.push(record);
    }
    tracing::info!("Parsed {} SOP files from {:?}", records.len(), dir);
    Ok(records)
}

/// Rebuilds the index in `index_dir` from the SOP files in `source_dir`.
pub fn build_index(
    source_dir: &Path,
    index_dir: &Path,
    embedder: &dyn EmbeddingProvider,
) -> Result<BuildReport> {
    let records = load_sop_directory(source_dir)?;
    let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();

    tracing::info!(
        "Embedding {} documents with {}",
        texts.len(),
        embedder.model_name()
    );
    let vectors = embedder.embed_batch(&texts)?;
    if vectors.len() != records.len() {
        return Err(SopError::Provider(format!(
            "embedding provider returned {} vectors for {} documents",
            vectors.len(),
            records.len()
        )));
    }

    let matrix = EmbeddingMatrix::from_rows(&vectors).map_err(SopError::Provider)?;
    save_index(index_dir, &matrix, &records)?;

    Ok(BuildReport {
        documents: records.len(),
        dimension: matrix.dimension,
    })
}
