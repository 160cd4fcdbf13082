//! Disk persistence for index artifacts.
//!
//! The embedding matrix is serialized to `embeddings.bin` with bincode and a
//! footer of `[magic "SVE1"][u32 CRC32 BE]` over the payload. Metadata is a
//! pretty-printed JSON array in `metadata.json`. Writes go through a temp
//! file and a rename, so a crashed build never leaves a half-written artifact.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{EMBEDDINGS_CRC_MAGIC, EMBEDDINGS_FILE, METADATA_FILE};
use crate::document::DocumentRecord;
use crate::error::{Result, SopError};

/// Raw (un-normalized) embedding matrix as persisted on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingMatrix {
    /// Number of vectors.
    pub rows: usize,
    /// Width of each vector.
    pub dimension: usize,
    /// Row-major values, `rows * dimension` long.
    pub data: Vec<f32>,
}

impl EmbeddingMatrix {
    /// Packs per-record vectors into one matrix. Rows must share a width.
    pub fn from_rows(rows: &[Vec<f32>]) -> std::result::Result<Self, String> {
        let dimension = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * dimension);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != dimension {
                return Err(format!(
                    "row {} has dimension {}, expected {}",
                    i,
                    row.len(),
                    dimension
                ));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            dimension,
            data,
        })
    }

    /// Checks that the declared shape matches the payload.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let expected = self
            .rows
            .checked_mul(self.dimension)
            .ok_or_else(|| format!("shape {}x{} overflows", self.rows, self.dimension))?;
        if self.data.len() != expected {
            return Err(format!(
                "embedding data length {} != rows({}) * dimension({})",
                self.data.len(),
                self.rows,
                self.dimension
            ));
        }
        if self.rows > 0 && self.dimension == 0 {
            return Err(format!("{} rows with zero dimension", self.rows));
        }
        if let Some(pos) = self.data.iter().position(|x| !x.is_finite()) {
            return Err(format!(
                "non-finite value in row {}",
                pos / self.dimension.max(1)
            ));
        }
        Ok(())
    }
}

/// Writes both artifacts into `dir`, replacing any previous index there.
///
/// Scores are stripped from the metadata; they are per-query annotations.
pub fn save_index(dir: &Path, matrix: &EmbeddingMatrix, records: &[DocumentRecord]) -> Result<()> {
    matrix.validate().map_err(SopError::IndexCorruption)?;
    if matrix.rows != records.len() {
        return Err(SopError::IndexCorruption(format!(
            "refusing to save {} records with {} embeddings",
            records.len(),
            matrix.rows
        )));
    }

    fs::create_dir_all(dir)?;

    let payload = bincode::serialize(matrix).map_err(|e| io::Error::other(e.to_string()))?;
    let crc = crc32fast::hash(&payload);
    let mut output = Vec::with_capacity(payload.len() + 8);
    output.extend_from_slice(&payload);
    output.extend_from_slice(EMBEDDINGS_CRC_MAGIC);
    output.extend_from_slice(&crc.to_be_bytes());
    write_atomic(&dir.join(EMBEDDINGS_FILE), &output)?;

    let stripped: Vec<DocumentRecord> = records
        .iter()
        .cloned()
        .map(|mut r| {
            r.score = None;
            r
        })
        .collect();
    let metadata = serde_json::to_vec_pretty(&stripped).map_err(io::Error::other)?;
    write_atomic(&dir.join(METADATA_FILE), &metadata)?;

    tracing::info!(
        "Saved index to {:?} ({} records, dimension {}, CRC32={:#010x})",
        dir,
        matrix.rows,
        matrix.dimension,
        crc
    );
    Ok(())
}

/// Reads both artifacts from `dir` and checks their individual integrity.
///
/// The count match between the two sides is checked by
/// [`VectorIndex::from_matrix`](crate::index::VectorIndex::from_matrix).
pub fn load_index_artifacts(dir: &Path) -> Result<(EmbeddingMatrix, Vec<DocumentRecord>)> {
    let embeddings_path = dir.join(EMBEDDINGS_FILE);
    let metadata_path = dir.join(METADATA_FILE);
    for path in [&embeddings_path, &metadata_path] {
        if !path.is_file() {
            return Err(SopError::IndexNotFound { path: path.clone() });
        }
    }

    let matrix = decode_embeddings(&fs::read(&embeddings_path)?, &embeddings_path)?;

    let raw = fs::read(&metadata_path)?;
    let records: Vec<DocumentRecord> = serde_json::from_slice(&raw).map_err(|e| {
        SopError::IndexCorruption(format!("metadata {:?} is not valid: {}", metadata_path, e))
    })?;

    Ok((matrix, records))
}

fn decode_embeddings(raw: &[u8], path: &Path) -> Result<EmbeddingMatrix> {
    if raw.len() < 8 || &raw[raw.len() - 8..raw.len() - 4] != EMBEDDINGS_CRC_MAGIC {
        return Err(SopError::IndexCorruption(format!(
            "embeddings {:?} has no integrity footer",
            path
        )));
    }
    let payload = &raw[..raw.len() - 8];
    let stored_crc = u32::from_be_bytes([
        raw[raw.len() - 4],
        raw[raw.len() - 3],
        raw[raw.len() - 2],
        raw[raw.len() - 1],
    ]);
    let computed_crc = crc32fast::hash(payload);
    if computed_crc != stored_crc {
        return Err(SopError::IndexCorruption(format!(
            "embeddings CRC32 mismatch: expected {:#010x}, got {:#010x} in {:?}",
            stored_crc, computed_crc, path
        )));
    }
    tracing::debug!("Embeddings CRC32 verified: {:#010x}", stored_crc);

    let matrix: EmbeddingMatrix = bincode::deserialize(payload).map_err(|e| {
        SopError::IndexCorruption(format!("embeddings {:?} cannot be decoded: {}", path, e))
    })?;
    matrix.validate().map_err(SopError::IndexCorruption)?;
    Ok(matrix)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);
    fs::write(tmp_path, bytes)?;
    fs::rename(tmp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> (EmbeddingMatrix, Vec<DocumentRecord>) {
        let matrix =
            EmbeddingMatrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![0.5, 0.0, -1.0]]).unwrap();
        let records = vec![
            DocumentRecord::new("SOP-001", "start the machine").with_version("1.0"),
            DocumentRecord::new("SOP-002", "stop the machine")
                .with_effective_date("2024-01-15")
                .with_score(0.4),
        ];
        (matrix, records)
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let (matrix, records) = sample();
        save_index(dir.path(), &matrix, &records).unwrap();

        let (loaded, loaded_records) = load_index_artifacts(dir.path()).unwrap();
        assert_eq!(loaded, matrix);
        assert_eq!(loaded_records.len(), 2);
        assert_eq!(loaded_records[1].score, None, "scores must not be persisted");
        assert_eq!(loaded_records[0].version.as_deref(), Some("1.0"));
        assert!(!dir.path().join("embeddings.bin.tmp").exists());
    }

    #[test]
    fn test_missing_artifact_not_found() {
        let dir = TempDir::new().unwrap();
        let (matrix, records) = sample();
        save_index(dir.path(), &matrix, &records).unwrap();
        fs::remove_file(dir.path().join(METADATA_FILE)).unwrap();

        match load_index_artifacts(dir.path()) {
            Err(SopError::IndexNotFound { path }) => assert!(path.ends_with(METADATA_FILE)),
            other => panic!("expected IndexNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_crc_corruption_detected() {
        let dir = TempDir::new().unwrap();
        let (matrix, records) = sample();
        save_index(dir.path(), &matrix, &records).unwrap();

        let path = dir.path().join(EMBEDDINGS_FILE);
        let mut data = fs::read(&path).unwrap();
        data[10] ^= 0xFF;
        fs::write(&path, &data).unwrap();

        let err = load_index_artifacts(dir.path()).unwrap_err();
        assert!(matches!(err, SopError::IndexCorruption(_)), "got {err:?}");
    }

    #[test]
    fn test_truncated_file_is_corruption() {
        let dir = TempDir::new().unwrap();
        let (matrix, records) = sample();
        save_index(dir.path(), &matrix, &records).unwrap();
        fs::write(dir.path().join(EMBEDDINGS_FILE), b"abc").unwrap();

        let err = load_index_artifacts(dir.path()).unwrap_err();
        assert!(matches!(err, SopError::IndexCorruption(_)), "got {err:?}");
    }

    #[test]
    fn test_invalid_metadata_is_corruption() {
        let dir = TempDir::new().unwrap();
        let (matrix, records) = sample();
        save_index(dir.path(), &matrix, &records).unwrap();
        fs::write(dir.path().join(METADATA_FILE), b"{not json").unwrap();

        let err = load_index_artifacts(dir.path()).unwrap_err();
        assert!(matches!(err, SopError::IndexCorruption(_)), "got {err:?}");
    }

    #[test]
    fn test_save_rejects_count_mismatch() {
        let dir = TempDir::new().unwrap();
        let (matrix, mut records) = sample();
        records.pop();
        let err = save_index(dir.path(), &matrix, &records).unwrap_err();
        assert!(matches!(err, SopError::IndexCorruption(_)), "got {err:?}");
        assert!(!dir.path().join(EMBEDDINGS_FILE).exists());
    }

    #[test]
    fn test_validate_shape() {
        let bad = EmbeddingMatrix {
            rows: 2,
            dimension: 3,
            data: vec![0.0; 5],
        };
        assert!(bad.validate().is_err());

        let nan = EmbeddingMatrix {
            rows: 1,
            dimension: 2,
            data: vec![0.0, f32::NAN],
        };
        assert!(nan.validate().is_err());
    }
}
