//! On-disk persistence for [`VectorIndex`].
//!
//! An index directory holds three files:
//!
//! - `meta.json`: format version, dimensions, model name, entry count
//! - `chunks.jsonl`: one chunk per line, insertion order
//! - `vectors.bin`: magic, version, dimensions, count, then row-major
//!   little-endian f32 data
//!
//! Saves write a sibling temp directory and rename it over the target, so
//! a crash mid-save never leaves a partial index behind.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use tracing::info;

use crate::document::Chunk;
use crate::error::{Error, Result};
use crate::index::{IndexEntry, VectorIndex};

const META_FILE: &str = "meta.json";
const CHUNKS_FILE: &str = "chunks.jsonl";
const VECTORS_FILE: &str = "vectors.bin";

/// Magic bytes identifying a vector data file.
const VECTORS_MAGIC: [u8; 4] = *b"DQIX";
/// On-disk format version.
const FORMAT_VERSION: u32 = 1;
/// Upper bound on plausible embedding dimensionality; anything above this
/// in a header means the file is corrupt.
const MAX_DIMENSIONS: usize = 65_536;

#[derive(Debug, Serialize, Deserialize)]
struct IndexMeta {
    version: u32,
    dimensions: usize,
    model: String,
    count: usize,
}

impl VectorIndex {
    /// True when `path` holds a persisted index.
    pub fn exists(path: impl AsRef<Path>) -> bool {
        path.as_ref().join(META_FILE).is_file()
    }

    /// Persist the index to a directory, replacing any previous contents.
    ///
    /// The write is all-or-nothing: files go to a temp directory beside
    /// `path`, which is renamed into place only after every file has been
    /// written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if a filesystem operation fails. On
    /// failure the target directory is left as it was.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .ok_or_else(|| Error::Storage(format!("invalid index path: {}", path.display())))?;
        let tmp = path.with_file_name(format!(
            "{}.tmp-{}",
            file_name.to_string_lossy(),
            std::process::id()
        ));

        if tmp.exists() {
            fs::remove_dir_all(&tmp).map_err(|e| storage_err("remove stale temp dir", &tmp, e))?;
        }
        fs::create_dir_all(&tmp).map_err(|e| storage_err("create temp dir", &tmp, e))?;

        if let Err(e) = self.write_files(&tmp) {
            let _ = fs::remove_dir_all(&tmp);
            return Err(e);
        }

        if path.exists() {
            fs::remove_dir_all(path).map_err(|e| storage_err("remove old index", path, e))?;
        }
        fs::rename(&tmp, path).map_err(|e| storage_err("move index into place", path, e))?;

        info!(path = %path.display(), entries = self.len(), "saved index");
        Ok(())
    }

    fn write_files(&self, dir: &Path) -> Result<()> {
        let meta = IndexMeta {
            version: FORMAT_VERSION,
            dimensions: self.dimensions(),
            model: self.model().to_string(),
            count: self.len(),
        };
        let meta_path = dir.join(META_FILE);
        let meta_json = serde_json::to_string_pretty(&meta)
            .map_err(|e| Error::Storage(format!("serialize index metadata: {e}")))?;
        fs::write(&meta_path, meta_json).map_err(|e| storage_err("write", &meta_path, e))?;

        let chunks_path = dir.join(CHUNKS_FILE);
        let mut chunks_out = BufWriter::new(
            File::create(&chunks_path).map_err(|e| storage_err("create", &chunks_path, e))?,
        );
        for entry in self.entries() {
            let line = serde_json::to_string(&entry.chunk)
                .map_err(|e| Error::Storage(format!("serialize chunk: {e}")))?;
            writeln!(chunks_out, "{line}").map_err(|e| storage_err("write", &chunks_path, e))?;
        }
        chunks_out.flush().map_err(|e| storage_err("write", &chunks_path, e))?;

        let vectors_path = dir.join(VECTORS_FILE);
        let mut vectors_out = BufWriter::new(
            File::create(&vectors_path).map_err(|e| storage_err("create", &vectors_path, e))?,
        );
        let write = |out: &mut BufWriter<File>, bytes: &[u8]| {
            out.write_all(bytes).map_err(|e| storage_err("write", &vectors_path, e))
        };
        write(&mut vectors_out, &VECTORS_MAGIC)?;
        write(&mut vectors_out, &FORMAT_VERSION.to_le_bytes())?;
        write(&mut vectors_out, &(self.dimensions() as u32).to_le_bytes())?;
        write(&mut vectors_out, &(self.len() as u32).to_le_bytes())?;
        for entry in self.entries() {
            for value in &entry.vector {
                write(&mut vectors_out, &value.to_le_bytes())?;
            }
        }
        vectors_out.flush().map_err(|e| storage_err("write", &vectors_path, e))?;

        Ok(())
    }

    /// Open a previously saved index.
    ///
    /// # Errors
    ///
    /// - [`Error::IndexNotFound`] when `path` is missing any of the index
    ///   files.
    /// - [`Error::Storage`] when the files are corrupt or disagree with
    ///   each other.
    pub fn open(path: impl AsRef<Path>) -> Result<VectorIndex> {
        let path = path.as_ref();
        let meta_path = path.join(META_FILE);
        let chunks_path = path.join(CHUNKS_FILE);
        let vectors_path = path.join(VECTORS_FILE);
        if !meta_path.is_file() || !chunks_path.is_file() || !vectors_path.is_file() {
            return Err(Error::IndexNotFound { path: path.to_path_buf() });
        }

        let meta_json =
            fs::read_to_string(&meta_path).map_err(|e| storage_err("read", &meta_path, e))?;
        let meta: IndexMeta = serde_json::from_str(&meta_json)
            .map_err(|e| Error::Storage(format!("parse {}: {e}", meta_path.display())))?;
        if meta.version != FORMAT_VERSION {
            return Err(Error::Storage(format!(
                "unsupported index format version {} at {}",
                meta.version,
                path.display()
            )));
        }

        let chunks = read_chunks(&chunks_path)?;
        let (dimensions, vectors) = read_vectors(&vectors_path)?;

        if dimensions != meta.dimensions {
            return Err(Error::Storage(format!(
                "index at {} is inconsistent: metadata says {} dimensions, vector data says {}",
                path.display(),
                meta.dimensions,
                dimensions
            )));
        }
        if chunks.len() != meta.count || vectors.len() != meta.count {
            return Err(Error::Storage(format!(
                "index at {} is inconsistent: metadata says {} entries, found {} chunks and {} vectors",
                path.display(),
                meta.count,
                chunks.len(),
                vectors.len()
            )));
        }

        let entries = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry { chunk, vector })
            .collect();

        info!(path = %path.display(), entries = meta.count, "opened index");
        Ok(VectorIndex::from_parts(meta.dimensions, meta.model, entries))
    }
}

fn storage_err(action: &str, path: &Path, e: std::io::Error) -> Error {
    Error::Storage(format!("{action} {}: {e}", path.display()))
}

fn read_chunks(path: &Path) -> Result<Vec<Chunk>> {
    let file = File::open(path).map_err(|e| storage_err("open", path, e))?;
    let reader = BufReader::new(file);
    let mut chunks = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| storage_err("read", path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let chunk = serde_json::from_str(&line).map_err(|e| {
            Error::Storage(format!("parse {} line {}: {e}", path.display(), number + 1))
        })?;
        chunks.push(chunk);
    }
    Ok(chunks)
}

fn read_vectors(path: &Path) -> Result<(usize, Vec<Vec<f32>>)> {
    let file = File::open(path).map_err(|e| storage_err("open", path, e))?;
    let file_len = file.metadata().map_err(|e| storage_err("stat", path, e))?.len();
    let mut reader = BufReader::new(file);

    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic).map_err(|e| storage_err("read", path, e))?;
    if magic != VECTORS_MAGIC {
        return Err(Error::Storage(format!("{} is not a vector data file", path.display())));
    }
    let version = read_u32(&mut reader, path)?;
    if version != FORMAT_VERSION {
        return Err(Error::Storage(format!(
            "unsupported vector data version {version} in {}",
            path.display()
        )));
    }
    let dimensions = read_u32(&mut reader, path)? as usize;
    if dimensions > MAX_DIMENSIONS {
        return Err(Error::Storage(format!(
            "implausible dimension count {dimensions} in {}",
            path.display()
        )));
    }
    let count = read_u32(&mut reader, path)? as usize;
    // Header is 16 bytes; the rest must hold exactly count rows. This also
    // rejects a zero-dimension header claiming a nonzero count, which would
    // otherwise read "rows" forever without consuming any bytes.
    let expected_len = 16 + (count as u64) * (dimensions as u64) * 4;
    if file_len != expected_len {
        return Err(Error::Storage(format!(
            "{} is {file_len} bytes, expected {expected_len} for {count} vectors of {dimensions} dimensions",
            path.display()
        )));
    }

    let mut rows = Vec::new();
    let mut buf = vec![0u8; dimensions * 4];
    for _ in 0..count {
        reader.read_exact(&mut buf).map_err(|e| storage_err("read", path, e))?;
        let row = buf
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        rows.push(row);
    }
    Ok((dimensions, rows))
}

fn read_u32(reader: &mut impl Read, path: &Path) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf).map_err(|e| storage_err("read", path, e))?;
    Ok(u32::from_le_bytes(buf))
}
