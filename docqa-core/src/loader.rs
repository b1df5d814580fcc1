//! Loading documents from disk.
//!
//! PDF text extraction is delegated to the `pdf-extract` crate (behind the
//! default `pdf` feature); plain-text and Markdown files are read as a
//! single page.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::document::Document;
use crate::error::{Error, Result};

/// File extensions the loader will pick up, case-insensitively.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["pdf", "txt", "md"];

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.iter().any(|s| ext.eq_ignore_ascii_case(s)))
}

/// Recursively list supported document files under `dir`, sorted by path.
///
/// # Errors
///
/// Returns [`Error::UnreadableDocument`] if the directory cannot be walked,
/// for example when it does not exist.
pub fn discover(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|e| Error::UnreadableDocument {
            path: e.path().unwrap_or(dir).to_path_buf(),
            message: e.to_string(),
        })?;
        if entry.file_type().is_file() && is_supported(entry.path()) {
            paths.push(entry.into_path());
        }
    }
    paths.sort();
    Ok(paths)
}

/// Load one document from a supported file.
///
/// # Errors
///
/// Returns [`Error::UnreadableDocument`] for unsupported file types and for
/// files that cannot be read or parsed.
pub fn load_document(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let source = path.display().to_string();

    match extension.as_str() {
        #[cfg(feature = "pdf")]
        "pdf" => {
            let pages = pdf_extract::extract_text_by_pages(path).map_err(|e| {
                Error::UnreadableDocument { path: path.to_path_buf(), message: e.to_string() }
            })?;
            Ok(Document::new(source, pages))
        }
        #[cfg(not(feature = "pdf"))]
        "pdf" => Err(Error::UnreadableDocument {
            path: path.to_path_buf(),
            message: "PDF support is not compiled in (enable the `pdf` feature)".to_string(),
        }),
        "txt" | "md" => {
            let text = fs::read_to_string(path).map_err(|e| Error::UnreadableDocument {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            Ok(Document::from_text(source, text))
        }
        _ => Err(Error::UnreadableDocument {
            path: path.to_path_buf(),
            message: format!("unsupported file type: {extension:?}"),
        }),
    }
}

/// Load every supported document under `dir`.
///
/// Unreadable files are logged and skipped; one bad file never sinks the
/// rest of the corpus.
///
/// # Errors
///
/// Returns [`Error::UnreadableDocument`] only when the directory itself
/// cannot be walked.
pub fn load_corpus(dir: impl AsRef<Path>) -> Result<Vec<Document>> {
    let dir = dir.as_ref();
    let mut documents = Vec::new();
    for path in discover(dir)? {
        match load_document(&path) {
            Ok(document) => documents.push(document),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable document");
            }
        }
    }
    info!(dir = %dir.display(), documents = documents.len(), "loaded corpus");
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_a_text_file_as_one_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "plain text body").unwrap();

        let document = load_document(&path).unwrap();
        assert_eq!(document.pages, vec!["plain text body".to_string()]);
        assert_eq!(document.source, path.display().to_string());
    }

    #[test]
    fn loads_markdown_like_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.md");
        fs::write(&path, "# Title\n\nBody.").unwrap();

        let document = load_document(&path).unwrap();
        assert_eq!(document.pages.len(), 1);
        assert!(document.pages[0].contains("Body."));
    }

    #[test]
    fn rejects_unsupported_file_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "{}").unwrap();

        assert!(matches!(load_document(&path), Err(Error::UnreadableDocument { .. })));
    }

    #[test]
    fn discovery_is_recursive_filtered_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.md"), "b").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("ignore.json"), "{}").unwrap();
        fs::write(dir.path().join("nested").join("c.TXT"), "c").unwrap();

        let paths = discover(dir.path()).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.txt", "b.md", "nested/c.TXT"]);
    }

    #[test]
    fn discovery_of_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-dir");
        assert!(matches!(discover(&missing), Err(Error::UnreadableDocument { .. })));
    }

    #[test]
    fn corpus_load_skips_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("good.txt"), "readable text").unwrap();
        let mut bad = fs::File::create(dir.path().join("bad.txt")).unwrap();
        bad.write_all(&[0xFF, 0xFE, 0x00, 0x80]).unwrap();
        drop(bad);

        let documents = load_corpus(dir.path()).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].pages, vec!["readable text".to_string()]);
    }
}
