//! Reading the document collection: recursive traversal of the corpus
//! directory and extraction of the three term sets from each news article.
//!
//! Articles are JSON files of the shape
//! `{ "title", "published", "text", "entities": { "organizations": [{"name"}],
//! "persons": [{"name"}] } }`. Files that do not parse as an article are
//! skipped; I/O failures abort the walk.

use crate::error::EngineError;
use crate::text;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(default)]
    text: String,
    #[serde(default)]
    entities: Entities,
}

#[derive(Debug, Default, Deserialize)]
struct Entities {
    #[serde(default)]
    organizations: Vec<NamedEntity>,
    #[serde(default)]
    persons: Vec<NamedEntity>,
}

#[derive(Debug, Deserialize)]
struct NamedEntity {
    name: String,
}

/// The three term sets extracted from one document. Names are verbatim;
/// body words are raw tokens, normalized later at association time.
pub struct DocumentTerms {
    pub organizations: HashSet<String>,
    pub persons: HashSet<String>,
    pub words: HashSet<String>,
}

/// Walks `root` recursively, yielding every regular file. Traversal errors
/// surface as `BuildFailure` so an unreadable corpus aborts the rebuild
/// instead of silently indexing a subset.
pub fn enumerate_documents(
    root: &Path,
) -> impl Iterator<Item = Result<PathBuf, EngineError>> {
    WalkDir::new(root).into_iter().filter_map(|entry| match entry {
        Ok(e) if e.file_type().is_file() => Some(Ok(e.into_path())),
        Ok(_) => None,
        Err(e) => {
            let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();
            Some(Err(EngineError::BuildFailure { path, source: e.into() }))
        }
    })
}

/// Extracts the term sets from one document. `None` means the file is not a
/// news article (wrong format, not JSON) and should be skipped.
pub fn read_document(path: &Path) -> Result<Option<DocumentTerms>, EngineError> {
    let raw = fs::read_to_string(path).map_err(|source| EngineError::BuildFailure {
        path: path.to_path_buf(),
        source,
    })?;
    let article: Article = match serde_json::from_str(&raw) {
        Ok(article) => article,
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "skipping non-article file");
            return Ok(None);
        }
    };

    let organizations = article
        .entities
        .organizations
        .into_iter()
        .map(|e| e.name)
        .collect();
    let persons = article.entities.persons.into_iter().map(|e| e.name).collect();
    let words = text::tokenize(&article.text).into_iter().collect();
    Ok(Some(DocumentTerms { organizations, persons, words }))
}
