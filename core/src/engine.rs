//! The engine facade: load-or-rebuild lifecycle plus the search entry point.

use crate::corpus;
use crate::error::EngineError;
use crate::index::IndexManager;
use crate::persist::IndexPaths;
use crate::{query, text};
use std::path::Path;
use std::time::Instant;

pub struct SearchEngine {
    index: IndexManager,
}

impl SearchEngine {
    /// Loads the persisted index. When any category fails to load, the
    /// persisted state is unusable as a whole and the engine falls back to a
    /// full rebuild from the corpus, persisting the fresh result.
    pub fn open(corpus_dir: &Path, paths: &IndexPaths) -> Result<Self, EngineError> {
        let mut index = IndexManager::new();
        match index.load(paths) {
            Ok(()) => {
                let (orgs, names, words) = index.term_counts();
                tracing::info!(orgs, names, words, "index loaded");
                Ok(Self { index })
            }
            Err(err) => {
                tracing::warn!(%err, "no usable persisted index, rebuilding");
                Self::rebuild(corpus_dir, paths)
            }
        }
    }

    /// Full rebuild: walk the corpus, normalize and associate every term,
    /// then persist. Nothing is saved if the walk aborts, so previously
    /// persisted files survive a failed rebuild untouched.
    pub fn rebuild(corpus_dir: &Path, paths: &IndexPaths) -> Result<Self, EngineError> {
        let start = Instant::now();
        let mut index = IndexManager::new();
        let mut documents = 0usize;

        for entry in corpus::enumerate_documents(corpus_dir) {
            let path = entry?;
            let Some(terms) = corpus::read_document(&path)? else {
                continue;
            };
            let document = path.to_string_lossy().into_owned();
            for org in &terms.organizations {
                index.associate_organization(&org.to_lowercase(), &document);
            }
            for person in &terms.persons {
                index.associate_person(&person.to_lowercase(), &document);
            }
            for word in &terms.words {
                // Stopwords come back empty and are dropped by the manager.
                index.associate_word(&text::process_word(word), &document);
            }
            documents += 1;
        }

        let (orgs, names, words) = index.term_counts();
        tracing::info!(
            documents,
            orgs,
            names,
            words,
            elapsed_s = start.elapsed().as_secs_f64(),
            "corpus indexed"
        );
        index.save(paths)?;
        Ok(Self { index })
    }

    pub fn search(&self, query_text: &str) -> Vec<String> {
        query::search(&self.index, query_text)
    }

    pub fn index(&self) -> &IndexManager {
        &self.index
    }
}
