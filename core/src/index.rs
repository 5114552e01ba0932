//! The inverted index: three independent category trees mapping a normalized
//! term to the documents that mention it, with occurrence counts.

use crate::avl::AvlTree;
use crate::error::EngineError;
use crate::persist::{self, IndexPaths, PostingMap};
use std::fs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Organizations,
    Persons,
    Words,
}

#[derive(Default)]
pub struct IndexManager {
    org_index: AvlTree<PostingMap>,
    name_index: AvlTree<PostingMap>,
    word_index: AvlTree<PostingMap>,
}

impl IndexManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn associate_organization(&mut self, name: &str, document: &str) {
        associate(&mut self.org_index, name, document);
    }

    pub fn associate_person(&mut self, name: &str, document: &str) {
        associate(&mut self.name_index, name, document);
    }

    /// Associates a normalized content word with a document. The empty string
    /// is the normalization pipeline's discard signal and is never indexed.
    pub fn associate_word(&mut self, term: &str, document: &str) {
        if term.is_empty() {
            return;
        }
        associate(&mut self.word_index, term, document);
    }

    /// Copy of the posting map for `key`, or an empty map when the key is
    /// absent. Absence is an ordinary queryable state, not an error.
    pub fn files_for(&self, category: Category, key: &str) -> PostingMap {
        self.tree(category).get(key).cloned().unwrap_or_default()
    }

    /// Replaces all three trees with the persisted state. The swap happens
    /// only once every tree has decoded, so a partial failure never leaves a
    /// mix of fresh and stale categories behind.
    pub fn load(&mut self, paths: &IndexPaths) -> Result<(), EngineError> {
        let orgs = persist::load_tree(&paths.organizations())?;
        let names = persist::load_tree(&paths.persons())?;
        let words = persist::load_tree(&paths.words())?;
        self.org_index = orgs;
        self.name_index = names;
        self.word_index = words;
        Ok(())
    }

    pub fn save(&self, paths: &IndexPaths) -> Result<(), EngineError> {
        fs::create_dir_all(&paths.root).map_err(|source| EngineError::PersistenceFailure {
            path: paths.root.clone(),
            source,
        })?;
        persist::save_tree(&paths.organizations(), &self.org_index)?;
        persist::save_tree(&paths.persons(), &self.name_index)?;
        persist::save_tree(&paths.words(), &self.word_index)?;
        Ok(())
    }

    /// Distinct term counts per category, for logging.
    pub fn term_counts(&self) -> (usize, usize, usize) {
        (self.org_index.len(), self.name_index.len(), self.word_index.len())
    }

    fn tree(&self, category: Category) -> &AvlTree<PostingMap> {
        match category {
            Category::Organizations => &self.org_index,
            Category::Persons => &self.name_index,
            Category::Words => &self.word_index,
        }
    }
}

fn associate(tree: &mut AvlTree<PostingMap>, key: &str, document: &str) {
    if let Some(postings) = tree.get_mut(key) {
        *postings.entry(document.to_string()).or_insert(0) += 1;
    } else {
        let mut postings = PostingMap::new();
        postings.insert(document.to_string(), 1);
        tree.insert(key.to_string(), postings);
    }
}
