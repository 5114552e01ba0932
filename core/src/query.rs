//! Query parsing and boolean evaluation over the three category indices.
//!
//! A query is a whitespace-separated list of tokens: `org:<name>` and
//! `person:<name>` filter on the entity indices, a leading `-` negates a
//! content word, and everything else is a stemmed content word. Positive
//! terms are ANDed; a document matching any negated term is excluded.

use crate::index::{Category, IndexManager};
use crate::persist::PostingMap;
use crate::text;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryTerm {
    Organization(String),
    Person(String),
    Word(String),
    NegatedWord(String),
}

/// Tokenizes and classifies a raw query string. Tokens that normalize to
/// nothing (stopwords, bare prefixes) are dropped, and duplicates collapse:
/// repeating a term never double-counts it.
pub fn parse(query: &str) -> HashSet<QueryTerm> {
    let mut terms = HashSet::new();
    for raw in query.split_whitespace() {
        let token = raw.to_lowercase();
        if let Some(rest) = token.strip_prefix("org:") {
            if !rest.is_empty() {
                terms.insert(QueryTerm::Organization(rest.to_string()));
            }
        } else if let Some(rest) = token.strip_prefix("person:") {
            if !rest.is_empty() {
                terms.insert(QueryTerm::Person(rest.to_string()));
            }
        } else if let Some(rest) = token.strip_prefix('-') {
            let stemmed = text::process_word(rest);
            if !stemmed.is_empty() {
                terms.insert(QueryTerm::NegatedWord(stemmed));
            }
        } else {
            let stemmed = text::process_word(&token);
            if !stemmed.is_empty() {
                terms.insert(QueryTerm::Word(stemmed));
            }
        }
    }
    terms
}

/// Evaluates a parsed term set: the intersection of every positive term's
/// candidate documents, minus the union of the negated terms' documents.
/// With no positive terms there is no universe to subtract from, so the
/// result is empty.
///
/// Ordering is deterministic: descending total matched-term occurrence
/// count, ties broken by ascending document path.
pub fn evaluate(index: &IndexManager, terms: &HashSet<QueryTerm>) -> Vec<String> {
    let mut positive: Vec<PostingMap> = Vec::new();
    let mut excluded: HashSet<String> = HashSet::new();
    for term in terms {
        match term {
            QueryTerm::Organization(name) => {
                positive.push(index.files_for(Category::Organizations, name));
            }
            QueryTerm::Person(name) => {
                positive.push(index.files_for(Category::Persons, name));
            }
            QueryTerm::Word(stem) => {
                positive.push(index.files_for(Category::Words, stem));
            }
            QueryTerm::NegatedWord(stem) => {
                excluded.extend(index.files_for(Category::Words, stem).into_keys());
            }
        }
    }

    let mut candidates = positive.into_iter();
    let Some(mut matched) = candidates.next() else {
        return Vec::new();
    };
    for postings in candidates {
        matched = matched
            .into_iter()
            .filter_map(|(path, total)| postings.get(&path).map(|c| (path, total + c)))
            .collect();
        if matched.is_empty() {
            break;
        }
    }

    let mut results: Vec<(String, u32)> = matched
        .into_iter()
        .filter(|(path, _)| !excluded.contains(path))
        .collect();
    results.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    results.into_iter().map(|(path, _)| path).collect()
}

/// End-to-end search. Never fails: an empty or fully-stopworded query simply
/// produces an empty result.
pub fn search(index: &IndexManager, query: &str) -> Vec<String> {
    evaluate(index, &parse(query))
}
