use finsearch_core::{IndexPaths, SearchEngine};
use std::fs;
use std::path::Path;

fn write_article(dir: &Path, name: &str, org: &str, words: &str) -> String {
    let path = dir.join(name);
    let body = format!(
        r#"{{
            "title": "{org} report",
            "published": "2024-03-01",
            "text": "{words}",
            "entities": {{
                "organizations": [{{"name": "{org}"}}],
                "persons": [{{"name": "Jane Doe"}}]
            }}
        }}"#
    );
    fs::write(&path, body).unwrap();
    path.to_string_lossy().into_owned()
}

fn two_article_corpus(corpus: &Path) -> (String, String) {
    let d1 = write_article(corpus, "d1.json", "Acme", "profit rose");
    let d2 = write_article(corpus, "d2.json", "Globex", "profit fell");
    (d1, d2)
}

#[test]
fn boolean_queries_over_a_small_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("articles");
    fs::create_dir_all(&corpus).unwrap();
    let (d1, d2) = two_article_corpus(&corpus);

    let paths = IndexPaths::new(dir.path().join("index"));
    let engine = SearchEngine::rebuild(&corpus, &paths).unwrap();

    assert_eq!(engine.search("profit -fell"), vec![d1.clone()]);
    assert_eq!(engine.search("org:acme"), vec![d1.clone()]);
    // Person keys are the verbatim full name; a partial name is no match.
    assert!(engine.search("person:jane").is_empty());
    let mut both = engine.search("profit");
    both.sort();
    assert_eq!(both, vec![d1.clone(), d2.clone()]);

    assert!(engine.search("-profit").is_empty());
    assert!(engine.search("the and of").is_empty());
    assert!(engine.search("").is_empty());
}

#[test]
fn open_prefers_the_persisted_index() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("articles");
    fs::create_dir_all(&corpus).unwrap();
    let (d1, _) = two_article_corpus(&corpus);

    let paths = IndexPaths::new(dir.path().join("index"));
    SearchEngine::rebuild(&corpus, &paths).unwrap();

    // The corpus is gone, so only a successful load can answer this.
    fs::remove_dir_all(&corpus).unwrap();
    let engine = SearchEngine::open(&corpus, &paths).unwrap();
    assert_eq!(engine.search("org:acme"), vec![d1]);
}

#[test]
fn open_rebuilds_when_any_category_file_is_unusable() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("articles");
    fs::create_dir_all(&corpus).unwrap();
    let (d1, _) = two_article_corpus(&corpus);

    let paths = IndexPaths::new(dir.path().join("index"));
    SearchEngine::rebuild(&corpus, &paths).unwrap();
    fs::write(paths.words(), b"garbage").unwrap();

    let engine = SearchEngine::open(&corpus, &paths).unwrap();
    assert_eq!(engine.search("profit -fell"), vec![d1]);
}

#[test]
fn queries_match_stemmed_variants() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("articles");
    fs::create_dir_all(&corpus).unwrap();
    let d1 = write_article(&corpus, "d1.json", "Acme", "profits are rising fast");

    let paths = IndexPaths::new(dir.path().join("index"));
    let engine = SearchEngine::rebuild(&corpus, &paths).unwrap();

    // "profits" indexes as "profit"; the query stems the same way.
    assert_eq!(engine.search("profit"), vec![d1.clone()]);
    assert_eq!(engine.search("profits"), vec![d1]);
}

#[test]
fn stopwords_never_become_index_keys() {
    use finsearch_core::Category;

    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("articles");
    fs::create_dir_all(&corpus).unwrap();
    write_article(&corpus, "d1.json", "Acme", "the profit and the loss");

    let paths = IndexPaths::new(dir.path().join("index"));
    let engine = SearchEngine::rebuild(&corpus, &paths).unwrap();

    assert!(engine.index().files_for(Category::Words, "the").is_empty());
    assert!(engine.index().files_for(Category::Words, "and").is_empty());
    assert!(!engine.index().files_for(Category::Words, "profit").is_empty());
}
