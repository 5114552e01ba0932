//! On-disk encoding of the index trees.
//!
//! Each category tree is one file: a small magic/version header followed by
//! one record per tree node, written in full in-order traversal. All integers
//! are little-endian:
//!
//! ```text
//! record := key_len:u64 key:u8[key_len] posting_count:u64
//!           (path_len:u64 path:u8[path_len] count:i32)*
//! ```

use crate::avl::AvlTree;
use crate::error::EngineError;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Document path -> occurrence count for one term.
pub type PostingMap = HashMap<String, u32>;

const MAGIC: &[u8; 4] = b"FIDX";
const VERSION: u32 = 1;

/// Upper bound on any single key or path field; anything larger means the
/// file is garbage, not an index.
const MAX_FIELD_LEN: u64 = 1 << 24;

/// Locations of the three per-category index files under one root directory.
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    pub fn organizations(&self) -> PathBuf {
        self.root.join("org.dat")
    }

    pub fn persons(&self) -> PathBuf {
        self.root.join("name.dat")
    }

    pub fn words(&self) -> PathBuf {
        self.root.join("word.dat")
    }
}

/// Writes the whole tree to `path`. The bytes go to a sibling temporary file
/// first and are renamed into place, so a crash mid-write never leaves a
/// torn index file behind.
pub fn save_tree(path: &Path, tree: &AvlTree<PostingMap>) -> Result<(), EngineError> {
    let tmp = path.with_extension("dat.tmp");
    let result = write_records(&tmp, tree).and_then(|()| fs::rename(&tmp, path));
    if let Err(source) = result {
        let _ = fs::remove_file(&tmp);
        return Err(EngineError::PersistenceFailure { path: path.to_path_buf(), source });
    }
    Ok(())
}

fn write_records(path: &Path, tree: &AvlTree<PostingMap>) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    out.write_all(MAGIC)?;
    out.write_u32::<LittleEndian>(VERSION)?;
    for (key, postings) in tree.iter() {
        write_record(&mut out, key, postings)?;
    }
    out.into_inner()?.sync_all()
}

fn write_record(out: &mut impl Write, key: &str, postings: &PostingMap) -> io::Result<()> {
    out.write_u64::<LittleEndian>(key.len() as u64)?;
    out.write_all(key.as_bytes())?;
    out.write_u64::<LittleEndian>(postings.len() as u64)?;
    for (doc_path, count) in postings {
        out.write_u64::<LittleEndian>(doc_path.len() as u64)?;
        out.write_all(doc_path.as_bytes())?;
        out.write_i32::<LittleEndian>(*count as i32)?;
    }
    Ok(())
}

/// Decodes a full tree from `path`. Any structural problem (bad magic,
/// truncation, negative counts, non-UTF-8 strings) is a `LoadFailure`; the
/// caller decides whether to fall back to a rebuild.
pub fn load_tree(path: &Path) -> Result<AvlTree<PostingMap>, EngineError> {
    let file = File::open(path).map_err(|e| load_failure(path, e.to_string()))?;
    let mut input = BufReader::new(file);

    let mut magic = [0u8; 4];
    input
        .read_exact(&mut magic)
        .map_err(|e| load_failure(path, format!("missing header: {e}")))?;
    if &magic != MAGIC {
        return Err(load_failure(path, "bad magic number".to_string()));
    }
    let version = input
        .read_u32::<LittleEndian>()
        .map_err(|e| load_failure(path, format!("missing version: {e}")))?;
    if version != VERSION {
        return Err(load_failure(path, format!("unsupported format version {version}")));
    }

    let mut tree = AvlTree::new();
    while let Some((key, postings)) = read_record(&mut input, path)? {
        tree.insert(key, postings);
    }
    Ok(tree)
}

/// Reads one record, or `None` at a clean end of file. A file ending in the
/// middle of a record is corrupt.
fn read_record(
    input: &mut impl Read,
    path: &Path,
) -> Result<Option<(String, PostingMap)>, EngineError> {
    let key_len = match input.read_u64::<LittleEndian>() {
        Ok(n) => n,
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(load_failure(path, e.to_string())),
    };
    let key = read_string(input, key_len, path)?;
    let posting_count = input
        .read_u64::<LittleEndian>()
        .map_err(|e| load_failure(path, format!("truncated record: {e}")))?;

    let mut postings = PostingMap::with_capacity(posting_count.min(1024) as usize);
    for _ in 0..posting_count {
        let path_len = input
            .read_u64::<LittleEndian>()
            .map_err(|e| load_failure(path, format!("truncated posting: {e}")))?;
        let doc_path = read_string(input, path_len, path)?;
        let count = input
            .read_i32::<LittleEndian>()
            .map_err(|e| load_failure(path, format!("truncated posting: {e}")))?;
        if count < 0 {
            return Err(load_failure(path, format!("negative occurrence count {count}")));
        }
        postings.insert(doc_path, count as u32);
    }
    Ok(Some((key, postings)))
}

fn read_string(input: &mut impl Read, len: u64, path: &Path) -> Result<String, EngineError> {
    if len > MAX_FIELD_LEN {
        return Err(load_failure(path, format!("implausible field length {len}")));
    }
    let mut buf = vec![0u8; len as usize];
    input
        .read_exact(&mut buf)
        .map_err(|e| load_failure(path, format!("truncated string field: {e}")))?;
    String::from_utf8(buf).map_err(|_| load_failure(path, "non-UTF-8 string field".to_string()))
}

fn load_failure(path: &Path, reason: String) -> EngineError {
    EngineError::LoadFailure { path: path.to_path_buf(), reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> AvlTree<PostingMap> {
        let mut tree = AvlTree::new();
        for (term, docs) in [
            ("acme", vec![("a.json", 3), ("b.json", 1)]),
            ("globex", vec![("b.json", 2)]),
            ("initech", vec![]),
        ] {
            let postings: PostingMap =
                docs.into_iter().map(|(p, c)| (p.to_string(), c)).collect();
            tree.insert(term.to_string(), postings);
        }
        tree
    }

    #[test]
    fn round_trips_every_node() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("word.dat");
        let tree = sample_tree();
        save_tree(&path, &tree).unwrap();

        let loaded = load_tree(&path).unwrap();
        assert_eq!(loaded.len(), tree.len());
        for (key, postings) in tree.iter() {
            assert_eq!(loaded.get(key), Some(postings), "mismatch for {key}");
        }
    }

    #[test]
    fn missing_file_is_a_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_tree(&dir.path().join("nope.dat")).unwrap_err();
        assert!(matches!(err, EngineError::LoadFailure { .. }));
    }

    #[test]
    fn truncated_file_is_a_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("word.dat");
        save_tree(&path, &sample_tree()).unwrap();

        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();
        let err = load_tree(&path).unwrap_err();
        assert!(matches!(err, EngineError::LoadFailure { .. }));
    }

    #[test]
    fn foreign_bytes_are_a_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("word.dat");
        fs::write(&path, b"definitely not an index file").unwrap();
        let err = load_tree(&path).unwrap_err();
        assert!(matches!(err, EngineError::LoadFailure { .. }));
    }

    #[test]
    fn no_temporary_file_survives_a_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("word.dat");
        save_tree(&path, &sample_tree()).unwrap();
        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["word.dat".to_string()]);
    }
}
