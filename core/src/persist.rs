use crate::{BooleanIndex, IndexSnapshot};
use anyhow::{bail, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::hash::Hash;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub const META_VERSION: u32 = 1;

/// Encoding of the snapshot file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    #[default]
    Json,
    Bincode,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u32,
    pub created_at: String,
    pub version: u32,
    pub format: SnapshotFormat,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn snapshot(&self, format: SnapshotFormat) -> PathBuf {
        match format {
            SnapshotFormat::Json => self.root.join("snapshot.json"),
            SnapshotFormat::Bincode => self.root.join("snapshot.bin"),
        }
    }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

pub fn save_snapshot<D>(paths: &IndexPaths, snapshot: &IndexSnapshot<D>, format: SnapshotFormat) -> Result<()>
where
    D: Hash + Eq + Serialize,
{
    create_dir_all(&paths.root)?;
    let mut f = BufWriter::new(File::create(paths.snapshot(format))?);
    match format {
        SnapshotFormat::Json => serde_json::to_writer(&mut f, snapshot)?,
        SnapshotFormat::Bincode => bincode::serialize_into(&mut f, snapshot)?,
    }
    f.flush()?;
    tracing::debug!(root = %paths.root.display(), ?format, "saved snapshot");
    Ok(())
}

pub fn load_snapshot_as<D>(paths: &IndexPaths, format: SnapshotFormat) -> Result<IndexSnapshot<D>>
where
    D: Hash + Eq + DeserializeOwned,
{
    let f = BufReader::new(File::open(paths.snapshot(format))?);
    let snapshot = match format {
        SnapshotFormat::Json => serde_json::from_reader(f)?,
        SnapshotFormat::Bincode => bincode::deserialize_from(f)?,
    };
    Ok(snapshot)
}

/// Loads the snapshot in whatever format `meta.json` records.
pub fn load_snapshot<D>(paths: &IndexPaths) -> Result<(IndexSnapshot<D>, MetaFile)>
where
    D: Hash + Eq + DeserializeOwned,
{
    let meta = load_meta(paths)?;
    if meta.version > META_VERSION {
        bail!("unsupported index version {} (expected <= {})", meta.version, META_VERSION);
    }
    let snapshot = load_snapshot_as(paths, meta.format)?;
    Ok((snapshot, meta))
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Writes `index.to_dict()` plus a `meta.json` sidecar stamped with `created_at`.
pub fn save_index<D>(paths: &IndexPaths, index: &BooleanIndex<D>, format: SnapshotFormat, created_at: String) -> Result<()>
where
    D: Hash + Eq + Clone + Serialize,
{
    save_snapshot(paths, &index.to_dict(), format)?;
    let meta = MetaFile {
        num_docs: index.num_documents() as u32,
        num_terms: index.num_terms() as u32,
        created_at,
        version: META_VERSION,
        format,
    };
    save_meta(paths, &meta)
}

/// Reads an index directory back through `from_dict`.
pub fn load_index<D>(paths: &IndexPaths) -> Result<BooleanIndex<D>>
where
    D: Hash + Eq + Clone + DeserializeOwned,
{
    let (snapshot, meta) = load_snapshot(paths)?;
    let mut index = BooleanIndex::new();
    index.from_dict(snapshot);
    tracing::debug!(root = %paths.root.display(), num_docs = meta.num_docs, num_terms = meta.num_terms, "loaded index");
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn meta_round_trip() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        let meta = MetaFile { num_docs: 3, num_terms: 4, created_at: "2024-01-01T00:00:00Z".into(), version: 1, format: SnapshotFormat::Bincode };
        save_meta(&paths, &meta).unwrap();
        let back = load_meta(&paths).unwrap();
        assert_eq!(back.num_docs, 3);
        assert_eq!(back.num_terms, 4);
        assert_eq!(back.format, SnapshotFormat::Bincode);
    }

    #[test]
    fn rejects_newer_versions() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        let meta = MetaFile { num_docs: 0, num_terms: 0, created_at: String::new(), version: META_VERSION + 1, format: SnapshotFormat::Json };
        save_meta(&paths, &meta).unwrap();
        save_snapshot(&paths, &IndexSnapshot::<u32>::default(), SnapshotFormat::Json).unwrap();
        assert!(load_snapshot::<u32>(&paths).is_err());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path().join("nope"));
        assert!(load_index::<u32>(&paths).is_err());
    }
}
