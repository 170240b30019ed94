use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::extract::{ExtractionStats, Extractor};
use crate::model::{SizeRecord, ThreadMetadata};
use crate::store::DataStore;
use crate::thread::Thread;
use crate::util::sha256_bytes;

#[derive(Debug, Clone)]
pub struct LoadedSnapshot {
    pub source: PathBuf,
    pub sha256: String,
    pub thread: ThreadMetadata,
    pub thread_created_at: Option<DateTime<Utc>>,
    pub records: Vec<SizeRecord>,
    pub stats: ExtractionStats,
}

pub fn load_and_extract(source: &Path, extractor: &Extractor) -> Result<LoadedSnapshot> {
    let raw = fs::read(source).with_context(|| format!("failed to read {}", source.display()))?;
    let thread = Thread::from_slice(&raw)
        .with_context(|| format!("failed to parse thread snapshot {}", source.display()))?;
    let sha256 = sha256_bytes(&raw);

    let extraction = extractor
        .extract(&thread)
        .with_context(|| format!("failed to extract size records from {}", source.display()))?;

    info!(
        source = %source.display(),
        sha256 = %sha256,
        records = extraction.records.len(),
        "loaded thread snapshot"
    );

    Ok(LoadedSnapshot {
        source: source.to_path_buf(),
        sha256,
        thread: extraction.thread,
        thread_created_at: extraction.thread_created_at,
        records: extraction.records,
        stats: extraction.stats,
    })
}

// Snapshots never change while the process runs, so entries are never invalidated.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    entries: HashMap<PathBuf, Rc<LoadedSnapshot>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(
        &mut self,
        source: &Path,
        extractor: &Extractor,
    ) -> Result<Rc<LoadedSnapshot>> {
        if let Some(snapshot) = self.entries.get(source) {
            debug!(source = %source.display(), "snapshot cache hit");
            return Ok(Rc::clone(snapshot));
        }

        let snapshot = Rc::new(load_and_extract(source, extractor)?);
        self.entries.insert(source.to_path_buf(), Rc::clone(&snapshot));
        Ok(snapshot)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

pub fn load_store(
    sources: &[PathBuf],
    extractor: &Extractor,
    cache: &mut SnapshotCache,
) -> Result<DataStore> {
    let mut snapshots = Vec::<Rc<LoadedSnapshot>>::with_capacity(sources.len());
    for source in sources {
        let snapshot = cache.get_or_load(source, extractor)?;
        if snapshots.iter().any(|seen| Rc::ptr_eq(seen, &snapshot)) {
            debug!(source = %source.display(), "source already indexed");
            continue;
        }
        snapshots.push(snapshot);
    }

    for snapshot in &snapshots {
        info!(
            source = %snapshot.source.display(),
            thread_id = %snapshot.thread.thread_id,
            records = snapshot.records.len(),
            "indexing snapshot"
        );
    }

    Ok(DataStore::new(
        snapshots
            .iter()
            .flat_map(|snapshot| snapshot.records.iter().cloned()),
    ))
}
