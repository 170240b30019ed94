use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use tracing::info;

use crate::cli::ExtractArgs;
use crate::extract::Extractor;
use crate::loader::{LoadedSnapshot, load_and_extract};
use crate::model::{ExtractCounts, ExtractRunManifest};
use crate::store::DataStore;
use crate::util::{now_utc_string, utc_compact_string, write_json_pretty};

pub fn run(args: ExtractArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("extract-{}", utc_compact_string(started_ts));

    let extractor = Extractor::new(args.extraction.to_config())?;
    info!(source = %args.source.display(), run_id = %run_id, "starting extract");

    let snapshot = load_and_extract(&args.source, &extractor)?;
    let counts = build_counts(&snapshot);

    if args.dry_run {
        info!(
            records = counts.record_count,
            rejected = counts.rejected_count,
            sizes = counts.size_count,
            mlasts = counts.mlast_count,
            "extract dry-run complete"
        );
        return Ok(());
    }

    let records_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_records_path(&args.source));
    let manifest_path = args
        .manifest_path
        .clone()
        .unwrap_or_else(|| default_manifest_path(&args.source));

    write_json_pretty(&records_path, &snapshot.records)?;
    info!(path = %records_path.display(), records = counts.record_count, "wrote size records");

    let manifest = ExtractRunManifest {
        manifest_version: 1,
        run_id,
        started_at,
        completed_at: now_utc_string(),
        source_path: args.source.display().to_string(),
        source_sha256: snapshot.sha256.clone(),
        records_path: Some(records_path.display().to_string()),
        thread: snapshot.thread.clone(),
        thread_created_at: snapshot
            .thread_created_at
            .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true)),
        config: extractor.config().clone(),
        counts,
    };

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote extract run manifest");

    Ok(())
}

fn build_counts(snapshot: &LoadedSnapshot) -> ExtractCounts {
    let store = DataStore::new(snapshot.records.iter().cloned());

    ExtractCounts {
        size_thread_count: snapshot.stats.size_thread_count,
        raw_record_count: snapshot.stats.raw_record_count,
        record_count: snapshot.records.len(),
        rejected_count: snapshot.stats.rejected_count(),
        rejected_by_reason: snapshot.stats.rejected_by_reason(),
        size_count: store.sizes().len(),
        mlast_count: store.mlasts().len(),
    }
}

fn default_records_path(source: &Path) -> PathBuf {
    source.with_extension("records.json")
}

fn default_manifest_path(source: &Path) -> PathBuf {
    source.with_extension("manifest.json")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::Value;
    use tempfile::TempDir;

    use super::*;
    use crate::cli::ExtractionOptions;
    use crate::extract::{DEFAULT_EU_THRESHOLD, DEFAULT_WIDTH};
    use crate::model::Intl;

    const SNAPSHOT: &str = r###"[
      {"kind": "Listing", "data": {"children": [
        {"kind": "t3", "data": {"author": "op_author", "selftext": "Sizes below", "id": "5ibtzh",
          "created_utc": 1481500000.0,
          "url": "https://www.reddit.com/r/goodyearwelt/comments/5ibtzh/"}}
      ]}},
      {"kind": "Listing", "data": {"children": [
        {"kind": "t1", "data": {"author": "op_author", "body": "##**Brannock:** 9.5D", "id": "st1",
          "replies": {"kind": "Listing", "data": {"children": [
            {"kind": "t1", "data": {"author": "a", "id": "r1", "replies": "",
              "body": "* Alden Barrie: 9D\n* Viberg 2030: 8.5 UK\n* Truman: fits great"}}
          ]}}}}
      ]}}
    ]"###;

    fn extract_args(source: PathBuf, dry_run: bool) -> ExtractArgs {
        ExtractArgs {
            source,
            output: None,
            manifest_path: None,
            dry_run,
            extraction: ExtractionOptions {
                eu_threshold: DEFAULT_EU_THRESHOLD,
                default_intl: Intl::Us,
                default_width: DEFAULT_WIDTH.to_string(),
            },
        }
    }

    #[test]
    fn default_paths_sit_next_to_the_source() {
        let source = Path::new("data/last_sizing_thread.json");
        assert_eq!(
            default_records_path(source),
            PathBuf::from("data/last_sizing_thread.records.json")
        );
        assert_eq!(
            default_manifest_path(source),
            PathBuf::from("data/last_sizing_thread.manifest.json")
        );
    }

    #[test]
    fn run_writes_records_and_manifest() {
        let dir = TempDir::new().expect("temp dir");
        let source = dir.path().join("thread.json");
        fs::write(&source, SNAPSHOT).expect("fixture written");

        run(extract_args(source.clone(), false)).expect("extract succeeds");

        let records: Value = serde_json::from_slice(
            &fs::read(default_records_path(&source)).expect("records written"),
        )
        .expect("records are json");
        let records = records.as_array().expect("records array");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["brannockSize"], "9.5D");
        assert_eq!(records[0]["mlast"], "Alden Barrie");
        assert_eq!(records[0]["threadId"], "5ibtzh");
        assert_eq!(records[1]["intl"], "UK");

        let manifest: Value = serde_json::from_slice(
            &fs::read(default_manifest_path(&source)).expect("manifest written"),
        )
        .expect("manifest is json");
        assert_eq!(manifest["counts"]["raw_record_count"], 3);
        assert_eq!(manifest["counts"]["record_count"], 2);
        assert_eq!(manifest["counts"]["rejected_by_reason"]["no_size_extracted"], 1);
        assert_eq!(manifest["source_sha256"].as_str().map(str::len), Some(64));
        assert_eq!(manifest["thread_created_at"], "2016-12-11T23:46:40Z");
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = TempDir::new().expect("temp dir");
        let source = dir.path().join("thread.json");
        fs::write(&source, SNAPSHOT).expect("fixture written");

        run(extract_args(source.clone(), true)).expect("extract succeeds");

        assert!(!default_records_path(&source).exists());
        assert!(!default_manifest_path(&source).exists());
    }
}
