use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::extract::Extractor;
use crate::loader::{SnapshotCache, load_store};
use crate::store::{DataStore, KeyCount};

#[derive(Debug, Serialize)]
struct StatusReport {
    record_count: usize,
    sizes: Vec<KeyCount>,
    mlasts: Vec<KeyCount>,
}

pub fn run(args: StatusArgs) -> Result<()> {
    let extractor = Extractor::new(args.extraction.to_config())?;
    let mut cache = SnapshotCache::new();
    let store = load_store(&args.sources, &extractor, &mut cache)?;
    if store.is_empty() {
        warn!(sources = args.sources.len(), "no size records in any source");
    }
    let report = build_report(&store);

    info!(
        sources = cache.len(),
        records = report.record_count,
        sizes = report.sizes.len(),
        mlasts = report.mlasts.len(),
        "status summary"
    );

    let mut output = io::BufWriter::new(io::stdout().lock());
    if args.json {
        serde_json::to_writer_pretty(&mut output, &report)
            .context("failed to serialize status json output")?;
        writeln!(output)?;
    } else {
        write_text_report(&mut output, &report)?;
    }
    output.flush()?;

    Ok(())
}

fn build_report(store: &DataStore) -> StatusReport {
    StatusReport {
        record_count: store.len(),
        sizes: store.size_counts(),
        mlasts: store.mlast_counts(),
    }
}

fn write_text_report(output: &mut impl Write, report: &StatusReport) -> Result<()> {
    writeln!(output, "Records: {}", report.record_count)?;
    writeln!(output, "Brannock sizes: {}", report.sizes.len())?;
    for entry in &report.sizes {
        writeln!(output, "\t{}: {}", entry.key, entry.count)?;
    }
    writeln!(output, "Manufacturer lasts: {}", report.mlasts.len())?;
    for entry in &report.mlasts {
        writeln!(output, "\t{}: {}", entry.key, entry.count)?;
    }
    Ok(())
}
