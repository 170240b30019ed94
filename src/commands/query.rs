use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::QueryArgs;
use crate::display::{format_tag_size, record_comment_url, sort_for_display};
use crate::extract::Extractor;
use crate::loader::{SnapshotCache, load_store};
use crate::model::SizeRecord;
use crate::store::DataStore;

pub fn run(args: QueryArgs) -> Result<()> {
    let extractor = Extractor::new(args.extraction.to_config())?;
    let mut cache = SnapshotCache::new();
    let store = load_store(&args.sources, &extractor, &mut cache)?;
    if store.is_empty() {
        warn!(sources = args.sources.len(), "no size records in any source");
    }

    let mut records = select_records(&store, args.size.as_deref(), args.mlast.as_deref());
    sort_for_display(&mut records);

    info!(
        sources = cache.len(),
        size = %args.size.as_deref().unwrap_or_default(),
        mlast = %args.mlast.as_deref().unwrap_or_default(),
        returned = records.len(),
        "query complete"
    );

    let mut output = io::BufWriter::new(io::stdout().lock());
    if args.json {
        serde_json::to_writer_pretty(&mut output, &records)
            .context("failed to serialize query json output")?;
        writeln!(output)?;
    } else {
        write_text_response(&mut output, &records)?;
    }
    output.flush()?;

    Ok(())
}

fn select_records<'a>(
    store: &'a DataStore,
    size: Option<&str>,
    mlast: Option<&str>,
) -> Vec<&'a SizeRecord> {
    match (size, mlast) {
        (Some(size), _) => store.by_size(size),
        (None, Some(mlast)) => store.by_mlast(mlast),
        (None, None) => store.all(),
    }
}

fn write_text_response(output: &mut impl Write, records: &[&SizeRecord]) -> Result<()> {
    writeln!(output, "Results: {}", records.len())?;

    for (index, record) in records.iter().enumerate() {
        writeln!(
            output,
            "{}. [{}] {} => {} {}",
            index + 1,
            record.brannock_size,
            record.mlast,
            format_tag_size(record.size, &record.width),
            record.intl
        )?;
        if let Some(url) = record_comment_url(record) {
            writeln!(output, "\tcomment: {url}")?;
        }
        writeln!(output, "\ttext: {}", record.text)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Intl, ThreadMetadata};

    fn record(brannock_size: &str, mlast: &str, size: f64) -> SizeRecord {
        SizeRecord {
            thread: ThreadMetadata {
                thread_id: "5ibtzh".to_string(),
                thread_url: Some("https://www.reddit.com/r/goodyearwelt/comments/5ibtzh/".to_string()),
            },
            parent_id: "st1".to_string(),
            brannock_size: brannock_size.parse().expect("valid size"),
            id: "r1".to_string(),
            mlast: mlast.to_string(),
            text: format!("{size}"),
            size,
            width: "D".to_string(),
            intl: Intl::Us,
        }
    }

    fn store() -> DataStore {
        DataStore::new(vec![
            record("10D", "Red Wing", 9.5),
            record("9D", "Alden", 8.5),
            record("10D", "Alden", 10.0),
        ])
    }

    #[test]
    fn select_records_prefers_size_then_mlast_then_all() {
        let store = store();
        assert_eq!(select_records(&store, Some("10D"), Some("Alden")).len(), 2);
        assert_eq!(select_records(&store, None, Some("Alden")).len(), 2);
        assert_eq!(select_records(&store, None, None).len(), 3);
        assert!(select_records(&store, Some("unknown-key"), None).is_empty());
    }

    #[test]
    fn text_response_lists_records_with_comment_links() {
        let store = store();
        let mut records = store.all();
        sort_for_display(&mut records);

        let mut output = Vec::new();
        write_text_response(&mut output, &records).expect("text written");
        let text = String::from_utf8(output).expect("utf8 output");

        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "Results: 3");
        assert_eq!(lines[1], "1. [9D] Alden => 8.5D US");
        assert_eq!(
            lines[2],
            "\tcomment: https://www.reddit.com/r/goodyearwelt/comments/5ibtzh/r1"
        );
        assert_eq!(lines[4], "2. [10D] Alden => 10D US");
        assert_eq!(lines[7], "3. [10D] Red Wing => 9.5D US");
    }
}
