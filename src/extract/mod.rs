use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::brannock::BrannockParser;
use crate::model::{Intl, SizeRecord, ThreadMetadata};
use crate::thread::Thread;

mod matcher;
mod normalize;
mod postprocess;
mod walker;

use matcher::{ExtractedSizing, SizingMatcher};
use normalize::MarkdownNormalizer;
use postprocess::{ManufacturerLastCleaner, RejectReason};
use walker::{RawSizeRecord, size_threads};

pub const DEFAULT_EU_THRESHOLD: f64 = 33.5;
pub const DEFAULT_INTL: Intl = Intl::Us;
pub const DEFAULT_WIDTH: &str = "D";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionConfig {
    pub eu_threshold: f64,
    pub default_intl: Intl,
    pub default_width: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            eu_threshold: DEFAULT_EU_THRESHOLD,
            default_intl: DEFAULT_INTL,
            default_width: DEFAULT_WIDTH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionStats {
    pub size_thread_count: usize,
    pub raw_record_count: usize,
    pub rejected: BTreeMap<RejectReason, usize>,
}

impl ExtractionStats {
    pub fn rejected_count(&self) -> usize {
        self.rejected.values().sum()
    }

    pub fn rejected_by_reason(&self) -> BTreeMap<String, usize> {
        self.rejected
            .iter()
            .map(|(reason, count)| (reason.as_str().to_string(), *count))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub thread: ThreadMetadata,
    pub thread_created_at: Option<DateTime<Utc>>,
    pub records: Vec<SizeRecord>,
    pub stats: ExtractionStats,
}

#[derive(Debug)]
pub struct Extractor {
    config: ExtractionConfig,
    brannock: BrannockParser,
    normalizer: MarkdownNormalizer,
    matcher: SizingMatcher,
    cleaner: ManufacturerLastCleaner,
}

impl Extractor {
    pub fn new(config: ExtractionConfig) -> Result<Self> {
        Ok(Self {
            config,
            brannock: BrannockParser::new()?,
            normalizer: MarkdownNormalizer::new()?,
            matcher: SizingMatcher::new()?,
            cleaner: ManufacturerLastCleaner::new()?,
        })
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn extract(&self, thread: &Thread) -> Result<Extraction> {
        let op = thread.original_post()?;
        let metadata = ThreadMetadata {
            thread_id: op.id.clone(),
            thread_url: op.url.clone(),
        };

        let size_threads = size_threads(thread)?;
        let raw_records = self
            .walk_size_threads(&size_threads)
            .with_context(|| format!("failed to walk size threads of {}", metadata.thread_id))?;

        let mut stats = ExtractionStats {
            size_thread_count: size_threads.len(),
            raw_record_count: raw_records.len(),
            ..ExtractionStats::default()
        };

        let mut records = Vec::with_capacity(raw_records.len());
        for raw in raw_records {
            match self.process_size_record(raw, &metadata) {
                Ok(record) => records.push(record),
                Err(reason) => *stats.rejected.entry(reason).or_default() += 1,
            }
        }

        info!(
            thread_id = %metadata.thread_id,
            size_threads = stats.size_thread_count,
            raw_records = stats.raw_record_count,
            records = records.len(),
            rejected = stats.rejected_count(),
            "extracted size records"
        );

        Ok(Extraction {
            thread: metadata,
            thread_created_at: op.created_utc,
            records,
            stats,
        })
    }
}
