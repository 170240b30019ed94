use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::brannock::BrannockSize;
use crate::extract::ExtractionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Intl {
    #[serde(rename = "US")]
    Us,
    #[serde(rename = "UK")]
    Uk,
    #[serde(rename = "EU")]
    Eu,
}

impl Intl {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Us => "US",
            Self::Uk => "UK",
            Self::Eu => "EU",
        }
    }
}

impl fmt::Display for Intl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intl {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "US" => Ok(Self::Us),
            "UK" => Ok(Self::Uk),
            "EU" | "EUR" => Ok(Self::Eu),
            _ => bail!("unknown sizing convention: '{value}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadMetadata {
    pub thread_id: String,
    pub thread_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeRecord {
    #[serde(flatten)]
    pub thread: ThreadMetadata,
    pub parent_id: String,
    pub brannock_size: BrannockSize,
    pub id: String,
    pub mlast: String,
    pub text: String,
    pub size: f64,
    pub width: String,
    pub intl: Intl,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractCounts {
    pub size_thread_count: usize,
    pub raw_record_count: usize,
    pub record_count: usize,
    pub rejected_count: usize,
    pub rejected_by_reason: BTreeMap<String, usize>,
    pub size_count: usize,
    pub mlast_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub started_at: String,
    pub completed_at: String,
    pub source_path: String,
    pub source_sha256: String,
    pub records_path: Option<String>,
    pub thread: ThreadMetadata,
    pub thread_created_at: Option<String>,
    pub config: ExtractionConfig,
    pub counts: ExtractCounts,
}
