use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, warn};

use super::{Extractor, ExtractedSizing, RawSizeRecord};
use crate::model::{Intl, SizeRecord, ThreadMetadata};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RejectReason {
    MissingField,
    SizeMismatch,
    NoSizeExtracted,
    EmptyManufacturerLast,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::MissingField => "missing_field",
            RejectReason::SizeMismatch => "size_mismatch",
            RejectReason::NoSizeExtracted => "no_size_extracted",
            RejectReason::EmptyManufacturerLast => "empty_manufacturer_last",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sizing {
    pub size: f64,
    pub width: Option<String>,
    pub intl: Option<Intl>,
}

pub fn validate_extracted(
    post: ExtractedSizing,
    pre: ExtractedSizing,
) -> std::result::Result<Sizing, RejectReason> {
    if post.size != pre.size {
        warn!(
            post_size = ?post.size,
            precedes_size = ?pre.size,
            "match strategies disagree on size"
        );
        return Err(RejectReason::SizeMismatch);
    }

    let chosen = if post.intl.is_none() && pre.intl.is_some() {
        debug!("convention only found by precedes_match, using its result");
        pre
    } else {
        post
    };

    let size = chosen
        .size
        .as_deref()
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|size| size.is_finite() && *size != 0.0)
        .ok_or(RejectReason::NoSizeExtracted)?;

    Ok(Sizing {
        size,
        width: chosen.width,
        intl: chosen.intl.and_then(|raw| raw.parse().ok()),
    })
}

pub fn reconcile_intl(size: f64, intl: Option<Intl>, eu_threshold: f64) -> Option<Intl> {
    let is_eu = size >= eu_threshold;

    if is_eu && intl != Some(Intl::Eu) {
        warn!(size, intl = ?intl, "size is only valid as EU, overriding convention");
        return Some(Intl::Eu);
    }

    if !is_eu && intl == Some(Intl::Eu) {
        debug!(size, "size is too small for EU, dropping convention");
        return None;
    }

    intl
}

#[derive(Debug)]
pub struct ManufacturerLastCleaner {
    ampersand: Regex,
    parens: Regex,
    unknown_last: Regex,
    trailing_last: Regex,
    spaces: Regex,
}

impl ManufacturerLastCleaner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            ampersand: Regex::new(r"(?i)&(?:amp;){1,2}")
                .context("failed to compile ampersand entity regex")?,
            parens: Regex::new(r"\(.*\)").context("failed to compile parenthesis regex")?,
            unknown_last: Regex::new(r"(?i)unknown last\s*$")
                .context("failed to compile unknown last regex")?,
            trailing_last: Regex::new(r"(?i)last\s*$")
                .context("failed to compile trailing last regex")?,
            spaces: Regex::new(r"\s+").context("failed to compile whitespace regex")?,
        })
    }

    pub fn clean(&self, mlast: &str) -> String {
        let cleaned = self.ampersand.replace_all(mlast, "&");
        let cleaned = self.parens.replace_all(&cleaned, "");
        let cleaned = self.unknown_last.replace(&cleaned, "");
        let cleaned = self.trailing_last.replace(&cleaned, "");
        let cleaned = self.spaces.replace_all(&cleaned, " ");
        cleaned.trim().to_string()
    }
}

impl Extractor {
    pub fn clean_manufacturer_last(&self, mlast: &str) -> String {
        self.cleaner.clean(mlast)
    }

    pub fn process_size_record(
        &self,
        record: RawSizeRecord,
        thread: &ThreadMetadata,
    ) -> std::result::Result<SizeRecord, RejectReason> {
        let (Some(raw_mlast), Some(text)) = (record.mlast, record.text) else {
            warn!(record_id = %record.id, "size record is missing its last or text");
            return Err(RejectReason::MissingField);
        };

        let post = self.matcher.post_match(&text);
        let pre = self.matcher.precedes_match(&text);
        let sizing = validate_extracted(post, pre).inspect_err(|_| {
            warn!(record_id = %record.id, text = %text, "failed to extract a size");
        })?;

        let intl = reconcile_intl(sizing.size, sizing.intl, self.config.eu_threshold);

        let mlast = self.clean_manufacturer_last(&raw_mlast);
        if mlast.is_empty() {
            warn!(record_id = %record.id, mlast = %raw_mlast, "cleaning left an empty last");
            return Err(RejectReason::EmptyManufacturerLast);
        }

        Ok(SizeRecord {
            thread: thread.clone(),
            parent_id: record.parent_id,
            brannock_size: record.brannock_size,
            id: record.id,
            mlast,
            text,
            size: sizing.size,
            width: sizing
                .width
                .unwrap_or_else(|| self.config.default_width.clone()),
            intl: intl.unwrap_or(self.config.default_intl),
        })
    }
}
