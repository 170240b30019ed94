use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::thread::Comment;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Width {
    Code(String),
    Narrow,
    Wide,
}

impl Width {
    pub fn sort_key(&self) -> &str {
        match self {
            Width::Code(code) => code,
            Width::Narrow => "NARROW",
            Width::Wide => "WIDE",
        }
    }
}

impl FromStr for Width {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let upper = value.trim().to_ascii_uppercase();
        match upper.as_str() {
            "NARROW" => Ok(Width::Narrow),
            "WIDE" => Ok(Width::Wide),
            code if (1..=3).contains(&code.len())
                && code.chars().all(|ch| ch.is_ascii_alphabetic()) =>
            {
                Ok(Width::Code(code.to_string()))
            }
            _ => bail!("invalid Brannock width: '{value}'"),
        }
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Width::Code(code) => f.write_str(code),
            Width::Narrow => f.write_str("Narrow"),
            Width::Wide => f.write_str("Wide"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BrannockSize {
    half_sizes: u16,
    width: Width,
}

impl BrannockSize {
    pub fn new(size: &str, width: &str) -> Result<Self> {
        Ok(Self {
            half_sizes: parse_half_sizes(size)?,
            width: width.parse()?,
        })
    }
}

fn parse_half_sizes(value: &str) -> Result<u16> {
    let trimmed = value.trim();
    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, "0"));

    let whole = whole
        .parse::<u16>()
        .with_context(|| format!("invalid Brannock length: '{value}'"))?;
    let half = match fraction {
        "0" => 0,
        "5" => 1,
        _ => bail!("Brannock length is not a half size: '{value}'"),
    };

    whole
        .checked_mul(2)
        .and_then(|doubled| doubled.checked_add(half))
        .with_context(|| format!("Brannock length out of range: '{value}'"))
}

impl fmt::Display for BrannockSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.half_sizes / 2;
        let length = if self.half_sizes % 2 == 0 {
            whole.to_string()
        } else {
            format!("{whole}.5")
        };

        match self.width {
            Width::Code(_) => write!(f, "{length}{}", self.width),
            Width::Narrow | Width::Wide => write!(f, "{length} {}", self.width),
        }
    }
}

impl FromStr for BrannockSize {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let split = trimmed
            .find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
            .unwrap_or(trimmed.len());
        let (length, width) = trimmed.split_at(split);

        if length.is_empty() {
            bail!("Brannock size has no length: '{value}'");
        }

        Self::new(length, width).with_context(|| format!("invalid Brannock size: '{value}'"))
    }
}

impl Ord for BrannockSize {
    fn cmp(&self, other: &Self) -> Ordering {
        self.half_sizes
            .cmp(&other.half_sizes)
            .then_with(|| self.width.sort_key().cmp(other.width.sort_key()))
    }
}

impl PartialOrd for BrannockSize {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for BrannockSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BrannockSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug)]
pub struct BrannockParser {
    comment_size: Regex,
}

impl BrannockParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            comment_size: Regex::new(r"(?i)([0-9]{1,2}(?:\.5)?)\s*(narrow|wide|[a-z]{1,3})")
                .context("failed to compile Brannock size regex")?,
        })
    }

    pub fn from_comment(&self, comment: &Comment) -> Result<BrannockSize> {
        let body = comment
            .body
            .as_deref()
            .with_context(|| format!("size thread {} has no body", comment.id))?;

        let captures = self
            .comment_size
            .captures(body)
            .with_context(|| format!("no Brannock size in size thread {}", comment.id))?;

        let length = captures.get(1).map(|m| m.as_str()).context("missing length capture")?;
        let width = captures.get(2).map(|m| m.as_str()).context("missing width capture")?;

        BrannockSize::new(length, width)
            .with_context(|| format!("invalid Brannock size in size thread {}", comment.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread::CommentKind;

    fn comment_with_body(body: Option<&str>) -> Comment {
        Comment {
            kind: CommentKind::Comment,
            author: "op".to_string(),
            body: body.map(ToOwned::to_owned),
            id: "abc123".to_string(),
            created_utc: None,
            parent_id: None,
            url: None,
            replies: None,
        }
    }

    #[test]
    fn new_uppercases_width_codes() {
        let size = BrannockSize::new("8.5", "d").expect("valid size");
        assert_eq!(size.half_sizes, 17);
        assert_eq!(size.width, Width::Code("D".to_string()));
    }

    #[test]
    fn display_separates_descriptive_widths_only() {
        let cases = [
            ("8", "D", "8D"),
            ("8.5", "D", "8.5D"),
            ("10.5", "EEE", "10.5EEE"),
            ("10.5", "NARROW", "10.5 Narrow"),
            ("10.5", "wide", "10.5 Wide"),
        ];

        for (length, width, expected) in cases {
            let size = BrannockSize::new(length, width).expect("valid size");
            assert_eq!(size.to_string(), expected);
        }
    }

    #[test]
    fn canonical_strings_round_trip() {
        for raw in ["8D", "8.5D", "10D", "10.5D", "10.5 Narrow", "10.5 Wide", "12EE"] {
            let size: BrannockSize = raw.parse().expect("valid size");
            let reparsed: BrannockSize = size.to_string().parse().expect("round trip");
            assert_eq!(reparsed, size);
            assert_eq!(reparsed.to_string(), raw);
        }
    }

    #[test]
    fn from_str_rejects_garbage() {
        assert!("".parse::<BrannockSize>().is_err());
        assert!("D".parse::<BrannockSize>().is_err());
        assert!("10".parse::<BrannockSize>().is_err());
        assert!("8.2D".parse::<BrannockSize>().is_err());
        assert!("10 Medium".parse::<BrannockSize>().is_err());
    }

    #[test]
    fn ordering_is_length_then_width() {
        let mut sizes = ["10E", "9C", "10D", "8.5 Wide", "8.5 Narrow", "8.5D"]
            .iter()
            .map(|raw| raw.parse::<BrannockSize>().expect("valid size"))
            .collect::<Vec<_>>();
        sizes.sort();

        let rendered = sizes.iter().map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(
            rendered,
            vec!["8.5D", "8.5 Narrow", "8.5 Wide", "9C", "10D", "10E"]
        );
    }

    #[test]
    fn from_comment_reads_first_size_in_body() {
        let parser = BrannockParser::new().expect("regex compiles");
        let cases = [
            ("##**Brannock:** 8.5D", "8.5D"),
            ("#8.5D", "8.5D"),
            ("#8.5 Narrow", "8.5 Narrow"),
            ("#8.5 Wide", "8.5 Wide"),
            ("##**Brannock:** 11D\n\nAlso tried 12E", "11D"),
        ];

        for (body, expected) in cases {
            let size = parser
                .from_comment(&comment_with_body(Some(body)))
                .expect("size in body");
            assert_eq!(size.to_string(), expected);
        }
    }

    #[test]
    fn from_comment_fails_without_body_or_match() {
        let parser = BrannockParser::new().expect("regex compiles");
        assert!(parser.from_comment(&comment_with_body(None)).is_err());
        assert!(
            parser
                .from_comment(&comment_with_body(Some("Thanks for the replies!")))
                .is_err()
        );
    }

    #[test]
    fn serializes_as_canonical_string() {
        let size: BrannockSize = "9.5 Wide".parse().expect("valid size");
        let json = serde_json::to_string(&size).expect("serializes");
        assert_eq!(json, "\"9.5 Wide\"");

        let back: BrannockSize = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, size);
    }
}
