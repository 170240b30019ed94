use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

pub const LISTING_KIND: &str = "Listing";
pub const COMMENT_KIND: &str = "t1";
pub const POST_KIND: &str = "t3";

#[derive(Debug, Deserialize)]
struct RawThing {
    kind: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct RawListingData {
    #[serde(default)]
    children: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawCommentData {
    author: Option<String>,
    body: Option<String>,
    selftext: Option<String>,
    id: String,
    created_utc: Option<f64>,
    parent_id: Option<String>,
    url: Option<String>,
    #[serde(default)]
    replies: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Comment,
    Post,
}

impl CommentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CommentKind::Comment => COMMENT_KIND,
            CommentKind::Post => POST_KIND,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub children: Vec<Comment>,
}

impl Listing {
    pub fn from_value(value: Value) -> Result<Self> {
        let thing: RawThing =
            serde_json::from_value(value).context("listing is not a kind/data object")?;
        if thing.kind != LISTING_KIND {
            bail!("expected '{LISTING_KIND}', got '{}' instead", thing.kind);
        }

        let data: RawListingData =
            serde_json::from_value(thing.data).context("malformed listing data")?;

        let children = data
            .children
            .into_iter()
            .enumerate()
            .map(|(index, child)| {
                Comment::from_value(child)
                    .with_context(|| format!("invalid listing child at index {index}"))
            })
            .collect::<Result<Vec<Comment>>>()?;

        Ok(Self { children })
    }
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub kind: CommentKind,
    pub author: String,
    pub body: Option<String>,
    pub id: String,
    pub created_utc: Option<DateTime<Utc>>,
    pub parent_id: Option<String>,
    pub url: Option<String>,
    pub replies: Option<Listing>,
}

impl Comment {
    pub fn from_value(value: Value) -> Result<Self> {
        let thing: RawThing =
            serde_json::from_value(value).context("comment is not a kind/data object")?;
        let kind = match thing.kind.as_str() {
            COMMENT_KIND => CommentKind::Comment,
            POST_KIND => CommentKind::Post,
            other => bail!("expected '{COMMENT_KIND}' or '{POST_KIND}', got '{other}' instead"),
        };

        let data: RawCommentData = serde_json::from_value(thing.data)
            .with_context(|| format!("malformed '{}' data", kind.as_str()))?;

        let replies = match data.replies {
            Value::Null => None,
            Value::String(text) if text.is_empty() => None,
            value @ Value::Object(_) => Some(
                Listing::from_value(value)
                    .with_context(|| format!("invalid replies for comment {}", data.id))?,
            ),
            other => bail!("unexpected replies value for comment {}: {other}", data.id),
        };

        let body = non_empty(data.selftext).or_else(|| non_empty(data.body));

        Ok(Self {
            kind,
            author: data.author.unwrap_or_default(),
            body,
            created_utc: data.created_utc.and_then(timestamp_to_utc),
            parent_id: data.parent_id,
            url: data.url,
            replies,
            id: data.id,
        })
    }

    pub fn has_replies(&self) -> bool {
        self.replies.is_some()
    }

    pub fn reply_comments(&self) -> &[Comment] {
        self.replies
            .as_ref()
            .map(|listing| listing.children.as_slice())
            .unwrap_or_default()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.is_empty())
}

fn timestamp_to_utc(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }

    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1_000_000_000.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}

#[derive(Debug, Clone)]
pub struct Thread {
    pub op: Listing,
    pub main_thread: Listing,
}

impl Thread {
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Array(listings) = value else {
            bail!("thread snapshot must be a JSON array of two listings");
        };

        let [op, main_thread]: [Value; 2] = listings.try_into().map_err(|listings: Vec<Value>| {
            anyhow::anyhow!(
                "thread snapshot must hold exactly two listings, found {}",
                listings.len()
            )
        })?;

        Ok(Self {
            op: Listing::from_value(op).context("invalid original post listing")?,
            main_thread: Listing::from_value(main_thread).context("invalid main thread listing")?,
        })
    }

    pub fn from_slice(raw: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(raw).context("thread snapshot is not JSON")?;
        Self::from_value(value)
    }

    pub fn original_post(&self) -> Result<&Comment> {
        self.op
            .children
            .first()
            .context("original post listing is empty")
    }
}
