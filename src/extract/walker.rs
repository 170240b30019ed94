use anyhow::{Context, Result};
use tracing::debug;

use super::Extractor;
use crate::brannock::BrannockSize;
use crate::thread::{Comment, CommentKind, Thread};

#[derive(Debug, Clone, PartialEq)]
pub struct RawSizeRecord {
    pub parent_id: String,
    pub brannock_size: BrannockSize,
    pub id: String,
    pub mlast: Option<String>,
    pub text: Option<String>,
}

pub fn size_threads(thread: &Thread) -> Result<Vec<&Comment>> {
    let author = thread
        .original_post()
        .context("cannot determine the thread author")?
        .author
        .as_str();

    Ok(thread
        .main_thread
        .children
        .iter()
        .filter(|comment| comment.kind == CommentKind::Comment)
        .filter(|comment| comment.author == author)
        .filter(|comment| comment.has_replies())
        .collect())
}

impl Extractor {
    pub fn extract_size_records(&self, size_thread: &Comment) -> Result<Vec<RawSizeRecord>> {
        let brannock_size = self.brannock.from_comment(size_thread)?;

        let mut records = Vec::new();
        for response in size_thread.reply_comments() {
            let Some(body) = response.body.as_deref() else {
                continue;
            };

            let pairs = self.normalizer.size_pairs(body);
            debug!(
                response_id = %response.id,
                parent_id = response.parent_id.as_deref().unwrap_or_default(),
                pairs = pairs.len(),
                "read size response"
            );

            for (mlast, text) in pairs {
                records.push(RawSizeRecord {
                    parent_id: size_thread.id.clone(),
                    brannock_size: brannock_size.clone(),
                    id: response.id.clone(),
                    mlast: Some(mlast),
                    text: Some(text),
                });
            }
        }

        Ok(records)
    }

    pub fn walk_size_threads(&self, size_threads: &[&Comment]) -> Result<Vec<RawSizeRecord>> {
        let mut records = Vec::new();
        for size_thread in size_threads {
            records.extend(self.extract_size_records(size_thread)?);
        }
        Ok(records)
    }
}
