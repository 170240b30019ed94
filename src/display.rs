use crate::model::SizeRecord;

pub fn format_tag_size(size: f64, width: &str) -> String {
    format!("{size}{width}")
}

pub fn comment_url(thread_url: &str, comment_id: &str) -> String {
    if thread_url.ends_with('/') {
        format!("{thread_url}{comment_id}")
    } else {
        format!("{thread_url}/{comment_id}")
    }
}

pub fn record_comment_url(record: &SizeRecord) -> Option<String> {
    record
        .thread
        .thread_url
        .as_deref()
        .map(|url| comment_url(url, &record.id))
}

pub fn sort_for_display(records: &mut [&SizeRecord]) {
    records.sort_by(|a, b| {
        a.brannock_size
            .cmp(&b.brannock_size)
            .then_with(|| a.mlast.to_lowercase().cmp(&b.mlast.to_lowercase()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Intl, ThreadMetadata};

    fn record(brannock_size: &str, mlast: &str) -> SizeRecord {
        SizeRecord {
            thread: ThreadMetadata {
                thread_id: "5ibtzh".to_string(),
                thread_url: Some("https://reddit.com/r/threadId/comments/".to_string()),
            },
            parent_id: "st1".to_string(),
            brannock_size: brannock_size.parse().expect("valid size"),
            id: "foo".to_string(),
            mlast: mlast.to_string(),
            text: "10D".to_string(),
            size: 10.0,
            width: "D".to_string(),
            intl: Intl::Us,
        }
    }

    #[test]
    fn format_tag_size_drops_trailing_zero() {
        assert_eq!(format_tag_size(10.5, "D"), "10.5D");
        assert_eq!(format_tag_size(10.0, "EE"), "10EE");
    }

    #[test]
    fn comment_url_appends_id_after_one_slash() {
        assert_eq!(
            comment_url("https://reddit.com/r/threadId/comments/", "foo"),
            "https://reddit.com/r/threadId/comments/foo"
        );
        assert_eq!(
            comment_url("https://reddit.com/r/threadId/comments", "foo"),
            "https://reddit.com/r/threadId/comments/foo"
        );
        assert_eq!(
            record_comment_url(&record("10D", "Alden")).as_deref(),
            Some("https://reddit.com/r/threadId/comments/foo")
        );
    }

    #[test]
    fn sort_for_display_orders_by_size_width_then_last() {
        let records = [
            record("10D", "Wolverine"),
            record("10E", "Wolverine"),
            record("10D", "wolverine"),
            record("10D", "Alden"),
            record("9C", "Wolverine"),
        ];
        let mut sorted = records.iter().collect::<Vec<_>>();
        sort_for_display(&mut sorted);

        let keys = sorted
            .iter()
            .map(|record| format!("{} {}", record.brannock_size, record.mlast))
            .collect::<Vec<_>>();
        assert_eq!(
            keys,
            vec![
                "9C Wolverine",
                "10D Alden",
                "10D Wolverine",
                "10D wolverine",
                "10E Wolverine",
            ]
        );
    }
}
