use tracing::warn;
use url::Url;

use crate::types::{CardModel, RawResult};

/// Map a raw search record onto the card model. Never fails; absent fields stay `None`.
///
/// Each call mints a new `unique_id`, so two normalizations of the same record
/// differ in that field only.
pub fn normalize(raw: &RawResult) -> CardModel {
    CardModel {
        title: or_meta(raw, &raw.title, "t").unwrap_or_default(),
        description: non_empty(raw.description.clone())
            .or_else(|| non_empty(raw.summary.clone()))
            .or_else(|| raw.meta("c")),
        live_url: non_empty(raw.live_url.clone()),
        image_url: or_meta(raw, &raw.image_url, "image"),
        image_alt: or_meta(raw, &raw.image_alt, "imageAlt"),
        taxonomy: or_meta(raw, &raw.taxonomy, "taxonomy"),
        taxonomy_url: or_meta(raw, &raw.taxonomy_url, "taxonomyUrl"),
        kind: or_meta(raw, &raw.kind, "type"),
        date: or_meta(raw, &raw.date, "d"),
        video_url: or_meta(raw, &raw.video_url, "videoUrl"),
        size: non_empty(raw.size.clone()),
        is_teaser: raw.is_teaser.unwrap_or(false),
        unique_id: uuid::Uuid::new_v4().to_string(),
        display_configuration: non_empty(raw.display_configuration.clone()),
    }
}

/// Accepts a bare video id or a YouTube watch/short/embed URL and returns the id.
///
/// Anything else, including URLs on other hosts, yields an empty id so the
/// player origin always comes from the configured base.
pub fn video_id_from(video_url: &str) -> String {
    let trimmed = video_url.trim();
    let id = match Url::parse(trimmed) {
        Ok(url) => youtube_id(&url),
        Err(_) => Some(trimmed.to_string()),
    };
    match id.filter(|id| is_video_id(id)) {
        Some(id) => id,
        None => {
            if !trimmed.is_empty() {
                warn!(video_url = trimmed, "unrecognized video reference");
            }
            String::new()
        }
    }
}

fn youtube_id(url: &Url) -> Option<String> {
    let host = url.host_str().unwrap_or_default().trim_start_matches("www.");
    match host {
        "youtu.be" => url.path_segments()?.next().map(str::to_string),
        "youtube.com" | "m.youtube.com" | "youtube-nocookie.com" => {
            if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "v") {
                return Some(v.into_owned());
            }
            let segments: Vec<&str> = url.path_segments()?.collect();
            match segments.as_slice() {
                ["embed", id, ..] | ["shorts", id, ..] => Some(id.to_string()),
                _ => None,
            }
        }
        _ => None,
    }
}

/// YouTube ids are drawn from the URL-safe base64 alphabet.
fn is_video_id(id: &str) -> bool {
    let allowed = |b: u8| b.is_ascii_alphanumeric() || b == b'-' || b == b'_';
    !id.is_empty() && id.bytes().all(allowed)
}

/// The record's own field when it has text, else the first value of the metadata class `key`.
fn or_meta(raw: &RawResult, field: &Option<String>, key: &str) -> Option<String> {
    non_empty(field.clone()).or_else(|| raw.meta(key))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn story() -> RawResult {
        RawResult {
            title: Some("Campus reopens".into()),
            description: Some("Doors open Monday.".into()),
            live_url: Some("https://news.example.edu/campus".into()),
            image_url: Some("https://news.example.edu/campus.jpg".into()),
            kind: Some("Story".into()),
            date: Some("2024-03-01".into()),
            ..Default::default()
        }
    }

    #[test]
    fn same_record_differs_only_in_unique_id() {
        let raw = story();
        let a = normalize(&raw);
        let mut b = normalize(&raw);
        assert_ne!(a.unique_id, b.unique_id);
        b.unique_id = a.unique_id.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_fields_stay_absent() {
        let card = normalize(&RawResult::default());
        assert_eq!(card.title, "");
        assert!(card.description.is_none());
        assert!(card.image_url.is_none());
        assert!(card.taxonomy.is_none());
        assert!(!card.is_teaser);
        assert!(!card.is_video());
    }

    #[test]
    fn falls_back_to_summary_and_list_metadata() {
        let mut list_metadata = HashMap::new();
        list_metadata.insert("image".to_string(), vec!["/img/a.jpg".to_string()]);
        list_metadata.insert("d".to_string(), vec!["2023-12-24".to_string()]);
        let raw = RawResult {
            title: Some("Holiday hours".into()),
            description: Some("   ".into()),
            summary: Some("Libraries close early.".into()),
            list_metadata,
            ..Default::default()
        };
        let card = normalize(&raw);
        assert_eq!(card.description.as_deref(), Some("Libraries close early."));
        assert_eq!(card.image_url.as_deref(), Some("/img/a.jpg"));
        assert_eq!(card.date.as_deref(), Some("2023-12-24"));
    }

    #[test]
    fn video_ids_are_extracted_from_urls() {
        assert_eq!(video_id_from("abc123"), "abc123");
        assert_eq!(
            video_id_from("https://www.youtube.com/watch?v=abc123&t=4"),
            "abc123"
        );
        assert_eq!(video_id_from("https://youtu.be/abc123"), "abc123");
        assert_eq!(
            video_id_from("https://www.youtube.com/embed/abc123?rel=0"),
            "abc123"
        );
        assert_eq!(video_id_from("https://www.youtube.com/shorts/xyz"), "xyz");
        assert_eq!(video_id_from("  dQw4w9WgXcQ "), "dQw4w9WgXcQ");
    }

    #[test]
    fn foreign_and_malformed_video_references_yield_no_id() {
        for input in [
            "//evil.example/x",
            "https://vimeo.com/123",
            "abc:def",
            "javascript:alert(1)",
            "../../etc",
            "https://www.youtube.com/watch",
            "https://youtu.be/",
            "",
        ] {
            assert_eq!(video_id_from(input), "", "{input:?}");
        }
    }
}
