use serde::Serialize;
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use photo_search_api_structs::{PhotoRecord, Timestamp};

pub const NO_LABELS: &str = "No labels";

/// Shown in place of a photo whose image fails to load.
pub const FALLBACK_IMAGE: &str = "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='200' height='200'%3E%3Crect width='200' height='200' fill='%23ddd'/%3E%3Ctext x='50%25' y='50%25' text-anchor='middle' dy='.3em' fill='%23999'%3EImage not available%3C/text%3E%3C/svg%3E";

const DISPLAY_FORMAT: &[FormatItem<'static>] = format_description!(
    "[month padding:none]/[day padding:none]/[year] [hour repr:12 padding:none]:[minute]:[second] [period]"
);

/// A single search hit, ready to be put into markup.
///
/// Fields ending in `_html` are already escaped and must be interpolated as-is, everything else
/// still needs escaping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PhotoCard {
    pub image_url: String,
    pub fallback_image: &'static str,
    pub name_html: String,
    pub uploaded_html: String,
    pub labels_html: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "cards", rename_all = "snake_case")]
pub enum ResultsView {
    Empty,
    Cards(Vec<PhotoCard>),
}

impl ResultsView {
    pub fn len(&self) -> usize {
        match self {
            ResultsView::Empty => 0,
            ResultsView::Cards(cards) => cards.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn escape(text: &str) -> String {
    tera::escape_html(text)
}

pub fn image_url(bucket: &str, object_key: &str) -> String {
    format!("https://{}.s3.amazonaws.com/{}", bucket, object_key)
}

pub fn results(photos: Option<Vec<PhotoRecord>>) -> ResultsView {
    match photos {
        Some(photos) if !photos.is_empty() => {
            ResultsView::Cards(photos.iter().map(photo_card).collect())
        },
        _ => ResultsView::Empty,
    }
}

pub fn photo_card(photo: &PhotoRecord) -> PhotoCard {
    let labels_html = match &photo.labels {
        Some(labels) if !labels.is_empty() => labels.iter().map(|label| escape(label)).collect(),
        _ => vec![NO_LABELS.to_string()],
    };

    PhotoCard {
        image_url: image_url(&photo.bucket, &photo.object_key),
        fallback_image: FALLBACK_IMAGE,
        name_html: escape(&photo.object_key),
        uploaded_html: escape(&format_timestamp(photo.created_timestamp.as_ref())),
        labels_html,
    }
}

fn parse_text(text: &str) -> Option<OffsetDateTime> {
    if let Ok(datetime) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(datetime);
    }
    if let Ok(datetime) = OffsetDateTime::parse(text, &Iso8601::DEFAULT) {
        return Some(datetime);
    }
    // Python's `isoformat()` leaves the offset out; those are UTC.
    if let Ok(datetime) = PrimitiveDateTime::parse(text, &Iso8601::DEFAULT) {
        return Some(datetime.assume_utc());
    }
    Date::parse(text, &Iso8601::DEFAULT)
        .ok()
        .map(|date| date.midnight().assume_utc())
}

fn parse_millis(number: &serde_json::Number) -> Option<OffsetDateTime> {
    let millis = match number.as_i64() {
        Some(millis) => i128::from(millis),
        None => number.as_f64().filter(|m| m.is_finite())?.trunc() as i128,
    };
    OffsetDateTime::from_unix_timestamp_nanos(millis.checked_mul(1_000_000)?).ok()
}

/// Formats a creation timestamp for display, in UTC.
///
/// Anything that can't be parsed is shown as-is.
pub fn format_timestamp(timestamp: Option<&Timestamp>) -> String {
    let timestamp = match timestamp {
        Some(timestamp) => timestamp,
        None => return String::new(),
    };

    let parsed = match timestamp {
        Timestamp::Text(text) => parse_text(text.trim()),
        Timestamp::Millis(number) => parse_millis(number),
        Timestamp::Other(_) => None,
    };

    parsed
        .and_then(|datetime| datetime.to_offset(time::UtcOffset::UTC).format(DISPLAY_FORMAT).ok())
        .unwrap_or_else(|| timestamp.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(json: &str) -> PhotoRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_empty_and_absent_results() {
        assert_eq!(results(None), ResultsView::Empty);
        assert_eq!(results(Some(vec![])), ResultsView::Empty);
        assert!(results(None).is_empty());
    }

    #[test]
    fn test_card_for_backend_record() {
        let card = photo_card(&photo(
            r#"{"bucket":"b","objectKey":"k.jpg","createdTimestamp":"2024-01-01T00:00:00Z","labels":["cat","outdoor"]}"#,
        ));

        assert_eq!(card.image_url, "https://b.s3.amazonaws.com/k.jpg");
        assert_eq!(card.name_html, "k.jpg");
        assert_eq!(card.uploaded_html, "1&#x2F;1&#x2F;2024 12:00:00 AM");
        assert_eq!(card.labels_html, vec!["cat", "outdoor"]);
        assert_eq!(card.fallback_image, FALLBACK_IMAGE);
    }

    #[test]
    fn test_cards_keep_backend_order() {
        let view = results(Some(vec![
            photo(r#"{"bucket":"b","objectKey":"z.jpg"}"#),
            photo(r#"{"bucket":"b","objectKey":"a.jpg"}"#),
            photo(r#"{"bucket":"b","objectKey":"z.jpg"}"#),
        ]));

        match view {
            ResultsView::Cards(cards) => {
                let names: Vec<_> = cards.iter().map(|c| c.name_html.as_str()).collect();
                assert_eq!(names, vec!["z.jpg", "a.jpg", "z.jpg"]);
            },
            ResultsView::Empty => panic!("expected cards"),
        }
    }

    #[test]
    fn test_missing_or_empty_labels() {
        let absent = photo_card(&photo(r#"{"bucket":"b","objectKey":"k.jpg"}"#));
        assert_eq!(absent.labels_html, vec![NO_LABELS]);

        let empty = photo_card(&photo(r#"{"bucket":"b","objectKey":"k.jpg","labels":[]}"#));
        assert_eq!(empty.labels_html, vec![NO_LABELS]);
    }

    #[test]
    fn test_markup_is_escaped() {
        let card = photo_card(&photo(
            r#"{"bucket":"b","objectKey":"<img src=x>","createdTimestamp":"<b>now</b>","labels":["<script>alert(1)</script>"]}"#,
        ));

        assert_eq!(card.name_html, "&lt;img src=x&gt;");
        assert_eq!(card.uploaded_html, "&lt;b&gt;now&lt;&#x2F;b&gt;");
        assert_eq!(
            card.labels_html,
            vec!["&lt;script&gt;alert(1)&lt;&#x2F;script&gt;"]
        );
        // The URL is escaped by the template, not here.
        assert_eq!(card.image_url, "https://b.s3.amazonaws.com/<img src=x>");
    }

    #[test]
    fn test_format_timestamp() {
        let text = |s: &str| Timestamp::Text(s.to_string());

        assert_eq!(
            format_timestamp(Some(&text("2024-01-01T00:00:00Z"))),
            "1/1/2024 12:00:00 AM"
        );
        assert_eq!(
            format_timestamp(Some(&text("2024-03-15T18:05:09+02:00"))),
            "3/15/2024 4:05:09 PM"
        );
        assert_eq!(
            format_timestamp(Some(&text("2023-12-24T13:45:30.123456"))),
            "12/24/2023 1:45:30 PM"
        );
        assert_eq!(
            format_timestamp(Some(&text("2024-02-29"))),
            "2/29/2024 12:00:00 AM"
        );
        assert_eq!(
            format_timestamp(Some(&Timestamp::Millis(1704067200000u64.into()))),
            "1/1/2024 12:00:00 AM"
        );
    }

    #[test]
    fn test_malformed_timestamp_is_shown_raw() {
        assert_eq!(
            format_timestamp(Some(&Timestamp::Text("yesterday-ish".to_string()))),
            "yesterday-ish"
        );
        assert_eq!(
            format_timestamp(Some(&Timestamp::Other(serde_json::Value::Bool(true)))),
            "true"
        );
        assert_eq!(
            format_timestamp(Some(&Timestamp::Millis(i64::MAX.into()))),
            i64::MAX.to_string()
        );
        assert_eq!(format_timestamp(None), "");
    }

    #[test]
    fn test_huge_float_timestamp_is_shown_raw() {
        let record = photo(r#"{"bucket":"b","objectKey":"k.jpg","createdTimestamp":1e300}"#);
        let raw = record.created_timestamp.as_ref().unwrap().to_string();
        assert!(matches!(record.created_timestamp, Some(Timestamp::Millis(_))));

        assert_eq!(format_timestamp(record.created_timestamp.as_ref()), raw);
        assert_eq!(photo_card(&record).uploaded_html, escape(&raw));

        let negative = photo(r#"{"createdTimestamp":-1e300}"#);
        let raw = negative.created_timestamp.as_ref().unwrap().to_string();
        assert_eq!(format_timestamp(negative.created_timestamp.as_ref()), raw);
    }
}
