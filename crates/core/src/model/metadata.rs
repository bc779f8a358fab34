use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use url::Url;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MetadataError {
    #[error("metadata is not valid JSON: {0}")]
    Json(String),

    #[error("url content requires a contentUrl")]
    MissingContentUrl,

    #[error("invalid contentUrl {raw}: {reason}")]
    InvalidContentUrl { raw: String, reason: String },

    #[error("page count must be > 0")]
    ZeroPages,

    #[error("slide count must be > 0")]
    ZeroSlides,
}

//
// ─── WIRE SHAPE ────────────────────────────────────────────────────────────────
//

/// Where the lesson content lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    File,
    Url,
}

/// Exact JSON shape stored alongside a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLessonMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attached_file: Option<String>,
    content_type: ContentSource,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "whole_count"
    )]
    pages: Option<u32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "whole_count"
    )]
    slides: Option<u32>,
}

/// Counts are JSON numbers, so `12.0` is accepted as 12. Fractions,
/// negatives and values past `u32::MAX` are rejected.
fn whole_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<f64>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if !value.is_finite() || value.fract() != 0.0 || value < 0.0 || value > f64::from(u32::MAX) {
        return Err(serde::de::Error::custom(format!(
            "expected a whole count, got {value}"
        )));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(Some(value as u32))
}

//
// ─── VALIDATED METADATA ────────────────────────────────────────────────────────
//

/// Validated lesson metadata consumed by the lesson viewers.
///
/// Serializes to `{ contentUrl?, attachedFile?, contentType, pages?, slides? }`.
/// A `url` source always carries an absolute, parseable `contentUrl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLessonMetadata", into = "RawLessonMetadata")]
pub struct LessonMetadata {
    source: ContentSource,
    content_url: Option<String>,
    attached_file: Option<String>,
    pages: Option<u32>,
    slides: Option<u32>,
}

impl LessonMetadata {
    /// Metadata for an uploaded file.
    #[must_use]
    pub fn file(attached_file: impl Into<String>) -> Self {
        Self {
            source: ContentSource::File,
            content_url: None,
            attached_file: Some(attached_file.into()),
            pages: None,
            slides: None,
        }
    }

    /// Metadata for externally hosted content.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::InvalidContentUrl` if `raw` is not an absolute URL.
    pub fn url(raw: impl Into<String>) -> Result<Self, MetadataError> {
        let raw = raw.into();
        validate_url(&raw)?;
        Ok(Self {
            source: ContentSource::Url,
            content_url: Some(raw),
            attached_file: None,
            pages: None,
            slides: None,
        })
    }

    /// # Errors
    ///
    /// Returns `MetadataError::ZeroPages` when `pages` is 0.
    pub fn with_pages(mut self, pages: u32) -> Result<Self, MetadataError> {
        if pages == 0 {
            return Err(MetadataError::ZeroPages);
        }
        self.pages = Some(pages);
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `MetadataError::ZeroSlides` when `slides` is 0.
    pub fn with_slides(mut self, slides: u32) -> Result<Self, MetadataError> {
        if slides == 0 {
            return Err(MetadataError::ZeroSlides);
        }
        self.slides = Some(slides);
        Ok(self)
    }

    /// Parse and validate the stored JSON blob.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError` for malformed JSON or invalid field values.
    pub fn parse(json: &str) -> Result<Self, MetadataError> {
        let raw: RawLessonMetadata =
            serde_json::from_str(json).map_err(|e| MetadataError::Json(e.to_string()))?;
        Self::try_from(raw)
    }

    /// Serialize back to the stored JSON shape.
    #[must_use]
    pub fn to_json(&self) -> String {
        // RawLessonMetadata holds only strings, integers and a unit enum.
        serde_json::to_string(&RawLessonMetadata::from(self.clone())).unwrap_or_default()
    }

    #[must_use]
    pub fn source(&self) -> ContentSource {
        self.source
    }

    #[must_use]
    pub fn content_url(&self) -> Option<&str> {
        self.content_url.as_deref()
    }

    #[must_use]
    pub fn attached_file(&self) -> Option<&str> {
        self.attached_file.as_deref()
    }

    #[must_use]
    pub fn pages(&self) -> Option<u32> {
        self.pages
    }

    #[must_use]
    pub fn slides(&self) -> Option<u32> {
        self.slides
    }
}

fn validate_url(raw: &str) -> Result<(), MetadataError> {
    Url::parse(raw)
        .map(|_| ())
        .map_err(|e| MetadataError::InvalidContentUrl {
            raw: raw.to_string(),
            reason: e.to_string(),
        })
}

impl TryFrom<RawLessonMetadata> for LessonMetadata {
    type Error = MetadataError;

    fn try_from(raw: RawLessonMetadata) -> Result<Self, Self::Error> {
        let content_url = raw
            .content_url
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        match (&raw.content_type, &content_url) {
            (ContentSource::Url, None) => return Err(MetadataError::MissingContentUrl),
            (_, Some(url)) => validate_url(url)?,
            (ContentSource::File, None) => {}
        }
        if raw.pages == Some(0) {
            return Err(MetadataError::ZeroPages);
        }
        if raw.slides == Some(0) {
            return Err(MetadataError::ZeroSlides);
        }

        Ok(Self {
            source: raw.content_type,
            content_url,
            attached_file: raw.attached_file.filter(|s| !s.trim().is_empty()),
            pages: raw.pages,
            slides: raw.slides,
        })
    }
}

impl From<LessonMetadata> for RawLessonMetadata {
    fn from(meta: LessonMetadata) -> Self {
        Self {
            content_url: meta.content_url,
            attached_file: meta.attached_file,
            content_type: meta.source,
            pages: meta.pages,
            slides: meta.slides,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_file_metadata_with_pages() {
        let meta =
            LessonMetadata::parse(r#"{"attachedFile":"guide.pdf","contentType":"file","pages":12}"#)
                .unwrap();
        assert_eq!(meta.source(), ContentSource::File);
        assert_eq!(meta.attached_file(), Some("guide.pdf"));
        assert_eq!(meta.pages(), Some(12));
        assert_eq!(meta.slides(), None);
    }

    #[test]
    fn url_source_requires_content_url() {
        let err = LessonMetadata::parse(r#"{"contentType":"url"}"#).unwrap_err();
        assert_eq!(err, MetadataError::MissingContentUrl);
    }

    #[test]
    fn relative_content_url_is_rejected() {
        let err =
            LessonMetadata::parse(r#"{"contentType":"url","contentUrl":"/videos/1.mp4"}"#)
                .unwrap_err();
        assert!(matches!(err, MetadataError::InvalidContentUrl { .. }));
    }

    #[test]
    fn zero_counts_are_rejected() {
        assert_eq!(
            LessonMetadata::parse(r#"{"contentType":"file","pages":0}"#).unwrap_err(),
            MetadataError::ZeroPages
        );
        assert_eq!(
            LessonMetadata::parse(r#"{"contentType":"file","slides":0}"#).unwrap_err(),
            MetadataError::ZeroSlides
        );
    }

    #[test]
    fn integral_float_counts_are_accepted() {
        let meta = LessonMetadata::parse(
            r#"{"attachedFile":"guide.pdf","contentType":"file","pages":12.0,"slides":3}"#,
        )
        .unwrap();
        assert_eq!(meta.pages(), Some(12));
        assert_eq!(meta.slides(), Some(3));
        assert_eq!(
            meta.to_json(),
            r#"{"attachedFile":"guide.pdf","contentType":"file","pages":12,"slides":3}"#
        );
    }

    #[test]
    fn fractional_or_negative_counts_are_json_errors() {
        for json in [
            r#"{"contentType":"file","pages":2.5}"#,
            r#"{"contentType":"file","slides":-1}"#,
        ] {
            let err = LessonMetadata::parse(json).unwrap_err();
            assert!(matches!(err, MetadataError::Json(_)), "{json}: {err:?}");
        }
    }

    #[test]
    fn unknown_content_type_is_a_json_error() {
        let err = LessonMetadata::parse(r#"{"contentType":"ftp"}"#).unwrap_err();
        assert!(matches!(err, MetadataError::Json(_)));
    }

    #[test]
    fn serializes_camel_case_and_omits_absent_fields() {
        let meta = LessonMetadata::url("https://cdn.example.com/deck.pptx")
            .unwrap()
            .with_slides(24)
            .unwrap();
        let json = meta.to_json();
        assert_eq!(
            json,
            r#"{"contentUrl":"https://cdn.example.com/deck.pptx","contentType":"url","slides":24}"#
        );
        assert_eq!(LessonMetadata::parse(&json).unwrap(), meta);
    }
}
