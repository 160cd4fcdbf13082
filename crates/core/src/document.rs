//! Core record type for sopindex.
//!
//! A `DocumentRecord` is one revision of one SOP. Every revision of the same
//! logical document shares an `id`; `version` and `effective_date` tell the
//! revisions apart. Records are immutable once an index is loaded. Search
//! hands out value copies with `score` filled in.

use serde::{Deserialize, Serialize};

/// One stored revision of an SOP, optionally annotated with a search score.
///
/// Header-derived fields are optional: an absent `version` is distinct from
/// an unparseable one only for display, since both fall through the version
/// comparison during resolution.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Identifier shared by every revision of the same document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Version label, usually numeric-like (`"2.0"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Effective date label (`YYYY-MM-DD` or `YYYY/MM/DD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<String>,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Body text; this is what gets embedded.
    #[serde(default)]
    pub text: String,
    /// Provenance label for debugging. Never compared.
    #[serde(default)]
    pub source_file: String,
    /// Cosine similarity attached by a search. Never persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl DocumentRecord {
    /// Creates a record with an id and body text; other fields start empty.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            text: text.into(),
            ..Self::default()
        }
    }

    /// Sets the version label.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the effective date label.
    pub fn with_effective_date(mut self, date: impl Into<String>) -> Self {
        self.effective_date = Some(date.into());
        self
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the provenance label.
    pub fn with_source_file(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = source_file.into();
        self
    }

    /// Returns a copy annotated with a similarity score.
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    /// The version-family key, or `None` when the id is absent or blank.
    ///
    /// The id is used exactly as stored, so `"SOP-1 "` and `"SOP-1"` are
    /// different families. Records without a family key never take part in
    /// version resolution.
    pub fn family_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// Short one-line label: `ID vVERSION (DATE) - TITLE`.
    pub fn label(&self) -> String {
        format!(
            "{} v{} ({}) - {}",
            self.id.as_deref().unwrap_or(""),
            self.version.as_deref().unwrap_or(""),
            self.effective_date.as_deref().unwrap_or(""),
            self.title
        )
    }
}
