//! Recency criteria used by the version cascade.
//!
//! Each criterion compares a candidate against the current best of its
//! version-family and answers [`Verdict::Newer`], [`Verdict::Older`], or
//! [`Verdict::Undecided`]. Unparseable labels are not errors: the criterion
//! just stays undecided and the next one in the cascade gets a say.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;

use crate::config::ACCEPTED_DATE_FORMATS;
use crate::document::DocumentRecord;

/// Outcome of comparing a candidate against the incumbent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The candidate is more current and should replace the incumbent.
    Newer,
    /// The incumbent is more current.
    Older,
    /// This criterion cannot tell them apart.
    Undecided,
}

impl Verdict {
    /// Maps `candidate.cmp(incumbent)` onto a verdict. `None` and `Equal` are undecided.
    pub fn from_ordering(ordering: Option<Ordering>) -> Self {
        match ordering {
            Some(Ordering::Greater) => Verdict::Newer,
            Some(Ordering::Less) => Verdict::Older,
            Some(Ordering::Equal) | None => Verdict::Undecided,
        }
    }

    /// Returns `true` for `Newer` and `Older`.
    pub fn is_decisive(self) -> bool {
        self != Verdict::Undecided
    }
}

/// One level of the recency cascade.
pub trait RecencyCriterion: fmt::Debug + Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Compares `candidate` against `incumbent`.
    fn compare(&self, candidate: &DocumentRecord, incumbent: &DocumentRecord) -> Verdict;
}

/// Parses an effective date label, trying each format in order.
pub fn parse_effective_date(label: &str, formats: &[&str]) -> Option<NaiveDate> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(label, fmt).ok())
}

/// Parses a version label as a finite decimal number (`"2"`, `"2.0"`, `"1.5"`).
pub fn parse_version(label: &str) -> Option<f64> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    label.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Later effective date wins.
#[derive(Debug, Clone)]
pub struct EffectiveDate {
    formats: Vec<&'static str>,
}

impl EffectiveDate {
    /// Creates a date criterion accepting the given `chrono` formats, in order.
    pub fn with_formats(formats: &[&'static str]) -> Self {
        Self {
            formats: formats.to_vec(),
        }
    }

    fn parse(&self, record: &DocumentRecord) -> Option<NaiveDate> {
        parse_effective_date(record.effective_date.as_deref()?, &self.formats)
    }
}

impl Default for EffectiveDate {
    fn default() -> Self {
        Self::with_formats(ACCEPTED_DATE_FORMATS)
    }
}

impl RecencyCriterion for EffectiveDate {
    fn name(&self) -> &'static str {
        "effective_date"
    }

    fn compare(&self, candidate: &DocumentRecord, incumbent: &DocumentRecord) -> Verdict {
        match (self.parse(candidate), self.parse(incumbent)) {
            (Some(c), Some(i)) => Verdict::from_ordering(Some(c.cmp(&i))),
            _ => Verdict::Undecided,
        }
    }
}

/// Larger numeric version wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionNumber;

impl RecencyCriterion for VersionNumber {
    fn name(&self) -> &'static str {
        "version"
    }

    fn compare(&self, candidate: &DocumentRecord, incumbent: &DocumentRecord) -> Verdict {
        let parse = |r: &DocumentRecord| r.version.as_deref().and_then(parse_version);
        match (parse(candidate), parse(incumbent)) {
            (Some(c), Some(i)) => Verdict::from_ordering(c.partial_cmp(&i)),
            _ => Verdict::Undecided,
        }
    }
}

/// Strictly higher similarity score wins; a present score beats an absent one.
///
/// This is the terminal level. Equal scores stay undecided, which keeps the
/// incumbent.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityScore;

impl RecencyCriterion for SimilarityScore {
    fn name(&self) -> &'static str {
        "score"
    }

    fn compare(&self, candidate: &DocumentRecord, incumbent: &DocumentRecord) -> Verdict {
        match (candidate.score, incumbent.score) {
            (Some(c), Some(i)) => Verdict::from_ordering(c.partial_cmp(&i)),
            (Some(_), None) => Verdict::Newer,
            (None, Some(_)) => Verdict::Older,
            (None, None) => Verdict::Undecided,
        }
    }
}
