// File: src/value.rs
// Purpose: Raw input values and coerced field values

use std::borrow::Cow;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Raw values as they arrive from the input widgets, keyed by field name.
pub type RawRecord = IndexMap<String, RawValue>;

/// Coerced values in schema order. This is what a successful submission hands
/// to the presentation collaborator.
pub type CanonicalRecord = IndexMap<String, FieldValue>;

/// A raw value from a text input, mask input, date picker or select.
///
/// Widgets only ever produce text or nothing; interpretation happens later
/// during coercion. Deserializes from a JSON string or `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum RawValue {
    #[default]
    Missing,
    Text(String),
}

impl RawValue {
    /// The raw text, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Missing => None,
            RawValue::Text(s) => Some(s),
        }
    }

    /// Missing or the empty string.
    pub fn is_empty(&self) -> bool {
        self.as_text().map_or(true, str::is_empty)
    }
}

impl From<Option<String>> for RawValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(RawValue::Missing, RawValue::Text)
    }
}

impl From<RawValue> for Option<String> {
    fn from(value: RawValue) -> Self {
        match value {
            RawValue::Missing => None,
            RawValue::Text(s) => Some(s),
        }
    }
}

impl From<Option<&str>> for RawValue {
    fn from(value: Option<&str>) -> Self {
        value.map(str::to_string).into()
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

/// Semantic kind of a field, independent of the textual raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Password,
    Date,
    Choice,
    Phone,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Password => "password",
            FieldKind::Date => "date",
            FieldKind::Choice => "choice",
            FieldKind::Phone => "phone",
        }
    }

    /// Wraps already-canonical text into a value of this kind.
    ///
    /// Returns `None` for kinds that cannot be represented by plain text and
    /// need a parsing transform (dates).
    pub fn wrap(self, text: String) -> Option<FieldValue> {
        match self {
            FieldKind::Text => Some(FieldValue::Text(text)),
            FieldKind::Password => Some(FieldValue::Password(text)),
            FieldKind::Choice => Some(FieldValue::Choice(text)),
            FieldKind::Phone => Some(FieldValue::Phone(text)),
            FieldKind::Date => None,
        }
    }

    /// Whether raw text can be wrapped without a transform.
    pub fn is_textual(self) -> bool {
        !matches!(self, FieldKind::Date)
    }
}

/// A coerced field value, as seen by rules and by the canonical record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Missing,
    Text(String),
    Password(String),
    Date(NaiveDate),
    Choice(String),
    Phone(String),
}

impl FieldValue {
    /// Missing, or textual and empty.
    pub fn is_missing(&self) -> bool {
        match self {
            FieldValue::Missing => true,
            FieldValue::Date(_) => false,
            _ => self.as_text().map_or(true, str::is_empty),
        }
    }

    /// The text of a textual value. Dates and missing values have none.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s)
            | FieldValue::Password(s)
            | FieldValue::Choice(s)
            | FieldValue::Phone(s) => Some(s),
            FieldValue::Missing | FieldValue::Date(_) => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// String representation used by text-based rules; dates render as `YYYY-MM-DD`.
    pub fn text_repr(&self) -> Option<Cow<'_, str>> {
        match self {
            FieldValue::Date(d) => Some(Cow::Owned(d.format("%Y-%m-%d").to_string())),
            other => other.as_text().map(Cow::Borrowed),
        }
    }
}
