// File: src/field.rs
// Purpose: Field descriptors and raw → coerced value transforms

use std::fmt;
use std::sync::Arc;

use regform_rules::{parse_date, strip_mask};

use crate::rule::{AsyncRule, Rule};
use crate::value::{FieldKind, FieldValue, RawValue};

type TransformFn = Arc<dyn Fn(&str) -> Result<FieldValue, String> + Send + Sync>;

/// Converts non-empty raw text into the value rules and the canonical record see.
///
/// `Err(message)` is reported as the field's error ("enter a valid ..."),
/// distinct from the message of a `required` rule.
#[derive(Clone)]
pub struct Transform {
    name: &'static str,
    apply: TransformFn,
}

impl Transform {
    pub fn new<F>(name: &'static str, apply: F) -> Self
    where
        F: Fn(&str) -> Result<FieldValue, String> + Send + Sync + 'static,
    {
        Self {
            name,
            apply: Arc::new(apply),
        }
    }

    /// Trims surrounding whitespace.
    pub fn trim(kind: FieldKind) -> Self {
        Self::new("trim", move |raw| {
            let text = raw.trim().to_string();
            Ok(kind.wrap(text.clone()).unwrap_or(FieldValue::Text(text)))
        })
    }

    /// Parses a calendar value with the given formats (RFC 3339 is always accepted).
    pub fn date(formats: Vec<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new("date", move |raw| {
            parse_date(raw, formats.as_slice())
                .map(FieldValue::Date)
                .ok_or_else(|| message.clone())
        })
    }

    /// Strips phone mask formatting down to `+<digits>`, leaving placeholders in
    /// place for the phone format rule to report.
    pub fn phone_mask() -> Self {
        Self::new("phoneMask", |raw| Ok(FieldValue::Phone(strip_mask(raw))))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn apply(&self, raw: &str) -> Result<FieldValue, String> {
        (self.apply)(raw)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transform({})", self.name)
    }
}

/// Binds a field name to its kind, ordered rules, and optional transform.
#[derive(Clone)]
pub struct FieldDescriptor {
    name: String,
    kind: FieldKind,
    label: Option<String>,
    rules: Vec<Rule>,
    transform: Option<Transform>,
    async_rule: Option<Arc<dyn AsyncRule>>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            label: None,
            rules: Vec::new(),
            transform: None,
            async_rule: None,
        }
    }

    /// Appends a rule. Rules run in the order they are added.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn async_rule(mut self, rule: Arc<dyn AsyncRule>) -> Self {
        self.async_rule = Some(rule);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Display label, falling back to the field name.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get_transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    pub fn get_async_rule(&self) -> Option<&Arc<dyn AsyncRule>> {
        self.async_rule.as_ref()
    }

    /// Coerces a raw value into this field's kind.
    ///
    /// Empty or whitespace-only input is [`FieldValue::Missing`] and never
    /// reaches the transform, so a blank field reads as missing rather than
    /// unparsable, whatever its kind.
    pub fn coerce(&self, raw: &RawValue) -> Result<FieldValue, String> {
        let text = match raw.as_text() {
            Some(text) if !text.trim().is_empty() => text,
            _ => return Ok(FieldValue::Missing),
        };

        match &self.transform {
            Some(transform) => transform.apply(text),
            // textual kinds are checked at schema build; date kinds always carry a transform
            None => Ok(self
                .kind
                .wrap(text.to_string())
                .unwrap_or_else(|| FieldValue::Text(text.to_string()))),
        }
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("rules", &self.rules)
            .field("transform", &self.transform)
            .field("async_rule", &self.async_rule.as_ref().map(|r| r.name().to_string()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_input_is_missing() {
        let field = FieldDescriptor::new("birthday", FieldKind::Date)
            .transform(Transform::date(vec!["%Y-%m-%d".into()], "Enter a valid date"));
        assert_eq!(field.coerce(&RawValue::Missing), Ok(FieldValue::Missing));
        assert_eq!(field.coerce(&RawValue::from("")), Ok(FieldValue::Missing));
        assert_eq!(field.coerce(&RawValue::from("  \t ")), Ok(FieldValue::Missing));
    }

    #[test]
    fn test_date_transform() {
        let field = FieldDescriptor::new("birthday", FieldKind::Date)
            .transform(Transform::date(vec!["%Y-%m-%d".into()], "Enter a valid date"));
        assert_eq!(
            field.coerce(&RawValue::from("1990-05-17")),
            Ok(FieldValue::Date(NaiveDate::from_ymd_opt(1990, 5, 17).unwrap()))
        );
        assert_eq!(
            field.coerce(&RawValue::from("soon")),
            Err("Enter a valid date".to_string())
        );
    }

    #[test]
    fn test_phone_mask_transform() {
        let field = FieldDescriptor::new("phone", FieldKind::Phone).transform(Transform::phone_mask());
        assert_eq!(
            field.coerce(&RawValue::from("+1 (234) 567-89-01-2")),
            Ok(FieldValue::Phone("+123456789012".into()))
        );
        assert_eq!(
            field.coerce(&RawValue::from("+1 (234) 567-89-0_-_")),
            Ok(FieldValue::Phone("+1234567890__".into()))
        );
    }

    #[test]
    fn test_trim_transform_keeps_kind() {
        let field = FieldDescriptor::new("gender", FieldKind::Choice).transform(Transform::trim(FieldKind::Choice));
        assert_eq!(field.coerce(&RawValue::from(" male ")), Ok(FieldValue::Choice("male".into())));
        assert_eq!(field.coerce(&RawValue::from("   ")), Ok(FieldValue::Missing));
    }

    #[test]
    fn test_untransformed_text_kind() {
        let field = FieldDescriptor::new("password", FieldKind::Password);
        assert_eq!(
            field.coerce(&RawValue::from(" Secret1 ")),
            Ok(FieldValue::Password(" Secret1 ".into()))
        );
        assert_eq!(field.display_label(), "password");
        assert_eq!(field.label("Password").display_label(), "Password");
    }
}
