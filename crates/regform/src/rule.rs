// File: src/rule.rs
// Purpose: Field rules, cross-field rules and async rules

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use regex::Regex;
use regform_rules::{PhoneShape, RuleResult};

use crate::error::SchemaError;
use crate::value::FieldValue;

type CheckFn = Arc<dyn Fn(&FieldValue, &RuleContext<'_>) -> RuleResult + Send + Sync>;
type CrossCheckFn = Arc<dyn Fn(&RuleContext<'_>) -> RuleResult + Send + Sync>;

static MISSING: FieldValue = FieldValue::Missing;

/// Read-only view of every coerced value in the record being validated.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    values: &'a IndexMap<String, FieldValue>,
}

impl<'a> RuleContext<'a> {
    pub fn new(values: &'a IndexMap<String, FieldValue>) -> Self {
        Self { values }
    }

    /// Coerced value of another field. Unknown and missing fields both read as
    /// [`FieldValue::Missing`].
    pub fn get(&self, field: &str) -> &'a FieldValue {
        self.values.get(field).unwrap_or(&MISSING)
    }
}

/// A single check bound to a field.
///
/// Apart from [`Rule::Required`] and [`Rule::DateRequired`], rules let missing
/// values through: emptiness is `required`'s business, so an empty value never
/// collects a second, less helpful message.
#[derive(Clone)]
pub enum Rule {
    Required {
        message: String,
    },
    MinLength {
        min: usize,
        message: String,
    },
    MaxLength {
        max: usize,
        message: String,
    },
    Pattern {
        regex: Regex,
        message: String,
    },
    OneOf {
        options: Vec<String>,
        message: String,
    },
    DateRequired {
        message: String,
    },
    PhoneFormat {
        shape: PhoneShape,
        incomplete_message: String,
        format_message: String,
    },
    /// Inline closure, for rules the built-in set does not cover.
    Custom {
        name: String,
        check: CheckFn,
    },
}

impl Rule {
    pub fn required(message: impl Into<String>) -> Self {
        Rule::Required {
            message: message.into(),
        }
    }

    pub fn min_length(min: usize, message: impl Into<String>) -> Self {
        Rule::MinLength {
            min,
            message: message.into(),
        }
    }

    pub fn max_length(max: usize, message: impl Into<String>) -> Self {
        Rule::MaxLength {
            max,
            message: message.into(),
        }
    }

    /// Compiles `pattern`; a bad pattern is a schema construction error.
    pub fn pattern(pattern: &str, message: impl Into<String>) -> Result<Self, SchemaError> {
        let regex = Regex::new(pattern).map_err(|source| SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self::regex(regex, message))
    }

    pub fn regex(regex: Regex, message: impl Into<String>) -> Self {
        Rule::Pattern {
            regex,
            message: message.into(),
        }
    }

    pub fn one_of<I, S>(options: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Rule::OneOf {
            options: options.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }

    pub fn date_required(message: impl Into<String>) -> Self {
        Rule::DateRequired {
            message: message.into(),
        }
    }

    pub fn phone_format(
        shape: PhoneShape,
        incomplete_message: impl Into<String>,
        format_message: impl Into<String>,
    ) -> Self {
        Rule::PhoneFormat {
            shape,
            incomplete_message: incomplete_message.into(),
            format_message: format_message.into(),
        }
    }

    pub fn custom<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&FieldValue, &RuleContext<'_>) -> RuleResult + Send + Sync + 'static,
    {
        Rule::Custom {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    /// Short identifier used in listings and logs.
    pub fn name(&self) -> &str {
        match self {
            Rule::Required { .. } => "required",
            Rule::MinLength { .. } => "minLength",
            Rule::MaxLength { .. } => "maxLength",
            Rule::Pattern { .. } => "pattern",
            Rule::OneOf { .. } => "oneOf",
            Rule::DateRequired { .. } => "dateRequired",
            Rule::PhoneFormat { .. } => "phoneFormat",
            Rule::Custom { name, .. } => name,
        }
    }

    pub fn check(&self, value: &FieldValue, ctx: &RuleContext<'_>) -> RuleResult {
        if let Rule::Required { message } = self {
            return regform_rules::required(value.text_repr().as_deref(), message);
        }
        if let Rule::DateRequired { message } = self {
            return regform_rules::date_required(value.as_date(), message);
        }
        if let Rule::Custom { check, .. } = self {
            return check(value, ctx);
        }

        let text = match value.text_repr() {
            Some(text) if !text.is_empty() => text,
            _ => return Ok(()),
        };

        match self {
            Rule::MinLength { min, message } => regform_rules::min_length(&text, *min, message),
            Rule::MaxLength { max, message } => regform_rules::max_length(&text, *max, message),
            Rule::Pattern { regex, message } => regform_rules::pattern(&text, regex, message),
            Rule::OneOf { options, message } => regform_rules::one_of(&text, options.as_slice(), message),
            Rule::PhoneFormat {
                shape,
                incomplete_message,
                format_message,
            } => regform_rules::phone_format(&text, shape, incomplete_message, format_message),
            Rule::Required { .. } | Rule::DateRequired { .. } | Rule::Custom { .. } => Ok(()),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Pattern { regex, .. } => write!(f, "Rule::pattern({})", regex.as_str()),
            Rule::MinLength { min, .. } => write!(f, "Rule::minLength({min})"),
            Rule::MaxLength { max, .. } => write!(f, "Rule::maxLength({max})"),
            other => write!(f, "Rule::{}", other.name()),
        }
    }
}

/// A whole-record rule, evaluated only once every field passes its own rules.
#[derive(Clone)]
pub struct CrossFieldRule {
    name: String,
    depends_on: BTreeSet<String>,
    attach_to: String,
    check: CrossCheckFn,
}

impl CrossFieldRule {
    pub fn new<I, S, F>(name: impl Into<String>, depends_on: I, attach_to: impl Into<String>, check: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&RuleContext<'_>) -> RuleResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            depends_on: depends_on.into_iter().map(Into::into).collect(),
            attach_to: attach_to.into(),
            check: Arc::new(check),
        }
    }

    /// `field` must hold the same value as `other`; the error lands on `field`.
    pub fn equals_field(field: &str, other: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let (a, b) = (field.to_string(), other.to_string());
        Self::new(
            format!("equalsField({field}, {other})"),
            [field, other],
            field,
            move |ctx| {
                let left = ctx.get(&a).text_repr();
                let right = ctx.get(&b).text_repr();
                regform_rules::equals_field(left.as_deref(), right.as_deref(), &message)
            },
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn depends_on(&self) -> &BTreeSet<String> {
        &self.depends_on
    }

    pub fn attach_to(&self) -> &str {
        &self.attach_to
    }

    pub fn check(&self, ctx: &RuleContext<'_>) -> RuleResult {
        (self.check)(ctx)
    }
}

impl fmt::Debug for CrossFieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrossFieldRule")
            .field("name", &self.name)
            .field("depends_on", &self.depends_on)
            .field("attach_to", &self.attach_to)
            .finish()
    }
}

/// A check that cannot answer synchronously, e.g. a uniqueness lookup.
///
/// The engine never drives these futures itself. A [`FormSession`](crate::FormSession)
/// hands them out as [`PendingCheck`](crate::PendingCheck)s and keeps the field
/// pending until the caller reports the result.
pub trait AsyncRule: Send + Sync {
    fn name(&self) -> &str;

    fn check(&self, value: &FieldValue) -> BoxFuture<'static, RuleResult>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn empty_ctx() -> IndexMap<String, FieldValue> {
        IndexMap::new()
    }

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    #[rstest]
    #[case(Rule::min_length(6, "short"))]
    #[case(Rule::max_length(2, "long"))]
    #[case(Rule::pattern("^x$", "pattern").unwrap())]
    #[case(Rule::one_of(["male", "female"], "choose"))]
    #[case(Rule::phone_format(PhoneShape::default(), "incomplete", "format"))]
    fn test_non_required_rules_skip_missing(#[case] rule: Rule) {
        let values = empty_ctx();
        let ctx = RuleContext::new(&values);
        assert!(rule.check(&FieldValue::Missing, &ctx).is_ok());
        assert!(rule.check(&text(""), &ctx).is_ok());
    }

    #[test]
    fn test_required_fires_on_empty() {
        let values = empty_ctx();
        let ctx = RuleContext::new(&values);
        let rule = Rule::required("req");
        assert_eq!(rule.check(&FieldValue::Missing, &ctx), Err("req".to_string()));
        assert_eq!(rule.check(&text(""), &ctx), Err("req".to_string()));
        assert!(rule.check(&text("x"), &ctx).is_ok());
    }

    #[test]
    fn test_date_required_needs_a_date() {
        let values = empty_ctx();
        let ctx = RuleContext::new(&values);
        let rule = Rule::date_required("pick");
        let date = FieldValue::Date(chrono::NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        assert!(rule.check(&date, &ctx).is_ok());
        assert!(rule.check(&FieldValue::Missing, &ctx).is_err());
        assert!(rule.check(&text("2000-01-01"), &ctx).is_err());
    }

    #[test]
    fn test_invalid_pattern_is_schema_error() {
        let err = Rule::pattern("(unclosed", "msg").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { .. }));
    }

    #[test]
    fn test_custom_rule_sees_context() {
        let mut values = empty_ctx();
        values.insert("country".into(), text("RU"));
        let ctx = RuleContext::new(&values);

        let rule = Rule::custom("ruPrefix", |value, ctx| {
            let wants_ru = ctx.get("country").as_text() == Some("RU");
            match value.as_text() {
                Some(v) if wants_ru && !v.starts_with("+7") => Err("Russian numbers start with +7".into()),
                _ => Ok(()),
            }
        });

        assert_eq!(rule.name(), "ruPrefix");
        assert!(rule.check(&text("+79123456789"), &ctx).is_ok());
        assert!(rule.check(&text("+19123456789"), &ctx).is_err());
    }

    #[test]
    fn test_equals_field_rule() {
        let rule = CrossFieldRule::equals_field("confirmPassword", "password", "mismatch");
        assert_eq!(rule.attach_to(), "confirmPassword");
        assert!(rule.depends_on().contains("password"));
        assert!(rule.depends_on().contains("confirmPassword"));

        let mut values = empty_ctx();
        values.insert("password".into(), FieldValue::Password("Secret1".into()));
        values.insert("confirmPassword".into(), FieldValue::Password("Secret1".into()));
        assert!(rule.check(&RuleContext::new(&values)).is_ok());

        values.insert("confirmPassword".into(), FieldValue::Password("Secret2".into()));
        assert_eq!(rule.check(&RuleContext::new(&values)), Err("mismatch".to_string()));
    }
}
