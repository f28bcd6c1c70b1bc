// File: src/schema.rs
// Purpose: Immutable field schema and its checked builder

use indexmap::IndexMap;

use crate::error::SchemaError;
use crate::field::FieldDescriptor;
use crate::rule::CrossFieldRule;

/// Ordered field descriptors (declaration order is display order) plus
/// whole-record rules.
///
/// Only obtainable through [`SchemaBuilder::build`], so every schema in
/// existence has unique field names and cross-field rules that reference real
/// fields. Share it read-only, typically behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Schema {
    fields: IndexMap<String, FieldDescriptor>,
    cross_field_rules: Vec<CrossFieldRule>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn cross_field_rules(&self) -> &[CrossFieldRule] {
        &self.cross_field_rules
    }

    /// Cross-field rules whose error lands on `field`, in declaration order.
    pub fn rules_attached_to<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a CrossFieldRule> {
        self.cross_field_rules
            .iter()
            .filter(move |rule| rule.attach_to() == field)
    }

    /// Cross-field rules that read `field`.
    pub fn rules_depending_on<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a CrossFieldRule> {
        self.cross_field_rules
            .iter()
            .filter(move |rule| rule.depends_on().contains(field))
    }
}

/// Collects fields and cross-field rules, checking them on [`build`](Self::build).
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<FieldDescriptor>,
    cross_field_rules: Vec<CrossFieldRule>,
}

impl SchemaBuilder {
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn cross_field(mut self, rule: CrossFieldRule) -> Self {
        self.cross_field_rules.push(rule);
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut fields = IndexMap::with_capacity(self.fields.len());

        for field in self.fields {
            if !field.kind().is_textual() && field.get_transform().is_none() {
                return Err(SchemaError::MissingTransform {
                    field: field.name().to_string(),
                    kind: field.kind().as_str(),
                });
            }
            if fields.contains_key(field.name()) {
                return Err(SchemaError::DuplicateField(field.name().to_string()));
            }
            fields.insert(field.name().to_string(), field);
        }

        for rule in &self.cross_field_rules {
            if rule.depends_on().is_empty() {
                return Err(SchemaError::EmptyDependencies(rule.name().to_string()));
            }
            if !fields.contains_key(rule.attach_to()) {
                return Err(SchemaError::UnknownAttachTarget {
                    rule: rule.name().to_string(),
                    field: rule.attach_to().to_string(),
                });
            }
            if let Some(missing) = rule.depends_on().iter().find(|dep| !fields.contains_key(*dep)) {
                return Err(SchemaError::UnknownDependency {
                    rule: rule.name().to_string(),
                    field: missing.clone(),
                });
            }
        }

        tracing::debug!(
            "Schema built: {} fields, {} cross-field rules",
            fields.len(),
            self.cross_field_rules.len()
        );

        Ok(Schema {
            fields,
            cross_field_rules: self.cross_field_rules,
        })
    }
}
