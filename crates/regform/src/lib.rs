//! # regform
//!
//! Declarative field validation for registration forms.
//!
//! A [`Schema`] binds field names to ordered rules and value transforms, plus
//! cross-field rules. [`validate`] checks a raw record in two phases (every
//! field on its own, then the cross-field rules) and returns a
//! [`ValidationResult`] holding at most one message per field, or the coerced
//! canonical record when everything passes. [`FormSession`] is the thin
//! stateful layer a UI drives: per-field live feedback, observers, async
//! checks, and submission gated on validity.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use regform::{registration_schema, FormSession, JsonConfirmation, RegformConfig, SubmitOutcome};
//!
//! let schema = Arc::new(registration_schema(&RegformConfig::default())?);
//! let mut session = FormSession::new(schema);
//!
//! session.set_value("name", "Ivan")?;
//! session.set_value("phone", "+7 (912) 345-67-__")?;
//! assert_eq!(session.error("phone"), Some("Enter the full phone number"));
//!
//! let mut confirmation = JsonConfirmation::new(std::io::stdout());
//! match session.submit(&mut confirmation) {
//!     SubmitOutcome::Submitted(_) => {}
//!     SubmitOutcome::Invalid => println!("{:?}", session.errors()),
//!     SubmitOutcome::Pending(fields) => println!("still checking {:?}", fields),
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod field;
pub mod pending;
pub mod presenter;
pub mod registration;
pub mod result;
pub mod rule;
pub mod schema;
pub mod session;
pub mod value;

// Re-export main types
pub use config::RegformConfig;
pub use engine::{validate, validate_field, validate_with_external};
pub use error::{SchemaError, SessionError};
pub use field::{FieldDescriptor, Transform};
pub use pending::{CheckTicket, PendingCheck};
pub use presenter::{JsonConfirmation, Presenter};
pub use registration::{registration_schema, RegistrationField};
pub use result::ValidationResult;
pub use rule::{AsyncRule, CrossFieldRule, Rule, RuleContext};
pub use schema::{Schema, SchemaBuilder};
pub use session::{FieldEvent, FormSession, SessionState, SubmitOutcome, SubscriptionId};
pub use value::{CanonicalRecord, FieldKind, FieldValue, RawRecord, RawValue};

pub use regform_rules::{PhoneShape, RuleResult};
