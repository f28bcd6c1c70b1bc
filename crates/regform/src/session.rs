// File: src/session.rs
// Purpose: Mutable per-form state between the UI and the validation engine
//
// Edits validate only the changed field (and fields whose cross-field rules
// read it); the full schema runs on submit. Observers are plain callbacks
// registered per field.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use regform_rules::RuleResult;
use tracing::{debug, info, warn};

use crate::engine;
use crate::error::SessionError;
use crate::pending::{CheckTicket, PendingCheck, PendingChecks};
use crate::presenter::Presenter;
use crate::result::ValidationResult;
use crate::schema::Schema;
use crate::value::{CanonicalRecord, RawRecord, RawValue};

/// Lifecycle of a form session.
///
/// `Pristine → Editing → {Valid, Invalid} → Submitting → Submitted`; an edit
/// from any state goes back to `Editing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Pristine,
    Editing,
    Valid,
    Invalid,
    Submitting,
    Submitted,
}

/// Notification delivered to the observers of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEvent {
    ValueChanged { field: String, value: RawValue },
    /// The displayed error changed; `None` means the error cleared.
    ErrorChanged { field: String, error: Option<String> },
    PendingChanged { field: String, pending: bool },
}

impl FieldEvent {
    pub fn field(&self) -> &str {
        match self {
            FieldEvent::ValueChanged { field, .. }
            | FieldEvent::ErrorChanged { field, .. }
            | FieldEvent::PendingChanged { field, .. } => field,
        }
    }
}

/// Handle returned by [`FormSession::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// What a submit attempt did.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Valid; the record was handed to the presenter.
    Submitted(CanonicalRecord),
    /// Invalid; errors are in [`FormSession::last_result`].
    Invalid,
    /// Blocked by outstanding asynchronous checks on these fields.
    Pending(Vec<String>),
}

type Callback = Box<dyn FnMut(&FieldEvent)>;

struct Subscription {
    id: SubscriptionId,
    field: String,
    callback: Callback,
}

#[derive(Default)]
struct Observers {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

impl Observers {
    fn add(&mut self, field: String, callback: Callback) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscriptions.push(Subscription { id, field, callback });
        id
    }

    fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|sub| sub.id != id);
        self.subscriptions.len() != before
    }

    fn emit(&mut self, event: FieldEvent) {
        for sub in self.subscriptions.iter_mut().filter(|sub| sub.field == event.field()) {
            (sub.callback)(&event);
        }
    }
}

/// In-progress state of one form instance.
///
/// Not shared across threads: it belongs to whoever handles the input events.
/// The schema behind it is shared read-only.
pub struct FormSession {
    schema: Arc<Schema>,
    values: RawRecord,
    touched: BTreeSet<String>,
    errors: IndexMap<String, String>,
    async_errors: HashMap<String, String>,
    pending: PendingChecks,
    last_result: Option<ValidationResult>,
    state: SessionState,
    observers: Observers,
}

impl FormSession {
    pub fn new(schema: Arc<Schema>) -> Self {
        let values = schema
            .field_names()
            .map(|name| (name.to_string(), RawValue::Missing))
            .collect();

        Self {
            schema,
            values,
            touched: BTreeSet::new(),
            errors: IndexMap::new(),
            async_errors: HashMap::new(),
            pending: PendingChecks::default(),
            last_result: None,
            state: SessionState::Pristine,
            observers: Observers::default(),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn values(&self) -> &RawRecord {
        &self.values
    }

    pub fn value(&self, field: &str) -> Option<&RawValue> {
        self.values.get(field)
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.contains(field)
    }

    /// Currently displayed error for `field`.
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// All displayed errors, in schema order.
    pub fn errors(&self) -> &IndexMap<String, String> {
        &self.errors
    }

    pub fn is_pending(&self, field: &str) -> bool {
        self.pending.is_pending(field)
    }

    /// Result of the most recent full validation; `None` until the first
    /// [`validate_all`](Self::validate_all) or submit attempt.
    pub fn last_result(&self) -> Option<&ValidationResult> {
        self.last_result.as_ref()
    }

    /// Whether the submit control should be enabled. Never on an untouched form.
    pub fn can_submit(&self) -> bool {
        !matches!(self.state, SessionState::Pristine | SessionState::Submitting)
            && self.errors.is_empty()
            && self.pending.is_empty()
    }

    /// Registers `callback` for events about `field`.
    pub fn subscribe<F>(&mut self, field: &str, callback: F) -> Result<SubscriptionId, SessionError>
    where
        F: FnMut(&FieldEvent) + 'static,
    {
        self.ensure_field(field)?;
        Ok(self.observers.add(field.to_string(), Box::new(callback)))
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.remove(id)
    }

    /// Records a new raw value for `field` and re-validates it.
    ///
    /// Fields whose cross-field rules read `field` are re-validated too once
    /// they have been touched, so a confirmation field follows password edits.
    /// If the field passes its synchronous rules and carries an async rule, the
    /// check is returned for the caller to drive; see [`resolve`](Self::resolve).
    pub fn set_value(
        &mut self,
        field: &str,
        value: impl Into<RawValue>,
    ) -> Result<Option<PendingCheck>, SessionError> {
        self.ensure_field(field)?;
        let value = value.into();

        if self.state != SessionState::Editing {
            debug!("Session {:?} -> Editing ({} changed)", self.state, field);
            self.state = SessionState::Editing;
        }

        self.values.insert(field.to_string(), value.clone());
        self.touched.insert(field.to_string());
        self.observers.emit(FieldEvent::ValueChanged {
            field: field.to_string(),
            value,
        });

        self.async_errors.remove(field);
        if self.pending.cancel(field) {
            debug!("Superseded pending check on {}", field);
            self.emit_pending(field, false);
        }

        self.refresh_error(field);
        for dependent in self.dependents_of(field) {
            self.refresh_error(&dependent);
        }

        Ok(self.start_async_check(field))
    }

    /// Marks `field` as touched (blur) and shows its current error.
    pub fn touch(&mut self, field: &str) -> Result<(), SessionError> {
        self.ensure_field(field)?;
        self.touched.insert(field.to_string());
        self.refresh_error(field);
        Ok(())
    }

    /// Reports the outcome of an async check.
    ///
    /// Returns `false`, changing nothing, when the ticket was superseded by a
    /// later edit or already resolved.
    pub fn resolve(&mut self, ticket: &CheckTicket, result: RuleResult) -> bool {
        if !self.pending.complete(ticket) {
            debug!("Ignoring stale check result for {}", ticket.field());
            return false;
        }

        let field = ticket.field();
        match result {
            Ok(()) => {
                self.async_errors.remove(field);
            }
            Err(message) => {
                self.async_errors.insert(field.to_string(), message);
            }
        }

        self.emit_pending(field, false);
        self.refresh_error(field);
        true
    }

    /// Runs the full schema without submitting and shows every error.
    pub fn validate_all(&mut self) -> &ValidationResult {
        let result = self.full_validation();
        self.state = if result.is_valid() {
            SessionState::Valid
        } else {
            SessionState::Invalid
        };
        self.last_result.insert(result)
    }

    /// Attempts submission.
    ///
    /// Runs the full schema; only a valid record reaches `presenter`. Blocked
    /// without validating while async checks are outstanding.
    pub fn submit<P: Presenter + ?Sized>(&mut self, presenter: &mut P) -> SubmitOutcome {
        if !self.pending.is_empty() {
            let fields = self.pending.fields();
            warn!("Submit blocked by pending checks: {:?}", fields);
            return SubmitOutcome::Pending(fields);
        }

        let result = self.validate_all();
        let record = match result.canonical() {
            Some(record) => record.clone(),
            None => {
                info!("Submit rejected: {} field errors", result.error_count());
                return SubmitOutcome::Invalid;
            }
        };

        self.state = SessionState::Submitting;
        presenter.present(&record);
        self.state = SessionState::Submitted;
        info!("Form submitted ({} fields)", record.len());

        SubmitOutcome::Submitted(record)
    }

    /// Back to a pristine form. Subscriptions survive.
    pub fn reset(&mut self) {
        for field in self.errors.keys().cloned().collect::<Vec<_>>() {
            self.set_error(&field, None);
        }
        for field in self.pending.fields() {
            self.emit_pending(&field, false);
        }

        for value in self.values.values_mut() {
            *value = RawValue::Missing;
        }
        self.touched.clear();
        self.async_errors.clear();
        self.pending.clear();
        self.last_result = None;
        self.state = SessionState::Pristine;
    }

    fn ensure_field(&self, field: &str) -> Result<(), SessionError> {
        if self.schema.contains(field) {
            Ok(())
        } else {
            Err(SessionError::UnknownField(field.to_string()))
        }
    }

    /// Touched fields whose cross-field rules read `field`.
    fn dependents_of(&self, field: &str) -> Vec<String> {
        let mut dependents: Vec<String> = Vec::new();
        for rule in self.schema.rules_depending_on(field) {
            let target = rule.attach_to();
            if target != field && self.touched.contains(target) && !dependents.iter().any(|d| d == target) {
                dependents.push(target.to_string());
            }
        }
        dependents
    }

    fn start_async_check(&mut self, field: &str) -> Option<PendingCheck> {
        if self.errors.contains_key(field) {
            return None;
        }
        let rule = self.schema.field(field)?.get_async_rule()?.clone();
        let value = engine::coerce_field(&self.schema, field, &self.values)?;
        if value.is_missing() {
            return None;
        }

        let ticket = self.pending.begin(field);
        debug!("Started async check {} on {}", rule.name(), field);
        self.emit_pending(field, true);

        Some(PendingCheck {
            ticket,
            future: rule.check(&value),
        })
    }

    /// Full validation merged with resolved async failures. Every field's
    /// displayed error is synced to the result.
    fn full_validation(&mut self) -> ValidationResult {
        let result = engine::validate_with_external(&self.schema, &self.values, &self.async_errors);

        let names: Vec<String> = self.schema.field_names().map(str::to_string).collect();
        for name in &names {
            self.touched.insert(name.clone());
            self.set_error(name, result.error(name).map(str::to_string));
        }
        result
    }

    fn refresh_error(&mut self, field: &str) {
        let error = engine::validate_field(&self.schema, field, &self.values)
            .or_else(|| self.async_errors.get(field).cloned());
        self.set_error(field, error);
    }

    fn set_error(&mut self, field: &str, error: Option<String>) {
        if self.errors.get(field) == error.as_ref() {
            return;
        }

        match &error {
            Some(message) => {
                self.errors.insert(field.to_string(), message.clone());
                self.sort_errors();
            }
            None => {
                self.errors.shift_remove(field);
            }
        }

        self.observers.emit(FieldEvent::ErrorChanged {
            field: field.to_string(),
            error,
        });
    }

    fn sort_errors(&mut self) {
        let schema = Arc::clone(&self.schema);
        self.errors.sort_by_cached_key(|name, _| {
            schema
                .field_names()
                .position(|n| n == name)
                .unwrap_or(usize::MAX)
        });
    }

    fn emit_pending(&mut self, field: &str, pending: bool) {
        self.observers.emit(FieldEvent::PendingChanged {
            field: field.to_string(),
            pending,
        });
    }
}

impl fmt::Debug for FormSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormSession")
            .field("state", &self.state)
            .field("values", &self.values)
            .field("touched", &self.touched)
            .field("errors", &self.errors)
            .field("pending", &self.pending.fields())
            .field("observers", &self.observers.subscriptions.len())
            .finish()
    }
}
