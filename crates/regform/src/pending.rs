//! Bookkeeping for outstanding asynchronous field checks.
//!
//! Every check gets a ticket carrying a generation number. Editing the field
//! again starts a new generation, so the result of a superseded check can be
//! recognised and dropped when it finally arrives.

use std::collections::HashMap;
use std::fmt;

use futures::future::BoxFuture;
use regform_rules::RuleResult;

/// Identifies one asynchronous check of one field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CheckTicket {
    field: String,
    generation: u64,
}

impl CheckTicket {
    pub fn field(&self) -> &str {
        &self.field
    }
}

/// A started check: drive `future` on any executor, then hand its output to
/// [`FormSession::resolve`](crate::FormSession::resolve) together with `ticket`.
pub struct PendingCheck {
    pub ticket: CheckTicket,
    pub future: BoxFuture<'static, RuleResult>,
}

impl fmt::Debug for PendingCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCheck")
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub(crate) struct PendingChecks {
    next_generation: u64,
    active: HashMap<String, u64>,
}

impl PendingChecks {
    /// Starts a check for `field`, superseding any check already running for it.
    pub(crate) fn begin(&mut self, field: &str) -> CheckTicket {
        self.next_generation += 1;
        self.active.insert(field.to_string(), self.next_generation);
        CheckTicket {
            field: field.to_string(),
            generation: self.next_generation,
        }
    }

    /// Forgets the running check for `field`. Returns whether one was running.
    pub(crate) fn cancel(&mut self, field: &str) -> bool {
        self.active.remove(field).is_some()
    }

    /// Completes `ticket` if it is still the current check for its field.
    pub(crate) fn complete(&mut self, ticket: &CheckTicket) -> bool {
        match self.active.get(&ticket.field) {
            Some(generation) if *generation == ticket.generation => {
                self.active.remove(&ticket.field);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn is_pending(&self, field: &str) -> bool {
        self.active.contains_key(field)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub(crate) fn fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = self.active.keys().cloned().collect();
        fields.sort();
        fields
    }

    pub(crate) fn clear(&mut self) {
        self.active.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_ticket_completes_once() {
        let mut checks = PendingChecks::default();
        let ticket = checks.begin("email");
        assert!(checks.is_pending("email"));
        assert!(checks.complete(&ticket));
        assert!(!checks.complete(&ticket));
        assert!(checks.is_empty());
    }

    #[test]
    fn test_superseded_ticket_is_ignored() {
        let mut checks = PendingChecks::default();
        let old = checks.begin("email");
        let new = checks.begin("email");
        assert_ne!(old, new);
        assert!(!checks.complete(&old));
        assert!(checks.is_pending("email"));
        assert!(checks.complete(&new));
    }

    #[test]
    fn test_cancel() {
        let mut checks = PendingChecks::default();
        let ticket = checks.begin("email");
        checks.begin("name");
        assert!(checks.cancel("email"));
        assert!(!checks.cancel("email"));
        assert!(!checks.complete(&ticket));
        assert_eq!(checks.fields(), vec!["name".to_string()]);
    }
}
