use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use regform::{registration_schema, FormSession, JsonConfirmation, RawRecord, RegformConfig, SubmitOutcome};
use tracing::debug;

/// Returns whether the record was accepted.
pub fn execute(record_path: &Path, config: &RegformConfig) -> Result<bool> {
    let content = fs::read_to_string(record_path)
        .with_context(|| format!("Failed to read record: {}", record_path.display()))?;
    let record: RawRecord = serde_json::from_str(&content)
        .with_context(|| format!("Record is not a JSON object of strings: {}", record_path.display()))?;

    let schema = Arc::new(registration_schema(config)?);
    let mut session = FormSession::new(Arc::clone(&schema));

    for (field, value) in record {
        if !schema.contains(&field) {
            debug!("Skipping unknown field {}", field);
            continue;
        }
        // no async rules in the registration schema, so nothing to drive
        session.set_value(&field, value)?;
    }

    let mut confirmation = JsonConfirmation::new(io::stdout());
    match session.submit(&mut confirmation) {
        SubmitOutcome::Submitted(_) => Ok(true),
        SubmitOutcome::Invalid => {
            let errors = match session.last_result() {
                Some(result) => result.field_errors(),
                None => anyhow::bail!("Submit rejected without a validation result"),
            };
            eprintln!(
                "{}",
                format!("✗ {} field(s) need attention", errors.len()).red().bold()
            );
            for (field, message) in errors {
                println!("{}: {}", field.yellow(), message);
            }
            Ok(false)
        }
        SubmitOutcome::Pending(fields) => {
            anyhow::bail!("Checks still running on: {}", fields.join(", "))
        }
    }
}
