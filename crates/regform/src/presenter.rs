// File: src/presenter.rs
// Purpose: Output boundary for successful submissions

use std::io::Write;

use crate::value::CanonicalRecord;

/// Receives the canonical record after a successful submission.
///
/// Only ever called with a record that passed validation.
pub trait Presenter {
    fn present(&mut self, record: &CanonicalRecord);
}

impl<F> Presenter for F
where
    F: FnMut(&CanonicalRecord),
{
    fn present(&mut self, record: &CanonicalRecord) {
        self(record)
    }
}

pub const DEFAULT_CONFIRMATION_TITLE: &str = "Successfully registered";

/// Echoes the submitted record as pretty-printed JSON under a title line,
/// the way the registration confirmation dialog shows it.
#[derive(Debug)]
pub struct JsonConfirmation<W: Write> {
    title: String,
    writer: W,
}

impl<W: Write> JsonConfirmation<W> {
    pub fn new(writer: W) -> Self {
        Self::with_title(DEFAULT_CONFIRMATION_TITLE, writer)
    }

    pub fn with_title(title: impl Into<String>, writer: W) -> Self {
        Self {
            title: title.into(),
            writer,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_record(&mut self, record: &CanonicalRecord) -> anyhow::Result<()> {
        let body = serde_json::to_string_pretty(record)?;
        writeln!(self.writer, "{}", self.title)?;
        writeln!(self.writer, "{}", body)?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> Presenter for JsonConfirmation<W> {
    fn present(&mut self, record: &CanonicalRecord) {
        if let Err(err) = self.write_record(record) {
            tracing::error!("Failed to write confirmation: {}", err);
        }
    }
}
