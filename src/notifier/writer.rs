//! Plain text notifier over any `io::Write`.

use std::fmt::Debug;
use std::io::Write;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{Message, Notifier};
use crate::error::NotifyError;
use crate::render::format_timestamp;

const WRITER: &str = "writer-notifier";

/// Writes one line per change to the wrapped writer.
///
/// This is the building block of the `stdout` and `file` notifiers and is not
/// registered on its own.
#[derive(Debug)]
pub struct WriterNotifier<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send + Debug> WriterNotifier<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Write a message to the underlying writer and flush it.
    pub fn write_message(&self, message: &Message) -> Result<(), NotifyError> {
        let mut writer = self.writer.lock();
        write_message(&mut *writer, message)?;
        writer.flush().map_err(|source| NotifyError::Write {
            what: "message",
            source,
        })
    }

    /// Flush the underlying writer.
    pub fn flush(&self) -> Result<(), NotifyError> {
        self.writer.lock().flush().map_err(NotifyError::Cleanup)
    }

    /// Consume the notifier and return the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W: Write + Send + Debug> Notifier for WriterNotifier<W> {
    fn name(&self) -> &str {
        WRITER
    }

    async fn notify(&self, message: &Message) -> Result<(), NotifyError> {
        self.write_message(message)
    }

    fn cleanup(&self) -> Result<(), NotifyError> {
        self.flush()
    }
}

/// Render a message the way [`WriterNotifier`] writes it.
pub fn render_text(message: &Message) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_message(&mut buf, message);
    String::from_utf8_lossy(&buf).into_owned()
}

fn write_message<W: Write + ?Sized>(w: &mut W, message: &Message) -> Result<(), NotifyError> {
    if let Some(status) = &message.changed_status {
        writeln!(w, "Status: {} ({})", status.indicator, status.description)
            .map_err(|source| NotifyError::Write { what: "status", source })?;
    }

    for component in &message.changed_components {
        writeln!(
            w,
            "Component {}: {}, updated at: {}",
            component.name,
            component.status,
            format_timestamp(component.updated_at)
        )
        .map_err(|source| NotifyError::Write {
            what: "component",
            source,
        })?;
    }

    for incident in &message.changed_incidents {
        writeln!(
            w,
            "Incident {}: {}, updated at: {}{}",
            incident.name,
            incident.status,
            format_timestamp(incident.updated_at),
            latest_body(incident.latest_update().map(|u| u.body.as_str()))
        )
        .map_err(|source| NotifyError::Write {
            what: "incident",
            source,
        })?;
    }

    for maintenance in &message.changed_scheduled_maintenances {
        writeln!(
            w,
            "Scheduled maintenance {}: {}, updated at: {}{}",
            maintenance.name,
            maintenance.status,
            format_timestamp(maintenance.updated_at),
            latest_body(maintenance.latest_update().map(|u| u.body.as_str()))
        )
        .map_err(|source| NotifyError::Write {
            what: "scheduled maintenance",
            source,
        })?;
    }

    Ok(())
}

fn latest_body(body: Option<&str>) -> String {
    match body {
        Some(body) if !body.is_empty() => format!(" - {}", body),
        _ => String::new(),
    }
}
