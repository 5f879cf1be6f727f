//! Notifier that prints changes to standard output.

use std::io::{self, Stdout};

use async_trait::async_trait;

use super::{Message, Notifier, WriterNotifier};
use crate::error::NotifyError;

/// Registry name of the stdout notifier.
pub const STDOUT: &str = "stdout";

/// Prints one line per change to standard output.
#[derive(Debug)]
pub struct StdoutNotifier {
    inner: WriterNotifier<Stdout>,
}

impl StdoutNotifier {
    pub fn new() -> Self {
        Self {
            inner: WriterNotifier::new(io::stdout()),
        }
    }
}

impl Default for StdoutNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for StdoutNotifier {
    fn name(&self) -> &str {
        STDOUT
    }

    async fn notify(&self, message: &Message) -> Result<(), NotifyError> {
        self.inner.write_message(message)
    }

    fn cleanup(&self) -> Result<(), NotifyError> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stdout_notifier() {
        let notifier = StdoutNotifier::new();
        assert_eq!(notifier.name(), "stdout");

        notifier.notify(&Message::default()).await.unwrap();
        notifier.cleanup().unwrap();
    }
}
