//! Notifier that appends changes to a file.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{Message, Notifier, WriterNotifier};
use crate::error::NotifyError;

/// Registry name of the file notifier.
pub const FILE: &str = "file";

/// Appends one line per change to a file.
///
/// The file is created if missing (readable by the owner only on unix) and
/// never truncated, so restarts keep the history.
#[derive(Debug)]
pub struct FileNotifier {
    path: PathBuf,
    inner: WriterNotifier<File>,
}

impl FileNotifier {
    /// Open `path` for appending.
    pub fn new<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();

        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let file = options.open(&path)?;

        Ok(Self {
            path,
            inner: WriterNotifier::new(file),
        })
    }

    /// The file being written.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Notifier for FileNotifier {
    fn name(&self) -> &str {
        FILE
    }

    async fn notify(&self, message: &Message) -> Result<(), NotifyError> {
        self.inner.write_message(message)
    }

    fn cleanup(&self) -> Result<(), NotifyError> {
        self.inner.flush()
    }
}
