//! Name to constructor registry for notifiers.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

use super::{FileNotifier, Notifier, SlackNotifier, StdoutNotifier, FILE, SLACK, STDOUT};
use crate::error::{Error, Result};
use crate::settings::Settings;

/// Builds a notifier from configuration bound when it was registered.
pub type NotifierCreator = Box<dyn Fn() -> Result<Arc<dyn Notifier>> + Send + Sync>;

/// Maps lowercase notifier names to their constructors.
///
/// Construction is deferred until [`resolve`](Self::resolve), so only the
/// notifiers a user selects have to be fully configured.
#[derive(Default)]
pub struct NotifierRegistry {
    creators: RwLock<BTreeMap<String, NotifierCreator>>,
}

impl NotifierRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in `stdout`, `file` and `slack`
    /// notifiers, configured from `settings`.
    pub fn builtin(settings: &Settings) -> Result<Self> {
        let registry = Self::new();

        registry.register(STDOUT, || Ok(Arc::new(StdoutNotifier::new()) as Arc<dyn Notifier>))?;

        let path = settings.file.path.clone();
        registry.register(FILE, move || {
            let path = path
                .as_ref()
                .ok_or_else(|| Error::notifier_config(FILE, "file path must be supplied for the file notifier"))?;
            let notifier = FileNotifier::new(path).map_err(|e| {
                Error::notifier_config(FILE, format!("error opening {}: {}", path.display(), e))
            })?;
            Ok(Arc::new(notifier) as Arc<dyn Notifier>)
        })?;

        let slack = settings.slack.clone();
        registry.register(SLACK, move || {
            Ok(Arc::new(SlackNotifier::new(slack.clone())?) as Arc<dyn Notifier>)
        })?;

        Ok(registry)
    }

    /// Register a constructor under `name`.
    ///
    /// Fails if the name is taken; the existing registration is kept.
    pub fn register<F>(&self, name: &str, creator: F) -> Result<()>
    where
        F: Fn() -> Result<Arc<dyn Notifier>> + Send + Sync + 'static,
    {
        let mut creators = self.creators.write();
        if creators.contains_key(name) {
            return Err(Error::DuplicateNotifier(name.to_string()));
        }
        creators.insert(name.to_string(), Box::new(creator));
        Ok(())
    }

    /// Construct the notifier registered under `name`.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Notifier>> {
        let creators = self.creators.read();
        let creator = creators
            .get(name)
            .ok_or_else(|| Error::UnknownNotifier(name.to_string()))?;
        creator()
    }

    /// Resolve and connect each notifier in `names`, in order.
    ///
    /// A name may appear once. On the first failure every notifier built so
    /// far is cleaned up and the error returned.
    pub async fn connect_all(&self, names: &[&str]) -> Result<Vec<Arc<dyn Notifier>>> {
        let mut notifiers: Vec<Arc<dyn Notifier>> = Vec::with_capacity(names.len());
        for &name in names {
            match self.connect(name, &notifiers).await {
                Ok(notifier) => notifiers.push(notifier),
                Err(e) => {
                    cleanup_all(&notifiers);
                    return Err(e);
                }
            }
        }
        Ok(notifiers)
    }

    async fn connect(&self, name: &str, built: &[Arc<dyn Notifier>]) -> Result<Arc<dyn Notifier>> {
        if built.iter().any(|n| n.name() == name) {
            return Err(Error::DuplicateNotifier(name.to_string()));
        }

        let notifier = self.resolve(name)?;
        if let Err(e) = notifier.connect().await {
            cleanup_all(std::slice::from_ref(&notifier));
            return Err(Error::notifier_config(name, e.to_string()));
        }
        Ok(notifier)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.creators.read().keys().cloned().collect()
    }
}

/// Call `cleanup` on each notifier, logging failures.
fn cleanup_all(notifiers: &[Arc<dyn Notifier>]) {
    for notifier in notifiers {
        if let Err(e) = notifier.cleanup() {
            warn!(notifier = %notifier.name(), error = %e, "Error cleaning up notifier");
        }
    }
}

impl fmt::Debug for NotifierRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifierRegistry")
            .field("names", &self.names())
            .finish()
    }
}
