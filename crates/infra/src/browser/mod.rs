//! Browser-side adapters for headless hosts
//!
//! [`InMemoryLocation`] stands in for the address bar when there is no real
//! browser (CLI tools, integration tests). [`TracingNotifier`] surfaces
//! toasts as log events.

use calgentic_core::{BrowserLocation, Notifier};
use calgentic_domain::{NavigationTarget, Notification, NotificationLevel};
use parking_lot::Mutex;
use tracing::{info, warn};
use url::Url;

/// Address bar held in memory.
///
/// Route navigations resolve against the current URL; external
/// navigations are recorded but leave the location unchanged, since the
/// page would be unloaded in a real browser.
#[derive(Debug)]
pub struct InMemoryLocation {
    current: Mutex<Url>,
    history: Mutex<Vec<NavigationTarget>>,
}

impl InMemoryLocation {
    pub fn new(url: Url) -> Self {
        Self { current: Mutex::new(url), history: Mutex::new(Vec::new()) }
    }

    /// Every navigation requested so far, oldest first.
    pub fn history(&self) -> Vec<NavigationTarget> {
        self.history.lock().clone()
    }

    /// Most recent external navigation, if any.
    pub fn last_external(&self) -> Option<Url> {
        self.history.lock().iter().rev().find_map(|target| match target {
            NavigationTarget::External(url) => Some(url.clone()),
            NavigationTarget::Route(_) => None,
        })
    }
}

impl BrowserLocation for InMemoryLocation {
    fn current_url(&self) -> Url {
        self.current.lock().clone()
    }

    fn replace_url(&self, url: &Url) {
        *self.current.lock() = url.clone();
    }

    fn navigate(&self, target: NavigationTarget) {
        if let NavigationTarget::Route(route) = &target {
            let mut current = self.current.lock();
            match current.join(route) {
                Ok(next) => *current = next,
                Err(e) => warn!(route = %route, error = %e, "Ignoring unresolvable route"),
            }
        }
        self.history.lock().push(target);
    }
}

/// Notifier that logs each notification at a matching level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => warn!(message = %notification.message, "notification"),
            NotificationLevel::Success | NotificationLevel::Info => {
                info!(level = ?notification.level, message = %notification.message, "notification");
            }
        }
    }
}
