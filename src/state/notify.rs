//! Transient status-line notifications

use std::time::{Duration, Instant};

use tracing::{info, warn};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

/// What happens when a notification expires
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NotificationAction {
    Dismiss,
    /// Reload the listing (used after load failures)
    Reload,
}

impl NotificationAction {
    pub fn lifetime(self) -> Duration {
        match self {
            NotificationAction::Dismiss => Duration::from_millis(3000),
            NotificationAction::Reload => Duration::from_millis(6000),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub action: NotificationAction,
    pub expires_at: Instant,
}

/// Queue of notifications; the newest one is displayed
#[derive(Debug, Default)]
pub struct Notifications {
    items: Vec<Notification>,
    /// Every message ever shown, oldest first
    #[cfg(test)]
    history: Vec<String>,
}

impl Notifications {
    pub fn push(&mut self, message: impl Into<String>, kind: NotificationKind, action: NotificationAction) {
        let message = message.into();
        match kind {
            NotificationKind::Error => warn!(%message, "notification"),
            _ => info!(%message, "notification"),
        }
        #[cfg(test)]
        self.history.push(message.clone());
        self.items.push(Notification {
            message,
            kind,
            action,
            expires_at: Instant::now() + action.lifetime(),
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(message, NotificationKind::Success, NotificationAction::Dismiss);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message, NotificationKind::Error, NotificationAction::Dismiss);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(message, NotificationKind::Info, NotificationAction::Dismiss);
    }

    pub fn current(&self) -> Option<&Notification> {
        self.items.last()
    }

    /// Drop the displayed notification (Esc in the browser)
    pub fn dismiss(&mut self) {
        self.items.pop();
    }

    /// Remove expired notifications; returns the actions they carried
    pub fn expire(&mut self, now: Instant) -> Vec<NotificationAction> {
        let mut actions = Vec::new();
        self.items.retain(|n| {
            if n.expires_at <= now {
                actions.push(n.action);
                false
            } else {
                true
            }
        });
        actions
    }

    #[cfg(test)]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    #[cfg(test)]
    pub fn count_containing(&self, needle: &str) -> usize {
        self.history.iter().filter(|m| m.contains(needle)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_is_current() {
        let mut n = Notifications::default();
        n.info("one");
        n.error("two");
        let current = n.current().unwrap();
        assert_eq!(current.message, "two");
        assert_eq!(current.kind, NotificationKind::Error);
        n.dismiss();
        assert_eq!(n.current().unwrap().message, "one");
    }

    #[test]
    fn test_expire_reports_actions() {
        let mut n = Notifications::default();
        n.info("short");
        n.push("reload", NotificationKind::Error, NotificationAction::Reload);

        let now = Instant::now();
        assert!(n.expire(now).is_empty());

        let actions = n.expire(now + Duration::from_millis(3500));
        assert_eq!(actions, vec![NotificationAction::Dismiss]);
        assert_eq!(n.current().unwrap().message, "reload");

        let actions = n.expire(now + Duration::from_millis(6500));
        assert_eq!(actions, vec![NotificationAction::Reload]);
        assert!(n.current().is_none());
        assert_eq!(n.history().len(), 2);
    }
}
