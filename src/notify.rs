//! Notification Sink
//!
//! Progress and outcome messages for the user. The workflow reports into a
//! [`NotificationSink`]; the rendering layer decides how to show them.
//!
//! - [`ToastBoard`]: in-memory list of active toasts, insertion ordered,
//!   each dismissible by timer or by id. Timers are driven by
//!   [`ToastBoard::spawn_expiry`] (or by calling `expire` directly)
//! - [`TracingSink`]: writes every notification to the log
//! - [`Notifier`]: detachable handle the workflow holds, so an abandoned form
//!   stops receiving updates while the transfer itself runs to completion

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::interval;

use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Toast lifetime when none is given
pub const DEFAULT_AUTO_DISMISS: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub detail: String,
    pub severity: Severity,
    /// `None` keeps the toast until dismissed explicitly
    pub auto_dismiss_after: Option<Duration>,
}

impl Notification {
    pub fn new(severity: Severity, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            detail: detail.into(),
            severity,
            auto_dismiss_after: Some(DEFAULT_AUTO_DISMISS),
        }
    }

    pub fn info(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(Severity::Info, title, detail)
    }

    pub fn success(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(Severity::Success, title, detail)
    }

    pub fn warning(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(Severity::Warning, title, detail)
    }

    pub fn error(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(Severity::Error, title, detail)
    }

    pub fn dismiss_after(mut self, after: Option<Duration>) -> Self {
        self.auto_dismiss_after = after;
        self
    }
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

// ============================================================================
// ToastBoard
// ============================================================================

struct Toast {
    notification: Notification,
    posted_at: Instant,
}

impl Toast {
    fn expired(&self, now: Instant) -> bool {
        match self.notification.auto_dismiss_after {
            Some(after) => now.saturating_duration_since(self.posted_at) >= after,
            None => false,
        }
    }
}

/// Active toasts in insertion order
#[derive(Default)]
pub struct ToastBoard {
    toasts: Mutex<Vec<Toast>>,
}

impl ToastBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of currently displayed notifications, oldest first
    pub fn active(&self) -> Vec<Notification> {
        self.toasts
            .lock()
            .map(|t| t.iter().map(|toast| toast.notification.clone()).collect())
            .unwrap_or_default()
    }

    /// Explicit user dismissal. Returns `false` if the id is unknown.
    pub fn dismiss(&self, id: Uuid) -> bool {
        let Ok(mut toasts) = self.toasts.lock() else {
            return false;
        };
        let before = toasts.len();
        toasts.retain(|t| t.notification.id != id);
        toasts.len() != before
    }

    /// Drop toasts whose timer elapsed at `now`; returns how many were removed
    pub fn expire(&self, now: Instant) -> usize {
        let Ok(mut toasts) = self.toasts.lock() else {
            return 0;
        };
        let before = toasts.len();
        toasts.retain(|t| !t.expired(now));
        before - toasts.len()
    }

    /// Run [`ToastBoard::expire`] every `every` on a background task.
    ///
    /// Whoever displays the board starts this once. The task holds only a
    /// weak reference and ends after the last `Arc` to the board is dropped.
    pub fn spawn_expiry(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let board = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut tick = interval(every);
            loop {
                tick.tick().await;
                let Some(board) = board.upgrade() else {
                    break;
                };
                let removed = board.expire(Instant::now());
                if removed > 0 {
                    debug!(removed, "Toasts expired");
                }
            }
        })
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.toasts
            .lock()
            .map(|t| {
                t.iter()
                    .filter(|toast| toast.notification.severity == severity)
                    .count()
            })
            .unwrap_or(0)
    }
}

impl NotificationSink for ToastBoard {
    fn notify(&self, notification: Notification) {
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.push(Toast {
                notification,
                posted_at: Instant::now(),
            });
        }
    }
}

// ============================================================================
// TracingSink
// ============================================================================

/// Sink for headless runs: every notification becomes a log line
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, n: Notification) {
        match n.severity {
            Severity::Info => info!(id = %n.id, "[NOTIFY] {}: {}", n.title, n.detail),
            Severity::Success => info!(id = %n.id, "[NOTIFY] {}: {}", n.title, n.detail),
            Severity::Warning => warn!(id = %n.id, "[NOTIFY] {}: {}", n.title, n.detail),
            Severity::Error => error!(id = %n.id, "[NOTIFY] {}: {}", n.title, n.detail),
        }
    }
}

// ============================================================================
// Notifier
// ============================================================================

/// Forwarding handle that can be cut off from its sink
#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
    attached: Arc<AtomicBool>,
}

impl Notifier {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            sink,
            attached: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Stop forwarding; later notifications are dropped
    pub fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    pub fn notify(&self, notification: Notification) {
        if self.is_attached() {
            self.sink.notify(notification);
        } else {
            debug!(title = %notification.title, "Notification dropped, sink detached");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_keeps_insertion_order() {
        let board = ToastBoard::new();
        board.notify(Notification::info("first", ""));
        board.notify(Notification::error("second", ""));
        board.notify(Notification::success("third", ""));

        let titles: Vec<_> = board.active().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, ["first", "second", "third"]);
        assert_eq!(board.count(Severity::Error), 1);
    }

    #[test]
    fn test_dismiss_by_id() {
        let board = ToastBoard::new();
        let a = Notification::info("a", "");
        let b = Notification::info("b", "");
        let a_id = a.id;
        board.notify(a);
        board.notify(b);

        assert!(board.dismiss(a_id));
        assert!(!board.dismiss(a_id));
        assert_eq!(board.active().len(), 1);
        assert_eq!(board.active()[0].title, "b");
    }

    #[test]
    fn test_timer_expiry() {
        let board = ToastBoard::new();
        board.notify(Notification::info("short", "").dismiss_after(Some(Duration::from_millis(10))));
        board.notify(Notification::info("default", ""));
        board.notify(Notification::error("sticky", "").dismiss_after(None));

        let later = Instant::now() + Duration::from_secs(1);
        assert_eq!(board.expire(later), 1);

        let much_later = Instant::now() + Duration::from_secs(3600);
        assert_eq!(board.expire(much_later), 1);

        let left = board.active();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].title, "sticky");
    }

    #[tokio::test]
    async fn test_expiry_task_clears_timed_toasts() {
        let board = Arc::new(ToastBoard::new());
        let task = board.spawn_expiry(Duration::from_millis(5));

        board.notify(Notification::success("sent", "").dismiss_after(Some(Duration::from_millis(20))));
        board.notify(Notification::error("sticky", "").dismiss_after(None));
        assert_eq!(board.active().len(), 2);

        tokio::time::sleep(Duration::from_millis(100)).await;
        let left = board.active();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].title, "sticky");

        drop(board);
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }

    #[test]
    fn test_notifier_detach() {
        let board = Arc::new(ToastBoard::new());
        let notifier = Notifier::new(board.clone());
        let clone = notifier.clone();

        notifier.notify(Notification::info("before", ""));
        clone.detach();
        notifier.notify(Notification::info("after", ""));

        assert!(!notifier.is_attached());
        assert_eq!(board.active().len(), 1);
    }

    #[test]
    fn test_default_auto_dismiss() {
        let n = Notification::warning("w", "d");
        assert_eq!(n.auto_dismiss_after, Some(DEFAULT_AUTO_DISMISS));
        assert_eq!(n.severity.to_string(), "warning");
    }
}
