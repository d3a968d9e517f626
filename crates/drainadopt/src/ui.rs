//! Interaction seams shared by the views.
//!
//! Views report outcomes as one-shot [`Notification`]s, move between screens
//! through a [`Navigator`], and ask the user yes/no questions through a
//! [`Confirm`]. Each seam has a console implementation for the CLI and an
//! in-memory one for embedding and tests.

use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::api::DrainApi;
use crate::model::Session;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    /// Progress information.
    Info,
    /// An action succeeded.
    Success,
    /// An action failed.
    Error,
}

impl std::fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Text shown to the user.
    pub message: String,
    /// When the notification was raised.
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    /// Create a notification stamped with the current time.
    #[must_use]
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Receives notifications raised by the views.
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Show one notification.
    fn notify(&self, notification: Notification);

    /// Show an informational message.
    fn info(&self, message: &str) {
        self.notify(Notification::new(NotificationLevel::Info, message));
    }

    /// Show a success message.
    fn success(&self, message: &str) {
        self.notify(Notification::new(NotificationLevel::Success, message));
    }

    /// Show an error message.
    fn error(&self, message: &str) {
        self.notify(Notification::new(NotificationLevel::Error, message));
    }
}

/// Prints notifications to stderr and counts errors.
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    errors: AtomicUsize,
}

impl ConsoleNotifier {
    /// Create a console notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of error notifications shown so far.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors.load(Ordering::SeqCst)
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        debug!(level = %notification.level, message = %notification.message, "Notification");
        let marker = match notification.level {
            NotificationLevel::Info => "i",
            NotificationLevel::Success => "+",
            NotificationLevel::Error => {
                self.errors.fetch_add(1, Ordering::SeqCst);
                "!"
            }
        };
        eprintln!("[{marker}] {}", notification.message);
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    entries: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    /// Create an empty notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications, oldest first.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages of all notifications, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .map(|n| n.message)
            .collect()
    }

    /// The most recent notification.
    #[must_use]
    pub fn last(&self) -> Option<Notification> {
        self.notifications().pop()
    }

    /// Number of notifications at a given level.
    #[must_use]
    pub fn count(&self, level: NotificationLevel) -> usize {
        self.notifications()
            .iter()
            .filter(|n| n.level == level)
            .count()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

/// Screens a view can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// The sign-in screen.
    Login,
    /// The drain listing.
    DrainList,
    /// One drain's detail screen.
    Drain(i64),
}

impl Route {
    /// Path of this route in the web client.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::DrainList => "/drains".to_string(),
            Self::Drain(id) => format!("/drains/{id}"),
        }
    }
}

/// Moves the user between screens.
pub trait Navigator: Send + Sync + std::fmt::Debug {
    /// Go to `route`.
    fn navigate(&self, route: Route);
}

/// Records every navigation so the host can follow it.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    history: Mutex<Vec<Route>>,
}

impl HistoryNavigator {
    /// Create a navigator with an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every route navigated to, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<Route> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent route.
    #[must_use]
    pub fn current(&self) -> Option<Route> {
        self.history().last().copied()
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, route: Route) {
        info!("Navigating to {}", route.path());
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route);
    }
}

/// Asks the user a yes/no question.
pub trait Confirm: Send + Sync + std::fmt::Debug {
    /// Returns `true` if the user agreed.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Prompts on the terminal. Anything but `y`/`yes` declines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirm {
    assume_yes: bool,
}

impl TerminalConfirm {
    /// Create a prompt; with `assume_yes` every question is answered yes.
    #[must_use]
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        eprint!("{prompt} [y/N] ");
        let _ = std::io::stderr().flush();

        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(_) => false,
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Always gives the same answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedConfirm(pub bool);

impl Confirm for FixedConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

/// Everything a drain view needs from its host.
#[derive(Debug, Clone)]
pub struct ViewContext {
    /// The drain service.
    pub api: Arc<dyn DrainApi>,
    /// Who is signed in.
    pub session: Session,
    /// Where notifications go.
    pub notifier: Arc<dyn Notifier>,
    /// Screen navigation.
    pub navigator: Arc<dyn Navigator>,
    /// Yes/no prompts.
    pub confirm: Arc<dyn Confirm>,
}
