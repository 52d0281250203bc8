use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::Store;

/// How long a toast stays up unless told otherwise
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3000);

/// Toast severity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ToastKind {
    Success,
    Error,
    #[default]
    Info,
    Warning,
}

impl ToastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
            Self::Warning => "warning",
        }
    }
}

/// A transient notification
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
    /// Zero means the toast stays until removed
    pub duration: Duration,
}

struct ToastInner {
    toasts: Store<Vec<Toast>>,
    next_id: AtomicU64,
    /// Pending auto-dismiss timers by toast id
    timers: Mutex<HashMap<u64, JoinHandle<()>>>,
}

/// Ordered list of toasts with timed dismissal
#[derive(Clone)]
pub struct ToastStore {
    inner: Arc<ToastInner>,
}

impl ToastStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ToastInner {
                toasts: Store::default(),
                next_id: AtomicU64::new(0),
                timers: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Current toasts, oldest first
    pub fn toasts(&self) -> Vec<Toast> {
        self.inner.toasts.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Toast>> {
        self.inner.toasts.subscribe()
    }

    /// Show a toast and return its id
    ///
    /// `None` uses [`DEFAULT_TOAST_DURATION`]. A non-zero duration schedules
    /// removal; a zero duration keeps the toast until [`remove`](Self::remove).
    pub fn add(&self, message: impl Into<String>, kind: ToastKind, duration: Option<Duration>) -> u64 {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let duration = duration.unwrap_or(DEFAULT_TOAST_DURATION);

        let toast = Toast {
            id,
            message: message.into(),
            kind,
            duration,
        };
        self.inner.toasts.update(|toasts| toasts.push(toast));

        if !duration.is_zero() {
            self.schedule_removal(id, duration);
        }

        id
    }

    pub fn success(&self, message: impl Into<String>, duration: Option<Duration>) -> u64 {
        self.add(message, ToastKind::Success, duration)
    }

    pub fn error(&self, message: impl Into<String>, duration: Option<Duration>) -> u64 {
        self.add(message, ToastKind::Error, duration)
    }

    pub fn info(&self, message: impl Into<String>, duration: Option<Duration>) -> u64 {
        self.add(message, ToastKind::Info, duration)
    }

    pub fn warning(&self, message: impl Into<String>, duration: Option<Duration>) -> u64 {
        self.add(message, ToastKind::Warning, duration)
    }

    /// Remove a toast and cancel its timer
    pub fn remove(&self, id: u64) {
        if let Some(timer) = self.inner.timers.lock().remove(&id) {
            timer.abort();
        }
        self.inner.remove_toast(id);
    }

    fn schedule_removal(&self, id: u64, duration: Duration) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(id, "no tokio runtime, toast will not be dismissed automatically");
            return;
        };

        // Held across spawn so the timer can't fire before it is registered
        let mut timers = self.inner.timers.lock();
        let inner: Weak<ToastInner> = Arc::downgrade(&self.inner);

        let timer = runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(inner) = inner.upgrade() {
                inner.timers.lock().remove(&id);
                inner.remove_toast(id);
            }
        });
        timers.insert(id, timer);
    }
}

impl ToastInner {
    fn remove_toast(&self, id: u64) {
        self.toasts.update(|toasts| toasts.retain(|t| t.id != id));
    }
}

impl Default for ToastStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ToastInner {
    fn drop(&mut self) {
        for (_, timer) in self.timers.get_mut().drain() {
            timer.abort();
        }
    }
}
