//! UI state containers for fwscope
//!
//! Small observable stores the viewer shares between its screens: login
//! state, the floating action button and transient toast notifications.

mod auth;
mod fab;
mod store;
mod toast;

pub use auth::{AuthState, AuthStore};
pub use fab::{FabState, FabStore};
pub use store::Store;
pub use toast::{DEFAULT_TOAST_DURATION, Toast, ToastKind, ToastStore};
