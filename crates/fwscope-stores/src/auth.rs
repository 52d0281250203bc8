use tokio::sync::watch;

use crate::Store;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub is_logged_in: bool,
    pub is_configured: bool,
}

/// Login state
#[derive(Clone, Default)]
pub struct AuthStore {
    state: Store<AuthState>,
}

impl AuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AuthState {
        self.state.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn login(&self) {
        self.state.update(|s| s.is_logged_in = true);
    }

    pub fn logout(&self) {
        self.state.update(|s| s.is_logged_in = false);
    }

    /// Record whether an API endpoint has been configured
    pub fn set_configured(&self, value: bool) {
        self.state.update(|s| s.is_configured = value);
    }

    /// Back to logged out and unconfigured
    pub fn reset(&self) {
        self.state.set(AuthState::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_logout_keeps_configured() {
        let auth = AuthStore::new();
        auth.set_configured(true);
        auth.login();
        assert_eq!(
            auth.state(),
            AuthState {
                is_logged_in: true,
                is_configured: true
            }
        );

        auth.logout();
        assert!(!auth.state().is_logged_in);
        assert!(auth.state().is_configured);
    }

    #[test]
    fn test_reset() {
        let auth = AuthStore::new();
        auth.login();
        auth.set_configured(true);
        auth.reset();
        assert_eq!(auth.state(), AuthState::default());
    }

    #[tokio::test]
    async fn test_subscribers_are_notified() {
        let auth = AuthStore::new();
        let mut rx = auth.subscribe();

        auth.login();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_logged_in);
    }
}
