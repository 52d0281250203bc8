use tokio::sync::watch;

use crate::Store;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FabState {
    pub is_expanded: bool,
}

/// Floating action button expansion
#[derive(Clone, Default)]
pub struct FabStore {
    state: Store<FabState>,
}

impl FabStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self) -> bool {
        self.state.with(|s| s.is_expanded)
    }

    pub fn subscribe(&self) -> watch::Receiver<FabState> {
        self.state.subscribe()
    }

    pub fn toggle(&self) {
        self.state.update(|s| s.is_expanded = !s.is_expanded);
    }

    pub fn close(&self) {
        self.state.set(FabState { is_expanded: false });
    }
}
