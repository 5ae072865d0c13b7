use std::sync::{Arc, Mutex};

/// Navigator
///
/// Client-side navigation. A navigation replaces the current page, so anything
/// still in flight for the page being left is simply discarded.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

pub type NavigatorState = Arc<dyn Navigator>;

/// HistoryNavigator
///
/// Records every navigation in order. The last entry is the current location.
#[derive(Clone, Default)]
pub struct HistoryNavigator {
    history: Arc<Mutex<Vec<String>>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<String> {
        self.history.lock().ok()?.last().cloned()
    }

    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, path: &str) {
        tracing::debug!(to = %path, "client navigation");
        if let Ok(mut history) = self.history.lock() {
            history.push(path.to_string());
        }
    }
}
