//! Shared flag for an in-flight background load.

/// Wrapped in `Arc<Mutex<_>>` and shared with the loading thread; the result
/// itself travels through a channel.
#[derive(Debug, Default)]
pub struct LoadingState {
    pub in_progress: bool,
}

impl LoadingState {
    pub fn new() -> Self {
        Self::default()
    }
}
