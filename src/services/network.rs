use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Network availability as a plain boolean signal.
///
/// Connection management lives elsewhere; it flips this flag and every
/// collaborator caller checks it first. Unavailable is a normal condition.
#[derive(Debug, Clone)]
pub struct NetworkStatus {
    available: Arc<AtomicBool>,
}

impl NetworkStatus {
    pub fn new(available: bool) -> Self {
        Self {
            available: Arc::new(AtomicBool::new(available)),
        }
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }
}

impl Default for NetworkStatus {
    fn default() -> Self {
        Self::new(true)
    }
}
