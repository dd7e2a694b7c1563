//! Preview handles for staged uploads.
//!
//! A [`PreviewGuard`] stands for a rendered preview of a staged file (an
//! object URL in a browser, a thumbnail in a terminal). It is registered with
//! a [`PreviewRegistry`] on creation and unregistered when dropped, so a
//! preview can never outlive the upload it shows.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewInfo {
    pub file_name: String,
    pub mime: String,
    pub size: usize,
}

/// Shared table of live previews.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<Mutex<HashMap<Uuid, PreviewInfo>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a preview and return the guard that owns it.
    pub fn register(&self, info: PreviewInfo) -> PreviewGuard {
        let id = Uuid::new_v4();
        tracing::debug!(event = "preview.register", %id, file = %info.file_name, size = info.size);
        self.table().insert(id, info);
        PreviewGuard {
            id,
            registry: self.clone(),
        }
    }

    /// Number of previews currently alive.
    pub fn live_count(&self) -> usize {
        self.table().len()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.table().contains_key(&id)
    }

    pub fn get(&self, id: Uuid) -> Option<PreviewInfo> {
        self.table().get(&id).cloned()
    }

    fn release(&self, id: Uuid) {
        if self.table().remove(&id).is_some() {
            tracing::debug!(event = "preview.release", %id);
        }
    }

    fn table(&self) -> MutexGuard<'_, HashMap<Uuid, PreviewInfo>> {
        self.live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Owns one registered preview; dropping it releases the preview.
#[derive(Debug)]
pub struct PreviewGuard {
    id: Uuid,
    registry: PreviewRegistry,
}

impl PreviewGuard {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for PreviewGuard {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(name: &str) -> PreviewInfo {
        PreviewInfo {
            file_name: name.into(),
            mime: "image/png".into(),
            size: 3,
        }
    }

    #[test]
    fn guard_releases_on_drop() {
        let registry = PreviewRegistry::new();
        let guard = registry.register(info("a.png"));
        let id = guard.id();
        assert!(registry.contains(id));
        assert_eq!(registry.get(id).unwrap().file_name, "a.png");

        drop(guard);
        assert!(!registry.contains(id));
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn clones_share_the_same_table() {
        let registry = PreviewRegistry::new();
        let other = registry.clone();
        let _a = registry.register(info("a.png"));
        let _b = other.register(info("b.png"));
        assert_eq!(registry.live_count(), 2);
    }
}
