use axum::body::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use uuid::Uuid;

/// Preview content held while its handle is alive
#[derive(Debug, Clone)]
pub struct PreviewContent {
    pub content_type: String,
    pub bytes: Bytes,
}

type PreviewMap = Mutex<HashMap<Uuid, PreviewContent>>;

fn lock(map: &PreviewMap) -> MutexGuard<'_, HashMap<Uuid, PreviewContent>> {
    map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Per-session store of media previews.
///
/// Each entry is owned by exactly one [`PreviewHandle`]; the entry is released
/// when its handle drops.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    entries: Arc<PreviewMap>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, content_type: &str, bytes: Bytes) -> PreviewHandle {
        let id = Uuid::now_v7();
        lock(&self.entries).insert(
            id,
            PreviewContent {
                content_type: content_type.to_string(),
                bytes,
            },
        );

        PreviewHandle {
            id,
            registry: Arc::downgrade(&self.entries),
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<PreviewContent> {
        lock(&self.entries).get(id).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Owning handle to one registered preview; dropping it revokes the preview
#[derive(Debug)]
pub struct PreviewHandle {
    id: Uuid,
    registry: Weak<PreviewMap>,
}

impl PreviewHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        if let Some(entries) = self.registry.upgrade() {
            lock(&entries).remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_releases_preview() {
        let registry = PreviewRegistry::new();
        let first = registry.register("image/png", Bytes::from_static(b"png"));
        let second = registry.register("video/mp4", Bytes::from_static(b"mp4"));
        assert_eq!(registry.len(), 2);

        let first_id = first.id();
        drop(first);

        assert_eq!(registry.len(), 1);
        assert!(registry.get(&first_id).is_none());
        assert_eq!(
            registry.get(&second.id()).map(|p| p.content_type),
            Some("video/mp4".to_string())
        );
    }

    #[test]
    fn test_handle_outliving_registry() {
        let registry = PreviewRegistry::new();
        let handle = registry.register("image/jpeg", Bytes::from_static(b"jpg"));
        drop(registry);
        drop(handle);
    }
}
