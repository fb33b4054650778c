//! In-Memory Rendition Store Implementation

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::RwLock;

use dashmap::DashMap;

use crate::application::ports::{RenditionStorePort, StoreProgress};
use crate::domain::generation::Rendition;

/// 内存演绎缓存（每个会话一个实例）
pub struct InMemoryRenditionStore {
    complete: DashMap<u32, Vec<Rendition>>,
    current_fragment: AtomicU32,
    total_fragments: AtomicU32,
    fingerprint: RwLock<Option<String>>,
}

impl InMemoryRenditionStore {
    pub fn new() -> Self {
        Self {
            complete: DashMap::new(),
            current_fragment: AtomicU32::new(0),
            total_fragments: AtomicU32::new(0),
            fingerprint: RwLock::new(None),
        }
    }
}

impl Default for InMemoryRenditionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RenditionStorePort for InMemoryRenditionStore {
    fn has_complete(&self, position: u32) -> bool {
        self.complete.contains_key(&position)
    }

    fn get_renditions(&self, position: u32) -> Vec<Rendition> {
        self.complete
            .get(&position)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    fn record_complete(&self, position: u32, mut renditions: Vec<Rendition>) {
        renditions.sort_by_key(|r| r.label);
        tracing::debug!(position = position, count = renditions.len(), "Renditions cached");
        self.complete.insert(position, renditions);
    }

    fn reset(&self) {
        self.complete.clear();
        self.current_fragment.store(0, Ordering::SeqCst);
        self.total_fragments.store(0, Ordering::SeqCst);
        *self.fingerprint.write().unwrap_or_else(|e| e.into_inner()) = None;
        tracing::debug!("Rendition store reset");
    }

    fn all_renditions(&self) -> Vec<Rendition> {
        let mut all: Vec<Rendition> = self
            .complete
            .iter()
            .flat_map(|entry| entry.value().clone())
            .collect();
        all.sort_by_key(|r| r.key());
        all
    }

    fn completed_positions(&self) -> BTreeSet<u32> {
        self.complete.iter().map(|entry| *entry.key()).collect()
    }

    fn progress(&self) -> StoreProgress {
        StoreProgress {
            current_fragment: self.current_fragment.load(Ordering::SeqCst),
            total_fragments: self.total_fragments.load(Ordering::SeqCst),
        }
    }

    fn set_progress(&self, current_fragment: u32, total_fragments: u32) {
        self.current_fragment.store(current_fragment, Ordering::SeqCst);
        self.total_fragments.store(total_fragments, Ordering::SeqCst);
    }

    fn fingerprint(&self) -> Option<String> {
        self.fingerprint
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set_fingerprint(&self, fingerprint: String) {
        *self.fingerprint.write().unwrap_or_else(|e| e.into_inner()) = Some(fingerprint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::generation::{Fragment, RenditionLabel};

    fn full_set(position: u32) -> Vec<Rendition> {
        let fragment = Fragment::new(position, "Texto.");
        RenditionLabel::first(3)
            .into_iter()
            .rev()
            .map(|label| Rendition::new(&fragment, label, vec![position as u8]))
            .collect()
    }

    #[test]
    fn test_record_and_read_back() {
        let store = InMemoryRenditionStore::new();
        assert!(!store.has_complete(1));
        assert!(store.get_renditions(1).is_empty());

        store.record_complete(1, full_set(1));

        assert!(store.has_complete(1));
        let letters: String = store
            .get_renditions(1)
            .iter()
            .map(|r| r.label.as_char())
            .collect();
        assert_eq!(letters, "abc");
    }

    #[test]
    fn test_all_renditions_ordered_by_position() {
        let store = InMemoryRenditionStore::new();
        store.record_complete(3, full_set(3));
        store.record_complete(1, full_set(1));

        let keys: Vec<(u32, char)> = store
            .all_renditions()
            .iter()
            .map(|r| (r.position, r.label.as_char()))
            .collect();
        assert_eq!(
            keys,
            vec![(1, 'a'), (1, 'b'), (1, 'c'), (3, 'a'), (3, 'b'), (3, 'c')]
        );
        assert_eq!(store.completed_positions().into_iter().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_reset_clears_everything() {
        let store = InMemoryRenditionStore::new();
        store.record_complete(1, full_set(1));
        store.set_progress(1, 4);
        store.set_fingerprint("abc".to_string());

        store.reset();

        assert!(store.all_renditions().is_empty());
        assert_eq!(store.progress(), StoreProgress::default());
        assert!(store.fingerprint().is_none());
    }
}
