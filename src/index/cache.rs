use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{AssemblyLoader, LoadedAssembly};

/// Read-through assembly cache. Entries are populated on first reference and
/// never evicted; a failed load is remembered as `None` so it is not retried
/// on every keystroke.
pub struct AssemblyCache {
    loader: Arc<dyn AssemblyLoader>,
    entries: DashMap<Arc<str>, Option<Arc<LoadedAssembly>>>,
}

impl AssemblyCache {
    pub fn new(loader: Arc<dyn AssemblyLoader>) -> Self {
        Self {
            loader,
            entries: DashMap::new(),
        }
    }

    pub fn get_or_load(&self, name: &str) -> Option<Arc<LoadedAssembly>> {
        if let Some(entry) = self.entries.get(name) {
            return entry.value().clone();
        }

        // Load outside the shard lock; a racing loader loses and its result is dropped.
        let loaded = match self.loader.load(name) {
            Ok(meta) => {
                debug!(assembly = name, types = meta.types.len(), "assembly loaded");
                Some(Arc::new(LoadedAssembly::new(meta)))
            }
            Err(e) => {
                warn!(assembly = name, error = %e, "assembly skipped");
                None
            }
        };

        self.entries
            .entry(Arc::from(name))
            .or_insert(loaded)
            .value()
            .clone()
    }

    pub fn loaded_count(&self) -> usize {
        self.entries.iter().filter(|e| e.value().is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::AssemblyMetadata;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLoader {
        calls: AtomicUsize,
    }

    impl AssemblyLoader for CountingLoader {
        fn load(&self, assembly: &str) -> anyhow::Result<AssemblyMetadata> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if assembly == "Broken" {
                anyhow::bail!("corrupt metadata");
            }
            Ok(AssemblyMetadata {
                name: Arc::from(assembly),
                types: vec![],
            })
        }
    }

    #[test]
    fn test_loads_once_and_caches() {
        let loader = Arc::new(CountingLoader {
            calls: AtomicUsize::new(0),
        });
        let cache = AssemblyCache::new(loader.clone());
        assert!(cache.get_or_load("Core").is_some());
        assert!(cache.get_or_load("Core").is_some());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_load_is_remembered() {
        let loader = Arc::new(CountingLoader {
            calls: AtomicUsize::new(0),
        });
        let cache = AssemblyCache::new(loader.clone());
        assert!(cache.get_or_load("Broken").is_none());
        assert!(cache.get_or_load("Broken").is_none());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.loaded_count(), 0);
    }
}
