use anyhow::Result;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::index::{LayeredLoader, StaticReferences, TypeCatalog};
use crate::lsp::config::CodeAssistConfig;
use document::DocumentStore;

pub mod document;

/// Open documents plus the process-wide catalog every lookup reads.
pub struct Workspace {
    pub documents: DocumentStore,
    catalog: RwLock<Arc<TypeCatalog>>,
}

impl Workspace {
    pub fn new(catalog: TypeCatalog) -> Self {
        Self {
            documents: DocumentStore::new(),
            catalog: RwLock::new(Arc::new(catalog)),
        }
    }

    /// Snapshot of the current catalog. A rebuild swaps in a new one; lookups
    /// already running keep the one they started with.
    pub async fn catalog(&self) -> Arc<TypeCatalog> {
        Arc::clone(&*self.catalog.read().await)
    }

    /// Build a catalog for `config` on a blocking thread, warm its workspace
    /// assemblies and swap it in.
    pub async fn rebuild_catalog(&self, config: CodeAssistConfig) -> Result<()> {
        let catalog = tokio::task::spawn_blocking(move || -> Result<TypeCatalog> {
            let catalog = config.build_catalog()?;
            catalog.warm();
            Ok(catalog)
        })
        .await??;

        info!(loaded = catalog.loaded_assembly_count(), "catalog rebuilt");
        *self.catalog.write().await = Arc::new(catalog);
        Ok(())
    }
}

impl Default for Workspace {
    fn default() -> Self {
        let config = CodeAssistConfig::default();
        let catalog = match config.build_catalog() {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::warn!(error = %e, "default catalog unavailable, starting empty");
                TypeCatalog::new(
                    Arc::new(StaticReferences::new()),
                    Arc::new(LayeredLoader::new()),
                )
            }
        };
        Self::new(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rebuild_swaps_catalog() {
        let ws = Workspace::default();
        let before = ws.catalog().await;
        assert!(before.find_type("System.String").is_some());

        let config = CodeAssistConfig {
            include_corlib: false,
            ..Default::default()
        };
        ws.rebuild_catalog(config).await.unwrap();
        let after = ws.catalog().await;
        assert!(after.find_type("System.String").is_none());
        assert!(before.find_type("System.String").is_some(), "old snapshot stays usable");
    }
}
