use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::index::corlib::{CorlibLoader, bind_corlib};
use crate::index::{LayeredLoader, MetadataDirLoader, StaticReferences, TypeCatalog};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeAssistConfig {
    /// Directories scanned for `<assembly>.json` metadata files.
    pub metadata_paths: Vec<PathBuf>,
    /// namespace -> assemblies that declare types in it
    pub namespace_assemblies: BTreeMap<String, Vec<String>>,
    /// Searched for every namespace.
    pub workspace_assemblies: Vec<String>,
    pub include_corlib: bool,
    /// Show non-public members of library types.
    pub allow_non_public: bool,
}

impl Default for CodeAssistConfig {
    fn default() -> Self {
        Self {
            metadata_paths: Vec::new(),
            namespace_assemblies: BTreeMap::new(),
            workspace_assemblies: Vec::new(),
            include_corlib: true,
            allow_non_public: false,
        }
    }
}

impl CodeAssistConfig {
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Reference index and loader stack described by this configuration.
    /// Metadata directories are scanned here; assemblies load lazily.
    pub fn build_catalog(&self) -> Result<TypeCatalog> {
        let mut refs = StaticReferences::new();
        let mut loader = LayeredLoader::new();
        if self.include_corlib {
            bind_corlib(&mut refs)?;
            loader = loader.with_layer(Box::new(CorlibLoader));
        }
        for (namespace, assemblies) in &self.namespace_assemblies {
            for assembly in assemblies {
                refs.bind(namespace, assembly);
            }
        }
        for assembly in &self.workspace_assemblies {
            refs.add_workspace_assembly(assembly);
        }
        if !self.metadata_paths.is_empty() {
            loader = loader.with_layer(Box::new(MetadataDirLoader::scan(&self.metadata_paths)));
        }
        Ok(TypeCatalog::new(Arc::new(refs), Arc::new(loader)))
    }
}
