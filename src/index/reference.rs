use anyhow::{Context, Result, anyhow};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::AssemblyMetadata;

/// The reference manager's view of which assemblies serve which namespace.
/// Must be fully populated before the first lookup.
pub trait ReferenceManager: Send + Sync {
    fn assemblies_for_namespace(&self, namespace: &str) -> Vec<Arc<str>>;

    /// Assemblies searched for every namespace.
    fn workspace_assemblies(&self) -> Vec<Arc<str>>;

    /// Every namespace the index knows about, in registration order.
    fn namespaces(&self) -> Vec<Arc<str>>;
}

/// Produces metadata for an assembly name.
pub trait AssemblyLoader: Send + Sync {
    fn load(&self, assembly: &str) -> Result<AssemblyMetadata>;
}

#[derive(Debug, Default, Clone)]
pub struct StaticReferences {
    by_namespace: FxHashMap<Arc<str>, Vec<Arc<str>>>,
    order: Vec<Arc<str>>,
    workspace: Vec<Arc<str>>,
}

impl StaticReferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, namespace: &str, assembly: &str) {
        if !self.by_namespace.contains_key(namespace) {
            self.order.push(Arc::from(namespace));
        }
        let entry = self.by_namespace.entry(Arc::from(namespace)).or_default();
        if !entry.iter().any(|a| a.as_ref() == assembly) {
            entry.push(Arc::from(assembly));
        }
    }

    pub fn add_workspace_assembly(&mut self, assembly: &str) {
        if !self.workspace.iter().any(|a| a.as_ref() == assembly) {
            self.workspace.push(Arc::from(assembly));
        }
    }

    /// Bind every namespace declared by `meta` to that assembly.
    pub fn bind_assembly(&mut self, meta: &AssemblyMetadata) {
        for ty in &meta.types {
            if let Some(ns) = ty.namespace.as_deref() {
                self.bind(ns, &meta.name);
            }
        }
    }
}

impl ReferenceManager for StaticReferences {
    fn assemblies_for_namespace(&self, namespace: &str) -> Vec<Arc<str>> {
        self.by_namespace.get(namespace).cloned().unwrap_or_default()
    }

    fn workspace_assemblies(&self) -> Vec<Arc<str>> {
        self.workspace.clone()
    }

    fn namespaces(&self) -> Vec<Arc<str>> {
        self.order.clone()
    }
}

/// Assemblies held in memory, keyed by name.
#[derive(Debug, Default)]
pub struct InMemoryLoader {
    assemblies: FxHashMap<Arc<str>, AssemblyMetadata>,
}

impl InMemoryLoader {
    pub fn new(assemblies: Vec<AssemblyMetadata>) -> Self {
        Self {
            assemblies: assemblies
                .into_iter()
                .map(|a| (Arc::clone(&a.name), a))
                .collect(),
        }
    }
}

impl AssemblyLoader for InMemoryLoader {
    fn load(&self, assembly: &str) -> Result<AssemblyMetadata> {
        self.assemblies
            .get(assembly)
            .cloned()
            .ok_or_else(|| anyhow!("assembly {} not registered", assembly))
    }
}

/// Reads `<assembly>.json` metadata files found under a set of directories.
#[derive(Debug, Default)]
pub struct MetadataDirLoader {
    files: FxHashMap<Arc<str>, PathBuf>,
}

impl MetadataDirLoader {
    pub fn scan<P: AsRef<Path>>(dirs: &[P]) -> Self {
        let mut files = FxHashMap::default();
        for dir in dirs {
            let dir = dir.as_ref();
            for entry in WalkDir::new(dir)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                debug!(assembly = stem, path = %path.display(), "metadata file found");
                files
                    .entry(Arc::from(stem))
                    .or_insert_with(|| path.to_path_buf());
            }
            info!(dir = %dir.display(), "metadata directory scanned");
        }
        Self { files }
    }

    pub fn assembly_names(&self) -> impl Iterator<Item = &Arc<str>> {
        self.files.keys()
    }
}

impl AssemblyLoader for MetadataDirLoader {
    fn load(&self, assembly: &str) -> Result<AssemblyMetadata> {
        let path = self
            .files
            .get(assembly)
            .ok_or_else(|| anyhow!("no metadata file for assembly {}", assembly))?;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let meta: AssemblyMetadata = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(meta)
    }
}

/// Tries each loader in order; the first success wins.
#[derive(Default)]
pub struct LayeredLoader {
    layers: Vec<Box<dyn AssemblyLoader>>,
}

impl LayeredLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, loader: Box<dyn AssemblyLoader>) -> Self {
        self.layers.push(loader);
        self
    }
}

impl AssemblyLoader for LayeredLoader {
    fn load(&self, assembly: &str) -> Result<AssemblyMetadata> {
        let mut last_err = None;
        for layer in &self.layers {
            match layer.load(assembly) {
                Ok(meta) => return Ok(meta),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| anyhow!("no loaders configured")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_bind_keeps_registration_order() {
        let mut refs = StaticReferences::new();
        refs.bind("System.Text", "mscorlib");
        refs.bind("Acme", "Acme.Core");
        refs.bind("System.Text", "mscorlib");
        refs.bind("System.Text", "System.Text.Extras");
        let names: Vec<_> = refs.namespaces().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["System.Text", "Acme"]);
        assert_eq!(refs.assemblies_for_namespace("System.Text").len(), 2);
        assert!(refs.assemblies_for_namespace("Missing").is_empty());
    }

    #[test]
    fn test_metadata_dir_loader_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = std::fs::File::create(dir.path().join("Acme.Core.json")).unwrap();
        write!(
            f,
            r#"{{"name":"Acme.Core","types":[{{"namespace":"Acme","name":"Widget","kind":"class",
                "members":[{{"name":"Size","kind":"property","type":"System.Int32"}}]}}]}}"#
        )
        .unwrap();
        std::fs::write(dir.path().join("Broken.json"), "{ not json").unwrap();

        let loader = MetadataDirLoader::scan(&[dir.path()]);
        let meta = loader.load("Acme.Core").unwrap();
        assert_eq!(meta.types.len(), 1);
        assert_eq!(meta.types[0].members[0].name.as_ref(), "Size");
        assert!(loader.load("Broken").is_err());
        assert!(loader.load("Nope").is_err());
    }

    #[test]
    fn test_layered_loader_falls_through() {
        let first = InMemoryLoader::new(vec![]);
        let second = InMemoryLoader::new(vec![AssemblyMetadata {
            name: Arc::from("B"),
            types: vec![],
        }]);
        let loader = LayeredLoader::new()
            .with_layer(Box::new(first))
            .with_layer(Box::new(second));
        assert!(loader.load("B").is_ok());
        assert!(loader.load("C").is_err());
    }
}
