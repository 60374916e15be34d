use anyhow::{Context, Result, bail};
use std::sync::OnceLock;

use super::{AssemblyLoader, AssemblyMetadata, StaticReferences};

pub const CORLIB_ASSEMBLY: &str = "mscorlib";

static CORLIB_JSON: &str = include_str!("corlib.json");
static CORLIB: OnceLock<Result<AssemblyMetadata, String>> = OnceLock::new();

/// Built-in metadata for the core library, bundled with the binary.
pub fn corlib_metadata() -> Result<AssemblyMetadata> {
    let parsed = CORLIB.get_or_init(|| {
        serde_json::from_str::<AssemblyMetadata>(CORLIB_JSON).map_err(|e| e.to_string())
    });
    match parsed {
        Ok(meta) => Ok(meta.clone()),
        Err(e) => bail!("bundled corlib metadata is invalid: {}", e),
    }
}

/// Serves only the bundled core library.
#[derive(Debug, Default, Clone, Copy)]
pub struct CorlibLoader;

impl AssemblyLoader for CorlibLoader {
    fn load(&self, assembly: &str) -> Result<AssemblyMetadata> {
        if assembly != CORLIB_ASSEMBLY {
            bail!("{} is not the core library", assembly);
        }
        corlib_metadata()
    }
}

/// Bind every namespace of the bundled core library.
pub fn bind_corlib(refs: &mut StaticReferences) -> Result<()> {
    let meta = corlib_metadata().context("binding core library namespaces")?;
    refs.bind_assembly(&meta);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{BindingMode, TypeCatalog};
    use std::sync::Arc;

    fn corlib_catalog() -> TypeCatalog {
        let mut refs = StaticReferences::new();
        bind_corlib(&mut refs).unwrap();
        TypeCatalog::new(Arc::new(refs), Arc::new(CorlibLoader))
    }

    #[test]
    fn test_bundled_metadata_parses() {
        let meta = corlib_metadata().unwrap();
        assert_eq!(meta.name.as_ref(), CORLIB_ASSEMBLY);
        assert!(meta.types.iter().any(|t| t.full_name() == "System.String"));
        assert!(CorlibLoader.load("Other").is_err());
    }

    #[test]
    fn test_keyword_alias_resolves_to_system_type() {
        let catalog = corlib_catalog();
        let prefixes = vec![Arc::from("")];
        let r = catalog.resolve_qualified_type("string", &prefixes).unwrap();
        assert_eq!(r.full_name.as_ref(), "System.String");
        let names: Vec<_> = catalog
            .get_members(&r, BindingMode::Static, false)
            .into_iter()
            .map(|i| i.display_text.to_string())
            .collect();
        assert!(names.contains(&"IsNullOrEmpty".to_string()));
        assert!(!names.contains(&"Length".to_string()));
    }

    #[test]
    fn test_generic_list_members_substitute_argument() {
        let catalog = corlib_catalog();
        let prefixes: Vec<Arc<str>> = vec![Arc::from(""), Arc::from("System.Collections.Generic")];
        let list = catalog.resolve_qualified_type("List<string>", &prefixes).unwrap();
        let hit = catalog
            .find_member(&list, "Item", BindingMode::Instance, false)
            .unwrap();
        assert_eq!(hit.declaring.substitute(&hit.member.member_type).as_str(), "string");
    }
}
