// src/workspace/manifest.rs

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::fs::FileSystem;

/// Answers "does this package define script S?".
pub trait ScriptLookup {
    fn scripts_of(&self, location: &Path) -> BTreeSet<String>;

    fn has_script(&self, location: &Path, script: &str) -> bool {
        self.scripts_of(location).contains(script)
    }
}

/// The part of `package.json` we care about.
#[derive(Debug, Default, Deserialize)]
struct PackageManifest {
    #[serde(default)]
    scripts: BTreeMap<String, String>,
}

/// Reads script names from each package's manifest file.
///
/// A missing or malformed manifest yields an empty script set.
#[derive(Debug, Clone)]
pub struct ManifestReader {
    fs: Arc<dyn FileSystem>,
    file_name: String,
}

impl ManifestReader {
    pub fn new(fs: Arc<dyn FileSystem>, file_name: impl Into<String>) -> Self {
        Self {
            fs,
            file_name: file_name.into(),
        }
    }
}

impl ScriptLookup for ManifestReader {
    fn scripts_of(&self, location: &Path) -> BTreeSet<String> {
        let path = location.join(&self.file_name);

        if !self.fs.is_file(&path) {
            debug!(path = %path.display(), "no manifest; treating as no scripts");
            return BTreeSet::new();
        }

        let parsed = self
            .fs
            .read_to_string(&path)
            .and_then(|text| Ok(serde_json::from_str::<PackageManifest>(&text)?));

        match parsed {
            Ok(manifest) => manifest.scripts.into_keys().collect(),
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "unreadable manifest; treating as no scripts"
                );
                BTreeSet::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn reader(fs: &MockFileSystem) -> ManifestReader {
        ManifestReader::new(Arc::new(fs.clone()), "package.json")
    }

    #[test]
    fn lists_declared_scripts() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "/repo/lib/package.json",
            r#"{ "name": "lib", "scripts": { "build": "tsc", "test": "jest" } }"#,
        );

        let scripts = reader(&fs).scripts_of(Path::new("/repo/lib"));
        assert_eq!(
            scripts.into_iter().collect::<Vec<_>>(),
            vec!["build".to_string(), "test".to_string()]
        );
    }

    #[test]
    fn missing_manifest_has_no_scripts() {
        let fs = MockFileSystem::new();
        assert!(!reader(&fs).has_script(Path::new("/repo/ghost"), "build"));
    }

    #[test]
    fn malformed_manifest_has_no_scripts() {
        let fs = MockFileSystem::new();
        fs.add_file("/repo/bad/package.json", "{ not json");
        assert!(reader(&fs).scripts_of(Path::new("/repo/bad")).is_empty());
    }

    #[test]
    fn manifest_without_scripts_section_has_no_scripts() {
        let fs = MockFileSystem::new();
        fs.add_file("/repo/bare/package.json", r#"{ "name": "bare" }"#);
        assert!(reader(&fs).scripts_of(Path::new("/repo/bare")).is_empty());
    }
}
