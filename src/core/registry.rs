//! Model registry loading and lookup
//!
//! A registry description is a JSON object keyed by model identifier:
//!
//! ```json
//! {
//!   "fren": {
//!     "model": {"name": "model.fren.intgemm.alphas.bin"},
//!     "lex":   {"name": "lex.50.50.fren.s2t.bin"},
//!     "vocab": {"name": "vocab.fren.spm"}
//!   }
//! }
//! ```
//!
//! File names are relative to the directory holding the registry file.
//! The loaded [`Registry`] is an immutable snapshot.

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::core::errors::{KotkiError, Result};
use crate::core::models::{ModelEntry, ModelId};

/// System-wide model directory
pub const USR_MODEL_DIR: &str = "/usr/share/kotki/";

/// File name searched for during discovery
pub const REGISTRY_FILE_NAME: &str = "registry.json";

const REQUIRED_FILES: [&str; 3] = ["model", "lex", "vocab"];

/// Immutable snapshot of known translation models
#[derive(Debug, Clone, Default)]
pub struct Registry {
    models: BTreeMap<ModelId, ModelEntry>,
}

impl Registry {
    /// Build a registry from already-loaded entries
    pub fn from_entries(entries: impl IntoIterator<Item = ModelEntry>) -> Self {
        let models = entries
            .into_iter()
            .map(|entry| (entry.name.clone(), entry))
            .collect();
        Self { models }
    }

    /// Load from an explicit path, or discover registry files when `None`
    pub fn scan(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                debug!("Loading registry from {}", path.display());
                Self::load(path)
            }
            None => {
                debug!("Discovering registry files");
                Self::discover()
            }
        }
    }

    /// Load a single registry description file
    pub fn load(path: &Path) -> Result<Self> {
        if path.extension().map(|e| e != "json").unwrap_or(true) {
            return Err(KotkiError::Registry {
                message: format!("{} is not a .json file", path.display()),
            });
        }

        Self::load_all(&[path.to_path_buf()])
    }

    /// Search the default locations for registry files
    pub fn discover() -> Result<Self> {
        let usr_dir = PathBuf::from(USR_MODEL_DIR);
        let cfg_dir = config_model_dir();
        Self::discover_in(&usr_dir, &cfg_dir)
    }

    /// Every registry under `usr_dir`, then the first one under `cfg_dir`
    pub fn discover_in(usr_dir: &Path, cfg_dir: &Path) -> Result<Self> {
        let mut paths = find_registry_files(usr_dir);
        if let Some(first) = find_registry_files(cfg_dir).into_iter().next() {
            paths.push(first);
        }

        if paths.is_empty() {
            return Err(KotkiError::Registry {
                message: format!(
                    "Could not auto-find models. Search directories:\n- {}\n- {}",
                    cfg_dir.display(),
                    usr_dir.display()
                ),
            });
        }

        Self::load_all(&paths)
    }

    fn load_all(paths: &[PathBuf]) -> Result<Self> {
        let mut models = BTreeMap::new();
        for path in paths {
            for entry in parse_registry_file(path)? {
                models.insert(entry.name.clone(), entry);
            }
        }

        info!("Loaded {} translation models", models.len());
        Ok(Self { models })
    }

    /// Exact membership test
    pub fn contains(&self, id: &ModelId) -> bool {
        self.models.contains_key(id)
    }

    /// Fail with `ModelNotFound` when `id` is not in this snapshot
    pub fn validate(&self, id: &ModelId, auto_detected: bool) -> Result<()> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(KotkiError::ModelNotFound {
                model: id.to_string(),
                auto_detected,
            })
        }
    }

    pub fn get(&self, id: &ModelId) -> Option<&ModelEntry> {
        self.models.get(id)
    }

    /// Known identifiers in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &ModelId> {
        self.models.keys()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Listing keyed by identifier
    pub fn list_models(&self) -> BTreeMap<String, BTreeMap<String, String>> {
        self.models
            .iter()
            .map(|(id, entry)| (id.to_string(), entry.to_listing()))
            .collect()
    }
}

/// `<config>/kotki/models/`
fn config_model_dir() -> PathBuf {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_default();
    base.join("kotki").join("models")
}

fn find_registry_files(root: &Path) -> Vec<PathBuf> {
    if !root.is_dir() {
        return Vec::new();
    }

    walkdir::WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == REGISTRY_FILE_NAME)
        .map(|e| e.into_path())
        .collect()
}

fn parse_registry_file(path: &Path) -> Result<Vec<ModelEntry>> {
    let content = std::fs::read_to_string(path).map_err(|e| KotkiError::Registry {
        message: format!("{}: {}", path.display(), e),
    })?;
    let doc: Value = serde_json::from_str(&content).map_err(|e| KotkiError::Registry {
        message: format!("could not parse {}: {}", path.display(), e),
    })?;
    let root = doc.as_object().ok_or_else(|| KotkiError::Registry {
        message: format!("{} is not a JSON object", path.display()),
    })?;

    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let cwd = format!("{}/", dir.display());

    let mut entries = Vec::new();
    for (name, value) in root {
        if name.len() != 4 || !name.is_ascii() {
            continue;
        }

        let mut files = Vec::with_capacity(REQUIRED_FILES.len());
        for required in REQUIRED_FILES {
            match value[required]["name"].as_str() {
                Some(file) => files.push(format!("{}{}", cwd, file)),
                None => {
                    warn!("Skipping model {} because {} was missing", name, required);
                    break;
                }
            }
        }
        if files.len() != REQUIRED_FILES.len() {
            continue;
        }

        if let Some(missing) = files.iter().find(|f| !Path::new(f).exists()) {
            warn!("Skipping model {} because path {} does not exist", name, missing);
            continue;
        }

        let mut files = files.into_iter();
        entries.push(ModelEntry {
            name: ModelId::new(name.as_str()),
            cwd: cwd.clone(),
            model: files.next().unwrap_or_default(),
            lex: files.next().unwrap_or_default(),
            vocab: files.next().unwrap_or_default(),
        });
    }

    debug!("{}: {} usable models", path.display(), entries.len());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_model_files(dir: &Path, id: &str) {
        for file in [
            format!("model.{}.bin", id),
            format!("lex.{}.bin", id),
            format!("vocab.{}.spm", id),
        ] {
            std::fs::write(dir.join(file), b"").unwrap();
        }
    }

    fn entry_json(id: &str) -> Value {
        serde_json::json!({
            "model": {"name": format!("model.{}.bin", id)},
            "lex": {"name": format!("lex.{}.bin", id)},
            "vocab": {"name": format!("vocab.{}.spm", id)},
        })
    }

    fn write_registry(dir: &Path, doc: &Value) -> PathBuf {
        let path = dir.join(REGISTRY_FILE_NAME);
        std::fs::write(&path, serde_json::to_string_pretty(doc).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_load_registry() {
        let tmp = TempDir::new().unwrap();
        write_model_files(tmp.path(), "fren");
        write_model_files(tmp.path(), "deen");
        let path = write_registry(
            tmp.path(),
            &serde_json::json!({"fren": entry_json("fren"), "deen": entry_json("deen")}),
        );

        let registry = Registry::load(&path).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&ModelId::new("fren")));

        let entry = registry.get(&ModelId::new("fren")).unwrap();
        assert_eq!(entry.cwd, format!("{}/", tmp.path().display()));
        assert!(entry.model.ends_with("model.fren.bin"));
        assert!(entry.vocab.ends_with("vocab.fren.spm"));
    }

    #[test]
    fn test_skips_invalid_entries() {
        let tmp = TempDir::new().unwrap();
        write_model_files(tmp.path(), "fren");
        let path = write_registry(
            tmp.path(),
            &serde_json::json!({
                "fren": entry_json("fren"),
                // files never written
                "esen": entry_json("esen"),
                // no lex member
                "iten": {"model": {"name": "model.fren.bin"}, "vocab": {"name": "vocab.fren.spm"}},
                // not four characters
                "french": entry_json("fren"),
            }),
        );

        let registry = Registry::load(&path).unwrap();
        let ids: Vec<&str> = registry.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["fren"]);
    }

    #[test]
    fn test_skips_non_ascii_entries() {
        let tmp = TempDir::new().unwrap();
        write_model_files(tmp.path(), "fren");
        // four characters in five bytes, and four bytes in three characters
        write_model_files(tmp.path(), "frén");
        write_model_files(tmp.path(), "fré");
        let path = write_registry(
            tmp.path(),
            &serde_json::json!({
                "fren": entry_json("fren"),
                "frén": entry_json("frén"),
                "fré": entry_json("fré"),
            }),
        );

        let registry = Registry::load(&path).unwrap();
        let ids: Vec<&str> = registry.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["fren"]);
    }

    #[test]
    fn test_load_rejects_non_json_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("registry.txt");
        std::fs::write(&path, "{}").unwrap();

        assert!(matches!(
            Registry::load(&path),
            Err(KotkiError::Registry { .. })
        ));
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(REGISTRY_FILE_NAME);
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            Registry::load(&path),
            Err(KotkiError::Registry { .. })
        ));
    }

    #[test]
    fn test_discover_in() {
        let usr = TempDir::new().unwrap();
        let cfg = TempDir::new().unwrap();

        let usr_models = usr.path().join("fren");
        std::fs::create_dir_all(&usr_models).unwrap();
        write_model_files(&usr_models, "fren");
        write_registry(&usr_models, &serde_json::json!({"fren": entry_json("fren")}));

        for (sub, id) in [("a", "deen"), ("b", "esen")] {
            let dir = cfg.path().join(sub);
            std::fs::create_dir_all(&dir).unwrap();
            write_model_files(&dir, id);
            let mut doc = serde_json::Map::new();
            doc.insert(id.to_string(), entry_json(id));
            write_registry(&dir, &Value::Object(doc));
        }

        let registry = Registry::discover_in(usr.path(), cfg.path()).unwrap();
        let ids: Vec<&str> = registry.ids().map(|id| id.as_str()).collect();
        // only the first registry under the config dir is used
        assert_eq!(ids, vec!["deen", "fren"]);
    }

    #[test]
    fn test_discover_in_nothing_found() {
        let usr = TempDir::new().unwrap();
        let cfg = TempDir::new().unwrap();

        let err = Registry::discover_in(usr.path(), cfg.path()).unwrap_err();
        assert!(err.to_string().contains("Could not auto-find models"));
    }

    #[test]
    fn test_validate() {
        let registry = Registry::from_entries(vec![ModelEntry {
            name: ModelId::new("fren"),
            cwd: "/m/".to_string(),
            model: "/m/model".to_string(),
            lex: "/m/lex".to_string(),
            vocab: "/m/vocab".to_string(),
        }]);

        assert!(registry.validate(&ModelId::new("fren"), false).is_ok());
        for id in ["FREN", "fre", "frenx", "deen", ""] {
            assert!(matches!(
                registry.validate(&ModelId::new(id), true),
                Err(KotkiError::ModelNotFound { auto_detected: true, .. })
            ));
        }
    }

    #[test]
    fn test_list_models() {
        let registry = Registry::from_entries(vec![ModelEntry {
            name: ModelId::new("fren"),
            cwd: "/m/".to_string(),
            model: "/m/model".to_string(),
            lex: "/m/lex".to_string(),
            vocab: "/m/vocab".to_string(),
        }]);

        let listing = registry.list_models();
        assert_eq!(listing.keys().collect::<Vec<_>>(), vec!["fren"]);
        assert_eq!(listing["fren"]["description"], "French -> English");
        assert_eq!(listing["fren"]["version"], "");
    }
}
