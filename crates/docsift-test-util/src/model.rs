//! Where tests look for the real embedding model.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable overriding the model root in tests.
pub const MODEL_DIR_ENV: &str = "DOCSIFT_MODEL_DIR";

/// Files `docsift model download` leaves in `<root>/gte-multilingual-base`
/// that loading cannot do without.
const REQUIRED_FILES: &[&str] = &["model_int8.onnx", "tokenizer.json"];

/// Model root for tests: `DOCSIFT_MODEL_DIR` when set and non-empty,
/// otherwise `~/.docsift/models`.
pub fn model_dir() -> PathBuf {
    resolve(std::env::var_os(MODEL_DIR_ENV), dirs::home_dir())
}

fn resolve(overridden: Option<OsString>, home: Option<PathBuf>) -> PathBuf {
    match overridden.filter(|dir| !dir.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => home
            .unwrap_or_else(std::env::temp_dir)
            .join(".docsift")
            .join("models"),
    }
}

/// Whether the model has been downloaded under `root`.
pub fn model_present(root: &Path) -> bool {
    let dir = root.join("gte-multilingual-base");
    REQUIRED_FILES.iter().all(|file| dir.join(file).is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_home() {
        let root = resolve(Some("/models".into()), Some(PathBuf::from("/home/u")));
        assert_eq!(root, PathBuf::from("/models"));
    }

    #[test]
    fn empty_override_falls_back_to_home() {
        let root = resolve(Some(OsString::new()), Some(PathBuf::from("/home/u")));
        assert_eq!(root, PathBuf::from("/home/u/.docsift/models"));
    }

    #[test]
    fn missing_home_falls_back_to_temp_dir() {
        let root = resolve(None, None);
        assert!(root.starts_with(std::env::temp_dir()));
        assert!(root.ends_with(".docsift/models"));
    }

    #[test]
    fn model_present_needs_every_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("gte-multilingual-base");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("model_int8.onnx"), b"onnx").unwrap();
        assert!(!model_present(tmp.path()));

        std::fs::write(dir.join("tokenizer.json"), b"{}").unwrap();
        assert!(model_present(tmp.path()));
    }
}
