// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! Read-only view of the model files on local disk.

use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::domain::ModelInfo;
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct ModelCatalog {
    model_dir: PathBuf,
}

impl ModelCatalog {
    pub fn new<P: Into<PathBuf>>(model_dir: P) -> Self {
        Self {
            model_dir: model_dir.into(),
        }
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Regular files directly inside the model directory, sorted by name.
    /// A missing directory is an empty catalog.
    pub async fn list(&self) -> Result<Vec<ModelInfo>, AppError> {
        let mut entries = match tokio::fs::read_dir(&self.model_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "Failed to read model directory {}: {}",
                    self.model_dir.display(),
                    e
                )))
            }
        };

        let mut models = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::debug!(path = %entry.path().display(), error = %e, "Skipping entry");
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }

            models.push(describe(
                entry.file_name().to_string_lossy().into_owned(),
                &metadata,
            ));
        }

        models.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(models)
    }

    /// Looks up one model file by name.
    ///
    /// The resolved path must stay inside the model directory after
    /// symlinks and `..` are resolved.
    pub async fn get(&self, name: &str) -> Result<ModelInfo, AppError> {
        let not_found = || AppError::NotFound(format!("Model '{}' not found", name));

        let root = tokio::fs::canonicalize(&self.model_dir)
            .await
            .map_err(|_| not_found())?;
        let joined = root.join(name);
        let (candidate, exists) = match tokio::fs::canonicalize(&joined).await {
            Ok(path) => (path, true),
            Err(_) => (normalize_lexically(&joined), false),
        };

        if !candidate.starts_with(&root) {
            tracing::warn!(name = %name, "Rejected model lookup outside the model directory");
            return Err(AppError::Forbidden(format!(
                "Model '{}' is outside the model directory",
                name
            )));
        }
        if !exists {
            return Err(not_found());
        }

        let metadata = tokio::fs::metadata(&candidate)
            .await
            .map_err(|_| not_found())?;
        if !metadata.is_file() {
            return Err(not_found());
        }

        let file_name = candidate
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
        Ok(describe(file_name, &metadata))
    }
}

/// Resolves `.` and `..` without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

fn describe(name: String, metadata: &std::fs::Metadata) -> ModelInfo {
    let modified = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0.0, |d| d.as_secs_f64());

    ModelInfo {
        name,
        size: metadata.len(),
        modified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn catalog_with_files() -> (TempDir, ModelCatalog) {
        let dir = TempDir::new().unwrap();
        let models = dir.path().join("models");
        std::fs::create_dir(&models).unwrap();
        std::fs::write(models.join("b-model.bin"), vec![0u8; 16]).unwrap();
        std::fs::write(models.join("a-model.onnx"), b"abc").unwrap();
        std::fs::create_dir(models.join("subdir")).unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"top secret").unwrap();

        let catalog = ModelCatalog::new(models);
        (dir, catalog)
    }

    #[tokio::test]
    async fn test_list_sorted_files_only() {
        let (_dir, catalog) = catalog_with_files();
        let models = catalog.list().await.unwrap();

        let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["a-model.onnx", "b-model.bin"]);
        assert_eq!(models[0].size, 3);
        assert_eq!(models[1].size, 16);
        assert!(models.iter().all(|m| m.modified > 0.0));
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let catalog = ModelCatalog::new(dir.path().join("absent"));
        assert!(catalog.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_existing_model() {
        let (_dir, catalog) = catalog_with_files();
        let model = catalog.get("b-model.bin").await.unwrap();
        assert_eq!(model.name, "b-model.bin");
        assert_eq!(model.size, 16);
    }

    #[tokio::test]
    async fn test_get_missing_model() {
        let (_dir, catalog) = catalog_with_files();
        assert!(matches!(
            catalog.get("nope.bin").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            catalog.get("subdir").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_traversal_is_forbidden() {
        let (_dir, catalog) = catalog_with_files();
        assert!(matches!(
            catalog.get("../secret.txt").await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            catalog.get("subdir/../../secret.txt").await,
            Err(AppError::Forbidden(_))
        ));
        // Escaping is refused even when the target does not exist.
        assert!(matches!(
            catalog.get("../../no-such-file").await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_normalize_lexically() {
        assert_eq!(
            normalize_lexically(Path::new("/a/b/./c/../d")),
            PathBuf::from("/a/b/d")
        );
        assert_eq!(normalize_lexically(Path::new("/a/../..")), PathBuf::from("/"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escape_is_forbidden() {
        let (dir, catalog) = catalog_with_files();
        std::os::unix::fs::symlink(
            dir.path().join("secret.txt"),
            catalog.model_dir().join("link.bin"),
        )
        .unwrap();

        assert!(matches!(
            catalog.get("link.bin").await,
            Err(AppError::Forbidden(_))
        ));
    }
}
