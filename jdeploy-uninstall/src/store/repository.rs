//! Keyed persistence of one manifest per `(package name, source)` pair.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::error::{StoreError, StoreResult};
use super::writer::ManifestWriter;
use crate::layout::Layout;
use crate::manifest::{check_package_name, UninstallManifest};
use crate::xml::{parse, ManifestValidator, ValidationMode, XmlDocument};

/// Storage for uninstall manifests.
pub trait ManifestRepository {
    /// Persist a manifest, replacing any previous one for the same package.
    fn save(&self, manifest: &UninstallManifest) -> StoreResult<()>;

    /// Load the manifest for a package.
    ///
    /// Returns `Ok(None)` when none was recorded. A manifest that exists but
    /// cannot be read or parsed is an error.
    fn load(&self, package_name: &str, source: Option<&str>)
        -> StoreResult<Option<UninstallManifest>>;

    /// Remove the stored manifest. Returns whether anything was removed;
    /// deleting a missing manifest is not an error.
    fn delete(&self, package_name: &str, source: Option<&str>) -> StoreResult<bool>;
}

/// Repository backed by `<jdeploy_home>/manifests/<arch>/<fqn>/`.
#[derive(Debug, Clone)]
pub struct FileManifestRepository {
    writer: ManifestWriter,
    validator: ManifestValidator,
}

impl FileManifestRepository {
    pub fn new(layout: Layout, mode: ValidationMode) -> Self {
        Self {
            writer: ManifestWriter::new(layout, mode),
            validator: ManifestValidator::new(mode),
        }
    }

    pub fn layout(&self) -> &Layout {
        self.writer.layout()
    }

    /// Canonical manifest location for a package.
    pub fn manifest_path(&self, package_name: &str, source: Option<&str>) -> PathBuf {
        self.layout().manifest_path(package_name, source)
    }

    /// Read and validate a manifest file at an arbitrary location.
    pub fn load_file(&self, path: &Path) -> StoreResult<UninstallManifest> {
        let xml = fs::read_to_string(path).map_err(|e| StoreError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        let document = XmlDocument::parse(&xml).map_err(|e| StoreError::Parse {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        self.validator.validate(&document)?;
        parse(&document).map_err(|e| StoreError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Remove `dir` if it exists and is empty. Failures are ignored.
    fn prune_if_empty(dir: &Path) {
        let is_empty = fs::read_dir(dir)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if is_empty {
            match fs::remove_dir(dir) {
                Ok(()) => debug!(path = %dir.display(), "Removed empty manifest directory"),
                Err(e) => debug!(path = %dir.display(), error = %e, "Could not prune directory"),
            }
        }
    }
}

impl ManifestRepository for FileManifestRepository {
    fn save(&self, manifest: &UninstallManifest) -> StoreResult<()> {
        self.writer.write(manifest).map(|_| ())
    }

    fn load(
        &self,
        package_name: &str,
        source: Option<&str>,
    ) -> StoreResult<Option<UninstallManifest>> {
        check_package_name(package_name)?;
        let path = self.manifest_path(package_name, source);
        if !path.exists() {
            debug!(path = %path.display(), "No manifest on disk");
            return Ok(None);
        }
        self.load_file(&path).map(Some)
    }

    fn delete(&self, package_name: &str, source: Option<&str>) -> StoreResult<bool> {
        check_package_name(package_name)?;
        let dir = self.layout().manifest_dir(package_name, source);
        let removed = match fs::remove_dir_all(&dir) {
            Ok(()) => true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Failed to delete manifest directory");
                return Err(StoreError::DeleteFailed {
                    path: dir,
                    source: e,
                });
            }
        };

        let arch_dir = self.layout().manifests_arch_dir();
        // Scoped npm names nest one level deeper under `@scope/`.
        if let Some(parent) = dir.parent().filter(|p| *p != arch_dir) {
            Self::prune_if_empty(parent);
        }
        Self::prune_if_empty(&arch_dir);
        Self::prune_if_empty(&self.layout().manifests_root());

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{CleanupStrategy, ManifestBuilder, ManifestError};
    use tempfile::TempDir;

    fn setup() -> (TempDir, FileManifestRepository) {
        let temp = TempDir::new().unwrap();
        let layout = Layout::new(temp.path(), temp.path().join(".jdeploy"), "x64");
        let repo = FileManifestRepository::new(layout, ValidationMode::Strict);
        (temp, repo)
    }

    fn manifest(repo: &FileManifestRepository, source: Option<&str>) -> UninstallManifest {
        ManifestBuilder::new(repo.layout())
            .with_package_info("my-app", source, "1.0.0", "x64")
            .unwrap()
            .add_directory("${APP_DIR}", CleanupStrategy::Always, None)
            .build()
            .unwrap()
    }

    #[test]
    fn test_load_missing_returns_none() {
        let (_temp, repo) = setup();
        assert!(repo.load("nothing", None).unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let (_temp, repo) = setup();
        let m = manifest(&repo, None);
        repo.save(&m).unwrap();
        assert_eq!(repo.load("my-app", None).unwrap(), Some(m));
    }

    #[test]
    fn test_source_partitions_keys() {
        let (_temp, repo) = setup();
        let gh = manifest(&repo, Some("https://github.com/owner/my-app"));
        repo.save(&gh).unwrap();

        assert!(repo.load("my-app", None).unwrap().is_none());
        assert_eq!(
            repo.load("my-app", Some("https://github.com/owner/my-app"))
                .unwrap(),
            Some(gh)
        );
    }

    #[test]
    fn test_save_overwrites() {
        let (_temp, repo) = setup();
        repo.save(&manifest(&repo, None)).unwrap();
        let mut second = manifest(&repo, None);
        second.directories.clear();
        repo.save(&second).unwrap();
        assert!(repo.load("my-app", None).unwrap().unwrap().directories.is_empty());
    }

    #[test]
    fn test_corrupt_manifest_is_an_error() {
        let (_temp, repo) = setup();
        let path = repo.manifest_path("my-app", None);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "<uninstallManifest version=\"1.0\"><oops").unwrap();
        assert!(repo.load("my-app", None).is_err());
    }

    #[test]
    fn test_delete_is_idempotent_and_prunes_parents() {
        let (temp, repo) = setup();
        repo.save(&manifest(&repo, None)).unwrap();

        assert!(repo.delete("my-app", None).unwrap());
        assert!(!repo.delete("my-app", None).unwrap());
        assert!(!repo.layout().manifests_root().exists());
        assert!(temp.path().join(".jdeploy").exists());
    }

    #[test]
    fn test_delete_keeps_other_packages() {
        let (_temp, repo) = setup();
        repo.save(&manifest(&repo, None)).unwrap();
        let other = ManifestBuilder::new(repo.layout())
            .with_package_info("other", None, "1.0", "x64")
            .unwrap()
            .build()
            .unwrap();
        repo.save(&other).unwrap();

        repo.delete("my-app", None).unwrap();
        assert!(repo.load("other", None).unwrap().is_some());
        assert!(repo.layout().manifests_arch_dir().exists());
    }

    #[test]
    fn test_path_like_names_are_refused_before_touching_disk() {
        let (_temp, repo) = setup();
        repo.save(&manifest(&repo, None)).unwrap();

        for name in ["", "..", "../my-app", "a/b"] {
            let err = repo.delete(name, None).unwrap_err();
            assert!(
                matches!(err, StoreError::Manifest(ManifestError::InvalidPackageName { .. })),
                "{:?}: {:?}",
                name,
                err
            );
            assert!(repo.load(name, None).is_err(), "{:?}", name);
        }
        assert!(repo.load("my-app", None).unwrap().is_some());
    }

    #[test]
    fn test_delete_scoped_package_prunes_scope_directory() {
        let (_temp, repo) = setup();
        let scoped = ManifestBuilder::new(repo.layout())
            .with_package_info("@acme/tool", None, "1.0", "x64")
            .unwrap()
            .build()
            .unwrap();
        repo.save(&scoped).unwrap();
        assert!(repo.layout().manifests_arch_dir().join("@acme").is_dir());

        assert!(repo.delete("@acme/tool", None).unwrap());
        assert!(!repo.layout().manifests_root().exists());
    }
}
