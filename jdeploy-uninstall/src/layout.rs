//! Canonical on-disk layout under the per-user jDeploy home.
//!
//! ```text
//! <jdeploy_home>/
//! ├── manifests/<arch>/<fqn>/uninstall-manifest.xml
//! ├── apps/<fqn>/
//! ├── uninstallers/<fqn>/
//! ├── packages-<arch>/<name>/      npm, current layout
//! ├── packages/<name>/             npm, legacy layout
//! ├── gh-packages-<arch>/<fqn>/    GitHub, current layout
//! └── gh-packages/<fqn>/           GitHub, legacy layout
//! ```

use std::path::{Path, PathBuf};

use crate::manifest::fully_qualified_name;
use crate::platform;

/// File name of a persisted manifest.
pub const MANIFEST_FILE_NAME: &str = "uninstall-manifest.xml";

/// Name of the per-user data directory below the home directory.
pub const JDEPLOY_DIR_NAME: &str = ".jdeploy";

/// Resolves every path the uninstall subsystem reads or writes.
///
/// Package names are joined as given. Callers that delete what these paths
/// point at check the name with [`check_package_name`] first.
///
/// [`check_package_name`]: crate::manifest::check_package_name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    home_dir: PathBuf,
    jdeploy_home: PathBuf,
    architecture: String,
}

impl Layout {
    pub fn new(
        home_dir: impl Into<PathBuf>,
        jdeploy_home: impl Into<PathBuf>,
        architecture: impl Into<String>,
    ) -> Self {
        Self {
            home_dir: home_dir.into(),
            jdeploy_home: jdeploy_home.into(),
            architecture: architecture.into(),
        }
    }

    /// Default layout for a home directory: `<home>/.jdeploy` and the
    /// architecture of the running process.
    pub fn from_home(home_dir: impl Into<PathBuf>) -> Self {
        let home_dir = home_dir.into();
        let jdeploy_home = home_dir.join(JDEPLOY_DIR_NAME);
        Self::new(home_dir, jdeploy_home, platform::current_architecture())
    }

    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    pub fn jdeploy_home(&self) -> &Path {
        &self.jdeploy_home
    }

    pub fn architecture(&self) -> &str {
        &self.architecture
    }

    /// Root of all persisted manifests.
    pub fn manifests_root(&self) -> PathBuf {
        self.jdeploy_home.join("manifests")
    }

    /// Per-architecture manifest directory.
    pub fn manifests_arch_dir(&self) -> PathBuf {
        self.manifests_root().join(&self.architecture)
    }

    /// Directory holding the manifest of one package.
    pub fn manifest_dir(&self, package_name: &str, source: Option<&str>) -> PathBuf {
        self.manifests_arch_dir()
            .join(fully_qualified_name(package_name, source))
    }

    /// Canonical manifest location for a package.
    pub fn manifest_path(&self, package_name: &str, source: Option<&str>) -> PathBuf {
        self.manifest_dir(package_name, source)
            .join(MANIFEST_FILE_NAME)
    }

    pub fn app_dir(&self, fqn: &str) -> PathBuf {
        self.jdeploy_home.join("apps").join(fqn)
    }

    pub fn uninstaller_dir(&self, fqn: &str) -> PathBuf {
        self.jdeploy_home.join("uninstallers").join(fqn)
    }

    /// Package directories in lookup order: architecture specific first,
    /// then the legacy location without an architecture suffix.
    pub fn package_dirs(&self, package_name: &str, source: Option<&str>) -> Vec<PathBuf> {
        let (base, leaf) = match source {
            Some(s) if !s.is_empty() => ("gh-packages", fully_qualified_name(package_name, source)),
            _ => ("packages", package_name.to_string()),
        };
        vec![
            self.jdeploy_home
                .join(format!("{}-{}", base, self.architecture))
                .join(&leaf),
            self.jdeploy_home.join(base).join(&leaf),
        ]
    }

    /// Every directory that belongs to a package regardless of what its
    /// manifest recorded.
    pub fn owned_dirs(&self, package_name: &str, source: Option<&str>) -> Vec<PathBuf> {
        let fqn = fully_qualified_name(package_name, source);
        let mut dirs = self.package_dirs(package_name, source);
        dirs.push(self.app_dir(&fqn));
        dirs.push(self.uninstaller_dir(&fqn));
        dirs
    }
}
