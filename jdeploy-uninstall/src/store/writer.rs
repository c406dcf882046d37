//! Validated, atomic manifest writes.
//!
//! Every write goes generate → validate → serialize → temp file in the
//! destination directory → rename over the destination. Readers see either
//! the previous manifest or the new one, never a partial file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::error::{StoreError, StoreResult};
use crate::layout::Layout;
use crate::manifest::{check_package_name, UninstallManifest};
use crate::xml::{generate, ManifestValidator, ValidationMode};

/// Writes manifests to disk.
#[derive(Debug, Clone)]
pub struct ManifestWriter {
    layout: Layout,
    validator: ManifestValidator,
}

impl ManifestWriter {
    pub fn new(layout: Layout, mode: ValidationMode) -> Self {
        Self {
            layout,
            validator: ManifestValidator::new(mode),
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Generate, validate and serialize without touching the disk.
    pub fn render(&self, manifest: &UninstallManifest) -> StoreResult<String> {
        let document = generate(manifest);
        self.validator.validate(&document)?;
        Ok(document.to_xml_string()?)
    }

    /// Write to the canonical location derived from the package identity.
    ///
    /// Fails with [`StoreError::Manifest`] when the package name would
    /// place the manifest outside its own directory.
    pub fn write(&self, manifest: &UninstallManifest) -> StoreResult<PathBuf> {
        let info = &manifest.package_info;
        check_package_name(&info.name)?;
        let destination = self
            .layout
            .manifest_path(&info.name, info.source.as_deref());
        self.write_to(manifest, &destination)
    }

    /// Write to an explicit destination, replacing any existing file.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidDestination`] for an empty path
    /// - [`StoreError::Validation`] when the generated document is invalid
    /// - I/O variants when the directory or file cannot be written
    pub fn write_to(&self, manifest: &UninstallManifest, destination: &Path) -> StoreResult<PathBuf> {
        if destination.as_os_str().is_empty() || destination.file_name().is_none() {
            return Err(StoreError::InvalidDestination(
                destination.display().to_string(),
            ));
        }

        let xml = self.render(manifest)?;

        let parent = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| StoreError::CreateDirFailed {
            path: parent.clone(),
            source: e,
        })?;

        let write_failed = |e| StoreError::WriteFailed {
            path: destination.to_path_buf(),
            source: e,
        };

        let mut temp = NamedTempFile::new_in(&parent).map_err(write_failed)?;
        temp.write_all(xml.as_bytes()).map_err(write_failed)?;
        temp.as_file().sync_all().map_err(write_failed)?;
        temp.persist(destination)
            .map_err(|e| write_failed(e.error))?;

        debug!(path = %destination.display(), bytes = xml.len(), "Manifest written");
        info!(
            package = %manifest.package_info.name,
            path = %destination.display(),
            "Saved uninstall manifest"
        );
        Ok(destination.to_path_buf())
    }
}
