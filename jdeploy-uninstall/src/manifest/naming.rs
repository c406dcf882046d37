//! Package key derivation.
//!
//! This module is the single source of truth for the fully qualified name
//! used to key a package on disk. Manifests, app directories and uninstaller
//! directories all derive their folder names from it.

use md5::{Digest, Md5};

use super::error::{ManifestError, ManifestResult};

/// Fully qualified name for a `(name, source)` pair.
///
/// npm packages (no source) use the bare name. GitHub packages are prefixed
/// with the lowercase hex MD5 of the source URL so that equally named packages
/// from different repositories never collide.
///
/// # Examples
///
/// ```
/// use jdeploy_uninstall::manifest::fully_qualified_name;
///
/// assert_eq!(fully_qualified_name("my-app", None), "my-app");
///
/// let fqn = fully_qualified_name("my-app", Some("https://github.com/owner/repo"));
/// assert!(fqn.ends_with(".my-app"));
/// assert_eq!(fqn.len(), 32 + 1 + "my-app".len());
/// ```
pub fn fully_qualified_name(name: &str, source: Option<&str>) -> String {
    match source {
        Some(source) if !source.is_empty() => format!("{}.{}", md5_hex(source), name),
        _ => name.to_string(),
    }
}

/// Check that a package name is safe to join below the jDeploy home.
///
/// Every directory the pipeline deletes is derived from the name, so a name
/// that is empty, `.`, `..` or carries a separator would resolve to a shared
/// parent directory. npm scoped names (`@scope/pkg`) are the one accepted
/// form with a separator and map to the nested directory `@scope/pkg`.
///
/// # Examples
///
/// ```
/// use jdeploy_uninstall::manifest::check_package_name;
///
/// assert!(check_package_name("my-app").is_ok());
/// assert!(check_package_name("@acme/tool").is_ok());
/// assert!(check_package_name("..").is_err());
/// ```
pub fn check_package_name(name: &str) -> ManifestResult<()> {
    let invalid = |reason: &'static str| ManifestError::InvalidPackageName {
        name: name.to_string(),
        reason,
    };

    if name.contains('\\') || name.contains('\0') {
        return Err(invalid("must not contain a backslash or NUL"));
    }
    match name.strip_prefix('@').and_then(|scoped| scoped.split_once('/')) {
        Some((scope, package)) => {
            check_segment(scope).map_err(&invalid)?;
            check_segment(package).map_err(&invalid)
        }
        None => check_segment(name).map_err(&invalid),
    }
}

fn check_segment(segment: &str) -> Result<(), &'static str> {
    if segment.trim().is_empty() {
        return Err("must not be empty");
    }
    if segment == "." || segment == ".." {
        return Err("must not be a relative path component");
    }
    if segment.contains('/') {
        return Err("must not contain a path separator");
    }
    Ok(())
}

/// Lowercase hex MD5 digest of a string.
pub fn md5_hex(input: &str) -> String {
    format!("{:x}", Md5::digest(input.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_npm_package_uses_bare_name() {
        assert_eq!(fully_qualified_name("my-app", None), "my-app");
    }

    #[test]
    fn test_empty_source_is_treated_as_npm() {
        assert_eq!(fully_qualified_name("my-app", Some("")), "my-app");
    }

    #[test]
    fn test_md5_hex_known_vectors() {
        assert_eq!(md5_hex(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(md5_hex("abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_github_package_is_prefixed_with_source_hash() {
        let fqn = fully_qualified_name("app", Some("abc"));
        assert_eq!(fqn, "900150983cd24fb0d6963f7d28e17f72.app");
    }

    #[test]
    fn test_package_names_that_escape_their_directory_are_rejected() {
        for name in [
            "", "  ", ".", "..", "a/b", "../other", "a\\b", "@scope/", "@/pkg", "@scope/..", "@a/b/c",
        ] {
            assert!(
                matches!(
                    check_package_name(name),
                    Err(ManifestError::InvalidPackageName { .. })
                ),
                "{:?} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_plain_and_scoped_names_are_accepted() {
        for name in ["my-app", "app.v2", "@acme/tool", ".hidden-but-named"] {
            assert_eq!(check_package_name(name), Ok(()), "{:?}", name);
        }
    }

    #[test]
    fn test_different_sources_do_not_collide() {
        let a = fully_qualified_name("app", Some("https://github.com/a/app"));
        let b = fully_qualified_name("app", Some("https://github.com/b/app"));
        assert_ne!(a, b);
        assert_ne!(a, "app");
    }
}
