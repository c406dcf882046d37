//! XML to model conversion, the exact inverse of the generator.
//!
//! Optional leaf fields map from element presence: a missing element is
//! `None`, an empty element is `Some("")`.

use chrono::{DateTime, Utc};

use super::document::{XmlDocument, XmlElement};
use super::error::{ParseError, ParseResult};
use super::validator::validate_basic;
use crate::manifest::{
    AgentEntry, AiIntegrations, CleanupStrategy, FileType, GitBashProfileEntry,
    InstalledDirectory, InstalledFile, McpServerEntry, ModifiedRegistryValue, PackageInfo,
    PathModifications, RegistryInfo, RegistryKey, RegistryRoot, RegistryValueType,
    ShellProfileEntry, SkillEntry, UninstallManifest, WindowsPathEntry,
};

/// Convert a document into a manifest.
///
/// Only basic structure is checked here; run the validator first for full
/// schema checks.
pub fn parse(document: &XmlDocument) -> ParseResult<UninstallManifest> {
    let root = validate_basic(document)?;
    let root_path = format!("/{}", root.name);

    let version = root.attribute("version").unwrap_or_default().to_string();
    let info_element = required(root, "packageInfo", &root_path)?;
    let package_info = package_info(info_element, &format!("{}/packageInfo", root_path))?;

    let mut manifest = UninstallManifest::new(package_info);
    manifest.version = version;

    if let Some(files) = root.find("files") {
        let path = format!("{}/files", root_path);
        for (i, file) in files.find_all("file").enumerate() {
            let file_path = format!("{}/file[{}]", path, i + 1);
            manifest.files.push(InstalledFile {
                file_type: token(file, "type", &file_path, FileType::from_token)?,
                path: text(file, "path", &file_path)?,
                description: optional_text(file, "description"),
            });
        }
    }

    if let Some(dirs) = root.find("directories") {
        let path = format!("{}/directories", root_path);
        for (i, dir) in dirs.find_all("directory").enumerate() {
            let dir_path = format!("{}/directory[{}]", path, i + 1);
            manifest.directories.push(InstalledDirectory {
                cleanup: token(dir, "cleanup", &dir_path, CleanupStrategy::from_token)?,
                path: text(dir, "path", &dir_path)?,
                description: optional_text(dir, "description"),
            });
        }
    }

    if let Some(registry) = root.find("registry") {
        manifest.registry = Some(registry_info(registry, &format!("{}/registry", root_path))?);
    }

    if let Some(path_mods) = root.find("pathModifications") {
        manifest.path_modifications = Some(path_modifications(
            path_mods,
            &format!("{}/pathModifications", root_path),
        )?);
    }

    if let Some(ai) = root.find("aiIntegrations") {
        manifest.ai_integrations = Some(ai_integrations(
            ai,
            &format!("{}/aiIntegrations", root_path),
        )?);
    }

    Ok(manifest)
}

/// Parse a manifest from its serialized form.
pub fn parse_str(xml: &str) -> ParseResult<UninstallManifest> {
    let document = XmlDocument::parse(xml)?;
    parse(&document)
}

fn package_info(element: &XmlElement, path: &str) -> ParseResult<PackageInfo> {
    let installed_at_text = text(element, "installedAt", path)?;
    let installed_at = DateTime::parse_from_rfc3339(installed_at_text.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ParseError::InvalidTimestamp {
            value: installed_at_text.clone(),
            reason: e.to_string(),
        })?;

    Ok(PackageInfo {
        name: text(element, "name", path)?,
        source: optional_text(element, "source"),
        version: text(element, "version", path)?,
        fully_qualified_name: text(element, "fullyQualifiedName", path)?,
        architecture: text(element, "architecture", path)?,
        installed_at,
        installer_version: text(element, "installerVersion", path)?,
    })
}

fn registry_info(element: &XmlElement, path: &str) -> ParseResult<RegistryInfo> {
    let mut registry = RegistryInfo::default();

    if let Some(created) = element.find("createdKeys") {
        for (i, key) in created.find_all("createdKey").enumerate() {
            let key_path = format!("{}/createdKeys/createdKey[{}]", path, i + 1);
            registry.created_keys.push(RegistryKey {
                root: token(key, "root", &key_path, RegistryRoot::from_token)?,
                path: text(key, "path", &key_path)?,
                description: optional_text(key, "description"),
            });
        }
    }

    if let Some(modified) = element.find("modifiedValues") {
        for (i, value) in modified.find_all("modifiedValue").enumerate() {
            let value_path = format!("{}/modifiedValues/modifiedValue[{}]", path, i + 1);
            registry.modified_values.push(ModifiedRegistryValue {
                root: token(value, "root", &value_path, RegistryRoot::from_token)?,
                previous_type: token(
                    value,
                    "previousType",
                    &value_path,
                    RegistryValueType::from_token,
                )?,
                path: text(value, "path", &value_path)?,
                name: text(value, "name", &value_path)?,
                previous_value: optional_text(value, "previousValue"),
                description: optional_text(value, "description"),
            });
        }
    }

    Ok(registry)
}

fn path_modifications(element: &XmlElement, path: &str) -> ParseResult<PathModifications> {
    let mut mods = PathModifications::default();

    if let Some(windows) = element.find("windowsPaths") {
        for (i, entry) in windows.find_all("windowsPath").enumerate() {
            let entry_path = format!("{}/windowsPaths/windowsPath[{}]", path, i + 1);
            mods.windows_paths.push(WindowsPathEntry {
                added_entry: text(entry, "addedEntry", &entry_path)?,
                description: optional_text(entry, "description"),
            });
        }
    }

    if let Some(shell) = element.find("shellProfiles") {
        for (i, entry) in shell.find_all("shellProfile").enumerate() {
            let entry_path = format!("{}/shellProfiles/shellProfile[{}]", path, i + 1);
            mods.shell_profiles.push(ShellProfileEntry {
                file: text(entry, "file", &entry_path)?,
                export_line: text(entry, "exportLine", &entry_path)?,
                description: optional_text(entry, "description"),
            });
        }
    }

    if let Some(git_bash) = element.find("gitBashProfiles") {
        for (i, entry) in git_bash.find_all("gitBashProfile").enumerate() {
            let entry_path = format!("{}/gitBashProfiles/gitBashProfile[{}]", path, i + 1);
            mods.git_bash_profiles.push(GitBashProfileEntry {
                file: text(entry, "file", &entry_path)?,
                export_line: text(entry, "exportLine", &entry_path)?,
                description: optional_text(entry, "description"),
            });
        }
    }

    Ok(mods)
}

fn ai_integrations(element: &XmlElement, path: &str) -> ParseResult<AiIntegrations> {
    let mut ai = AiIntegrations::default();

    if let Some(servers) = element.find("mcpServers") {
        for (i, server) in servers.find_all("mcpServer").enumerate() {
            let server_path = format!("{}/mcpServers/mcpServer[{}]", path, i + 1);
            ai.mcp_servers.push(McpServerEntry {
                config_file: text(server, "configFile", &server_path)?,
                entry_key: text(server, "entryKey", &server_path)?,
                tool_name: text(server, "toolName", &server_path)?,
            });
        }
    }

    if let Some(skills) = element.find("skills") {
        for (i, skill) in skills.find_all("skill").enumerate() {
            let skill_path = format!("{}/skills/skill[{}]", path, i + 1);
            ai.skills.push(SkillEntry {
                path: text(skill, "path", &skill_path)?,
                name: text(skill, "name", &skill_path)?,
            });
        }
    }

    if let Some(agents) = element.find("agents") {
        for (i, agent) in agents.find_all("agent").enumerate() {
            let agent_path = format!("{}/agents/agent[{}]", path, i + 1);
            ai.agents.push(AgentEntry {
                path: text(agent, "path", &agent_path)?,
                name: text(agent, "name", &agent_path)?,
            });
        }
    }

    Ok(ai)
}

fn required<'a>(parent: &'a XmlElement, name: &str, path: &str) -> ParseResult<&'a XmlElement> {
    parent.find(name).ok_or_else(|| ParseError::MissingElement {
        path: path.to_string(),
        element: name.to_string(),
    })
}

fn text(parent: &XmlElement, name: &str, path: &str) -> ParseResult<String> {
    required(parent, name, path).map(|e| e.text_or_empty().to_string())
}

fn optional_text(parent: &XmlElement, name: &str) -> Option<String> {
    parent.find(name).map(|e| e.text_or_empty().to_string())
}

fn token<T>(
    element: &XmlElement,
    attribute: &str,
    path: &str,
    lookup: fn(&str) -> Option<T>,
) -> ParseResult<T> {
    let value = element
        .attribute(attribute)
        .ok_or_else(|| ParseError::MissingAttribute {
            path: path.to_string(),
            attribute: attribute.to_string(),
        })?;
    lookup(value).ok_or_else(|| ParseError::InvalidToken {
        path: path.to_string(),
        attribute: attribute.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::generator::generate;

    const MINIMAL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<uninstallManifest version="1.0" xmlns="http://jdeploy.ca/uninstall-manifest/1.0">
  <packageInfo>
    <name>my-app</name>
    <source>https://github.com/owner/repo</source>
    <version>2.0.0</version>
    <fullyQualifiedName>abc.my-app</fullyQualifiedName>
    <architecture>arm64</architecture>
    <installedAt>2024-01-15T10:30:00Z</installedAt>
    <installerVersion>1.9</installerVersion>
  </packageInfo>
  <files>
    <file type="link"><path>/usr/local/bin/my-app</path><description></description></file>
  </files>
  <directories/>
</uninstallManifest>
"#;

    #[test]
    fn test_parse_minimal_manifest() {
        let manifest = parse_str(MINIMAL).unwrap();
        assert_eq!(manifest.version, "1.0");
        let info = &manifest.package_info;
        assert_eq!(info.name, "my-app");
        assert_eq!(info.source.as_deref(), Some("https://github.com/owner/repo"));
        assert_eq!(info.architecture, "arm64");
        assert_eq!(info.installed_at.to_rfc3339(), "2024-01-15T10:30:00+00:00");
        assert_eq!(manifest.files.len(), 1);
        assert_eq!(manifest.files[0].file_type, FileType::Link);
        assert_eq!(manifest.files[0].description.as_deref(), Some(""));
        assert!(manifest.directories.is_empty());
        assert!(manifest.registry.is_none());
    }

    #[test]
    fn test_parse_rejects_wrong_root() {
        let err = parse_str("<manifest version=\"1.0\"/>").unwrap_err();
        assert!(matches!(err, ParseError::Invalid(_)));
    }

    #[test]
    fn test_parse_rejects_unknown_token() {
        let xml = MINIMAL.replace("type=\"link\"", "type=\"symlink\"");
        let err = parse_str(&xml).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidToken {
                path: "/uninstallManifest/files/file[1]".to_string(),
                attribute: "type".to_string(),
                value: "symlink".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_rejects_missing_package_info() {
        let err = parse_str("<uninstallManifest version=\"1.0\"/>").unwrap_err();
        assert!(matches!(err, ParseError::MissingElement { ref element, .. } if element == "packageInfo"));
    }

    #[test]
    fn test_parse_rejects_bad_timestamp() {
        let xml = MINIMAL.replace("2024-01-15T10:30:00Z", "not-a-date");
        assert!(matches!(
            parse_str(&xml).unwrap_err(),
            ParseError::InvalidTimestamp { .. }
        ));
    }

    #[test]
    fn test_empty_registry_group_round_trips_as_present() {
        let mut manifest = parse_str(MINIMAL).unwrap();
        manifest.registry = Some(RegistryInfo::default());
        manifest.path_modifications = Some(PathModifications::default());
        let parsed = parse(&generate(&manifest)).unwrap();
        assert_eq!(parsed, manifest);
    }
}
