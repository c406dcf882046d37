//! Model to XML conversion.

use chrono::SecondsFormat;

use super::document::{XmlDocument, XmlElement};
use super::error::XmlResult;
use super::schema::{NAMESPACE, ROOT_ELEMENT};
use crate::manifest::{
    AiIntegrations, PackageInfo, PathModifications, RegistryInfo, UninstallManifest,
};

/// Build the XML document for a manifest.
///
/// `files` and `directories` are always written, even when empty. The
/// optional groups are written only when present on the model.
pub fn generate(manifest: &UninstallManifest) -> XmlDocument {
    let mut root = XmlElement::new(ROOT_ELEMENT)
        .attr("version", manifest.version.as_str())
        .attr("xmlns", NAMESPACE);

    root.push(package_info(&manifest.package_info));

    let mut files = XmlElement::new("files");
    for file in &manifest.files {
        files.push(
            XmlElement::new("file")
                .attr("type", file.file_type.as_token())
                .child(XmlElement::with_text("path", file.path.as_str()))
                .optional_child("description", file.description.as_deref()),
        );
    }
    root.push(files);

    let mut directories = XmlElement::new("directories");
    for dir in &manifest.directories {
        directories.push(
            XmlElement::new("directory")
                .attr("cleanup", dir.cleanup.as_token())
                .child(XmlElement::with_text("path", dir.path.as_str()))
                .optional_child("description", dir.description.as_deref()),
        );
    }
    root.push(directories);

    if let Some(registry) = &manifest.registry {
        root.push(registry_info(registry));
    }
    if let Some(path_mods) = &manifest.path_modifications {
        root.push(path_modifications(path_mods));
    }
    if let Some(ai) = &manifest.ai_integrations {
        root.push(ai_integrations(ai));
    }

    XmlDocument::new(root)
}

/// Generate and serialize in one step.
pub fn generate_string(manifest: &UninstallManifest) -> XmlResult<String> {
    generate(manifest).to_xml_string()
}

fn package_info(info: &PackageInfo) -> XmlElement {
    XmlElement::new("packageInfo")
        .child(XmlElement::with_text("name", info.name.as_str()))
        .optional_child("source", info.source.as_deref())
        .child(XmlElement::with_text("version", info.version.as_str()))
        .child(XmlElement::with_text(
            "fullyQualifiedName",
            info.fully_qualified_name.as_str(),
        ))
        .child(XmlElement::with_text("architecture", info.architecture.as_str()))
        .child(XmlElement::with_text(
            "installedAt",
            info.installed_at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        ))
        .child(XmlElement::with_text(
            "installerVersion",
            info.installer_version.as_str(),
        ))
}

fn registry_info(registry: &RegistryInfo) -> XmlElement {
    let mut created = XmlElement::new("createdKeys");
    for key in &registry.created_keys {
        created.push(
            XmlElement::new("createdKey")
                .attr("root", key.root.as_token())
                .child(XmlElement::with_text("path", key.path.as_str()))
                .optional_child("description", key.description.as_deref()),
        );
    }

    let mut modified = XmlElement::new("modifiedValues");
    for value in &registry.modified_values {
        modified.push(
            XmlElement::new("modifiedValue")
                .attr("root", value.root.as_token())
                .attr("previousType", value.previous_type.as_token())
                .child(XmlElement::with_text("path", value.path.as_str()))
                .child(XmlElement::with_text("name", value.name.as_str()))
                .optional_child("previousValue", value.previous_value.as_deref())
                .optional_child("description", value.description.as_deref()),
        );
    }

    XmlElement::new("registry").child(created).child(modified)
}

fn path_modifications(path_mods: &PathModifications) -> XmlElement {
    let mut windows = XmlElement::new("windowsPaths");
    for entry in &path_mods.windows_paths {
        windows.push(
            XmlElement::new("windowsPath")
                .child(XmlElement::with_text("addedEntry", entry.added_entry.as_str()))
                .optional_child("description", entry.description.as_deref()),
        );
    }

    let mut shell = XmlElement::new("shellProfiles");
    for entry in &path_mods.shell_profiles {
        shell.push(profile(
            "shellProfile",
            &entry.file,
            &entry.export_line,
            entry.description.as_deref(),
        ));
    }

    let mut git_bash = XmlElement::new("gitBashProfiles");
    for entry in &path_mods.git_bash_profiles {
        git_bash.push(profile(
            "gitBashProfile",
            &entry.file,
            &entry.export_line,
            entry.description.as_deref(),
        ));
    }

    XmlElement::new("pathModifications")
        .child(windows)
        .child(shell)
        .child(git_bash)
}

fn profile(tag: &str, file: &str, export_line: &str, description: Option<&str>) -> XmlElement {
    XmlElement::new(tag)
        .child(XmlElement::with_text("file", file))
        .child(XmlElement::with_text("exportLine", export_line))
        .optional_child("description", description)
}

fn ai_integrations(ai: &AiIntegrations) -> XmlElement {
    let mut mcp = XmlElement::new("mcpServers");
    for server in &ai.mcp_servers {
        mcp.push(
            XmlElement::new("mcpServer")
                .child(XmlElement::with_text("configFile", server.config_file.as_str()))
                .child(XmlElement::with_text("entryKey", server.entry_key.as_str()))
                .child(XmlElement::with_text("toolName", server.tool_name.as_str())),
        );
    }

    let mut skills = XmlElement::new("skills");
    for skill in &ai.skills {
        skills.push(named_path("skill", &skill.path, &skill.name));
    }

    let mut agents = XmlElement::new("agents");
    for agent in &ai.agents {
        agents.push(named_path("agent", &agent.path, &agent.name));
    }

    XmlElement::new("aiIntegrations")
        .child(mcp)
        .child(skills)
        .child(agents)
}

fn named_path(tag: &str, path: &str, name: &str) -> XmlElement {
    XmlElement::new(tag)
        .child(XmlElement::with_text("path", path))
        .child(XmlElement::with_text("name", name))
}
