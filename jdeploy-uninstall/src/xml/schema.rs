//! Declarative description of the uninstall manifest schema.
//!
//! Each element lists its attributes and its ordered child sequence. The
//! validator walks a document against these tables; the token sets come from
//! the model enums so the two can never drift apart.

use crate::manifest::{CleanupStrategy, FileType, RegistryRoot, RegistryValueType};

/// Namespace of schema version 1.0.
pub const NAMESPACE: &str = "http://jdeploy.ca/uninstall-manifest/1.0";

pub const ROOT_ELEMENT: &str = "uninstallManifest";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurs {
    /// Exactly once.
    One,
    /// Zero or one time.
    Optional,
    /// Zero or more times.
    Many,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    /// Only whitespace allowed.
    Empty,
    /// Any string.
    Any,
    /// RFC 3339 timestamp.
    Instant,
}

#[derive(Debug)]
pub struct AttrRule {
    pub name: &'static str,
    pub required: bool,
    /// Allowed values, when restricted.
    pub tokens: Option<&'static [&'static str]>,
}

#[derive(Debug)]
pub struct ChildRule {
    pub name: &'static str,
    pub occurs: Occurs,
    pub rule: &'static ElementRule,
}

#[derive(Debug)]
pub struct ElementRule {
    pub attributes: &'static [AttrRule],
    pub children: &'static [ChildRule],
    pub text: TextKind,
}

const fn one(name: &'static str, rule: &'static ElementRule) -> ChildRule {
    ChildRule {
        name,
        occurs: Occurs::One,
        rule,
    }
}

const fn optional(name: &'static str, rule: &'static ElementRule) -> ChildRule {
    ChildRule {
        name,
        occurs: Occurs::Optional,
        rule,
    }
}

const fn many(name: &'static str, rule: &'static ElementRule) -> ChildRule {
    ChildRule {
        name,
        occurs: Occurs::Many,
        rule,
    }
}

const fn token_attr(name: &'static str, tokens: &'static [&'static str]) -> AttrRule {
    AttrRule {
        name,
        required: true,
        tokens: Some(tokens),
    }
}

const fn container(children: &'static [ChildRule]) -> ElementRule {
    ElementRule {
        attributes: &[],
        children,
        text: TextKind::Empty,
    }
}

static TEXT: ElementRule = ElementRule {
    attributes: &[],
    children: &[],
    text: TextKind::Any,
};

static INSTANT: ElementRule = ElementRule {
    attributes: &[],
    children: &[],
    text: TextKind::Instant,
};

static PACKAGE_INFO: ElementRule = container(&[
    one("name", &TEXT),
    optional("source", &TEXT),
    one("version", &TEXT),
    one("fullyQualifiedName", &TEXT),
    one("architecture", &TEXT),
    one("installedAt", &INSTANT),
    one("installerVersion", &TEXT),
]);

static FILE: ElementRule = ElementRule {
    attributes: &[token_attr("type", FileType::TOKENS)],
    children: &[one("path", &TEXT), optional("description", &TEXT)],
    text: TextKind::Empty,
};

static FILES: ElementRule = container(&[many("file", &FILE)]);

static DIRECTORY: ElementRule = ElementRule {
    attributes: &[token_attr("cleanup", CleanupStrategy::TOKENS)],
    children: &[one("path", &TEXT), optional("description", &TEXT)],
    text: TextKind::Empty,
};

static DIRECTORIES: ElementRule = container(&[many("directory", &DIRECTORY)]);

static CREATED_KEY: ElementRule = ElementRule {
    attributes: &[token_attr("root", RegistryRoot::TOKENS)],
    children: &[one("path", &TEXT), optional("description", &TEXT)],
    text: TextKind::Empty,
};

static CREATED_KEYS: ElementRule = container(&[many("createdKey", &CREATED_KEY)]);

static MODIFIED_VALUE: ElementRule = ElementRule {
    attributes: &[
        token_attr("root", RegistryRoot::TOKENS),
        token_attr("previousType", RegistryValueType::TOKENS),
    ],
    children: &[
        one("path", &TEXT),
        one("name", &TEXT),
        optional("previousValue", &TEXT),
        optional("description", &TEXT),
    ],
    text: TextKind::Empty,
};

static MODIFIED_VALUES: ElementRule = container(&[many("modifiedValue", &MODIFIED_VALUE)]);

static REGISTRY: ElementRule = container(&[
    optional("createdKeys", &CREATED_KEYS),
    optional("modifiedValues", &MODIFIED_VALUES),
]);

static WINDOWS_PATH: ElementRule = container(&[
    one("addedEntry", &TEXT),
    optional("description", &TEXT),
]);

static PROFILE: ElementRule = container(&[
    one("file", &TEXT),
    one("exportLine", &TEXT),
    optional("description", &TEXT),
]);

static WINDOWS_PATHS: ElementRule = container(&[many("windowsPath", &WINDOWS_PATH)]);
static SHELL_PROFILES: ElementRule = container(&[many("shellProfile", &PROFILE)]);
static GIT_BASH_PROFILES: ElementRule = container(&[many("gitBashProfile", &PROFILE)]);

static PATH_MODIFICATIONS: ElementRule = container(&[
    optional("windowsPaths", &WINDOWS_PATHS),
    optional("shellProfiles", &SHELL_PROFILES),
    optional("gitBashProfiles", &GIT_BASH_PROFILES),
]);

static MCP_SERVER: ElementRule = container(&[
    one("configFile", &TEXT),
    one("entryKey", &TEXT),
    one("toolName", &TEXT),
]);

static NAMED_PATH: ElementRule = container(&[one("path", &TEXT), one("name", &TEXT)]);

static MCP_SERVERS: ElementRule = container(&[many("mcpServer", &MCP_SERVER)]);
static SKILLS: ElementRule = container(&[many("skill", &NAMED_PATH)]);
static AGENTS: ElementRule = container(&[many("agent", &NAMED_PATH)]);

static AI_INTEGRATIONS: ElementRule = container(&[
    optional("mcpServers", &MCP_SERVERS),
    optional("skills", &SKILLS),
    optional("agents", &AGENTS),
]);

static NAMESPACE_TOKENS: [&str; 1] = [NAMESPACE];

/// Rule for the `uninstallManifest` root element.
pub static ROOT: ElementRule = ElementRule {
    attributes: &[
        AttrRule {
            name: "version",
            required: true,
            tokens: None,
        },
        AttrRule {
            name: "xmlns",
            required: true,
            tokens: Some(&NAMESPACE_TOKENS),
        },
    ],
    children: &[
        one("packageInfo", &PACKAGE_INFO),
        optional("files", &FILES),
        optional("directories", &DIRECTORIES),
        optional("registry", &REGISTRY),
        optional("pathModifications", &PATH_MODIFICATIONS),
        optional("aiIntegrations", &AI_INTEGRATIONS),
    ],
    text: TextKind::Empty,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_info_is_first_and_required() {
        let first = &ROOT.children[0];
        assert_eq!(first.name, "packageInfo");
        assert_eq!(first.occurs, Occurs::One);
    }

    #[test]
    fn test_enum_attributes_reuse_model_tokens() {
        let file = ROOT.children[1].rule.children[0].rule;
        assert_eq!(file.attributes[0].tokens, Some(FileType::TOKENS));
    }

    #[test]
    fn test_installed_at_is_an_instant() {
        let installed_at = PACKAGE_INFO
            .children
            .iter()
            .find(|c| c.name == "installedAt")
            .unwrap();
        assert_eq!(installed_at.rule.text, TextKind::Instant);
    }
}
