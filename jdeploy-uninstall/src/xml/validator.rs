//! Two-tier validation of manifest documents.
//!
//! - **Basic**: root element present, named `uninstallManifest`, carrying a
//!   `version` attribute. Fails on the first problem.
//! - **Schema**: walks the whole tree against [`schema::ROOT`] and reports
//!   every violation at once. Skipped in [`ValidationMode::Relaxed`].

use std::fmt;
use std::str::FromStr;

use chrono::DateTime;

use super::document::{XmlDocument, XmlElement};
use super::error::ManifestValidationError;
use super::schema::{self, ElementRule, Occurs, TextKind, ROOT_ELEMENT};

/// How much validation to perform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Basic and schema validation.
    #[default]
    Strict,
    /// Basic validation only.
    Relaxed,
}

impl ValidationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationMode::Strict => "strict",
            ValidationMode::Relaxed => "relaxed",
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(ValidationMode::Strict),
            "relaxed" => Ok(ValidationMode::Relaxed),
            other => Err(format!(
                "unknown validation mode '{}' (expected strict or relaxed)",
                other
            )),
        }
    }
}

/// Validates manifest documents independently of the parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestValidator {
    mode: ValidationMode,
}

impl ManifestValidator {
    pub fn new(mode: ValidationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Validate a document according to the configured mode.
    pub fn validate(&self, document: &XmlDocument) -> Result<(), ManifestValidationError> {
        let root = validate_basic(document)?;
        if self.mode == ValidationMode::Strict {
            validate_schema(root)?;
        }
        Ok(())
    }
}

/// Structural checks shared by both modes.
pub fn validate_basic(document: &XmlDocument) -> Result<&XmlElement, ManifestValidationError> {
    let root = document
        .root
        .as_ref()
        .ok_or_else(|| ManifestValidationError::new("Document has no root element"))?;

    if root.name != ROOT_ELEMENT {
        return Err(ManifestValidationError::new(format!(
            "Expected root element '{}', got '{}'",
            ROOT_ELEMENT, root.name
        )));
    }

    if root.attribute("version").is_none() {
        return Err(ManifestValidationError::new(
            "Root element missing required 'version' attribute",
        ));
    }

    Ok(root)
}

/// Full schema check, collecting every violation.
pub fn validate_schema(root: &XmlElement) -> Result<(), ManifestValidationError> {
    let mut violations = Vec::new();
    let path = format!("/{}", root.name);
    check_element(root, &schema::ROOT, &path, &mut violations);

    if violations.is_empty() {
        return Ok(());
    }

    let mut details = format!(
        "Schema validation failed with {} error(s):\n",
        violations.len()
    );
    for (i, violation) in violations.iter().enumerate() {
        details.push_str(&format!("{}. {}\n", i + 1, violation));
    }
    Err(ManifestValidationError::with_details(
        "Manifest XML does not conform to schema",
        details,
    ))
}

fn check_element(element: &XmlElement, rule: &ElementRule, path: &str, out: &mut Vec<String>) {
    check_attributes(element, rule, path, out);
    check_text(element, rule, path, out);
    check_children(element, rule, path, out);
}

fn check_attributes(element: &XmlElement, rule: &ElementRule, path: &str, out: &mut Vec<String>) {
    for attr in rule.attributes {
        match element.attribute(attr.name) {
            None if attr.required => {
                out.push(format!("{}: missing required attribute '{}'", path, attr.name));
            }
            None => {}
            Some(value) => {
                if let Some(tokens) = attr.tokens {
                    if !tokens.contains(&value) {
                        out.push(format!(
                            "{}: attribute '{}' has invalid value '{}' (expected one of: {})",
                            path,
                            attr.name,
                            value,
                            tokens.join(", ")
                        ));
                    }
                }
            }
        }
    }

    for (name, _) in &element.attributes {
        if !rule.attributes.iter().any(|a| a.name == name) {
            out.push(format!("{}: unexpected attribute '{}'", path, name));
        }
    }
}

fn check_text(element: &XmlElement, rule: &ElementRule, path: &str, out: &mut Vec<String>) {
    match rule.text {
        TextKind::Any => {}
        TextKind::Empty => {
            if element.text.as_deref().is_some_and(|t| !t.trim().is_empty()) {
                out.push(format!("{}: element must not contain text", path));
            }
        }
        TextKind::Instant => {
            let text = element.text_or_empty();
            if let Err(e) = DateTime::parse_from_rfc3339(text.trim()) {
                out.push(format!("{}: invalid timestamp '{}' ({})", path, text, e));
            }
        }
    }
}

fn check_children(element: &XmlElement, rule: &ElementRule, path: &str, out: &mut Vec<String>) {
    if rule.children.is_empty() {
        for child in &element.children {
            out.push(format!("{}: unexpected element <{}>", path, child.name));
        }
        return;
    }

    let missing = |index: usize, count: usize, out: &mut Vec<String>| {
        let child_rule = &rule.children[index];
        if count == 0 && child_rule.occurs == Occurs::One {
            out.push(format!(
                "{}: missing required element <{}>",
                path, child_rule.name
            ));
        }
    };

    let mut current = 0;
    let mut count = 0;
    let mut seen: Vec<usize> = vec![0; rule.children.len()];

    for child in &element.children {
        let Some(position) = rule.children.iter().position(|r| r.name == child.name) else {
            out.push(format!("{}: unexpected element <{}>", path, child.name));
            continue;
        };

        if position < current {
            out.push(format!(
                "{}: element <{}> is out of order (expected after <{}>)",
                path, child.name, rule.children[current].name
            ));
            continue;
        }

        if position > current {
            missing(current, count, out);
            for skipped in current + 1..position {
                missing(skipped, 0, out);
            }
            current = position;
            count = 0;
        }

        let child_rule = &rule.children[current];
        count += 1;
        seen[current] += 1;
        if count > 1 && child_rule.occurs != Occurs::Many {
            out.push(format!(
                "{}: element <{}> may appear at most once",
                path, child.name
            ));
            continue;
        }

        let child_path = if child_rule.occurs == Occurs::Many {
            format!("{}/{}[{}]", path, child.name, seen[current])
        } else {
            format!("{}/{}", path, child.name)
        };
        check_element(child, child_rule.rule, &child_path, out);
    }

    missing(current, count, out);
    for remaining in current + 1..rule.children.len() {
        missing(remaining, 0, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<uninstallManifest version="1.0" xmlns="http://jdeploy.ca/uninstall-manifest/1.0">
  <packageInfo>
    <name>my-app</name>
    <version>1.0.0</version>
    <fullyQualifiedName>my-app</fullyQualifiedName>
    <architecture>x64</architecture>
    <installedAt>2024-01-15T10:30:00Z</installedAt>
    <installerVersion>1.0.0</installerVersion>
  </packageInfo>
  <files>
    <file type="binary"><path>/opt/app/bin/app</path></file>
    <file type="link"><path>/usr/local/bin/app</path><description>launcher</description></file>
  </files>
  <directories>
    <directory cleanup="ifEmpty"><path>/opt/app/bin</path></directory>
  </directories>
</uninstallManifest>
"#;

    fn doc(xml: &str) -> XmlDocument {
        XmlDocument::parse(xml).unwrap()
    }

    fn strict() -> ManifestValidator {
        ManifestValidator::new(ValidationMode::Strict)
    }

    #[test]
    fn test_valid_manifest_passes_strict() {
        strict().validate(&doc(VALID)).unwrap();
    }

    #[test]
    fn test_missing_root_fails() {
        let err = strict().validate(&XmlDocument::default()).unwrap_err();
        assert_eq!(err.message(), "Document has no root element");
    }

    #[test]
    fn test_wrong_root_name_fails_basic() {
        let err = ManifestValidator::new(ValidationMode::Relaxed)
            .validate(&doc(r#"<manifest version="1.0"/>"#))
            .unwrap_err();
        assert_eq!(
            err.message(),
            "Expected root element 'uninstallManifest', got 'manifest'"
        );
    }

    #[test]
    fn test_missing_version_fails_basic() {
        let err = ManifestValidator::new(ValidationMode::Relaxed)
            .validate(&doc("<uninstallManifest/>"))
            .unwrap_err();
        assert_eq!(
            err.message(),
            "Root element missing required 'version' attribute"
        );
    }

    #[test]
    fn test_relaxed_skips_schema() {
        let xml = r#"<uninstallManifest version="1.0"><bogus/></uninstallManifest>"#;
        ManifestValidator::new(ValidationMode::Relaxed)
            .validate(&doc(xml))
            .unwrap();
        assert!(strict().validate(&doc(xml)).is_err());
    }

    #[test]
    fn test_missing_package_info_is_reported() {
        let xml = r#"<uninstallManifest version="1.0" xmlns="http://jdeploy.ca/uninstall-manifest/1.0">
  <files/>
</uninstallManifest>"#;
        let err = strict().validate(&doc(xml)).unwrap_err();
        assert_eq!(err.message(), "Manifest XML does not conform to schema");
        assert!(err
            .details()
            .contains("/uninstallManifest: missing required element <packageInfo>"));
    }

    #[test]
    fn test_bad_enum_token_is_reported_with_path() {
        let xml = VALID.replace("type=\"link\"", "type=\"LINK\"");
        let err = strict().validate(&doc(&xml)).unwrap_err();
        assert!(err.details().contains("/uninstallManifest/files/file[2]"));
        assert!(err.details().contains("invalid value 'LINK'"));
    }

    #[test]
    fn test_wrong_namespace_is_reported() {
        let xml = VALID.replace("uninstall-manifest/1.0", "uninstall-manifest/2.0");
        let err = strict().validate(&doc(&xml)).unwrap_err();
        assert!(err.details().contains("attribute 'xmlns'"));
    }

    #[test]
    fn test_out_of_order_children_are_reported() {
        let xml = r#"<uninstallManifest version="1.0" xmlns="http://jdeploy.ca/uninstall-manifest/1.0">
  <packageInfo>
    <name>a</name>
    <version>1</version>
    <fullyQualifiedName>a</fullyQualifiedName>
    <architecture>x64</architecture>
    <installedAt>2024-01-15T10:30:00Z</installedAt>
    <installerVersion>1</installerVersion>
  </packageInfo>
  <directories/>
  <files/>
</uninstallManifest>"#;
        let err = strict().validate(&doc(xml)).unwrap_err();
        assert!(err.details().contains("<files> is out of order"));
    }

    #[test]
    fn test_bad_timestamp_and_unknown_attribute_are_collected() {
        let xml = VALID
            .replace("2024-01-15T10:30:00Z", "yesterday")
            .replace("<file type=\"binary\">", "<file type=\"binary\" mode=\"755\">");
        let err = strict().validate(&doc(&xml)).unwrap_err();
        assert!(err.details().starts_with("Schema validation failed with 2 error(s):"));
        assert!(err.details().contains("invalid timestamp 'yesterday'"));
        assert!(err.details().contains("unexpected attribute 'mode'"));
    }

    #[test]
    fn test_duplicate_single_element_is_reported() {
        let xml = VALID.replace(
            "<name>my-app</name>",
            "<name>my-app</name><name>again</name>",
        );
        let err = strict().validate(&doc(&xml)).unwrap_err();
        assert!(err.details().contains("<name> may appear at most once"));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Relaxed".parse::<ValidationMode>(), Ok(ValidationMode::Relaxed));
        assert_eq!("strict".parse::<ValidationMode>(), Ok(ValidationMode::Strict));
        assert!("lenient".parse::<ValidationMode>().is_err());
        assert_eq!(ValidationMode::default(), ValidationMode::Strict);
    }
}
