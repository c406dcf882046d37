//! Removal of recorded `PATH` export lines from shell profiles.
//!
//! Installers write lines such as `export PATH="$HOME/.jdeploy/bin:$PATH"`.
//! The home directory may appear literally or as `$HOME`, `${HOME}` or
//! `${USER_HOME}`; all spellings match the same recorded line. Git-Bash
//! profiles additionally match the POSIX drive form (`/c/Users/me`).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Which profile family a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    /// `.bashrc`, `.zshrc`, `.profile` and friends on Unix hosts.
    Shell,
    /// Git-Bash profiles on Windows.
    GitBash,
}

const HOME_MARKER: &str = "\u{0}HOME\u{0}";

const BRACED_HOME_VARIABLES: [&str; 2] = ["${USER_HOME}", "${HOME}"];

/// Edits profile files relative to one home directory.
#[derive(Debug, Clone)]
pub struct ProfileEditor {
    home_dir: PathBuf,
}

impl ProfileEditor {
    pub fn new(home_dir: impl Into<PathBuf>) -> Self {
        Self {
            home_dir: home_dir.into(),
        }
    }

    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    /// Spellings of the home directory recognised for `kind`, longest first.
    fn home_forms(&self, kind: ProfileKind) -> Vec<String> {
        let home = self.home_dir.to_string_lossy().into_owned();
        let mut forms = vec![home.clone()];
        if kind == ProfileKind::GitBash {
            forms.push(home.replace('\\', "/"));
            if let Some(posix) = posix_drive_form(&home) {
                forms.push(posix);
            }
        }
        forms.retain(|f| !f.is_empty());
        forms.sort_by_key(|f| std::cmp::Reverse(f.len()));
        forms.dedup();
        forms
    }

    /// Reduce a line to a form where every home spelling is identical.
    fn canonical(&self, line: &str, kind: ProfileKind) -> String {
        let mut line = line.trim().to_string();
        for variable in BRACED_HOME_VARIABLES {
            line = line.replace(variable, HOME_MARKER);
        }
        line = replace_whole(&line, "$HOME", HOME_MARKER);
        for form in self.home_forms(kind) {
            line = replace_whole(&line, &form, HOME_MARKER);
        }
        line
    }

    /// Whether a profile line is a spelling of the recorded line.
    pub fn matches(&self, candidate: &str, recorded: &str, kind: ProfileKind) -> bool {
        let recorded = self.canonical(recorded, kind);
        !recorded.is_empty() && self.canonical(candidate, kind) == recorded
    }

    /// Remove every line of `file` matching `export_line`.
    ///
    /// All other bytes, including line endings and text that is not valid
    /// UTF-8, stay as they were. Returns whether the file changed; a missing
    /// file is `Ok(false)`.
    pub fn remove_line(&self, file: &Path, export_line: &str, kind: ProfileKind) -> io::Result<bool> {
        let content = match fs::read(file) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e),
        };

        let mut removed = 0usize;
        let mut kept = Vec::with_capacity(content.len());
        for chunk in content.split_inclusive(|b| *b == b'\n') {
            let line = String::from_utf8_lossy(chunk);
            if self.matches(line.trim_end_matches(['\n', '\r']), export_line, kind) {
                removed += 1;
            } else {
                kept.extend_from_slice(chunk);
            }
        }

        if removed == 0 {
            return Ok(false);
        }
        fs::write(file, kept)?;
        debug!(file = %file.display(), removed, "Removed PATH line from profile");
        Ok(true)
    }
}

/// Replace `needle` where it stands as a whole path or name, so `/home/me`
/// is not found inside `/home/meg` or `/mnt/home/me`.
fn replace_whole(line: &str, needle: &str, with: &str) -> String {
    let extends = |c: char| c.is_alphanumeric() || matches!(c, '_' | '-' | '.');
    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for (at, _) in line.match_indices(needle) {
        let end = at + needle.len();
        let before = line[..at].chars().next_back();
        let after = line[end..].chars().next();
        let inside_path = before.is_some_and(|c| extends(c) || c == '/' || c == '\\');
        if inside_path || after.is_some_and(extends) {
            continue;
        }
        out.push_str(&line[last..at]);
        out.push_str(with);
        last = end;
    }
    out.push_str(&line[last..]);
    out
}

/// `C:\Users\me` → `/c/Users/me`.
fn posix_drive_form(path: &str) -> Option<String> {
    let mut chars = path.chars();
    let drive = chars.next()?;
    if !drive.is_ascii_alphabetic() || chars.next()? != ':' {
        return None;
    }
    let rest: String = chars.collect::<String>().replace('\\', "/");
    Some(format!("/{}{}", drive.to_ascii_lowercase(), rest))
}
