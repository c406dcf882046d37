//! Uninstall pipeline.
//!
//! ```text
//! load manifest ─► files ─► directories ─► registry ─► PATH edits
//!      ─► AI integrations ─► package directories ─► delete manifest
//! ```
//!
//! Every phase runs even when an earlier one failed or no manifest was
//! found.

mod ai;
mod filesystem;
mod phase;
mod profile;
mod result;
mod service;

pub use ai::{remove_mcp_server, AiTool, McpConfigFormat, McpRemovalError};
pub use filesystem::{cleanup_directory, remove_path, Removal};
pub use phase::UninstallPhase;
pub use profile::{ProfileEditor, ProfileKind};
pub use result::UninstallResult;
pub use service::UninstallService;
