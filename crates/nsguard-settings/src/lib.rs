//! Declaration parsing and rule model construction.
//!
//! This crate is intentionally IO-free: declarations arrive as strings, compiled models leave.
//! Locating and watching `nsguard.toml` files is `nsguard-repo`'s job.

#![forbid(unsafe_code)]

mod error;
mod model;
mod resolve;

#[cfg(test)]
mod proptest;

pub use error::ConfigError;
pub use model::{NsguardConfigV1, RuleConfig, VisibleMembersConfig};
pub use resolve::{ConfigBuilder, SCHEMA_CONFIG_V1, export_config};

use camino::Utf8Path;
use nsguard_domain::RuleModel;

/// File name probed in each directory.
pub const CONFIG_FILE_NAME: &str = "nsguard.toml";

/// Parse `nsguard.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> Result<NsguardConfigV1, ConfigError> {
    let cfg: NsguardConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Render a declaration back to TOML.
pub fn to_config_toml(cfg: &NsguardConfigV1) -> Result<String, ConfigError> {
    Ok(toml::to_string(cfg)?)
}

/// Parse and compile a single declaration with no ancestors.
pub fn build_rule_model(input: &str, base_dir: Option<&Utf8Path>) -> Result<RuleModel, ConfigError> {
    let cfg = parse_config_toml(input)?;
    ConfigBuilder::new().merge(&cfg, base_dir)?.build()
}

/// JSON schema for `nsguard.toml`, for editor tooling.
pub fn config_schema_json() -> Result<String, serde_json::Error> {
    let schema = schemars::schema_for!(NsguardConfigV1);
    serde_json::to_string_pretty(&schema)
}
