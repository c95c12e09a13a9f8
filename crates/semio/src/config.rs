//! Configuration types for schema compilation.
//!
//! This module provides configuration structures that control how schemas
//! are resolved and how the generated code is laid out. All types implement
//! [`serde::Deserialize`] for loading from TOML files.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining emit and schema settings.
//! - [`EmitConfig`] - Output layout, primitive import path, derives and header.
//! - [`SchemaConfig`] - Extra primitive names accepted as property types.
//!
//! # Example
//!
//! ```
//! # use semio::config::{AppConfig, OutputLayout};
//! let config = AppConfig::default();
//! assert_eq!(config.emit().layout(), OutputLayout::Single);
//! assert_eq!(config.emit().primitives_path(), "crate::primitives");
//! assert!(config.validate().is_ok());
//! ```

use serde::Deserialize;

use semio_core::{naming, primitive::PrimitiveSet};
use semio_parser::ResolveConfig;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Code emission section.
    #[serde(default)]
    emit: EmitConfig,

    /// Schema resolution section.
    #[serde(default)]
    schema: SchemaConfig,
}

impl AppConfig {
    pub fn new(emit: EmitConfig, schema: SchemaConfig) -> Self {
        Self { emit, schema }
    }

    pub fn emit(&self) -> &EmitConfig {
        &self.emit
    }

    pub fn schema(&self) -> &SchemaConfig {
        &self.schema
    }

    /// Check values that deserialization alone cannot reject.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid setting.
    pub fn validate(&self) -> Result<(), String> {
        if !is_path(&self.emit.primitives_path) {
            return Err(format!(
                "Invalid primitives_path in config: `{}` is not a Rust path",
                self.emit.primitives_path
            ));
        }
        if let Some(derive) = self.emit.derives.iter().find(|derive| !is_path(derive)) {
            return Err(format!("Invalid derive in config: `{derive}` is not a Rust path"));
        }
        if let Some(name) = self
            .schema
            .extra_primitives
            .iter()
            .find(|name| !naming::is_identifier(name))
        {
            return Err(format!("Invalid extra primitive in config: `{name}` is not an identifier"));
        }
        Ok(())
    }
}

/// Where generated levels end up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputLayout {
    /// One file; every level wrapped in `pub mod`.
    #[default]
    Single,
    /// One file per level plus a `mod.rs` declaring them.
    PerLevel,
}

/// Settings for the generated source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmitConfig {
    layout: OutputLayout,
    /// Module the primitive types are imported from.
    primitives_path: String,
    /// Derives added to generated objects and aggregates.
    derives: Vec<String>,
    /// Emit the `@generated` header line.
    header: bool,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            layout: OutputLayout::Single,
            primitives_path: "crate::primitives".to_string(),
            derives: ["Debug", "Clone", "Default"].map(String::from).to_vec(),
            header: true,
        }
    }
}

impl EmitConfig {
    pub fn layout(&self) -> OutputLayout {
        self.layout
    }

    pub fn primitives_path(&self) -> &str {
        &self.primitives_path
    }

    pub fn derives(&self) -> &[String] {
        &self.derives
    }

    pub fn header(&self) -> bool {
        self.header
    }

    pub fn with_layout(mut self, layout: OutputLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_primitives_path(mut self, path: impl Into<String>) -> Self {
        self.primitives_path = path.into();
        self
    }
}

/// Settings for schema resolution.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaConfig {
    /// Primitive names beyond the built-in geometry and value primitives.
    #[serde(default)]
    extra_primitives: Vec<String>,
}

impl SchemaConfig {
    pub fn new(extra_primitives: Vec<String>) -> Self {
        Self { extra_primitives }
    }

    pub fn extra_primitives(&self) -> &[String] {
        &self.extra_primitives
    }

    /// The resolver settings these options describe.
    pub fn resolve_config(&self) -> ResolveConfig {
        let primitives = PrimitiveSet::builtin()
            .with_extra(self.extra_primitives.iter().map(String::as_str));
        ResolveConfig::new(primitives)
    }
}

/// `a::b::C` with every segment an identifier.
fn is_path(path: &str) -> bool {
    path.split("::").all(naming::is_identifier)
}
