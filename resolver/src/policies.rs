//! Policies that steer constructor and setter selection.
//!
//! Policies can be built in code or loaded from YAML:
//!
//! ```yaml
//! default_lifecycle: singleton
//! setters:
//!   names: [Logger]
//!   type_names: [Gateway]
//! ```

use crate::error::{Error, Result};
use crate::instance::Lifecycle;
use crate::types::TypeRef;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policies {
  /// Lifecycle for instances that do not set one.
  pub default_lifecycle: Lifecycle,
  pub setters: SetterPolicy,
}

/// Marks setters as injectable by property name or by declared type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetterPolicy {
  pub names: Vec<String>,
  /// Matched against the full type name, or its last path segment.
  pub type_names: Vec<String>,
}

impl SetterPolicy {
  pub fn matches(&self, name: &str, ty: &TypeRef) -> bool {
    if self.names.iter().any(|n| n == name) {
      return true;
    }
    if self.type_names.is_empty() {
      return false;
    }
    let full_name = ty.full_name();
    let short_name = full_name.rsplit("::").next().unwrap_or(&full_name);
    self
      .type_names
      .iter()
      .any(|t| *t == full_name || t == short_name)
  }
}

impl Policies {
  pub fn from_yaml_str(yaml: &str) -> Result<Self> {
    serde_yaml::from_str(yaml).map_err(|e| Error::ConfigParse(e.to_string()))
  }

  pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if !path.exists() {
      return Err(Error::ConfigNotFound(path.display().to_string()));
    }
    let contents = fs::read_to_string(path)?;
    Self::from_yaml_str(&contents)
  }
}
