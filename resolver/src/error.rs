use crate::report::ConfigurationReport;
use crate::source::DependencyProblem;

use thiserror::Error;

/// The main error type for `fibre_resolver`.
#[derive(Debug, Error)]
pub enum Error {
  #[error("No public constructor could be selected for concrete type {concrete_type}")]
  NoSuitableConstructor { concrete_type: String },

  #[error("{0}")]
  InvalidConfiguration(ConfigurationReport),

  #[error("No default instance is registered for {plugin_type}")]
  NoDefaultInstance { plugin_type: String },

  #[error("The default for {plugin_type} was explicitly set to null")]
  NullDefault { plugin_type: String },

  #[error("No instance named '{name}' is registered for {plugin_type}")]
  NamedInstanceNotFound { plugin_type: String, name: String },

  #[error("An explicit argument of type {type_name} has already been set")]
  DuplicateExplicitType { type_name: String },

  #[error("An explicit argument named '{name}' has already been set")]
  DuplicateExplicitArg { name: String },

  #[error("Circular dependency detected while building instance '{instance}'")]
  CircularDependency { instance: String },

  #[error("Failed to construct {concrete_type}: {reason}")]
  Construction {
    concrete_type: String,
    reason: String,
  },

  #[error("{concrete_type} cannot be used as {plugin_type}")]
  NotPluggable {
    concrete_type: String,
    plugin_type: String,
  },

  #[error("{0}")]
  DependencyProblem(DependencyProblem),

  #[error("Configuration file not found: {0}")]
  ConfigNotFound(String),

  #[error("Failed to read configuration file: {0}")]
  ConfigRead(#[from] std::io::Error),

  #[error("Failed to parse configuration: {0}")]
  ConfigParse(String),
}

/// A specialized `Result` type for `fibre_resolver` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
