//! Human-readable diagnostics for unbuildable configuration.

use crate::source::DependencyProblem;

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
  pub plugin_type: String,
  pub instance: String,
  pub problems: Vec<DependencyProblem>,
  /// Set when no plan could be made at all, e.g. no usable constructor.
  pub error: Option<String>,
}

/// Every problem found while planning a set of instances.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigurationReport {
  entries: Vec<ReportEntry>,
}

impl ConfigurationReport {
  pub fn add_problems(
    &mut self,
    plugin_type: impl Into<String>,
    instance: impl Into<String>,
    problems: Vec<DependencyProblem>,
  ) {
    if problems.is_empty() {
      return;
    }
    self.entries.push(ReportEntry {
      plugin_type: plugin_type.into(),
      instance: instance.into(),
      problems,
      error: None,
    });
  }

  pub fn add_error(&mut self, plugin_type: impl Into<String>, instance: impl Into<String>, error: String) {
    self.entries.push(ReportEntry {
      plugin_type: plugin_type.into(),
      instance: instance.into(),
      problems: Vec::new(),
      error: Some(error),
    });
  }

  pub fn entries(&self) -> &[ReportEntry] {
    &self.entries
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn problems(&self) -> impl Iterator<Item = &DependencyProblem> {
    self.entries.iter().flat_map(|e| e.problems.iter())
  }
}

impl fmt::Display for ConfigurationReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Configuration is invalid:")?;
    for entry in &self.entries {
      writeln!(f, "  {} (instance '{}')", entry.plugin_type, entry.instance)?;
      if let Some(error) = &entry.error {
        writeln!(f, "    {}", error)?;
      }
      for problem in &entry.problems {
        writeln!(f, "    {}", problem)?;
      }
    }
    Ok(())
  }
}
