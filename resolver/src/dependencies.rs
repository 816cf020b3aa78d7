//! Named and typed values collected from configuration for one instance.

use crate::types::TypeRef;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum DependencyKey {
  Name(String),
  Type(TypeRef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dependency {
  pub key: DependencyKey,
  pub value: Option<Value>,
}

/// An ordered bag of configured values.
///
/// Lookups return `Option<Option<Value>>`: the outer option is presence, the
/// inner one is the stored value, which may itself be null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyCollection {
  entries: Vec<Dependency>,
}

impl DependencyCollection {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
    self.add_value(name, Some(value.into()))
  }

  pub fn add_value(&mut self, name: impl Into<String>, value: Option<Value>) -> &mut Self {
    self.entries.push(Dependency {
      key: DependencyKey::Name(name.into()),
      value,
    });
    self
  }

  pub fn add_for_type(&mut self, ty: TypeRef, value: Option<Value>) -> &mut Self {
    self.entries.push(Dependency {
      key: DependencyKey::Type(ty),
      value,
    });
    self
  }

  pub fn has(&self, name: &str) -> bool {
    self.named(name).next().is_some()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
    self.entries.iter()
  }

  /// Finds the value for a member called `name` declared as `ty`.
  ///
  /// A type-keyed entry wins. Otherwise, among entries with the right name,
  /// literals are preferred for simple members and non-literals for the rest,
  /// falling back to the first one registered.
  pub fn find(&self, name: &str, ty: &TypeRef) -> Option<Option<Value>> {
    let by_type = self
      .entries
      .iter()
      .find(|d| matches!(&d.key, DependencyKey::Type(t) if t == ty));
    if let Some(dependency) = by_type {
      return Some(dependency.value.clone());
    }

    let wants_literal = ty.is_simple();
    let mut first = None;
    for dependency in self.named(name) {
      match &dependency.value {
        Some(value) if value.is_literal() == wants_literal => return Some(Some(value.clone())),
        _ => {
          first.get_or_insert(dependency);
        }
      }
    }
    first.map(|d| d.value.clone())
  }

  fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Dependency> + 'a {
    self
      .entries
      .iter()
      .filter(move |d| matches!(&d.key, DependencyKey::Name(n) if n == name))
  }
}
