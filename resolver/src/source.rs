//! Dependency sources: where each constructor argument or setter value comes
//! from at build time.

use crate::coerce::{coerce, ConversionError};
use crate::instance::Instance;
use crate::types::TypeRef;
use crate::value::Value;

use std::fmt;
use std::sync::Arc;

pub const MISSING_PRIMITIVE: &str = "Required primitive dependency is not explicitly defined";

/// Which kind of member a dependency is being resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
  ConstructorArgument,
  SetterProperty,
}

impl fmt::Display for MemberKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      MemberKind::ConstructorArgument => f.write_str("Constructor Argument"),
      MemberKind::SetterProperty => f.write_str("Setter Property"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProblemKind {
  CastingError,
  UnableToDetermineDependency,
  MissingPrimitiveDependency,
}

/// A dependency that cannot be satisfied, kept as data so a whole plan can be
/// reported at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyProblem {
  pub name: String,
  pub member_kind: MemberKind,
  pub returned_type: TypeRef,
  pub kind: ProblemKind,
  pub message: String,
}

impl DependencyProblem {
  pub fn casting_error(value: &str, from: &str, to: &str) -> String {
    format!("Could not convert value '{}' of type {} to type {}", value, from, to)
  }

  pub fn unable_to_determine(type_name: &str, value: &Value) -> String {
    format!(
      "Unable to determine how to source dependency {} and value '{}'",
      type_name, value
    )
  }
}

impl fmt::Display for DependencyProblem {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} '{}' ({}): {}",
      self.member_kind, self.name, self.returned_type, self.message
    )
  }
}

/// A fixed, already typed value.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
  pub returned_type: TypeRef,
  pub value: Value,
}

impl Constant {
  pub fn new(returned_type: TypeRef, value: Value) -> Self {
    Self {
      returned_type,
      value,
    }
  }
}

/// Defers to the lifecycle-managed value of one specific instance.
#[derive(Debug, Clone)]
pub struct LifecycleSource {
  pub instance: Arc<Instance>,
}

impl PartialEq for LifecycleSource {
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.instance, &other.instance)
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DependencySource {
  Constant(Constant),
  /// Whatever the session or registry considers the default for the type.
  Default(TypeRef),
  Lifecycle(LifecycleSource),
  /// Every registered implementation of the collection's element type.
  AllPossible(TypeRef),
  Problem(DependencyProblem),
}

impl DependencySource {
  pub fn is_problem(&self) -> bool {
    matches!(self, DependencySource::Problem(_))
  }

  pub fn as_problem(&self) -> Option<&DependencyProblem> {
    match self {
      DependencySource::Problem(p) => Some(p),
      _ => None,
    }
  }

  pub fn as_constant(&self) -> Option<&Constant> {
    match self {
      DependencySource::Constant(c) => Some(c),
      _ => None,
    }
  }
}

/// Decides where the value for one member comes from.
///
/// Pure: no registry or session is consulted, only the declared type and the
/// value (if any) found in configuration.
pub fn source_for(
  member_kind: MemberKind,
  name: &str,
  target: &TypeRef,
  supplied: Option<Value>,
) -> DependencySource {
  let problem = |kind: ProblemKind, message: String| {
    DependencySource::Problem(DependencyProblem {
      name: name.to_string(),
      member_kind,
      returned_type: target.clone(),
      kind,
      message,
    })
  };

  let value = match supplied {
    None if target.is_simple() => {
      return problem(ProblemKind::MissingPrimitiveDependency, MISSING_PRIMITIVE.to_string());
    }
    None if target.is_all_possible() => return DependencySource::AllPossible(target.clone()),
    None => return DependencySource::Default(target.clone()),
    Some(Value::Instance(instance)) => return instance.dependency_source(),
    Some(value) => value,
  };

  let original = value.clone();
  match coerce(value, target) {
    Ok(coerced) => DependencySource::Constant(Constant::new(target.clone(), coerced)),
    Err(ConversionError::Casting { value, from, to }) => problem(
      ProblemKind::CastingError,
      DependencyProblem::casting_error(&value, &from, &to),
    ),
    Err(ConversionError::Mismatch { .. }) => problem(
      ProblemKind::UnableToDetermineDependency,
      DependencyProblem::unable_to_determine(&target.full_name(), &original),
    ),
  }
}
