//! Per-request argument overrides.

use crate::concrete::ConcreteType;
use crate::error::{Error, Result};
use crate::instance::{ConfiguredInstance, Instance};
use crate::plan::{build_source, BuildPlan};
use crate::policies::Policies;
use crate::session::BuildSession;
use crate::types::TypeRef;
use crate::value::Value;

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Result of looking up an explicit argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arg<'a> {
  Absent,
  /// Present, but explicitly set to nothing.
  Null,
  Value(&'a Value),
}

impl<'a> Arg<'a> {
  pub fn is_present(&self) -> bool {
    !matches!(self, Arg::Absent)
  }

  pub fn value(&self) -> Option<&'a Value> {
    match self {
      Arg::Value(v) => Some(v),
      _ => None,
    }
  }

  fn from_slot(slot: Option<&'a Option<Value>>) -> Self {
    match slot {
      None => Arg::Absent,
      Some(None) => Arg::Null,
      Some(Some(v)) => Arg::Value(v),
    }
  }
}

/// Caller-supplied values for one build, keyed by name or by type.
///
/// Both keys are set at most once; a second `set` for the same key is
/// rejected rather than overwriting.
#[derive(Debug, Clone, Default)]
pub struct ExplicitArguments {
  args: HashMap<String, Option<Value>>,
  children: HashMap<TypeRef, Option<Value>>,
}

impl ExplicitArguments {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn from_args(args: HashMap<String, Option<Value>>) -> Self {
    Self {
      args,
      children: HashMap::new(),
    }
  }

  pub fn get<T: ?Sized + Any + Send + Sync>(&self) -> Option<Arc<T>> {
    match self.get_type(&TypeRef::plugin::<T>()) {
      Arg::Value(Value::Object(s)) => s.downcast::<T>(),
      _ => None,
    }
  }

  pub fn get_type(&self, ty: &TypeRef) -> Arg<'_> {
    Arg::from_slot(self.children.get(ty))
  }

  pub fn set<T: ?Sized + Any + Send + Sync>(&mut self, value: Arc<T>) -> Result<()> {
    self.set_type(TypeRef::plugin::<T>(), Some(Value::service(value)))
  }

  pub fn set_type(&mut self, ty: TypeRef, value: Option<Value>) -> Result<()> {
    if self.children.contains_key(&ty) {
      return Err(Error::DuplicateExplicitType {
        type_name: ty.full_name(),
      });
    }
    self.children.insert(ty, value);
    Ok(())
  }

  pub fn set_arg(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<()> {
    self.insert_arg(name.into(), Some(value.into()))
  }

  pub fn set_arg_null(&mut self, name: impl Into<String>) -> Result<()> {
    self.insert_arg(name.into(), None)
  }

  pub fn get_arg(&self, name: &str) -> Arg<'_> {
    Arg::from_slot(self.args.get(name))
  }

  pub fn has<T: ?Sized + Any>(&self) -> bool {
    self.has_type(&TypeRef::plugin::<T>())
  }

  pub fn has_type(&self, ty: &TypeRef) -> bool {
    self.children.contains_key(ty)
  }

  pub fn has_arg(&self, name: &str) -> bool {
    self.args.contains_key(name)
  }

  /// The override for a member, type-keyed first, then by name.
  ///
  /// A named literal reaches a simple or enum member in its text form, the
  /// same form `configure` writes as a property, and is coerced from there.
  pub fn lookup(&self, name: &str, ty: &TypeRef) -> Option<Option<Value>> {
    if let Some(slot) = self.children.get(ty) {
      return Some(slot.clone());
    }

    let slot = self.args.get(name)?;
    Some(match slot {
      Some(value) if ty.is_simple() && value.is_literal() => Some(Value::Str(value.to_string())),
      other => other.clone(),
    })
  }

  /// Writes every non-null named argument into `instance`, both as a literal
  /// property and as a child value, so that either a primitive or an object
  /// member of that name can pick it up.
  pub fn configure(&self, instance: &mut ConfiguredInstance) {
    for (name, value) in &self.args {
      let Some(value) = value else { continue };
      instance.set_property(name.clone(), value.to_string());
      instance.child(name.clone()).is(value.clone());
    }
  }

  /// Pushes every type-keyed argument into `session` as its default, nulls
  /// included.
  pub fn register_defaults(&self, session: &mut BuildSession<'_>) {
    for (ty, value) in &self.children {
      session.register_default(ty.clone(), value.clone());
    }
  }

  fn insert_arg(&mut self, name: String, value: Option<Value>) -> Result<()> {
    if self.args.contains_key(&name) {
      return Err(Error::DuplicateExplicitArg { name });
    }
    self.args.insert(name, value);
    Ok(())
  }
}

/// A one-off configuration combining explicit arguments with whatever the
/// registry would otherwise have used.
#[derive(Debug, Clone)]
pub struct ExplicitInstance {
  plugin_type: TypeRef,
  args: ExplicitArguments,
  configuration: ConfiguredInstance,
}

impl ExplicitInstance {
  /// Applies `args` to a fresh configuration, then merges in the default
  /// instance's configuration underneath. Without a configured default, the
  /// requested concrete type is targeted directly.
  pub fn new(
    plugin_type: TypeRef,
    args: ExplicitArguments,
    default_instance: Option<&Instance>,
    requested: Option<Arc<ConcreteType>>,
  ) -> Self {
    let mut configuration = ConfiguredInstance::empty();
    args.configure(&mut configuration);

    match default_instance.and_then(Instance::configuration) {
      Some(default_configuration) => configuration.merge_from(default_configuration),
      None => {
        if let Some(concrete) = requested {
          configuration.set_plugged_type(concrete);
        }
      }
    }

    Self {
      plugin_type,
      args,
      configuration,
    }
  }

  pub fn plugin_type(&self) -> &TypeRef {
    &self.plugin_type
  }

  pub fn arguments(&self) -> &ExplicitArguments {
    &self.args
  }

  pub fn configuration(&self) -> &ConfiguredInstance {
    &self.configuration
  }

  pub fn build_plan(&self, policies: &Policies) -> Result<BuildPlan> {
    let concrete = self
      .configuration
      .plugged_type()
      .ok_or_else(|| Error::NoDefaultInstance {
        plugin_type: self.plugin_type.full_name(),
      })?;
    build_source(
      concrete,
      Some(&self.args),
      &self.configuration.dependencies(),
      policies,
    )
  }
}
