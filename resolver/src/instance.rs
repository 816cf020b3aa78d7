//! Instance descriptors: how to obtain one value for a plugin type.

use crate::concrete::ConcreteType;
use crate::dependencies::DependencyCollection;
use crate::source::{DependencySource, LifecycleSource};
use crate::value::Value;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// How long a built value is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
  /// A new value on every request.
  #[default]
  Transient,
  /// One value per build session.
  PerRequest,
  /// One value for the lifetime of the instance.
  Singleton,
}

/// A mutable description of how to build one concrete type.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredInstance {
  plugged_type: Option<Arc<ConcreteType>>,
  properties: HashMap<String, String>,
  children: HashMap<String, Value>,
}

impl ConfiguredInstance {
  pub fn new(plugged_type: Arc<ConcreteType>) -> Self {
    Self {
      plugged_type: Some(plugged_type),
      ..Self::default()
    }
  }

  /// A configuration with nothing plugged in yet.
  pub fn empty() -> Self {
    Self::default()
  }

  pub fn plugged_type(&self) -> Option<&Arc<ConcreteType>> {
    self.plugged_type.as_ref()
  }

  pub fn set_plugged_type(&mut self, plugged_type: Arc<ConcreteType>) -> &mut Self {
    self.plugged_type = Some(plugged_type);
    self
  }

  pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
    self.properties.insert(name.into(), value.into());
    self
  }

  pub fn property(&self, name: &str) -> Option<&str> {
    self.properties.get(name).map(String::as_str)
  }

  pub fn child(&mut self, name: impl Into<String>) -> ChildExpression<'_> {
    ChildExpression {
      instance: self,
      name: name.into(),
    }
  }

  pub fn child_value(&self, name: &str) -> Option<&Value> {
    self.children.get(name)
  }

  /// Copies `base` underneath this configuration: properties first, then
  /// children, each only where this configuration has no entry of its own.
  /// The plugged type is taken from `base` when none is set.
  pub fn merge_from(&mut self, base: &ConfiguredInstance) {
    for (name, value) in &base.properties {
      self
        .properties
        .entry(name.clone())
        .or_insert_with(|| value.clone());
    }
    for (name, value) in &base.children {
      self
        .children
        .entry(name.clone())
        .or_insert_with(|| value.clone());
    }
    if self.plugged_type.is_none() {
      self.plugged_type = base.plugged_type.clone();
    }
  }

  /// Children and literal properties as one lookup table.
  pub fn dependencies(&self) -> DependencyCollection {
    let mut deps = DependencyCollection::new();
    for (name, value) in &self.children {
      deps.add_value(name.clone(), Some(value.clone()));
    }
    for (name, value) in &self.properties {
      deps.add(name.clone(), value.clone());
    }
    deps
  }
}

pub struct ChildExpression<'a> {
  instance: &'a mut ConfiguredInstance,
  name: String,
}

impl<'a> ChildExpression<'a> {
  pub fn is(self, value: impl Into<Value>) -> &'a mut ConfiguredInstance {
    self.instance.children.insert(self.name, value.into());
    self.instance
  }
}

#[derive(Debug, Clone)]
pub enum InstanceKind {
  Configured(ConfiguredInstance),
  /// A value that already exists.
  Object(Value),
}

/// A named way of producing a value, plus the policy for caching it.
pub struct Instance {
  id: u64,
  name: String,
  lifecycle: Option<Lifecycle>,
  kind: InstanceKind,
  singleton: OnceCell<Value>,
}

impl Instance {
  pub fn configured(name: impl Into<String>, configuration: ConfiguredInstance) -> Self {
    Self::with_kind(name.into(), InstanceKind::Configured(configuration))
  }

  pub fn object(name: impl Into<String>, value: Value) -> Self {
    Self::with_kind(name.into(), InstanceKind::Object(value))
  }

  /// A default configuration for `concrete`, named after it.
  pub fn of_type(concrete: Arc<ConcreteType>) -> Self {
    let name = concrete.full_name().to_string();
    Self::configured(name, ConfiguredInstance::new(concrete))
  }

  fn with_kind(name: String, kind: InstanceKind) -> Self {
    Self {
      id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
      name,
      lifecycle: None,
      kind,
      singleton: OnceCell::new(),
    }
  }

  pub fn with_lifecycle(mut self, lifecycle: Lifecycle) -> Self {
    self.lifecycle = Some(lifecycle);
    self
  }

  pub fn set_lifecycle(&mut self, lifecycle: Lifecycle) -> &mut Self {
    self.lifecycle = Some(lifecycle);
    self
  }

  pub fn id(&self) -> u64 {
    self.id
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// The explicitly set lifecycle, if any. Unset means the policy default.
  pub fn lifecycle(&self) -> Option<Lifecycle> {
    self.lifecycle
  }

  pub fn kind(&self) -> &InstanceKind {
    &self.kind
  }

  pub fn configuration(&self) -> Option<&ConfiguredInstance> {
    match &self.kind {
      InstanceKind::Configured(c) => Some(c),
      InstanceKind::Object(_) => None,
    }
  }

  pub fn configuration_mut(&mut self) -> Option<&mut ConfiguredInstance> {
    match &mut self.kind {
      InstanceKind::Configured(c) => Some(c),
      InstanceKind::Object(_) => None,
    }
  }

  /// The source handed out when this instance is injected somewhere.
  pub fn dependency_source(self: &Arc<Self>) -> DependencySource {
    DependencySource::Lifecycle(LifecycleSource {
      instance: Arc::clone(self),
    })
  }

  pub(crate) fn singleton_cell(&self) -> &OnceCell<Value> {
    &self.singleton
  }
}

impl fmt::Debug for Instance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Instance")
      .field("id", &self.id)
      .field("name", &self.name)
      .field("lifecycle", &self.lifecycle)
      .field("kind", &self.kind)
      .finish_non_exhaustive()
  }
}
