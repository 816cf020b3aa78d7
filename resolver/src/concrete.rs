//! Descriptor tables for concrete types: their constructors, setters, and the
//! plugin types they can be exposed as.

use crate::error::{Error, Result};
use crate::types::{PluginType, TypeRef};
use crate::value::{FromValue, Service, Value};

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

pub(crate) type Object = Box<dyn Any + Send + Sync>;
pub(crate) type Factory = Arc<dyn Fn(&Arguments) -> Result<Object> + Send + Sync>;
pub(crate) type SetterFn = Arc<dyn Fn(&mut (dyn Any + Send + Sync), &Value) -> Result<()> + Send + Sync>;
type Cast = Arc<dyn Fn(Object) -> Option<Service> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
  Public,
  Private,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
  pub name: String,
  pub ty: TypeRef,
}

impl Parameter {
  pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
    Self {
      name: name.into(),
      ty,
    }
  }
}

#[derive(Clone)]
pub struct ConstructorInfo {
  visibility: Visibility,
  parameters: Vec<Parameter>,
  factory: Option<Factory>,
}

impl ConstructorInfo {
  pub fn visibility(&self) -> Visibility {
    self.visibility
  }

  pub fn parameters(&self) -> &[Parameter] {
    &self.parameters
  }

  pub(crate) fn factory(&self) -> Option<&Factory> {
    self.factory.as_ref()
  }
}

impl fmt::Debug for ConstructorInfo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ConstructorInfo")
      .field("visibility", &self.visibility)
      .field("parameters", &self.parameters)
      .finish_non_exhaustive()
  }
}

#[derive(Clone)]
pub struct SetterInfo {
  name: String,
  ty: TypeRef,
  injectable: bool,
  apply: SetterFn,
}

impl SetterInfo {
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn ty(&self) -> &TypeRef {
    &self.ty
  }

  /// Flagged setters are always resolved and count towards plan validity.
  pub fn is_injectable(&self) -> bool {
    self.injectable
  }

  pub(crate) fn apply(&self) -> &SetterFn {
    &self.apply
  }
}

impl fmt::Debug for SetterInfo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SetterInfo")
      .field("name", &self.name)
      .field("ty", &self.ty)
      .field("injectable", &self.injectable)
      .finish_non_exhaustive()
  }
}

/// Everything the engine knows about one concrete type.
pub struct ConcreteType {
  key: PluginType,
  constructors: Vec<ConstructorInfo>,
  setters: Vec<SetterInfo>,
  casts: HashMap<PluginType, Cast>,
}

impl ConcreteType {
  pub fn builder<T: Any + Send + Sync>() -> ConcreteTypeBuilder<T> {
    ConcreteTypeBuilder::new()
  }

  pub fn key(&self) -> PluginType {
    self.key
  }

  pub fn full_name(&self) -> &'static str {
    self.key.full_name()
  }

  /// Public constructors, greediest first. Ties keep declaration order.
  pub fn constructors(&self) -> Vec<&ConstructorInfo> {
    let mut ctors: Vec<&ConstructorInfo> = self
      .constructors
      .iter()
      .filter(|c| c.visibility == Visibility::Public && c.factory.is_some())
      .collect();
    ctors.sort_by(|a, b| b.parameters.len().cmp(&a.parameters.len()));
    ctors
  }

  pub fn setters(&self) -> &[SetterInfo] {
    &self.setters
  }

  pub fn can_be_plugged_into(&self, plugin: &PluginType) -> bool {
    self.casts.contains_key(plugin)
  }

  /// Wraps a freshly built object as a service of `plugin`.
  pub(crate) fn expose(&self, object: Object, plugin: &PluginType) -> Result<Service> {
    let not_pluggable = || Error::NotPluggable {
      concrete_type: self.full_name().to_string(),
      plugin_type: plugin.full_name().to_string(),
    };
    let cast = self.casts.get(plugin).ok_or_else(not_pluggable)?;
    cast(object).ok_or_else(not_pluggable)
  }
}

impl fmt::Debug for ConcreteType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ConcreteType")
      .field("name", &self.key.full_name())
      .field("constructors", &self.constructors)
      .field("setters", &self.setters)
      .finish_non_exhaustive()
  }
}

/// Builds the descriptor for `T`.
///
/// ```
/// use fibre_resolver::{ConcreteType, Parameter, TypeRef};
///
/// struct Clock {
///   zone: String,
/// }
///
/// let clock = ConcreteType::builder::<Clock>()
///   .constructor(vec![Parameter::new("zone", TypeRef::string())], |args| {
///     Ok(Clock { zone: args.get("zone")? })
///   })
///   .build();
///
/// assert_eq!(clock.constructors().len(), 1);
/// ```
pub struct ConcreteTypeBuilder<T> {
  constructors: Vec<ConstructorInfo>,
  setters: Vec<SetterInfo>,
  casts: HashMap<PluginType, Cast>,
  _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> ConcreteTypeBuilder<T> {
  fn new() -> Self {
    let mut casts: HashMap<PluginType, Cast> = HashMap::new();
    casts.insert(
      PluginType::of::<T>(),
      Arc::new(|object: Object| {
        object
          .downcast::<T>()
          .ok()
          .map(|t| Service::new::<T>(Arc::from(t)))
      }),
    );
    Self {
      constructors: Vec::new(),
      setters: Vec::new(),
      casts,
      _marker: PhantomData,
    }
  }

  pub fn constructor<F>(mut self, parameters: Vec<Parameter>, factory: F) -> Self
  where
    F: Fn(&Arguments) -> Result<T> + Send + Sync + 'static,
  {
    let factory: Factory = Arc::new(move |args: &Arguments| factory(args).map(|t| Box::new(t) as Object));
    self.constructors.push(ConstructorInfo {
      visibility: Visibility::Public,
      parameters,
      factory: Some(factory),
    });
    self
  }

  /// Declares a constructor that exists but can never be selected.
  pub fn private_constructor(mut self, parameters: Vec<Parameter>) -> Self {
    self.constructors.push(ConstructorInfo {
      visibility: Visibility::Private,
      parameters,
      factory: None,
    });
    self
  }

  /// An injectable setter: always resolved, a missing value invalidates the plan.
  pub fn setter<V, F>(self, name: &str, ty: TypeRef, set: F) -> Self
  where
    V: FromValue,
    F: Fn(&mut T, V) + Send + Sync + 'static,
  {
    self.push_setter(name, ty, true, set)
  }

  /// A setter applied only when configuration supplies a value for it.
  pub fn optional_setter<V, F>(self, name: &str, ty: TypeRef, set: F) -> Self
  where
    V: FromValue,
    F: Fn(&mut T, V) + Send + Sync + 'static,
  {
    self.push_setter(name, ty, false, set)
  }

  /// An injectable setter taking a plugin service.
  pub fn service_setter<P, F>(mut self, name: &str, set: F) -> Self
  where
    P: ?Sized + Any + Send + Sync,
    F: Fn(&mut T, Arc<P>) + Send + Sync + 'static,
  {
    let property = name.to_string();
    let apply: SetterFn = Arc::new(move |object: &mut (dyn Any + Send + Sync), value: &Value| {
      let target = downcast_target::<T>(object)?;
      let service = match value {
        Value::Object(s) => s.downcast::<P>(),
        _ => None,
      };
      let service = service.ok_or_else(|| wrong_value::<T>(&property, value))?;
      set(target, service);
      Ok(())
    });
    self.setters.push(SetterInfo {
      name: name.to_string(),
      ty: TypeRef::plugin::<P>(),
      injectable: true,
      apply,
    });
    self
  }

  /// Allows the built object to be handed out as `P`.
  pub fn implements<P, F>(mut self, cast: F) -> Self
  where
    P: ?Sized + Any + Send + Sync,
    F: Fn(Arc<T>) -> Arc<P> + Send + Sync + 'static,
  {
    self.casts.insert(
      PluginType::of::<P>(),
      Arc::new(move |object: Object| {
        object
          .downcast::<T>()
          .ok()
          .map(|t| Service::new::<P>(cast(Arc::from(t))))
      }),
    );
    self
  }

  pub fn build(self) -> Arc<ConcreteType> {
    Arc::new(ConcreteType {
      key: PluginType::of::<T>(),
      constructors: self.constructors,
      setters: self.setters,
      casts: self.casts,
    })
  }

  fn push_setter<V, F>(mut self, name: &str, ty: TypeRef, injectable: bool, set: F) -> Self
  where
    V: FromValue,
    F: Fn(&mut T, V) + Send + Sync + 'static,
  {
    let property = name.to_string();
    let apply: SetterFn = Arc::new(move |object: &mut (dyn Any + Send + Sync), value: &Value| {
      let target = downcast_target::<T>(object)?;
      let v = V::from_value(value).ok_or_else(|| wrong_value::<T>(&property, value))?;
      set(target, v);
      Ok(())
    });
    self.setters.push(SetterInfo {
      name: name.to_string(),
      ty,
      injectable,
      apply,
    });
    self
  }
}

fn downcast_target<T: Any>(object: &mut (dyn Any + Send + Sync)) -> Result<&mut T> {
  object
    .downcast_mut::<T>()
    .ok_or_else(|| Error::Construction {
      concrete_type: std::any::type_name::<T>().to_string(),
      reason: "setter applied to an object of another type".to_string(),
    })
}

fn wrong_value<T>(property: &str, value: &Value) -> Error {
  Error::Construction {
    concrete_type: std::any::type_name::<T>().to_string(),
    reason: format!("property '{}' cannot accept a value of type {}", property, value.type_name()),
  }
}

/// Materialized constructor arguments, by parameter name.
#[derive(Debug, Clone)]
pub struct Arguments {
  concrete_type: &'static str,
  values: Vec<(String, Value)>,
}

impl Arguments {
  pub(crate) fn new(concrete_type: &'static str, values: Vec<(String, Value)>) -> Self {
    Self {
      concrete_type,
      values,
    }
  }

  pub fn value(&self, name: &str) -> Option<&Value> {
    self
      .values
      .iter()
      .find(|(n, _)| n == name)
      .map(|(_, v)| v)
  }

  pub fn get<V: FromValue>(&self, name: &str) -> Result<V> {
    let value = self.require(name)?;
    V::from_value(value).ok_or_else(|| self.mismatch(name, value))
  }

  pub fn service<P: ?Sized + Any + Send + Sync>(&self, name: &str) -> Result<Arc<P>> {
    let value = self.require(name)?;
    let service = match value {
      Value::Object(s) => s.downcast::<P>(),
      _ => None,
    };
    service.ok_or_else(|| self.mismatch(name, value))
  }

  pub fn services<P: ?Sized + Any + Send + Sync>(&self, name: &str) -> Result<Vec<Arc<P>>> {
    let value = self.require(name)?;
    let Value::Seq(seq) = value else {
      return Err(self.mismatch(name, value));
    };
    seq
      .items
      .iter()
      .map(|item| match item {
        Value::Object(s) => s.downcast::<P>().ok_or_else(|| self.mismatch(name, item)),
        other => Err(self.mismatch(name, other)),
      })
      .collect()
  }

  /// The selected member name of an enum argument.
  pub fn enumeration(&self, name: &str) -> Result<&'static str> {
    match self.require(name)? {
      Value::Enum(e) => Ok(e.member),
      other => Err(self.mismatch(name, other)),
    }
  }

  fn require(&self, name: &str) -> Result<&Value> {
    self.value(name).ok_or_else(|| Error::Construction {
      concrete_type: self.concrete_type.to_string(),
      reason: format!("no argument named '{}'", name),
    })
  }

  fn mismatch(&self, name: &str, value: &Value) -> Error {
    Error::Construction {
      concrete_type: self.concrete_type.to_string(),
      reason: format!("argument '{}' has unexpected type {}", name, value.type_name()),
    }
  }
}
