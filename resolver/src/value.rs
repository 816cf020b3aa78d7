//! Loosely typed values supplied to, or produced by, a build.

use crate::instance::Instance;
use crate::types::{CollectionShape, EnumType, PluginType, SimpleType, TypeRef};

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A built or supplied object, type-erased behind the plugin type it was
/// exposed as.
///
/// The inner box holds an `Arc<P>`, so trait objects survive the round trip
/// through `Any`.
#[derive(Clone)]
pub struct Service {
  plugin: PluginType,
  addr: usize,
  inner: Arc<dyn Any + Send + Sync>,
}

impl Service {
  pub fn new<P: ?Sized + Any + Send + Sync>(value: Arc<P>) -> Self {
    Self {
      plugin: PluginType::of::<P>(),
      addr: Arc::as_ptr(&value) as *const () as usize,
      inner: Arc::new(value),
    }
  }

  pub fn plugin_type(&self) -> PluginType {
    self.plugin
  }

  pub fn downcast<P: ?Sized + Any + Send + Sync>(&self) -> Option<Arc<P>> {
    self.inner.downcast_ref::<Arc<P>>().cloned()
  }

  /// Two services are the same when they expose the same allocation as the
  /// same plugin type.
  pub fn ptr_eq(&self, other: &Service) -> bool {
    self.plugin == other.plugin && self.addr == other.addr
  }
}

impl fmt::Debug for Service {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Service({}@{:#x})", self.plugin.full_name(), self.addr)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumValue {
  pub ty: EnumType,
  pub member: &'static str,
}

/// An ordered run of values in a particular collection shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
  pub shape: CollectionShape,
  pub element: TypeRef,
  pub items: Vec<Value>,
}

impl Sequence {
  pub fn type_ref(&self) -> TypeRef {
    TypeRef::collection(self.shape, self.element.clone())
  }

  /// The same elements, in the same order, in another shape.
  pub fn reshape(&self, shape: CollectionShape) -> Sequence {
    Sequence {
      shape,
      element: self.element.clone(),
      items: self.items.clone(),
    }
  }
}

#[derive(Debug, Clone)]
pub enum Value {
  Str(String),
  Int(i32),
  Long(i64),
  Float(f64),
  Bool(bool),
  Enum(EnumValue),
  Object(Service),
  Seq(Sequence),
  /// A build-time instance descriptor rather than a value.
  Instance(Arc<Instance>),
}

impl Value {
  pub fn service<P: ?Sized + Any + Send + Sync>(value: Arc<P>) -> Self {
    Value::Object(Service::new(value))
  }

  pub fn enumeration(ty: EnumType, member: &'static str) -> Self {
    Value::Enum(EnumValue { ty, member })
  }

  pub fn array(element: TypeRef, items: Vec<Value>) -> Self {
    Self::sequence(CollectionShape::Array, element, items)
  }

  pub fn list(element: TypeRef, items: Vec<Value>) -> Self {
    Self::sequence(CollectionShape::List, element, items)
  }

  pub fn sequence(shape: CollectionShape, element: TypeRef, items: Vec<Value>) -> Self {
    Value::Seq(Sequence {
      shape,
      element,
      items,
    })
  }

  /// The value's own type, if it has one. Instance descriptors do not.
  pub fn type_ref(&self) -> Option<TypeRef> {
    match self {
      Value::Str(_) => Some(TypeRef::Simple(SimpleType::String)),
      Value::Int(_) => Some(TypeRef::Simple(SimpleType::Int)),
      Value::Long(_) => Some(TypeRef::Simple(SimpleType::Long)),
      Value::Float(_) => Some(TypeRef::Simple(SimpleType::Float)),
      Value::Bool(_) => Some(TypeRef::Simple(SimpleType::Bool)),
      Value::Enum(e) => Some(TypeRef::Enum(e.ty)),
      Value::Object(s) => Some(TypeRef::Plugin(s.plugin_type())),
      Value::Seq(s) => Some(s.type_ref()),
      Value::Instance(_) => None,
    }
  }

  /// Display name of the value's apparent type, used in error messages.
  pub fn type_name(&self) -> String {
    match self.type_ref() {
      Some(ty) => ty.full_name(),
      None => "instance".to_string(),
    }
  }

  /// Whether this value can be used where `target` is required without any
  /// conversion.
  pub fn is_assignable_to(&self, target: &TypeRef) -> bool {
    match (self, target) {
      (Value::Str(_), TypeRef::Simple(SimpleType::String))
      | (Value::Int(_), TypeRef::Simple(SimpleType::Int))
      | (Value::Long(_), TypeRef::Simple(SimpleType::Long))
      | (Value::Float(_), TypeRef::Simple(SimpleType::Float))
      | (Value::Bool(_), TypeRef::Simple(SimpleType::Bool)) => true,
      (Value::Enum(e), TypeRef::Enum(t)) => e.ty == *t,
      (Value::Object(s), TypeRef::Plugin(p)) => s.plugin_type() == *p,
      (Value::Seq(s), TypeRef::Collection(c)) => {
        s.shape.satisfies(c.shape) && s.element == *c.element
      }
      _ => false,
    }
  }

  /// Literal values are the ones a textual configuration can express.
  pub fn is_literal(&self) -> bool {
    matches!(
      self,
      Value::Str(_)
        | Value::Int(_)
        | Value::Long(_)
        | Value::Float(_)
        | Value::Bool(_)
        | Value::Enum(_)
    )
  }
}

impl PartialEq for Value {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Value::Str(a), Value::Str(b)) => a == b,
      (Value::Int(a), Value::Int(b)) => a == b,
      (Value::Long(a), Value::Long(b)) => a == b,
      (Value::Float(a), Value::Float(b)) => a == b,
      (Value::Bool(a), Value::Bool(b)) => a == b,
      (Value::Enum(a), Value::Enum(b)) => a == b,
      (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
      (Value::Seq(a), Value::Seq(b)) => a == b,
      (Value::Instance(a), Value::Instance(b)) => Arc::ptr_eq(a, b),
      _ => false,
    }
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Str(s) => f.write_str(s),
      Value::Int(i) => write!(f, "{}", i),
      Value::Long(l) => write!(f, "{}", l),
      Value::Float(x) => write!(f, "{}", x),
      Value::Bool(b) => write!(f, "{}", b),
      Value::Enum(e) => f.write_str(e.member),
      Value::Object(s) => f.write_str(s.plugin_type().full_name()),
      Value::Seq(s) => write!(f, "{} (count = {})", s.type_ref(), s.items.len()),
      Value::Instance(i) => write!(f, "Instance '{}'", i.name()),
    }
  }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self {
    Value::Str(s.to_string())
  }
}

impl From<String> for Value {
  fn from(s: String) -> Self {
    Value::Str(s)
  }
}

impl From<i32> for Value {
  fn from(i: i32) -> Self {
    Value::Int(i)
  }
}

impl From<i64> for Value {
  fn from(l: i64) -> Self {
    Value::Long(l)
  }
}

impl From<f64> for Value {
  fn from(x: f64) -> Self {
    Value::Float(x)
  }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self {
    Value::Bool(b)
  }
}

impl From<Arc<Instance>> for Value {
  fn from(i: Arc<Instance>) -> Self {
    Value::Instance(i)
  }
}

/// Extraction of plain Rust values from a materialized [`Value`].
pub trait FromValue: Sized {
  fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for String {
  fn from_value(value: &Value) -> Option<Self> {
    match value {
      Value::Str(s) => Some(s.clone()),
      _ => None,
    }
  }
}

impl FromValue for i32 {
  fn from_value(value: &Value) -> Option<Self> {
    match value {
      Value::Int(i) => Some(*i),
      _ => None,
    }
  }
}

impl FromValue for i64 {
  fn from_value(value: &Value) -> Option<Self> {
    match value {
      Value::Long(l) => Some(*l),
      Value::Int(i) => Some(i64::from(*i)),
      _ => None,
    }
  }
}

impl FromValue for f64 {
  fn from_value(value: &Value) -> Option<Self> {
    match value {
      Value::Float(x) => Some(*x),
      _ => None,
    }
  }
}

impl FromValue for bool {
  fn from_value(value: &Value) -> Option<Self> {
    match value {
      Value::Bool(b) => Some(*b),
      _ => None,
    }
  }
}

impl<T: FromValue> FromValue for Vec<T> {
  fn from_value(value: &Value) -> Option<Self> {
    match value {
      Value::Seq(s) => s.items.iter().map(T::from_value).collect(),
      _ => None,
    }
  }
}
