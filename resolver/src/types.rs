//! Runtime descriptions of the types a build plan can ask for.
//!
//! Rust has no reflection, so every constructor parameter and setter carries a
//! [`TypeRef`] describing what it needs. Abstractions are keyed by the `TypeId`
//! of a `dyn Trait` (or of a plain struct when a concrete type is requested
//! directly), the same way the container keys its registrations.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Primitive types that can be parsed from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimpleType {
  String,
  Int,
  Long,
  Float,
  Bool,
}

impl SimpleType {
  pub fn full_name(&self) -> &'static str {
    match self {
      SimpleType::String => "string",
      SimpleType::Int => "i32",
      SimpleType::Long => "i64",
      SimpleType::Float => "f64",
      SimpleType::Bool => "bool",
    }
  }
}

/// A string-backed enumeration, parsed by exact member name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumType {
  name: &'static str,
  members: &'static [&'static str],
}

impl EnumType {
  pub const fn new(name: &'static str, members: &'static [&'static str]) -> Self {
    Self { name, members }
  }

  pub fn full_name(&self) -> &'static str {
    self.name
  }

  pub fn members(&self) -> &'static [&'static str] {
    self.members
  }

  /// Case-sensitive lookup of a member by name.
  pub fn member(&self, name: &str) -> Option<&'static str> {
    self.members.iter().copied().find(|m| *m == name)
  }
}

/// An abstraction (or concrete type) that the registry can supply.
///
/// Equality and hashing use only the `TypeId`; the name is for display.
#[derive(Clone, Copy)]
pub struct PluginType {
  id: TypeId,
  name: &'static str,
}

impl PluginType {
  pub fn of<T: ?Sized + Any>() -> Self {
    Self {
      id: TypeId::of::<T>(),
      name: std::any::type_name::<T>(),
    }
  }

  pub fn type_id(&self) -> TypeId {
    self.id
  }

  pub fn full_name(&self) -> &'static str {
    self.name
  }
}

impl PartialEq for PluginType {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for PluginType {}

impl Hash for PluginType {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.id.hash(state);
  }
}

impl fmt::Debug for PluginType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "PluginType({})", self.name)
  }
}

/// The shape of a sequence-typed dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionShape {
  /// A fixed array, `T[]`.
  Array,
  /// A concrete growable list.
  List,
  /// The list abstraction; arrays and lists both satisfy it.
  IList,
  /// Any sequence at all.
  Enumerable,
}

impl CollectionShape {
  /// Whether a sequence of shape `self` can be handed out unchanged where
  /// `target` is required.
  pub fn satisfies(self, target: CollectionShape) -> bool {
    match target {
      CollectionShape::Enumerable => true,
      CollectionShape::IList => matches!(
        self,
        CollectionShape::Array | CollectionShape::List | CollectionShape::IList
      ),
      _ => self == target,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionType {
  pub shape: CollectionShape,
  pub element: Box<TypeRef>,
}

/// Everything a parameter or property can be declared as.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
  Simple(SimpleType),
  Enum(EnumType),
  Plugin(PluginType),
  Collection(CollectionType),
}

impl TypeRef {
  pub fn string() -> Self {
    TypeRef::Simple(SimpleType::String)
  }
  pub fn int() -> Self {
    TypeRef::Simple(SimpleType::Int)
  }
  pub fn long() -> Self {
    TypeRef::Simple(SimpleType::Long)
  }
  pub fn float() -> Self {
    TypeRef::Simple(SimpleType::Float)
  }
  pub fn bool() -> Self {
    TypeRef::Simple(SimpleType::Bool)
  }

  pub fn enumeration(ty: EnumType) -> Self {
    TypeRef::Enum(ty)
  }

  pub fn plugin<T: ?Sized + Any>() -> Self {
    TypeRef::Plugin(PluginType::of::<T>())
  }

  pub fn collection(shape: CollectionShape, element: TypeRef) -> Self {
    TypeRef::Collection(CollectionType {
      shape,
      element: Box::new(element),
    })
  }

  pub fn array_of(element: TypeRef) -> Self {
    Self::collection(CollectionShape::Array, element)
  }
  pub fn list_of(element: TypeRef) -> Self {
    Self::collection(CollectionShape::List, element)
  }
  pub fn ilist_of(element: TypeRef) -> Self {
    Self::collection(CollectionShape::IList, element)
  }
  pub fn enumerable_of(element: TypeRef) -> Self {
    Self::collection(CollectionShape::Enumerable, element)
  }

  /// Primitives and enums: these can only come from explicit configuration.
  pub fn is_simple(&self) -> bool {
    matches!(self, TypeRef::Simple(_) | TypeRef::Enum(_))
  }

  /// A sequence of plugin types, which the registry can fill with every
  /// registered implementation.
  pub fn is_all_possible(&self) -> bool {
    match self {
      TypeRef::Collection(c) => matches!(*c.element, TypeRef::Plugin(_)),
      _ => false,
    }
  }

  pub fn as_plugin(&self) -> Option<PluginType> {
    match self {
      TypeRef::Plugin(p) => Some(*p),
      _ => None,
    }
  }

  pub fn as_collection(&self) -> Option<&CollectionType> {
    match self {
      TypeRef::Collection(c) => Some(c),
      _ => None,
    }
  }

  pub fn full_name(&self) -> String {
    match self {
      TypeRef::Simple(s) => s.full_name().to_string(),
      TypeRef::Enum(e) => e.full_name().to_string(),
      TypeRef::Plugin(p) => p.full_name().to_string(),
      TypeRef::Collection(c) => {
        let element = c.element.full_name();
        match c.shape {
          CollectionShape::Array => format!("{}[]", element),
          CollectionShape::List => format!("List<{}>", element),
          CollectionShape::IList => format!("IList<{}>", element),
          CollectionShape::Enumerable => format!("IEnumerable<{}>", element),
        }
      }
    }
  }
}

impl fmt::Display for TypeRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.full_name())
  }
}

impl From<PluginType> for TypeRef {
  fn from(p: PluginType) -> Self {
    TypeRef::Plugin(p)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  trait Gateway {}

  #[test]
  fn all_possible_requires_plugin_elements() {
    assert!(TypeRef::array_of(TypeRef::plugin::<dyn Gateway>()).is_all_possible());
    assert!(TypeRef::enumerable_of(TypeRef::plugin::<dyn Gateway>()).is_all_possible());
    assert!(!TypeRef::list_of(TypeRef::string()).is_all_possible());
    assert!(!TypeRef::plugin::<dyn Gateway>().is_all_possible());
  }

  #[test]
  fn shape_satisfaction() {
    assert!(CollectionShape::Array.satisfies(CollectionShape::IList));
    assert!(CollectionShape::List.satisfies(CollectionShape::Enumerable));
    assert!(!CollectionShape::Array.satisfies(CollectionShape::List));
    assert!(!CollectionShape::List.satisfies(CollectionShape::Array));
  }

  #[test]
  fn collection_names() {
    assert_eq!(TypeRef::array_of(TypeRef::int()).full_name(), "i32[]");
    assert_eq!(TypeRef::list_of(TypeRef::string()).full_name(), "List<string>");
  }
}
