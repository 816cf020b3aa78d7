//! Public macros for resolving from the global container.

/// Resolves a service from the global container.
///
/// # Panics
///
/// Panics with the resolution error if the service cannot be built. For a
/// non-panicking version, use `global().get_instance::<T>()` directly.
///
/// # Examples
///
/// ```
/// use fibre_resolver::{global, resolve, ConcreteType, Parameter, TypeRef};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync { fn greet(&self) -> String; }
///
/// struct EnglishGreeter { name: String }
/// impl Greeter for EnglishGreeter {
///   fn greet(&self) -> String { format!("Hello, {}!", self.name) }
/// }
///
/// let greeter = ConcreteType::builder::<EnglishGreeter>()
///   .constructor(vec![Parameter::new("name", TypeRef::string())], |args| {
///     Ok(EnglishGreeter { name: args.get("name")? })
///   })
///   .implements::<dyn Greeter, _>(|g| g as Arc<dyn Greeter>)
///   .build();
///
/// let mut instance = fibre_resolver::Instance::of_type(greeter);
/// if let Some(config) = instance.configuration_mut() {
///   config.set_property("name", "World");
/// }
/// global().add::<dyn Greeter>(instance);
///
/// let greeter = resolve!(trait Greeter);
/// assert_eq!(greeter.greet(), "Hello, World!");
/// ```
#[macro_export]
macro_rules! resolve {
  ($type:ty) => {
    $crate::global()
      .get_instance::<$type>()
      .unwrap_or_else(|e| {
        panic!(
          "Failed to resolve required service {}: {}",
          std::any::type_name::<$type>(),
          e
        )
      })
  };

  ($type:ty, $name:expr) => {
    $crate::global()
      .get_named_instance::<$type>($name)
      .unwrap_or_else(|e| {
        panic!(
          "Failed to resolve required service with name '{}' {}: {}",
          $name,
          std::any::type_name::<$type>(),
          e
        )
      })
  };

  // `dyn` is spelled out here so callers can write `resolve!(trait Greeter)`.
  (trait $trait_ident:ident) => {
    $crate::global()
      .get_instance::<dyn $trait_ident>()
      .unwrap_or_else(|e| {
        panic!(
          "Failed to resolve required trait service {}: {}",
          std::any::type_name::<dyn $trait_ident>(),
          e
        )
      })
  };

  (trait $trait_ident:ident, $name:expr) => {
    $crate::global()
      .get_named_instance::<dyn $trait_ident>($name)
      .unwrap_or_else(|e| {
        panic!(
          "Failed to resolve required trait service with name '{}' {}: {}",
          $name,
          std::any::type_name::<dyn $trait_ident>(),
          e
        )
      })
  };
}
