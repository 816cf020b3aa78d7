//! The process-wide container.

use crate::container::Container;
use once_cell::sync::Lazy;

// Created on first access.
static GLOBAL_CONTAINER: Lazy<Container> = Lazy::new(Container::default);

/// Provides a reference to the global container instance.
///
/// # Examples
///
/// ```
/// use fibre_resolver::{global, ConcreteType};
///
/// struct Settings;
///
/// global().add_type::<Settings>(
///   ConcreteType::builder::<Settings>()
///     .constructor(vec![], |_| Ok(Settings))
///     .build(),
/// );
/// assert!(global().get_instance::<Settings>().is_ok());
/// ```
pub fn global() -> &'static Container {
  &GLOBAL_CONTAINER
}
