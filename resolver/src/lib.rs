//! # Fibre Resolver
//!
//! The dependency resolution engine behind a Fibre container: it decides how
//! each constructor argument and setter of a concrete type gets its value,
//! picks which constructor to call, converts configured text into typed
//! values, and lets a caller override any of it for a single request.
//!
//! ## Core Concepts
//!
//! - **ConcreteType**: A descriptor for a buildable type: its constructors,
//!   setters and the plugin types it can be exposed as.
//! - **DependencySource**: Where one member's value comes from, decided by
//!   [`source_for`]. Unresolvable members become problems, not errors, so a
//!   whole plan can be reported at once.
//! - **BuildPlan**: The selected constructor plus every setter that will be
//!   applied, produced by [`build_source`].
//! - **ExplicitArguments**: Per-request overrides keyed by name or by type.
//! - **Container**: Registration and resolution on top of all of the above,
//!   with a global instance available through [`global()`].
//!
//! ## Quick Start
//!
//! ```
//! use fibre_resolver::{ConcreteType, Container, ExplicitArguments, Parameter, TypeRef};
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!   fn greet(&self) -> String;
//! }
//!
//! struct EnglishGreeter {
//!   name: String,
//!   excited: bool,
//! }
//!
//! impl Greeter for EnglishGreeter {
//!   fn greet(&self) -> String {
//!     let end = if self.excited { "!" } else { "." };
//!     format!("Hello, {}{}", self.name, end)
//!   }
//! }
//!
//! let container = Container::new();
//! container.add_type::<dyn Greeter>(
//!   ConcreteType::builder::<EnglishGreeter>()
//!     .constructor(
//!       vec![
//!         Parameter::new("name", TypeRef::string()),
//!         Parameter::new("excited", TypeRef::bool()),
//!       ],
//!       |args| {
//!         Ok(EnglishGreeter {
//!           name: args.get("name")?,
//!           excited: args.get("excited")?,
//!         })
//!       },
//!     )
//!     .implements::<dyn Greeter, _>(|g| g as Arc<dyn Greeter>)
//!     .build(),
//! );
//!
//! // Both parameters are primitives and nothing configures them yet.
//! assert!(container.assert_configuration_is_valid().is_err());
//!
//! let mut args = ExplicitArguments::new();
//! args.set_arg("name", "World").unwrap();
//! args.set_arg("excited", "true").unwrap();
//!
//! let greeter = container.get_instance_with::<dyn Greeter>(args).unwrap();
//! assert_eq!(greeter.greet(), "Hello, World!");
//! ```

mod coerce;
mod concrete;
mod container;
mod dependencies;
mod error;
mod explicit;
mod global;
mod guard;
mod instance;
mod macros;
mod plan;
mod policies;
mod registry;
mod report;
mod session;
mod source;
mod types;
mod value;

pub use coerce::{coerce, ConversionError};
pub use concrete::{
  Arguments, ConcreteType, ConcreteTypeBuilder, ConstructorInfo, Parameter, SetterInfo, Visibility,
};
pub use container::Container;
pub use dependencies::{Dependency, DependencyCollection, DependencyKey};
pub use error::{Error, Result};
pub use explicit::{Arg, ExplicitArguments, ExplicitInstance};
pub use global::global;
pub use instance::{ChildExpression, ConfiguredInstance, Instance, InstanceKind, Lifecycle};
pub use plan::{build_constructor_step, build_source, Argument, BuildPlan, ConstructorStep, SetterStep};
pub use policies::{Policies, SetterPolicy};
pub use registry::PluginGraph;
pub use report::{ConfigurationReport, ReportEntry};
pub use session::BuildSession;
pub use source::{
  source_for, Constant, DependencyProblem, DependencySource, LifecycleSource, MemberKind,
  ProblemKind, MISSING_PRIMITIVE,
};
pub use types::{CollectionShape, CollectionType, EnumType, PluginType, SimpleType, TypeRef};
pub use value::{EnumValue, FromValue, Sequence, Service, Value};
