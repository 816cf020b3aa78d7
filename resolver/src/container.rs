//! The main `Container` struct and its associated methods.

use crate::concrete::ConcreteType;
use crate::error::{Error, Result};
use crate::explicit::{ExplicitArguments, ExplicitInstance};
use crate::instance::{ConfiguredInstance, Instance, InstanceKind, Lifecycle};
use crate::plan::{build_source, BuildPlan};
use crate::policies::Policies;
use crate::registry::PluginGraph;
use crate::report::ConfigurationReport;
use crate::session::{downcast_value, BuildSession};
use crate::types::{PluginType, TypeRef};
use crate::value::Value;

use std::any::Any;
use std::sync::Arc;
use tracing::{debug, warn};

/// The Inversion of Control (IoC) container.
///
/// Holds the plugin graph and the policies used to plan builds. Registration
/// is thread-safe and may happen at any time; every resolution call runs in
/// its own [`BuildSession`].
#[derive(Default)]
pub struct Container {
  graph: PluginGraph,
  policies: Policies,
}

impl Container {
  /// Creates a new, empty `Container` with default policies.
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_policies(policies: Policies) -> Self {
    Self {
      graph: PluginGraph::new(),
      policies,
    }
  }

  pub fn graph(&self) -> &PluginGraph {
    &self.graph
  }

  pub fn policies(&self) -> &Policies {
    &self.policies
  }

  /// Starts a session against this container.
  pub fn session(&self) -> BuildSession<'_> {
    BuildSession::new(&self.graph, &self.policies)
  }

  // --- PRIVATE HELPERS ---

  fn add_type_internal<P: ?Sized + Any>(
    &self,
    name: Option<&str>,
    concrete: Arc<ConcreteType>,
    lifecycle: Option<Lifecycle>,
  ) -> Arc<Instance> {
    let mut instance = match name {
      Some(n) => Instance::configured(n, ConfiguredInstance::new(concrete)),
      None => Instance::of_type(concrete),
    };
    if let Some(lifecycle) = lifecycle {
      instance.set_lifecycle(lifecycle);
    }
    self.graph.add(PluginType::of::<P>(), instance)
  }

  fn add_instance_internal<P: ?Sized + Any + Send + Sync>(
    &self,
    name: Option<&str>,
    value: Arc<P>,
  ) -> Arc<Instance> {
    let name = name.unwrap_or(std::any::type_name::<P>());
    self
      .graph
      .add(PluginType::of::<P>(), Instance::object(name, Value::service(value)))
  }

  // --- PUBLIC API ---

  // --- Instance Registration ---
  pub fn add_instance<P: ?Sized + Any + Send + Sync>(&self, value: Arc<P>) -> Arc<Instance> {
    self.add_instance_internal(None, value)
  }
  pub fn add_instance_with_name<P: ?Sized + Any + Send + Sync>(
    &self,
    name: &str,
    value: Arc<P>,
  ) -> Arc<Instance> {
    self.add_instance_internal(Some(name), value)
  }

  // --- Type Registration ---
  /// Plugs `concrete` into `P` with the policy's default lifecycle.
  pub fn add_type<P: ?Sized + Any>(&self, concrete: Arc<ConcreteType>) -> Arc<Instance> {
    self.add_type_internal::<P>(None, concrete, None)
  }
  pub fn add_type_with_name<P: ?Sized + Any>(
    &self,
    name: &str,
    concrete: Arc<ConcreteType>,
  ) -> Arc<Instance> {
    self.add_type_internal::<P>(Some(name), concrete, None)
  }
  pub fn add_singleton<P: ?Sized + Any>(&self, concrete: Arc<ConcreteType>) -> Arc<Instance> {
    self.add_type_internal::<P>(None, concrete, Some(Lifecycle::Singleton))
  }
  pub fn add_transient<P: ?Sized + Any>(&self, concrete: Arc<ConcreteType>) -> Arc<Instance> {
    self.add_type_internal::<P>(None, concrete, Some(Lifecycle::Transient))
  }

  /// Registers a fully configured instance for `P`.
  pub fn add<P: ?Sized + Any>(&self, instance: Instance) -> Arc<Instance> {
    self.graph.add(PluginType::of::<P>(), instance)
  }

  pub fn set_default<P: ?Sized + Any>(&self, name: &str) -> Result<()> {
    self.graph.set_default(PluginType::of::<P>(), name)
  }

  // --- Resolution ---
  /// Resolves the default instance of `P`.
  pub fn get_instance<P: ?Sized + Any + Send + Sync>(&self) -> Result<Arc<P>> {
    self.session().get::<P>()
  }

  pub fn get_named_instance<P: ?Sized + Any + Send + Sync>(&self, name: &str) -> Result<Arc<P>> {
    let plugin = PluginType::of::<P>();
    let instance = self
      .graph
      .find(&plugin, name)
      .ok_or_else(|| Error::NamedInstanceNotFound {
        plugin_type: plugin.full_name().to_string(),
        name: name.to_string(),
      })?;
    let value = self.session().build_instance(&instance, &plugin)?;
    downcast_value::<P>(value)
  }

  /// Every registered instance of `P`, in registration order.
  pub fn get_all_instances<P: ?Sized + Any + Send + Sync>(&self) -> Result<Vec<Arc<P>>> {
    let ty = TypeRef::enumerable_of(TypeRef::plugin::<P>());
    match self.session().all_possible(&ty)? {
      Value::Seq(seq) => seq.items.into_iter().map(downcast_value::<P>).collect(),
      other => downcast_value::<P>(other).map(|p| vec![p]),
    }
  }

  /// Resolves `P` with per-request overrides.
  ///
  /// Named arguments override same-named constructor parameters and setters;
  /// type-keyed arguments become the session default for their type, so they
  /// also reach nested dependencies.
  pub fn get_instance_with<P: ?Sized + Any + Send + Sync>(
    &self,
    args: ExplicitArguments,
  ) -> Result<Arc<P>> {
    let plugin = PluginType::of::<P>();
    let default_instance = self.graph.default_instance(&plugin);
    let explicit = ExplicitInstance::new(
      TypeRef::Plugin(plugin),
      args,
      default_instance.as_deref(),
      self.graph.concrete_type(&plugin),
    );
    let value = self.session().build_explicit(&explicit)?;
    downcast_value::<P>(value)
  }

  /// Optional lookup, `None` on any failure.
  pub fn get<P: ?Sized + Any + Send + Sync>(&self, name: Option<&str>) -> Option<Arc<P>> {
    let result = match name {
      Some(n) => self.get_named_instance::<P>(n),
      None => self.get_instance::<P>(),
    };
    match result {
      Ok(service) => Some(service),
      Err(e) => {
        debug!(plugin = std::any::type_name::<P>(), error = %e, "resolution failed");
        None
      }
    }
  }

  // --- Diagnostics ---
  /// The plan the default instance of `P` would be built with.
  pub fn build_plan_for<P: ?Sized + Any>(&self) -> Result<BuildPlan> {
    let plugin = PluginType::of::<P>();
    let instance = self
      .graph
      .default_instance(&plugin)
      .ok_or_else(|| Error::NoDefaultInstance {
        plugin_type: plugin.full_name().to_string(),
      })?;
    self.plan_for(&plugin, &instance)
  }

  /// Plans every configured instance and reports all problems at once.
  pub fn assert_configuration_is_valid(&self) -> Result<()> {
    let mut report = ConfigurationReport::default();

    for plugin in self.graph.plugin_types() {
      for instance in self.graph.instances(&plugin) {
        if let InstanceKind::Object(_) = instance.kind() {
          continue;
        }
        match self.plan_for(&plugin, &instance) {
          Ok(plan) => report.add_problems(
            plugin.full_name(),
            instance.name(),
            plan.problems().cloned().collect(),
          ),
          Err(e) => report.add_error(plugin.full_name(), instance.name(), e.to_string()),
        }
      }
    }

    if report.is_empty() {
      Ok(())
    } else {
      warn!(entries = report.entries().len(), "configuration is invalid");
      Err(Error::InvalidConfiguration(report))
    }
  }

  fn plan_for(&self, plugin: &PluginType, instance: &Instance) -> Result<BuildPlan> {
    let configuration = instance
      .configuration()
      .ok_or_else(|| Error::NoDefaultInstance {
        plugin_type: plugin.full_name().to_string(),
      })?;
    let concrete = configuration
      .plugged_type()
      .ok_or_else(|| Error::NoDefaultInstance {
        plugin_type: plugin.full_name().to_string(),
      })?;
    build_source(concrete, None, &configuration.dependencies(), &self.policies)
  }
}
