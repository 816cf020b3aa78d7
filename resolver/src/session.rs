//! Build sessions: one per top-level request.

use crate::error::{Error, Result};
use crate::explicit::ExplicitInstance;
use crate::guard::ResolutionGuard;
use crate::instance::{Instance, InstanceKind, Lifecycle};
use crate::plan::build_source;
use crate::policies::Policies;
use crate::registry::PluginGraph;
use crate::source::DependencySource;
use crate::types::{PluginType, TypeRef};
use crate::value::Value;

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Carries the request-scoped state of a build: registered defaults and
/// per-request instances.
///
/// Sessions are created for a single request and are not shared between
/// threads.
pub struct BuildSession<'a> {
  graph: &'a PluginGraph,
  policies: &'a Policies,
  defaults: HashMap<TypeRef, Option<Value>>,
  per_request: HashMap<u64, Value>,
}

impl<'a> BuildSession<'a> {
  pub fn new(graph: &'a PluginGraph, policies: &'a Policies) -> Self {
    Self {
      graph,
      policies,
      defaults: HashMap::new(),
      per_request: HashMap::new(),
    }
  }

  pub fn policies(&self) -> &Policies {
    self.policies
  }

  /// Makes `value` the default for `ty` for the rest of this session. A
  /// `None` default shadows the registry: resolving `ty` then fails with
  /// `Error::NullDefault`.
  pub fn register_default(&mut self, ty: TypeRef, value: impl Into<Option<Value>>) {
    let value = value.into();
    trace!(ty = %ty, null = value.is_none(), "registered session default");
    self.defaults.insert(ty, value);
  }

  pub fn get<P: ?Sized + Any + Send + Sync>(&mut self) -> Result<Arc<P>> {
    let ty = TypeRef::plugin::<P>();
    let value = self.resolve_default(&ty)?;
    downcast_value::<P>(value)
  }

  /// Builds a fresh value of the default instance for `plugin`, bypassing
  /// every lifecycle cache.
  pub fn build_new(&mut self, plugin: PluginType) -> Result<Value> {
    let instance = self.default_instance_for(&plugin)?;
    let _guard = ResolutionGuard::enter(instance.id(), instance.name())?;
    self.build_fresh(&instance, &plugin)
  }

  /// Turns a dependency source into a value for a member declared as
  /// `target`.
  pub fn resolve(&mut self, source: &DependencySource, target: &TypeRef) -> Result<Value> {
    match source {
      DependencySource::Constant(constant) => Ok(constant.value.clone()),
      DependencySource::Default(ty) => self.resolve_default(ty),
      DependencySource::Lifecycle(lifecycle) => self.resolve_lifecycle(&lifecycle.instance, target),
      DependencySource::AllPossible(ty) => self.all_possible(ty),
      DependencySource::Problem(problem) => Err(Error::DependencyProblem(problem.clone())),
    }
  }

  /// The session default for `ty`, else the registry's default instance,
  /// else a concrete type requested by its own type.
  pub fn resolve_default(&mut self, ty: &TypeRef) -> Result<Value> {
    match self.defaults.get(ty) {
      Some(Some(value)) => return Ok(value.clone()),
      Some(None) => {
        return Err(Error::NullDefault {
          plugin_type: ty.full_name(),
        });
      }
      None => {}
    }

    let plugin = ty.as_plugin().ok_or_else(|| Error::NoDefaultInstance {
      plugin_type: ty.full_name(),
    })?;
    let instance = self.default_instance_for(&plugin)?;
    self.build_instance(&instance, &plugin)
  }

  /// Every registered implementation of the element type of `ty`, shaped as
  /// `ty`.
  pub fn all_possible(&mut self, ty: &TypeRef) -> Result<Value> {
    let collection = ty.as_collection().ok_or_else(|| Error::NoDefaultInstance {
      plugin_type: ty.full_name(),
    })?;
    let plugin = collection
      .element
      .as_plugin()
      .ok_or_else(|| Error::NoDefaultInstance {
        plugin_type: ty.full_name(),
      })?;

    let instances = self.graph.instances(&plugin);
    let mut items = Vec::with_capacity(instances.len());
    for instance in &instances {
      items.push(self.build_instance(instance, &plugin)?);
    }
    Ok(Value::sequence(
      collection.shape,
      (*collection.element).clone(),
      items,
    ))
  }

  /// Builds `instance` as `plugin`, honoring its lifecycle.
  pub fn build_instance(&mut self, instance: &Arc<Instance>, plugin: &PluginType) -> Result<Value> {
    let lifecycle = instance
      .lifecycle()
      .unwrap_or(self.policies.default_lifecycle);

    match lifecycle {
      Lifecycle::Transient => {
        let _guard = ResolutionGuard::enter(instance.id(), instance.name())?;
        self.build_fresh(instance, plugin)
      }
      Lifecycle::PerRequest => {
        if let Some(value) = self.per_request.get(&instance.id()) {
          trace!(instance = instance.name(), "per-request cache hit");
          return Ok(value.clone());
        }
        let _guard = ResolutionGuard::enter(instance.id(), instance.name())?;
        let value = self.build_fresh(instance, plugin)?;
        self.per_request.insert(instance.id(), value.clone());
        Ok(value)
      }
      Lifecycle::Singleton => {
        if let Some(value) = instance.singleton_cell().get() {
          trace!(instance = instance.name(), "singleton cache hit");
          return Ok(value.clone());
        }
        let _guard = ResolutionGuard::enter(instance.id(), instance.name())?;
        instance
          .singleton_cell()
          .get_or_try_init(|| self.build_fresh(instance, plugin))
          .cloned()
      }
    }
  }

  /// Builds a one-off instance carrying explicit arguments. Its type-keyed
  /// arguments become session defaults first.
  pub fn build_explicit(&mut self, explicit: &ExplicitInstance) -> Result<Value> {
    explicit.arguments().register_defaults(self);
    let plan = explicit.build_plan(self.policies)?;
    let object = plan.build(self)?;

    let plugin = explicit
      .plugin_type()
      .as_plugin()
      .unwrap_or_else(|| plan.concrete_type().key());
    Ok(Value::Object(plan.concrete_type().expose(object, &plugin)?))
  }

  fn build_fresh(&mut self, instance: &Arc<Instance>, plugin: &PluginType) -> Result<Value> {
    match instance.kind() {
      InstanceKind::Object(value) => Ok(value.clone()),
      InstanceKind::Configured(configuration) => {
        let concrete = configuration
          .plugged_type()
          .ok_or_else(|| Error::NoDefaultInstance {
            plugin_type: plugin.full_name().to_string(),
          })?;
        debug!(
          instance = instance.name(),
          concrete = concrete.full_name(),
          "building instance"
        );
        let plan = build_source(concrete, None, &configuration.dependencies(), self.policies)?;
        let object = plan.build(self)?;
        Ok(Value::Object(concrete.expose(object, plugin)?))
      }
    }
  }

  // An instance injected into a member that is not a plugin type is built as
  // its own concrete type.
  fn resolve_lifecycle(&mut self, instance: &Arc<Instance>, target: &TypeRef) -> Result<Value> {
    let plugin = target.as_plugin().or_else(|| {
      instance
        .configuration()
        .and_then(|c| c.plugged_type())
        .map(|c| c.key())
    });
    match (plugin, instance.kind()) {
      (Some(plugin), _) => self.build_instance(instance, &plugin),
      (None, InstanceKind::Object(value)) => Ok(value.clone()),
      (None, InstanceKind::Configured(_)) => Err(Error::NoDefaultInstance {
        plugin_type: target.full_name(),
      }),
    }
  }

  fn default_instance_for(&self, plugin: &PluginType) -> Result<Arc<Instance>> {
    if let Some(instance) = self.graph.default_instance(plugin) {
      return Ok(instance);
    }
    self
      .graph
      .concrete_type(plugin)
      .map(|concrete| {
        trace!(concrete = concrete.full_name(), "auto-plugging concrete type");
        self.graph.add(*plugin, Instance::of_type(concrete))
      })
      .ok_or_else(|| Error::NoDefaultInstance {
        plugin_type: plugin.full_name().to_string(),
      })
  }
}

/// Extracts a typed service from a resolved value.
pub(crate) fn downcast_value<P: ?Sized + Any + Send + Sync>(value: Value) -> Result<Arc<P>> {
  let plugin = PluginType::of::<P>();
  let service = match &value {
    Value::Object(service) => service.downcast::<P>(),
    _ => None,
  };
  service.ok_or_else(|| Error::NotPluggable {
    concrete_type: value.type_name(),
    plugin_type: plugin.full_name().to_string(),
  })
}
