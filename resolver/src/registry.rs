//! The plugin graph: which instances are registered for which plugin types.

use crate::concrete::ConcreteType;
use crate::error::{Error, Result};
use crate::instance::Instance;
use crate::types::PluginType;

use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Default)]
struct PluginFamily {
  instances: Vec<Arc<Instance>>,
  default: Option<usize>,
}

impl PluginFamily {
  fn default_instance(&self) -> Option<&Arc<Instance>> {
    match self.default {
      Some(index) => self.instances.get(index),
      None => self.instances.first(),
    }
  }
}

/// Registrations, keyed by plugin type. Safe to share across threads.
///
/// Instances keep their registration order, which is also the order in which
/// "all implementations" are handed out.
#[derive(Default)]
pub struct PluginGraph {
  families: DashMap<PluginType, PluginFamily>,
  concrete_types: DashMap<PluginType, Arc<ConcreteType>>,
}

impl PluginGraph {
  pub fn new() -> Self {
    Self::default()
  }

  /// Makes `concrete` buildable when it is requested by its own type.
  pub fn add_type(&self, concrete: Arc<ConcreteType>) {
    self.concrete_types.insert(concrete.key(), concrete);
  }

  /// Registers `instance` for `plugin`. The first instance of a family is its
  /// default until [`PluginGraph::set_default`] says otherwise.
  pub fn add(&self, plugin: PluginType, instance: Instance) -> Arc<Instance> {
    if let Some(concrete) = instance.configuration().and_then(|c| c.plugged_type()) {
      self.add_type(Arc::clone(concrete));
    }
    let instance = Arc::new(instance);
    debug!(
      plugin = plugin.full_name(),
      instance = instance.name(),
      "registered instance"
    );
    self
      .families
      .entry(plugin)
      .or_default()
      .instances
      .push(Arc::clone(&instance));
    instance
  }

  pub fn set_default(&self, plugin: PluginType, name: &str) -> Result<()> {
    let mut family = self
      .families
      .get_mut(&plugin)
      .ok_or_else(|| not_found(&plugin, name))?;
    let index = family
      .instances
      .iter()
      .position(|i| i.name() == name)
      .ok_or_else(|| not_found(&plugin, name))?;
    family.default = Some(index);
    Ok(())
  }

  pub fn default_instance(&self, plugin: &PluginType) -> Option<Arc<Instance>> {
    self
      .families
      .get(plugin)
      .and_then(|f| f.default_instance().cloned())
  }

  pub fn find(&self, plugin: &PluginType, name: &str) -> Option<Arc<Instance>> {
    self
      .families
      .get(plugin)
      .and_then(|f| f.instances.iter().find(|i| i.name() == name).cloned())
  }

  /// Every instance registered for `plugin`, in registration order.
  pub fn instances(&self, plugin: &PluginType) -> Vec<Arc<Instance>> {
    self
      .families
      .get(plugin)
      .map(|f| f.instances.clone())
      .unwrap_or_default()
  }

  pub fn concrete_type(&self, key: &PluginType) -> Option<Arc<ConcreteType>> {
    self.concrete_types.get(key).map(|c| Arc::clone(c.value()))
  }

  pub fn plugin_types(&self) -> Vec<PluginType> {
    self.families.iter().map(|entry| *entry.key()).collect()
  }
}

fn not_found(plugin: &PluginType, name: &str) -> Error {
  Error::NamedInstanceNotFound {
    plugin_type: plugin.full_name().to_string(),
    name: name.to_string(),
  }
}
