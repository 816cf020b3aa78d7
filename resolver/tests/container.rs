use fibre_resolver::{
  global, resolve, ConcreteType, ConfiguredInstance, Container, DependencySource, Error, Instance,
  Lifecycle, Parameter, PluginType, Policies, TypeRef, Value,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// --- Test Fixtures ---

trait Rule: Send + Sync {
  fn name(&self) -> String;
}

struct ColorRule {
  color: String,
}
impl Rule for ColorRule {
  fn name(&self) -> String {
    format!("color:{}", self.color)
  }
}

struct LengthRule;
impl Rule for LengthRule {
  fn name(&self) -> String {
    "length".to_string()
  }
}

fn color_rule() -> Arc<ConcreteType> {
  ConcreteType::builder::<ColorRule>()
    .constructor(vec![Parameter::new("color", TypeRef::string())], |args| {
      Ok(ColorRule {
        color: args.get("color")?,
      })
    })
    .implements::<dyn Rule, _>(|r| r as Arc<dyn Rule>)
    .build()
}

fn colored(name: &str, color: &str) -> Instance {
  let mut configuration = ConfiguredInstance::new(color_rule());
  configuration.set_property("color", color);
  Instance::configured(name, configuration)
}

struct Inspector {
  rules: Vec<Arc<dyn Rule>>,
}

fn inspector(ty: TypeRef) -> Arc<ConcreteType> {
  ConcreteType::builder::<Inspector>()
    .constructor(vec![Parameter::new("rules", ty)], |args| {
      Ok(Inspector {
        rules: args.services("rules")?,
      })
    })
    .build()
}

struct Counted;

fn counted(counter: Arc<AtomicUsize>) -> Arc<ConcreteType> {
  ConcreteType::builder::<Counted>()
    .constructor(vec![], move |_| {
      counter.fetch_add(1, Ordering::SeqCst);
      Ok(Counted)
    })
    .build()
}

struct Pair {
  left: Arc<Counted>,
  right: Arc<Counted>,
}

fn pair() -> Arc<ConcreteType> {
  ConcreteType::builder::<Pair>()
    .constructor(
      vec![
        Parameter::new("left", TypeRef::plugin::<Counted>()),
        Parameter::new("right", TypeRef::plugin::<Counted>()),
      ],
      |args| {
        Ok(Pair {
          left: args.service("left")?,
          right: args.service("right")?,
        })
      },
    )
    .build()
}

fn counted_container(lifecycle: Lifecycle) -> (Container, Arc<AtomicUsize>) {
  let counter = Arc::new(AtomicUsize::new(0));
  let container = Container::new();
  container.add::<Counted>(Instance::of_type(counted(counter.clone())).with_lifecycle(lifecycle));
  container.add_type::<Pair>(pair());
  (container, counter)
}

#[derive(Debug)]
struct Chicken;
struct Egg;

fn chicken() -> Arc<ConcreteType> {
  ConcreteType::builder::<Chicken>()
    .constructor(vec![Parameter::new("egg", TypeRef::plugin::<Egg>())], |args| {
      args.service::<Egg>("egg")?;
      Ok(Chicken)
    })
    .build()
}

fn egg() -> Arc<ConcreteType> {
  ConcreteType::builder::<Egg>()
    .constructor(vec![Parameter::new("chicken", TypeRef::plugin::<Chicken>())], |args| {
      args.service::<Chicken>("chicken")?;
      Ok(Egg)
    })
    .build()
}

// --- Lifecycles ---

#[test]
fn test_transient_builds_every_time() {
  // Arrange
  let (container, counter) = counted_container(Lifecycle::Transient);

  // Act
  let pair = container.get_instance::<Pair>().unwrap();
  let _ = container.get_instance::<Pair>().unwrap();

  // Assert
  assert_eq!(counter.load(Ordering::SeqCst), 4);
  assert!(!Arc::ptr_eq(&pair.left, &pair.right));
}

#[test]
fn test_per_request_is_shared_within_one_request() {
  // Arrange
  let (container, counter) = counted_container(Lifecycle::PerRequest);

  // Act
  let first = container.get_instance::<Pair>().unwrap();
  let second = container.get_instance::<Pair>().unwrap();

  // Assert
  assert_eq!(counter.load(Ordering::SeqCst), 2);
  assert!(Arc::ptr_eq(&first.left, &first.right));
  assert!(!Arc::ptr_eq(&first.left, &second.left));
}

#[test]
fn test_singleton_is_built_once() {
  // Arrange
  let (container, counter) = counted_container(Lifecycle::Singleton);

  // Act
  let first = container.get_instance::<Pair>().unwrap();
  let second = container.get_instance::<Pair>().unwrap();
  let direct = container.get_instance::<Counted>().unwrap();

  // Assert
  assert_eq!(counter.load(Ordering::SeqCst), 1);
  assert!(Arc::ptr_eq(&first.left, &second.right));
  assert!(Arc::ptr_eq(&first.left, &direct));
}

#[test]
fn test_build_new_bypasses_the_singleton_cache() {
  // Arrange
  let (container, counter) = counted_container(Lifecycle::Singleton);
  let cached = container.get_instance::<Counted>().unwrap();

  // Act
  let mut session = container.session();
  let fresh = session.build_new(PluginType::of::<Counted>()).unwrap();
  let from_session = session.get::<Counted>().unwrap();

  // Assert
  assert_eq!(counter.load(Ordering::SeqCst), 2);
  assert!(Arc::ptr_eq(&cached, &from_session));
  assert_ne!(fresh, Value::service(cached));
}

#[test]
fn test_policy_supplies_the_default_lifecycle() {
  // Arrange
  let counter = Arc::new(AtomicUsize::new(0));
  let container = Container::with_policies(Policies {
    default_lifecycle: Lifecycle::Singleton,
    ..Policies::default()
  });
  container.add_type::<Counted>(counted(counter.clone()));

  // Act
  let first = container.get_instance::<Counted>().unwrap();
  let second = container.get_instance::<Counted>().unwrap();

  // Assert
  assert!(Arc::ptr_eq(&first, &second));
  assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_add_transient_overrides_the_policy() {
  let counter = Arc::new(AtomicUsize::new(0));
  let container = Container::with_policies(Policies {
    default_lifecycle: Lifecycle::Singleton,
    ..Policies::default()
  });
  container.add_transient::<Counted>(counted(counter.clone()));

  let _ = container.get_instance::<Counted>().unwrap();
  let _ = container.get_instance::<Counted>().unwrap();

  assert_eq!(counter.load(Ordering::SeqCst), 2);
}

// --- All possible implementations ---

#[test]
fn test_collections_receive_every_rule_in_registration_order() {
  for ty in [
    TypeRef::array_of(TypeRef::plugin::<dyn Rule>()),
    TypeRef::list_of(TypeRef::plugin::<dyn Rule>()),
    TypeRef::ilist_of(TypeRef::plugin::<dyn Rule>()),
    TypeRef::enumerable_of(TypeRef::plugin::<dyn Rule>()),
  ] {
    // Arrange
    let container = Container::new();
    container.add::<dyn Rule>(colored("red", "Red"));
    container.add_instance::<dyn Rule>(Arc::new(LengthRule));
    container.add::<dyn Rule>(colored("blue", "Blue"));
    container.add_type::<Inspector>(inspector(ty));

    // Act
    let inspector = container.get_instance::<Inspector>().unwrap();

    // Assert
    let names: Vec<String> = inspector.rules.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["color:Red", "length", "color:Blue"]);
  }
}

#[test]
fn test_empty_family_yields_an_empty_collection() {
  let container = Container::new();
  container.add_type::<Inspector>(inspector(TypeRef::array_of(TypeRef::plugin::<dyn Rule>())));

  let inspector = container.get_instance::<Inspector>().unwrap();

  assert!(inspector.rules.is_empty());
  assert!(container.get_all_instances::<dyn Rule>().unwrap().is_empty());
}

#[test]
fn test_get_all_instances_keeps_registration_order() {
  let container = Container::new();
  container.add::<dyn Rule>(colored("green", "Green"));
  container.add::<dyn Rule>(colored("gray", "Gray"));

  let names: Vec<String> = container
    .get_all_instances::<dyn Rule>()
    .unwrap()
    .iter()
    .map(|r| r.name())
    .collect();

  assert_eq!(names, vec!["color:Green", "color:Gray"]);
}

// --- Named instances and defaults ---

#[test]
fn test_named_instances_and_default_selection() {
  // Arrange
  let container = Container::new();
  container.add::<dyn Rule>(colored("red", "Red"));
  container.add::<dyn Rule>(colored("blue", "Blue"));

  // Act & Assert
  assert_eq!(container.get_instance::<dyn Rule>().unwrap().name(), "color:Red");
  assert_eq!(
    container.get_named_instance::<dyn Rule>("blue").unwrap().name(),
    "color:Blue"
  );

  container.set_default::<dyn Rule>("blue").unwrap();
  assert_eq!(container.get_instance::<dyn Rule>().unwrap().name(), "color:Blue");
}

#[test]
fn test_unknown_names_are_errors() {
  let container = Container::new();
  container.add::<dyn Rule>(colored("red", "Red"));

  assert!(matches!(
    container.get_named_instance::<dyn Rule>("purple"),
    Err(Error::NamedInstanceNotFound { .. })
  ));
  assert!(matches!(
    container.set_default::<dyn Rule>("purple"),
    Err(Error::NamedInstanceNotFound { .. })
  ));
  assert!(container.get::<dyn Rule>(Some("purple")).is_none());
  assert!(container.get::<dyn Rule>(None).is_some());
}

#[test]
fn test_instance_child_injects_a_specific_instance() {
  // Arrange
  let container = Container::new();
  container.add::<dyn Rule>(colored("red", "Red"));
  let blue = container.add::<dyn Rule>(colored("blue", "Blue"));

  struct Holder {
    rule: Arc<dyn Rule>,
  }
  let holder = ConcreteType::builder::<Holder>()
    .constructor(vec![Parameter::new("rule", TypeRef::plugin::<dyn Rule>())], |args| {
      Ok(Holder {
        rule: args.service("rule")?,
      })
    })
    .build();
  let mut configuration = ConfiguredInstance::new(holder);
  configuration.child("rule").is(blue);
  container.add::<Holder>(Instance::configured("holder", configuration));

  // Act
  let plan = container.build_plan_for::<Holder>().unwrap();
  let built = container.get_instance::<Holder>().unwrap();

  // Assert
  assert!(matches!(
    plan.constructor().arguments()[0].source,
    DependencySource::Lifecycle(_)
  ));
  assert_eq!(built.rule.name(), "color:Blue");
}

// --- Failures ---

#[test]
fn test_circular_dependency_is_detected() {
  // Arrange
  let container = Container::new();
  container.add_type::<Chicken>(chicken());
  container.add_type::<Egg>(egg());

  // Act
  let err = container.get_instance::<Chicken>().unwrap_err();

  // Assert
  assert!(matches!(err, Error::CircularDependency { .. }));
  // The guard is released, so unrelated resolutions still work.
  container.add_instance::<dyn Rule>(Arc::new(LengthRule));
  assert!(container.get_instance::<dyn Rule>().is_ok());
}

#[test]
fn test_unregistered_plugin_has_no_default() {
  let err = Container::new().get_instance::<dyn Rule>().err().unwrap();
  assert!(matches!(err, Error::NoDefaultInstance { .. }));
}

#[test]
fn test_configuration_validation_reports_every_problem() {
  // Arrange
  struct Sealed;
  let container = Container::new();
  container.add::<dyn Rule>(colored("red", "Red"));
  container.add::<dyn Rule>(Instance::of_type(color_rule()));
  container.add_type::<Sealed>(
    ConcreteType::builder::<Sealed>()
      .private_constructor(vec![])
      .build(),
  );

  // Act
  let err = container.assert_configuration_is_valid().unwrap_err();

  // Assert
  let Error::InvalidConfiguration(report) = err else {
    panic!("expected an invalid configuration");
  };
  assert_eq!(report.entries().len(), 2);
  assert_eq!(report.problems().count(), 1);
  let rendered = report.to_string();
  assert!(rendered.starts_with("Configuration is invalid:"));
  assert!(rendered.contains(
    "Constructor Argument 'color' (string): Required primitive dependency is not explicitly defined"
  ));
  assert!(rendered.contains("No public constructor could be selected"));
}

#[test]
fn test_valid_configuration_passes() {
  let container = Container::new();
  container.add::<dyn Rule>(colored("red", "Red"));
  container.add_instance::<dyn Rule>(Arc::new(LengthRule));

  assert!(container.assert_configuration_is_valid().is_ok());
}

// --- Global container ---

#[test]
fn test_resolve_macro_uses_the_global_container() {
  // Arrange
  trait Clock: Send + Sync {
    fn zone(&self) -> String;
  }
  struct FixedClock;
  impl Clock for FixedClock {
    fn zone(&self) -> String {
      "UTC".to_string()
    }
  }
  global().add_instance_with_name::<dyn Clock>("utc", Arc::new(FixedClock));

  // Act
  let by_trait = resolve!(trait Clock);
  let by_name = resolve!(trait Clock, "utc");

  // Assert
  assert_eq!(by_trait.zone(), "UTC");
  assert_eq!(by_name.zone(), "UTC");
}

#[test]
#[should_panic(expected = "Failed to resolve required service")]
fn test_resolve_macro_panics_when_missing() {
  struct NeverRegistered;
  let _ = resolve!(NeverRegistered);
}
