use fibre_resolver::{
  Arg, ConcreteType, ConfiguredInstance, Container, Error, ExplicitArguments, ExplicitInstance,
  Instance, Parameter, Policies, ProblemKind, TypeRef, Value,
};
use std::sync::Arc;

// --- Test Fixtures ---

trait Gateway: Send + Sync {
  fn name(&self) -> &'static str;
}

struct DefaultGateway;
impl Gateway for DefaultGateway {
  fn name(&self) -> &'static str {
    "default"
  }
}

struct StubbedGateway;
impl Gateway for StubbedGateway {
  fn name(&self) -> &'static str {
    "stubbed"
  }
}

struct Invoice {
  gateway: Arc<dyn Gateway>,
  customer: String,
  lines: i32,
}

struct Ledger {
  invoice: Arc<Invoice>,
}

fn default_gateway() -> Arc<ConcreteType> {
  ConcreteType::builder::<DefaultGateway>()
    .constructor(vec![], |_| Ok(DefaultGateway))
    .implements::<dyn Gateway, _>(|g| g as Arc<dyn Gateway>)
    .build()
}

fn invoice() -> Arc<ConcreteType> {
  ConcreteType::builder::<Invoice>()
    .constructor(
      vec![
        Parameter::new("gateway", TypeRef::plugin::<dyn Gateway>()),
        Parameter::new("customer", TypeRef::string()),
        Parameter::new("lines", TypeRef::int()),
      ],
      |args| {
        Ok(Invoice {
          gateway: args.service("gateway")?,
          customer: args.get("customer")?,
          lines: args.get("lines")?,
        })
      },
    )
    .build()
}

fn ledger() -> Arc<ConcreteType> {
  ConcreteType::builder::<Ledger>()
    .constructor(
      vec![Parameter::new("invoice", TypeRef::plugin::<Invoice>())],
      |args| {
        Ok(Ledger {
          invoice: args.service("invoice")?,
        })
      },
    )
    .build()
}

/// A container where `Invoice` is configured for customer "Acme" with 3 lines.
fn container() -> Container {
  let container = Container::new();
  container.add_type::<dyn Gateway>(default_gateway());

  let mut configuration = ConfiguredInstance::new(invoice());
  configuration
    .set_property("customer", "Acme")
    .set_property("lines", "3");
  container.add::<Invoice>(Instance::configured("acme", configuration));
  container.add_type::<Ledger>(ledger());
  container
}

// --- Tests ---

#[test]
fn test_without_overrides_the_registry_supplies_everything() {
  // Act
  let invoice = container().get_instance::<Invoice>().unwrap();

  // Assert
  assert_eq!(invoice.gateway.name(), "default");
  assert_eq!(invoice.customer, "Acme");
  assert_eq!(invoice.lines, 3);
}

#[test]
fn test_type_override_replaces_the_default_service() {
  // Arrange
  let mut args = ExplicitArguments::new();
  args.set::<dyn Gateway>(Arc::new(StubbedGateway)).unwrap();

  // Act
  let invoice = container().get_instance_with::<Invoice>(args).unwrap();

  // Assert
  assert_eq!(invoice.gateway.name(), "stubbed");
  assert_eq!(invoice.customer, "Acme");
}

#[test]
fn test_named_override_wins_over_the_default_configuration() {
  // Arrange
  let mut args = ExplicitArguments::new();
  args.set_arg("customer", "Globex").unwrap();

  // Act
  let invoice = container().get_instance_with::<Invoice>(args).unwrap();

  // Assert
  assert_eq!(invoice.customer, "Globex");
  assert_eq!(invoice.lines, 3, "unset values are filled in from the default");
}

#[test]
fn test_non_string_override_is_written_as_property_and_child() {
  // Arrange
  let mut args = ExplicitArguments::new();
  args.set_arg("lines", 12).unwrap();

  // Act
  let explicit = ExplicitInstance::new(TypeRef::plugin::<Invoice>(), args, None, Some(invoice()));

  // Assert
  let configuration = explicit.configuration();
  assert_eq!(configuration.property("lines"), Some("12"));
  assert_eq!(configuration.child_value("lines"), Some(&Value::Int(12)));
  assert!(configuration.plugged_type().is_some());
}

#[test]
fn test_numeric_override_reaches_a_string_parameter_as_text() {
  // Arrange
  let mut args = ExplicitArguments::new();
  args.set_arg("customer", 42).unwrap();
  args.set_arg("lines", 12).unwrap();

  // Act
  let invoice = container().get_instance_with::<Invoice>(args).unwrap();

  // Assert
  assert_eq!(invoice.customer, "42");
  assert_eq!(invoice.lines, 12);
}

#[test]
fn test_type_override_beats_a_named_override_for_the_same_member() {
  // Arrange
  let mut args = ExplicitArguments::new();
  args.set::<dyn Gateway>(Arc::new(StubbedGateway)).unwrap();
  args
    .set_arg(
      "gateway",
      Value::service::<dyn Gateway>(Arc::new(DefaultGateway)),
    )
    .unwrap();

  // Act
  let invoice = container().get_instance_with::<Invoice>(args).unwrap();

  // Assert
  assert_eq!(invoice.gateway.name(), "stubbed");
}

#[test]
fn test_null_override_shadows_the_configured_property() {
  // Arrange
  let mut args = ExplicitArguments::new();
  args.set_arg_null("customer").unwrap();

  // Act
  let err = container().get_instance_with::<Invoice>(args).err().unwrap();

  // Assert
  let Error::InvalidConfiguration(report) = err else {
    panic!("expected an invalid configuration");
  };
  let problems: Vec<(&str, ProblemKind)> = report
    .problems()
    .map(|p| (p.name.as_str(), p.kind.clone()))
    .collect();
  assert_eq!(
    problems,
    vec![("customer", ProblemKind::MissingPrimitiveDependency)]
  );
}

#[test]
fn test_null_type_override_shadows_the_registry_default() {
  // Arrange
  let container = container();
  let mut args = ExplicitArguments::new();
  args.set_type(TypeRef::plugin::<dyn Gateway>(), None).unwrap();

  // Act
  let err = container.get_instance_with::<Ledger>(args).err().unwrap();

  // Assert
  assert!(matches!(err, Error::NullDefault { .. }));
  let later = container.get_instance::<Ledger>().unwrap();
  assert_eq!(later.invoice.gateway.name(), "default");
}

#[test]
fn test_type_override_reaches_nested_dependencies() {
  // Arrange
  let mut args = ExplicitArguments::new();
  args.set::<dyn Gateway>(Arc::new(StubbedGateway)).unwrap();

  // Act
  let ledger = container().get_instance_with::<Ledger>(args).unwrap();

  // Assert
  assert_eq!(ledger.invoice.gateway.name(), "stubbed");
  assert_eq!(ledger.invoice.customer, "Acme");
}

#[test]
fn test_overrides_do_not_leak_into_later_requests() {
  // Arrange
  let container = container();
  let mut args = ExplicitArguments::new();
  args.set::<dyn Gateway>(Arc::new(StubbedGateway)).unwrap();

  // Act
  let _ = container.get_instance_with::<Ledger>(args).unwrap();
  let later = container.get_instance::<Ledger>().unwrap();

  // Assert
  assert_eq!(later.invoice.gateway.name(), "default");
}

#[test]
fn test_unconfigured_concrete_type_is_targeted_directly() {
  // Arrange
  let container = Container::new();
  container.graph().add_type(invoice());
  let mut args = ExplicitArguments::new();
  args.set::<dyn Gateway>(Arc::new(StubbedGateway)).unwrap();
  args.set_arg("customer", "Initech").unwrap();
  args.set_arg("lines", "1").unwrap();

  // Act
  let invoice = container.get_instance_with::<Invoice>(args).unwrap();

  // Assert
  assert_eq!(invoice.customer, "Initech");
  assert_eq!(invoice.lines, 1);
}

#[test]
fn test_nothing_to_build_is_an_error() {
  let container = Container::new();
  let err = container
    .get_instance_with::<Invoice>(ExplicitArguments::new())
    .err().unwrap();
  assert!(matches!(err, Error::NoDefaultInstance { .. }));
}

#[test]
fn test_missing_primitive_override_is_reported_not_built() {
  // Arrange
  let container = Container::new();
  container.graph().add_type(invoice());
  let mut args = ExplicitArguments::new();
  args.set_arg("customer", "Initech").unwrap();

  // Act
  let err = container.get_instance_with::<Invoice>(args).err().unwrap();

  // Assert
  let Error::InvalidConfiguration(report) = err else {
    panic!("expected an invalid configuration");
  };
  let names: Vec<&str> = report.problems().map(|p| p.name.as_str()).collect();
  assert_eq!(names, vec!["lines"]);
}

#[test]
fn test_explicit_plan_reports_override_casting_errors() {
  // Arrange
  let mut args = ExplicitArguments::new();
  args.set_arg("lines", "many").unwrap();
  args.set_arg("customer", "Acme").unwrap();
  let explicit = ExplicitInstance::new(TypeRef::plugin::<Invoice>(), args, None, Some(invoice()));

  // Act
  let plan = explicit.build_plan(&Policies::default()).unwrap();

  // Assert
  assert!(!plan.is_valid());
  let problem = plan.problems().next().expect("one problem");
  assert_eq!(
    problem.message,
    "Could not convert value 'many' of type string to type i32"
  );
}

#[test]
fn test_argument_bag_distinguishes_null_from_absent() {
  // Arrange
  let mut args = ExplicitArguments::new();
  args.set_arg_null("customer").unwrap();
  args.set_type(TypeRef::plugin::<dyn Gateway>(), None).unwrap();

  // Assert
  assert!(args.has_arg("customer"));
  assert_eq!(args.get_arg("customer"), Arg::Null);
  assert!(!args.has_arg("lines"));
  assert_eq!(args.get_arg("lines"), Arg::Absent);
  assert!(args.has::<dyn Gateway>());
  assert!(args.get::<dyn Gateway>().is_none());
  assert!(matches!(
    args.set_arg("customer", "again"),
    Err(Error::DuplicateExplicitArg { .. })
  ));
}
