use fibre_resolver::{
  global, ConcreteType, ConfiguredInstance, ExplicitArguments, Instance, Parameter, TypeRef,
};
use std::sync::Arc;

trait PaymentGateway: Send + Sync {
  fn charge(&self, amount: i64) -> String;
}

struct LiveGateway;
impl PaymentGateway for LiveGateway {
  fn charge(&self, amount: i64) -> String {
    format!("charged {} through the live gateway", amount)
  }
}

struct StubGateway;
impl PaymentGateway for StubGateway {
  fn charge(&self, amount: i64) -> String {
    format!("pretended to charge {}", amount)
  }
}

struct Checkout {
  gateway: Arc<dyn PaymentGateway>,
  currency: String,
}

fn main() {
  global().add_singleton::<dyn PaymentGateway>(
    ConcreteType::builder::<LiveGateway>()
      .constructor(vec![], |_| Ok(LiveGateway))
      .implements::<dyn PaymentGateway, _>(|g| g as Arc<dyn PaymentGateway>)
      .build(),
  );

  let checkout = ConcreteType::builder::<Checkout>()
    .constructor(
      vec![
        Parameter::new("gateway", TypeRef::plugin::<dyn PaymentGateway>()),
        Parameter::new("currency", TypeRef::string()),
      ],
      |args| {
        Ok(Checkout {
          gateway: args.service("gateway")?,
          currency: args.get("currency")?,
        })
      },
    )
    .build();
  let mut configuration = ConfiguredInstance::new(checkout);
  configuration.set_property("currency", "EUR");
  global().add::<Checkout>(Instance::configured("checkout", configuration));

  // --- Registry defaults ---
  let live = global().get_instance::<Checkout>().unwrap();
  println!("[{}] {}", live.currency, live.gateway.charge(100));

  // --- Per-request overrides ---
  let mut args = ExplicitArguments::new();
  args.set::<dyn PaymentGateway>(Arc::new(StubGateway)).unwrap();
  args.set_arg("currency", "USD").unwrap();

  let stubbed = global().get_instance_with::<Checkout>(args).unwrap();
  println!("[{}] {}", stubbed.currency, stubbed.gateway.charge(100));
  assert_eq!(stubbed.currency, "USD");

  // The override was scoped to that one request.
  let again = global().get_instance::<Checkout>().unwrap();
  assert_eq!(again.currency, "EUR");
}
