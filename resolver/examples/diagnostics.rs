use fibre_resolver::{ConcreteType, Container, Error, Parameter, TypeRef};

#[allow(dead_code)]
struct SmtpMailer {
  host: String,
  port: i32,
  use_tls: bool,
}

struct Sealed;

fn main() {
  let container = Container::new();

  container.add_type::<SmtpMailer>(
    ConcreteType::builder::<SmtpMailer>()
      .constructor(
        vec![
          Parameter::new("host", TypeRef::string()),
          Parameter::new("port", TypeRef::int()),
          Parameter::new("useTls", TypeRef::bool()),
        ],
        |args| {
          Ok(SmtpMailer {
            host: args.get("host")?,
            port: args.get("port")?,
            use_tls: args.get("useTls")?,
          })
        },
      )
      .build(),
  );
  container.add_type::<Sealed>(
    ConcreteType::builder::<Sealed>()
      .private_constructor(vec![])
      .build(),
  );

  // Every unmet dependency is collected before anything is built.
  match container.assert_configuration_is_valid() {
    Ok(()) => println!("configuration is valid"),
    Err(Error::InvalidConfiguration(report)) => {
      print!("{}", report);
      println!("{} problem(s) found", report.problems().count());
    }
    Err(e) => println!("unexpected error: {}", e),
  }
}
