//! Constructor selection and build plans.

use crate::concrete::{Arguments, ConcreteType, Factory, SetterFn};
use crate::dependencies::DependencyCollection;
use crate::error::{Error, Result};
use crate::explicit::ExplicitArguments;
use crate::policies::Policies;
use crate::report::ConfigurationReport;
use crate::session::BuildSession;
use crate::source::{source_for, DependencyProblem, DependencySource, MemberKind};
use crate::types::TypeRef;
use crate::value::Value;

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// One resolved constructor argument or setter value.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
  pub name: String,
  pub returned_type: TypeRef,
  pub source: DependencySource,
}

/// The chosen constructor together with a source for each of its parameters.
#[derive(Clone)]
pub struct ConstructorStep {
  arguments: Vec<Argument>,
  factory: Factory,
}

impl ConstructorStep {
  pub fn arguments(&self) -> &[Argument] {
    &self.arguments
  }

  pub fn is_valid(&self) -> bool {
    !self.arguments.iter().any(|a| a.source.is_problem())
  }
}

impl fmt::Debug for ConstructorStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ConstructorStep")
      .field("arguments", &self.arguments)
      .finish_non_exhaustive()
  }
}

#[derive(Clone)]
pub struct SetterStep {
  argument: Argument,
  apply: SetterFn,
}

impl SetterStep {
  pub fn argument(&self) -> &Argument {
    &self.argument
  }
}

impl fmt::Debug for SetterStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SetterStep")
      .field("argument", &self.argument)
      .finish_non_exhaustive()
  }
}

/// Everything needed to build one instance of a concrete type.
#[derive(Debug, Clone)]
pub struct BuildPlan {
  concrete: Arc<ConcreteType>,
  constructor: ConstructorStep,
  setters: Vec<SetterStep>,
}

impl BuildPlan {
  pub fn concrete_type(&self) -> &Arc<ConcreteType> {
    &self.concrete
  }

  pub fn constructor(&self) -> &ConstructorStep {
    &self.constructor
  }

  pub fn setters(&self) -> impl Iterator<Item = &Argument> {
    self.setters.iter().map(SetterStep::argument)
  }

  /// True when no constructor argument and no setter is a problem.
  pub fn is_valid(&self) -> bool {
    self.problems().next().is_none()
  }

  pub fn problems(&self) -> impl Iterator<Item = &DependencyProblem> {
    self
      .constructor
      .arguments
      .iter()
      .chain(self.setters.iter().map(SetterStep::argument))
      .filter_map(|a| a.source.as_problem())
  }

  /// Materializes every source through `session` and runs the constructor,
  /// then the setters.
  pub fn build(&self, session: &mut BuildSession<'_>) -> Result<Box<dyn Any + Send + Sync>> {
    if !self.is_valid() {
      let mut report = ConfigurationReport::default();
      report.add_problems(
        self.concrete.full_name(),
        self.concrete.full_name(),
        self.problems().cloned().collect(),
      );
      return Err(Error::InvalidConfiguration(report));
    }

    let mut values = Vec::with_capacity(self.constructor.arguments.len());
    for argument in &self.constructor.arguments {
      let value = session.resolve(&argument.source, &argument.returned_type)?;
      values.push((argument.name.clone(), value));
    }
    let arguments = Arguments::new(self.concrete.full_name(), values);
    let mut object = (self.constructor.factory)(&arguments)?;

    for setter in &self.setters {
      let argument = &setter.argument;
      let value: Value = session.resolve(&argument.source, &argument.returned_type)?;
      (setter.apply)(object.as_mut(), &value)?;
    }

    trace!(concrete = self.concrete.full_name(), "built object");
    Ok(object)
  }
}

fn supplied_value(
  explicit: Option<&ExplicitArguments>,
  dependencies: &DependencyCollection,
  name: &str,
  ty: &TypeRef,
) -> Option<Value> {
  explicit
    .and_then(|args| args.lookup(name, ty))
    .or_else(|| dependencies.find(name, ty))
    .flatten()
}

/// Picks the constructor for `concrete`.
///
/// Public constructors are tried greediest first and the first one whose
/// parameters all resolve wins. When none resolves completely the greediest
/// one is returned with its problems, so the caller can report every missing
/// dependency. Having no public constructor at all is an error.
pub fn build_constructor_step(
  concrete: &Arc<ConcreteType>,
  explicit: Option<&ExplicitArguments>,
  dependencies: &DependencyCollection,
  _policies: &Policies,
) -> Result<ConstructorStep> {
  let mut greediest = None;

  for ctor in concrete.constructors() {
    let Some(factory) = ctor.factory() else {
      continue;
    };
    let arguments: Vec<Argument> = ctor
      .parameters()
      .iter()
      .map(|p| Argument {
        name: p.name.clone(),
        returned_type: p.ty.clone(),
        source: source_for(
          MemberKind::ConstructorArgument,
          &p.name,
          &p.ty,
          supplied_value(explicit, dependencies, &p.name, &p.ty),
        ),
      })
      .collect();

    let step = ConstructorStep {
      arguments,
      factory: Arc::clone(factory),
    };
    if step.is_valid() {
      debug!(
        concrete = concrete.full_name(),
        parameters = step.arguments.len(),
        "selected constructor"
      );
      return Ok(step);
    }
    greediest.get_or_insert(step);
  }

  match greediest {
    Some(step) => {
      debug!(
        concrete = concrete.full_name(),
        "no constructor fully resolves, keeping the greediest"
      );
      Ok(step)
    }
    None => Err(Error::NoSuitableConstructor {
      concrete_type: concrete.full_name().to_string(),
    }),
  }
}

/// Builds the complete plan for `concrete`: constructor plus setters.
///
/// Injectable setters, whether flagged on the type or by `policies`, are
/// always resolved. Other setters are resolved only when a non-null value is
/// supplied.
pub fn build_source(
  concrete: &Arc<ConcreteType>,
  explicit: Option<&ExplicitArguments>,
  dependencies: &DependencyCollection,
  policies: &Policies,
) -> Result<BuildPlan> {
  let constructor = build_constructor_step(concrete, explicit, dependencies, policies)?;

  let setters = concrete
    .setters()
    .iter()
    .filter(|s| {
      s.is_injectable()
        || policies.setters.matches(s.name(), s.ty())
        || supplied_value(explicit, dependencies, s.name(), s.ty()).is_some()
    })
    .map(|s| SetterStep {
      argument: Argument {
        name: s.name().to_string(),
        returned_type: s.ty().clone(),
        source: source_for(
          MemberKind::SetterProperty,
          s.name(),
          s.ty(),
          supplied_value(explicit, dependencies, s.name(), s.ty()),
        ),
      },
      apply: Arc::clone(s.apply()),
    })
    .collect();

  let plan = BuildPlan {
    concrete: Arc::clone(concrete),
    constructor,
    setters,
  };
  if !plan.is_valid() {
    debug!(
      concrete = concrete.full_name(),
      problems = plan.problems().count(),
      "build plan has unresolved dependencies"
    );
  }
  Ok(plan)
}
