//! Circular dependency detection for instance builds.

use crate::error::{Error, Result};

use std::cell::RefCell;
use std::collections::HashSet;

thread_local! {
  // Instances currently being built on this thread. A build session never
  // leaves its thread, so this is the whole resolution chain.
  static RESOLVING: RefCell<HashSet<u64>> = RefCell::new(HashSet::new());
}

/// An RAII guard marking an instance as under construction.
///
/// Entering an instance that is already being built fails with
/// [`Error::CircularDependency`]. Dropping the guard removes the mark.
pub(crate) struct ResolutionGuard {
  id: u64,
}

impl ResolutionGuard {
  pub(crate) fn enter(id: u64, name: &str) -> Result<Self> {
    let fresh = RESOLVING.with(|resolving| resolving.borrow_mut().insert(id));
    if !fresh {
      return Err(Error::CircularDependency {
        instance: name.to_string(),
      });
    }
    Ok(Self { id })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING.with(|resolving| {
      resolving.borrow_mut().remove(&self.id);
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reentry_is_rejected_until_dropped() {
    let guard = ResolutionGuard::enter(9_001, "outer").unwrap();
    assert!(matches!(
      ResolutionGuard::enter(9_001, "outer"),
      Err(Error::CircularDependency { .. })
    ));
    drop(guard);
    assert!(ResolutionGuard::enter(9_001, "outer").is_ok());
  }
}
