//! Conversion of supplied values into the exact type a member requires.

use crate::types::{CollectionShape, SimpleType, TypeRef};
use crate::value::{Sequence, Value};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
  /// Text could not be parsed into the requested primitive or enum.
  #[error("could not convert '{value}' of type {from} to {to}")]
  Casting {
    value: String,
    from: String,
    to: String,
  },

  /// The value is of an unrelated type and no conversion applies.
  #[error("a value of type {from} cannot be used as {to}")]
  Mismatch { from: String, to: String },
}

/// Converts `value` into `target`.
///
/// Assignable values are returned as is. Text is parsed into primitives and
/// enums. Sequences are rebuilt in the target's exact shape, keeping element
/// order. Nothing else is attempted.
pub fn coerce(value: Value, target: &TypeRef) -> Result<Value, ConversionError> {
  if value.is_assignable_to(target) {
    return Ok(value);
  }

  match (value, target) {
    (Value::Str(text), TypeRef::Simple(simple)) => parse_simple(&text, *simple, target),
    (Value::Str(text), TypeRef::Enum(ty)) => match ty.member(&text) {
      Some(member) => Ok(Value::enumeration(*ty, member)),
      None => Err(casting_error(&text, target)),
    },
    (Value::Seq(seq), TypeRef::Collection(collection)) if seq.element == *collection.element => {
      Ok(Value::Seq(seq.reshape(collection.shape)))
    }
    (Value::Seq(seq), TypeRef::Collection(collection)) => {
      reshape_items(seq, collection.shape, &collection.element, target)
    }
    (other, _) => Err(ConversionError::Mismatch {
      from: other.type_name(),
      to: target.full_name(),
    }),
  }
}

fn parse_simple(text: &str, simple: SimpleType, target: &TypeRef) -> Result<Value, ConversionError> {
  let parsed = match simple {
    SimpleType::String => Some(Value::Str(text.to_string())),
    SimpleType::Int => text.trim().parse().ok().map(Value::Int),
    SimpleType::Long => text.trim().parse().ok().map(Value::Long),
    SimpleType::Float => text.trim().parse().ok().map(Value::Float),
    SimpleType::Bool => parse_bool(text.trim()).map(Value::Bool),
  };
  parsed.ok_or_else(|| casting_error(text, target))
}

fn parse_bool(text: &str) -> Option<bool> {
  if text.eq_ignore_ascii_case("true") {
    Some(true)
  } else if text.eq_ignore_ascii_case("false") {
    Some(false)
  } else {
    None
  }
}

// A sequence declared with a different element type is still usable when every
// item fits the target element, e.g. a `List<T>` built from values of `T`.
fn reshape_items(
  seq: Sequence,
  shape: CollectionShape,
  element: &TypeRef,
  target: &TypeRef,
) -> Result<Value, ConversionError> {
  if !seq.items.iter().all(|item| item.is_assignable_to(element)) {
    return Err(ConversionError::Mismatch {
      from: seq.type_ref().full_name(),
      to: target.full_name(),
    });
  }
  Ok(Value::sequence(shape, element.clone(), seq.items))
}

fn casting_error(text: &str, target: &TypeRef) -> ConversionError {
  ConversionError::Casting {
    value: text.to_string(),
    from: SimpleType::String.full_name().to_string(),
    to: target.full_name(),
  }
}
