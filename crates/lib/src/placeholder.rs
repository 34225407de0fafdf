//! Template parsing and expansion for package commands.
//!
//! Package descriptors write shell commands against values that only the
//! host knows at execution time (where the package stages its install,
//! where a patch file ended up after fetching). Those values are referenced
//! through `%{...}` expressions and expanded right before the command runs.
//!
//! # Expression Formats
//!
//! - `%{name}` - a named variable such as `staged_prefix` or `jobs`
//! - `%{name[N]}` - element N of a list variable such as `local_sources`
//!
//! # Escaping
//!
//! `%%{` produces a literal `%{`. Any other `%` passes through unchanged,
//! so `printf '%s'` and `date +%Y` need no escaping.
//!
//! # Example
//!
//! ```
//! use sdkpack_lib::placeholder::{parse, Segment, Placeholder};
//!
//! let segments = parse("patch -p1 < \"%{local_sources[1]}\"").unwrap();
//! assert_eq!(segments, vec![
//!     Segment::Literal("patch -p1 < \"".to_string()),
//!     Segment::Placeholder(Placeholder::Indexed { name: "local_sources".to_string(), index: 1 }),
//!     Segment::Literal("\"".to_string()),
//! ]);
//! ```

use std::borrow::Cow;

use thiserror::Error;

/// A parsed template expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
  /// `%{name}`
  Var(String),

  /// `%{name[N]}`
  Indexed { name: String, index: usize },
}

/// A segment of parsed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  /// Literal text (no placeholders)
  Literal(String),

  /// A placeholder to be resolved
  Placeholder(Placeholder),
}

/// Errors that can occur during placeholder parsing or resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceholderError {
  #[error("unclosed placeholder at position {0}")]
  Unclosed(usize),

  #[error("invalid variable name: '{0}'")]
  InvalidName(String),

  #[error("invalid index in '{0}'")]
  InvalidIndex(String),

  #[error("unknown variable: {0}")]
  UnknownVar(String),

  #[error("index {index} out of range for '{name}' (length {len})")]
  IndexOutOfRange { name: String, index: usize, len: usize },
}

/// Supplies values for placeholders during expansion.
pub trait Resolver {
  /// Resolve a named variable.
  fn resolve_var(&self, name: &str) -> Result<Cow<'_, str>, PlaceholderError>;

  /// Resolve element `index` of a list variable.
  fn resolve_indexed(&self, name: &str, index: usize) -> Result<Cow<'_, str>, PlaceholderError>;
}

/// Parse a template string into segments.
///
/// # Errors
///
/// Returns an error if an expression is unclosed, has an invalid name or a
/// non-numeric index.
pub fn parse(input: &str) -> Result<Vec<Segment>, PlaceholderError> {
  let mut segments = Vec::new();
  let mut literal = String::new();
  let mut chars = input.char_indices().peekable();

  while let Some((pos, ch)) = chars.next() {
    if ch != '%' {
      literal.push(ch);
      continue;
    }

    match chars.peek() {
      Some((_, '%')) => {
        chars.next();
        if let Some((_, '{')) = chars.peek() {
          // Escaped: %%{ -> %{
          chars.next();
          literal.push_str("%{");
        } else {
          literal.push_str("%%");
        }
      }
      Some((_, '{')) => {
        chars.next();

        if !literal.is_empty() {
          segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }

        let mut content = String::new();
        let mut found_close = false;
        for (_, c) in chars.by_ref() {
          if c == '}' {
            found_close = true;
            break;
          }
          content.push(c);
        }

        if !found_close {
          return Err(PlaceholderError::Unclosed(pos));
        }

        segments.push(Segment::Placeholder(parse_expression(&content)?));
      }
      _ => literal.push('%'),
    }
  }

  if !literal.is_empty() {
    segments.push(Segment::Literal(literal));
  }

  Ok(segments)
}

/// Parse the content between `%{` and `}`.
fn parse_expression(content: &str) -> Result<Placeholder, PlaceholderError> {
  let content = content.trim();

  let Some((name, rest)) = content.split_once('[') else {
    validate_name(content)?;
    return Ok(Placeholder::Var(content.to_string()));
  };

  validate_name(name)?;
  let index = rest
    .strip_suffix(']')
    .and_then(|digits| digits.trim().parse::<usize>().ok())
    .ok_or_else(|| PlaceholderError::InvalidIndex(content.to_string()))?;

  Ok(Placeholder::Indexed {
    name: name.to_string(),
    index,
  })
}

fn validate_name(name: &str) -> Result<(), PlaceholderError> {
  let valid = !name.is_empty()
    && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    && !name.starts_with(|c: char| c.is_ascii_digit());

  if valid {
    Ok(())
  } else {
    Err(PlaceholderError::InvalidName(name.to_string()))
  }
}

/// Expand all placeholders in a string using the provided resolver.
///
/// # Errors
///
/// Returns an error if parsing fails or if any placeholder cannot be resolved.
pub fn substitute(input: &str, resolver: &impl Resolver) -> Result<String, PlaceholderError> {
  let segments = parse(input)?;
  substitute_segments(&segments, resolver)
}

/// Expand placeholders in pre-parsed segments.
pub fn substitute_segments(segments: &[Segment], resolver: &impl Resolver) -> Result<String, PlaceholderError> {
  let mut result = String::new();

  for segment in segments {
    match segment {
      Segment::Literal(s) => result.push_str(s),
      Segment::Placeholder(Placeholder::Var(name)) => result.push_str(&resolver.resolve_var(name)?),
      Segment::Placeholder(Placeholder::Indexed { name, index }) => {
        result.push_str(&resolver.resolve_indexed(name, *index)?)
      }
    }
  }

  Ok(result)
}
