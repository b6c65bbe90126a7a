//! Find-style expression parsing
//!
//! Turns the raw argument vector (`[PATH] [-type d|f] [-name GLOB] [-iname GLOB]`)
//! into a root path and a [`FilterSpec`]. The root is the first argument
//! when it does not start with `-`; everything after it must be
//! modifier/value pairs.

use crate::error::{UsageError, UsageErrorKind, UsageResult};
use crate::filter::{FilterBuilder, FilterSpec, TypeFilter};
use std::path::PathBuf;

/// A recognized filter modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modifier {
    Type,
    Name,
    IName,
}

impl Modifier {
    fn parse(arg: &str) -> Option<Self> {
        match arg {
            "-type" => Some(Modifier::Type),
            "-name" => Some(Modifier::Name),
            "-iname" => Some(Modifier::IName),
            _ => None,
        }
    }

    fn flag(&self) -> &'static str {
        match self {
            Modifier::Type => "-type",
            Modifier::Name => "-name",
            Modifier::IName => "-iname",
        }
    }

    fn apply(&self, builder: &mut FilterBuilder, value: &str) -> UsageResult<()> {
        match self {
            Modifier::Type => {
                let t = TypeFilter::from_code(value).ok_or_else(|| {
                    UsageError::with_message(
                        UsageErrorKind::Generic,
                        format!("Unknown type '{}' (expected 'd' or 'f')", value),
                    )
                })?;
                builder.entry_type(t)?;
            }
            Modifier::Name => {
                builder.name(value)?;
            }
            Modifier::IName => {
                builder.iname(value)?;
            }
        }
        Ok(())
    }
}

/// Parsed find expression
#[derive(Debug, Clone)]
pub struct FindExpression {
    /// Root directory, if one was given
    pub root: Option<PathBuf>,

    /// Filter built from the modifiers
    pub filter: FilterSpec,
}

/// Parse a find-style argument vector (program name excluded)
pub fn parse<S: AsRef<str>>(args: &[S]) -> UsageResult<FindExpression> {
    let args: Vec<&str> = args.iter().map(|s| s.as_ref()).collect();
    let mut iter = args.into_iter().peekable();

    let root = if iter.peek().is_some_and(|first| !first.starts_with('-')) {
        iter.next().map(PathBuf::from)
    } else {
        None
    };

    let mut builder = FilterSpec::builder();
    let mut pending: Option<Modifier> = None;

    for arg in iter {
        match pending.take() {
            None => {
                let modifier = Modifier::parse(arg).ok_or_else(|| {
                    UsageError::with_message(
                        UsageErrorKind::UnknownFilterModifier,
                        format!("Unknown modifier '{}'!", arg),
                    )
                })?;

                let current = builder.peek();
                let already_set = match modifier {
                    Modifier::Type => current.entry_type().is_some(),
                    Modifier::Name => current.name().is_some(),
                    Modifier::IName => current.iname().is_some(),
                };
                if already_set {
                    return Err(UsageError::new(UsageErrorKind::DuplicateFilterModifier));
                }

                pending = Some(modifier);
            }
            Some(modifier) => modifier.apply(&mut builder, arg)?,
        }
    }

    if let Some(modifier) = pending {
        return Err(UsageError::with_message(
            UsageErrorKind::Generic,
            format!("Missing value for '{}'", modifier.flag()),
        ));
    }

    Ok(FindExpression {
        root,
        filter: builder.build(),
    })
}
