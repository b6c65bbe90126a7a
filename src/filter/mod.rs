//! Entry filters
//!
//! A [`FilterSpec`] is an immutable conjunction of up to three constraints:
//! entry type, case-sensitive name glob and case-insensitive name glob.
//! It is shared read-only by every scan worker.

pub mod pattern;

pub use pattern::{glob_to_regex, CompiledPattern};

use crate::entry::DirEntry;
use crate::error::{UsageError, UsageErrorKind, UsageResult};
use std::fmt;

/// Entry type constraint (`-type d` / `-type f`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFilter {
    Directories,
    Files,
}

impl TypeFilter {
    /// Parse a single-character type code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "d" => Some(TypeFilter::Directories),
            "f" => Some(TypeFilter::Files),
            _ => None,
        }
    }

    pub fn matches(&self, entry: &DirEntry) -> bool {
        match self {
            TypeFilter::Directories => entry.is_directory(),
            TypeFilter::Files => entry.is_regular_file(),
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeFilter::Directories => f.write_str("directories"),
            TypeFilter::Files => f.write_str("files"),
        }
    }
}

/// Immutable set of filter constraints
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    entry_type: Option<TypeFilter>,
    name: Option<CompiledPattern>,
    iname: Option<CompiledPattern>,
}

impl FilterSpec {
    /// A filter that accepts everything
    pub fn any() -> Self {
        Self::default()
    }

    pub fn builder() -> FilterBuilder {
        FilterBuilder::default()
    }

    /// Check whether an entry satisfies every configured constraint
    pub fn matches(&self, entry: &DirEntry) -> bool {
        if let Some(t) = &self.entry_type {
            if !t.matches(entry) {
                return false;
            }
        }

        if self.name.is_none() && self.iname.is_none() {
            return true;
        }

        let name = entry.name();
        self.name.as_ref().map_or(true, |p| p.is_match(name))
            && self.iname.as_ref().map_or(true, |p| p.is_match(name))
    }

    pub fn entry_type(&self) -> Option<TypeFilter> {
        self.entry_type
    }

    pub fn name(&self) -> Option<&CompiledPattern> {
        self.name.as_ref()
    }

    pub fn iname(&self) -> Option<&CompiledPattern> {
        self.iname.as_ref()
    }

    /// True if no constraint is set
    pub fn is_empty(&self) -> bool {
        self.entry_type.is_none() && self.name.is_none() && self.iname.is_none()
    }
}

/// Builds a [`FilterSpec`], rejecting repeated modifiers
#[derive(Debug, Default)]
pub struct FilterBuilder {
    spec: FilterSpec,
}

impl FilterBuilder {
    pub fn entry_type(&mut self, t: TypeFilter) -> UsageResult<&mut Self> {
        if self.spec.entry_type.is_some() {
            return Err(duplicate("-type"));
        }
        self.spec.entry_type = Some(t);
        Ok(self)
    }

    pub fn name(&mut self, glob: &str) -> UsageResult<&mut Self> {
        if self.spec.name.is_some() {
            return Err(duplicate("-name"));
        }
        self.spec.name = Some(CompiledPattern::new(glob));
        Ok(self)
    }

    pub fn iname(&mut self, glob: &str) -> UsageResult<&mut Self> {
        if self.spec.iname.is_some() {
            return Err(duplicate("-iname"));
        }
        self.spec.iname = Some(CompiledPattern::new_case_insensitive(glob));
        Ok(self)
    }

    /// Constraints collected so far
    pub fn peek(&self) -> &FilterSpec {
        &self.spec
    }

    pub fn build(self) -> FilterSpec {
        self.spec
    }
}

fn duplicate(modifier: &str) -> UsageError {
    tracing::debug!(modifier, "Duplicate filter modifier");
    UsageError::new(UsageErrorKind::DuplicateFilterModifier)
}
