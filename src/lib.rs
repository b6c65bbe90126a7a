//! parfind - parallel find
//!
//! Walks a directory tree with a bounded pool of scan workers and prints
//! every entry that passes a filter, one path per line.
//!
//! # Features
//!
//! - **Bounded parallelism**: at most `--jobs` directories are listed at
//!   once; the dispatcher waits while the pool is saturated.
//!
//! - **Find-style filters**: `-type d|f`, `-name GLOB` and `-iname GLOB`,
//!   combined with AND.
//!
//! - **Safe traversal**: symbolic links are never followed and unreadable
//!   directories are skipped without aborting the walk.
//!
//! - **Clean output**: lines from concurrent scans never interleave; logs,
//!   progress and the summary go to stderr.
//!
//! # Example
//!
//! ```bash
//! parfind /srv/data -type f -name '*.log'
//! parfind -j 64 --stats /home -iname 'readme*'
//! ```
//!
//! As a library:
//!
//! ```no_run
//! use parfind::{FilterSpec, FindConfig, WalkCoordinator};
//!
//! let mut filter = FilterSpec::builder();
//! filter.name("*.rs").unwrap();
//! let config = FindConfig::new("src", filter.build());
//! let result = WalkCoordinator::new(config, Box::new(std::io::stdout())).run().unwrap();
//! eprintln!("{} matches", result.matched);
//! ```

pub mod config;
pub mod entry;
pub mod error;
pub mod expression;
pub mod filter;
pub mod progress;
pub mod walker;

pub use config::{CliArgs, FindConfig};
pub use entry::{DirEntry, EntryType};
pub use error::{FindError, Result, UsageError, UsageErrorKind};
pub use filter::{FilterSpec, TypeFilter};
pub use walker::{WalkCoordinator, WalkResult};
