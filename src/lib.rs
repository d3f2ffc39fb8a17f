//! Anchor lint
//!
//! Finds regex anchors that can never match because of what sits next to
//! them: `a^b`, `x\Ay`, `$foo`.
//!
//! ```text
//! pattern text -> parser -> Pattern -> UnexpectedAnchor -> ProblemSink
//!                                            |
//!                                        Reconciler (host fragments)
//! ```
//!
//! ```
//! use anchor_lint::{inspect, RegexFlags};
//!
//! let problems = inspect("a^b", RegexFlags::default()).unwrap();
//! assert_eq!(problems[0].anchor, "^");
//! assert!(inspect(r"\n^b", RegexFlags::default()).unwrap().is_empty());
//! ```

pub mod ast;
pub mod config;
pub mod error;
pub mod inspection;
pub mod parser;
pub mod report;
pub mod shred;

pub use ast::{BoundaryKind, Direction, Node, NodeKind, Pattern, RegexFlags, Span};
pub use error::{ConfigError, ParseError, ParseErrorKind};
pub use inspection::{Element, UnexpectedAnchor, Verdict, inspect, inspect_with};
pub use report::{Problem, ProblemSink, Severity};
pub use shred::{HostFragments, HostPiece, NoHost, Reconciler, ShredInfo};
