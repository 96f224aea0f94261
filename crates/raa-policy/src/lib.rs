//! RootAsRole policy merging
//!
//! After the observe phase, `gensr` has written a policy whose roles and
//! tasks are named after the identity tags seen at runtime. This crate folds
//! those names into the reviewed scenario policy and appends the result to
//! the base policy that the enforce phase pushes to the host.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod merge;
pub mod paths;

pub use error::{PolicyError, PolicyResult};
pub use merge::{merge_policies, merge_policy_files, MergeSummary, PolicyPaths};
pub use paths::keep_leaf_entries;
