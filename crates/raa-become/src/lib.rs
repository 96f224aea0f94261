//! RootAsAnsible become commands
//!
//! Builders for the command lines the `gensr`, `sr` and `dosr` become
//! methods run. They consume the identity tag that injection placed in
//! `become_flags`, passed down explicitly through a [`TaskContext`].
//!
//! # Example
//!
//! ```rust,ignore
//! use raa_become::{BecomeCommand, GenerateCommand, TaskContext};
//!
//! let ctx = TaskContext::new(Some("Install nginx".into()), "-r site.yml -t 0f3a…");
//! let line = GenerateCommand::default().build("/bin/sh -c 'id'", &ctx)?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod command;
pub mod context;
pub mod error;

pub use command::{split_command, BecomeCommand, GenerateCommand, SubstituteCommand};
pub use context::TaskContext;
pub use error::{BecomeError, BecomeResult};
