//! RootAsAnsible identity-tag injection
//!
//! Walks an Ansible tree (playbooks, task files, roles) and appends an
//! identity tag `-r <document> -t <uuid>` to the `become_flags` of every task
//! that runs with `become`, so the policy generator can map each observed
//! privileged command back to the task that issued it.
//!
//! # Architecture
//!
//! ```text
//! discover(root) → Injector::visit(doc, false)
//!                      │
//!                      ├─ playbook: import_playbook → visit(…, false)
//!                      │            roles           → visit(tasks/handlers, role become)
//!                      │            sections        → mutate(…, play become)
//!                      └─ task list: mutate(…, inherited)
//!                                      ├─ include → visit(…, task become)
//!                                      ├─ block/rescue/always → mutate(…)
//!                                      └─ tag become_flags
//! ```
//!
//! Injection is idempotent: a second run over the same tree writes nothing.
//!
//! # Example
//!
//! ```rust,ignore
//! use raa_inject::{inject, InjectConfig};
//!
//! let report = inject(&InjectConfig::new("build"))?;
//! println!("{report}");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod engine;
pub mod error;
mod mutator;
pub mod report;
pub mod resolver;
pub mod state;

pub use config::InjectConfig;
pub use engine::{discover, inject, Discovery, Injector};
pub use error::{InjectError, InjectResult};
pub use report::InjectReport;
pub use resolver::{Resolver, RoleDir};
pub use state::{Admission, TraversalState, VisitMarker};
