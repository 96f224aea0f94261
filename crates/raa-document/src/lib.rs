//! RootAsAnsible document layer
//!
//! The boundary between Ansible YAML files on disk and the traversal that
//! tags privileged tasks.
//!
//! # Core Operations
//!
//! - **Load**: read a playbook, task list or role file into a YAML tree
//! - **Classify**: decide once whether a tree is a playbook, a task list or
//!   something the traversal ignores
//! - **Save**: write a mutated tree back in block style, keys in order
//!
//! # Example
//!
//! ```rust,ignore
//! use raa_document::{DocumentKind, DocumentStore};
//!
//! let store = DocumentStore::new();
//! let doc = store.load("playbooks/main.yml")?;
//! if DocumentKind::classify(&doc) == DocumentKind::EntryPoint {
//!     // walk plays
//! }
//! store.save("playbooks/main.yml", &doc)?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod model;
pub mod store;
pub mod tag;

pub use error::{DocumentError, DocumentResult};
pub use model::{DocumentKind, Reference, RoleRef};
pub use store::DocumentStore;
pub use tag::IdentityTag;

/// Re-export of the tree type documents are held in
pub use serde_yaml::{Mapping, Value};
