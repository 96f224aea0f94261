//! Task mutation
//!
//! Works inside one document: decides each task's effective elevation,
//! follows task-file includes with that elevation, descends into
//! `block`/`rescue`/`always`, and appends an identity tag to `become_flags`
//! where one is needed.

use crate::engine::{Injector, Scope};
use crate::error::InjectResult;
use raa_document::model::{self, keys};
use raa_document::{IdentityTag, Reference, Value};

impl Injector {
    /// Tag the elevated tasks of a list; returns whether any task changed
    pub(crate) fn mutate(
        &mut self,
        tasks: &mut [Value],
        inherited: bool,
        scope: Scope<'_>,
    ) -> InjectResult<bool> {
        let mut changed = false;

        for task in tasks.iter_mut().filter_map(Value::as_mapping_mut) {
            let effective = model::declared_become(task).unwrap_or(inherited);

            // An included file runs with the including task's context.
            let target = model::task_include(task)
                .and_then(Reference::static_path)
                .and_then(|token| self.resolver.resolve_include(token, scope.dir));
            if let Some(target) = target {
                self.visit(&target, effective)?;
            }

            if task.contains_key(keys::BLOCK) {
                for section in keys::BLOCK_SECTIONS {
                    if let Some(nested) = task.get_mut(section).and_then(Value::as_sequence_mut) {
                        changed |= self.mutate(nested, effective, scope)?;
                    }
                }
            }

            if model::has_method_override(task) || !effective {
                continue;
            }

            let flags = match model::become_flags(task) {
                Some(flags) if IdentityTag::is_tagged(&flags) => continue,
                Some(flags) => IdentityTag::generate(scope.location).append_to(&flags),
                None => {
                    tracing::debug!(
                        document = scope.location,
                        "become_flags is not a scalar, task left untouched"
                    );
                    continue;
                }
            };
            model::set_become_flags(task, flags);
            self.report.tagged += 1;
            changed = true;
        }

        Ok(changed)
    }
}
