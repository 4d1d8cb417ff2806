//! Lifecycle dispatcher.
//!
//! Given a lifecycle event and an optional node, invokes every registered
//! module whose event matches — built-ins only when their gate is enabled
//! — in registry order. Each invocation runs inside a failure boundary:
//! an error from one module is recorded and logged, and never prevents the
//! remaining modules in the same firing. No module failure is fatal to the
//! session.

use tracing::warn;

use crate::dom::{NodeId, SharedDocument};
use crate::modules::{LifecycleEvent, ModuleKind, ModuleRegistry, ScriptHost};

/// One contained module failure, kept for inspection.
#[derive(Debug, Clone)]
pub struct ModuleFailure {
    /// Name of the failing module (informational, not unique).
    pub module: String,
    /// The event that was being dispatched.
    pub event: LifecycleEvent,
    /// Rendered error detail.
    pub message: String,
}

/// Invokes modules for lifecycle events, isolating failures per module.
pub struct Dispatcher {
    registry: ModuleRegistry,
    host: ScriptHost,
    doc: SharedDocument,
    failures: Vec<ModuleFailure>,
}

impl Dispatcher {
    pub fn new(registry: ModuleRegistry, host: ScriptHost, doc: SharedDocument) -> Self {
        Self {
            registry,
            host,
            doc,
            failures: Vec::new(),
        }
    }

    /// Fire `event`, invoking every matching enabled module in order.
    ///
    /// `node` carries the affected node for `NodeAdded` and
    /// `CharacterDataChanged`; it is `None` for `PageReady`.
    pub fn dispatch(&mut self, event: LifecycleEvent, node: Option<NodeId>) {
        for module in self.registry.modules() {
            if module.event != event {
                continue;
            }

            let result = match &module.kind {
                ModuleKind::Builtin { transform, .. } => {
                    if !self.registry.is_enabled(module) {
                        continue;
                    }
                    let mut doc = self.doc.borrow_mut();
                    transform.apply(&mut doc, node)
                }
                ModuleKind::Custom { code } => self.host.run(&module.name, code, node),
            };

            if let Err(err) = result {
                warn!(
                    module = %module.name,
                    event = %event,
                    error = %err,
                    "module execution failed"
                );
                self.failures.push(ModuleFailure {
                    module: module.name.clone(),
                    event,
                    message: err.to_string(),
                });
            }
        }
    }

    /// Failures recorded so far, in occurrence order.
    pub fn failures(&self) -> &[ModuleFailure] {
        &self.failures
    }
}
