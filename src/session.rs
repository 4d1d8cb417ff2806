//! Page session: one document, one registry, one watcher.
//!
//! A session is constructed explicitly from a settings store and a shared
//! document — no module-level singleton — and owns the registry,
//! dispatcher and watcher for one document's lifetime. Startup sequence:
//!
//! 1. settings are read once at attach,
//! 2. the registry is built (gated built-ins + stored custom modules),
//! 3. `PageReady` fires — synchronously if the document is already
//!    interactive, otherwise when the host delivers the readiness signal,
//! 4. the watcher transitions to observing, and the host thereafter calls
//!    [`PageSession::pump`] after mutating the document.

use tracing::debug;

use crate::dispatch::{Dispatcher, ModuleFailure};
use crate::dom::{ReadyState, SharedDocument};
use crate::error::PagemendResult;
use crate::modules::{LifecycleEvent, ModuleRegistry, ScriptHost};
use crate::settings::SettingsStore;
use crate::watcher::MutationWatcher;

/// A running page-transformer session.
pub struct PageSession {
    doc: SharedDocument,
    dispatcher: Dispatcher,
    watcher: MutationWatcher,
    ready_fired: bool,
}

impl PageSession {
    /// Attach to a document: read settings once, build the registry and,
    /// if the document is already interactive, run the page-ready pass and
    /// begin observing.
    pub fn attach(store: &dyn SettingsStore, doc: SharedDocument) -> PagemendResult<Self> {
        let settings = store.load()?;
        debug!(
            custom_modules = settings.custom_modules.len(),
            "attaching page session"
        );

        let registry = ModuleRegistry::from_settings(&settings);
        let host = ScriptHost::new(&doc);
        let dispatcher = Dispatcher::new(registry, host, doc.clone());

        let mut session = Self {
            doc,
            dispatcher,
            watcher: MutationWatcher::new(),
            ready_fired: false,
        };

        let already_interactive =
            session.doc.borrow().ready_state() == ReadyState::Interactive;
        if already_interactive {
            session.fire_page_ready();
        }
        Ok(session)
    }

    /// The host's readiness signal. Marks the document interactive, runs
    /// the deferred page-ready pass and starts observation. Further calls
    /// are no-ops.
    pub fn document_ready(&mut self) {
        if self.ready_fired {
            return;
        }
        self.doc.borrow_mut().set_interactive();
        self.fire_page_ready();
    }

    /// Drain pending mutation batches until none remain.
    ///
    /// Writes performed by modules during a batch queue into the next
    /// batch rather than dispatching recursively; the loop terminates
    /// because the built-in transforms are fixed points (a pathological
    /// custom module that writes unconditionally can stall it — the
    /// accepted risk of unrestricted custom code).
    pub fn pump(&mut self) {
        if !self.watcher.is_observing() {
            return;
        }
        loop {
            let batch = self.doc.borrow_mut().take_mutations();
            if batch.is_empty() {
                break;
            }
            self.watcher.deliver(&mut self.dispatcher, batch);
        }
    }

    /// Module failures recorded so far.
    pub fn failures(&self) -> &[ModuleFailure] {
        self.dispatcher.failures()
    }

    /// The observed document.
    pub fn document(&self) -> &SharedDocument {
        &self.doc
    }

    fn fire_page_ready(&mut self) {
        self.dispatcher.dispatch(LifecycleEvent::PageReady, None);
        // Observation starts only after the initial pass; the records the
        // pass generated are discarded inside start().
        self.watcher.start(&self.doc);
        self.ready_fired = true;
    }
}
