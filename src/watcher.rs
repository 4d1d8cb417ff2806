//! Mutation watcher.
//!
//! Translates drained mutation batches into lifecycle dispatches. Two
//! states, one transition:
//!
//! ```text
//! Idle ──start()──▶ Observing
//! ```
//!
//! `start` happens once, after the initial page-ready dispatch; there is
//! no way back to `Idle` — the watcher runs for the page's lifetime.
//! Records accumulated before observation begins (document construction,
//! the page-ready pass itself) are discarded at the transition: existing
//! content is the initial pass's job, not a replay's.

use crate::dispatch::Dispatcher;
use crate::dom::{MutationRecord, SharedDocument};
use crate::modules::LifecycleEvent;

/// Observation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    /// Not yet observing; delivered batches are dropped.
    Idle,
    /// Observing; batches are translated into dispatches.
    Observing,
}

/// Forwards structural/content deltas to the dispatcher.
pub struct MutationWatcher {
    state: WatcherState,
}

impl MutationWatcher {
    pub fn new() -> Self {
        Self {
            state: WatcherState::Idle,
        }
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    pub fn is_observing(&self) -> bool {
        self.state == WatcherState::Observing
    }

    /// Begin observing `doc`, discarding any mutations recorded so far.
    /// Idempotent after the first call.
    pub fn start(&mut self, doc: &SharedDocument) {
        if self.state == WatcherState::Observing {
            return;
        }
        doc.borrow_mut().take_mutations();
        self.state = WatcherState::Observing;
    }

    /// Process one mutation batch.
    ///
    /// Added nodes are handled in their reported order, each node's full
    /// module set completing before the next node. Subtrees are not
    /// flattened here; built-in transforms recurse internally.
    pub fn deliver(&mut self, dispatcher: &mut Dispatcher, batch: Vec<MutationRecord>) {
        if self.state != WatcherState::Observing {
            return;
        }
        for record in batch {
            match record {
                MutationRecord::ChildList { added } => {
                    for node in added {
                        dispatcher.dispatch(LifecycleEvent::NodeAdded, Some(node));
                    }
                }
                MutationRecord::CharacterData { node } => {
                    dispatcher.dispatch(LifecycleEvent::CharacterDataChanged, Some(node));
                }
            }
        }
    }
}

impl Default for MutationWatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use crate::modules::{ModuleRegistry, ScriptHost};
    use crate::settings::Settings;

    fn dispatcher_for(doc: &SharedDocument) -> Dispatcher {
        let settings = Settings::default();
        let registry = ModuleRegistry::from_settings(&settings);
        let host = ScriptHost::new(doc);
        Dispatcher::new(registry, host, doc.clone())
    }

    #[test]
    fn test_idle_watcher_drops_batches() {
        let doc = Document::new_shared();
        let text = {
            let mut d = doc.borrow_mut();
            let text = d.create_text("Ｈｅｌｌｏ");
            let root = d.root();
            d.append_child(root, text);
            text
        };

        let mut dispatcher = dispatcher_for(&doc);
        let mut watcher = MutationWatcher::new();
        let batch = doc.borrow_mut().take_mutations();
        watcher.deliver(&mut dispatcher, batch);

        // Nothing dispatched: the insertion was not normalized.
        assert_eq!(doc.borrow().text_content(text), Some("Ｈｅｌｌｏ"));
    }

    #[test]
    fn test_start_discards_pre_observation_records() {
        let doc = Document::new_shared();
        {
            let mut d = doc.borrow_mut();
            let text = d.create_text("built before observation");
            let root = d.root();
            d.append_child(root, text);
        }

        let mut watcher = MutationWatcher::new();
        watcher.start(&doc);
        assert!(watcher.is_observing());
        assert!(doc.borrow_mut().take_mutations().is_empty());
    }

    #[test]
    fn test_delivered_insertions_dispatch_node_added() {
        let doc = Document::new_shared();
        let mut dispatcher = dispatcher_for(&doc);
        let mut watcher = MutationWatcher::new();
        watcher.start(&doc);

        let text = {
            let mut d = doc.borrow_mut();
            let text = d.create_text("ﬁle");
            let root = d.root();
            d.append_child(root, text);
            text
        };

        let batch = doc.borrow_mut().take_mutations();
        watcher.deliver(&mut dispatcher, batch);
        assert_eq!(doc.borrow().text_content(text), Some("file"));
    }

    #[test]
    fn test_character_data_records_dispatch_chardata() {
        let doc = Document::new_shared();
        let mut dispatcher = dispatcher_for(&doc);
        let mut watcher = MutationWatcher::new();

        let text = {
            let mut d = doc.borrow_mut();
            let text = d.create_text("plain");
            let root = d.root();
            d.append_child(root, text);
            text
        };
        watcher.start(&doc);

        doc.borrow_mut().set_text_content(text, "Ｈｅｌｌｏ");
        let batch = doc.borrow_mut().take_mutations();
        watcher.deliver(&mut dispatcher, batch);
        assert_eq!(doc.borrow().text_content(text), Some("Hello"));
    }
}
