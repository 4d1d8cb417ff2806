//! Pagemend - lifecycle-driven page-content transformer.
//!
//! Pagemend observes a live document, applies idempotent corrective
//! transforms (Unicode NFKC text normalization, viewport-meta unlocking)
//! to existing and future content, and lets users register additional
//! transforms as Rhai scripts keyed to the same lifecycle events.
//!
//! # Architecture
//!
//! The library is organized into these main modules:
//!
//! - [`dom`] - In-memory document tree with mutation recording
//! - [`settings`] - Persisted enable flags and custom module definitions
//! - [`modules`] - Module registry, built-in transforms, Rhai execution
//! - [`dispatch`] - Per-event module invocation with failure containment
//! - [`watcher`] - Mutation-batch to lifecycle-event translation
//! - [`session`] - Session object wiring the startup sequence
//! - [`normalize`] - The NFKC normalization primitive
//!
//! # Example
//!
//! ```ignore
//! use pagemend::{Document, JsonSettingsStore, PageSession};
//!
//! let store = JsonSettingsStore::at_default_path()?;
//! store.seed_defaults()?;
//!
//! let doc = Document::new_shared();
//! let mut session = PageSession::attach(&store, doc.clone())?;
//!
//! // ... host populates the document ...
//! session.document_ready();
//!
//! // After every host mutation of the document:
//! session.pump();
//! ```

// Public modules
pub mod dispatch;
pub mod dom;
pub mod modules;
pub mod normalize;
pub mod session;
pub mod settings;
pub mod watcher;

// Internal modules
mod error;

// Re-export commonly used types for convenience
pub use dispatch::{Dispatcher, ModuleFailure};
pub use dom::{Document, DocumentStats, MutationRecord, NodeId, ReadyState, SharedDocument};
pub use error::{PagemendError, PagemendResult};
pub use modules::{
    BuiltinTransform, LifecycleEvent, Module, ModuleError, ModuleKind, ModuleRegistry, ScriptHost,
};
pub use session::PageSession;
pub use settings::{
    CustomModuleSpec, DefaultModules, JsonSettingsStore, MemorySettingsStore, Settings,
    SettingsStore,
};
pub use watcher::{MutationWatcher, WatcherState};
