//! Module engine: lifecycle events, module records and the registry.
//!
//! # Architecture
//!
//! ```text
//! ModuleRegistry
//! ├── flags: DefaultModules            (loaded once at session attach)
//! └── modules: Vec<Module>             (built-ins first, then customs)
//!     ├── Builtin { transform, gate }  (natively implemented, flag-gated)
//!     └── Custom { code }              (stored Rhai source, always on)
//! ```
//!
//! A module is bound to exactly one lifecycle event for its whole life.
//! Built-ins are registered in a fixed order and gated by the persisted
//! flags; custom modules follow in stored order, with presence in the
//! stored list as their only enable signal.

mod builtin;
mod custom;
mod error;

pub use builtin::{BuiltinTransform, UNLOCKED_VIEWPORT};
pub use custom::{ScriptHost, ScriptNode};
pub use error::{ModuleError, ModuleResult};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::settings::{DefaultModules, Settings};

/// The three moments at which modules may run.
///
/// Serializes as the persisted lifecycle tags (`"onLoad"`,
/// `"onNodeAdded"`, `"onCharacterDataChange"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleEvent {
    /// Fires once, when the document becomes interactive.
    #[serde(rename = "onLoad")]
    PageReady,
    /// Fires once per newly-inserted node.
    #[serde(rename = "onNodeAdded")]
    NodeAdded,
    /// Fires once per text-content mutation.
    #[serde(rename = "onCharacterDataChange")]
    CharacterDataChanged,
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::PageReady => "onLoad",
            Self::NodeAdded => "onNodeAdded",
            Self::CharacterDataChanged => "onCharacterDataChange",
        };
        f.write_str(tag)
    }
}

/// Which persisted flag gates a built-in module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleGate {
    NormalizeText,
    ViewportFix,
}

/// A module's behavior.
#[derive(Debug, Clone)]
pub enum ModuleKind {
    /// Natively implemented, activation gated by a persisted flag.
    Builtin {
        transform: BuiltinTransform,
        gate: ModuleGate,
    },
    /// User-authored Rhai source, evaluated at dispatch time.
    Custom { code: String },
}

/// One registered module.
///
/// `name` is informational only — not required unique, used solely for
/// failure attribution.
#[derive(Debug, Clone)]
pub struct Module {
    pub name: String,
    pub event: LifecycleEvent,
    pub kind: ModuleKind,
}

/// The ordered set of modules for one page session.
pub struct ModuleRegistry {
    flags: DefaultModules,
    modules: Vec<Module>,
}

impl ModuleRegistry {
    /// Build the registry from loaded settings: the fixed built-in set
    /// first, then the stored custom modules in order.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut modules = vec![
            builtin_module(
                "viewportFixer",
                LifecycleEvent::PageReady,
                BuiltinTransform::ViewportUnlock,
                ModuleGate::ViewportFix,
            ),
            builtin_module(
                "viewportFixerDynamic",
                LifecycleEvent::NodeAdded,
                BuiltinTransform::ViewportUnlockDynamic,
                ModuleGate::ViewportFix,
            ),
            builtin_module(
                "textNormalizerInitialLoad",
                LifecycleEvent::PageReady,
                BuiltinTransform::NormalizeDocument,
                ModuleGate::NormalizeText,
            ),
            builtin_module(
                "textNormalizerNodeAdded",
                LifecycleEvent::NodeAdded,
                BuiltinTransform::NormalizeAddedNode,
                ModuleGate::NormalizeText,
            ),
            builtin_module(
                "textNormalizerCharacterDataChange",
                LifecycleEvent::CharacterDataChanged,
                BuiltinTransform::NormalizeCharacterData,
                ModuleGate::NormalizeText,
            ),
        ];

        for spec in &settings.custom_modules {
            modules.push(Module {
                name: spec.name.clone(),
                event: spec.event,
                kind: ModuleKind::Custom {
                    code: spec.code.clone(),
                },
            });
        }

        Self {
            flags: settings.default_modules,
            modules,
        }
    }

    /// Registered modules, in dispatch order.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Evaluate a module's enable predicate against the session's flags.
    /// Custom modules are always enabled.
    pub fn is_enabled(&self, module: &Module) -> bool {
        match &module.kind {
            ModuleKind::Builtin { gate, .. } => match gate {
                ModuleGate::NormalizeText => self.flags.normalize_text_enabled,
                ModuleGate::ViewportFix => self.flags.viewport_fix_enabled,
            },
            ModuleKind::Custom { .. } => true,
        }
    }
}

fn builtin_module(
    name: &str,
    event: LifecycleEvent,
    transform: BuiltinTransform,
    gate: ModuleGate,
) -> Module {
    Module {
        name: name.to_string(),
        event,
        kind: ModuleKind::Builtin { transform, gate },
    }
}
