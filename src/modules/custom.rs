//! Custom module execution.
//!
//! User-authored modules are stored as Rhai source text and compiled into
//! an invocable unit at dispatch time. One engine is built per session
//! with a small document API registered on it:
//!
//! - `root()` — the document root
//! - `kind(node)` — `"text"` or `"element"`
//! - `tag(node)` — element tag name (empty for text nodes)
//! - `children(node)` — child nodes, in document order
//! - `text(node)` / `set_text(node, s)` — text-node content
//! - `attr(node, name)` / `set_attr(node, name, value)` — element attributes
//!
//! Node-scoped lifecycle events bind the affected node to a `node`
//! variable in the script's scope; page-ready scripts start from `root()`.
//! Execution is synchronous and not time-limited: a script that loops
//! forever stalls the session.

use std::rc::Rc;

use rhai::{Dynamic, Engine, Scope};

use crate::dom::{NodeId, SharedDocument};

use super::error::{ModuleError, ModuleResult};

/// Node handle exposed to scripts.
#[derive(Debug, Clone, Copy)]
pub struct ScriptNode(NodeId);

/// Embedded Rhai engine with the document API registered.
pub struct ScriptHost {
    engine: Engine,
}

impl ScriptHost {
    /// Build an engine bound to `doc`.
    pub fn new(doc: &SharedDocument) -> Self {
        let mut engine = Engine::new();
        engine.register_type_with_name::<ScriptNode>("Node");

        let d = Rc::clone(doc);
        engine.register_fn("root", move || ScriptNode(d.borrow().root()));

        let d = Rc::clone(doc);
        engine.register_fn("kind", move |node: ScriptNode| -> String {
            if d.borrow().is_text(node.0) {
                "text".to_string()
            } else {
                "element".to_string()
            }
        });

        let d = Rc::clone(doc);
        engine.register_fn("tag", move |node: ScriptNode| -> String {
            d.borrow().tag_name(node.0).map(str::to_string).unwrap_or_default()
        });

        let d = Rc::clone(doc);
        engine.register_fn("children", move |node: ScriptNode| -> rhai::Array {
            d.borrow()
                .children(node.0)
                .iter()
                .map(|&id| Dynamic::from(ScriptNode(id)))
                .collect()
        });

        let d = Rc::clone(doc);
        engine.register_fn("text", move |node: ScriptNode| -> String {
            d.borrow().text_content(node.0).map(str::to_string).unwrap_or_default()
        });

        let d = Rc::clone(doc);
        engine.register_fn("set_text", move |node: ScriptNode, content: &str| {
            d.borrow_mut().set_text_content(node.0, content);
        });

        let d = Rc::clone(doc);
        engine.register_fn("attr", move |node: ScriptNode, name: &str| -> String {
            d.borrow().attribute(node.0, name).map(str::to_string).unwrap_or_default()
        });

        let d = Rc::clone(doc);
        engine.register_fn("set_attr", move |node: ScriptNode, name: &str, value: &str| {
            d.borrow_mut().set_attribute(node.0, name, value);
        });

        engine.on_print(|message| tracing::debug!(target: "pagemend::custom", "{message}"));
        engine.on_debug(|message, _source, _pos| {
            tracing::debug!(target: "pagemend::custom", "{message}");
        });

        Self { engine }
    }

    /// Compile and run a module's stored source.
    ///
    /// The source is compiled fresh on every invocation; a parse failure
    /// therefore surfaces here, at the first (and every) attempt, as
    /// [`ModuleError::Compile`].
    pub fn run(&self, module: &str, code: &str, node: Option<NodeId>) -> ModuleResult<()> {
        let ast = self.engine.compile(code).map_err(|e| ModuleError::Compile {
            module: module.to_string(),
            message: e.to_string(),
        })?;

        let mut scope = Scope::new();
        if let Some(node) = node {
            scope.push("node", ScriptNode(node));
        }

        self.engine
            .eval_ast_with_scope::<Dynamic>(&mut scope, &ast)
            .map(|_| ())
            .map_err(|e| ModuleError::Execution {
                module: module.to_string(),
                message: e.to_string(),
            })
    }
}
