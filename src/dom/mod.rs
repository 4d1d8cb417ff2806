//! In-memory document tree.
//!
//! The transformer observes a "live document" owned by the host page. This
//! module supplies that document as an arena-backed tree exposing exactly
//! the surface the engine consumes:
//!
//! ```text
//! Document
//! ├── nodes: arena of Element/Text slots addressed by NodeId
//! ├── ready: Loading | Interactive        (readiness signal)
//! ├── pending: Vec<MutationRecord>        (mutation subscription)
//! └── stats: DocumentStats                (write-count probe)
//! ```
//!
//! Every structural insertion and every text write performed through the
//! document API is recorded into the pending log. The host (or the
//! session's pump loop) drains the log in batches with
//! [`Document::take_mutations`]; the watcher turns drained records into
//! lifecycle dispatches. Node ids are never reused, so ids captured in a
//! batch stay valid while modules mutate the tree.

mod walker;

pub use walker::TextWalker;

use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to a document.
///
/// The execution model is single-threaded and cooperative; the document is
/// the only mutable state shared between the host, built-in transforms and
/// custom module scripts.
pub type SharedDocument = Rc<RefCell<Document>>;

/// Identifier of a node in a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Payload of a single node.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// An element with a tag name and ordered attributes.
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    /// A text node.
    Text { content: String },
}

/// Document readiness, as reported by the host's ready signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    /// Still loading; page-ready work must be deferred.
    Loading,
    /// Ready for the initial page-ready pass.
    Interactive,
}

/// One structural or content change, as delivered to observers.
#[derive(Debug, Clone)]
pub enum MutationRecord {
    /// Nodes inserted into the tree, in insertion order. Only the inserted
    /// roots are reported; observers recurse into subtrees themselves.
    ChildList { added: Vec<NodeId> },
    /// A text node whose content changed.
    CharacterData { node: NodeId },
}

/// Counters for writes performed through the document API.
///
/// Tests use these as a probe: an idempotent transform applied to
/// already-transformed content must leave them untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentStats {
    /// Number of text-content writes.
    pub character_data_writes: u64,
    /// Number of attribute writes.
    pub attribute_writes: u64,
}

struct NodeSlot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed document tree with mutation recording.
pub struct Document {
    nodes: Vec<NodeSlot>,
    root: NodeId,
    ready: ReadyState,
    pending: Vec<MutationRecord>,
    stats: DocumentStats,
}

impl Document {
    /// Create an empty document in the `Loading` state.
    ///
    /// The root element is created directly and does not appear in the
    /// mutation log.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            ready: ReadyState::Loading,
            pending: Vec::new(),
            stats: DocumentStats::default(),
        };
        doc.root = doc.insert_slot(NodeData::Element {
            tag: "html".to_string(),
            attributes: Vec::new(),
        });
        doc
    }

    /// Create a shared handle around a new document.
    pub fn new_shared() -> SharedDocument {
        Rc::new(RefCell::new(Self::new()))
    }

    /// The document root element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Current readiness state.
    pub fn ready_state(&self) -> ReadyState {
        self.ready
    }

    /// Mark the document interactive. Fired once by the host; further
    /// calls are no-ops.
    pub fn set_interactive(&mut self) {
        self.ready = ReadyState::Interactive;
    }

    /// Create a detached element node.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.insert_slot(NodeData::Element {
            tag: tag.to_string(),
            attributes: Vec::new(),
        })
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.insert_slot(NodeData::Text {
            content: content.to_string(),
        })
    }

    /// Append a detached node under `parent`.
    ///
    /// Records a `ChildList` mutation for the inserted root only; any
    /// subtree built under `child` while detached rides along silently,
    /// mirroring how structural observers report insertion batches.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.nodes[child.0].parent.is_none(), "node already attached");
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        self.pending.push(MutationRecord::ChildList { added: vec![child] });
    }

    /// Text content of a text node, `None` for elements.
    pub fn text_content(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].data {
            NodeData::Text { content } => Some(content),
            NodeData::Element { .. } => None,
        }
    }

    /// Overwrite the content of a text node.
    ///
    /// Records a `CharacterData` mutation and bumps the write counter on
    /// every call, equal content included; deciding whether a write is
    /// worth performing is the caller's job. No-op on elements.
    pub fn set_text_content(&mut self, node: NodeId, content: &str) {
        if let NodeData::Text { content: existing } = &mut self.nodes[node.0].data {
            *existing = content.to_string();
            self.stats.character_data_writes += 1;
            self.pending.push(MutationRecord::CharacterData { node });
        }
    }

    /// Tag name of an element, `None` for text nodes.
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].data {
            NodeData::Element { tag, .. } => Some(tag),
            NodeData::Text { .. } => None,
        }
    }

    /// Attribute value on an element.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[node.0].data {
            NodeData::Element { attributes, .. } => attributes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            NodeData::Text { .. } => None,
        }
    }

    /// Set (or overwrite) an attribute on an element. No-op on text nodes.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let NodeData::Element { attributes, .. } = &mut self.nodes[node.0].data {
            match attributes.iter_mut().find(|(n, _)| n == name) {
                Some((_, v)) => *v = value.to_string(),
                None => attributes.push((name.to_string(), value.to_string())),
            }
            self.stats.attribute_writes += 1;
        }
    }

    /// Whether `node` is a text node.
    pub fn is_text(&self, node: NodeId) -> bool {
        matches!(self.nodes[node.0].data, NodeData::Text { .. })
    }

    /// Whether `node` is an element.
    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.nodes[node.0].data, NodeData::Element { .. })
    }

    /// Children of a node, in document order.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// Pre-order traversal of `root` and all its descendants.
    pub fn subtree(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            out.push(node);
            for &child in self.nodes[node.0].children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Drain the pending mutation log as one batch.
    ///
    /// Returns records in the order the mutations happened. Mutations
    /// performed while a batch is being processed accumulate into the next
    /// batch — dispatch never recurses into itself.
    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.pending)
    }

    /// Write counters.
    pub fn stats(&self) -> DocumentStats {
        self.stats
    }

    fn insert_slot(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeSlot {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
