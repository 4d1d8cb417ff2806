//! Lazy depth-first text-node traversal.

use super::{Document, NodeId};

/// Walks the text nodes under a root, depth-first, skipping nodes whose
/// trimmed content is empty.
///
/// The walker holds no borrow of the document; callers pass it back in on
/// every step, which lets them mutate the node just yielded before asking
/// for the next one:
///
/// ```ignore
/// let mut walker = TextWalker::new(root);
/// while let Some(node) = walker.next(doc) {
///     // doc is free to be mutated here
/// }
/// ```
///
/// Ids already on the walker's stack stay valid across mutations because
/// the arena never reuses ids.
pub struct TextWalker {
    stack: Vec<NodeId>,
}

impl TextWalker {
    /// Start a traversal rooted at `root` (inclusive).
    pub fn new(root: NodeId) -> Self {
        Self { stack: vec![root] }
    }

    /// The next text node with non-empty trimmed content, or `None` when
    /// the subtree is exhausted.
    pub fn next(&mut self, doc: &Document) -> Option<NodeId> {
        while let Some(node) = self.stack.pop() {
            for &child in doc.children(node).iter().rev() {
                self.stack.push(child);
            }
            if let Some(content) = doc.text_content(node) {
                if !content.trim().is_empty() {
                    return Some(node);
                }
            }
        }
        None
    }
}
