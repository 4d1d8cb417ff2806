//! Built-in transforms: text normalization and viewport unlock.
//!
//! Both transforms are fixed points: re-applying them to already-fixed
//! content performs zero writes, which keeps the self-triggered mutation
//! events they cause from cascading (see [`crate::watcher`]).

use crate::dom::{Document, NodeId, TextWalker};
use crate::normalize::nfkc;

use super::error::{ModuleError, ModuleResult};

/// Substrings in a viewport `content` attribute that mark it as
/// zoom-restricted.
const VIEWPORT_TRIGGERS: [&str; 3] = ["maximum-scale", "user-scalable=0", "user-scalable=no"];

/// Replacement content for a restricted viewport meta tag.
pub const UNLOCKED_VIEWPORT: &str = "width=device-width, initial-scale=1.0";

/// A natively-implemented module behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinTransform {
    /// Initial pass: unlock a restricted viewport meta anywhere in the
    /// document.
    ViewportUnlock,
    /// Dynamic pass: unlock restricted viewport metas in an inserted node
    /// and its subtree.
    ViewportUnlockDynamic,
    /// Initial pass: normalize every text node in the document.
    NormalizeDocument,
    /// Dynamic pass: normalize an inserted text node, or every text node
    /// under an inserted element.
    NormalizeAddedNode,
    /// Normalize a text node whose content changed.
    NormalizeCharacterData,
}

impl BuiltinTransform {
    /// Run the transform. Node-scoped variants require the affected node.
    pub fn apply(&self, doc: &mut Document, node: Option<NodeId>) -> ModuleResult<()> {
        match self {
            Self::ViewportUnlock => {
                let root = doc.root();
                unlock_viewport_under(doc, root);
                Ok(())
            }
            Self::ViewportUnlockDynamic => {
                let node = node.ok_or(ModuleError::MissingNode)?;
                if doc.is_element(node) {
                    unlock_viewport_under(doc, node);
                }
                Ok(())
            }
            Self::NormalizeDocument => {
                let root = doc.root();
                normalize_subtree(doc, root);
                Ok(())
            }
            Self::NormalizeAddedNode => {
                let node = node.ok_or(ModuleError::MissingNode)?;
                if doc.is_text(node) {
                    normalize_text_node(doc, node);
                } else {
                    normalize_subtree(doc, node);
                }
                Ok(())
            }
            Self::NormalizeCharacterData => {
                let node = node.ok_or(ModuleError::MissingNode)?;
                if doc.is_text(node) {
                    normalize_text_node(doc, node);
                }
                Ok(())
            }
        }
    }
}

/// Normalize one text node, writing only when the normalized form differs.
///
/// The equality check is what keeps the transform quiet under its own
/// mutation events: already-normalized text produces no write, hence no
/// further character-data record.
fn normalize_text_node(doc: &mut Document, node: NodeId) {
    let normalized = match doc.text_content(node) {
        Some(content) if !content.trim().is_empty() => {
            let normalized = nfkc(content);
            if normalized == content {
                return;
            }
            normalized
        }
        _ => return,
    };
    doc.set_text_content(node, &normalized);
}

/// Normalize every non-blank text node under `root`, depth-first.
fn normalize_subtree(doc: &mut Document, root: NodeId) {
    let mut walker = TextWalker::new(root);
    while let Some(node) = walker.next(doc) {
        normalize_text_node(doc, node);
    }
}

fn is_viewport_meta(doc: &Document, node: NodeId) -> bool {
    doc.tag_name(node) == Some("meta") && doc.attribute(node, "name") == Some("viewport")
}

/// Rewrite restricted viewport meta tags in `root`'s subtree (inclusive).
///
/// Idempotent: the replacement content contains none of the trigger
/// substrings, so a second pass finds nothing to rewrite.
fn unlock_viewport_under(doc: &mut Document, root: NodeId) {
    for node in doc.subtree(root) {
        if !is_viewport_meta(doc, node) {
            continue;
        }
        let restricted = doc
            .attribute(node, "content")
            .is_some_and(|content| VIEWPORT_TRIGGERS.iter().any(|t| content.contains(t)));
        if restricted {
            doc.set_attribute(node, "content", UNLOCKED_VIEWPORT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_viewport(content: &str) -> (Document, NodeId) {
        let mut doc = Document::new();
        let head = doc.create_element("head");
        let meta = doc.create_element("meta");
        doc.set_attribute(meta, "name", "viewport");
        doc.set_attribute(meta, "content", content);
        doc.append_child(doc.root(), head);
        doc.append_child(head, meta);
        (doc, meta)
    }

    #[test]
    fn test_restricted_viewport_is_rewritten_exactly() {
        let (mut doc, meta) = doc_with_viewport("width=device-width, maximum-scale=1");
        BuiltinTransform::ViewportUnlock.apply(&mut doc, None).unwrap();
        assert_eq!(doc.attribute(meta, "content"), Some(UNLOCKED_VIEWPORT));
    }

    #[test]
    fn test_viewport_unlock_is_idempotent() {
        let (mut doc, meta) = doc_with_viewport("user-scalable=no");
        BuiltinTransform::ViewportUnlock.apply(&mut doc, None).unwrap();
        let after_once = doc.attribute(meta, "content").unwrap().to_string();
        let writes_once = doc.stats().attribute_writes;

        BuiltinTransform::ViewportUnlock.apply(&mut doc, None).unwrap();
        assert_eq!(doc.attribute(meta, "content"), Some(after_once.as_str()));
        assert_eq!(doc.stats().attribute_writes, writes_once);
    }

    #[test]
    fn test_unrestricted_viewport_is_left_alone() {
        let (mut doc, meta) = doc_with_viewport("width=device-width, initial-scale=0.5");
        BuiltinTransform::ViewportUnlock.apply(&mut doc, None).unwrap();
        assert_eq!(
            doc.attribute(meta, "content"),
            Some("width=device-width, initial-scale=0.5")
        );
    }

    #[test]
    fn test_dynamic_viewport_unlock_scans_inserted_subtree() {
        let mut doc = Document::new();
        let wrapper = doc.create_element("div");
        let meta = doc.create_element("meta");
        doc.set_attribute(meta, "name", "viewport");
        doc.set_attribute(meta, "content", "user-scalable=0");
        doc.append_child(wrapper, meta);
        doc.append_child(doc.root(), wrapper);

        BuiltinTransform::ViewportUnlockDynamic
            .apply(&mut doc, Some(wrapper))
            .unwrap();
        assert_eq!(doc.attribute(meta, "content"), Some(UNLOCKED_VIEWPORT));
    }

    #[test]
    fn test_normalize_document_rewrites_all_text() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        let a = doc.create_text("Ｈｅｌｌｏ");
        let b = doc.create_text("ﬁle");
        doc.append_child(doc.root(), div);
        doc.append_child(div, a);
        doc.append_child(div, b);

        BuiltinTransform::NormalizeDocument.apply(&mut doc, None).unwrap();
        assert_eq!(doc.text_content(a), Some("Hello"));
        assert_eq!(doc.text_content(b), Some("file"));
    }

    #[test]
    fn test_normalized_text_causes_zero_writes() {
        let mut doc = Document::new();
        let text = doc.create_text("already plain");
        doc.append_child(doc.root(), text);
        doc.take_mutations();

        BuiltinTransform::NormalizeDocument.apply(&mut doc, None).unwrap();
        assert_eq!(doc.stats().character_data_writes, 0);
        // No write means no secondary character-data record either.
        assert!(doc.take_mutations().is_empty());
    }

    #[test]
    fn test_added_text_node_is_normalized_directly() {
        let mut doc = Document::new();
        let text = doc.create_text("ﬁﬂ");
        doc.append_child(doc.root(), text);

        BuiltinTransform::NormalizeAddedNode
            .apply(&mut doc, Some(text))
            .unwrap();
        assert_eq!(doc.text_content(text), Some("fifl"));
    }

    #[test]
    fn test_node_scoped_transform_requires_node() {
        let mut doc = Document::new();
        let err = BuiltinTransform::NormalizeAddedNode
            .apply(&mut doc, None)
            .unwrap_err();
        assert!(matches!(err, ModuleError::MissingNode));
    }
}
