use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::config::load_json;
use crate::error::GopError;
use crate::pipeline::traits::ContextTree;
use crate::types::{PdfId, PhoneContext, PhoneId, SubStateClass};

/// One leaf of the flattened tree. A missing `left`/`right` matches any neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TreeEntry {
    #[serde(default)]
    pub left: Option<PhoneId>,
    pub center: PhoneId,
    #[serde(default)]
    pub right: Option<PhoneId>,
    pub pdf_class: SubStateClass,
    pub pdf: PdfId,
}

#[derive(Debug, Deserialize)]
struct RawContextTree {
    context_width: usize,
    central_position: usize,
    entries: Vec<TreeEntry>,
}

type LeafKey = (Option<PhoneId>, PhoneId, Option<PhoneId>, SubStateClass);

/// Context tree flattened into a lookup table.
///
/// Lookup prefers the full triphone, then left-only, then right-only, then the bare
/// center phone.
#[derive(Debug, Clone)]
pub struct TableContextTree {
    context_width: usize,
    central_position: usize,
    leaves: HashMap<LeafKey, PdfId>,
}

impl TableContextTree {
    pub fn new(
        context_width: usize,
        central_position: usize,
        entries: Vec<TreeEntry>,
    ) -> Result<Self, GopError> {
        let mut leaves = HashMap::with_capacity(entries.len());
        for e in entries {
            let key = (e.left, e.center, e.right, e.pdf_class);
            if leaves.insert(key, e.pdf).is_some() {
                return Err(GopError::configuration(format!(
                    "duplicate context tree leaf for ({:?}, {}, {:?}) class {}",
                    e.left, e.center, e.right, e.pdf_class
                )));
            }
        }
        Ok(Self {
            context_width,
            central_position,
            leaves,
        })
    }

    /// Tree of the standard triphone shape.
    pub fn triphone(entries: Vec<TreeEntry>) -> Result<Self, GopError> {
        Self::new(
            PhoneContext::WIDTH,
            PhoneContext::CENTER_POSITION,
            entries,
        )
    }

    pub fn load(path: &Path) -> Result<Self, GopError> {
        let raw: RawContextTree = load_json(path, "read context tree", "parse context tree")?;
        Self::new(raw.context_width, raw.central_position, raw.entries)
    }

    pub fn num_leaves(&self) -> usize {
        self.leaves.len()
    }
}

impl ContextTree for TableContextTree {
    fn context_width(&self) -> usize {
        self.context_width
    }

    fn central_position(&self) -> usize {
        self.central_position
    }

    fn compute(&self, phone_window: &[PhoneId], pdf_class: SubStateClass) -> Option<PdfId> {
        let &[left, center, right] = phone_window else {
            return None;
        };
        [
            (Some(left), Some(right)),
            (Some(left), None),
            (None, Some(right)),
            (None, None),
        ]
        .into_iter()
        .find_map(|(l, r)| self.leaves.get(&(l, center, r, pdf_class)).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(left: Option<PhoneId>, center: PhoneId, right: Option<PhoneId>, pdf: PdfId) -> TreeEntry {
        TreeEntry {
            left,
            center,
            right,
            pdf_class: 0,
            pdf,
        }
    }

    #[test]
    fn exact_triphone_wins_over_wildcards() {
        let tree = TableContextTree::triphone(vec![
            leaf(None, 2, None, 10),
            leaf(Some(1), 2, None, 11),
            leaf(Some(1), 2, Some(3), 12),
        ])
        .expect("tree");
        assert_eq!(tree.compute(&[1, 2, 3], 0), Some(12));
        assert_eq!(tree.compute(&[1, 2, 4], 0), Some(11));
        assert_eq!(tree.compute(&[5, 2, 3], 0), Some(10));
    }

    #[test]
    fn unseen_center_or_class_is_unresolved() {
        let tree = TableContextTree::triphone(vec![leaf(None, 2, None, 10)]).expect("tree");
        assert_eq!(tree.compute(&[1, 3, 1], 0), None);
        assert_eq!(tree.compute(&[1, 2, 1], 1), None);
        assert_eq!(tree.compute(&[1, 2], 0), None);
    }

    #[test]
    fn rejects_duplicate_leaves() {
        let result =
            TableContextTree::triphone(vec![leaf(None, 2, None, 10), leaf(None, 2, None, 11)]);
        assert!(matches!(result, Err(GopError::Configuration { .. })));
    }

    #[test]
    fn load_keeps_declared_shape() {
        let path = std::env::temp_dir().join("dnn_gop_context_tree.json");
        let json = r#"{
            "context_width": 1,
            "central_position": 0,
            "entries": [{"center": 2, "pdf_class": 0, "pdf": 4}]
        }"#;
        std::fs::write(&path, json).expect("write tree");
        let tree = TableContextTree::load(&path).expect("load tree");
        assert_eq!(tree.context_width(), 1);
        assert_eq!(tree.central_position(), 0);
        assert_eq!(tree.num_leaves(), 1);
        let _ = std::fs::remove_file(&path);
    }
}
