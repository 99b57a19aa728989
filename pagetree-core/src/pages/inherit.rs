//! Pushing inheritable page attributes down to the leaves
//!
//! `/Resources`, `/MediaBox`, `/CropBox` and `/Rotate` may be set on any
//! `/Pages` node and apply to every page below it unless the page overrides
//! them (ISO 32000-1 §7.7.3.4). Before the tree is flattened those values
//! must be copied onto the pages, otherwise they would be lost along with the
//! intermediate nodes.

use super::walk::{walk_page_tree, TreeEvent};
use super::PageTreeOptions;
use crate::error::Result;
use crate::objects::{Dictionary, ObjectId, ObjectStore};
use tracing::debug;

/// Keys a page inherits from its ancestors.
pub const INHERITABLE_KEYS: [&str; 4] = ["Resources", "MediaBox", "CropBox", "Rotate"];

/// Moves inherited attributes from `/Pages` nodes onto `/Page` leaves.
///
/// Flattening calls this exactly once, after the tree has been validated and
/// before any `/Kids` or `/Parent` entry is rewritten.
pub trait InheritancePusher {
    /// Copy every inherited attribute onto the pages below `pages_root`.
    ///
    /// Pages keep their own values; the nearest ancestor wins otherwise. With
    /// `remove_from_ancestors` the attributes are also dropped from the
    /// `/Pages` nodes so that no value is stored twice.
    fn push_inherited_attributes(
        &self,
        store: &mut ObjectStore,
        pages_root: ObjectId,
        options: &PageTreeOptions,
        remove_from_ancestors: bool,
    ) -> Result<()>;
}

/// The standard pusher for [`INHERITABLE_KEYS`].
#[derive(Debug, Default, Clone, Copy)]
pub struct InheritedAttributes;

impl InheritancePusher for InheritedAttributes {
    fn push_inherited_attributes(
        &self,
        store: &mut ObjectStore,
        pages_root: ObjectId,
        options: &PageTreeOptions,
        remove_from_ancestors: bool,
    ) -> Result<()> {
        let mut inherited: Vec<Dictionary> = Vec::new();
        let mut assignments: Vec<(ObjectId, Dictionary)> = Vec::new();
        let mut interior: Vec<ObjectId> = Vec::new();

        {
            let store: &ObjectStore = store;
            walk_page_tree(store, pages_root, options.max_depth, |event| {
                match event {
                    TreeEvent::EnterPages(id) => {
                        let node = store.get_dict(id)?;
                        let mut merged = inherited.last().cloned().unwrap_or_default();
                        for key in INHERITABLE_KEYS {
                            if let Some(value) = node.get(key) {
                                merged.set(key, value.clone());
                            }
                        }
                        inherited.push(merged);
                        interior.push(id);
                    }
                    TreeEvent::LeavePages(_) => {
                        inherited.pop();
                    }
                    TreeEvent::Page(id) => {
                        if let Some(attrs) = inherited.last().filter(|attrs| !attrs.is_empty()) {
                            assignments.push((id, attrs.clone()));
                        }
                    }
                }
                Ok(())
            })?;
        }

        let mut pushed = 0usize;
        for (id, attrs) in assignments {
            let page = store.get_dict_mut(id)?;
            for (key, value) in attrs.entries() {
                if !page.contains_key(key) {
                    page.set(key.clone(), value.clone());
                    pushed += 1;
                }
            }
        }

        if remove_from_ancestors {
            for id in interior {
                let node = store.get_dict_mut(id)?;
                for key in INHERITABLE_KEYS {
                    node.remove(key);
                }
            }
        }

        debug!(
            "Pushed {} inherited attribute values onto pages under {}",
            pushed, pages_root
        );
        Ok(())
    }
}
