//! Iterative page tree traversal
//!
//! Walks `/Pages` and `/Page` nodes in document order (pre-order, left to
//! right) with an explicit stack, so untrusted nesting can't exhaust the call
//! stack. A `/Pages` node that shows up among its own ancestors is a loop and
//! is reported as damage. The same node reached along two unrelated paths is
//! not a loop; its leaves are simply produced twice and left for the caller
//! to judge.

use crate::error::{PdfError, Result};
use crate::objects::{Object, ObjectId, ObjectStore};
use std::collections::HashSet;
use tracing::trace;

/// What the walker found at each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TreeEvent {
    /// About to visit the kids of a `/Pages` node.
    EnterPages(ObjectId),
    /// Finished the kids of a `/Pages` node.
    LeavePages(ObjectId),
    /// A `/Page` leaf.
    Page(ObjectId),
}

enum NodeKind {
    Pages(Vec<Object>),
    Page,
}

struct Frame {
    node: ObjectId,
    kids: Vec<Object>,
    next: usize,
}

/// Every leaf under `root`, in document order.
pub(crate) fn collect_pages(
    store: &ObjectStore,
    root: ObjectId,
    max_depth: usize,
) -> Result<Vec<ObjectId>> {
    let mut pages = Vec::new();
    walk_page_tree(store, root, max_depth, |event| {
        if let TreeEvent::Page(id) = event {
            pages.push(id);
        }
        Ok(())
    })?;
    Ok(pages)
}

pub(crate) fn walk_page_tree<F>(
    store: &ObjectStore,
    root: ObjectId,
    max_depth: usize,
    mut visit: F,
) -> Result<()>
where
    F: FnMut(TreeEvent) -> Result<()>,
{
    let mut stack: Vec<Frame> = Vec::new();
    let mut ancestors: HashSet<ObjectId> = HashSet::new();

    descend(store, root, max_depth, &mut stack, &mut ancestors, &mut visit)?;

    while let Some(frame) = stack.last_mut() {
        let next = frame.kids.get(frame.next).cloned();
        let parent = frame.node;
        frame.next += 1;

        match next {
            Some(kid) => {
                let kid = kid.as_reference().ok_or_else(|| {
                    PdfError::damaged(
                        parent,
                        format!("/Kids contains a direct {} instead of a reference", kid.type_name()),
                    )
                })?;
                descend(store, kid, max_depth, &mut stack, &mut ancestors, &mut visit)?;
            }
            None => {
                stack.pop();
                ancestors.remove(&parent);
                visit(TreeEvent::LeavePages(parent))?;
            }
        }
    }

    Ok(())
}

fn descend<F>(
    store: &ObjectStore,
    id: ObjectId,
    max_depth: usize,
    stack: &mut Vec<Frame>,
    ancestors: &mut HashSet<ObjectId>,
    visit: &mut F,
) -> Result<()>
where
    F: FnMut(TreeEvent) -> Result<()>,
{
    match node_kind(store, id)? {
        NodeKind::Page => {
            trace!("page tree leaf {}", id);
            visit(TreeEvent::Page(id))
        }
        NodeKind::Pages(kids) => {
            if !ancestors.insert(id) {
                return Err(PdfError::damaged(id, "loop detected in page tree"));
            }
            if stack.len() >= max_depth {
                return Err(PdfError::damaged(
                    id,
                    format!("page tree nested deeper than {max_depth} levels"),
                ));
            }
            trace!("page tree node {} with {} kids", id, kids.len());
            visit(TreeEvent::EnterPages(id))?;
            stack.push(Frame {
                node: id,
                kids,
                next: 0,
            });
            Ok(())
        }
    }
}

fn node_kind(store: &ObjectStore, id: ObjectId) -> Result<NodeKind> {
    let dict = match store.get(id) {
        Some(Object::Dictionary(dict)) => dict,
        Some(other) => {
            return Err(PdfError::damaged(
                id,
                format!("page tree node is a {} rather than a dictionary", other.type_name()),
            ))
        }
        None => return Err(PdfError::damaged(id, "page tree node does not exist")),
    };

    match dict.get_type() {
        Some("Pages") => {
            let kids = match dict.get("Kids").map(|kids| store.resolve(kids)) {
                None => Vec::new(),
                Some(Some(Object::Array(kids))) => kids.clone(),
                Some(other) => {
                    return Err(PdfError::damaged(
                        id,
                        format!(
                            "/Kids is {} rather than an array",
                            other.map_or("unresolvable", Object::type_name)
                        ),
                    ))
                }
            };
            Ok(NodeKind::Pages(kids))
        }
        Some("Page") => Ok(NodeKind::Page),
        Some(other) => Err(PdfError::damaged(
            id,
            format!("invalid Type /{other} in page tree"),
        )),
        None => Err(PdfError::damaged(id, "invalid Type (none) in page tree")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Dictionary;

    fn pages_node(kids: &[ObjectId]) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::name("Pages"));
        dict.set(
            "Kids",
            kids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
        );
        dict.set("Count", kids.len() as i64);
        dict
    }

    fn page_node() -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::name("Page"));
        dict
    }

    fn id(number: u32) -> ObjectId {
        ObjectId::new(number, 0)
    }

    /// 1: root [2, 5]; 2: pages [3, 4]; 3, 4, 5: pages leaves
    fn nested_store() -> ObjectStore {
        let mut store = ObjectStore::new();
        store.insert(id(1), pages_node(&[id(2), id(5)]));
        store.insert(id(2), pages_node(&[id(3), id(4)]));
        store.insert(id(3), page_node());
        store.insert(id(4), page_node());
        store.insert(id(5), page_node());
        store
    }

    #[test]
    fn test_collect_pages_preorder() {
        let store = nested_store();
        let pages = collect_pages(&store, id(1), 16).unwrap();
        assert_eq!(pages, vec![id(3), id(4), id(5)]);
    }

    #[test]
    fn test_walk_event_order() {
        let store = nested_store();
        let mut events = Vec::new();
        walk_page_tree(&store, id(1), 16, |event| {
            events.push(event);
            Ok(())
        })
        .unwrap();

        assert_eq!(
            events,
            vec![
                TreeEvent::EnterPages(id(1)),
                TreeEvent::EnterPages(id(2)),
                TreeEvent::Page(id(3)),
                TreeEvent::Page(id(4)),
                TreeEvent::LeavePages(id(2)),
                TreeEvent::Page(id(5)),
                TreeEvent::LeavePages(id(1)),
            ]
        );
    }

    #[test]
    fn test_invalid_type_reports_name() {
        let mut store = nested_store();
        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::name("Catalog"));
        store.insert(id(4), catalog);

        let err = collect_pages(&store, id(1), 16).unwrap_err();
        match err {
            PdfError::DamagedPageTree {
                description,
                message,
            } => {
                assert_eq!(description, "object 4 0 R");
                assert_eq!(message, "invalid Type /Catalog in page tree");
            }
            other => panic!("Expected DamagedPageTree, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_type_is_damage() {
        let mut store = nested_store();
        store.insert(id(5), Dictionary::new());

        let err = collect_pages(&store, id(1), 16).unwrap_err();
        assert!(err.to_string().contains("invalid Type (none)"), "{err}");
    }

    #[test]
    fn test_dangling_kid_is_damage() {
        let mut store = nested_store();
        store.remove(id(3));

        let err = collect_pages(&store, id(1), 16).unwrap_err();
        assert!(err.to_string().contains("does not exist"), "{err}");
    }

    #[test]
    fn test_direct_kid_is_damage() {
        let mut store = nested_store();
        let mut root = pages_node(&[id(2)]);
        root.set("Kids", vec![Object::Dictionary(page_node())]);
        store.insert(id(1), root);

        let err = collect_pages(&store, id(1), 16).unwrap_err();
        assert!(err.to_string().contains("direct Dictionary"), "{err}");
    }

    #[test]
    fn test_missing_kids_is_empty() {
        let mut store = ObjectStore::new();
        let mut root = Dictionary::new();
        root.set("Type", Object::name("Pages"));
        store.insert(id(1), root);

        assert!(collect_pages(&store, id(1), 16).unwrap().is_empty());
    }

    #[test]
    fn test_indirect_kids_array() {
        let mut store = nested_store();
        let kids = store
            .add_object(vec![Object::Reference(id(5)), Object::Reference(id(3))])
            .unwrap();
        let mut root = pages_node(&[]);
        root.set("Kids", kids);
        store.insert(id(1), root);

        let pages = collect_pages(&store, id(1), 16).unwrap();
        assert_eq!(pages, vec![id(5), id(3)]);
    }

    #[test]
    fn test_non_array_kids_is_damage() {
        let mut store = nested_store();
        let mut root = pages_node(&[]);
        root.set("Kids", 3);
        store.insert(id(1), root);

        let err = collect_pages(&store, id(1), 16).unwrap_err();
        assert!(err.to_string().contains("/Kids is Integer"), "{err}");
    }

    #[test]
    fn test_cycle_is_detected() {
        let mut store = nested_store();
        // 2 now also points back at the root
        store.insert(id(2), pages_node(&[id(3), id(1)]));

        let err = collect_pages(&store, id(1), 16).unwrap_err();
        assert!(err.to_string().contains("loop detected"), "{err}");
    }

    #[test]
    fn test_shared_subtree_is_not_a_cycle() {
        let mut store = nested_store();
        store.insert(id(1), pages_node(&[id(2), id(2)]));

        let pages = collect_pages(&store, id(1), 16).unwrap();
        assert_eq!(pages, vec![id(3), id(4), id(3), id(4)]);
    }

    #[test]
    fn test_depth_limit() {
        let store = nested_store();
        assert!(collect_pages(&store, id(1), 2).is_ok());

        let err = collect_pages(&store, id(1), 1).unwrap_err();
        assert!(err.to_string().contains("deeper than 1"), "{err}");
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let mut store = ObjectStore::new();
        let depth = 10_000u32;
        for n in 1..depth {
            store.insert(id(n), pages_node(&[id(n + 1)]));
        }
        store.insert(id(depth), page_node());

        let pages = collect_pages(&store, id(1), depth as usize).unwrap();
        assert_eq!(pages, vec![id(depth)]);
    }

    #[test]
    fn test_root_may_be_a_single_page() {
        let mut store = ObjectStore::new();
        store.insert(id(1), page_node());

        assert_eq!(collect_pages(&store, id(1), 4).unwrap(), vec![id(1)]);
    }
}
