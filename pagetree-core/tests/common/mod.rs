//! Shared builders for page tree integration tests

#![allow(dead_code)]

use pdf_pagetree::{Dictionary, Document, Object, ObjectId, ObjectStore};
use std::sync::Once;

static INIT: Once = Once::new();

/// Route `tracing` output through the test harness. Set `RUST_LOG=debug` to see it.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Shape of a page tree to build: a leaf or an interior node with kids.
#[derive(Debug, Clone)]
pub enum Node {
    Page,
    Pages(Vec<Node>),
}

impl Node {
    pub fn leaves(&self) -> usize {
        match self {
            Node::Page => 1,
            Node::Pages(kids) => kids.iter().map(Node::leaves).sum(),
        }
    }
}

/// A document whose catalog is 1 0 R and whose tree follows `root`.
///
/// Returns the document and the page identities in document order.
pub fn build_document(root: &Node) -> (Document, Vec<ObjectId>) {
    let mut store = ObjectStore::new();
    let catalog_id = ObjectId::new(1, 0);
    store.insert(catalog_id, Object::Null);

    let mut pages = Vec::new();
    let root_id = build_node(&mut store, root, None, &mut pages);

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::name("Catalog"));
    catalog.set("Pages", Object::Reference(root_id));
    store.insert(catalog_id, catalog);

    (Document::from_store(store, catalog_id), pages)
}

fn build_node(
    store: &mut ObjectStore,
    node: &Node,
    parent: Option<ObjectId>,
    pages: &mut Vec<ObjectId>,
) -> ObjectId {
    let id = store.add_object(Object::Null).unwrap();
    let mut dict = Dictionary::new();
    if let Some(parent) = parent {
        dict.set("Parent", Object::Reference(parent));
    }

    match node {
        Node::Page => {
            dict.set("Type", Object::name("Page"));
            pages.push(id);
        }
        Node::Pages(kids) => {
            let kid_ids: Vec<Object> = kids
                .iter()
                .map(|kid| Object::Reference(build_node(store, kid, Some(id), pages)))
                .collect();
            dict.set("Type", Object::name("Pages"));
            dict.set("Kids", kid_ids);
            dict.set("Count", node.leaves() as i64);
        }
    }

    store.insert(id, dict);
    id
}

/// Root with `n` pages split evenly over interior nodes of `fanout` kids.
pub fn balanced(n: usize, fanout: usize) -> Node {
    let mut level: Vec<Node> = (0..n).map(|_| Node::Page).collect();
    while level.len() > fanout {
        level = level
            .chunks(fanout)
            .map(|chunk| Node::Pages(chunk.to_vec()))
            .collect();
    }
    Node::Pages(level)
}

/// A fresh indirect page not yet in any tree.
pub fn stray_page(doc: &mut Document) -> Object {
    let page = pdf_pagetree::pages::new_page_dictionary([0.0, 0.0, 612.0, 792.0]);
    Object::Reference(doc.store_mut().add_object(page).unwrap())
}

pub fn root_count(doc: &Document) -> Option<i64> {
    let root = doc.pages_root().ok()?;
    doc.store().get_dict(root).ok()?.get_integer("Count")
}
