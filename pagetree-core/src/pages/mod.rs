//! Page tree cache and page mutation
//!
//! A [`Document`] keeps three views of its pages in step:
//!
//! - the page tree in the object graph (root `/Pages` node, `/Kids`, `/Count`),
//! - a flat list of page identities in document order ([`Document::pages`]),
//! - an index from page identity to position.
//!
//! Reading the page list only enumerates the tree. The first mutation (or
//! position lookup) flattens the tree: inherited attributes are pushed onto
//! the pages and every page becomes a direct kid of the root. From then on
//! every insert or removal is a splice of `/Kids`, the list and the index.
//!
//! Code that edits the tree behind the document's back must call
//! [`Document::update_pages_cache`] before using these operations again.

pub(crate) mod cache;
mod inherit;
mod options;
mod walk;


pub use cache::PositionIndex;
pub use inherit::{InheritancePusher, InheritedAttributes, INHERITABLE_KEYS};
pub use options::PageTreeOptions;

use crate::document::Document;
use crate::error::{PdfError, Result};
use crate::objects::{Array, Dictionary, Object, ObjectId};
use tracing::{debug, warn};

/// A fresh `/Page` dictionary with the given media box, not yet part of any tree.
pub fn new_page_dictionary(media_box: [f64; 4]) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::name("Page"));
    dict.set(
        "MediaBox",
        media_box.iter().map(|v| Object::Real(*v)).collect::<Array>(),
    );
    dict
}

impl Document {
    /// All pages in document order, enumerating the tree if needed.
    ///
    /// On failure nothing is cached and the next call walks the tree again.
    pub fn pages(&mut self) -> Result<&[ObjectId]> {
        if !self.pages_cache.is_populated() {
            let root = self.pages_root()?;
            let pages = walk::collect_pages(&self.store, root, self.options.max_depth)?;
            debug!("Enumerated {} pages under {}", pages.len(), root);
            self.pages_cache.populate(pages);
        }
        Ok(self.pages_cache.pages())
    }

    pub fn page_count(&mut self) -> Result<usize> {
        Ok(self.pages()?.len())
    }

    /// Identity of the page at `index` (zero based).
    pub fn get_page(&mut self, index: usize) -> Result<ObjectId> {
        let pages = self.pages()?;
        pages
            .get(index)
            .copied()
            .ok_or(PdfError::InvalidPagePosition {
                position: index,
                count: pages.len(),
            })
    }

    /// Throw away the page list and index and enumerate the tree again.
    ///
    /// The index is rebuilt lazily by the next operation that needs it.
    pub fn update_pages_cache(&mut self) -> Result<&[ObjectId]> {
        self.pages_cache.clear();
        self.pages()
    }

    pub fn is_pages_flattened(&self) -> bool {
        self.pages_cache.is_flattened()
    }

    /// Push inherited attributes onto every page without flattening.
    pub fn push_inherited_attributes_to_pages(&mut self, remove_from_ancestors: bool) -> Result<()> {
        let root = self.pages_root()?;
        self.pusher
            .push_inherited_attributes(&mut self.store, root, &self.options, remove_from_ancestors)
    }

    /// Collapse the page tree so every page is a direct kid of the root.
    ///
    /// Does nothing once the tree is flat. All checks run before the object
    /// graph is touched, so a failure leaves the tree, the page list and the
    /// index as they were.
    pub fn flatten_pages_tree(&mut self) -> Result<()> {
        if self.pages_cache.is_flattened() {
            return Ok(());
        }

        let root = self.pages_root()?;
        let pages = self.pages()?.to_vec();

        let root_dict = self.store.get_dict(root)?;
        if root_dict.get_type() != Some("Pages") {
            return Err(PdfError::damaged(
                root,
                "page tree root is not a /Pages node",
            ));
        }

        let index = PositionIndex::from_pages(&pages)?;

        let count = root_dict.get_integer("Count");
        if count != Some(pages.len() as i64) {
            if !self.options.repair_count {
                return Err(PdfError::InvariantViolation(format!(
                    "/Count of {} is {:?} but the tree holds {} pages",
                    root,
                    count,
                    pages.len()
                )));
            }
            warn!(
                "Repairing /Count of {}: {:?} -> {}",
                root,
                count,
                pages.len()
            );
        }

        if self.options.push_inherited {
            self.pusher
                .push_inherited_attributes(&mut self.store, root, &self.options, true)?;
        }

        for id in &pages {
            self.store
                .get_dict_mut(*id)?
                .set("Parent", Object::Reference(root));
        }

        let kids: Array = pages.iter().map(|id| Object::Reference(*id)).collect();
        let root_dict = self.store.get_dict_mut(root)?;
        root_dict.set("Kids", kids);
        root_dict.set("Count", pages.len() as i64);

        self.pages_cache.commit_index(index);
        debug!("Flattened page tree under {} ({} pages)", root, pages.len());
        Ok(())
    }

    /// Position of `page`, which must be a page object.
    pub fn find_page(&mut self, page: &Object) -> Result<usize> {
        self.store.assert_page(page)?;
        // Direct objects have no identity and can't be in the tree
        let id = page.as_reference().unwrap_or(ObjectId::new(0, 0));
        self.find_page_by_id(id)
    }

    pub fn find_page_by_id(&mut self, id: ObjectId) -> Result<usize> {
        self.flatten_pages_tree()?;
        self.pages_cache
            .index()
            .get(id)
            .ok_or(PdfError::PageNotFound(id))
    }

    /// Insert `page` so that it ends up at position `pos` (0 ..= page count).
    ///
    /// A direct page dictionary is stored as a new indirect object first.
    /// Returns the identity the page has in the tree.
    pub fn insert_page(&mut self, page: Object, pos: usize) -> Result<ObjectId> {
        self.store.assert_page(&page)?;
        self.flatten_pages_tree()?;

        let count = self.pages_cache.len();
        if pos > count {
            return Err(PdfError::InvalidPagePosition {
                position: pos,
                count,
            });
        }
        if let Some(id) = page.as_reference() {
            if let Some(position) = self.pages_cache.index().get(id) {
                return Err(PdfError::DuplicatePageReference { id, position });
            }
        }

        let root = self.pages_root()?;
        let id = self.store.make_indirect(page)?;
        self.store
            .get_dict_mut(id)?
            .set("Parent", Object::Reference(root));

        let npages = splice_root_kids(self.store.get_dict_mut(root)?, root, |kids| {
            kids.insert_at(pos, Object::Reference(id))
        })?;

        self.pages_cache.insert(pos, id)?;
        debug_assert_eq!(self.pages_cache.len(), npages);
        debug_assert_eq!(self.pages_cache.index().len(), npages);
        debug!("Inserted page {} at position {} of {}", id, pos, npages);
        Ok(id)
    }

    /// Remove `page` from the tree. The page object itself stays in the store.
    pub fn remove_page(&mut self, page: &Object) -> Result<()> {
        let pos = self.find_page(page)?;
        let root = self.pages_root()?;

        let npages = splice_root_kids(self.store.get_dict_mut(root)?, root, |kids| {
            kids.erase_at(pos).is_some()
        })?;

        let removed = self.pages_cache.remove(pos);
        debug_assert_eq!(page.as_reference(), Some(removed));
        debug_assert_eq!(self.pages_cache.len(), npages);
        debug_assert_eq!(self.pages_cache.index().len(), npages);
        debug!("Removed page {} from position {}", removed, pos);
        Ok(())
    }

    /// Insert `page` immediately before or after `refpage`.
    pub fn add_page_at(&mut self, page: Object, before: bool, refpage: &Object) -> Result<ObjectId> {
        let mut pos = self.find_page(refpage)?;
        if !before {
            pos += 1;
        }
        self.insert_page(page, pos)
    }

    /// Insert `page` as the first or the last page.
    pub fn add_page(&mut self, page: Object, first: bool) -> Result<ObjectId> {
        let pos = if first { 0 } else { self.page_count()? };
        self.insert_page(page, pos)
    }

    /// Move `page` so that it ends up at `new_pos` (0 .. page count).
    pub fn move_page(&mut self, page: &Object, new_pos: usize) -> Result<()> {
        let pos = self.find_page(page)?;
        let count = self.pages_cache.len();
        if new_pos >= count {
            return Err(PdfError::InvalidPagePosition {
                position: new_pos,
                count,
            });
        }
        if pos == new_pos {
            return Ok(());
        }

        let id = self.pages_cache.pages()[pos];
        self.remove_page(page)?;
        self.insert_page(Object::Reference(id), new_pos)?;
        Ok(())
    }

    /// Check that the tree, the page list and the index agree.
    ///
    /// An unpopulated cache is trivially consistent. A populated one must
    /// match a fresh enumeration; a flattened one must also match the root
    /// `/Kids` and `/Count`, every page's `/Parent`, and the index.
    pub fn verify_pages_cache(&self) -> Result<()> {
        if !self.pages_cache.is_populated() {
            return Ok(());
        }

        let root = self.pages_root()?;
        let cached = self.pages_cache.pages();
        let fresh = walk::collect_pages(&self.store, root, self.options.max_depth)?;
        if fresh != cached {
            return Err(PdfError::InvariantViolation(format!(
                "page cache holds {} pages but the tree enumerates {}",
                cached.len(),
                fresh.len()
            )));
        }

        if !self.pages_cache.is_flattened() {
            return Ok(());
        }

        let root_dict = self.store.get_dict(root)?;
        let kids: Array = root_dict
            .get("Kids")
            .and_then(Object::as_array)
            .map(|kids| Array::from(kids.clone()))
            .unwrap_or_default();
        let matches = cached
            .iter()
            .enumerate()
            .all(|(pos, id)| kids.reference_at(pos) == Some(*id));
        if kids.len() != cached.len() || !matches {
            return Err(PdfError::InvariantViolation(format!(
                "/Kids of {root} is not the flat list of cached pages"
            )));
        }
        if root_dict.get_integer("Count") != Some(cached.len() as i64) {
            return Err(PdfError::InvariantViolation(format!(
                "/Count of {} does not match {} cached pages",
                root,
                cached.len()
            )));
        }

        let index = self.pages_cache.index();
        if index.len() != cached.len() {
            return Err(PdfError::InvariantViolation(format!(
                "page index holds {} entries for {} pages",
                index.len(),
                cached.len()
            )));
        }

        for (pos, id) in cached.iter().enumerate() {
            if index.get(*id) != Some(pos) {
                return Err(PdfError::InvariantViolation(format!(
                    "page {id} is at position {pos} but indexed at {:?}",
                    index.get(*id)
                )));
            }
            if self.store.get_dict(*id)?.get_reference("Parent") != Some(root) {
                return Err(PdfError::InvariantViolation(format!(
                    "page {id} does not point back at {root}"
                )));
            }
        }

        Ok(())
    }
}

/// Splice the root `/Kids` with `edit` and set `/Count` to the new length.
///
/// `edit` returns `false` when the position it was given is outside the
/// array; `/Kids` is then written back unchanged and the disagreement with
/// the page cache is reported.
fn splice_root_kids(
    root_dict: &mut Dictionary,
    root: ObjectId,
    edit: impl FnOnce(&mut Array) -> bool,
) -> Result<usize> {
    let mut kids = match root_dict.remove("Kids") {
        Some(Object::Array(kids)) => Array::from(kids),
        other => {
            let found = other.as_ref().map_or("Null", Object::type_name);
            if let Some(other) = other {
                root_dict.set("Kids", other);
            }
            return Err(PdfError::TypeMismatch {
                context: format!("/Kids of {root}"),
                expected: "Array",
                found,
            });
        }
    };

    let spliced = edit(&mut kids);
    let npages = kids.len();
    root_dict.set("Kids", kids);
    root_dict.set("Count", npages as i64);

    if !spliced {
        return Err(PdfError::InvariantViolation(format!(
            "/Kids of {root} no longer matches the page cache"
        )));
    }
    Ok(npages)
}
