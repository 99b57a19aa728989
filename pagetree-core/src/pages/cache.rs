//! Flat page list and page-to-position index
//!
//! `PagesCache` holds the two derived views of the page tree. Neither view is
//! authoritative on its own; the operations in [`crate::pages`] are the only
//! code that changes them, and always together with the tree.

use crate::error::{PdfError, Result};
use crate::objects::ObjectId;
use std::collections::HashMap;

/// Map from page identity to its position in document order.
///
/// Two insertion modes exist: [`PositionIndex::insert_unique`] refuses to
/// overwrite and is used whenever a new identity enters the index, while
/// [`PositionIndex::assign`] overwrites and is used when existing pages shift.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionIndex {
    positions: HashMap<ObjectId, usize>,
}

impl PositionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: HashMap::with_capacity(capacity),
        }
    }

    /// Build an index for `pages`, failing on the first repeated identity.
    pub fn from_pages(pages: &[ObjectId]) -> Result<Self> {
        let mut index = Self::with_capacity(pages.len());
        for (pos, id) in pages.iter().enumerate() {
            index.insert_unique(*id, pos)?;
        }
        Ok(index)
    }

    pub fn get(&self, id: ObjectId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.positions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Record `id` at `pos`; an identity that is already indexed is a duplicate page reference.
    pub fn insert_unique(&mut self, id: ObjectId, pos: usize) -> Result<()> {
        match self.positions.get(&id) {
            Some(_) => Err(PdfError::DuplicatePageReference { id, position: pos }),
            None => {
                self.positions.insert(id, pos);
                Ok(())
            }
        }
    }

    /// Record `id` at `pos`, replacing any previous position.
    pub fn assign(&mut self, id: ObjectId, pos: usize) {
        self.positions.insert(id, pos);
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<usize> {
        self.positions.remove(&id)
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, usize)> + '_ {
        self.positions.iter().map(|(id, pos)| (*id, *pos))
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PagesCache {
    /// `None` until enumerated; `Some(vec![])` for a document without pages.
    all_pages: Option<Vec<ObjectId>>,
    index: PositionIndex,
    flattened: bool,
}

impl PagesCache {
    pub(crate) fn is_populated(&self) -> bool {
        self.all_pages.is_some()
    }

    pub(crate) fn is_flattened(&self) -> bool {
        self.flattened
    }

    pub(crate) fn populate(&mut self, pages: Vec<ObjectId>) {
        self.all_pages = Some(pages);
    }

    pub(crate) fn pages(&self) -> &[ObjectId] {
        self.all_pages.as_deref().unwrap_or(&[])
    }

    pub(crate) fn len(&self) -> usize {
        self.pages().len()
    }

    pub(crate) fn index(&self) -> &PositionIndex {
        &self.index
    }

    /// Install an index built for the current page list and mark the tree flat.
    pub(crate) fn commit_index(&mut self, index: PositionIndex) {
        debug_assert_eq!(index.len(), self.len());
        self.index = index;
        self.flattened = true;
    }

    pub(crate) fn clear(&mut self) {
        self.all_pages = None;
        self.index.clear();
        self.flattened = false;
    }

    /// Splice `id` in at `pos` and shift the positions of every later page.
    pub(crate) fn insert(&mut self, pos: usize, id: ObjectId) -> Result<()> {
        let pages = self.all_pages.get_or_insert_with(Vec::new);
        pages.insert(pos, id);
        for (i, page) in pages.iter().enumerate().skip(pos + 1) {
            self.index.assign(*page, i);
        }
        self.index.insert_unique(id, pos)
    }

    /// Remove the page at `pos` and pull every later page one position forward.
    pub(crate) fn remove(&mut self, pos: usize) -> ObjectId {
        let pages = self.all_pages.get_or_insert_with(Vec::new);
        let id = pages.remove(pos);
        self.index.remove(id);
        for (i, page) in pages.iter().enumerate().skip(pos) {
            self.index.assign(*page, i);
        }
        id
    }
}
