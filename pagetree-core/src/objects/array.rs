use crate::objects::{Object, ObjectId};

/// An array detached from the object graph while it is being built or spliced.
///
/// `/Kids` edits take the array out of its dictionary, splice it here and put
/// it back with [`Object::from`]. Out-of-range positions are reported instead
/// of panicking, so a stale position can never tear the array.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Array {
    elements: Vec<Object>,
}

impl Array {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Object> {
        self.elements.get(index)
    }

    /// The reference held at `index`, if that element is indirect.
    pub fn reference_at(&self, index: usize) -> Option<ObjectId> {
        self.get(index).and_then(Object::as_reference)
    }

    /// Splice `object` in at `index` (0 ..= len). Returns `false`, leaving the
    /// array untouched, when `index` is past the end.
    pub fn insert_at(&mut self, index: usize, object: impl Into<Object>) -> bool {
        if index > self.elements.len() {
            return false;
        }
        self.elements.insert(index, object.into());
        true
    }

    /// Take out the element at `index`, shifting later elements forward.
    pub fn erase_at(&mut self, index: usize) -> Option<Object> {
        (index < self.elements.len()).then(|| self.elements.remove(index))
    }

    pub(crate) fn into_inner(self) -> Vec<Object> {
        self.elements
    }
}

impl From<Vec<Object>> for Array {
    fn from(elements: Vec<Object>) -> Self {
        Self { elements }
    }
}

impl FromIterator<Object> for Array {
    fn from_iter<T: IntoIterator<Item = Object>>(iter: T) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}
