//! In-memory table of indirect objects
//!
//! The store owns every indirect object of a document and hands out new
//! identities when direct objects are promoted. It knows nothing about page
//! trees beyond the single "is this a page" check that page operations need.

use crate::error::{PdfError, Result};
use crate::objects::{Dictionary, Object, ObjectId};
use std::collections::HashMap;

/// Reference chains longer than this are treated as unresolvable.
const MAX_REFERENCE_CHAIN: usize = 32;

#[derive(Debug, Clone, Default)]
pub struct ObjectStore {
    objects: HashMap<ObjectId, Object>,
    /// One past the highest object number in use. Wider than `u32` so that
    /// running out of numbers is visible instead of wrapping onto `u32::MAX`.
    next_number: u64,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            next_number: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Store `object` under an explicit identity, replacing whatever was there.
    pub fn insert(&mut self, id: ObjectId, object: impl Into<Object>) -> Option<Object> {
        self.next_number = self.next_number.max(u64::from(id.number()) + 1);
        self.objects.insert(id, object.into())
    }

    /// Store `object` as a new indirect object and return its identity.
    ///
    /// Fails with [`PdfError::ObjectNumbersExhausted`] once object number
    /// `u32::MAX` is taken; existing objects are never overwritten.
    pub fn add_object(&mut self, object: impl Into<Object>) -> Result<ObjectId> {
        let number = u32::try_from(self.next_number.max(1))
            .map_err(|_| PdfError::ObjectNumbersExhausted)?;
        let id = ObjectId::new(number, 0);
        self.insert(id, object);
        Ok(id)
    }

    /// Identity of `object`, promoting it to an indirect object first if needed.
    pub fn make_indirect(&mut self, object: Object) -> Result<ObjectId> {
        match object {
            Object::Reference(id) => Ok(id),
            direct => self.add_object(direct),
        }
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<Object> {
        self.objects.remove(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &ObjectId> {
        self.objects.keys()
    }

    /// Follow references until a direct object is reached.
    ///
    /// Dangling references and overly long chains resolve to `None`.
    pub fn resolve<'a>(&'a self, object: &'a Object) -> Option<&'a Object> {
        let mut current = object;
        for _ in 0..MAX_REFERENCE_CHAIN {
            match current {
                Object::Reference(id) => current = self.objects.get(id)?,
                direct => return Some(direct),
            }
        }
        None
    }

    pub fn get_dict(&self, id: ObjectId) -> Result<&Dictionary> {
        let object = self
            .objects
            .get(&id)
            .ok_or(PdfError::InvalidObjectReference(id))?;
        object.as_dict().ok_or_else(|| PdfError::TypeMismatch {
            context: format!("object {id}"),
            expected: "Dictionary",
            found: object.type_name(),
        })
    }

    pub fn get_dict_mut(&mut self, id: ObjectId) -> Result<&mut Dictionary> {
        let object = self
            .objects
            .get_mut(&id)
            .ok_or(PdfError::InvalidObjectReference(id))?;
        let found = object.type_name();
        object.as_dict_mut().ok_or_else(|| PdfError::TypeMismatch {
            context: format!("object {id}"),
            expected: "Dictionary",
            found,
        })
    }

    /// Whether `object` is a `/Type /Page` dictionary or a reference to one.
    ///
    /// Only a single reference is followed: a reference to a reference is not
    /// a page handle, since the page would not have the identity it was named by.
    pub fn is_page(&self, object: &Object) -> bool {
        let target = match object {
            Object::Reference(id) => self.get(*id),
            direct => Some(direct),
        };
        target
            .and_then(Object::as_dict)
            .and_then(Dictionary::get_type)
            == Some("Page")
    }

    /// Fail with [`PdfError::NotAPage`] unless `object` is a page dictionary.
    pub fn assert_page(&self, object: &Object) -> Result<()> {
        if self.is_page(object) {
            return Ok(());
        }

        let description = match object {
            Object::Reference(id) => match self.get(*id) {
                Some(target) => format!("object {id} is a {}", describe(target)),
                None => format!("object {id} does not exist"),
            },
            direct => format!("direct {}", describe(direct)),
        };
        Err(PdfError::NotAPage(description))
    }
}

fn describe(object: &Object) -> String {
    match object.as_dict().map(Dictionary::get_type) {
        Some(Some(name)) => format!("/{name} dictionary"),
        Some(None) => "dictionary without /Type".to_string(),
        None => object.type_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_dict() -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::name("Page"));
        dict
    }

    #[test]
    fn test_add_object_allocates_increasing_numbers() {
        let mut store = ObjectStore::new();
        let first = store.add_object(Object::Null).unwrap();
        let second = store.add_object(Object::Integer(1)).unwrap();

        assert_eq!(first, ObjectId::new(1, 0));
        assert_eq!(second, ObjectId::new(2, 0));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_insert_bumps_allocator_past_explicit_ids() {
        let mut store = ObjectStore::new();
        store.insert(ObjectId::new(40, 3), Object::Null);

        let next = store.add_object(Object::Null).unwrap();
        assert_eq!(next, ObjectId::new(41, 0));
    }

    #[test]
    fn test_add_object_never_reuses_highest_number() {
        let mut store = ObjectStore::new();
        let last = ObjectId::new(u32::MAX, 0);
        store.insert(last, Object::Integer(42));

        assert_eq!(
            store.add_object(Object::Null).unwrap_err(),
            PdfError::ObjectNumbersExhausted
        );
        assert_eq!(
            store.make_indirect(Object::Dictionary(page_dict())).unwrap_err(),
            PdfError::ObjectNumbersExhausted
        );
        assert_eq!(store.get(last), Some(&Object::Integer(42)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_add_object_up_to_highest_number() {
        let mut store = ObjectStore::new();
        store.insert(ObjectId::new(u32::MAX - 1, 0), Object::Null);

        let id = store.add_object(Object::Integer(1)).unwrap();
        assert_eq!(id, ObjectId::new(u32::MAX, 0));
        assert!(store.add_object(Object::Integer(2)).is_err());
    }

    #[test]
    fn test_make_indirect() {
        let mut store = ObjectStore::new();
        let existing = store.add_object(page_dict()).unwrap();

        assert_eq!(store.make_indirect(Object::Reference(existing)).unwrap(), existing);
        assert_eq!(store.len(), 1);

        let promoted = store.make_indirect(Object::Dictionary(page_dict())).unwrap();
        assert_ne!(promoted, existing);
        assert!(store.is_page(&Object::Reference(promoted)));
    }

    #[test]
    fn test_resolve_follows_chains() {
        let mut store = ObjectStore::new();
        let target = store.add_object(Object::Integer(7)).unwrap();
        let hop = store.add_object(Object::Reference(target)).unwrap();

        let start = Object::Reference(hop);
        assert_eq!(store.resolve(&start), Some(&Object::Integer(7)));
        assert_eq!(
            store.resolve(&Object::Reference(ObjectId::new(99, 0))),
            None
        );
    }

    #[test]
    fn test_resolve_self_reference_terminates() {
        let mut store = ObjectStore::new();
        let id = ObjectId::new(1, 0);
        store.insert(id, Object::Reference(id));

        assert_eq!(store.resolve(&Object::Reference(id)), None);
    }

    #[test]
    fn test_get_dict_errors() {
        let mut store = ObjectStore::new();
        let int_id = store.add_object(Object::Integer(3)).unwrap();

        match store.get_dict(int_id) {
            Err(PdfError::TypeMismatch {
                expected, found, ..
            }) => {
                assert_eq!(expected, "Dictionary");
                assert_eq!(found, "Integer");
            }
            other => panic!("Expected TypeMismatch, got {other:?}"),
        }

        let missing = ObjectId::new(50, 0);
        assert_eq!(
            store.get_dict_mut(missing).unwrap_err(),
            PdfError::InvalidObjectReference(missing)
        );
    }

    #[test]
    fn test_assert_page() {
        let mut store = ObjectStore::new();
        let page = store.add_object(page_dict()).unwrap();
        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::name("Catalog"));
        let catalog = store.add_object(catalog).unwrap();

        assert!(store.assert_page(&Object::Reference(page)).is_ok());
        assert!(store.assert_page(&Object::Dictionary(page_dict())).is_ok());

        let err = store.assert_page(&Object::Reference(catalog)).unwrap_err();
        assert!(err.to_string().contains("/Catalog dictionary"), "{err}");

        let err = store
            .assert_page(&Object::Reference(ObjectId::new(77, 0)))
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"), "{err}");

        let err = store.assert_page(&Object::Integer(1)).unwrap_err();
        assert_eq!(err, PdfError::NotAPage("direct Integer".to_string()));
    }

    #[test]
    fn test_reference_chain_is_not_a_page() {
        let mut store = ObjectStore::new();
        let page = store.add_object(page_dict()).unwrap();
        let hop = store.add_object(Object::Reference(page)).unwrap();

        assert!(!store.is_page(&Object::Reference(hop)));
        let err = store.assert_page(&Object::Reference(hop)).unwrap_err();
        assert_eq!(
            err,
            PdfError::NotAPage(format!("object {hop} is a Reference"))
        );
    }
}
