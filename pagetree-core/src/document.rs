use crate::error::{PdfError, Result};
use crate::objects::{Dictionary, Object, ObjectId, ObjectStore};
use crate::pages::cache::PagesCache;
use crate::pages::{InheritancePusher, InheritedAttributes, PageTreeOptions};

/// A PDF object graph together with the page bookkeeping derived from it.
///
/// The document owns its [`ObjectStore`] and the catalog identity. Page
/// operations (see [`crate::pages`]) keep the root `/Pages` node, the flat
/// page list and the page index consistent with each other.
///
/// # Example
///
/// ```rust
/// use pdf_pagetree::{Document, Object};
/// use pdf_pagetree::pages::new_page_dictionary;
///
/// # fn main() -> pdf_pagetree::Result<()> {
/// let mut doc = Document::new();
/// let first = doc.add_page(Object::Dictionary(new_page_dictionary([0.0, 0.0, 612.0, 792.0])), false)?;
/// let second = doc.add_page(Object::Dictionary(new_page_dictionary([0.0, 0.0, 595.0, 842.0])), true)?;
///
/// assert_eq!(doc.pages()?, &[second, first]);
/// assert_eq!(doc.find_page_by_id(first)?, 1);
/// # Ok(())
/// # }
/// ```
pub struct Document {
    pub(crate) store: ObjectStore,
    pub(crate) catalog: ObjectId,
    pub(crate) pages_cache: PagesCache,
    pub(crate) options: PageTreeOptions,
    pub(crate) pusher: Box<dyn InheritancePusher>,
}

impl Document {
    /// Creates a document with a catalog (1 0 R) and an empty page tree (2 0 R).
    pub fn new() -> Self {
        let catalog = ObjectId::new(1, 0);
        let pages_root = ObjectId::new(2, 0);

        let mut catalog_dict = Dictionary::new();
        catalog_dict.set("Type", Object::name("Catalog"));
        catalog_dict.set("Pages", Object::Reference(pages_root));

        let mut pages_dict = Dictionary::new();
        pages_dict.set("Type", Object::name("Pages"));
        pages_dict.set("Kids", Vec::<Object>::new());
        pages_dict.set("Count", 0);

        let mut store = ObjectStore::new();
        store.insert(catalog, catalog_dict);
        store.insert(pages_root, pages_dict);

        Self::from_store(store, catalog)
    }

    /// Adopt an existing object graph whose catalog is `catalog`.
    ///
    /// Nothing is validated here; the page tree is read lazily on first use.
    pub fn from_store(store: ObjectStore, catalog: ObjectId) -> Self {
        Self {
            store,
            catalog,
            pages_cache: PagesCache::default(),
            options: PageTreeOptions::default(),
            pusher: Box::new(InheritedAttributes),
        }
    }

    pub fn with_options(mut self, options: PageTreeOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the component that pushes inherited attributes during flattening.
    pub fn with_inheritance_pusher(mut self, pusher: impl InheritancePusher + 'static) -> Self {
        self.pusher = Box::new(pusher);
        self
    }

    pub fn options(&self) -> &PageTreeOptions {
        &self.options
    }

    pub fn catalog(&self) -> ObjectId {
        self.catalog
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    /// Direct access to the object graph.
    ///
    /// Edits to the page tree made through this handle are not seen by the
    /// page cache; call [`Document::update_pages_cache`] afterwards.
    pub fn store_mut(&mut self) -> &mut ObjectStore {
        &mut self.store
    }

    /// Identity of the root `/Pages` node named by the catalog.
    pub fn pages_root(&self) -> Result<ObjectId> {
        self.store
            .get_dict(self.catalog)?
            .get_reference("Pages")
            .ok_or(PdfError::MissingPagesRoot)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
