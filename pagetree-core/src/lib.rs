//! # pdf-pagetree
//!
//! Page tree bookkeeping for PDF documents held in memory.
//!
//! ## Features
//!
//! - **Page Enumeration**: Walk `/Pages` trees of any depth without recursion
//! - **Flattening**: Collapse nested trees so every page is a direct kid of the root
//! - **Inherited Attributes**: Push `/Resources`, `/MediaBox`, `/CropBox` and `/Rotate` onto the pages
//! - **Page Editing**: Insert, remove, move and look up pages by position
//! - **Damage Detection**: Loops, foreign nodes, duplicate pages and bad `/Count` values are reported, not followed
//!
//! ## Quick Start
//!
//! ```rust
//! use pdf_pagetree::{Document, Object, Result};
//! use pdf_pagetree::pages::new_page_dictionary;
//!
//! # fn main() -> Result<()> {
//! let mut doc = Document::new();
//!
//! // Add three letter-sized pages
//! let mut pages = Vec::new();
//! for _ in 0..3 {
//!     let page = new_page_dictionary([0.0, 0.0, 612.0, 792.0]);
//!     pages.push(doc.add_page(Object::Dictionary(page), false)?);
//! }
//!
//! // Move the last page to the front
//! doc.move_page(&Object::Reference(pages[2]), 0)?;
//! assert_eq!(doc.get_page(0)?, pages[2]);
//!
//! // Drop the middle one
//! doc.remove_page(&Object::Reference(pages[0]))?;
//! assert_eq!(doc.page_count()?, 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Working with an existing object graph
//!
//! Build an [`ObjectStore`], point [`Document::from_store`] at the catalog and
//! the page tree is read lazily the first time it is needed. Edits made
//! directly through [`Document::store_mut`] are not tracked; call
//! [`Document::update_pages_cache`] afterwards.

pub mod document;
pub mod error;
pub mod objects;
pub mod pages;

pub use document::Document;
pub use error::{ErrorCategory, PdfError, Result};
pub use objects::{Array, Dictionary, Object, ObjectId, ObjectStore};
pub use pages::{InheritancePusher, InheritedAttributes, PageTreeOptions, PositionIndex};

/// Current version of pdf-pagetree
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
