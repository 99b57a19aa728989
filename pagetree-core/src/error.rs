use crate::objects::ObjectId;
use thiserror::Error;

/// Broad classes of failure, used by callers that only need to know who is at fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The document's page tree is damaged.
    DamagedPdf,
    /// A page operation was asked to do something the page tree can't honor.
    Pages,
    /// The object graph doesn't have the shape an operation expects.
    Object,
    /// Tree, page cache and page index disagree. Never caused by a bad argument.
    Internal,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PdfError {
    #[error("Damaged page tree ({description}): {message}")]
    DamagedPageTree { description: String, message: String },

    #[error("Damaged document: catalog has no /Pages reference")]
    MissingPagesRoot,

    #[error(
        "Duplicate page reference found at page {position} (numbered from zero), object {id}; \
         this would cause loss of data"
    )]
    DuplicatePageReference { id: ObjectId, position: usize },

    #[error("Page object {0} not referenced in /Pages tree")]
    PageNotFound(ObjectId),

    #[error("Not a page object: {0}")]
    NotAPage(String),

    #[error("Invalid page position {position} (document has {count} pages)")]
    InvalidPagePosition { position: usize, count: usize },

    #[error("Invalid object reference: {0}")]
    InvalidObjectReference(ObjectId),

    #[error("No object numbers left: object {} is already in use", u32::MAX)]
    ObjectNumbersExhausted,

    #[error("Invalid object type for {context}: expected {expected}, found {found}")]
    TypeMismatch {
        context: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Internal invariant violated: {0}")]
    InvariantViolation(String),
}

impl PdfError {
    pub(crate) fn damaged(id: ObjectId, message: impl Into<String>) -> Self {
        PdfError::DamagedPageTree {
            description: format!("object {id}"),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            PdfError::DamagedPageTree { .. } | PdfError::MissingPagesRoot => {
                ErrorCategory::DamagedPdf
            }
            PdfError::DuplicatePageReference { .. }
            | PdfError::PageNotFound(_)
            | PdfError::NotAPage(_)
            | PdfError::InvalidPagePosition { .. } => ErrorCategory::Pages,
            PdfError::InvalidObjectReference(_)
            | PdfError::ObjectNumbersExhausted
            | PdfError::TypeMismatch { .. } => ErrorCategory::Object,
            PdfError::InvariantViolation(_) => ErrorCategory::Internal,
        }
    }

    /// True for failures that point at a bug rather than at the input.
    pub fn is_internal(&self) -> bool {
        self.category() == ErrorCategory::Internal
    }
}

pub type Result<T> = std::result::Result<T, PdfError>;
