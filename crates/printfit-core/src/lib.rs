//! Print-ready recomposition of annotated documents.
//!
//! Refits every page of a PDF onto a fixed physical page size so documents
//! assembled from mixed sources print predictably, and drives the host's
//! print/export actions over the result.

pub mod compose;
pub mod error;
pub mod layout;
pub mod print;

pub use compose::build_print_ready;
pub use error::ComposeError;
pub use layout::{PageSize, Placement};
pub use print::{download_document, preview_uri, print_document, PrintHost};
