//! WordPress eXtended RSS: the document model, a writer and a reader for
//! checking what was written.

mod document;
mod writer;
mod reader;
mod slash;

pub use document::*;
pub use writer::{write, to_string, cdata_sections};
pub use reader::*;
pub use slash::*;
