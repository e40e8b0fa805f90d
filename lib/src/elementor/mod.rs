//! The Elementor page tree: sections, columns and widgets, plus the tools
//! to identify, re-identify and sanity check them.

mod element;
mod ids;
mod library;
mod check;

pub use element::*;
pub use ids::*;
pub use library::*;
pub use check::*;
