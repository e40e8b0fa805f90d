//! A toolkit for assembling WordPress imports of Elementor sites.
//!
//! # Overview
//!
//! A site is described in YAML, TOML or JSON as a list of pages, each a list
//! of typed sections (`hero`, `services`, `team` and so on). `wxrkit` turns
//! that description into a WordPress eXtended RSS document whose pages carry
//! their Elementor layout in the `_elementor_data` post meta:
//!
//! ```text
//!   site.yaml ──► SiteConfig ──► Generator ──► Build ──► wxr::write ──► site.xml
//!                                   │  ▲
//!               section builders ◄──┘  └── Library (existing Elementor export)
//! ```
//!
//! Section builders prefer to reuse a matching section from a template
//! [`Library`](elementor::Library), so the output keeps the theme's styling;
//! only content settings are overwritten. Without a template the section is
//! built from scratch with default Cholot widget settings.
//!
//! The pieces are usable on their own:
//!
//!   * [`elementor`] models the page tree, hands out element ids, indexes
//!     template libraries and checks trees for structural mistakes.
//!   * [`sections`] builds one Elementor section per section description.
//!   * [`templating`] renders `{{ .. }}` placeholders in built trees.
//!   * [`wxr`] writes and reads WXR documents.
//!   * [`site`] ties it all together.

#[macro_use]
pub mod error;
pub mod util;
pub mod format;
pub mod elementor;
pub mod sections;
pub mod templating;
pub mod wxr;
pub mod site;

pub use serde_json;
pub use rayon;
