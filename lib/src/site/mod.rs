//! The site description and its assembly into a WXR document.

mod config;
mod generator;

pub use config::*;
pub use generator::*;
