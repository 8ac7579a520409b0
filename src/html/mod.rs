//! HTML processing module
//!
//! Post-processing for rendered rich-text HTML. Uses lol_html for
//! streaming rewriting.

mod image_sources;

pub use image_sources::{rewrite_image_sources, RewriteError};
