//! Rich-text content
//!
//! Parses the JSON documents authored in the CMS editor and renders them to
//! HTML that can be embedded as-is.

mod renderer;
mod types;

pub use renderer::{plain_text, render, render_json, render_or_empty, IMAGE_BASE_CLASS};
pub use types::{
    CodeBlockAttrs, HeadingAttrs, ImageAlignment, ImageAttrs, ImageSize, Mark, Node, RenderError,
};
