// src/extract/mod.rs
// =============================================================================
// Document parsers: turn a fetched file's bytes into a list of `Candidate`
// links the driver can run through the admission filter.
// =============================================================================

pub mod css;
pub mod html;

pub use css::extract_css;
pub use html::extract_html;
