//! Rendering of the deliverable artifacts: the HTML quote sheet and its
//! scannable payload.

pub mod document;
pub mod qr;

pub use document::render_quote_html;
pub use qr::QrError;
