//! Page rendering and extraction
//!
//! The rendering capability (an external headless browser, or the bundled
//! HTTP fetcher) is consumed through the [`Renderer`] trait; the
//! [`Extractor`] turns its output into the persisted page shape while
//! honoring page-level robots directives.

mod client;
mod directives;
mod extract;

pub use client::{extract_anchor_targets, HttpRenderer, RenderError, RenderedPage, Renderer};
pub use directives::Directives;
pub use extract::{Extractor, PageExtract};
