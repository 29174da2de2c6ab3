//! Resilient DOT diagram rendering via remote services.
//!
//! This crate turns Graphviz DOT documents into stored image files by
//! calling remote rendering services over HTTP:
//! - [`DiagramRenderer`]: single-document, single-file and directory-batch rendering
//! - [`RenderBackend`]: remote backend descriptors, tried in list order until one succeeds
//! - [`is_dot_document`]: cheap DOT detection applied before any network call
//!
//! Public rendering operations never fail with an error: every failure
//! mode degrades to a `false` return or an omitted batch entry, with
//! diagnostic detail going to `tracing`. Install a subscriber to see it.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use dotrelay_render::DiagramRenderer;
//!
//! let renderer = DiagramRenderer::new();
//! let ok = renderer.render_to_file("digraph G { A -> B; }", Path::new("out/g.png"), "png");
//! ```

mod backend;
mod consts;
mod dot;
mod http;
mod service;

pub use backend::{HttpMethod, RenderBackend, default_backends};
pub use dot::is_dot_document;
pub use service::{DiagramRenderer, render_document, render_document_file};
