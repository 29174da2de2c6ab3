//! Diagram rendering service with multi-backend fallback.
//!
//! [`DiagramRenderer`] turns Graphviz DOT text into a stored image file,
//! tolerating failures of any individual remote backend by falling
//! through to the next configured one. Backends are tried strictly in
//! sequence with no retry of the same backend and no state carried
//! across calls.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ureq::Agent;

use crate::backend::{HttpMethod, RenderBackend, default_backends};
use crate::consts::DEFAULT_TIMEOUT;
use crate::dot::is_dot_document;
use crate::http::{create_agent, send_render_request};

/// Diagram rendering service.
///
/// Stateless apart from its configured backend list and timeout; calls
/// are independent and a shared renderer is safe to use from multiple
/// threads.
pub struct DiagramRenderer {
    backends: Vec<RenderBackend>,
    agent: Agent,
}

impl Default for DiagramRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagramRenderer {
    /// Create a renderer with the built-in backend list and default timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            backends: default_backends(),
            agent: create_agent(DEFAULT_TIMEOUT),
        }
    }

    /// Set the HTTP timeout applied to every backend request.
    ///
    /// Default is 30 seconds. A single value applies uniformly to every
    /// backend attempt; there is no per-backend override.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.agent = create_agent(timeout);
        self
    }

    /// Replace the backend preference list.
    ///
    /// Backends are tried in list order on every render request.
    #[must_use]
    pub fn backends(mut self, backends: Vec<RenderBackend>) -> Self {
        self.backends = backends;
        self
    }

    /// Create a renderer from resolved configuration.
    #[must_use]
    pub fn from_config(config: &dotrelay_config::Config) -> Self {
        let render = &config.render_resolved;
        let backends = render
            .backends
            .iter()
            .map(|entry| RenderBackend {
                name: entry.name.clone(),
                endpoint: entry.endpoint.clone(),
                method: match entry.method {
                    dotrelay_config::Method::Get => HttpMethod::Get,
                    dotrelay_config::Method::Post => HttpMethod::Post,
                },
                document_param: entry.document_param.clone(),
            })
            .collect();

        Self {
            backends,
            agent: create_agent(render.timeout),
        }
    }

    /// Render DOT text to an image file.
    ///
    /// Tries each configured backend in order and writes the first
    /// successful response to `dest`, creating parent directories as
    /// needed. Returns false when every backend fails; nothing is
    /// written in that case and a pre-existing file at `dest` is left
    /// untouched.
    pub fn render_to_file(&self, document: &str, dest: &Path, format: &str) -> bool {
        for backend in &self.backends {
            tracing::debug!(backend = %backend.name, "Attempting render");

            let data = match send_render_request(&self.agent, backend, document, format) {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!(backend = %backend.name, error = %e, "Render attempt failed");
                    continue;
                }
            };

            if let Err(e) = write_image(dest, &data) {
                tracing::warn!(
                    backend = %backend.name,
                    path = %dest.display(),
                    error = %e,
                    "Failed to write rendered image"
                );
                continue;
            }

            tracing::info!(backend = %backend.name, path = %dest.display(), "Rendered diagram");
            return true;
        }

        tracing::error!(path = %dest.display(), "All rendering backends failed");
        false
    }

    /// Render a DOT file to an image.
    ///
    /// When `dest` is omitted the destination is derived by replacing
    /// the source extension with `.{format}`. A missing or unreadable
    /// source, or content that fails the DOT sniff, logs an error and
    /// returns false without any network attempt.
    pub fn render_file(&self, source: &Path, dest: Option<&Path>, format: &str) -> bool {
        if !source.exists() {
            tracing::error!(path = %source.display(), "DOT file not found");
            return false;
        }

        let derived;
        let dest = match dest {
            Some(path) => path,
            None => {
                derived = source.with_extension(format);
                &derived
            }
        };

        let content = match std::fs::read_to_string(source) {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(path = %source.display(), error = %e, "Failed to read DOT file");
                return false;
            }
        };

        if !is_dot_document(&content) {
            tracing::error!(path = %source.display(), "Content does not look like a DOT document");
            return false;
        }

        self.render_to_file(&content, dest, format)
    }

    /// Render every DOT file in a directory.
    ///
    /// Enumerates files matching `pattern` (shell-glob semantics) under
    /// `dir`. Files that cannot be read or fail the DOT sniff are
    /// skipped and do not appear in the result at all; each attempted
    /// file gets one entry mapping its path to the render outcome, with
    /// the destination derived from the source path. Files are processed
    /// strictly one at a time.
    pub fn render_directory(
        &self,
        dir: &Path,
        pattern: &str,
        format: &str,
    ) -> HashMap<PathBuf, bool> {
        let mut results = HashMap::new();

        if !dir.exists() {
            tracing::error!(path = %dir.display(), "Directory not found");
            return results;
        }

        let candidates = collect_dot_files(dir, pattern);
        tracing::info!(count = candidates.len(), path = %dir.display(), "Found DOT files to render");

        for path in candidates {
            tracing::info!(path = %path.display(), "Rendering diagram");
            let success = self.render_file(&path, None, format);
            results.insert(path, success);
        }

        results
    }
}

/// Enumerate files under `dir` matching `pattern` whose content passes
/// the DOT sniff. Unreadable files are skipped silently.
fn collect_dot_files(dir: &Path, pattern: &str) -> Vec<PathBuf> {
    let full_pattern = dir.join(pattern);
    let Some(full_pattern) = full_pattern.to_str() else {
        tracing::error!(path = %dir.display(), "Directory path is not valid UTF-8");
        return Vec::new();
    };

    let entries = match glob::glob(full_pattern) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!(pattern = %full_pattern, error = %e, "Invalid glob pattern");
            return Vec::new();
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        let Ok(path) = entry else { continue };
        if !path.is_file() {
            continue;
        }
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        if is_dot_document(&content) {
            files.push(path);
        }
    }
    files
}

/// Write image bytes to `dest`, creating parent directories as needed.
fn write_image(dest: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = dest.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(dest, data)
}

/// Render DOT text with a default renderer.
pub fn render_document(document: &str, dest: &Path, format: &str) -> bool {
    DiagramRenderer::new().render_to_file(document, dest, format)
}

/// Render a DOT file with a default renderer.
pub fn render_document_file(source: &Path, dest: Option<&Path>, format: &str) -> bool {
    DiagramRenderer::new().render_file(source, dest, format)
}
