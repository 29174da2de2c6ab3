//! Rendering backend descriptors.

use crate::consts::QUICKCHART_URL;

/// HTTP method used to transmit a document to a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    /// Document and format sent as query parameters.
    #[default]
    Get,
    /// Document and format sent as form fields in the request body.
    Post,
}

impl HttpMethod {
    /// Parse method from a configuration token.
    ///
    /// Returns None if the token is not a supported method.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "get" => Some(Self::Get),
            "post" => Some(Self::Post),
            _ => None,
        }
    }

    /// Return method as string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
        }
    }
}

/// One remote rendering backend.
///
/// Backends are configured once at renderer construction and tried in
/// list order for every render request; order encodes a fixed preference.
#[derive(Debug, Clone)]
pub struct RenderBackend {
    /// Human-readable identifier, used only for diagnostics.
    pub name: String,
    /// URL of the remote rendering API.
    pub endpoint: String,
    /// How the document is transmitted.
    pub method: HttpMethod,
    /// Parameter or field name under which the document text is sent.
    pub document_param: String,
}

impl RenderBackend {
    /// The QuickChart Graphviz rendering service.
    #[must_use]
    pub fn quickchart() -> Self {
        Self {
            name: "QuickChart Graphviz".to_owned(),
            endpoint: QUICKCHART_URL.to_owned(),
            method: HttpMethod::Get,
            document_param: "graph".to_owned(),
        }
    }
}

/// Built-in backend preference list.
#[must_use]
pub fn default_backends() -> Vec<RenderBackend> {
    vec![RenderBackend::quickchart()]
}
