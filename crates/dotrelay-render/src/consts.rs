//! Internal constants for diagram rendering.

use std::time::Duration;

/// Default HTTP timeout for rendering requests (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// QuickChart Graphviz rendering endpoint.
pub const QUICKCHART_URL: &str = "https://quickchart.io/graphviz";
