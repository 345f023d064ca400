//! Bridgecheck
//!
//! Two smoke checks for the link bridge service and its landing page:
//!
//! - **API probe**: one GET against `/api/bridge` and a verdict on the JSON
//!   it returns (see [`probe`]).
//! - **Background renderer**: an HTML page with an embedded background image
//!   and web fonts, rendered in headless Chrome and saved as a PNG (see
//!   [`render`]).
//!
//! # Example
//!
//! ```no_run
//! use bridgecheck::{probe, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     base_url: "http://localhost:3005".to_string(),
//!     timeout_ms: 15000,
//!     ..Default::default()
//! };
//!
//! let report = probe::probe(&config)?;
//! println!("{}", report.verdict.message());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

pub mod error;
pub use error::{Error, Result};

pub mod document;
pub mod probe;
pub mod render;

// Chrome DevTools Protocol backend for the renderer
#[cfg(feature = "cdp")]
pub mod cdp;

// Async-friendly wrappers (worker-thread backed)
pub mod async_api;

pub use probe::{HealthReport, HealthVerdict, ProbeReport, Verdict};
pub use render::{RenderOutcome, RenderReport};

/// Configuration shared by the probe and the renderer
///
/// Every value the checks used to hardcode lives here so they can be pointed
/// at mock servers and temporary directories. The defaults reproduce the
/// usual smoke-test setup against a local dev server.
///
/// # Examples
///
/// ```
/// let cfg = bridgecheck::Config::default();
/// assert_eq!(cfg.base_url, "http://localhost:3005");
/// assert_eq!(cfg.timeout_ms, 15000);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the service under test
    pub base_url: String,
    /// Timeout for the probe request in milliseconds
    pub timeout_ms: u64,
    /// Upper bound on waiting for the rendered page to become ready
    pub ready_timeout_ms: u64,
    /// Background image embedded into the rendered page
    pub image_path: PathBuf,
    /// Where the screenshot is written
    pub output_path: PathBuf,
    /// Query parameters sent to `/api/bridge`
    pub bridge: BridgeParams,
    /// Browser window size
    pub viewport: Viewport,
    /// Extra delay after the document is ready, before capturing
    pub settle_ms: u64,
    /// Heading text rendered over the background
    pub heading: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3005".to_string(),
            timeout_ms: 15000,
            ready_timeout_ms: 30000,
            image_path: PathBuf::from("public/background.jpg"),
            output_path: PathBuf::from("public/debug_screenshot.png"),
            bridge: BridgeParams::default(),
            viewport: Viewport::default(),
            settle_ms: 500,
            heading: "BACKGROUND TEST".to_string(),
        }
    }
}

impl Config {
    /// Check everything both checks depend on.
    pub fn validate(&self) -> Result<()> {
        self.validate_probe()?;
        self.validate_render()
    }

    /// Check the settings the HTTP requests use (`base_url`, `timeout_ms`).
    pub fn validate_probe(&self) -> Result<()> {
        let base = url::Url::parse(&self.base_url)
            .map_err(|e| Error::ConfigError(format!("base_url '{}' is not a URL: {}", self.base_url, e)))?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(Error::ConfigError(format!(
                "base_url must be http or https, got '{}'",
                base.scheme()
            )));
        }
        if self.timeout_ms == 0 {
            return Err(Error::ConfigError("timeout_ms must be greater than zero".into()));
        }
        Ok(())
    }

    /// Check the settings the renderer uses. The HTTP settings are ignored.
    pub fn validate_render(&self) -> Result<()> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(Error::ConfigError(format!(
                "viewport must be non-empty, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        Ok(())
    }
}

/// Query parameters of a bridge request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BridgeParams {
    /// Provider API token
    pub api: String,
    /// Destination URL to shorten
    pub url: String,
    /// Shortener provider endpoint
    pub provider: String,
}

impl Default for BridgeParams {
    fn default() -> Self {
        Self {
            api: "21aaeb55bffd061323a98157ceb6057e31cc3392".to_string(),
            url: "https://example.com".to_string(),
            provider: "https://gplinks.com/api".to_string(),
        }
    }
}

impl BridgeParams {
    /// Query pairs in wire order.
    pub fn pairs(&self) -> [(&'static str, &str); 3] {
        [
            ("api", self.api.as_str()),
            ("url", self.url.as_str()),
            ("provider", self.provider.as_str()),
        ]
    }
}

impl fmt::Display for BridgeParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{'api': '{}', 'url': '{}', 'provider': '{}'}}",
            self.api, self.url, self.provider
        )
    }
}

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// A page renderer that can show a document and capture it
///
/// Backends own an external resource (a browser process); `close` releases
/// it. Callers normally go through [`render::with_renderer`], which closes the
/// renderer on every exit path.
pub trait Renderer {
    /// Replace the page content with `html` and wait for it to be ready
    fn set_content(&mut self, html: &str) -> Result<()>;

    /// Capture the current page as PNG bytes
    fn render_png(&self) -> Result<Vec<u8>>;

    /// OS process backing this renderer, if any
    fn process_id(&self) -> Option<u32> {
        None
    }

    /// Release the renderer and everything it holds
    fn close(self) -> Result<()>;
}
