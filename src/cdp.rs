//! Chrome DevTools Protocol renderer (uses the `headless_chrome` crate)

use crate::{Config, Error, Renderer, Result};
use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions};
use log::{debug, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

// Resolves once every <img> has decoded (or failed to), then reports readyState.
const READY_SCRIPT: &str = r#"(async function() {
    await Promise.all(Array.from(document.images, function(img) {
        return img.decode().catch(function() { return null; });
    }));
    return document.readyState;
})()"#;

/// Headless Chrome with a single blank tab.
///
/// The browser process lives as long as this value; dropping it (or calling
/// `close`) terminates Chrome.
pub struct CdpRenderer {
    browser: Browser,
    tab: Arc<Tab>,
    ready_timeout: Duration,
    settle: Duration,
}

impl CdpRenderer {
    /// Launch Chrome sized to the configured viewport and open one tab.
    pub fn launch(config: &Config) -> Result<Self> {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((config.viewport.width, config.viewport.height)))
            .build()
            .map_err(|e| Error::InitializationError(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::InitializationError(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::InitializationError(format!("Failed to create tab: {}", e)))?;

        Ok(Self {
            browser,
            tab,
            ready_timeout: Duration::from_millis(config.ready_timeout_ms),
            settle: Duration::from_millis(config.settle_ms),
        })
    }

    fn main_frame_id(&self) -> Result<String> {
        let tree = self.tab.call_method(Page::GetFrameTree(None))?;
        Ok(tree.frame_tree.frame.id)
    }

    // Waits for images and readyState. Running out of time is not fatal: the
    // page is captured in whatever state it reached.
    fn wait_until_ready(&self) {
        let deadline = Instant::now() + self.ready_timeout;
        while Instant::now() < deadline {
            match self.tab.evaluate(READY_SCRIPT, true) {
                Ok(obj) => {
                    if obj.value.as_ref().and_then(|v| v.as_str()) == Some("complete") {
                        return;
                    }
                }
                Err(e) => debug!("Readiness check failed: {}", e),
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        warn!("Page not ready after {}ms; capturing anyway", self.ready_timeout.as_millis());
    }
}

impl Renderer for CdpRenderer {
    fn set_content(&mut self, html: &str) -> Result<()> {
        let frame_id = self
            .main_frame_id()
            .map_err(|e| Error::LoadError(format!("Failed to resolve main frame: {}", e)))?;

        self.tab
            .call_method(Page::SetDocumentContent {
                frame_id,
                html: html.to_string(),
            })
            .map_err(|e| Error::LoadError(format!("Failed to set document content: {}", e)))?;

        self.wait_until_ready();

        // Give layout and the blur filter a moment to settle
        std::thread::sleep(self.settle);
        Ok(())
    }

    fn render_png(&self) -> Result<Vec<u8>> {
        self.tab
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| Error::RenderError(format!("Screenshot failed: {}", e)))
    }

    fn process_id(&self) -> Option<u32> {
        self.browser.get_process_id()
    }

    fn close(self) -> Result<()> {
        // Tab first, then the browser whose drop kills the Chrome process
        drop(self.tab);
        drop(self.browser);
        Ok(())
    }
}
