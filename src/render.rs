//! Background renderer: embed the image, render the page, save a PNG.

use crate::document::{build_document, default_font_faces, font_face_css, image_data_url};
use crate::{Config, Error, Renderer, Result};
use log::{debug, info, warn};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// A screenshot that made it to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderReport {
    pub output_path: PathBuf,
    /// Size of the PNG in bytes
    pub bytes: usize,
    /// Hex SHA-256 of the PNG
    pub sha256: String,
}

/// Result of a render run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderOutcome {
    Saved(RenderReport),
    /// The background image does not exist; nothing was launched or written
    ImageMissing { path: PathBuf },
}

/// Run `body` against a freshly launched renderer and close it afterwards,
/// whether `body` succeeded or not.
///
/// When both `body` and `close` fail, the `body` error is returned and the
/// close error is logged. A panic in `body` unwinds through the renderer's
/// `Drop`, which backends use to release their process.
pub fn with_renderer<R, L, F, T>(launch: L, body: F) -> Result<T>
where
    R: Renderer,
    L: FnOnce() -> Result<R>,
    F: FnOnce(&mut R) -> Result<T>,
{
    let mut renderer = launch()?;
    if let Some(pid) = renderer.process_id() {
        debug!("Renderer running as pid {}", pid);
    }

    let result = body(&mut renderer);
    let closed = renderer.close();

    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            warn!("Failed to close renderer after error: {}", close_err);
            Err(e)
        }
    }
}

/// Render the background page with a renderer produced by `launch`.
///
/// The image is read before anything is launched, so a missing image costs
/// nothing and leaves `output_path` untouched.
pub fn render_with<R, L>(config: &Config, launch: L) -> Result<RenderOutcome>
where
    R: Renderer,
    L: FnOnce(&Config) -> Result<R>,
{
    config.validate_render()?;

    let image_src = match image_data_url(&config.image_path)? {
        Some(src) => src,
        None => {
            info!("Background image {} not found", config.image_path.display());
            return Ok(RenderOutcome::ImageMissing {
                path: config.image_path.clone(),
            });
        }
    };

    let css = font_face_css(&default_font_faces());
    let html = build_document(&css, &image_src, &config.heading);
    debug!("Assembled document of {} bytes", html.len());

    let png = with_renderer(
        || launch(config),
        |renderer| {
            renderer.set_content(&html)?;
            renderer.render_png()
        },
    )?;

    if png.is_empty() {
        return Err(Error::RenderError("Renderer returned an empty screenshot".into()));
    }

    write_output(&config.output_path, &png)?;
    let report = RenderReport {
        output_path: config.output_path.clone(),
        bytes: png.len(),
        sha256: hex::encode(Sha256::digest(&png)),
    };
    info!(
        "Saved {} ({} bytes, sha256 {})",
        report.output_path.display(),
        report.bytes,
        report.sha256
    );

    Ok(RenderOutcome::Saved(report))
}

/// Render with headless Chrome.
#[cfg(feature = "cdp")]
pub fn render_background(config: &Config) -> Result<RenderOutcome> {
    render_with(config, crate::cdp::CdpRenderer::launch)
}

fn write_output(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, data)?;
    Ok(())
}
