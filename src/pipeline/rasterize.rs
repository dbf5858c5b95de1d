//! PDF rasterisation: render every page to `<prefix>-<page>.png`.
//!
//! ## Backends
//!
//! * [`PdftoppmRasterizer`] (default) shells out to poppler's `pdftoppm`.
//! * [`PdfiumRasterizer`] (feature `pdfium`) renders in-process through
//!   pdfium-render, binding the shared library via pdfium-auto.
//!
//! Both only promise to leave `<prefix>-<N>.png` files in the output
//! directory. [`rasterize_pages`] then lists that directory and orders the
//! files by the numeric page token, because `pdftoppm` zero-pads the token to
//! the width of the page count (`page-01.png`) and a lexicographic sort would
//! put `page-10` before `page-9` anyway.
//!
//! ## Why spawn_blocking?
//!
//! Both backends block: one waits on a child process, the other drives pdfium
//! which is not async-safe. `tokio::task::spawn_blocking` keeps the Tokio
//! worker threads free while a large document renders.

use crate::config::{QuizConfig, RasterizerBackend};
use crate::error::QuizError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// File name prefix for rendered pages.
pub const PAGE_PREFIX: &str = "page";

/// Renders every page of a PDF into `out_dir` as `<prefix>-<page>.png`.
pub trait Rasterizer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Render all pages. Called on the blocking thread pool.
    fn rasterize(&self, pdf_path: &Path, out_dir: &Path, prefix: &str) -> Result<(), QuizError>;
}

/// Render a PDF and return the page images in ascending page order.
///
/// Failures are not fatal here: they are logged and an empty list is
/// returned, leaving the caller to decide what an empty document means.
pub async fn rasterize_pages(
    rasterizer: Arc<dyn Rasterizer>,
    pdf_path: &Path,
    out_dir: &Path,
) -> Vec<PathBuf> {
    let pdf = pdf_path.to_path_buf();
    let dir = out_dir.to_path_buf();
    let backend = rasterizer.name().to_string();

    info!("Converting PDF pages to images with {}", backend);
    let rendered = tokio::task::spawn_blocking(move || {
        rasterizer.rasterize(&pdf, &dir, PAGE_PREFIX)?;
        collect_pages(&dir, PAGE_PREFIX).map_err(|e| QuizError::fs(&dir, e))
    })
    .await;

    match rendered {
        Ok(Ok(pages)) => {
            info!("Successfully converted {} PDF pages to images", pages.len());
            pages
        }
        Ok(Err(e)) => {
            warn!("Rasterisation with {} failed: {}", backend, e);
            Vec::new()
        }
        Err(e) => {
            warn!("Rasterisation task panicked: {}", e);
            Vec::new()
        }
    }
}

/// List `<prefix>-<N>.png` files in `dir`, sorted by `N` ascending.
pub fn collect_pages(dir: &Path, prefix: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut pages: Vec<(u32, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name();
            let page = page_number(name.to_str()?, prefix)?;
            Some((page, entry.path()))
        })
        .collect();

    pages.sort_by_key(|(page, _)| *page);
    debug!("Found {} page images in {}", pages.len(), dir.display());
    Ok(pages.into_iter().map(|(_, path)| path).collect())
}

/// Extract the page number from `<prefix>-<digits>.png`.
///
/// Returns `None` for any other file name.
pub fn page_number(file_name: &str, prefix: &str) -> Option<u32> {
    let digits = file_name
        .strip_prefix(prefix)?
        .strip_prefix('-')?
        .strip_suffix(".png")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Build the rasteriser selected by the configuration.
pub fn build_rasterizer(config: &QuizConfig) -> Result<Arc<dyn Rasterizer>, QuizError> {
    if let Some(ref r) = config.rasterizer {
        return Ok(Arc::clone(r));
    }

    match config.rasterizer_backend {
        RasterizerBackend::Pdftoppm => Ok(Arc::new(PdftoppmRasterizer::new(
            config.pdftoppm_path.clone(),
            config.dpi,
        ))),
        #[cfg(feature = "pdfium")]
        RasterizerBackend::Pdfium => Ok(Arc::new(PdfiumRasterizer::new(config.dpi))),
        #[cfg(not(feature = "pdfium"))]
        RasterizerBackend::Pdfium => Err(QuizError::InvalidConfig(
            "The pdfium rasterizer requires building with `--features pdfium`".into(),
        )),
    }
}

// ── pdftoppm ─────────────────────────────────────────────────────────────

/// Rasteriser that runs poppler's `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    program: PathBuf,
    dpi: u32,
}

impl PdftoppmRasterizer {
    pub fn new(program: impl Into<PathBuf>, dpi: u32) -> Self {
        Self {
            program: program.into(),
            dpi,
        }
    }

    /// Arguments for one conversion: PNG output, all pages, fixed DPI.
    pub fn args(&self, pdf_path: &Path, out_dir: &Path, prefix: &str) -> Vec<OsString> {
        vec![
            "-png".into(),
            "-r".into(),
            self.dpi.to_string().into(),
            pdf_path.as_os_str().to_owned(),
            out_dir.join(prefix).into_os_string(),
        ]
    }
}

impl Rasterizer for PdftoppmRasterizer {
    fn name(&self) -> &str {
        "pdftoppm"
    }

    fn rasterize(&self, pdf_path: &Path, out_dir: &Path, prefix: &str) -> Result<(), QuizError> {
        let output = Command::new(&self.program)
            .args(self.args(pdf_path, out_dir, prefix))
            .output()
            .map_err(|e| QuizError::ConversionFailure {
                detail: format!("failed to run {}: {}", self.program.display(), e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(QuizError::ConversionFailure {
                detail: format!(
                    "{} exited with {}: {}",
                    self.program.display(),
                    output.status,
                    stderr.trim()
                ),
            });
        }

        debug!("pdftoppm rendered {} at {} DPI", pdf_path.display(), self.dpi);
        Ok(())
    }
}

// ── pdfium ───────────────────────────────────────────────────────────────

/// In-process rasteriser backed by pdfium.
#[cfg(feature = "pdfium")]
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    max_pixels: u32,
}

#[cfg(feature = "pdfium")]
impl PdfiumRasterizer {
    /// Longest rendered edge is derived from the DPI for a US-letter height.
    pub fn new(dpi: u32) -> Self {
        Self {
            max_pixels: dpi * 11,
        }
    }
}

#[cfg(feature = "pdfium")]
impl Rasterizer for PdfiumRasterizer {
    fn name(&self) -> &str {
        "pdfium"
    }

    fn rasterize(&self, pdf_path: &Path, out_dir: &Path, prefix: &str) -> Result<(), QuizError> {
        use pdfium_render::prelude::*;

        let pdfium = pdfium_auto::bind_pdfium_silent().map_err(|e| QuizError::ConversionFailure {
            detail: format!("failed to bind pdfium: {e}"),
        })?;

        let document = pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| QuizError::ConversionFailure {
                detail: format!("pdfium could not open {}: {:?}", pdf_path.display(), e),
            })?;

        let render_config = PdfRenderConfig::new()
            .set_target_width(self.max_pixels as i32)
            .set_maximum_height(self.max_pixels as i32);

        let pages = document.pages();
        let total = pages.len() as usize;
        info!("PDF loaded: {} pages", total);

        for idx in 0..total {
            let page = pages
                .get(idx as u16)
                .map_err(|e| QuizError::ConversionFailure {
                    detail: format!("page {}: {:?}", idx + 1, e),
                })?;
            let rendered = page
                .render_with_config(&render_config)
                .map_err(|e| QuizError::ConversionFailure {
                    detail: format!("page {}: {:?}", idx + 1, e),
                })?
                .as_image();

            let target = out_dir.join(format!("{}-{}.png", prefix, idx + 1));
            rendered
                .save_with_format(&target, image::ImageFormat::Png)
                .map_err(|e| QuizError::ConversionFailure {
                    detail: format!("writing {}: {}", target.display(), e),
                })?;
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                rendered.width(),
                rendered.height()
            );
        }

        Ok(())
    }
}
