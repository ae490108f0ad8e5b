//! Loading pipeline: renderer output to a populated scene.
//!
//! Pages are processed one at a time in index order. For each page the
//! viewport is resolved, the page is rasterized, and then its vector and text
//! content is extracted, so paint order is a pure function of processing
//! order and only one raster is in flight at a time.

use std::ops::RangeInclusive;

use serde::Serialize;

use crate::backend::DocumentRenderer;
use crate::error::{Error, Result};
use crate::extract::{extract_text, extract_vector, ExtractOptions};
use crate::geometry::DEFAULT_RENDER_SCALE;
use crate::model::Page;
use crate::scene::SceneModel;

/// How per-page text extraction failures are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Abort the whole load
    #[default]
    Strict,
    /// Record a warning and keep going without that page's text
    Lenient,
}

/// Page selection for loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// Load all pages
    #[default]
    All,
    /// Load a range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Load specific pages (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let start = page_number(start)?;
                let end = page_number(end)?;
                if start > end {
                    return Err(Error::InvalidPageRange(s.to_string()));
                }
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let start = page_number(start)?;
                let end = page_number(end)?;
                for p in start..=end {
                    if !pages.contains(&p) {
                        pages.push(p);
                    }
                }
            } else {
                let p = page_number(part)?;
                if !pages.contains(&p) {
                    pages.push(p);
                }
            }
        }

        pages.sort();
        Ok(PageSelection::Pages(pages))
    }

    /// Fail when the selection names a page past the end of the document.
    pub fn check(&self, page_count: u32) -> Result<()> {
        let last = match self {
            PageSelection::All => return Ok(()),
            PageSelection::Range(range) => *range.end(),
            PageSelection::Pages(pages) => pages.iter().copied().max().unwrap_or(0),
        };
        if last > page_count {
            return Err(Error::PageOutOfRange(last, page_count));
        }
        Ok(())
    }
}

fn page_number(s: &str) -> Result<u32> {
    match s.trim().parse::<u32>() {
        Ok(0) | Err(_) => Err(Error::InvalidPageRange(s.trim().to_string())),
        Ok(n) => Ok(n),
    }
}

/// Options for [`load_document`].
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Rendering scale in pixels per point
    pub scale: f64,

    /// Text failure handling
    pub error_mode: ErrorMode,

    /// Pages to load
    pub pages: PageSelection,

    /// Extraction settings
    pub extract: ExtractOptions,
}

impl LoadOptions {
    /// Create new load options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rendering scale.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Use lenient error handling.
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set the error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Set the page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    /// Set extraction options.
    pub fn with_extract(mut self, extract: ExtractOptions) -> Self {
        self.extract = extract;
        self
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            scale: DEFAULT_RENDER_SCALE,
            error_mode: ErrorMode::Strict,
            pages: PageSelection::All,
            extract: ExtractOptions::default(),
        }
    }
}

/// What happened to one page during a load.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageReport {
    pub index: u32,
    pub text_blocks: usize,
    pub vector_blocks: usize,
    pub rasterized: bool,
    pub warnings: Vec<String>,
}

/// Notices and per-page results of a load.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    /// Document-wide notices, e.g. a feature that was switched off
    pub notices: Vec<String>,

    /// Per-page results in load order
    pub pages: Vec<PageReport>,
}

impl LoadReport {
    /// Number of page-scoped warnings.
    pub fn warning_count(&self) -> usize {
        self.pages.iter().map(|p| p.warnings.len()).sum()
    }

    /// Whether the load completed without notices or warnings.
    pub fn is_clean(&self) -> bool {
        self.notices.is_empty() && self.warning_count() == 0
    }
}

/// A finished load.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub scene: SceneModel,
    pub report: LoadReport,
}

/// Build a scene from a renderer.
pub fn load_document(renderer: &dyn DocumentRenderer, options: &LoadOptions) -> Result<Loaded> {
    let page_count = renderer.page_count();
    options.pages.check(page_count)?;
    log::info!("Loading {} pages at scale {:.3}", page_count, options.scale);

    let mut scene = SceneModel::with_metadata(renderer.metadata().stamped());
    let mut report = LoadReport::default();
    let mut rasterize = true;
    let mut vectors = options.extract.vectors;

    for index in 0..page_count {
        if !options.pages.includes(index + 1) {
            continue;
        }
        let viewport = renderer.viewport(index, options.scale)?;
        let mut page = Page::from_viewport(index, viewport);
        let mut page_report = PageReport {
            index,
            ..PageReport::default()
        };

        if rasterize {
            match renderer.render(index, &viewport) {
                Ok(raster) => {
                    page.background = Some(raster);
                    page_report.rasterized = true;
                }
                Err(e) if e.is_unavailable() => {
                    log::warn!("{}; page backgrounds disabled", e);
                    report.notices.push(e.to_string());
                    rasterize = false;
                }
                Err(e) => {
                    log::warn!("Page {}: {}", index + 1, e);
                    page_report.warnings.push(e.to_string());
                }
            }
        }
        scene.add_page(page);

        if vectors {
            match renderer.vector_tree(index, &viewport) {
                Ok(tree) => {
                    let blocks = extract_vector(&tree, index, &options.extract);
                    page_report.vector_blocks = blocks.len();
                    scene.add_blocks(blocks)?;
                }
                Err(e) if e.is_unavailable() => {
                    log::warn!("{}; vector blocks disabled", e);
                    report.notices.push(e.to_string());
                    vectors = false;
                }
                Err(e) => {
                    log::warn!("Page {}: {}", index + 1, e);
                    page_report.warnings.push(e.to_string());
                }
            }
        }

        if options.extract.text {
            match renderer.text_content(index) {
                Ok(input) => {
                    let blocks = extract_text(&input, &viewport, index, &options.extract);
                    page_report.text_blocks = blocks.len();
                    scene.add_blocks(blocks)?;
                }
                Err(e) if options.error_mode == ErrorMode::Strict => return Err(e),
                Err(e) => {
                    log::warn!("Page {}: {}", index + 1, e);
                    page_report.warnings.push(e.to_string());
                }
            }
        }

        log::debug!(
            "Page {}: {} text, {} vector blocks",
            index + 1,
            page_report.text_blocks,
            page_report.vector_blocks
        );
        report.pages.push(page_report);
    }

    log::info!(
        "Loaded {} blocks on {} pages",
        scene.len(),
        scene.page_count()
    );
    Ok(Loaded { scene, report })
}

/// Identifies one load started through [`DocumentSession::begin_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Outcome of [`DocumentSession::finish_load`].
#[derive(Debug)]
pub enum LoadStatus {
    /// The new scene replaced the current one.
    Swapped,
    /// A newer load was started; this result was discarded.
    Stale,
    /// The load failed; the current scene is untouched.
    Failed(Error),
}

/// Holds the current document and arbitrates overlapping loads.
///
/// Loads are never cancelled. Only the most recently started load may
/// replace the current scene; results of older ones are dropped.
#[derive(Debug, Default)]
pub struct DocumentSession {
    generation: u64,
    current: Option<Loaded>,
}

impl DocumentSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a load, superseding any load still in flight.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    /// Deliver the result of a load.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<Loaded>) -> LoadStatus {
        if ticket.0 != self.generation {
            log::debug!("Discarding stale load {}", ticket.0);
            return LoadStatus::Stale;
        }
        match result {
            Ok(loaded) => {
                self.current = Some(loaded);
                LoadStatus::Swapped
            }
            Err(e) => {
                log::warn!("Document load failed: {}", e);
                LoadStatus::Failed(e)
            }
        }
    }

    /// Run a load to completion and deliver it.
    pub fn load(&mut self, renderer: &dyn DocumentRenderer, options: &LoadOptions) -> LoadStatus {
        let ticket = self.begin_load();
        let result = load_document(renderer, options);
        self.finish_load(ticket, result)
    }

    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    pub fn scene(&self) -> Option<&SceneModel> {
        self.current.as_ref().map(|loaded| &loaded.scene)
    }

    pub fn scene_mut(&mut self) -> Option<&mut SceneModel> {
        self.current.as_mut().map(|loaded| &mut loaded.scene)
    }

    pub fn report(&self) -> Option<&LoadReport> {
        self.current.as_ref().map(|loaded| &loaded.report)
    }
}
