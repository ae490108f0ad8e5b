//! Request-level operations on a single open document.
//!
//! [`DocumentService`] is what a front end or HTTP handler talks to: upload a
//! PDF, read or replace its element state, count elements, and fetch the
//! rewritten PDF. Everything except `upload` needs a loaded document and
//! fails with [`Error::NoDocument`] otherwise.

use crate::backend::LopdfRenderer;
use crate::detect::sniff_bytes;
use crate::error::{Error, Result};
use crate::loader::{DocumentSession, LoadOptions, LoadReport, LoadStatus};
use crate::scene::SceneModel;
use crate::transport::{apply_state, DocumentState, DocumentSummary};
use crate::writer::write_pdf;

/// One open document and the operations on it.
#[derive(Debug, Default)]
pub struct DocumentService {
    session: DocumentSession,
    options: LoadOptions,
}

impl DocumentService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service that loads with the given options.
    pub fn with_options(options: LoadOptions) -> Self {
        Self {
            session: DocumentSession::new(),
            options,
        }
    }

    /// Load a PDF, replacing the open document on success.
    ///
    /// A failed upload leaves the previously open document in place.
    pub fn upload(&mut self, data: &[u8], name: &str) -> Result<DocumentState> {
        let format = sniff_bytes(data)?;
        log::info!("Uploading {} ({}, {} bytes)", name, format, data.len());

        let ticket = self.session.begin_load();
        let result = LopdfRenderer::load_bytes(data)
            .map(|renderer| renderer.with_source_name(name))
            .and_then(|renderer| crate::loader::load_document(&renderer, &self.options));

        match self.session.finish_load(ticket, result) {
            LoadStatus::Swapped => self.document(),
            LoadStatus::Stale => Err(Error::Load("superseded by a newer upload".to_string())),
            LoadStatus::Failed(e) => Err(e),
        }
    }

    /// Element state of the open document.
    pub fn document(&self) -> Result<DocumentState> {
        Ok(DocumentState::from_scene(self.scene()?))
    }

    /// Fold an edited state into the open document and return the result.
    pub fn replace(&mut self, state: &DocumentState) -> Result<DocumentState> {
        let scene = self.session.scene_mut().ok_or(Error::NoDocument)?;
        let applied = apply_state(scene, state);
        log::info!("Applied {} of {} element(s)", applied, state.element_count());
        self.document()
    }

    /// Element counts per page.
    pub fn summary(&self) -> Result<DocumentSummary> {
        Ok(DocumentSummary::from_scene(self.scene()?))
    }

    /// The open document rewritten as PDF.
    pub fn render_output(&self) -> Result<Vec<u8>> {
        write_pdf(self.scene()?)
    }

    /// The open document's scene.
    pub fn scene(&self) -> Result<&SceneModel> {
        self.session.scene().ok_or(Error::NoDocument)
    }

    /// Notices from the last successful load.
    pub fn report(&self) -> Option<&LoadReport> {
        self.session.report()
    }
}
