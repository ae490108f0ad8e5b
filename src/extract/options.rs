//! Extraction options.

/// Options controlling how raw page content becomes blocks.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Skip text runs that contain only whitespace
    pub skip_empty_runs: bool,

    /// Apply Unicode NFC normalization to run text
    pub normalize_text: bool,

    /// Whether to extract text blocks
    pub text: bool,

    /// Whether to extract vector blocks
    pub vectors: bool,

    /// Whether embedded raster images become blocks
    pub images: bool,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep or skip whitespace-only runs.
    pub fn with_skip_empty_runs(mut self, skip: bool) -> Self {
        self.skip_empty_runs = skip;
        self
    }

    /// Enable or disable NFC normalization.
    pub fn with_normalize_text(mut self, normalize: bool) -> Self {
        self.normalize_text = normalize;
        self
    }

    /// Keep or drop embedded raster images.
    pub fn with_images(mut self, images: bool) -> Self {
        self.images = images;
        self
    }

    /// Extract text blocks only.
    pub fn text_only(mut self) -> Self {
        self.text = true;
        self.vectors = false;
        self
    }

    /// Extract vector blocks only.
    pub fn vectors_only(mut self) -> Self {
        self.text = false;
        self.vectors = true;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            skip_empty_runs: true,
            normalize_text: true,
            text: true,
            vectors: true,
            images: true,
        }
    }
}
