//! # Flatdocx
//!
//! Serializes rich document trees (ProseMirror-style JSON with paragraphs,
//! headings, lists, tables, footnotes, marks, math and images) into a flat,
//! section-structured [`DocumentDescription`] that maps directly onto DOCX.

mod error;
pub mod ids;
pub mod model;
pub mod numbering;
pub mod output;
pub mod render;
pub mod resolver;
pub mod schema;
pub mod state;
#[cfg(feature = "docx")]
pub mod writer;


pub use error::*;

pub use crate::model::{Attrs, Mark, Node};
pub use crate::output::{DocumentDescription, SectionConfig};
use crate::render::Renderer;
pub use crate::resolver::{FileResolver, FnResolver, ImageResolver, NoImages};

/// The result type for flatdocx.
pub type Result<T, Err = Error> = std::result::Result<T, Err>;

/// Options of a serialization.
#[derive(Debug, Clone)]
pub struct SerializeOptions {
    /// The width in pixels that a 100% wide image occupies.
    pub max_image_width: f64,
    /// The width of images without a `width` attribute, in percent of the
    /// maximum image width.
    pub image_width_percent: f64,
    /// The sections the document starts with. Section breaks without a
    /// configuration move through these in order.
    pub sections: Vec<SectionConfig>,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            max_image_width: 600.0,
            image_width_percent: 70.0,
            sections: Vec::new(),
        }
    }
}

impl SerializeOptions {
    /// Sets the maximum image width.
    pub fn with_max_image_width(mut self, width: f64) -> Self {
        self.max_image_width = width;
        self
    }

    /// Sets the default image width.
    pub fn with_image_width_percent(mut self, percent: f64) -> Self {
        self.image_width_percent = percent;
        self
    }

    /// Sets the initial sections.
    pub fn with_sections(mut self, sections: impl IntoIterator<Item = SectionConfig>) -> Self {
        self.sections = sections.into_iter().collect();
        self
    }
}

/// Serializes document trees. Each call starts from a fresh state.
#[derive(Debug, Default, Clone)]
pub struct Serializer {
    options: SerializeOptions,
}

impl Serializer {
    /// Creates a serializer.
    pub fn new(options: SerializeOptions) -> Self {
        Self { options }
    }

    /// Serializes `doc`, blocking on image resolution.
    pub fn serialize(
        &self,
        doc: &Node,
        resolver: &dyn ImageResolver,
    ) -> Result<DocumentDescription> {
        futures::executor::block_on(self.serialize_async(doc, resolver))
    }

    /// Serializes `doc`, awaiting image resolution.
    pub async fn serialize_async(
        &self,
        doc: &Node,
        resolver: &dyn ImageResolver,
    ) -> Result<DocumentDescription> {
        let mut renderer = Renderer::new(&self.options, resolver);
        renderer.render(doc, None, 0).await?;
        Ok(renderer.into_state().into_description())
    }
}

impl DocumentDescription {
    /// Packs the description into DOCX bytes.
    #[cfg(feature = "docx")]
    pub fn to_docx(&self) -> Result<Vec<u8>> {
        writer::DocxWriter::new().write(self)
    }
}
