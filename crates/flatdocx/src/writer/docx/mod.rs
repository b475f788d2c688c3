//! DOCX packing using docx-rs
//!
//! This module is organized into several main components:
//! - Writer: Maps a document description onto a docx-rs document
//! - Styles: The styles the serializer refers to by id
//! - Numbering: Numbering definitions to abstract numberings
//! - Images: Picture creation and format conversion

mod image_processor;
mod numbering;
mod styles;
mod writer;

pub use writer::DocxWriter;
