//! Writer implementations for output formats

pub mod docx;

pub use self::docx::DocxWriter;
