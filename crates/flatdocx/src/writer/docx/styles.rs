//! Document style management for DOCX output

use docx_rs::*;

use crate::render::{CAPTION_STYLE, CODE_STYLE};
use crate::schema::MONOSPACE_FONT;
use crate::state::{HYPERLINK_STYLE, QUOTE_STYLE};

/// The character style of math runs.
pub const MATH_STYLE: &str = "Math";
/// The paragraph style of thematic breaks.
pub const RULE_STYLE: &str = "HorizontalLine";
/// The paragraph style of header row content.
pub const TABLE_HEADER_STYLE: &str = "TableHeader";

/// Document style management
#[derive(Clone, Debug)]
pub struct DocxStyles;

impl DocxStyles {
    /// Create a new style manager
    pub fn new() -> Self {
        Self
    }

    /// Create a heading style with the specified parameters
    fn create_heading_style(level: usize, size: usize) -> Style {
        Style::new(format!("Heading{level}"), StyleType::Paragraph)
            .name(format!("Heading {level}"))
            .size(size)
            .bold()
    }

    /// Add all styles the serializer refers to
    pub fn initialize_styles(&self, docx: Docx) -> Docx {
        let headings = [32, 28, 26, 24, 22, 20]
            .into_iter()
            .enumerate()
            .map(|(i, size)| Self::create_heading_style(i + 1, size));

        let mono_fonts = RunFonts::new()
            .ascii(MONOSPACE_FONT)
            .hi_ansi(MONOSPACE_FONT)
            .east_asia(MONOSPACE_FONT)
            .cs(MONOSPACE_FONT);

        let code_block = Style::new(CODE_STYLE, StyleType::Paragraph)
            .name("Code Block")
            .fonts(mono_fonts)
            .size(18);

        let math = Style::new(MATH_STYLE, StyleType::Character)
            .name("Math")
            .italic();

        let hyperlink = Style::new(HYPERLINK_STYLE, StyleType::Character)
            .name("Hyperlink")
            .color("0000FF")
            .underline("single");

        let quote = Style::new(QUOTE_STYLE, StyleType::Paragraph)
            .name("Intense Quote")
            .indent(Some(864), None, Some(864), None)
            .color("1F4E79")
            .italic();

        let caption = Style::new(CAPTION_STYLE, StyleType::Paragraph)
            .name("Caption")
            .italic()
            .size(18)
            .align(AlignmentType::Center);

        let rule = Style::new(RULE_STYLE, StyleType::Paragraph)
            .name("Horizontal Line")
            .align(AlignmentType::Center);

        let table_header = Style::new(TABLE_HEADER_STYLE, StyleType::Paragraph)
            .name("Table Header")
            .bold();

        let table = Style::new("Table", StyleType::Table)
            .name("Table")
            .table_align(TableAlignmentType::Center);

        headings
            .fold(docx, |docx, style| docx.add_style(style))
            .add_style(code_block)
            .add_style(math)
            .add_style(hyperlink)
            .add_style(quote)
            .add_style(caption)
            .add_style(rule)
            .add_style(table_header)
            .add_style(table)
    }
}
