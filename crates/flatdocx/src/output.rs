//! The flat output description handed to the document builder.
//!
//! Everything here is plain data: sections hold blocks, blocks hold inline
//! elements, and formatting lives in option structs that merge shallowly
//! (a field set on the newer value wins).

use std::collections::BTreeMap;
use std::sync::Arc;

use ecow::EcoString;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use strum::{Display, EnumString};

/// Copies every field that is set on `$from` into `$into`.
macro_rules! merge_fields {
    ($into:expr, $from:expr; $($field:ident),+ $(,)?) => {
        $(
            if $from.$field.is_some() {
                $into.$field = $from.$field;
            }
        )+
    };
}

/// Formatting of a text run.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOptions {
    /// Bold text.
    pub bold: Option<bool>,
    /// Italic text.
    pub italics: Option<bool>,
    /// Single underline.
    pub underline: Option<bool>,
    /// Single strikethrough.
    pub strike: Option<bool>,
    /// Lowered subscript text.
    pub sub_script: Option<bool>,
    /// Raised superscript text.
    pub super_script: Option<bool>,
    /// Lowercase letters shown as small capitals.
    pub small_caps: Option<bool>,
    /// All letters shown as capitals.
    pub all_caps: Option<bool>,
    /// Font family name.
    pub font: Option<EcoString>,
    /// Text color as a hex string without `#`.
    pub color: Option<EcoString>,
    /// Background fill as a hex string without `#`.
    pub shading: Option<EcoString>,
    /// Character style id.
    pub style: Option<EcoString>,
    /// Number of line breaks inserted before the text.
    #[serde(rename = "break")]
    pub break_before: Option<u32>,
}

impl RunOptions {
    /// Run options that only set a character style.
    pub fn style(style: &str) -> Self {
        Self {
            style: Some(style.into()),
            ..Self::default()
        }
    }

    /// Merges `other` into `self`, `other` wins on conflict.
    pub fn merge(&mut self, other: RunOptions) {
        merge_fields!(self, other;
            bold, italics, underline, strike, sub_script, super_script,
            small_caps, all_caps, font, color, shading, style, break_before,
        );
    }

    /// Returns `self` merged with `other`.
    pub fn merged(mut self, other: RunOptions) -> Self {
        self.merge(other);
        self
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Horizontal alignment of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[allow(missing_docs)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// Kind of a tab stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum TabStopKind {
    Left,
    Center,
    Right,
}

/// A tab stop, position in twentieths of a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabStop {
    /// How text aligns at the stop.
    #[serde(rename = "type")]
    pub kind: TabStopKind,
    /// Distance from the left margin.
    pub position: u32,
}

/// The rightmost tab stop position of a default A4 page with default margins.
pub const TAB_STOP_MAX: u32 = 9026;

/// A reference from a paragraph to a numbering definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingRef {
    /// The [`NumberingDefinition::reference`] of the definition.
    pub reference: EcoString,
    /// The zero-based list depth.
    pub level: usize,
}

/// Paragraph-level formatting.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphOptions {
    /// Heading level, 1 to 6.
    pub heading: Option<u8>,
    /// Paragraph style id.
    pub style: Option<EcoString>,
    /// Makes the paragraph a list item.
    pub numbering: Option<NumberingRef>,
    /// Horizontal alignment.
    pub alignment: Option<Alignment>,
    /// Custom tab stops, replacing the default ones.
    pub tab_stops: Option<Vec<TabStop>>,
    /// Renders the paragraph as a horizontal rule.
    pub thematic_break: Option<bool>,
}

impl ParagraphOptions {
    /// Paragraph options that only set a paragraph style.
    pub fn style(style: &str) -> Self {
        Self {
            style: Some(style.into()),
            ..Self::default()
        }
    }

    /// Merges `other` into `self`, `other` wins on conflict.
    pub fn merge(&mut self, other: ParagraphOptions) {
        merge_fields!(self, other;
            heading, style, numbering, alignment, tab_stops, thematic_break,
        );
    }
}

/// A text run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    /// The text, without line breaks.
    pub text: EcoString,
    /// Formatting of the whole run.
    #[serde(skip_serializing_if = "RunOptions::is_empty")]
    pub options: RunOptions,
}

/// An image run, sized in pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRun {
    /// The source the bytes were resolved from.
    pub src: EcoString,
    /// The encoded image.
    #[serde(skip)]
    pub data: Arc<[u8]>,
    /// Display width.
    pub width: f64,
    /// Display height.
    pub height: f64,
}

/// An element of a paragraph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
    /// Formatted text.
    Text(TextRun),
    /// A tab character.
    Tab,
    /// A math expression in LaTeX notation.
    Math {
        /// The LaTeX source.
        latex: EcoString,
    },
    /// An image.
    Image(ImageRun),
    /// A link to a URL.
    ExternalHyperlink {
        /// The target URL.
        link: EcoString,
        /// The linked content.
        children: Vec<Inline>,
    },
    /// A link to a bookmark in the same document.
    InternalHyperlink {
        /// The bookmark id.
        anchor: EcoString,
        /// The linked content.
        children: Vec<Inline>,
    },
    /// A field whose value is computed by the office application.
    Field {
        /// The field instruction, e.g. `REF eq-1 \h`.
        instruction: EcoString,
    },
    /// A named anchor around its children.
    Bookmark {
        /// The name references point at.
        id: EcoString,
        /// The bookmarked content.
        children: Vec<Inline>,
    },
    /// An auto-incrementing counter named by `sequence`, e.g. `Equation`.
    SequenceIdentifier {
        /// The counter name.
        sequence: EcoString,
    },
    /// The reference mark of a footnote.
    FootnoteReference {
        /// The key of the footnote in [`DocumentDescription::footnotes`].
        id: u32,
    },
}

impl Inline {
    /// A plain text run.
    pub fn text(text: impl Into<EcoString>) -> Self {
        Inline::Text(TextRun {
            text: text.into(),
            options: RunOptions::default(),
        })
    }
}

/// A paragraph.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Paragraph {
    /// The content of the paragraph.
    pub children: Vec<Inline>,
    /// Paragraph formatting.
    #[serde(flatten)]
    pub options: ParagraphOptions,
}

/// A table cell. Spans are only present when greater than one.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    /// The content of the cell.
    pub children: Vec<Block>,
    /// Number of grid columns the cell covers.
    pub column_span: Option<u32>,
    /// Number of rows the cell covers.
    pub row_span: Option<u32>,
}

/// A table row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    /// The cells, left to right.
    pub cells: Vec<TableCell>,
    /// Whether every cell of the row is a header cell.
    pub is_header_row: bool,
}

/// A table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    /// The rows, top to bottom.
    pub rows: Vec<TableRow>,
}

/// A block-level element of a section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

/// Header or footer texts. Absent entries inherit the output default.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaderFooter {
    /// Shown on every page without a more specific entry.
    pub default: Option<EcoString>,
    /// Shown on the first page.
    pub first: Option<EcoString>,
    /// Shown on even pages.
    pub even: Option<EcoString>,
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Page margins in twentieths of a point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct PageMargins {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

/// Page properties. Sizes are in twentieths of a point.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageProperties {
    /// Page width.
    pub width: Option<u32>,
    /// Page height.
    pub height: Option<u32>,
    /// Page orientation, portrait unless set.
    pub orientation: Option<Orientation>,
    /// Page margins.
    pub margins: Option<PageMargins>,
}

/// The configuration of a section.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionConfig {
    /// Page header texts.
    pub headers: Option<HeaderFooter>,
    /// Page footer texts.
    pub footers: Option<HeaderFooter>,
    /// Page size, orientation and margins.
    pub page: Option<PageProperties>,
}

impl SectionConfig {
    /// Merges `other` into `self`, `other` wins on conflict.
    pub fn merge(&mut self, other: SectionConfig) {
        merge_fields!(self, other; headers, footers, page);
    }
}

/// A section with its own configuration and content.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Section {
    /// Page setup of the section.
    pub config: SectionConfig,
    /// The blocks of the section, in document order.
    pub children: Vec<Block>,
}

impl Section {
    /// Creates an empty section.
    pub fn new(config: SectionConfig) -> Self {
        Self {
            config,
            children: Vec::new(),
        }
    }
}

/// The list style a numbering definition is created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ListStyle {
    /// Decimal, letter and roman numbers.
    Numbered,
    /// Bullet glyphs.
    Bullets,
}

/// One level of a numbering definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberingLevel {
    /// The zero-based list depth.
    pub level: usize,
    /// The number format, e.g. `decimal` or `bullet`.
    pub format: EcoString,
    /// The level text, e.g. `%1.`.
    pub text: EcoString,
    /// Alignment of the number.
    pub alignment: Alignment,
    /// Left indentation in twentieths of a point.
    pub indent: u32,
    /// Hanging indentation in twentieths of a point.
    pub hanging: u32,
}

/// A multi-level list definition referenced by list paragraphs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberingDefinition {
    /// The name paragraphs refer to the definition by.
    pub reference: EcoString,
    /// Whether the list is numbered or bulleted.
    pub style: ListStyle,
    /// The formatting of each depth, outermost first.
    pub levels: Vec<NumberingLevel>,
}

/// The content of a footnote.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Footnote {
    /// The paragraphs of the footnote.
    pub children: Vec<Paragraph>,
}

/// The finished serialization result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentDescription {
    /// The sections in document order. There is always at least one.
    pub sections: Vec<Section>,
    /// The list definitions used by list paragraphs.
    pub numbering: Vec<NumberingDefinition>,
    /// Footnotes keyed by their 1-based sequence number.
    pub footnotes: BTreeMap<u32, Footnote>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_options_merge_newer_wins() {
        let mut base = RunOptions {
            bold: Some(true),
            color: Some("FF0000".into()),
            ..RunOptions::default()
        };
        base.merge(RunOptions {
            bold: Some(false),
            italics: Some(true),
            ..RunOptions::default()
        });

        assert_eq!(base.bold, Some(false));
        assert_eq!(base.italics, Some(true));
        assert_eq!(base.color.as_deref(), Some("FF0000"));
    }

    #[test]
    fn section_config_merge_is_shallow() {
        let mut config = SectionConfig {
            page: Some(PageProperties {
                width: Some(100),
                height: Some(200),
                ..PageProperties::default()
            }),
            ..SectionConfig::default()
        };
        config.merge(SectionConfig {
            page: Some(PageProperties {
                width: Some(300),
                ..PageProperties::default()
            }),
            ..SectionConfig::default()
        });

        let page = config.page.unwrap();
        assert_eq!(page.width, Some(300));
        assert_eq!(page.height, None);
    }

    #[test]
    fn description_serializes_compactly() {
        let para = Paragraph {
            children: vec![Inline::text("hi")],
            options: ParagraphOptions::style("Quote"),
        };
        let json = serde_json::to_string(&Block::Paragraph(para)).unwrap();
        assert_eq!(
            json,
            r#"{"type":"paragraph","children":[{"type":"text","text":"hi"}],"style":"Quote"}"#
        );
    }
}
