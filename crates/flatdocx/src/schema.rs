//! The supported node and mark kinds.
//!
//! Kinds are looked up by name once per visited node or mark; names without
//! a variant are reported as unsupported.

use std::str::FromStr;

use strum::{AsRefStr, EnumString};

use crate::Result;
use crate::error::Error;
use crate::model::Mark;
use crate::output::RunOptions;

/// Node kinds with a visitor, named after their snake_case node names.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum NodeKind {
    Doc,
    Text,
    Paragraph,
    Heading,
    Blockquote,
    CodeBlock,
    HorizontalRule,
    HardBreak,
    OrderedList,
    BulletList,
    ListItem,
    Image,
    Math,
    Equation,
    Caption,
    Table,
    TableRow,
    TableCell,
    TableHeader,
    Footnote,
    CrossReference,
    SectionBreak,
}

impl NodeKind {
    /// Resolves a node kind name.
    pub fn lookup(name: &str) -> Result<Self> {
        Self::from_str(name).map_err(|_| Error::unsupported_node(name))
    }

    /// Whether the kind is a table cell.
    pub fn is_cell(self) -> bool {
        matches!(self, NodeKind::TableCell | NodeKind::TableHeader)
    }
}

/// Mark kinds with a formatter, named after their mark names.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum MarkKind {
    Em,
    Strong,
    Link,
    Code,
    Abbr,
    Subscript,
    Superscript,
    Strikethrough,
    Underline,
    #[strum(serialize = "smallcaps")]
    SmallCaps,
    #[strum(serialize = "allcaps")]
    AllCaps,
}

impl MarkKind {
    /// Resolves a mark kind name.
    pub fn lookup(name: &str) -> Result<Self> {
        Self::from_str(name).map_err(|_| Error::unsupported_mark(name))
    }

    /// The run formatting contributed by this mark.
    pub fn run_options(self) -> RunOptions {
        let on = Some(true);
        match self {
            MarkKind::Em => RunOptions {
                italics: on,
                ..RunOptions::default()
            },
            MarkKind::Strong => RunOptions {
                bold: on,
                ..RunOptions::default()
            },
            // Links are grouped by the inline renderer.
            MarkKind::Link | MarkKind::Abbr => RunOptions::default(),
            MarkKind::Code => RunOptions {
                font: Some(MONOSPACE_FONT.into()),
                color: Some("000000".into()),
                shading: Some("D2D3D2".into()),
                ..RunOptions::default()
            },
            MarkKind::Subscript => RunOptions {
                sub_script: on,
                ..RunOptions::default()
            },
            MarkKind::Superscript => RunOptions {
                super_script: on,
                ..RunOptions::default()
            },
            MarkKind::Strikethrough => RunOptions {
                strike: on,
                ..RunOptions::default()
            },
            MarkKind::Underline => RunOptions {
                underline: on,
                ..RunOptions::default()
            },
            MarkKind::SmallCaps => RunOptions {
                small_caps: on,
                ..RunOptions::default()
            },
            MarkKind::AllCaps => RunOptions {
                all_caps: on,
                ..RunOptions::default()
            },
        }
    }
}

/// The font used for code.
pub const MONOSPACE_FONT: &str = "Monospace";

/// Folds the formatting of all marks, later marks win on conflict.
pub fn mark_options(marks: &[Mark]) -> Result<RunOptions> {
    marks.iter().try_fold(RunOptions::default(), |acc, mark| {
        Ok(acc.merged(MarkKind::lookup(&mark.kind)?.run_options()))
    })
}
