//! DOCX document writer implementation

use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;

use docx_rs::*;
use ecow::{EcoString, eco_format};
use log::debug;

use crate::Result;
use crate::output::{
    self, Alignment, Block, DocumentDescription, HeaderFooter, Inline, Orientation, PageProperties,
    SectionConfig, TabStopKind, TextRun,
};

use super::image_processor::DocxImageProcessor;
use super::numbering::DocxNumbering;
use super::styles::{DocxStyles, MATH_STYLE, RULE_STYLE, TABLE_HEADER_STYLE};

/// Width and height of an A4 page in twentieths of a point.
const A4: (u32, u32) = (11906, 16838);

/// DOCX writer that packs a document description
pub struct DocxWriter {
    styles: DocxStyles,
    numbering: DocxNumbering,
    image_processor: DocxImageProcessor,
    /// Footnote contents keyed by their sequence number.
    footnotes: BTreeMap<u32, Footnote>,
    /// The displayed number of each sequence bookmark.
    bookmark_numbers: HashMap<EcoString, EcoString>,
    sequence_counters: HashMap<EcoString, u32>,
    next_bookmark: usize,
}

impl Default for DocxWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxWriter {
    /// Creates a writer with the default styles.
    pub fn new() -> Self {
        Self {
            styles: DocxStyles::new(),
            numbering: DocxNumbering::new(),
            image_processor: DocxImageProcessor::new(),
            footnotes: BTreeMap::new(),
            bookmark_numbers: HashMap::new(),
            sequence_counters: HashMap::new(),
            next_bookmark: 0,
        }
    }

    /// Packs `doc` into DOCX bytes.
    pub fn write(&mut self, doc: &DocumentDescription) -> Result<Vec<u8>> {
        let mut docx = Docx::new();
        docx = self.styles.initialize_styles(docx);
        docx = self.numbering.add_definitions(docx, &doc.numbering);

        self.number_bookmarks(doc);

        for (id, footnote) in &doc.footnotes {
            let mut content = Footnote::new();
            for paragraph in &footnote.children {
                content = content.add_content(self.build_paragraph(paragraph)?);
            }
            self.footnotes.insert(*id, content);
        }

        if let Some(first) = doc.sections.first() {
            docx = apply_section_config(docx, &first.config);
        }

        for (index, section) in doc.sections.iter().enumerate() {
            if index > 0 {
                debug!("section {index} starts on a new page with the first section's layout");
                let page_break = Paragraph::new().add_run(Run::new().add_break(BreakType::Page));
                docx = docx.add_paragraph(page_break);
            }

            for block in &section.children {
                docx = match block {
                    Block::Paragraph(paragraph) => docx.add_paragraph(self.build_paragraph(paragraph)?),
                    Block::Table(table) => docx.add_table(self.build_table(table)?),
                };
            }
        }

        // Build and pack document
        let docx_built = docx.build();
        let mut buffer = Vec::new();
        docx_built
            .pack(&mut Cursor::new(&mut buffer))
            .map_err(|e| format!("Failed to pack DOCX: {e}"))?;

        Ok(buffer)
    }

    /// Assigns the displayed number of every sequence bookmark in document
    /// order, so that references can show it before the fields are updated.
    fn number_bookmarks(&mut self, doc: &DocumentDescription) {
        fn walk(writer: &mut DocxWriter, inlines: &[Inline]) {
            for inline in inlines {
                match inline {
                    Inline::Bookmark { id, children } => {
                        let sequence = children.iter().find_map(|child| match child {
                            Inline::SequenceIdentifier { sequence } => Some(sequence),
                            _ => None,
                        });
                        match sequence {
                            Some(sequence) => {
                                let number = writer.next_sequence_number(sequence);
                                let shown = bookmark_text(children, &number);
                                writer.bookmark_numbers.insert(id.clone(), shown);
                            }
                            None => walk(writer, children),
                        }
                    }
                    Inline::ExternalHyperlink { children, .. }
                    | Inline::InternalHyperlink { children, .. } => walk(writer, children),
                    _ => {}
                }
            }
        }

        fn walk_blocks(writer: &mut DocxWriter, blocks: &[Block]) {
            for block in blocks {
                match block {
                    Block::Paragraph(paragraph) => walk(writer, &paragraph.children),
                    Block::Table(table) => {
                        for cell in table.rows.iter().flat_map(|row| &row.cells) {
                            walk_blocks(writer, &cell.children);
                        }
                    }
                }
            }
        }

        for section in &doc.sections {
            walk_blocks(self, &section.children);
        }
        self.sequence_counters.clear();
    }

    fn next_sequence_number(&mut self, sequence: &str) -> EcoString {
        let counter = self.sequence_counters.entry(sequence.into()).or_insert(0);
        *counter += 1;
        eco_format!("{counter}")
    }

    /// Build a paragraph with its formatting and content
    fn build_paragraph(&mut self, paragraph: &output::Paragraph) -> Result<Paragraph> {
        let options = &paragraph.options;
        let mut para = Paragraph::new();

        if let Some(level) = options.heading {
            para = para.style(&format!("Heading{}", level.clamp(1, 6)));
        }
        if let Some(style) = &options.style {
            para = para.style(style);
        }
        if options.thematic_break == Some(true) {
            para = para.style(RULE_STYLE);
        }
        if let Some(alignment) = options.alignment {
            para = para.align(map_alignment(alignment));
        }
        if let Some(numbering) = &options.numbering {
            match self.numbering.id(&numbering.reference) {
                Some(id) => {
                    para = para.numbering(NumberingId::new(id), IndentLevel::new(numbering.level));
                }
                None => debug!("unknown numbering {}", numbering.reference),
            }
        }
        for stop in options.tab_stops.iter().flatten() {
            let val = match stop.kind {
                TabStopKind::Left => TabValueType::Left,
                TabStopKind::Center => TabValueType::Center,
                TabStopKind::Right => TabValueType::Right,
            };
            para = para.add_tab(Tab::new().val(val).pos(stop.position as usize));
        }

        for inline in &paragraph.children {
            para = self.add_inline(para, inline)?;
        }

        Ok(para)
    }

    /// Add an inline element to a paragraph
    fn add_inline(&mut self, mut para: Paragraph, inline: &Inline) -> Result<Paragraph> {
        match inline {
            Inline::ExternalHyperlink { link, children } => {
                let hyperlink = Hyperlink::new(link.as_str(), HyperlinkType::External);
                para = para.add_hyperlink(self.fill_hyperlink(hyperlink, children)?);
            }
            Inline::InternalHyperlink { anchor, children } => {
                let hyperlink = Hyperlink::new(anchor.as_str(), HyperlinkType::Anchor);
                para = para.add_hyperlink(self.fill_hyperlink(hyperlink, children)?);
            }
            Inline::Bookmark { id, children } => {
                let bookmark = self.next_bookmark;
                self.next_bookmark += 1;

                para = para.add_bookmark_start(bookmark, id.as_str());
                for child in children {
                    para = self.add_inline(para, child)?;
                }
                para = para.add_bookmark_end(bookmark);
            }
            other => {
                for run in self.build_runs(std::slice::from_ref(other))? {
                    para = para.add_run(run);
                }
            }
        }

        Ok(para)
    }

    fn fill_hyperlink(&mut self, mut hyperlink: Hyperlink, children: &[Inline]) -> Result<Hyperlink> {
        for run in self.build_runs(children)? {
            hyperlink = hyperlink.add_run(run);
        }
        Ok(hyperlink)
    }

    /// Flatten inline elements into runs. Nested hyperlinks and bookmarks
    /// only keep their content.
    fn build_runs(&mut self, inlines: &[Inline]) -> Result<Vec<Run>> {
        let mut runs = Vec::new();

        for inline in inlines {
            match inline {
                Inline::Text(run) => runs.push(build_text_run(run)),
                Inline::Tab => runs.push(Run::new().add_tab()),
                Inline::Math { latex } => {
                    runs.push(Run::new().style(MATH_STYLE).add_text(latex.as_str()));
                }
                Inline::Image(image) => {
                    let pic = self.image_processor.create_pic(image)?;
                    runs.push(Run::new().add_image(pic));
                }
                Inline::Field { instruction } => {
                    let result = reference_target(instruction)
                        .and_then(|id| self.bookmark_numbers.get(id).cloned())
                        .unwrap_or_default();
                    runs.extend(field_runs(instruction, &result));
                }
                Inline::SequenceIdentifier { sequence } => {
                    let number = self.next_sequence_number(sequence);
                    let instruction = eco_format!("SEQ {sequence} \\* ARABIC");
                    runs.extend(field_runs(&instruction, &number));
                }
                Inline::FootnoteReference { id } => match self.footnotes.get(id) {
                    Some(footnote) => {
                        runs.push(Run::new().add_footnote_reference(footnote.clone()));
                    }
                    None => debug!("missing content of footnote {id}"),
                },
                Inline::ExternalHyperlink { children, .. }
                | Inline::InternalHyperlink { children, .. }
                | Inline::Bookmark { children, .. } => {
                    runs.extend(self.build_runs(children)?);
                }
            }
        }

        Ok(runs)
    }

    /// Process table, merging cells that span rows
    fn build_table(&mut self, table: &output::Table) -> Result<Table> {
        let mut docx_table = Table::new(vec![]).style("Table");
        let mut vmerge: Vec<usize> = Vec::new();

        for row in &table.rows {
            let mut cells = Vec::new();
            let mut col_index = 0;
            let mut cell_iter = row.cells.iter();

            loop {
                if vmerge.get(col_index).is_some_and(|&rows| rows > 0) {
                    cells.push(empty_cell().vertical_merge(VMergeType::Continue));
                    vmerge[col_index] -= 1;
                    col_index += 1;
                    continue;
                }

                let Some(cell) = cell_iter.next() else {
                    // Keep later columns aligned while they are still merged.
                    if vmerge.iter().skip(col_index).any(|&rows| rows > 0) {
                        cells.push(empty_cell());
                        col_index += 1;
                        continue;
                    }
                    break;
                };

                let colspan = cell.column_span.unwrap_or(1) as usize;
                let rowspan = cell.row_span.unwrap_or(1) as usize;

                let mut table_cell = self.build_table_cell(cell, row.is_header_row)?;
                if colspan > 1 {
                    table_cell = table_cell.grid_span(colspan);
                }
                if rowspan > 1 {
                    table_cell = table_cell.vertical_merge(VMergeType::Restart);
                    if vmerge.len() < col_index + colspan {
                        vmerge.resize(col_index + colspan, 0);
                    }
                    for rows in &mut vmerge[col_index..col_index + colspan] {
                        *rows = (*rows).max(rowspan - 1);
                    }
                }
                cells.push(table_cell);
                col_index += colspan;
            }

            docx_table = docx_table.add_row(TableRow::new(cells));
        }

        Ok(docx_table)
    }

    fn build_table_cell(&mut self, cell: &output::TableCell, is_header: bool) -> Result<TableCell> {
        if cell.children.is_empty() {
            return Ok(empty_cell());
        }

        let mut table_cell = TableCell::new();
        for block in &cell.children {
            table_cell = match block {
                Block::Paragraph(paragraph) => {
                    let mut para = self.build_paragraph(paragraph)?;
                    if is_header && paragraph.options.style.is_none() {
                        para = para.style(TABLE_HEADER_STYLE);
                    }
                    table_cell.add_paragraph(para)
                }
                Block::Table(table) => table_cell.add_table(self.build_table(table)?),
            };
        }

        Ok(table_cell)
    }
}

fn build_text_run(text: &TextRun) -> Run {
    let options = &text.options;
    let mut run = Run::new();

    for _ in 0..options.break_before.unwrap_or(0) {
        run = run.add_break(BreakType::TextWrapping);
    }
    run = run.add_text(text.text.as_str());

    if let Some(style) = &options.style {
        run = run.style(style);
    }
    if options.bold == Some(true) {
        run = run.bold();
    }
    if options.italics == Some(true) {
        run = run.italic();
    }
    if options.underline == Some(true) {
        run = run.underline("single");
    }
    if options.strike == Some(true) {
        run = run.strike();
    }
    if options.super_script == Some(true) {
        run = run.vert_align(VertAlignType::SuperScript);
    } else if options.sub_script == Some(true) {
        run = run.vert_align(VertAlignType::SubScript);
    }
    if options.all_caps == Some(true) {
        run = run.caps();
    } else if options.small_caps == Some(true) {
        debug!("small caps are written as plain text");
    }
    if let Some(font) = &options.font {
        let font = font.as_str();
        run = run.fonts(RunFonts::new().ascii(font).hi_ansi(font).east_asia(font).cs(font));
    }
    if let Some(color) = &options.color {
        run = run.color(color.as_str());
    }
    if let Some(fill) = &options.shading {
        run = run.shading(Shading::new().fill(fill.as_str()));
    }

    run
}

/// The runs of a complex field showing `result` until it is updated.
fn field_runs(instruction: &str, result: &str) -> [Run; 4] {
    [
        Run::new().add_field_char(FieldCharType::Begin, true),
        Run::new().add_instr_text(InstrText::Unsupported(format!(" {instruction} "))),
        Run::new()
            .add_field_char(FieldCharType::Separate, false)
            .add_text(result),
        Run::new().add_field_char(FieldCharType::End, false),
    ]
}

/// The text a sequence bookmark displays, with `number` standing in for the
/// sequence identifier.
fn bookmark_text(children: &[Inline], number: &str) -> EcoString {
    let mut text = EcoString::new();
    for child in children {
        match child {
            Inline::Text(run) => text.push_str(&run.text),
            Inline::SequenceIdentifier { .. } => text.push_str(number),
            _ => {}
        }
    }
    text
}

/// The bookmark a `REF` field points at.
fn reference_target(instruction: &str) -> Option<&str> {
    instruction.strip_prefix("REF ")?.split_whitespace().next()
}

fn empty_cell() -> TableCell {
    TableCell::new().add_paragraph(Paragraph::new())
}

fn map_alignment(alignment: Alignment) -> AlignmentType {
    match alignment {
        Alignment::Left => AlignmentType::Left,
        Alignment::Center => AlignmentType::Center,
        Alignment::Right => AlignmentType::Right,
    }
}

/// Applies page layout and header/footer texts to the whole document.
fn apply_section_config(mut docx: Docx, config: &SectionConfig) -> Docx {
    if let Some(page) = &config.page {
        docx = apply_page(docx, page);
    }

    if let Some(headers) = &config.headers {
        let [default, first, even] = header_footer_paragraphs(headers);
        if let Some(p) = default {
            docx = docx.header(Header::new().add_paragraph(p));
        }
        if let Some(p) = first {
            docx = docx.first_header(Header::new().add_paragraph(p));
        }
        if let Some(p) = even {
            docx = docx.even_header(Header::new().add_paragraph(p));
        }
    }

    if let Some(footers) = &config.footers {
        let [default, first, even] = header_footer_paragraphs(footers);
        if let Some(p) = default {
            docx = docx.footer(Footer::new().add_paragraph(p));
        }
        if let Some(p) = first {
            docx = docx.first_footer(Footer::new().add_paragraph(p));
        }
        if let Some(p) = even {
            docx = docx.even_footer(Footer::new().add_paragraph(p));
        }
    }

    docx
}

fn header_footer_paragraphs(texts: &HeaderFooter) -> [Option<Paragraph>; 3] {
    [&texts.default, &texts.first, &texts.even].map(|text| {
        text.as_ref()
            .map(|text| Paragraph::new().add_run(Run::new().add_text(text.as_str())))
    })
}

fn apply_page(mut docx: Docx, page: &PageProperties) -> Docx {
    let landscape = page.orientation == Some(Orientation::Landscape);

    if page.width.is_some() || page.height.is_some() || landscape {
        let (mut width, mut height) = (page.width.unwrap_or(A4.0), page.height.unwrap_or(A4.1));
        if landscape && width < height {
            std::mem::swap(&mut width, &mut height);
        }
        docx = docx.page_size(width, height);
    }
    if landscape {
        docx = docx.page_orient(PageOrientationType::Landscape);
    }
    if let Some(margins) = page.margins {
        docx = docx.page_margin(
            PageMargin::new()
                .top(margins.top as i32)
                .right(margins.right as i32)
                .bottom(margins.bottom as i32)
                .left(margins.left as i32),
        );
    }

    docx
}
