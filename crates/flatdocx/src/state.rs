//! The serialization state machine.
//!
//! The state collapses the source tree into flat output. Context that a
//! recursive renderer would keep on the call stack (the open hyperlink, the
//! run buffer being filled, the current list level) lives in explicit fields
//! here, and every place that renders child content in isolation saves and
//! restores the fields it touches.

use std::collections::BTreeMap;
use std::mem;

use ecow::{EcoString, eco_format};
use log::{debug, warn};

use crate::Result;
use crate::error::Error;
use crate::ids::IdGenerator;
use crate::numbering::NumberingRegistry;
use crate::output::*;

/// The paragraph style stamped on block quote content.
pub const QUOTE_STYLE: &str = "IntenseQuote";
/// The character style of hyperlink runs.
pub const HYPERLINK_STYLE: &str = "Hyperlink";

/// A hyperlink that is still collecting runs.
#[derive(Debug, Clone)]
pub struct OpenLink {
    target: EcoString,
    /// The run buffer from before the link opened.
    saved: Vec<Inline>,
}

/// What a footnote swaps out while it renders.
#[derive(Debug)]
#[must_use = "the scope must be passed back to `end_footnote`"]
pub struct FootnoteScope {
    id: u32,
    current: Vec<Inline>,
    next_run_options: RunOptions,
}

/// How a piece of math is laid out.
#[derive(Debug, Clone, Default)]
pub struct MathOptions {
    /// Math inside a line of text.
    pub inline: bool,
    /// Display math that gets an equation number.
    pub numbered: bool,
    /// The bookmark id of the equation number.
    pub id: Option<EcoString>,
}

impl MathOptions {
    /// Inline math.
    pub fn inline() -> Self {
        Self {
            inline: true,
            ..Self::default()
        }
    }
}

/// The live traversal context of one serialization.
#[derive(Debug)]
pub struct SerializationState {
    sections: Vec<Section>,
    current_section: usize,
    /// Containers that temporarily replace the section content, innermost
    /// last. Table cells render into these.
    isolated: Vec<Vec<Block>>,
    numbering: NumberingRegistry,
    footnotes: BTreeMap<u32, Footnote>,
    next_run_options: RunOptions,
    next_paragraph_options: ParagraphOptions,
    current: Vec<Inline>,
    link: Option<OpenLink>,
    list: Option<NumberingRef>,
    footnote_counter: u32,
    max_image_width: f64,
    ids: IdGenerator,
}

impl SerializationState {
    /// Creates a state with the given initial sections. Without any, the
    /// state starts with one section that inherits every default.
    pub fn new(sections: impl IntoIterator<Item = SectionConfig>, max_image_width: f64) -> Self {
        let mut sections: Vec<Section> = sections.into_iter().map(Section::new).collect();
        if sections.is_empty() {
            sections.push(Section::default());
        }

        Self {
            sections,
            current_section: 0,
            isolated: Vec::new(),
            numbering: NumberingRegistry::new(),
            footnotes: BTreeMap::new(),
            next_run_options: RunOptions::default(),
            next_paragraph_options: ParagraphOptions::default(),
            current: Vec::new(),
            link: None,
            list: None,
            footnote_counter: 0,
            max_image_width,
            ids: IdGenerator::new(),
        }
    }

    // Inline accumulator

    /// The run buffer of the paragraph being built.
    pub fn current(&self) -> &[Inline] {
        &self.current
    }

    /// Appends a text run. Pending run options apply and are consumed;
    /// `options` wins over them. Empty text is ignored.
    pub fn emit_text(&mut self, text: &str, options: RunOptions) {
        if text.is_empty() {
            return;
        }

        let options = mem::take(&mut self.next_run_options).merged(options);
        self.current.push(Inline::Text(TextRun {
            text: text.into(),
            options,
        }));
    }

    /// Merges options into the single pending slot used by the next text
    /// run.
    pub fn set_pending_run_options(&mut self, options: RunOptions) {
        self.next_run_options.merge(options);
    }

    /// The options the next text run will pick up.
    pub fn pending_run_options(&self) -> &RunOptions {
        &self.next_run_options
    }

    /// Appends an element to the run buffer.
    pub fn push_inline(&mut self, inline: Inline) {
        self.current.push(inline);
    }

    /// The target of the hyperlink that is currently collecting runs.
    pub fn open_link_target(&self) -> Option<&str> {
        self.link.as_ref().map(|link| link.target.as_str())
    }

    /// Starts or continues a hyperlink to `target`.
    ///
    /// A different open target is closed first. The next text run gets the
    /// hyperlink style either way.
    pub fn open_link(&mut self, target: &str) {
        self.set_pending_run_options(RunOptions::style(HYPERLINK_STYLE));
        if self.open_link_target() == Some(target) {
            return;
        }

        self.close_link();
        let saved = mem::take(&mut self.current);
        self.link = Some(OpenLink {
            target: target.into(),
            saved,
        });
    }

    /// Wraps everything since the open hyperlink started into a hyperlink
    /// element. No-op without an open hyperlink.
    pub fn close_link(&mut self) {
        let Some(link) = self.link.take() else {
            return;
        };

        let children = mem::replace(&mut self.current, link.saved);
        self.current.push(Inline::ExternalHyperlink {
            link: link.target,
            children,
        });
    }

    /// Detaches the open hyperlink so that a nested inline sequence starts
    /// without one.
    pub fn take_link(&mut self) -> Option<OpenLink> {
        self.link.take()
    }

    /// Reattaches a hyperlink detached by [`Self::take_link`].
    pub fn restore_link(&mut self, link: Option<OpenLink>) {
        debug_assert!(self.link.is_none(), "restoring over an open hyperlink");
        self.link = link;
    }

    // Block closer

    /// Merges options into the pending paragraph options.
    pub fn add_paragraph_options(&mut self, options: ParagraphOptions) {
        self.next_paragraph_options.merge(options);
    }

    /// The options the next closed paragraph will pick up.
    pub fn pending_paragraph_options(&self) -> &ParagraphOptions {
        &self.next_paragraph_options
    }

    /// Freezes the run buffer into a paragraph and appends it to the active
    /// container. `options` wins over the pending paragraph options.
    pub fn close_block(&mut self, options: ParagraphOptions) {
        let mut merged = mem::take(&mut self.next_paragraph_options);
        merged.merge(options);

        let paragraph = Paragraph {
            children: mem::take(&mut self.current),
            options: merged,
        };
        self.push_block(Block::Paragraph(paragraph));
    }

    /// Appends a block to the active container.
    pub fn push_block(&mut self, block: Block) {
        self.container().push(block);
    }

    /// The active container.
    pub fn container(&mut self) -> &mut Vec<Block> {
        match self.isolated.last_mut() {
            Some(container) => container,
            None => &mut self.sections[self.current_section].children,
        }
    }

    /// Makes a fresh container active until [`Self::end_isolated_container`].
    pub fn begin_isolated_container(&mut self) {
        self.isolated.push(Vec::new());
    }

    /// Returns the content of the innermost isolated container and makes the
    /// previous container active again.
    pub fn end_isolated_container(&mut self) -> Vec<Block> {
        debug_assert!(!self.isolated.is_empty(), "no isolated container to end");
        self.isolated.pop().unwrap_or_default()
    }

    // List tracker

    /// The current numbering reference and depth, `None` outside lists.
    pub fn list(&self) -> Option<&NumberingRef> {
        self.list.as_ref()
    }

    /// Enters a list. The outermost list allocates a numbering definition
    /// for `style`; nested lists go one level deeper in the same definition.
    pub fn enter_list(&mut self, style: ListStyle) {
        match &mut self.list {
            Some(list) => list.level += 1,
            None => {
                let reference = self.ids.next("num");
                debug!("numbering {reference}: new {style} list");
                self.numbering.register(reference.clone(), style);
                self.list = Some(NumberingRef {
                    reference,
                    level: 0,
                });
            }
        }
    }

    /// Leaves a list, dropping the list context after the outermost one.
    pub fn leave_list(&mut self) {
        match &mut self.list {
            Some(list) if list.level > 0 => list.level -= 1,
            _ => self.list = None,
        }
    }

    /// Stamps the pending paragraph options with the current numbering.
    pub fn begin_list_item(&mut self) -> Result<()> {
        let numbering = self.list.clone().ok_or_else(Error::no_active_list)?;
        self.add_paragraph_options(ParagraphOptions {
            numbering: Some(numbering),
            ..ParagraphOptions::default()
        });
        Ok(())
    }

    // Images

    /// The width images are scaled against, in pixels.
    pub fn max_image_width(&self) -> f64 {
        self.max_image_width
    }

    /// Changes the width images are scaled against.
    pub fn set_max_image_width(&mut self, width: f64) {
        self.max_image_width = width;
    }

    // Footnotes

    /// Starts rendering a footnote into an empty run buffer.
    pub fn begin_footnote(&mut self) -> FootnoteScope {
        self.footnote_counter += 1;
        FootnoteScope {
            id: self.footnote_counter,
            current: mem::take(&mut self.current),
            next_run_options: mem::take(&mut self.next_run_options),
        }
    }

    /// Stores the footnote content, restores the outer run buffer and
    /// appends a reference to the footnote.
    pub fn end_footnote(&mut self, scope: FootnoteScope) {
        let FootnoteScope {
            id,
            current,
            next_run_options,
        } = scope;

        let content = mem::replace(&mut self.current, current);
        self.next_run_options = next_run_options;
        self.footnotes.insert(
            id,
            Footnote {
                children: vec![Paragraph {
                    children: content,
                    options: ParagraphOptions::default(),
                }],
            },
        );
        self.current.push(Inline::FootnoteReference { id });
    }

    /// The footnotes rendered so far.
    pub fn footnotes(&self) -> &BTreeMap<u32, Footnote> {
        &self.footnotes
    }

    // Sections

    /// The sections created so far.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// The index of the section receiving content.
    pub fn current_section(&self) -> usize {
        self.current_section
    }

    /// Moves on to the next existing section. On the last section this does
    /// nothing and content keeps going into it.
    pub fn next_section(&mut self) {
        if self.current_section + 1 < self.sections.len() {
            self.current_section += 1;
            debug!("switched to section {}", self.current_section);
        }
    }

    /// Appends a new section and makes it active.
    pub fn add_section(&mut self, config: SectionConfig) {
        self.sections.push(Section::new(config));
        self.current_section = self.sections.len() - 1;
        debug!("added section {}", self.current_section);
    }

    /// Merges into the configuration of the active section.
    pub fn set_section_config(&mut self, config: SectionConfig) {
        self.sections[self.current_section].config.merge(config);
    }

    // Math and references

    /// Emits math. Numbered display math takes over the whole line: the
    /// run buffer is replaced by the centered equation and its number, and
    /// the paragraph gets matching tab stops.
    pub fn emit_math(&mut self, latex: &str, options: MathOptions) {
        let math = Inline::Math {
            latex: latex.into(),
        };
        if options.inline || !options.numbered {
            self.current.push(math);
            return;
        }

        let id = options.id.unwrap_or_else(|| self.ids.next("eq"));
        self.current = vec![
            Inline::Tab,
            math,
            Inline::Tab,
            Inline::text("("),
            sequence_bookmark(id, "Equation", None),
            Inline::text(")"),
        ];
        self.add_paragraph_options(ParagraphOptions {
            tab_stops: Some(vec![
                TabStop {
                    kind: TabStopKind::Center,
                    position: TAB_STOP_MAX / 2,
                },
                TabStop {
                    kind: TabStopKind::Right,
                    position: TAB_STOP_MAX,
                },
            ]),
            ..ParagraphOptions::default()
        });
    }

    /// Emits an auto-numbered counter for `sequence` inside a bookmark,
    /// preceded by `label` within the same bookmark. A reference to the
    /// bookmark shows both. Returns the bookmark id.
    pub fn emit_sequence(
        &mut self,
        sequence: &str,
        id: Option<EcoString>,
        label: Option<&str>,
    ) -> EcoString {
        let id = id.unwrap_or_else(|| self.ids.next("seq"));
        self.current
            .push(sequence_bookmark(id.clone(), sequence, label));
        id
    }

    /// Emits a cross-reference to the bookmark `id`, with optional literal
    /// text around it. The office application resolves the reference.
    pub fn create_reference(&mut self, id: &str, before: Option<&str>, after: Option<&str>) {
        let mut children = Vec::new();
        if let Some(before) = before.filter(|s| !s.is_empty()) {
            children.push(Inline::text(before));
        }
        children.push(Inline::Field {
            instruction: eco_format!("REF {id} \\h"),
        });
        if let Some(after) = after.filter(|s| !s.is_empty()) {
            children.push(Inline::text(after));
        }

        self.current.push(Inline::InternalHyperlink {
            anchor: id.into(),
            children,
        });
    }

    /// Finishes the serialization.
    pub fn into_description(mut self) -> DocumentDescription {
        self.close_link();
        if !self.current.is_empty() {
            warn!(
                "dropping {} inline elements that were never closed into a paragraph",
                self.current.len()
            );
        }

        DocumentDescription {
            sections: self.sections,
            numbering: self.numbering.into_definitions(),
            footnotes: self.footnotes,
        }
    }
}

fn sequence_bookmark(id: EcoString, sequence: &str, label: Option<&str>) -> Inline {
    let mut children = Vec::with_capacity(2);
    if let Some(label) = label.filter(|s| !s.is_empty()) {
        children.push(Inline::text(label));
    }
    children.push(Inline::SequenceIdentifier {
        sequence: sequence.into(),
    });

    Inline::Bookmark { id, children }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> SerializationState {
        SerializationState::new([], 600.0)
    }

    fn texts(inlines: &[Inline]) -> Vec<&str> {
        inlines
            .iter()
            .filter_map(|inline| match inline {
                Inline::Text(run) => Some(run.text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn pending_run_options_are_single_use() {
        let mut s = state();
        s.set_pending_run_options(RunOptions {
            bold: Some(true),
            ..RunOptions::default()
        });
        s.set_pending_run_options(RunOptions {
            italics: Some(true),
            ..RunOptions::default()
        });
        s.emit_text("", RunOptions::default());
        s.emit_text("a", RunOptions::default());
        s.emit_text("b", RunOptions::default());

        let [Inline::Text(a), Inline::Text(b)] = s.current() else {
            panic!("expected two runs, got {:?}", s.current());
        };
        assert_eq!(a.options.bold, Some(true));
        assert_eq!(a.options.italics, Some(true));
        assert!(b.options.is_empty());
    }

    #[test]
    fn override_wins_over_pending() {
        let mut s = state();
        s.set_pending_run_options(RunOptions {
            bold: Some(true),
            ..RunOptions::default()
        });
        s.emit_text(
            "a",
            RunOptions {
                bold: Some(false),
                ..RunOptions::default()
            },
        );

        let [Inline::Text(a)] = s.current() else {
            panic!("expected one run");
        };
        assert_eq!(a.options.bold, Some(false));
    }

    #[test]
    fn close_block_consumes_pending_paragraph_options() {
        let mut s = state();
        s.add_paragraph_options(ParagraphOptions::style("A"));
        s.add_paragraph_options(ParagraphOptions {
            alignment: Some(Alignment::Center),
            ..ParagraphOptions::default()
        });
        s.emit_text("x", RunOptions::default());
        s.close_block(ParagraphOptions::style("B"));
        s.close_block(ParagraphOptions::default());

        let blocks = &s.sections()[0].children;
        let [Block::Paragraph(first), Block::Paragraph(second)] = blocks.as_slice() else {
            panic!("expected two paragraphs");
        };
        assert_eq!(first.options.style.as_deref(), Some("B"));
        assert_eq!(first.options.alignment, Some(Alignment::Center));
        assert_eq!(texts(&first.children), ["x"]);
        assert_eq!(second, &Paragraph::default());
        assert!(s.current().is_empty());
    }

    #[test]
    fn links_wrap_contiguous_runs() {
        let mut s = state();
        s.emit_text("before", RunOptions::default());
        s.open_link("https://a");
        s.emit_text("a", RunOptions::default());
        s.open_link("https://a");
        s.emit_text("b", RunOptions::default());
        s.open_link("https://b");
        s.emit_text("c", RunOptions::default());
        s.close_link();
        s.close_link();

        let [
            Inline::Text(before),
            Inline::ExternalHyperlink { link: first, children: a },
            Inline::ExternalHyperlink { link: second, children: b },
        ] = s.current()
        else {
            panic!("unexpected buffer {:?}", s.current());
        };
        assert_eq!(before.text, "before");
        assert_eq!(first, "https://a");
        assert_eq!(texts(a), ["a", "b"]);
        assert_eq!(second, "https://b");
        assert_eq!(texts(b), ["c"]);
    }

    #[test]
    fn list_tracker_shares_one_definition() {
        let mut s = state();
        assert!(s.begin_list_item().unwrap_err().is_no_active_list());

        s.enter_list(ListStyle::Bullets);
        s.enter_list(ListStyle::Numbered);
        let list = s.list().unwrap().clone();
        assert_eq!(list.level, 1);
        s.leave_list();
        assert_eq!(s.list().unwrap().level, 0);
        s.leave_list();
        assert!(s.list().is_none());

        let description = s.into_description();
        assert_eq!(description.numbering.len(), 1);
        assert_eq!(description.numbering[0].reference, list.reference);
        assert_eq!(description.numbering[0].style, ListStyle::Bullets);
    }

    #[test]
    fn isolated_containers_do_not_leak_into_sections() {
        let mut s = state();
        s.begin_isolated_container();
        s.close_block(ParagraphOptions::default());
        let cell = s.end_isolated_container();

        assert_eq!(cell.len(), 1);
        assert!(s.sections()[0].children.is_empty());
    }

    #[test]
    fn footnote_restores_outer_buffer() {
        let mut s = state();
        s.emit_text("outer", RunOptions::default());
        s.set_pending_run_options(RunOptions::style("Pending"));

        let scope = s.begin_footnote();
        assert!(s.current().is_empty());
        assert!(s.pending_run_options().is_empty());
        s.emit_text("inner", RunOptions::default());
        s.end_footnote(scope);

        assert_eq!(texts(s.current()), ["outer"]);
        assert_eq!(s.current()[1], Inline::FootnoteReference { id: 1 });
        assert_eq!(s.pending_run_options().style.as_deref(), Some("Pending"));
        assert_eq!(texts(&s.footnotes()[&1].children[0].children), ["inner"]);
    }

    #[test]
    fn sections_switch_and_merge() {
        let mut s = SerializationState::new(
            [SectionConfig::default(), SectionConfig::default()],
            600.0,
        );
        s.next_section();
        s.next_section();
        assert_eq!(s.current_section(), 1);

        s.add_section(SectionConfig::default());
        assert_eq!(s.current_section(), 2);
        s.set_section_config(SectionConfig {
            headers: Some(HeaderFooter {
                default: Some("Head".into()),
                ..HeaderFooter::default()
            }),
            ..SectionConfig::default()
        });
        s.close_block(ParagraphOptions::default());

        assert_eq!(s.sections()[2].children.len(), 1);
        assert!(s.sections()[2].config.headers.is_some());
        assert!(s.sections()[1].config.headers.is_none());
    }

    #[test]
    fn numbered_math_replaces_buffer() {
        let mut s = state();
        s.emit_text("lost", RunOptions::default());
        s.emit_math(
            "x^2",
            MathOptions {
                numbered: true,
                id: Some("eq-custom".into()),
                ..MathOptions::default()
            },
        );

        assert_eq!(s.current().len(), 6);
        assert_eq!(s.current()[0], Inline::Tab);
        assert_eq!(
            s.current()[4],
            sequence_bookmark("eq-custom".into(), "Equation", None)
        );
        let stops = s.pending_paragraph_options().tab_stops.clone().unwrap();
        assert_eq!(stops[0].position, 4513);
        assert_eq!(stops[1].kind, TabStopKind::Right);
    }

    #[test]
    fn reference_skips_empty_affixes() {
        let mut s = state();
        s.create_reference("fig-1", Some("see "), Some(""));

        let [Inline::InternalHyperlink { anchor, children }] = s.current() else {
            panic!("expected one hyperlink");
        };
        assert_eq!(anchor, "fig-1");
        assert_eq!(children.len(), 2);
        assert_eq!(
            children[1],
            Inline::Field {
                instruction: "REF fig-1 \\h".into()
            }
        );
    }

    #[test]
    fn sequence_label_lives_inside_the_bookmark() {
        let mut s = state();
        let id = s.emit_sequence("Figure", None, Some("Figure "));

        assert_eq!(id.as_str(), "seq-1");
        let [Inline::Bookmark { id, children }] = s.current() else {
            panic!("expected one bookmark");
        };
        assert_eq!(id, "seq-1");
        assert_eq!(
            *children,
            vec![
                Inline::text("Figure "),
                Inline::SequenceIdentifier {
                    sequence: "Figure".into()
                },
            ]
        );
    }
}
