//! Tree traversal, driving the serialization state.
//!
//! There is a single traversal for synchronous and suspending image
//! resolvers. It is written as async code and visits siblings strictly one
//! after another, so a suspended visitor always finishes before the next
//! sibling starts. Synchronous callers drive it with a blocking executor.

mod inline;
mod list;
mod media;
mod table;

pub use media::CAPTION_STYLE;

use ecow::EcoString;
use futures::future::{FutureExt, LocalBoxFuture};
use log::trace;

use crate::Result;
use crate::SerializeOptions;
use crate::error::Error;
use crate::model::Node;
use crate::output::{ListStyle, ParagraphOptions, RunOptions, SectionConfig};
use crate::resolver::ImageResolver;
use crate::schema::{MONOSPACE_FONT, NodeKind};
use crate::state::{QUOTE_STYLE, SerializationState};

/// The paragraph style of code block lines.
pub const CODE_STYLE: &str = "CodeBlock";

/// Walks a source tree and feeds it into a [`SerializationState`].
pub struct Renderer<'r> {
    state: SerializationState,
    resolver: &'r dyn ImageResolver,
    /// The configured maximum image width, shared out between table cells.
    max_image_width: f64,
    image_width_percent: f64,
}

impl<'r> Renderer<'r> {
    /// Creates a renderer with a fresh state.
    pub fn new(options: &SerializeOptions, resolver: &'r dyn ImageResolver) -> Self {
        Self {
            state: SerializationState::new(options.sections.clone(), options.max_image_width),
            resolver,
            max_image_width: options.max_image_width,
            image_width_percent: options.image_width_percent,
        }
    }

    /// Consumes the renderer.
    pub fn into_state(self) -> SerializationState {
        self.state
    }

    /// Visits one node. `parent` and `index` locate the node among its
    /// siblings; the document root has no parent.
    pub fn render<'a>(
        &'a mut self,
        node: &'a Node,
        parent: Option<&'a Node>,
        index: usize,
    ) -> LocalBoxFuture<'a, Result<()>> {
        async move {
            let kind = NodeKind::lookup(&node.kind)?;
            trace!(
                "visiting {} #{index} of {}",
                node.kind,
                parent.map_or("<root>", |p| p.kind.as_str())
            );

            match kind {
                NodeKind::Doc => self.render_content(node, None).await,
                NodeKind::Text => {
                    let text = node.text.as_deref().unwrap_or_default();
                    self.state.emit_text(text, RunOptions::default());
                    Ok(())
                }
                NodeKind::Paragraph => {
                    self.render_inline(node).await?;
                    self.state.close_block(ParagraphOptions::default());
                    Ok(())
                }
                NodeKind::Heading => {
                    self.render_inline(node).await?;
                    self.state.close_block(ParagraphOptions {
                        heading: Some(heading_level(node)),
                        ..ParagraphOptions::default()
                    });
                    Ok(())
                }
                NodeKind::Blockquote => {
                    let quote = ParagraphOptions::style(QUOTE_STYLE);
                    self.render_content(node, Some(quote)).await
                }
                NodeKind::CodeBlock => {
                    self.render_code_block(node);
                    Ok(())
                }
                NodeKind::HorizontalRule => {
                    self.state.close_block(ParagraphOptions {
                        thematic_break: Some(true),
                        ..ParagraphOptions::default()
                    });
                    self.state.close_block(ParagraphOptions::default());
                    Ok(())
                }
                NodeKind::HardBreak => {
                    self.state.set_pending_run_options(RunOptions {
                        break_before: Some(1),
                        ..RunOptions::default()
                    });
                    Ok(())
                }
                NodeKind::OrderedList => self.render_list(node, ListStyle::Numbered).await,
                NodeKind::BulletList => self.render_list(node, ListStyle::Bullets).await,
                NodeKind::ListItem => self.render_list_item(node).await,
                NodeKind::Image => {
                    self.render_image(node).await?;
                    self.state.close_block(ParagraphOptions::default());
                    Ok(())
                }
                NodeKind::Math => {
                    self.render_inline_math(node);
                    Ok(())
                }
                NodeKind::Equation => {
                    self.render_equation(node);
                    self.state.close_block(ParagraphOptions::default());
                    Ok(())
                }
                NodeKind::Caption => self.render_caption(node).await,
                NodeKind::Table => self.render_table(node).await,
                NodeKind::TableRow | NodeKind::TableCell | NodeKind::TableHeader => Err(
                    Error::misplaced_node(node.kind.clone(), parent.map(|p| p.kind.as_str())),
                ),
                NodeKind::Footnote => self.render_footnote(node).await,
                NodeKind::CrossReference => self.render_cross_reference(node),
                NodeKind::SectionBreak => self.render_section_break(node),
            }
        }
        .boxed_local()
    }

    /// Visits all children of `parent` in order. `options`, when given, is
    /// added to the pending paragraph options before each child.
    pub async fn render_content(
        &mut self,
        parent: &Node,
        options: Option<ParagraphOptions>,
    ) -> Result<()> {
        for (index, child) in parent.content.iter().enumerate() {
            if let Some(options) = &options {
                self.state.add_paragraph_options(options.clone());
            }
            self.render(child, Some(parent), index).await?;
        }
        Ok(())
    }

    /// Writes each line of a code block as its own paragraph.
    fn render_code_block(&mut self, node: &Node) {
        let code = node.text_content();
        let mono = RunOptions {
            font: Some(MONOSPACE_FONT.into()),
            ..RunOptions::default()
        };

        for line in code.split('\n') {
            self.state.emit_text(line, mono.clone());
            self.state.close_block(ParagraphOptions::style(CODE_STYLE));
        }
    }

    /// Starts a new section when the node carries a configuration, otherwise
    /// moves on to the next existing section.
    fn render_section_break(&mut self, node: &Node) -> Result<()> {
        match node.attrs.get("config") {
            Some(config) => {
                let config = serde_json::from_value::<SectionConfig>(config.clone())
                    .map_err(|_| Error::attribute(node.kind.clone(), "config"))?;
                self.state.add_section(config);
            }
            None => self.state.next_section(),
        }
        Ok(())
    }
}

fn heading_level(node: &Node) -> u8 {
    node.attrs.u64("level").unwrap_or(1).clamp(1, 6) as u8
}

/// Reads an optional string attribute.
fn str_attr(node: &Node, name: &str) -> Option<EcoString> {
    node.attrs.str(name).map(EcoString::from)
}
