//! Images, math, captions and cross-references.

use ecow::{EcoString, eco_format};
use log::warn;

use super::{Renderer, str_attr};
use crate::Result;
use crate::error::Error;
use crate::model::Node;
use crate::output::{Alignment, ImageRun, Inline, ParagraphOptions, RunOptions};
use crate::resolver::image_size;
use crate::state::MathOptions;

/// The paragraph style of captions.
pub const CAPTION_STYLE: &str = "Caption";

impl Renderer<'_> {
    /// Resolves an image and appends it, scaled against the current maximum
    /// image width. Images whose size cannot be decoded are skipped.
    pub(crate) async fn render_image(&mut self, node: &Node) -> Result<()> {
        let src = node
            .attrs
            .str("src")
            .ok_or_else(|| Error::attribute(node.kind.clone(), "src"))?;
        let data = self.resolver.resolve(src).await?;

        let Some((width, height)) = image_size(&data).filter(|&(w, h)| w > 0 && h > 0) else {
            warn!("skipping image `{src}`: cannot decode its size");
            return Ok(());
        };

        let percent = node.attrs.f64("width").unwrap_or(self.image_width_percent);
        let display_width = self.state.max_image_width() * percent / 100.0;
        let display_height = display_width * f64::from(height) / f64::from(width);

        self.state.push_inline(Inline::Image(ImageRun {
            src: src.into(),
            data,
            width: display_width,
            height: display_height,
        }));

        let alignment = match node.attrs.str("align") {
            Some("left") => Alignment::Left,
            Some("right") => Alignment::Right,
            _ => Alignment::Center,
        };
        self.state.add_paragraph_options(ParagraphOptions {
            alignment: Some(alignment),
            ..ParagraphOptions::default()
        });
        Ok(())
    }

    pub(crate) fn render_inline_math(&mut self, node: &Node) {
        self.state.emit_math(&latex(node), MathOptions::inline());
    }

    /// Display math, numbered when `attrs.numbered` is set.
    pub(crate) fn render_equation(&mut self, node: &Node) {
        let options = MathOptions {
            inline: false,
            numbered: node.attrs.bool("numbered").unwrap_or(false),
            id: str_attr(node, "id"),
        };
        self.state.emit_math(&latex(node), options);
    }

    /// Renders e.g. `Figure 2: A cat` where the number is a field the
    /// office application computes.
    pub(crate) async fn render_caption(&mut self, node: &Node) -> Result<()> {
        let sequence = node.attrs.str("sequence").unwrap_or("Figure");

        let label = eco_format!("{sequence} ");
        self.state
            .emit_sequence(sequence, str_attr(node, "id"), Some(label.as_str()));
        self.state.emit_text(": ", RunOptions::default());

        self.render_inline(node).await?;
        self.state.close_block(ParagraphOptions::style(CAPTION_STYLE));
        Ok(())
    }

    pub(crate) fn render_cross_reference(&mut self, node: &Node) -> Result<()> {
        let id = node
            .attrs
            .str("id")
            .ok_or_else(|| Error::attribute(node.kind.clone(), "id"))?;
        self.state
            .create_reference(id, node.attrs.str("before"), node.attrs.str("after"));
        Ok(())
    }
}

/// The LaTeX source of a math node, from `attrs.latex` or its text.
fn latex(node: &Node) -> EcoString {
    str_attr(node, "latex").unwrap_or_else(|| node.text_content())
}
