//! Inline content: text runs, hyperlinks and footnotes.

use super::Renderer;
use crate::Result;
use crate::error::Error;
use crate::model::Node;
use crate::schema::mark_options;

impl Renderer<'_> {
    /// Renders the children of an inline container into the run buffer.
    ///
    /// Consecutive children with the same link target end up in one
    /// hyperlink. A hyperlink that was open around this container is
    /// detached while the children render and reattached afterwards.
    pub(crate) async fn render_inline(&mut self, parent: &Node) -> Result<()> {
        let outer = self.state.take_link();

        for (index, child) in parent.content.iter().enumerate() {
            match child.link_mark() {
                Some(mark) => {
                    let href = mark
                        .attrs
                        .str("href")
                        .ok_or_else(|| Error::attribute(mark.kind.clone(), "href"))?;
                    self.state.open_link(href);
                }
                None => self.state.close_link(),
            }

            if child.is_text() {
                let options = mark_options(&child.marks)?;
                let text = child.text.as_deref().unwrap_or_default();
                self.state.emit_text(text, options);
            } else {
                self.render(child, Some(parent), index).await?;
            }
        }

        self.state.close_link();
        self.state.restore_link(outer);
        Ok(())
    }

    /// Renders a footnote body out of line and leaves a reference to it in
    /// the run buffer.
    pub(crate) async fn render_footnote(&mut self, node: &Node) -> Result<()> {
        let scope = self.state.begin_footnote();
        let res = self.render_inline(node).await;
        self.state.end_footnote(scope);
        res
    }
}
