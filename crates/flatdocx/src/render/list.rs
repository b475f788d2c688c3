//! Ordered and bullet lists.

use super::Renderer;
use crate::Result;
use crate::model::Node;
use crate::output::ListStyle;

impl Renderer<'_> {
    /// Renders a list. Nested lists share the numbering of the outermost
    /// list and only go one level deeper.
    pub(crate) async fn render_list(&mut self, node: &Node, style: ListStyle) -> Result<()> {
        self.state.enter_list(style);
        let res = self.render_content(node, None).await;
        self.state.leave_list();
        res
    }

    /// Renders a list item. Its first paragraph picks up the numbering.
    pub(crate) async fn render_list_item(&mut self, node: &Node) -> Result<()> {
        self.state.begin_list_item()?;
        self.render_content(node, None).await
    }
}
