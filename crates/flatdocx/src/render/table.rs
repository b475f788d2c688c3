//! Tables.

use log::debug;

use super::Renderer;
use crate::Result;
use crate::error::Error;
use crate::model::Node;
use crate::output::{Block, ParagraphOptions, Table, TableCell, TableRow};
use crate::schema::NodeKind;

impl Renderer<'_> {
    /// Renders a table. Every cell renders into its own container, and
    /// images in a row share the configured maximum image width, also in
    /// nested tables.
    pub(crate) async fn render_table(&mut self, node: &Node) -> Result<()> {
        let actual_width = self.state.max_image_width();
        let res = self.render_rows(node).await;
        self.state.set_max_image_width(actual_width);
        let table = res?;

        debug!("table with {} rows", table.rows.len());
        self.state.push_block(Block::Table(table));
        self.state.close_block(ParagraphOptions::default());
        Ok(())
    }

    async fn render_rows(&mut self, node: &Node) -> Result<Table> {
        let mut rows = Vec::with_capacity(node.content.len());

        for row in &node.content {
            if NodeKind::lookup(&row.kind)? != NodeKind::TableRow {
                return Err(Error::misplaced_node(row.kind.clone(), Some(node.kind.as_str())));
            }

            if !row.content.is_empty() {
                self.state
                    .set_max_image_width(self.max_image_width / row.content.len() as f64);
            }

            let mut cells = Vec::with_capacity(row.content.len());
            let mut is_header_row = true;
            for cell in &row.content {
                let kind = NodeKind::lookup(&cell.kind)?;
                if !kind.is_cell() {
                    return Err(Error::misplaced_node(cell.kind.clone(), Some(row.kind.as_str())));
                }
                is_header_row &= kind == NodeKind::TableHeader;
                cells.push(self.render_cell(cell).await?);
            }

            rows.push(TableRow {
                cells,
                is_header_row,
            });
        }

        Ok(Table { rows })
    }

    async fn render_cell(&mut self, cell: &Node) -> Result<TableCell> {
        self.state.begin_isolated_container();
        let res = self.render_content(cell, None).await;
        let children = self.state.end_isolated_container();
        res?;

        Ok(TableCell {
            children,
            column_span: span(cell, "colspan"),
            row_span: span(cell, "rowspan"),
        })
    }
}

/// Reads a span attribute, keeping only real spans.
fn span(cell: &Node, name: &str) -> Option<u32> {
    cell.attrs
        .u64(name)
        .filter(|&n| n > 1)
        .and_then(|n| u32::try_from(n).ok())
}
