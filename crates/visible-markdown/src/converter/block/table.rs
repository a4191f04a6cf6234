//! Data tables and layout tables.

use tracing::debug;

use crate::converter::context::{Context, ProcessResult};
use crate::converter::main::Synthesizer;
use crate::converter::markdown;
use crate::converter::text::escape_table_cell;
use crate::dom::{Document, NodeId};

/// Tables used for page layout rather than tabular data: explicit
/// presentation roles, or no header cell anywhere inside.
pub(crate) fn is_layout_table(doc: &Document, id: NodeId) -> bool {
    let Some(element) = doc.element(id) else {
        return true;
    };
    if matches!(element.attr("role").map(str::trim), Some("presentation" | "none")) {
        return true;
    }
    !doc.descendants(id).any(|node| doc.tag(node) == Some("th"))
}

/// Rows of a table in document order, flagged when they sit in `<thead>`.
fn collect_rows(doc: &Document, table: NodeId) -> Vec<(NodeId, bool)> {
    let mut rows = Vec::new();
    for child in doc.element_children(table) {
        match doc.tag(child) {
            Some("tr") => rows.push((child, false)),
            Some(section @ ("thead" | "tbody" | "tfoot")) => {
                let in_head = section == "thead";
                rows.extend(
                    doc.element_children(child)
                        .filter(|row| doc.tag(*row) == Some("tr"))
                        .map(|row| (row, in_head)),
                );
            }
            _ => {}
        }
    }
    rows
}

struct TableRow {
    cells: Vec<String>,
    is_header: bool,
}

impl Synthesizer<'_> {
    /// Render a data table as a pipe table, or a layout table as a generic block.
    pub(crate) fn process_table(&mut self, id: NodeId, ctx: &Context) -> Option<ProcessResult> {
        if !self.within_viewport(id, ctx) {
            return None;
        }
        let doc = self.dom.doc;
        if is_layout_table(doc, id) {
            debug!(node = id.index(), "rendering layout table as blocks");
            return self.combine_children(id, ctx);
        }

        let caption = match doc.element_children(id).find(|child| doc.tag(*child) == Some("caption")) {
            Some(caption) => {
                self.visited.insert(caption);
                self.combine_children(caption, &ctx.child())
                    .and_then(|content| ProcessResult::block(markdown::paragraph(&content.markdown), caption))
            }
            None => None,
        };

        let row_ctx = ctx.child();
        let cell_ctx = row_ctx.child();
        let mut rows: Vec<TableRow> = Vec::new();
        for (row, in_head) in collect_rows(doc, id) {
            self.visited.insert(row);
            if !self.dom.is_hard_visible(row) {
                continue;
            }
            let mut cells = Vec::new();
            let mut all_header_cells = true;
            for cell in doc.element_children(row) {
                let tag = doc.tag(cell);
                if !matches!(tag, Some("td" | "th")) {
                    continue;
                }
                all_header_cells &= tag == Some("th");
                self.visited.insert(cell);
                let text = if self.dom.is_hard_visible(cell) {
                    self.combine_children(cell, &cell_ctx)
                        .map(|content| escape_table_cell(&content.markdown))
                        .unwrap_or_default()
                } else {
                    String::new()
                };
                cells.push(text);
            }
            if cells.is_empty() {
                continue;
            }
            rows.push(TableRow {
                cells,
                is_header: in_head || all_header_cells,
            });
        }
        self.mark_subtree_visited(id);

        if rows.iter().all(|row| row.cells.iter().all(String::is_empty)) {
            return caption;
        }

        let columns = rows.iter().map(|row| row.cells.len()).max().unwrap_or(1);
        let mut lines = Vec::with_capacity(rows.len() + 2);
        let mut separator_written = false;
        if !rows.iter().any(|row| row.is_header) {
            lines.push(markdown::table_row(&vec![String::new(); columns]));
            lines.push(markdown::table_separator(columns));
            separator_written = true;
        }
        for mut row in rows {
            row.cells.resize(columns, String::new());
            lines.push(markdown::table_row(&row.cells));
            if row.is_header && !separator_written {
                lines.push(markdown::table_separator(columns));
                separator_written = true;
            }
        }

        let table = ProcessResult::block(format!("{}\n\n", lines.join("\n")), id)?;
        match caption {
            Some(mut caption) => {
                caption.append(table, false);
                Some(caption.finish(id, true))
            }
            None => Some(table),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Element;

    fn table_with(cell_tag: &str, role: Option<&str>) -> (Document, NodeId) {
        let mut doc = Document::default();
        let root = doc.root();
        let mut table = Element::new("table");
        if let Some(role) = role {
            table = table.with_attr("role", role);
        }
        let table = doc.append_element(root, table);
        let tbody = doc.append_element(table, Element::new("tbody"));
        let tr = doc.append_element(tbody, Element::new("tr"));
        let cell = doc.append_element(tr, Element::new(cell_tag));
        doc.append_text(cell, "A");
        (doc, table)
    }

    #[test]
    fn test_layout_table_detection() {
        let (doc, table) = table_with("td", None);
        assert!(is_layout_table(&doc, table));
        let (doc, table) = table_with("th", None);
        assert!(!is_layout_table(&doc, table));
        let (doc, table) = table_with("th", Some("presentation"));
        assert!(is_layout_table(&doc, table));
    }

    #[test]
    fn test_rows_include_sections() {
        let (doc, table) = table_with("th", None);
        let rows = collect_rows(&doc, table);
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].1);
    }
}
