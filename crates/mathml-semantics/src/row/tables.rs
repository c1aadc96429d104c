use semantic_attr::attribute::{SemanticRole, SemanticType};

use crate::builder::{Partition, TreeBuilder};
use crate::node::{NodeId, SemanticNode};

fn is_table_or_multiline(node: &SemanticNode) -> bool {
    matches!(node.node_type, SemanticType::Table | SemanticType::MultiLine)
}

impl TreeBuilder<'_> {
    /// Rewrites fenced tables into matrices and vectors, and tables opened by a lone
    /// brace into case statements.
    pub(super) fn process_tables_in_row(&mut self, nodes: Vec<NodeId>) -> Vec<NodeId> {
        let Partition { rel, comp } = self.partition(&nodes, |n| self.is_matrix_candidate(n));
        let mut runs = comp.into_iter();
        let mut result = runs.next().unwrap_or_default();
        for (fenced, run) in rel.into_iter().zip(runs) {
            result.push(self.table_to_matrix_or_vector(fenced));
            result.extend(run);
        }

        let Partition { rel, comp } = self.partition(&result, is_table_or_multiline);
        let mut runs = comp.into_iter();
        let mut prev = runs.next().unwrap_or_default();
        let mut result = Vec::with_capacity(nodes.len());
        for (table, next) in rel.into_iter().zip(runs) {
            if let Some(&fence) = prev.last()
                && self.role(fence) == SemanticRole::OpenFence
            {
                prev.pop();
                self.table_to_cases(table, fence);
            }
            result.append(&mut prev);
            result.push(table);
            prev = next;
        }
        result.extend(prev);
        result
    }

    fn is_matrix_candidate(&self, node: &SemanticNode) -> bool {
        node.node_type == SemanticType::Fenced
            && node.role == SemanticRole::LeftRight
            && matches!(node.children[..], [child] if is_table_or_multiline(self.node(child)))
    }

    /// Unwraps the table inside a fenced node. The fences become content of the table.
    fn table_to_matrix_or_vector(&mut self, fenced: NodeId) -> NodeId {
        let [table] = self.node(fenced).children[..] else {
            return fenced;
        };
        let (node_type, role) = match self.node_type(table) {
            SemanticType::MultiLine => (SemanticType::Vector, SemanticRole::Vector),
            _ => (SemanticType::Matrix, SemanticRole::Matrix),
        };
        self.set_type(table, node_type);
        self.node_mut(table).parent = None;
        for fence in self.node(fenced).content.clone() {
            self.append_content(table, fence);
        }
        for row in self.node(table).children.clone() {
            self.assign_role_to_row(row, role);
        }
        table
    }

    fn table_to_cases(&mut self, table: NodeId, open_fence: NodeId) {
        for row in self.node(table).children.clone() {
            self.assign_role_to_row(row, SemanticRole::Cases);
        }
        self.set_type(table, SemanticType::Cases);
        self.append_content(table, open_fence);
    }

    fn assign_role_to_row(&mut self, row: NodeId, role: SemanticRole) {
        match self.node_type(row) {
            SemanticType::Line => self.set_role(row, role),
            SemanticType::Row => {
                self.set_role(row, role);
                for cell in self.node(row).children.clone() {
                    if self.node_type(cell) == SemanticType::Cell {
                        self.set_role(cell, role);
                    }
                }
            }
            _ => {}
        }
    }

    /// A table is multiline if no row has more than one cell.
    pub(crate) fn table_is_multiline(&self, table: NodeId) -> bool {
        self.node(table)
            .children
            .iter()
            .all(|&row| self.node(row).children.len() <= 1)
    }

    pub(crate) fn table_to_multiline(&mut self, table: NodeId) {
        self.set_type(table, SemanticType::MultiLine);
        for row in self.node(table).children.clone() {
            self.row_to_line(row, SemanticRole::MultiLine);
        }
    }

    /// Turns a single-cell row into a line holding the cell's content directly.
    fn row_to_line(&mut self, row: NodeId, role: SemanticRole) {
        if self.node_type(row) != SemanticType::Row {
            return;
        }
        let [cell] = self.node(row).children[..] else {
            return;
        };
        if self.node_type(cell) != SemanticType::Cell {
            return;
        }
        let content = self.node(cell).children.clone();
        for &child in &content {
            self.node_mut(child).parent = Some(row);
        }
        let node = self.node_mut(row);
        node.node_type = SemanticType::Line;
        node.role = role;
        node.children = content;
    }
}

#[cfg(test)]
mod tests {
    use semantic_attr::symbol::SymbolTable;

    use super::*;
    use crate::mathml::Document;
    use crate::row::tests::leaves;

    /// A table with one row per entry, each row holding one cell per leaf text.
    fn table(builder: &mut TreeBuilder<'_>, rows: &[&[&str]]) -> NodeId {
        let rows = rows
            .iter()
            .map(|cells| {
                let cells = leaves(builder, cells)
                    .into_iter()
                    .map(|leaf| {
                        let cell =
                            builder.make_branch(SemanticType::Cell, vec![leaf], vec![], None);
                        builder.set_role(cell, SemanticRole::Table);
                        cell
                    })
                    .collect();
                let row = builder.make_branch(SemanticType::Row, cells, vec![], None);
                builder.set_role(row, SemanticRole::Table);
                row
            })
            .collect();
        let table = builder.make_branch(SemanticType::Table, rows, vec![], None);
        if builder.table_is_multiline(table) {
            builder.table_to_multiline(table);
        }
        table
    }

    #[test]
    fn multiline_detection() {
        let doc = Document::new("math");
        let mut builder = TreeBuilder::new(&doc, &SymbolTable);
        let grid = table(&mut builder, &[&["a", "b"], &["c", "d"]]);
        assert_eq!(builder.node_type(grid), SemanticType::Table);

        let lines = table(&mut builder, &[&["a"], &["b"]]);
        assert_eq!(builder.node_type(lines), SemanticType::MultiLine);
        let first = builder.node(lines).children()[0];
        assert_eq!(builder.node_type(first), SemanticType::Line);
        assert_eq!(builder.role(first), SemanticRole::MultiLine);
        let [leaf] = builder.node(first).children()[..] else {
            panic!("expected the cell content");
        };
        assert_eq!(builder.text(leaf), "a");
        assert_eq!(builder.node(leaf).parent(), Some(first));
    }

    #[test]
    fn fenced_table_becomes_matrix() {
        let doc = Document::new("math");
        let mut builder = TreeBuilder::new(&doc, &SymbolTable);
        let mut row = leaves(&mut builder, &["("]);
        let grid = table(&mut builder, &[&["a", "b"], &["c", "d"]]);
        row.push(grid);
        row.extend(leaves(&mut builder, &[")"]));
        let fences = [row[0], row[2]];

        let row = builder.get_fences_in_row(row);
        let result = builder.process_tables_in_row(row);
        assert_eq!(result, [grid]);
        let matrix = builder.node(grid);
        assert_eq!(matrix.node_type(), SemanticType::Matrix);
        assert_eq!(matrix.content_nodes(), fences);
        assert_eq!(matrix.parent(), None);
        let first_row = matrix.children()[0];
        assert_eq!(builder.role(first_row), SemanticRole::Matrix);
        let cell = builder.node(first_row).children()[1];
        assert_eq!(builder.role(cell), SemanticRole::Matrix);
    }

    #[test]
    fn fenced_multiline_becomes_vector() {
        let doc = Document::new("math");
        let mut builder = TreeBuilder::new(&doc, &SymbolTable);
        let mut row = leaves(&mut builder, &["["]);
        let lines = table(&mut builder, &[&["a"], &["b"]]);
        row.push(lines);
        row.extend(leaves(&mut builder, &["]"]));

        let row = builder.get_fences_in_row(row);
        let result = builder.process_tables_in_row(row);
        assert_eq!(result, [lines]);
        assert_eq!(builder.node_type(lines), SemanticType::Vector);
        let line = builder.node(lines).children()[0];
        assert_eq!(builder.role(line), SemanticRole::Vector);
    }

    #[test]
    fn open_brace_makes_cases() {
        let doc = Document::new("math");
        let mut builder = TreeBuilder::new(&doc, &SymbolTable);
        let mut row = leaves(&mut builder, &["f", "=", "{"]);
        let grid = table(&mut builder, &[&["1", "x"], &["0", "y"]]);
        row.push(grid);
        let (f, eq, brace) = (row[0], row[1], row[2]);

        let row = builder.get_fences_in_row(row);
        let result = builder.process_tables_in_row(row);
        assert_eq!(result, [f, eq, grid]);
        let cases = builder.node(grid);
        assert_eq!(cases.node_type(), SemanticType::Cases);
        assert_eq!(cases.content_nodes(), [brace]);
        assert_eq!(builder.role(brace), SemanticRole::OpenFence);
        assert_eq!(builder.role(cases.children()[1]), SemanticRole::Cases);
    }

    #[test]
    fn other_rows_pass_through() {
        let doc = Document::new("math");
        let mut builder = TreeBuilder::new(&doc, &SymbolTable);
        let row = leaves(&mut builder, &["a", "+", "b"]);
        assert_eq!(builder.process_tables_in_row(row.clone()), row);
    }
}
