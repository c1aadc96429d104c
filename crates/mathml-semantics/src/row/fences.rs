use std::collections::VecDeque;

use semantic_attr::attribute::{SemanticRole, SemanticType};

use crate::builder::{Partition, TreeBuilder};
use crate::node::NodeId;

type ContentQueue = VecDeque<Vec<NodeId>>;

impl TreeBuilder<'_> {
    /// Matches the fences of a row and wraps every matched pair into a FENCED node.
    ///
    /// Fences that find no partner are turned into punctuation.
    pub(super) fn get_fences_in_row(&mut self, nodes: Vec<NodeId>) -> Vec<NodeId> {
        let Partition { rel, comp } =
            self.partition(&nodes, |n| n.node_type == SemanticType::Fence);
        let mut content: ContentQueue = comp.into();
        let first = content.pop_front().unwrap_or_default();
        self.process_fences(rel.into(), content, Vec::new(), vec![first])
    }

    /// The matching automaton.
    ///
    /// `content_stack` always holds one more entry than `open_stack`: the nodes before the
    /// first open fence, then the nodes after each open fence.
    fn process_fences(
        &mut self,
        mut fences: VecDeque<NodeId>,
        mut content: ContentQueue,
        mut open_stack: Vec<NodeId>,
        mut content_stack: Vec<Vec<NodeId>>,
    ) -> Vec<NodeId> {
        while let Some(fence) = fences.pop_front() {
            let next = content.pop_front().unwrap_or_default();
            let role = self.role(fence);
            let last_open = open_stack.last().copied();
            let same_text = last_open.is_some_and(|open| self.text(open) == self.text(fence));

            if role == SemanticRole::Open || (role == SemanticRole::Neutral && !same_text) {
                open_stack.push(fence);
                content_stack.push(next);
                continue;
            }

            let last_role = last_open.map(|open| self.role(open));
            if let Some(open) = last_open
                && ((role == SemanticRole::Close && last_role == Some(SemanticRole::Open))
                    || (role == SemanticRole::Neutral && same_text))
            {
                open_stack.pop();
                let inner = content_stack.pop().unwrap_or_default();
                let fenced = self.make_horizontal_fenced_node(open, fence, inner);
                splice_fenced(&mut content_stack, fenced, next);
                continue;
            }

            // A closing fence above neutral fences: match it with the nearest open fence
            // and pair up the neutral fences in between.
            if role == SemanticRole::Close
                && last_role == Some(SemanticRole::Neutral)
                && let Some(pos) = open_stack
                    .iter()
                    .rposition(|&open| self.role(open) == SemanticRole::Open)
            {
                let open = open_stack[pos];
                let neutrals = open_stack.split_off(pos + 1);
                open_stack.truncate(pos);
                let right = content_stack.pop().unwrap_or_default();
                let between: ContentQueue = content_stack.split_off(pos + 2).into();
                let inner_nodes = self.process_neutral_fences(&neutrals, between);
                let mut inner = content_stack.pop().unwrap_or_default();
                inner.extend(inner_nodes);
                inner.extend(right);
                let fenced = self.make_horizontal_fenced_node(open, fence, inner);
                splice_fenced(&mut content_stack, fenced, next);
                continue;
            }

            self.fence_to_punct(fence);
            if let Some(top) = content_stack.last_mut() {
                top.push(fence);
                top.extend(next);
            }
        }

        if open_stack.is_empty() {
            return content_stack.into_iter().next().unwrap_or_default();
        }
        self.close_leftover_fences(&open_stack, content_stack.into())
    }

    /// Flattens what is left on the stacks once the row is exhausted.
    ///
    /// Open fences become punctuation. Runs of neutral fences between them are still paired
    /// up among themselves.
    fn close_leftover_fences(
        &mut self,
        open_stack: &[NodeId],
        mut content_stack: ContentQueue,
    ) -> Vec<NodeId> {
        let mut result = content_stack.pop_front().unwrap_or_default();
        let mut index = 0;
        while let Some(&fence) = open_stack.get(index) {
            if self.role(fence) == SemanticRole::Open {
                self.fence_to_punct(fence);
                result.push(fence);
                index += 1;
            } else {
                let end = open_stack[index..]
                    .iter()
                    .position(|&open| self.role(open) == SemanticRole::Open)
                    .map_or(open_stack.len(), |pos| index + pos);
                let neutrals = &open_stack[index..end];
                let cut = (neutrals.len() - 1).min(content_stack.len());
                let between: ContentQueue = content_stack.drain(..cut).collect();
                result.extend(self.process_neutral_fences(neutrals, between));
                index = end;
            }
            result.extend(content_stack.pop_front().unwrap_or_default());
        }
        result
    }

    /// Pairs up neutral fences with equal text, greedily from the left.
    ///
    /// `content` holds the runs strictly between consecutive fences. Unpaired fences become
    /// VBAR punctuation.
    fn process_neutral_fences(
        &mut self,
        fences: &[NodeId],
        mut content: ContentQueue,
    ) -> Vec<NodeId> {
        let [first, rest @ ..] = fences else {
            return Vec::new();
        };
        if rest.is_empty() {
            self.fence_to_punct(*first);
            return vec![*first];
        }
        let partner = rest.iter().position(|&fence| self.text(fence) == self.text(*first));
        let Some(pos) = partner else {
            self.fence_to_punct(*first);
            let mut result = vec![*first];
            result.extend(content.pop_front().unwrap_or_default());
            result.extend(self.process_neutral_fences(rest, content));
            return result;
        };
        let (mid, [right, tail @ ..]) = rest.split_at(pos) else {
            return Vec::new();
        };
        let mut new_content = self.combine_fenced_content(*first, *right, mid, content);
        let mut result = new_content.pop_front().unwrap_or_default();
        if !tail.is_empty() {
            result.extend(self.process_neutral_fences(tail, new_content));
        }
        result
    }

    /// Builds the FENCED node for a matched neutral pair and puts it in front of the run
    /// that follows the right fence.
    fn combine_fenced_content(
        &mut self,
        left: NodeId,
        right: NodeId,
        mid: &[NodeId],
        mut content: ContentQueue,
    ) -> ContentQueue {
        let inner = if mid.is_empty() {
            content.pop_front().unwrap_or_default()
        } else {
            let mut inner = content.pop_front().unwrap_or_default();
            let cut = (mid.len() - 1).min(content.len());
            let between: ContentQueue = content.drain(..cut).collect();
            let right_content = content.pop_front().unwrap_or_default();
            inner.extend(self.process_neutral_fences(mid, between));
            inner.extend(right_content);
            inner
        };
        let fenced = self.make_horizontal_fenced_node(left, right, inner);
        match content.front_mut() {
            Some(following) => following.insert(0, fenced),
            None => content.push_back(vec![fenced]),
        }
        content
    }

    fn make_horizontal_fenced_node(
        &mut self,
        open: NodeId,
        close: NodeId,
        content: Vec<NodeId>,
    ) -> NodeId {
        let child = self.process_row(content);
        let node = self.make_branch(SemanticType::Fenced, vec![child], vec![open, close], None);
        let role = match self.role(open) {
            SemanticRole::Open => SemanticRole::LeftRight,
            role => role,
        };
        self.set_role(node, role);
        node
    }

    pub(crate) fn fence_to_punct(&mut self, fence: NodeId) {
        let role = match self.role(fence) {
            SemanticRole::Neutral => SemanticRole::VBar,
            SemanticRole::Open => SemanticRole::OpenFence,
            SemanticRole::Close => SemanticRole::CloseFence,
            role => role,
        };
        self.set_type(fence, SemanticType::Punctuation);
        self.set_role(fence, role);
    }
}

/// Appends a finished FENCED node and the run after its closing fence to the enclosing run.
fn splice_fenced(content_stack: &mut Vec<Vec<NodeId>>, fenced: NodeId, next: Vec<NodeId>) {
    match content_stack.last_mut() {
        Some(outer) => {
            outer.push(fenced);
            outer.extend(next);
        }
        None => {
            let mut outer = vec![fenced];
            outer.extend(next);
            content_stack.push(outer);
        }
    }
}

#[cfg(test)]
mod tests {
    use semantic_attr::symbol::SymbolTable;

    use super::*;
    use crate::mathml::Document;
    use crate::row::tests::{leaves, shape};

    fn fences(texts: &[&str]) -> String {
        let doc = Document::new("math");
        let mut builder = TreeBuilder::new(&doc, &SymbolTable);
        let nodes = leaves(&mut builder, texts);
        let row = builder.get_fences_in_row(nodes);
        row.iter()
            .map(|&node| {
                let shape = shape(&builder, node);
                match builder.node_type(node) {
                    SemanticType::Fenced | SemanticType::Punctuation => {
                        format!("{shape}:{}", builder.role(node).as_str())
                    }
                    _ => shape,
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn matched_pairs() {
        assert_eq!(fences(&["(", "a", ")"]), "fenced(a):leftright");
        assert_eq!(fences(&["x", "[", "a", "]", "y"]), "x fenced(a):leftright y");
        assert_eq!(fences(&["(", ")"]), "fenced(empty):leftright");
        assert_eq!(
            fences(&["(", "(", "a", ")", "b", ")"]),
            "fenced(infixop(fenced(a) b)):leftright"
        );
    }

    #[test]
    fn neutral_pairs() {
        assert_eq!(fences(&["|", "a", "|"]), "fenced(a):neutral");
        assert_eq!(
            fences(&["|", "a", "‖", "b", "‖", "|"]),
            "fenced(infixop(a fenced(b))):neutral"
        );
    }

    #[test]
    fn unmatched_fences_become_punctuation() {
        assert_eq!(fences(&["(", "a"]), "(:openfence a");
        assert_eq!(fences(&["a", ")"]), "a ):closefence");
        assert_eq!(fences(&["|", "a"]), "|:vbar a");
        assert_eq!(fences(&["a", "(", "b", "|", "c"]), "a (:openfence b |:vbar c");
    }

    #[test]
    fn close_across_neutral_fences() {
        // `( | a | b | )`: the first two bars pair up, the third is left over.
        assert_eq!(
            fences(&["(", "|", "a", "|", "b", "|", ")"]),
            "fenced(punctuated(infixop(fenced(a) b) |)):leftright"
        );
        // `( | a )`: the single bar is punctuation inside the parentheses.
        assert_eq!(
            fences(&["(", "|", "a", ")"]),
            "fenced(punctuated(| a)):leftright"
        );
    }

    #[test]
    fn leftover_neutral_run() {
        assert_eq!(
            fences(&["(", "|", "a", "|", "b"]),
            "(:openfence fenced(a):neutral b"
        );
        // The outer bars pair up around the unmatched double bar.
        assert_eq!(
            fences(&["(", "|", "a", "‖", "b", "|"]),
            "(:openfence fenced(punctuated(a ‖ b)):neutral"
        );
    }
}
