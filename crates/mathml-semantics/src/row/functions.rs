use std::collections::VecDeque;
use std::iter;
use std::mem;

use semantic_attr::attribute::{SemanticRole, SemanticType};

use crate::builder::{Split, TreeBuilder};
use crate::node::{NodeId, SemanticNode};

/// How a function-like node takes its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionHeuristic {
    Integral,
    BigOp,
    Prefix,
    /// A plain identifier, applied only to a fenced argument list.
    Simple,
}

struct IntegralArgs {
    integrand: Vec<NodeId>,
    intvar: Option<NodeId>,
    rest: Vec<NodeId>,
}

/// Relations and punctuation end the argument of any function.
fn is_general_boundary(node: &SemanticNode) -> bool {
    matches!(node.node_type, SemanticType::Relation | SemanticType::Punctuation)
}

fn is_prefix_boundary(node: &SemanticNode) -> bool {
    node.node_type == SemanticType::Operator || is_general_boundary(node)
}

impl TreeBuilder<'_> {
    /// Applies functions, big operators and integrals to their arguments.
    ///
    /// The rest of the row is processed before the arguments of a function are taken from
    /// it, so nested applications like `sin sin x` are built inside out.
    pub(super) fn get_functions_in_row(&mut self, nodes: Vec<NodeId>) -> Vec<NodeId> {
        let mut rest: VecDeque<NodeId> = nodes.into();
        let mut result = Vec::with_capacity(rest.len());
        while let Some(func) = rest.pop_front() {
            let Some(heuristic) = self.classify_function(func, &mut rest) else {
                result.push(func);
                continue;
            };
            let processed = self.get_functions_in_row(mem::take(&mut rest).into());
            result.extend(self.get_function_args(func, processed, heuristic));
        }
        result
    }

    fn classify_function(
        &mut self,
        func: NodeId,
        rest: &mut VecDeque<NodeId>,
    ) -> Option<FunctionHeuristic> {
        // No double application.
        if matches!(
            self.node_type(func),
            SemanticType::Appl | SemanticType::BigOp | SemanticType::Integral
        ) {
            return None;
        }
        let symbols = self.symbols;
        if let Some(&next) = rest.front()
            && self.text(next) == symbols.function_application()
        {
            rest.pop_front();
            self.propagate_prefix_func(func);
            return Some(FunctionHeuristic::Prefix);
        }
        match self.role(func) {
            SemanticRole::Integral => Some(FunctionHeuristic::Integral),
            SemanticRole::Sum => Some(FunctionHeuristic::BigOp),
            SemanticRole::PrefixFunc | SemanticRole::LimFunc => Some(FunctionHeuristic::Prefix),
            _ if self.node_type(func) == SemanticType::Identifier => {
                Some(FunctionHeuristic::Simple)
            }
            _ => None,
        }
    }

    /// Marks a node and its chain of first children as prefix functions.
    fn propagate_prefix_func(&mut self, func: NodeId) {
        let mut current = Some(func);
        while let Some(id) = current {
            self.set_role(id, SemanticRole::PrefixFunc);
            current = self.node(id).children.first().copied();
        }
    }

    fn get_function_args(
        &mut self,
        func: NodeId,
        mut rest: Vec<NodeId>,
        heuristic: FunctionHeuristic,
    ) -> Vec<NodeId> {
        match heuristic {
            FunctionHeuristic::Integral => {
                let IntegralArgs {
                    integrand,
                    intvar,
                    rest,
                } = self.get_integral_args(rest);
                let integrand = self.process_row(integrand);
                let node = self.make_integral_node(func, integrand, intvar);
                iter::once(node).chain(rest).collect()
            }
            FunctionHeuristic::Prefix
                if rest
                    .first()
                    .is_some_and(|&arg| self.node_type(arg) == SemanticType::Fenced) =>
            {
                let arg = rest[0];
                rest[0] = self.make_function_node(func, arg);
                rest
            }
            FunctionHeuristic::Prefix | FunctionHeuristic::BigOp => {
                let Split { head, div, tail } = self.slice(&rest, is_prefix_boundary);
                let arg = self.process_row(head);
                let node = if heuristic == FunctionHeuristic::Prefix {
                    self.make_function_node(func, arg)
                } else {
                    self.make_big_op_node(func, arg)
                };
                iter::once(node).chain(div).chain(tail).collect()
            }
            FunctionHeuristic::Simple => {
                match rest.first() {
                    Some(&arg)
                        if self.node_type(arg) == SemanticType::Fenced
                            && self.role(arg) != SemanticRole::Neutral
                            && self.simple_function_heuristic(arg) =>
                    {
                        rest[0] = self.make_function_node(func, arg);
                    }
                    _ => rest.insert(0, func),
                }
                rest
            }
        }
    }

    /// Splits the nodes after an integral sign into integrand, integration variable and
    /// the remainder of the row.
    fn get_integral_args(&mut self, nodes: Vec<NodeId>) -> IntegralArgs {
        let mut integrand = Vec::new();
        let mut index = 0;
        while let Some(&node) = nodes.get(index) {
            if is_general_boundary(self.node(node)) {
                break;
            }
            if self.is_differential(node) {
                return IntegralArgs {
                    integrand,
                    intvar: Some(node),
                    rest: nodes[index + 1..].to_vec(),
                };
            }
            if let Some(&var) = nodes.get(index + 1)
                && self.is_differential_pair(node, var)
            {
                let symbols = self.symbols;
                let comma = self.create_node();
                self.update_content(comma, symbols.invisible_comma());
                let intvar = self.make_punctuated_node(vec![node, comma, var], vec![comma]);
                self.set_role(intvar, SemanticRole::Integral);
                return IntegralArgs {
                    integrand,
                    intvar: Some(intvar),
                    rest: nodes[index + 2..].to_vec(),
                };
            }
            integrand.push(node);
            index += 1;
        }
        IntegralArgs {
            integrand,
            intvar: None,
            rest: nodes[index..].to_vec(),
        }
    }

    /// A single identifier such as `dx`.
    fn is_differential(&self, node: NodeId) -> bool {
        if self.node_type(node) != SemanticType::Identifier {
            return false;
        }
        let mut chars = self.text(node).chars();
        chars
            .next()
            .is_some_and(|first| self.symbols.is_character_d(first))
            && chars.next().is_some()
    }

    /// A lone `d` followed by an identifier.
    fn is_differential_pair(&self, d: NodeId, var: NodeId) -> bool {
        let mut chars = self.text(d).chars();
        self.node_type(var) == SemanticType::Identifier
            && chars
                .next()
                .is_some_and(|first| self.symbols.is_character_d(first))
            && chars.next().is_none()
    }

    /// Whether a fenced node looks like an argument list rather than a compound expression.
    fn simple_function_heuristic(&self, fenced: NodeId) -> bool {
        match self.node(fenced).children[..] {
            [] => true,
            [child] => {
                let child = self.node(child);
                child.node_type != SemanticType::InfixOp
                    || (child.role == SemanticRole::Implicit
                        && !child
                            .children
                            .iter()
                            .any(|&inner| self.node_type(inner) == SemanticType::InfixOp))
            }
            _ => false,
        }
    }

    fn make_function_node(&mut self, func: NodeId, arg: NodeId) -> NodeId {
        let symbols = self.symbols;
        let application = self.create_node();
        self.update_content(application, symbols.function_application());
        self.set_type(application, SemanticType::Punctuation);
        self.set_role(application, SemanticRole::Application);
        let node = self.make_branch(SemanticType::Appl, vec![func, arg], vec![application], None);
        self.set_role(node, self.role(func));
        node
    }

    fn make_big_op_node(&mut self, op: NodeId, arg: NodeId) -> NodeId {
        let node = self.make_branch(SemanticType::BigOp, vec![op, arg], vec![], None);
        self.set_role(node, self.role(op));
        node
    }

    fn make_integral_node(
        &mut self,
        integral: NodeId,
        integrand: NodeId,
        intvar: Option<NodeId>,
    ) -> NodeId {
        let intvar = match intvar {
            Some(intvar) => intvar,
            None => self.make_empty(),
        };
        let node = self.make_branch(
            SemanticType::Integral,
            vec![integral, integrand, intvar],
            vec![],
            None,
        );
        self.set_role(node, self.role(integral));
        node
    }
}
