//! Matchings between equation and variable nodes, and the greedy construction
//! of a first matching.

use std::collections::{HashMap, HashSet};

use delegate::delegate;
use index_vec::IndexVec;
use itertools::Itertools;

use crate::overdetermination::graph::{BipartiteGraph, GraphNode, NodeKind, NodeRef};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// A one-to-one correspondence between some equation nodes and some variable
/// nodes of a [`BipartiteGraph`].
///
/// The correspondence is stored in both directions, and every change keeps the
/// two directions consistent.
pub(crate) struct Matching {
	/// The variable matched to each matched equation.
	by_equation: HashMap<NodeRef, NodeRef>,
	/// The equation matched to each matched variable.
	by_variable: HashMap<NodeRef, NodeRef>,
}

/// Greedy construction of a first [`Matching`] for a [`BipartiteGraph`].
///
/// A depth-first walk starts from a source node, connected to all equations,
/// and looks for a sink node, connected from all variables. Every edge is
/// traversed at most once and every equation or variable is visited at most
/// once. Whenever the sink is reached, the equations and variables on the
/// stack are matched pairwise. The resulting matching is not necessarily
/// maximum.
pub(crate) struct InitialMatcher {
	/// Copy of the graph nodes, extended with the source and sink nodes, whose
	/// edges are consumed by the walk.
	nodes: IndexVec<NodeRef, GraphNode>,
	/// The source node.
	source: NodeRef,
	/// The sink node.
	sink: NodeRef,
}

impl Matching {
	delegate! {
		to self.by_equation {
			/// Number of matched pairs.
			pub(crate) fn len(&self) -> usize;
		}
	}

	/// Match `eq` with `var`, releasing their previous partners (if any).
	pub(crate) fn assign(&mut self, eq: NodeRef, var: NodeRef) {
		if let Some(old_var) = self.by_equation.insert(eq, var) {
			if old_var != var {
				let _ = self.by_variable.remove(&old_var);
			}
		}
		if let Some(old_eq) = self.by_variable.insert(var, eq) {
			if old_eq != eq {
				let _ = self.by_equation.remove(&old_eq);
			}
		}
		debug_assert_eq!(self.by_equation.len(), self.by_variable.len());
	}

	/// Match `eq` with `var`, both of which must be unmatched.
	///
	/// # Panics
	///
	/// Panics if `eq` or `var` is already matched.
	pub(crate) fn insert(&mut self, eq: NodeRef, var: NodeRef) {
		assert!(
			!self.by_equation.contains_key(&eq) && !self.by_variable.contains_key(&var),
			"matched nodes cannot be matched again"
		);
		let _ = self.by_equation.insert(eq, var);
		let _ = self.by_variable.insert(var, eq);
	}

	/// Whether `eq` is matched to a variable.
	pub(crate) fn is_equation_matched(&self, eq: NodeRef) -> bool {
		self.by_equation.contains_key(&eq)
	}

	/// Whether `var` is matched to an equation.
	pub(crate) fn is_variable_matched(&self, var: NodeRef) -> bool {
		self.by_variable.contains_key(&var)
	}

	/// The variable matched to `eq`, if any.
	pub(crate) fn variable_of(&self, eq: NodeRef) -> Option<NodeRef> {
		self.by_equation.get(&eq).copied()
	}
}

impl InitialMatcher {
	/// Prepare the walk over a copy of the given graph.
	pub(crate) fn new(graph: &BipartiteGraph) -> Self {
		let mut nodes = graph.nodes().clone();
		let source = nodes.push(GraphNode::new(NodeKind::Source));
		let sink = nodes.push(GraphNode::new(NodeKind::Sink));
		nodes[source].adjacent = graph.equations().to_vec();
		for &v in graph.variables() {
			nodes[v].adjacent.push(sink);
		}
		Self {
			nodes,
			source,
			sink,
		}
	}

	/// Perform the walk and return the resulting matching.
	pub(crate) fn run(mut self) -> Matching {
		let mut matching = Matching::default();
		let mut visited = HashSet::new();
		let mut stack = vec![self.source];

		while let Some(&top) = stack.last() {
			let Some(&next) = self.nodes[top].adjacent.first() else {
				let _ = stack.pop();
				continue;
			};
			self.remove_edge(top, next);

			if next == self.sink {
				// Stack holds the source followed by alternating equations and
				// variables.
				let path = stack.split_off(1);
				debug_assert!(path.len() % 2 == 0);
				for (eq, var) in path.into_iter().tuples() {
					matching.insert(eq, var);
				}
			} else if visited.insert(next) {
				stack.push(next);
			}
		}
		matching
	}

	/// Remove the edge between `a` and `b` in both directions.
	fn remove_edge(&mut self, a: NodeRef, b: NodeRef) {
		for (from, to) in [(a, b), (b, a)] {
			let adjacent = &mut self.nodes[from].adjacent;
			if let Some(i) = adjacent.iter().position(|&n| n == to) {
				let _ = adjacent.remove(i);
			}
		}
	}
}
