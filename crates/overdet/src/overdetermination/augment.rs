//! Search for alternating paths in a [`BipartiteGraph`], and their use to grow
//! a [`Matching`].

use std::iter::once;

use itertools::Itertools;
use tracing::{trace, warn};

use crate::overdetermination::{
	graph::{BipartiteGraph, NodeRef},
	matching::Matching,
};

/// A sequence of alternating equation and variable nodes, `[e1, v1, e2, v2,
/// ..]`, in which every equation is matched to the variable that follows it.
pub(crate) type AlternatingPath = Vec<NodeRef>;

#[derive(Clone, Copy, Debug)]
/// Enumeration of all alternating paths of a given length.
pub(crate) struct AugmentingPathSearch<'a> {
	/// The graph in which paths are searched.
	graph: &'a BipartiteGraph,
	/// The current matching, which determines the edges paths must follow.
	matching: &'a Matching,
	/// Maximum number of paths to collect, if any.
	limit: Option<usize>,
}

#[derive(Clone, Copy, Debug)]
/// Extension of alternating paths with free end points, and the update of the
/// matching along the extended path.
pub(crate) struct Augmenter<'a> {
	/// The graph in which the paths were found.
	graph: &'a BipartiteGraph,
}

#[derive(Clone, Copy, Debug)]
/// Entry of the work list used by [`AugmentingPathSearch`]: a matched pair
/// appended to the partial path that ends in the parent entry.
struct Step {
	/// The equation of the matched pair.
	equation: NodeRef,
	/// The variable matched to the equation.
	variable: NodeRef,
	/// The index of the previous pair on the path, if any.
	parent: Option<usize>,
	/// The number of pairs on the path up to and including this one.
	depth: usize,
}

impl<'a> AugmentingPathSearch<'a> {
	/// Create a search over the given graph and matching.
	pub(crate) fn new(graph: &'a BipartiteGraph, matching: &'a Matching) -> Self {
		Self {
			graph,
			matching,
			limit: None,
		}
	}

	/// Stop collecting paths once `limit` paths have been found.
	pub(crate) fn with_limit(mut self, limit: Option<usize>) -> Self {
		self.limit = limit;
		self
	}

	/// Find all alternating paths that consist of `length` matched pairs.
	///
	/// Paths start at every matched equation of the graph and continue from a
	/// variable to any other adjacent matched equation, never visiting a node
	/// twice. A path is only reported if its final variable has an adjacent
	/// equation other than its own partner, which is required to extend the
	/// path at its end.
	pub(crate) fn find_paths(&self, length: usize) -> Vec<AlternatingPath> {
		let mut paths = Vec::new();
		if length == 0 {
			return paths;
		}
		let mut steps = Vec::new();
		let mut work = Vec::new();

		for &start in self.graph.equations() {
			let Some(variable) = self.matching.variable_of(start) else {
				continue;
			};
			steps.clear();
			steps.push(Step {
				equation: start,
				variable,
				parent: None,
				depth: 1,
			});
			work.push(0);

			while let Some(i) = work.pop() {
				let step = steps[i];
				let adjacent = self.graph.adjacent(step.variable);
				if step.depth == length {
					if adjacent.iter().any(|&e| e != step.equation) {
						if self.limit.is_some_and(|limit| paths.len() >= limit) {
							warn!(
								length,
								limit = paths.len(),
								"path limit reached, remaining alternating paths are ignored"
							);
							return paths;
						}
						paths.push(Self::reconstruct(&steps, i));
					}
					continue;
				}
				// Pushed in reverse so that neighbours are explored in adjacency order.
				for &next in adjacent.iter().rev() {
					if next == step.equation || Self::on_path(&steps, i, next) {
						continue;
					}
					let Some(variable) = self.matching.variable_of(next) else {
						continue;
					};
					steps.push(Step {
						equation: next,
						variable,
						parent: Some(i),
						depth: step.depth + 1,
					});
					work.push(steps.len() - 1);
				}
			}
		}
		paths
	}

	/// Whether the equation `eq` is part of the partial path ending in
	/// `steps[i]`.
	fn on_path(steps: &[Step], mut i: usize, eq: NodeRef) -> bool {
		loop {
			if steps[i].equation == eq {
				return true;
			}
			match steps[i].parent {
				Some(p) => i = p,
				None => return false,
			}
		}
	}

	/// Collect the nodes of the path ending in `steps[i]`, from its start.
	fn reconstruct(steps: &[Step], i: usize) -> AlternatingPath {
		let mut path = Vec::with_capacity(2 * steps[i].depth);
		let mut cur = Some(i);
		while let Some(j) = cur {
			path.push(steps[j].variable);
			path.push(steps[j].equation);
			cur = steps[j].parent;
		}
		path.reverse();
		path
	}
}

impl<'a> Augmenter<'a> {
	/// Create an augmenter for paths found in the given graph.
	pub(crate) fn new(graph: &'a BipartiteGraph) -> Self {
		Self { graph }
	}

	/// Try to grow `matching` by one pair using `path`.
	///
	/// The path is extended at its start with an adjacent unmatched variable,
	/// and at its end with an adjacent unmatched equation. If both exist, every
	/// equation on the extended path is matched to the variable preceding it.
	/// Returns whether the matching was changed.
	///
	/// Paths that no longer alternate with respect to `matching`, because an
	/// earlier augmentation rerouted one of their pairs, are ignored.
	pub(crate) fn augment(&self, matching: &mut Matching, path: &[NodeRef]) -> bool {
		let (Some(&first), Some(&last)) = (path.first(), path.last()) else {
			return false;
		};
		if !path
			.iter()
			.tuples()
			.all(|(&eq, &var)| matching.variable_of(eq) == Some(var))
		{
			trace!(?path, "ignoring outdated path");
			return false;
		}

		let Some(&start) = self
			.graph
			.adjacent(first)
			.iter()
			.find(|&&v| !matching.is_variable_matched(v))
		else {
			return false;
		};
		let Some(&end) = self
			.graph
			.adjacent(last)
			.iter()
			.find(|&&e| !matching.is_equation_matched(e))
		else {
			return false;
		};

		trace!(?start, ?path, ?end, "augmenting matching");
		let len = matching.len();
		for (var, eq) in once(start)
			.chain(path.iter().copied())
			.chain(once(end))
			.tuples()
		{
			matching.assign(eq, var);
		}
		debug_assert_eq!(matching.len(), len + 1);
		true
	}
}

#[cfg(test)]
mod tests {
	use crate::{
		overdetermination::{
			augment::{Augmenter, AugmentingPathSearch},
			graph::BipartiteGraph,
			matching::InitialMatcher,
		},
		tests::{chain_model, greedy_trap_model, overdetermined_model},
	};

	#[test]
	fn test_find_single_pair_paths() {
		let graph = BipartiteGraph::build(&greedy_trap_model());
		let matching = InitialMatcher::new(&graph).run();
		let [e0, _] = [graph.equations()[0], graph.equations()[1]];
		let v1 = graph.variables()[0];

		let paths = AugmentingPathSearch::new(&graph, &matching).find_paths(1);
		assert_eq!(paths, vec![vec![e0, v1]]);
		assert!(AugmentingPathSearch::new(&graph, &matching)
			.find_paths(3)
			.is_empty());
	}

	#[test]
	fn test_find_long_paths() {
		let graph = BipartiteGraph::build(&chain_model());
		let [e1, e2, e3, _] = [0, 1, 2, 3].map(|i| graph.equations()[i]);
		let [_, v1, v2, v3] = [0, 1, 2, 3].map(|i| graph.variables()[i]);
		let matching = InitialMatcher::new(&graph).run();
		let search = AugmentingPathSearch::new(&graph, &matching);

		assert_eq!(
			search.find_paths(3),
			vec![vec![e1, v1, e2, v2, e3, v3]]
		);
		// Paths cannot be longer than the number of matched pairs.
		assert!(search.find_paths(5).is_empty());
	}

	#[test]
	fn test_augment_long_path() {
		let graph = BipartiteGraph::build(&chain_model());
		let [e1, e2, e3, e4] = [0, 1, 2, 3].map(|i| graph.equations()[i]);
		let [v0, v1, v2, v3] = [0, 1, 2, 3].map(|i| graph.variables()[i]);
		let mut matching = InitialMatcher::new(&graph).run();
		assert_eq!(matching.len(), 3);
		assert!(!matching.is_equation_matched(e4));

		// No single pair has both a free variable and a free equation nearby.
		let augmenter = Augmenter::new(&graph);
		let paths = AugmentingPathSearch::new(&graph, &matching).find_paths(1);
		assert_eq!(paths.len(), 3);
		for path in &paths {
			assert!(!augmenter.augment(&mut matching, path));
		}

		// Every pair on the path shifts one position towards the free variable.
		assert!(augmenter.augment(&mut matching, &[e1, v1, e2, v2, e3, v3]));
		assert_eq!(matching.len(), 4);
		assert_eq!(
			[e1, e2, e3, e4].map(|e| matching.variable_of(e)),
			[Some(v0), Some(v1), Some(v2), Some(v3)]
		);
	}

	#[test]
	fn test_path_limit() {
		let graph = BipartiteGraph::build(&overdetermined_model());
		let matching = InitialMatcher::new(&graph).run();
		let search = AugmentingPathSearch::new(&graph, &matching);
		assert_eq!(search.find_paths(1).len(), 2);
		assert_eq!(search.with_limit(Some(1)).find_paths(1).len(), 1);
	}

	#[test]
	fn test_augment() {
		let graph = BipartiteGraph::build(&greedy_trap_model());
		let [e0, e1] = [graph.equations()[0], graph.equations()[1]];
		let [v1, v2] = [graph.variables()[0], graph.variables()[1]];
		let mut matching = InitialMatcher::new(&graph).run();

		let augmenter = Augmenter::new(&graph);
		assert!(augmenter.augment(&mut matching, &[e0, v1]));
		assert_eq!(matching.len(), 2);
		assert_eq!(matching.variable_of(e0), Some(v2));
		assert_eq!(matching.variable_of(e1), Some(v1));

		// The same path no longer alternates with respect to the new matching.
		assert!(!augmenter.augment(&mut matching, &[e0, v1]));
		assert_eq!(matching.len(), 2);
	}

	#[test]
	fn test_augment_without_free_end() {
		let graph = BipartiteGraph::build(&overdetermined_model());
		let mut matching = InitialMatcher::new(&graph).run();
		let paths = AugmentingPathSearch::new(&graph, &matching).find_paths(1);
		let augmenter = Augmenter::new(&graph);
		for path in &paths {
			assert!(!augmenter.augment(&mut matching, path));
		}
		assert_eq!(matching.len(), 2);
	}
}
