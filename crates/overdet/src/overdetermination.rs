//! Structural check of whether a [`Model`] contains more equations than
//! quantities that these equations can determine.
//!
//! The check builds a bipartite graph between the equations of the model and
//! its variable quantities, and computes a matching between the two: first
//! greedily, and then improved using alternating paths of increasing length, in
//! the spirit of the algorithm by Hopcroft and Karp (1973). The model is
//! overdetermined if some equation remains without a matching variable.

pub(crate) mod augment;
pub(crate) mod extract;
pub(crate) mod graph;
pub(crate) mod matching;

use std::collections::HashMap;

use tracing::debug;

use crate::{
	model::element::ElementRef,
	overdetermination::{
		augment::{AugmentingPathSearch, Augmenter},
		graph::{BipartiteGraph, Equation},
		matching::{InitialMatcher, Matching},
	},
	Model,
};

#[derive(Clone, Debug, Default, Hash, PartialEq, Eq)]
/// Configuration object for the [`OverdeterminationChecker`].
///
/// The default configuration reproduces the complete search. The limits are
/// meant as a safety valve for pathologically large models, and can cause
/// overdetermination to be reported for models that are not.
pub struct CheckConfig {
	/// The maximum number of alternating paths collected in a single search
	/// pass.
	path_limit: Option<usize>,
	/// The maximum number of matched pairs of the alternating paths searched.
	max_length: Option<usize>,
}

#[derive(Clone, Debug, Default, Hash, PartialEq, Eq)]
/// Statistics collected while checking a [`Model`].
pub struct CheckStatistics {
	/// Number of variable nodes in the graph.
	variables: usize,
	/// Number of equation nodes in the graph.
	equations: usize,
	/// Number of edges in the graph.
	edges: usize,
	/// Size of the matching found by the greedy walk.
	initial_matching: usize,
	/// Size of the final matching.
	final_matching: usize,
	/// Number of alternating path search passes.
	passes: usize,
	/// Number of alternating paths found over all passes.
	paths_found: usize,
	/// Number of paths that were used to grow the matching.
	augmentations: usize,
}

#[derive(Clone, Debug)]
/// The result of checking a [`Model`] for overdetermination.
///
/// All work is done on creation; the methods only report on the outcome.
pub struct OverdeterminationChecker {
	/// The bipartite graph between equations and variables.
	graph: BipartiteGraph,
	/// The final matching on the nodes of `graph`.
	matching: Matching,
	/// The final matching, in terms of the quantities and equations of the
	/// model.
	assignment: HashMap<ElementRef, Equation>,
	/// Statistics collected during the check.
	statistics: CheckStatistics,
}

impl CheckConfig {
	/// Get the maximum number of alternating paths collected in a single search
	/// pass, if any.
	pub fn path_limit(&self) -> Option<usize> {
		self.path_limit
	}

	/// Get the maximum number of matched pairs of the alternating paths
	/// searched, if any.
	pub fn max_length(&self) -> Option<usize> {
		self.max_length
	}

	/// Change the maximum number of alternating paths collected in a single
	/// search pass.
	pub fn with_path_limit(mut self, limit: usize) -> Self {
		self.path_limit = Some(limit);
		self
	}

	/// Change the maximum number of matched pairs of the alternating paths
	/// searched.
	pub fn with_max_length(mut self, length: usize) -> Self {
		self.max_length = Some(length);
		self
	}
}

impl CheckStatistics {
	/// Number of variable nodes in the graph.
	pub fn variables(&self) -> usize {
		self.variables
	}

	/// Number of equation nodes in the graph.
	pub fn equations(&self) -> usize {
		self.equations
	}

	/// Number of edges in the graph.
	pub fn edges(&self) -> usize {
		self.edges
	}

	/// Size of the matching found by the greedy walk.
	pub fn initial_matching(&self) -> usize {
		self.initial_matching
	}

	/// Size of the final matching.
	pub fn final_matching(&self) -> usize {
		self.final_matching
	}

	/// Number of alternating path search passes.
	pub fn passes(&self) -> usize {
		self.passes
	}

	/// Number of alternating paths found over all passes.
	pub fn paths_found(&self) -> usize {
		self.paths_found
	}

	/// Number of paths that were used to grow the matching.
	pub fn augmentations(&self) -> usize {
		self.augmentations
	}
}

impl OverdeterminationChecker {
	/// Check the given model using the default configuration.
	pub fn new(model: &Model) -> Self {
		Self::with_config(model, &CheckConfig::default())
	}

	/// Check the given model using the given configuration.
	pub fn with_config(model: &Model, config: &CheckConfig) -> Self {
		let graph = BipartiteGraph::build(model);
		let mut matching = InitialMatcher::new(&graph).run();
		let mut statistics = CheckStatistics {
			variables: graph.variables().len(),
			equations: graph.equations().len(),
			edges: graph.edge_count(),
			initial_matching: matching.len(),
			..CheckStatistics::default()
		};
		debug!(size = matching.len(), "computed initial matching");

		Self::augment_matching(&graph, &mut matching, config, &mut statistics);
		statistics.final_matching = matching.len();

		let mut checker = Self {
			graph,
			matching,
			assignment: HashMap::new(),
			statistics,
		};
		let assignment = checker.matched_pairs().collect();
		checker.assignment = assignment;
		checker
	}

	/// Improve the matching as far as possible using alternating paths.
	///
	/// The paths searched consist of 1, 3, 5, ... matched pairs. The search
	/// stops once every equation is matched, or once the length of the paths
	/// exceeds what can exist in the graph.
	fn augment_matching(
		graph: &BipartiteGraph,
		matching: &mut Matching,
		config: &CheckConfig,
		statistics: &mut CheckStatistics,
	) {
		let num_eqs = graph.equations().len();
		let augmenter = Augmenter::new(graph);
		let mut length = 1;

		while length < graph.variables().len() + num_eqs {
			if config.max_length().is_some_and(|max| length > max) {
				break;
			}
			let paths = AugmentingPathSearch::new(graph, matching)
				.with_limit(config.path_limit())
				.find_paths(length);
			statistics.passes += 1;
			statistics.paths_found += paths.len();

			for path in &paths {
				if augmenter.augment(matching, path) {
					statistics.augmentations += 1;
				}
			}
			debug_assert!(matching.len() <= graph.variables().len().min(num_eqs));
			debug!(
				length,
				paths = paths.len(),
				size = matching.len(),
				"finished augmentation pass"
			);

			// No alternating path of the next length can exist.
			if matching.len() == num_eqs || length + 3 > 2 * num_eqs {
				break;
			}
			length += 2;
		}
	}

	/// Returns whether the model contains more equations than can be matched to
	/// distinct variables.
	pub fn is_overdetermined(&self) -> bool {
		self.graph.equations().len() > self.matching.len()
	}

	/// Returns the matching from variable quantities of the model to the
	/// equations that determine them.
	pub fn matching(&self) -> &HashMap<ElementRef, Equation> {
		&self.assignment
	}

	/// Returns the matched pairs of quantities and equations, in the order in
	/// which the equations were created.
	pub fn matched_pairs(&self) -> impl Iterator<Item = (ElementRef, Equation)> + '_ {
		self.graph.equations().iter().filter_map(|&e| {
			let v = self.matching.variable_of(e)?;
			Some((self.graph.variable_element(v), self.graph.equation(e)))
		})
	}

	/// Returns the equations of the model that are considered in the check.
	pub fn equations(&self) -> impl Iterator<Item = Equation> + '_ {
		self.graph
			.equations()
			.iter()
			.map(|&e| self.graph.equation(e))
	}

	/// Returns the quantities of the model that are considered variable.
	pub fn variables(&self) -> impl Iterator<Item = ElementRef> + '_ {
		self.graph
			.variables()
			.iter()
			.map(|&v| self.graph.variable_element(v))
	}

	/// Returns the equations that could not be matched to a variable.
	pub fn unmatched_equations(&self) -> impl Iterator<Item = Equation> + '_ {
		self.graph
			.equations()
			.iter()
			.filter(|&&e| !self.matching.is_equation_matched(e))
			.map(|&e| self.graph.equation(e))
	}

	/// Returns the statistics collected during the check.
	pub fn statistics(&self) -> &CheckStatistics {
		&self.statistics
	}
}
