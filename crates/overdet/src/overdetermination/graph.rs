//! The bipartite graph between the equations of a [`Model`] and the
//! quantities they can determine.

use std::collections::HashMap;

use index_vec::{define_index_type, IndexVec};
use tracing::{debug, trace};
use ustr::Ustr;

use crate::{
	model::{
		element::{ElementRef, ReactionRef, SpeciesRef},
		rule::{Rule, RuleRef},
	},
	overdetermination::extract::VariableExtractor,
	Model,
};

define_index_type! {
	/// Reference type for nodes in a [`BipartiteGraph`].
	pub(crate) struct NodeRef = u32;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Identity of an equation that defines or constrains quantities of a
/// [`Model`].
pub enum Equation {
	/// The mass balance of a species that takes part in reactions.
	SpeciesBalance(SpeciesRef),
	/// The kinetic law of a reaction.
	KineticLaw(ReactionRef),
	/// A rate rule.
	RateRule(RuleRef),
	/// An assignment rule.
	AssignmentRule(RuleRef),
	/// An algebraic rule.
	AlgebraicRule(RuleRef),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// The role of a node in the graph.
pub(crate) enum NodeKind {
	/// A quantity that can be determined by an equation.
	Variable(ElementRef),
	/// An equation.
	Equation(Equation),
	/// Helper node connected to all equations, only used while computing the
	/// initial matching.
	Source,
	/// Helper node connected from all variables, only used while computing the
	/// initial matching.
	Sink,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A node of the graph together with its adjacency list.
pub(crate) struct GraphNode {
	/// The role of the node.
	pub(crate) kind: NodeKind,
	/// The nodes connected to this node, in order of insertion.
	pub(crate) adjacent: Vec<NodeRef>,
}

#[derive(Clone, Debug, Default)]
/// Bipartite graph with a node for each equation and each quantity of a
/// [`Model`] that is not fixed, and an edge whenever an equation can determine
/// a quantity.
pub(crate) struct BipartiteGraph {
	/// Storage of all nodes.
	nodes: IndexVec<NodeRef, GraphNode>,
	/// The variable nodes, in order of creation.
	variables: Vec<NodeRef>,
	/// The equation nodes, in order of creation.
	equations: Vec<NodeRef>,
	/// Lookup table from model quantities to their variable nodes.
	variable_index: HashMap<ElementRef, NodeRef>,
	/// Lookup table from equations to their nodes.
	equation_index: HashMap<Equation, NodeRef>,
}

impl Equation {
	/// Returns a short human readable label for the equation, using the
	/// identifiers of the given model.
	pub fn describe(&self, model: &Model) -> String {
		match *self {
			Equation::SpeciesBalance(s) => format!("balance({})", model[s].id()),
			Equation::KineticLaw(r) => format!("kinetic_law({})", model[r].id()),
			Equation::RateRule(r) => format!("rate_rule({})", rule_target(model, r)),
			Equation::AssignmentRule(r) => {
				format!("assignment_rule({})", rule_target(model, r))
			}
			Equation::AlgebraicRule(r) => format!("algebraic_rule({})", r.index()),
		}
	}
}

/// Identifier targeted by the explicit rule `r`.
fn rule_target(model: &Model, r: RuleRef) -> String {
	model[r]
		.variable()
		.map(|v| v.to_string())
		.unwrap_or_default()
}

impl GraphNode {
	/// Create a node without any edges.
	pub(crate) fn new(kind: NodeKind) -> Self {
		Self {
			kind,
			adjacent: Vec::new(),
		}
	}
}

impl BipartiteGraph {
	/// Build the graph for the given model.
	///
	/// Variables are created for compartments (all of them in Level 1 models,
	/// otherwise only those not declared constant), non-constant species,
	/// non-constant parameters, and reactions. Equations are then created for:
	///
	/// 1. the mass balance of each non-constant species without a boundary
	///    condition that is a reactant or product of a reaction,
	/// 2. the kinetic law of each reaction,
	/// 3. each rate rule, and each assignment rule whose target is a variable,
	///    in document order,
	/// 4. each algebraic rule, connected to all variables in its expression.
	///
	/// References that do not resolve to a variable are ignored.
	pub(crate) fn build(model: &Model) -> Self {
		let mut graph = Self::default();

		for (c, compartment) in model.compartments().iter_enumerated() {
			if model.level() == 1 || !compartment.is_constant() {
				let _ = graph.add_variable(ElementRef::Compartment(c));
			}
		}
		for (s, species) in model.species().iter_enumerated() {
			if !species.is_constant() {
				let _ = graph.add_variable(ElementRef::Species(s));
			}
		}
		for (p, parameter) in model.parameters().iter_enumerated() {
			if !parameter.is_constant() {
				let _ = graph.add_variable(ElementRef::Parameter(p));
			}
		}
		for r in model.reactions().indices() {
			let _ = graph.add_variable(ElementRef::Reaction(r));
		}

		for (r, reaction) in model.reactions().iter_enumerated() {
			for sref in reaction.products().iter().chain(reaction.reactants()) {
				let Some(s) = model.resolve_species(sref.species()) else {
					trace!(reaction = %reaction.id(), species = %sref.species(), "ignoring unknown species");
					continue;
				};
				let species = &model[s];
				let eq = Equation::SpeciesBalance(s);
				if species.is_constant()
					|| species.boundary_condition()
					|| graph.equation_index.contains_key(&eq)
				{
					continue;
				}
				let e = graph.add_equation(eq);
				if let Some(v) = graph.variable(ElementRef::Species(s)) {
					graph.add_edge(e, v);
				}
			}

			let e = graph.add_equation(Equation::KineticLaw(r));
			if let Some(v) = graph.variable(ElementRef::Reaction(r)) {
				graph.add_edge(e, v);
			}
		}

		for (r, rule) in model.rules().iter_enumerated() {
			match rule {
				Rule::Rate { variable, .. } => {
					let e = graph.add_equation(Equation::RateRule(r));
					match graph.resolve_variable(model, *variable) {
						Some(v) => graph.add_edge(e, v),
						None => trace!(%variable, "rate rule target is not a variable"),
					}
				}
				Rule::Assignment { variable, .. } => {
					match graph.resolve_variable(model, *variable) {
						Some(v) => {
							let e = graph.add_equation(Equation::AssignmentRule(r));
							graph.add_edge(e, v);
						}
						None => trace!(%variable, "ignoring assignment rule without variable target"),
					}
				}
				Rule::Algebraic { .. } => {}
			}
		}

		let extractor = VariableExtractor::new(model);
		for (r, rule) in model.rules().iter_enumerated() {
			if rule.is_algebraic() {
				let e = graph.add_equation(Equation::AlgebraicRule(r));
				for element in extractor.extract(rule.math()) {
					if let Some(v) = graph.variable(element) {
						graph.add_edge(e, v);
					}
				}
			}
		}

		debug!(
			variables = graph.variables.len(),
			equations = graph.equations.len(),
			edges = graph.edge_count(),
			"built bipartite graph"
		);
		graph
	}

	/// Add an edge between two nodes, unless it already exists.
	pub(crate) fn add_edge(&mut self, a: NodeRef, b: NodeRef) {
		if self.nodes[a].adjacent.contains(&b) {
			return;
		}
		self.nodes[a].adjacent.push(b);
		self.nodes[b].adjacent.push(a);
	}

	/// Create a new equation node.
	pub(crate) fn add_equation(&mut self, eq: Equation) -> NodeRef {
		debug_assert!(!self.equation_index.contains_key(&eq));
		let node = self.nodes.push(GraphNode::new(NodeKind::Equation(eq)));
		self.equations.push(node);
		let _ = self.equation_index.insert(eq, node);
		node
	}

	/// Create a new variable node.
	pub(crate) fn add_variable(&mut self, element: ElementRef) -> NodeRef {
		debug_assert!(!self.variable_index.contains_key(&element));
		let node = self.nodes.push(GraphNode::new(NodeKind::Variable(element)));
		self.variables.push(node);
		let _ = self.variable_index.insert(element, node);
		node
	}

	/// The nodes adjacent to `node`.
	pub(crate) fn adjacent(&self, node: NodeRef) -> &[NodeRef] {
		&self.nodes[node].adjacent
	}

	/// Number of edges in the graph.
	pub(crate) fn edge_count(&self) -> usize {
		self.equations
			.iter()
			.map(|&e| self.nodes[e].adjacent.len())
			.sum()
	}

	/// The equation represented by `node`.
	///
	/// # Panics
	///
	/// Panics if `node` is not an equation node.
	pub(crate) fn equation(&self, node: NodeRef) -> Equation {
		let NodeKind::Equation(eq) = self.nodes[node].kind else {
			unreachable!("node {node:?} is not an equation")
		};
		eq
	}

	/// The equation nodes, in order of creation.
	pub(crate) fn equations(&self) -> &[NodeRef] {
		&self.equations
	}

	/// Storage of all nodes.
	pub(crate) fn nodes(&self) -> &IndexVec<NodeRef, GraphNode> {
		&self.nodes
	}

	/// Lookup the variable node of the quantity with the given identifier.
	fn resolve_variable(&self, model: &Model, id: Ustr) -> Option<NodeRef> {
		model.resolve(id).and_then(|element| self.variable(element))
	}

	/// Lookup the variable node of the given quantity.
	pub(crate) fn variable(&self, element: ElementRef) -> Option<NodeRef> {
		self.variable_index.get(&element).copied()
	}

	/// The quantity represented by `node`.
	///
	/// # Panics
	///
	/// Panics if `node` is not a variable node.
	pub(crate) fn variable_element(&self, node: NodeRef) -> ElementRef {
		let NodeKind::Variable(element) = self.nodes[node].kind else {
			unreachable!("node {node:?} is not a variable")
		};
		element
	}

	/// The variable nodes, in order of creation.
	pub(crate) fn variables(&self) -> &[NodeRef] {
		&self.variables
	}
}

#[cfg(test)]
mod tests {
	use crate::{
		model::element::ElementRef,
		overdetermination::graph::{BipartiteGraph, Equation},
		tests::{determined_model, overdetermined_model},
		Compartment, KineticLaw, Math, Model, Operator, Parameter, Reaction, Rule, Species,
	};

	/// Labels of the equation nodes of `graph`, together with the identifiers
	/// of their adjacent variables.
	fn describe(model: &Model, graph: &BipartiteGraph) -> Vec<String> {
		graph
			.equations()
			.iter()
			.map(|&e| {
				let vars: Vec<_> = graph
					.adjacent(e)
					.iter()
					.map(|&v| model.element_id(graph.variable_element(v)).to_string())
					.collect();
				format!("{}: {}", graph.equation(e).describe(model), vars.join(" "))
			})
			.collect()
	}

	#[test]
	fn test_build_reaction_network() {
		let model = determined_model();
		let graph = BipartiteGraph::build(&model);
		assert_eq!(graph.variables().len(), 3);
		assert_eq!(
			describe(&model, &graph),
			vec!["balance(S): S", "kinetic_law(R1): R1", "kinetic_law(R2): R2"]
		);
		assert_eq!(graph.edge_count(), 3);
	}

	#[test]
	fn test_build_algebraic_rules() {
		let model = overdetermined_model();
		let graph = BipartiteGraph::build(&model);
		assert_eq!(graph.variables().len(), 2);
		assert_eq!(
			describe(&model, &graph),
			vec![
				"algebraic_rule(0): P1 P2",
				"algebraic_rule(1): P1 P2",
				"algebraic_rule(2): P1 P2"
			]
		);
		let p1 = graph
			.variable(model.resolve("P1".into()).unwrap())
			.unwrap();
		assert_eq!(graph.adjacent(p1).len(), 3);
	}

	#[test]
	fn test_build_skips_fixed_species() {
		let mut model = Model::new(3);
		let _ = model
			.add_species(Species::new("B").with_boundary_condition(true))
			.unwrap();
		let _ = model
			.add_species(Species::new("C").with_constant(true))
			.unwrap();
		let _ = model
			.add_reaction(
				Reaction::new("R")
					.with_reactant("B")
					.with_product("C")
					.with_product("missing"),
			)
			.unwrap();
		let graph = BipartiteGraph::build(&model);
		// `B` remains a variable, but has no balance equation; `C` is neither.
		assert_eq!(graph.variables().len(), 2);
		assert_eq!(describe(&model, &graph), vec!["kinetic_law(R): R"]);
	}

	#[test]
	fn test_build_reaction_without_kinetic_law() {
		let mut model = Model::new(3);
		let r = model.add_reaction(Reaction::new("R")).unwrap();
		assert!(!model[r].is_set_kinetic_law());
		let graph = BipartiteGraph::build(&model);
		assert_eq!(graph.equations().len(), 1);
		assert_eq!(
			graph.equation(graph.equations()[0]),
			Equation::KineticLaw(r)
		);
	}

	#[test]
	fn test_build_compartments_by_level() {
		for (level, expected) in [(1, 1), (2, 0)] {
			let mut model = Model::new(level);
			let _ = model.add_compartment(Compartment::new("cell")).unwrap();
			model += Rule::assignment("cell", 1.0.into());
			let graph = BipartiteGraph::build(&model);
			assert_eq!(graph.variables().len(), expected);
			assert_eq!(graph.equations().len(), expected);
		}
	}

	#[test]
	fn test_build_explicit_rules() {
		let mut model = Model::new(3);
		let x = model
			.add_parameter(Parameter::new("x").with_constant(false))
			.unwrap();
		let _ = model.add_parameter(Parameter::new("k")).unwrap();
		let rate = model.add_rule(Rule::rate("x", Math::name("k")));
		// Neither rule has a variable target, only the rate rule is kept.
		let orphan = model.add_rule(Rule::rate("k", 1.0.into()));
		model += Rule::assignment("nope", 1.0.into());
		model += Rule::assignment("k", 1.0.into());

		let graph = BipartiteGraph::build(&model);
		assert_eq!(
			graph
				.equations()
				.iter()
				.map(|&e| graph.equation(e))
				.collect::<Vec<_>>(),
			vec![Equation::RateRule(rate), Equation::RateRule(orphan)]
		);
		let xv = graph.variable(ElementRef::Parameter(x)).unwrap();
		assert_eq!(graph.adjacent(graph.equations()[0]), &[xv]);
		assert!(graph.adjacent(graph.equations()[1]).is_empty());
	}

	#[test]
	fn test_build_algebraic_rule_without_math() {
		let mut model = Model::new(3);
		let _ = model
			.add_parameter(Parameter::new("x").with_constant(false))
			.unwrap();
		model += Rule::Algebraic { math: None };
		model += Rule::algebraic(Math::apply(
			Operator::Minus,
			[Math::name("x"), Math::name("x")],
		));
		let graph = BipartiteGraph::build(&model);
		assert_eq!(
			describe(&model, &graph),
			vec!["algebraic_rule(0): ", "algebraic_rule(1): x"]
		);
	}

	#[test]
	fn test_add_edge_once() {
		let mut model = Model::new(3);
		let _ = model
			.add_reaction(Reaction::new("R").with_kinetic_law(KineticLaw::new(1.0.into())))
			.unwrap();
		let mut graph = BipartiteGraph::build(&model);
		let e = graph.equations()[0];
		let v = graph.variables()[0];
		graph.add_edge(e, v);
		graph.add_edge(v, e);
		assert_eq!(graph.adjacent(e), &[v]);
		assert_eq!(graph.adjacent(v), &[e]);
	}
}
