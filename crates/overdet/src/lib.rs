//! # Overdet - Structural Overdetermination Checks for Reaction Network Models
//!
//! Overdet decides whether a reaction network model, in the style of SBML,
//! contains more equations than there are quantities for these equations to
//! determine. Such a model is called overdetermined, and cannot be simulated
//! consistently.
//!
//! The check is purely structural: the equations of the model (species mass
//! balances, kinetic laws, and rules) and its variable quantities form a
//! bipartite graph, in which an edge means that an equation can be used to
//! compute a quantity. The model is overdetermined if no matching of this graph
//! assigns a distinct quantity to every equation.
//!
//! ```
//! use overdet::{Math, Model, OverdeterminationChecker, Parameter, Rule};
//!
//! let mut model = Model::default();
//! let _ = model
//! 	.add_parameter(Parameter::new("x").with_constant(false))
//! 	.unwrap();
//! model += Rule::assignment("x", 1.0.into());
//! model += Rule::algebraic(Math::name("x"));
//!
//! let checker = OverdeterminationChecker::new(&model);
//! assert!(checker.is_overdetermined());
//! ```

pub(crate) mod model;
pub(crate) mod overdetermination;

pub use crate::{
	model::{
		element::{
			Compartment, CompartmentRef, ElementRef, KineticLaw, Parameter, ParameterRef,
			Reaction, ReactionRef, Species, SpeciesRef, SpeciesReference,
		},
		math::{Math, MathConstant, Operator},
		rule::{Rule, RuleRef},
		Model, ModelError,
	},
	overdetermination::{
		extract::VariableExtractor, graph::Equation, CheckConfig, CheckStatistics,
		OverdeterminationChecker,
	},
};
