//! Module that defines the read-only representation of a reaction network
//! model: its quantities, reactions, and rules.

pub(crate) mod element;
pub(crate) mod math;
pub(crate) mod rule;

use std::{
	collections::HashMap,
	ops::{AddAssign, Index},
};

use index_vec::IndexVec;
use serde::Deserialize;
use thiserror::Error;
use ustr::Ustr;

use crate::model::{
	element::{
		Compartment, CompartmentRef, ElementRef, Parameter, ParameterRef, Reaction, ReactionRef,
		Species, SpeciesRef,
	},
	rule::{Rule, RuleRef},
};

#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "ModelDef")]
/// A reaction network model: compartments, species, parameters, reactions, and
/// rules.
///
/// Quantities are registered under unique identifiers, which are used by
/// reactions, rules, and expressions to refer to them. References to
/// identifiers that are not part of the model are allowed; they are resolved
/// (or ignored) by the analyses that consume the model.
pub struct Model {
	/// The SBML level the model is written in.
	level: u32,
	/// The compartments of the model.
	compartments: IndexVec<CompartmentRef, Compartment>,
	/// The species of the model.
	species: IndexVec<SpeciesRef, Species>,
	/// The global parameters of the model.
	parameters: IndexVec<ParameterRef, Parameter>,
	/// The reactions of the model.
	reactions: IndexVec<ReactionRef, Reaction>,
	/// The rules of the model, in document order.
	rules: IndexVec<RuleRef, Rule>,
	/// Lookup table from identifiers to the quantities that carry them.
	ids: HashMap<Ustr, ElementRef>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Error type used when a [`Model`] is assembled from inconsistent parts.
pub enum ModelError {
	#[error("identifier `{0}` is used by more than one element of the model")]
	/// Error used when two quantities are registered with the same identifier.
	DuplicateId(Ustr),
}

#[derive(Deserialize)]
/// Serialized form of a [`Model`], before its identifiers have been checked.
struct ModelDef {
	/// The SBML level the model is written in.
	#[serde(default = "ModelDef::default_level")]
	level: u32,
	/// The compartments of the model.
	#[serde(default)]
	compartments: Vec<Compartment>,
	/// The species of the model.
	#[serde(default)]
	species: Vec<Species>,
	/// The global parameters of the model.
	#[serde(default)]
	parameters: Vec<Parameter>,
	/// The reactions of the model.
	#[serde(default)]
	reactions: Vec<Reaction>,
	/// The rules of the model.
	#[serde(default)]
	rules: Vec<Rule>,
}

impl Model {
	/// The SBML level assumed when none is given.
	pub const DEFAULT_LEVEL: u32 = 3;

	/// Create a new, empty model written in the given SBML level.
	pub fn new(level: u32) -> Self {
		Self {
			level,
			compartments: IndexVec::new(),
			species: IndexVec::new(),
			parameters: IndexVec::new(),
			reactions: IndexVec::new(),
			rules: IndexVec::new(),
			ids: HashMap::new(),
		}
	}

	/// The SBML level the model is written in.
	pub fn level(&self) -> u32 {
		self.level
	}

	/// Add a compartment to the model.
	pub fn add_compartment(&mut self, c: Compartment) -> Result<CompartmentRef, ModelError> {
		let r = self.compartments.next_idx();
		self.register(c.id, ElementRef::Compartment(r))?;
		Ok(self.compartments.push(c))
	}

	/// Add a species to the model.
	pub fn add_species(&mut self, s: Species) -> Result<SpeciesRef, ModelError> {
		let r = self.species.next_idx();
		self.register(s.id, ElementRef::Species(r))?;
		Ok(self.species.push(s))
	}

	/// Add a global parameter to the model.
	pub fn add_parameter(&mut self, p: Parameter) -> Result<ParameterRef, ModelError> {
		let r = self.parameters.next_idx();
		self.register(p.id, ElementRef::Parameter(r))?;
		Ok(self.parameters.push(p))
	}

	/// Add a reaction to the model.
	pub fn add_reaction(&mut self, r: Reaction) -> Result<ReactionRef, ModelError> {
		let idx = self.reactions.next_idx();
		self.register(r.id, ElementRef::Reaction(idx))?;
		Ok(self.reactions.push(r))
	}

	/// Add a rule to the model.
	///
	/// Note that the `+=` operator can be used as a shorthand when the
	/// reference to the rule is not required.
	pub fn add_rule(&mut self, rule: Rule) -> RuleRef {
		self.rules.push(rule)
	}

	/// Internal method to claim an identifier for the given element.
	fn register(&mut self, id: Ustr, element: ElementRef) -> Result<(), ModelError> {
		if self.ids.contains_key(&id) {
			return Err(ModelError::DuplicateId(id));
		}
		let _ = self.ids.insert(id, element);
		Ok(())
	}

	/// Lookup the quantity with the given identifier.
	pub fn resolve(&self, id: Ustr) -> Option<ElementRef> {
		self.ids.get(&id).copied()
	}

	/// Lookup the species with the given identifier.
	pub fn resolve_species(&self, id: Ustr) -> Option<SpeciesRef> {
		match self.resolve(id) {
			Some(ElementRef::Species(s)) => Some(s),
			_ => None,
		}
	}

	/// Returns the identifier of the given quantity.
	pub fn element_id(&self, element: ElementRef) -> Ustr {
		match element {
			ElementRef::Compartment(c) => self[c].id,
			ElementRef::Species(s) => self[s].id,
			ElementRef::Parameter(p) => self[p].id,
			ElementRef::Reaction(r) => self[r].id,
		}
	}

	/// Whether the given quantity is a global parameter that has been given a
	/// numeric value.
	pub fn is_valued_parameter(&self, element: ElementRef) -> bool {
		matches!(element, ElementRef::Parameter(p) if self[p].is_set_value())
	}

	/// The compartments of the model.
	pub fn compartments(&self) -> &IndexVec<CompartmentRef, Compartment> {
		&self.compartments
	}

	/// The species of the model.
	pub fn species(&self) -> &IndexVec<SpeciesRef, Species> {
		&self.species
	}

	/// The global parameters of the model.
	pub fn parameters(&self) -> &IndexVec<ParameterRef, Parameter> {
		&self.parameters
	}

	/// The reactions of the model.
	pub fn reactions(&self) -> &IndexVec<ReactionRef, Reaction> {
		&self.reactions
	}

	/// The rules of the model, in document order.
	pub fn rules(&self) -> &IndexVec<RuleRef, Rule> {
		&self.rules
	}
}

impl AddAssign<Rule> for Model {
	fn add_assign(&mut self, rule: Rule) {
		let _ = self.add_rule(rule);
	}
}

impl Default for Model {
	fn default() -> Self {
		Self::new(Self::DEFAULT_LEVEL)
	}
}

impl Index<CompartmentRef> for Model {
	type Output = Compartment;

	fn index(&self, index: CompartmentRef) -> &Self::Output {
		&self.compartments[index]
	}
}

impl Index<ParameterRef> for Model {
	type Output = Parameter;

	fn index(&self, index: ParameterRef) -> &Self::Output {
		&self.parameters[index]
	}
}

impl Index<ReactionRef> for Model {
	type Output = Reaction;

	fn index(&self, index: ReactionRef) -> &Self::Output {
		&self.reactions[index]
	}
}

impl Index<RuleRef> for Model {
	type Output = Rule;

	fn index(&self, index: RuleRef) -> &Self::Output {
		&self.rules[index]
	}
}

impl Index<SpeciesRef> for Model {
	type Output = Species;

	fn index(&self, index: SpeciesRef) -> &Self::Output {
		&self.species[index]
	}
}

impl ModelDef {
	/// Level used for serialized models that do not state one.
	fn default_level() -> u32 {
		Model::DEFAULT_LEVEL
	}
}

impl TryFrom<ModelDef> for Model {
	type Error = ModelError;

	fn try_from(def: ModelDef) -> Result<Self, Self::Error> {
		let mut model = Model::new(def.level);
		for c in def.compartments {
			let _ = model.add_compartment(c)?;
		}
		for s in def.species {
			let _ = model.add_species(s)?;
		}
		for p in def.parameters {
			let _ = model.add_parameter(p)?;
		}
		for r in def.reactions {
			let _ = model.add_reaction(r)?;
		}
		for rule in def.rules {
			model += rule;
		}
		Ok(model)
	}
}

#[cfg(test)]
mod tests {
	use ustr::Ustr;

	use crate::{
		model::{
			element::{CompartmentRef, ElementRef, ParameterRef, ReactionRef, SpeciesRef},
			rule::RuleRef,
			ModelError,
		},
		Compartment, Math, Model, Parameter, Reaction, Rule, Species,
	};

	#[test]
	fn test_resolve() {
		let mut model = Model::new(2);
		let c = model
			.add_compartment(Compartment::new("cell").with_constant(false))
			.unwrap();
		let s = model
			.add_species(Species::new("S").with_compartment("cell"))
			.unwrap();
		let p = model
			.add_parameter(Parameter::new("k").with_value(0.5))
			.unwrap();
		let r = model.add_reaction(Reaction::new("R").with_reactant("S")).unwrap();

		assert_eq!(model.resolve("cell".into()), Some(ElementRef::Compartment(c)));
		assert_eq!(model.resolve("S".into()), Some(ElementRef::Species(s)));
		assert_eq!(model.resolve_species("S".into()), Some(s));
		assert_eq!(model.resolve_species("k".into()), None);
		assert_eq!(model.resolve("R".into()), Some(ElementRef::Reaction(r)));
		assert_eq!(model.resolve("missing".into()), None);

		assert_eq!(model.element_id(ElementRef::Parameter(p)).as_str(), "k");
		assert!(model.is_valued_parameter(ElementRef::Parameter(p)));
		assert!(!model.is_valued_parameter(ElementRef::Species(s)));
		assert_eq!(model[s].compartment(), Some(Ustr::from("cell")));
	}

	#[test]
	fn test_duplicate_id() {
		let mut model = Model::default();
		let _ = model.add_species(Species::new("X")).unwrap();
		assert_eq!(
			model.add_parameter(Parameter::new("X")),
			Err(ModelError::DuplicateId("X".into()))
		);
		assert!(model.parameters().is_empty());
	}

	#[test]
	fn test_deserialize_model() {
		let model: Model = serde_json::from_str(
			r#"{
				"level": 2,
				"compartments": [{"id": "cell"}],
				"species": [
					{"id": "S", "compartment": "cell"},
					{"id": "B", "boundary_condition": true}
				],
				"parameters": [{"id": "k", "value": 1.0, "constant": false}],
				"reactions": [{
					"id": "R1",
					"reactants": [{"species": "S", "stoichiometry": 2.0}],
					"products": [{"species": "B"}],
					"kinetic_law": {"math": {"name": "k"}, "local_parameters": ["kf"]}
				}],
				"rules": [
					{"kind": "rate", "variable": "k", "math": {"number": 1.0}},
					{"kind": "algebraic"}
				]
			}"#,
		)
		.unwrap();

		assert_eq!(model.level(), 2);
		assert!(model[CompartmentRef::new(0)].is_constant());
		assert!(model[SpeciesRef::new(1)].boundary_condition());
		assert!(!model[ParameterRef::new(0)].is_constant());

		let r1 = &model[ReactionRef::new(0)];
		assert_eq!(r1.reactants()[0].stoichiometry(), Some(2.0));
		let law = r1.kinetic_law().unwrap();
		assert_eq!(law.math(), Some(&Math::name("k")));
		assert_eq!(law.local_parameters(), &[Ustr::from("kf")]);

		assert_eq!(model.rules().len(), 2);
		assert_eq!(model[RuleRef::new(0)], Rule::rate("k", 1.0.into()));
		assert_eq!(model[RuleRef::new(1)], Rule::Algebraic { math: None });
	}

	#[test]
	fn test_deserialize_duplicate_id() {
		let err = serde_json::from_str::<Model>(
			r#"{"species": [{"id": "S"}], "reactions": [{"id": "S"}]}"#,
		)
		.unwrap_err();
		assert!(err.to_string().contains("identifier `S`"));
	}
}
