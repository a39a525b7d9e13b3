//! Definitions of the quantities (compartments, species, parameters, and
//! reactions) that make up a [`crate::Model`].

use index_vec::define_index_type;
use serde::Deserialize;
use ustr::Ustr;

use crate::model::math::Math;

define_index_type! {
	/// Reference type for compartments in a [`crate::Model`].
	pub struct CompartmentRef = u32;
}

define_index_type! {
	/// Reference type for species in a [`crate::Model`].
	pub struct SpeciesRef = u32;
}

define_index_type! {
	/// Reference type for global parameters in a [`crate::Model`].
	pub struct ParameterRef = u32;
}

define_index_type! {
	/// Reference type for reactions in a [`crate::Model`].
	pub struct ReactionRef = u32;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Identity of a quantity in a [`crate::Model`] that can be determined by an
/// equation.
pub enum ElementRef {
	/// A compartment, whose size may vary.
	Compartment(CompartmentRef),
	/// A species, whose amount or concentration may vary.
	Species(SpeciesRef),
	/// A global parameter, whose value may vary.
	Parameter(ParameterRef),
	/// A reaction, whose rate is determined by its kinetic law.
	Reaction(ReactionRef),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
/// A compartment: a bounded container in which species are located.
pub struct Compartment {
	/// Identifier of the compartment.
	pub(crate) id: Ustr,
	/// Whether the size of the compartment is fixed.
	///
	/// In Level 1 models compartments cannot be declared constant, and this
	/// flag is ignored.
	#[serde(default = "default_true")]
	pub(crate) constant: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
/// A species: a pool of entities that takes part in reactions.
pub struct Species {
	/// Identifier of the species.
	pub(crate) id: Ustr,
	/// Identifier of the compartment in which the species is located.
	#[serde(default)]
	pub(crate) compartment: Option<Ustr>,
	/// Whether the quantity of the species is fixed.
	#[serde(default)]
	pub(crate) constant: bool,
	/// Whether the quantity of the species is determined externally, exempting
	/// it from the reactions' mass balance.
	#[serde(default)]
	pub(crate) boundary_condition: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
/// A global parameter of the model.
pub struct Parameter {
	/// Identifier of the parameter.
	pub(crate) id: Ustr,
	/// The initial value of the parameter, if set.
	#[serde(default)]
	pub(crate) value: Option<f64>,
	/// Whether the value of the parameter is fixed.
	#[serde(default = "default_true")]
	pub(crate) constant: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
/// A reaction that transforms reactant species into product species.
pub struct Reaction {
	/// Identifier of the reaction.
	pub(crate) id: Ustr,
	/// The species consumed by the reaction.
	#[serde(default)]
	pub(crate) reactants: Vec<SpeciesReference>,
	/// The species produced by the reaction.
	#[serde(default)]
	pub(crate) products: Vec<SpeciesReference>,
	/// The rate law of the reaction, if set.
	#[serde(default)]
	pub(crate) kinetic_law: Option<KineticLaw>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
/// Reference from a reaction to a species that it consumes or produces.
pub struct SpeciesReference {
	/// Identifier of the referenced species.
	pub(crate) species: Ustr,
	/// The stoichiometric coefficient, if set.
	#[serde(default)]
	pub(crate) stoichiometry: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
/// The rate expression of a reaction.
pub struct KineticLaw {
	/// The rate expression, if set.
	#[serde(default)]
	pub(crate) math: Option<Math>,
	/// Identifiers of the parameters that are local to the kinetic law, and
	/// shadow global quantities with the same identifier.
	#[serde(default)]
	pub(crate) local_parameters: Vec<Ustr>,
}

/// Default value used for flags that SBML defines as `true` when omitted.
fn default_true() -> bool {
	true
}

impl Compartment {
	/// Create a new constant compartment with the given identifier.
	pub fn new(id: &str) -> Self {
		Self {
			id: id.into(),
			constant: true,
		}
	}

	/// Identifier of the compartment.
	pub fn id(&self) -> Ustr {
		self.id
	}

	/// Whether the size of the compartment is fixed.
	pub fn is_constant(&self) -> bool {
		self.constant
	}

	/// Change whether the size of the compartment is fixed.
	pub fn with_constant(mut self, constant: bool) -> Self {
		self.constant = constant;
		self
	}
}

impl Species {
	/// Create a new variable species with the given identifier that is not on
	/// the boundary.
	pub fn new(id: &str) -> Self {
		Self {
			id: id.into(),
			compartment: None,
			constant: false,
			boundary_condition: false,
		}
	}

	/// Identifier of the species.
	pub fn id(&self) -> Ustr {
		self.id
	}

	/// Identifier of the compartment in which the species is located, if set.
	pub fn compartment(&self) -> Option<Ustr> {
		self.compartment
	}

	/// Whether the quantity of the species is fixed.
	pub fn is_constant(&self) -> bool {
		self.constant
	}

	/// Whether the quantity of the species is determined externally.
	pub fn boundary_condition(&self) -> bool {
		self.boundary_condition
	}

	/// Change the compartment in which the species is located.
	pub fn with_compartment(mut self, compartment: &str) -> Self {
		self.compartment = Some(compartment.into());
		self
	}

	/// Change whether the quantity of the species is fixed.
	pub fn with_constant(mut self, constant: bool) -> Self {
		self.constant = constant;
		self
	}

	/// Change whether the quantity of the species is determined externally.
	pub fn with_boundary_condition(mut self, boundary_condition: bool) -> Self {
		self.boundary_condition = boundary_condition;
		self
	}
}

impl Parameter {
	/// Create a new constant parameter with the given identifier and no value.
	pub fn new(id: &str) -> Self {
		Self {
			id: id.into(),
			value: None,
			constant: true,
		}
	}

	/// Identifier of the parameter.
	pub fn id(&self) -> Ustr {
		self.id
	}

	/// The initial value of the parameter, if set.
	pub fn value(&self) -> Option<f64> {
		self.value
	}

	/// Whether the parameter has been given a numeric value.
	pub fn is_set_value(&self) -> bool {
		self.value.is_some()
	}

	/// Whether the value of the parameter is fixed.
	pub fn is_constant(&self) -> bool {
		self.constant
	}

	/// Change whether the value of the parameter is fixed.
	pub fn with_constant(mut self, constant: bool) -> Self {
		self.constant = constant;
		self
	}

	/// Change the initial value of the parameter.
	pub fn with_value(mut self, value: f64) -> Self {
		self.value = Some(value);
		self
	}
}

impl Reaction {
	/// Create a new reaction with the given identifier, without participants or
	/// kinetic law.
	pub fn new(id: &str) -> Self {
		Self {
			id: id.into(),
			reactants: Vec::new(),
			products: Vec::new(),
			kinetic_law: None,
		}
	}

	/// Identifier of the reaction.
	pub fn id(&self) -> Ustr {
		self.id
	}

	/// The species consumed by the reaction.
	pub fn reactants(&self) -> &[SpeciesReference] {
		&self.reactants
	}

	/// The species produced by the reaction.
	pub fn products(&self) -> &[SpeciesReference] {
		&self.products
	}

	/// The kinetic law of the reaction, if set.
	pub fn kinetic_law(&self) -> Option<&KineticLaw> {
		self.kinetic_law.as_ref()
	}

	/// Whether the reaction has a kinetic law.
	pub fn is_set_kinetic_law(&self) -> bool {
		self.kinetic_law.is_some()
	}

	/// Add a species consumed by the reaction.
	pub fn with_reactant(mut self, species: &str) -> Self {
		self.reactants.push(SpeciesReference::new(species));
		self
	}

	/// Add a species produced by the reaction.
	pub fn with_product(mut self, species: &str) -> Self {
		self.products.push(SpeciesReference::new(species));
		self
	}

	/// Change the kinetic law of the reaction.
	pub fn with_kinetic_law(mut self, law: KineticLaw) -> Self {
		self.kinetic_law = Some(law);
		self
	}
}

impl SpeciesReference {
	/// Create a reference to the species with the given identifier.
	pub fn new(species: &str) -> Self {
		Self {
			species: species.into(),
			stoichiometry: None,
		}
	}

	/// Identifier of the referenced species.
	pub fn species(&self) -> Ustr {
		self.species
	}

	/// The stoichiometric coefficient, if set.
	pub fn stoichiometry(&self) -> Option<f64> {
		self.stoichiometry
	}
}

impl KineticLaw {
	/// Create a kinetic law with the given rate expression.
	pub fn new(math: Math) -> Self {
		Self {
			math: Some(math),
			local_parameters: Vec::new(),
		}
	}

	/// The rate expression, if set.
	pub fn math(&self) -> Option<&Math> {
		self.math.as_ref()
	}

	/// Identifiers of the parameters local to the kinetic law.
	pub fn local_parameters(&self) -> &[Ustr] {
		&self.local_parameters
	}

	/// Add a parameter local to the kinetic law.
	pub fn with_local_parameter(mut self, id: &str) -> Self {
		self.local_parameters.push(id.into());
		self
	}
}
