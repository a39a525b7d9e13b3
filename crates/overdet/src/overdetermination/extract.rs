//! Harvesting of the model quantities referenced by an expression tree.

use tracing::trace;
use ustr::Ustr;

use crate::{
	model::{element::ElementRef, math::Math},
	Model,
};

#[derive(Clone, Copy, Debug)]
/// Collects the quantities of a [`Model`] that an expression refers to.
///
/// Only leaves that carry a symbol are considered: literals, MathML constants,
/// and the `time` and `avogadro` symbols never refer to a model quantity.
/// Symbols that cannot be resolved in the model (e.g. function definitions, or
/// identifiers unknown to the model) are ignored.
pub struct VariableExtractor<'a> {
	/// The model in which symbols are resolved.
	model: &'a Model,
	/// Identifiers of local parameters that shadow quantities of the model.
	local_parameters: Option<&'a [Ustr]>,
}

impl<'a> VariableExtractor<'a> {
	/// Create an extractor that resolves symbols in the given model.
	pub fn new(model: &'a Model) -> Self {
		Self {
			model,
			local_parameters: None,
		}
	}

	/// Exclude the given local parameters from the result.
	///
	/// A symbol that names one of the local parameters refers to the parameter
	/// and not to a global quantity with the same identifier.
	pub fn with_local_parameters(mut self, local_parameters: &'a [Ustr]) -> Self {
		self.local_parameters = Some(local_parameters);
		self
	}

	/// Returns the quantities referenced by `math` without duplicates.
	///
	/// For Level 1 models, each newly found quantity is placed before all
	/// collected parameters that have a value. For later levels the quantities
	/// are returned in order of their first occurrence.
	pub fn extract(&self, math: Option<&Math>) -> Vec<ElementRef> {
		let mut found = Vec::new();
		if let Some(math) = math {
			self.visit(math, &mut found);
		}
		found
	}

	/// Recursively visit `node`, adding the quantities it references to
	/// `found`.
	fn visit(&self, node: &Math, found: &mut Vec<ElementRef>) {
		let is_reference = node.is_leaf()
			&& node.is_symbol()
			&& !node.is_time()
			&& !node.is_avogadro()
			&& !node.is_constant();
		if !is_reference {
			for child in node.children() {
				self.visit(child, found);
			}
			return;
		}

		let Some(id) = node.symbol() else {
			return;
		};
		if self
			.local_parameters
			.is_some_and(|local| local.contains(&id))
		{
			return;
		}
		let Some(element) = self.model.resolve(id) else {
			trace!(%id, "ignoring symbol that is not a model quantity");
			return;
		};
		if found.contains(&element) {
			return;
		}

		if self.model.level() == 1 {
			let pos = found
				.iter()
				.filter(|&&e| !self.model.is_valued_parameter(e))
				.count();
			found.insert(pos, element);
		} else {
			found.push(element);
		}
	}
}

#[cfg(test)]
mod tests {
	use ustr::Ustr;

	use crate::{
		model::element::ElementRef, Math, MathConstant, Model, Operator, Parameter, Species,
		VariableExtractor,
	};

	/// Model with a valued parameter `k1`, a species `S`, and a parameter `p`
	/// without value, written in the given level.
	fn mixed_model(level: u32) -> (Model, [ElementRef; 3]) {
		let mut model = Model::new(level);
		let k1 = model
			.add_parameter(Parameter::new("k1").with_value(2.0))
			.unwrap();
		let s = model.add_species(Species::new("S")).unwrap();
		let p = model
			.add_parameter(Parameter::new("p").with_constant(false))
			.unwrap();
		(
			model,
			[
				ElementRef::Parameter(k1),
				ElementRef::Species(s),
				ElementRef::Parameter(p),
			],
		)
	}

	/// The expression `k1 * S + p`.
	fn mixed_expression() -> Math {
		Math::apply(
			Operator::Plus,
			[
				Math::apply(Operator::Times, [Math::name("k1"), Math::name("S")]),
				Math::name("p"),
			],
		)
	}

	#[test]
	fn test_extract_in_order() {
		let (model, [k1, s, p]) = mixed_model(2);
		let found = VariableExtractor::new(&model).extract(Some(&mixed_expression()));
		assert_eq!(found, vec![k1, s, p]);
	}

	#[test]
	fn test_extract_level_one_order() {
		let (model, [k1, s, p]) = mixed_model(1);
		let found = VariableExtractor::new(&model).extract(Some(&mixed_expression()));
		assert_eq!(found, vec![s, p, k1]);
	}

	#[test]
	fn test_extract_skips_special_leaves() {
		let (model, [_, s, _]) = mixed_model(3);
		let math = Math::apply(
			Operator::Times,
			[
				Math::Time,
				Math::Avogadro,
				MathConstant::Pi.into(),
				4.0.into(),
				Math::name("S"),
				Math::name("unknown"),
				Math::Call("f".into(), Vec::new()),
				Math::name("S"),
			],
		);
		let found = VariableExtractor::new(&model).extract(Some(&math));
		assert_eq!(found, vec![s]);
	}

	#[test]
	fn test_extract_function_arguments() {
		let (model, [k1, _, p]) = mixed_model(3);
		let math = Math::Call("f".into(), vec![Math::name("p"), Math::name("k1")]);
		let found = VariableExtractor::new(&model).extract(Some(&math));
		assert_eq!(found, vec![p, k1]);
	}

	#[test]
	fn test_extract_local_parameters() {
		let (model, [_, s, p]) = mixed_model(3);
		let local = [Ustr::from("k1")];
		let found = VariableExtractor::new(&model)
			.with_local_parameters(&local)
			.extract(Some(&mixed_expression()));
		assert_eq!(found, vec![s, p]);
	}

	#[test]
	fn test_extract_absent_math() {
		let (model, _) = mixed_model(3);
		assert!(VariableExtractor::new(&model).extract(None).is_empty());
	}
}
