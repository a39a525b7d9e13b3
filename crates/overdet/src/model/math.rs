//! Symbolic mathematical expressions attached to rules and kinetic laws in a
//! [`crate::Model`].

use serde::Deserialize;
use ustr::Ustr;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
/// A node in the expression tree of a rule or kinetic law.
///
/// The tree mirrors the MathML content elements that occur in reaction network
/// models: literals, identifiers (`ci`), the `time` and `avogadro` symbols,
/// MathML constants, applications of built-in operators, and calls to
/// user-defined functions.
pub enum Math {
	/// Numeric literal.
	Number(f64),
	/// Reference to a model quantity (or a local parameter) by identifier.
	Name(Ustr),
	/// The simulation time symbol.
	Time,
	/// The Avogadro constant symbol.
	Avogadro,
	/// A MathML constant such as `pi` or `true`.
	Constant(MathConstant),
	/// Application of a built-in operator to its arguments.
	Apply(Operator, Vec<Math>),
	/// Call of a user-defined function with the given arguments.
	Call(Ustr, Vec<Math>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Constants defined by MathML.
pub enum MathConstant {
	/// Euler's number.
	ExponentialE,
	/// The logical constant `false`.
	False,
	/// Positive infinity.
	Infinity,
	/// Not-a-number.
	NotANumber,
	/// The ratio of a circle's circumference to its diameter.
	Pi,
	/// The logical constant `true`.
	True,
}

#[allow(
	missing_docs,
	clippy::missing_docs_in_private_items,
	reason = "operators are named after their MathML elements"
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Built-in operators that can be applied in a [`Math::Apply`] node.
pub enum Operator {
	Abs,
	And,
	Ceiling,
	Cos,
	Divide,
	Eq,
	Exp,
	Factorial,
	Floor,
	Geq,
	Gt,
	Leq,
	Ln,
	Log,
	Lt,
	Minus,
	Neq,
	Not,
	Or,
	Piecewise,
	Plus,
	Power,
	Root,
	Sin,
	Tan,
	Times,
	Xor,
}

impl Math {
	/// Create a node that references the quantity with the given identifier.
	pub fn name(id: &str) -> Self {
		Self::Name(Ustr::from(id))
	}

	/// Create a node that applies `op` to the given arguments.
	pub fn apply(op: Operator, args: impl IntoIterator<Item = Math>) -> Self {
		Self::Apply(op, args.into_iter().collect())
	}

	/// Returns the sub-expressions of this node, in order.
	pub fn children(&self) -> &[Math] {
		match self {
			Self::Apply(_, args) | Self::Call(_, args) => args,
			_ => &[],
		}
	}

	/// Returns `true` if the node has no children.
	pub fn is_leaf(&self) -> bool {
		self.children().is_empty()
	}

	/// Returns `true` if the node carries a symbol rather than a literal value,
	/// i.e. it is an identifier, a special symbol, or a function call.
	pub fn is_symbol(&self) -> bool {
		matches!(
			self,
			Self::Name(_) | Self::Time | Self::Avogadro | Self::Call(_, _)
		)
	}

	/// Returns `true` if the node is the simulation time symbol.
	pub fn is_time(&self) -> bool {
		matches!(self, Self::Time)
	}

	/// Returns `true` if the node is the Avogadro constant symbol.
	pub fn is_avogadro(&self) -> bool {
		matches!(self, Self::Avogadro)
	}

	/// Returns `true` if the node is a MathML constant.
	///
	/// Note that this is a property of the expression, not of the quantity that
	/// an identifier refers to: a name referencing a constant parameter is not a
	/// constant node.
	pub fn is_constant(&self) -> bool {
		matches!(self, Self::Constant(_))
	}

	/// Returns the identifier carried by the node, if it references a model
	/// quantity or function.
	pub fn symbol(&self) -> Option<Ustr> {
		match self {
			Self::Name(id) | Self::Call(id, _) => Some(*id),
			_ => None,
		}
	}
}

impl From<f64> for Math {
	fn from(value: f64) -> Self {
		Self::Number(value)
	}
}

impl From<MathConstant> for Math {
	fn from(value: MathConstant) -> Self {
		Self::Constant(value)
	}
}
