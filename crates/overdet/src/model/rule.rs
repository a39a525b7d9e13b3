//! Rules that define or constrain quantities of a [`crate::Model`] outside of
//! reactions.

use index_vec::define_index_type;
use serde::Deserialize;
use ustr::Ustr;

use crate::model::math::Math;

define_index_type! {
	/// Reference type for rules in a [`crate::Model`].
	pub struct RuleRef = u32;
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// A rule of a [`crate::Model`].
pub enum Rule {
	/// An implicit relation between quantities: the expression must evaluate to
	/// zero.
	Algebraic {
		/// The expression that is constrained to zero, if set.
		#[serde(default)]
		math: Option<Math>,
	},
	/// Direct assignment of the value of an expression to a quantity.
	Assignment {
		/// Identifier of the assigned quantity.
		variable: Ustr,
		/// The assigned expression, if set.
		#[serde(default)]
		math: Option<Math>,
	},
	/// Assignment of the value of an expression to the time derivative of a
	/// quantity.
	Rate {
		/// Identifier of the quantity whose rate of change is defined.
		variable: Ustr,
		/// The rate expression, if set.
		#[serde(default)]
		math: Option<Math>,
	},
}

impl Rule {
	/// Create an algebraic rule constraining the given expression to zero.
	pub fn algebraic(math: Math) -> Self {
		Self::Algebraic { math: Some(math) }
	}

	/// Create an assignment rule for the quantity with identifier `variable`.
	pub fn assignment(variable: &str, math: Math) -> Self {
		Self::Assignment {
			variable: variable.into(),
			math: Some(math),
		}
	}

	/// Create a rate rule for the quantity with identifier `variable`.
	pub fn rate(variable: &str, math: Math) -> Self {
		Self::Rate {
			variable: variable.into(),
			math: Some(math),
		}
	}

	/// The expression of the rule, if set.
	pub fn math(&self) -> Option<&Math> {
		match self {
			Self::Algebraic { math } | Self::Assignment { math, .. } | Self::Rate { math, .. } => {
				math.as_ref()
			}
		}
	}

	/// Identifier of the quantity targeted by an assignment or rate rule, or
	/// `None` for an algebraic rule.
	pub fn variable(&self) -> Option<Ustr> {
		match self {
			Self::Algebraic { .. } => None,
			Self::Assignment { variable, .. } | Self::Rate { variable, .. } => Some(*variable),
		}
	}

	/// Whether the rule is an algebraic rule.
	pub fn is_algebraic(&self) -> bool {
		matches!(self, Self::Algebraic { .. })
	}
}
