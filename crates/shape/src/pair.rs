use std::fmt;

use crate::ty::Type;

/// The ordered `(a, b)` key a rule is registered for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypePair {
	a: Type,
	b: Type,
}

impl TypePair {
	pub fn new(a: Type, b: Type) -> Self {
		Self { a, b }
	}

	pub fn a(&self) -> &Type {
		&self.a
	}

	pub fn b(&self) -> &Type {
		&self.b
	}

	/// The same pair read in the opposite direction.
	pub fn reversed(&self) -> Self {
		Self {
			a: self.b.clone(),
			b: self.a.clone(),
		}
	}

	/// Component-wise assignability: `self.a ⊒ other.a` and `self.b ⊒ other.b`.
	pub fn is_assignable_from(&self, other: &TypePair) -> bool {
		self.a.is_assignable_from(&other.a) && self.b.is_assignable_from(&other.b)
	}
}

impl fmt::Display for TypePair {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({}, {})", self.a, self.b)
	}
}
