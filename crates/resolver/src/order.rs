//! The specificity relation between type pairs.
//!
//! # Role
//!
//! A pure, partial comparison used by the registry for insertion, by the
//! sorter for finalize plans and by resolution for tie detection. The same
//! function serves every rule family; only the `bidirectional` flag differs.
//!
//! # Invariants
//!
//! - `compare(p, q) == After` iff `compare(q, p) == Before`.
//!   - Tested by: `tests::prop_compare_is_antisymmetric`.
//! - `Undefined` is a legal outcome and is never conflated with `Equal`.
//!   - Tested by: `tests::test_compare_cases`.

use morph_shape::TypePair;

/// Outcome of comparing two type pairs, read as "the first pair goes ... the second".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
	/// The first pair is strictly more specific and is tried before the second.
	Before,
	/// The first pair is strictly more general and is tried after the second.
	After,
	/// Same pair (or the same pair swapped, for bidirectional families).
	Equal,
	/// Unrelated pairs; no order is implied.
	Undefined,
}

impl Order {
	/// The outcome with the operands exchanged.
	pub const fn reverse(self) -> Self {
		match self {
			Self::Before => Self::After,
			Self::After => Self::Before,
			other => other,
		}
	}
}

/// The specificity relation for one rule family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Specificity {
	bidirectional: bool,
}

impl Specificity {
	/// Mapper family: a rule for `(a, b)` also serves `(b, a)`.
	pub const MAPPERS: Self = Self::new(true);
	/// Converter family: source to destination only.
	pub const CONVERTERS: Self = Self::new(false);

	pub const fn new(bidirectional: bool) -> Self {
		Self { bidirectional }
	}

	pub const fn is_bidirectional(&self) -> bool {
		self.bidirectional
	}

	/// Compares `p1` against `p2`.
	pub fn compare(&self, p1: &TypePair, p2: &TypePair) -> Order {
		compare(p1, p2, self.bidirectional)
	}
}

/// Compares `p1 = (a1, b1)` against `p2 = (a2, b2)`.
///
/// `After` when `a1 ⊒ a2` and `b1 ⊒ b2` (or `a1 ⊒ b2` and `b1 ⊒ a2` for a
/// bidirectional family), `Before` for the mirrored condition, `Equal` for
/// identical pairs.
pub fn compare(p1: &TypePair, p2: &TypePair, bidirectional: bool) -> Order {
	let (a1, b1) = (p1.a(), p1.b());
	let (a2, b2) = (p2.a(), p2.b());

	if (a1 == a2 && b1 == b2) || (bidirectional && a1 == b2 && b1 == a2) {
		return Order::Equal;
	}
	if covers(p1, p2, bidirectional) {
		return Order::After;
	}
	if covers(p2, p1, bidirectional) {
		return Order::Before;
	}
	Order::Undefined
}

/// `general ⊒ specific`, directly or through the swapped orientation.
fn covers(general: &TypePair, specific: &TypePair, bidirectional: bool) -> bool {
	general.is_assignable_from(specific)
		|| (bidirectional
			&& general.a().is_assignable_from(specific.b())
			&& general.b().is_assignable_from(specific.a()))
}
