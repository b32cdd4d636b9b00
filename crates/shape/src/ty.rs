//! Interned type descriptors.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::error::InvalidTypeShape;
use crate::kind::{Kind, KindId};

/// Dense identifier of an interned type within one [`crate::TypeTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(pub u32);

impl TypeId {
	/// Returns the underlying u32 value.
	#[inline]
	pub fn as_u32(self) -> u32 {
		self.0
	}
}

pub(crate) struct TypeNode {
	/// Serial of the owning [`crate::TypeTable`].
	pub(crate) table: u32,
	pub(crate) id: TypeId,
	pub(crate) kind: Arc<Kind>,
	pub(crate) params: Box<[Type]>,
	/// Direct supertypes with parameters already projected, interned eagerly.
	pub(crate) supertypes: Box<[Type]>,
}

/// An immutable, interned type descriptor.
///
/// Cloning is a reference-count bump. Equality and hashing use the interned
/// [`TypeId`], which is sound because a [`crate::TypeTable`] hands out exactly
/// one node per distinct shape. Tables refuse descriptors interned
/// elsewhere.
#[derive(Clone)]
pub struct Type(pub(crate) Arc<TypeNode>);

impl Type {
	#[inline]
	pub fn id(&self) -> TypeId {
		self.0.id
	}

	/// Raw identity of this descriptor, ignoring parameters.
	#[inline]
	pub fn raw_identity(&self) -> KindId {
		self.0.kind.id
	}

	pub fn kind(&self) -> &Arc<Kind> {
		&self.0.kind
	}

	pub fn name(&self) -> &str {
		self.0.kind.name()
	}

	pub fn arity(&self) -> usize {
		self.0.params.len()
	}

	pub fn params(&self) -> &[Type] {
		&self.0.params
	}

	/// Returns the nested parameter at `index`.
	pub fn param(&self, index: usize) -> Result<&Type, InvalidTypeShape> {
		self.0
			.params
			.get(index)
			.ok_or_else(|| InvalidTypeShape::ParameterOutOfRange {
				ty: self.to_string(),
				index,
				arity: self.arity(),
			})
	}

	/// Direct supertypes, parameterized for this instance (`ArrayList<Int>` yields `List<Int>`).
	pub fn supertypes(&self) -> &[Type] {
		&self.0.supertypes
	}

	/// Returns true if a value of `other` can be used where `self` is expected.
	///
	/// `other` must be `self`'s kind or a transitive subkind; after projecting
	/// `other` onto `self`'s kind, every parameter of `self` must be assignable
	/// from the matching parameter (covariant).
	pub fn is_assignable_from(&self, other: &Type) -> bool {
		if self.id() == other.id() {
			return true;
		}
		self.projections_of(other).iter().any(|projected| {
			projected.id() == self.id()
				|| self
					.params()
					.iter()
					.zip(projected.params())
					.all(|(mine, theirs)| mine.is_assignable_from(theirs))
		})
	}

	/// Distinct instances of `self`'s kind reachable from `other` through supertypes.
	///
	/// Each supertype is visited once, so shared ancestors in stacked diamonds
	/// are not walked once per path.
	fn projections_of(&self, other: &Type) -> Vec<Type> {
		let target = self.raw_identity();
		if !other.kind().descends_from(target) {
			return Vec::new();
		}
		let mut found = Vec::new();
		let mut seen = FxHashSet::default();
		let mut pending = vec![other.clone()];
		while let Some(ty) = pending.pop() {
			if !seen.insert(ty.id()) {
				continue;
			}
			if ty.raw_identity() == target {
				found.push(ty);
				continue;
			}
			pending.extend(
				ty.supertypes()
					.iter()
					.filter(|sup| sup.kind().descends_from(target) && !seen.contains(&sup.id()))
					.cloned(),
			);
		}
		found
	}

	/// Returns true if `self` is assignable from `other` and the two differ.
	pub fn is_strict_supertype_of(&self, other: &Type) -> bool {
		self != other && self.is_assignable_from(other)
	}
}

impl PartialEq for Type {
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}

impl Eq for Type {}

impl Hash for Type {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id().hash(state);
	}
}

impl fmt::Display for Type {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.name())?;
		if !self.params().is_empty() {
			write!(f, "<")?;
			for (i, p) in self.params().iter().enumerate() {
				if i > 0 {
					write!(f, ", ")?;
				}
				write!(f, "{}", p)?;
			}
			write!(f, ">")?;
		}
		Ok(())
	}
}

impl fmt::Debug for Type {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Type({}: {})", self.id().0, self)
	}
}
