//! Raw type identities and their declared supertypes.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::ty::Type;

/// Dense identifier of a kind within one [`crate::TypeTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KindId(pub u32);

impl KindId {
	/// Returns the underlying u32 value.
	#[inline]
	pub fn as_u32(self) -> u32 {
		self.0
	}
}

/// How one parameter of a supertype is built from the subkind's parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuperArg {
	/// Forward the subkind's parameter at this index (`ArrayList<E> : List<E>`).
	Param(usize),
	/// A concrete type fixed by the declaration (`StringMap<V> : Map<String, V>`).
	Fixed(Type),
}

/// A resolved supertype edge of a [`Kind`].
#[derive(Debug, Clone)]
pub struct SuperDecl {
	pub(crate) kind: Arc<Kind>,
	pub(crate) args: Box<[SuperArg]>,
}

impl SuperDecl {
	/// The super kind.
	pub fn kind(&self) -> &Arc<Kind> {
		&self.kind
	}

	/// Parameter mapping onto the super kind, one entry per super parameter.
	pub fn args(&self) -> &[SuperArg] {
		&self.args
	}
}

/// A raw type identity: a name, a fixed arity and its direct supertypes.
///
/// Kinds are immutable once declared. Each one carries the transitive set of
/// its ancestors so that assignability checks between unrelated kinds fail
/// without walking the hierarchy.
#[derive(Debug)]
pub struct Kind {
	pub(crate) id: KindId,
	pub(crate) name: Box<str>,
	pub(crate) arity: usize,
	pub(crate) supertypes: Box<[SuperDecl]>,
	pub(crate) ancestors: FxHashSet<KindId>,
}

impl Kind {
	pub fn id(&self) -> KindId {
		self.id
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Number of type parameters every instance of this kind carries.
	pub fn arity(&self) -> usize {
		self.arity
	}

	/// Direct supertypes in declaration order.
	pub fn supertypes(&self) -> &[SuperDecl] {
		&self.supertypes
	}

	/// Returns true if `ancestor` is this kind or one of its transitive supertypes.
	#[inline]
	pub fn descends_from(&self, ancestor: KindId) -> bool {
		self.id == ancestor || self.ancestors.contains(&ancestor)
	}
}

impl PartialEq for Kind {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for Kind {}

impl fmt::Display for Kind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.name)
	}
}

/// Authoring form of a kind, consumed by [`crate::TypeTable::declare`].
///
/// Supertypes are referenced by name and must already be declared in the
/// same table.
///
/// # Example
///
/// ```ignore
/// table.declare(KindDecl::new("Collection").params(1))?;
/// table.declare(KindDecl::new("List").params(1).extends("Collection", [SuperArg::Param(0)]))?;
/// ```
#[derive(Debug, Clone)]
pub struct KindDecl {
	pub(crate) name: Box<str>,
	pub(crate) arity: usize,
	pub(crate) supertypes: Vec<(Box<str>, Vec<SuperArg>)>,
}

impl KindDecl {
	/// Starts a declaration for a nullary kind with no supertypes.
	pub fn new(name: impl Into<Box<str>>) -> Self {
		Self {
			name: name.into(),
			arity: 0,
			supertypes: Vec::new(),
		}
	}

	/// Sets the number of type parameters.
	pub fn params(mut self, arity: usize) -> Self {
		self.arity = arity;
		self
	}

	/// Adds a direct supertype.
	pub fn extends(
		mut self,
		name: impl Into<Box<str>>,
		args: impl IntoIterator<Item = SuperArg>,
	) -> Self {
		self.supertypes.push((name.into(), args.into_iter().collect()));
		self
	}
}
