//! The append-only intern table for kinds and types.
//!
//! # Role
//!
//! Owns every [`Kind`] and [`Type`] handed out to the rest of the system. Both
//! maps only grow; nothing is mutated after insertion, so handles can be shared
//! freely across threads.
//!
//! # Concurrency
//!
//! Lookups and inserts go through sharded [`DashMap`]s. Building a new node
//! interns its supertypes first, outside any shard lock, then publishes with
//! insert-if-absent; when two threads race on the same shape one node wins and
//! both callers receive it.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rustc_hash::{FxBuildHasher, FxHashSet};

use crate::error::InvalidTypeShape;
use crate::kind::{Kind, KindDecl, KindId, SuperArg, SuperDecl};
use crate::ty::{Type, TypeId, TypeNode};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TypeKey {
	kind: KindId,
	params: Box<[TypeId]>,
}

/// Source of [`TypeTable`] serials.
static NEXT_TABLE: AtomicU32 = AtomicU32::new(0);

/// Intern table for one independent type universe.
pub struct TypeTable {
	serial: u32,
	kinds: DashMap<Box<str>, Arc<Kind>, FxBuildHasher>,
	types: DashMap<TypeKey, Type, FxBuildHasher>,
	next_kind: AtomicU32,
	next_type: AtomicU32,
}

impl Default for TypeTable {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for TypeTable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TypeTable")
			.field("kinds", &self.kinds.len())
			.field("types", &self.types.len())
			.finish()
	}
}

impl TypeTable {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self {
			serial: NEXT_TABLE.fetch_add(1, Ordering::Relaxed),
			kinds: DashMap::with_hasher(FxBuildHasher),
			types: DashMap::with_hasher(FxBuildHasher),
			next_kind: AtomicU32::new(0),
			next_type: AtomicU32::new(0),
		}
	}

	/// Declares a new kind.
	///
	/// Every supertype must already be declared and receive exactly its arity
	/// in arguments; forwarded parameter indices must be below the new kind's
	/// arity and fixed arguments must come from this table.
	pub fn declare(&self, decl: KindDecl) -> Result<Arc<Kind>, InvalidTypeShape> {
		if self.kinds.contains_key(&*decl.name) {
			return Err(InvalidTypeShape::DuplicateKind(decl.name.into_string()));
		}

		let mut supertypes = Vec::with_capacity(decl.supertypes.len());
		let mut ancestors = FxHashSet::default();
		for (super_name, args) in decl.supertypes {
			let kind = self
				.kind(&super_name)
				.ok_or_else(|| InvalidTypeShape::UnknownKind(super_name.into_string()))?;
			if args.len() != kind.arity() {
				return Err(InvalidTypeShape::ArityMismatch {
					kind: kind.name().to_string(),
					expected: kind.arity(),
					found: args.len(),
				});
			}
			for arg in &args {
				match arg {
					SuperArg::Param(index) if *index >= decl.arity => {
						return Err(InvalidTypeShape::ParameterOutOfRange {
							ty: decl.name.to_string(),
							index: *index,
							arity: decl.arity,
						});
					}
					SuperArg::Fixed(ty) => self.check_owned(ty)?,
					SuperArg::Param(_) => {}
				}
			}
			ancestors.insert(kind.id());
			ancestors.extend(kind.ancestors.iter().copied());
			supertypes.push(SuperDecl {
				kind,
				args: args.into_boxed_slice(),
			});
		}

		let kind = Arc::new(Kind {
			id: KindId(self.next_kind.fetch_add(1, Ordering::Relaxed)),
			name: decl.name.clone(),
			arity: decl.arity,
			supertypes: supertypes.into_boxed_slice(),
			ancestors,
		});

		match self.kinds.entry(decl.name) {
			Entry::Occupied(occupied) => Err(InvalidTypeShape::DuplicateKind(
				occupied.key().to_string(),
			)),
			Entry::Vacant(vacant) => {
				vacant.insert(Arc::clone(&kind));
				tracing::debug!(
					kind = kind.name(),
					arity = kind.arity(),
					supertypes = kind.supertypes().len(),
					"kind declared"
				);
				Ok(kind)
			}
		}
	}

	/// Looks up a declared kind by name.
	pub fn kind(&self, name: &str) -> Option<Arc<Kind>> {
		self.kinds.get(name).map(|k| Arc::clone(k.value()))
	}

	/// Interns `kind<params...>`.
	pub fn instantiate(&self, kind: &Arc<Kind>, params: Vec<Type>) -> Result<Type, InvalidTypeShape> {
		if params.len() != kind.arity() {
			return Err(InvalidTypeShape::ArityMismatch {
				kind: kind.name().to_string(),
				expected: kind.arity(),
				found: params.len(),
			});
		}

		for param in &params {
			self.check_owned(param)?;
		}

		let key = TypeKey {
			kind: kind.id(),
			params: params.iter().map(Type::id).collect(),
		};
		if let Some(existing) = self.types.get(&key) {
			return Ok(existing.value().clone());
		}

		let supertypes = kind
			.supertypes()
			.iter()
			.map(|sup| {
				let args = sup
					.args()
					.iter()
					.map(|arg| match arg {
						SuperArg::Param(index) => params[*index].clone(),
						SuperArg::Fixed(ty) => ty.clone(),
					})
					.collect();
				self.instantiate(sup.kind(), args)
			})
			.collect::<Result<Vec<_>, _>>()?;

		let id = TypeId(self.next_type.fetch_add(1, Ordering::Relaxed));
		let node = Type(Arc::new(TypeNode {
			table: self.serial,
			id,
			kind: Arc::clone(kind),
			params: params.into_boxed_slice(),
			supertypes: supertypes.into_boxed_slice(),
		}));

		let interned = self.types.entry(key).or_insert(node).value().clone();
		if interned.id() == id {
			tracing::trace!(ty = %interned, id = id.0, "type interned");
		}
		Ok(interned)
	}

	fn check_owned(&self, ty: &Type) -> Result<(), InvalidTypeShape> {
		if ty.0.table == self.serial {
			Ok(())
		} else {
			Err(InvalidTypeShape::ForeignType(ty.to_string()))
		}
	}

	/// Interns `name<params...>` by kind name.
	pub fn named(&self, name: &str, params: Vec<Type>) -> Result<Type, InvalidTypeShape> {
		let kind = self
			.kind(name)
			.ok_or_else(|| InvalidTypeShape::UnknownKind(name.to_string()))?;
		self.instantiate(&kind, params)
	}

	/// Interns a nullary kind by name.
	pub fn simple(&self, name: &str) -> Result<Type, InvalidTypeShape> {
		self.named(name, Vec::new())
	}

	/// Number of interned types.
	pub fn len(&self) -> usize {
		self.types.len()
	}

	/// Returns true if no type has been interned yet.
	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}

	/// Number of declared kinds.
	pub fn kind_count(&self) -> usize {
		self.kinds.len()
	}
}
