//! Type descriptors for rule resolution.
//!
//! This crate provides the leaf vocabulary used by the resolver:
//! - [`Kind`]: a raw type identity with a fixed arity and declared supertypes
//! - [`Type`]: an interned, immutable descriptor (`List<String>`)
//! - [`TypeTable`]: the append-only intern table that owns kinds and types
//! - [`TypePair`]: the `(a, b)` key a rule is registered for
//! - [`InvalidTypeShape`]: malformed declarations and out-of-range access
//!
//! # Invariants
//!
//! - Identical shapes intern to one [`TypeId`], so equality is an integer compare.
//!   - Enforced in: [`TypeTable::instantiate`].
//!   - Tested by: `tests::test_interning_is_structural`.
//! - The kind graph is acyclic: supertypes must be declared before their subkinds.
//!   - Enforced in: [`TypeTable::declare`].
//!   - Tested by: `tests::test_unknown_supertype_is_rejected`.
//! - Assignability is reflexive and transitive.
//!   - Enforced in: [`Type::is_assignable_from`].
//!   - Tested by: `proptests::prop_assignability_is_preorder`.

mod error;
mod kind;
mod pair;
mod table;
mod ty;

pub use error::InvalidTypeShape;
pub use kind::{Kind, KindDecl, KindId, SuperArg, SuperDecl};
pub use pair::TypePair;
pub use table::TypeTable;
pub use ty::{Type, TypeId};

#[cfg(test)]
mod proptests;
