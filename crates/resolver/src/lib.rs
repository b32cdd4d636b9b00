//! Specificity-ordered rule registry and type-pair resolution.
//!
//! # Purpose
//!
//! Given a registry of transformation rules keyed by [`TypePair`], find the
//! single most specific rule for a concrete `(a, b)` request. The registry
//! grows during setup and lazily at runtime, from any number of threads.
//!
//! # Mental Model
//!
//! 1. **Ordering:** [`Specificity::compare`] relates two pairs as
//!    [`Order::Before`] (more specific), [`Order::After`] (more general),
//!    [`Order::Equal`] or [`Order::Undefined`].
//! 2. **Registration:** [`OrderedRegistry::add`] places each rule at a
//!    fractional key so that iteration is always most-specific first.
//! 3. **Resolution:** [`Resolver::resolve`] walks the registry once per
//!    concrete pair and remembers the answer.
//! 4. **Finalize:** [`OrderedRegistry::finalize`] sorts the rule set with
//!    [`topological_sort`] and wires each rule to its nearest ancestors
//!    ([`DelegationPlan`]).
//!
//! # Invariants
//!
//! - Iteration never yields a more general rule before a more specific one.
//!   - Enforced in: [`OrderedRegistry::add`] (reserve, validate, publish).
//!   - Tested by: `ordered::invariants::test_concurrent_specificity_order`.
//!   - Failure symptom: a base-type rule shadows a sub-type rule.
//! - One rule per pair.
//!   - Enforced in: [`OrderedRegistry::add`] via [`DuplicatePolicy`].
//!   - Tested by: `ordered::invariants::test_concurrent_duplicates_collapse`.
//!   - Failure symptom: ambiguous resolution depending on scan order.
//! - A cached resolution is stable for the lifetime of the cache.
//!   - Enforced in: [`Resolver::resolve`] (insert-if-absent).
//!   - Tested by: `resolve::tests::test_concurrent_resolution_is_deterministic`.
//!   - Failure symptom: the same request maps to different rules across threads.
//! - Sorting never truncates.
//!   - Enforced in: [`topological_sort`].
//!   - Tested by: `sort::tests::test_cycle_names_unplaced_items`.
//!   - Failure symptom: rules silently missing from the finalize plan.

mod config;
mod error;
#[cfg(test)]
mod fixtures;
mod order;
mod ordered;
mod plan;
mod resolve;
mod rule;
mod sort;

pub use config::{ConfigError, DuplicatePolicy, ResolverConfig, TiePolicy};
pub use error::RegistryError;
pub use morph_shape::{Type, TypeId, TypePair};
pub use order::{Order, Specificity, compare};
pub use ordered::{AddOutcome, OrderedRegistry, Rules};
pub use plan::DelegationPlan;
pub use resolve::{AssignableMatcher, Direction, Resolved, Resolver, RuleMatcher};
pub use rule::{Capabilities, Rule, RuleDef, RuleId, RuleKind};
pub use sort::{CyclicOrdering, topological_sort};
