//! Concurrent registry that keeps rules in specificity order.
//!
//! # Role
//!
//! Stores rules in a lock-free skip list keyed by fractional `SlotKey`s.
//! Every add picks a key between the last rule that is not more general and
//! the first one that is, so a plain ascending walk is most-specific first.
//!
//! # Insertion protocol
//!
//! 1. **Scan:** find the first slot more general than the incoming pair.
//! 2. **Claim:** insert-if-absent at the midpoint key, subdividing on collision.
//! 3. **Validate:** the claimed slot is reserved and invisible to readers. It is
//!    checked against every other slot; a misplaced or duplicate neighbour
//!    removes the reservation and restarts the add.
//! 4. **Publish:** a release store makes the slot visible.
//!
//! Of two conflicting adds, the one reserved later always validates after the
//! other's slot exists, so at most one of them publishes.
//!
//! # Invariants
//!
//! - No published slot precedes a published slot it is more general than.
//!   - Enforced in: [`OrderedRegistry::add`] (validate step).
//!   - Tested by: `invariants::test_concurrent_specificity_order`.
//!   - Failure symptom: a rule for a base type hides one for a subtype.
//! - At most one published slot per pair.
//!   - Enforced in: [`OrderedRegistry::add`] (scan and validate steps).
//!   - Tested by: `invariants::test_concurrent_duplicates_collapse`.
//!   - Failure symptom: the registry length exceeds the number of distinct pairs.
//! - Replacement keeps the slot position.
//!   - Enforced in: `OrderedRegistry::settle_duplicate` (CAS on the slot's rule).
//!   - Tested by: `invariants::test_replacement_keeps_position`.
//!   - Failure symptom: a replaced rule jumps ahead of more specific rules.

mod slot;

#[cfg(test)]
mod invariants;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{self, AtomicU32, AtomicUsize, Ordering as AtomicOrdering};

use crossbeam_skiplist::{SkipMap, map};
use morph_shape::TypePair;

use self::slot::{Slot, SlotKey};
use crate::config::{DuplicatePolicy, ResolverConfig, TiePolicy};
use crate::error::RegistryError;
use crate::order::{Order, Specificity};
use crate::plan::DelegationPlan;
use crate::rule::{Rule, RuleDef, RuleId};

/// Result of a successful [`OrderedRegistry::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
	/// The rule took a new slot.
	Inserted(RuleId),
	/// The rule replaced an existing rule for the same pair, in place.
	Replaced { previous: RuleId, current: RuleId },
	/// An overridable rule arrived after a concrete one and was dropped.
	KeptExisting(RuleId),
}

impl AddOutcome {
	/// The rule now registered for the pair.
	pub fn id(&self) -> RuleId {
		match *self {
			Self::Inserted(id) | Self::KeptExisting(id) => id,
			Self::Replaced { current, .. } => current,
		}
	}
}

/// One pass of the insertion protocol.
enum Attempt {
	Done(AddOutcome),
	Retry,
}

/// Rule registry for one family, ordered most-specific first.
pub struct OrderedRegistry<R> {
	label: &'static str,
	slots: SkipMap<SlotKey, Arc<Slot<R>>>,
	specificity: Specificity,
	duplicates: DuplicatePolicy,
	ties: TiePolicy,
	next_id: AtomicU32,
	published: AtomicUsize,
}

impl<R> fmt::Debug for OrderedRegistry<R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("OrderedRegistry")
			.field("label", &self.label)
			.field("specificity", &self.specificity)
			.field("duplicates", &self.duplicates)
			.field("ties", &self.ties)
			.field("len", &self.published.load(AtomicOrdering::Relaxed))
			.finish()
	}
}

impl<R> OrderedRegistry<R>
where
	R: Send + Sync + 'static,
{
	/// Creates a bidirectional mapper registry with default policies.
	pub fn new(label: &'static str) -> Self {
		Self::with_config(label, &ResolverConfig::default())
	}

	pub fn with_config(label: &'static str, config: &ResolverConfig) -> Self {
		Self {
			label,
			slots: SkipMap::new(),
			specificity: config.specificity(),
			duplicates: config.duplicates,
			ties: config.ties,
			next_id: AtomicU32::new(0),
			published: AtomicUsize::new(0),
		}
	}

	pub fn label(&self) -> &'static str {
		self.label
	}

	pub fn specificity(&self) -> Specificity {
		self.specificity
	}

	/// Tie policy a [`crate::Resolver`] over this registry starts with.
	pub fn ties(&self) -> TiePolicy {
		self.ties
	}

	/// Registers a rule at its specificity position.
	///
	/// Safe to call from any number of threads. A registration for a pair that
	/// already has a rule follows [`DuplicatePolicy`], except that overridable
	/// rules always yield to concrete ones.
	///
	/// # Errors
	///
	/// - [`RegistryError::DuplicateRule`] under [`DuplicatePolicy::Reject`].
	/// - [`RegistryError::SlotSpaceExhausted`] when no key fits between neighbours.
	pub fn add(&self, def: RuleDef<R>) -> Result<AddOutcome, RegistryError> {
		let id = RuleId(self.next_id.fetch_add(1, AtomicOrdering::Relaxed));
		let rule = Arc::new(def.into_rule(id));
		let mut retries = 0u32;
		loop {
			match self.try_add(&rule)? {
				Attempt::Done(outcome) => return Ok(outcome),
				Attempt::Retry => {
					retries += 1;
					tracing::trace!(
						registry = self.label,
						rule = %rule,
						retries,
						"slot conflict, rescanning"
					);
					std::thread::yield_now();
				}
			}
		}
	}

	fn try_add(&self, rule: &Arc<Rule<R>>) -> Result<Attempt, RegistryError> {
		let pair = rule.pair();

		// 1. Scan for the first more general slot.
		let mut lo = None;
		let mut hi = None;
		for entry in self.slots.iter() {
			let slot = entry.value();
			match self.specificity.compare(slot.rule().load().pair(), pair) {
				Order::Equal => return self.on_equal(slot, rule),
				Order::After => {
					hi = Some(*entry.key());
					break;
				}
				Order::Before | Order::Undefined => lo = Some(*entry.key()),
			}
		}

		// 2. Claim a key, subdividing around concurrent occupants.
		let mine = Arc::new(Slot::reserved(Arc::clone(rule)));
		let claimed = loop {
			let key = SlotKey::between(lo, hi).ok_or_else(|| RegistryError::SlotSpaceExhausted {
				pair: pair.to_string(),
			})?;
			let entry = self.slots.get_or_insert(key, Arc::clone(&mine));
			if Arc::ptr_eq(entry.value(), &mine) {
				break entry;
			}
			let occupant = entry.value();
			tracing::trace!(registry = self.label, rule = %rule, key = key.value(), "slot collision");
			match self.specificity.compare(occupant.rule().load().pair(), pair) {
				Order::Equal => return self.on_equal(occupant, rule),
				Order::After => hi = Some(key),
				Order::Before | Order::Undefined => lo = Some(key),
			}
		};
		let key = *claimed.key();
		// Two racing claimers must not both miss each other's slot.
		atomic::fence(AtomicOrdering::SeqCst);

		// 3. Validate against everything else, reserved slots included.
		for other in self.slots.iter() {
			if Arc::ptr_eq(other.value(), &mine) {
				continue;
			}
			let misplaced = match self.specificity.compare(other.value().rule().load().pair(), pair) {
				Order::Equal => true,
				Order::After => *other.key() < key,
				Order::Before => *other.key() > key,
				Order::Undefined => false,
			};
			if misplaced {
				claimed.remove();
				return Ok(Attempt::Retry);
			}
		}

		// 4. Publish.
		mine.publish();
		self.published.fetch_add(1, AtomicOrdering::Relaxed);
		tracing::debug!(
			registry = self.label,
			rule = %rule.name(),
			pair = %pair,
			key = key.value(),
			"rule inserted"
		);
		Ok(Attempt::Done(AddOutcome::Inserted(rule.id())))
	}

	/// An existing slot holds the same pair.
	fn on_equal(&self, slot: &Slot<R>, incoming: &Arc<Rule<R>>) -> Result<Attempt, RegistryError> {
		if !slot.is_published() {
			// Still validating; it either publishes or withdraws.
			return Ok(Attempt::Retry);
		}
		self.settle_duplicate(slot, incoming).map(Attempt::Done)
	}

	fn settle_duplicate(&self, slot: &Slot<R>, incoming: &Arc<Rule<R>>) -> Result<AddOutcome, RegistryError> {
		loop {
			let existing = slot.rule().load_full();
			if !existing.is_overridable() {
				if incoming.is_overridable() {
					tracing::debug!(
						registry = self.label,
						existing = %existing,
						incoming = %incoming,
						"overridable rule dropped"
					);
					return Ok(AddOutcome::KeptExisting(existing.id()));
				}
				if self.duplicates == DuplicatePolicy::Reject {
					return Err(RegistryError::DuplicateRule {
						pair: existing.pair().to_string(),
						existing: existing.name().to_string(),
						incoming: incoming.name().to_string(),
					});
				}
			}

			let prev = slot.rule().compare_and_swap(&existing, Arc::clone(incoming));
			if Arc::ptr_eq(&prev, &existing) {
				if existing.is_overridable() {
					tracing::debug!(
						registry = self.label,
						existing = %existing,
						incoming = %incoming,
						"overridable rule replaced"
					);
				} else {
					tracing::warn!(
						registry = self.label,
						existing = %existing,
						incoming = %incoming,
						"duplicate rule replaced"
					);
				}
				return Ok(AddOutcome::Replaced {
					previous: existing.id(),
					current: incoming.id(),
				});
			}
			// Lost a race with another replacement, re-evaluate.
		}
	}

	/// Published rules, most-specific first.
	///
	/// Lazy and restartable; rules added during the walk may or may not appear.
	pub fn iter(&self) -> Rules<'_, R> {
		Rules {
			inner: self.slots.iter(),
		}
	}

	/// Collects [`Self::iter`].
	pub fn snapshot(&self) -> Vec<Arc<Rule<R>>> {
		self.iter().collect()
	}

	/// The rule registered for exactly this pair (or its swap, for mappers).
	pub fn find(&self, pair: &TypePair) -> Option<Arc<Rule<R>>> {
		self.iter()
			.find(|rule| self.specificity.compare(rule.pair(), pair) == Order::Equal)
	}

	/// Number of published rules.
	pub fn len(&self) -> usize {
		self.published.load(AtomicOrdering::Acquire)
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Sorts the current rule set and wires each rule to its nearest ancestors.
	///
	/// # Errors
	///
	/// [`RegistryError::CyclicOrdering`] if the rules cannot be ordered.
	pub fn finalize(&self) -> Result<DelegationPlan<R>, RegistryError> {
		let plan = DelegationPlan::build(self.snapshot(), self.specificity)?;
		tracing::debug!(registry = self.label, rules = plan.len(), "registry finalized");
		Ok(plan)
	}
}

/// Iterator returned by [`OrderedRegistry::iter`].
pub struct Rules<'a, R> {
	inner: map::Iter<'a, SlotKey, Arc<Slot<R>>>,
}

impl<R> Iterator for Rules<'_, R>
where
	R: Send + Sync + 'static,
{
	type Item = Arc<Rule<R>>;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			let entry = self.inner.next()?;
			let slot = entry.value();
			if slot.is_published() {
				return Some(slot.rule().load_full());
			}
		}
	}
}
