//! Fractional slot keys and reservable slots.

use std::cmp::Ordering;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering as AtomicOrdering};

use arc_swap::ArcSwap;

use crate::rule::Rule;

/// Gap left before the first and after the last key.
const EDGE_GAP: f64 = 2.0;

/// A position in the registry, totally ordered via [`f64::total_cmp`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct SlotKey(f64);

impl SlotKey {
	pub(crate) fn value(self) -> f64 {
		self.0
	}

	/// A fresh key strictly inside `(lo, hi)`, with open ends treated as unbounded.
	///
	/// Returns `None` once the interval has no representable interior.
	pub(crate) fn between(lo: Option<Self>, hi: Option<Self>) -> Option<Self> {
		let key = match (lo, hi) {
			(None, None) => 0.0,
			(Some(lo), None) => lo.0 + EDGE_GAP,
			(None, Some(hi)) => hi.0 - EDGE_GAP,
			(Some(lo), Some(hi)) => lo.0 + (hi.0 - lo.0) / 2.0,
		};
		let above = lo.is_none_or(|lo| lo.0 < key);
		let below = hi.is_none_or(|hi| key < hi.0);
		(key.is_finite() && above && below).then_some(Self(key))
	}
}

impl PartialEq for SlotKey {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}

impl Eq for SlotKey {}

impl PartialOrd for SlotKey {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for SlotKey {
	fn cmp(&self, other: &Self) -> Ordering {
		self.0.total_cmp(&other.0)
	}
}

const RESERVED: u8 = 0;
const PUBLISHED: u8 = 1;

/// One registry position. Readers skip it until [`Slot::publish`].
pub(crate) struct Slot<R> {
	rule: ArcSwap<Rule<R>>,
	state: AtomicU8,
}

impl<R> Slot<R> {
	pub(crate) fn reserved(rule: Arc<Rule<R>>) -> Self {
		Self {
			rule: ArcSwap::new(rule),
			state: AtomicU8::new(RESERVED),
		}
	}

	pub(crate) fn rule(&self) -> &ArcSwap<Rule<R>> {
		&self.rule
	}

	#[inline]
	pub(crate) fn is_published(&self) -> bool {
		self.state.load(AtomicOrdering::Acquire) == PUBLISHED
	}

	pub(crate) fn publish(&self) {
		self.state.store(PUBLISHED, AtomicOrdering::Release);
	}
}
