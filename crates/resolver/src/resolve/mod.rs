//! Memoized lookup of the most specific rule for a concrete pair.
//!
//! # Role
//!
//! [`Resolver::resolve`] walks the registry most-specific first and returns
//! the first compatible rule. Found answers are cached per `(TypeId, TypeId)`;
//! a miss is not, so a rule added later is still discovered.
//!
//! # Invariants
//!
//! - Cache fills are insert-if-absent; every caller observes the stored winner.
//!   - Tested by: `tests::test_concurrent_resolution_is_deterministic`.
//! - A cached answer is returned without touching the matcher.
//!   - Tested by: `tests::test_cache_hit_skips_matching`.
//!
//! Cached answers are not invalidated when rules are added later; callers
//! that need fresh answers call [`Resolver::clear_cache`].


use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use morph_shape::{Type, TypeId, TypePair};
use rustc_hash::FxBuildHasher;

use crate::config::TiePolicy;
use crate::error::RegistryError;
use crate::order::Order;
use crate::ordered::OrderedRegistry;
use crate::rule::Rule;

/// Decides whether a rule is compatible with a requested pair.
pub trait RuleMatcher<R>: Send + Sync {
	/// Whether `rule` serves `request` as written (no swapping).
	fn matches(&self, rule: &Rule<R>, request: &TypePair) -> bool;
}

/// Matches when the rule's pair is component-wise assignable from the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssignableMatcher;

impl<R> RuleMatcher<R> for AssignableMatcher {
	#[inline]
	fn matches(&self, rule: &Rule<R>, request: &TypePair) -> bool {
		rule.pair().is_assignable_from(request)
	}
}

/// Orientation in which a rule serves a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
	/// `rule.a ⊒ a` and `rule.b ⊒ b`.
	Forward,
	/// `rule.a ⊒ b` and `rule.b ⊒ a`, through a bidirectional rule.
	Reverse,
}

/// A resolution answer.
pub struct Resolved<R> {
	pub rule: Arc<Rule<R>>,
	pub direction: Direction,
}

impl<R> Clone for Resolved<R> {
	fn clone(&self) -> Self {
		Self {
			rule: Arc::clone(&self.rule),
			direction: self.direction,
		}
	}
}

impl<R> fmt::Debug for Resolved<R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Resolved")
			.field("rule", &self.rule)
			.field("direction", &self.direction)
			.finish()
	}
}

/// Registry front end with a per-pair answer cache.
pub struct Resolver<R, M = AssignableMatcher> {
	registry: Arc<OrderedRegistry<R>>,
	matcher: M,
	ties: TiePolicy,
	cache: DashMap<(TypeId, TypeId), Resolved<R>, FxBuildHasher>,
}

impl<R> Resolver<R>
where
	R: Send + Sync + 'static,
{
	pub fn new(registry: Arc<OrderedRegistry<R>>) -> Self {
		Self::with_matcher(registry, AssignableMatcher)
	}
}

impl<R, M> Resolver<R, M>
where
	R: Send + Sync + 'static,
	M: RuleMatcher<R>,
{
	/// Starts with the registry's configured [`TiePolicy`].
	pub fn with_matcher(registry: Arc<OrderedRegistry<R>>, matcher: M) -> Self {
		Self {
			ties: registry.ties(),
			registry,
			matcher,
			cache: DashMap::with_hasher(FxBuildHasher),
		}
	}

	/// Overrides the tie policy taken from the registry.
	pub fn with_ties(mut self, ties: TiePolicy) -> Self {
		self.ties = ties;
		self
	}

	pub fn registry(&self) -> &Arc<OrderedRegistry<R>> {
		&self.registry
	}

	/// The most specific rule able to serve `(a, b)`, or `None`.
	///
	/// # Errors
	///
	/// [`RegistryError::AmbiguousResolution`] under [`TiePolicy::Reject`] when
	/// an unrelated rule also matches.
	pub fn resolve(&self, a: &Type, b: &Type) -> Result<Option<Resolved<R>>, RegistryError> {
		let key = (a.id(), b.id());
		if let Some(hit) = self.cache.get(&key) {
			return Ok(Some(hit.value().clone()));
		}

		let request = TypePair::new(a.clone(), b.clone());
		let Some(found) = self.scan(&request)? else {
			tracing::trace!(registry = self.registry.label(), request = %request, "no rule found");
			return Ok(None);
		};
		tracing::debug!(
			registry = self.registry.label(),
			request = %request,
			rule = %found.rule,
			direction = ?found.direction,
			"resolved"
		);
		// A racing thread may have stored first; its answer wins.
		Ok(Some(self.cache.entry(key).or_insert(found).value().clone()))
	}

	pub fn resolve_pair(&self, pair: &TypePair) -> Result<Option<Resolved<R>>, RegistryError> {
		self.resolve(pair.a(), pair.b())
	}

	fn scan(&self, request: &TypePair) -> Result<Option<Resolved<R>>, RegistryError> {
		let reversed = self
			.registry
			.specificity()
			.is_bidirectional()
			.then(|| request.reversed());

		let mut rules = self.registry.iter();
		let first = rules.by_ref().find_map(|rule| {
			self.direction_of(&rule, request, reversed.as_ref())
				.map(|direction| Resolved { rule, direction })
		});
		let Some(first) = first else {
			return Ok(None);
		};
		if self.ties == TiePolicy::Reject {
			let specificity = self.registry.specificity();
			for rule in rules {
				if self.direction_of(&rule, request, reversed.as_ref()).is_some()
					&& specificity.compare(first.rule.pair(), rule.pair()) == Order::Undefined
				{
					return Err(RegistryError::AmbiguousResolution {
						request: request.to_string(),
						first: first.rule.name().to_string(),
						second: rule.name().to_string(),
					});
				}
			}
		}
		Ok(Some(first))
	}

	fn direction_of(
		&self,
		rule: &Rule<R>,
		request: &TypePair,
		reversed: Option<&TypePair>,
	) -> Option<Direction> {
		if self.matcher.matches(rule, request) {
			return Some(Direction::Forward);
		}
		match reversed {
			Some(reversed) if rule.is_bidirectional() && self.matcher.matches(rule, reversed) => {
				Some(Direction::Reverse)
			}
			_ => None,
		}
	}

	/// Number of cached answers.
	pub fn cached_len(&self) -> usize {
		self.cache.len()
	}

	/// Drops every cached answer.
	pub fn clear_cache(&mut self) {
		self.cache.clear();
	}
}

impl<R, M> fmt::Debug for Resolver<R, M> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Resolver")
			.field("registry", &self.registry)
			.field("ties", &self.ties)
			.field("cached", &self.cache.len())
			.finish_non_exhaustive()
	}
}
