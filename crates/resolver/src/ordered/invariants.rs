use std::sync::{Arc, Barrier};
use std::thread;

use super::tests::assert_specific_first;
use super::*;
use crate::fixtures::{chains, converter, grid, mapper, pair, registry, shuffle};

const THREADS: usize = 16;

/// Invariant: concurrent adds never publish a general rule ahead of a specific one.
pub(crate) fn inv_concurrent_specificity_order() {
	let table = Arc::new(chains());
	let registry = registry(ResolverConfig::converters());
	let barrier = Arc::new(Barrier::new(THREADS));

	let handles: Vec<_> = (0..THREADS)
		.map(|t| {
			let table = Arc::clone(&table);
			let registry = Arc::clone(&registry);
			let barrier = Arc::clone(&barrier);
			thread::spawn(move || {
				let mut pairs = grid();
				shuffle(&mut pairs, t as u64 + 1);
				barrier.wait();
				for (a, b) in &pairs {
					match registry.add(converter(&table, a, b)) {
						Ok(_) | Err(RegistryError::DuplicateRule { .. }) => {}
						Err(err) => panic!("unexpected error: {err}"),
					}
				}
			})
		})
		.collect();
	for handle in handles {
		handle.join().unwrap();
	}

	assert_eq!(registry.len(), grid().len());
	assert_eq!(registry.iter().count(), grid().len());
	assert_specific_first(&registry);
}

#[cfg_attr(test, test)]
pub(crate) fn test_concurrent_specificity_order() {
	for _ in 0..8 {
		inv_concurrent_specificity_order();
	}
}

/// Invariant: many racing adds for one pair leave exactly one rule.
pub(crate) fn inv_concurrent_duplicates_collapse(policy: DuplicatePolicy) {
	let table = Arc::new(chains());
	let registry = registry(ResolverConfig::mappers().with_duplicates(policy));
	let barrier = Arc::new(Barrier::new(THREADS));

	let handles: Vec<_> = (0..THREADS)
		.map(|t| {
			let table = Arc::clone(&table);
			let registry = Arc::clone(&registry);
			let barrier = Arc::clone(&barrier);
			thread::spawn(move || {
				barrier.wait();
				// Half the threads register the swapped pair, which is the same pair for mappers.
				let def = if t % 2 == 0 {
					mapper(&table, "A2", "B2")
				} else {
					mapper(&table, "B2", "A2")
				};
				registry.add(def)
			})
		})
		.collect();
	let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

	let inserted = outcomes
		.iter()
		.filter(|o| matches!(o, Ok(AddOutcome::Inserted(_))))
		.count();
	assert_eq!(inserted, 1);
	match policy {
		DuplicatePolicy::Reject => {
			let rejected = outcomes
				.iter()
				.filter(|o| matches!(o, Err(RegistryError::DuplicateRule { .. })))
				.count();
			assert_eq!(rejected, THREADS - 1);
		}
		DuplicatePolicy::Replace => {
			assert!(outcomes.iter().all(|o| o.is_ok()));
		}
	}
	assert_eq!(registry.len(), 1);
	assert_eq!(registry.iter().count(), 1);
	assert!(registry.find(&pair(&table, "A2", "B2")).is_some());
}

#[cfg_attr(test, test)]
pub(crate) fn test_concurrent_duplicates_collapse() {
	for _ in 0..8 {
		inv_concurrent_duplicates_collapse(DuplicatePolicy::Reject);
		inv_concurrent_duplicates_collapse(DuplicatePolicy::Replace);
	}
}

/// Invariant: replacing a rule swaps it in place.
pub(crate) fn inv_replacement_keeps_position() {
	let table = chains();
	let registry = registry(ResolverConfig::converters().with_duplicates(DuplicatePolicy::Replace));
	for (a, b) in grid() {
		registry.add(converter(&table, &a, &b)).unwrap();
	}
	let before: Vec<_> = registry.iter().map(|r| r.pair().clone()).collect();

	let handles: Vec<_> = before
		.iter()
		.cloned()
		.map(|p| {
			let registry = Arc::clone(&registry);
			thread::spawn(move || {
				registry
					.add(RuleDef::converter(format!("{p}!"), p, "replacement"))
					.unwrap()
			})
		})
		.collect();
	for handle in handles {
		assert!(matches!(handle.join().unwrap(), AddOutcome::Replaced { .. }));
	}

	let after: Vec<_> = registry.iter().map(|r| r.pair().clone()).collect();
	assert_eq!(before, after);
	assert!(registry.iter().all(|r| *r.payload() == "replacement"));
}

#[cfg_attr(test, test)]
pub(crate) fn test_replacement_keeps_position() {
	inv_replacement_keeps_position()
}
