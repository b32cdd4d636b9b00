//! Finalized rule order with per-rule delegation targets.
//!
//! A rule that cannot handle a request itself hands off to its nearest more
//! general rules. The plan records those targets once, after registration has
//! settled, so instances can be wired ancestors first.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::RegistryError;
use crate::order::{Order, Specificity};
use crate::rule::{Rule, RuleId};
use crate::sort::topological_sort;

/// Sorted rule set, most-specific first, with nearest-ancestor links.
pub struct DelegationPlan<R> {
	order: Vec<Arc<Rule<R>>>,
	/// Per position, the positions of the nearest more general rules, ascending.
	delegates: Vec<Vec<usize>>,
	positions: FxHashMap<RuleId, usize>,
}

impl<R> DelegationPlan<R> {
	/// Sorts `rules` by `specificity` and computes delegation targets.
	///
	/// # Errors
	///
	/// [`RegistryError::CyclicOrdering`] when the rules admit no order.
	pub fn build(rules: Vec<Arc<Rule<R>>>, specificity: Specificity) -> Result<Self, RegistryError> {
		Self::build_by(rules, |x, y| specificity.compare(x.pair(), y.pair()))
	}

	pub(crate) fn build_by<F>(rules: Vec<Arc<Rule<R>>>, mut relation: F) -> Result<Self, RegistryError>
	where
		F: FnMut(&Rule<R>, &Rule<R>) -> Order,
	{
		let order = topological_sort(rules, |x, y| relation(x, y)).map_err(|cyclic| {
			let cycle = cyclic
				.cycle
				.iter()
				.map(|&i| cyclic.unplaced[i].name().to_string())
				.collect();
			let rules = cyclic.unplaced.iter().map(|r| r.name().to_string()).collect();
			RegistryError::CyclicOrdering { rules, cycle }
		})?;

		let n = order.len();
		let ancestors: Vec<Vec<usize>> = (0..n)
			.map(|i| {
				(0..n)
					.filter(|&j| j != i && relation(&order[j], &order[i]) == Order::After)
					.collect::<Vec<_>>()
			})
			.collect();
		let delegates = ancestors
			.iter()
			.map(|mine| {
				mine.iter()
					.copied()
					.filter(|&j| {
						!mine
							.iter()
							.any(|&k| k != j && relation(&order[j], &order[k]) == Order::After)
					})
					.collect::<Vec<_>>()
			})
			.collect();
		let positions = order.iter().enumerate().map(|(i, r)| (r.id(), i)).collect();

		Ok(Self {
			order,
			delegates,
			positions,
		})
	}

	/// Rules most-specific first.
	pub fn order(&self) -> &[Arc<Rule<R>>] {
		&self.order
	}

	/// Rules in wiring order: every rule after all of its ancestors.
	pub fn build_order(&self) -> impl DoubleEndedIterator<Item = &Arc<Rule<R>>> + '_ {
		self.order.iter().rev()
	}

	/// Nearest more general rules of `id`, in plan order. Empty for unknown ids.
	pub fn delegates(&self, id: RuleId) -> impl Iterator<Item = &Arc<Rule<R>>> + '_ {
		self.positions
			.get(&id)
			.into_iter()
			.flat_map(move |&i| self.delegates[i].iter().map(move |&j| &self.order[j]))
	}

	pub fn position(&self, id: RuleId) -> Option<usize> {
		self.positions.get(&id).copied()
	}

	pub fn len(&self) -> usize {
		self.order.len()
	}

	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}
}

impl<R> std::fmt::Debug for DelegationPlan<R> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut list = f.debug_list();
		for (rule, delegates) in self.order.iter().zip(&self.delegates) {
			let targets: Vec<&str> = delegates.iter().map(|&j| self.order[j].name()).collect();
			list.entry(&format_args!("{} -> {:?}", rule.name(), targets));
		}
		list.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::ResolverConfig;
	use crate::fixtures::{chains, converter, registry};
	use crate::rule::RuleDef;

	fn names<'a, R: 'a>(rules: impl Iterator<Item = &'a Arc<Rule<R>>>) -> Vec<&'a str> {
		rules.map(|r| r.name()).collect()
	}

	fn id_of<R>(plan: &DelegationPlan<R>, name: &str) -> RuleId {
		plan.order().iter().find(|r| r.name() == name).unwrap().id()
	}

	#[test]
	fn test_chain_has_single_parent_links() {
		let table = chains();
		let registry = registry(ResolverConfig::converters());
		for a in ["A1", "A3", "A2"] {
			registry.add(converter(&table, a, "B1")).unwrap();
		}
		let plan = registry.finalize().unwrap();

		assert_eq!(names(plan.order().iter()), ["A3->B1", "A2->B1", "A1->B1"]);
		assert_eq!(names(plan.build_order()), ["A1->B1", "A2->B1", "A3->B1"]);
		assert_eq!(names(plan.delegates(id_of(&plan, "A3->B1"))), ["A2->B1"]);
		assert_eq!(names(plan.delegates(id_of(&plan, "A2->B1"))), ["A1->B1"]);
		assert!(plan.delegates(id_of(&plan, "A1->B1")).next().is_none());
	}

	#[test]
	fn test_two_nearest_ancestors() {
		// (A2, B2) is covered by both (A1, B2) and (A2, B1); (A1, B1) is behind them.
		let table = chains();
		let registry = registry(ResolverConfig::converters());
		for (a, b) in [("A1", "B1"), ("A1", "B2"), ("A2", "B1"), ("A2", "B2")] {
			registry.add(converter(&table, a, b)).unwrap();
		}
		let plan = registry.finalize().unwrap();
		let mut nearest = names(plan.delegates(id_of(&plan, "A2->B2")));
		nearest.sort_unstable();
		assert_eq!(nearest, ["A1->B2", "A2->B1"]);
		assert_eq!(names(plan.delegates(id_of(&plan, "A1->B2"))), ["A1->B1"]);
		assert_eq!(plan.position(id_of(&plan, "A2->B2")), Some(0));
		assert_eq!(plan.position(id_of(&plan, "A1->B1")), Some(3));
	}

	#[test]
	fn test_unknown_id_has_no_delegates() {
		let plan = DelegationPlan::<()>::build(Vec::new(), Specificity::MAPPERS).unwrap();
		assert!(plan.is_empty());
		assert!(plan.delegates(RuleId(9)).next().is_none());
		assert_eq!(plan.position(RuleId(9)), None);
	}

	#[test]
	fn test_cycle_names_rules() {
		let table = chains();
		let rules: Vec<_> = ["x", "y", "z"]
			.into_iter()
			.enumerate()
			.map(|(i, name)| {
				let def = RuleDef::converter(name, crate::fixtures::pair(&table, "C", "D"), ());
				Arc::new(def.into_rule(RuleId(i as u32)))
			})
			.collect();
		// x before y before x; z unrelated.
		let err = DelegationPlan::build_by(rules, |p, q| match (p.name(), q.name()) {
			("x", "y") | ("y", "x") => Order::Before,
			_ => Order::Undefined,
		})
		.unwrap_err();
		let RegistryError::CyclicOrdering { rules, cycle } = &err else {
			panic!("expected cycle, got {err:?}");
		};
		assert_eq!(rules, &["x", "y"]);
		assert_eq!(cycle.len(), 3);
		assert_eq!(cycle.first(), cycle.last());
		assert!(err.to_string().starts_with("cyclic rule ordering"));
	}
}
