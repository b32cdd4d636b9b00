//! Shared type tables and rule builders for unit tests.

use std::sync::Arc;

use morph_shape::{KindDecl, Type, TypePair, TypeTable};

use crate::config::ResolverConfig;
use crate::ordered::OrderedRegistry;
use crate::rule::RuleDef;

/// Chains `A1 <- A2 <- .. <- A5` and `B1 <- B2 <- B3`, plus unrelated `C` and `D`.
pub(crate) fn chains() -> TypeTable {
	let table = TypeTable::new();
	table.declare(KindDecl::new("A1")).unwrap();
	for i in 2..=5 {
		table
			.declare(KindDecl::new(format!("A{i}")).extends(format!("A{}", i - 1), []))
			.unwrap();
	}
	table.declare(KindDecl::new("B1")).unwrap();
	for i in 2..=3 {
		table
			.declare(KindDecl::new(format!("B{i}")).extends(format!("B{}", i - 1), []))
			.unwrap();
	}
	table.declare(KindDecl::new("C")).unwrap();
	table.declare(KindDecl::new("D")).unwrap();
	table
}

pub(crate) fn ty(table: &TypeTable, name: &str) -> Type {
	table.simple(name).unwrap()
}

pub(crate) fn pair(table: &TypeTable, a: &str, b: &str) -> TypePair {
	TypePair::new(ty(table, a), ty(table, b))
}

/// A mapper named after its pair, e.g. `A2->B1`.
pub(crate) fn mapper(table: &TypeTable, a: &str, b: &str) -> RuleDef<&'static str> {
	RuleDef::mapper(format!("{a}->{b}"), pair(table, a, b), "mapper")
}

pub(crate) fn converter(table: &TypeTable, a: &str, b: &str) -> RuleDef<&'static str> {
	RuleDef::converter(format!("{a}->{b}"), pair(table, a, b), "converter")
}

/// Every `(Ai, Bj)` combination: 15 pairs.
pub(crate) fn grid() -> Vec<(String, String)> {
	let mut out = Vec::new();
	for i in 1..=5 {
		for j in 1..=3 {
			out.push((format!("A{i}"), format!("B{j}")));
		}
	}
	out
}

pub(crate) fn registry(config: ResolverConfig) -> Arc<OrderedRegistry<&'static str>> {
	Arc::new(OrderedRegistry::with_config("test", &config))
}

/// Deterministic Fisher-Yates shuffle driven by xorshift.
pub(crate) fn shuffle<T>(items: &mut [T], seed: u64) {
	let mut state = seed | 1;
	for i in (1..items.len()).rev() {
		state ^= state << 13;
		state ^= state >> 7;
		state ^= state << 17;
		let j = (state % (i as u64 + 1)) as usize;
		items.swap(i, j);
	}
}
