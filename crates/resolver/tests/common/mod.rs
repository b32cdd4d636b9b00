//! Shared fixtures for resolver integration tests.

#![allow(dead_code)]

use morph_resolver::{Order, OrderedRegistry, TypePair};
use morph_shape::{KindDecl, Type, TypeTable};

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt::try_init();
}

/// Declares `{prefix}1 <- {prefix}2 <- .. <- {prefix}{depth}` for every prefix.
pub fn chains(prefixes: &[&str], depth: usize) -> TypeTable {
	let table = TypeTable::new();
	for prefix in prefixes {
		table.declare(KindDecl::new(format!("{prefix}1"))).unwrap();
		for level in 2..=depth {
			let decl = KindDecl::new(format!("{prefix}{level}"))
				.extends(format!("{prefix}{}", level - 1), []);
			table.declare(decl).unwrap();
		}
	}
	table
}

pub fn ty(table: &TypeTable, name: &str) -> Type {
	table.simple(name).unwrap()
}

pub fn pair(table: &TypeTable, a: &str, b: &str) -> TypePair {
	TypePair::new(ty(table, a), ty(table, b))
}

/// Deterministic Fisher-Yates shuffle driven by xorshift.
pub fn shuffle<T>(items: &mut [T], seed: u64) {
	let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
	for i in (1..items.len()).rev() {
		state ^= state << 13;
		state ^= state >> 7;
		state ^= state << 17;
		let j = (state % (i as u64 + 1)) as usize;
		items.swap(i, j);
	}
}

/// Every earlier/later pair in iteration order that puts the more general rule first.
pub fn ordering_violations<R: Send + Sync + 'static>(registry: &OrderedRegistry<R>) -> Vec<String> {
	let rules = registry.snapshot();
	let mut violations = Vec::new();
	for (i, earlier) in rules.iter().enumerate() {
		for later in &rules[i + 1..] {
			if registry.specificity().compare(earlier.pair(), later.pair()) == Order::After {
				violations.push(format!("{earlier} before {later}"));
			}
		}
	}
	violations
}
