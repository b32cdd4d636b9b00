//! Generic topological sort driven by a partial [`Order`] relation.

use std::collections::BTreeSet;
use std::fmt;

use crate::order::Order;

/// Items left over when the relation contains a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclicOrdering<T> {
	/// Every item that could not be placed, in input order.
	pub unplaced: Vec<T>,
	/// One cycle among `unplaced`, as indices into it, e.g. `[0, 2, 1, 0]`.
	pub cycle: Vec<usize>,
}

impl<T> fmt::Display for CyclicOrdering<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let path: Vec<String> = self.cycle.iter().map(usize::to_string).collect();
		write!(
			f,
			"{} items could not be ordered (cycle: {})",
			self.unplaced.len(),
			path.join(" -> ")
		)
	}
}

impl<T: fmt::Debug> std::error::Error for CyclicOrdering<T> {}

/// Orders `items` so that `x` precedes `y` whenever `relation(x, y) == Before`.
///
/// Unrelated items keep their input order. With [`crate::Specificity::compare`]
/// as the relation the result runs most-specific first.
///
/// # Errors
///
/// Returns [`CyclicOrdering`] carrying every unplaced item when the relation
/// is cyclic. The output is never silently truncated.
pub fn topological_sort<T, F>(items: Vec<T>, mut relation: F) -> Result<Vec<T>, CyclicOrdering<T>>
where
	F: FnMut(&T, &T) -> Order,
{
	let n = items.len();
	let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
	let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
	for x in 0..n {
		for y in 0..n {
			if x != y && relation(&items[x], &items[y]) == Order::Before {
				successors[x].push(y);
				predecessors[y].push(x);
			}
		}
	}

	let mut in_degree: Vec<usize> = predecessors.iter().map(Vec::len).collect();
	// Ordered by input index so unrelated items come out stable.
	let mut ready: BTreeSet<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
	let mut order = Vec::with_capacity(n);

	while let Some(x) = ready.pop_first() {
		order.push(x);
		for &y in &successors[x] {
			in_degree[y] -= 1;
			if in_degree[y] == 0 {
				ready.insert(y);
			}
		}
	}

	let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
	if order.len() == n {
		return Ok(order.into_iter().filter_map(|i| slots[i].take()).collect());
	}

	let remaining: Vec<usize> = (0..n).filter(|&i| in_degree[i] > 0).collect();
	let cycle = extract_cycle(&predecessors, &in_degree, &remaining);
	let unplaced = remaining.iter().filter_map(|&i| slots[i].take()).collect();
	Err(CyclicOrdering { unplaced, cycle })
}

/// Walks unplaced predecessors from the first unplaced node until a node
/// repeats, then reports that loop in edge direction as indices into `remaining`.
fn extract_cycle(predecessors: &[Vec<usize>], in_degree: &[usize], remaining: &[usize]) -> Vec<usize> {
	let Some(&start) = remaining.first() else {
		return Vec::new();
	};
	let local = |node: usize| remaining.binary_search(&node).unwrap_or_default();

	let mut path = Vec::new();
	let mut visited = vec![false; in_degree.len()];
	let mut current = start;
	loop {
		if visited[current] {
			let begin = path.iter().position(|&p| p == current).unwrap_or_default();
			let mut cycle = Vec::with_capacity(path.len() - begin + 1);
			cycle.push(local(current));
			cycle.extend(path[begin..].iter().rev().map(|&p| local(p)));
			return cycle;
		}
		visited[current] = true;
		path.push(current);

		// Every unplaced node keeps at least one unplaced predecessor.
		match predecessors[current].iter().find(|&&p| in_degree[p] > 0) {
			Some(&p) => current = p,
			None => return path.into_iter().map(local).collect(),
		}
	}
}
