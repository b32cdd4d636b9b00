use proptest::prelude::*;

use super::*;

#[derive(Debug, Clone)]
enum Shape {
	Leaf(&'static str),
	Unary(&'static str, Box<Shape>),
	Map(Box<Shape>, Box<Shape>),
}

fn universe() -> TypeTable {
	let table = TypeTable::new();
	let decls = [
		KindDecl::new("Object"),
		KindDecl::new("Str").extends("Object", []),
		KindDecl::new("Animal").extends("Object", []),
		KindDecl::new("Dog").extends("Animal", []),
		KindDecl::new("Cat").extends("Animal", []),
		KindDecl::new("Pet").extends("Object", []),
		KindDecl::new("Beagle").extends("Dog", []).extends("Pet", []),
		KindDecl::new("Box").params(1).extends("Object", []),
		KindDecl::new("Collection").params(1).extends("Object", []),
		KindDecl::new("List")
			.params(1)
			.extends("Collection", [SuperArg::Param(0)]),
		KindDecl::new("ArrayList")
			.params(1)
			.extends("List", [SuperArg::Param(0)]),
		KindDecl::new("Map").params(2).extends("Object", []),
	];
	for decl in decls {
		table.declare(decl).unwrap();
	}
	let str_ty = table.simple("Str").unwrap();
	table
		.declare(
			KindDecl::new("StringMap")
				.params(1)
				.extends("Map", [SuperArg::Fixed(str_ty), SuperArg::Param(0)]),
		)
		.unwrap();
	table
}

fn arb_shape() -> impl Strategy<Value = Shape> {
	let leaf = prop::sample::select(vec![
		"Object", "Str", "Animal", "Dog", "Cat", "Pet", "Beagle",
	])
	.prop_map(Shape::Leaf);
	leaf.prop_recursive(3, 16, 2, |inner| {
		prop_oneof![
			(
				prop::sample::select(vec!["Box", "Collection", "List", "ArrayList", "StringMap"]),
				inner.clone()
			)
				.prop_map(|(kind, s)| Shape::Unary(kind, Box::new(s))),
			(inner.clone(), inner).prop_map(|(k, v)| Shape::Map(Box::new(k), Box::new(v))),
		]
	})
}

fn build(table: &TypeTable, shape: &Shape) -> Type {
	match shape {
		Shape::Leaf(name) => table.simple(name).unwrap(),
		Shape::Unary(name, inner) => table.named(name, vec![build(table, inner)]).unwrap(),
		Shape::Map(k, v) => table
			.named("Map", vec![build(table, k), build(table, v)])
			.unwrap(),
	}
}

proptest! {
	/// Reflexive and transitive for arbitrary shapes.
	#[test]
	fn prop_assignability_is_preorder(a in arb_shape(), b in arb_shape(), c in arb_shape()) {
		let table = universe();
		let (a, b, c) = (build(&table, &a), build(&table, &b), build(&table, &c));

		prop_assert!(a.is_assignable_from(&a));
		if a.is_assignable_from(&b) && b.is_assignable_from(&c) {
			prop_assert!(a.is_assignable_from(&c), "{a} ⊒ {b} ⊒ {c} but not {a} ⊒ {c}");
		}
	}

	/// Distinct types are never mutually assignable.
	#[test]
	fn prop_assignability_is_antisymmetric(a in arb_shape(), b in arb_shape()) {
		let table = universe();
		let (a, b) = (build(&table, &a), build(&table, &b));
		if a.is_assignable_from(&b) && b.is_assignable_from(&a) {
			prop_assert_eq!(a, b);
		}
	}

	/// Re-interning a shape returns the same node and allocates nothing new.
	#[test]
	fn prop_interning_is_idempotent(a in arb_shape()) {
		let table = universe();
		let first = build(&table, &a);
		let count = table.len();
		let second = build(&table, &a);
		prop_assert_eq!(first.id(), second.id());
		prop_assert_eq!(table.len(), count);
	}
}
