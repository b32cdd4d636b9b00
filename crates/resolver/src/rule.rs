//! Registered transformation rules.

use std::fmt;

use morph_shape::TypePair;

/// Identifier assigned by [`crate::OrderedRegistry::add`], monotonic per registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(pub u32);

impl RuleId {
	/// Returns the underlying u32 value.
	#[inline]
	pub fn as_u32(self) -> u32 {
		self.0
	}
}

/// Which family a rule was authored for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
	/// Copies state between two types; usable in both directions.
	Mapper,
	/// Produces a destination value from a source value.
	Converter,
	/// User supplied mapping logic.
	Custom,
}

impl RuleKind {
	/// Capabilities a rule of this kind starts with.
	pub const fn default_caps(self) -> Capabilities {
		match self {
			Self::Mapper | Self::Custom => Capabilities::BIDIRECTIONAL,
			Self::Converter => Capabilities::empty(),
		}
	}
}

bitflags::bitflags! {
	/// Behavioral flags of a rule.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct Capabilities: u8 {
		/// The rule also serves the swapped pair `(b, a)`.
		const BIDIRECTIONAL = 1 << 0;
		/// An auto-generated default; any later rule for the same pair replaces it.
		const OVERRIDABLE = 1 << 1;
	}
}

/// Authoring form of a rule, before the registry assigns its id.
#[derive(Debug, Clone)]
pub struct RuleDef<R> {
	pub(crate) name: Box<str>,
	pub(crate) pair: TypePair,
	pub(crate) kind: RuleKind,
	pub(crate) caps: Capabilities,
	pub(crate) payload: R,
}

impl<R> RuleDef<R> {
	pub fn new(kind: RuleKind, name: impl Into<Box<str>>, pair: TypePair, payload: R) -> Self {
		Self {
			name: name.into(),
			pair,
			kind,
			caps: kind.default_caps(),
			payload,
		}
	}

	pub fn mapper(name: impl Into<Box<str>>, pair: TypePair, payload: R) -> Self {
		Self::new(RuleKind::Mapper, name, pair, payload)
	}

	pub fn converter(name: impl Into<Box<str>>, pair: TypePair, payload: R) -> Self {
		Self::new(RuleKind::Converter, name, pair, payload)
	}

	pub fn custom(name: impl Into<Box<str>>, pair: TypePair, payload: R) -> Self {
		Self::new(RuleKind::Custom, name, pair, payload)
	}

	/// Marks the rule as a default that later registrations may replace.
	pub fn overridable(mut self) -> Self {
		self.caps |= Capabilities::OVERRIDABLE;
		self
	}

	/// Restricts the rule to the `(a, b)` direction.
	pub fn one_way(mut self) -> Self {
		self.caps.remove(Capabilities::BIDIRECTIONAL);
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn pair(&self) -> &TypePair {
		&self.pair
	}

	pub(crate) fn into_rule(self, id: RuleId) -> Rule<R> {
		Rule {
			id,
			name: self.name,
			pair: self.pair,
			kind: self.kind,
			caps: self.caps,
			payload: self.payload,
		}
	}
}

/// A rule as stored in the registry. Immutable once published.
pub struct Rule<R> {
	id: RuleId,
	name: Box<str>,
	pair: TypePair,
	kind: RuleKind,
	caps: Capabilities,
	payload: R,
}

impl<R> Rule<R> {
	pub fn id(&self) -> RuleId {
		self.id
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn pair(&self) -> &TypePair {
		&self.pair
	}

	pub fn kind(&self) -> RuleKind {
		self.kind
	}

	pub fn caps(&self) -> Capabilities {
		self.caps
	}

	pub fn payload(&self) -> &R {
		&self.payload
	}

	#[inline]
	pub fn is_bidirectional(&self) -> bool {
		self.caps.contains(Capabilities::BIDIRECTIONAL)
	}

	#[inline]
	pub fn is_overridable(&self) -> bool {
		self.caps.contains(Capabilities::OVERRIDABLE)
	}
}

impl<R> fmt::Debug for Rule<R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Rule")
			.field("id", &self.id)
			.field("name", &self.name)
			.field("pair", &format_args!("{}", self.pair))
			.field("kind", &self.kind)
			.field("caps", &self.caps)
			.finish_non_exhaustive()
	}
}

impl<R> fmt::Display for Rule<R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.name, self.pair)
	}
}
