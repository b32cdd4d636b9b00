use thiserror::Error;

/// A malformed declaration or an out-of-range descriptor access.
///
/// Always surfaced to the caller immediately; none of these are retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidTypeShape {
	/// A kind name was referenced before being declared.
	#[error("unknown kind `{0}`")]
	UnknownKind(String),
	/// A kind name was declared twice in one table.
	#[error("kind `{0}` is already declared")]
	DuplicateKind(String),
	/// A kind was instantiated (or extended) with the wrong number of parameters.
	#[error("`{kind}` expects {expected} type parameter(s), found {found}")]
	ArityMismatch {
		kind: String,
		expected: usize,
		found: usize,
	},
	/// A parameter index is outside the declared arity.
	#[error("parameter index {index} is out of range for `{ty}` (arity {arity})")]
	ParameterOutOfRange {
		ty: String,
		index: usize,
		arity: usize,
	},
	/// A descriptor interned by a different table was passed in.
	#[error("`{0}` belongs to another type table")]
	ForeignType(String),
}
