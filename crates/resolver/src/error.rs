use morph_shape::InvalidTypeShape;
use thiserror::Error;

/// Errors raised while registering, finalizing or resolving rules.
///
/// A missing rule is not an error: [`crate::Resolver::resolve`] returns `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
	/// A second non-overridable rule was registered for an identical pair
	/// under [`crate::DuplicatePolicy::Reject`].
	#[error("duplicate rule for {pair}: `{incoming}` conflicts with existing `{existing}`")]
	DuplicateRule {
		pair: String,
		existing: String,
		incoming: String,
	},
	/// The finalize sort found a cycle among the rules' specificity relations.
	#[error("cyclic rule ordering: {} (unplaced: {})", .cycle.join(" -> "), .rules.join(", "))]
	CyclicOrdering {
		/// Every rule that could not be placed.
		rules: Vec<String>,
		/// One concrete cycle among them, first rule repeated at the end.
		cycle: Vec<String>,
	},
	/// Two unrelated rules both match a request under [`crate::TiePolicy::Reject`].
	#[error("ambiguous resolution for {request}: `{first}` and `{second}` both match")]
	AmbiguousResolution {
		request: String,
		first: String,
		second: String,
	},
	/// Midpoint subdivision ran out of floating-point precision.
	#[error("no free slot left to order a rule for {pair}")]
	SlotSpaceExhausted { pair: String },
	#[error(transparent)]
	Shape(#[from] InvalidTypeShape),
}
