use thiserror::Error;

/// Errors the aggregation engine surfaces to the caller.
///
/// Almost everything in the engine degrades in place (zero or `n/a` values)
/// rather than failing; the recommendation selector is the one operation
/// with no sensible degraded answer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("cannot pick a best performer from an empty result set")]
    EmptyInput,
}
