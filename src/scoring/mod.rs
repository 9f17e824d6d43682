pub mod client;
pub mod normalize;

pub use client::{HttpScoringClient, ScoringClient, SubmitFailure};
pub use normalize::{normalize, BreakdownEntry, CanonicalResult, RawScoringResponse};
