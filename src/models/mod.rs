// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{IdentityId, Match, Participant, PreferenceId, ReceiverRanking, RunStats, ScoreMatrix, Side};
pub use requests::{RunDatasetRequest, RunMatchingRequest};
pub use responses::{ErrorResponse, HealthResponse, RunMatchingResponse};
