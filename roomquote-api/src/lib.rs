pub mod error;
pub mod responses;
pub mod service;

pub use error::{ApiError, ErrorBody};
pub use responses::{MutationOutcome, ReplaceTarget};
pub use service::EstimateService;
