pub mod release_validator;

pub use release_validator::{ReleaseValidationResult, ReleaseValidator};
