mod app_error;
mod validation;

pub use app_error::{AppError, AppResult};
pub use validation::ValidationError;
