use thiserror::Error;
use validator::ValidationErrors;

use hashimom_data::repository::RepositoryError;

/// Errors returned by the domain services
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found error
    #[error("Not found: {0}")]
    NotFound(String),

    /// Repository error
    #[error("Repository error: {0}")]
    Repository(String),

    /// Stored data that cannot be interpreted
    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

/// Map repository errors to service errors
pub fn map_repo_error(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::NotFound(msg) => ServiceError::NotFound(msg),
        RepositoryError::Validation(msg) => ServiceError::Validation(msg),
        _ => ServiceError::Repository(err.to_string()),
    }
}

/// Flatten validator errors into "field: message; field: message"
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect();
    // field_errors is a HashMap
    fields.sort();
    fields.join("; ")
}
