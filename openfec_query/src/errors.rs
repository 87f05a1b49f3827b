//! Error types for the query layer.

/// Errors raised while resolving columns, models or sort options.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A sort option named a field that cannot be sorted on.
    #[error("Field \"{field}\" cannot be used to sort results")]
    InvalidSortField { field: String },
    /// A raw parameter could not be parsed as the column's declared type.
    #[error("Cannot parse \"{value}\" as {category}")]
    InvalidValue {
        category: &'static str,
        value: String,
    },
    /// No model is registered under the given name.
    #[error("Unknown model \"{0}\"")]
    UnknownModel(String),
    /// The model exists but has no column with the given name.
    #[error("Model \"{model}\" has no column \"{column}\"")]
    UnknownColumn { model: String, column: String },
}

impl Error {
    /// HTTP-equivalent status code. Parameter problems are 422; schema
    /// lookups that fail are programming errors and map to 500.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidSortField { .. } | Self::InvalidValue { .. } => 422,
            Self::UnknownModel(_) | Self::UnknownColumn { .. } => 500,
        }
    }
}
