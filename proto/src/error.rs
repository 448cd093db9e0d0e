#[derive(Debug)]
pub enum DecodeError {
    NotStringValue,
    InvalidUuid { value: String, source: uuid::Error },
    Other(anyhow::Error),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::NotStringValue => write!(f, "Not a string value"),
            DecodeError::InvalidUuid { value, source } => write!(f, "Invalid UUID '{}': {}", value, source),
            DecodeError::Other(e) => write!(f, "Other: {}", e),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::InvalidUuid { source, .. } => Some(source),
            _ => None,
        }
    }
}
