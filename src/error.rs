use crate::diffable::Shape;

/// Errors that abort a comparison pass. No partial patch is ever returned.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("shape does not match at `{path}`: modified is {modified}, current is {current}")]
    ShapeMismatch {
        path: String,
        modified: Shape,
        current: Shape,
    },
    #[error("only text is supported as mapping key but found {key} at `{path}`")]
    UnsupportedKeyType { path: String, key: Shape },
    #[error("ignoring sequence order failed at `{path}`: duplicated key `{key}`")]
    DuplicateKey { path: String, key: String },
    /// `name` is the label the value's `Node::Unsupported` carries.
    #[error("unsupported value `{name}` at `{path}`")]
    UnsupportedShape { path: String, name: &'static str },
    #[error("maximum depth of {limit} exceeded at `{path}`")]
    DepthExceeded { path: String, limit: usize },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results returned by the walker and its extension points.
pub type PatchResult<T> = Result<T, PatchError>;

impl PatchError {
    /// The rendered pointer where a structural error occurred.
    pub fn path(&self) -> Option<&str> {
        match self {
            PatchError::ShapeMismatch { path, .. }
            | PatchError::UnsupportedKeyType { path, .. }
            | PatchError::DuplicateKey { path, .. }
            | PatchError::UnsupportedShape { path, .. }
            | PatchError::DepthExceeded { path, .. } => Some(path),
            PatchError::Json(_) => None,
        }
    }
}
