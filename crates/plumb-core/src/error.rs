use std::path::PathBuf;
use thiserror::Error;

/// Why a match request was rejected at the boundary.
///
/// Each variant names exactly one violated precondition so callers can
/// react to it without parsing the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchRequestError {
    #[error("request body is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("'serviceCodes' must be an array of strings, got {0}")]
    ServiceCodesNotArray(String),

    #[error("'serviceCodes' must contain at least one service code")]
    EmptyServiceCodes,

    #[error("'serviceCodes[{index}]' must be a string, got {found}")]
    NonStringServiceCode { index: usize, found: String },

    #[error("'serviceCodes[{0}]' must not be blank")]
    BlankServiceCode(usize),

    #[error("'severity' must be a string, got {0}")]
    SeverityNotString(String),

    #[error("invalid severity '{0}': expected one of routine, urgent, emergency")]
    InvalidSeverity(String),
}

#[derive(Debug, Error)]
pub enum PlumbError {
    #[error("not initialized: run 'plumb init'")]
    NotInitialized,

    #[error("invalid traversal state: node '{node}' has no option '{option}'; restart from the root")]
    InvalidTraversalState { node: String, option: String },

    #[error("decision node not found: {0}")]
    NodeNotFound(String),

    #[error("invalid decision tree: {0}")]
    InvalidTree(String),

    #[error("malformed match request: {0}")]
    MalformedMatchRequest(#[from] MatchRequestError),

    #[error("invalid severity '{0}': expected one of routine, urgent, emergency")]
    InvalidSeverity(String),

    #[error("issue not found: {0}")]
    IssueNotFound(String),

    #[error("provider catalog not found at {}", .0.display())]
    CatalogNotFound(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlumbError>;
