use std::path::PathBuf;

use gridiron_parser::NodeId;
use thiserror::Error;

use crate::config::ConfigError;

pub type GridResult<T> = Result<T, GridError>;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Invalid control id: ids must be non-empty")]
    InvalidIdentifier,

    #[error("Duplicate control id '{id}': ids must be unique within a page")]
    DuplicateIdentifier { id: String },

    #[error("Control '{id}' is already bound to a template node")]
    AlreadyBound { id: String },

    #[error("Template node {node:?} is already bound to control '{id}'")]
    NodeAlreadyBound { node: NodeId, id: String },

    #[error("No such template node {0:?}")]
    UnknownNode(NodeId),

    #[error("No such control: the handle was removed or belongs to another page")]
    UnknownControl,

    #[error("Unable to open front-end page '{}': {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Front-end page '{}' is empty", .path.display())]
    EmptyTemplate { path: PathBuf },

    #[error("Front-end page '{}' is not valid UTF-8", .path.display())]
    Encoding {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
