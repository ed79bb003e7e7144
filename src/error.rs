use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of the command-line surface. The conversion engine itself is
/// total and never returns one of these.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a .haml file", .0.display())]
    NotHaml(PathBuf),

    #[error("no .haml files found in {}", .0.display())]
    NoTemplates(PathBuf),

    #[error("no input: pass a file or directory, or use --stdin")]
    MissingInput,

    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
