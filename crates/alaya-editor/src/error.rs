//! Errors surfaced by buffer I/O.
//!
//! Everything else the editor can refuse (bad commands, out-of-range line
//! numbers, unsaved-changes guards) is reported as a prompt and never
//! leaves the controller as an error value.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, EditorError>;
