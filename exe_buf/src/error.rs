use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("can't allocate {pages} page(s) of executable memory")]
    Allocation {
        pages: usize,
        source: io::Error,
    },

    #[error("not enough executable memory allocated: {requested} byte(s) requested, {remaining} left")]
    BufferOverflow {
        requested: usize,
        remaining: usize,
    },

    #[error("{width}-byte patch at offset {offset} is outside the {used} byte(s) written so far")]
    PatchOutOfRange {
        offset: usize,
        width: usize,
        used: usize,
    },

    #[error("executable memory was already released")]
    UseAfterRelease,

    #[error("nothing has been written to the buffer")]
    Empty,

    #[error("can't release executable memory")]
    Release {
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
