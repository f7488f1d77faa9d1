//! Small programs generated at run time into executable pages.

pub mod funcall;
pub mod hello;
pub mod show;

mod error;

pub use error::{Error, Result};
