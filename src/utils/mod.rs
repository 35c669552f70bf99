//! The `utils` module holds the pieces shared by every other module of
//! `popbus`: the error type and logging setup.

pub mod error;
pub mod logging;
