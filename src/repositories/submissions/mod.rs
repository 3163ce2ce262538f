mod commands;
mod queries;
mod types;

pub(crate) use commands::*;
pub(crate) use queries::*;
pub(crate) use types::*;
