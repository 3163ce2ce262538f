pub(crate) mod assessments;
pub(crate) mod questions;
pub(crate) mod submissions;
pub(crate) mod users;
