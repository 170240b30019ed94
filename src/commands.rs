pub mod extract;
pub mod query;
pub mod status;
