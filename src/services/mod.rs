pub mod evaluation;
pub mod recommendation;
pub mod store;
