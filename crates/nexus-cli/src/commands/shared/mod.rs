pub mod hints;
pub mod limit;
pub mod tables;
