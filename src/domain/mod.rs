pub mod categories;
pub mod detection;
pub mod errors;
pub mod model;
