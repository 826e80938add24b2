pub mod builder;
pub mod handlers;
pub mod model;
pub mod store;
