pub mod app;
pub mod core;
pub mod effect;
pub mod engine;
pub mod gesture;
pub mod platform;
pub mod scenario;
pub mod scheduler;
pub mod store;
