pub mod canvas;
pub mod channel;
pub mod config;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod filters;
pub mod geometry;
pub mod launcher;
pub mod partition;
pub mod point;
pub mod renderer;
pub mod worker;
