pub mod api;
pub mod collaborators;
pub mod config;
pub mod context;
pub mod session;
pub mod workflow;
