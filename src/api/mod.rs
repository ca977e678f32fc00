pub mod data;
pub mod middleware;
pub mod render;
pub mod services;
pub mod state;
