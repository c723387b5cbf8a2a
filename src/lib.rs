// Public library interface for Collage-rs
// This allows the debug CLI tool to use the core modules

pub mod config;
pub mod layout;
pub mod render;
pub mod scanner;
pub mod tree;
