pub mod core;
pub mod hostnames;
pub mod permissions;
pub mod matrix;

// User interaction on matrix cells
pub mod actions;

// Display partitioning
pub mod grouping;

pub mod config;
pub mod switchboard;

// Optional components
pub mod cli;
pub mod logging;
