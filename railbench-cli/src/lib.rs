//! Command-line front ends of railbench

pub mod cli;
pub mod commands;
