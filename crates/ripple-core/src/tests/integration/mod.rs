#![cfg(test)]

pub mod config_tests;
pub mod input_tests;
pub mod global_tests;
