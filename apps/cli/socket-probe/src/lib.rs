// Library exports for testing
// The binary (main.rs) imports these as well

pub mod cli;
pub mod env;
pub mod error;
pub mod logger;
pub mod probe;
