pub mod app;
pub mod cli;
pub mod config;
pub mod grading;
pub mod llm;
pub mod utils;

#[cfg(test)]
pub mod test_utils;
