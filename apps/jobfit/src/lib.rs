pub mod backend;
pub mod config;
pub mod errors;
pub mod jobs;
pub mod models;
pub mod profile;
pub mod session;
pub mod state;
pub mod storage;

#[cfg(test)]
mod test_support;
