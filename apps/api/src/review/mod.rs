pub mod handlers;
pub mod ingest;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod presenter;
pub mod prompts;
pub mod stage;
pub mod stages;

#[cfg(test)]
pub mod testing;
