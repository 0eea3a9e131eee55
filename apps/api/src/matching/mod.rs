// Consultant matching: normalize → score → rank → rationale.
// The engine is storage-agnostic; handlers wire it to the Pg repositories.

pub mod criteria;
pub mod engine;
pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod normalizer;
pub mod prompts;
pub mod ranker;
pub mod rationale;
pub mod repository;
pub mod rules;
