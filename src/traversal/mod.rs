pub mod engine;
pub mod state;

#[cfg(test)]
mod tests;

pub use engine::{DEFAULT_MAX_STEPS, Engine, EngineSettings};
pub use state::{
    ContentMode, Failure, OracleInput, Outcome, PageContent, Phase, TraceEntry, TraversalState,
};
