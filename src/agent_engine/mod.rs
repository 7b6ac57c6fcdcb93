pub mod engine;
pub mod heuristic;
pub mod normalize;
pub mod prompt;
pub mod state;
