//! End-to-end solve pipeline.
//!
//! - [`Instance`] — input document → graph, node matrices, demands, fleet
//! - [`solve_document`] / [`solve_instance`] — run every configured strategy
//!   (optionally in parallel) and keep the cheapest plan
//! - [`Selection`] — outcome plus per-strategy costs

mod instance;
mod selector;

pub use instance::Instance;
pub use selector::{
    run_strategy, select_cheapest, solve_document, solve_document_with, solve_instance, Outcome,
    Selection, StrategyRun,
};
