//! Core - scenario graphs and process state.

mod graph;
mod state;

pub use graph::{Scenario, Stage, Step, StepRunner, execute};
pub use state::{
    is_shutdown, register_server, request_shutdown, setup_shutdown_handler, subscribe_shutdown,
};
