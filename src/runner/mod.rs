//! # Runner Module
//!
//! Modulo che separa le responsabilità del batch in sottomoduli:
//! - `batch_runner`: Orchestratore del batch (sequenziale o con pool limitato)
//! - `task_runner`: Esecuzione del tool su un singolo file con streaming dell'output
//! - `path_resolver`: Calcolo del path dell'artifact prodotto dal tool

pub mod batch_runner;
pub mod path_resolver;
pub mod task_runner;

pub use batch_runner::{BatchRunner, Canceller, RunnerOptions};
pub use path_resolver::PathResolver;
pub use task_runner::TaskRunner;
