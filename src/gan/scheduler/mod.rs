//! Phase scheduling for adversarial training.

mod callback;
mod phase;
mod report;
mod training;


pub use callback::{EventLog, TrainingCallback};
pub use phase::TrainingPhase;
pub use report::{EpochReport, LossSummary, Network, UpdateEvent};
pub use training::TrainingScheduler;
