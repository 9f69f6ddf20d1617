//! Hooks into the training schedule
//!
//! All methods have default no-op implementations, so a callback only
//! implements the events it cares about.

use super::{EpochReport, TrainingPhase, UpdateEvent};
use std::cell::RefCell;
use std::rc::Rc;

pub trait TrainingCallback {
    /// Called once when a phase is entered, before its first update
    fn on_phase_begin(&mut self, _phase: TrainingPhase) {}

    /// Called after every applied optimizer step
    fn on_update(&mut self, _event: &UpdateEvent) {}

    /// Called after each epoch of each phase
    fn on_epoch_end(&mut self, _report: &EpochReport) {}

    /// Callback name for logging
    fn name(&self) -> &'static str {
        "TrainingCallback"
    }
}

/// Records every event it sees, in order
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    pub phases: Vec<TrainingPhase>,
    pub updates: Vec<UpdateEvent>,
    pub epochs: Vec<EpochReport>,
}

impl TrainingCallback for EventLog {
    fn on_phase_begin(&mut self, phase: TrainingPhase) {
        self.phases.push(phase);
    }

    fn on_update(&mut self, event: &UpdateEvent) {
        self.updates.push(*event);
    }

    fn on_epoch_end(&mut self, report: &EpochReport) {
        self.epochs.push(report.clone());
    }

    fn name(&self) -> &'static str {
        "EventLog"
    }
}

/// Lets the caller keep a handle on a callback the scheduler owns
impl<T: TrainingCallback> TrainingCallback for Rc<RefCell<T>> {
    fn on_phase_begin(&mut self, phase: TrainingPhase) {
        self.borrow_mut().on_phase_begin(phase);
    }

    fn on_update(&mut self, event: &UpdateEvent) {
        self.borrow_mut().on_update(event);
    }

    fn on_epoch_end(&mut self, report: &EpochReport) {
        self.borrow_mut().on_epoch_end(report);
    }

    fn name(&self) -> &'static str {
        self.borrow().name()
    }
}
