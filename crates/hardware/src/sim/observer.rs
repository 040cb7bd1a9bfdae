//! Per-cycle observation hooks.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::pipeline::{FetchInputs, FetchOutputs};

/// A listener notified after every engine step.
///
/// Observers see what the engine sampled and drove but never touch its state;
/// the checker, scoreboard, statistics, and wave dump are all observers.
pub trait FetchObserver {
    /// Called once per cycle, after the engine has stepped.
    ///
    /// # Arguments
    ///
    /// * `cycle` - Index of the cycle just simulated, starting at 0.
    /// * `inputs` - Signals the engine sampled.
    /// * `outputs` - Signals the engine drove and the decisions it took.
    fn on_cycle(&mut self, cycle: u64, inputs: &FetchInputs, outputs: &FetchOutputs);
}

/// Shared handle, so the caller can inspect an observer the simulator owns.
impl<T: FetchObserver + ?Sized> FetchObserver for Rc<RefCell<T>> {
    fn on_cycle(&mut self, cycle: u64, inputs: &FetchInputs, outputs: &FetchOutputs) {
        self.borrow_mut().on_cycle(cycle, inputs, outputs);
    }
}
