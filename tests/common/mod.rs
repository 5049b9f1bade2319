//! Shared test utilities and fixtures

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tally_engine::CounterFace;

/// Ordered log of named events, shared between callbacks.
#[derive(Clone, Default)]
pub struct Recorder(Rc<RefCell<Vec<String>>>);

impl Recorder {
    /// A callback that appends `name` when it runs.
    pub fn hook(&self, name: impl Into<String>) -> impl FnOnce() + 'static {
        let log = Rc::clone(&self.0);
        let name = name.into();
        move || log.borrow_mut().push(name)
    }

    pub fn push(&self, name: impl Into<String>) {
        self.0.borrow_mut().push(name.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

pub fn level_face(value: i64) -> Rc<RefCell<CounterFace>> {
    Rc::new(RefCell::new(
        CounterFace::level(value).expect("test level is in range"),
    ))
}
