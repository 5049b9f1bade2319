//! Core sequencing primitive for Tally.
//!
//! This crate holds the [`Deferred`] sequencer with no IO and no async. The engine
//! schedules its triggers; everything else builds on the types exported here.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use tally_core::{Deferred, Outcome};
//!
//! let log = Rc::new(RefCell::new(Vec::new()));
//! let deferred = Deferred::new();
//! let (a, b, done) = (Rc::clone(&log), Rc::clone(&log), Rc::clone(&log));
//! deferred
//!     .chain(move || a.borrow_mut().push("a"))
//!     .chain(move || b.borrow_mut().push("b"))
//!     .on_failure_then(|| unreachable!("nothing rejects"))
//!     .on_complete_then(move || done.borrow_mut().push("done"));
//!
//! let trigger = deferred.resolve();
//! assert_eq!(trigger.fire(), Ok(Outcome::Completed { ran: 2 }));
//! assert_eq!(*log.borrow(), ["a", "b", "done"]);
//! ```

mod deferred;

pub use deferred::{Deferred, Finishable, Outcome, ResolveError, Trigger};
