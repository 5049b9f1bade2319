//! Deferred sequencer behaviour through the public API.

use std::cell::Cell;
use std::rc::Rc;

use tally_core::{Deferred, Outcome, ResolveError};
use tally_engine::{Delay, ManualDelay};

use crate::common::{Recorder, ms};

#[test]
fn chain_without_rejection_runs_everything_then_completes() {
    let log = Recorder::default();
    let deferred = Deferred::new();
    deferred
        .chain(log.hook("a"))
        .chain(log.hook("b"))
        .chain(log.hook("c"))
        .on_failure_then(log.hook("fail"))
        .on_complete_then(log.hook("done"));

    deferred.resolve().fire().unwrap();

    assert_eq!(log.entries(), ["a", "b", "c", "done"]);
}

#[test]
fn middle_continuation_rejecting_itself_stops_the_chain() {
    let log = Recorder::default();
    let deferred = Deferred::new();
    let b = log.clone();
    deferred
        .chain(log.hook("a"))
        .chain_with_control(move |d| {
            b.push("b");
            d.reject();
        })
        .chain(log.hook("c"))
        .on_failure_then(log.hook("fail"))
        .on_complete_then(log.hook("done"));

    deferred.resolve().fire().unwrap();

    assert_eq!(log.entries(), ["a", "b", "fail"]);
}

#[test]
fn outside_rejection_while_waiting_on_timer_fails_the_pass() {
    let log = Recorder::default();
    let delay = ManualDelay::new();
    let deferred = Deferred::new();
    deferred
        .chain(log.hook("a"))
        .on_failure_then(log.hook("fail"))
        .on_complete_then(log.hook("done"));
    delay.resolve_after(ms(100), &deferred);

    delay.advance(ms(50));
    deferred.reject();
    delay.advance(ms(50));

    assert_eq!(log.entries(), ["fail"]);
    assert_eq!(deferred.outcome(), Some(Outcome::Rejected { ran: 0 }));
}

#[test]
fn trigger_handed_to_timer_twice_settles_once() {
    let delay = ManualDelay::new();
    let completions = Rc::new(Cell::new(0));
    let deferred = Deferred::new();
    let counter = Rc::clone(&completions);
    deferred.on_complete_then(move || counter.set(counter.get() + 1));

    delay.resolve_after(ms(10), &deferred);
    delay.resolve_after(ms(20), &deferred);
    delay.run_until_idle();

    assert_eq!(completions.get(), 1);
    assert_eq!(
        deferred.resolve().fire(),
        Err(ResolveError::AlreadySettled {
            outcome: Outcome::Completed { ran: 0 }
        })
    );
}

/// Each stage kicks off an animation and arranges for a fresh sequencer to be
/// resolved later, which is how multi-step sequences span several timer turns.
#[test]
fn stages_hop_across_timer_turns_through_new_sequencers() {
    fn stage(delay: &ManualDelay, log: &Recorder, name: &'static str, millis: u64) -> Deferred {
        let deferred = Deferred::new();
        log.push(format!("start {name}"));
        deferred.chain(log.hook(format!("end {name}")));
        delay.resolve_after(ms(millis), &deferred);
        deferred
    }

    let log = Recorder::default();
    let delay = ManualDelay::new();

    let first = stage(&delay, &log, "shrink", 100);
    let (next_delay, next_log) = (delay.clone(), log.clone());
    first.on_complete_then(move || {
        let second = stage(&next_delay, &next_log, "grow", 200);
        second.on_complete_then(next_log.hook("all done"));
    });

    delay.advance(ms(100));
    assert_eq!(log.entries(), ["start shrink", "end shrink", "start grow"]);

    delay.advance(ms(199));
    assert_eq!(log.entries().len(), 3);

    delay.advance(ms(1));
    assert_eq!(
        log.entries(),
        ["start shrink", "end shrink", "start grow", "end grow", "all done"]
    );
}
