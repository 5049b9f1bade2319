//! Counter flip sequences on both delay services.

use std::rc::Rc;
use std::time::Duration;

use tally_engine::{
    FlipTiming, LocalDelay, MAX_LEVEL, ManualDelay, Outcome, flip_through, flip_to, steps_between,
};
use tokio::task::LocalSet;
use tokio::time;

use crate::common::{Recorder, level_face, ms};

const TIMING: FlipTiming = FlipTiming {
    flip: Duration::from_millis(100),
    gap: Duration::from_millis(20),
};

#[test]
fn level_up_to_max_on_virtual_clock() {
    let delay = ManualDelay::new();
    let face = level_face(7);
    let log = Recorder::default();

    let sequence = flip_through(&delay, &face, steps_between(7, MAX_LEVEL), TIMING);
    sequence
        .on_failure_then(log.hook("failed"))
        .on_complete_then(log.hook("done"));

    delay.run_until_idle();

    assert_eq!(face.borrow().value(), MAX_LEVEL);
    assert_eq!(log.entries(), ["done"]);
    // Three flips and two gaps.
    assert_eq!(delay.now(), ms(340));
}

#[test]
fn level_past_max_stops_at_max() {
    let delay = ManualDelay::new();
    let face = level_face(9);
    let log = Recorder::default();

    let sequence = flip_through(&delay, &face, steps_between(9, 12), TIMING);
    sequence
        .on_failure_then(log.hook("failed"))
        .on_complete_then(log.hook("done"));

    delay.run_until_idle();

    assert_eq!(face.borrow().value(), MAX_LEVEL);
    assert_eq!(log.entries(), ["failed"]);
    assert!(matches!(sequence.outcome(), Some(Outcome::Rejected { .. })));
}

#[test]
fn single_flip_can_be_rejected_by_caller_continuation() {
    let delay = ManualDelay::new();
    let face = level_face(3);
    let log = Recorder::default();

    let flip = flip_to(&delay, &face, 2, ms(50));
    let after = log.clone();
    flip.chain_with_control(move |d| {
        after.push("landed");
        d.reject();
    })
    .chain(log.hook("unreachable"))
    .on_failure_then(log.hook("failed"))
    .on_complete_then(log.hook("done"));

    delay.advance(ms(50));

    assert_eq!(face.borrow().value(), 2);
    assert_eq!(log.entries(), ["landed", "failed"]);
}

#[tokio::test(start_paused = true)]
async fn level_down_on_tokio_local_set() {
    let set = Rc::new(LocalSet::new());
    let delay = LocalDelay::new(Rc::clone(&set));
    let face = level_face(5);
    let log = Recorder::default();

    let sequence = flip_through(&delay, &face, steps_between(5, 2), TIMING);
    sequence.on_complete_then(log.hook("done"));

    set.run_until(time::sleep(ms(150))).await;
    assert_eq!(face.borrow().value(), 4);
    assert!(!sequence.is_settled());

    set.run_until(time::sleep(ms(500))).await;
    assert_eq!(face.borrow().value(), 2);
    assert_eq!(log.entries(), ["done"]);
    assert_eq!(sequence.outcome(), Some(Outcome::Completed { ran: 0 }));
}
