//! Config file to flip timing.

use std::fs;

use tally_config::TallyConfig;
use tally_engine::{FlipTiming, ManualDelay, flip_through};

use crate::common::{Recorder, level_face, ms};

#[test]
fn timings_from_config_file_drive_the_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[animation]\nflip_duration_ms = 40\nstep_gap_ms = 10\n").unwrap();

    let config = TallyConfig::load_from(&path).unwrap().unwrap();
    let timing = FlipTiming::from(config.animation.unwrap_or_default());
    assert_eq!(timing.flip, ms(40));
    assert_eq!(timing.gap, ms(10));

    let delay = ManualDelay::new();
    let face = level_face(1);
    let log = Recorder::default();
    flip_through(&delay, &face, [2, 3], timing).on_complete_then(log.hook("done"));

    delay.advance(ms(89));
    assert!(log.entries().is_empty());
    delay.advance(ms(1));
    assert_eq!(face.borrow().value(), 3);
    assert_eq!(log.entries(), ["done"]);
}

#[test]
fn reduced_motion_lands_everything_without_waiting() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[animation]\nreduced_motion = true\n").unwrap();

    let config = TallyConfig::load_from(&path).unwrap().unwrap();
    let timing = FlipTiming::from(config.animation.unwrap_or_default());

    let delay = ManualDelay::new();
    let face = level_face(4);
    let sequence = flip_through(&delay, &face, [3, 2, 1], timing);

    delay.advance(ms(0));

    assert_eq!(face.borrow().value(), 1);
    assert!(sequence.is_settled());
}
