mod config;
mod flips;
mod sequencer;
