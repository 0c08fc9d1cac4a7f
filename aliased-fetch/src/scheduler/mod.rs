//! Scheduler layer for the pipeline
//!
//! Runs one worker per account under a concurrency cap, stops starting new
//! workers once the run is cancelled, and hands results back in seed order.

pub mod fanout;

pub use fanout::FanOut;
