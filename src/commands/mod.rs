pub mod common;
pub mod plot;
pub mod gap;
pub mod sample;
pub mod range;
