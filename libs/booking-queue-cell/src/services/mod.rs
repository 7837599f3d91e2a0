pub mod queue;
pub mod tracker;

pub use queue::*;
pub use tracker::*;
