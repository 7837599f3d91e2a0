pub mod appointment;
pub mod clinic;
pub mod error;
pub mod session;

pub use appointment::*;
pub use clinic::*;
pub use session::*;
