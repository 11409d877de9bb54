// Re-export all models organized by domain
pub mod employee;
pub mod entry;
pub mod errors;
pub mod pay_period;
pub mod request;
pub mod week;

pub use employee::*;
pub use entry::*;
pub use errors::*;
pub use pay_period::*;
pub use request::*;
pub use week::*;
