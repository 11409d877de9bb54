pub mod clock_service;
pub mod employee_service;
pub mod entry_service;
pub mod pay_period_service;
pub mod rules;

pub use clock_service::*;
pub use employee_service::*;
pub use entry_service::*;
pub use pay_period_service::*;
