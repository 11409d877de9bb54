pub mod employee_repository;
pub mod entry_repository;
pub mod pay_period_repository;

pub use employee_repository::*;
pub use entry_repository::*;
pub use pay_period_repository::*;
