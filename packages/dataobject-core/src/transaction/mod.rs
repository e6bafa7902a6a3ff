//! Engine transactions scoped to one engine operation.

mod unit_of_work;

pub use unit_of_work::UnitOfWork;
