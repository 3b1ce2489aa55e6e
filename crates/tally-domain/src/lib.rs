//! tally-domain
//!
//! Pure budgeting value types (Timestamp, BudgetWindow, Budget, Expense, Event).
//! No I/O, no storage, no history. Only data types and calendar arithmetic.

pub mod budget;
pub mod common;
pub mod event;
pub mod expense;
pub mod percentage;
pub mod period;
pub mod timestamp;
pub mod window;

pub use budget::*;
pub use common::*;
pub use event::*;
pub use expense::*;
pub use percentage::*;
pub use period::*;
pub use timestamp::*;
pub use window::*;
