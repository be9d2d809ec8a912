//! Shared-expense settlement engine.
//!
//! An [`Activity`] keeps a roster of participants and a log of expenses. Each
//! accepted expense is split evenly across the participants present at that
//! moment and accumulated into a pairwise debt matrix. On demand the debt is
//! collapsed into net balances and a transfer schedule that settles the group
//! with at most `N - 1` payments.
//!
//! ```rust
//! use engine::{Activity, Amount, Expense, PrimaryKeyAllocator, Title};
//!
//! let allocator = PrimaryKeyAllocator::default();
//! let mut activity = Activity::new(&allocator, Title::parse("Dinner").unwrap(), &[1, 2, 3]);
//! activity
//!     .add_expense([Expense::new(1, Amount::new(30.0).unwrap())])
//!     .unwrap();
//!
//! let schedule = activity.settlement();
//! assert_eq!(schedule.len(), 2);
//! assert!(schedule.iter().all(|transfer| transfer.to == 1 && transfer.amount == 10.0));
//! ```

pub use activity::{Activity, ActivityState};
pub use amount::Amount;
pub use book::ActivityBook;
pub use error::EngineError;
pub use expense::Expense;
pub use matrix::SquareMatrix;
pub use primary_key::PrimaryKeyAllocator;
pub use settlement::Transfer;
pub use snapshot::{ActivityRecord, BookRecord, ExpenseRecord};
pub use title::Title;

mod activity;
mod amount;
mod book;
mod error;
mod expense;
mod matrix;
mod primary_key;
mod settlement;
mod snapshot;
mod title;

/// Opaque identifier of a participant (a person in the external directory).
pub type ParticipantId = u32;

/// Primary key of an [`Activity`].
pub type ActivityId = u32;

type ResultEngine<T> = Result<T, EngineError>;
