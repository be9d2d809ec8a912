//! A single payment recorded inside an activity.

use crate::{Amount, ParticipantId};

/// An expense paid by one participant on behalf of everyone in the activity.
///
/// Expenses are immutable once recorded, except for the soft-delete flag.
#[derive(Clone, Debug)]
pub struct Expense {
    payer: ParticipantId,
    amount: Amount,
    deleted: bool,
    /// Number of participants sharing the expense, fixed when the activity
    /// accepts it. Zero until then.
    pub(crate) headcount: usize,
}

impl Expense {
    pub fn new(payer: ParticipantId, amount: Amount) -> Self {
        Self {
            payer,
            amount,
            deleted: false,
            headcount: 0,
        }
    }

    pub fn payer(&self) -> ParticipantId {
        self.payer
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// How many participants the expense was split across, `0` if the expense
    /// was never accepted by an activity.
    pub fn headcount(&self) -> usize {
        self.headcount
    }

    pub(crate) fn delete(&mut self) {
        self.deleted = true;
    }
}

/// Payer and amount only: the soft-delete flag and headcount are derived state.
impl PartialEq for Expense {
    fn eq(&self, other: &Self) -> bool {
        self.payer == other.payer && self.amount == other.amount
    }
}
