//! The `Activity` holds the participant roster and the expense log of a shared
//! event, accumulates who owes whom and settles the group on demand.
//!
//! Participants are opaque integer ids. Their position in the roster is the
//! row/column index used by the debt and transfer matrices, so the roster is
//! append-only.

use std::fmt;

use crate::{
    ActivityId, EngineError, Expense, ParticipantId, PrimaryKeyAllocator, ResultEngine,
    SquareMatrix, Title,
    settlement::{self, Transfer},
};

/// Lifecycle of the cached settlement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActivityState {
    /// No participant and no expense yet.
    #[default]
    Empty,
    /// Has data, the cached transfers are stale.
    Populated,
    /// The cached transfers match the current debt.
    Settled,
}

/// A shared event with a participant roster and an expense log.
#[derive(Clone, Debug)]
pub struct Activity {
    primary_key: ActivityId,
    title: Title,
    participants: Vec<ParticipantId>,
    expenses: Vec<Expense>,
    /// `debt[(j, i)]`: gross amount `j` owes `i` from expenses paid by `i`.
    debt: SquareMatrix,
    transfers: SquareMatrix,
    /// Net balances of the last settlement run.
    balances: Vec<f64>,
    schedule: Vec<Transfer>,
    state: ActivityState,
}

impl Activity {
    /// Creates an activity whose key is taken from `allocator`.
    pub fn new(
        allocator: &PrimaryKeyAllocator,
        title: Title,
        participants: &[ParticipantId],
    ) -> Self {
        Self::with_primary_key(allocator.next(), title, participants)
    }

    /// Creates an activity with an explicit key, used when rehydrating.
    pub fn with_primary_key(
        primary_key: ActivityId,
        title: Title,
        participants: &[ParticipantId],
    ) -> Self {
        let mut activity = Self {
            primary_key,
            title,
            participants: Vec::new(),
            expenses: Vec::new(),
            debt: SquareMatrix::default(),
            transfers: SquareMatrix::default(),
            balances: Vec::new(),
            schedule: Vec::new(),
            state: ActivityState::Empty,
        };
        activity.invite(participants);
        activity
    }

    pub fn primary_key(&self) -> ActivityId {
        self.primary_key
    }

    pub fn title(&self) -> &Title {
        &self.title
    }

    /// Participant ids in roster order.
    pub fn participants(&self) -> &[ParticipantId] {
        &self.participants
    }

    /// Every recorded expense, soft-deleted ones included. Position `k` in
    /// this slice is the 1-based position `k + 1` of
    /// [`delete_expense`](Self::delete_expense).
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Expenses that were not soft-deleted.
    pub fn active_expenses(&self) -> impl Iterator<Item = &Expense> {
        self.expenses.iter().filter(|expense| !expense.is_deleted())
    }

    pub fn state(&self) -> ActivityState {
        self.state
    }

    pub fn has_participant(&self, id: ParticipantId) -> bool {
        self.participants.contains(&id)
    }

    /// Roster position of `id`.
    pub fn participant_index(&self, id: ParticipantId) -> Option<usize> {
        self.participants.iter().position(|p| *p == id)
    }

    /// Gross pairwise obligations accumulated so far.
    pub fn debt_matrix(&self) -> &SquareMatrix {
        &self.debt
    }

    /// Net balances computed by the last settlement run, zero before the
    /// first one. Positive means the participant owes money.
    pub fn balances(&self) -> &[f64] {
        &self.balances
    }

    /// Adds every id not yet in the roster. Returns how many were added.
    ///
    /// Newcomers join with a clean slate: expenses recorded before they joined
    /// are not split with them.
    pub fn invite(&mut self, ids: &[ParticipantId]) -> usize {
        let mut added = 0;
        for &id in ids {
            if self.has_participant(id) {
                continue;
            }
            self.participants.push(id);
            self.balances.push(0.0);
            self.debt.grow();
            self.transfers.grow();
            added += 1;
        }

        if added > 0 {
            tracing::debug!(
                activity = self.primary_key,
                added,
                participants = self.participants.len(),
                "invited participants"
            );
            self.invalidate();
        }
        added
    }

    /// Records a batch of expenses.
    ///
    /// The batch is all-or-nothing: if any payer is not a participant nothing
    /// is recorded and [`EngineError::PayerNotParticipant`] is returned.
    pub fn add_expense<I>(&mut self, expenses: I) -> ResultEngine<()>
    where
        I: IntoIterator<Item = Expense>,
    {
        let batch: Vec<Expense> = expenses.into_iter().collect();
        let mut payers = Vec::with_capacity(batch.len());
        for expense in &batch {
            match self.participant_index(expense.payer()) {
                Some(index) => payers.push(index),
                None => {
                    tracing::warn!(
                        activity = self.primary_key,
                        payer = expense.payer(),
                        "rejected expense batch: payer is not a participant"
                    );
                    return Err(EngineError::PayerNotParticipant(expense.payer()));
                }
            }
        }

        let headcount = self.participants.len();
        for (incoming, payer) in batch.into_iter().zip(payers) {
            // Accepted expenses start live.
            let mut expense = Expense::new(incoming.payer(), incoming.amount());
            self.accumulate(payer, expense.amount().value(), headcount);
            expense.headcount = headcount;
            tracing::debug!(
                activity = self.primary_key,
                payer = expense.payer(),
                amount = expense.amount().value(),
                headcount,
                "recorded expense"
            );
            self.expenses.push(expense);
            self.invalidate();
        }
        Ok(())
    }

    /// Soft-deletes the expenses at the given 1-based positions. Positions
    /// outside `1..=expenses().len()` are ignored.
    ///
    /// The debt matrix is left untouched: deletion only marks the expense.
    pub fn delete_expense(&mut self, positions: &[usize]) {
        let mut touched = false;
        for &position in positions {
            if let Some(expense) = position
                .checked_sub(1)
                .and_then(|index| self.expenses.get_mut(index))
            {
                expense.delete();
                touched = true;
                tracing::debug!(activity = self.primary_key, position, "deleted expense");
            }
        }
        if touched {
            self.invalidate();
        }
    }

    /// Settles the group and returns the transfer matrix.
    ///
    /// Entry `(i, j)` is the signed amount participant `i` receives from `j`
    /// (negative: `i` pays `j`). Rows and columns follow roster order.
    pub fn transfer_matrix(&mut self) -> &SquareMatrix {
        self.settle();
        &self.transfers
    }

    /// Settles the group and returns the payments, in emission order.
    pub fn settlement(&mut self) -> &[Transfer] {
        self.settle();
        &self.schedule
    }

    fn settle(&mut self) {
        if self.state != ActivityState::Populated {
            return;
        }

        let tolerance = settlement::tolerance(&self.debt);
        self.balances = settlement::net_balances(&self.debt, tolerance);
        let mut working = self.balances.clone();
        let payments = settlement::settle(&mut working, &mut self.transfers, tolerance);

        self.schedule = payments
            .into_iter()
            .map(|payment| Transfer {
                from: self.participants[payment.debtor],
                to: self.participants[payment.creditor],
                amount: payment.amount,
            })
            .collect();
        self.state = ActivityState::Settled;

        tracing::debug!(
            activity = self.primary_key,
            transfers = ?self.schedule,
            "settled activity"
        );
    }

    /// Splits `amount` evenly across the first `headcount` participants and
    /// charges every share but the payer's to the payer's column.
    pub(crate) fn accumulate(&mut self, payer: usize, amount: f64, headcount: usize) {
        debug_assert!(payer < headcount && headcount <= self.participants.len());
        let share = amount / headcount as f64;
        for debtor in (0..headcount).filter(|debtor| *debtor != payer) {
            self.debt[(debtor, payer)] += share;
        }
    }

    /// Appends an already accepted expense without touching the debt matrix.
    pub(crate) fn push_recorded(&mut self, expense: Expense) {
        self.expenses.push(expense);
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.state = ActivityState::Populated;
    }
}

/// Title, roster and expense log, all order-sensitive. Matrices, balances and
/// the primary key are not part of identity.
impl PartialEq for Activity {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title
            && self.participants == other.participants
            && self.expenses == other.expenses
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Activity \"{}\"", self.title)
    }
}
