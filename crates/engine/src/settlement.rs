//! Settlement solver.
//!
//! Collapses the gross pairwise debt of an activity into net balances and
//! produces a cash-transfer schedule that zeroes every balance.
//!
//! The schedule comes from a greedy two-pointer walk over the balance vector:
//! one cursor looks for the next debtor, the other for the next creditor, and
//! each payment zeroes at least one of the two. Ties are broken by roster
//! order. With `d` debtors and `c` creditors this emits at most `d + c - 1`
//! payments, so never more than `N - 1`. It is not a minimum-transfer solver.
//!
//! Sign conventions:
//! - balance `> 0`: net debtor, `< 0`: net creditor.
//! - `transfers[(i, j)] > 0`: `i` receives that amount from `j`; the matrix is
//!   skew-symmetric.

use serde::{Deserialize, Serialize};

use crate::{ParticipantId, SquareMatrix};

/// Relative tolerance applied to the gross debt of the activity.
const RELATIVE_EPSILON: f64 = 1e-9;

/// One payment of the settlement schedule, by participant id.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: f64,
}

/// One payment of the settlement schedule, by roster position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Payment {
    pub debtor: usize,
    pub creditor: usize,
    pub amount: f64,
}

/// Absolute tolerance for an activity whose gross debt is `debt`.
pub(crate) fn tolerance(debt: &SquareMatrix) -> f64 {
    RELATIVE_EPSILON * debt.total().abs().max(1.0)
}

fn snap(value: f64, tolerance: f64) -> f64 {
    if value.abs() < tolerance { 0.0 } else { value }
}

/// `balance[a] = Σ_b debt[a][b] − Σ_b debt[b][a]`, with residuals below
/// `tolerance` snapped to zero.
pub(crate) fn net_balances(debt: &SquareMatrix, tolerance: f64) -> Vec<f64> {
    (0..debt.dim())
        .map(|a| snap(debt.row_sum(a) - debt.col_sum(a), tolerance))
        .collect()
}

/// Rewrites `transfers` from `balances` and returns the emitted payments.
///
/// `balances` is consumed by the walk: on return every entry is zero unless
/// the input did not sum to zero.
pub(crate) fn settle(
    balances: &mut [f64],
    transfers: &mut SquareMatrix,
    tolerance: f64,
) -> Vec<Payment> {
    debug_assert_eq!(balances.len(), transfers.dim());
    transfers.clear();

    let n = balances.len();
    let (mut i, mut j) = (0, 0);
    let mut payments = Vec::new();

    while i < n && j < n {
        let bi = balances[i];
        if bi <= 0.0 {
            i += 1;
            continue;
        }
        let bj = balances[j];
        if bj >= 0.0 {
            j += 1;
            continue;
        }

        let amount = bi.min(-bj);
        // i gives j `amount`.
        transfers[(i, j)] -= amount;
        transfers[(j, i)] += amount;
        balances[i] = snap(bi - amount, tolerance);
        balances[j] = snap(bj + amount, tolerance);
        payments.push(Payment {
            debtor: i,
            creditor: j,
            amount,
        });
    }

    let residual: f64 = balances.iter().map(|b| b.abs()).sum();
    if residual > 0.0 {
        tracing::warn!(residual, "settlement left an unbalanced residual");
    }

    payments
}
