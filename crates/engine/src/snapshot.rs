//! Serializable records used to persist and rehydrate activities.
//!
//! A record carries the roster and the expense log; the debt matrix is rebuilt
//! on load by replaying every expense over the participants that shared it.
//! Because the roster is append-only, an expense with headcount `h` was shared
//! by exactly the first `h` participants.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    Activity, ActivityBook, ActivityId, Amount, EngineError, Expense, ParticipantId,
    PrimaryKeyAllocator, ResultEngine, Title,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub payer: ParticipantId,
    pub amount: Amount,
    #[serde(default)]
    pub deleted: bool,
    pub headcount: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub primary_key: ActivityId,
    pub title: Title,
    pub participants: Vec<ParticipantId>,
    #[serde(default)]
    pub expenses: Vec<ExpenseRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub next_primary_key: ActivityId,
    #[serde(default)]
    pub activities: Vec<ActivityRecord>,
}

impl Activity {
    pub fn to_record(&self) -> ActivityRecord {
        ActivityRecord {
            primary_key: self.primary_key(),
            title: self.title().clone(),
            participants: self.participants().to_vec(),
            expenses: self
                .expenses()
                .iter()
                .map(|expense| ExpenseRecord {
                    payer: expense.payer(),
                    amount: expense.amount(),
                    deleted: expense.is_deleted(),
                    headcount: expense.headcount(),
                })
                .collect(),
        }
    }

    /// Rebuilds an activity, replaying its expenses into the debt matrix.
    pub fn from_record(record: ActivityRecord) -> ResultEngine<Self> {
        let invalid = |reason: String| {
            EngineError::InvalidSnapshot(format!("activity {}: {reason}", record.primary_key))
        };

        let mut seen = HashSet::with_capacity(record.participants.len());
        if let Some(duplicate) = record.participants.iter().find(|id| !seen.insert(**id)) {
            return Err(invalid(format!("duplicate participant {duplicate}")));
        }

        let mut activity = Activity::with_primary_key(
            record.primary_key,
            record.title.clone(),
            &record.participants,
        );

        for (position, expense) in record.expenses.iter().enumerate() {
            let position = position + 1;
            if expense.headcount == 0 || expense.headcount > record.participants.len() {
                return Err(invalid(format!(
                    "expense {position} has headcount {} for {} participants",
                    expense.headcount,
                    record.participants.len()
                )));
            }
            let payer = activity
                .participant_index(expense.payer)
                .filter(|index| *index < expense.headcount)
                .ok_or_else(|| {
                    invalid(format!(
                        "expense {position} payer {} was not a participant",
                        expense.payer
                    ))
                })?;

            activity.accumulate(payer, expense.amount.value(), expense.headcount);
            let mut recorded = Expense::new(expense.payer, expense.amount);
            recorded.headcount = expense.headcount;
            if expense.deleted {
                recorded.delete();
            }
            activity.push_recorded(recorded);
        }

        Ok(activity)
    }
}

impl ActivityBook {
    pub fn to_record(&self) -> BookRecord {
        BookRecord {
            next_primary_key: self.allocator().current(),
            activities: self.activities().iter().map(Activity::to_record).collect(),
        }
    }

    /// Restores every activity and the key counter. The counter never ends up
    /// at or below a restored key.
    pub fn from_record(record: BookRecord) -> ResultEngine<Self> {
        let mut book = ActivityBook::with_allocator(PrimaryKeyAllocator::new(
            record.next_primary_key,
        ));
        for activity in record.activities {
            book.add_activity(Activity::from_record(activity)?)?;
        }
        Ok(book)
    }

    pub fn to_json(&self) -> ResultEngine<String> {
        Ok(serde_json::to_string_pretty(&self.to_record())?)
    }

    pub fn from_json(json: &str) -> ResultEngine<Self> {
        let record: BookRecord = serde_json::from_str(json)?;
        Self::from_record(record)
    }
}
