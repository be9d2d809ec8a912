//! The `ActivityBook` owns every activity and the allocator of their primary
//! keys.

use crate::{
    Activity, ActivityId, EngineError, ParticipantId, PrimaryKeyAllocator, ResultEngine, Title,
};

/// Ordered collection of activities, unique by primary key.
#[derive(Clone, Debug, Default)]
pub struct ActivityBook {
    allocator: PrimaryKeyAllocator,
    activities: Vec<Activity>,
}

impl ActivityBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allocator(allocator: PrimaryKeyAllocator) -> Self {
        Self {
            allocator,
            activities: Vec::new(),
        }
    }

    pub fn allocator(&self) -> &PrimaryKeyAllocator {
        &self.allocator
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn has_activity(&self, primary_key: ActivityId) -> bool {
        self.position(primary_key).is_some()
    }

    /// Creates a new activity with a freshly allocated key and returns the key.
    pub fn create_activity(&mut self, title: Title, participants: &[ParticipantId]) -> ActivityId {
        let activity = Activity::new(&self.allocator, title, participants);
        let primary_key = activity.primary_key();
        tracing::debug!(activity = primary_key, "created activity");
        self.activities.push(activity);
        primary_key
    }

    /// Adds an existing activity, e.g. one rehydrated from storage.
    pub fn add_activity(&mut self, activity: Activity) -> ResultEngine<()> {
        let primary_key = activity.primary_key();
        if self.has_activity(primary_key) {
            return Err(EngineError::ExistingKey(primary_key.to_string()));
        }
        self.allocator.reserve(primary_key);
        self.activities.push(activity);
        Ok(())
    }

    pub fn activity(&self, primary_key: ActivityId) -> ResultEngine<&Activity> {
        self.position(primary_key)
            .map(|index| &self.activities[index])
            .ok_or_else(|| EngineError::KeyNotFound(primary_key.to_string()))
    }

    pub fn activity_mut(&mut self, primary_key: ActivityId) -> ResultEngine<&mut Activity> {
        match self.position(primary_key) {
            Some(index) => Ok(&mut self.activities[index]),
            None => Err(EngineError::KeyNotFound(primary_key.to_string())),
        }
    }

    pub fn remove_activity(&mut self, primary_key: ActivityId) -> ResultEngine<Activity> {
        match self.position(primary_key) {
            Some(index) => Ok(self.activities.remove(index)),
            None => Err(EngineError::KeyNotFound(primary_key.to_string())),
        }
    }

    /// Replaces the activity stored under `primary_key` with `edited`, keeping
    /// its position in the book.
    pub fn set_activity(&mut self, primary_key: ActivityId, edited: Activity) -> ResultEngine<()> {
        let index = self
            .position(primary_key)
            .ok_or_else(|| EngineError::KeyNotFound(primary_key.to_string()))?;
        let edited_key = edited.primary_key();
        if edited_key != primary_key && self.has_activity(edited_key) {
            return Err(EngineError::ExistingKey(edited_key.to_string()));
        }
        self.allocator.reserve(edited_key);
        self.activities[index] = edited;
        Ok(())
    }

    /// Activities the participant takes part in.
    pub fn find_by_participant(
        &self,
        participant: ParticipantId,
    ) -> impl Iterator<Item = &Activity> {
        self.activities
            .iter()
            .filter(move |activity| activity.has_participant(participant))
    }

    fn position(&self, primary_key: ActivityId) -> Option<usize> {
        self.activities
            .iter()
            .position(|activity| activity.primary_key() == primary_key)
    }
}

/// Two books are equal when they hold equal activities in the same order.
impl PartialEq for ActivityBook {
    fn eq(&self, other: &Self) -> bool {
        self.activities == other.activities
    }
}
