use async_trait::async_trait;
use dashmap::DashMap;

use mergington::data::{Activity, ActivityMap, Message};
use mergington::log;

/// Reasons an operation on the activity registry can be refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActivityError {
    #[error("Activity not found")]
    ActivityNotFound(String),
    #[error("Student is already signed up")]
    AlreadySignedUp { activity: String, email: String },
    #[error("Student is not signed up for this activity")]
    NotSignedUp { activity: String, email: String },
}

/// A trait for managing activities and their participants.
///
/// The registry is keyed by activity name. Implementations must keep each
/// activity's participant list free of duplicates.
///
/// # Examples
///
/// ```rust,ignore
/// async fn enroll<S: ActivityService>(service: &S) -> Result<(), S::Error> {
///     let confirmation = service.signup("Chess Club", "newstudent@example.com").await?;
///     assert_eq!(
///         confirmation.message,
///         "Signed up newstudent@example.com for Chess Club"
///     );
///
///     let activities = service.list().await?;
///     assert!(activities["Chess Club"].has_participant("newstudent@example.com"));
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ActivityService {
    /// The error type returned by operations on this service.
    type Error;

    /// Returns a snapshot of every activity keyed by name.
    async fn list(&self) -> Result<ActivityMap, Self::Error>;

    /// Retrieves a single activity by name.
    ///
    /// # Errors
    ///
    /// Returns an error if no activity exists with the given name.
    async fn get(&self, activity_name: &str) -> Result<Activity, Self::Error>;

    /// Enrolls `email` in the named activity.
    ///
    /// # Errors
    ///
    /// Returns an error if the activity doesn't exist or the email is already
    /// enrolled in it.
    async fn signup(&self, activity_name: &str, email: &str) -> Result<Message, Self::Error>;

    /// Removes `email` from the named activity.
    ///
    /// Unlike a leave operation this is not idempotent: removing a student who
    /// is not enrolled is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the activity doesn't exist or the email is not
    /// enrolled in it.
    async fn unregister(&self, activity_name: &str, email: &str)
    -> Result<Message, Self::Error>;
}

/// An in-memory implementation of the `ActivityService` trait.
///
/// Activities live in a `DashMap`; each check-and-mutate runs while holding
/// the entry's write guard, so concurrent signups for the same email cannot
/// both succeed. Nothing is persisted.
pub struct ActivityServiceInMemory {
    activities: DashMap<String, Activity>,
}

impl ActivityServiceInMemory {
    pub fn new() -> Self {
        Self {
            activities: DashMap::new(),
        }
    }

    /// Creates a registry holding the standard activity catalogue.
    pub fn seeded() -> Self {
        Self::from_activities(super::seed_activities())
    }

    pub fn from_activities<I>(activities: I) -> Self
    where
        I: IntoIterator<Item = (String, Activity)>,
    {
        Self {
            activities: activities.into_iter().collect(),
        }
    }

    pub fn activity_count(&self) -> usize {
        self.activities.len()
    }

    pub fn participant_count(&self) -> usize {
        self.activities
            .iter()
            .map(|entry| entry.value().participants.len())
            .sum()
    }
}

impl Default for ActivityServiceInMemory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActivityService for ActivityServiceInMemory {
    type Error = ActivityError;

    async fn list(&self) -> Result<ActivityMap, Self::Error> {
        Ok(self
            .activities
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect())
    }

    async fn get(&self, activity_name: &str) -> Result<Activity, Self::Error> {
        self.activities
            .get(activity_name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ActivityError::ActivityNotFound(activity_name.to_string()))
    }

    async fn signup(&self, activity_name: &str, email: &str) -> Result<Message, Self::Error> {
        let mut activity = self
            .activities
            .get_mut(activity_name)
            .ok_or_else(|| ActivityError::ActivityNotFound(activity_name.to_string()))?;

        if !activity.add_participant(email.to_string()) {
            return Err(ActivityError::AlreadySignedUp {
                activity: activity_name.to_string(),
                email: email.to_string(),
            });
        }

        log::debug!(activity = activity_name, email, "Participant signed up");
        Ok(Message::new(format!("Signed up {email} for {activity_name}")))
    }

    async fn unregister(
        &self,
        activity_name: &str,
        email: &str,
    ) -> Result<Message, Self::Error> {
        let mut activity = self
            .activities
            .get_mut(activity_name)
            .ok_or_else(|| ActivityError::ActivityNotFound(activity_name.to_string()))?;

        if !activity.remove_participant(email) {
            return Err(ActivityError::NotSignedUp {
                activity: activity_name.to_string(),
                email: email.to_string(),
            });
        }

        log::debug!(activity = activity_name, email, "Participant removed");
        Ok(Message::new(format!("Removed {email} from {activity_name}")))
    }
}
