//! Data structures exchanged between the backend and its clients.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An extracurricular activity and the students enrolled in it.
///
/// The activity name is not part of the record; it is the key the record is
/// stored under (see [`ActivityMap`]). Participants are kept in sign-up order
/// and never contain the same email twice.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub description: String,
    pub schedule: String,
    pub max_participants: usize,
    pub participants: Vec<String>,
}

impl Activity {
    pub fn new(
        description: impl Into<String>,
        schedule: impl Into<String>,
        max_participants: usize,
    ) -> Self {
        Self {
            description: description.into(),
            schedule: schedule.into(),
            max_participants,
            participants: Vec::new(),
        }
    }

    /// Builder-style helper used when seeding the registry.
    pub fn with_participants<I, S>(mut self, participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for email in participants {
            self.add_participant(email.into());
        }
        self
    }

    pub fn has_participant(&self, email: &str) -> bool {
        self.participants.iter().any(|p| p == email)
    }

    /// Appends `email` unless it is already enrolled.
    ///
    /// Returns `false` if the participant was already present.
    pub fn add_participant(&mut self, email: String) -> bool {
        if self.has_participant(&email) {
            return false;
        }
        self.participants.push(email);
        true
    }

    /// Removes `email`, preserving the order of the remaining participants.
    ///
    /// Returns `false` if the participant was not enrolled.
    pub fn remove_participant(&mut self, email: &str) -> bool {
        match self.participants.iter().position(|p| p == email) {
            Some(index) => {
                self.participants.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remaining capacity, as shown by the web client.
    pub fn spots_left(&self) -> usize {
        self.max_participants.saturating_sub(self.participants.len())
    }
}

/// Snapshot of the registry keyed by activity name.
pub type ActivityMap = BTreeMap<String, Activity>;

/// Query parameters accepted by the signup and unregister endpoints.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ParticipantQuery {
    pub email: String,
}

/// Confirmation body returned by successful mutations.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error body returned alongside 4xx statuses.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub detail: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UptimeInfo {
    pub seconds: i64,
    pub human: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegistryInfo {
    pub activities: usize,
    pub participants: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: String,
    pub started_at: String,
    pub uptime: UptimeInfo,
    pub registry: RegistryInfo,
}
