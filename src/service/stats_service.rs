//! Admin statistics: read-only aggregates over events and registrations.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::domain::{
    EventId, EventRegistry, RegistrationId, RegistrationLedger, RegistrationStatus, UserDirectory,
};
use crate::error::ApiError;

/// One of the five most recent registrations, for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct RecentRegistration {
    /// Registration identifier.
    pub id: RegistrationId,
    /// Title of the event, if it still exists.
    pub event_title: Option<String>,
    /// Registrant display name, if the account still exists.
    pub user_name: Option<String>,
    /// Registrant email, if the account still exists.
    pub user_email: Option<String>,
    /// When the registration was created.
    pub registered_at: DateTime<Utc>,
    /// Current lifecycle state.
    pub status: RegistrationStatus,
}

/// Capacity summary of an upcoming event.
#[derive(Debug, Clone, Serialize)]
pub struct UpcomingEventSummary {
    /// Event identifier.
    pub id: EventId,
    /// Event title.
    pub title: String,
    /// Event date.
    pub date: DateTime<Utc>,
    /// Display time string.
    pub time: String,
    /// Venue.
    pub location: String,
    /// Slots consumed so far.
    pub registration_count: u32,
    /// Capacity ceiling.
    pub max_attendees: u32,
}

/// Aggregate report for `GET /admin/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct AdminStats {
    /// Events created by the caller.
    pub total_events: usize,
    /// Registrations across those events.
    pub total_registrations: usize,
    /// How many of the caller's events are future-dated.
    pub upcoming_events: usize,
    /// Registrations that have been checked in.
    pub checked_in_count: usize,
    /// Check-in percentage, one decimal place.
    pub check_in_rate: f64,
    /// Five most recent registrations, newest first.
    pub recent_registrations: Vec<RecentRegistration>,
    /// Future-dated events sorted by date.
    pub upcoming_events_list: Vec<UpcomingEventSummary>,
}

/// Read-only aggregation over the caller's events.
#[derive(Debug, Clone)]
pub struct StatsService {
    registry: Arc<EventRegistry>,
    ledger: Arc<RegistrationLedger>,
    users: Arc<UserDirectory>,
}

impl StatsService {
    /// Creates a new `StatsService`.
    #[must_use]
    pub fn new(
        registry: Arc<EventRegistry>,
        ledger: Arc<RegistrationLedger>,
        users: Arc<UserDirectory>,
    ) -> Self {
        Self {
            registry,
            ledger,
            users,
        }
    }

    /// Builds the admin dashboard report, scoped to events the caller
    /// created.
    ///
    /// # Errors
    ///
    /// [`ApiError::Forbidden`] for non-admin callers.
    pub async fn admin_stats(&self, caller: &AuthUser) -> Result<AdminStats, ApiError> {
        if !caller.is_admin() {
            return Err(ApiError::Forbidden("admin access required".to_string()));
        }

        let now = Utc::now();
        let events: Vec<_> = self
            .registry
            .list()
            .await
            .into_iter()
            .filter(|event| event.created_by == caller.user_id)
            .collect();
        let event_ids: HashSet<EventId> = events.iter().map(|event| event.id).collect();
        let titles: HashMap<EventId, String> = events
            .iter()
            .map(|event| (event.id, event.title.clone()))
            .collect();

        let mut registrations: Vec<_> = self
            .ledger
            .list_all()
            .await
            .into_iter()
            .filter(|registration| event_ids.contains(&registration.event_id))
            .collect();

        let checked_in_count = registrations
            .iter()
            .filter(|registration| registration.checked_in_at.is_some())
            .count();
        let check_in_rate = if registrations.is_empty() {
            0.0
        } else {
            let raw = checked_in_count as f64 / registrations.len() as f64 * 100.0;
            (raw * 10.0).round() / 10.0
        };

        registrations.sort_by(|a, b| b.registered_at.cmp(&a.registered_at));
        let mut recent_registrations = Vec::new();
        for registration in registrations.iter().take(5) {
            let (user_name, user_email) = match self.users.get(registration.user_id).await {
                Ok(user) => (Some(user.full_name), Some(user.email)),
                Err(_) => (None, None),
            };
            recent_registrations.push(RecentRegistration {
                id: registration.id,
                event_title: titles.get(&registration.event_id).cloned(),
                user_name,
                user_email,
                registered_at: registration.registered_at,
                status: registration.status,
            });
        }

        let mut upcoming: Vec<_> = events
            .iter()
            .filter(|event| event.date >= now)
            .map(|event| UpcomingEventSummary {
                id: event.id,
                title: event.title.clone(),
                date: event.date,
                time: event.time.clone(),
                location: event.location.clone(),
                registration_count: event.current_attendees,
                max_attendees: event.max_attendees,
            })
            .collect();
        upcoming.sort_by_key(|event| event.date);

        Ok(AdminStats {
            total_events: events.len(),
            total_registrations: registrations.len(),
            upcoming_events: upcoming.len(),
            checked_in_count,
            check_in_rate,
            recent_registrations,
            upcoming_events_list: upcoming,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::event::CreateEventInput;
    use crate::domain::{EventRecord, RegistrationRecord, Role, UserId};
    use chrono::Duration;

    fn admin_caller(user_id: UserId) -> AuthUser {
        AuthUser {
            user_id,
            email: "admin@example.com".to_string(),
            role: Role::Admin,
        }
    }

    fn make_event(owner: UserId, days_from_now: i64) -> EventRecord {
        let input = CreateEventInput {
            title: "Stats Event".to_string(),
            description: None,
            date: Utc::now() + Duration::days(days_from_now),
            time: "10:00".to_string(),
            location: "Hall".to_string(),
            max_attendees: Some(20),
            registration_fee: None,
            bank_details: None,
            requires_checkin: None,
            registration_fields: None,
            image_url: None,
            meet_link: None,
        };
        EventRecord::new(owner, input, None)
    }

    #[tokio::test]
    async fn non_admin_is_forbidden() {
        let service = StatsService::new(
            Arc::new(EventRegistry::new()),
            Arc::new(RegistrationLedger::new()),
            Arc::new(UserDirectory::new()),
        );
        let caller = AuthUser {
            user_id: UserId::new(),
            email: "u@example.com".to_string(),
            role: Role::User,
        };
        assert!(matches!(
            service.admin_stats(&caller).await,
            Err(ApiError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn stats_are_scoped_to_the_caller_and_counted() {
        let registry = Arc::new(EventRegistry::new());
        let ledger = Arc::new(RegistrationLedger::new());
        let users = Arc::new(UserDirectory::new());
        let service = StatsService::new(
            Arc::clone(&registry),
            Arc::clone(&ledger),
            Arc::clone(&users),
        );

        let owner = UserId::new();
        let mine_upcoming = make_event(owner, 5);
        let mine_past = make_event(owner, -5);
        let theirs = make_event(UserId::new(), 5);
        let mine_id = mine_upcoming.id;
        let _ = registry.insert(mine_upcoming).await;
        let _ = registry.insert(mine_past).await;
        let theirs_id = theirs.id;
        let _ = registry.insert(theirs).await;

        let mut checked = RegistrationRecord::new(mine_id, UserId::new(), serde_json::json!({}));
        let _ = checked.check_in();
        let _ = ledger.insert(checked).await;
        let _ = ledger
            .insert(RegistrationRecord::new(
                mine_id,
                UserId::new(),
                serde_json::json!({}),
            ))
            .await;
        // Registration against someone else's event must not count.
        let _ = ledger
            .insert(RegistrationRecord::new(
                theirs_id,
                UserId::new(),
                serde_json::json!({}),
            ))
            .await;

        let stats = service.admin_stats(&admin_caller(owner)).await;
        let Ok(stats) = stats else {
            panic!("stats failed");
        };
        assert_eq!(stats.total_events, 2);
        assert_eq!(stats.total_registrations, 2);
        assert_eq!(stats.upcoming_events, 1);
        assert_eq!(stats.checked_in_count, 1);
        assert!((stats.check_in_rate - 50.0).abs() < f64::EPSILON);
        assert_eq!(stats.recent_registrations.len(), 2);
        assert_eq!(stats.upcoming_events_list.len(), 1);
    }
}
