//! Service layer: business logic orchestration.
//!
//! Each service coordinates one resource family, delegating storage to
//! the domain registries and attachment handling to the blob store.
//! The [`Mailer`] drains the notification channel in the background.

pub mod auth_service;
pub mod event_service;
pub mod mailer;
pub mod registration_service;
pub mod stats_service;

pub use auth_service::AuthService;
pub use event_service::EventService;
pub use mailer::Mailer;
pub use registration_service::RegistrationService;
pub use stats_service::StatsService;
