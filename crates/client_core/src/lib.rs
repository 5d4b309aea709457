//! Client-side state for the clinic front desk: a REST gateway to the clinic
//! backend, an in-memory roster kept in step with it, the doctor create/edit
//! form, and the dashboard view models.

use shared::protocol::Doctor;
use tokio::sync::broadcast;

pub mod credentials;
pub mod dashboard;
pub mod edit_session;
pub mod error;
pub mod gateway;
pub mod roster;
pub mod store;

pub use credentials::{
    CredentialAccessor, EnvCredential, NoCredential, StoredCredential, TokenStore,
    DEFAULT_TOKEN_KEY,
};
pub use dashboard::{
    ChartSeries, DashboardConfig, DashboardView, MetricCards, RecentAppointment, RefreshReport,
};
pub use edit_session::{EditSession, SessionMode};
pub use error::{ClinicError, ClinicResult, DraftField, ValidationError};
pub use gateway::{DashboardGateway, DoctorGateway, GatewayConfig, HttpGateway};
pub use roster::DoctorRoster;
pub use store::{Entity, EntityStore};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// View-model changes published to whatever renders them.
#[derive(Debug, Clone)]
pub enum ClinicEvent {
    DoctorsUpdated(Vec<Doctor>),
    MetricsUpdated {
        cards: MetricCards,
        chart: ChartSeries,
    },
    RecentAppointmentsUpdated(Vec<RecentAppointment>),
    Error(String),
}

/// Sender that a roster and a dashboard can share so one subscriber sees
/// both streams.
pub fn event_channel() -> broadcast::Sender<ClinicEvent> {
    let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
    events
}

#[cfg(test)]
#[path = "tests/fakes.rs"]
mod test_fakes;
