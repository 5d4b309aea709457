use std::sync::Arc;

use shared::{
    domain::DoctorId,
    protocol::{Doctor, DoctorDraft},
};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::{
    edit_session::{EditSession, SessionMode},
    error::{ClinicError, ClinicResult, DraftField, ValidationError},
    event_channel,
    gateway::DoctorGateway,
    store::EntityStore,
    ClinicEvent,
};

/// The doctors screen: the roster, its create/edit form and the gateway
/// that backs both.
///
/// Mutations land in the store only after the backend answers, using the
/// backend's representation. Overlapping requests for the same doctor are
/// not coordinated; whichever response is applied last wins.
pub struct DoctorRoster {
    gateway: Arc<dyn DoctorGateway>,
    store: EntityStore<Doctor>,
    session: EditSession,
    events: broadcast::Sender<ClinicEvent>,
}

impl DoctorRoster {
    pub fn new(gateway: Arc<dyn DoctorGateway>) -> Self {
        Self::with_event_sender(gateway, event_channel())
    }

    pub fn with_event_sender(
        gateway: Arc<dyn DoctorGateway>,
        events: broadcast::Sender<ClinicEvent>,
    ) -> Self {
        Self {
            gateway,
            store: EntityStore::new(),
            session: EditSession::new(),
            events,
        }
    }

    pub fn doctors(&self) -> &[Doctor] {
        self.store.get_all()
    }

    pub fn store(&self) -> &EntityStore<Doctor> {
        &self.store
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn mode(&self) -> &SessionMode {
        self.session.mode()
    }

    pub fn draft(&self) -> &DoctorDraft {
        self.session.draft()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClinicEvent> {
        self.events.subscribe()
    }

    pub async fn load(&mut self) -> ClinicResult<()> {
        let doctors = self
            .gateway
            .list_doctors()
            .await
            .map_err(|err| self.report_failure("fetching doctors", err))?;
        self.store.replace_all(doctors);
        info!(count = self.store.len(), "doctor roster loaded");
        self.publish_roster();
        Ok(())
    }

    /// Starts editing a doctor from the roster. Returns `None` and leaves the
    /// form untouched when the id is unknown.
    pub fn begin_edit(&mut self, id: DoctorId) -> Option<&Doctor> {
        let doctor = self.store.get(id)?;
        self.session.begin_edit(doctor);
        self.session.editing()
    }

    pub fn cancel(&mut self) {
        self.session.cancel();
    }

    pub fn update_field(&mut self, field: DraftField, value: impl Into<String>) {
        self.session.update_field(field, value);
    }

    pub fn update_field_named(
        &mut self,
        field: &str,
        value: impl Into<String>,
    ) -> Result<(), ValidationError> {
        self.session.update_field_named(field, value)
    }

    pub async fn submit(&mut self) -> ClinicResult<Doctor> {
        let gateway = Arc::clone(&self.gateway);
        match self.session.submit(gateway.as_ref(), &mut self.store).await {
            Ok(saved) => {
                self.publish_roster();
                Ok(saved)
            }
            Err(err @ ClinicError::Validation(_)) => Err(err),
            Err(err) => Err(self.report_failure("adding/updating doctor", err)),
        }
    }

    /// Deletes on the backend first; the roster only drops the doctor once
    /// that succeeded. The edit form is left as it is.
    pub async fn delete(&mut self, id: DoctorId) -> ClinicResult<()> {
        self.gateway
            .delete_doctor(id)
            .await
            .map_err(|err| self.report_failure("deleting doctor", err))?;
        if self.store.apply_delete(id).is_some() {
            info!(doctor_id = %id, "doctor deleted");
        }
        self.publish_roster();
        Ok(())
    }

    fn publish_roster(&self) {
        let _ = self
            .events
            .send(ClinicEvent::DoctorsUpdated(self.store.get_all().to_vec()));
    }

    fn report_failure(&self, action: &str, err: ClinicError) -> ClinicError {
        warn!(action, error = %err, "doctor roster request failed");
        let _ = self
            .events
            .send(ClinicEvent::Error(format!("error {action}: {err}")));
        err
    }
}

#[cfg(test)]
#[path = "tests/roster_tests.rs"]
mod tests;
