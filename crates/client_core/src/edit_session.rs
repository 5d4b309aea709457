//! Create/edit form state for the doctor roster.
//!
//! `Create` is the resting state. `begin_edit` moves to `Edit(target)` with
//! the draft copied from the target; a successful submit or `cancel` returns
//! to `Create` with an empty draft. A failed submit changes nothing.

use shared::protocol::{Doctor, DoctorDraft};
use tracing::{debug, info};

use crate::{
    error::{ClinicResult, DraftField, ValidationError},
    gateway::DoctorGateway,
    store::EntityStore,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionMode {
    #[default]
    Create,
    Edit(Doctor),
}

#[derive(Debug, Clone, Default)]
pub struct EditSession {
    mode: SessionMode,
    draft: DoctorDraft,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &SessionMode {
        &self.mode
    }

    pub fn draft(&self) -> &DoctorDraft {
        &self.draft
    }

    pub fn editing(&self) -> Option<&Doctor> {
        match &self.mode {
            SessionMode::Create => None,
            SessionMode::Edit(target) => Some(target),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing().is_some()
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_editing() {
            "Update Doctor"
        } else {
            "Add Doctor"
        }
    }

    /// Cancelling is only offered while editing.
    pub fn can_cancel(&self) -> bool {
        self.is_editing()
    }

    pub fn begin_edit(&mut self, doctor: &Doctor) {
        debug!(doctor_id = %doctor.id, "editing doctor");
        self.draft = DoctorDraft::from(doctor);
        self.mode = SessionMode::Edit(doctor.clone());
    }

    pub fn cancel(&mut self) {
        if !self.draft.is_empty() {
            debug!("discarding unsaved draft");
        }
        self.reset();
    }

    pub fn update_field(&mut self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        match field {
            DraftField::Name => self.draft.name = value,
            DraftField::Speciality => self.draft.speciality = value,
        }
    }

    pub fn update_field_named(
        &mut self,
        field: &str,
        value: impl Into<String>,
    ) -> Result<(), ValidationError> {
        let field = field.parse::<DraftField>()?;
        self.update_field(field, value);
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.draft.name.is_empty() {
            return Err(ValidationError::MissingField(DraftField::Name));
        }
        if self.draft.speciality.is_empty() {
            return Err(ValidationError::MissingField(DraftField::Speciality));
        }
        Ok(())
    }

    /// Sends the draft and merges the backend's answer into `store`.
    ///
    /// Validation failures never reach the gateway. On any error the mode,
    /// the draft and the store are left exactly as they were.
    pub async fn submit(
        &mut self,
        gateway: &dyn DoctorGateway,
        store: &mut EntityStore<Doctor>,
    ) -> ClinicResult<Doctor> {
        self.validate()?;

        let saved = match self.editing().map(|target| target.id) {
            None => {
                let created = gateway.create_doctor(&self.draft).await?;
                info!(doctor_id = %created.id, "doctor created");
                store.apply_create(created.clone());
                created
            }
            Some(target_id) => {
                let updated = gateway.update_doctor(target_id, &self.draft).await?;
                info!(doctor_id = %updated.id, "doctor updated");
                if !store.apply_update(updated.clone()) {
                    debug!(doctor_id = %updated.id, "updated doctor is not in the roster");
                }
                updated
            }
        };

        self.reset();
        Ok(saved)
    }

    fn reset(&mut self) {
        self.mode = SessionMode::Create;
        self.draft = DoctorDraft::default();
    }
}

#[cfg(test)]
#[path = "tests/edit_session_tests.rs"]
mod tests;
