//! In-memory gateways shared by the unit tests.

use std::{
    sync::{
        atomic::{AtomicI64, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use shared::{
    domain::DoctorId,
    protocol::{Appointment, DashboardMetrics, Doctor, DoctorDraft},
};

use crate::{
    error::{ClinicError, ClinicResult},
    gateway::{DashboardGateway, DoctorGateway},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Create(DoctorDraft),
    Update(DoctorId, DoctorDraft),
    Delete(DoctorId),
    Metrics,
    Appointments,
}

pub struct FakeGateway {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicI64,
    listing: Mutex<Vec<Doctor>>,
    doctor_failure: Mutex<Option<u16>>,
    metrics: Mutex<ClinicResult<DashboardMetrics>>,
    appointments: Mutex<ClinicResult<Vec<Appointment>>>,
    metrics_delay: Duration,
    appointments_delay: Duration,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(7),
            listing: Mutex::new(Vec::new()),
            doctor_failure: Mutex::new(None),
            metrics: Mutex::new(Ok(DashboardMetrics::default())),
            appointments: Mutex::new(Ok(Vec::new())),
            metrics_delay: Duration::ZERO,
            appointments_delay: Duration::ZERO,
        }
    }
}

fn remote(status: u16) -> ClinicError {
    ClinicError::Remote {
        status,
        body: format!("fake failure {status}"),
    }
}

fn clone_result<T: Clone>(result: &ClinicResult<T>) -> ClinicResult<T> {
    match result {
        Ok(value) => Ok(value.clone()),
        Err(ClinicError::Remote { status, body }) => Err(ClinicError::Remote {
            status: *status,
            body: body.clone(),
        }),
        Err(other) => Err(ClinicError::Transport(other.to_string())),
    }
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing(self, doctors: Vec<Doctor>) -> Self {
        *self.listing.lock().unwrap() = doctors;
        self
    }

    pub fn with_delays(mut self, metrics: Duration, appointments: Duration) -> Self {
        self.metrics_delay = metrics;
        self.appointments_delay = appointments;
        self
    }

    pub fn fail_doctor_calls(&self, status: Option<u16>) {
        *self.doctor_failure.lock().unwrap() = status;
    }

    pub fn set_metrics(&self, metrics: ClinicResult<DashboardMetrics>) {
        *self.metrics.lock().unwrap() = metrics;
    }

    pub fn set_appointments(&self, appointments: ClinicResult<Vec<Appointment>>) {
        *self.appointments.lock().unwrap() = appointments;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn doctor_outcome(&self) -> ClinicResult<()> {
        match *self.doctor_failure.lock().unwrap() {
            Some(status) => Err(remote(status)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DoctorGateway for FakeGateway {
    async fn list_doctors(&self) -> ClinicResult<Vec<Doctor>> {
        self.record(Call::List);
        self.doctor_outcome()?;
        Ok(self.listing.lock().unwrap().clone())
    }

    async fn create_doctor(&self, draft: &DoctorDraft) -> ClinicResult<Doctor> {
        self.record(Call::Create(draft.clone()));
        self.doctor_outcome()?;
        Ok(Doctor {
            id: DoctorId(self.next_id.fetch_add(1, Ordering::SeqCst)),
            name: draft.name.clone(),
            speciality: draft.speciality.clone(),
        })
    }

    async fn update_doctor(&self, id: DoctorId, draft: &DoctorDraft) -> ClinicResult<Doctor> {
        self.record(Call::Update(id, draft.clone()));
        self.doctor_outcome()?;
        Ok(Doctor {
            id,
            name: draft.name.clone(),
            speciality: draft.speciality.clone(),
        })
    }

    async fn delete_doctor(&self, id: DoctorId) -> ClinicResult<()> {
        self.record(Call::Delete(id));
        self.doctor_outcome()
    }
}

#[async_trait]
impl DashboardGateway for FakeGateway {
    async fn fetch_metrics(&self) -> ClinicResult<DashboardMetrics> {
        self.record(Call::Metrics);
        if !self.metrics_delay.is_zero() {
            tokio::time::sleep(self.metrics_delay).await;
        }
        clone_result(&self.metrics.lock().unwrap())
    }

    async fn fetch_appointments(&self) -> ClinicResult<Vec<Appointment>> {
        self.record(Call::Appointments);
        if !self.appointments_delay.is_zero() {
            tokio::time::sleep(self.appointments_delay).await;
        }
        clone_result(&self.appointments.lock().unwrap())
    }
}
