//! Dashboard view models: metric cards, the appointments-over-time series
//! and the short list of recent appointments.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use futures::{stream::FuturesUnordered, FutureExt, StreamExt};
use shared::{
    domain::AppointmentId,
    protocol::{Appointment, DashboardMetrics},
};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::{
    error::{ClinicError, ClinicResult},
    event_channel,
    gateway::DashboardGateway,
    ClinicEvent,
};

pub const DEFAULT_RECENT_LIMIT: usize = 5;
/// `h:mm a, MMMM dd`, e.g. `9:05 AM, March 07`.
pub const DISPLAY_TIME_FORMAT: &str = "%-I:%M %p, %B %d";
pub const CONFIRMED_STATUS: &str = "Confirmed";

/// Static line styling handed to the chart renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesStyle {
    pub label: &'static str,
    pub border_color: &'static str,
    pub background_color: &'static str,
    pub fill: bool,
    pub tooltip_prefix: &'static str,
}

pub const APPOINTMENTS_SERIES: SeriesStyle = SeriesStyle {
    label: "Appointments",
    border_color: "rgba(75, 192, 192, 1)",
    background_color: "rgba(75, 192, 192, 0.2)",
    fill: true,
    tooltip_prefix: "Appointments: ",
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
    pub style: SeriesStyle,
}

impl Default for ChartSeries {
    fn default() -> Self {
        Self {
            labels: Vec::new(),
            values: Vec::new(),
            style: APPOINTMENTS_SERIES,
        }
    }
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    pub fn tooltip(&self, index: usize) -> Option<String> {
        self.values
            .get(index)
            .map(|value| format!("{}{value}", self.style.tooltip_prefix))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricCards {
    pub total_patient: u64,
    pub total_appointment: u64,
    pub revenue: f64,
}

impl MetricCards {
    pub fn revenue_display(&self) -> String {
        format!("${}", self.revenue)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentAppointment {
    pub id: AppointmentId,
    pub patient_name: String,
    pub doctor_name: String,
    pub display_time: String,
    pub status: &'static str,
}

/// Splits the series into parallel label/value columns, keeping the
/// backend's order and duplicates as delivered.
pub fn project(metrics: &DashboardMetrics) -> ChartSeries {
    let (labels, values) = metrics
        .series
        .iter()
        .map(|point| (point.date.clone(), point.count))
        .unzip();
    ChartSeries {
        labels,
        values,
        style: APPOINTMENTS_SERIES,
    }
}

pub fn metric_cards(metrics: &DashboardMetrics) -> MetricCards {
    MetricCards {
        total_patient: metrics.total_patient,
        total_appointment: metrics.total_appointment,
        revenue: metrics.revenue_data,
    }
}

/// First `n` appointments in delivery order.
pub fn top_recent(appointments: &[Appointment], n: usize) -> Vec<Appointment> {
    appointments.iter().take(n).cloned().collect()
}

pub fn format_display_time(timestamp: DateTime<Utc>, offset: FixedOffset) -> String {
    timestamp
        .with_timezone(&offset)
        .format(DISPLAY_TIME_FORMAT)
        .to_string()
}

pub fn recent_items(
    appointments: &[Appointment],
    n: usize,
    offset: FixedOffset,
) -> Vec<RecentAppointment> {
    top_recent(appointments, n)
        .into_iter()
        .map(|appointment| RecentAppointment {
            id: appointment.id,
            display_time: format_display_time(appointment.date, offset),
            patient_name: appointment.patient.name,
            doctor_name: appointment.doctor.name,
            status: CONFIRMED_STATUS,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardConfig {
    pub recent_limit: usize,
    pub display_offset: FixedOffset,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            recent_limit: DEFAULT_RECENT_LIMIT,
            display_offset: utc_offset(),
        }
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

#[derive(Debug, Default)]
pub struct RefreshReport {
    pub metrics: Option<ClinicError>,
    pub appointments: Option<ClinicError>,
}

impl RefreshReport {
    pub fn is_complete(&self) -> bool {
        self.metrics.is_none() && self.appointments.is_none()
    }
}

enum Fetched {
    Metrics(ClinicResult<DashboardMetrics>),
    Appointments(ClinicResult<Vec<Appointment>>),
}

/// Last-known-good dashboard state. Every slice is swapped wholesale when
/// its fetch succeeds and left alone when it fails. Appointments are kept
/// exactly as listed, repeated ids included.
pub struct DashboardView {
    gateway: Arc<dyn DashboardGateway>,
    config: DashboardConfig,
    cards: MetricCards,
    chart: ChartSeries,
    appointments: Vec<Appointment>,
    recent: Vec<RecentAppointment>,
    events: broadcast::Sender<ClinicEvent>,
}

impl DashboardView {
    pub fn new(gateway: Arc<dyn DashboardGateway>, config: DashboardConfig) -> Self {
        Self::with_event_sender(gateway, config, event_channel())
    }

    pub fn with_event_sender(
        gateway: Arc<dyn DashboardGateway>,
        config: DashboardConfig,
        events: broadcast::Sender<ClinicEvent>,
    ) -> Self {
        Self {
            gateway,
            config,
            cards: MetricCards::default(),
            chart: ChartSeries::default(),
            appointments: Vec::new(),
            recent: Vec::new(),
            events,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn cards(&self) -> &MetricCards {
        &self.cards
    }

    pub fn chart(&self) -> &ChartSeries {
        &self.chart
    }

    pub fn recent(&self) -> &[RecentAppointment] {
        &self.recent
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClinicEvent> {
        self.events.subscribe()
    }

    /// Fetches metrics and appointments concurrently. Whichever resolves
    /// first is applied first; neither waits on the other.
    pub async fn refresh(&mut self) -> RefreshReport {
        let gateway = Arc::clone(&self.gateway);
        let mut pending = FuturesUnordered::new();
        pending.push(async { Fetched::Metrics(gateway.fetch_metrics().await) }.boxed());
        pending.push(async { Fetched::Appointments(gateway.fetch_appointments().await) }.boxed());

        let mut report = RefreshReport::default();
        while let Some(fetched) = pending.next().await {
            match fetched {
                Fetched::Metrics(result) => report.metrics = self.apply_metrics(result).err(),
                Fetched::Appointments(result) => {
                    report.appointments = self.apply_appointments(result).err();
                }
            }
        }
        report
    }

    pub async fn refresh_metrics(&mut self) -> ClinicResult<()> {
        let result = self.gateway.fetch_metrics().await;
        self.apply_metrics(result)
    }

    pub async fn refresh_appointments(&mut self) -> ClinicResult<()> {
        let result = self.gateway.fetch_appointments().await;
        self.apply_appointments(result)
    }

    fn apply_metrics(&mut self, result: ClinicResult<DashboardMetrics>) -> ClinicResult<()> {
        let metrics = result.map_err(|err| self.report_failure("dashboard metrics", err))?;
        self.cards = metric_cards(&metrics);
        self.chart = project(&metrics);
        info!(points = self.chart.len(), "dashboard metrics refreshed");
        let _ = self.events.send(ClinicEvent::MetricsUpdated {
            cards: self.cards.clone(),
            chart: self.chart.clone(),
        });
        Ok(())
    }

    fn apply_appointments(
        &mut self,
        result: ClinicResult<Vec<Appointment>>,
    ) -> ClinicResult<()> {
        let appointments = result.map_err(|err| self.report_failure("appointments", err))?;
        self.appointments = appointments;
        self.recent = recent_items(
            &self.appointments,
            self.config.recent_limit,
            self.config.display_offset,
        );
        info!(
            total = self.appointments.len(),
            shown = self.recent.len(),
            "recent appointments refreshed"
        );
        let _ = self
            .events
            .send(ClinicEvent::RecentAppointmentsUpdated(self.recent.clone()));
        Ok(())
    }

    fn report_failure(&self, slice: &str, err: ClinicError) -> ClinicError {
        warn!(slice, error = %err, "fetch failed; keeping last displayed values");
        let _ = self
            .events
            .send(ClinicEvent::Error(format!("failed to fetch {slice}: {err}")));
        err
    }
}

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod tests;
