use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    CredentialAccessor, DashboardConfig, DashboardView, DoctorRoster, DraftField, EnvCredential,
    GatewayConfig, HttpGateway, TokenStore, DEFAULT_TOKEN_KEY,
};
use shared::{domain::DoctorId, protocol::Doctor};
use tracing_subscriber::EnvFilter;

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(about = "Clinic front desk: dashboard and doctor roster")]
struct Cli {
    /// Backend base URL; overrides clinic.toml and the environment.
    #[arg(long)]
    api_url: Option<String>,
    /// Bearer token; falls back to the configured environment variable.
    #[arg(long)]
    token: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Dashboard {
        #[arg(long)]
        recent: Option<usize>,
    },
    #[command(subcommand)]
    Doctors(DoctorCommand),
}

#[derive(Subcommand, Debug)]
enum DoctorCommand {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        speciality: String,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        speciality: Option<String>,
    },
    Delete {
        id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(api_url) = cli.api_url {
        settings.api_url = api_url;
    }

    let credentials: Arc<dyn CredentialAccessor> = match cli.token {
        Some(token) => {
            let tokens = TokenStore::new();
            tokens.set(DEFAULT_TOKEN_KEY, token);
            Arc::new(tokens.accessor(DEFAULT_TOKEN_KEY))
        }
        None => Arc::new(EnvCredential::new(settings.token_env.clone())),
    };
    let gateway_config = GatewayConfig::new(&settings.api_url)
        .with_context(|| format!("invalid api url '{}'", settings.api_url))?;
    let gateway = Arc::new(HttpGateway::new(gateway_config, credentials));

    match cli.command {
        Command::Dashboard { recent } => {
            let config = DashboardConfig {
                recent_limit: recent.unwrap_or(settings.recent_limit),
                display_offset: settings.display_offset()?,
            };
            let mut view = DashboardView::new(gateway, config);
            let report = view.refresh().await;
            print_dashboard(&view);
            if let Some(err) = report.metrics.or(report.appointments) {
                return Err(err).context("dashboard refresh incomplete");
            }
        }
        Command::Doctors(command) => run_doctor_command(DoctorRoster::new(gateway), command).await?,
    }

    Ok(())
}

async fn run_doctor_command(mut roster: DoctorRoster, command: DoctorCommand) -> Result<()> {
    roster.load().await.context("failed to load doctors")?;

    match command {
        DoctorCommand::List => {}
        DoctorCommand::Add { name, speciality } => {
            roster.update_field(DraftField::Name, name);
            roster.update_field(DraftField::Speciality, speciality);
            let created = roster.submit().await.context("failed to add doctor")?;
            println!("added doctor id={}", created.id);
        }
        DoctorCommand::Update {
            id,
            name,
            speciality,
        } => {
            if roster.begin_edit(DoctorId(id)).is_none() {
                bail!("doctor {id} is not in the roster");
            }
            if let Some(name) = name {
                roster.update_field(DraftField::Name, name);
            }
            if let Some(speciality) = speciality {
                roster.update_field(DraftField::Speciality, speciality);
            }
            let updated = roster.submit().await.context("failed to update doctor")?;
            println!("updated doctor id={}", updated.id);
        }
        DoctorCommand::Delete { id } => {
            roster
                .delete(DoctorId(id))
                .await
                .context("failed to delete doctor")?;
            println!("deleted doctor id={id}");
        }
    }

    print_doctors(roster.doctors());
    Ok(())
}

fn print_doctors(doctors: &[Doctor]) {
    println!("{:<6} {:<28} {}", "ID", "Name", "Speciality");
    for doctor in doctors {
        println!("{:<6} {:<28} {}", doctor.id.0, doctor.name, doctor.speciality);
    }
}

fn print_dashboard(view: &DashboardView) {
    let cards = view.cards();
    println!("Total Patients:      {}", cards.total_patient);
    println!("Appointments:        {}", cards.total_appointment);
    println!("Revenue This Month:  {}", cards.revenue_display());

    println!();
    println!("Appointments Over Time");
    let chart = view.chart();
    for (index, (label, _)) in chart.points().enumerate() {
        if let Some(tooltip) = chart.tooltip(index) {
            println!("  {label:<12} {tooltip}");
        }
    }

    println!();
    println!("Recent Appointments");
    for item in view.recent() {
        println!(
            "  {} | {} - {} | {}",
            item.patient_name, item.doctor_name, item.display_time, item.status
        );
    }
}
