//! Tutoring Center
//!
//! Runs one simulation and narrates it on stdout.
//!
//! ```text
//! tutoring-center <students> <tutors> <chairs> <helps>
//!     [--work-delay-max-us N] [--tutoring-delay-us N] [--seed N]
//! ```
//!
//! # Startup Flow
//!
//! 1. Initialize tracing (`RUST_LOG` overrides the default filter)
//! 2. Parse and validate the arguments; invalid input exits with code 2
//! 3. Spawn the coordinator, tutors and students
//! 4. Wait for every student to finish (or Ctrl+C), then shut down the rest
//! 5. Log the run report; a protocol failure exits with code 1

#![warn(clippy::pedantic)]

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tutoring_center::config::{CliArgs, Config};
use tutoring_center::errors::TutoringError;
use tutoring_center::observability;
use tutoring_center::simulation::Simulation;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(observability::env_filter())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Tutoring center failed");
            let code = e
                .downcast_ref::<TutoringError>()
                .map_or(1, TutoringError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn run(args: &CliArgs) -> anyhow::Result<()> {
    let config = Config::from_args(args).map_err(TutoringError::from)?;

    info!(
        students = config.students,
        tutors = config.tutors,
        chairs = config.chairs,
        helps = config.helps,
        work_delay_max_us = config.work_delay_max.as_micros(),
        tutoring_delay_us = config.tutoring_delay.as_micros(),
        seed = ?config.seed,
        "Configuration loaded successfully"
    );

    let simulation = Simulation::new(config);
    tokio::spawn(cancel_on_interrupt(simulation.cancel_token()));

    let report = simulation.run().await.context("simulation aborted")?;

    for student in &report.students {
        info!(
            student_id = student.student_id,
            helps_received = student.helps_received,
            rejections = student.rejections,
            "Student summary"
        );
    }
    for (tutor_id, sessions) in &report.tutor_sessions {
        info!(tutor_id, sessions, "Tutor summary");
    }
    info!(
        total_requests = report.center.total_requests,
        total_sessions = report.center.total_sessions,
        total_helps = report.total_helps(),
        rejections = report.total_rejections(),
        peak_occupied = report.metrics.peak_occupied,
        elapsed_ms = report.elapsed.as_millis(),
        "Tutoring center closed"
    );

    Ok(())
}

/// Cancel the simulation on Ctrl+C. Returns once the run is over either way.
async fn cancel_on_interrupt(cancel_token: CancellationToken) {
    tokio::select! {
        () = cancel_token.cancelled() => {}
        result = signal::ctrl_c() => match result {
            Ok(()) => {
                warn!("Interrupt received, cancelling simulation");
                cancel_token.cancel();
            }
            Err(e) => warn!(error = %e, "Failed to install Ctrl+C handler"),
        },
    }
}
