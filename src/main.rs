// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! CarBrands - car brand detection client
//!
//! A cross-platform desktop application that sends an image to a remote
//! detection service and shows the detected brand with its bounding box.
//! The `detect` subcommand runs the same flow without a window.

mod app;
mod config;
mod error;
mod io;
mod models;
mod render;
mod session;
mod ui;
mod util;

use anyhow::{Context, Result};
use app::CarBrandsApp;
use clap::{Parser, Subcommand};
use config::Settings;
use io::demo::DemoDetector;
use io::detection_client::{analyze, Detector, HttpDetector};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "carbrands", version, about = "Car brand detection client")]
struct Cli {
    /// Base address of the detection service
    #[arg(long, env = "CARBRANDS_ENDPOINT")]
    endpoint: Option<String>,

    /// YAML settings file
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Analyze one image and print the result as JSON
    Detect {
        image: PathBuf,

        /// Also write the image with the box burned in
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Use the offline demo detector
        #[arg(long)]
        demo: bool,
    },
}

fn main() -> Result<ExitCode> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();
    let settings = Settings::resolve(cli.config.as_deref(), cli.endpoint.as_deref())?;
    log::info!("Detection endpoint: {}", settings.endpoint);

    match cli.command {
        Some(CliCommand::Detect {
            image,
            output,
            demo,
        }) => run_detect(&settings, image, output, demo),
        None => run_gui(settings).map(|_| ExitCode::SUCCESS),
    }
}

fn run_gui(settings: Settings) -> Result<()> {
    let app = CarBrandsApp::new(settings)?;

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_drag_and_drop(true)
            .with_title("CarBrands - Car Brand Detection"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native("CarBrands", options, Box::new(move |_cc| Ok(Box::new(app))))
        .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}

/// Intake, analyze and print, without a window.
fn run_detect(
    settings: &Settings,
    image: PathBuf,
    output: Option<PathBuf>,
    demo: bool,
) -> Result<ExitCode> {
    let mut session = session::Session::new();

    let candidate = io::intake::candidate_from_path(&image)
        .with_context(|| format!("reading {}", image.display()))?;
    session.submit(&candidate)?;
    session.accept_decoded(io::intake::decode(candidate)?);

    let detector: Box<dyn Detector> = if demo {
        Box::new(DemoDetector::default())
    } else {
        Box::new(HttpDetector::new(settings)?)
    };
    let ticket = session.begin_analysis()?;
    let result = analyze(detector.as_ref(), &ticket.upload);
    session.finish_analysis(ticket, result);

    let (Some(loaded), Some(result)) = (session.image(), session.result()) else {
        anyhow::bail!("analysis finished without a result");
    };
    println!("{}", io::export::result_json(result)?);

    if let Some(path) = output {
        io::export::save_export(&loaded.source.pixels, result, &path)?;
        log::info!("Wrote {}", path.display());
    }

    Ok(if result.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
