//! Main application for the media link fetcher GUI

// Command line / environment configuration
mod config;
// Metadata service client
mod api;
// Submission lifecycle
mod controller;
// Wire types and submission state
mod model;
// Page state shared with the GUI
mod page;
// Format list to download entries
mod renderer;
// Thumbnail fetching and decoding
mod thumbnail;
// egui front end
mod ui;

use std::sync::Arc;

use clap::Parser;
use color_eyre::{Result, eyre::eyre};
use eframe::egui::Visuals;
use tokio::runtime::Runtime;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use api::HttpMetadataService;
use config::Args;
use ui::FetcherApp;

/// Program entry point: reads configuration, starts logging and the
/// runtime, then launches the window
fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(args.log_filter()).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let runtime = Arc::new(Runtime::new()?);
    let service = HttpMetadataService::new(&args.server)?;
    tracing::info!(endpoint = %service.endpoint(), "using metadata service");

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Media Link Fetcher",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(Visuals::dark());
            Box::new(FetcherApp::new(cc, runtime, args, service))
        }),
    )
    .map_err(|e| eyre!("window closed with an error: {e}"))
}
