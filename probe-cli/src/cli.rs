use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use probe_core::{
    Config, Coordinator, HttpFetcher, Phase, QueryState, TimeSlot, all_slots,
    config::DEFAULT_SERVICE_URL, default_slot,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "probe", version, about = "Point weather probe")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the location service endpoint.
    Configure {
        /// Base URL, e.g. "http://localhost:5000"; prompted for if absent.
        url: Option<String>,
    },

    /// Probe conditions at a geographic point.
    Probe {
        /// Latitude in degrees, -90 to 90.
        lat: f64,

        /// Longitude in degrees, -180 to 180.
        lng: f64,

        /// Hour-of-day slot (UTC), 0 to 23; earliest slot if absent.
        #[arg(long)]
        hour: Option<u32>,
    },

    /// List the selectable time slots.
    Slots,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure { url } => configure(url),
            Command::Probe { lat, lng, hour } => probe(lat, lng, hour).await,
            Command::Slots => {
                for slot in all_slots() {
                    println!("{slot}");
                }
                Ok(())
            }
        }
    }
}

fn configure(url: Option<String>) -> Result<()> {
    let url = match url {
        Some(url) => url,
        None => inquire::Text::new("Location service base URL:")
            .with_default(DEFAULT_SERVICE_URL)
            .prompt()
            .context("Failed to read endpoint from prompt")?,
    };

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(anyhow!("Endpoint must be an http(s) URL, got '{url}'"));
    }

    let mut cfg = Config::load()?;
    cfg.set_service_url(url.trim_end_matches('/').to_string());
    cfg.save()?;

    println!("Saved endpoint to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn probe(lat: f64, lng: f64, hour: Option<u32>) -> Result<()> {
    let slot = match hour {
        Some(h) => {
            TimeSlot::from_hour(h).ok_or_else(|| anyhow!("Hour must be in 0..=23, got {h}"))?
        }
        None => default_slot(),
    };

    let cfg = Config::load()?;
    let fetcher = Arc::new(HttpFetcher::new(cfg.service_url_or_default()));
    let coordinator = Coordinator::new(fetcher);

    let mut rx = coordinator.subscribe();
    coordinator.submit(lat, lng, slot);

    let state = loop {
        let state = rx.borrow_and_update().clone();
        if matches!(state.phase, Phase::Succeeded | Phase::Failed) {
            break state;
        }
        rx.changed().await.context("Coordinator dropped before the query settled")?;
    };

    print_settled(&state)
}

fn print_settled(state: &QueryState) -> Result<()> {
    match state.phase {
        Phase::Succeeded => {
            let readings = state.result.ok_or_else(|| anyhow!("Succeeded state without result"))?;

            if let Some(key) = state.selected_key {
                println!("Location:       {:.2}, {:.2}", key.latitude(), key.longitude());
                println!("Time:           {}", key.slot());
            }
            println!("Temperature:    {:.2} °C", readings.temperature_c);
            println!("Wind speed:     {:.2} m/s", readings.wind_speed_mps);
            println!("Wind direction: {:.0}°", readings.wind_direction_deg);
            Ok(())
        }
        Phase::Failed => {
            let err = state.error.ok_or_else(|| anyhow!("Failed state without error"))?;
            Err(anyhow!("Query failed: {err}"))
        }
        Phase::Idle | Phase::Loading => Err(anyhow!("Query ended in an unexpected state")),
    }
}
