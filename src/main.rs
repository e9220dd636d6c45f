use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cropwise_advisory::{AdvisoryApi, ApiClient, Crop, KeyParams, Suggestion};
use cropwise_core::Config;
use cropwise_ui::{AdvisoryOrchestrator, AdvisoryPanel, ForecastPanel, SuggestionFetcher};
use tokio::runtime::Handle;

#[derive(Debug, Parser)]
#[command(name = "cropwise", version, about = "Crop advisories and a short-range outlook")]
struct Cli {
    /// Advisory service base URL (overrides config and CROPWISE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Path to config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Type a place name and list matching locations
    Search {
        text: String,

        /// Delay between simulated keystrokes
        #[arg(long, default_value_t = 60)]
        keystroke_ms: u64,
    },
    /// Show advisories and the outlook for a location and crop
    Advise {
        #[arg(long, allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, allow_negative_numbers = true)]
        lon: Option<f64>,

        #[arg(long)]
        crop: Option<Crop>,

        /// Resolve coordinates from the first location matching this name
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        place: Option<String>,
    },
    /// List selectable crops
    Crops,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    cropwise_core::init()?;
    let cli = Cli::parse();

    if let Command::Crops = cli.command {
        for crop in Crop::ALL {
            println!("{:<10} {}", crop.as_str(), crop.display_name());
        }
        return Ok(());
    }

    let (mut config, _) = Config::load_validated(cli.config.as_deref())?;
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
        let validation = config.validate();
        if !validation.is_valid() {
            anyhow::bail!("Invalid --api-url: {}", validation.error_summary());
        }
    }
    let api: Arc<dyn AdvisoryApi> = Arc::new(ApiClient::new(&config.api)?);
    tracing::info!("Using advisory service at {}", config.api.base_url);

    match cli.command {
        Command::Search { text, keystroke_ms } => {
            let suggestions =
                search(api, &config, &text, Duration::from_millis(keystroke_ms)).await;
            if suggestions.is_empty() {
                println!("No matching locations.");
            }
            for s in &suggestions {
                println!("{}  ({:.4}, {:.4})", s.label, s.lat, s.lon);
            }
        }
        Command::Advise {
            lat,
            lon,
            crop,
            place,
        } => {
            let crop = crop.map(|c| c.as_str());
            let params = match place {
                Some(place) => {
                    let suggestions =
                        search(Arc::clone(&api), &config, &place, Duration::ZERO).await;
                    let Some(chosen) = suggestions.first() else {
                        anyhow::bail!("No location matches {:?}", place);
                    };
                    KeyParams::from_suggestion(chosen, crop)
                }
                None => KeyParams::new(lat, lon, crop),
            };
            advise(api, &params).await;
        }
        Command::Crops => {}
    }

    Ok(())
}

async fn search(
    api: Arc<dyn AdvisoryApi>,
    config: &Config,
    text: &str,
    keystroke: Duration,
) -> Vec<Suggestion> {
    let mut fetcher = SuggestionFetcher::new(api, Handle::current(), config.search.debounce());
    let mut typed = String::new();
    for ch in text.chars() {
        typed.push(ch);
        fetcher.input(&typed);
        if !keystroke.is_zero() {
            tokio::time::sleep(keystroke).await;
            fetcher.try_process();
        }
    }
    fetcher.settle().await;
    fetcher.suggestions().to_vec()
}

async fn advise(api: Arc<dyn AdvisoryApi>, params: &KeyParams) {
    let mut orchestrator = AdvisoryOrchestrator::new(api, Handle::current());
    orchestrator.present(params);
    orchestrator.settle().await;

    if let Some(key) = orchestrator.key() {
        println!("Crop: {}", key.crop);
    }

    let advisory = AdvisoryPanel::from_orchestrator(&orchestrator);
    if let Some(label) = advisory.label() {
        println!("Location: {}", label);
    }
    println!("\nAdvisories");
    if let AdvisoryPanel::Advisories {
        items, fallback, ..
    } = &advisory
    {
        if *fallback {
            println!("  (service unavailable; showing representative advisories)");
        }
        for a in items.iter() {
            println!(
                "  [{}] {} ({})\n    {}\n    Action: {}",
                a.severity,
                a.title,
                a.kind.icon_name(),
                a.reason,
                a.action
            );
        }
    }
    if let Some(message) = advisory.message() {
        println!("  {}", message);
    }

    let forecast = ForecastPanel::from_orchestrator(&orchestrator);
    println!("\n5-Day Outlook");
    for point in forecast.chart_points() {
        println!(
            "  {:<4} min {:>3}°C  max {:>3}°C  rain {:>5.1} mm  pop {:>3}%",
            point.day, point.t_min, point.t_max, point.rain_mm, point.pop_percent
        );
    }
    if let Some(message) = forecast.message() {
        println!("  {}", message);
    }
}
