use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::{Confirm, Password, PasswordDisplayMode, Text};
use skycast_core::{
    ChartStyle, Config, ProviderId, Units, WeatherProvider, WeatherRequest, chart, load_dashboard,
    provider::{default_provider_from_config, provider_from_config},
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Current weather and 5-day forecast dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, e.g. "openweather" or "weatherapi".
        provider: ProviderId,

        /// Remember these units as the default for `show`.
        #[arg(long)]
        units: Option<Units>,

        /// Remember this chart style as the default for `show`.
        #[arg(long)]
        chart: Option<ChartStyle>,
    },

    /// Show current weather, forecast charts, sun times and alerts for a city.
    Show {
        /// City name, optionally with a country code ("London, GB"). Prompted for if absent.
        city: Option<String>,

        /// Temperature unit: celsius or fahrenheit.
        #[arg(short, long)]
        units: Option<Units>,

        /// Temperature chart style: bar or line.
        #[arg(long)]
        chart: Option<ChartStyle>,

        /// Provider to use instead of the configured default.
        #[arg(short, long)]
        provider: Option<ProviderId>,

        /// Directory the SVG charts are written to.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

impl Cli {
    pub async fn run(self) -> Result<ExitCode> {
        match self.command {
            Command::Configure {
                provider,
                units,
                chart,
            } => {
                configure(provider, units, chart)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Show {
                city,
                units,
                chart,
                provider,
                out_dir,
            } => {
                let city = match city {
                    Some(city) => city,
                    None => Text::new("Enter City Name:").prompt()?,
                };

                let options = ShowOptions {
                    units,
                    chart,
                    provider,
                    out_dir,
                };
                let connect = || -> Result<(Config, Box<dyn WeatherProvider>)> {
                    let config = Config::load()?;
                    let provider = match options.provider {
                        Some(id) => provider_from_config(id, &config)?,
                        None => default_provider_from_config(&config)?,
                    };
                    Ok((config, provider))
                };

                show_command(
                    &city,
                    &options,
                    connect,
                    &mut io::stdout(),
                    &mut io::stderr(),
                )
                .await
            }
        }
    }
}

fn configure(id: ProviderId, units: Option<Units>, chart: Option<ChartStyle>) -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new(&format!("{} API key:", id.display_name()))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;

    let api_key = api_key.trim();
    if api_key.is_empty() {
        bail!("API key must not be empty");
    }

    config.upsert_provider_api_key(id, api_key.to_string());

    if config.default_provider_id().ok() != Some(id) {
        let make_default = Confirm::new(&format!("Use {id} as the default provider?"))
            .with_default(true)
            .prompt()?;
        if make_default {
            config.set_default_provider(id);
        }
    }

    if units.is_some() {
        config.units = units;
    }
    if chart.is_some() {
        config.chart_style = chart;
    }

    let path = config.save()?;
    println!("Saved {id} configuration to {}", path.display());

    Ok(())
}

struct ShowOptions {
    units: Option<Units>,
    chart: Option<ChartStyle>,
    provider: Option<ProviderId>,
    out_dir: PathBuf,
}

/// Units and chart style: command line first, then the config file, then the defaults.
fn preferences(options: &ShowOptions, config: &Config) -> (Units, ChartStyle) {
    (
        options.units.or(config.units).unwrap_or_default(),
        options.chart.or(config.chart_style).unwrap_or_default(),
    )
}

/// Run `show` for `city` and report the outcome.
///
/// Any failure, including loading the config or building the provider, is
/// written to `err` once together with the location hint.
async fn show_command(
    city: &str,
    options: &ShowOptions,
    connect: impl FnOnce() -> Result<(Config, Box<dyn WeatherProvider>)>,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<ExitCode> {
    let city = city.trim();
    if city.is_empty() {
        writeln!(out, "Please enter a city name")?;
        return Ok(ExitCode::SUCCESS);
    }

    let report = match connect() {
        Ok((config, provider)) => show(city, options, &config, provider.as_ref()).await,
        Err(e) => Err(e),
    };

    match report {
        Ok(report) => {
            write!(out, "{report}")?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            write!(err, "{}", failure_message(&e))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn failure_message(err: &anyhow::Error) -> String {
    format!("Error: {err:#}\n{}\n", render::NOT_FOUND_HINT)
}

async fn show(
    city: &str,
    options: &ShowOptions,
    config: &Config,
    provider: &dyn WeatherProvider,
) -> Result<String> {
    let (units, style) = preferences(options, config);

    let request = WeatherRequest::new(city, units);
    let dashboard = load_dashboard(provider, &request).await?;

    let temperature_svg = chart::temperature_chart(&dashboard.days, units, style)?;
    let temperature_path = write_chart(&options.out_dir, "temperature.svg", &temperature_svg)?;
    let humidity_svg = chart::humidity_chart(&dashboard.days)?;
    let humidity_path = write_chart(&options.out_dir, "humidity.svg", &humidity_svg)?;

    Ok([
        render::section("Current Weather"),
        render::current_weather(&dashboard.current, units),
        render::section("5-Day Forecast"),
        format!("  Forecast for {}\n", dashboard.forecast_location),
        render::forecast_table(&dashboard.days, units),
        format!("  Chart ({style}): {}\n", temperature_path.display()),
        render::section("Humidity Forecast"),
        format!("  Chart: {}\n", humidity_path.display()),
        render::section("Sunrise & Sunset"),
        render::sun_times(&dashboard.current),
        render::section("Weather Alerts"),
        render::alerts(&dashboard.alerts),
        render::footer(provider.id().display_name()),
    ]
    .concat())
}

fn write_chart(dir: &Path, name: &str, svg: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create chart directory: {}", dir.display()))?;

    let path = dir.join(name);
    fs::write(&path, svg).with_context(|| format!("Failed to write chart: {}", path.display()))?;
    log::debug!("wrote {}", path.display());

    Ok(path)
}
