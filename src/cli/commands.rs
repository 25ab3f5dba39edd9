//! Command dispatch

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{ChartGenerator, ChartOptions, ResilientClient};
use crate::config::{global_config_path, Settings};
use crate::domain::Subject;
use crate::infrastructure::{HttpChartService, InfraError};

use super::args::{Cli, Commands, ConfigCommands};
use super::error::{CliError, CliResult};
use super::{geo, output};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Generate {
            name,
            date,
            time,
            city,
            country,
            lang,
            theme,
            svg_out,
            api_base,
        }) => _generate(GenerateArgs {
            name,
            date,
            time,
            city,
            country: country.as_deref(),
            lang: lang.as_deref(),
            theme: theme.as_deref(),
            svg_out: svg_out.as_deref(),
            api_base: api_base.as_deref(),
        }),
        Some(Commands::Config { command }) => _config(command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "natalis", &mut std::io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

struct GenerateArgs<'a> {
    name: &'a str,
    date: &'a str,
    time: &'a str,
    city: &'a str,
    country: Option<&'a str>,
    lang: Option<&'a str>,
    theme: Option<&'a str>,
    svg_out: Option<&'a Path>,
    api_base: Option<&'a str>,
}

#[instrument(skip(args), fields(name = %args.name))]
fn _generate(args: GenerateArgs<'_>) -> CliResult<()> {
    let mut settings = Settings::load()?;
    if let Some(lang) = args.lang {
        settings.language = lang.to_string();
    }
    if let Some(theme) = args.theme {
        settings.theme = theme.to_string();
    }
    if let Some(api_base) = args.api_base {
        settings.api_base = api_base.to_string();
    }

    let date = NaiveDate::parse_from_str(args.date, "%Y-%m-%d")
        .map_err(|e| CliError::InvalidArgs(format!("date {:?}: {e}", args.date)))?;
    let time = NaiveTime::parse_from_str(args.time, "%H:%M")
        .map_err(|e| CliError::InvalidArgs(format!("time {:?}: {e}", args.time)))?;

    let nation = match args.country {
        Some(raw) => {
            let code = geo::country_code(raw);
            if code.is_none() {
                output::warning(&format!("unknown country {raw:?}, omitting it"));
            }
            code
        }
        None => None,
    };

    let subject = Subject {
        name: args.name.to_string(),
        year: date.year(),
        month: date.month(),
        day: date.day(),
        hour: time.hour(),
        minute: time.minute(),
        city: args.city.to_string(),
        nation,
        zodiac_type: settings.zodiac_type.clone(),
        house_system: Some(settings.house_system.clone()),
        geonames_username: settings.geonames_username.clone(),
    };
    debug!("subject assembled for {}", subject.name);

    let service = HttpChartService::new(&settings.api_base).map_err(InfraError::from)?;
    let options = ChartOptions {
        language: settings.language(),
        theme: settings.theme.clone(),
        cusp_epsilon: settings.cusp_epsilon,
    };
    let generator = ChartGenerator::new(ResilientClient::new(Arc::new(service)), options);

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| InfraError::io("creating async runtime", e))?;
    let chart = runtime.block_on(generator.generate(&subject))?;

    if let Some(path) = args.svg_out {
        std::fs::write(path, &chart.wheel_svg)
            .map_err(|e| InfraError::io(format!("writing {}", path.display()), e))?;
        output::success(&format!("wheel written to {}", path.display()));
    }
    output::render_report(&chart.report);
    Ok(())
}

#[instrument]
fn _config(command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load()?;
            let rendered = toml::to_string_pretty(&settings).map_err(|e| {
                CliError::from(crate::application::ApplicationError::Config {
                    message: e.to_string(),
                })
            })?;
            output::info(&rendered);
        }
        ConfigCommands::Path => {
            let path = global_config_path().unwrap_or_else(|| PathBuf::from("(unavailable)"));
            output::info(&path.display());
        }
    }
    Ok(())
}
