//! WMS request URL tool.
//!
//! Loads a YAML source configuration, mounts the source and prints a GetMap
//! tile URL or a GetFeatureInfo URL to stdout. Logs go to stderr.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};
use wms_common::{ExtraParams, ParamValue, TileCoord};
use wms_protocol::InfoFormat;
use wms_source::{SourceConfig, TileSourceAdapter};

#[derive(Parser, Debug)]
#[command(name = "wms-url")]
#[command(about = "Build WMS request URLs for a configured tile source")]
struct Args {
    /// Source configuration file (YAML)
    #[arg(short, long, env = "WMS_SOURCE_CONFIG", default_value = "source.yaml")]
    config: PathBuf,

    /// Extra request parameter as KEY=VALUE (repeatable)
    #[arg(short = 'p', long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// Log filter, a level or directives such as `wms_source=debug,warn`.
    /// `RUST_LOG` takes precedence.
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// GetMap URL for one tile
    Tile {
        z: u32,
        x: u32,
        y: u32,

        #[arg(long, default_value = "1.0")]
        pixel_ratio: f64,
    },

    /// GetFeatureInfo URL for a longitude/latitude position
    FeatureInfo {
        #[arg(allow_negative_numbers = true)]
        lon: f64,

        #[arg(allow_negative_numbers = true)]
        lat: f64,

        /// Map units per pixel (default: the configured view resolution)
        #[arg(long)]
        resolution: Option<f64>,

        /// MIME type or short name (json, html, xml, text, gml)
        #[arg(long, default_value = "html")]
        info_format: InfoFormat,

        #[arg(long)]
        feature_count: Option<u32>,
    },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

fn log_filter(rust_log: Option<&str>, log_level: &str) -> Result<EnvFilter> {
    let directives = rust_log
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(log_level);
    EnvFilter::try_new(directives)
        .with_context(|| format!("Invalid log filter '{}'", directives))
}

fn init_tracing(filter: EnvFilter, json: bool) -> Result<()> {
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let rust_log = std::env::var("RUST_LOG").ok();
    init_tracing(log_filter(rust_log.as_deref(), &args.log_level)?, args.json)?;

    let mut config = SourceConfig::load(&args.config)
        .with_context(|| format!("Failed to load source config {}", args.config.display()))?;

    if !args.params.is_empty() {
        let ext = config.ext_params.get_or_insert_with(ExtraParams::new);
        for (key, value) in &args.params {
            ext.insert(key.clone(), ParamValue::from(value.as_str()));
        }
    }

    let mut adapter = config.into_adapter()?;
    adapter.mount().context("Failed to create WMS source")?;
    debug!(projection = %adapter.current_projection(), "Source ready");

    let url = match args.command {
        Command::Tile { z, x, y, pixel_ratio } => adapter
            .tile_url(TileCoord::new(z, x, y), pixel_ratio)
            .ok_or_else(|| anyhow!("No URL for tile {}/{}/{}", z, x, y))?,

        Command::FeatureInfo {
            lon,
            lat,
            resolution,
            info_format,
            feature_count,
        } => {
            let mut params = ExtraParams::new();
            params.insert(
                "INFO_FORMAT".to_string(),
                ParamValue::from(info_format.to_mime()),
            );
            if let Some(count) = feature_count {
                params.insert("FEATURE_COUNT".to_string(), ParamValue::from(count));
            }

            adapter
                .get_feature_info_url([lon, lat], resolution, None, Some(&params))?
                .ok_or_else(|| {
                    anyhow!(
                        "No GetFeatureInfo URL for {},{} (check the URL, the resolution and that the point lies on the grid)",
                        lon,
                        lat
                    )
                })?
        }
    };

    println!("{}", url);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param() {
        assert_eq!(
            parse_param("CQL_FILTER=a=1").unwrap(),
            ("CQL_FILTER".to_string(), "a=1".to_string())
        );
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=x").is_err());
    }

    #[test]
    fn test_log_filter() {
        assert_eq!(log_filter(None, "debug").unwrap().to_string(), "debug");
        assert_eq!(log_filter(Some("trace"), "warn").unwrap().to_string(), "trace");
        assert_eq!(log_filter(Some(" "), "info").unwrap().to_string(), "info");

        let filter = log_filter(None, "wms_source=debug,warn").unwrap().to_string();
        assert!(filter.contains("wms_source=debug"), "{}", filter);

        assert!(log_filter(None, "wms_source=loud").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "wms-url",
            "--config",
            "a.yaml",
            "-p",
            "tiled=true",
            "feature-info",
            "-94.5",
            "39.1",
            "--info-format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.params, vec![("tiled".to_string(), "true".to_string())]);
        match args.command {
            Command::FeatureInfo {
                lon, info_format, ..
            } => {
                assert_eq!(lon, -94.5);
                assert_eq!(info_format, InfoFormat::Json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
