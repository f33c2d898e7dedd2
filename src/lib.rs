pub mod calc;
pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod providers;
pub mod resolver;
pub mod store;

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cli::analyze::OutputFormat;
use crate::config::AppConfig;
use crate::core::cpi::CpiSource;
use crate::core::registry::{self, CpiSourceKind};
use crate::engine::{AnalysisEngine, AnalysisRequest};
use crate::providers::bundled::BundledCpi;
use crate::providers::eurostat::EurostatProvider;
use crate::providers::frankfurter::FrankfurterProvider;
use crate::providers::fred::FredProvider;
use crate::resolver::{CpiResolver, FxResolver};
use crate::store::CacheStore;

/// What an adapter asked the application to do.
pub enum AppCommand {
    Analyze {
        request: AnalysisRequest,
        output: OutputFormat,
        refresh_cache: bool,
    },
    CacheStatus,
    CacheClear,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let cache_dir = config.default_cache_path()?;

    match command {
        AppCommand::Analyze {
            request,
            output,
            refresh_cache,
        } => {
            let store = Arc::new(CacheStore::open(&cache_dir)?);
            let engine = build_engine(&config, Arc::clone(&store), refresh_cache)?;

            let pb = cli::ui::new_spinner("Fetching FX and CPI data...");
            let analysis = engine.analyze(&request).await;
            pb.finish_and_clear();
            let analysis = analysis?;

            match output {
                OutputFormat::Table => println!("{}", cli::analyze::render_table(&analysis, request.include_nominal_cagr)),
                OutputFormat::Json => println!("{}", cli::analyze::render_json(&analysis)?),
                OutputFormat::Csv => print!("{}", cli::analyze::render_csv(&analysis, request.include_nominal_cagr)?),
            }
            Ok(())
        }
        AppCommand::CacheStatus => {
            let store = CacheStore::open(&cache_dir)?;
            let mut entries = store.status();
            entries.sort_by(|a, b| a.key.cmp(&b.key));
            print!("{}", cli::cache::render_status(&entries, &cache_dir));
            Ok(())
        }
        AppCommand::CacheClear => {
            let store = CacheStore::open(&cache_dir)?;
            let count = store.clear()?;
            info!("Cleared {count} cache entries");
            println!("Cleared {count} cache entries.");
            Ok(())
        }
    }
}

fn build_engine(
    config: &AppConfig,
    store: Arc<CacheStore>,
    refresh_cache: bool,
) -> Result<AnalysisEngine> {
    let fred_base = config
        .providers
        .fred
        .as_ref()
        .map_or("https://api.stlouisfed.org", |p| &p.base_url);
    let eurostat_base = config
        .providers
        .eurostat
        .as_ref()
        .map_or("https://ec.europa.eu", |p| &p.base_url);
    let frankfurter_base = config
        .providers
        .frankfurter
        .as_ref()
        .map_or("https://api.frankfurter.dev", |p| &p.base_url);

    let fred: Arc<dyn CpiSource> = Arc::new(FredProvider::new(fred_base, config.fred_api_key()));
    let eurostat: Arc<dyn CpiSource> = Arc::new(EurostatProvider::new(eurostat_base));

    let mut cpi_sources: HashMap<String, Arc<dyn CpiSource>> = HashMap::new();
    for info in registry::all() {
        let source = match info.cpi_source {
            CpiSourceKind::Fred => Arc::clone(&fred),
            CpiSourceKind::Eurostat => Arc::clone(&eurostat),
        };
        cpi_sources.insert(info.country.to_string(), source);
    }

    let cpi_resolver = CpiResolver::new(Arc::clone(&store), cpi_sources, BundledCpi::load()?)
        .with_force_refresh(refresh_cache);
    let fx_resolver = FxResolver::new(store, Arc::new(FrankfurterProvider::new(frankfurter_base)));

    Ok(AnalysisEngine::new(cpi_resolver, fx_resolver))
}
