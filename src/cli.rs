//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::demo_router::DemoRouter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{
    BacktestConfig, BacktestEngine, BacktestResult, DEFAULT_INITIAL_CAPITAL, walk_forward_signals,
};
use crate::domain::clock::SystemClock;
use crate::domain::config_validation::{
    DEFAULT_STRATEGY, validate_backtest_config, validate_strategy_config,
};
use crate::domain::error::WicktraderError;
use crate::domain::history::PriceHistory;
use crate::domain::order_intent::OrderIntent;
use crate::domain::portfolio::DEFAULT_ORDER_QTY;
use crate::domain::strategy::{ScoringEngine, StrategyParams, StrategyRegistry};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::execution_port::OrderRouter;

#[derive(Parser, Debug)]
#[command(name = "wicktrader", about = "Wick-reversal signal engine and backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay walk-forward signals over a bar file
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Evaluate the latest bar and print any order intent
    Signal {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        /// Hand the intent to the demo order router
        #[arg(long)]
        route: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            output,
        } => run_backtest(&config, symbol.as_deref(), output.as_deref()),
        Command::Signal {
            config,
            symbol,
            route,
        } => run_signal(&config, symbol.as_deref(), route),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

fn report(e: WicktraderError) -> ExitCode {
    eprintln!("error: {e}");
    (&e).into()
}

pub fn strategy_name(adapter: &dyn ConfigPort) -> String {
    adapter
        .get_string("strategy", "name")
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| DEFAULT_STRATEGY.to_string())
}

pub fn build_strategy_params(adapter: &dyn ConfigPort) -> Result<StrategyParams, WicktraderError> {
    let defaults = StrategyParams::default();
    let pattern_min_score = adapter.get_int(
        "strategy",
        "pattern_min_score",
        i64::from(defaults.pattern_min_score),
    );
    let params = StrategyParams {
        wick_threshold: adapter.get_double("strategy", "wick_threshold", defaults.wick_threshold),
        pattern_min_score: i32::try_from(pattern_min_score).map_err(|_| {
            WicktraderError::ConfigInvalid {
                section: "strategy".into(),
                key: "pattern_min_score".into(),
                reason: format!("{} is out of range", pattern_min_score),
            }
        })?,
        volume_threshold: adapter.get_double(
            "strategy",
            "volume_threshold",
            defaults.volume_threshold,
        ),
        timeframe: adapter
            .get_string("strategy", "timeframe")
            .map(|s| s.trim().to_string())
            .unwrap_or(defaults.timeframe),
    };
    params.validate()?;
    Ok(params)
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, WicktraderError> {
    validate_backtest_config(adapter)?;
    Ok(BacktestConfig {
        initial_capital: adapter.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL),
        order_qty: adapter.get_double("backtest", "order_qty", DEFAULT_ORDER_QTY),
    })
}

pub fn resolve_symbol(
    symbol_override: Option<&str>,
    adapter: &dyn ConfigPort,
) -> Result<String, WicktraderError> {
    symbol_override
        .map(str::to_string)
        .or_else(|| adapter.get_string("backtest", "symbol"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| WicktraderError::ConfigMissing {
            section: "backtest".into(),
            key: "symbol".into(),
        })
}

/// The explicit or configured symbol; without one, every symbol the data
/// source holds at `timeframe`.
pub fn resolve_symbols(
    symbol_override: Option<&str>,
    adapter: &dyn ConfigPort,
    data_port: &dyn DataPort,
    timeframe: &str,
) -> Result<Vec<String>, WicktraderError> {
    match resolve_symbol(symbol_override, adapter) {
        Ok(symbol) => Ok(vec![symbol]),
        Err(missing @ WicktraderError::ConfigMissing { .. }) => {
            let symbols = data_port.list_symbols(timeframe)?;
            if symbols.is_empty() {
                return Err(missing);
            }
            Ok(symbols)
        }
        Err(e) => Err(e),
    }
}

pub fn build_engine(
    adapter: &dyn ConfigPort,
    registry: &StrategyRegistry,
) -> Result<(Box<dyn ScoringEngine>, StrategyParams), WicktraderError> {
    validate_strategy_config(adapter, registry)?;
    let params = build_strategy_params(adapter)?;
    let engine = registry.create(&strategy_name(adapter), &params, Arc::new(SystemClock))?;
    Ok((engine, params))
}

fn data_adapter(adapter: &dyn ConfigPort) -> CsvAdapter {
    let dir = adapter
        .get_string("backtest", "data_dir")
        .unwrap_or_else(|| ".".to_string());
    CsvAdapter::new(PathBuf::from(dir))
}

/// Loads bars, generates walk-forward intents and replays them.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    engine: &dyn ScoringEngine,
    bt_config: &BacktestConfig,
    symbol: &str,
    timeframe: &str,
) -> Result<(BacktestResult, Vec<OrderIntent>), WicktraderError> {
    let bars = data_port.fetch_bars(symbol, timeframe)?;
    if bars.is_empty() {
        return Err(WicktraderError::DataSource {
            reason: format!("no bars for {} at {}", symbol, timeframe),
        });
    }

    eprintln!(
        "Running {} on {} ({} bars, {})",
        engine.name(),
        symbol,
        bars.len(),
        timeframe
    );
    let history = PriceHistory::enriched(bars);
    let intents = walk_forward_signals(engine, symbol, &history);
    eprintln!("  Generated: {} order intents", intents.len());

    let mut replay = BacktestEngine::new(bt_config);
    let result = replay.run(&intents, &history.bars)?;
    Ok((result, intents))
}

fn run_backtest(config_path: &Path, symbol: Option<&str>, output_path: Option<&Path>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let registry = StrategyRegistry::with_defaults();
    let (engine, params) = match build_engine(&adapter, &registry) {
        Ok(built) => built,
        Err(e) => return report(e),
    };
    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => return report(e),
    };

    let data_port = data_adapter(&adapter);
    let symbols = match resolve_symbols(symbol, &adapter, &data_port, &params.timeframe) {
        Ok(s) => s,
        Err(e) => return report(e),
    };

    // One failing symbol must not abort the others.
    let mut results: BTreeMap<String, BacktestResult> = BTreeMap::new();
    let mut last_error = None;
    for symbol in &symbols {
        match run_backtest_pipeline(
            &data_port,
            engine.as_ref(),
            &bt_config,
            symbol,
            &params.timeframe,
        ) {
            Ok((result, _)) => {
                eprintln!("\n=== {} ===", symbol);
                eprintln!("Initial:          {:.2}", result.initial);
                eprintln!("Final:            {:.2}", result.final_nav);
                eprintln!("Trades:           {}", result.trades);
                eprintln!("Return:           {:.2}%", result.return_pct);
                results.insert(symbol.clone(), result);
            }
            Err(e) => {
                eprintln!("warning: skipping {} ({})", symbol, e);
                last_error = Some(e);
            }
        }
    }

    if results.is_empty() {
        return report(last_error.unwrap_or_else(|| WicktraderError::DataSource {
            reason: "no symbols to backtest".to_string(),
        }));
    }

    // A single symbol renders as a bare result record.
    let json = match (symbols.len(), results.values().next()) {
        (1, Some(result)) => serde_json::to_string_pretty(result),
        _ => serde_json::to_string_pretty(&results),
    };
    let json = match json {
        Ok(j) => j,
        Err(e) => return report(e.into()),
    };
    println!("{json}");

    if let Some(path) = output_path {
        if let Err(e) = fs::write(path, &json) {
            return report(e.into());
        }
        eprintln!("\nResult written to: {}", path.display());
    }
    ExitCode::SUCCESS
}

/// Latest-bar intent for `symbol`, or `None` on hold.
pub fn evaluate_latest(
    data_port: &dyn DataPort,
    engine: &dyn ScoringEngine,
    symbol: &str,
    timeframe: &str,
) -> Result<Option<OrderIntent>, WicktraderError> {
    let bars = data_port.fetch_bars(symbol, timeframe)?;
    let history = PriceHistory::enriched(bars);
    let signal = engine.evaluate(symbol, &history);
    let intent = OrderIntent::from_signal(&signal);
    if intent.is_none() {
        eprintln!("{} {}: {}", signal.kind, symbol, signal.reason);
    }
    Ok(intent)
}

fn run_signal(config_path: &Path, symbol: Option<&str>, route_flag: bool) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let registry = StrategyRegistry::with_defaults();
    let (engine, params) = match build_engine(&adapter, &registry) {
        Ok(built) => built,
        Err(e) => return report(e),
    };
    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => return report(e),
    };

    let data_port = data_adapter(&adapter);
    let symbols = match resolve_symbols(symbol, &adapter, &data_port, &params.timeframe) {
        Ok(s) => s,
        Err(e) => return report(e),
    };

    let route = route_flag || adapter.get_bool("signal", "route", false);
    let router = DemoRouter::new();
    let mut failures = Vec::new();

    for symbol in &symbols {
        let intent = match evaluate_latest(&data_port, engine.as_ref(), symbol, &params.timeframe)
        {
            Ok(Some(intent)) => intent,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("warning: skipping {} ({})", symbol, e);
                failures.push(e);
                continue;
            }
        };

        match serde_json::to_string(&intent) {
            Ok(json) => println!("{json}"),
            Err(e) => return report(e.into()),
        }

        if route {
            match router.submit(intent.side, &intent.symbol, bt_config.order_qty) {
                Ok(ack) => eprintln!("Routed {} to demo broker: {ack}", intent.symbol),
                Err(e) => {
                    eprintln!("warning: routing {} failed ({})", intent.symbol, e);
                    failures.push(e);
                }
            }
        }
    }

    if failures.len() == symbols.len() {
        if let Some(e) = failures.pop() {
            return report(e);
        }
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let registry = StrategyRegistry::with_defaults();
    let params = match build_engine(&adapter, &registry) {
        Ok((_, params)) => params,
        Err(e) => return report(e),
    };
    if let Err(e) = build_backtest_config(&adapter) {
        return report(e);
    }

    eprintln!("\nStrategy:          {}", strategy_name(&adapter));
    eprintln!("  wick_threshold:    {}", params.wick_threshold);
    eprintln!("  pattern_min_score: {}", params.pattern_min_score);
    eprintln!("  volume_threshold:  {}", params.volume_threshold);
    eprintln!("  timeframe:         {}", params.timeframe);
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
