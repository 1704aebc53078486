//! @ai:module:intent CLI for comparing job-shop MiniZinc models
//! @ai:module:layer presentation

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use jobshop_compare::{
    compare::{ComparisonOrchestrator, ComparisonReport, ComparisonRequest, SingleRun},
    config::CompareConfig,
    engine::SolverEngine,
    invoker::SolveInvoker,
    report::{json_report::JsonReporter, ReportGenerator},
    toolchain::ToolchainValidator,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "jobshop-compare")]
#[command(about = "Compare MiniZinc job-shop models on a shared dataset")]
#[command(version)]
struct Cli {
    /// Path to configuration file (defaults to jobshop.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run several models on one dataset and rank them by makespan
    Compare {
        /// Dataset file name inside each family's tests folder (e.g. t1.dzn)
        #[arg(short, long)]
        dataset: String,

        /// Model ids (comma-separated)
        #[arg(short, long)]
        models: String,

        /// Solver id
        #[arg(short, long)]
        solver: Option<String>,

        /// Time limit per model, in seconds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Maximum number of concurrent solves
        #[arg(long)]
        concurrency: Option<usize>,

        /// Directory for the timestamped report folder
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a single model against an explicit dataset file
    Solve {
        /// Model id
        #[arg(short, long)]
        model: String,

        /// Path to the .dzn dataset
        #[arg(short, long)]
        data: PathBuf,

        /// Solver id
        #[arg(short, long)]
        solver: Option<String>,

        /// Time limit, in seconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// List the model catalog
    Models,

    /// List test datasets available for a model
    Datasets {
        /// Model id
        #[arg(short, long)]
        model: String,
    },

    /// List solvers reported by MiniZinc
    Solvers,

    /// Verify MiniZinc and the catalog solvers are installed
    Check,

    /// Regenerate reports from an existing comparison.json
    Report {
        /// Path to comparison JSON file
        #[arg(short, long)]
        results: PathBuf,

        /// Output directory for reports
        #[arg(short, long, default_value = "reports")]
        output: PathBuf,
    },

    /// Initialize default configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "jobshop.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let directive = if cli.verbose {
        "jobshop_compare=debug"
    } else {
        "jobshop_compare=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?),
        )
        .init();

    match cli.command {
        Commands::Compare {
            dataset,
            models,
            solver,
            timeout,
            concurrency,
            output,
        } => {
            run_comparison(CompareArgs {
                config: cli.config,
                dataset,
                models,
                solver,
                timeout,
                concurrency,
                output,
            })
            .await
        }
        Commands::Solve {
            model,
            data,
            solver,
            timeout,
        } => run_single(cli.config, model, data, solver, timeout).await,
        Commands::Models => list_models(cli.config),
        Commands::Datasets { model } => list_datasets(cli.config, model),
        Commands::Solvers => list_solvers(cli.config).await,
        Commands::Check => check(cli.config).await,
        Commands::Report { results, output } => generate_reports(results, output),
        Commands::Init { output } => init_config(output),
    }
}

struct CompareArgs {
    config: Option<PathBuf>,
    dataset: String,
    models: String,
    solver: Option<String>,
    timeout: Option<u64>,
    concurrency: Option<usize>,
    output: Option<PathBuf>,
}

/// @ai:intent Build an orchestrator over the MiniZinc driver
/// @ai:effects env:read
fn build_orchestrator(
    config: &CompareConfig,
) -> ComparisonOrchestrator<jobshop_compare::MiniZincDriver> {
    let registry = Arc::new(config.to_registry());
    let driver = Arc::new(config.to_driver());
    let invoker = Arc::new(
        SolveInvoker::new(driver).with_default_solver(config.engine.default_solver.clone()),
    );
    ComparisonOrchestrator::new(registry, invoker)
}

/// @ai:intent Run a comparison batch and write its reports
/// @ai:effects io, fs:write
async fn run_comparison(args: CompareArgs) -> Result<()> {
    let config = CompareConfig::load_or_default(args.config.as_deref())?;

    let model_ids = parse_list(&args.models);
    if model_ids.is_empty() {
        bail!("At least one model id is required (--models a,b,c)");
    }

    let request = ComparisonRequest::new(
        model_ids,
        args.dataset,
        args.solver.unwrap_or_else(|| config.run.solver.clone()),
        args.timeout
            .map(Duration::from_secs)
            .unwrap_or_else(|| config.timeout()),
    )
    .with_concurrency_limit(args.concurrency.unwrap_or(config.run.concurrency_limit));

    let orchestrator = build_orchestrator(&config);
    let report = orchestrator.compare(&request).await?;

    let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
    let output_dir = args
        .output
        .unwrap_or_else(|| config.paths.reports_dir.clone())
        .join(timestamp.to_string());

    ReportGenerator::new().generate_all(&report, &output_dir)?;

    print_ranking(&report);
    println!("Reports written to {}", output_dir.display());
    Ok(())
}

/// @ai:intent Run one model on one dataset file and print the outcome
/// @ai:effects io
async fn run_single(
    config_path: Option<PathBuf>,
    model: String,
    data: PathBuf,
    solver: Option<String>,
    timeout: Option<u64>,
) -> Result<()> {
    let config = CompareConfig::load_or_default(config_path.as_deref())?;
    let orchestrator = build_orchestrator(&config);

    let solver = solver.unwrap_or_else(|| config.run.solver.clone());
    let timeout = timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.timeout());

    let run = orchestrator.solve_one(&model, &data, &solver, timeout).await;
    print_single(&run);
    Ok(())
}

fn list_models(config_path: Option<PathBuf>) -> Result<()> {
    let registry = CompareConfig::load_or_default(config_path.as_deref())?.to_registry();

    println!("{:<28} {:<16} {:<22} Name", "Id", "Family", "Category");
    println!("{}", "-".repeat(100));
    for m in registry.models() {
        println!("{:<28} {:<16} {:<22} {}", m.id, m.family, m.category, m.name);
    }
    Ok(())
}

fn list_datasets(config_path: Option<PathBuf>, model: String) -> Result<()> {
    let registry = CompareConfig::load_or_default(config_path.as_deref())?.to_registry();
    registry.resolve(&model)?;

    let datasets = registry.list_datasets(&model);
    if datasets.is_empty() {
        println!("No datasets found for {}", model);
    }
    for name in datasets {
        println!("{}", name);
    }
    Ok(())
}

/// @ai:effects io
async fn list_solvers(config_path: Option<PathBuf>) -> Result<()> {
    let config = CompareConfig::load_or_default(config_path.as_deref())?;
    let registry = config.to_registry();
    let driver = config.to_driver();

    let solvers = driver.available_solvers().await?;
    println!("{:<36} {:<12} {:<12} Catalog name", "Id", "Name", "Version");
    println!("{}", "-".repeat(80));
    for s in solvers {
        println!(
            "{:<36} {:<12} {:<12} {}",
            s.id,
            s.name,
            s.version,
            registry.solver_name(&s.id)
        );
    }
    Ok(())
}

/// @ai:effects io
async fn check(config_path: Option<PathBuf>) -> Result<()> {
    let config = CompareConfig::load_or_default(config_path.as_deref())?;
    let registry = config.to_registry();
    let driver = config.to_driver();

    let status = ToolchainValidator::validate(&driver, &registry).await;
    ToolchainValidator::log_warnings(&status);

    match &status.engine_version {
        Some(version) => println!("MiniZinc: {} ({})", version, driver.binary().display()),
        None => bail!("MiniZinc not reachable at {}", driver.binary().display()),
    }

    println!(
        "Solvers: {} installed, {} catalog solvers missing",
        status.available_solvers.len(),
        status.missing_solvers.len()
    );
    Ok(())
}

fn generate_reports(results_path: PathBuf, output_dir: PathBuf) -> Result<()> {
    let report = JsonReporter::load(&results_path)?;

    ReportGenerator::new().generate_all(&report, &output_dir)?;

    println!("Reports generated in {}", output_dir.display());
    Ok(())
}

fn init_config(output: PathBuf) -> Result<()> {
    let config = CompareConfig::default();
    config.save(&output)?;
    println!("Configuration saved to {}", output.display());
    Ok(())
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn print_ranking(report: &ComparisonReport) {
    println!();
    println!(
        "Comparison on {} with {}",
        report.dataset_name, report.solver_name
    );
    println!("{}", "=".repeat(96));
    println!(
        "{:<3} {:<28} {:>9} {:>10} {:>9} {:>9}  Status",
        "#", "Model", "Makespan", "Time (s)", "Resources", "Imbalance"
    );
    println!("{}", "-".repeat(96));

    for (rank, r) in report.records.iter().enumerate() {
        println!(
            "{:<3} {:<28} {:>9} {:>10} {:>9} {:>9}  {}",
            rank + 1,
            r.model_id,
            r.makespan.to_string(),
            r.execution_time.to_string(),
            r.num_resources.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()),
            r.imbalance.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()),
            r.status
        );
    }
    println!();

    match report.best() {
        Some(best) => println!("Best: {} (makespan {})", best.model_name, best.makespan),
        None => println!("No model produced a solution"),
    }
}

fn print_single(run: &SingleRun) {
    let r = &run.record;

    println!();
    println!("{} - {}", r.model_id, r.model_name);
    println!("{}", "-".repeat(60));
    println!("Status:         {}", r.status);
    println!("Makespan:       {}", r.makespan);
    println!("Solve time (s): {}", r.execution_time);
    println!("Wall time (s):  {:.2}", run.elapsed.as_secs_f64());

    if let Some(metrics) = &r.metrics {
        println!("Start times:");
        for (job, row) in metrics.start_times().iter().enumerate() {
            println!("  job {}: {:?}", job + 1, row);
        }
        if let Some(load) = metrics.load() {
            println!(
                "Load:           {:?} (max {}, min {}, imbalance {})",
                load.load, load.max_load, load.min_load, load.imbalance
            );
        }
    }

    if !run.durations.is_empty() {
        println!("Durations:      {:?}", run.durations);
    }

    if let Some(detail) = &r.error_detail {
        println!("Detail:         {}", detail);
    }
}
