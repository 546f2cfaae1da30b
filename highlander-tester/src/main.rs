mod logic;
mod util;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use highlander_game::BalanceConfig;
use logic::{GameplayStrategy, LogicTester, find_scenario, list_scenarios};
use util::split_csv;

#[derive(Debug, Parser)]
#[command(name = "highlander-tester", version)]
#[command(about = "Automated QA testing for Highlander game logic")]
struct Args {
    /// Scenarios to run (comma-separated, or `all`)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Player strategy driving the simulated careers
    #[arg(long, default_value = "balanced")]
    #[arg(value_parser = ["aggressive", "balanced", "cautious", "random", "all"])]
    strategy: String,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Balance table to load instead of the built-in one
    #[arg(long)]
    balance: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let balance = load_balance(args.balance.as_deref())?;
    let scenarios = expand_scenarios(&args.scenarios);
    let strategies = expand_strategies(&args.strategy);
    let seeds = parse_seeds(&args.seeds)?;
    log::info!(
        "running {} scenario(s) x {} strateg(ies) x {} seed(s), {} iteration(s) each",
        scenarios.len(),
        strategies.len(),
        seeds.len(),
        args.iterations
    );

    let all_results = run_logic_scenarios(&args, &balance, &scenarios, &strategies, &seeds);

    write_reports(&args, &all_results, start_time)?;

    if all_results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:25} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "⚔️  Highlander Automated Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn load_balance(path: Option<&Path>) -> Result<BalanceConfig> {
    let Some(path) = path else {
        return Ok(BalanceConfig::builtin());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read balance file {}", path.display()))?;
    let balance = BalanceConfig::from_json(&raw)
        .with_context(|| format!("invalid balance file {}", path.display()))?;
    log::info!("loaded balance table from {}", path.display());
    Ok(balance)
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s == "all") {
        scenarios.retain(|s| s != "all");
        for (key, _) in list_scenarios() {
            if !scenarios.iter().any(|s| s == key) {
                scenarios.push(key.to_string());
            }
        }
    }
    scenarios
}

fn expand_strategies(strategy_arg: &str) -> Vec<GameplayStrategy> {
    if strategy_arg == "all" {
        return GameplayStrategy::ALL.to_vec();
    }
    GameplayStrategy::from_key(strategy_arg)
        .map_or_else(|| vec![GameplayStrategy::Balanced], |strategy| vec![strategy])
}

fn parse_seeds(seeds_arg: &str) -> Result<Vec<u64>> {
    split_csv(seeds_arg)
        .iter()
        .map(|token| {
            token
                .parse::<u64>()
                .with_context(|| format!("invalid seed '{token}'"))
        })
        .collect()
}

fn run_logic_scenarios(
    args: &Args,
    balance: &BalanceConfig,
    scenarios: &[String],
    strategies: &[GameplayStrategy],
    seeds: &[u64],
) -> Vec<logic::ScenarioResult> {
    println!("{}", "🧠 Running Logic Tests".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let logic_tester = LogicTester::new(balance.clone(), args.verbose);
    let mut results = Vec::new();

    for scenario_name in scenarios {
        let Some(scenario) = find_scenario(scenario_name) else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
            continue;
        };
        if scenario.pinned_strategy {
            results.extend(logic_tester.run_scenario(&scenario, seeds, args.iterations));
            continue;
        }
        for &strategy in strategies {
            let variant = scenario.for_strategy(strategy);
            results.extend(logic_tester.run_scenario(&variant, seeds, args.iterations));
        }
    }

    results
}

fn write_reports(
    args: &Args,
    results: &[logic::ScenarioResult],
    start_time: Instant,
) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            if results.is_empty() {
                writeln!(&mut output_target, "[]")?;
            } else {
                logic::reports::generate_json_report(&mut output_target, results)?;
            }
        }
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "{}\n\n_No scenarios executed._",
                    logic::reports::MARKDOWN_TITLE
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        _ => {
            let duration = start_time.elapsed();
            if results.is_empty() {
                writeln!(&mut output_target, "No logic scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(&mut output_target, results, duration)?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
