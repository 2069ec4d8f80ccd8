mod logic;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use logic::{Harness, LogicTester, SeedInfo, find_scenario, list_scenarios, resolve_seed_inputs};

#[derive(Debug, Parser)]
#[command(name = "gridiron-tester", version)]
#[command(about = "Automated QA sweeps for the Gridiron season engine")]
struct Args {
    /// Scenarios to run (comma-separated, or `all`)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated integers or share codes, or `all`)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 3)]
    iterations: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

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
    let scenarios = expand_scenarios(&args.scenarios);
    let seed_infos = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let harness = Harness::load_default();

    let results = run_logic_scenarios(&args, &harness, &scenarios, &seed_infos);
    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
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
    println!("{}", "🏈 Gridiron Automated Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s.eq_ignore_ascii_case("all")) {
        scenarios.retain(|s| !s.eq_ignore_ascii_case("all"));
        for (key, _) in list_scenarios() {
            if !scenarios.iter().any(|s| s == key) {
                scenarios.push(key.to_string());
            }
        }
    }
    scenarios
}

fn run_logic_scenarios(
    args: &Args,
    harness: &Harness,
    scenarios: &[String],
    seeds: &[SeedInfo],
) -> Vec<logic::ScenarioResult> {
    println!("{}", "🧠 Running Logic Tests".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let tester = LogicTester::new(harness, args.verbose);
    let mut results = Vec::new();
    for name in scenarios {
        match find_scenario(name) {
            Ok(scenario) => results.extend(tester.run_scenario(scenario, seeds, args.iterations)),
            Err(err) => eprintln!("⚠️  {}", err.to_string().yellow()),
        }
    }
    results
}

fn write_reports(args: &Args, results: &[logic::ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, results)?,
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Gridiron Logic Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        _ => {
            if results.is_empty() {
                writeln!(&mut output_target, "No logic scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
        }
    }

    let duration = start_time.elapsed();
    if args.report != "json" {
        writeln!(&mut output_target)?;
        writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
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

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            scenarios: "smoke".to_string(),
            list_scenarios: false,
            seeds: "1337".to_string(),
            iterations: 1,
            report: "json".to_string(),
            verbose: false,
            output: None,
        }
    }

    #[test]
    fn csv_split_drops_blanks() {
        assert_eq!(split_csv(" a, ,b,,c "), vec!["a", "b", "c"]);
        assert!(split_csv("").is_empty());
    }

    #[test]
    fn all_expands_to_the_catalog_once() {
        let scenarios = expand_scenarios("smoke,ALL");
        assert_eq!(scenarios.len(), list_scenarios().len());
        assert_eq!(scenarios[0], "smoke");
        assert!(scenarios.iter().any(|s| s == "full-season"));
    }

    #[test]
    fn unknown_scenarios_are_skipped() {
        let harness = Harness::load_default();
        let args = base_args();
        let results = run_logic_scenarios(
            &args,
            &harness,
            &["nope".to_string(), "smoke".to_string()],
            &[SeedInfo::from_numeric(7)],
        );
        assert_eq!(results.len(), 1);
        assert!(results[0].passed, "{:?}", results[0].failures);
    }

    #[test]
    fn reports_land_in_the_output_file() {
        let path = std::env::temp_dir().join(format!("gridiron-report-{}.md", std::process::id()));
        let args = Args {
            report: "markdown".to_string(),
            output: Some(path.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("_No scenarios executed._"));
        assert!(text.contains("Total time"));
        let _ = std::fs::remove_file(path);
    }
}
