use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mlbb_playoff_odds::config::SimConfig;
use mlbb_playoff_odds::export::export_report;
use mlbb_playoff_odds::match_fetch::{MatchSource, api_key_from_env, fetch_tournament_matches};
use mlbb_playoff_odds::match_parse::{MatchRecord, parse_matches, parse_matches_json};
use mlbb_playoff_odds::report::{render_fixtures, render_report, render_weeks};
use mlbb_playoff_odds::schedule::Cutoff;
use mlbb_playoff_odds::season::{FixtureChoices, OddsReport, OddsRequest, Season, SeasonSetup};
use mlbb_playoff_odds::simulate::ForcedOutcomes;
use mlbb_playoff_odds::tournaments::{TOURNAMENTS, by_region, find_tournament};

#[derive(Serialize)]
struct JsonOutput<'a> {
    weeks: Vec<String>,
    fixtures: &'a [FixtureChoices],
    report: &'a OddsReport,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();
    init_tracing()?;

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        print_usage();
        return Ok(());
    }
    if has_flag(&args, "--tournaments") {
        print_catalogue();
        return Ok(());
    }

    let mut config = match parse_path_arg(&args, "--config") {
        Some(path) => SimConfig::load(&path)
            .with_context(|| format!("failed loading config {}", path.display()))?,
        None => SimConfig::default(),
    }
    .with_env_overrides();
    if let Some(n) = parse_value_arg(&args, "--iterations") {
        config.iterations = n.parse().with_context(|| format!("bad --iterations {n}"))?;
    }
    if let Some(seed) = parse_value_arg(&args, "--seed") {
        config.seed = Some(seed.parse().with_context(|| format!("bad --seed {seed}"))?);
    }
    config.validate()?;

    let matches = load_matches(&args, &config)?;
    let season = match Season::from_matches(&matches, config.week_gap_days) {
        SeasonSetup::Ready(season) => season,
        SeasonSetup::Empty(reason) => {
            println!("Nothing to simulate: {}", reason.message());
            return Ok(());
        }
    };

    let cutoff = match parse_value_arg(&args, "--cutoff") {
        Some(raw) => Cutoff::parse(&raw).ok_or_else(|| anyhow!("bad --cutoff {raw}"))?,
        None => season.latest_played_cutoff(),
    };
    let forced = ForcedOutcomes::from_wire(parse_force_args(&args)?)?;
    info!(
        teams = season.teams().len(),
        weeks = season.weeks().len(),
        forced = forced.len(),
        ?cutoff,
        "season loaded"
    );

    let fixtures = season.unplayed_fixtures(cutoff)?;
    let report = season.simulate(&OddsRequest::from_config(&config, cutoff, forced))?;

    if has_flag(&args, "--json") {
        let out = JsonOutput {
            weeks: season
                .weeks()
                .iter()
                .enumerate()
                .map(|(idx, w)| w.label(idx))
                .collect(),
            fixtures: &fixtures,
            report: &report,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", render_weeks(season.weeks()));
        println!();
        if !fixtures.is_empty() {
            println!("Remaining fixtures");
            print!("{}", render_fixtures(&fixtures));
            println!();
        }
        print!("{}", render_report(&report));
    }

    if let Some(path) = parse_path_arg(&args, "--export") {
        let summary = export_report(&path, &report)?;
        eprintln!(
            "Exported {} standings rows and {} probability rows to {}",
            summary.standings_rows,
            summary.probability_rows,
            path.display()
        );
    }

    Ok(())
}

fn load_matches(args: &[String], config: &SimConfig) -> Result<Vec<MatchRecord>> {
    let aliases = config.team_aliases();
    if let Some(path) = parse_path_arg(args, "--matches") {
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed reading {}", path.display()))?;
        return Ok(parse_matches_json(
            &raw,
            &aliases,
            config.expected_parent.as_deref(),
        )?);
    }
    if let Some(name) = parse_value_arg(args, "--tournament") {
        let tournament =
            find_tournament(&name).ok_or_else(|| anyhow!("unknown tournament {name:?}"))?;
        let api_key = api_key_from_env();
        let fetched = fetch_tournament_matches(tournament.path, api_key.as_deref())?;
        if fetched.source == MatchSource::Cache {
            eprintln!("Using cached matches for {}", tournament.name);
        }
        let expected = config.expected_parent.as_deref().unwrap_or(tournament.path);
        return Ok(parse_matches(&fetched.records, &aliases, Some(expected))?);
    }
    bail!("pass --matches <file> or --tournament <name> (see --tournaments)")
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mlbb_playoff_odds=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("failed to init logging: {err}"))
}

fn print_usage() {
    println!("mlbb_odds --matches <file.json> | --tournament <name>");
    println!("  --config <file.json>     simulation config");
    println!("  --cutoff <week|none>     last played week (default: latest decided week)");
    println!("  --force <key>=<code>     force an outcome, key is team_a|team_b|YYYY-MM-DD");
    println!("  --iterations <n>         Monte Carlo iterations (clamped 1000..=50000)");
    println!("  --seed <n>               fixed RNG seed");
    println!("  --json                   print the report as JSON");
    println!("  --export <file.xlsx>     write standings and odds to a workbook");
    println!("  --tournaments            list known tournaments");
}

fn print_catalogue() {
    println!("{} tournaments", TOURNAMENTS.len());
    for (region, items) in by_region() {
        println!("{region}");
        for t in items {
            let status = if t.live { "live" } else { "archived" };
            println!("  {:<22} {:<44} {} {status}", t.name, t.path, t.year);
        }
    }
}

fn parse_force_args(args: &[String]) -> Result<Vec<(&str, &str)>> {
    let mut out = Vec::new();
    for (idx, arg) in args.iter().enumerate() {
        if arg == "--force" {
            let raw = args
                .get(idx + 1)
                .ok_or_else(|| anyhow!("--force needs <key>=<code>"))?;
            let (key, code) = raw
                .split_once('=')
                .ok_or_else(|| anyhow!("bad --force {raw:?}, expected <key>=<code>"))?;
            out.push((key, code));
        }
    }
    Ok(out)
}

fn parse_value_arg(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if arg == name {
            return args.get(idx + 1).cloned();
        }
        if let Some(rest) = arg.strip_prefix(&prefix) {
            return Some(rest.to_string());
        }
    }
    None
}

fn parse_path_arg(args: &[String], name: &str) -> Option<PathBuf> {
    parse_value_arg(args, name).map(PathBuf::from)
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|arg| arg == name)
}
