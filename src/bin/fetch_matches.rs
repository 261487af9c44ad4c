use anyhow::{Result, anyhow};

use mlbb_playoff_odds::config::SimConfig;
use mlbb_playoff_odds::match_fetch::{MatchSource, api_key_from_env, fetch_tournament_matches};
use mlbb_playoff_odds::match_parse::{parse_matches, regular_season};
use mlbb_playoff_odds::tournaments::{TOURNAMENTS, Tournament, find_tournament};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("failed to init logging: {err}"))?;

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let targets = resolve_targets(&args)?;
    if targets.is_empty() {
        return Err(anyhow!("no tournaments selected (names, --live or --all)"));
    }

    let api_key = api_key_from_env();
    if api_key.is_none() {
        eprintln!("LIQUIPEDIA_API_KEY not set; only cached data will be used");
    }
    let aliases = SimConfig::default().team_aliases();

    let mut failures = 0usize;
    for t in targets {
        match fetch_tournament_matches(t.path, api_key.as_deref()) {
            Ok(fetched) => {
                let source = match fetched.source {
                    MatchSource::Live => "live",
                    MatchSource::Cache => "cache",
                };
                match parse_matches(&fetched.records, &aliases, Some(t.path)) {
                    Ok(matches) => println!(
                        "{}: {} records, {} parsed, {} regular season ({source})",
                        t.name,
                        fetched.records.len(),
                        matches.len(),
                        regular_season(&matches).len()
                    ),
                    Err(err) => {
                        failures += 1;
                        println!("{}: parse failed: {err}", t.name);
                    }
                }
            }
            Err(err) => {
                failures += 1;
                println!("{}: fetch failed: {err:#}", t.name);
            }
        }
    }

    if failures > 0 {
        return Err(anyhow!("{failures} tournament(s) failed"));
    }
    Ok(())
}

fn resolve_targets(args: &[String]) -> Result<Vec<&'static Tournament>> {
    if args.iter().any(|a| a == "--all") {
        return Ok(TOURNAMENTS.iter().collect());
    }
    if args.iter().any(|a| a == "--live") {
        return Ok(TOURNAMENTS.iter().filter(|t| t.live).collect());
    }
    args.iter()
        .map(|name| find_tournament(name).ok_or_else(|| anyhow!("unknown tournament {name:?}")))
        .collect()
}
