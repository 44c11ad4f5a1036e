//! Parlay CLI - Command-line interface for parlay generation

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use colored::{ColoredString, Colorize};
use dialoguer::{theme::ColorfulTheme, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use parlay::core::odds::{
    american_to_decimal, combine, combine_decimal, decimal_to_american, implied_probability,
    payout,
};
use parlay::data::{
    load_props, save_props, PropFeed, PropRecord, PropRegistry, PropSnapshot,
    SyntheticPropGenerator,
};
use parlay::{
    ConstraintSet, EngineConfig, ParlayEngine, ParlayResponse, RiskAssessment, RiskLevel, Sport,
    Tier,
};

/// Pool size used when no feed file is given
const DEFAULT_SYNTHETIC_POOL: usize = 200;
const DEFAULT_SEED: u64 = 42;

#[derive(Parser)]
#[command(name = "parlay")]
#[command(author, version, about = "Player-prop parlay builder CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Run in interactive mode
    #[arg(short, long)]
    interactive: bool,

    /// Engine configuration file (TOML); defaults to $PARLAY_CONFIG
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build one parlay
    Build(BuildArgs),

    /// Build several de-duplicated parlays for the same constraints
    Slate {
        #[command(flatten)]
        args: BuildArgs,

        /// Number of parlays to build
        #[arg(short, long, default_value = "3")]
        count: usize,
    },

    /// Show confidence scores for every prop in a feed
    Score {
        #[command(flatten)]
        source: PoolArgs,

        /// Number of props to show
        #[arg(long, default_value = "25")]
        top: usize,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Generate a seeded synthetic prop feed
    Synth {
        #[arg(short, long)]
        sport: Sport,

        /// Number of props
        #[arg(short, long, default_value = "100")]
        count: usize,

        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,

        /// Write the feed here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Odds arithmetic
    Odds {
        #[command(subcommand)]
        action: OddsCommand,
    },
}

#[derive(Subcommand)]
enum OddsCommand {
    /// Show decimal odds and implied probability for American odds
    Convert {
        #[arg(allow_negative_numbers = true)]
        odds: i32,
    },

    /// Combine American odds into one parlay price
    Combine {
        #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
        odds: Vec<i32>,
    },
}

/// Where the candidate pool comes from
#[derive(Args, Clone)]
struct PoolArgs {
    #[arg(short, long)]
    sport: Sport,

    /// Prop feed JSON file; a seeded synthetic pool is used when omitted
    #[arg(short, long)]
    props: Option<PathBuf>,

    /// Seed for the synthetic pool
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
}

#[derive(Args, Clone)]
struct BuildArgs {
    #[command(flatten)]
    source: PoolArgs,

    /// Confidence tier: free, premium or goat
    #[arg(short, long)]
    tier: Option<Tier>,

    /// Target combined American odds, e.g. 2500
    #[arg(long, allow_negative_numbers = true)]
    target_odds: Option<i32>,

    /// Target total return on the reference stake
    #[arg(long, conflicts_with = "target_odds")]
    target_payout: Option<f64>,

    #[arg(long)]
    min_legs: Option<usize>,

    #[arg(long)]
    max_legs: Option<usize>,

    /// Minimum leg hit rate (0-1)
    #[arg(long)]
    min_hit_rate: Option<f64>,

    /// Minimum leg confidence (0-100)
    #[arg(long)]
    min_confidence: Option<f64>,

    /// Risk appetite: low, medium or high
    #[arg(long)]
    risk: Option<RiskLevel>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

impl BuildArgs {
    fn constraints(&self) -> ConstraintSet {
        ConstraintSet {
            sport: self.source.sport,
            tier: self.tier,
            target_odds: self.target_odds,
            target_payout: self.target_payout,
            max_legs: self.max_legs,
            min_legs: self.min_legs,
            min_hit_rate: self.min_hit_rate,
            min_confidence: self.min_confidence,
            risk_level: self.risk,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;
    let engine = load_engine(cli.config.as_deref())?;

    if cli.interactive {
        println!("{}", "Parlay CLI v0.1.0".cyan().bold());
        println!();
        run_interactive(&engine)?;
    } else if let Some(command) = cli.command {
        match command {
            Commands::Build(args) => run_build(&engine, &args)?,
            Commands::Slate { args, count } => run_slate(&engine, &args, count)?,
            Commands::Score { source, top, json } => run_score(&engine, &source, top, json)?,
            Commands::Synth {
                sport,
                count,
                seed,
                output,
            } => run_synth(sport, count, seed, output.as_deref())?,
            Commands::Odds { action } => match action {
                OddsCommand::Convert { odds } => run_convert(odds)?,
                OddsCommand::Combine { odds } => run_combine(&engine, &odds)?,
            },
        }
    } else {
        println!("Use --help for usage information or --interactive for interactive mode.");
    }

    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

fn load_engine(config_path: Option<&Path>) -> Result<ParlayEngine> {
    let config = match config_path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => EngineConfig::from_env().context("Failed to load config from $PARLAY_CONFIG")?,
    };
    ParlayEngine::new(config).context("Invalid engine configuration")
}

fn load_snapshot(engine: &ParlayEngine, source: &PoolArgs) -> Result<PropSnapshot> {
    let props = match &source.props {
        Some(path) => load_props(path, source.sport, &PropRegistry::default())
            .with_context(|| format!("Failed to load props from {:?}", path))?,
        None => SyntheticPropGenerator::new(source.seed)
            .generate(source.sport, DEFAULT_SYNTHETIC_POOL),
    };

    if props.is_empty() {
        bail!("No {} props found", source.sport);
    }

    engine
        .snapshot(source.sport, &props)
        .context("Prop feed rejected")
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn run_build(engine: &ParlayEngine, args: &BuildArgs) -> Result<()> {
    let snapshot = load_snapshot(engine, &args.source)?;
    let constraints = args.constraints();

    let (response, outcome) = engine
        .generate_with_report(&snapshot, &constraints)
        .context("Failed to build parlay")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    print_response(engine, &response);
    if let Some(met) = outcome.target_met {
        println!(
            "{} {} after {} substitution attempt(s)",
            "Target:".dimmed(),
            if met { "met".green() } else { "missed".red() },
            outcome.attempts
        );
    }

    Ok(())
}

fn run_slate(engine: &ParlayEngine, args: &BuildArgs, count: usize) -> Result<()> {
    let snapshot = load_snapshot(engine, &args.source)?;
    let constraints = args.constraints();

    let pb = if args.json {
        None
    } else {
        Some(spinner(&format!("Building {} parlays...", count))?)
    };
    let slate = engine.generate_slate(&snapshot, &constraints, count);
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let slate = slate.context("Failed to build slate")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&slate)?);
        return Ok(());
    }

    println!(
        "{} {} of {} parlays",
        "Slate:".green().bold(),
        slate.len(),
        count
    );
    println!();
    for (i, response) in slate.iter().enumerate() {
        println!("{}", format!("#{}", i + 1).bold());
        print_response(engine, response);
        println!();
    }

    Ok(())
}

fn run_score(engine: &ParlayEngine, source: &PoolArgs, top: usize, json: bool) -> Result<()> {
    let snapshot = load_snapshot(engine, source)?;

    let mut scored = snapshot.props().to_vec();
    scored.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    if json {
        let shown: Vec<_> = scored.iter().take(top).collect();
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    println!(
        "{} {} {} props (top {})",
        "Scoring".green(),
        snapshot.len(),
        snapshot.sport(),
        top.min(snapshot.len())
    );
    println!();
    println!(
        "{:<22} {:<18} {:>7} {:>6} {:>6} {:>6} {:>8}",
        "Player", "Prop", "Line", "Odds", "Hit%", "Form", "Conf"
    );
    println!("{}", "-".repeat(80));

    let classifier = engine.builder().classifier();
    for s in scored.iter().take(top) {
        let form = s
            .prop
            .recent_form_rate()
            .map(|r| format!("{:.0}%", r * 100.0))
            .unwrap_or_else(|| "-".to_string());
        let conf = format!("{:.1}", s.confidence);
        println!(
            "{:<22} {:<18} {:>7.1} {:>6} {:>5.1}% {:>6} {:>8}",
            truncate_name(&s.prop.player_name, 22),
            truncate_name(s.prop.prop_type.as_str(), 18),
            s.prop.line,
            format!("{:+}", s.prop.selected_odds()),
            s.prop.hit_rate * 100.0,
            form,
            tier_color(classifier.classify(s.confidence), &conf)
        );
    }

    Ok(())
}

fn run_synth(sport: Sport, count: usize, seed: u64, output: Option<&Path>) -> Result<()> {
    let props = SyntheticPropGenerator::new(seed).generate(sport, count);
    let feed = PropFeed {
        sport,
        generated_at: Some(Utc::now().to_rfc3339()),
        props: props.into_iter().map(PropRecord::from).collect(),
    };

    match output {
        Some(path) => {
            save_props(path, &feed).with_context(|| format!("Failed to write {:?}", path))?;
            println!(
                "{} Wrote {} {} props to {:?} (seed {})",
                "✓".green(),
                feed.props.len(),
                sport,
                path,
                seed
            );
        }
        None => println!("{}", serde_json::to_string_pretty(&feed)?),
    }

    Ok(())
}

fn run_convert(odds: i32) -> Result<()> {
    let decimal = american_to_decimal(odds)?;
    let probability = implied_probability(odds)?;

    println!("{:<20} {:+}", "American:", odds);
    println!("{:<20} {:.4}", "Decimal:", decimal);
    println!("{:<20} {:.2}%", "Implied probability:", probability * 100.0);
    println!("{:<20} {:+}", "Round trip:", decimal_to_american(decimal)?);
    Ok(())
}

fn run_combine(engine: &ParlayEngine, odds: &[i32]) -> Result<()> {
    let decimal = combine_decimal(odds)?;
    let american = combine(odds)?;
    let stake = engine.config().payout.reference_stake;

    println!(
        "{:<20} {}",
        "Legs:",
        odds.iter()
            .map(|o| format!("{:+}", o))
            .collect::<Vec<_>>()
            .join(" × ")
    );
    println!("{:<20} {:.4}", "Decimal:", decimal);
    println!("{:<20} {}", "American:", format!("{:+}", american).bold());
    println!("{:<20} {:.2}%", "Implied probability:", 100.0 / decimal);
    println!(
        "{:<20} ${:.2} on ${:.2}",
        "Payout:",
        payout(american, stake)?,
        stake
    );
    Ok(())
}

fn print_response(engine: &ParlayEngine, response: &ParlayResponse) {
    let parlay = &response.parlay;
    let analysis = &response.analysis;

    println!(
        "{} {}",
        tier_color(parlay.tier(), &format!("[{}]", parlay.tier())).bold(),
        parlay.description().bold()
    );
    println!(
        "{:>3} {:<22} {:<5} {:<18} {:<6} {:>7} {:>6} {:>6} {:>6}",
        "#", "Player", "Team", "Prop", "Side", "Line", "Odds", "Hit%", "Conf"
    );
    println!("{}", "-".repeat(86));

    for (i, leg) in parlay.legs().iter().enumerate() {
        println!(
            "{:>3} {:<22} {:<5} {:<18} {:<6} {:>7.1} {:>6} {:>5.1}% {:>6.1}",
            i + 1,
            truncate_name(&leg.prop.player_name, 22),
            leg.prop.team,
            truncate_name(leg.prop.prop_type.as_str(), 18),
            leg.selection,
            leg.prop.line,
            format!("{:+}", leg.odds),
            leg.hit_rate() * 100.0,
            leg.confidence
        );
    }
    println!("{}", "-".repeat(86));

    let stake = engine.config().payout.reference_stake;
    println!(
        "{:<20} {}",
        "Total odds:",
        format!("{:+}", parlay.total_odds()).bold()
    );
    println!(
        "{:<20} ${:.2} on ${:.2}",
        "Expected payout:",
        parlay.expected_payout(),
        stake
    );
    println!(
        "{:<20} {:.1}%",
        "Confidence:",
        parlay.overall_confidence()
    );
    println!(
        "{:<20} {:.2}%",
        "Expected hit rate:",
        analysis.expected_hit_rate * 100.0
    );
    println!(
        "{:<20} {}",
        "Risk:",
        risk_color(analysis.risk_assessment)
    );
    if let Ok(bounds) = engine.builder().classifier().bounds_for(parlay.tier()) {
        println!(
            "{:<20} {}-{} legs, {:.0}+ confidence",
            "Tier requirements:",
            bounds.min_legs,
            bounds.max_legs,
            bounds.min_confidence
        );
    }
    for factor in engine.analyzer().key_factors(parlay.legs()) {
        println!("  - {}", factor);
    }
    println!("{}", analysis.recommendation);
    if let Some(note) = parlay.note() {
        println!("{}", note.dimmed());
    }
}

fn run_interactive(engine: &ParlayEngine) -> Result<()> {
    println!("{}", "Interactive mode".green().bold());
    println!("Choose 'Quit' to exit.\n");

    let theme = ColorfulTheme::default();
    let sports: Vec<&str> = Sport::ALL.iter().map(|s| s.as_str()).collect();

    loop {
        let options = vec![
            "Build a tier parlay",
            "Build to a target payout",
            "Score props",
            "Quit",
        ];

        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(&options)
            .default(0)
            .interact()?;

        if selection == 3 {
            println!("Goodbye!");
            break;
        }

        let sport = Sport::ALL[Select::with_theme(&theme)
            .with_prompt("Sport")
            .items(&sports)
            .default(0)
            .interact()?];

        let props: String = Input::with_theme(&theme)
            .with_prompt("Prop feed file (blank for a synthetic pool)")
            .allow_empty(true)
            .interact_text()?;

        let source = PoolArgs {
            sport,
            props: (!props.trim().is_empty()).then(|| PathBuf::from(props.trim())),
            seed: DEFAULT_SEED,
        };
        let mut args = BuildArgs {
            source: source.clone(),
            tier: None,
            target_odds: None,
            target_payout: None,
            min_legs: None,
            max_legs: None,
            min_hit_rate: None,
            min_confidence: None,
            risk: None,
            json: false,
        };

        println!();
        let result = match selection {
            0 => {
                let tiers: Vec<&str> = Tier::RANKED.iter().map(|t| t.as_str()).collect();
                let tier = Select::with_theme(&theme)
                    .with_prompt("Tier")
                    .items(&tiers)
                    .default(0)
                    .interact()?;
                args.tier = Some(Tier::RANKED[tier]);
                run_build(engine, &args)
            }
            1 => {
                let target: f64 = Input::with_theme(&theme)
                    .with_prompt(format!(
                        "Target payout on ${:.2}",
                        engine.config().payout.reference_stake
                    ))
                    .default(250.0)
                    .interact_text()?;
                args.target_payout = Some(target);
                run_build(engine, &args)
            }
            _ => run_score(engine, &source, 25, false),
        };

        // a failed build is reported and the session continues
        if let Err(e) = result {
            println!("{} {:#}", "Error:".red().bold(), e);
        }
        println!();
    }

    Ok(())
}

fn tier_color(tier: Tier, text: &str) -> ColoredString {
    match tier {
        Tier::Goat => text.magenta(),
        Tier::Premium => text.yellow(),
        Tier::Free => text.green(),
        Tier::Unranked => text.dimmed(),
    }
}

fn risk_color(risk: RiskAssessment) -> ColoredString {
    let label = risk.to_string();
    match risk {
        RiskAssessment::Low => label.green(),
        RiskAssessment::Moderate => label.yellow(),
        RiskAssessment::High => label.red(),
    }
}

/// Truncate name to max length (character-based)
fn truncate_name(name: &str, max_len: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_len {
        name.to_string()
    } else {
        chars[..max_len - 1].iter().collect::<String>() + "…"
    }
}
