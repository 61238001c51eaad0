mod ui;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chrono::NaiveTime;
use clap::{Parser, Subcommand};

use epg_grid::clock::{Clock, FixedClock, SystemClock};
use epg_grid::config::{CardConfig, DEFAULT_ROW_HEIGHT, resolve_config_path, resolve_states_path};
use epg_grid::storage::{load_config, load_states, save_config};
use epg_grid::tracing_ext::init_tracing;
use epg_grid::{EpgCard, TimeOfDay};

use crate::ui::{print_grid, run_dashboard};

#[derive(Debug, Parser)]
#[command(name = "epg-grid", version, about = "Electronic program guide grid for the terminal")]
struct Cli {
	/// Card config (TOML)
	#[arg(long, global = true)]
	config: Option<PathBuf>,
	/// Entity states exported by the host (JSON)
	#[arg(long, global = true)]
	states: Option<PathBuf>,
	/// Use this time of day instead of the wall clock (HH:MM)
	#[arg(long, global = true)]
	at: Option<String>,
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Write a new card config
	Init {
		#[arg(long = "entity", required = true)]
		entities: Vec<String>,
		#[arg(long, default_value_t = DEFAULT_ROW_HEIGHT)]
		row_height: u32,
	},
	/// Interactive grid (default)
	Dashboard,
	/// Print timeline and program columns as text
	Print,
	/// Print the grid layout as JSON
	Json {
		#[arg(long)]
		pretty: bool,
	},
	/// Validate the card config
	Check,
}

fn main() {
	init_tracing();

	if let Err(err) = run() {
		eprintln!("error: {err:#}");
		std::process::exit(1);
	}
}

fn run() -> anyhow::Result<()> {
	let cli = Cli::parse();
	let config_path = resolve_config_path(cli.config);
	let clock: Box<dyn Clock> = match cli.at.as_deref() {
		Some(raw) => Box::new(FixedClock(parse_at(raw)?)),
		None => Box::new(SystemClock),
	};

	match cli.command.unwrap_or(Command::Dashboard) {
		Command::Init { entities, row_height } => {
			if config_path.exists() {
				bail!("config already exists at {}", config_path.display());
			}
			let config = CardConfig::new(entities)?.with_row_height(row_height);
			save_config(&config_path, &config)?;
			println!("initialized card config at {}", config_path.display());
		}
		Command::Check => {
			let config = load_config(&config_path)
				.with_context(|| format!("invalid config {}", config_path.display()))?;
			let card = EpgCard::new(config)?;
			println!(
				"ok: {} entities | row height {} | card size {}",
				card.config().entities.len(),
				card.config().row_height,
				card.card_size()
			);
		}
		Command::Dashboard => {
			let mut card = EpgCard::new(load_config(&config_path)?)?;
			let states_path = resolve_states_path(cli.states)?;
			run_dashboard(&mut card, &config_path, &states_path, clock.as_ref())?;
		}
		Command::Print => {
			let card = load_card(&config_path, cli.states)?;
			let now = clock.now();
			print_grid(&card.layout(now), now);
		}
		Command::Json { pretty } => {
			let card = load_card(&config_path, cli.states)?;
			let layout = card.layout(clock.now());
			let output = if pretty {
				serde_json::to_string_pretty(&layout)?
			} else {
				serde_json::to_string(&layout)?
			};
			println!("{output}");
		}
	}

	Ok(())
}

fn load_card(config_path: &Path, states: Option<PathBuf>) -> anyhow::Result<EpgCard> {
	let mut card = EpgCard::new(load_config(config_path)?)?;
	let states_path = resolve_states_path(states)?;
	let states = load_states(&states_path)
		.with_context(|| format!("failed to load states from {}", states_path.display()))?;
	card.update(&states);
	Ok(card)
}

fn parse_at(raw: &str) -> anyhow::Result<NaiveTime> {
	let time = TimeOfDay::parse_start(raw)?;
	NaiveTime::from_hms_opt(time.hour(), time.minute(), 0)
		.with_context(|| format!("invalid time of day: {raw}"))
}
