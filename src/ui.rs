use std::io;
use std::path::Path;
use std::time::Duration as StdDuration;

use chrono::NaiveTime;
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEventKind};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use crossterm::{ExecutableCommand, execute};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use tracing::warn;

use epg_grid::card::{EpgCard, GridLayout, PlacedProgram, UpdateOutcome};
use epg_grid::clock::Clock;
use epg_grid::storage::{load_config, load_states};

const NO_DATA_MESSAGE: &str = "Error: No valid EPG data found.";
const PIXELS_PER_LINE: u32 = 25;
const CHANNEL_NAME_PERCENT: u16 = 10;
const PROGRAM_COLOR: Color = Color::Gray;
const SELECTED_PROGRAM_COLOR: Color = Color::Rgb(0, 86, 179);
const HEADER_BORDER_COLOR: Color = Color::DarkGray;

pub fn run_dashboard(
	card: &mut EpgCard,
	config_path: &Path,
	states_path: &Path,
	clock: &dyn Clock,
) -> anyhow::Result<()> {
	enable_raw_mode()?;
	let mut stdout = io::stdout();
	stdout.execute(EnterAlternateScreen)?;
	let backend = CrosstermBackend::new(stdout);
	let mut terminal = Terminal::new(backend)?;

	let result = run_event_loop(&mut terminal, card, config_path, states_path, clock);

	disable_raw_mode()?;
	execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
	terminal.show_cursor()?;

	result
}

fn run_event_loop(
	terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
	card: &mut EpgCard,
	config_path: &Path,
	states_path: &Path,
	clock: &dyn Clock,
) -> anyhow::Result<()> {
	let mut app = App::default();

	loop {
		match load_states(states_path) {
			Ok(states) => {
				let outcome = card.update(&states);
				if let Some(status) = update_status(outcome, card) {
					app.status = status;
				}
			}
			Err(err) => {
				warn!(path = %states_path.display(), %err, "failed to reload entity states");
				app.status = format!("Failed to reload states: {err}");
			}
		}

		let now = clock.now();
		let layout = card.layout(now);
		app.clamp_selection(&layout);
		terminal.draw(|frame| draw_grid(frame, &app, &layout, now))?;

		if event::poll(StdDuration::from_millis(250))? {
			if let CEvent::Key(key) = event::read()? {
				if key.kind != KeyEventKind::Press {
					continue;
				}

				if handle_key(&mut app, key.code, card, config_path, &layout) {
					break;
				}
			}
		}
	}

	Ok(())
}

fn handle_key(app: &mut App, code: KeyCode, card: &mut EpgCard, config_path: &Path, layout: &GridLayout) -> bool {
	match code {
		KeyCode::Char('q') => true,
		KeyCode::Esc => {
			if app.show_detail {
				app.show_detail = false;
				false
			} else {
				true
			}
		}
		KeyCode::Enter => {
			app.show_detail = app.selected_program(layout).is_some() && !app.show_detail;
			false
		}
		KeyCode::Up | KeyCode::Char('k') => {
			app.move_channel(-1, layout);
			false
		}
		KeyCode::Down | KeyCode::Char('j') => {
			app.move_channel(1, layout);
			false
		}
		KeyCode::Left | KeyCode::Char('h') => {
			app.move_program(-1, layout);
			false
		}
		KeyCode::Right | KeyCode::Char('l') => {
			app.move_program(1, layout);
			false
		}
		KeyCode::Char('r') => {
			app.status = match load_config(config_path).and_then(|config| card.set_config(config)) {
				Ok(()) => format!("Reloaded {}", config_path.display()),
				Err(err) => format!("Config not reloaded: {err}"),
			};
			false
		}
		_ => false,
	}
}

/// Footer text after an update, or `None` to keep the current one.
fn update_status(outcome: UpdateOutcome, card: &EpgCard) -> Option<String> {
	if !outcome.needs_redraw() {
		return None;
	}
	match outcome {
		UpdateOutcome::Rebuilt => Some(format!("Loaded {} channel(s)", card.snapshot().len())),
		_ => Some(format!("Applied config for {} entities", card.config().entities.len())),
	}
}

fn draw_grid(frame: &mut Frame, app: &App, layout: &GridLayout, now: NaiveTime) {
	let areas = Layout::default()
		.direction(Direction::Vertical)
		.constraints([Constraint::Min(4), Constraint::Length(4)])
		.split(frame.area());

	let block = Block::default()
		.borders(Borders::ALL)
		.title(format!("Program Guide | {}", now.format("%H:%M")));
	let inner = block.inner(areas[0]);
	frame.render_widget(block, areas[0]);

	if layout.is_empty() {
		frame.render_widget(Paragraph::new(NO_DATA_MESSAGE), inner);
	} else {
		render_timeline_header(frame, inner, layout);
		render_channel_rows(frame, inner, app, layout);
	}
	render_footer(frame, areas[1], app);

	if app.show_detail {
		if let Some(placed) = app.selected_program(layout) {
			render_detail_popup(frame, placed);
		}
	}
}

fn render_timeline_header(frame: &mut Frame, area: Rect, layout: &GridLayout) {
	let grid = grid_area(area);
	for (index, label) in layout.timeline.labels().iter().enumerate() {
		let column = index as i64 + 1;
		let x = column_x(grid, layout.column_count, column);
		let width = column_x(grid, layout.column_count, column + 1).saturating_sub(x);
		if width == 0 {
			continue;
		}
		let cell = Rect::new(x, grid.y, width, 1);
		let text = Paragraph::new(label.to_string())
			.alignment(Alignment::Center)
			.style(Style::default().add_modifier(Modifier::BOLD));
		frame.render_widget(text, cell);
	}

	if area.height > 1 {
		let rule = Paragraph::new("─".repeat(area.width as usize)).style(Style::default().fg(HEADER_BORDER_COLOR));
		frame.render_widget(rule, Rect::new(area.x, area.y + 1, area.width, 1));
	}
}

fn render_channel_rows(frame: &mut Frame, area: Rect, app: &App, layout: &GridLayout) {
	let row_lines = row_lines(layout.row_height);
	let rows_top = area.y + 2;
	let rows_height = area.height.saturating_sub(2);
	let visible_rows = usize::from((rows_height / row_lines).max(1));
	let first_row = app.channel_index.saturating_sub(visible_rows - 1);
	let name_width = name_width(area);
	let grid = grid_area(area);

	for (offset, channel) in layout.channels.iter().skip(first_row).take(visible_rows).enumerate() {
		let channel_index = first_row + offset;
		let y = rows_top + offset as u16 * row_lines;
		let height = row_lines.min((area.y + area.height).saturating_sub(y));
		if height == 0 {
			break;
		}

		let name_style = if channel_index == app.channel_index {
			Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
		} else {
			Style::default().add_modifier(Modifier::BOLD)
		};
		let name = Paragraph::new(channel.name.clone())
			.alignment(Alignment::Right)
			.style(name_style)
			.wrap(Wrap { trim: true });
		frame.render_widget(name, Rect::new(area.x, y, name_width.saturating_sub(1), height));

		for (program_index, placed) in channel.programs.iter().enumerate() {
			let Some(span) = placed.span.clip(layout.column_count) else {
				continue;
			};
			let x = column_x(grid, layout.column_count, span.start);
			let width = column_x(grid, layout.column_count, span.end).saturating_sub(x);
			if width == 0 {
				continue;
			}

			let selected = channel_index == app.channel_index && program_index == app.program_index;
			let background = if selected { SELECTED_PROGRAM_COLOR } else { PROGRAM_COLOR };
			let block = Paragraph::new(placed.program.title.clone())
				.alignment(Alignment::Center)
				.wrap(Wrap { trim: true })
				.style(Style::default().fg(Color::White).bg(background))
				.block(Block::default().borders(Borders::LEFT).border_style(Style::default().fg(Color::Black)));
			frame.render_widget(block, Rect::new(x, y, width, height));
		}
	}
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
	let footer_lines = vec![
		Line::from("arrows/hjkl move | Enter program details | r reload config | q quit"),
		Line::from(app.status.clone()),
	];
	let footer = Paragraph::new(footer_lines).block(Block::default().borders(Borders::ALL).title("Shortcuts"));
	frame.render_widget(footer, area);
}

fn render_detail_popup(frame: &mut Frame, placed: &PlacedProgram) {
	let area = centered_rect(50, 40, frame.area());
	frame.render_widget(Clear, area);

	let program = &placed.program;
	let lines = vec![
		Line::styled(program.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
		Line::from(program.description.clone()),
		Line::from(format!("{} - {}", program.start, program.end)),
	];
	let popup = Paragraph::new(lines)
		.wrap(Wrap { trim: true })
		.block(Block::default().borders(Borders::ALL).title("Program"));
	frame.render_widget(popup, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
	let popup_layout = Layout::default()
		.direction(Direction::Vertical)
		.constraints([
			Constraint::Percentage((100 - percent_y) / 2),
			Constraint::Percentage(percent_y),
			Constraint::Percentage((100 - percent_y) / 2),
		])
		.split(area);
	Layout::default()
		.direction(Direction::Horizontal)
		.constraints([
			Constraint::Percentage((100 - percent_x) / 2),
			Constraint::Percentage(percent_x),
			Constraint::Percentage((100 - percent_x) / 2),
		])
		.split(popup_layout[1])[1]
}

/// Row height in terminal lines for a pixel height from the card config.
fn row_lines(row_height: u32) -> u16 {
	u16::try_from((row_height / PIXELS_PER_LINE).max(1)).unwrap_or(u16::MAX)
}

fn name_width(area: Rect) -> u16 {
	area.width * CHANNEL_NAME_PERCENT / 100
}

fn grid_area(area: Rect) -> Rect {
	let name_width = name_width(area);
	Rect::new(area.x + name_width, area.y, area.width.saturating_sub(name_width), area.height)
}

/// Left edge of a 1-indexed column. `column_count + 1` is the right edge of the grid.
fn column_x(grid: Rect, column_count: usize, column: i64) -> u16 {
	if column_count == 0 {
		return grid.x;
	}
	let column = (column - 1).clamp(0, column_count as i64) as u64;
	let offset = column * u64::from(grid.width) / column_count as u64;
	grid.x + offset as u16
}

#[derive(Debug, Clone)]
struct App {
	channel_index: usize,
	program_index: usize,
	show_detail: bool,
	status: String,
}

impl Default for App {
	fn default() -> Self {
		Self {
			channel_index: 0,
			program_index: 0,
			show_detail: false,
			status: "Ready".to_string(),
		}
	}
}

impl App {
	fn clamp_selection(&mut self, layout: &GridLayout) {
		if layout.channels.is_empty() {
			self.channel_index = 0;
			self.program_index = 0;
			self.show_detail = false;
			return;
		}

		self.channel_index = self.channel_index.min(layout.channels.len() - 1);
		let programs = layout.channels[self.channel_index].programs.len();
		self.program_index = self.program_index.min(programs.saturating_sub(1));
		if programs == 0 {
			self.show_detail = false;
		}
	}

	fn move_channel(&mut self, delta: i32, layout: &GridLayout) {
		if layout.channels.is_empty() {
			return;
		}

		if delta > 0 {
			self.channel_index = (self.channel_index + delta as usize).min(layout.channels.len() - 1);
		} else {
			self.channel_index = self.channel_index.saturating_sub(delta.unsigned_abs() as usize);
		}
		self.program_index = 0;
		self.show_detail = false;
	}

	fn move_program(&mut self, delta: i32, layout: &GridLayout) {
		let Some(channel) = layout.channels.get(self.channel_index) else {
			return;
		};
		if channel.programs.is_empty() {
			return;
		}

		if delta > 0 {
			self.program_index = (self.program_index + delta as usize).min(channel.programs.len() - 1);
		} else {
			self.program_index = self.program_index.saturating_sub(delta.unsigned_abs() as usize);
		}
	}

	fn selected_program<'a>(&self, layout: &'a GridLayout) -> Option<&'a PlacedProgram> {
		layout
			.channels
			.get(self.channel_index)
			.and_then(|channel| channel.programs.get(self.program_index))
	}
}

pub fn print_grid(layout: &GridLayout, now: NaiveTime) {
	if layout.is_empty() {
		println!("{NO_DATA_MESSAGE}");
		return;
	}

	let labels = layout
		.timeline
		.labels()
		.iter()
		.map(ToString::to_string)
		.collect::<Vec<_>>();
	println!("now {} | {} columns", now.format("%H:%M"), layout.column_count);
	println!("{}", labels.join(" "));

	for channel in &layout.channels {
		println!("\n{}", channel.name);
		if channel.programs.is_empty() {
			println!("  (no programs)");
		}
		for placed in &channel.programs {
			let program = &placed.program;
			println!(
				"  {} - {} | columns {:>3} / {:<3} | {}",
				program.start, program.end, placed.span.start, placed.span.end, program.title
			);
		}
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use chrono::NaiveTime;
	use ratatui::Terminal;
	use ratatui::backend::TestBackend;
	use ratatui::layout::Rect;

	use epg_grid::card::{EpgCard, GridLayout, UpdateOutcome};
	use epg_grid::config::CardConfig;
	use epg_grid::domain::EpgSnapshot;
	use epg_grid::schedule::build_snapshot;
	use epg_grid::{EntityState, TimeOfDay};

	use super::{App, NO_DATA_MESSAGE, column_x, draw_grid, row_lines, update_status};

	fn rendered(layout: &GridLayout, now: NaiveTime) -> String {
		let mut terminal = Terminal::new(TestBackend::new(120, 30)).expect("test terminal");
		let app = App::default();
		terminal
			.draw(|frame| draw_grid(frame, &app, layout, now))
			.expect("draw should succeed");
		terminal
			.backend()
			.buffer()
			.content()
			.iter()
			.map(|cell| cell.symbol())
			.collect()
	}

	#[test]
	fn converts_pixel_rows_to_lines() {
		assert_eq!(row_lines(100), 4);
		assert_eq!(row_lines(10), 1);
		assert_eq!(row_lines(0), 1);
	}

	#[test]
	fn columns_split_grid_width_evenly() {
		let grid = Rect::new(10, 0, 100, 5);
		assert_eq!(column_x(grid, 10, 1), 10);
		assert_eq!(column_x(grid, 10, 2), 20);
		assert_eq!(column_x(grid, 10, 11), 110);
		assert_eq!(column_x(grid, 10, -4), 10);
		assert_eq!(column_x(grid, 10, 40), 110);
	}

	#[test]
	fn empty_snapshot_shows_no_data_message() {
		let now = NaiveTime::from_hms_opt(9, 0, 0).expect("valid time");
		let layout = GridLayout::new(&EpgSnapshot::new(), now, 100);
		assert!(rendered(&layout, now).contains(NO_DATA_MESSAGE));
	}

	#[test]
	fn draws_channel_names_and_timeline() {
		let mut entity = EntityState::default();
		entity.attributes.friendly_name = Some("News".to_string());
		entity.attributes.today = Some(
			[("21:00".to_string(), Default::default())]
				.into_iter()
				.collect(),
		);
		let states = HashMap::from([("sensor.news".to_string(), entity)]);
		let snapshot = build_snapshot(&["sensor.news".to_string()], &states);

		let now = NaiveTime::from_hms_opt(20, 0, 0).expect("valid time");
		let screen = rendered(&GridLayout::new(&snapshot, now, 50), now);
		assert!(screen.contains("News"));
		assert!(screen.contains("20:00"));
		assert!(screen.contains(&TimeOfDay::new(0, 30).expect("valid label").to_string()));
	}

	#[test]
	fn status_follows_update_outcome() {
		let mut entity = EntityState::default();
		entity.attributes.today = Some(Default::default());
		let states = HashMap::from([("sensor.tv1".to_string(), entity)]);
		let config = CardConfig::new(vec!["sensor.tv1".to_string()]).expect("valid config");
		let mut card = EpgCard::new(config.clone()).expect("valid card");

		let outcome = card.update(&states);
		assert_eq!(outcome, UpdateOutcome::Rebuilt);
		assert_eq!(update_status(outcome, &card).as_deref(), Some("Loaded 1 channel(s)"));

		card.set_config(config.with_row_height(50)).expect("valid config");
		let outcome = card.update(&states);
		assert_eq!(outcome, UpdateOutcome::Redraw);
		assert_eq!(update_status(outcome, &card).as_deref(), Some("Applied config for 1 entities"));

		assert_eq!(update_status(card.update(&states), &card), None);
	}
}
