//! TUI layout and widget rendering.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph};

use super::runtime::App;
use super::style;
use crate::config::ScenarioConfig;
use crate::sim::types::TimestepRecord;

/// Renders the full TUI frame.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),   // header
            Constraint::Ratio(1, 3), // produced
            Constraint::Ratio(1, 3), // stored
            Constraint::Ratio(1, 3), // released
            Constraint::Length(4),   // status panel
            Constraint::Length(1),   // footer
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_produced(frame, app, chunks[1]);
    render_stored(frame, app, chunks[2]);
    render_released(frame, app, chunks[3]);
    render_status(frame, app, chunks[4]);
    render_footer(frame, chunks[5]);
}

/// Header bar: scenario label, controller, timestep progress, speed, run state.
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let (state_icon, state_label) = if app.is_finished() {
        ("■", "DONE")
    } else if app.paused {
        ("‖", "PAUSED")
    } else {
        ("▶", "RUNNING")
    };

    let header = Line::from(vec![
        Span::styled(
            " SOLAR-BESS ",
            Style::default()
                .fg(style::HEADER_FG)
                .bg(style::HEADER_BG)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(&app.label, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(
            " │ {} │ t={}/{} │ {}ms │ {} {} ",
            app.controller_name(),
            app.timestep,
            app.total_steps,
            app.tick_interval_ms(),
            state_icon,
            state_label,
        )),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

/// Converts one record field into chart points keyed by timestep.
fn points(app: &App, field: impl Fn(&TimestepRecord) -> f32) -> Vec<(f64, f64)> {
    app.history
        .iter()
        .map(|r| (r.timestep as f64, f64::from(field(r))))
        .collect()
}

fn x_bounds(app: &App) -> [f64; 2] {
    let lo = app.history.front().map_or(0.0, |r| r.timestep as f64);
    let hi = (app.total_steps.saturating_sub(1) as f64).max(lo + 1.0);
    [lo, hi]
}

fn line_dataset<'a>(name: &'a str, color: Color, data: &'a [(f64, f64)]) -> Dataset<'a> {
    Dataset::default()
        .name(name)
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(data)
}

fn chart<'a>(
    title: &'a str,
    unit: &'a str,
    datasets: Vec<Dataset<'a>>,
    x: [f64; 2],
    y: [f64; 2],
) -> Chart<'a> {
    Chart::new(datasets)
        .block(Block::default().title(title).borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .title("step")
                .bounds(x)
                .labels(vec![format!("{}", x[0] as u32), format!("{}", x[1] as u32)]),
        )
        .y_axis(
            Axis::default()
                .title(unit)
                .bounds(y)
                .labels(vec![format!("{:.1}", y[0]), format!("{:.1}", y[1])]),
        )
}

/// Produced energy per step, with demand for reference.
fn render_produced(frame: &mut Frame, app: &App, area: Rect) {
    let produced = points(app, |r| r.produced_kwh);
    let demand = points(app, |r| r.demand_kwh);
    let y = style::auto_bounds_y(&[produced.as_slice(), demand.as_slice()]);
    let datasets = vec![
        line_dataset("Produced", style::PRODUCED_COLOR, &produced),
        line_dataset("Demand", style::DEMAND_COLOR, &demand),
    ];
    frame.render_widget(
        chart(" Solar Production ", "kWh", datasets, x_bounds(app), y),
        area,
    );
}

/// Stored energy as a percentage of capacity.
fn render_stored(frame: &mut Frame, app: &App, area: Rect) {
    let stored = points(app, |r| r.soc * 100.0);
    let color = style::soc_color(app.battery_soc());
    let datasets = vec![line_dataset("Stored", color, &stored)];
    frame.render_widget(
        chart(" Battery Storage ", "%", datasets, x_bounds(app), [0.0, 100.0]),
        area,
    );
}

/// Energy released to the grid, with demand for reference.
fn render_released(frame: &mut Frame, app: &App, area: Rect) {
    let released = points(app, |r| r.released_kwh);
    let demand = points(app, |r| r.demand_kwh);
    let y = style::auto_bounds_y(&[released.as_slice(), demand.as_slice()]);
    let datasets = vec![
        line_dataset("Released", style::RELEASED_COLOR, &released),
        line_dataset("Demand", style::DEMAND_COLOR, &demand),
    ];
    frame.render_widget(
        chart(" Grid Release ", "kWh", datasets, x_bounds(app), y),
        area,
    );
}

/// Status panel showing the latest record and running shortfall totals.
fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let lines = if let Some(r) = app.last_record() {
        let (curtailed, unmet) = app.shortfall_totals();
        let unmet_style = if unmet > 0.0 {
            Style::default()
                .fg(style::UNMET_COLOR)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        vec![
            Line::from(format!(
                "  produced={:>7.2}  demand={:>7.2}  released={:>7.2}  stored={:>7.2} kWh",
                r.produced_kwh, r.demand_kwh, r.released_kwh, r.stored_after_kwh,
            )),
            Line::from(vec![
                Span::raw(format!("  curtailed total={curtailed:>7.2}  ")),
                Span::styled(format!("unmet total={unmet:>7.2}"), unmet_style),
            ]),
        ]
    } else {
        vec![Line::from("  Waiting for first step...")]
    };

    let block = Block::default().title(" Status ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Footer with keybinding hints.
fn render_footer(frame: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(Span::styled(
        format!(
            " q:Quit  Space:Pause  +/-:Speed  1-{}:Preset  r:Restart",
            ScenarioConfig::PRESETS.len()
        ),
        Style::default().fg(style::FOOTER_FG),
    )));
    frame.render_widget(footer, area);
}
