//! TUI layout and widget rendering.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, Gauge, Paragraph};

use super::runtime::App;
use super::style;

/// Renders the full TUI frame.
pub fn render(frame: &mut Frame, app: &App) {
    let gauge_rows = u16::try_from(app.substations().len()).unwrap_or(u16::MAX);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                            // header
            Constraint::Length(gauge_rows.saturating_mul(3)), // substations
            Constraint::Min(8),                               // chart
            Constraint::Length(5),                            // totals
            Constraint::Length(1),                            // footer
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_substations(frame, app, chunks[1]);
    render_chart(frame, app, chunks[2]);
    render_totals(frame, app, chunks[3]);
    render_footer(frame, chunks[4]);
}

/// Header bar: preset name, cycle progress, speed, run state.
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let (state_icon, state_label) = if app.error.is_some() {
        ("!", "ERROR")
    } else if app.is_finished() {
        ("■", "DONE")
    } else if app.paused {
        ("‖", "PAUSED")
    } else {
        ("▶", "RUNNING")
    };

    let header = Line::from(vec![
        Span::styled(
            " GRID-DR ",
            Style::default()
                .fg(style::HEADER_FG)
                .bg(style::HEADER_BG)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            &app.preset_name,
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            " │ cycle {}/{} │ {}ms │ {state_icon} {state_label} ",
            app.cycle(),
            app.total_cycles(),
            app.tick_interval_ms(),
        )),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

/// One utilization gauge per substation.
fn render_substations(frame: &mut Frame, app: &App, area: Rect) {
    let subs = app.substations();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(subs.iter().map(|_| Constraint::Length(3)))
        .split(area);

    for (sub, row) in subs.iter().zip(rows.iter()) {
        let state = if sub.is_online() { "ONLINE" } else { "OFFLINE" };
        let gauge = Gauge::default()
            .block(
                Block::default()
                    .title(format!(" {} [{state}] ", sub.id()))
                    .borders(Borders::ALL),
            )
            .gauge_style(Style::default().fg(style::load_color(sub.utilization(), sub.is_online())))
            .ratio(sub.utilization().clamp(0.0, 1.0))
            .label(format!("{:.1}/{:.1} MW", sub.used_mw(), sub.capacity_mw()));
        frame.render_widget(gauge, *row);
    }
}

/// Allocated vs shed MW per cycle.
fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let allocated: Vec<(f64, f64)> = app
        .history
        .iter()
        .map(|r| (r.cycle as f64, r.allocated_mw))
        .collect();
    let shed: Vec<(f64, f64)> = app
        .history
        .iter()
        .map(|r| (r.cycle as f64, r.shed_mw))
        .collect();

    let y_bounds = style::auto_bounds_y(&allocated, &shed);
    let x_lo = allocated.first().map_or(0.0, |p| p.0);
    let x_hi = allocated.last().map_or(1.0, |p| p.0).max(x_lo + 1.0);

    let datasets = vec![
        Dataset::default()
            .name("Allocated")
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(style::ALLOCATED_COLOR))
            .data(&allocated),
        Dataset::default()
            .name("Shed")
            .marker(symbols::Marker::Dot)
            .style(Style::default().fg(style::SHED_COLOR))
            .data(&shed),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(" Allocated vs Shed per Cycle ")
                .borders(Borders::ALL),
        )
        .x_axis(
            Axis::default()
                .title("cycle")
                .bounds([x_lo, x_hi])
                .labels(vec![format!("{x_lo:.0}"), format!("{x_hi:.0}")]),
        )
        .y_axis(
            Axis::default()
                .title("MW")
                .bounds(y_bounds)
                .labels(vec![
                    format!("{:.1}", y_bounds[0]),
                    format!("{:.1}", y_bounds[1]),
                ]),
        );

    frame.render_widget(chart, area);
}

/// Running totals and the latest cycle.
fn render_totals(frame: &mut Frame, app: &App, area: Rect) {
    let totals = app.totals();
    let mut lines = vec![Line::from(format!(
        "  allocated={} ({:.1} MW)  shed={} ({:.1} MW)",
        totals.allocated_count, totals.allocated_mw, totals.shed_count, totals.shed_mw,
    ))];
    match (app.last_record(), &app.error) {
        (_, Some(err)) => lines.push(Line::from(Span::styled(
            format!("  error: {err}"),
            Style::default().fg(style::SHED_COLOR),
        ))),
        (Some(r), None) => {
            lines.push(Line::from(format!(
                "  last: {} submitted, {} allocated, {} shed",
                r.submitted, r.allocated, r.shed
            )));
            let offline = if r.offline_substations.is_empty() {
                "none".to_string()
            } else {
                r.offline_substations.join(", ")
            };
            lines.push(Line::from(format!("  offline: {offline}")));
        }
        (None, None) => lines.push(Line::from("  Waiting for first cycle...")),
    }

    let block = Block::default().title(" Totals ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Footer with keybinding hints.
fn render_footer(frame: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(Span::styled(
        " q:Quit  Space:Pause  +/-:Speed  1/2/3:Preset  r:Restart",
        Style::default().fg(style::FOOTER_FG),
    )));
    frame.render_widget(footer, area);
}
