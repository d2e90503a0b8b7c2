// Terminal rendering of the dashboard page
use crate::application::charts::{ChartConfig, ChartKind};
use crate::application::dashboard_service::DashboardService;
use crate::domain::dashboard::{kpi, palette, DetailRow, NotificationKind, Rgb, WidgetKind};
use crate::domain::format::format_cost;
use crate::domain::resources::Granularity;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Cell, Chart, Clear, Dataset, GraphType, Paragraph, Row, Table,
        TableState, Wrap,
    },
    Frame,
};

/// KPI rows shown in each summary panel: label and element id
const COMPUTE_KPIS: [(&str, &str); 3] = [
    ("Total", kpi::EC2_TOTAL),
    ("Running", kpi::EC2_RUNNING),
    ("Stopped", kpi::EC2_STOPPED),
];
const STORAGE_KPIS: [(&str, &str); 3] = [
    ("Total", kpi::S3_TOTAL),
    ("Private", kpi::S3_PRIVATE),
    ("Public", kpi::S3_PUBLIC),
];
const IDENTITY_KPIS: [(&str, &str); 3] = [
    ("Total", kpi::IAM_TOTAL),
    ("MFA Enabled", kpi::IAM_MFA),
    ("No MFA", kpi::IAM_NO_MFA),
];

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

fn filter_key(granularity: Granularity) -> char {
    match granularity {
        Granularity::Daily => 'd',
        Granularity::Weekly => 'w',
        Granularity::Monthly => 'm',
        Granularity::Yearly => 'y',
    }
}

/// Draw the whole page. Returns the modal's area while it is open, for
/// mouse hit-testing.
pub fn draw(frame: &mut Frame, service: &DashboardService) -> Option<Rect> {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Percentage(55),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], service);
    draw_cost_panel(frame, chunks[1], service);

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3); 3])
        .split(chunks[2]);
    draw_summary_panel(frame, panels[0], service, WidgetKind::Compute, 2, &COMPUTE_KPIS);
    draw_summary_panel(frame, panels[1], service, WidgetKind::Storage, 3, &STORAGE_KPIS);
    draw_summary_panel(frame, panels[2], service, WidgetKind::Identity, 4, &IDENTITY_KPIS);

    draw_footer(frame, chunks[3]);

    let modal_area = draw_modal(frame, service);
    draw_confirmation(frame, service);
    draw_notification(frame, service);
    modal_area
}

fn draw_header(frame: &mut Frame, area: Rect, service: &DashboardService) {
    let mut spans = vec![Span::styled(
        " Cloud Dashboard ",
        Style::default().fg(color(palette::SKY)).add_modifier(Modifier::BOLD),
    )];

    for granularity in service.filter().buttons() {
        let text = format!(" [{}] {} ", filter_key(*granularity), granularity.label());
        let style = if service.filter().is_active(*granularity) {
            Style::default()
                .fg(Color::Black)
                .bg(color(palette::SKY))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(text, style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_footer(frame: &mut Frame, area: Rect) {
    let hints = Line::from(vec![
        Span::styled(" 1-4 ", Style::default().fg(color(palette::SKY))),
        Span::raw("details  "),
        Span::styled("d/w/m/y ", Style::default().fg(color(palette::SKY))),
        Span::raw("range  "),
        Span::styled("r ", Style::default().fg(color(palette::SKY))),
        Span::raw("reload  "),
        Span::styled("q ", Style::default().fg(color(palette::SKY))),
        Span::raw("quit"),
    ]);
    frame.render_widget(
        Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn panel_block(kind: WidgetKind, shortcut: u8) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" [{}] {} ", shortcut, kind.title()))
}

fn loading(frame: &mut Frame, area: Rect, block: Block<'_>) {
    let text = Paragraph::new("Loading...")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(text, area);
}

fn draw_cost_panel(frame: &mut Frame, area: Rect, service: &DashboardService) {
    let anomalies = service.kpis().get(kpi::COST_ANOMALIES).unwrap_or(0);
    let block = panel_block(WidgetKind::Cost, 1).title(
        Line::from(Span::styled(
            format!(" Anomalies: {} ", anomalies),
            Style::default().fg(if anomalies > 0 {
                color(palette::RED)
            } else {
                Color::Gray
            }),
        ))
        .right_aligned(),
    );

    let Some(instance) = service.charts().get(WidgetKind::Cost) else {
        return loading(frame, area, block);
    };
    let Some(dataset) = instance.config.data.datasets.first() else {
        return loading(frame, area, block);
    };

    let points: Vec<(f64, f64)> = dataset
        .values
        .iter()
        .enumerate()
        .map(|(i, v)| (i as f64, *v))
        .collect();
    let flagged: Vec<(f64, f64)> = points
        .iter()
        .zip(&dataset.point_colors)
        .filter(|(_, c)| **c == palette::RED)
        .map(|(p, _)| *p)
        .collect();

    let y_max = dataset.values.iter().copied().fold(0.0_f64, f64::max).max(1.0) * 1.1;
    let x_max = points.len().saturating_sub(1).max(1) as f64;
    let labels = &instance.config.data.labels;
    let x_labels: Vec<Span> = match labels.len() {
        0 => Vec::new(),
        1 => vec![Span::raw(labels[0].clone())],
        n => vec![
            Span::raw(labels[0].clone()),
            Span::raw(labels[n / 2].clone()),
            Span::raw(labels[n - 1].clone()),
        ],
    };

    let datasets = vec![
        Dataset::default()
            .name(dataset.label.clone())
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(color(dataset.border_color)))
            .data(&points),
        Dataset::default()
            .name("Anomaly")
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(color(palette::RED)))
            .data(&flagged),
    ];

    let mut chart = Chart::new(datasets).block(block);
    if !instance.config.options.show_legend {
        chart = chart.legend_position(None);
    }
    let chart = chart
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, y_max])
                .labels(vec![
                    Span::raw(format_cost(0.0)),
                    Span::raw(format_cost(y_max / 2.0)),
                    Span::raw(format_cost(y_max)),
                ]),
        );
    frame.render_widget(chart, area);
}

fn draw_summary_panel(
    frame: &mut Frame,
    area: Rect,
    service: &DashboardService,
    kind: WidgetKind,
    shortcut: u8,
    kpis: &[(&str, &str)],
) {
    let block = panel_block(kind, shortcut);
    let Some(instance) = service.charts().get(kind) else {
        return loading(frame, area, block);
    };

    let mut lines: Vec<Line> = kpis
        .iter()
        .map(|(label, id)| {
            Line::from(vec![
                Span::styled(format!("{:<12}", label), Style::default().fg(Color::Gray)),
                Span::styled(
                    service.kpis().get(id).unwrap_or(0).to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ])
        })
        .collect();

    let inner_width = area.width.saturating_sub(2);
    lines.push(Line::from(""));
    lines.push(proportion_bar(&instance.config, inner_width));
    lines.extend(legend(&instance.config));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Horizontal stand-in for a doughnut: one colored run per slice
pub fn proportion_bar(config: &ChartConfig, width: u16) -> Line<'static> {
    let Some(dataset) = config.data.datasets.first() else {
        return Line::from("");
    };
    if config.kind != ChartKind::Doughnut {
        return Line::from("");
    }

    let total: f64 = dataset.values.iter().sum();
    let width = width as usize;
    if total <= 0.0 || width == 0 {
        return Line::from(Span::styled(
            "░".repeat(width),
            Style::default().fg(color(palette::BORDER)),
        ));
    }

    let mut used = 0;
    let last = dataset.values.len().saturating_sub(1);
    let spans = dataset
        .values
        .iter()
        .zip(&dataset.colors)
        .enumerate()
        .map(|(i, (value, rgb))| {
            let cells = if i == last {
                width - used
            } else {
                (((value / total) * width as f64).round() as usize).min(width - used)
            };
            used += cells;
            Span::styled("█".repeat(cells), Style::default().fg(color(*rgb)))
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

/// Color key for a categorical chart; `None` when the chart hides its legend
fn legend(config: &ChartConfig) -> Option<Line<'static>> {
    if !config.options.show_legend {
        return None;
    }
    let dataset = config.data.datasets.first()?;
    let spans = config
        .data
        .labels
        .iter()
        .zip(&dataset.colors)
        .flat_map(|(label, rgb)| {
            [
                Span::styled("● ", Style::default().fg(color(*rgb))),
                Span::raw(format!("{}  ", label)),
            ]
        })
        .collect::<Vec<_>>();
    Some(Line::from(spans))
}

fn detail_cells(row: &DetailRow) -> Vec<Cell<'static>> {
    let last = row.cells.len().saturating_sub(1);
    row.cells
        .iter()
        .enumerate()
        .map(|(col, text)| {
            if !row.actions.is_empty() && col == last {
                return Cell::from(action_controls(row));
            }
            match row.status {
                Some((status_col, indicator)) if status_col == col => Cell::from(Line::from(vec![
                    Span::styled("● ", Style::default().fg(color(indicator.color()))),
                    Span::raw(text.clone()),
                ])),
                _ => Cell::from(text.clone()),
            }
        })
        .collect()
}

fn action_controls(row: &DetailRow) -> Line<'static> {
    let spans = row
        .actions
        .iter()
        .flat_map(|control| {
            let style = if control.pending {
                Style::default().fg(Color::Yellow)
            } else if control.enabled {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            [
                Span::styled(format!("[{}]", control.label()), style),
                Span::raw(" "),
            ]
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}

fn draw_modal(frame: &mut Frame, service: &DashboardService) -> Option<Rect> {
    let modal = service.modal();
    if !modal.is_open() {
        return None;
    }
    let table = modal.body()?;

    let area = centered_rect(80, 70, frame.area());
    frame.render_widget(Clear, area);

    let has_actions = table.rows.iter().any(|row| !row.actions.is_empty());
    let hint = if has_actions {
        " ↑/↓ select  s start  x stop  Esc close "
    } else {
        " ↑/↓ select  Esc close "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color(palette::SKY)))
        .title(format!(" {} ", modal.title()))
        .title_bottom(Line::from(hint).right_aligned());

    if table.rows.is_empty() {
        let empty = Paragraph::new("No items")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return Some(area);
    }

    let header = Row::new(table.headers.iter().map(|h| Cell::from(h.clone())))
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let rows = table.rows.iter().map(|row| Row::new(detail_cells(row)));
    let widths = vec![Constraint::Fill(1); table.headers.len()];

    let widget = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().bg(Color::Rgb(0x33, 0x41, 0x55)))
        .highlight_symbol("› ");

    let mut state = TableState::default().with_selected(Some(modal.selected_index()));
    frame.render_stateful_widget(widget, area, &mut state);
    Some(area)
}

fn draw_confirmation(frame: &mut Frame, service: &DashboardService) {
    let Some(prompt) = service.confirmation_prompt() else {
        return;
    };
    let area = centered_rect(50, 20, frame.area());
    let text = vec![
        Line::from(prompt),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y] ", Style::default().fg(color(palette::GREEN))),
            Span::raw("Yes   "),
            Span::styled("[n] ", Style::default().fg(color(palette::RED))),
            Span::raw("No"),
        ]),
    ];
    let dialog = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Confirm "));

    frame.render_widget(Clear, area);
    frame.render_widget(dialog, area);
}

fn draw_notification(frame: &mut Frame, service: &DashboardService) {
    let Some(notification) = service.notification() else {
        return;
    };
    let (title, accent) = match notification.kind {
        NotificationKind::Info => (" Notice ", color(palette::SKY)),
        NotificationKind::Error => (" Error ", color(palette::RED)),
    };
    let area = centered_rect(50, 20, frame.area());
    let text = vec![
        Line::from(notification.message.clone()),
        Line::from(""),
        Line::from(Span::styled("[Enter] OK", Style::default().fg(accent))),
    ];
    let dialog = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent))
                .title(title),
        );

    frame.render_widget(Clear, area);
    frame.render_widget(dialog, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
