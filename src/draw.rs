use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::App;
use crate::state::network::{ERROR_CHAR, LoadingState};
use cfp_api::{PLAYOFF_FIELD_SIZE, Team, byes, first_round_matchups, left_out};

const HELP_TEXT: &str = "r=refresh now  \"=logs  Esc=dismiss  ?=help  q=quit";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let _ = terminal.draw(|f| {
        let [header, body, status] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(3),
        ])
        .areas(f.area());

        draw_header(f, header);

        if app.state.show_logs {
            let [bracket, logs] =
                Layout::vertical([Constraint::Fill(1), Constraint::Length(10)]).areas(body);
            draw_bracket(f, bracket, app);
            draw_logs(f, logs);
        } else {
            draw_bracket(f, body, app);
        }

        draw_status(f, status, app);
        draw_loading_spinner(f, status, loading);

        if app.state.show_help {
            draw_help(f, f.area());
        }
    });
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_header(f: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            "COLLEGE FOOTBALL PLAYOFF",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled("  12-Team Bracket", Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(
        Paragraph::new(title).block(default_border(Color::White)),
        area,
    );
}

fn draw_bracket(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Bracket ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let teams = app.teams();
    if teams.len() < PLAYOFF_FIELD_SIZE {
        f.render_widget(
            Paragraph::new("Loading bracket...")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let out = left_out(teams);
    let left_out_height = if out.is_empty() { 0 } else { out.len() as u16 + 2 };
    let [rounds, left_out_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(left_out_height)]).areas(inner);
    let [first_round_area, byes_area] =
        Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(rounds);

    let mut first_round: Vec<Line> = Vec::new();
    for (high, low) in first_round_matchups(teams) {
        first_round.push(Line::from(team_entry(high)));
        first_round.push(Line::from(team_entry(low)));
        first_round.push(Line::from(""));
    }
    f.render_widget(
        Paragraph::new(first_round).block(default_border(Color::DarkGray).title(" First Round ")),
        first_round_area,
    );

    let bye_lines: Vec<Line> = byes(teams)
        .iter()
        .flat_map(|t| [Line::from(team_entry(t)), Line::from("  vs. first-round winner"), Line::from("")])
        .collect();
    f.render_widget(
        Paragraph::new(bye_lines).block(default_border(Color::DarkGray).title(" Quarterfinal Byes ")),
        byes_area,
    );

    if !out.is_empty() {
        let lines: Vec<Line> = out
            .iter()
            .map(|t| Line::styled(team_entry(t), Style::default().fg(Color::DarkGray)))
            .collect();
        f.render_widget(
            Paragraph::new(lines).block(default_border(Color::DarkGray).title(" Left Out ")),
            left_out_area,
        );
    }
}

fn team_entry(team: &Team) -> String {
    let abbrev = if team.abbreviation.is_empty() {
        String::new()
    } else {
        format!(" [{}]", team.abbreviation)
    };
    format!("{}{abbrev}", team.label())
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let signals = app.signals();
    let countdown = if signals.is_loading {
        "Refreshing rankings...".to_string()
    } else {
        signals.next_update_text
    };
    let mut spans = vec![
        Span::raw(format!(" {countdown}")),
        Span::styled(
            format!("  |  Last updated: {}", signals.last_update_display),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if let Some(notification) = &app.state.notification {
        let color = if notification.is_error { Color::Red } else { Color::Green };
        spans.push(Span::styled(
            format!("  |  {}", notification.message),
            Style::default().fg(color),
        ));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)).block(default_border(Color::DarkGray)),
        area,
    );
}

fn draw_logs(f: &mut Frame, area: Rect) {
    f.render_widget(
        TuiLoggerWidget::default().block(default_border(Color::DarkGray).title(" Logs ")),
        area,
    );
}

fn draw_help(f: &mut Frame, area: Rect) {
    let width = (HELP_TEXT.len() as u16 + 4).min(area.width);
    let popup = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height / 2,
        width,
        3.min(area.height),
    );
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(HELP_TEXT)
            .alignment(Alignment::Center)
            .block(default_border(Color::White).title(" Help ")),
        popup,
    );
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = Rect::new(area.x + area.width.saturating_sub(3), area.y + 1, 1, 1);
    f.render_widget(spinner, area);
}
