use ratatui::prelude::*;
use ratatui::widgets::{BarChart, Block, Clear, Gauge, Paragraph, Wrap};

use crate::present;
use crate::registry;
use crate::scoring::CanonicalResult;
use crate::tui::app::App;
use crate::tui::theme;
use crate::wizard::Phase;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 10 || area.width < 40 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Progress(1) + Card(fill) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    render_title(frame, chunks[0], app);
    render_progress(frame, chunks[1], app);

    match &app.wizard.phase {
        Phase::Active => render_question_card(frame, chunks[2], app),
        Phase::Submitting => {
            render_question_card(frame, chunks[2], app);
            render_submitting_overlay(frame, app);
        }
        Phase::Finished(result) => {
            let result = result.clone();
            render_result(frame, chunks[2], app, &result);
        }
        Phase::Failed(message) => {
            let message = message.clone();
            render_failure(frame, chunks[2], &message);
        }
    }

    render_status_bar(frame, chunks[3], app);
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        "stemfit",
        Style::default().fg(theme::TITLE_COLOR).bold(),
    )];

    // Section name (or phase) right-aligned
    let right_text = match &app.wizard.phase {
        Phase::Active | Phase::Submitting => app
            .wizard
            .current_question()
            .map(|q| q.section.to_string())
            .unwrap_or_default(),
        Phase::Finished(_) => "Result".to_string(),
        Phase::Failed(_) => "Error".to_string(),
    };
    if !right_text.is_empty() {
        let left_len = "stemfit".len();
        let padding_len = (area.width as usize).saturating_sub(left_len + right_text.len());
        spans.push(Span::raw(" ".repeat(padding_len)));
        spans.push(Span::styled(
            right_text,
            Style::default().fg(theme::SECTION_COLOR),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_progress(frame: &mut Frame, area: Rect, app: &App) {
    let text = match &app.wizard.phase {
        Phase::Active | Phase::Submitting => format!(
            "Question {} of {}",
            app.wizard.step_index + 1,
            registry::question_count()
        ),
        Phase::Finished(_) => "Your result".to_string(),
        Phase::Failed(_) => "Something went wrong".to_string(),
    };
    let line = Paragraph::new(text).style(Style::default().fg(theme::MUTED));
    frame.render_widget(line, area);
}

fn render_question_card(frame: &mut Frame, area: Rect, app: &App) {
    let Some(question) = app.wizard.current_question() else {
        return;
    };

    let block = Block::bordered().border_style(Style::default().fg(theme::SECTION_COLOR));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(inner);

    let label = Paragraph::new(question.label)
        .wrap(Wrap { trim: true })
        .style(Style::default().bold());
    frame.render_widget(label, chunks[0]);

    if app.is_number_step() {
        render_number_input(frame, chunks[2], app);
    } else {
        render_options(frame, chunks[2], app);
    }

    // Inline validation hint for an answer that is present but invalid.
    if let Some(hint) = app.wizard.validation_hint() {
        let hint_line =
            Paragraph::new(hint).style(Style::default().fg(theme::HINT_COLOR));
        frame.render_widget(hint_line, chunks[3]);
    }
}

fn render_options(frame: &mut Frame, area: Rect, app: &App) {
    let labels = app.option_labels();
    let selected = selected_option_index(app, &labels);

    let lines: Vec<Line> = labels
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            let cursor = if idx == app.cursor { "› " } else { "  " };
            let radio = if Some(idx) == selected { "(•) " } else { "( ) " };

            let style = if idx == app.cursor {
                theme::OPTION_CURSOR
            } else if Some(idx) == selected {
                theme::OPTION_SELECTED
            } else {
                Style::default()
            };

            Line::from(vec![
                Span::styled(cursor, theme::OPTION_CURSOR),
                Span::styled(format!("{}{}", radio, label), style),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}

/// Which option matches the stored answer, if any.
fn selected_option_index(app: &App, labels: &[String]) -> Option<usize> {
    let question = app.wizard.current_question()?;
    let answer = app.wizard.answers.get(question.id)?;
    match answer {
        crate::registry::Answer::Text(text) => labels.iter().position(|l| l == text),
        crate::registry::Answer::Number(n) => labels.iter().position(|l| {
            crate::registry::parse_decimal(l).map(|v| v == *n).unwrap_or(false)
        }),
    }
}

fn render_number_input(frame: &mut Frame, area: Rect, app: &App) {
    let lines = vec![
        Line::from(vec![
            Span::styled("> ", theme::OPTION_CURSOR),
            Span::raw(app.input.clone()),
            Span::styled("▏", Style::default().fg(theme::MUTED)),
        ]),
        Line::default(),
        Line::from(Span::styled(
            "Decimal comma or dot both work (e.g. 4,17)",
            Style::default().fg(theme::MUTED),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_submitting_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect(40, 5, frame.area());
    frame.render_widget(Clear, area);

    let spinner = theme::SPINNER_FRAMES[app.spinner_frame % theme::SPINNER_FRAMES.len()];
    let popup = Paragraph::new(format!("{} Calculating...", spinner))
        .alignment(Alignment::Center)
        .block(
            Block::bordered()
                .border_style(Style::default().fg(theme::POPUP_BORDER))
                .style(Style::default().bg(theme::POPUP_BG)),
        );
    frame.render_widget(popup, area);
}

fn render_result(frame: &mut Frame, area: Rect, app: &App, result: &CanonicalResult) {
    let block = Block::bordered().border_style(Style::default().fg(theme::SECTION_COLOR));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(inner);

    // Animated self-discipline bar; equals the exact target once the
    // animation has run its course.
    let displayed = app.displayed_score();
    let gauge = Gauge::default()
        .ratio((displayed / 100.0).clamp(0.0, 1.0))
        .label(format!("Self-discipline score: {:.0}%", displayed))
        .gauge_style(Style::default().fg(theme::score_color(result.self_discipline_percent)));
    frame.render_widget(gauge, chunks[0]);

    // STEM / non-STEM badge with the backend's own label text.
    let badge = present::stem_label(result.stem_fit_probability);
    let stem_line = Line::from(vec![
        Span::styled(format!(" {} ", badge), theme::PILL_STYLE),
        Span::raw(format!(
            "  STEM fit: {:.0}% - {}",
            result.stem_fit_probability * 100.0,
            result.stem_fit_label
        )),
    ]);
    frame.render_widget(Paragraph::new(stem_line), chunks[1]);

    render_breakdown_chart(frame, chunks[3], result);

    if !app.feedback_flag.is_dismissed() {
        let prompt = Paragraph::new("Was this result useful? Press x to hide this prompt.")
            .style(Style::default().fg(theme::MUTED));
        frame.render_widget(prompt, chunks[4]);
    }
}

fn render_breakdown_chart(frame: &mut Frame, area: Rect, result: &CanonicalResult) {
    let bars = present::breakdown_bars(result);

    // An empty breakdown gets an explicit empty state, never a blank chart.
    if bars.is_empty() {
        let empty = Paragraph::new("No breakdown data returned.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme::MUTED));
        frame.render_widget(empty, area);
        return;
    }

    let data: Vec<(&str, u64)> = bars.iter().map(|(name, v)| (name.as_str(), *v)).collect();
    let chart = BarChart::default()
        .block(Block::default().title("Breakdown by habits"))
        .data(&data)
        .max(100)
        .bar_width(10)
        .bar_gap(2)
        .bar_style(Style::default().fg(theme::CHART_BAR_COLOR))
        .value_style(Style::default().fg(Color::Black).bg(theme::CHART_BAR_COLOR));
    frame.render_widget(chart, area);
}

fn render_failure(frame: &mut Frame, area: Rect, message: &str) {
    let block = Block::bordered().border_style(Style::default().fg(theme::FLASH_ERROR));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(Span::styled(
            "We couldn't fetch the calculated score.",
            Style::default().fg(theme::FLASH_ERROR).bold(),
        )),
        Line::default(),
        Line::from(Span::raw(message.to_string())),
        Line::default(),
        Line::from(Span::styled(
            "Press r to restart the questionnaire.",
            Style::default().fg(theme::MUTED),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    // Flash messages take over the hint line until they expire.
    if let Some((message, _)) = &app.flash_message {
        let flash = Paragraph::new(message.clone())
            .style(Style::default().fg(theme::FLASH_ERROR).bg(theme::STATUS_BAR_BG));
        frame.render_widget(flash, area);
        return;
    }

    let hints = match &app.wizard.phase {
        Phase::Active => {
            if app.is_number_step() {
                "type number · backspace edit · enter next · esc back · q quit"
            } else {
                "↑/↓ highlight · enter next · space select · 1-9 pick · esc back · q quit"
            }
        }
        Phase::Submitting => "waiting for the scoring service...",
        Phase::Finished(_) => "r restart · q quit",
        Phase::Failed(_) => "r restart · q quit",
    };

    let bar = Paragraph::new(hints)
        .style(Style::default().fg(theme::STATUS_KEY_COLOR).bg(theme::STATUS_BAR_BG));
    frame.render_widget(bar, area);
}

/// Centered popup rect of fixed size, clamped to the containing area.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
