pub mod wrap;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use crate::{
    app::{App, Screen},
    clock::Clock,
    session::{Session, Status},
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

pub const PLACEHOLDER: &str =
    "Press Enter to start the test. You'll have 30 seconds to type the text that appears here.";

impl<C: Clock> Widget for &App<C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.screen() {
            Screen::Typing => render_typing(self.session(), area, buf),
            Screen::Results => render_results(self, area, buf),
        }
    }
}

fn render_typing<C: Clock>(session: &Session<C>, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2), // timer
            Constraint::Min(1),    // passage
            Constraint::Length(1), // legend
        ])
        .split(area);

    let timer = Paragraph::new(Span::styled(
        format!("{}s", session.remaining_secs()),
        if session.is_running() {
            bold_style
        } else {
            dim_bold_style
        },
    ))
    .alignment(Alignment::Center);
    timer.render(chunks[0], buf);

    if session.status() == Status::Idle {
        Paragraph::new(Span::styled(PLACEHOLDER, italic_style))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[1], buf);
    } else {
        passage_view(session, chunks[1]).render(chunks[1], buf);
    }

    let legend = match session.status() {
        Status::Idle => "(enter) start / (esc)ape",
        Status::Running | Status::Finished => "(esc) reset / (ctrl+c) quit",
    };
    Paragraph::new(Span::styled(legend, italic_style)).render(chunks[2], buf);
}

/// The passage, marked up up to the cursor and scrolled so the cursor stays visible
fn passage_view<'a, C: Clock>(session: &'a Session<C>, area: Rect) -> Paragraph<'a> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let underlined_dim_bold_style = Style::default()
        .patch(dim_bold_style)
        .add_modifier(Modifier::UNDERLINED);

    let chars: Vec<char> = session.passage().chars().collect();
    let history = session.history();
    let cursor = session.cursor();

    let ranges = wrap::wrap_ranges(session.passage(), area.width as usize);
    let lines: Vec<Line> = ranges
        .iter()
        .map(|range| {
            let spans: Vec<Span> = range
                .clone()
                .map(|idx| {
                    let c = chars[idx];
                    match history.get(idx).copied() {
                        Some(true) => Span::styled(c.to_string(), green_bold_style),
                        Some(false) => Span::styled(
                            match c {
                                ' ' => "·".to_owned(),
                                c => c.to_string(),
                            },
                            red_bold_style,
                        ),
                        None if idx == cursor => {
                            Span::styled(c.to_string(), underlined_dim_bold_style)
                        }
                        None => Span::styled(c.to_string(), dim_bold_style),
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let cursor_line = wrap::line_of(&ranges, cursor);
    let offset = wrap::scroll_offset(cursor_line, ranges.len(), area.height as usize);

    Paragraph::new(lines).scroll((offset as u16, 0))
}

fn render_results<C: Clock>(app: &App<C>, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // padding
            Constraint::Length(1), // headline
            Constraint::Length(1), // char counts
            Constraint::Min(1),    // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    match app.results_view() {
        Some(record) => {
            Paragraph::new(Span::styled(
                format!(
                    "{} wpm   {}% acc   {} raw",
                    record.wpm, record.accuracy, record.raw_wpm
                ),
                bold_style,
            ))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

            Paragraph::new(Span::styled(
                format!(
                    "{} correct   {} errors   {} total",
                    record.correct, record.errors, record.total
                ),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::ITALIC),
            ))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
        }
        None => {
            Paragraph::new(Span::styled("No results recorded yet", italic_style))
                .alignment(Alignment::Center)
                .render(chunks[1], buf);
        }
    }

    Paragraph::new(Span::styled(
        "(r)etry / (b)ack / (esc)ape",
        italic_style,
    ))
    .render(chunks[4], buf);
}
