use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
};
use recipe_chat_core::{Message, Sender};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use crate::app::App;

const TITLE: &str = " Recipe Chatbot ";
const PLACEHOLDER: &str = "Type your message...";
const EMPTY_HINT: &str = "Ask for a recipe, e.g. \"What can I make with chicken?\"";
const SEND_BUTTON_WIDTH: u16 = 10;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat window, input row, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(TITLE, Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.endpoint().to_string(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

/// Wrap text to fit within a given width, returning multiple lines
/// Uses word boundaries for wrapping; words wider than the line are split
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0;

    for piece in text.split_whitespace().flat_map(|word| split_long_word(word, width)) {
        let piece_width = piece.width();

        if current_width == 0 {
            // First word on line
            current_line = piece;
            current_width = piece_width;
        } else if current_width + 1 + piece_width <= width {
            // Word fits on current line
            current_line.push(' ');
            current_line.push_str(&piece);
            current_width += 1 + piece_width;
        } else {
            // Word doesn't fit, start new line
            lines.push(std::mem::replace(&mut current_line, piece));
            current_width = piece_width;
        }
    }

    // Don't forget the last line
    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

fn split_long_word(word: &str, width: usize) -> Vec<String> {
    if word.width() <= width {
        return vec![word.to_string()];
    }

    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut piece_width = 0;
    for c in word.chars() {
        let char_width = c.width().unwrap_or(0);
        if piece_width + char_width > width && !piece.is_empty() {
            pieces.push(std::mem::take(&mut piece));
            piece_width = 0;
        }
        piece.push(c);
        piece_width += char_width;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// One block of lines per message: sender label, wrapped text, blank separator.
fn message_lines(msg: &Message, width: usize) -> Vec<Line<'static>> {
    let (alignment, label_style, text_style) = match msg.sender() {
        Sender::User => (
            Alignment::Right,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            Style::default().fg(Color::Green),
        ),
        Sender::Agent => (
            Alignment::Left,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            Style::default(),
        ),
    };

    let mut lines = vec![Line::from(Span::styled(msg.sender().display_name(), label_style))
        .alignment(alignment)];

    let text = msg.text();
    let source_lines: Vec<&str> = if text.is_empty() { vec![""] } else { text.lines().collect() };
    for source_line in source_lines {
        for wrapped in wrap_text_to_width(source_line, width) {
            lines.push(Line::from(Span::styled(wrapped, text_style)).alignment(alignment));
        }
    }

    lines.push(Line::default());
    lines
}

/// Every line of the chat window, already wrapped to the window width.
///
/// Scrolling measures this same list, so the last line is always reachable.
pub fn chat_lines(app: &App) -> Vec<Line<'static>> {
    let width = app.wrap_width();
    let conversation = app.session.conversation();

    if conversation.is_empty() && !app.is_busy() {
        return wrap_text_to_width(EMPTY_HINT, width)
            .into_iter()
            .map(|line| Line::from(Span::styled(line, Style::default().fg(Color::DarkGray))))
            .collect();
    }

    let mut lines: Vec<Line<'static>> = conversation
        .iter()
        .flat_map(|msg| message_lines(msg, width))
        .collect();

    if app.is_busy() {
        lines.push(Line::from(Span::styled(
            Sender::Agent.display_name(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2).max(1);
    if app.follow_tail {
        app.scroll_to_bottom();
    }

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray))
        .title(" Chat ");

    let chat = Paragraph::new(Text::from(chat_lines(app)))
        .block(chat_block)
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

/// Style of the send button; dimmed while a reply is pending.
fn send_button_style(busy: bool) -> Style {
    if busy {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)
    }
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let busy = app.is_busy();
    let [field_area, button_area] = Layout::horizontal([
        Constraint::Min(10),
        Constraint::Length(SEND_BUTTON_WIDTH),
    ])
    .areas(area);

    let (border_color, title) = if busy {
        (Color::DarkGray, " Message (waiting for reply) ")
    } else {
        (Color::Cyan, " Message ")
    };
    let field_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let draft = app.session.draft();
    let inner_width = field_area.width.saturating_sub(2);

    // Keep the cursor visible by scrolling long drafts horizontally
    let before_cursor: String = draft.chars().take(app.cursor).collect();
    let cursor_col = u16::try_from(before_cursor.width()).unwrap_or(u16::MAX);
    let offset = cursor_col.saturating_sub(inner_width.saturating_sub(1));

    let content = if draft.is_empty() && !busy {
        Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray))
    } else if busy {
        Span::styled(draft.to_string(), Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(draft.to_string())
    };

    let field = Paragraph::new(Line::from(content))
        .block(field_block)
        .scroll((0, offset));
    frame.render_widget(field, field_area);

    if !busy {
        frame.set_cursor_position((field_area.x + 1 + cursor_col - offset, field_area.y + 1));
    }

    let button_style = send_button_style(busy);
    let button = Paragraph::new(Line::from(Span::styled("Send", button_style)))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(if busy { Color::DarkGray } else { Color::Blue })),
        );
    frame.render_widget(button, button_area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = if app.is_busy() {
        vec![Span::styled(" waiting for agent ", Style::default().bg(Color::Yellow).fg(Color::Black))]
    } else {
        vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
        ]
    };
    hints.extend(vec![
        Span::styled(" ↑/↓ PgUp/PgDn ", key_style),
        Span::styled(" scroll ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}
