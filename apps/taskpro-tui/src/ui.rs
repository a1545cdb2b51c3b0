use crate::app::{App, AuthField, DashboardFocus, View};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
};

pub fn draw(frame: &mut Frame, app: &mut App, view: View) {
    match view {
        View::Loading => draw_loading_screen(frame),
        View::Login => draw_auth_screen(frame, app, false),
        View::Register => draw_auth_screen(frame, app, true),
        View::Dashboard => draw_dashboard_screen(frame, app),
    }

    if let Some(error) = app.error() {
        draw_error_popup(frame, &error);
    }
}

fn draw_loading_screen(frame: &mut Frame) {
    let area = centered_rect(40, 20, frame.area());
    let loading = Paragraph::new("Checking session...")
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        );
    frame.render_widget(loading, area);
}

fn field_style(focused: bool) -> Style {
    if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

fn key_hint(key: &str, color: Color) -> Span<'_> {
    Span::styled(
        key,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

fn draw_auth_screen(frame: &mut Frame, app: &App, register: bool) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(50),
            Constraint::Percentage(25),
        ])
        .split(frame.area());

    let (title, color) = if register {
        (" Create New Account ", Color::Green)
    } else {
        (" GoTask Pro - Sign in ", Color::Cyan)
    };

    let auth_block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(color));

    frame.render_widget(auth_block.clone(), chunks[1]);
    let inner_area = auth_block.inner(chunks[1]);

    let mut fields: Vec<(AuthField, String)> = Vec::new();
    if register {
        fields.push((AuthField::Name, format!("Name:     {}", app.name_input)));
    }
    fields.push((AuthField::Email, format!("Email:    {}", app.email_input)));
    fields.push((
        AuthField::Password,
        format!("Password: {}", "*".repeat(app.password_input.chars().count())),
    ));

    let mut constraints: Vec<Constraint> = fields.iter().map(|_| Constraint::Length(2)).collect();
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Min(0));

    let auth_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(inner_area);

    for (i, (field, text)) in fields.iter().enumerate() {
        let focused = app.auth_focus == *field;
        frame.render_widget(
            Paragraph::new(text.as_str()).style(field_style(focused)),
            auth_chunks[i],
        );

        let underline = Paragraph::new("─".repeat(auth_chunks[i].width as usize))
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(
            underline,
            Rect {
                x: auth_chunks[i].x,
                y: auth_chunks[i].y + 1,
                width: auth_chunks[i].width,
                height: 1,
            },
        );

        if focused {
            let typed = text.chars().count() as u16;
            frame.set_cursor_position((auth_chunks[i].x + typed, auth_chunks[i].y));
        }
    }

    let mut lines = Vec::new();
    if let Some(notice) = &app.notice {
        lines.push(Line::from(Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Green),
        )));
    }
    if app.session.snapshot().loading {
        lines.push(Line::from("Working..."));
    }
    lines.push(Line::from(""));
    if register {
        lines.push(Line::from(vec![
            key_hint("Tab", Color::Cyan),
            Span::raw(" to switch fields | "),
            key_hint("Enter", Color::Green),
            Span::raw(" to register | "),
            key_hint("Esc", Color::Red),
            Span::raw(" back to login"),
        ]));
    } else {
        lines.push(Line::from(vec![
            key_hint("Tab", Color::Cyan),
            Span::raw(" to switch fields | "),
            key_hint("Enter", Color::Green),
            Span::raw(" to login"),
        ]));
        lines.push(Line::from(vec![
            key_hint("Ctrl+R", Color::Magenta),
            Span::raw(" to create a new account | "),
            key_hint("Esc", Color::Red),
            Span::raw(" to quit"),
        ]));
    }

    let instructions = Paragraph::new(lines)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    frame.render_widget(instructions, auth_chunks[auth_chunks.len() - 1]);
}

fn draw_dashboard_screen(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(6),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let user_name = app
        .session
        .user()
        .map(|u| u.name)
        .unwrap_or_else(|| "User".to_string());
    let header = Paragraph::new(format!(" Your tasks overview - {} ", user_name))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Thick),
        );
    frame.render_widget(header, chunks[0]);

    draw_stats(frame, app, chunks[1]);
    draw_draft_form(frame, app, chunks[2]);
    draw_task_list(frame, app, chunks[3]);

    let instructions = Paragraph::new(Line::from(
        "Up/Down select | Space toggle | D delete | R refresh | Tab new task | L logout | Q quit",
    ))
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(instructions, chunks[4]);
}

fn draw_stats(frame: &mut Frame, app: &App, area: Rect) {
    let stats = app.tasks.stats();
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let cards = [
        ("Total tasks", stats.total, Color::White),
        ("Completed", stats.completed, Color::Green),
        ("Pending", stats.pending, Color::Yellow),
    ];
    for (i, (label, value, color)) in cards.into_iter().enumerate() {
        let card = Paragraph::new(value.to_string())
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title(format!(" {} ", label))
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded),
            );
        frame.render_widget(card, columns[i]);
    }

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(" Completion ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        )
        .gauge_style(Style::default().fg(Color::Cyan))
        .percent(stats.completion_rate.min(100) as u16);
    frame.render_widget(gauge, columns[3]);
}

fn draw_draft_form(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .title(" New task ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(inner);

    let draft = app.tasks.draft();
    let entries = [
        (DashboardFocus::Title, format!("Title:       {}", draft.title)),
        (
            DashboardFocus::Description,
            format!("Description: {}", draft.description),
        ),
    ];

    for (i, (focus, text)) in entries.iter().enumerate() {
        let focused = app.dashboard_focus == *focus;
        frame.render_widget(
            Paragraph::new(text.as_str()).style(field_style(focused)),
            rows[i],
        );
        if focused {
            let typed = text.chars().count() as u16;
            frame.set_cursor_position((rows[i].x + typed, rows[i].y));
        }
    }
}

fn draw_task_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .title(if app.tasks.is_loading() {
            " Tasks (loading...) "
        } else {
            " Tasks "
        })
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);

    if app.tasks.tasks().is_empty() {
        let empty = Paragraph::new("No tasks yet. Press Tab to add one.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .tasks
        .tasks()
        .iter()
        .map(|task| {
            let (mark, style) = if task.done {
                (
                    "[x]",
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::CROSSED_OUT),
                )
            } else {
                ("[ ]", Style::default().fg(Color::White))
            };
            let mut spans = vec![Span::styled(format!("{} {}", mark, task.title), style)];
            if let Some(description) = &task.description {
                spans.push(Span::styled(
                    format!("  {}", description),
                    Style::default().fg(Color::Gray),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let highlight = if app.dashboard_focus == DashboardFocus::Tasks {
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let list = List::new(items).block(block).highlight_style(highlight);
    let mut state = ListState::default().with_selected(Some(app.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_error_popup(frame: &mut Frame, error: &str) {
    let area = centered_rect(60, 20, frame.area());

    let popup_block = Block::default()
        .title(" Error (Esc to dismiss) ")
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .style(Style::default().fg(Color::Red));

    let error_text = Paragraph::new(error)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White))
        .block(popup_block);

    frame.render_widget(Clear, area);
    frame.render_widget(error_text, area);
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
