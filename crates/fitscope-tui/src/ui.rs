use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use fitscope_core::format::{
    format_message, BlockKind, Fragment, RenderLine, RenderTree, ResponseCategory, ValueTone,
};
use fitscope_core::model::Analysis;
use fitscope_core::state::ChatRole;

use crate::app::{App, FocusPane, InputMode, Screen, EMAIL_TYPES};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Dashboard => render_dashboard(app, frame, body_area),
        Screen::Analyze => render_analyze(app, frame, body_area),
        Screen::Report => render_report_screen(app, frame, body_area),
        Screen::Chat => render_chat_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);

    // Popups (in order of priority)
    if app.show_model_picker {
        render_model_picker(app, frame, area);
    } else if app.show_email_picker {
        render_email_picker(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let customer = app
        .report
        .as_ref()
        .map(|a| format!(" · {}", a.display_name()))
        .unwrap_or_default();

    let title = Line::from(vec![
        Span::styled(" Fitscope ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(customer, Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints: Vec<Span> = match (app.screen, app.input_mode) {
        (Screen::Dashboard, _) => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" nav ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" open ", label_style),
            Span::styled(" n ", key_style),
            Span::styled(" new ", label_style),
            Span::styled(" d ", key_style),
            Span::styled(" delete ", label_style),
            Span::styled(" e ", key_style),
            Span::styled(" export ", label_style),
            Span::styled(" S ", key_style),
            Span::styled(" sheet ", label_style),
            Span::styled(" t ", key_style),
            Span::styled(" probe ", label_style),
            Span::styled(" m ", key_style),
            Span::styled(" model ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
        (Screen::Analyze, InputMode::Normal) => vec![
            Span::styled(" Tab ", key_style),
            Span::styled(" focus ", label_style),
            Span::styled(" i ", key_style),
            Span::styled(" edit ", label_style),
            Span::styled(" / ", key_style),
            Span::styled(" search docs ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" pull doc ", label_style),
            Span::styled(" C-s ", key_style),
            Span::styled(" analyze ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" back ", label_style),
        ],
        (Screen::Analyze, InputMode::Editing) => vec![
            Span::styled(" C-s ", key_style),
            Span::styled(" analyze ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" done ", label_style),
        ],
        (Screen::Report, _) => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" c ", key_style),
            Span::styled(" chat ", label_style),
            Span::styled(" e ", key_style),
            Span::styled(" export ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" back ", label_style),
        ],
        (Screen::Chat, InputMode::Normal) => vec![
            Span::styled(" Tab ", key_style),
            Span::styled(" focus ", label_style),
            Span::styled(" i ", key_style),
            Span::styled(" type ", label_style),
            Span::styled(" g ", key_style),
            Span::styled(" email ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" report ", label_style),
        ],
        (Screen::Chat, InputMode::Editing) => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" done ", label_style),
        ],
    };

    if let Some(status) = &app.status {
        hints.push(Span::raw(" "));
        hints.push(Span::styled(
            status.clone(),
            Style::default().fg(Color::Yellow),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

// ---- Dashboard ----

fn render_dashboard(app: &mut App, frame: &mut Frame, area: Rect) {
    let [list_area, side_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);

    render_history_list(app, frame, list_area);

    if app.show_sheet_panel {
        render_sheet_panel(app, frame, side_area);
    } else {
        let [metrics_area, activity_area] =
            Layout::vertical([Constraint::Length(8), Constraint::Min(0)]).areas(side_area);
        render_metrics(app, frame, metrics_area);
        render_activity(app, frame, activity_area);
    }
}

fn render_history_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::List;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" Recent Analyses ({}) ", app.history.len()));

    if app.history.is_empty() {
        let placeholder =
            Paragraph::new("No analyses yet.\nPress 'n' to analyze a transcript.")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let items: Vec<ListItem> = app
        .history
        .iter()
        .map(|analysis| {
            let score = analysis
                .fit_score()
                .map(|s| format!("{:>3}", s))
                .unwrap_or_else(|| "  —".to_string());
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!(" {} ", score),
                    Style::default().fg(score_color(analysis.fit_score())),
                ),
                Span::raw(analysis.display_name().to_string()),
                Span::styled(
                    format!("  {}", analysis.industry()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.history_state);
}

fn render_metrics(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Pipeline ");

    let Some(metrics) = &app.metrics else {
        let placeholder = Paragraph::new("Loading metrics...")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    };

    let mut lines = vec![
        metric_line("Total analyses", metrics.total_analyses.map(|n| n.to_string())),
        metric_line(
            "Average fit score",
            metrics.average_fit_score.map(|s| format!("{:.0}", s)),
        ),
        metric_line(
            "This week",
            metrics.analyses_this_week.map(|n| n.to_string()),
        ),
    ];
    if !metrics.top_industries.is_empty() {
        lines.push(metric_line(
            "Top industries",
            Some(metrics.top_industries.join(", ")),
        ));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn metric_line(label: &str, value: Option<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<18}", label), Style::default().fg(Color::Gray)),
        Span::styled(
            value.unwrap_or_else(|| "—".to_string()),
            Style::default().fg(Color::Cyan).bold(),
        ),
    ])
}

fn render_activity(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Activity ");

    if app.activity.is_empty() {
        let placeholder = Paragraph::new("No recent activity.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let lines: Vec<Line> = app
        .activity
        .iter()
        .map(|entry| {
            let when = entry
                .timestamp
                .as_deref()
                .map(|t| format!(" ({})", t))
                .unwrap_or_default();
            Line::from(vec![
                Span::raw("• "),
                Span::raw(entry.description.clone()),
                Span::styled(when, Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
        area,
    );
}

fn render_sheet_panel(app: &App, frame: &mut Frame, area: Rect) {
    let title = match app.sheet_data.as_ref().and_then(|d| d.range.clone()) {
        Some(range) => format!(" Sheet · {} ", range),
        None => " Sheet ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(title);

    let Some(data) = &app.sheet_data else {
        let placeholder = Paragraph::new("Loading sheet data...")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    };

    let lines: Vec<Line> = data
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i == 0 {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(Span::styled(row.join(" | "), style))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ---- Analyze ----

fn render_analyze(app: &mut App, frame: &mut Frame, area: Rect) {
    let [docs_area, transcript_area] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(area);

    let [search_area, list_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(docs_area);

    // Doc search box
    let search_editing = app.focus == FocusPane::List && app.input_mode == InputMode::Editing;
    let search_color = if search_editing {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let search = Paragraph::new(app.doc_search_input.clone())
        .style(Style::default().fg(Color::Cyan))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(search_color))
                .title(" Search docs (/) "),
        );
    frame.render_widget(search, search_area);
    if search_editing {
        let cursor_x = app.doc_search_cursor.min(search_area.width.saturating_sub(2) as usize);
        frame.set_cursor_position((search_area.x + cursor_x as u16 + 1, search_area.y + 1));
    }

    // Docs list
    let docs_focused = app.focus == FocusPane::List && !search_editing;
    let docs_color = if docs_focused { Color::Cyan } else { Color::DarkGray };
    let docs_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(docs_color))
        .title(format!(" Documents ({}) ", app.docs.len()));

    if app.docs.is_empty() {
        let placeholder = Paragraph::new("No documents found.\nPress 'r' to reload.")
            .style(Style::default().fg(Color::DarkGray))
            .block(docs_block);
        frame.render_widget(placeholder, list_area);
    } else {
        let items: Vec<ListItem> = app
            .docs
            .iter()
            .map(|doc| {
                let modified = doc
                    .modified_time
                    .as_deref()
                    .map(|t| format!("  {}", t))
                    .unwrap_or_default();
                ListItem::new(Line::from(vec![
                    Span::raw(doc.name.clone()),
                    Span::styled(modified, Style::default().fg(Color::DarkGray)),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(docs_block)
            .highlight_style(
                Style::default()
                    .bg(Color::Cyan)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, list_area, &mut app.docs_state);
    }

    // Transcript input
    let transcript_editing = app.focus == FocusPane::Input && app.input_mode == InputMode::Editing;
    let transcript_color = if transcript_editing {
        Color::Yellow
    } else if app.focus == FocusPane::Input {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let char_count = app.transcript_input.chars().count();
    let title = if app.analyze_task.is_some() {
        format!(" Transcript · analyzing{} ", dots(app.animation_frame))
    } else {
        format!(" Transcript ({} chars) ", char_count)
    };

    let content = if app.transcript_input.is_empty() {
        Text::from(Span::styled(
            "Paste a meeting transcript here ('i' to type),\nor pull one from a document on the left.",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Text::from(app.transcript_input.clone())
    };

    let transcript = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(transcript_color))
                .title(title),
        );
    frame.render_widget(transcript, transcript_area);
}

// ---- Report ----

fn render_report_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(match &app.report {
            Some(analysis) => format!(" Fit Report · {} ", analysis.display_name()),
            None => " Fit Report ".to_string(),
        });

    let Some(analysis) = &app.report else {
        let placeholder = Paragraph::new("No analysis open.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    };

    let lines = report_lines(analysis);

    app.report_height = area.height.saturating_sub(2);
    app.report_total_lines = lines.len() as u16;
    let max_scroll = app.report_total_lines.saturating_sub(app.report_height);
    app.report_scroll = app.report_scroll.min(max_scroll);

    let report = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.report_scroll, 0))
        .block(block);
    frame.render_widget(report, area);
}

fn score_color(score: Option<u8>) -> Color {
    match score {
        Some(s) if s >= 70 => Color::Green,
        Some(s) if s >= 40 => Color::Yellow,
        Some(_) => Color::Red,
        None => Color::DarkGray,
    }
}

fn section_header(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
}

/// Flatten an analysis into the report's display lines.
fn report_lines(analysis: &Analysis) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = Vec::new();

    let score = analysis.fit_score();
    lines.push(Line::from(vec![
        Span::styled(
            analysis.display_name().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            analysis.industry().to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    ]));
    lines.push(Line::from(Span::styled(
        match score {
            Some(s) => format!("Fit score: {}/100", s),
            None => "Fit score: —".to_string(),
        },
        Style::default()
            .fg(score_color(score))
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::default());

    if let Some(counts) = &analysis.user_count {
        let mut parts = Vec::new();
        if let Some(total) = counts.total {
            parts.push(format!("{} total", total));
        }
        if let Some(back) = counts.back_office {
            parts.push(format!("{} back office", back));
        }
        if let Some(field) = counts.field {
            parts.push(format!("{} field", field));
        }
        if !parts.is_empty() {
            lines.push(section_header("Users"));
            lines.push(Line::from(parts.join(" · ")));
            lines.push(Line::default());
        }
    }

    if let Some(timeline) = &analysis.timeline {
        lines.push(section_header("Timeline"));
        lines.push(Line::from(timeline.clone()));
        lines.push(Line::default());
    }

    if !analysis.current_systems.is_empty() {
        lines.push(section_header("Current systems"));
        for system in &analysis.current_systems {
            let name = system.name.clone().unwrap_or_else(|| "Unknown".to_string());
            let replacing = match system.replacing {
                Some(true) => " (replacing)",
                _ => "",
            };
            lines.push(Line::from(vec![
                Span::raw("• "),
                Span::styled(name, Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(replacing.to_string(), Style::default().fg(Color::Yellow)),
            ]));
            if let Some(description) = &system.description {
                lines.push(Line::from(Span::styled(
                    format!("  {}", description),
                    Style::default().fg(Color::Gray),
                )));
            }
        }
        lines.push(Line::default());
    }

    if !analysis.services.is_empty() {
        lines.push(section_header("Services"));
        lines.push(Line::from(analysis.services.join(", ")));
        lines.push(Line::default());
    }

    if let Some(requirements) = &analysis.requirements {
        for (title, entries) in [
            ("Key features", &requirements.key_features),
            ("Integrations", &requirements.integrations),
            ("Pain points", &requirements.pain_points),
        ] {
            if !entries.is_empty() {
                lines.push(section_header(title));
                for entry in entries {
                    lines.push(Line::from(format!("• {}", entry)));
                }
                lines.push(Line::default());
            }
        }
    }

    for (title, entries, marker, color) in [
        ("Strengths", &analysis.strengths, "✓", Color::Green),
        ("Challenges", &analysis.challenges, "!", Color::Red),
    ] {
        if !entries.is_empty() {
            lines.push(section_header(title));
            for insight in entries {
                lines.push(Line::from(vec![
                    Span::styled(format!("{} ", marker), Style::default().fg(color)),
                    Span::styled(
                        insight.title().to_string(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ]));
                if let Some(description) = &insight.description {
                    lines.push(Line::from(Span::styled(
                        format!("  {}", description),
                        Style::default().fg(Color::Gray),
                    )));
                }
            }
            lines.push(Line::default());
        }
    }

    if !analysis.similar_customers.is_empty() {
        lines.push(section_header("Similar customers"));
        for (i, customer) in analysis.similar_customers.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{}. ", i + 1),
                    Style::default().fg(Color::Magenta),
                ),
                Span::styled(
                    customer.display_name().to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {} match", customer.match_label()),
                    Style::default().fg(Color::Cyan),
                ),
            ]));
            if let Some(description) = &customer.description {
                lines.push(Line::from(Span::styled(
                    format!("   {}", description),
                    Style::default().fg(Color::Gray),
                )));
            }
            if !customer.industries.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("   {}", customer.industries.join(", ")),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
        lines.push(Line::default());
    }

    if let Some(recommendations) = &analysis.recommendations {
        for (title, entries) in [
            ("Implementation approach", &recommendations.implementation_approach),
            ("Integration strategy", &recommendations.integration_strategy),
            ("Training", &recommendations.training_recommendations),
        ] {
            if !entries.is_empty() {
                lines.push(section_header(title));
                for entry in entries {
                    lines.push(Line::from(vec![
                        Span::styled("→ ", Style::default().fg(Color::Cyan)),
                        Span::raw(entry.clone()),
                    ]));
                }
                lines.push(Line::default());
            }
        }

        if !recommendations.timeline_projection.is_empty() {
            lines.push(section_header("Timeline projection"));
            for (label, text) in &recommendations.timeline_projection {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("{}: ", label),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(text.clone()),
                ]));
            }
        }
    }

    if !analysis.has_report_body() {
        lines.push(Line::from(Span::styled(
            "The backend returned no report details for this analysis.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    lines
}

// ---- Chat ----

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, context_area] =
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(area);

    let suggestions_height = if app.suggestions.is_empty() {
        0
    } else {
        (app.suggestions.len().min(4) + 2) as u16
    };

    let chat_layout = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(suggestions_height),
        Constraint::Length(3),
    ])
    .split(chat_area);
    let log_area = chat_layout[0];
    let suggestions_area = chat_layout[1];
    let input_area = chat_layout[2];

    app.chat_height = log_area.height.saturating_sub(2);
    app.chat_width = log_area.width.saturating_sub(2);

    let log_focused = app.focus == FocusPane::Content;
    let log_color = if log_focused { Color::Cyan } else { Color::DarkGray };
    let log_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(log_color))
        .title(" Conversation ");

    let chat_text = if app.conversation.is_empty() && !app.conversation.request_pending() {
        Text::from(Span::styled(
            "Ask about this customer's fit...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in app.conversation.messages() {
            match msg.role {
                ChatRole::User => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                    lines.push(Line::from(msg.text.clone()));
                    lines.push(Line::default());
                }
                ChatRole::Assistant => {
                    lines.push(Line::from(Span::styled(
                        "AI:",
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    )));
                    lines.extend(render_tree_lines(&format_message(&msg.text)));
                    lines.push(Line::default());
                }
            }
        }

        if app.conversation.request_pending() {
            lines.push(Line::from(Span::styled(
                "AI:",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots(app.animation_frame)),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(log_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, log_area);

    // Suggested questions
    if suggestions_height > 0 {
        let focused = app.focus == FocusPane::Suggestions;
        let color = if focused { Color::Cyan } else { Color::Magenta };
        let items: Vec<ListItem> = app
            .suggestions
            .iter()
            .map(|s| ListItem::new(format!(" {} ", s)))
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color))
                    .title(" Suggestions (Enter to use) "),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::Magenta)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, suggestions_area, &mut app.suggestions_state);
    }

    // Input box; locked while a request is outstanding
    let input_focused = app.focus == FocusPane::Input;
    let pending = app.conversation.request_pending();
    let input_color = if pending {
        Color::DarkGray
    } else if input_focused || app.input_mode == InputMode::Editing {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let input_title = if pending {
        " Waiting for reply... "
    } else {
        " Ask (Tab to focus) "
    };

    let inner_width = input_area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width == 0 {
        0
    } else if app.chat_cursor >= inner_width {
        app.chat_cursor - inner_width + 1
    } else {
        0
    };
    let visible_text: String = app
        .chat_input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(input_color))
                .title(input_title),
        );
    frame.render_widget(input, input_area);

    if app.input_mode == InputMode::Editing && !pending {
        let cursor_x = (app.chat_cursor - scroll_offset) as u16;
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }

    // Right side: report context
    render_chat_context(app, frame, context_area);
}

fn render_chat_context(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Analysis ");

    match &app.report {
        Some(analysis) => {
            let report = Paragraph::new(report_lines(analysis))
                .wrap(Wrap { trim: false })
                .block(block);
            frame.render_widget(report, area);
        }
        None => {
            let placeholder = Paragraph::new("No analysis in context.")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(placeholder, area);
        }
    }
}

// ---- Formatted message rendering ----

fn fragments_to_spans(fragments: &[Fragment]) -> Vec<Span<'static>> {
    fragments
        .iter()
        .map(|fragment| match fragment {
            Fragment::Plain(text) => Span::raw(text.clone()),
            Fragment::Bold(text) => Span::styled(
                text.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        })
        .collect()
}

fn bullet_icon(category: ResponseCategory) -> (&'static str, Color) {
    match category {
        ResponseCategory::Strategy => ("→ ", Color::Cyan),
        ResponseCategory::Agenda => ("✓ ", Color::Green),
        _ => ("• ", Color::Gray),
    }
}

fn tone_color(tone: ValueTone) -> Option<Color> {
    match tone {
        ValueTone::Positive => Some(Color::Green),
        ValueTone::Negative => Some(Color::Red),
        ValueTone::Neutral => Some(Color::Blue),
        ValueTone::Plain => None,
    }
}

/// Turn a formatted message tree into styled terminal lines.
pub fn render_tree_lines(tree: &RenderTree) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    for (i, block) in tree.blocks.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }

        for (line_idx, render_line) in block.lines.iter().enumerate() {
            match render_line {
                RenderLine::Text { fragments } => {
                    if block.kind == BlockKind::Subject && line_idx == 0 {
                        let mut spans = vec![Span::styled(
                            "Subject: ",
                            Style::default()
                                .fg(Color::Cyan)
                                .add_modifier(Modifier::BOLD),
                        )];
                        spans.extend(fragments_to_spans(fragments).into_iter().map(|s| s.bold()));
                        lines.push(Line::from(spans));
                    } else {
                        lines.push(Line::from(fragments_to_spans(fragments)));
                    }
                }
                RenderLine::Numbered { number, fragments } => {
                    let badge_color = if block.kind == BlockKind::CustomerList {
                        Color::Magenta
                    } else {
                        Color::Cyan
                    };
                    let mut spans = vec![Span::styled(
                        format!("{}. ", number),
                        Style::default()
                            .fg(badge_color)
                            .add_modifier(Modifier::BOLD),
                    )];
                    spans.extend(fragments_to_spans(fragments));
                    lines.push(Line::from(spans));
                }
                RenderLine::Bullet { fragments } => {
                    let (icon, color) = bullet_icon(tree.category);
                    let mut spans = vec![Span::styled(icon, Style::default().fg(color))];
                    spans.extend(fragments_to_spans(fragments));
                    lines.push(Line::from(spans));
                }
                RenderLine::Score {
                    number,
                    label,
                    value,
                    tone,
                } => {
                    let mut spans = Vec::new();
                    if let Some(number) = number {
                        spans.push(Span::styled(
                            format!("{}. ", number),
                            Style::default().fg(Color::DarkGray),
                        ));
                    }
                    spans.push(Span::styled(
                        label.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ));
                    spans.push(Span::raw(": "));
                    spans.push(match tone_color(*tone) {
                        Some(color) => Span::styled(
                            value.clone(),
                            Style::default().fg(color).add_modifier(Modifier::BOLD),
                        ),
                        None => Span::raw(value.clone()),
                    });
                    lines.push(Line::from(spans));
                }
            }
        }
    }

    lines
}

// ---- Popups ----

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn render_model_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let popup = centered_rect(50, 12, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Backend model (Enter to apply) ");

    let Some(config) = &app.model_config else {
        let placeholder = Paragraph::new("Loading model config...")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, popup);
        return;
    };

    let items: Vec<ListItem> = config
        .available_models
        .iter()
        .map(|model| {
            let marker = if config.model.as_deref() == Some(model.as_str()) {
                "● "
            } else {
                "  "
            };
            ListItem::new(format!("{}{}", marker, model))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Yellow)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, popup, &mut app.model_picker_state);
}

fn render_email_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let popup = centered_rect(40, EMAIL_TYPES.len() as u16 + 2, area);
    frame.render_widget(Clear, popup);

    let items: Vec<ListItem> = EMAIL_TYPES
        .iter()
        .map(|t| ListItem::new(format!(" {} ", t)))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(" Draft email (Enter to generate) "),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Yellow)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, popup, &mut app.email_picker_state);
}

fn dots(frame: u8) -> String {
    ".".repeat((frame as usize) + 1)
}
