//! Plain-text output for the terminal.

use crate::models::{copy_text, Content, Event, SessionSummary};

/// One app per line, the selected one marked with `*`.
pub fn format_apps(apps: &[String], selected: Option<&str>) -> String {
    if apps.is_empty() {
        return "No apps available.".to_string();
    }
    apps.iter()
        .map(|app| {
            let marker = if Some(app.as_str()) == selected { '*' } else { ' ' };
            format!("{} {}", marker, app)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Session ids with their last update time.
pub fn format_sessions(sessions: &[SessionSummary], current: Option<&str>) -> String {
    if sessions.is_empty() {
        return "No sessions.".to_string();
    }
    sessions
        .iter()
        .map(|s| {
            let marker = if Some(s.id.as_str()) == current { '*' } else { ' ' };
            let updated = s
                .last_updated()
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string());
            format!("{} {}  {}", marker, s.id, updated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A whole transcript, each event headed by its author.
pub fn format_transcript(events: &[Event]) -> String {
    let blocks: Vec<String> = events
        .iter()
        .map(|event| format!("[{}]\n{}", event.author, copy_text(event)))
        .collect();
    if blocks.is_empty() {
        "No messages.".to_string()
    } else {
        blocks.join("\n\n")
    }
}

/// Non-text parts of an event (tool calls, responses, code results, errors)
/// as plain text.
fn details(event: &Event) -> String {
    let mut rest = event.clone();
    rest.content = event.content.as_ref().map(|c| Content {
        role: c.role.clone(),
        parts: c.parts.iter().filter(|p| !p.is_text()).cloned().collect(),
    });
    copy_text(&rest)
}

/// Turns successive transcript snapshots into incremental terminal output.
///
/// Text of an in-flight event is written as it grows. Once an event is final
/// its non-text parts follow. User events are not echoed.
#[derive(Debug)]
pub struct StreamPrinter {
    index: usize,
    printed: String,
    details_done: bool,
    line_open: bool,
    started: bool,
}

impl StreamPrinter {
    /// Print events from `start` onward; earlier ones are already on screen.
    pub fn new(start: usize) -> Self {
        Self {
            index: start,
            printed: String::new(),
            details_done: false,
            line_open: false,
            started: false,
        }
    }

    /// Output owed for the latest snapshot.
    pub fn render(&mut self, events: &[Event]) -> String {
        let mut out = String::new();
        for (i, event) in events.iter().enumerate().skip(self.index) {
            if event.is_user() {
                continue;
            }
            if i != self.index || !self.started {
                self.begin(i, event, &mut out);
            }

            let text = event.text();
            match text.strip_prefix(self.printed.as_str()) {
                Some(rest) => self.push(&mut out, rest),
                None => {
                    // Final text replaced the streamed text.
                    self.push(&mut out, "\n");
                    self.push(&mut out, &text);
                }
            }
            self.printed = text;

            if !event.is_partial() && !self.details_done {
                let details = details(event);
                if !details.is_empty() {
                    if !self.printed.is_empty() && self.line_open {
                        self.push(&mut out, "\n");
                    }
                    self.push(&mut out, &details);
                }
                self.details_done = true;
            }
        }
        out
    }

    /// Trailing newline, if the last line is still open.
    pub fn finish(&mut self) -> String {
        if self.line_open {
            self.line_open = false;
            "\n".to_string()
        } else {
            String::new()
        }
    }

    fn begin(&mut self, index: usize, event: &Event, out: &mut String) {
        if self.line_open {
            self.push(out, "\n");
        }
        self.push(out, &format!("[{}] ", event.author));
        self.index = index;
        self.printed.clear();
        self.details_done = false;
        self.started = true;
    }

    fn push(&mut self, out: &mut String, s: &str) {
        if !s.is_empty() {
            out.push_str(s);
            self.line_open = !s.ends_with('\n');
        }
    }
}
