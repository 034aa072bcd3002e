use chrono::Utc;

/// Ordered, timestamped record of what a single parse did.
#[derive(Debug, Default, Clone)]
pub struct ParseLog {
    lines: Vec<String>,
}

impl ParseLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::debug!("{}", message);
        self.lines
            .push(format!("[{}] {}", Utc::now().format("%H:%M:%S%.3f"), message));
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

/// Strips the leading `[HH:MM:SS.mmm] ` stamp from an audit line.
pub fn message_of(line: &str) -> &str {
    match line.find("] ") {
        Some(idx) if line.starts_with('[') => &line[idx + 2..],
        _ => line,
    }
}
