use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::domain::digest::DigestEntry;
use crate::domain::ticket::Ticket;

/// Forum topic inside the destination chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Html,
}

impl ParseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Html => "HTML",
        }
    }
}

/// Message text ready for delivery, with every upstream value already escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedText {
    pub text: String,
    pub parse_mode: ParseMode,
}

impl FormattedText {
    pub fn html(text: String) -> Self {
        Self {
            text,
            parse_mode: ParseMode::Html,
        }
    }

    pub fn new_ticket(ticket: &Ticket, link: &str) -> Self {
        Self::html(format!(
            "🆕 <b>New ticket!</b>\n\
             🔢 <b>Ticket:</b> <a href=\"{}\">{}</a>\n\
             📌 <b>Subject:</b> {}\n\
             👤 <b>Requester:</b> {}",
            encode_double_quoted_attribute(link),
            encode_text(ticket.id.as_str()),
            encode_text(&ticket.subject),
            encode_text(&ticket.requester),
        ))
    }

    pub fn version_released(version: &str) -> Self {
        Self::html(format!(
            "🆕 New M.E.Doc version released: <b>{}</b>.\nPlease update!",
            encode_text(version)
        ))
    }

    /// `None` when there is nothing to report.
    pub fn daily_digest(entries: &[DigestEntry]) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }
        let mut text = String::from("Today's summary:\n");
        for entry in entries {
            text.push_str(&format!(
                "{}: {} messages\n",
                encode_text(entry.display_name()),
                entry.message_count
            ));
        }
        Some(Self::html(text))
    }
}
