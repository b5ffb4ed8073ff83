//! Terminal rendering of a visited page.
//!
//! Page bodies are Markdown; for the terminal they are flattened to plain
//! text. The JSON shape ([`PageView`]) is the stable machine contract: it
//! carries the raw body, the choices, and the navigation context (active
//! history, back pointer, favorited flag).

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use serde::Serialize;
use skein_core::nav::VisitOutcome;
use std::io::{self, Write};

use crate::output::{pretty_kv, pretty_rule};

/// Machine-readable view of one visit, emitted by `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub story: String,
    pub story_title: String,
    pub page: String,
    pub name: String,
    pub body: String,
    pub choices: Vec<Choice>,
    /// Active history index. Valid only for this response; merges may
    /// shift it on the next visit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back: Option<String>,
    pub favorited: bool,
    pub guest: bool,
    pub preview: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Choice {
    pub label: String,
    pub target: String,
}

impl From<&VisitOutcome> for PageView {
    fn from(out: &VisitOutcome) -> Self {
        Self {
            story: out.story.to_string(),
            story_title: out.story_title.clone(),
            page: out.page.id.to_string(),
            name: out.page.name.clone(),
            body: out.page.body.clone(),
            choices: out
                .page
                .links
                .iter()
                .map(|link| Choice {
                    label: if link.label.is_empty() {
                        link.target.to_string()
                    } else {
                        link.label.clone()
                    },
                    target: link.target.to_string(),
                })
                .collect(),
            history: out.active_history,
            back: out.back.as_ref().map(ToString::to_string),
            favorited: out.favorited,
            guest: out.guest,
            preview: out.preview,
        }
    }
}

impl PageView {
    /// Render for human consumption.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let mut banners = Vec::new();
        if self.preview {
            banners.push("preview");
        }
        if self.guest {
            banners.push("guest");
        }
        if self.favorited {
            banners.push("favorited ★");
        }

        let heading = if self.name.is_empty() {
            self.page.clone()
        } else {
            self.name.clone()
        };
        writeln!(w, "{} — {}", self.story_title, heading)?;
        pretty_rule(w)?;

        let body = flatten_markdown(&self.body);
        if !body.is_empty() {
            writeln!(w, "{body}")?;
            writeln!(w)?;
        }

        if self.choices.is_empty() {
            writeln!(w, "(the story ends here)")?;
        } else {
            writeln!(w, "Choices:")?;
            for (i, choice) in self.choices.iter().enumerate() {
                writeln!(w, "  {}. {}  [{}]", i + 1, choice.label, choice.target)?;
            }
        }
        writeln!(w)?;

        if let Some(back) = &self.back {
            pretty_kv(w, "back", back)?;
        }
        if let Some(history) = self.history {
            pretty_kv(w, "history", history.to_string())?;
        }
        if !banners.is_empty() {
            pretty_kv(w, "mode", banners.join(", "))?;
        }

        // Spell out how to take a choice so the next command carries the
        // navigation context the engine needs.
        if !self.choices.is_empty() {
            let hint = self.history.map_or_else(
                || format!("sk visit {} <page>", self.story),
                |h| format!("sk visit {} <page> --from {} --history {h}", self.story, self.page),
            );
            pretty_kv(w, "next", hint)?;
        }

        Ok(())
    }
}

/// Flatten Markdown to plain terminal text: paragraphs become blocks,
/// emphasis and links keep their text, code spans keep their literal.
fn flatten_markdown(markdown: &str) -> String {
    let mut out = String::new();
    for event in Parser::new(markdown) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak => out.push(' '),
            Event::HardBreak => out.push('\n'),
            Event::Start(Tag::Item) => out.push_str("- "),
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item) => {
                out.push('\n');
            }
            _ => {}
        }
    }
    out.trim_end().to_string()
}
