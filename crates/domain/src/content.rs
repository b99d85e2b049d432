//! Markdown rendering and read-time estimation for post bodies.

use pulldown_cmark::{html, Event, Options, Parser, TagEnd};
use serde::{Deserialize, Serialize};

use crate::error::BlogError;

pub const DEFAULT_WORDS_PER_MINUTE: u32 = 200;

/// Average reading speed used to derive read time, in words per minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ReadingSpeed(u32);

impl ReadingSpeed {
    pub fn new(words_per_minute: u32) -> Result<Self, BlogError> {
        if words_per_minute == 0 {
            return Err(BlogError::validation(
                "words_per_minute",
                "Reading speed must be greater than zero.",
            ));
        }
        Ok(Self(words_per_minute))
    }

    pub fn words_per_minute(&self) -> u32 {
        self.0
    }
}

impl Default for ReadingSpeed {
    fn default() -> Self {
        Self(DEFAULT_WORDS_PER_MINUTE)
    }
}

impl TryFrom<u32> for ReadingSpeed {
    type Error = BlogError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ReadingSpeed> for u32 {
    fn from(speed: ReadingSpeed) -> Self {
        speed.0
    }
}

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options
}

/// Renders markdown source to HTML. Output depends only on the input.
pub fn render_markdown(source: &str) -> String {
    let parser = Parser::new_ext(source, parser_options());
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Words in the rendered text of a markdown document. Raw HTML is markup, not text.
pub fn rendered_word_count(source: &str) -> usize {
    let mut text = String::with_capacity(source.len());
    for event in Parser::new_ext(source, parser_options()) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak | Event::Rule => text.push(' '),
            // inline spans do not split words
            Event::End(
                TagEnd::Emphasis
                | TagEnd::Strong
                | TagEnd::Strikethrough
                | TagEnd::Link
                | TagEnd::Image,
            ) => {}
            Event::End(_) => text.push(' '),
            _ => {}
        }
    }
    text.split_whitespace().count()
}

/// `max(1, round(words / speed))`
pub fn read_time_minutes(words: usize, speed: ReadingSpeed) -> i64 {
    let minutes = (words as f64 / speed.words_per_minute() as f64).round() as i64;
    minutes.max(1)
}

/// Read time of a markdown body, counted over its rendered text.
pub fn estimate_read_time(markdown: &str, speed: ReadingSpeed) -> i64 {
    read_time_minutes(rendered_word_count(markdown), speed)
}
