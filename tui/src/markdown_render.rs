//! Markdown to ratatui lines, driven by `pulldown-cmark` events.
//!
//! Block structure (paragraphs, headings, lists, quotes, code blocks) maps to
//! separate lines; inline emphasis maps to span styles. Rendering never fails:
//! anything the writer does not understand is dropped or shown as plain text.

use pulldown_cmark::CodeBlockKind;
use pulldown_cmark::CowStr;
use pulldown_cmark::Event;
use pulldown_cmark::HeadingLevel;
use pulldown_cmark::Options;
use pulldown_cmark::Parser;
use pulldown_cmark::Tag;
use pulldown_cmark::TagEnd;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;

use crate::wrapping::RtOptions;
use crate::wrapping::word_wrap_line;
use crate::wrapping::word_wrap_lines;

const RULE: &str = "———";

/// Renders `source` as styled lines. With `width`, long lines are wrapped and
/// continuation rows keep the list/quote indentation of the row they belong to.
pub(crate) fn render_markdown_lines(source: &str, width: Option<usize>) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let mut writer = Writer::default();
    for event in Parser::new_ext(source, options) {
        writer.handle_event(event);
    }
    writer.finish_line();

    match width {
        None => writer.lines,
        Some(width) => writer
            .lines
            .iter()
            .zip(&writer.continuations)
            .flat_map(|(line, continuation)| {
                word_wrap_line(
                    line,
                    &RtOptions::new(width).subsequent_indent(continuation.clone()),
                )
            })
            .collect(),
    }
}

/// Literal source lines, wrapped but otherwise untouched.
pub(crate) fn render_raw_lines(source: &str, width: usize) -> Vec<Line<'static>> {
    let lines: Vec<Line<'_>> = source.lines().map(Line::from).collect();
    word_wrap_lines(lines.iter(), RtOptions::new(width))
}

#[derive(Debug)]
struct ListState {
    next_number: Option<u64>,
}

#[derive(Default)]
struct Writer {
    lines: Vec<Line<'static>>,
    /// Prefix for wrapped continuation rows, parallel to `lines`.
    continuations: Vec<Line<'static>>,
    current: Option<Vec<Span<'static>>>,
    current_continuation: Line<'static>,
    inline_styles: Vec<Style>,
    lists: Vec<ListState>,
    item_indents: Vec<String>,
    pending_marker: Option<Span<'static>>,
    quote_depth: usize,
    link: Option<String>,
    in_code_block: bool,
    needs_blank: bool,
}

impl Writer {
    fn handle_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(text),
            Event::Code(code) => {
                let style = self.style().cyan();
                self.push_span(Span::styled(code.into_string(), style));
            }
            Event::Html(html) | Event::InlineHtml(html) => self.text(html),
            Event::SoftBreak | Event::HardBreak => self.finish_line(),
            Event::Rule => {
                self.start_block();
                self.push_span(RULE.into());
                self.finish_line();
                self.needs_blank = true;
            }
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.start_block(),
            Tag::Heading { level, .. } => {
                self.start_block();
                let style = heading_style(level);
                self.inline_styles.push(style);
                let hashes = "#".repeat(level as usize);
                self.push_span(Span::styled(format!("{hashes} "), style));
            }
            Tag::BlockQuote => {
                self.start_block();
                self.quote_depth += 1;
                self.inline_styles.push(Style::new().green());
            }
            Tag::CodeBlock(kind) => {
                self.start_block();
                self.in_code_block = true;
                if let CodeBlockKind::Fenced(lang) = kind {
                    tracing::trace!(lang = %lang, "rendering fenced code block");
                }
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.start_block();
                } else {
                    self.finish_line();
                }
                self.lists.push(ListState { next_number: start });
            }
            Tag::Item => {
                self.finish_line();
                self.needs_blank = false;
                let depth = self.lists.len().saturating_sub(1);
                let indent = "    ".repeat(depth);
                let marker = match self.lists.last_mut().and_then(|l| l.next_number.as_mut()) {
                    Some(number) => {
                        let marker = Span::styled(format!("{indent}{number}. "), Style::new().light_blue());
                        *number += 1;
                        marker
                    }
                    None => Span::raw(format!("{indent}- ")),
                };
                self.item_indents.push(" ".repeat(marker.width()));
                self.pending_marker = Some(marker);
            }
            Tag::Emphasis => self.push_inline(Style::new().italic()),
            Tag::Strong => self.push_inline(Style::new().bold()),
            Tag::Strikethrough => self.push_inline(Style::new().crossed_out()),
            Tag::Link { dest_url, .. } => self.link = Some(dest_url.into_string()),
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.end_block(),
            TagEnd::Heading(_) => {
                self.inline_styles.pop();
                self.end_block();
            }
            TagEnd::BlockQuote => {
                self.finish_line();
                self.inline_styles.pop();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.needs_blank = true;
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.end_block();
            }
            TagEnd::List(_) => {
                self.finish_line();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.needs_blank = true;
                }
            }
            TagEnd::Item => {
                self.finish_line();
                self.item_indents.pop();
                self.pending_marker = None;
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.inline_styles.pop();
            }
            TagEnd::Link => {
                if let Some(url) = self.link.take() {
                    self.push_span(" (".into());
                    self.push_span(url.cyan().underlined());
                    self.push_span(")".into());
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: CowStr<'_>) {
        if self.in_code_block {
            let style = self.style().cyan();
            for (idx, part) in text.split('\n').enumerate() {
                if idx > 0 {
                    self.finish_line();
                }
                if !part.is_empty() {
                    self.push_span(Span::styled(part.to_string(), style));
                }
            }
        } else {
            let style = self.style();
            self.push_span(Span::styled(text.into_string(), style));
        }
    }

    fn style(&self) -> Style {
        self.inline_styles
            .iter()
            .fold(Style::default(), |acc, style| acc.patch(*style))
    }

    fn push_inline(&mut self, style: Style) {
        let combined = self.style().patch(style);
        self.inline_styles.push(combined);
    }

    fn push_span(&mut self, span: Span<'static>) {
        if self.current.is_none() {
            let (prefix, continuation) = self.line_prefix();
            self.current = Some(prefix);
            self.current_continuation = continuation;
        }
        if let Some(spans) = self.current.as_mut() {
            spans.push(span);
        }
    }

    fn line_prefix(&mut self) -> (Vec<Span<'static>>, Line<'static>) {
        let mut prefix = Vec::new();
        let mut continuation = Vec::new();
        if self.quote_depth > 0 {
            let quote = Span::styled("> ".repeat(self.quote_depth), Style::new().green());
            prefix.push(quote.clone());
            continuation.push(quote);
        }
        let indent = self.item_indents.last().cloned().unwrap_or_default();
        match self.pending_marker.take() {
            Some(marker) => prefix.push(marker),
            None if !indent.is_empty() => prefix.push(Span::raw(indent.clone())),
            None => {}
        }
        if !indent.is_empty() {
            continuation.push(Span::raw(indent));
        }
        (prefix, Line::from(continuation))
    }

    fn finish_line(&mut self) {
        if let Some(spans) = self.current.take() {
            self.lines.push(Line::from(spans));
            self.continuations
                .push(std::mem::take(&mut self.current_continuation));
        }
    }

    fn start_block(&mut self) {
        self.finish_line();
        if self.needs_blank && !self.lines.is_empty() {
            self.lines.push(Line::default());
            self.continuations.push(Line::default());
        }
        self.needs_blank = false;
    }

    fn end_block(&mut self) {
        self.finish_line();
        self.needs_blank = true;
    }
}

fn heading_style(level: HeadingLevel) -> Style {
    match level {
        HeadingLevel::H1 => Style::new().bold().underlined(),
        HeadingLevel::H2 => Style::new().bold(),
        HeadingLevel::H3 => Style::new().bold().italic(),
        _ => Style::new().italic(),
    }
}
