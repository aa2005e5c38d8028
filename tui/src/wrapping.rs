//! Span-preserving word wrap for ratatui lines.
//!
//! `textwrap` decides where lines break on the flattened text; the byte
//! ranges of each wrapped row are then mapped back onto the original spans so
//! styling survives the wrap.

use std::ops::Range;

use ratatui::text::Line;
use ratatui::text::Span;

#[derive(Debug, Clone)]
pub(crate) struct RtOptions<'a> {
    width: usize,
    initial_indent: Line<'a>,
    subsequent_indent: Line<'a>,
}

impl<'a> RtOptions<'a> {
    pub(crate) fn new(width: usize) -> Self {
        Self {
            width,
            initial_indent: Line::default(),
            subsequent_indent: Line::default(),
        }
    }

    pub(crate) fn initial_indent(self, initial_indent: Line<'a>) -> Self {
        Self {
            initial_indent,
            ..self
        }
    }

    pub(crate) fn subsequent_indent(self, subsequent_indent: Line<'a>) -> Self {
        Self {
            subsequent_indent,
            ..self
        }
    }
}

/// Wraps a single line. The first row gets `initial_indent`, the rest
/// `subsequent_indent`.
pub(crate) fn word_wrap_line(line: &Line<'_>, opts: &RtOptions<'_>) -> Vec<Line<'static>> {
    let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
    if text.is_empty() {
        return vec![indent_only(&opts.initial_indent, line)];
    }
    let initial_width = opts.initial_indent.width();
    let subsequent_width = opts.subsequent_indent.width();
    let initial_pad = " ".repeat(initial_width);
    let subsequent_pad = " ".repeat(subsequent_width);
    let wrap_width = opts
        .width
        .max(initial_width.max(subsequent_width).saturating_add(1));
    let wrap_opts = textwrap::Options::new(wrap_width)
        .initial_indent(&initial_pad)
        .subsequent_indent(&subsequent_pad);

    let mut out = Vec::new();
    let mut cursor = 0usize;
    for (row, wrapped) in textwrap::wrap(&text, &wrap_opts).iter().enumerate() {
        let (indent, pad) = if row == 0 {
            (&opts.initial_indent, &initial_pad)
        } else {
            (&opts.subsequent_indent, &subsequent_pad)
        };
        let body = wrapped.strip_prefix(pad.as_str()).unwrap_or(wrapped);
        let mut spans: Vec<Span<'static>> = indent.spans.iter().map(span_to_static).collect();
        match locate(&text, cursor, body) {
            Some(range) => {
                cursor = range.end;
                spans.extend(slice_spans(line, range));
            }
            None => spans.push(Span::styled(body.to_string(), line.style)),
        }
        out.push(Line::from(spans).style(line.style));
    }
    if out.is_empty() {
        out.push(indent_only(&opts.initial_indent, line));
    }
    out
}

fn indent_only(indent: &Line<'_>, line: &Line<'_>) -> Line<'static> {
    let spans: Vec<Span<'static>> = indent.spans.iter().map(span_to_static).collect();
    Line::from(spans).style(line.style)
}

/// Wraps every line; only the very first output row gets `initial_indent`.
pub(crate) fn word_wrap_lines<'a, I>(lines: I, opts: RtOptions<'_>) -> Vec<Line<'static>>
where
    I: IntoIterator<Item = &'a Line<'a>>,
{
    let continuation = opts
        .clone()
        .initial_indent(opts.subsequent_indent.clone());
    let mut out = Vec::new();
    for (idx, line) in lines.into_iter().enumerate() {
        let line_opts = if idx == 0 { &opts } else { &continuation };
        out.extend(word_wrap_line(line, line_opts));
    }
    out
}

fn locate(text: &str, cursor: usize, body: &str) -> Option<Range<usize>> {
    if body.is_empty() {
        return Some(cursor..cursor);
    }
    let rest = text.get(cursor..)?;
    let start = cursor + rest.find(body)?;
    Some(start..start + body.len())
}

fn slice_spans(line: &Line<'_>, range: Range<usize>) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut offset = 0usize;
    for span in &line.spans {
        let content = span.content.as_ref();
        let span_range = offset..offset + content.len();
        offset = span_range.end;
        let start = range.start.max(span_range.start);
        let end = range.end.min(span_range.end);
        if start >= end {
            continue;
        }
        if let Some(piece) = content.get(start - span_range.start..end - span_range.start) {
            spans.push(Span::styled(piece.to_string(), span.style));
        }
    }
    spans
}

fn span_to_static(span: &Span<'_>) -> Span<'static> {
    Span::styled(span.content.to_string(), span.style)
}
