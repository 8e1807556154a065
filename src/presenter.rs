//! Presenter layout template.
//!
//! The presenter surface is described by a template string with `{token}`
//! placeholders. Templates are parsed once, when configuration loads, into
//! literal text and [`Widget`] segments; rendering looks widgets up in a
//! static table and never re-parses.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use chrono::format::{Item, StrftimeItems};
use regex::Regex;

use crate::layout::{ImageRequest, SlideSize};
use crate::notes::Notes;

pub const DEFAULT_LAYOUT: &str = "\
Time {clock}   Elapsed {stopwatch}   Slide {page}/{pages}
{current-slide}  {next-slide}
{notes}";

pub const DEFAULT_CLOCK_FORMAT: &str = "%H:%M";
pub const DEFAULT_STOPWATCH_FORMAT: &str = "%H:%M:%S";

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z][a-z-]*)\}").expect("token pattern is valid"));

/// Live values a widget can draw from.
#[derive(Debug, Clone)]
pub struct WidgetContext<'a> {
    pub page: usize,
    pub max_page: usize,
    pub elapsed_seconds: u64,
    pub now: NaiveDateTime,
    pub clock_format: &'a str,
    pub stopwatch_format: &'a str,
    pub notes: &'a Notes,
    pub cache_dir: &'a Path,
    pub current_width: u32,
    pub next_width: u32,
}

/// Rendered output of one widget or literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    Image(ImageRequest),
}

type WidgetFn = fn(&WidgetContext<'_>) -> Option<Fragment>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Widget {
    Clock,
    Stopwatch,
    Page,
    Pages,
    CurrentSlide,
    NextSlide,
    Notes,
}

const WIDGETS: [(Widget, &str, WidgetFn); 7] = [
    (Widget::Clock, "clock", clock_widget),
    (Widget::Stopwatch, "stopwatch", stopwatch_widget),
    (Widget::Page, "page", page_widget),
    (Widget::Pages, "pages", pages_widget),
    (Widget::CurrentSlide, "current-slide", current_slide_widget),
    (Widget::NextSlide, "next-slide", next_slide_widget),
    (Widget::Notes, "notes", notes_widget),
];

impl Widget {
    pub fn from_token(token: &str) -> Option<Self> {
        WIDGETS
            .iter()
            .find(|(_, name, _)| *name == token)
            .map(|(widget, _, _)| *widget)
    }

    pub fn token(self) -> &'static str {
        WIDGETS
            .iter()
            .find(|(widget, _, _)| *widget == self)
            .map_or("", |(_, name, _)| name)
    }

    fn render(self, ctx: &WidgetContext<'_>) -> Option<Fragment> {
        WIDGETS
            .iter()
            .find(|(widget, _, _)| *widget == self)
            .and_then(|(_, _, render)| render(ctx))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Widget(Widget),
}

/// A parsed presenter layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    lines: Vec<Vec<Segment>>,
    unknown: Vec<String>,
}

impl Template {
    /// Parse a layout. Unrecognized `{tokens}` are kept as literal text.
    pub fn parse(source: &str) -> Self {
        let mut unknown = Vec::new();
        let lines = source
            .lines()
            .map(|line| {
                let mut segments = Vec::new();
                let mut literal = String::new();
                let mut last = 0;
                for caps in TOKEN_RE.captures_iter(line) {
                    let Some(whole) = caps.get(0) else { continue };
                    literal.push_str(&line[last..whole.start()]);
                    match Widget::from_token(&caps[1]) {
                        Some(widget) => {
                            if !literal.is_empty() {
                                segments.push(Segment::Literal(std::mem::take(&mut literal)));
                            }
                            segments.push(Segment::Widget(widget));
                        }
                        None => {
                            unknown.push(caps[1].to_string());
                            literal.push_str(whole.as_str());
                        }
                    }
                    last = whole.end();
                }
                literal.push_str(&line[last..]);
                if !literal.is_empty() {
                    segments.push(Segment::Literal(literal));
                }
                segments
            })
            .collect();
        for token in &unknown {
            tracing::warn!(token, "unknown layout token left as text");
        }
        Self { lines, unknown }
    }

    pub fn lines(&self) -> &[Vec<Segment>] {
        &self.lines
    }

    /// Tokens that looked like placeholders but name no widget.
    pub fn unknown_tokens(&self) -> &[String] {
        &self.unknown
    }

    pub fn uses(&self, widget: Widget) -> bool {
        self.lines
            .iter()
            .flatten()
            .any(|segment| *segment == Segment::Widget(widget))
    }

    /// Expand every widget against `ctx`.
    ///
    /// Adjacent text is merged so each line is a short run of text and image
    /// fragments. Widgets with nothing to show vanish.
    pub fn render(&self, ctx: &WidgetContext<'_>) -> Vec<Vec<Fragment>> {
        self.lines
            .iter()
            .map(|line| {
                let mut out: Vec<Fragment> = Vec::new();
                for segment in line {
                    let fragment = match segment {
                        Segment::Literal(text) => Fragment::Text(text.clone()),
                        Segment::Widget(widget) => {
                            let Some(fragment) = widget.render(ctx) else {
                                continue;
                            };
                            fragment
                        }
                    };
                    if let Fragment::Text(text) = &fragment
                        && let Some(Fragment::Text(prev)) = out.last_mut()
                    {
                        prev.push_str(text);
                        continue;
                    }
                    out.push(fragment);
                }
                out
            })
            .collect()
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::parse(DEFAULT_LAYOUT)
    }
}

/// Whether a strftime format contains only recognized specifiers.
pub fn is_valid_clock_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

pub fn format_clock(now: &NaiveDateTime, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", now.format(format)).is_err() {
        out.clear();
        let _ = write!(out, "{}", now.format(DEFAULT_CLOCK_FORMAT));
    }
    out
}

/// Format elapsed seconds: `%H`, `%M`, `%S` zero padded, `%h` bare hours.
pub fn format_stopwatch(seconds: u64, format: &str) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('H') => {
                let _ = write!(out, "{hours:02}");
            }
            Some('h') => {
                let _ = write!(out, "{hours}");
            }
            Some('M') => {
                let _ = write!(out, "{minutes:02}");
            }
            Some('S') => {
                let _ = write!(out, "{secs:02}");
            }
            Some('%') => out.push('%'),
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }
    out
}

fn clock_widget(ctx: &WidgetContext<'_>) -> Option<Fragment> {
    Some(Fragment::Text(format_clock(&ctx.now, ctx.clock_format)))
}

fn stopwatch_widget(ctx: &WidgetContext<'_>) -> Option<Fragment> {
    Some(Fragment::Text(format_stopwatch(
        ctx.elapsed_seconds,
        ctx.stopwatch_format,
    )))
}

fn page_widget(ctx: &WidgetContext<'_>) -> Option<Fragment> {
    Some(Fragment::Text(ctx.page.to_string()))
}

fn pages_widget(ctx: &WidgetContext<'_>) -> Option<Fragment> {
    Some(Fragment::Text(ctx.max_page.to_string()))
}

fn current_slide_widget(ctx: &WidgetContext<'_>) -> Option<Fragment> {
    Some(Fragment::Image(ImageRequest::new(
        ctx.cache_dir,
        ctx.page,
        SlideSize::Width(ctx.current_width),
    )))
}

fn next_slide_widget(ctx: &WidgetContext<'_>) -> Option<Fragment> {
    (ctx.page < ctx.max_page).then(|| {
        Fragment::Image(ImageRequest::new(
            ctx.cache_dir,
            ctx.page + 1,
            SlideSize::Width(ctx.next_width),
        ))
    })
}

fn notes_widget(ctx: &WidgetContext<'_>) -> Option<Fragment> {
    ctx.notes
        .lookup(ctx.page)
        .map(|text| Fragment::Text(text.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::notes::Note;

    fn notes() -> Notes {
        Notes::new(vec![
            Note {
                start: 3,
                end: 5,
                text: "A".to_string(),
            },
            Note {
                start: 6,
                end: 6,
                text: "B".to_string(),
            },
        ])
    }

    fn ctx(notes: &Notes, page: usize) -> WidgetContext<'_> {
        WidgetContext {
            page,
            max_page: 6,
            elapsed_seconds: 3725,
            now: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(9, 5, 7)
                .unwrap(),
            clock_format: DEFAULT_CLOCK_FORMAT,
            stopwatch_format: DEFAULT_STOPWATCH_FORMAT,
            notes,
            cache_dir: Path::new("/cache"),
            current_width: 400,
            next_width: 200,
        }
    }

    #[test]
    fn test_parse_splits_literals_and_widgets() {
        let template = Template::parse("Slide {page} of {pages}");
        assert_eq!(
            template.lines()[0],
            vec![
                Segment::Literal("Slide ".to_string()),
                Segment::Widget(Widget::Page),
                Segment::Literal(" of ".to_string()),
                Segment::Widget(Widget::Pages),
            ]
        );
    }

    #[test]
    fn test_unknown_tokens_stay_verbatim() {
        let notes = notes();
        let template = Template::parse("{weather} on {page}");
        assert_eq!(template.unknown_tokens(), ["weather".to_string()]);
        let out = template.render(&ctx(&notes, 4));
        assert_eq!(out[0], vec![Fragment::Text("{weather} on 4".to_string())]);
    }

    #[test]
    fn test_render_text_widgets() {
        let notes = notes();
        let template = Template::parse("{clock} | {stopwatch} | {page}/{pages}");
        let out = template.render(&ctx(&notes, 2));
        assert_eq!(out[0], vec![Fragment::Text("09:05 | 01:02:05 | 2/6".to_string())]);
    }

    #[test]
    fn test_render_slide_thumbnails() {
        let notes = notes();
        let template = Template::parse("{current-slide} {next-slide}");
        let out = template.render(&ctx(&notes, 2));
        assert_eq!(
            out[0],
            vec![
                Fragment::Image(ImageRequest::new(Path::new("/cache"), 2, SlideSize::Width(400))),
                Fragment::Text(" ".to_string()),
                Fragment::Image(ImageRequest::new(Path::new("/cache"), 3, SlideSize::Width(200))),
            ]
        );
    }

    #[test]
    fn test_next_slide_empty_on_last_page() {
        let notes = notes();
        let template = Template::parse("{next-slide}");
        assert!(template.render(&ctx(&notes, 6))[0].is_empty());
    }

    #[test]
    fn test_notes_widget_matches_range() {
        let notes = notes();
        let template = Template::parse("{notes}");
        assert_eq!(template.render(&ctx(&notes, 4))[0], vec![Fragment::Text("A".to_string())]);
        assert_eq!(template.render(&ctx(&notes, 6))[0], vec![Fragment::Text("B".to_string())]);
        assert!(template.render(&ctx(&notes, 1))[0].is_empty());
    }

    #[test]
    fn test_uses_reports_widgets() {
        let template = Template::default();
        assert!(template.uses(Widget::Clock));
        assert!(template.uses(Widget::Notes));
        assert!(!Template::parse("{page}").uses(Widget::Clock));
    }

    #[test]
    fn test_widget_table_round_trips_tokens() {
        for (widget, name, _) in WIDGETS {
            assert_eq!(Widget::from_token(name), Some(widget));
            assert_eq!(widget.token(), name);
        }
        assert_eq!(Widget::from_token("Clock"), None);
    }

    #[test]
    fn test_stopwatch_format_specifiers() {
        assert_eq!(format_stopwatch(59, "%M:%S"), "00:59");
        assert_eq!(format_stopwatch(3725, "%h:%M:%S"), "1:02:05");
        assert_eq!(format_stopwatch(5, "100%% %x"), "100% %x");
    }

    #[test]
    fn test_clock_format_validation() {
        assert!(is_valid_clock_format("%H:%M:%S"));
        assert!(!is_valid_clock_format("%Q"));
    }
}
