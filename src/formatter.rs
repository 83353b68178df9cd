//! Sectioning of the AI-generated recommendation narrative
//!
//! The narrative is free text with loose markdown-like headings. It is split
//! into up to four sections by an ordered list of independent rules, each
//! naming where its section starts and which markers end it. Sections are
//! extracted independently, so a heading missing from the text simply drops
//! its section; extraction never fails.
//!
//! Section bodies become a small inline model (`Text`, `Strong`, `LineBreak`,
//! `Bullet`) that the terminal renderer styles.

use regex::Regex;
use std::sync::OnceLock;

/// The sections a narrative can be split into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// Leading text before the first heading
    Intro,
    /// Comparative analysis
    Analysis,
    /// Recommendation and its grounds
    Conclusion,
    /// Information the model still needs from the user
    AdditionalInfo,
}

impl SectionKind {
    /// Display heading; the intro has none
    pub fn title(&self) -> Option<&'static str> {
        match self {
            SectionKind::Intro => None,
            SectionKind::Analysis => Some("분석"),
            SectionKind::Conclusion => Some("추천 및 근거"),
            SectionKind::AdditionalInfo => Some("추가 정보 필요"),
        }
    }
}

/// Inline content of a formatted section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Strong(String),
    LineBreak,
    Bullet,
}

/// One extracted section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedSection {
    pub kind: SectionKind,
    pub title: Option<&'static str>,
    pub inlines: Vec<Inline>,
}

impl FormattedSection {
    /// Text content without styling, line breaks as `\n` and bullets as `• `
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for inline in &self.inlines {
            match inline {
                Inline::Text(s) | Inline::Strong(s) => out.push_str(s),
                Inline::LineBreak => out.push('\n'),
                Inline::Bullet => out.push_str("• "),
            }
        }
        out
    }
}

/// All sections found in a narrative, in display order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationSections {
    sections: Vec<FormattedSection>,
}

impl RecommendationSections {
    /// Section of the given kind, if present
    pub fn get(&self, kind: SectionKind) -> Option<&FormattedSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormattedSection> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Where a section begins
enum Start {
    /// Beginning of the text; the section has no heading
    TextStart,
    /// First match of a heading pattern
    Heading(&'static str),
}

struct SectionRule {
    kind: SectionKind,
    start: Start,
    /// Literal markers, the earliest of which ends the section
    end: &'static [&'static str],
    /// Heading removed from the section body (first occurrence)
    strip: Option<&'static str>,
    /// Lines starting with `* ` become bullets
    bullets: bool,
}

const ANALYSIS_HEADING: &str = r"\*\*비교 분석:?\*\*|\*\*1\. 라이프스타일 고려:\*\*";
const CONCLUSION_HEADING: &str = r"\*\*추천 및 근거:?\*\*|\*\*결론:\*\*";
const ADDITIONAL_HEADING: &str = r"\*\*추가 정보";
const ADDITIONAL_STRIP: &str = r"\*\*추가 정보 필요:?\*\*";

const RULES: &[SectionRule] = &[
    SectionRule {
        kind: SectionKind::Intro,
        start: Start::TextStart,
        end: &["**비교 분석", "**1.", "**추천 및 근거", "**결론", "**추가 정보"],
        strip: None,
        bullets: false,
    },
    SectionRule {
        kind: SectionKind::Analysis,
        start: Start::Heading(ANALYSIS_HEADING),
        end: &["**추천 및 근거", "**결론"],
        strip: Some(ANALYSIS_HEADING),
        bullets: false,
    },
    SectionRule {
        kind: SectionKind::Conclusion,
        start: Start::Heading(CONCLUSION_HEADING),
        end: &["**추가 정보"],
        strip: Some(CONCLUSION_HEADING),
        bullets: false,
    },
    SectionRule {
        kind: SectionKind::AdditionalInfo,
        start: Start::Heading(ADDITIONAL_HEADING),
        end: &[],
        strip: Some(ADDITIONAL_STRIP),
        bullets: true,
    },
];

/// Compiled patterns, keyed by their source
fn pattern(source: &'static str) -> &'static Regex {
    static ANALYSIS: OnceLock<Regex> = OnceLock::new();
    static CONCLUSION: OnceLock<Regex> = OnceLock::new();
    static ADDITIONAL: OnceLock<Regex> = OnceLock::new();
    static ADDITIONAL_STRIP_RE: OnceLock<Regex> = OnceLock::new();
    static BOLD: OnceLock<Regex> = OnceLock::new();

    let cell = match source {
        ANALYSIS_HEADING => &ANALYSIS,
        CONCLUSION_HEADING => &CONCLUSION,
        ADDITIONAL_HEADING => &ADDITIONAL,
        ADDITIONAL_STRIP => &ADDITIONAL_STRIP_RE,
        _ => &BOLD,
    };
    cell.get_or_init(|| Regex::new(source).expect("formatter patterns are valid"))
}

const BOLD_PATTERN: &str = r"\*\*([^*]+)\*\*";

/// Split a narrative into formatted sections
///
/// # Examples
///
/// ```
/// use culture_guide::formatter::{format_recommendation, SectionKind};
///
/// let sections = format_recommendation("안내문\n**결론:** 추천합니다");
/// assert_eq!(sections.get(SectionKind::Intro).unwrap().plain_text(), "안내문");
/// assert!(sections.get(SectionKind::Conclusion).unwrap().plain_text().contains("추천합니다"));
/// assert!(sections.get(SectionKind::Analysis).is_none());
/// ```
pub fn format_recommendation(text: &str) -> RecommendationSections {
    let sections = RULES
        .iter()
        .filter_map(|rule| {
            let raw = extract(rule, text)?;
            let body = match rule.strip {
                Some(strip) => pattern(strip).replacen(raw, 1, "").into_owned(),
                None => raw.to_string(),
            };
            let body = body.trim();
            if body.is_empty() {
                return None;
            }
            Some(FormattedSection {
                kind: rule.kind,
                title: rule.kind.title(),
                inlines: to_inlines(body, rule.bullets),
            })
        })
        .collect();

    RecommendationSections { sections }
}

/// Raw slice of `text` covered by a rule, heading included
fn extract<'a>(rule: &SectionRule, text: &'a str) -> Option<&'a str> {
    let (begin, search_from) = match rule.start {
        Start::TextStart => (0, 0),
        Start::Heading(source) => {
            let m = pattern(source).find(text)?;
            (m.start(), m.end())
        }
    };

    let end = rule
        .end
        .iter()
        .filter_map(|marker| text[search_from..].find(marker))
        .min()
        .map(|offset| search_from + offset)
        .unwrap_or(text.len());

    Some(&text[begin..end])
}

/// Chat message text as inlines
///
/// Markdown headings become bold lines, `- ` list items become bullets, and
/// inline code marks are dropped.
///
/// # Examples
///
/// ```
/// use culture_guide::formatter::{format_markdown, Inline};
///
/// let inlines = format_markdown("### 안내\n- `/help`");
/// assert_eq!(inlines[0], Inline::Strong("안내".to_string()));
/// assert_eq!(inlines[2], Inline::Bullet);
/// assert_eq!(inlines[3], Inline::Text("/help".to_string()));
/// ```
pub fn format_markdown(text: &str) -> Vec<Inline> {
    let body: Vec<String> = text
        .trim()
        .split('\n')
        .map(|line| {
            let line = line.trim_end_matches('\r').replace('`', "");
            if let Some(title) = heading_title(&line) {
                let title = title.replace("**", "");
                let title = title.trim();
                return if title.is_empty() {
                    String::new()
                } else {
                    format!("**{}**", title)
                };
            }
            match line.trim_start().strip_prefix("- ") {
                Some(rest) => format!("* {}", rest),
                None => line,
            }
        })
        .collect();

    to_inlines(&body.join("\n"), true)
}

/// Title of an ATX heading line (`#` to `######` followed by a space)
fn heading_title(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    let rest = &trimmed[level..];
    if rest.is_empty() {
        return Some(rest);
    }
    rest.starts_with(char::is_whitespace).then(|| rest.trim())
}

/// Inlines for a body; emphasis is matched over the whole body before lines
/// are split, so a `**bold**` run may span a line break
fn to_inlines(body: &str, bullets: bool) -> Vec<Inline> {
    let mut runs = Vec::new();
    let mut last = 0;
    for caps in pattern(BOLD_PATTERN).captures_iter(body) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            runs.push((false, &body[last..whole.start()]));
        }
        runs.push((true, inner.as_str()));
        last = whole.end();
    }
    if last < body.len() {
        runs.push((false, &body[last..]));
    }

    let mut inlines = Vec::new();
    let mut line_start = true;
    for (strong, run) in runs {
        for (i, piece) in run.split('\n').enumerate() {
            if i > 0 {
                inlines.push(Inline::LineBreak);
                line_start = true;
            }
            let mut piece = piece.trim_end_matches('\r');
            if bullets && line_start && !strong {
                if let Some(rest) = piece.strip_prefix("* ") {
                    inlines.push(Inline::Bullet);
                    piece = rest;
                }
            }
            if piece.is_empty() {
                continue;
            }
            inlines.push(if strong {
                Inline::Strong(piece.to_string())
            } else {
                Inline::Text(piece.to_string())
            });
            line_start = false;
        }
    }

    inlines
}
