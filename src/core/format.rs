// src/core/format.rs

//! Placeholder substitution for module format strings.
//!
//! A format string is literal text interleaved with `%placeholder` tokens
//! (no nesting, no expressions). Templates are split once at module
//! construction; rendering substitutes from a per-sample variable list and
//! leaves unknown placeholders verbatim.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormatTemplate {
    segments: Vec<Segment>,
}

fn is_placeholder_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'
}

impl FormatTemplate {
    // Splitting never fails: a `%` not followed by a placeholder name is
    // treated as literal text.
    pub fn parse(input: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = input.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            let mut name = String::new();
            while let Some(&n) = chars.peek() {
                if is_placeholder_char(n) {
                    name.push(n);
                    chars.next();
                } else {
                    break;
                }
            }
            if name.is_empty() {
                literal.push('%');
            } else {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(name));
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        FormatTemplate { segments }
    }

    pub fn render(&self, vars: &[(&str, String)]) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Placeholder(name) => {
                    match vars.iter().find(|(k, _)| *k == name.as_str()) {
                        Some((_, v)) => out.push_str(v),
                        // unknown placeholders pass through unchanged
                        None => {
                            out.push('%');
                            out.push_str(name);
                        }
                    }
                }
            }
        }
        out
    }
}

impl fmt::Display for FormatTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => f.write_str(s)?,
                Segment::Placeholder(name) => write!(f, "%{name}")?,
            }
        }
        Ok(())
    }
}

// Threshold outcome for a sampled value; resolved to a concrete color
// by the output sink via `Palette`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorState {
    #[default]
    Neutral,
    Good,
    Degraded,
    Bad,
}

// The `general` color settings, applied when `colors = true`
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub enabled: bool,
    pub good: String,
    pub degraded: String,
    pub bad: String,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            enabled: true,
            good: "#00FF00".to_string(),
            degraded: "#FFFF00".to_string(),
            bad: "#FF0000".to_string(),
        }
    }
}

impl Palette {
    pub fn resolve(&self, state: ColorState) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        match state {
            ColorState::Neutral => None,
            ColorState::Good => Some(&self.good),
            ColorState::Degraded => Some(&self.degraded),
            ColorState::Bad => Some(&self.bad),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ColorState, FormatTemplate, Palette};

    #[test]
    fn substitutes_placeholders() {
        let tpl = FormatTemplate::parse("W: (%quality at %essid) %ip");
        let out = tpl.render(&[
            ("quality", "87%".to_string()),
            ("essid", "hive".to_string()),
            ("ip", "10.0.0.7".to_string()),
        ]);
        assert_eq!(out, "W: (87% at hive) 10.0.0.7");
    }

    #[test]
    fn unknown_placeholders_pass_through() {
        let tpl = FormatTemplate::parse("%avail of %nonsense");
        let out = tpl.render(&[("avail", "12.3 GiB".to_string())]);
        assert_eq!(out, "12.3 GiB of %nonsense");
    }

    #[test]
    fn strftime_specifiers_are_literal() {
        // uppercase specifiers are literal and lowercase ones are unknown
        // placeholders, so time formats survive templating untouched
        let tpl = FormatTemplate::parse("%Y-%m-%d %H:%M:%S");
        assert_eq!(tpl.render(&[]), "%Y-%m-%d %H:%M:%S");
    }

    #[test]
    fn trailing_and_doubled_percent() {
        let tpl = FormatTemplate::parse("%percentage%%");
        let out = tpl.render(&[("percentage", "42%".to_string())]);
        assert_eq!(out, "42%%%");
    }

    #[test]
    fn display_round_trips() {
        let raw = "E: %ip (%speed)";
        assert_eq!(FormatTemplate::parse(raw).to_string(), raw);
    }

    #[test]
    fn palette_resolution() {
        let palette = Palette::default();
        assert_eq!(palette.resolve(ColorState::Good), Some("#00FF00"));
        assert_eq!(palette.resolve(ColorState::Neutral), None);

        let disabled = Palette {
            enabled: false,
            ..Palette::default()
        };
        assert_eq!(disabled.resolve(ColorState::Bad), None);
    }
}
