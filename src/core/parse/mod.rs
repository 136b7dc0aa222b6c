// src/core/parse/mod.rs

//! Parser and serializer for the block-structured status-bar config grammar:
//! `#` line comments, repeatable `order += "type instance"` directives, and
//! `name [qualifier] { key = value ... }` module blocks. Values are quoted
//! strings, bare booleans, or bare integers.

pub mod lexer;

use anyhow::Result;
use lexer::{Lexer, Token};
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Bool(bool),
    Int(i64),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }
}

// A named block: `general { ... }` or `disk "/" { ... }`.
// Entries keep their declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Section {
    pub name: String,
    pub instance: Option<String>,
    pub entries: Vec<(String, Value)>,
}

impl Section {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

// The whole parsed file: declared display order plus all blocks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigTree {
    pub order: Vec<(String, Option<String>)>,
    pub sections: Vec<Section>,
}

impl ConfigTree {
    pub fn parse(input: &str) -> Result<Self> {
        let mut lx = Lexer::new(input);
        let mut tree = ConfigTree::default();

        loop {
            match lx.next_token()? {
                Token::Eof => break,
                Token::Ident(name) if name == "order" => {
                    expect(&mut lx, Token::PlusEq, "`+=` after `order`")?;
                    let line = lx.line();
                    match lx.next_token()? {
                        Token::Str(spec) => {
                            let mut parts = spec.splitn(2, char::is_whitespace);
                            let kind = parts.next().unwrap_or("").to_string();
                            if kind.is_empty() {
                                anyhow::bail!("line {line}: empty `order +=` directive");
                            }
                            let instance = parts
                                .next()
                                .map(str::trim)
                                .filter(|s| !s.is_empty())
                                .map(str::to_string);
                            tree.order.push((kind, instance));
                        }
                        _ => anyhow::bail!("line {line}: expected quoted string after `order +=`"),
                    }
                }
                Token::Ident(name) => {
                    let section = parse_section(&mut lx, name)?;
                    tree.sections.push(section);
                }
                other => anyhow::bail!(
                    "line {}: expected section name or `order` directive, found {other:?}",
                    lx.line()
                ),
            }
        }

        Ok(tree)
    }

    pub fn section(&self, name: &str, instance: Option<&str>) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.name == name && s.instance.as_deref() == instance)
    }

    // Write the tree back out in the grammar of `parse`. Whitespace and
    // quoting may differ from the input, the key/value structure does not.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for (kind, instance) in &self.order {
            match instance {
                Some(inst) => writeln!(out, "order += \"{kind} {inst}\"").ok(),
                None => writeln!(out, "order += \"{kind}\"").ok(),
            };
        }
        for section in &self.sections {
            if !out.is_empty() {
                out.push('\n');
            }
            match &section.instance {
                Some(inst) if is_bare_word(inst) => {
                    writeln!(out, "{} {} {{", section.name, inst).ok()
                }
                Some(inst) => writeln!(out, "{} {} {{", section.name, quote(inst)).ok(),
                None => writeln!(out, "{} {{", section.name).ok(),
            };
            for (key, value) in &section.entries {
                match value {
                    Value::Str(s) => writeln!(out, "        {key} = {}", quote(s)).ok(),
                    Value::Bool(b) => writeln!(out, "        {key} = {b}").ok(),
                    Value::Int(n) => writeln!(out, "        {key} = {n}").ok(),
                };
            }
            out.push_str("}\n");
        }
        out
    }
}

fn parse_section(lx: &mut Lexer<'_>, name: String) -> Result<Section> {
    let mut section = Section {
        name,
        instance: None,
        entries: Vec::new(),
    };

    // Optional qualifier (bare word, bare integer, or quoted string)
    // before the brace; `battery 0` is the common spelling
    let tok = match lx.next_token()? {
        Token::Ident(q) => {
            section.instance = Some(q);
            lx.next_token()?
        }
        Token::Int(n) => {
            section.instance = Some(n.to_string());
            lx.next_token()?
        }
        Token::Str(q) => {
            section.instance = Some(q);
            lx.next_token()?
        }
        other => other,
    };
    if tok != Token::LBrace {
        anyhow::bail!(
            "line {}: expected `{{` to open section `{}`",
            lx.line(),
            section.name
        );
    }

    loop {
        match lx.next_token()? {
            Token::RBrace => break,
            Token::Ident(key) => {
                expect(lx, Token::Eq, "`=` after key")?;
                let line = lx.line();
                let value = match lx.next_token()? {
                    Token::Str(s) => Value::Str(s),
                    Token::Int(n) => Value::Int(n),
                    Token::Ident(w) if w == "true" => Value::Bool(true),
                    Token::Ident(w) if w == "false" => Value::Bool(false),
                    other => anyhow::bail!(
                        "line {line}: expected string, integer, or boolean for key `{key}`, found {other:?}"
                    ),
                };
                section.entries.push((key, value));
            }
            Token::Eof => anyhow::bail!(
                "line {}: unclosed section `{}`",
                lx.line(),
                section.name
            ),
            other => anyhow::bail!(
                "line {}: expected key or `}}` in section `{}`, found {other:?}",
                lx.line(),
                section.name
            ),
        }
    }

    Ok(section)
}

fn expect(lx: &mut Lexer<'_>, want: Token, what: &str) -> Result<()> {
    let line = lx.line();
    let got = lx.next_token()?;
    if got != want {
        anyhow::bail!("line {line}: expected {what}, found {got:?}");
    }
    Ok(())
}

// Only strings that re-lex as a single ident may go unquoted; anything
// starting with a digit or `-` would come back as an integer
fn is_bare_word(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
}

// The grammar has no escapes, so pick whichever quote the string doesn't use
fn quote(s: &str) -> String {
    if s.contains('"') {
        format!("'{s}'")
    } else {
        format!("\"{s}\"")
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigTree, Value};

    const SAMPLE: &str = r##"
# sample status-bar configuration
general {
        colors = true
        interval = 5
        color_good = "#00FF00"
}

order += "disk /"
order += "wireless _first_"
order += "battery all"
order += "tztime local"

disk "/" {
        format = "%avail"
        low_threshold = 10
}

wireless _first_ {
        format_up = "W: (%quality at %essid) %ip"
        format_down = "W: down"
}

battery all {
        format = "%status %percentage %remaining"
}

tztime local {
        format = "%Y-%m-%d %H:%M:%S"
}
"##;

    #[test]
    fn parses_sample_config() {
        let tree = ConfigTree::parse(SAMPLE).unwrap();

        assert_eq!(
            tree.order,
            vec![
                ("disk".to_string(), Some("/".to_string())),
                ("wireless".to_string(), Some("_first_".to_string())),
                ("battery".to_string(), Some("all".to_string())),
                ("tztime".to_string(), Some("local".to_string())),
            ]
        );
        assert_eq!(tree.sections.len(), 5);

        let general = tree.section("general", None).unwrap();
        assert_eq!(general.get("colors"), Some(&Value::Bool(true)));
        assert_eq!(general.get("interval"), Some(&Value::Int(5)));
        assert_eq!(
            general.get("color_good"),
            Some(&Value::Str("#00FF00".to_string()))
        );

        let disk = tree.section("disk", Some("/")).unwrap();
        assert_eq!(disk.get("format"), Some(&Value::Str("%avail".to_string())));
        assert_eq!(disk.get("low_threshold"), Some(&Value::Int(10)));
    }

    #[test]
    fn qualifier_quoting_styles_are_equivalent() {
        let bare = ConfigTree::parse("volume master { device = \"default\" }").unwrap();
        let quoted = ConfigTree::parse("volume \"master\" { device = 'default' }").unwrap();
        assert_eq!(bare, quoted);
    }

    #[test]
    fn bare_numeric_qualifier() {
        let bare = ConfigTree::parse("battery 0 { format = \"%status\" }").unwrap();
        assert_eq!(bare.sections[0].instance.as_deref(), Some("0"));

        let quoted = ConfigTree::parse("battery \"0\" { format = \"%status\" }").unwrap();
        assert_eq!(bare, quoted);
    }

    #[test]
    fn numeric_qualifier_round_trips() {
        for input in [
            "battery 0 {\n        format = \"%status\"\n}\n",
            "battery \"1\" { low_threshold = 30 }",
        ] {
            let tree = ConfigTree::parse(input).unwrap();
            let reparsed = ConfigTree::parse(&tree.serialize()).unwrap();
            assert_eq!(tree, reparsed, "round trip changed the tree for {input:?}");
        }
    }

    #[test]
    fn order_without_instance() {
        let tree = ConfigTree::parse("order += \"time\"").unwrap();
        assert_eq!(tree.order, vec![("time".to_string(), None)]);
    }

    #[test]
    fn unclosed_section_is_an_error() {
        let err = ConfigTree::parse("general {\n        colors = true\n").unwrap_err();
        assert!(err.to_string().contains("unclosed section `general`"));
    }

    #[test]
    fn bad_value_reports_line() {
        let err = ConfigTree::parse("general {\n        colors = {\n}").unwrap_err();
        assert!(err.to_string().contains("line 2"), "got: {err}");
    }

    #[test]
    fn missing_block_for_order_entry_is_not_a_parse_error() {
        // resolution against defaults happens at registry time
        let tree = ConfigTree::parse("order += \"volume master\"").unwrap();
        assert!(tree.section("volume", Some("master")).is_none());
    }

    #[test]
    fn round_trip_preserves_tree() {
        let tree = ConfigTree::parse(SAMPLE).unwrap();
        let reparsed = ConfigTree::parse(&tree.serialize()).unwrap();
        assert_eq!(tree, reparsed);
    }

    #[test]
    fn round_trip_with_awkward_strings() {
        let mut tree = ConfigTree::parse("tztime local { format = \"%H:%M\" }").unwrap();
        tree.sections[0]
            .entries
            .push(("suffix".to_string(), Value::Str("a \"quoted\" word".to_string())));
        let reparsed = ConfigTree::parse(&tree.serialize()).unwrap();
        assert_eq!(tree, reparsed);
    }
}
