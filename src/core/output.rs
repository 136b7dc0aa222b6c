// src/core/output.rs

//! Output sinks: compose the sampled blocks into a status line once per
//! tick. The i3bar sink speaks the JSON streaming protocol (a version
//! header, then one block array per tick inside an endless JSON array);
//! the term sink prints ANSI-colored lines for running in a terminal.

use super::format::Palette;
use super::module::Block;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

pub trait OutputSink {
    // Emit any protocol preamble before the first status line
    fn begin(&mut self) -> Result<()>;

    // Emit one composed status line
    fn write_status(&mut self, blocks: &[Block]) -> Result<()>;
}

#[derive(Serialize)]
struct ProtocolHeader {
    version: u32,
}

#[derive(Serialize)]
struct JsonBlock<'a> {
    full_text: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    instance: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<&'a str>,
}

pub struct I3barSink<W: Write> {
    out: W,
    palette: Palette,
    first: bool,
}

impl<W: Write> I3barSink<W> {
    pub fn new(out: W, palette: Palette) -> Self {
        I3barSink {
            out,
            palette,
            first: true,
        }
    }
}

impl<W: Write> OutputSink for I3barSink<W> {
    fn begin(&mut self) -> Result<()> {
        serde_json::to_writer(&mut self.out, &ProtocolHeader { version: 1 })
            .context("Writing i3bar header")?;
        self.out.write_all(b"\n[\n").context("Opening i3bar array")?;
        self.out.flush().context("Flushing i3bar header")?;
        Ok(())
    }

    fn write_status(&mut self, blocks: &[Block]) -> Result<()> {
        if self.first {
            self.first = false;
        } else {
            self.out.write_all(b",").context("Writing i3bar separator")?;
        }

        let json_blocks: Vec<JsonBlock<'_>> = blocks
            .iter()
            .map(|b| JsonBlock {
                full_text: &b.full_text,
                name: &b.name,
                instance: b.instance.as_deref(),
                color: self.palette.resolve(b.state),
            })
            .collect();
        serde_json::to_writer(&mut self.out, &json_blocks).context("Writing i3bar blocks")?;
        self.out.write_all(b"\n").context("Terminating i3bar line")?;
        self.out.flush().context("Flushing i3bar line")?;
        Ok(())
    }
}

pub struct TermSink<W: Write> {
    out: W,
    palette: Palette,
    separator: String,
}

impl<W: Write> TermSink<W> {
    pub fn new(out: W, palette: Palette, separator: String) -> Self {
        TermSink {
            out,
            palette,
            separator,
        }
    }
}

impl<W: Write> OutputSink for TermSink<W> {
    fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_status(&mut self, blocks: &[Block]) -> Result<()> {
        let mut line = String::new();
        for (i, block) in blocks.iter().enumerate() {
            if i > 0 {
                line.push_str(&self.separator);
            }
            match self.palette.resolve(block.state).and_then(hex_to_rgb) {
                Some((r, g, b)) => {
                    line.push_str(&format!("\x1b[38;2;{r};{g};{b}m{}\x1b[0m", block.full_text));
                }
                None => line.push_str(&block.full_text),
            }
        }
        writeln!(self.out, "{line}").context("Writing status line")?;
        self.out.flush().context("Flushing status line")?;
        Ok(())
    }
}

fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::{hex_to_rgb, I3barSink, OutputSink, TermSink};
    use crate::core::format::{ColorState, Palette};
    use crate::core::module::Block;

    fn sample_blocks() -> Vec<Block> {
        vec![
            Block::new("disk", Some("/"), "12.3 GiB".to_string(), ColorState::Neutral),
            Block::new("battery", Some("all"), "BAT 15%".to_string(), ColorState::Bad),
        ]
    }

    #[test]
    fn i3bar_protocol_shape() {
        let mut sink = I3barSink::new(Vec::new(), Palette::default());
        sink.begin().unwrap();
        sink.write_status(&sample_blocks()).unwrap();
        sink.write_status(&sample_blocks()).unwrap();

        let text = String::from_utf8(sink.out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("{\"version\":1}"));
        assert_eq!(lines.next(), Some("["));

        let first = lines.next().unwrap();
        let second = lines.next().unwrap();
        // every line after the first is comma-prefixed inside the array
        assert!(!first.starts_with(','));
        assert!(second.starts_with(','));

        let parsed: serde_json::Value = serde_json::from_str(first).unwrap();
        assert_eq!(parsed[0]["full_text"], "12.3 GiB");
        assert_eq!(parsed[0]["name"], "disk");
        assert_eq!(parsed[0]["instance"], "/");
        // neutral blocks carry no color key at all
        assert!(parsed[0].get("color").is_none());
        assert_eq!(parsed[1]["color"], "#FF0000");
    }

    #[test]
    fn term_sink_joins_with_separator() {
        let palette = Palette {
            enabled: false,
            ..Palette::default()
        };
        let mut sink = TermSink::new(Vec::new(), palette, " | ".to_string());
        sink.begin().unwrap();
        sink.write_status(&sample_blocks()).unwrap();

        let text = String::from_utf8(sink.out).unwrap();
        assert_eq!(text, "12.3 GiB | BAT 15%\n");
    }

    #[test]
    fn term_sink_colors_bad_blocks() {
        let mut sink = TermSink::new(Vec::new(), Palette::default(), " | ".to_string());
        sink.write_status(&sample_blocks()).unwrap();

        let text = String::from_utf8(sink.out).unwrap();
        assert!(text.contains("\x1b[38;2;255;0;0mBAT 15%\x1b[0m"));
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(hex_to_rgb("#00FF00"), Some((0, 255, 0)));
        assert_eq!(hex_to_rgb("#ffffff"), Some((255, 255, 255)));
        assert_eq!(hex_to_rgb("00FF00"), None);
        assert_eq!(hex_to_rgb("#abc"), None);
    }
}
