// src/core/parse/lexer.rs

use anyhow::Result;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Str(String),
    Int(i64),
    LBrace,
    RBrace,
    Eq,
    PlusEq,
    Eof,
}

// Hand-rolled tokenizer for the block-structured config grammar.
// Tracks the current line so parse errors can point at it.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            chars: input.chars().peekable(),
            line: 1,
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line += 1;
        }
        c
    }

    // Skip whitespace and `#` comments (which run to end of line)
    fn skip_trivia(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c == '#' {
                while let Some(&c) = self.chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.bump();
                }
            } else if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_trivia();

        let Some(&c) = self.chars.peek() else {
            return Ok(Token::Eof);
        };

        match c {
            '{' => {
                self.bump();
                Ok(Token::LBrace)
            }
            '}' => {
                self.bump();
                Ok(Token::RBrace)
            }
            '=' => {
                self.bump();
                Ok(Token::Eq)
            }
            '+' => {
                self.bump();
                match self.chars.peek() {
                    Some('=') => {
                        self.bump();
                        Ok(Token::PlusEq)
                    }
                    _ => anyhow::bail!("line {}: expected `=` after `+`", self.line),
                }
            }
            '"' | '\'' => self.quoted_string(c),
            '-' => self.integer(),
            c if c.is_ascii_digit() => self.integer(),
            c if is_ident_start(c) => Ok(self.ident()),
            other => anyhow::bail!("line {}: unexpected character `{other}`", self.line),
        }
    }

    // Strings are scanned verbatim to the matching quote; the grammar
    // defines no escape sequences.
    fn quoted_string(&mut self, quote: char) -> Result<Token> {
        let start = self.line;
        self.bump();
        let mut s = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(Token::Str(s)),
                Some(c) => s.push(c),
                None => anyhow::bail!("line {start}: unterminated string"),
            }
        }
    }

    fn integer(&mut self) -> Result<Token> {
        let start = self.line;
        let mut s = String::new();
        if self.chars.peek() == Some(&'-') {
            s.push('-');
            self.bump();
        }
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() {
                s.push(c);
                self.bump();
            } else {
                break;
            }
        }
        s.parse::<i64>()
            .map(Token::Int)
            .map_err(|_| anyhow::anyhow!("line {start}: invalid integer `{s}`"))
    }

    fn ident(&mut self) -> Token {
        let mut s = String::new();
        while let Some(&c) = self.chars.peek() {
            if is_ident_continue(c) {
                s.push(c);
                self.bump();
            } else {
                break;
            }
        }
        Token::Ident(s)
    }
}

#[cfg(test)]
mod tests {
    use super::{Lexer, Token};

    fn all_tokens(input: &str) -> Vec<Token> {
        let mut lx = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let tok = lx.next_token().unwrap();
            if tok == Token::Eof {
                return out;
            }
            out.push(tok);
        }
    }

    #[test]
    fn tokenizes_block_header() {
        let toks = all_tokens("disk \"/\" {");
        assert_eq!(
            toks,
            vec![
                Token::Ident("disk".into()),
                Token::Str("/".into()),
                Token::LBrace,
            ]
        );
    }

    #[test]
    fn tokenizes_order_directive() {
        let toks = all_tokens("order += 'battery all'");
        assert_eq!(
            toks,
            vec![
                Token::Ident("order".into()),
                Token::PlusEq,
                Token::Str("battery all".into()),
            ]
        );
    }

    #[test]
    fn comments_run_to_end_of_line() {
        let toks = all_tokens("# whole line\ninterval = 5 # trailing\n");
        assert_eq!(
            toks,
            vec![
                Token::Ident("interval".into()),
                Token::Eq,
                Token::Int(5),
            ]
        );
    }

    #[test]
    fn negative_integers() {
        assert_eq!(all_tokens("-42"), vec![Token::Int(-42)]);
    }

    #[test]
    fn unterminated_string_reports_line() {
        let mut lx = Lexer::new("\n\nformat = \"oops");
        lx.next_token().unwrap(); // format
        lx.next_token().unwrap(); // =
        let err = lx.next_token().unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn line_tracking_spans_comments() {
        let mut lx = Lexer::new("# one\n# two\n}");
        assert_eq!(lx.next_token().unwrap(), Token::RBrace);
        assert_eq!(lx.line(), 3);
    }
}
