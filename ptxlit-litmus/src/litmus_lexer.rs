// BSD 2-Clause License
//
// Copyright (c) 2020 Alasdair Armstrong
//
// All rights reserved.
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are
// met:
//
// 1. Redistributions of source code must retain the above copyright
// notice, this list of conditions and the following disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright
// notice, this list of conditions and the following disclaimer in the
// documentation and/or other materials provided with the distribution.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS
// "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT
// LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR
// A PARTICULAR PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT
// HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT
// LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE,
// DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY
// THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT
// (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.


use std::collections::HashMap;
use std::fmt;

use ptxlit_lib::lexer::{Lexer, ID_REGEX, NAT_REGEX};

use crate::error::LitmusParseError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tok<'input> {
    /// The first line of the file, verbatim
    Header(&'input str),
    Id(&'input str),
    Nat(&'input str),
    String(&'input str),
    // Quantifiers
    Exists,
    Forbid,
    Forall,
    // Symbols
    And,
    At,
    Bar,
    Colon,
    Comma,
    Dot,
    Eq,
    EqEq,
    Minus,
    Neq,
    Not,
    Or,
    SemiColon,
    // Brackets
    Lparen,
    Rparen,
    Lbrace,
    Rbrace,
    Lsquare,
    Rsquare,
}

impl<'input> fmt::Display for Tok<'input> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Tok::*;
        match self {
            Header(h) => write!(f, "header {}", h),
            Id(id) => write!(f, "identifier {}", id),
            Nat(n) => write!(f, "{}", n),
            String(s) => write!(f, "\"{}\"", s),
            Exists => write!(f, "exists"),
            Forbid => write!(f, "forbid"),
            Forall => write!(f, "forall"),
            And => write!(f, "/\\"),
            At => write!(f, "@"),
            Bar => write!(f, "|"),
            Colon => write!(f, ":"),
            Comma => write!(f, ","),
            Dot => write!(f, "."),
            Eq => write!(f, "="),
            EqEq => write!(f, "=="),
            Minus => write!(f, "-"),
            Neq => write!(f, "!="),
            Not => write!(f, "~"),
            Or => write!(f, "\\/"),
            SemiColon => write!(f, ";"),
            Lparen => write!(f, "("),
            Rparen => write!(f, ")"),
            Lbrace => write!(f, "{{"),
            Rbrace => write!(f, "}}"),
            Lsquare => write!(f, "["),
            Rsquare => write!(f, "]"),
        }
    }
}

pub struct Keyword {
    word: &'static str,
    token: Tok<'static>,
    len: usize,
}

impl Keyword {
    pub fn new(kw: &'static str, tok: Tok<'static>) -> Self {
        Keyword { word: kw, token: tok, len: kw.len() }
    }
}

lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, Tok<'static>> = {
        use Tok::*;
        let mut table = HashMap::new();
        table.insert("exists", Exists);
        table.insert("exist", Exists);
        table.insert("forbid", Forbid);
        table.insert("forall", Forall);
        table
    };

    // Longer symbols must come before any symbol that is a prefix of them
    static ref SYMBOLS: Vec<Keyword> = {
        use Tok::*;
        vec![
            Keyword::new("/\\", And),
            Keyword::new("&&", And),
            Keyword::new("\\/", Or),
            Keyword::new("||", Or),
            Keyword::new("==", EqEq),
            Keyword::new("!=", Neq),
            Keyword::new("=", Eq),
            Keyword::new("~", Not),
            Keyword::new("!", Not),
            Keyword::new("@", At),
            Keyword::new("|", Bar),
            Keyword::new(":", Colon),
            Keyword::new(",", Comma),
            Keyword::new(".", Dot),
            Keyword::new("-", Minus),
            Keyword::new(";", SemiColon),
            Keyword::new("(", Lparen),
            Keyword::new(")", Rparen),
            Keyword::new("{", Lbrace),
            Keyword::new("}", Rbrace),
            Keyword::new("[", Lsquare),
            Keyword::new("]", Rsquare),
        ]
    };
}

pub type Span<'input> = Result<(usize, Tok<'input>, usize), LitmusParseError>;

/// Lexer for litmus files. The first line of a file is the header,
/// which is returned whole as a single [`Tok::Header`]; the remainder
/// is split into tokens with `//` and `(* ... *)` comments skipped.
pub struct LitmusLexer<'input> {
    lexer: Lexer<'input>,
    in_header: bool,
}

impl<'input> LitmusLexer<'input> {
    pub fn new(input: &'input str) -> Self {
        LitmusLexer { lexer: Lexer::new(input), in_header: true }
    }

    fn skip(&mut self, n: usize) {
        self.lexer.pos += n;
        self.lexer.buf = &self.lexer.buf[n..]
    }
}

impl<'input> Iterator for LitmusLexer<'input> {
    type Item = Span<'input>;

    fn next(&mut self) -> Option<Self::Item> {
        use Tok::*;

        loop {
            self.lexer.consume_whitespace()?;
            if self.lexer.buf.starts_with("//") {
                self.lexer.consume_line_comment()
            } else if self.lexer.buf.starts_with("(*") {
                let start_pos = self.lexer.pos;
                self.skip(2);
                if !self.lexer.consume_comment() {
                    return Some(Err(LitmusParseError::Lex { pos: start_pos }));
                }
            } else {
                break;
            }
        }

        if self.in_header {
            self.in_header = false;
            let (from, header, to) = self.lexer.consume_to_newline();
            return Some(Ok((from, Header(header.trim_end()), to)));
        }

        if let Some((from, s, to)) = self.lexer.consume_string_literal() {
            return Some(Ok((from, String(s), to)));
        }

        for k in SYMBOLS.iter() {
            if self.lexer.buf.starts_with(k.word) {
                let start_pos = self.lexer.pos;
                self.skip(k.len);
                return Some(Ok((start_pos, k.token.clone(), self.lexer.pos)));
            }
        }

        if let Some((from, id, to)) = self.lexer.consume_regex(&ID_REGEX) {
            match KEYWORDS.get(id) {
                Some(kw) => return Some(Ok((from, kw.clone(), to))),
                None => return Some(Ok((from, Id(id), to))),
            }
        }

        if let Some((from, n, to)) = self.lexer.consume_regex(&NAT_REGEX) {
            return Some(Ok((from, Nat(n), to)));
        }

        Some(Err(LitmusParseError::Lex { pos: self.lexer.pos }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(input: &str) -> Vec<Tok<'_>> {
        LitmusLexer::new(input).map(|span| span.unwrap().1).collect()
    }

    #[test]
    fn test_header_then_tokens() {
        use Tok::*;
        assert_eq!(
            toks("PTX MP+rel  \n st.release.gpu [x] = 1 ;"),
            vec![
                Header("PTX MP+rel"),
                Id("st"),
                Dot,
                Id("release"),
                Dot,
                Id("gpu"),
                Lsquare,
                Id("x"),
                Rsquare,
                Eq,
                Nat("1"),
                SemiColon
            ]
        )
    }

    #[test]
    fn test_assertion_symbols() {
        use Tok::*;
        assert_eq!(
            toks("PTX\n~exists (P1:r0 == 1 /\\ r1 != -2 \\/ !(r2 = 0) && a || b)"),
            vec![
                Header("PTX"),
                Not,
                Exists,
                Lparen,
                Id("P1"),
                Colon,
                Id("r0"),
                EqEq,
                Nat("1"),
                And,
                Id("r1"),
                Neq,
                Minus,
                Nat("2"),
                Or,
                Not,
                Lparen,
                Id("r2"),
                Eq,
                Nat("0"),
                Rparen,
                And,
                Id("a"),
                Or,
                Id("b"),
                Rparen
            ]
        )
    }

    #[test]
    fn test_quantifier_keywords() {
        use Tok::*;
        assert_eq!(
            toks("PTX
exist exists forbid forall existing"),
            vec![Header("PTX"), Exists, Exists, Forbid, Forall, Id("existing")]
        )
    }

    #[test]
    fn test_comments_and_positions() {
        let spans: Vec<_> =
            LitmusLexer::new("// leading\nPTX SB\n(* block *) P0@cta 0 // trailing\n;").map(|s| s.unwrap()).collect();
        assert_eq!(spans[0], (11, Tok::Header("PTX SB"), 17));
        assert_eq!(spans[1], (30, Tok::Id("P0"), 32));
        assert_eq!(spans[2], (32, Tok::At, 33));
        assert_eq!(spans.last().unwrap().1, Tok::SemiColon)
    }

    #[test]
    fn test_lex_errors() {
        let mut lexer = LitmusLexer::new("PTX\n x # y");
        assert_eq!(lexer.next().unwrap().unwrap().1, Tok::Header("PTX"));
        assert_eq!(lexer.next().unwrap().unwrap().1, Tok::Id("x"));
        assert_eq!(lexer.next().unwrap().unwrap_err(), LitmusParseError::Lex { pos: 7 });

        let mut unclosed = LitmusLexer::new("PTX\n(* never closed");
        unclosed.next();
        assert_eq!(unclosed.next().unwrap().unwrap_err(), LitmusParseError::Lex { pos: 4 })
    }
}
