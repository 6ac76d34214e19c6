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


use regex::Regex;

pub struct Lexer<'input> {
    pub buf: &'input str,
    pub pos: usize,
}

impl<'input> Lexer<'input> {
    pub fn new(input: &'input str) -> Self {
        Lexer { buf: input, pos: 0 }
    }

    fn advance(&mut self, n: usize) {
        self.pos += n;
        self.buf = &self.buf[n..]
    }
}

impl<'input> Lexer<'input> {
    pub fn consume_whitespace(&mut self) -> Option<()> {
        loop {
            let c = self.buf.chars().next()?;
            if c.is_whitespace() {
                self.advance(c.len_utf8())
            } else {
                break Some(());
            }
        }
    }

    pub fn consume_regex(&mut self, r: &Regex) -> Option<(usize, &'input str, usize)> {
        match r.find(self.buf) {
            None => None,
            Some(mat) => {
                let start_pos = self.pos;
                self.advance(mat.end());
                Some((start_pos, mat.as_str(), self.pos))
            }
        }
    }

    /// Consumes everything up to (but not including) the next newline,
    /// or the rest of the input if there is none. The newline itself
    /// is left in the buffer so line numbering is unaffected.
    pub fn consume_to_newline(&mut self) -> (usize, &'input str, usize) {
        let n = self.buf.find('\n').unwrap_or(self.buf.len());
        let start_pos = self.pos;
        let contents = &self.buf[0..n];
        self.advance(n);
        (start_pos, contents, self.pos)
    }

    pub fn consume_string_literal(&mut self) -> Option<(usize, &'input str, usize)> {
        // Note: this doesn't unescape the string
        if !self.buf.starts_with('\"') {
            return None;
        }
        let mut string_end = 1;
        loop {
            match self.buf[string_end..].chars().next()? {
                '\"' => {
                    let contents = &self.buf[1..string_end];
                    let start_pos = self.pos;
                    self.advance(string_end + 1);
                    break Some((start_pos, contents, self.pos));
                }
                '\\' => string_end += 1 + self.buf[string_end + 1..].chars().next()?.len_utf8(),
                c => string_end += c.len_utf8(),
            }
        }
    }

    /// Skips a `(* ... *)` comment, assuming the opening `(*` has
    /// already been consumed. Returns false if the comment is never
    /// closed.
    pub fn consume_comment(&mut self) -> bool {
        loop {
            if self.buf.is_empty() {
                break false;
            } else if self.buf.starts_with("*)") {
                self.advance(2);
                break true;
            } else {
                let len = self.buf.chars().next().map(char::len_utf8).unwrap_or(1);
                self.advance(len)
            }
        }
    }

    pub fn consume_line_comment(&mut self) {
        loop {
            match self.buf.chars().next() {
                Some('\n') => {
                    self.advance(1);
                    break;
                }
                Some(c) => self.advance(c.len_utf8()),
                None => break,
            }
        }
    }
}

lazy_static! {
    pub static ref ID_REGEX: Regex = Regex::new(r"^[a-zA-Z_][0-9a-zA-Z_]*").unwrap();
    pub static ref NAT_REGEX: Regex = Regex::new(r"^[0-9]+").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_tokens() {
        let mut lexer = Lexer::new("  st_1 42 rest");
        lexer.consume_whitespace().unwrap();
        assert_eq!(lexer.consume_regex(&ID_REGEX), Some((2, "st_1", 6)));
        assert!(lexer.consume_regex(&ID_REGEX).is_none());
        lexer.consume_whitespace().unwrap();
        assert_eq!(lexer.consume_regex(&NAT_REGEX), Some((7, "42", 9)));
        assert_eq!(lexer.buf, " rest")
    }

    #[test]
    fn test_consume_to_newline() {
        let mut lexer = Lexer::new("PTX MP\nx");
        assert_eq!(lexer.consume_to_newline(), (0, "PTX MP", 6));
        assert_eq!(lexer.buf, "\nx");
        let mut lexer = Lexer::new("PTX SB");
        assert_eq!(lexer.consume_to_newline(), (0, "PTX SB", 6));
        assert!(lexer.buf.is_empty())
    }

    #[test]
    fn test_comments_and_strings() {
        let mut lexer = Lexer::new(" comment *) \"a \\\" b\" // tail\nnext");
        assert!(lexer.consume_comment());
        lexer.consume_whitespace().unwrap();
        assert_eq!(lexer.consume_string_literal(), Some((12, "a \\\" b", 20)));
        lexer.consume_whitespace().unwrap();
        lexer.consume_line_comment();
        assert_eq!(lexer.buf, "next");

        let mut unterminated = Lexer::new("never closed");
        assert!(!unterminated.consume_comment())
    }
}
