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


use std::error::Error;
use std::fmt;
use std::num::ParseIntError;

use ptxlit_lib::source_loc::{span_text, SourceLoc};

use crate::syntax::Meta;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Lex,
    Syntax,
    /// An ordering semantics that is not permitted for the kind of
    /// event it annotates, or a weak access with an explicit scope.
    IllegalEncoding,
    /// An instruction whose column matches no thread header.
    ColumnAlignment,
    /// Two thread headers in the same column.
    Misalignment,
    /// Two thread columns with the same thread identity.
    DuplicateThread,
    DuplicateLocation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ErrorKind::*;
        let name = match self {
            Lex => "lexical error",
            Syntax => "syntax error",
            IllegalEncoding => "illegal encoding",
            ColumnAlignment => "column alignment error",
            Misalignment => "misaligned thread declaration",
            DuplicateThread => "duplicate thread",
            DuplicateLocation => "duplicate location",
        };
        write!(f, "{}", name)
    }
}

/// Errors raised by the lexer and by grammar actions while parsing,
/// before there is a [`LitmusError`] with a source location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LitmusParseError {
    Lex { pos: usize },
    ParseInt { error: ParseIntError, span: (usize, usize) },
    Syntax { message: String, span: (usize, usize) },
}

impl fmt::Display for LitmusParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use LitmusParseError::*;
        match self {
            Lex { pos } => write!(f, "Lexical error at position: {}", pos),
            ParseInt { error, .. } => write!(f, "{}", error),
            Syntax { message, .. } => write!(f, "{}", message),
        }
    }
}

/// Every reason a litmus test can be rejected. The error keeps the
/// location of the offending source, and its text with newlines
/// collapsed, so it can be reported without the original file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LitmusError {
    pub kind: ErrorKind,
    pub loc: SourceLoc,
    pub text: String,
    pub message: String,
}

impl LitmusError {
    pub fn new<S: Into<String>>(kind: ErrorKind, source: &str, meta: Meta, message: S) -> Self {
        LitmusError { kind, loc: meta.loc, text: span_text(source, meta.start, meta.end), message: message.into() }
    }

    pub fn line(&self) -> u32 {
        self.loc.line()
    }

    /// A multi-line diagnostic pointing at the offending source.
    pub fn message(&self, buf_name: &str, buf: &str, use_colors: bool) -> String {
        // Validation messages already say what kind of error they are
        let message = match self.kind {
            ErrorKind::Lex | ErrorKind::Syntax => format!("{}: {}", self.kind, self.message),
            _ => self.message.clone(),
        };
        self.loc.message_file_contents(buf_name, buf, &message, true, use_colors)
    }
}

impl fmt::Display for LitmusError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Line {}: '{}': {}", self.loc.line(), self.text, self.message)
    }
}

impl Error for LitmusError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let source = "PTX W\n{ x = 0; }\n P0@cta 0,gpu 0 ;\n st.weak.cta\n   [x] = 1 ;";
        let start = source.find("st.weak").unwrap();
        let end = source.rfind(" ;").unwrap();
        let meta = Meta::new(source, start, end);
        let err =
            LitmusError::new(ErrorKind::IllegalEncoding, source, meta, "illegal encoding: .weak accesses should not have scope");
        assert_eq!(err.line(), 4);
        assert_eq!(
            err.to_string(),
            "Line 4: 'st.weak.cta [x] = 1': illegal encoding: .weak accesses should not have scope"
        )
    }
}
