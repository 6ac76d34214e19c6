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


//! Parsing litmus files into the syntax tree in [`crate::syntax`].
//! The grammar itself is in `litmus_parser.lalrpop`; this module holds
//! the helpers its actions call and turns parse errors into
//! [`LitmusError`]s. A file looks like:
//!
//! ```text
//! PTX MP
//! "optional description"
//! {
//!   x = 0; y = 0;
//!   P1:r0 = 0;
//! }
//!  P0@cta 0,gpu 0          | P1@cta 0,gpu 0          ;
//!  st.relaxed.gpu [x] = 1  | ld.acquire.gpu r0 = [y] ;
//!  st.release.gpu [y] = 1  | ld.relaxed.gpu r1 = [x] ;
//! exists (P1:r0 == 1 /\ P1:r1 == 0)
//! ```

use lalrpop_util::ParseError;
use regex::Regex;
use std::num::ParseIntError;

use crate::error::{ErrorKind, LitmusError, LitmusParseError};
use crate::event::Scope;
use crate::litmus_lexer::{LitmusLexer, Tok};
use crate::litmus_parser::LitmusFileParser;
use crate::syntax::*;

lazy_static! {
    static ref THREAD_REGEX: Regex = Regex::new(r"^P([0-9]+)$").unwrap();
}

pub type ActionResult<'input, T> = Result<T, ParseError<usize, Tok<'input>, LitmusParseError>>;

/// The operands following an instruction's mnemonic and qualifiers.
/// Which shape is allowed depends on the mnemonic, so this is checked
/// when the instruction is built.
#[derive(Clone, Debug)]
pub enum Operands<'input> {
    None,
    Load(Operand<'input>, Operand<'input>),
    Store(Operand<'input>, Operand<'input>),
}

fn user_error<'input, T, S: Into<String>>(message: S, start: usize, end: usize) -> ActionResult<'input, T> {
    Err(ParseError::User { error: LitmusParseError::Syntax { message: message.into(), span: (start, end) } })
}

pub fn header<'input>(source: &'input str, line: &'input str, start: usize, end: usize) -> Header<'input> {
    let mut words = line.splitn(2, char::is_whitespace);
    let arch = words.next().unwrap_or("");
    let name = words.next().unwrap_or("").trim();
    Header { arch, name, meta: Meta::new(source, start, end) }
}

fn int_error<'input>(error: ParseIntError, span: (usize, usize)) -> ParseError<usize, Tok<'input>, LitmusParseError> {
    ParseError::User { error: LitmusParseError::ParseInt { error, span } }
}

pub fn index<'input>(digits: &str, start: usize, end: usize) -> ActionResult<'input, u32> {
    digits.parse::<u32>().map_err(|error| int_error(error, (start, end)))
}

pub fn integer<'input>(negative: bool, digits: &str, start: usize, end: usize) -> ActionResult<'input, i64> {
    let digits = if negative { format!("-{}", digits) } else { digits.to_string() };
    digits.parse::<i64>().map_err(|error| int_error(error, (start, end)))
}

pub fn thread_index<'input>(name: &str, start: usize, end: usize) -> ActionResult<'input, u32> {
    match THREAD_REGEX.captures(name).and_then(|caps| caps.get(1)).map(|n| n.as_str().parse::<u32>()) {
        Some(Ok(n)) => Ok(n),
        _ => user_error(format!("{} is not a thread name of the form P<n>", name), start, end),
    }
}

pub fn thread_decl<'input>(
    source: &'input str,
    thread: u32,
    fields: Vec<((usize, &'input str, usize), u32)>,
    start: usize,
    end: usize,
) -> ActionResult<'input, ThreadDecl> {
    let mut cta = None;
    let mut gpu = None;
    for ((key_start, key, key_end), n) in fields {
        match key {
            "cta" if cta.is_none() => cta = Some(n),
            "gpu" if gpu.is_none() => gpu = Some(n),
            _ => return user_error(format!("unexpected {}, expected cta or gpu", key), key_start, key_end),
        }
    }
    match (cta, gpu) {
        (Some(cta), Some(gpu)) => Ok(ThreadDecl { thread, cta, gpu, meta: Meta::new(source, start, end) }),
        _ => user_error("thread declaration must give both a cta and a gpu index", start, end),
    }
}

/// Build an instruction from its mnemonic, dotted qualifiers, and
/// operands. A qualifier naming a scope goes in the scope slot and any
/// other qualifier in the semantics slot, so `fence.gpu.acq_rel` and
/// `fence.acq_rel.gpu` are the same instruction.
pub fn instr<'input>(
    source: &'input str,
    op: (usize, &'input str, usize),
    tags: Vec<(usize, &'input str, usize)>,
    operands: Operands<'input>,
    start: usize,
    end: usize,
) -> ActionResult<'input, Instr<'input>> {
    let (_, mnemonic, op_end) = op;

    let mut sem: Option<Tag<'input>> = None;
    let mut scope: Option<Tag<'input>> = None;
    for (tag_start, name, tag_end) in tags {
        let slot = if Scope::from_tag(name).is_some() { &mut scope } else { &mut sem };
        if let Some(previous) = slot {
            return user_error(format!("qualifier .{} conflicts with .{}", name, previous.name), tag_start, tag_end);
        }
        *slot = Some(Tag { name, meta: Meta::new(source, tag_start, tag_end) })
    }

    let meta = Meta::new(source, start, end);
    match (mnemonic, operands) {
        ("ld", Operands::Load(dst, src)) => Ok(Instr::Load { op: mnemonic, sem, scope, dst, src, meta }),
        ("st", Operands::Store(dst, value)) => Ok(Instr::Store { op: mnemonic, sem, scope, dst, value, meta }),
        ("fence", Operands::None) => Ok(Instr::Fence { op: mnemonic, sem, scope, meta }),
        ("ld", _) => user_error("ld takes a register and an address, as in ld r0 = [x]", start, end),
        ("st", _) => user_error("st takes an address and a value, as in st [x] = 1", start, end),
        ("fence", _) => user_error("fence takes no operands", start, end),
        ("atom" | "red", _) => user_error(format!("{} instructions are not supported", mnemonic), start, op_end),
        _ => user_error(format!("unknown instruction {}", mnemonic), start, op_end),
    }
}

fn format_expected_tokens(expected: &[String]) -> String {
    if expected.is_empty() {
        "".to_string()
    } else {
        let mut output = ", expected:".to_string();
        for token in expected {
            output = format!("{} {}", output, token)
        }
        output
    }
}

fn parse_error(source: &str, parse_error: ParseError<usize, Tok<'_>, LitmusParseError>) -> LitmusError {
    let (kind, message, (start, end)) = match parse_error {
        ParseError::InvalidToken { location } => (ErrorKind::Syntax, "invalid token".to_string(), (location, location)),
        ParseError::UnrecognizedEof { location, expected } => {
            if source.trim().is_empty() {
                (ErrorKind::Syntax, "empty litmus file".to_string(), (0, 0))
            } else {
                let message = format!("unexpected end of file{}", format_expected_tokens(&expected));
                (ErrorKind::Syntax, message, (location, location))
            }
        }
        ParseError::UnrecognizedToken { token: (start, tok, end), expected } => {
            (ErrorKind::Syntax, format!("unexpected {}{}", tok, format_expected_tokens(&expected)), (start, end))
        }
        ParseError::ExtraToken { token: (start, tok, end) } => {
            (ErrorKind::Syntax, format!("extra token {}", tok), (start, end))
        }
        ParseError::User { error } => match error {
            LitmusParseError::Lex { pos } => {
                // Point at the character that could not be lexed
                let len = source.get(pos..).and_then(|rest| rest.chars().next()).map(char::len_utf8).unwrap_or(0);
                (ErrorKind::Lex, error.to_string(), (pos, pos + len))
            }
            LitmusParseError::ParseInt { error, span } => (ErrorKind::Syntax, format!("bad integer: {}", error), span),
            LitmusParseError::Syntax { message, span } => (ErrorKind::Syntax, message, span),
        },
    };
    LitmusError::new(kind, source, Meta::new(source, start, end), message)
}

pub fn parse(source: &str) -> Result<LitmusFile<'_>, LitmusError> {
    LitmusFileParser::new().parse(source, LitmusLexer::new(source)).map_err(|e| parse_error(source, e))
}
