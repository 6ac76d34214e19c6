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


//! The syntax tree produced by the parser. Nothing here has been
//! checked beyond being well-formed; the builder is responsible for
//! giving it meaning.

use ptxlit_lib::source_loc::SourceLoc;

/// Position information attached to every node: the byte range it
/// covers in the source, and where that range starts and ends in
/// terms of lines and columns.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Meta {
    pub start: usize,
    pub end: usize,
    pub loc: SourceLoc,
}

impl Meta {
    pub fn new(source: &str, start: usize, end: usize) -> Self {
        Meta { start, end, loc: SourceLoc::from_offsets(source, start, end) }
    }

    pub fn line(&self) -> u32 {
        self.loc.line()
    }

    pub fn column(&self) -> u32 {
        self.loc.column()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header<'input> {
    pub arch: &'input str,
    pub name: &'input str,
    pub meta: Meta,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decl<'input> {
    /// `x = 0`
    Location { location: &'input str, constant: i64, meta: Meta },
    /// `P0:r0 = 0`
    Register { thread: u32, register: &'input str, constant: i64, meta: Meta },
}

/// `P0@cta 0,gpu 0`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThreadDecl {
    pub thread: u32,
    pub cta: u32,
    pub gpu: u32,
    pub meta: Meta,
}

/// A dotted qualifier on an instruction, such as the `relaxed` and
/// `gpu` in `st.relaxed.gpu`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag<'input> {
    pub name: &'input str,
    pub meta: Meta,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand<'input> {
    Register(&'input str, Meta),
    Constant(i64, Meta),
    /// `[x]`
    Address(&'input str, Meta),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instr<'input> {
    Load {
        op: &'input str,
        sem: Option<Tag<'input>>,
        scope: Option<Tag<'input>>,
        dst: Operand<'input>,
        src: Operand<'input>,
        meta: Meta,
    },
    Store {
        op: &'input str,
        sem: Option<Tag<'input>>,
        scope: Option<Tag<'input>>,
        dst: Operand<'input>,
        value: Operand<'input>,
        meta: Meta,
    },
    Fence {
        op: &'input str,
        sem: Option<Tag<'input>>,
        scope: Option<Tag<'input>>,
        meta: Meta,
    },
}

impl<'input> Instr<'input> {
    pub fn meta(&self) -> Meta {
        match self {
            Instr::Load { meta, .. } | Instr::Store { meta, .. } | Instr::Fence { meta, .. } => *meta,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Exp<'input> {
    /// A register, optionally qualified by its thread as in `P1:r0`,
    /// or a location name.
    Register { thread: Option<u32>, name: &'input str, meta: Meta },
    Constant(i64, Meta),
    Eq(Box<Exp<'input>>, Box<Exp<'input>>, Meta),
    Neq(Box<Exp<'input>>, Box<Exp<'input>>, Meta),
    And(Box<Exp<'input>>, Box<Exp<'input>>, Meta),
    Or(Box<Exp<'input>>, Box<Exp<'input>>, Meta),
    Not(Box<Exp<'input>>, Meta),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AssertionKind {
    Exist,
    Forbid,
    Forall,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assertion<'input> {
    pub kind: AssertionKind,
    pub exp: Exp<'input>,
    pub meta: Meta,
}

/// A whole litmus file. Instructions are listed row by row, left to
/// right within each row, which is the order the builder visits them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LitmusFile<'input> {
    pub header: Header<'input>,
    pub doc: Option<&'input str>,
    pub decls: Vec<Decl<'input>>,
    pub threads: Vec<ThreadDecl>,
    pub instructions: Vec<Instr<'input>>,
    pub assertions: Vec<Assertion<'input>>,
}
