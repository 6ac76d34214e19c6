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


//! Builds a [`LitmusTest`] from a parsed litmus file in a single pass.
//!
//! All of the mutable state needed while walking the file (the
//! identifier counters, the declared locations, and the thread
//! router) lives in a [`BuildState`] which is created for each test
//! and consumed when the test is assembled, so independent tests can
//! be built concurrently.

use std::collections::{HashMap, HashSet};

use ptxlit_lib::log;

use crate::error::{ErrorKind, LitmusError};
use crate::event::{self, AddressSpace, Event, EventKind, MemoryOrder, OrderMismatch, Scope, Semantics};
use crate::exp::{self, Command, CommandKind};
use crate::litmus::{LitmusTest, MemoryLocation, RegisterInit};
use crate::parser;
use crate::semantics;
use crate::syntax::{self, Assertion, AssertionKind, Decl, Instr, LitmusFile, Meta, Tag, ThreadDecl};
use crate::thread::{RouteError, Thread, ThreadId, ThreadRouter};

/// Hands out the names of events (`i0`, `i1`, ...) and commands
/// (`exist0`, `forbid1`, ...). Commands share one counter across all
/// assertion kinds, so every name is unique within a test.
#[derive(Debug, Default)]
pub struct IdGenerator {
    events: usize,
    commands: usize,
}

impl IdGenerator {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn event_id(&mut self) -> String {
        let id = format!("i{}", self.events);
        self.events += 1;
        id
    }

    pub fn command_name(&mut self, kind: CommandKind) -> String {
        let name = format!("{}{}", kind.prefix(), self.commands);
        self.commands += 1;
        name
    }
}

pub struct BuildState<'src> {
    source: &'src str,
    ids: IdGenerator,
    router: ThreadRouter,
    locations: HashMap<&'src str, Meta>,
    registers: Vec<RegisterInit>,
}

impl<'src> BuildState<'src> {
    pub fn new(source: &'src str) -> Self {
        BuildState {
            source,
            ids: IdGenerator::new(),
            router: ThreadRouter::new(),
            locations: HashMap::new(),
            registers: Vec::new(),
        }
    }

    fn error<S: Into<String>>(&self, kind: ErrorKind, meta: Meta, message: S) -> LitmusError {
        LitmusError::new(kind, self.source, meta, message)
    }

    fn route_error(&self, err: RouteError, meta: Meta) -> LitmusError {
        let kind = match err {
            RouteError::Misaligned { .. } => ErrorKind::Misalignment,
            RouteError::Unaligned { .. } => ErrorKind::ColumnAlignment,
        };
        self.error(kind, meta, err.to_string())
    }

    fn mismatch_error(&self, err: OrderMismatch, meta: Meta) -> LitmusError {
        self.error(ErrorKind::IllegalEncoding, meta, format!("illegal encoding: {}", err))
    }

    /// Resolve the qualifiers of an instruction into a legal ordering.
    /// An access without a semantics qualifier is weak.
    fn order(
        &self,
        kind: EventKind,
        sem: &Option<Tag<'src>>,
        scope: &Option<Tag<'src>>,
        meta: Meta,
    ) -> Result<MemoryOrder, LitmusError> {
        let sem = match sem {
            None => Semantics::Weak,
            Some(tag) => match Semantics::from_tag(tag.name) {
                Some(sem) => sem,
                None => {
                    let message = format!("illegal encoding: {} does not support .{} accesses", kind, tag.name);
                    return Err(self.error(ErrorKind::IllegalEncoding, meta, message));
                }
            },
        };
        let scope = match scope {
            None => None,
            Some(tag) => match Scope::from_tag(tag.name) {
                Some(scope) => Some(scope),
                None => {
                    let message = format!("illegal encoding: unknown scope .{}", tag.name);
                    return Err(self.error(ErrorKind::IllegalEncoding, meta, message));
                }
            },
        };
        semantics::validate(kind, sem, scope).map_err(|e| self.error(ErrorKind::IllegalEncoding, meta, e.to_string()))
    }

    /// `[x]` refers to the location `x` when one has been declared,
    /// otherwise to a register holding an address.
    fn operand(&self, operand: &syntax::Operand<'src>) -> event::Operand {
        match operand {
            syntax::Operand::Register(name, _) => event::Operand::Register(name.to_string()),
            syntax::Operand::Constant(n, _) => event::Operand::Constant(*n),
            syntax::Operand::Address(name, _) if self.locations.contains_key(name) => {
                event::Operand::Location(name.to_string())
            }
            syntax::Operand::Address(name, _) => event::Operand::Register(name.to_string()),
        }
    }
}

pub fn parse(model: &str, contents: &str) -> Result<LitmusTest, LitmusError> {
    let file = parser::parse(contents)?;
    build(model, contents, &file)
}

pub fn build<'src>(model: &str, source: &'src str, file: &LitmusFile<'src>) -> Result<LitmusTest, LitmusError> {
    log!(log::BUILD, &format!("Building {} {} for model {}", file.header.arch, file.header.name, model));
    let mut state = BuildState::new(source);

    let mut locations = Vec::with_capacity(file.decls.len());
    for decl in &file.decls {
        locations.push(visit_decl(decl, &mut state)?)
    }

    for thread in &file.threads {
        visit_thread_decl(thread, &mut state)?
    }

    for instr in &file.instructions {
        visit_instr(instr, &mut state)?
    }

    let commands = file.assertions.iter().map(|assertion| visit_assertion(assertion, &mut state)).collect();

    assemble(model, file, state, locations, commands)
}

/// Register initialisations are recorded in the build state, so only
/// location declarations produce an entry here.
fn visit_decl<'src>(decl: &Decl<'src>, state: &mut BuildState<'src>) -> Result<Option<MemoryLocation>, LitmusError> {
    match decl {
        Decl::Location { location, constant, meta } => {
            if state.locations.insert(*location, *meta).is_some() {
                let message = format!("location {} is declared more than once", location);
                return Err(state.error(ErrorKind::DuplicateLocation, *meta, message));
            }
            log!(log::BUILD, &format!("Location {} = {}", location, constant));
            Ok(Some(MemoryLocation { name: location.to_string(), space: AddressSpace::Global, initial: *constant }))
        }
        Decl::Register { thread, register, constant, .. } => {
            log!(log::BUILD, &format!("Register P{}:{} = {}", thread, register, constant));
            state.registers.push(RegisterInit { thread: *thread, register: register.to_string(), value: *constant });
            Ok(None)
        }
    }
}

fn visit_thread_decl(decl: &ThreadDecl, state: &mut BuildState) -> Result<(), LitmusError> {
    let id = ThreadId::new(decl.gpu, decl.cta, decl.thread);
    let column = decl.meta.column();
    log!(log::BUILD, &format!("Thread {} in column {}", id, column));
    state.router.declare_thread(column, id, decl.meta).map_err(|e| state.route_error(e, decl.meta))
}

fn visit_instr<'src>(instr: &Instr<'src>, state: &mut BuildState<'src>) -> Result<(), LitmusError> {
    let meta = instr.meta();
    let line = meta.line();

    let event = match instr {
        Instr::Load { op, sem, scope, dst, src, .. } => {
            let order = state.order(EventKind::Load, sem, scope, meta)?;
            let (dst, src) = (state.operand(dst), state.operand(src));
            let load = event::Load::new(state.ids.event_id(), op.to_string(), order, dst, src, line)
                .map_err(|e| state.mismatch_error(e, meta))?;
            Event::Load(load)
        }
        Instr::Store { op, sem, scope, dst, value, .. } => {
            let order = state.order(EventKind::Store, sem, scope, meta)?;
            let (dst, value) = (state.operand(dst), state.operand(value));
            let store = event::Store::new(state.ids.event_id(), op.to_string(), order, dst, value, line)
                .map_err(|e| state.mismatch_error(e, meta))?;
            Event::Store(store)
        }
        Instr::Fence { sem, scope, .. } => {
            let order = state.order(EventKind::Fence, sem, scope, meta)?;
            let fence =
                event::Fence::new(state.ids.event_id(), order, line).map_err(|e| state.mismatch_error(e, meta))?;
            Event::Fence(fence)
        }
    };

    let column = meta.column();
    log!(log::BUILD, &format!("{}: {} in column {}", event.id(), event, column));
    state.router.route_event(column, event).map_err(|e| state.route_error(e, meta))?;
    Ok(())
}

fn visit_exp(node: &syntax::Exp) -> exp::Exp {
    use syntax::Exp::*;
    match node {
        Register { name, .. } => exp::register(*name),
        Constant(n, _) => exp::constant(*n),
        Eq(lhs, rhs, _) => exp::equal(visit_exp(lhs), visit_exp(rhs)),
        Neq(lhs, rhs, _) => exp::not_equal(visit_exp(lhs), visit_exp(rhs)),
        And(lhs, rhs, _) => exp::and(visit_exp(lhs), visit_exp(rhs)),
        Or(lhs, rhs, _) => exp::or(visit_exp(lhs), visit_exp(rhs)),
        Not(inner, _) => exp::not(visit_exp(inner)),
    }
}

fn visit_assertion(assertion: &Assertion, state: &mut BuildState) -> Command {
    let kind = match assertion.kind {
        AssertionKind::Exist => CommandKind::Exist,
        AssertionKind::Forbid => CommandKind::Forbid,
        AssertionKind::Forall => CommandKind::Forall,
    };
    let name = state.ids.command_name(kind);
    let command = kind.command(name, visit_exp(&assertion.exp), assertion.meta.line());
    log!(log::BUILD, &format!("Command {}", command));
    command
}

/// Collect everything into the final test. Threads are kept in
/// column order, and threads without any events are dropped.
fn assemble(
    model: &str,
    file: &LitmusFile,
    state: BuildState,
    locations: Vec<Option<MemoryLocation>>,
    commands: Vec<Command>,
) -> Result<LitmusTest, LitmusError> {
    let BuildState { source, router, registers, .. } = state;

    let mut seen = HashSet::new();
    let mut threads = Vec::new();
    for routed in router.seal() {
        if routed.events.is_empty() {
            log!(log::BUILD, &format!("Thread {} has no events", routed.id));
            continue;
        }
        if !seen.insert(routed.id) {
            let message = format!("thread {} is declared in more than one column", routed.id);
            return Err(LitmusError::new(ErrorKind::DuplicateThread, source, routed.decl, message));
        }
        threads.push(Thread { id: routed.id, events: routed.events })
    }

    Ok(LitmusTest {
        model: model.to_string(),
        arch: file.header.arch.to_string(),
        name: file.header.name.to_string(),
        doc: file.doc.map(str::to_string),
        locations: locations.into_iter().flatten().collect(),
        registers,
        threads,
        commands,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Proxy;
    use crate::exp::{constant, equal, not, register};

    /// Lay out a row of cells so every cell starts in the same column
    /// as the corresponding cell of any other row.
    fn row(cells: &[&str]) -> String {
        let cells: Vec<String> = cells.iter().map(|cell| format!(" {:<24}", cell)).collect();
        format!("{};\n", cells.join("|"))
    }

    fn litmus(name: &str, decls: &str, rows: &[&[&str]], assertions: &str) -> String {
        let rows: String = rows.iter().map(|cells| row(cells)).collect();
        format!("PTX {}\n{{ {} }}\n{}{}\n", name, decls, rows, assertions)
    }

    #[test]
    fn test_single_relaxed_store() {
        let src = litmus("S1", "x = 0;", &[&["P0@cta 0,gpu 0"], &["st.relaxed.gpu [x] = 1"]], "exist (x == 1)");
        let test = parse("ptx", &src).unwrap();

        assert_eq!(test.model, "ptx");
        assert_eq!(test.name, "S1");
        assert_eq!(
            test.locations,
            vec![MemoryLocation { name: "x".to_string(), space: AddressSpace::Global, initial: 0 }]
        );
        assert_eq!(test.threads.len(), 1);
        assert_eq!(test.threads[0].id, ThreadId::new(0, 0, 0));
        match &test.threads[0].events[..] {
            [Event::Store(store)] => {
                assert_eq!(store.order().sem(), Semantics::Relaxed);
                assert_eq!(store.order().scope(), Some(Scope::Gpu));
                assert_eq!(store.proxy(), Proxy::Generic);
                assert_eq!(store.dst(), &event::Operand::Location("x".to_string()));
                assert_eq!(store.value(), &event::Operand::Constant(1));
                assert_eq!(store.line(), 4)
            }
            events => panic!("expected a single store, got {:?}", events),
        }
        assert_eq!(
            test.commands,
            vec![Command { name: "exist0".to_string(), exp: equal(register("x"), constant(1)), expected: true, line: 5 }]
        )
    }

    #[test]
    fn test_weak_with_scope_rejected() {
        let src = litmus("S2", "x = 0;", &[&["P0@cta 0,gpu 0"], &["st.weak.cta [x] = 1"]], "");
        let err = parse("ptx", &src).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IllegalEncoding);
        assert_eq!(err.line(), 4);
        assert_eq!(err.to_string(), "Line 4: 'st.weak.cta [x] = 1': illegal encoding: .weak accesses should not have scope")
    }

    #[test]
    fn test_release_load_rejected() {
        let src = litmus("S3", "x = 0;", &[&["P0@cta 0,gpu 0"], &["ld.release.gpu r0 = [x]"]], "");
        let err = parse("ptx", &src).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IllegalEncoding);
        assert_eq!(err.message, "illegal encoding: load does not support .release accesses")
    }

    #[test]
    fn test_unaligned_instruction() {
        let src = "PTX S4\n{ x = 0; }\n P0@cta 0,gpu 0 ;\n   st.relaxed.gpu [x] = 1 ;\n";
        let err = parse("ptx", src).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ColumnAlignment);
        assert_eq!(err.to_string(), "Line 4: 'st.relaxed.gpu [x] = 1': Not aligned: 4 starting point not match all threads")
    }

    #[test]
    fn test_forall_polarity() {
        let src = litmus("S5", "P0:r1 = 0;", &[&["P0@cta 0,gpu 0"], &["ld.acquire.sys r1 = [x]"]], "forall(r1 == 0)");
        let test = parse("ptx", &src).unwrap();
        assert!(test.locations.is_empty());
        assert_eq!(test.registers, vec![RegisterInit { thread: 0, register: "r1".to_string(), value: 0 }]);
        assert_eq!(test.commands.len(), 1);
        assert_eq!(test.commands[0].name, "forall0");
        assert_eq!(test.commands[0].exp, equal(register("r1"), constant(0)));
        assert!(!test.commands[0].expected)
    }

    #[test]
    fn test_unique_names() {
        let src = litmus(
            "MP",
            "x = 0; y = 0;",
            &[
                &["P0@cta 0,gpu 0", "P1@cta 0,gpu 0"],
                &["st.relaxed.gpu [x] = 1", "ld.acquire.gpu r0 = [y]"],
                &["fence.acq_rel.gpu", ""],
                &["st.release.gpu [y] = 1", "ld.relaxed.gpu r1 = [x]"],
            ],
            "exists (P1:r0 == 1 /\\ P1:r1 == 0)\n~exists (P1:r0 == 1 /\\ P1:r1 == 0)",
        );
        let test = parse("ptx", &src).unwrap();

        let ids: Vec<&str> = test.events().map(|ev| ev.id()).collect();
        assert_eq!(ids, vec!["i0", "i2", "i3", "i1", "i4"]);
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());

        let names: Vec<&str> = test.commands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["exist0", "forbid1"]);
        assert_eq!(test.commands[1].exp, not(test.commands[0].exp.clone()));
        assert!(!test.commands[1].expected)
    }

    #[test]
    fn test_fences() {
        let src = litmus("F", "", &[&["P0@cta 0,gpu 0"], &["fence.bar_sync.cta"]], "");
        let test = parse("ptx", &src).unwrap();
        let fence = &test.threads[0].events[0];
        assert_eq!(fence.kind(), EventKind::Fence);
        assert_eq!(fence.sem(), Semantics::SequentiallyConsistent);
        assert_eq!(fence.scope(), Some(Scope::Cta));

        let src = litmus("F", "", &[&["P0@cta 0,gpu 0"], &["fence"]], "");
        let err = parse("ptx", &src).unwrap_err();
        assert_eq!(err.message, "illegal encoding: fence does not support .weak accesses")
    }

    #[test]
    fn test_weak_default_and_operands() {
        let src = litmus("W", "x = 0;", &[&["P0@cta 0,gpu 0"], &["ld r0 = [r1]"], &["st [x] = r0"]], "");
        let test = parse("ptx", &src).unwrap();
        match &test.threads[0].events[..] {
            [Event::Load(load), Event::Store(store)] => {
                assert_eq!(load.order().sem(), Semantics::Relaxed);
                assert_eq!(load.order().scope(), Some(Scope::Sys));
                assert_eq!(load.src(), &event::Operand::Register("r1".to_string()));
                assert_eq!(load.return_value(), None);
                assert_eq!(store.dst(), &event::Operand::Location("x".to_string()));
                assert_eq!(store.value(), &event::Operand::Register("r0".to_string()))
            }
            events => panic!("expected a load and a store, got {:?}", events),
        }
    }

    #[test]
    fn test_unknown_semantics() {
        let src = litmus("U", "x = 0;", &[&["P0@cta 0,gpu 0"], &["st.volatile [x] = 1"]], "");
        let err = parse("ptx", &src).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IllegalEncoding);
        assert_eq!(err.message, "illegal encoding: store does not support .volatile accesses")
    }

    #[test]
    fn test_unknown_scope() {
        let src = litmus("U", "x = 0;", &[&["P0@cta 0,gpu 0"], &["st.relaxed.gpu [x] = 1"]], "");
        let mut file = parser::parse(&src).unwrap();
        match &mut file.instructions[0] {
            Instr::Store { scope: Some(tag), .. } => tag.name = "warp",
            instr => panic!("expected a scoped store, got {:?}", instr),
        }
        let err = build("ptx", &src, &file).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IllegalEncoding);
        assert_eq!(err.to_string(), "Line 4: 'st.relaxed.gpu [x] = 1': illegal encoding: unknown scope .warp")
    }

    #[test]
    fn test_threads_without_events_omitted() {
        let src = litmus(
            "E",
            "x = 0;",
            &[&["P0@cta 0,gpu 0", "P1@cta 1,gpu 0", "P2@cta 0,gpu 1"], &["", "", "st.relaxed.sys [x] = 1"]],
            "",
        );
        let test = parse("ptx", &src).unwrap();
        assert_eq!(test.threads.len(), 1);
        assert_eq!(test.threads[0].id, ThreadId::new(1, 0, 2))
    }

    #[test]
    fn test_duplicate_thread() {
        let src = litmus(
            "D",
            "x = 0;",
            &[&["P0@cta 0,gpu 0", "P0@cta 0,gpu 0"], &["st.relaxed.sys [x] = 1", "st.relaxed.sys [x] = 2"]],
            "",
        );
        let err = parse("ptx", &src).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateThread);
        assert_eq!(err.line(), 3);
        assert_eq!(err.loc.column(), 28)
    }

    #[test]
    fn test_duplicate_location() {
        let src = litmus("L", "x = 0; x = 1;", &[&["P0@cta 0,gpu 0"]], "");
        let err = parse("ptx", &src).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateLocation);
        assert_eq!(err.to_string(), "Line 2: 'x = 1': location x is declared more than once")
    }

    #[test]
    fn test_id_generator() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.event_id(), "i0");
        assert_eq!(ids.command_name(CommandKind::Forbid), "forbid0");
        assert_eq!(ids.event_id(), "i1");
        assert_eq!(ids.command_name(CommandKind::Exist), "exist1")
    }
}
