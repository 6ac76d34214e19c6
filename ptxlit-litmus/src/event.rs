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


//! Events are the typed form of the instructions in a litmus test.

use std::error::Error;
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Load,
    Store,
    Fence,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EventKind::Load => write!(f, "load"),
            EventKind::Store => write!(f, "store"),
            EventKind::Fence => write!(f, "fence"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Semantics {
    Weak,
    Relaxed,
    Acquire,
    Release,
    AcqRel,
    BarSync,
    SequentiallyConsistent,
}

impl Semantics {
    pub const ALL: [Semantics; 7] = [
        Semantics::Weak,
        Semantics::Relaxed,
        Semantics::Acquire,
        Semantics::Release,
        Semantics::AcqRel,
        Semantics::BarSync,
        Semantics::SequentiallyConsistent,
    ];

    pub fn from_tag(tag: &str) -> Option<Self> {
        use Semantics::*;
        match tag {
            "weak" => Some(Weak),
            "relaxed" => Some(Relaxed),
            "acquire" => Some(Acquire),
            "release" => Some(Release),
            "acq_rel" => Some(AcqRel),
            "bar_sync" => Some(BarSync),
            "sc" => Some(SequentiallyConsistent),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        use Semantics::*;
        match self {
            Weak => "weak",
            Relaxed => "relaxed",
            Acquire => "acquire",
            Release => "release",
            AcqRel => "acq_rel",
            BarSync => "bar_sync",
            SequentiallyConsistent => "sc",
        }
    }
}

impl fmt::Display for Semantics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    Cta,
    Gpu,
    Sys,
}

impl Scope {
    pub const ALL: [Scope; 3] = [Scope::Cta, Scope::Gpu, Scope::Sys];

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "cta" => Some(Scope::Cta),
            "gpu" => Some(Scope::Gpu),
            "sys" => Some(Scope::Sys),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Scope::Cta => "cta",
            Scope::Gpu => "gpu",
            Scope::Sys => "sys",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// The memory proxy an access goes through. Litmus tests only
/// describe generic-proxy accesses.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Proxy {
    Generic,
}

impl fmt::Display for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "generic")
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AddressSpace {
    Global,
}

impl fmt::Display for AddressSpace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "global")
    }
}

/// A semantics and scope pair which has passed
/// [`crate::semantics::validate`] for one kind of event. There is no
/// other way to create one, and the event constructors check the kind,
/// so every event carries an ordering that is legal for it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemoryOrder {
    kind: EventKind,
    sem: Semantics,
    scope: Option<Scope>,
}

impl MemoryOrder {
    pub(crate) fn validated(kind: EventKind, sem: Semantics, scope: Option<Scope>) -> Self {
        MemoryOrder { kind, sem, scope }
    }

    /// The kind of event this ordering was validated for
    pub fn kind(self) -> EventKind {
        self.kind
    }

    pub fn sem(self) -> Semantics {
        self.sem
    }

    pub fn scope(self) -> Option<Scope> {
        self.scope
    }
}

impl fmt::Display for MemoryOrder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.scope {
            Some(scope) => write!(f, ".{}.{}", self.sem, scope),
            None => write!(f, ".{}", self.sem),
        }
    }
}

/// An ordering validated for one kind of event was used to build
/// another.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderMismatch {
    pub expected: EventKind,
    pub found: EventKind,
}

impl fmt::Display for OrderMismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a {} ordering cannot annotate a {}", self.found, self.expected)
    }
}

impl Error for OrderMismatch {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

fn check_kind(expected: EventKind, order: MemoryOrder) -> Result<(), OrderMismatch> {
    if order.kind == expected {
        Ok(())
    } else {
        Err(OrderMismatch { expected, found: order.kind })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    Register(String),
    /// A declared memory location
    Location(String),
    Constant(i64),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operand::Register(name) | Operand::Location(name) => write!(f, "{}", name),
            Operand::Constant(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Load {
    id: String,
    op: String,
    order: MemoryOrder,
    proxy: Proxy,
    dst: Operand,
    src: Operand,
    return_value: Option<i64>,
    line: u32,
}

impl Load {
    pub fn new(
        id: String,
        op: String,
        order: MemoryOrder,
        dst: Operand,
        src: Operand,
        line: u32,
    ) -> Result<Self, OrderMismatch> {
        check_kind(EventKind::Load, order)?;
        Ok(Load { id, op, order, proxy: Proxy::Generic, dst, src, return_value: None, line })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn op(&self) -> &str {
        &self.op
    }

    pub fn order(&self) -> MemoryOrder {
        self.order
    }

    pub fn proxy(&self) -> Proxy {
        self.proxy
    }

    pub fn dst(&self) -> &Operand {
        &self.dst
    }

    pub fn src(&self) -> &Operand {
        &self.src
    }

    /// Unknown until a later stage has run the test
    pub fn return_value(&self) -> Option<i64> {
        self.return_value
    }

    pub fn line(&self) -> u32 {
        self.line
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Store {
    id: String,
    op: String,
    order: MemoryOrder,
    proxy: Proxy,
    dst: Operand,
    value: Operand,
    line: u32,
}

impl Store {
    pub fn new(
        id: String,
        op: String,
        order: MemoryOrder,
        dst: Operand,
        value: Operand,
        line: u32,
    ) -> Result<Self, OrderMismatch> {
        check_kind(EventKind::Store, order)?;
        Ok(Store { id, op, order, proxy: Proxy::Generic, dst, value, line })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn op(&self) -> &str {
        &self.op
    }

    pub fn order(&self) -> MemoryOrder {
        self.order
    }

    pub fn proxy(&self) -> Proxy {
        self.proxy
    }

    pub fn dst(&self) -> &Operand {
        &self.dst
    }

    pub fn value(&self) -> &Operand {
        &self.value
    }

    pub fn line(&self) -> u32 {
        self.line
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fence {
    id: String,
    order: MemoryOrder,
    line: u32,
}

impl Fence {
    pub fn new(id: String, order: MemoryOrder, line: u32) -> Result<Self, OrderMismatch> {
        check_kind(EventKind::Fence, order)?;
        Ok(Fence { id, order, line })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn order(&self) -> MemoryOrder {
        self.order
    }

    pub fn line(&self) -> u32 {
        self.line
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Load(Load),
    Store(Store),
    Fence(Fence),
}

impl Event {
    pub fn id(&self) -> &str {
        match self {
            Event::Load(load) => load.id(),
            Event::Store(store) => store.id(),
            Event::Fence(fence) => fence.id(),
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::Load(_) => EventKind::Load,
            Event::Store(_) => EventKind::Store,
            Event::Fence(_) => EventKind::Fence,
        }
    }

    pub fn order(&self) -> MemoryOrder {
        match self {
            Event::Load(load) => load.order(),
            Event::Store(store) => store.order(),
            Event::Fence(fence) => fence.order(),
        }
    }

    pub fn sem(&self) -> Semantics {
        self.order().sem()
    }

    pub fn scope(&self) -> Option<Scope> {
        self.order().scope()
    }

    pub fn line(&self) -> u32 {
        match self {
            Event::Load(load) => load.line(),
            Event::Store(store) => store.line(),
            Event::Fence(fence) => fence.line(),
        }
    }
}

/// Events are printed in litmus syntax, with their normalized ordering.
impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Event::Load(load) => write!(f, "{}{} {} = [{}]", load.op(), load.order, load.dst(), load.src()),
            Event::Store(store) => write!(f, "{}{} [{}] = {}", store.op(), store.order, store.dst(), store.value()),
            // The only sc fences are promoted bar_sync fences
            Event::Fence(fence) if fence.order.sem == Semantics::SequentiallyConsistent => match fence.order.scope {
                Some(scope) => write!(f, "fence.{}.{}", Semantics::BarSync, scope),
                None => write!(f, "fence.{}", Semantics::BarSync),
            },
            Event::Fence(fence) => write!(f, "fence{}", fence.order),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::validate;

    #[test]
    fn test_tags() {
        for sem in Semantics::ALL {
            assert_eq!(Semantics::from_tag(sem.tag()), Some(sem))
        }
        for scope in Scope::ALL {
            assert_eq!(Scope::from_tag(scope.tag()), Some(scope))
        }
        assert_eq!(Semantics::from_tag("gpu"), None);
        assert_eq!(Scope::from_tag("relaxed"), None)
    }

    #[test]
    fn test_event_display() {
        let order = MemoryOrder::validated(EventKind::Load, Semantics::Acquire, Some(Scope::Gpu));
        let load = Load::new(
            "i0".to_string(),
            "ld".to_string(),
            order,
            Operand::Register("r0".to_string()),
            Operand::Location("y".to_string()),
            3,
        )
        .unwrap();
        assert_eq!(load.proxy(), Proxy::Generic);
        assert_eq!(load.return_value(), None);
        let load = Event::Load(load);
        assert_eq!(load.to_string(), "ld.acquire.gpu r0 = [y]");
        assert_eq!(load.kind(), EventKind::Load);
        assert_eq!(load.scope(), Some(Scope::Gpu));

        let order = MemoryOrder::validated(EventKind::Fence, Semantics::AcqRel, None);
        let fence = Event::Fence(Fence::new("i1".to_string(), order, 4).unwrap());
        assert_eq!(fence.to_string(), "fence.acq_rel");
        assert_eq!(fence.id(), "i1");

        let order = MemoryOrder::validated(EventKind::Fence, Semantics::SequentiallyConsistent, Some(Scope::Cta));
        let fence = Event::Fence(Fence::new("i2".to_string(), order, 5).unwrap());
        assert_eq!(fence.sem(), Semantics::SequentiallyConsistent);
        assert_eq!(fence.to_string(), "fence.bar_sync.cta")
    }

    #[test]
    fn test_cross_kind_order_rejected() {
        let order = validate(EventKind::Store, Semantics::Release, Some(Scope::Gpu)).unwrap();
        assert_eq!(order.kind(), EventKind::Store);

        let err = Fence::new("i0".to_string(), order, 1).unwrap_err();
        assert_eq!(err, OrderMismatch { expected: EventKind::Fence, found: EventKind::Store });
        assert_eq!(err.to_string(), "a store ordering cannot annotate a fence");

        let load = Load::new(
            "i1".to_string(),
            "ld".to_string(),
            order,
            Operand::Register("r0".to_string()),
            Operand::Location("x".to_string()),
            2,
        );
        assert!(load.is_err());

        let store = Store::new(
            "i2".to_string(),
            "st".to_string(),
            order,
            Operand::Location("x".to_string()),
            Operand::Constant(1),
            3,
        )
        .unwrap();
        assert_eq!(store.order().sem(), Semantics::Release)
    }
}
