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


//! Litmus tests are written as tables, one thread per column. The
//! router records which column each thread header occupies and sends
//! every event to the thread whose header is in the same column.

use std::collections::BTreeMap;
use std::fmt;

use crate::event::Event;
use crate::syntax::Meta;

/// A thread is identified by its GPU (group), CTA (cluster), and its
/// index within the test.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadId {
    pub group: u32,
    pub cluster: u32,
    pub thread: u32,
}

impl ThreadId {
    pub fn new(group: u32, cluster: u32, thread: u32) -> Self {
        ThreadId { group, cluster, thread }
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "P{}@cta {},gpu {}", self.thread, self.cluster, self.group)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Thread {
    pub id: ThreadId,
    pub events: Vec<Event>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteError {
    /// A second thread header in an already claimed column
    Misaligned { column: u32, existing: ThreadId },
    /// An instruction in a column without a thread header
    Unaligned { column: u32 },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RouteError::Misaligned { column, existing } => {
                write!(f, "Misaligned: column {} is already used by thread {}", column, existing)
            }
            RouteError::Unaligned { column } => {
                write!(f, "Not aligned: {} starting point not match all threads", column)
            }
        }
    }
}

/// The events routed to one thread column, in the order they arrived.
#[derive(Clone, Debug)]
pub struct RoutedThread {
    pub id: ThreadId,
    pub column: u32,
    pub decl: Meta,
    pub events: Vec<Event>,
}

#[derive(Debug, Default)]
pub struct ThreadRouter {
    columns: BTreeMap<u32, RoutedThread>,
}

impl ThreadRouter {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn declare_thread(&mut self, column: u32, id: ThreadId, decl: Meta) -> Result<(), RouteError> {
        if let Some(existing) = self.columns.get(&column) {
            return Err(RouteError::Misaligned { column, existing: existing.id });
        }
        self.columns.insert(column, RoutedThread { id, column, decl, events: Vec::new() });
        Ok(())
    }

    /// Append an event to the thread declared in `column`, returning
    /// that thread's identity.
    pub fn route_event(&mut self, column: u32, event: Event) -> Result<ThreadId, RouteError> {
        match self.columns.get_mut(&column) {
            Some(routed) => {
                routed.events.push(event);
                Ok(routed.id)
            }
            None => Err(RouteError::Unaligned { column }),
        }
    }

    /// All declared threads, ordered left to right by column.
    pub fn seal(self) -> Vec<RoutedThread> {
        self.columns.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventKind, Fence, MemoryOrder, Semantics};

    fn fence(id: &str) -> Event {
        let order = MemoryOrder::validated(EventKind::Fence, Semantics::AcqRel, None);
        Event::Fence(Fence::new(id.to_string(), order, 1).unwrap())
    }

    fn meta() -> Meta {
        Meta::new("P0", 0, 2)
    }

    #[test]
    fn test_route_in_arrival_order() {
        let mut router = ThreadRouter::new();
        router.declare_thread(20, ThreadId::new(0, 0, 1), meta()).unwrap();
        router.declare_thread(2, ThreadId::new(0, 0, 0), meta()).unwrap();
        assert_eq!(router.route_event(2, fence("i0")).unwrap(), ThreadId::new(0, 0, 0));
        assert_eq!(router.route_event(20, fence("i1")).unwrap(), ThreadId::new(0, 0, 1));
        router.route_event(2, fence("i2")).unwrap();

        let threads = router.seal();
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].column, 2);
        assert_eq!(threads[0].events.iter().map(Event::id).collect::<Vec<_>>(), vec!["i0", "i2"]);
        assert_eq!(threads[1].events.iter().map(Event::id).collect::<Vec<_>>(), vec!["i1"])
    }

    #[test]
    fn test_unaligned_event() {
        let mut router = ThreadRouter::new();
        router.declare_thread(2, ThreadId::new(0, 0, 0), meta()).unwrap();
        assert_eq!(router.route_event(3, fence("i0")), Err(RouteError::Unaligned { column: 3 }));
        assert_eq!(
            RouteError::Unaligned { column: 3 }.to_string(),
            "Not aligned: 3 starting point not match all threads"
        );
        let threads = router.seal();
        assert_eq!(threads.len(), 1);
        assert!(threads[0].events.is_empty())
    }

    #[test]
    fn test_misaligned_declaration() {
        let mut router = ThreadRouter::new();
        router.declare_thread(2, ThreadId::new(0, 0, 0), meta()).unwrap();
        assert_eq!(
            router.declare_thread(2, ThreadId::new(0, 1, 1), meta()),
            Err(RouteError::Misaligned { column: 2, existing: ThreadId::new(0, 0, 0) })
        );
        let threads = router.seal();
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].id, ThreadId::new(0, 0, 0))
    }
}
