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


//! The PTX memory model only admits some combinations of event kind,
//! ordering semantics, and scope. This module checks each event
//! against those rules and normalizes the ordering it carries.

use std::error::Error;
use std::fmt;

use crate::event::{EventKind, MemoryOrder, Scope, Semantics};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodingError {
    message: String,
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "illegal encoding: {}", self.message)
    }
}

impl Error for EncodingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

fn encoding_error<S: Into<String>, A>(message: S) -> Result<A, EncodingError> {
    Err(EncodingError { message: message.into() })
}

fn unsupported<A>(kind: EventKind, sem: Semantics) -> Result<A, EncodingError> {
    encoding_error(format!("{} does not support .{} accesses", kind, sem))
}

/// Check that `sem` and `scope` are legal for an event of the given
/// kind, returning the ordering the event should carry.
///
/// Weak accesses behave as relaxed accesses at system scope, so they
/// must not name a scope themselves. Stores may be weak, relaxed, or
/// release; loads weak, relaxed, or acquire. Fences are either
/// acq_rel or bar_sync, and a bar_sync fence is promoted to sc.
pub fn validate(kind: EventKind, sem: Semantics, scope: Option<Scope>) -> Result<MemoryOrder, EncodingError> {
    use Semantics::*;

    // Weak is an access qualifier, there is no weak fence
    if kind == EventKind::Fence && !matches!(sem, AcqRel | BarSync) {
        return unsupported(kind, sem);
    }

    if sem == Weak {
        if scope.is_some() {
            return encoding_error(format!(".{} accesses should not have scope", sem));
        }
        return Ok(MemoryOrder::validated(kind, Relaxed, Some(Scope::Sys)));
    }

    match kind {
        EventKind::Store if !matches!(sem, Relaxed | Release) => unsupported(kind, sem),
        EventKind::Load if !matches!(sem, Relaxed | Acquire) => unsupported(kind, sem),
        EventKind::Fence if sem == BarSync => Ok(MemoryOrder::validated(kind, SequentiallyConsistent, scope)),
        _ => Ok(MemoryOrder::validated(kind, sem, scope)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scopes() -> Vec<Option<Scope>> {
        let mut scopes = vec![None];
        scopes.extend(Scope::ALL.iter().copied().map(Some));
        scopes
    }

    fn legal(kind: EventKind) -> &'static [Semantics] {
        use Semantics::*;
        match kind {
            EventKind::Store => &[Weak, Relaxed, Release],
            EventKind::Load => &[Weak, Relaxed, Acquire],
            EventKind::Fence => &[AcqRel, BarSync],
        }
    }

    #[test]
    fn test_weak_normalization() {
        for kind in [EventKind::Load, EventKind::Store] {
            let order = validate(kind, Semantics::Weak, None).unwrap();
            assert_eq!(order.sem(), Semantics::Relaxed);
            assert_eq!(order.scope(), Some(Scope::Sys));
            for scope in Scope::ALL {
                let err = validate(kind, Semantics::Weak, Some(scope)).unwrap_err();
                assert_eq!(err.to_string(), "illegal encoding: .weak accesses should not have scope")
            }
        }
    }

    #[test]
    fn test_kind_semantics_closure() {
        for kind in [EventKind::Load, EventKind::Store, EventKind::Fence] {
            for sem in Semantics::ALL {
                for scope in scopes() {
                    let result = validate(kind, sem, scope);
                    if !legal(kind).contains(&sem) {
                        assert!(result.is_err(), "{} {:?} {:?} should be rejected", kind, sem, scope)
                    } else if sem != Semantics::Weak || scope.is_none() {
                        assert!(result.is_ok(), "{} {:?} {:?} should be accepted", kind, sem, scope)
                    }
                }
            }
        }
    }

    #[test]
    fn test_pass_through() {
        let order = validate(EventKind::Store, Semantics::Release, Some(Scope::Cta)).unwrap();
        assert_eq!((order.sem(), order.scope()), (Semantics::Release, Some(Scope::Cta)));
        let order = validate(EventKind::Load, Semantics::Acquire, None).unwrap();
        assert_eq!((order.sem(), order.scope()), (Semantics::Acquire, None));
        let order = validate(EventKind::Fence, Semantics::AcqRel, Some(Scope::Gpu)).unwrap();
        assert_eq!((order.sem(), order.scope()), (Semantics::AcqRel, Some(Scope::Gpu)))
    }

    #[test]
    fn test_bar_sync_promotion() {
        for scope in scopes() {
            let order = validate(EventKind::Fence, Semantics::BarSync, scope).unwrap();
            assert_eq!(order.kind(), EventKind::Fence);
            assert_eq!(order.sem(), Semantics::SequentiallyConsistent);
            assert_eq!(order.scope(), scope)
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            validate(EventKind::Load, Semantics::Release, Some(Scope::Gpu)).unwrap_err().to_string(),
            "illegal encoding: load does not support .release accesses"
        );
        assert_eq!(
            validate(EventKind::Store, Semantics::Acquire, None).unwrap_err().to_string(),
            "illegal encoding: store does not support .acquire accesses"
        );
        assert_eq!(
            validate(EventKind::Fence, Semantics::Weak, None).unwrap_err().to_string(),
            "illegal encoding: fence does not support .weak accesses"
        );
        assert_eq!(
            validate(EventKind::Fence, Semantics::SequentiallyConsistent, Some(Scope::Sys)).unwrap_err().to_string(),
            "illegal encoding: fence does not support .sc accesses"
        )
    }
}
