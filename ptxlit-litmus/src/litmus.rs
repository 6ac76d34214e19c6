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


//! The validated form of a litmus test, as produced by
//! [`crate::builder`]. A [`LitmusTest`] owns all of its data and is
//! never modified after it has been built.

use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

use ptxlit_lib::log;

use crate::builder;
use crate::error::LitmusError;
use crate::event::{AddressSpace, Event};
use crate::exp::Command;
use crate::thread::Thread;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryLocation {
    pub name: String,
    pub space: AddressSpace,
    pub initial: i64,
}

/// An initial value for a register, `P0:r0 = 1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterInit {
    pub thread: u32,
    pub register: String,
    pub value: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LitmusTest {
    /// The memory model the test is meant to be checked against
    pub model: String,
    pub arch: String,
    pub name: String,
    pub doc: Option<String>,
    pub locations: Vec<MemoryLocation>,
    pub registers: Vec<RegisterInit>,
    /// Threads in column order, each with its events in program order
    pub threads: Vec<Thread>,
    pub commands: Vec<Command>,
}

impl LitmusTest {
    pub fn parse(model: &str, contents: &str) -> Result<Self, LitmusError> {
        builder::parse(model, contents)
    }

    /// Read and parse a litmus file. Errors are rendered as a
    /// diagnostic pointing into the file.
    pub fn from_file<P>(model: &str, path: P, use_colors: bool) -> Result<Self, String>
    where
        P: AsRef<Path>,
    {
        let mut contents = String::new();
        match File::open(&path) {
            Ok(mut handle) => match handle.read_to_string(&mut contents) {
                Ok(_) => (),
                Err(e) => return Err(format!("Unexpected failure while reading litmus: {}", e)),
            },
            Err(e) => return Err(format!("Error when loading litmus '{}': {}", path.as_ref().display(), e)),
        };

        let file_name = path.as_ref().display().to_string();
        match Self::parse(model, &contents) {
            Ok(litmus) => {
                log!(log::LITMUS, &format!("{}: {}", file_name, litmus.summary()));
                Ok(litmus)
            }
            Err(e) => {
                log!(log::LITMUS, &format!("{}: {}", file_name, e));
                Err(e.message(&file_name, &contents, use_colors))
            }
        }
    }

    pub fn location(&self, name: &str) -> Option<&MemoryLocation> {
        self.locations.iter().find(|loc| loc.name == name)
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.threads.iter().flat_map(|thread| thread.events.iter())
    }

    /// A one line description, used when logging
    pub fn summary(&self) -> String {
        format!(
            "{} {} ({}): {} locations, {} threads, {} events, {} commands",
            self.arch,
            self.name,
            self.model,
            self.locations.len(),
            self.threads.len(),
            self.events().count(),
            self.commands.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SB: &str = "PTX SB
{ x = 0; y = 0; }
 P0@cta 0,gpu 0          | P1@cta 1,gpu 0          ;
 st.relaxed.sys [x] = 1  | st.relaxed.sys [y] = 1  ;
 ld.relaxed.sys r0 = [y] | ld.relaxed.sys r0 = [x] ;
exists (P0:r0 == 0 /\\ P1:r0 == 0)
";

    #[test]
    fn test_summary_and_lookup() {
        let litmus = LitmusTest::parse("ptx", SB).unwrap();
        assert_eq!(litmus.summary(), "PTX SB (ptx): 2 locations, 2 threads, 4 events, 1 commands");
        assert_eq!(litmus.location("y").map(|loc| loc.initial), Some(0));
        assert!(litmus.location("z").is_none());
        let ids: Vec<&str> = litmus.events().map(|ev| ev.id()).collect();
        assert_eq!(ids, vec!["i0", "i2", "i1", "i3"])
    }

    #[test]
    fn test_from_file() {
        let dir = std::env::temp_dir().join(format!("ptxlit-litmus-from-file-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let good = dir.join("SB.litmus");
        fs::write(&good, SB).unwrap();
        assert_eq!(LitmusTest::from_file("ptx", &good, false).unwrap().name, "SB");

        let bad = dir.join("bad.litmus");
        fs::write(&bad, "PTX bad\n{ x = 0; }\n P0@cta 0,gpu 0 ;\n ld.release r0 = [x] ;\n").unwrap();
        let message = LitmusTest::from_file("ptx", &bad, false).unwrap_err();
        assert!(message.starts_with("error: illegal encoding: load does not support .release accesses"));
        assert!(message.contains("bad.litmus:4:2"));

        assert!(LitmusTest::from_file("ptx", dir.join("missing.litmus"), false).is_err());
        fs::remove_dir_all(&dir).unwrap()
    }
}
