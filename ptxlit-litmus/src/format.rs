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


//! Prints a litmus test back out as a table with one column per
//! thread. Events are shown with their normalized orderings, so a
//! weak load is printed as `ld.relaxed.sys`.

use std::error::Error;
use std::fmt;
use std::io::Write;

use crate::litmus::LitmusTest;

/// The header row and one row per event index. Threads with fewer
/// events than the longest thread get empty cells.
fn cells(litmus: &LitmusTest) -> Vec<Vec<String>> {
    let rows = litmus.threads.iter().map(|thread| thread.events.len()).max().unwrap_or(0);

    let mut table = vec![litmus.threads.iter().map(|thread| thread.id.to_string()).collect::<Vec<_>>()];
    for i in 0..rows {
        table.push(
            litmus
                .threads
                .iter()
                .map(|thread| thread.events.get(i).map(|event| event.to_string()).unwrap_or_default())
                .collect(),
        )
    }
    table
}

fn table_lines(litmus: &LitmusTest) -> Vec<String> {
    let table = cells(litmus);

    let mut widths = vec![0; litmus.threads.len()];
    for row in &table {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = usize::max(*width, cell.len())
        }
    }

    table
        .iter()
        .map(|row| {
            let row = row.iter().zip(&widths).map(|(cell, w)| format!(" {:<width$} ", cell, width = *w));
            format!("{};", row.collect::<Vec<_>>().join("|"))
        })
        .collect()
}

fn render_lines(litmus: &LitmusTest) -> Vec<String> {
    let mut lines = vec![format!("{} {}", litmus.arch, litmus.name)];

    if let Some(doc) = &litmus.doc {
        lines.push(format!("\"{}\"", doc))
    }

    lines.push("{".to_string());
    if !litmus.locations.is_empty() {
        let locations = litmus.locations.iter().map(|loc| format!("{} = {};", loc.name, loc.initial));
        lines.push(format!("  {}", locations.collect::<Vec<_>>().join(" ")))
    }
    if !litmus.registers.is_empty() {
        let registers =
            litmus.registers.iter().map(|init| format!("P{}:{} = {};", init.thread, init.register, init.value));
        lines.push(format!("  {}", registers.collect::<Vec<_>>().join(" ")))
    }
    lines.push("}".to_string());

    if !litmus.threads.is_empty() {
        lines.extend(table_lines(litmus))
    }

    for command in &litmus.commands {
        lines.push(command.to_string())
    }
    lines
}

pub fn write_litmus(output: &mut dyn Write, litmus: &LitmusTest) -> Result<(), Box<dyn Error>> {
    for line in render_lines(litmus) {
        writeln!(output, "{}", line)?
    }
    Ok(())
}

impl fmt::Display for LitmusTest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for line in render_lines(self) {
            writeln!(f, "{}", line)?
        }
        Ok(())
    }
}
