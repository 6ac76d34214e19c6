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


use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use ptxlit_lib::log;
use ptxlit_litmus::batch::{check_directory, write_report};

mod opts;
use opts::CommonOpts;

fn main() {
    let code = ptxlit_main();
    process::exit(code)
}

fn ptxlit_main() -> i32 {
    let mut opts = opts::common_opts();
    opts.optopt("d", "dir", "check every litmus test in this directory", "DIR");
    opts.optopt("o", "output", "write the report to this file (default PTX-expected.csv)", "FILE");

    let (matches, CommonOpts { num_threads, config }) = opts::parse(&opts);

    let dir = match matches.opt_str("dir").or_else(|| matches.free.first().cloned()) {
        Some(dir) => PathBuf::from(dir),
        None => {
            eprintln!("Please provide a directory of litmus tests");
            opts::print_usage(&opts, 1)
        }
    };
    let output = matches.opt_str("output").unwrap_or_else(|| "PTX-expected.csv".to_string());

    let now = Instant::now();
    let rows = match check_directory(&dir, &config, num_threads) {
        Ok(rows) => rows,
        Err(msg) => {
            eprintln!("{}", msg);
            return 1;
        }
    };
    log!(log::VERBOSE, &format!("Checking took: {}ms", now.elapsed().as_millis()));

    let written = File::create(&output).and_then(|file| {
        let mut writer = BufWriter::new(file);
        write_report(&mut writer, &config.report_prefix, &rows)?;
        writer.flush()
    });
    if let Err(e) = written {
        eprintln!("Failed to write report '{}': {}", output, e);
        return 1;
    }

    let passed = rows.iter().filter(|row| row.passed).count();
    println!("{}/{} tests passed, report written to {}", passed, rows.len(), output);
    0
}
