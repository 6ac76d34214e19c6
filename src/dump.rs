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


use std::io;
use std::process;

use ptxlit_litmus::format::write_litmus;
use ptxlit_litmus::litmus::LitmusTest;

mod opts;
use opts::CommonOpts;

fn main() {
    let code = ptxlit_main();
    process::exit(code)
}

fn ptxlit_main() -> i32 {
    let mut opts = opts::common_opts();
    opts.optopt("l", "litmus", "load this litmus file", "FILE");

    let (matches, CommonOpts { config, .. }) = opts::parse(&opts);

    let file = match matches.opt_str("litmus").or_else(|| matches.free.first().cloned()) {
        Some(file) => file,
        None => {
            eprintln!("Please provide a litmus file");
            opts::print_usage(&opts, 1)
        }
    };

    let litmus = match LitmusTest::from_file(&config.model, &file, config.colors) {
        Ok(litmus) => litmus,
        Err(msg) => {
            eprintln!("{}", msg);
            return 1;
        }
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match write_litmus(&mut handle, &litmus) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Failed to print litmus test: {}", e);
            1
        }
    }
}
