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


//! Checks every litmus test in a directory, using a pool of worker
//! threads, and writes a report recording which tests were accepted.
//! A test that fails to parse or build is recorded as a failure and
//! never stops the rest of the batch.

use std::fs;
use std::io::Write;
use std::path::Path;

use crossbeam::queue::SegQueue;
use crossbeam::thread;

use ptxlit_lib::config::Config;
use ptxlit_lib::log;

use crate::litmus::LitmusTest;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportRow {
    /// File name relative to the checked directory
    pub test: String,
    pub passed: bool,
}

/// The names of the files in `dir` which should appear in the
/// report, sorted by name.
pub fn litmus_files(dir: &Path, config: &Config) -> Result<Vec<String>, String> {
    let entries = fs::read_dir(dir).map_err(|e| format!("Could not read directory '{}': {}", dir.display(), e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| format!("Could not read directory '{}': {}", dir.display(), e))?;
        if !entry.path().is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) if config.has_litmus_extension(&name) => files.push(name),
            Ok(_) => (),
            Err(name) => log!(log::BATCH, &format!("Ignoring file with non UTF-8 name {:?}", name)),
        }
    }
    files.sort();
    Ok(files)
}

pub fn check_file(path: &Path, config: &Config) -> bool {
    match LitmusTest::from_file(&config.model, path, config.colors) {
        Ok(_) => true,
        Err(msg) => {
            log!(log::BATCH, &format!("{} failed:\n{}", path.display(), msg));
            false
        }
    }
}

pub fn check_directory(dir: &Path, config: &Config, num_threads: usize) -> Result<Vec<ReportRow>, String> {
    let files = litmus_files(dir, config)?;
    log!(log::BATCH, &format!("Checking {} files in {} with {} threads", files.len(), dir.display(), num_threads));

    let queue = SegQueue::new();
    for task in files.iter().enumerate() {
        queue.push(task)
    }
    let results = SegQueue::new();

    thread::scope(|scope| {
        for tid in 0..usize::max(num_threads, 1) {
            let queue = &queue;
            let results = &results;
            scope.spawn(move |_| {
                while let Some((i, file)) = queue.pop() {
                    let passed = if config.is_skipped(file) {
                        log!(log::BATCH, &format!("[{}] {} skipped", tid, file));
                        true
                    } else {
                        let passed = check_file(&dir.join(file), config);
                        log!(log::BATCH, &format!("[{}] {} {}", tid, file, if passed { "ok" } else { "failed" }));
                        passed
                    };
                    results.push((i, ReportRow { test: file.clone(), passed }))
                }
            });
        }
    })
    .map_err(|_| "A worker thread panicked while checking litmus tests".to_string())?;

    let mut rows = Vec::with_capacity(files.len());
    while let Some(row) = results.pop() {
        rows.push(row)
    }
    rows.sort_by_key(|(i, _)| *i);
    Ok(rows.into_iter().map(|(_, row)| row).collect())
}

/// Write one `{prefix}{file},{0|1}` line per row.
pub fn write_report<W: Write>(output: &mut W, prefix: &str, rows: &[ReportRow]) -> std::io::Result<()> {
    for row in rows {
        writeln!(output, "{}{},{}", prefix, row.test, row.passed as u8)?
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const GOOD: &str = "PTX good\n{ x = 0; }\n P0@cta 0,gpu 0 ;\n st.release.gpu [x] = 1 ;\nexists (x == 1)\n";
    const BAD: &str = "PTX bad\n{ x = 0; }\n P0@cta 0,gpu 0 ;\n st.acquire.gpu [x] = 1 ;\n";

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ptxlit-batch-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_check_directory() {
        let dir = scratch_dir("check");
        fs::write(dir.join("good.litmus"), GOOD).unwrap();
        fs::write(dir.join("bad.litmus"), BAD).unwrap();
        fs::write(dir.join("_wip.litmus"), "not a litmus test").unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();
        fs::create_dir_all(dir.join("nested.litmus")).unwrap();

        let config = Config::default();
        let rows = check_directory(&dir, &config, 2).unwrap();
        assert_eq!(
            rows,
            vec![
                ReportRow { test: "_wip.litmus".to_string(), passed: true },
                ReportRow { test: "bad.litmus".to_string(), passed: false },
                ReportRow { test: "good.litmus".to_string(), passed: true },
            ]
        );

        let mut report = Vec::new();
        write_report(&mut report, &config.report_prefix, &rows).unwrap();
        assert_eq!(
            String::from_utf8(report).unwrap(),
            "litmus/PTX/_wip.litmus,1\nlitmus/PTX/bad.litmus,0\nlitmus/PTX/good.litmus,1\n"
        );
        fs::remove_dir_all(&dir).unwrap()
    }

    #[test]
    fn test_single_thread_and_no_skipping() {
        let dir = scratch_dir("noskip");
        fs::write(dir.join("_wip.litmus"), "not a litmus test").unwrap();
        fs::write(dir.join("good.litmus"), GOOD).unwrap();

        let config = Config { skip_prefix: String::new(), ..Config::default() };
        let rows = check_directory(&dir, &config, 0).unwrap();
        let passed: Vec<bool> = rows.iter().map(|row| row.passed).collect();
        assert_eq!(passed, vec![false, true]);
        fs::remove_dir_all(&dir).unwrap()
    }

    #[test]
    fn test_missing_directory() {
        let dir = std::env::temp_dir().join("ptxlit-batch-this-directory-does-not-exist");
        assert!(check_directory(&dir, &Config::default(), 1).is_err())
    }
}
