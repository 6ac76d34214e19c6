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


//! This module loads a TOML file containing the configuration used by
//! the ptxlit tools when checking a directory of litmus tests.

use serde::Deserialize;
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

use crate::log;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The target memory model each parsed test is tagged with
    pub model: String,
    /// Prepended to each file name in the report
    pub report_prefix: String,
    /// Files starting with this prefix are recorded as passing without
    /// being parsed. An empty prefix disables skipping.
    pub skip_prefix: String,
    /// Only files with this extension are checked. An empty extension
    /// checks every file.
    pub extension: String,
    pub colors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            model: "ptx".to_string(),
            report_prefix: "litmus/PTX/".to_string(),
            skip_prefix: "_".to_string(),
            extension: "litmus".to_string(),
            colors: true,
        }
    }
}

impl Config {
    pub fn parse(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| format!("Error when parsing config: {}", e))
    }

    pub fn from_file<P>(path: P) -> Result<Self, String>
    where
        P: AsRef<Path>,
    {
        let mut contents = String::new();
        match File::open(&path) {
            Ok(mut handle) => match handle.read_to_string(&mut contents) {
                Ok(_) => (),
                Err(e) => return Err(format!("Unexpected failure while reading config: {}", e)),
            },
            Err(e) => return Err(format!("Error when loading config '{}': {}", path.as_ref().display(), e)),
        };
        let config = Self::parse(&contents)?;
        log!(log::VERBOSE, &format!("Loaded config from {}: {:?}", path.as_ref().display(), config));
        Ok(config)
    }

    pub fn is_skipped(&self, file_name: &str) -> bool {
        !self.skip_prefix.is_empty() && file_name.starts_with(&self.skip_prefix)
    }

    pub fn has_litmus_extension(&self, file_name: &str) -> bool {
        self.extension.is_empty()
            || Path::new(file_name).extension().and_then(|ext| ext.to_str()) == Some(self.extension.as_str())
    }
}
