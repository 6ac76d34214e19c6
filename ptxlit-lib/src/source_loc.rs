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


//! Source locations for litmus files, and the caret-style error
//! messages printed for them.

use std::cmp;

pub static RED: &str = "\x1b[0;31m";
pub static GREEN: &str = "\x1b[0;32m";
pub static BLUE: &str = "\x1b[0;34m";
pub static NO_COLOR: &str = "\x1b[0m";

/// A region of a source buffer. Lines are 1-based, characters are
/// 0-based counts of chars from the start of the line, and `char2`
/// is exclusive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceLoc {
    line1: u32,
    char1: u32,
    line2: u32,
    char2: u32,
}

fn line_and_char(buf: &str, offset: usize) -> (u32, u32) {
    let mut offset = cmp::min(offset, buf.len());
    while !buf.is_char_boundary(offset) {
        offset -= 1
    }
    let before = &buf[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|n| n + 1).unwrap_or(0);
    (line as u32, before[line_start..].chars().count() as u32)
}

/// The text of a span with each of its lines trimmed and joined by a
/// single space, so a multi-line span reads as one line in an error
/// message.
pub fn span_text(buf: &str, start: usize, end: usize) -> String {
    let text = buf.get(start..end).unwrap_or("");
    text.split('\n').map(str::trim).collect::<Vec<_>>().join(" ")
}

impl SourceLoc {
    pub fn new(line1: u32, char1: u32, line2: u32, char2: u32) -> Self {
        SourceLoc { line1, char1, line2, char2 }
    }

    /// Compute the location of the byte range `start..end` within `buf`.
    pub fn from_offsets(buf: &str, start: usize, end: usize) -> Self {
        let (line1, char1) = line_and_char(buf, start);
        let (line2, char2) = line_and_char(buf, end);
        SourceLoc { line1, char1, line2, char2 }
    }

    pub fn line(self) -> u32 {
        self.line1
    }

    /// The 1-based column at which the location starts.
    pub fn column(self) -> u32 {
        self.char1 + 1
    }

    fn canonicalize(self) -> Self {
        if self.line1 > self.line2 {
            SourceLoc { line1: self.line2, line2: self.line1, ..self }
        } else if self.line1 == self.line2 && self.char1 > self.char2 {
            SourceLoc { char1: self.char2, char2: self.char1, ..self }
        } else {
            self
        }
    }

    fn one_line_message(
        self,
        buf: &str,
        message: &str,
        file_info: &str,
        red: &str,
        blue: &str,
        no_color: &str,
    ) -> String {
        let line = buf.lines().nth((self.line1 - 1) as usize).unwrap_or("");

        let line_number = self.line1.to_string();
        let number_column_width = line_number.len();

        let file_info = format!("{:width$}{}", "", file_info, width = number_column_width);
        let extra_padding = format!("{:width$} {}|{}", "", blue, no_color, width = number_column_width);

        let line_display =
            format!("{}{:>width$} |{} {}", blue, line_number, no_color, line, width = number_column_width);
        let line_marker = {
            let dashes = "-".repeat(self.char2.saturating_sub(self.char1 + 2) as usize);
            let highlight = if self.char1 + 1 < self.char2 { format!("^{}^", dashes) } else { "^".to_string() };
            format!(
                "{:width$} {}|{} {:gap$}{}{}{}",
                "",
                blue,
                no_color,
                "",
                red,
                highlight,
                no_color,
                width = number_column_width,
                gap = (self.char1 as usize)
            )
        };

        format!("{}{}\n{}\n{}\n{}", message, file_info, extra_padding, line_display, line_marker)
    }

    fn two_line_message(
        self,
        buf: &str,
        message: &str,
        file_info: &str,
        red: &str,
        blue: &str,
        no_color: &str,
    ) -> String {
        let line1 = buf.lines().nth((self.line1 - 1) as usize).unwrap_or("");
        let line2 = buf.lines().nth((self.line2 - 1) as usize).unwrap_or("");

        let line1_number = self.line1.to_string();
        let line2_number = self.line2.to_string();
        let number_column_width = cmp::max(line1_number.len(), line2_number.len());

        let file_info = format!("{:width$}{}", "", file_info, width = number_column_width);
        let extra_padding = format!("{:width$} {}|{}", "", blue, no_color, width = number_column_width);

        let line1_display =
            format!("{}{:>width$} |{} {}", blue, line1_number, no_color, line1, width = number_column_width);
        let line1_marker = {
            let line1_len = line1.chars().count();
            let dashes = if self.char1 as usize >= line1_len {
                "".to_string()
            } else {
                "-".repeat(line1_len - (self.char1 as usize + 1))
            };
            format!(
                "{:width$} {}|{} {:gap$}{}^{}{}",
                "",
                blue,
                no_color,
                "",
                red,
                dashes,
                no_color,
                width = number_column_width,
                gap = (self.char1 as usize)
            )
        };

        let inbetween_marker =
            if self.line1 + 1 < self.line2 { format!("{}...{}\n", blue, no_color) } else { "".to_string() };

        let line2_display =
            format!("{}{:>width$} |{} {}", blue, line2_number, no_color, line2, width = number_column_width);
        let line2_marker = {
            let dashes = if self.char2 <= 1 { "".to_string() } else { "-".repeat(self.char2 as usize - 1) };
            format!("{:width$} {}|{} {}{}^{}", "", blue, no_color, red, dashes, no_color, width = number_column_width)
        };

        format!(
            "{}{}\n{}\n{}\n{}\n{}{}\n{}",
            message,
            file_info,
            extra_padding,
            line1_display,
            line1_marker,
            inbetween_marker,
            line2_display,
            line2_marker,
        )
    }

    fn message_str(self, buf: &str, message: &str, file_info: &str, red: &str, blue: &str, no_color: &str) -> String {
        if self.line1 == self.line2 {
            self.canonicalize().one_line_message(buf, message, file_info, red, blue, no_color)
        } else {
            self.canonicalize().two_line_message(buf, message, file_info, red, blue, no_color)
        }
    }

    pub fn location_string(self) -> String {
        format!("{}:{} - {}:{}", self.line1, self.char1, self.line2, self.char2)
    }

    /// Print a message pointing at this location in `buf`, which was
    /// read from a file called `buf_name`.
    pub fn message_file_contents(
        self,
        buf_name: &str,
        buf: &str,
        message: &str,
        is_error: bool,
        use_colors: bool,
    ) -> String {
        let red = if use_colors && is_error {
            RED
        } else if use_colors {
            GREEN
        } else {
            ""
        };
        let blue = if use_colors { BLUE } else { "" };
        let no_color = if use_colors { NO_COLOR } else { "" };

        let file_info = format!("{}-->{} {}:{}:{}", blue, no_color, buf_name, self.line1, self.column());

        let label = if is_error { "error" } else { "note" };
        self.message_str(buf, &format!("{}{}{}: {}\n", red, label, no_color, message), &file_info, red, blue, no_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_offsets() {
        let buf = "PTX MP\n{ x = 0; }\n P0@cta 0,gpu 0 ;";
        let loc = SourceLoc::from_offsets(buf, 19, 21);
        assert_eq!(loc, SourceLoc::new(3, 1, 3, 3));
        assert_eq!(loc.line(), 3);
        assert_eq!(loc.column(), 2);
        assert_eq!(SourceLoc::from_offsets(buf, 0, 3).column(), 1)
    }

    #[test]
    fn test_span_text() {
        let buf = "exists\n  (x == 1\n   /\\ y == 0)";
        assert_eq!(span_text(buf, 0, buf.len()), "exists (x == 1 /\\ y == 0)");
        assert_eq!(span_text(buf, 100, 200), "")
    }

    #[test]
    fn test_one_line_message() {
        let buf = "PTX MP\n st.weak.cta [x] = 1 ;";
        let loc = SourceLoc::from_offsets(buf, 8, 27);
        let msg = loc.message_file_contents("mp.litmus", buf, "illegal encoding", true, false);
        assert_eq!(
            msg,
            "error: illegal encoding\n --> mp.litmus:2:2\n  |\n2 |  st.weak.cta [x] = 1 ;\n  |  ^-----------------^"
        )
    }
}
