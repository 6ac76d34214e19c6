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


//! Boolean expressions over registers and constants, and the named
//! commands the assertions of a litmus test turn into.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Exp {
    NamedValue(String),
    Integer(i64),
    Equal(Box<Exp>, Box<Exp>),
    Not(Box<Exp>),
    And(Box<Exp>, Box<Exp>),
    Or(Box<Exp>, Box<Exp>),
}

pub fn register<S: Into<String>>(name: S) -> Exp {
    Exp::NamedValue(name.into())
}

pub fn constant(n: i64) -> Exp {
    Exp::Integer(n)
}

pub fn equal(lhs: Exp, rhs: Exp) -> Exp {
    Exp::Equal(Box::new(lhs), Box::new(rhs))
}

pub fn not_equal(lhs: Exp, rhs: Exp) -> Exp {
    not(equal(lhs, rhs))
}

pub fn and(lhs: Exp, rhs: Exp) -> Exp {
    Exp::And(Box::new(lhs), Box::new(rhs))
}

pub fn or(lhs: Exp, rhs: Exp) -> Exp {
    Exp::Or(Box::new(lhs), Box::new(rhs))
}

pub fn not(exp: Exp) -> Exp {
    Exp::Not(Box::new(exp))
}

impl fmt::Display for Exp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Exp::*;
        match self {
            NamedValue(name) => write!(f, "{}", name),
            Integer(n) => write!(f, "{}", n),
            Equal(lhs, rhs) => write!(f, "{} == {}", lhs, rhs),
            Not(exp) => write!(f, "~({})", exp),
            And(lhs, rhs) => write!(f, "({} /\\ {})", lhs, rhs),
            Or(lhs, rhs) => write!(f, "({} \\/ {})", lhs, rhs),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CommandKind {
    Exist,
    Forbid,
    Forall,
}

impl CommandKind {
    pub fn prefix(self) -> &'static str {
        match self {
            CommandKind::Exist => "exist",
            CommandKind::Forbid => "forbid",
            CommandKind::Forall => "forall",
        }
    }

    /// Every form of assertion is normalized into the same shape. An
    /// `exist` must be satisfiable, whereas `forbid` and `forall`
    /// must not admit a counter-example: the expression we store for
    /// them is the one that must never hold.
    pub fn command(self, name: String, exp: Exp, line: u32) -> Command {
        match self {
            CommandKind::Exist => Command { name, exp, expected: true, line },
            CommandKind::Forbid => Command { name, exp: not(exp), expected: false, line },
            CommandKind::Forall => Command { name, exp, expected: false, line },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub exp: Exp,
    pub expected: bool,
    pub line: u32,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {} (expected {})", self.name, self.exp, self.expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_equal_is_sugar() {
        assert_eq!(not_equal(register("r0"), constant(1)), not(equal(register("r0"), constant(1))))
    }

    #[test]
    fn test_command_polarity() {
        let exp = equal(register("r1"), constant(0));

        let exist = CommandKind::Exist.command("exist0".to_string(), exp.clone(), 7);
        assert_eq!(exist.exp, exp);
        assert!(exist.expected);

        let forbid = CommandKind::Forbid.command("forbid1".to_string(), exp.clone(), 8);
        assert_eq!(forbid.exp, not(exp.clone()));
        assert!(!forbid.expected);

        let forall = CommandKind::Forall.command("forall2".to_string(), exp.clone(), 9);
        assert_eq!(forall.exp, exp);
        assert!(!forall.expected);
        assert_eq!(forall.line, 9)
    }

    #[test]
    fn test_display() {
        let exp = or(and(equal(register("r0"), constant(1)), not_equal(register("r1"), constant(-2))), register("x"));
        assert_eq!(exp.to_string(), "((r0 == 1 /\\ ~(r1 == -2)) \\/ x)");
        let cmd = CommandKind::Forbid.command("forbid0".to_string(), equal(register("x"), constant(1)), 3);
        assert_eq!(cmd.to_string(), "forbid0: ~(x == 1) (expected false)")
    }
}
