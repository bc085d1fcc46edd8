// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! Parser for the ASCII AIGER (`.aag`) format.
//!
//! Accepts the 1.9 header `aag M I L O A [B [C]]`; the symbol table and
//! comment section are skipped. Latch resets default to zero. And-gates are
//! re-sorted topologically after reading, since the ASCII format (unlike the
//! binary one) does not promise definition-before-use order.

use crate::circuit::{raw_var, AndGate, Aig, Latch, RawLit};
use codespan_reporting::diagnostic::{Diagnostic, Label};
use peg::{error::ParseError, str::LineCol};
use thiserror::Error;

/// Ways reading an `.aag` file can fail.
#[derive(Error, Debug)]
pub enum AagError {
    /// The text does not match the grammar.
    #[error("syntax error: {0}")]
    Syntax(#[from] ParseError<LineCol>),
    /// The header counts disagree with the body.
    #[error("expected {expected} definition lines, found {found}")]
    WrongLineCount {
        /// Lines promised by the header.
        expected: usize,
        /// Lines present in the body.
        found: usize,
    },
    /// A definition line has the wrong number of fields.
    #[error("definition line {0} has the wrong number of fields")]
    WrongArity(usize),
    /// An input or latch literal is out of place.
    #[error("variable {0} out of order (expected {1})")]
    BadVariable(RawLit, RawLit),
    /// A literal references a variable above the header maximum.
    #[error("literal {0} exceeds the declared maximum variable")]
    LiteralRange(RawLit),
    /// A latch reset is neither 0 nor 1.
    #[error("unsupported latch reset value {0}")]
    LatchReset(RawLit),
    /// The and-gates contain a combinational cycle.
    #[error("combinational cycle through gate variable {0}")]
    CombinationalCycle(crate::cube::Var),
}

struct Header {
    m: u32,
    i: u32,
    l: u32,
    o: u32,
    a: u32,
    b: u32,
    c: u32,
}

peg::parser! {
    grammar aag() for str {
        rule num() -> u32
            = s:$(quiet!{['0'..='9']+} / expected!("number"))
            {? s.parse().or(Err("number")) }

        rule sp() = quiet!{[' ' | '\t']+} / expected!("space")
        rule eol() = quiet!{"\r"? "\n"} / expected!("newline")
        rule eof() = ![_]
        rule line_end() = eol() / eof()

        rule header() -> Header
            = "aag" sp() m:num() sp() i:num() sp() l:num() sp() o:num() sp() a:num()
              b:(sp() n:num() { n })? c:(sp() n:num() { n })? line_end()
            { Header { m, i, l, o, a, b: b.unwrap_or(0), c: c.unwrap_or(0) } }

        rule nums() -> Vec<u32>
            = first:num() rest:(sp() n:num() { n })* {
                let mut v = vec![first];
                v.extend(rest);
                v
            }

        rule body_line() -> Vec<u32> = v:nums() line_end() { v }

        // symbol table and comments: anything after the numeric body
        rule trailer() = [_]*

        pub rule file() -> (Header, Vec<Vec<u32>>)
            = h:header() lines:(body_line()*) trailer() eof() { (h, lines) }
    }
}

/// Parse `.aag` text into an [`Aig`].
pub fn parse(source: &str) -> Result<Aig, AagError> {
    let (header, lines) = aag::file(source)?;
    build(header, lines)
}

fn build(header: Header, lines: Vec<Vec<u32>>) -> Result<Aig, AagError> {
    let counts =
        (header.i + header.l + header.o + header.a + header.b + header.c) as usize;
    if lines.len() != counts {
        return Err(AagError::WrongLineCount {
            expected: counts,
            found: lines.len(),
        });
    }
    let max_lit = 2 * header.m + 1;
    let check_lit = |lit: RawLit| {
        if lit > max_lit {
            Err(AagError::LiteralRange(lit))
        } else {
            Ok(lit)
        }
    };

    let mut aig = Aig::new(header.i as usize);
    aig.max_var = header.m as i32;
    let mut lines = lines.into_iter().enumerate();
    let mut take = |arity_min: usize, arity_max: usize| -> Result<Vec<u32>, AagError> {
        let (idx, line) = lines.next().expect("line count checked above");
        if line.len() < arity_min || line.len() > arity_max {
            return Err(AagError::WrongArity(idx + 2));
        }
        Ok(line)
    };

    for k in 0..header.i {
        let line = take(1, 1)?;
        let expected = 2 * (k + 1);
        if line[0] != expected {
            return Err(AagError::BadVariable(line[0], expected));
        }
    }
    for k in 0..header.l {
        let line = take(2, 3)?;
        let expected = 2 * (header.i + k + 1);
        if line[0] != expected {
            return Err(AagError::BadVariable(line[0], expected));
        }
        let reset = match line.get(2).copied().unwrap_or(0) {
            0 => false,
            1 => true,
            other => return Err(AagError::LatchReset(other)),
        };
        aig.latches.push(Latch {
            var: raw_var(line[0]),
            next: check_lit(line[1])?,
            reset,
        });
    }
    for _ in 0..header.o {
        let line = take(1, 1)?;
        aig.outputs.push(check_lit(line[0])?);
    }
    for _ in 0..header.b {
        let line = take(1, 1)?;
        aig.bads.push(check_lit(line[0])?);
    }
    for _ in 0..header.c {
        let line = take(1, 1)?;
        aig.constraints.push(check_lit(line[0])?);
    }
    for _ in 0..header.a {
        let line = take(3, 3)?;
        let lhs = check_lit(line[0])?;
        if lhs % 2 != 0 || raw_var(lhs) <= (header.i + header.l) as i32 {
            return Err(AagError::BadVariable(lhs, lhs | 1));
        }
        aig.ands.push(AndGate {
            lhs: raw_var(lhs),
            rhs0: check_lit(line[1])?,
            rhs1: check_lit(line[2])?,
        });
    }

    topo_sort_gates(&mut aig)?;
    Ok(aig)
}

/// Reorder and-gates so every gate appears after the gates it reads.
fn topo_sort_gates(aig: &mut Aig) -> Result<(), AagError> {
    use std::collections::HashMap;
    let by_var: HashMap<i32, AndGate> = aig.ands.iter().map(|g| (g.lhs, *g)).collect();
    let mut order = Vec::with_capacity(aig.ands.len());
    // 0 = unvisited, 1 = on stack, 2 = done
    let mut mark: HashMap<i32, u8> = HashMap::new();
    let mut stack: Vec<(i32, bool)> = Vec::new();
    for gate in &aig.ands {
        stack.push((gate.lhs, false));
        while let Some((v, expanded)) = stack.pop() {
            let state = mark.get(&v).copied().unwrap_or(0);
            if expanded {
                mark.insert(v, 2);
                order.push(by_var[&v]);
                continue;
            }
            match state {
                2 => continue,
                1 => return Err(AagError::CombinationalCycle(v)),
                _ => {}
            }
            mark.insert(v, 1);
            stack.push((v, true));
            let gate = by_var[&v];
            for rhs in [gate.rhs0, gate.rhs1] {
                let rv = raw_var(rhs);
                if by_var.contains_key(&rv) {
                    match mark.get(&rv).copied().unwrap_or(0) {
                        0 => stack.push((rv, false)),
                        1 => return Err(AagError::CombinationalCycle(rv)),
                        _ => {}
                    }
                }
            }
        }
    }
    aig.ands = order;
    Ok(())
}

/// Render an [`AagError`] as a diagnostic, with a source span for syntax
/// errors.
pub fn parse_error_diagnostic<FileId>(file_id: FileId, e: &AagError) -> Diagnostic<FileId> {
    match e {
        AagError::Syntax(err) => {
            let offset = err.location.offset;
            Diagnostic::error()
                .with_message("could not parse aag file")
                .with_labels(vec![Label::primary(file_id, offset..offset + 1)
                    .with_message(format!("expected {}", err.expected))])
        }
        other => Diagnostic::error().with_message(format!("{other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHIFT_OR: &str = "\
aag 5 1 2 0 2 1
2
4 6
6 9
10
8 5 3
10 4 6
i0 in
c
L1' = L2, L2' = L1 | in, bad = L1 & L2
";

    #[test]
    fn parses_the_shift_or_circuit() {
        let aig = parse(SHIFT_OR).unwrap();
        assert_eq!(aig.num_inputs, 1);
        assert_eq!(aig.num_latches(), 2);
        assert_eq!(aig.bads, vec![10]);
        assert_eq!(aig.latches[0].next, 6);
        assert_eq!(aig.latches[1].next, 9);
        // gate 4 feeds gate 5's input, so it must come first after sorting
        assert_eq!(aig.ands[0].lhs, 4);
    }

    #[test]
    fn reorders_gates_listed_out_of_order() {
        let source = "\
aag 5 1 2 0 2 1
2
4 6
6 9
10
10 4 6
8 5 3
";
        let aig = parse(source).unwrap();
        assert_eq!(aig.ands[0].lhs, 4);
        assert_eq!(aig.ands[1].lhs, 5);
    }

    #[test]
    fn rejects_mismatched_counts() {
        let source = "aag 1 1 0 0 0\n";
        assert!(matches!(
            parse(source),
            Err(AagError::WrongLineCount { expected: 1, .. })
        ));
    }

    #[test]
    fn rejects_bad_resets() {
        let source = "aag 1 0 1 0 0\n2 2 2\n";
        assert!(matches!(parse(source), Err(AagError::LatchReset(2))));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(parse("not an aag\n"), Err(AagError::Syntax(_))));
    }

    #[test]
    fn rejects_combinational_cycles() {
        let source = "\
aag 3 0 1 0 2
2 2
4 6 2
6 4 2
";
        assert!(matches!(
            parse(source),
            Err(AagError::CombinationalCycle(_))
        ));
    }
}
