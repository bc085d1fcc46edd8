// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The bicar binary's command-line interface.

use std::{fs, process};

use aig::parser::{parse, parse_error_diagnostic};
use aig::TransitionSystem;
use car::heuristics::HintOptions;
use car::{Checker, Direction, Options, Outcome, PickStrategy, Trace};
use codespan_reporting::{
    files::SimpleFile,
    term::{
        self as terminal,
        termcolor::{ColorChoice, StandardStream},
    },
};
use solver::CadicalSolver;

#[derive(clap::ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum DirectionArg {
    Forward,
    Backward,
}

#[derive(clap::ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum PickArg {
    RecentFirst,
    OldestFirst,
}

#[derive(clap::ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum ColorOutput {
    Never,
    Auto,
    Always,
}

#[derive(clap::Args, Clone, Debug, PartialEq, Eq)]
struct SearchArgs {
    #[arg(value_enum, long, default_value_t = DirectionArg::Backward)]
    /// Direction of the first round
    direction: DirectionArg,

    #[arg(long)]
    /// Run a single direction instead of the bidirectional exchange
    no_bidirectional: bool,

    #[arg(long)]
    /// Keep discovered states full instead of generalizing them
    no_partial: bool,

    #[arg(long, default_value_t = 1)]
    /// How many recent frame cubes to use as assumption hints (0 disables)
    intersections: usize,

    #[arg(long)]
    /// Disable the rotating assumption hint
    no_rotation: bool,

    #[arg(value_enum, long, default_value_t = PickArg::RecentFirst)]
    /// Proof-obligation selection order
    pick: PickArg,

    #[arg(long)]
    /// Give up (inconclusively) after this many rounds
    max_rounds: Option<usize>,

    #[arg(long)]
    /// Give up (inconclusively) after this many solver queries
    max_queries: Option<usize>,
}

impl SearchArgs {
    fn to_options(&self) -> Options {
        Options {
            direction: match self.direction {
                DirectionArg::Forward => Direction::Forward,
                DirectionArg::Backward => Direction::Backward,
            },
            bidirectional: !self.no_bidirectional,
            partial_states: !self.no_partial,
            hints: HintOptions {
                intersections: self.intersections,
                rotation: !self.no_rotation,
            },
            pick: match self.pick {
                PickArg::RecentFirst => PickStrategy::RecentFirst,
                PickArg::OldestFirst => PickStrategy::OldestFirst,
            },
            max_rounds: self.max_rounds,
            max_queries: self.max_queries,
        }
    }
}

#[derive(clap::Parser, Debug)]
#[command(about, long_about = None)]
/// Decide a safety property of an AIGER circuit with bidirectional CAR.
pub struct App {
    #[arg(value_enum, long, default_value_t = ColorOutput::Auto)]
    /// Control color output. Auto disables colors with TERM=dumb or
    /// NO_COLOR=true.
    color: ColorOutput,

    #[arg(long, default_value_t = 0)]
    /// Index of the bad (or output) literal to check
    property: usize,

    #[command(flatten)]
    search: SearchArgs,

    #[arg(long)]
    /// Print the counterexample stimulus in the AIGER witness format
    witness: bool,

    #[arg(long)]
    /// Print the certificate cubes on a safe verdict
    certificate: bool,

    #[arg(long)]
    /// Emit the outcome as JSON instead of the witness format
    json: bool,

    /// File name for an .aag file
    file: String,
}

fn bools_line(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

fn print_witness(trace: &Trace) {
    println!("{}", bools_line(&trace.initial));
    for inputs in &trace.inputs {
        println!("{}", bools_line(inputs));
    }
}

impl App {
    /// Run the application.
    pub fn exec(self) {
        let source = fs::read_to_string(&self.file).expect("could not read input file");
        let files = SimpleFile::new(self.file.as_str(), &source);

        let writer = StandardStream::stderr(match &self.color {
            ColorOutput::Never => ColorChoice::Never,
            ColorOutput::Always => ColorChoice::Always,
            ColorOutput::Auto => ColorChoice::Auto,
        });
        let config = codespan_reporting::term::Config::default();

        let circuit = match parse(&source) {
            Ok(aig) => aig,
            Err(err) => {
                let diagnostic = parse_error_diagnostic((), &err);
                terminal::emit(&mut writer.lock(), &config, &files, &diagnostic).unwrap();
                process::exit(1);
            }
        };

        let sys = match TransitionSystem::new(&circuit, self.property) {
            Ok(sys) => sys,
            Err(err) => {
                eprintln!("{err}");
                process::exit(1);
            }
        };

        let mut checker: Checker<CadicalSolver> = Checker::new(&sys, self.search.to_options());
        let outcome = checker.check();
        log::info!("{} solver queries", checker.num_queries());

        if self.json {
            println!("{}", serde_json::to_string_pretty(&outcome).unwrap());
            return;
        }

        match &outcome {
            Outcome::Safe { certificate } => {
                println!("0");
                println!("b{}", self.property);
                if self.certificate {
                    match certificate {
                        Some(cert) => {
                            for (level, frame) in cert.frames.iter().enumerate() {
                                for cube in frame {
                                    println!("{level}: {cube:?}");
                                }
                            }
                        }
                        None => println!("(no certificate: the property holds vacuously)"),
                    }
                }
            }
            Outcome::Unsafe { trace } => {
                println!("1");
                println!("b{}", self.property);
                if self.witness {
                    print_witness(trace);
                }
            }
            Outcome::Unknown => {
                println!("2");
                println!("b{}", self.property);
            }
        }
        println!(".");
    }
}
