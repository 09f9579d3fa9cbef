use std::path::PathBuf;

use clap::Parser;

/// nanoc - a single-pass compiler from a small C-like language to LLVM IR.
#[derive(Parser, Debug)]
#[command(name = "nanoc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Interleave `;` comments in the IR and print token/tree dumps to
    /// the error stream.
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Read input from FILE instead of standard input.
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Write output to FILE instead of standard output.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
}
