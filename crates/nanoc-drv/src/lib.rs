//! nanoc-drv — wires the three compilation stages together behind a
//! small CLI, the way a driver crate does: read the source, run lex →
//! parse → emit in sequence, and surface the first failure as a fatal,
//! user-facing diagnostic. There is no intermediate caching between
//! stages and no shared mutable state — each stage consumes the
//! previous one's output and hands off a fresh value.

mod cli;
mod error;

pub use cli::Cli;
pub use error::DriverError;

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Run the compiler end to end with the given CLI options.
///
/// `compile` carries the precise, typed failure taxonomy; `run` is the
/// thin `anyhow` boundary `main` actually calls, matching every other
/// caller's error at the process edge rather than the library's.
pub fn run(cli: &Cli) -> anyhow::Result<()> {
    compile(cli).map_err(anyhow::Error::from)
}

fn compile(cli: &Cli) -> Result<(), DriverError> {
    let source = read_source(cli.input.as_deref()).map_err(DriverError::Read)?;

    tracing::debug!(bytes = source.len(), "read input");

    let tokens = nanoc_lex::tokenize(&source)?;
    if cli.debug {
        eprint!("{}", nanoc_lex::dump(&tokens, &source));
    }
    tracing::debug!(tokens = tokens.len(), "lexed input");

    let tree = nanoc_par::parse(&tokens, &source)?;
    if cli.debug {
        eprint!("{}", nanoc_par::dump(&tree));
    }
    tracing::debug!(functions = tree.children.len(), "parsed input");

    let mut output = open_output(cli.output.as_deref()).map_err(DriverError::Write)?;
    nanoc_gen::emit(&tree, &source, cli.debug, &mut output)?;
    output.flush().map_err(DriverError::Write)?;
    tracing::debug!("emitted IR");

    Ok(())
}

/// Initialize `tracing` with a verbosity matching `-d`, writing to
/// standard error — standard out is reserved for the emitted IR.
pub fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "warn" }));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn read_source(path: Option<&Path>) -> io::Result<String> {
    let mut buf = String::new();
    match path {
        Some(path) => {
            File::open(path)?.read_to_string(&mut buf)?;
        }
        None => {
            io::stdin().lock().read_to_string(&mut buf)?;
        }
    }
    Ok(buf)
}

fn open_output(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    match path {
        Some(path) => Ok(Box::new(File::create(path)?)),
        None => Ok(Box::new(io::stdout())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_a_minimal_program_to_stdout_shaped_buffer() {
        let src = "fun main() { return 0; }";
        let tokens = nanoc_lex::tokenize(src).unwrap();
        let tree = nanoc_par::parse(&tokens, src).unwrap();
        let mut out = Vec::new();
        nanoc_gen::emit(&tree, src, false, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with(nanoc_gen::PREAMBLE));
    }

    #[test]
    fn read_source_rejects_missing_file() {
        let err = read_source(Some(Path::new("/nonexistent/path/to/nanoc-input")));
        assert!(err.is_err());
    }
}
