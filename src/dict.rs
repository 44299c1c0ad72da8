//! Dictionary text parsing: one pattern per line.
//!
//! Lines end with LF or CRLF; a trailing CR is stripped and empty lines are
//! skipped. The bytes are otherwise uninterpreted (non-UTF-8 dictionaries
//! are fine).

use std::fs::File;
use std::path::Path;

use memchr::memchr_iter;
use memmap2::Mmap;

use crate::compiler::{CompileOptions, Compiler};
use crate::error::CompileError;
use crate::stats::CompileStats;

/// Compiles every pattern line in `dictionary` to a store at `artifact`.
pub fn compile_dictionary<P: AsRef<Path>>(
    artifact: P,
    dictionary: &[u8],
    options: CompileOptions,
) -> Result<CompileStats, CompileError> {
    let mut compiler = Compiler::create(artifact, options)?;
    add_lines(&mut compiler, dictionary)?;
    compiler.finish()
}

/// Maps a dictionary file read-only and compiles it to `artifact`.
pub fn compile_dictionary_file<P: AsRef<Path>, Q: AsRef<Path>>(
    artifact: P,
    dictionary_path: Q,
    options: CompileOptions,
) -> Result<CompileStats, CompileError> {
    let file = File::open(dictionary_path)?;
    if file.metadata()?.len() == 0 {
        // Zero-length files cannot be mapped; an empty dictionary still
        // produces a valid (empty) store.
        return compile_dictionary(artifact, &[], options);
    }
    // SAFETY: read-only mapping; the dictionary is not expected to change
    // during compilation.
    let map = unsafe { Mmap::map(&file)? };
    compile_dictionary(artifact, &map, options)
}

fn add_lines(compiler: &mut Compiler, dictionary: &[u8]) -> Result<(), CompileError> {
    let mut start = 0usize;
    for newline in memchr_iter(b'\n', dictionary) {
        add_line(compiler, &dictionary[start..newline])?;
        start = newline + 1;
    }
    add_line(compiler, &dictionary[start..])
}

fn add_line(compiler: &mut Compiler, mut line: &[u8]) -> Result<(), CompileError> {
    if let [head @ .., b'\r'] = line {
        line = head;
    }
    if line.is_empty() {
        return Ok(());
    }
    compiler.add(line)
}
