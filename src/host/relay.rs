//! Forwards a captured result to the caller's streams

use std::io::{self, Write};

use super::InvocationResult;

/// Write captured stdout, then captured stderr, and hand back the exit code.
///
/// Text is written exactly as captured; nothing is appended or trimmed.
pub fn relay<O, E>(result: &InvocationResult, out: &mut O, err: &mut E) -> io::Result<i32>
where
    O: Write,
    E: Write,
{
    out.write_all(result.stdout.as_bytes())?;
    out.flush()?;
    err.write_all(result.stderr.as_bytes())?;
    err.flush()?;
    Ok(result.exit_code)
}
