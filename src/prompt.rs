//! Line-oriented operator prompts.
//!
//! All prompts read from a generic `BufRead` and write to a generic `Write`
//! so tests can drive them with scripted transcripts. EOF on the input is
//! treated as the operator walking away: a clean cancel, never a panic.

use crate::config;
use crate::error::{Result, ShelfError};
use crate::volume::{self, Volume};
use std::io::{BufRead, Write};

/// Read one line, trimmed. `None` means EOF.
pub fn read_trimmed_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    let bytes = input.read_line(&mut line)?;
    if bytes == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// The single safety gate for destructive/expensive actions.
///
/// Prints the warning, then requires the exact affirmative token
/// (case-sensitive, whitespace-trimmed). Anything else (including EOF)
/// declines.
pub fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, warning: &str) -> Result<bool> {
    writeln!(output, "{warning}")?;
    write!(
        output,
        "Type {} to proceed (anything else cancels): ",
        config::AFFIRMATIVE_TOKEN
    )?;
    output.flush()?;

    match read_trimmed_line(input)? {
        Some(answer) => Ok(answer == config::AFFIRMATIVE_TOKEN),
        None => Ok(false),
    }
}

/// Interactive volume selection against a discovered set.
///
/// Re-prompts on no match with the error surfaced; never auto-selects.
/// EOF cancels cleanly.
pub fn select_volume<'a, R: BufRead, W: Write>(
    volumes: &'a [Volume],
    input: &mut R,
    output: &mut W,
) -> Result<&'a Volume> {
    writeln!(output, "Candidate volumes:")?;
    for v in volumes {
        writeln!(output, "  {v}")?;
    }

    loop {
        write!(output, "Target volume (mount path or label): ")?;
        output.flush()?;

        let Some(answer) = read_trimmed_line(input)? else {
            return Err(ShelfError::UserCancelled);
        };
        if answer.is_empty() {
            continue;
        }

        match volume::find_volume(volumes, &answer) {
            Some(v) => return Ok(v),
            None => writeln!(
                output,
                "{}. Try again.",
                ShelfError::selection_invalid(&answer)
            )?,
        }
    }
}
