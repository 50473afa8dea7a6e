use std::io::{self, Write};

use colored::Colorize;

/// A high-impact package changed: tell the caller to run the whole suite.
pub fn print_run_all_notice<W: Write>(writer: &mut W) -> io::Result<()> {
    writeln!(
        writer,
        "{} A run-all-tests package changed. Run the full test suite.",
        "●".yellow().bold()
    )?;
    writer.flush()?;
    Ok(())
}

/// Nothing in the change set reaches a test file.
pub fn print_no_affected_message<W: Write>(writer: &mut W) -> io::Result<()> {
    writeln!(writer, "{} No test files affected by this change.", "✓".green().bold())?;
    writer.flush()?;
    Ok(())
}

/// The affected test files, one per line so a test runner can consume the
/// output directly.
pub fn print_affected_tests<W: Write>(writer: &mut W, tests: &[String]) -> io::Result<()> {
    writeln!(
        writer,
        "{} {} affected test {}:",
        "●".bright_blue(),
        tests.len().to_string().cyan(),
        if tests.len() == 1 { "file" } else { "files" }
    )?;
    for test in tests {
        writeln!(writer, "{}", test)?;
    }
    writer.flush()?;
    Ok(())
}
