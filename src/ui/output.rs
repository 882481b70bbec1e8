use colored::*;
use std::io::{self, Write};

/// Print one reply chunk for the console platform.
pub fn display_reply(channel_id: &str, chunk: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    // Avoid double newline if the chunk already ends with one
    let sep = if chunk.ends_with('\n') { "" } else { "\n" };
    write!(stdout, "{} {}{}", format!("[{}]", channel_id).cyan(), chunk, sep)?;
    stdout.flush()
}

pub fn display_typing(channel_id: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", format!("[{}] bot is typing...", channel_id).dimmed())?;
    stdout.flush()
}
