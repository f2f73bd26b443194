use std::io::{self, BufRead, Write};

pub const PROMPT: &str = "pvp> ";

/// Prints the prompt and reads one line. `None` on end of input.
pub fn readline(input: &mut impl BufRead, out: &mut impl Write) -> io::Result<Option<String>> {
    write!(out, "{PROMPT}")?;
    out.flush()?;

    let mut buffer = String::new();
    if input.read_line(&mut buffer)? == 0 {
        return Ok(None);
    }
    Ok(Some(buffer))
}
