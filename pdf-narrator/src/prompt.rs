//! Line-oriented prompting over any reader/writer pair.

use std::io::{self, BufRead, Write};

/// Reads answers from `input` and writes prompts and messages to `output`.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print one line of output.
    pub fn say(&mut self, message: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.output, "{}", message.as_ref())
    }

    /// Show `prompt` and read one trimmed line; `None` once input is exhausted.
    pub fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Ask a question that defaults to yes.
    ///
    /// Empty input, `y` and `yes` mean yes; `None` once input is exhausted.
    pub fn confirm(&mut self, question: &str) -> io::Result<Option<bool>> {
        let Some(answer) = self.ask(question)? else {
            return Ok(None);
        };
        let answer = answer.to_lowercase();
        Ok(Some(answer.is_empty() || answer == "y" || answer == "yes"))
    }

    /// Ask until the answer is a 1-based index into a list of `len` items.
    ///
    /// Returns the zero-based index, or `None` if input ends first.
    pub fn choose_index(&mut self, len: usize, prompt: &str) -> io::Result<Option<usize>> {
        loop {
            let Some(answer) = self.ask(prompt)? else {
                return Ok(None);
            };
            if let Some(index) = parse_one_based(&answer, len) {
                return Ok(Some(index));
            }
            self.say("Invalid selection. Please enter a number from the list.")?;
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}

/// Whether `answer` is a run of ASCII digits with no sign.
pub fn is_plain_number(answer: &str) -> bool {
    !answer.is_empty() && answer.bytes().all(|b| b.is_ascii_digit())
}

/// Parse a 1-based menu number into a zero-based index below `len`.
pub fn parse_one_based(answer: &str, len: usize) -> Option<usize> {
    if !is_plain_number(answer) {
        return None;
    }
    let number: usize = answer.parse().ok()?;
    (1..=len).contains(&number).then(|| number - 1)
}
