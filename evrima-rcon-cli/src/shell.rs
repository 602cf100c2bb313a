use crossterm::tty::IsTty;
use rustyline_async::{Readline, ReadlineError, SharedWriter};
use std::io::{BufRead, Lines, Stderr, StdinLock, Stdout, Write};

pub struct ShellRead {
    prompt: String,
    inner: ShellReadInner,
}

#[derive(Clone)]
pub struct ShellWrite {
    inner: ShellWriteInner,
}

enum ShellReadInner {
    Interactive(Readline, SharedWriter),
    Stream(Lines<StdinLock<'static>>),
}

enum ShellWriteInner {
    Interactive(SharedWriter),
    Stream(Stdout, Stderr),
}

/// Opens an interactive line editor when stdout is a terminal, otherwise reads plain lines from
/// stdin so commands can be piped in.
pub fn new_shell(prompt: String, disable_interactive: bool) -> (ShellRead, ShellWrite) {
    let interactive = if !disable_interactive && std::io::stdout().is_tty() {
        Readline::new(prompt.clone()).ok()
    } else {
        None
    };

    match interactive {
        Some((read_line, writer)) => (
            ShellRead {
                prompt,
                inner: ShellReadInner::Interactive(read_line, writer.clone()),
            },
            ShellWrite {
                inner: ShellWriteInner::Interactive(writer),
            },
        ),
        None => (
            ShellRead {
                prompt,
                inner: ShellReadInner::Stream(std::io::stdin().lock().lines()),
            },
            ShellWrite {
                inner: ShellWriteInner::Stream(std::io::stdout(), std::io::stderr()),
            },
        ),
    }
}

impl ShellRead {
    /// Reads the next line. Returns `None` at end of input.
    pub async fn read_line(&mut self) -> Option<String> {
        match &mut self.inner {
            ShellReadInner::Interactive(read, writer) => {
                let line = match read.readline().await {
                    Ok(line) => line,
                    Err(ReadlineError::IO(err)) => {
                        eprintln!("An error occurred: {}", err);
                        proc_exit::Code::UNKNOWN.process_exit();
                    }
                    Err(ReadlineError::Eof | ReadlineError::Closed) => return None,
                    Err(ReadlineError::Interrupted) => proc_exit::Code::SIGINT.process_exit(),
                };

                read.add_history_entry(line.clone());

                // echo back the line
                writeln!(writer, "{}{}", self.prompt, line).ok();

                Some(line)
            }
            ShellReadInner::Stream(stream) => match stream.next() {
                Some(Ok(line)) => Some(line),
                Some(Err(err)) => {
                    eprintln!("An error occurred: {}", err);
                    proc_exit::Code::UNKNOWN.process_exit();
                }
                None => None,
            },
        }
    }
}

impl ShellWrite {
    pub fn out(&mut self) -> &mut dyn Write {
        match &mut self.inner {
            ShellWriteInner::Interactive(writer) => writer,
            ShellWriteInner::Stream(stdout, _) => stdout,
        }
    }

    pub fn err(&mut self) -> &mut dyn Write {
        match &mut self.inner {
            ShellWriteInner::Interactive(writer) => writer,
            ShellWriteInner::Stream(_, stderr) => stderr,
        }
    }
}

impl Clone for ShellWriteInner {
    fn clone(&self) -> Self {
        match self {
            ShellWriteInner::Interactive(w) => ShellWriteInner::Interactive(w.clone()),
            ShellWriteInner::Stream(_, _) => {
                ShellWriteInner::Stream(std::io::stdout(), std::io::stderr())
            }
        }
    }
}
