//! A tiny line-oriented shell driving the console from its own thread.

use std::io::{self, BufRead, Write};
use std::thread::{self, JoinHandle};

use tui_console::{Console, ConsoleHandle};

const PROMPT: &str = "> ";

const HELP: &str = "\
commands:
  help          show this text
  echo <text>   write <text> to the output stream
  err <text>    write <text> to the error stream
  history       list the lines received so far
  clear         clear the console
  quit          exit (Ctrl+Q also works)
";

/// What the shell loop does after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Start the shell on a named thread. It ends on `quit` or when the
/// console's input stream closes.
pub fn spawn(console: &Console) -> io::Result<JoinHandle<()>> {
    let input = console.input_reader();
    let out = console.output_stream();
    let err = console.error_stream();
    let handle = console.handle();
    thread::Builder::new()
        .name("console-demo-shell".into())
        .spawn(move || {
            if let Err(e) = run(input, out, err, &handle) {
                tracing::debug!(error = %e, "shell stopped");
            }
        })
}

fn run(
    input: impl BufRead,
    mut out: impl Write,
    mut err: impl Write,
    handle: &ConsoleHandle,
) -> io::Result<()> {
    let mut received = Vec::new();
    write!(out, "Type `help` for commands.\n{PROMPT}")?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        tracing::debug!(%line, "shell received command");
        if execute(&line, &mut received, &mut out, &mut err, handle)? == Flow::Quit {
            break;
        }
        write!(out, "{PROMPT}")?;
        out.flush()?;
    }
    Ok(())
}

/// Run one command line.
pub fn execute(
    line: &str,
    received: &mut Vec<String>,
    out: &mut impl Write,
    err: &mut impl Write,
    handle: &ConsoleHandle,
) -> io::Result<Flow> {
    received.push(line.to_string());
    let (command, rest) = line
        .trim_start()
        .split_once(' ')
        .unwrap_or((line.trim(), ""));

    match command {
        "" => {}
        "help" => out.write_all(HELP.as_bytes())?,
        "echo" => writeln!(out, "{rest}")?,
        "err" => {
            writeln!(err, "{rest}")?;
            err.flush()?;
        }
        "history" => {
            for (i, entry) in received.iter().enumerate() {
                writeln!(out, "{:>4}  {entry}", i + 1)?;
            }
        }
        "clear" => handle
            .clear()
            .map_err(|e| io::Error::new(io::ErrorKind::BrokenPipe, e))?,
        "quit" | "exit" => return Ok(Flow::Quit),
        other => {
            writeln!(err, "unknown command: {other}")?;
            err.flush()?;
        }
    }
    out.flush()?;
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exec(line: &str, received: &mut Vec<String>, console: &Console) -> (Flow, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let flow = execute(line, received, &mut out, &mut err, &console.handle()).unwrap();
        (
            flow,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_echo_and_err() {
        let console = Console::new().unwrap();
        let mut received = Vec::new();
        let (flow, out, err) = exec("echo hello world", &mut received, &console);
        assert_eq!(flow, Flow::Continue);
        assert_eq!(out, "hello world\n");
        assert!(err.is_empty());

        let (_, out, err) = exec("err boom", &mut received, &console);
        assert!(out.is_empty());
        assert_eq!(err, "boom\n");
    }

    #[test]
    fn test_unknown_command_goes_to_error_stream() {
        let console = Console::new().unwrap();
        let (_, out, err) = exec("frobnicate now", &mut Vec::new(), &console);
        assert!(out.is_empty());
        assert_eq!(err, "unknown command: frobnicate\n");
    }

    #[test]
    fn test_history_lists_received_lines() {
        let console = Console::new().unwrap();
        let mut received = Vec::new();
        exec("echo a", &mut received, &console);
        let (_, out, _) = exec("history", &mut received, &console);
        assert_eq!(out, "   1  echo a\n   2  history\n");
    }

    #[test]
    fn test_clear_goes_through_handle() {
        let mut console = Console::new().unwrap();
        console.print("old text");
        exec("clear", &mut Vec::new(), &console);
        console.process_requests();
        assert_eq!(console.text(), "");
    }

    #[test]
    fn test_quit_and_blank_line() {
        let console = Console::new().unwrap();
        assert_eq!(exec("quit", &mut Vec::new(), &console).0, Flow::Quit);
        let (flow, out, err) = exec("   ", &mut Vec::new(), &console);
        assert_eq!(flow, Flow::Continue);
        assert!(out.is_empty() && err.is_empty());
    }

    #[test]
    fn test_shell_thread_round_trip() {
        use std::time::{Duration, Instant};

        let mut console = Console::new().unwrap();
        let shell = spawn(&console).unwrap();
        console.set_command("echo ping").unwrap();
        console.set_command("quit").unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while !shell.is_finished() {
            assert!(Instant::now() < deadline, "shell never finished");
            console.process_requests();
            std::thread::sleep(Duration::from_millis(1));
        }
        shell.join().unwrap();
        console.shutdown();
        console.process_requests();
        assert!(console.text().starts_with("echo ping\nquit\n"));
        assert!(console.text().ends_with("> ping\n> "));
    }
}
