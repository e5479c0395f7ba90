//! Line-oriented terminal front end for the verification screen.
//!
//! Cells are addressed 1 to 6 on the command line.

use crate::otp::{format_mm_ss, Input, Render, ScreenView, VerificationStatus, CODE_LENGTH};
use std::io::Write;

pub const HELP: &str = "\
Commands:
  d <cell> <digit>   type a digit into a cell (cells are 1-6)
  x <cell>           clear a cell
  b <cell>           backspace in a cell
  f <cell>           focus a cell
  p <text>           paste text
  123456             paste six digits and submit
  s                  submit
  r                  resend a new code (after expiry)
  q                  quit
  h                  this help";

#[derive(Debug, PartialEq, Eq)]
pub enum Line {
    Inputs(Vec<Input>),
    Help,
}

/// Parses one line typed by the user.
///
/// # Errors
/// Returns a message describing the problem when the line is not a command.
pub fn parse_line(line: &str) -> Result<Line, String> {
    let line = line.trim();
    let (command, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(command, rest)| (command, rest.trim()));

    let inputs = match command {
        "" => Vec::new(),
        "h" | "?" | "help" => return Ok(Line::Help),
        "s" => vec![Input::Submit],
        "r" => vec![Input::Resend],
        "q" => vec![Input::Dismiss],
        "p" => vec![Input::Paste(rest.to_string())],
        "d" => {
            let (cell, digit) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "usage: d <cell> <digit>".to_string())?;
            vec![Input::Digit {
                index: parse_cell(cell)?,
                value: digit.trim().to_string(),
            }]
        }
        "x" => vec![Input::Digit {
            index: parse_cell(rest)?,
            value: String::new(),
        }],
        "b" => vec![Input::Backspace {
            index: parse_cell(rest)?,
        }],
        "f" => vec![Input::Focus {
            index: parse_cell(rest)?,
        }],
        code if rest.is_empty()
            && code.len() == CODE_LENGTH
            && code.chars().all(|c| c.is_ascii_digit()) =>
        {
            vec![Input::Paste(code.to_string()), Input::Submit]
        }
        other => return Err(format!("unknown command: {other} (h for help)")),
    };

    Ok(Line::Inputs(inputs))
}

fn parse_cell(cell: &str) -> Result<usize, String> {
    match cell.trim().parse::<usize>() {
        Ok(cell) if (1..=CODE_LENGTH).contains(&cell) => Ok(cell - 1),
        _ => Err(format!("cell must be between 1 and {CODE_LENGTH}")),
    }
}

/// Draws a full screen.
#[must_use]
pub fn render_view(view: &ScreenView) -> String {
    let mut lines = vec![
        "Verify your email".to_string(),
        format!("Code sent to {}", view.masked_email),
        view.cells.to_string(),
    ];

    lines.push(format!("Expires in: {}", view.time_left));
    if view.expired {
        lines.push("Code expired".to_string());
    }

    if let Some(error) = &view.error {
        lines.push(format!("Error: {error}"));
    }
    if let Some(success) = &view.success {
        lines.push(format!("Success: {success}"));
    }

    let submit = match view.status {
        VerificationStatus::Submitting => "Verifying...",
        VerificationStatus::Succeeded => "Verified",
        _ if view.submit_enabled => "Verify [s]",
        _ => "Verify (enter all 6 digits)",
    };
    lines.push(submit.to_string());

    let resend = if view.resend.in_flight {
        "Resending...".to_string()
    } else if view.resend.can_resend() {
        "Resend [r]".to_string()
    } else {
        format!("Resend in {}", format_mm_ss(view.seconds_remaining))
    };
    lines.push(resend);

    lines.join("\n")
}

/// Writes views to a terminal.
///
/// A view that differs from the previous one only by the clock rewrites the
/// clock line in place instead of redrawing the screen.
pub struct TerminalRenderer<W: Write> {
    out: W,
    last: Option<ScreenView>,
    inline_clock: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last: None,
            inline_clock: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn only_clock_changed(&self, view: &ScreenView) -> bool {
        self.last.as_ref().is_some_and(|last| {
            let mut last = last.clone();
            last.seconds_remaining = view.seconds_remaining;
            last.time_left.clone_from(&view.time_left);
            last == *view
        })
    }

    fn write(&mut self, view: &ScreenView) -> std::io::Result<()> {
        if self.only_clock_changed(view) {
            write!(self.out, "\rExpires in: {}", view.time_left)?;
            self.inline_clock = true;
        } else {
            if self.inline_clock {
                writeln!(self.out)?;
                self.inline_clock = false;
            }
            writeln!(self.out, "\n{}", render_view(view))?;
        }
        self.out.flush()
    }
}

impl<W: Write> Render for TerminalRenderer<W> {
    fn render(&mut self, view: &ScreenView) {
        if let Err(err) = self.write(view) {
            tracing::warn!(error = %err, "failed to draw screen");
        }
        self.last = Some(view.clone());
    }
}
