use std::io::Write;

use termcolor::{Buffer, Color, ColorSpec, WriteColor};

use super::position::{Position, Span};

/// Returns the source lines covered by the span, each followed by a line of
/// spaces and carets underlining the columns in range. Tab characters are
/// stripped from the result.
pub fn render_arrows(full_text: &str, pos_start: &Position, pos_end: &Position) -> String {
    let lines: Vec<&str> = full_text.split('\n').collect();

    let first_line = pos_start.line as usize;
    let last_line = pos_end.line as usize;

    let mut res = String::new();

    for line_idx in first_line..=last_line {
        let line = lines.get(line_idx).copied().unwrap_or("");

        let col_start = if line_idx == first_line {
            pos_start.column as usize
        } else {
            0
        };
        let col_end = if line_idx == last_line {
            pos_end.column as usize
        } else {
            line.chars().count().saturating_sub(1)
        };

        if line_idx > first_line {
            res.push('\n');
        }

        res.push_str(line);
        res.push('\n');

        for _ in 0..col_start {
            res.push(' ');
        }
        for _ in 0..col_end.saturating_sub(col_start) {
            res.push('^');
        }
    }

    res.replace('\t', "")
}

pub struct Diagnostic {
    pub title: String,
    pub text: String,
    pub span: Span,
    pub traceback: Option<String>,
}

impl Diagnostic {
    pub fn write(&self, buf: &mut Buffer) {
        if let Some(traceback) = &self.traceback {
            write!(buf, "{traceback}").expect("write traceback");
        }

        buf.set_color(ColorSpec::new().set_bold(true).set_fg(Some(Color::Red)))
            .expect("write_title_color");
        write!(buf, "{}", self.title).expect("write_title");
        buf.set_color(&ColorSpec::new())
            .expect("write_title_reset");

        let start = &self.span.start;

        write!(
            buf,
            " : {}File {} , line : {} column: {} ",
            self.text,
            start.source_name,
            start.line + 1,
            start.column
        ).expect("write diagnostic header");

        write!(
            buf,
            "\n\n{}",
            render_arrows(&start.full_text, start, &self.span.end)
        ).expect("write diagnostic excerpt");
    }
}
