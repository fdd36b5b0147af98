//! ANSI line printer using crossterm

use std::io::{self, IsTerminal, Write};

use crossterm::{
    queue,
    style::{Attribute, Color as TermColor, Print, SetAttribute, SetForegroundColor},
    terminal,
};
use unicode_width::UnicodeWidthChar;

use hilite::syntax::{Color, Span, Style};
use hilite::Result;

/// Width to clip output to, if stdout is a terminal
pub fn stdout_width() -> Option<usize> {
    if !io::stdout().is_terminal() {
        return None;
    }
    terminal::size().ok().map(|(cols, _)| cols as usize)
}

/// Writes styled lines to any `Write`
pub struct Printer<W: Write> {
    out: W,
    /// Display columns per line (None = unlimited)
    width: Option<usize>,
    tab_width: usize,
    /// Display column within the current line
    col: usize,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W, width: Option<usize>, tab_width: usize) -> Self {
        Self {
            out,
            width,
            tab_width: tab_width.max(1),
            col: 0,
        }
    }

    /// Print one line with its spans and an optional line-number gutter
    ///
    /// Spans are byte columns into `text`; bytes no span covers are printed
    /// unstyled.
    pub fn print_line(&mut self, text: &str, spans: &[Span], gutter: Option<(usize, usize)>) -> Result<()> {
        self.col = 0;
        if let Some((number, digits)) = gutter {
            queue!(
                self.out,
                SetAttribute(Attribute::Dim),
                Print(format!("{number:>digits$} ")),
                SetAttribute(Attribute::Reset)
            )?;
            self.col += digits + 1;
        }

        let mut pos = 0;
        let mut open = true;
        for span in spans {
            let Some(segment) = text.get(span.column..span.end()) else {
                continue;
            };
            if span.column < pos {
                continue;
            }
            open = self.write_segment(&text[pos..span.column], None)?
                && self.write_segment(segment, Some(span.style))?;
            pos = span.end();
            if !open {
                break;
            }
        }
        if open && pos < text.len() {
            self.write_segment(&text[pos..], None)?;
        }

        queue!(self.out, Print('\n'))?;
        Ok(())
    }

    /// Write `segment` in `style`; false once the line is clipped
    fn write_segment(&mut self, segment: &str, style: Option<Style>) -> Result<bool> {
        if segment.is_empty() {
            return Ok(true);
        }

        let mut visible = String::with_capacity(segment.len());
        let mut clipped = false;
        for ch in segment.chars() {
            let (expanded, width) = if ch == '\t' {
                let n = self.tab_width - self.col % self.tab_width;
                (None, n)
            } else {
                (Some(ch), ch.width().unwrap_or(0))
            };
            if self.width.is_some_and(|max| self.col + width > max) {
                clipped = true;
                break;
            }
            match expanded {
                Some(ch) => visible.push(ch),
                None => visible.extend(std::iter::repeat(' ').take(width)),
            }
            self.col += width;
        }

        match style.filter(|style| !style.is_default()) {
            Some(style) => {
                if let Color::Rgb(r, g, b) = style.fg {
                    queue!(self.out, SetForegroundColor(TermColor::Rgb { r, g, b }))?;
                }
                if style.bold {
                    queue!(self.out, SetAttribute(Attribute::Bold))?;
                }
                if style.italic {
                    queue!(self.out, SetAttribute(Attribute::Italic))?;
                }
                queue!(self.out, Print(visible), SetAttribute(Attribute::Reset))?;
            }
            None => queue!(self.out, Print(visible))?,
        }
        Ok(!clipped)
    }

    /// Flush output buffer
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
