use anyhow::{Context, Result};
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Attribute, Print, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{size as terminal_size, Clear, ClearType},
};
use std::io::{self, BufWriter, Stdout, Write};

use crate::fields::CellStyle;

/// Cell-addressed drawing surface. Coordinates are columns/rows from the top-left.
pub trait Screen: Send {
    /// (columns, rows)
    fn size(&self) -> Result<(u16, u16)>;
    fn set_cell(&mut self, x: u16, y: u16, ch: char, style: CellStyle) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    /// Force the next flush to repaint every cell, discarding whatever the
    /// terminal currently shows.
    fn sync(&mut self) -> Result<()>;
}

/// Real terminal. Drawing is queued and written on `flush`.
pub struct CrosstermScreen {
    out: BufWriter<Stdout>,
}

impl CrosstermScreen {
    pub fn new() -> Self {
        Self {
            out: BufWriter::new(io::stdout()),
        }
    }
}

impl Default for CrosstermScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for CrosstermScreen {
    fn size(&self) -> Result<(u16, u16)> {
        terminal_size().context("failed to read terminal size")
    }

    fn set_cell(&mut self, x: u16, y: u16, ch: char, style: CellStyle) -> Result<()> {
        queue!(
            self.out,
            MoveTo(x, y),
            SetForegroundColor(style.fg),
            SetBackgroundColor(style.bg)
        )?;
        if style.bold {
            queue!(self.out, SetAttribute(Attribute::Bold))?;
        }
        if style.reverse {
            queue!(self.out, SetAttribute(Attribute::Reverse))?;
        }
        queue!(self.out, Print(ch), SetAttribute(Attribute::Reset))?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        queue!(self.out, SetAttribute(Attribute::Reset), Clear(ClearType::All))?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush().context("failed to flush terminal")
    }

    fn sync(&mut self) -> Result<()> {
        queue!(
            self.out,
            SetAttribute(Attribute::Reset),
            Clear(ClearType::Purge),
            Clear(ClearType::All)
        )?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: CellStyle,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            style: CellStyle::default(),
        }
    }
}

/// In-memory grid used by tests and anywhere a terminal is not available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryScreen {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    pub flushes: usize,
    pub syncs: usize,
}

impl MemoryScreen {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); usize::from(width) * usize::from(height)],
            flushes: 0,
            syncs: 0,
        }
    }

    pub fn cell(&self, x: u16, y: u16) -> Option<Cell> {
        (x < self.width && y < self.height)
            .then(|| self.cells[usize::from(y) * usize::from(self.width) + usize::from(x)])
    }

    /// Characters of one row, trailing blanks included.
    pub fn row_text(&self, y: u16) -> String {
        (0..self.width)
            .filter_map(|x| self.cell(x, y).map(|cell| cell.ch))
            .collect()
    }

    /// Cell contents only, ignoring flush/sync counters.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

impl Screen for MemoryScreen {
    fn size(&self) -> Result<(u16, u16)> {
        Ok((self.width, self.height))
    }

    fn set_cell(&mut self, x: u16, y: u16, ch: char, style: CellStyle) -> Result<()> {
        if x < self.width && y < self.height {
            let index = usize::from(y) * usize::from(self.width) + usize::from(x);
            self.cells[index] = Cell { ch, style };
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.cells.fill(Cell::default());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        self.syncs += 1;
        Ok(())
    }
}
