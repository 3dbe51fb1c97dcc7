use thiserror::Error;

use crate::font::{Glyph, PrintDirection};

/// Horizontal layout modes
///
/// Fonts declare the mode they were designed for (see
/// [`Header::layout`](crate::font::Header::layout)); the renderer uses
/// [`LayoutMode::FullSize`] unless told otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutMode {
    /// No kerning, glyphs are laid out as rectangles side by side.
    #[default]
    FullSize,
    /// Glyphs are moved closer until they touch, which means that two visible sub-characters are
    /// adjacent. Hardblanks count as visible.
    Fitting,
    /// Declared by fonts that expect adjacent glyphs to overlap by one more column, merging the
    /// touching sub-characters. The renderer lays such fonts out as [`LayoutMode::Fitting`].
    Smushing,
}

impl LayoutMode {
    /// Decode the layout parameters of a header.
    ///
    /// `full_layout`, if present, takes precedence: bit 7 selects smushing, otherwise bit 6
    /// selects fitting, otherwise full size. Without it, `old_layout` is `-1` for full size, `0`
    /// for fitting and `1..=63` for smushing.
    ///
    /// ```
    /// # use figbanner::render::LayoutMode;
    /// assert_eq!(LayoutMode::decode(-1, None).unwrap(), LayoutMode::FullSize);
    /// assert_eq!(LayoutMode::decode(15, Some(0b0101_1111_1000_1111)).unwrap(), LayoutMode::Smushing);
    /// ```
    ///
    /// # Errors
    /// See [`LayoutDecodeError`].
    pub fn decode(old_layout: i8, full_layout: Option<u16>) -> Result<Self, LayoutDecodeError> {
        if !(-1..=63).contains(&old_layout) {
            return Err(LayoutDecodeError::InvalidOld(old_layout));
        }
        let Some(full_layout) = full_layout else {
            return Ok(match old_layout {
                -1 => Self::FullSize,
                0 => Self::Fitting,
                _ => Self::Smushing,
            });
        };
        if full_layout > 0x7FFF {
            return Err(LayoutDecodeError::InvalidFull(full_layout));
        }
        let mode = if full_layout & 0x80 != 0 {
            Self::Smushing
        } else if full_layout & 0x40 != 0 {
            Self::Fitting
        } else {
            Self::FullSize
        };
        Ok(mode)
    }

    const fn kerning(self) -> bool {
        matches!(self, Self::Fitting | Self::Smushing)
    }
}

/// Errors that can occur when decoding layout parameters
#[derive(Error, Debug)]
pub enum LayoutDecodeError {
    /// The `Old_Layout` parameter is outside the range `-1..=63`.
    #[error("invalid `Old_Layout` {0}")]
    InvalidOld(i8),
    /// The `Full_Layout` parameter is outside the range `0..=32767`.
    #[error("invalid `Full_Layout` {0}")]
    InvalidFull(u16),
}

const BLANK: &[u8] = b" ";

/// One output line under construction: `height` rows of sub-characters, all `width` long.
///
/// Rows are kept in print order, so for right-to-left text each row is reversed and
/// [`LineBuffer::finish`] turns it back around.
#[derive(Clone, Debug)]
pub(crate) struct LineBuffer<'font> {
    rows: Vec<Vec<&'font [u8]>>,
    width: usize,
    glyphs: usize,
}

impl<'font> LineBuffer<'font> {
    pub(crate) fn new(height: usize) -> Self {
        Self {
            rows: vec![Vec::new(); height],
            width: 0,
            glyphs: 0,
        }
    }

    pub(crate) const fn width(&self) -> usize {
        self.width
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.glyphs == 0
    }

    /// The width of this line once `glyph` is appended.
    pub(crate) fn width_with(
        &self,
        glyph: &Glyph,
        mode: LayoutMode,
        direction: PrintDirection,
    ) -> usize {
        self.width + glyph.width() - self.overlap(glyph, mode, direction)
    }

    pub(crate) fn push(&mut self, glyph: &'font Glyph, mode: LayoutMode, direction: PrintDirection) {
        let shift = self.overlap(glyph, mode, direction);
        let new_width = self.width + glyph.width() - shift;
        // columns left of the line start are always blanks of the incoming glyph
        let skip = shift.saturating_sub(self.width);
        for (row, glyph_row) in self.rows.iter_mut().zip(print_order(glyph, direction)) {
            row.truncate(new_width);
            row.resize(new_width, BLANK);
            for (i, sub_char) in glyph_row.into_iter().enumerate().skip(skip) {
                if sub_char != BLANK {
                    row[self.width + i - shift] = sub_char;
                }
            }
        }
        self.width = new_width;
        self.glyphs += 1;
    }

    /// How many columns `glyph` slides into the current line.
    ///
    /// Per row, a glyph can slide over the trailing blanks of the line plus its own leading
    /// blanks. A row that is entirely blank on one side does not restrict the other side. The
    /// smallest allowance over all rows wins.
    fn overlap(&self, glyph: &Glyph, mode: LayoutMode, direction: PrintDirection) -> usize {
        if !mode.kerning() {
            return 0;
        }
        self.rows
            .iter()
            .zip(print_order(glyph, direction))
            .map(|(row, glyph_row)| {
                let end_blanks = row.iter().rev().take_while(|&&c| c == BLANK).count();
                let start_blanks = glyph_row.iter().take_while(|&&c| c == BLANK).count();
                match (end_blanks < self.width, start_blanks < glyph.width()) {
                    (_, false) => end_blanks + glyph.width(),
                    (false, true) => self.width + start_blanks,
                    (true, true) => end_blanks + start_blanks,
                }
            })
            .min()
            .unwrap_or(0)
    }

    /// The finished rows, in reading order.
    pub(crate) fn finish(self, direction: PrintDirection) -> Line<'font> {
        let mut rows = self.rows;
        if direction == PrintDirection::RightToLeft {
            rows.iter_mut().for_each(|row| row.reverse());
        }
        Line {
            rows,
            width: self.width,
        }
    }
}

/// A laid out line of glyphs, every row exactly `width` sub-characters long.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Line<'font> {
    pub rows: Vec<Vec<&'font [u8]>>,
    pub width: usize,
}

/// The glyph's rows padded to its width, each in print order.
fn print_order(glyph: &Glyph, direction: PrintDirection) -> impl Iterator<Item = Vec<&[u8]>> {
    glyph.sub_char_rows().map(move |mut row| {
        if direction == PrintDirection::RightToLeft {
            row.reverse();
        }
        row
    })
}
