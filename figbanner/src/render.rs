//! Renderer and rendering settings
mod layout;

use crate::font::{FontTable, PrintDirection};

use layout::{Line, LineBuffer};
pub use layout::{LayoutDecodeError, LayoutMode};

/// Characters that always start a new sub-line. A `"\r\n"` pair counts as one break.
pub const LINE_BREAKS: [char; 4] = ['\n', '\r', '\x0b', '\x0c'];

/// The separator placed between rendered rows.
#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
/// The separator placed between rendered rows.
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

/// The main type for rendering
///
/// Use [`render()`](BannerRenderer::render) to process strings. The other methods are meant to be
/// used in a builder pattern:
/// ```
/// # use figbanner::font::FontTable;
/// # use figbanner::render::{Alignment, BannerRenderer, LINE_ENDING};
/// let font = FontTable::parse("flf2a$ 1 1 4 -1 0\n$@@\n!@@\n").unwrap();
/// let rendered: String = BannerRenderer::new(&font)
///     .alignment(Alignment::Right)
///     .render("!\n!!!");
/// assert_eq!(rendered, ["  !", "!!!"].join(LINE_ENDING));
/// ```
#[must_use]
#[derive(Debug, Clone, Copy)]
pub struct BannerRenderer<'font> {
    font: &'font FontTable,
    config: Config,
}

impl<'font> BannerRenderer<'font> {
    /// Creates a new renderer: left aligned, full size layout, unbounded width, and the print
    /// direction declared by the font.
    pub const fn new(font: &'font FontTable) -> Self {
        Self {
            font,
            config: Config {
                alignment: Alignment::Left,
                layout: LayoutMode::FullSize,
                direction: font.header().print_direction,
                max_width: None,
                wrap: WrapPolicy::Word,
            },
        }
    }

    /// Sets the alignment.
    pub const fn alignment(mut self, alignment: Alignment) -> Self {
        self.config.alignment = alignment;
        self
    }

    /// Sets the horizontal layout mode. Pass
    /// [`font.header().layout`](crate::font::Header::layout) to lay out glyphs the way the font
    /// was designed.
    pub const fn layout(mut self, mode: LayoutMode) -> Self {
        self.config.layout = mode;
        self
    }

    /// Sets the print direction.
    pub const fn print_direction(mut self, direction: PrintDirection) -> Self {
        self.config.direction = direction;
        self
    }

    /// Sets a maximum output width in columns.
    ///
    /// Lines that do not fit are broken according to the [`WrapPolicy`], and centered or right
    /// aligned output is padded relative to this width instead of the widest line. A single glyph
    /// wider than `width` still gets a line of its own.
    pub const fn max_width(mut self, width: usize) -> Self {
        self.config.max_width = Some(width);
        self
    }

    /// Sets where overlong lines are broken.
    pub const fn wrap(mut self, policy: WrapPolicy) -> Self {
        self.config.wrap = policy;
        self
    }

    /// Renders the given text.
    ///
    /// Every line break (see [`LINE_BREAKS`]) starts a new sub-line; sub-lines are rendered
    /// independently and stacked. Tabs render as spaces, and characters the font does not map are
    /// skipped. An empty text renders as [`FontTable::height`] empty rows. Rows are separated by
    /// [`LINE_ENDING`] with no trailing separator.
    ///
    /// The output type can be:
    /// * [`Vec<u8>`]: recommended in case the font uses characters that are not valid UTF-8 (which
    ///   you can check using [`FontTable::is_utf8`]);
    /// * [`String`]: a convenience wrapper using [`String::from_utf8_lossy`] after rendering as
    ///   [`Vec<u8>`].
    pub fn render<Output: RenderOutput>(&self, text: &str) -> Output {
        let rows = self.render_rows(text);
        Output::from_bytes(rows.join(LINE_ENDING.as_bytes()))
    }

    /// Renders the given text into its separate output rows, top to bottom.
    #[must_use]
    pub fn render_lines(&self, text: &str) -> Vec<String> {
        self.render_rows(text)
            .into_iter()
            .map(|row| String::from_utf8_lossy(&row).into_owned())
            .collect()
    }

    fn render_rows(&self, text: &str) -> Vec<Vec<u8>> {
        let lines: Vec<Line<'font>> = sub_lines(text)
            .flat_map(|sub_line| self.layout_sub_line(sub_line))
            .collect();
        let widest = lines.iter().map(|line| line.width).max().unwrap_or(0);
        let target = self.config.max_width.map_or(widest, |width| width.max(widest));
        let hardblank = self.font.hardblank();
        let mut rows = Vec::with_capacity(lines.len() * self.font.height());
        for line in lines {
            let padding = self.config.alignment.padding(line.width, target);
            rows.extend(line.rows.into_iter().map(|row| {
                let mut bytes = vec![b' '; padding];
                for sub_char in row {
                    let sub_char = if hardblank.is(sub_char) { b" ".as_slice() } else { sub_char };
                    bytes.extend_from_slice(sub_char);
                }
                bytes
            }));
        }
        rows
    }

    /// Lays out one sub-line, breaking it into as many lines as `max_width` requires.
    fn layout_sub_line(&self, sub_line: &str) -> Vec<Line<'font>> {
        let Config {
            layout,
            direction,
            max_width,
            wrap,
            ..
        } = self.config;
        let height = self.font.height();
        let glyphs: Vec<_> = sub_line
            .chars()
            .map(|c| if c == '\t' { ' ' } else { c })
            .filter_map(|c| self.font.glyph_or_missing(c).map(|glyph| (c == ' ', glyph)))
            .collect();

        let mut lines = Vec::new();
        let mut line = LineBuffer::new(height);
        let mut before_space: Option<(LineBuffer<'font>, usize)> = None;
        let mut in_space_run = false;
        let mut i = 0;
        while let Some(&(is_space, glyph)) = glyphs.get(i) {
            if is_space && !in_space_run {
                before_space = Some((line.clone(), i));
                in_space_run = true;
            }
            let overfull = max_width
                .is_some_and(|max_width| line.width_with(glyph, layout, direction) > max_width);
            if overfull && !line.is_empty() {
                let finished = match before_space.take() {
                    Some((saved, space)) if wrap == WrapPolicy::Word && !saved.is_empty() => {
                        i = space;
                        while glyphs.get(i).is_some_and(|&(is_space, _)| is_space) {
                            i += 1;
                        }
                        saved
                    }
                    _ => line,
                };
                log::trace!("line break before glyph {i} at width {}", finished.width());
                lines.push(finished.finish(direction));
                line = LineBuffer::new(height);
                in_space_run = false;
                continue;
            }
            line.push(glyph, layout, direction);
            if !is_space {
                in_space_run = false;
            }
            i += 1;
        }
        if !line.is_empty() || lines.is_empty() {
            lines.push(line.finish(direction));
        }
        lines
    }
}

/// Splits on [`LINE_BREAKS`]; a single trailing break does not start another sub-line.
fn sub_lines(text: &str) -> impl Iterator<Item = &str> {
    let text = text
        .strip_suffix("\r\n")
        .or_else(|| text.strip_suffix(LINE_BREAKS))
        .unwrap_or(text);
    text.split("\r\n").flat_map(|part| part.split(LINE_BREAKS))
}

/// A complete description of one render: the text, its alignment and the font to use
///
/// ```
/// # use figbanner::font::FontTable;
/// # use figbanner::render::{Alignment, RenderRequest};
/// let font = FontTable::parse("flf2a$ 1 1 4 -1 0\n$@@\n!@@\n").unwrap();
/// let request = RenderRequest { text: "! !", alignment: Alignment::Left, font: &font };
/// assert_eq!(request.render(), "! !");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    /// The input, possibly spanning several lines
    pub text: &'a str,
    /// How lines of different widths are aligned
    pub alignment: Alignment,
    /// The parsed font, borrowed for the duration of the render
    pub font: &'a FontTable,
}

impl RenderRequest<'_> {
    /// Renders the request with otherwise default settings.
    #[must_use]
    pub fn render(&self) -> String {
        BannerRenderer::new(self.font)
            .alignment(self.alignment)
            .render(self.text)
    }
}

/// Trait to generically bound the renderer output
///
/// Implementations are provided for [`Vec<u8>`] and [`String`]. Effectively a version of
/// [`From<Vec<u8>>`].
pub trait RenderOutput {
    /// Convert the byte level rendered output.
    fn from_bytes(bytes: Vec<u8>) -> Self;
}

impl RenderOutput for Vec<u8> {
    fn from_bytes(bytes: Vec<u8>) -> Self {
        bytes
    }
}

impl RenderOutput for String {
    fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::from_utf8_lossy(&bytes).into_owned()
    }
}

/// The choice of line alignment for multi-line output
///
/// Lines are aligned against the widest rendered line, or against the maximum width if one is
/// set. The default is [`Alignment::Left`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// No padding is inserted.
    #[default]
    Left,
    /// Left padding of half the free columns, rounded down.
    Center,
    /// Left padding so that every line ends in the last column.
    Right,
}

impl Alignment {
    const fn padding(self, width: usize, target: usize) -> usize {
        let free = target.saturating_sub(width);
        match self {
            Self::Left => 0,
            Self::Center => free / 2,
            Self::Right => free,
        }
    }
}

/// Where a line that exceeds the maximum width is broken
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WrapPolicy {
    /// Break at the last run of blanks (spaces and tabs) that fits, dropping the run. Lines
    /// without such a run are broken like [`WrapPolicy::Character`]. This is the default.
    #[default]
    Word,
    /// Break after the last glyph that fits.
    Character,
}

#[derive(Clone, Copy, Debug)]
struct Config {
    alignment: Alignment,
    layout: LayoutMode,
    direction: PrintDirection,
    max_width: Option<usize>,
    wrap: WrapPolicy,
}
