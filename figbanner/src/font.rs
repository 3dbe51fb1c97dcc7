//! FIGfonts
//!
//! The font table and the logic for parsing `.flf` files.
mod header;

use std::collections::HashMap;
use std::str::FromStr;

use bstr::{BString, ByteSlice as _};
use itertools::Itertools as _;
use thiserror::Error;

pub use header::{Hardblank, Header, HeaderError, PrintDirection, SIGNATURE};

use crate::render::BannerRenderer;
use crate::str_ext::SubChars as _;

/// The 102 codepoints for characters that are included in all FIGfonts, in the order their glyphs
/// appear in the file
///
/// Consists of 95 printable ASCII characters and 7 Deutsch characters from the Latin-1 encoding.
pub const DEFAULT_CODEPOINTS: [u8; 102] = *b" !\"#$%&'()*+,-./0123456789:;<=>?@\
                                             ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`\
                                             abcdefghijklmnopqrstuvwxyz{|}~\
                                             \xc4\xd6\xdc\xe4\xf6\xfc\xdf";

/// Rendered in place of characters the font does not map, if present.
const MISSING_CHARACTER: u32 = 0;

/// A parsed FIGfont: the header plus a table from character code to [`Glyph`].
///
/// A table is immutable once parsed; to switch fonts, parse the new one and drop the old table.
/// It can be shared freely between threads rendering different texts.
///
/// ```
/// # use figbanner::font::FontTable;
/// let source = "flf2a$ 1 1 4 -1 0\n$@@\n!@@\n";
/// let font: FontTable = source.parse().unwrap();
/// assert_eq!(font.height(), 1);
/// assert_eq!(font.glyph('!').unwrap().rows(), [b"!"]);
/// assert!(font.glyph('"').is_none());
/// ```
#[derive(Debug)]
pub struct FontTable {
    header: Header,
    comments: String,
    glyphs: HashMap<u32, Glyph>,
    ignored_characters: HashMap<u32, String>,
    max_width: usize,
    is_utf8: bool,
}

impl FontTable {
    /// Decodes the contents of an `.flf` file.
    ///
    /// This is [`FontTable::parse_with_warnings`] with the warnings dropped.
    ///
    /// # Errors
    /// Returns `Err` if the font is malformed; see [`MalformedFontError`] for details.
    pub fn parse(bytes: impl AsRef<[u8]>) -> Result<Self, MalformedFontError> {
        Self::parse_with_warnings(bytes).map(|(font, _)| font)
    }

    /// Decodes the contents of an `.flf` file and also returns any non-fatal issues found while
    /// decoding.
    ///
    /// Lines may end in LF, CRLF or a lone CR. Empty lines at the end of the data are ignored.
    /// Fonts that stop before the end of the standard character set are accepted (with a
    /// [`FontWarning::ShortStandardSet`]); the characters they leave out are unmapped.
    ///
    /// # Errors
    /// Returns `Err` if the font is malformed; see [`MalformedFontError`] for details. No table is
    /// produced in that case.
    pub fn parse_with_warnings(
        bytes: impl AsRef<[u8]>,
    ) -> Result<(Self, Vec<FontWarning>), MalformedFontError> {
        let lines = split_lines(bytes.as_ref());
        let mut reader = Reader { lines: &lines };
        let mut warnings = Vec::new();

        let header = Header::parse(reader.line().unwrap_or_default(), &mut warnings)?;
        let comments = reader.take(header.comment_lines);
        if comments.len() < header.comment_lines {
            return Err(MalformedFontError::TruncatedComments {
                expected: header.comment_lines,
                found: comments.len(),
            });
        }

        let mut font = Self {
            header,
            comments: String::from_utf8_lossy(&bstr::join("\n", comments)).into_owned(),
            glyphs: HashMap::new(),
            ignored_characters: HashMap::new(),
            max_width: 0,
            is_utf8: true,
        };
        font.read_standard_glyphs(&mut reader, &mut warnings)?;
        font.read_tagged_blocks(&mut reader, &mut warnings)?;

        font.max_width = font.glyphs.values().map(Glyph::width).max().unwrap_or(0);
        let byte_glyphs = font.glyphs.values().filter(|glyph| !glyph.is_utf8).count();
        font.is_utf8 = byte_glyphs == 0;
        if !font.is_utf8 {
            warnings.push(FontWarning::NotUtf8(byte_glyphs));
        }
        log::debug!(
            "parsed FIGfont: height {}, {} glyphs, {} informational blocks, {} warnings",
            font.height(),
            font.glyphs.len(),
            font.ignored_characters.len(),
            warnings.len()
        );
        Ok((font, warnings))
    }

    /// Renders a string with the default settings of [`BannerRenderer::new`].
    #[must_use]
    pub fn render(&self, text: &str) -> String {
        BannerRenderer::new(self).render(text)
    }

    /// The *comments* portion of the font, between the header and the glyphs. Usually contains
    /// information about the font author.
    #[must_use]
    pub fn comments(&self) -> &str {
        &self.comments
    }

    /// The fully decoded font header.
    #[must_use]
    pub const fn header(&self) -> &Header {
        &self.header
    }

    /// The number of rows shared by every glyph.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.header.height.get()
    }

    /// The placeholder that renders as a blank but counts as a visible column.
    #[must_use]
    pub const fn hardblank(&self) -> Hardblank {
        self.header.hardblank
    }

    /// The glyph mapped to `char`, if any.
    #[must_use]
    pub fn glyph(&self, char: char) -> Option<&Glyph> {
        self.glyphs.get(&u32::from(char))
    }

    /// The number of mapped characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Returns true if the font maps no character at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Human-readable blocks, usually *translation tables*, included in the font under negative
    /// character codes. Keyed by the absolute value of the code.
    #[must_use]
    pub const fn ignored_characters(&self) -> &HashMap<u32, String> {
        &self.ignored_characters
    }

    /// Returns true if each row of each glyph is a valid UTF-8 string.
    #[must_use]
    pub const fn is_utf8(&self) -> bool {
        self.is_utf8
    }

    /// The widest glyph, in columns.
    #[must_use]
    pub const fn max_width(&self) -> usize {
        self.max_width
    }

    pub(crate) fn glyph_or_missing(&self, char: char) -> Option<&Glyph> {
        self.glyph(char)
            .or_else(|| self.glyphs.get(&MISSING_CHARACTER))
    }

    fn read_standard_glyphs(
        &mut self,
        reader: &mut Reader<'_>,
        warnings: &mut Vec<FontWarning>,
    ) -> Result<(), MalformedFontError> {
        let mut found = 0;
        for code in DEFAULT_CODEPOINTS.map(u32::from) {
            if reader.is_empty() {
                break;
            }
            let glyph = Glyph::parse(reader.take(self.height()), code, &self.header, warnings)?;
            drop(self.glyphs.insert(code, glyph));
            found += 1;
        }
        if found < DEFAULT_CODEPOINTS.len() {
            warnings.push(FontWarning::ShortStandardSet(found));
        }
        Ok(())
    }

    /// Each block starts with a tag line, `<code> [description]`, followed by `height` rows.
    fn read_tagged_blocks(
        &mut self,
        reader: &mut Reader<'_>,
        warnings: &mut Vec<FontWarning>,
    ) -> Result<(), MalformedFontError> {
        let mut blocks = 0;
        while let Some(line) = reader.line() {
            let Some(tag) = line.fields().next() else {
                continue;
            };
            let rows = reader.take(self.height());
            match CodeTag::parse(tag)? {
                CodeTag::Char(code) => {
                    let glyph = Glyph::parse(rows, code, &self.header, warnings)?;
                    if self.glyphs.insert(code, glyph).is_some() {
                        log::debug!("{} is defined again, keeping the later glyph", describe(code));
                    }
                }
                CodeTag::Info(code) => {
                    if rows.len() < self.height() {
                        return Err(MalformedFontError::TruncatedGlyph {
                            code,
                            expected: self.height(),
                            found: rows.len(),
                        });
                    }
                    let text = String::from_utf8_lossy(&bstr::join("\n", rows)).into_owned();
                    drop(self.ignored_characters.insert(code, text));
                }
            }
            blocks += 1;
        }
        if blocks < self.header.code_tag_count {
            warnings.push(FontWarning::MissingTaggedBlocks {
                found: blocks,
                declared: self.header.code_tag_count,
            });
        }
        Ok(())
    }
}

impl FromStr for FontTable {
    type Err = MalformedFontError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Splits on LF, CRLF and lone CR, dropping empty lines at the end.
fn split_lines(bytes: &[u8]) -> Vec<&[u8]> {
    let mut lines: Vec<&[u8]> = bytes
        .lines()
        .flat_map(|line| line.split(|&byte| byte == b'\r'))
        .collect();
    let end = lines
        .iter()
        .rposition(|line| !line.is_empty())
        .map_or(0, |last| last + 1);
    lines.truncate(end);
    lines
}

/// The unread lines of a font.
struct Reader<'a> {
    lines: &'a [&'a [u8]],
}

impl<'a> Reader<'a> {
    fn line(&mut self) -> Option<&'a [u8]> {
        let (&line, rest) = self.lines.split_first()?;
        self.lines = rest;
        Some(line)
    }

    /// Up to `count` lines; fewer only at the end of the data.
    fn take(&mut self, count: usize) -> &'a [&'a [u8]] {
        let (taken, rest) = self.lines.split_at(count.min(self.lines.len()));
        self.lines = rest;
        taken
    }

    const fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// The number opening a code-tagged block, in decimal, `0x` hexadecimal or `0`-prefixed octal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CodeTag {
    /// A character code in `0..=0x7FFF_FFFF`
    Char(u32),
    /// A negative code in `-0x8000_0000..=-2`, by magnitude; the block is free text
    Info(u32),
}

impl CodeTag {
    pub(crate) fn parse(tag: &[u8]) -> Result<Self, MalformedFontError> {
        let invalid = || MalformedFontError::InvalidCharacterCode(tag.into());
        let text = tag.to_str().map_err(|_| invalid())?;
        let (sign, magnitude) = text.strip_prefix('-').map_or((1, text), |rest| (-1, rest));
        let (radix, digits) = if let Some(hex) = magnitude
            .strip_prefix("0x")
            .or_else(|| magnitude.strip_prefix("0X"))
        {
            (16, hex)
        } else if let Some(octal) = magnitude.strip_prefix('0').filter(|rest| !rest.is_empty()) {
            (8, octal)
        } else {
            (10, magnitude)
        };
        if digits.starts_with(['+', '-']) {
            return Err(invalid());
        }
        let value = sign * i64::from_str_radix(digits, radix).map_err(|_| invalid())?;
        let tag = match value {
            0..=0x7FFF_FFFF => u32::try_from(value).ok().map(Self::Char),
            -0x8000_0000..=-2 => u32::try_from(-value).ok().map(Self::Info),
            _ => None,
        };
        tag.ok_or(MalformedFontError::CharacterCodeOutOfRange(value))
    }
}

/// The multi-row picture of one character
///
/// Rows are stored as found in the font with their endmarks removed; hardblanks are kept and only
/// become blanks when rendered. Widths are counted in columns: one per UTF-8 character when every
/// row is valid UTF-8, one per byte otherwise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Glyph {
    rows: Vec<Vec<u8>>,
    width: usize,
    is_utf8: bool,
}

impl Glyph {
    /// The rows, top to bottom. There are always exactly [`FontTable::height`] of them.
    #[must_use]
    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    /// The printable column count of the longest row.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// The number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if every row is valid UTF-8.
    #[must_use]
    pub const fn is_utf8(&self) -> bool {
        self.is_utf8
    }

    pub(crate) fn from_rows(rows: Vec<Vec<u8>>) -> Self {
        let is_utf8 = rows.iter().all(|row| row.is_utf8());
        let width = rows
            .iter()
            .map(|row| row.sub_chars(is_utf8).len())
            .max()
            .unwrap_or(0);
        Self {
            rows,
            width,
            is_utf8,
        }
    }

    /// Every row split into columns and padded with blanks to [`Glyph::width`].
    pub(crate) fn sub_char_rows(&self) -> impl Iterator<Item = Vec<&[u8]>> {
        self.rows.iter().map(|row| {
            let mut sub_chars = row.sub_chars(self.is_utf8);
            sub_chars.resize(self.width, b" ");
            sub_chars
        })
    }

    /// Builds a glyph from its raw lines. Each line ends in a run of one repeated endmark
    /// (usually `@`, doubled on the last row) that is stripped.
    pub(crate) fn parse(
        lines: &[&[u8]],
        code: u32,
        header: &Header,
        warnings: &mut Vec<FontWarning>,
    ) -> Result<Self, MalformedFontError> {
        let height = header.height.get();
        if lines.len() != height {
            return Err(MalformedFontError::TruncatedGlyph {
                code,
                expected: height,
                found: lines.len(),
            });
        }
        let mut longest = 0;
        let mut blank_endmark = false;
        let mut rows = Vec::with_capacity(height);
        for line in lines {
            let sub_chars = line.sub_chars(line.is_utf8());
            let Some(&endmark) = sub_chars.last() else {
                return Err(MalformedFontError::MissingEndmark(code));
            };
            blank_endmark |= endmark == b" ";
            longest = longest.max(sub_chars.len());
            let marks = sub_chars
                .iter()
                .rev()
                .take_while(|&&sub_char| sub_char == endmark)
                .count();
            let content: usize = sub_chars[..sub_chars.len() - marks]
                .iter()
                .map(|sub_char| sub_char.len())
                .sum();
            rows.push(line[..content].to_vec());
        }
        if longest > header.max_length {
            warnings.push(FontWarning::RowTooLong {
                code,
                length: longest,
                max_length: header.max_length,
            });
        }
        if blank_endmark {
            warnings.push(FontWarning::BlankEndmark(code));
        }

        let glyph = Self::from_rows(rows);
        let ragged = !glyph
            .rows
            .iter()
            .map(|row| row.sub_chars(glyph.is_utf8).len())
            .all_equal();
        if ragged {
            warnings.push(FontWarning::RaggedGlyph(code));
        }
        Ok(glyph)
    }
}

/// `'A'` style for characters, the number otherwise.
fn describe(code: u32) -> String {
    char::from_u32(code).map_or_else(|| format!("code {code}"), |c| format!("{c:?}"))
}

/// A font that does not conform to the FIGfont structure
#[derive(Debug, Error)]
pub enum MalformedFontError {
    /// The first line is not a valid header.
    #[error("bad header: {0}")]
    Header(#[from] HeaderError),
    /// The data ends inside the comment block.
    #[error("font ends after {found} of {expected} comment lines")]
    TruncatedComments {
        /// The number of comment lines declared in the header
        expected: usize,
        /// The number of lines actually present
        found: usize,
    },
    /// A glyph block has fewer rows than the font height.
    #[error("glyph for {} has {found} rows, expected {expected}", describe(*.code))]
    TruncatedGlyph {
        /// The character code of the incomplete glyph
        code: u32,
        /// The height declared in the header
        expected: usize,
        /// The number of rows actually present
        found: usize,
    },
    /// An empty line inside a glyph block: every row needs at least an endmark.
    #[error("glyph for {} has a row without endmark", describe(*.0))]
    MissingEndmark(u32),
    /// A code tag that is not a number.
    #[error(r#""{0}" is not a character code"#)]
    InvalidCharacterCode(BString),
    /// A code tag outside `0..=2147483647` and `-2147483648..=-2`.
    #[error("character code {0} is out of range")]
    CharacterCodeOutOfRange(i64),
}

/// A non-fatal issue with a FIGfont found while decoding
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum FontWarning {
    /// The baseline field is not a number.
    #[error(r#"baseline "{0}" is not a number"#)]
    UnparsableBaseline(BString),
    /// The baseline is not within `1..=height`.
    #[error("baseline {baseline} is outside 1..={height}")]
    BaselineOutOfRange {
        /// The declared baseline
        baseline: usize,
        /// The declared height
        height: usize,
    },
    /// The font ends before all 102 standard characters are defined.
    #[error("only {0} of the 102 standard characters are defined")]
    ShortStandardSet(usize),
    /// Fewer code-tagged blocks than the header declares.
    #[error("found {found} code-tagged blocks, header declares {declared}")]
    MissingTaggedBlocks {
        /// Blocks actually present
        found: usize,
        /// `Codetag_Count` from the header
        declared: usize,
    },
    /// A glyph has rows of different widths; short rows are padded when rendered.
    #[error("rows of the glyph for {} differ in width", describe(*.0))]
    RaggedGlyph(u32),
    /// A raw row, endmarks included, is longer than the header's `Max_Length`.
    #[error("glyph for {} has a row of length {length}, more than {max_length}", describe(*.code))]
    RowTooLong {
        /// The character code
        code: u32,
        /// Length of the longest raw row
        length: usize,
        /// `Max_Length` from the header
        max_length: usize,
    },
    /// A row uses a blank as endmark, which is likely trailing whitespace.
    #[error("glyph for {} uses a blank as endmark", describe(*.0))]
    BlankEndmark(u32),
    /// Some glyphs are not valid UTF-8, so their widths are counted in bytes.
    #[error("{0} glyphs are not valid UTF-8, their widths count bytes")]
    NotUtf8(usize),
}
