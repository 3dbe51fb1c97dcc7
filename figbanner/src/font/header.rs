use std::num::NonZero;
use std::str::FromStr;

use bstr::{BString, ByteSlice as _};
use thiserror::Error;

use super::FontWarning;
use crate::render::{LayoutDecodeError, LayoutMode};

/// The signature every FIGfont header starts with, directly followed by the hardblank.
pub const SIGNATURE: &[u8] = b"flf2a";

/// The first line of a FIGfont.
///
/// ```text
/// flf2a$ 6 5 16 15 11 0 24463 229
/// ^^^^^^ ^ ^ ^^ ^^ ^^ ^ ^^^^^ ^^^
/// |    | | | |  |  |  | |     Codetag_Count
/// |    | | | |  |  |  | Full_Layout
/// |    | | | |  |  |  Print_Direction
/// |    | | | |  |  Comment_Lines
/// |    | | | |  Old_Layout
/// |    | | | Max_Length
/// |    | | Baseline
/// |    | Height
/// |    Hardblank
/// Signature
/// ```
///
/// Fields are separated by runs of whitespace. The last three are optional.
#[derive(Clone, Copy, Debug)]
pub struct Header {
    /// Placeholder byte for blanks that must not be kerned away.
    pub hardblank: Hardblank,
    /// Rows per glyph, the same for the whole font.
    pub height: NonZero<usize>,
    /// Rows from the top of a glyph down to the baseline. Informational only; `None` if the field
    /// is not a number.
    pub baseline: Option<usize>,
    /// Declared upper bound for raw row length, endmarks included.
    pub max_length: usize,
    /// Lines of free text between this header and the first glyph.
    pub comment_lines: usize,
    /// Layout the font was drawn for.
    pub layout: LayoutMode,
    /// Direction glyphs are laid out in unless the renderer overrides it.
    pub print_direction: PrintDirection,
    /// How many code-tagged blocks follow the standard glyphs.
    pub code_tag_count: usize,
}

impl Header {
    /// Parses the header line, reporting a bad baseline through `warnings` instead of failing.
    pub(crate) fn parse(line: &[u8], warnings: &mut Vec<FontWarning>) -> Result<Self, HeaderError> {
        let fields: Vec<&[u8]> = line.fields().collect();
        let Some((&first, numbers)) = fields.split_first() else {
            return Err(HeaderError::Empty);
        };
        let hardblank = first
            .strip_prefix(SIGNATURE)
            .ok_or_else(|| HeaderError::Signature(first.into()))
            .and_then(Hardblank::from_field)?;
        let [height, baseline, max_length, old_layout, comment_lines, optional @ ..] = numbers
        else {
            return Err(HeaderError::TooFewFields(fields.len()));
        };
        if optional.len() > 3 {
            log::debug!("ignoring {} extra header fields", optional.len() - 3);
        }

        let height = NonZero::new(number("Height", height)?).ok_or(HeaderError::ZeroHeight)?;
        let baseline = match number::<usize>("Baseline", baseline) {
            Ok(baseline) => {
                if baseline == 0 || baseline > height.get() {
                    warnings.push(FontWarning::BaselineOutOfRange {
                        baseline,
                        height: height.get(),
                    });
                }
                Some(baseline)
            }
            Err(_) => {
                warnings.push(FontWarning::UnparsableBaseline((*baseline).into()));
                None
            }
        };
        let full_layout = optional
            .get(1)
            .map(|field| number("Full_Layout", field))
            .transpose()?;
        let print_direction = match optional.first() {
            None => PrintDirection::LeftToRight,
            Some(field) => match number::<u8>("Print_Direction", field) {
                Ok(0) => PrintDirection::LeftToRight,
                Ok(1) => PrintDirection::RightToLeft,
                _ => return Err(HeaderError::PrintDirection((*field).into())),
            },
        };

        Ok(Self {
            hardblank,
            height,
            baseline,
            max_length: number("Max_Length", max_length)?,
            comment_lines: number("Comment_Lines", comment_lines)?,
            layout: LayoutMode::decode(number("Old_Layout", old_layout)?, full_layout)?,
            print_direction,
            code_tag_count: optional
                .get(2)
                .map_or(Ok(0), |field| number("Codetag_Count", field))?,
        })
    }
}

fn number<T: FromStr>(name: &'static str, field: &[u8]) -> Result<T, HeaderError> {
    field
        .to_str()
        .ok()
        .and_then(|text| text.parse().ok())
        .ok_or_else(|| HeaderError::Field {
            name,
            value: field.into(),
        })
}

/// Direction glyphs are laid out in
///
/// Right-to-left puts the first character of each line at the right end. Rows are always read
/// left to right.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PrintDirection {
    /// `0` in the header
    #[default]
    LeftToRight,
    /// `1` in the header
    RightToLeft,
}

/// The byte a font uses for blanks that stay visible during layout
///
/// Kerning cannot slide glyphs over a hardblank; in the rendered banner it is printed as `' '`.
/// Any single byte other than a blank, CR, LF or NUL is allowed. `$` is the common choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hardblank(u8);

impl Hardblank {
    fn from_field(field: &[u8]) -> Result<Self, HeaderError> {
        match field {
            [byte] if !matches!(byte, b' ' | b'\t' | b'\r' | b'\n' | 0) => Ok(Self(*byte)),
            _ => Err(HeaderError::Hardblank(field.into())),
        }
    }

    /// The raw byte.
    #[must_use]
    pub const fn byte(self) -> u8 {
        self.0
    }

    /// Whether a single sub-character (one byte, or one UTF-8 sequence) is this hardblank.
    #[must_use]
    pub fn is(self, sub_char: &[u8]) -> bool {
        sub_char == [self.0]
    }
}

/// Why a header line was rejected
#[derive(Debug, Error)]
pub enum HeaderError {
    /// The font data, or its first line, is empty.
    #[error("missing header")]
    Empty,
    /// The first field does not start with `flf2a`.
    #[error(r#"expected a header starting with "flf2a", found "{0}""#)]
    Signature(BString),
    /// The byte after the signature is missing, not a single byte, or a forbidden one.
    #[error(r#"invalid hardblank "{0}""#)]
    Hardblank(BString),
    /// Fewer than the six mandatory fields (signature through `Comment_Lines`).
    #[error("header has {0} fields, expected at least 6")]
    TooFewFields(usize),
    /// A numeric field does not parse.
    #[error("`{name}` is not a valid number: {value}")]
    Field {
        /// FIGfont name of the field
        name: &'static str,
        /// Raw contents
        value: BString,
    },
    /// `Height` is `0`.
    #[error("height must be at least 1")]
    ZeroHeight,
    /// `Print_Direction` is neither `0` nor `1`.
    #[error(r#"print direction "{0}" is neither 0 nor 1"#)]
    PrintDirection(BString),
    /// The layout fields are out of range.
    #[error(transparent)]
    Layout(#[from] LayoutDecodeError),
}

#[cfg(test)]
mod tests {
    use super::{Header, HeaderError, PrintDirection};
    use crate::font::FontWarning;
    use crate::render::LayoutMode;

    fn parse(line: &str) -> Result<Header, HeaderError> {
        Header::parse(line.as_bytes(), &mut Vec::new())
    }

    #[test]
    fn all_fields() {
        let mut warnings = Vec::new();
        let header = Header::parse(b"flf2a$ 6 5 16 15 11 0 24463 229", &mut warnings).unwrap();
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(header.hardblank.byte(), b'$');
        assert_eq!(header.height.get(), 6);
        assert_eq!(header.baseline, Some(5));
        assert_eq!(header.max_length, 16);
        assert_eq!(header.comment_lines, 11);
        assert_eq!(header.layout, LayoutMode::Smushing);
        assert_eq!(header.print_direction, PrintDirection::LeftToRight);
        assert_eq!(header.code_tag_count, 229);
    }

    #[test]
    fn optional_fields_default() {
        let header = parse("flf2a#   3 2 8 -1\t4").unwrap();
        assert_eq!(header.hardblank.byte(), b'#');
        assert_eq!(header.comment_lines, 4);
        assert_eq!(header.layout, LayoutMode::FullSize);
        assert_eq!(header.print_direction, PrintDirection::LeftToRight);
        assert_eq!(header.code_tag_count, 0);
    }

    #[test]
    fn right_to_left() {
        let header = parse("flf2a$ 2 2 8 0 0 1").unwrap();
        assert_eq!(header.print_direction, PrintDirection::RightToLeft);
        assert_eq!(header.layout, LayoutMode::Fitting);
    }

    #[test]
    fn too_few_fields() {
        assert!(matches!(parse("flf2a$"), Err(HeaderError::TooFewFields(1))));
        assert!(matches!(parse("flf2a$ 2 2 8 -1"), Err(HeaderError::TooFewFields(5))));
    }

    #[test]
    fn bad_height() {
        assert!(matches!(
            parse("flf2a$ tall 2 8 -1 0"),
            Err(HeaderError::Field { name: "Height", .. })
        ));
        assert!(matches!(parse("flf2a$ 0 0 8 -1 0"), Err(HeaderError::ZeroHeight)));
    }

    #[test]
    fn bad_hardblank() {
        for line in ["flf2a 2 2 8 -1 0", "flf2a$$ 2 2 8 -1 0", "flf2a\0 2 2 8 -1 0"] {
            assert!(matches!(parse(line), Err(HeaderError::Hardblank(_))), "{line:?}");
        }
    }

    #[test]
    fn bad_signature() {
        assert!(matches!(parse("tlf2a$ 2 2 8 -1 0"), Err(HeaderError::Signature(_))));
        assert!(matches!(parse("   "), Err(HeaderError::Empty)));
    }

    #[test]
    fn baseline_problems_are_warnings() {
        let mut warnings = Vec::new();
        let header = Header::parse(b"flf2a$ 2 x 8 -1 0", &mut warnings).unwrap();
        assert_eq!(header.baseline, None);
        assert_eq!(warnings, [FontWarning::UnparsableBaseline("x".into())]);

        warnings.clear();
        let header = Header::parse(b"flf2a$ 2 3 8 -1 0", &mut warnings).unwrap();
        assert_eq!(header.baseline, Some(3));
        assert_eq!(
            warnings,
            [FontWarning::BaselineOutOfRange {
                baseline: 3,
                height: 2
            }]
        );
    }

    #[test]
    fn bad_print_direction() {
        assert!(matches!(
            parse("flf2a$ 2 2 8 -1 0 2"),
            Err(HeaderError::PrintDirection(_))
        ));
    }

    #[test]
    fn bad_layout() {
        assert!(matches!(
            parse("flf2a$ 2 2 8 99 0"),
            Err(HeaderError::Layout(_))
        ));
    }
}
