//! A crate for parsing FIGfonts and rendering text as multi-line banners.
//!
//! A [`FontTable`](crate::font::FontTable) is parsed once from the raw contents of an `.flf` file
//! and can then be used for any number of renders. Rendering is a pure function of the text, the
//! settings and the font; it never fails.
//!
//! # Features
//!
//! - Left, center and right alignment for multi-line output
//!   ([`Alignment`](crate::render::Alignment))
//! - Line breaking depending on a maximum width, at word or character boundaries
//!   ([`WrapPolicy`](crate::render::WrapPolicy))
//! - Optional horizontal kerning ([`LayoutMode::Fitting`](crate::render::LayoutMode::Fitting))
//! - Right-to-left fonts ([`PrintDirection`](crate::font::PrintDirection))
//! - Code-tagged characters beyond the standard set
//!
//! # Example
//!
//! ```
//! # use figbanner::font::FontTable;
//! # use figbanner::render::{Alignment, LINE_ENDING};
//! let source = concat!(
//!     "flf2a$ 2 2 4 -1 1\n",
//!     "A two-row font with a blank, A and B only\n",
//!     "$$@\n$$@@\n",
//! );
//! let mut source = source.to_owned();
//! for _ in '!'..='@' {
//!     source.push_str("@\n@@\n");
//! }
//! source.push_str("/\\@\n--@@\n[]@\n[]@@\n");
//! let font = FontTable::parse(&source).unwrap();
//!
//! let rendered = figbanner::render("AB\nA", Alignment::Center, &font);
//! assert_eq!(rendered, [r"/\[]", "--[]", r" /\", " --"].join(LINE_ENDING));
//! ```

pub mod font;
pub mod render;
mod str_ext;

use font::FontTable;
use render::{Alignment, RenderRequest};

/// Renders `text` with the given alignment and otherwise default settings.
///
/// Shorthand for a [`RenderRequest`]; use [`BannerRenderer`](crate::render::BannerRenderer) for
/// the remaining settings.
#[must_use]
pub fn render(text: &str, alignment: Alignment, font: &FontTable) -> String {
    RenderRequest {
        text,
        alignment,
        font,
    }
    .render()
}
