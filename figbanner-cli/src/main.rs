//! Command line interface for rendering banners with FIGfonts.

mod fonts;
mod options;

use std::fmt::{self, Display};
use std::fs;
use std::io::{self, Read as _, Write};
use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};
use clap::{ArgAction, Parser, ValueEnum};
use figbanner::font::{FontTable, PrintDirection};
use figbanner::render::{BannerRenderer, LINE_ENDING, LayoutMode, WrapPolicy};
use flexi_logger::{Logger, LoggerHandle};

use crate::fonts::{FontDirectory, read_font};
use crate::options::Options;

const DEFAULT_FONT: &str = "standard";

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _logger = init_logging(cli.verbose);

    let mut options = Options::load().unwrap_or_else(|err| {
        log::warn!("ignoring stored options: {err:#}");
        Options::default()
    });
    if let Some(dir) = &cli.fonts_dir {
        options.fonts_dir = Some(dir.clone());
    }

    if let Some(identifier) = run(&cli, &options, &mut io::stdout().lock())? {
        options.last_font = Some(identifier);
        if let Err(err) = options.save() {
            log::warn!("could not save options: {err:#}");
        }
    }
    Ok(())
}

/// Handles one invocation. Returns the identifier of the font a banner was rendered with, if any.
fn run(cli: &Cli, options: &Options, out: &mut impl Write) -> Result<Option<String>> {
    let directory = options.fonts_dir.as_ref().map(FontDirectory::new);

    if cli.list_fonts {
        let Some(directory) = &directory else {
            bail!("no fonts directory set (see --fonts-dir)");
        };
        for font in directory.list()? {
            writeln!(out, "{font}")?;
        }
        return Ok(None);
    }

    let identifier = cli
        .font
        .as_deref()
        .or(options.last_font.as_deref())
        .unwrap_or(DEFAULT_FONT)
        .to_owned();
    let font = load_font(&identifier, directory.as_ref())?;

    if cli.info {
        print_info(out, &identifier, &font)?;
        return Ok(None);
    }

    let text = cli.text()?;
    let mut rendered: Vec<u8> = cli.renderer(&font).render(&text);
    rendered.extend_from_slice(LINE_ENDING.as_bytes());
    if let Some(path) = &cli.output {
        fs::write(path, &rendered)
            .with_context(|| format!("cannot write banner to {}", path.display()))?;
        log::info!("saved banner to {}", path.display());
    } else {
        out.write_all(&rendered)?;
    }
    Ok(Some(identifier))
}

fn load_font(identifier: &str, directory: Option<&FontDirectory>) -> Result<FontTable> {
    let bytes = read_font(identifier, directory)?;
    let (font, warnings) = FontTable::parse_with_warnings(bytes)
        .with_context(|| format!("cannot parse font {identifier}"))?;
    for warning in warnings {
        log::warn!("{identifier}: {warning}");
    }
    Ok(font)
}

fn init_logging(verbose: u8) -> Option<LoggerHandle> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    match Logger::try_with_env_or_str(level).and_then(|logger| logger.log_to_stderr().start()) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("failed to initialize logging: {err}");
            None
        }
    }
}

fn print_info(out: &mut impl Write, identifier: &str, font: &FontTable) -> Result<()> {
    let header = font.header();
    writeln!(out, "font: {identifier}")?;
    writeln!(out, "hardblank: {:?}", char::from(header.hardblank.byte()))?;
    writeln!(out, "height: {}", header.height)?;
    match header.baseline {
        Some(baseline) => writeln!(out, "baseline: {baseline}")?,
        None => writeln!(out, "baseline: invalid")?,
    }
    writeln!(out, "max length: {}", header.max_length)?;
    writeln!(out, "layout: {:?}", header.layout)?;
    writeln!(out, "print direction: {:?}", header.print_direction)?;
    writeln!(out, "characters: {}", font.len())?;
    writeln!(out, "widest character: {}", font.max_width())?;
    if !font.comments().is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", font.comments())?;
    }
    Ok(())
}

/// Render text as a banner using a FIGfont
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// The text to render; read from --input or stdin if omitted
    text: Option<String>,
    /// Read the text to render from a file
    #[arg(short, long, conflicts_with = "text")]
    input: Option<PathBuf>,
    /// Font name in the fonts directory, or path to an .flf file
    #[arg(short, long)]
    font: Option<String>,
    /// Directory to look fonts up in (remembered for later runs)
    #[arg(long)]
    fonts_dir: Option<PathBuf>,
    /// How lines narrower than the banner are aligned
    #[arg(short = 'j', long = "align", default_value_t)]
    alignment: Alignment,
    /// Output width in columns; centered and right-aligned lines are padded to it, longer lines
    /// are wrapped
    #[arg(short, long, default_value_t = 80)]
    width: usize,
    /// Where lines wider than --width are broken
    #[arg(long, default_value_t)]
    wrap: Wrap,
    /// Slide glyphs together until they touch
    #[arg(short, long)]
    kerning: bool,
    /// Override the font's print direction
    #[arg(short, long)]
    direction: Option<Direction>,
    /// Save the banner to a file instead of printing it
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// List the fonts in the fonts directory and exit
    #[arg(long, conflicts_with_all = ["text", "input", "font", "info"])]
    list_fonts: bool,
    /// Print the font's header and comments instead of rendering
    #[arg(long)]
    info: bool,
    /// Log more (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn text(&self) -> Result<String> {
        if let Some(text) = &self.text {
            return Ok(text.clone());
        }
        if let Some(path) = &self.input {
            return fs::read_to_string(path)
                .with_context(|| format!("cannot read text from {}", path.display()));
        }
        let mut text = String::new();
        let _bytes_read = io::stdin()
            .read_to_string(&mut text)
            .context("cannot read text from stdin")?;
        Ok(text)
    }

    fn renderer<'font>(&self, font: &'font FontTable) -> BannerRenderer<'font> {
        let mut renderer = BannerRenderer::new(font)
            .alignment(self.alignment.into())
            .wrap(self.wrap.into())
            .max_width(self.width);
        if self.kerning {
            renderer = renderer.layout(LayoutMode::Fitting);
        }
        if let Some(direction) = self.direction {
            renderer = renderer.print_direction(direction.into());
        }
        renderer
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum Direction {
    LeftToRight,
    RightToLeft,
}

impl From<Direction> for PrintDirection {
    fn from(value: Direction) -> Self {
        match value {
            Direction::LeftToRight => Self::LeftToRight,
            Direction::RightToLeft => Self::RightToLeft,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum, Default)]
#[value(rename_all = "kebab-case")]
enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl From<Alignment> for figbanner::render::Alignment {
    fn from(value: Alignment) -> Self {
        match value {
            Alignment::Left => Self::Left,
            Alignment::Center => Self::Center,
            Alignment::Right => Self::Right,
        }
    }
}

impl Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Center => write!(f, "center"),
            Self::Right => write!(f, "right"),
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum, Default)]
#[value(rename_all = "kebab-case")]
enum Wrap {
    #[default]
    Word,
    Character,
}

impl From<Wrap> for WrapPolicy {
    fn from(value: Wrap) -> Self {
        match value {
            Wrap::Word => Self::Word,
            Wrap::Character => Self::Character,
        }
    }
}

impl Display for Wrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Word => write!(f, "word"),
            Self::Character => write!(f, "character"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;
    use std::fs;

    use clap::{CommandFactory as _, Parser as _};
    use figbanner::font::FontTable;
    use figbanner::render::{Alignment as RenderAlignment, LINE_ENDING};

    use super::{Alignment, Cli, FontDirectory, Options, Wrap, load_font, run};

    const FONT: &str = "flf2a$ 1 1 4 -1 0\n$@@\n!@@\n";

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["figbanner", "hello"]).unwrap();
        assert_eq!(cli.text.as_deref(), Some("hello"));
        assert!(matches!(cli.alignment, Alignment::Left));
        assert!(matches!(cli.wrap, Wrap::Word));
        assert_eq!(cli.width, 80);
        assert!(!cli.kerning);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn parses_settings() {
        let cli = Cli::try_parse_from([
            "figbanner", "-j", "center", "-w", "40", "--wrap", "character", "-k", "-vv", "hi",
        ])
        .unwrap();
        assert_eq!(RenderAlignment::from(cli.alignment), RenderAlignment::Center);
        assert!(matches!(cli.wrap, Wrap::Character));
        assert_eq!(cli.width, 40);
        assert!(cli.kerning);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn text_and_input_conflict() {
        assert!(Cli::try_parse_from(["figbanner", "--input", "a.txt", "hi"]).is_err());
        assert!(Cli::try_parse_from(["figbanner", "--list-fonts", "hi"]).is_err());
        assert!(Cli::try_parse_from(["figbanner", "-j", "justify", "hi"]).is_err());
    }

    #[test]
    fn renders_with_settings() {
        let font = FontTable::parse(FONT).unwrap();
        let cli = Cli::try_parse_from(["figbanner", "-j", "right", "-w", "4", "!"]).unwrap();
        assert_eq!(cli.renderer(&font).render_lines("!\n!!"), ["   !", "  !!"]);
    }

    #[test]
    fn reads_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("text.txt");
        fs::write(&path, "!!\n").unwrap();
        let args = [OsStr::new("figbanner"), OsStr::new("--input"), path.as_os_str()];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.text().unwrap(), "!!\n");
    }

    #[test]
    fn loads_font_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bang.flf"), FONT).unwrap();
        fs::write(dir.path().join("broken.flf"), "flf2a$ 0 1 4 -1 0\n").unwrap();
        let directory = FontDirectory::new(dir.path());

        let font = load_font("bang", Some(&directory)).unwrap();
        assert_eq!(font.len(), 2);
        assert!(load_font("broken", Some(&directory)).is_err());
    }

    #[test]
    fn alignment_uses_default_width() {
        let font = FontTable::parse(FONT).unwrap();
        let right = Cli::try_parse_from(["figbanner", "-j", "right", "!"]).unwrap();
        assert_eq!(right.renderer(&font).render_lines("!"), [format!("{}!", " ".repeat(79))]);
        let center = Cli::try_parse_from(["figbanner", "-j", "center", "!"]).unwrap();
        assert_eq!(center.renderer(&font).render_lines("!"), [format!("{}!", " ".repeat(39))]);
        let left = Cli::try_parse_from(["figbanner", "!"]).unwrap();
        assert_eq!(left.renderer(&font).render_lines("!"), ["!"]);
    }

    #[test]
    fn only_rendering_remembers_the_font() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bang.flf"), FONT).unwrap();
        let options = Options {
            fonts_dir: Some(dir.path().to_owned()),
            last_font: None,
        };

        let mut out = Vec::new();
        let info = Cli::try_parse_from(["figbanner", "--info", "-f", "bang"]).unwrap();
        assert_eq!(run(&info, &options, &mut out).unwrap(), None);
        assert!(out.starts_with(b"font: bang\n"));

        out.clear();
        let list = Cli::try_parse_from(["figbanner", "--list-fonts"]).unwrap();
        assert_eq!(run(&list, &options, &mut out).unwrap(), None);
        assert_eq!(out, b"bang\n");

        out.clear();
        let render = Cli::try_parse_from(["figbanner", "-f", "bang", "!!"]).unwrap();
        assert_eq!(run(&render, &options, &mut out).unwrap().as_deref(), Some("bang"));
        assert_eq!(out, format!("!!{LINE_ENDING}").as_bytes());
    }
}
