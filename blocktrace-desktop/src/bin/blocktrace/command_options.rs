//! Command line option parsing.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use clap::builder::TypedValueParser as _;

use blocktrace_desktop::SettingsArgs;
use blocktrace_desktop::logging::LoggingArgs;

#[derive(Clone, Debug, Parser)]
#[command(
    name = crate::TITLE, author, about, version,
    help_template = "\
{name} {version}
{author}
{about-with-newline}
{usage-heading}
    {usage}

{all-args}{after-help}",
)]
pub(crate) struct BlocktraceArgs {
    /// Scene description file (JSON) to render.
    #[arg(value_name = "FILE")]
    pub(crate) scene_file: PathBuf,

    /// Output file name. Must end in “.png”.
    #[arg(
        long = "output",
        short = 'o',
        value_name = "FILE",
        value_parser = clap::builder::PathBufValueParser::new().try_map(|value| {
            check_output_format(&value)?;
            Ok::<PathBuf, &str>(value)
        }),
    )]
    pub(crate) output_file: PathBuf,

    /// Number of samples to take per pixel.
    #[arg(long = "passes", short = 'p', default_value_t = 16, value_name = "N")]
    pub(crate) passes: u32,

    /// Image size, overriding the size given in the scene file.
    #[arg(long = "size", value_name = "W×H")]
    pub(crate) size: Option<ImageSizeArg>,

    /// Write a quick unlit preview instead of path tracing.
    #[arg(long)]
    pub(crate) preview: bool,

    /// Brightness multiplier applied when converting the traced image to 8-bit color.
    #[arg(long = "exposure", default_value_t = 1.0, value_name = "X")]
    pub(crate) exposure: f32,

    #[command(flatten)]
    pub(crate) logging: LoggingArgs,

    #[command(flatten)]
    pub(crate) settings: SettingsArgs,
}

/// Image size in pixels.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct ImageSizeArg(pub [usize; 2]);

impl FromStr for ImageSizeArg {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let dims: [usize; 2] = s
            .split(&['×', 'x', ',', ';', ' '][..])
            .map(|s| {
                match s.parse::<usize>() {
                    Ok(i) if i > 0 => Ok(i),
                    _ => Err(format!("{s:?} not a positive integer")),
                }
            })
            .collect::<Result<Vec<usize>, String>>()?
            .try_into()
            .map_err(|_| String::from("must be two integers"))?;
        Ok(ImageSizeArg(dims))
    }
}

fn check_output_format(output_path: &std::path::Path) -> Result<(), &'static str> {
    match output_path.extension().and_then(|e| e.to_str()) {
        Some("png" | "PNG") => Ok(()),
        _ => Err("file name must have the extension 'png'"),
    }
}
