use librpf::PixelRect;
use rpftool::{frame_to_image, print_info, window_to_image};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

#[cfg(not(debug_assertions))]
const DEFAULT_DEBUG_LEVEL: u8 = 1;
#[cfg(debug_assertions)]
const DEFAULT_DEBUG_LEVEL: u8 = 99;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Turn debugging information on
    #[arg(short, long, default_value_t = DEFAULT_DEBUG_LEVEL, action = clap::ArgAction::Count)]
    verbosity: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// renders a pixel window of a frame library to a PNG
    #[command(name = "rpfimg")]
    WindowToImage {
        /// The catalog manifest
        manifest_file: PathBuf,

        /// Pixel window as `x0,y0,x1,y1`; the whole mosaic when omitted
        #[arg(short, long)]
        window: Option<String>,

        /// The output file name
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// renders a single frame file to a PNG
    #[command(name = "frameimg")]
    FrameToImage {
        /// The frame file
        frame_file: PathBuf,

        /// The output file name
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// prints the structure of a frame file or catalog manifest
    #[command(name = "info")]
    Info {
        /// A frame file or catalog manifest
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbosity {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_file(true)
        .with_line_number(true)
        .init();

    match cli.command {
        Commands::WindowToImage {
            manifest_file,
            window,
            output,
        } => {
            let window = window.as_deref().map(parse_window).transpose()?;
            let output = match output {
                Some(o) => o,
                None => default_output(&manifest_file)?,
            };
            window_to_image(&manifest_file, window, &output)?;
        }
        Commands::FrameToImage { frame_file, output } => {
            let output = match output {
                Some(o) => o,
                None => default_output(&frame_file)?,
            };
            frame_to_image(&frame_file, &output)?;
        }
        Commands::Info { file } => {
            print_info(&file)?;
        }
    }
    Ok(())
}

fn default_output(input: &Path) -> Result<PathBuf> {
    let mut output = PathBuf::new();
    let Some(dir) = input.parent() else {
        bail!("Invalid input file");
    };
    let Some(Some(filename)) = input.file_stem().map(|os| os.to_str()) else {
        bail!("Invalid input file");
    };
    output.push(dir);
    output.push(format!("{}.png", filename));
    info!("output name: {}", output.display());
    Ok(output)
}

fn parse_window(text: &str) -> Result<PixelRect> {
    let corners = text
        .split(',')
        .map(|part| part.trim().parse::<i64>())
        .collect::<Result<Vec<_>, _>>()?;
    let [x0, y0, x1, y1] = corners.as_slice() else {
        bail!("window must be x0,y0,x1,y1");
    };
    if x1 < x0 || y1 < y0 {
        bail!("window corners are reversed");
    }
    Ok(PixelRect::new(*x0, *y0, *x1, *y1))
}
