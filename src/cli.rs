use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfile")]
#[command(about = "PDF and image toolkit for the command line, Explorer and MCP clients")]
#[command(version)]
pub struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every command that writes a file.
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output file (default: derived from the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Overwrite the output file if it exists
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Combine PDFs (or the PDFs in a directory) into one
    Merge {
        /// PDF files or directories, merged in order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Convert a PDF's text into a Word document
    ToWord {
        /// PDF file to convert
        path: PathBuf,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Stamp a signature image onto a PDF
    #[command(disable_help_flag = true)]
    Sign {
        /// PDF file to sign
        pdf: PathBuf,

        /// Signature image (png, jpg, gif, webp)
        signature: PathBuf,

        /// Left edge in points (default: right-aligned)
        #[arg(long)]
        x: Option<f32>,

        /// Bottom edge in points (default: bottom margin)
        #[arg(long)]
        y: Option<f32>,

        /// Width in points (default: up to 150, 30% of the page)
        #[arg(short, long)]
        width: Option<f32>,

        /// Height in points (default: keeps aspect ratio)
        #[arg(short, long)]
        height: Option<f32>,

        /// Opacity between 0 and 1
        #[arg(long)]
        opacity: Option<f32>,

        /// Pages to sign: "all" or a list like "1,3" (default: last)
        #[arg(short, long)]
        pages: Option<String>,

        /// Use the image as-is
        #[arg(long)]
        no_remove_bg: bool,

        /// Background color tolerance, percent
        #[arg(long, default_value = "10")]
        fuzz: f32,

        /// Edge softening, 0-100
        #[arg(long, default_value = "20")]
        feather: f32,

        /// Output file (default: derived from the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite the output file if it exists
        #[arg(long)]
        yes: bool,

        /// Print help
        #[arg(long, action = clap::ArgAction::Help)]
        help: Option<bool>,
    },

    /// Write today's date onto PDF pages
    InsertDate {
        /// PDF file to annotate
        path: PathBuf,

        /// Left edge in points
        #[arg(long)]
        x: Option<f32>,

        /// Baseline in points
        #[arg(long)]
        y: Option<f32>,

        /// Font size
        #[arg(short, long)]
        size: Option<f32>,

        /// Date format: us, eu, iso or long
        #[arg(short, long)]
        format: Option<String>,

        /// Pages to annotate: "all" or a list like "1,3" (default: last)
        #[arg(short, long)]
        pages: Option<String>,

        /// Output file (default: derived from the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite the output file if it exists
        #[arg(long)]
        yes: bool,
    },

    /// Delete pages from a PDF
    RemovePages {
        /// PDF file to edit
        path: PathBuf,

        /// Pages to remove, e.g. "2,5"
        #[arg(short, long)]
        pages: Option<String>,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Put a PDF's pages in a new order
    ReorderPages {
        /// PDF file to edit
        path: PathBuf,

        /// New order naming every page once, e.g. "3,1,2"
        #[arg(short = 'p', long = "pages")]
        order: Option<String>,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Make an image's background transparent (needs ImageMagick)
    RemoveBg {
        /// Image file
        path: PathBuf,

        /// Background color
        #[arg(long, default_value = "white")]
        color: String,

        /// Color tolerance, percent
        #[arg(long, default_value = "10")]
        fuzz: f32,

        /// Edge softening, 0-100
        #[arg(long, default_value = "20")]
        feather: f32,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Apply an ImageMagick filter to an image
    Filter {
        /// Image file
        path: PathBuf,

        /// Filter name (grayscale, sepia, blur, sharpen, ...)
        name: String,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Show the configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    /// Write the .reg file that adds the Explorer context menu
    Install {
        /// Where to write the .reg files (default: the pdfile config directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Write the .reg file that removes the Explorer context menu
    Uninstall {
        /// Where to write the .reg file (default: the pdfile config directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Run as MCP server
    Mcp,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Restore the default configuration
    Reset,
}
