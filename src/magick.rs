//! ImageMagick `convert` invocations for background removal and filters.
//!
//! Commands are argument vectors handed straight to the process, never a shell string.

use crate::error::PdfileError;
use std::path::Path;
use std::str::FromStr;
use tokio::process::Command;

pub const PROGRAM: &str = "convert";

const ANIMATED_EXTENSIONS: [&str; 4] = ["gif", "webp", "apng", "mng"];

/// True for formats that may carry several frames.
pub fn is_animated<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ANIMATED_EXTENSIONS
                .iter()
                .any(|a| a.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Map a 0-100 feather amount onto a 0.5-3.0 px alpha blur radius.
pub fn feather_radius(feather: f32) -> f32 {
    0.5 + feather.clamp(0.0, 100.0) / 100.0 * 2.5
}

/// The program commands run with: `convert`, or a stand-in for tests.
#[derive(Debug, Clone, PartialEq)]
pub struct Magick {
    program: String,
    leading: Vec<String>,
}

impl Default for Magick {
    fn default() -> Self {
        Magick {
            program: PROGRAM.to_string(),
            leading: Vec::new(),
        }
    }
}

impl Magick {
    /// A shell script that receives the command's arguments as `"$@"`.
    #[cfg(test)]
    pub fn shell(script: &str) -> Self {
        Magick {
            program: "sh".to_string(),
            leading: vec!["-c".to_string(), script.to_string(), PROGRAM.to_string()],
        }
    }

    pub async fn run(&self, command: &MagickCommand) -> Result<(), PdfileError> {
        tracing::debug!(program = %self.program, args = ?command.args, "running");

        let output = Command::new(&self.program)
            .args(&self.leading)
            .args(&command.args)
            .output()
            .await
            .map_err(|e| PdfileError::ExternalProcess {
                program: PROGRAM.to_string(),
                message: format!("could not start: {}", e),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(PdfileError::ExternalProcess {
                program: PROGRAM.to_string(),
                message: format!("{} {}", output.status, stderr.trim()),
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MagickCommand {
    args: Vec<String>,
}

impl MagickCommand {
    /// Start a command reading `input`, coalescing frames of animated formats.
    pub fn reading<P: AsRef<Path>>(input: P) -> Self {
        let input = input.as_ref();
        let mut command = MagickCommand {
            args: vec![input.display().to_string()],
        };
        if is_animated(input) {
            command = command.arg("-coalesce");
        }
        command
    }

    /// Start a command reading only the first frame of `input`.
    pub fn reading_first_frame<P: AsRef<Path>>(input: P) -> Self {
        MagickCommand {
            args: vec![format!("{}[0]", input.as_ref().display())],
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn writing<P: AsRef<Path>>(self, output: P) -> Self {
        self.arg(output.as_ref().display().to_string())
    }

    #[cfg(test)]
    pub fn as_args(&self) -> &[String] {
        &self.args
    }

    pub async fn run(&self) -> Result<(), PdfileError> {
        Magick::default().run(self).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundOptions {
    /// Color treated as background, in any form ImageMagick accepts.
    pub color: String,
    /// Color-distance tolerance, percent.
    pub fuzz: f32,
    /// Edge softening, 0-100.
    pub feather: f32,
    /// Border added for the flood-fill fallback, px.
    pub border: u32,
    /// Read only the first frame, so animated input yields one still image.
    pub first_frame: bool,
}

impl Default for BackgroundOptions {
    fn default() -> Self {
        BackgroundOptions {
            color: "white".to_string(),
            fuzz: 10.0,
            feather: 20.0,
            border: 1,
            first_frame: false,
        }
    }
}

impl BackgroundOptions {
    fn reading<P: AsRef<Path>>(&self, input: P) -> MagickCommand {
        if self.first_frame {
            MagickCommand::reading_first_frame(input)
        } else {
            MagickCommand::reading(input)
        }
    }
}

/// Key out the background color everywhere, then soften the alpha edge.
pub fn edge_aware_command<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: &BackgroundOptions,
) -> MagickCommand {
    options
        .reading(input)
        .args(["-alpha", "set"])
        .args(["-fuzz".to_string(), format!("{}%", options.fuzz)])
        .args(["-transparent".to_string(), options.color.clone()])
        .args(["-channel", "A", "-morphology", "Erode", "Diamond:1"])
        .args(["-blur".to_string(), format!("0x{}", feather_radius(options.feather))])
        .args(["-level", "50%,100%", "+channel"])
        .writing(output)
}

/// Flood-fill the background inward from an added border, then trim the border off.
pub fn border_fill_command<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: &BackgroundOptions,
) -> MagickCommand {
    let border = options.border.max(1);
    options
        .reading(input)
        .args(["-alpha", "set"])
        .args(["-bordercolor".to_string(), options.color.clone()])
        .args(["-border".to_string(), border.to_string()])
        .args(["-fill", "none"])
        .args(["-fuzz".to_string(), format!("{}%", options.fuzz)])
        .args(["-draw", "color 0,0 floodfill"])
        .args(["-shave".to_string(), format!("{}x{}", border, border)])
        .writing(output)
}

/// Make the background of `input` transparent, writing the result to `output`.
///
/// Falls back to a plain border flood-fill if the edge-aware pass fails.
pub async fn remove_background<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: &BackgroundOptions,
) -> Result<(), PdfileError> {
    remove_background_with(&Magick::default(), input.as_ref(), output.as_ref(), options).await
}

async fn remove_background_with(
    magick: &Magick,
    input: &Path,
    output: &Path,
    options: &BackgroundOptions,
) -> Result<(), PdfileError> {
    match magick.run(&edge_aware_command(input, output, options)).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::warn!(error = %e, "edge-aware background removal failed, trying border fill");
            magick
                .run(&border_fill_command(input, output, options))
                .await
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Grayscale,
    Sepia,
    Invert,
    Blur,
    Sharpen,
    Emboss,
    Edge,
    Charcoal,
    Sketch,
    Posterize,
}

impl Filter {
    pub const ALL: [Filter; 10] = [
        Filter::Grayscale,
        Filter::Sepia,
        Filter::Invert,
        Filter::Blur,
        Filter::Sharpen,
        Filter::Emboss,
        Filter::Edge,
        Filter::Charcoal,
        Filter::Sketch,
        Filter::Posterize,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Filter::Grayscale => "grayscale",
            Filter::Sepia => "sepia",
            Filter::Invert => "invert",
            Filter::Blur => "blur",
            Filter::Sharpen => "sharpen",
            Filter::Emboss => "emboss",
            Filter::Edge => "edge",
            Filter::Charcoal => "charcoal",
            Filter::Sketch => "sketch",
            Filter::Posterize => "posterize",
        }
    }

    fn args(self) -> &'static [&'static str] {
        match self {
            Filter::Grayscale => &["-colorspace", "Gray"],
            Filter::Sepia => &["-sepia-tone", "80%"],
            Filter::Invert => &["-negate"],
            Filter::Blur => &["-blur", "0x3"],
            Filter::Sharpen => &["-sharpen", "0x1"],
            Filter::Emboss => &["-emboss", "0x1"],
            Filter::Edge => &["-edge", "1"],
            Filter::Charcoal => &["-charcoal", "2"],
            Filter::Sketch => &["-sketch", "0x10+120"],
            Filter::Posterize => &["-posterize", "4"],
        }
    }
}

impl FromStr for Filter {
    type Err = PdfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        let wanted = match wanted.as_str() {
            "gray" | "greyscale" => "grayscale",
            "negate" => "invert",
            other => other,
        };
        Filter::ALL
            .into_iter()
            .find(|f| f.name() == wanted)
            .ok_or_else(|| PdfileError::UnknownFilter(s.to_string()))
    }
}

pub fn filter_command<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    filter: Filter,
) -> MagickCommand {
    MagickCommand::reading(input)
        .args(filter.args().iter().copied())
        .writing(output)
}

pub async fn apply_filter<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    filter: Filter,
) -> Result<(), PdfileError> {
    filter_command(input, output, filter).run().await
}
