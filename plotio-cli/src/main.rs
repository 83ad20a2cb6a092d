//! plotio: inspect and convert mesh, volume and point-cloud files.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output:
//! - `RUST_LOG=plotio_io=info` - files loaded and saved
//! - `RUST_LOG=plotio_algorithms=debug` - cleaning and iso-surfacing details
//! - `RUST_LOG=debug` - All debug output
//!
//! # Example
//!
//! ```bash
//! plotio info head.slc --threshold 80 --connectivity
//! plotio convert brain.neutral -o brain.vtk
//! plotio neutral2xml brain.neutral brain.xml
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use plotio_core::Color;
use plotio_io::{Legend, LoadOptions};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{convert, info, neutral2xml};

/// plotio - load, inspect and convert 3D data files.
#[derive(Parser)]
#[command(name = "plotio")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Load files or whole directories and describe what was loaded
    Info {
        /// Input files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        load: LoadArgs,
    },

    /// Load a file and write its surface in another format
    Convert {
        /// Input file
        input: PathBuf,

        /// Output file path (format determined by its name)
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        load: LoadArgs,
    },

    /// Convert a neutral tetrahedral mesh to Dolfin XML
    #[command(name = "neutral2xml")]
    Neutral2Xml {
        /// Input neutral file
        input: PathBuf,

        /// Output XML file; only parses the input when omitted
        output: Option<PathBuf>,
    },
}

/// Loader settings shared by the commands that read files
#[derive(Args, Debug, Clone)]
pub struct LoadArgs {
    /// Surface color: a name, `#rrggbb`, a palette index or `r,g,b`
    #[arg(long)]
    color: Option<Color>,

    /// Opacity between 0 and 1
    #[arg(long, default_value = "1.0")]
    alpha: f32,

    /// Draw surfaces as wireframes
    #[arg(long)]
    wireframe: bool,

    /// Color of back faces, in any form `--color` accepts
    #[arg(long)]
    backface_color: Option<Color>,

    /// Show edges; tetrahedral meshes also load their cells
    #[arg(long)]
    edges: bool,

    /// Texture image or texture name applied to surfaces
    #[arg(long)]
    texture: Option<String>,

    /// Use the file name as legend
    #[arg(long)]
    legend: bool,

    /// Iso level for volumes (automatic by default)
    #[arg(long)]
    threshold: Option<f32>,

    /// Gaussian smoothing of volumes, in voxels
    #[arg(long)]
    smoothing: Option<f32>,

    /// Keep only the largest connected surface region of volumes
    #[arg(long)]
    connectivity: bool,

    /// Per-axis scaling of volume surfaces
    #[arg(long, num_args = 3, value_names = ["SX", "SY", "SZ"], action = clap::ArgAction::Set)]
    scaling: Option<Vec<f32>>,
}

impl LoadArgs {
    pub fn to_options(&self) -> LoadOptions {
        let mut options = LoadOptions::default()
            .with_alpha(self.alpha)
            .with_wireframe(self.wireframe)
            .with_edges(self.edges)
            .with_connectivity(self.connectivity);
        if let Some(color) = self.color {
            options = options.with_color(color);
        }
        if let Some(color) = self.backface_color {
            options = options.with_backface_color(color);
        }
        if let Some(texture) = &self.texture {
            options = options.with_texture(texture.clone());
        }
        if let Some(&[sx, sy, sz]) = self.scaling.as_deref() {
            options = options.with_scaling([sx, sy, sz]);
        }
        if self.legend {
            options = options.with_legend(Legend::FileName);
        }
        if let Some(threshold) = self.threshold {
            options = options.with_threshold(threshold);
        }
        if let Some(sigma) = self.smoothing {
            options = options.with_smoothing(sigma);
        }
        options
    }
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // RUST_LOG wins over the -v flags
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "plotio_io=info,plotio_algorithms=info,plotio_visualization=info",
            2 => "plotio_io=debug,plotio_algorithms=debug,plotio_visualization=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Info { inputs, load } => info::run(inputs, &load.to_options(), &cli),
        Commands::Convert {
            input,
            output,
            load,
        } => convert::run(input, output, &load.to_options(), &cli),
        Commands::Neutral2Xml { input, output } => neutral2xml::run(input, output.as_deref(), &cli),
    };

    if let Err(e) = &result {
        if !cli.quiet {
            eprintln!("{}: {}", "Error".red().bold(), e);
            for cause in e.chain().skip(1) {
                eprintln!("  {}: {}", "Caused by".yellow(), cause);
            }
        }
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_load_args_map_to_options() {
        let cli = Cli::try_parse_from([
            "plotio",
            "convert",
            "head.slc",
            "-o",
            "head.vtk",
            "--threshold",
            "80",
            "--connectivity",
            "--legend",
            "--color",
            "red",
        ])
        .unwrap();
        let Commands::Convert { load, output, .. } = cli.command else {
            panic!("expected convert");
        };
        let options = load.to_options();
        assert_eq!(output, PathBuf::from("head.vtk"));
        assert_eq!(options.threshold, Some(80.0));
        assert!(options.connectivity);
        assert_eq!(options.legend, Legend::FileName);
        assert_eq!(options.color, Color::from_rgb8([255, 0, 0]));
        assert_eq!(options.smoothing, None);
        assert!(!options.wireframe);
        assert_eq!(options.scaling, None);
    }

    #[test]
    fn test_surface_and_scaling_flags() {
        let cli = Cli::try_parse_from([
            "plotio",
            "info",
            "head.slc",
            "--wireframe",
            "--backface-color",
            "blue",
            "--texture",
            "wood.png",
            "--scaling",
            "2",
            "1",
            "0.5",
        ])
        .unwrap();
        let Commands::Info { load, .. } = cli.command else {
            panic!("expected info");
        };
        let options = load.to_options();
        assert!(options.wireframe);
        assert_eq!(options.backface_color, Some(Color::from_rgb8([0, 0, 255])));
        assert_eq!(options.texture.as_deref(), Some("wood.png"));
        assert_eq!(options.scaling, Some([2.0, 1.0, 0.5]));

        assert!(Cli::try_parse_from(["plotio", "info", "a.slc", "--scaling", "2", "1"]).is_err());
    }

    #[test]
    fn test_info_requires_input() {
        assert!(Cli::try_parse_from(["plotio", "info"]).is_err());
    }
}
