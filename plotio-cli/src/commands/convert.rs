//! plotio convert command - load a file and write its surface elsewhere.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use plotio_io::{load_file, write, LoadOptions};
use plotio_visualization::{printc, PrintOptions, TermColor};

use super::info::describe;
use crate::Cli;

pub fn run(input: &Path, output: &Path, options: &LoadOptions, cli: &Cli) -> Result<()> {
    let actor =
        load_file(input, options).with_context(|| format!("Failed to load {:?}", input))?;

    write(&actor, output).with_context(|| format!("Failed to write {:?}", output))?;

    if !cli.quiet {
        printc(
            [format!("Converted {} to {}", input.display(), output.display())],
            &PrintOptions::colored(TermColor::Green),
        );
        println!("  {}: {}", "Geometry".cyan(), describe(&actor.geometry));
    }
    Ok(())
}
