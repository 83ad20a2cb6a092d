//! plotio neutral2xml command - rewrite a neutral mesh as Dolfin XML.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use plotio_io::convert_neutral_to_xml;

use crate::Cli;

pub fn run(input: &Path, output: Option<&Path>, cli: &Cli) -> Result<()> {
    let mesh = convert_neutral_to_xml(input, output)
        .with_context(|| format!("Failed to convert {:?}", input))?;

    if !cli.quiet {
        match output {
            Some(output) => println!("{} {}", "Written".green().bold(), output.display()),
            None => println!("{}", "Parsed (no output file given)".yellow()),
        }
        println!(
            "  {}: {} vertices, {} tetrahedra",
            "Mesh".cyan(),
            mesh.vertex_count(),
            mesh.cell_count()
        );
    }
    Ok(())
}
