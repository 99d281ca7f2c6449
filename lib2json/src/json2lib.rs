//! # json2lib
//!
//! JSON interchange to patched-Liberty converter.
//! This program is the sibling of lib2json.
//!

use clap::Parser;
use std::error::Error;

/// JSON interchange to patched-Liberty converter
#[derive(Parser)]
struct ProgramOptions {
    /// Original Liberty Input File
    #[clap(short = 'i', long, default_value = "")]
    lib: String,
    /// JSON Edit-Document File
    #[clap(short = 'e', long, default_value = "")]
    edits: String,
    /// Patched Liberty Output File
    #[clap(short = 'o', long, default_value = "")]
    out: String,
    /// Verbose Output Mode
    #[clap(short, long)]
    verbose: bool,
}

/// The main entry point.
/// All logic is offloaded to `_main` for sake of testing.
fn main() -> Result<(), Box<dyn Error>> {
    let options = ProgramOptions::parse();
    _main(&options)
}

/// All the real logic, with `ProgramOptions` argument for sake of testing
fn _main(options: &ProgramOptions) -> Result<(), Box<dyn Error>> {
    let stats = charlib21::patch(&options.lib, &options.edits, &options.out)?;

    if options.verbose {
        println!("read: {:?}", &options.lib);
        println!(
            "patched: {} cells, {} timing arcs, {} power arcs, {} leakage entries",
            stats.cells_matched,
            stats.timing_arcs_updated,
            stats.power_arcs_updated,
            stats.leakages_updated,
        );
        if stats.attr_failures > 0 {
            println!("abandoned {} attribute rewrites", stats.attr_failures);
        }
        println!("wrote: {:?}", &options.out);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn patch_is_idempotent() -> Result<(), Box<dyn Error>> {
        let lib = resource("sample.lib");
        let json = resource("sample.edit.json");
        let out1 = resource("sample.patched.lib");
        let out2 = resource("sample.patched2.lib");

        // Produce an edit document from the source itself
        charlib21::extract(&lib, "TT", Some(Path::new(&json)))?;

        // First application
        let options = ProgramOptions {
            lib: lib.clone(),
            edits: json.clone(),
            out: out1.clone(),
            verbose: true,
        };
        _main(&options)?;

        // A second application over the first's output lands on the same bytes
        let options = ProgramOptions {
            lib: out1.clone(),
            edits: json,
            out: out2.clone(),
            verbose: false,
        };
        _main(&options)?;
        assert_eq!(
            std::fs::read_to_string(&out1)?,
            std::fs::read_to_string(&out2)?
        );

        Ok(())
    }

    /// Grab the full path of resource-file `fname`
    fn resource(rname: &str) -> String {
        format!("{}/resources/{}", env!("CARGO_MANIFEST_DIR"), rname)
    }
}
