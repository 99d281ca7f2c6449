//! # lib2json
//!
//! Liberty characterization-data to JSON interchange converter
//!

use clap::Parser;
use std::error::Error;
use std::path::Path;

// => The doc-comment on `ProgramOptions` here is displayed by the `clap`-generated help docs =>

/// Liberty characterization-data to JSON interchange converter
#[derive(Parser)]
struct ProgramOptions {
    /// Liberty Input File
    #[clap(short = 'i', long, default_value = "")]
    lib: String,
    /// JSON Output File
    #[clap(short = 'o', long, default_value = "")]
    json: String,
    /// Process Corner ("SS", "TT", or "FF")
    #[clap(short, long, default_value = "TT")]
    process: String,
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
    // Extract the characterization snapshot, dumping it to JSON along the way
    let lib = charlib21::extract(&options.lib, &options.process, Some(Path::new(&options.json)))?;

    if options.verbose {
        println!("read: {:?}", &options.lib);
        println!("extracted {} cells", lib.cells.len());
        println!("wrote: {:?}", &options.json);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_to_golden_file() -> Result<(), Box<dyn Error>> {
        let options = ProgramOptions {
            lib: resource("sample.lib"),
            json: resource("sample.json"),
            process: "TT".into(),
            verbose: true,
        };

        // Run the main function, producing file `sample.json`
        _main(&options)?;

        // Read back what it wrote to disk
        use charlib21utils::SerializationFormat::Json;
        let readback: charlib21::CharLibrary = Json.open(resource("sample.json"))?;

        // And compare it to a straight extraction of the same source
        let golden = charlib21::extract(resource("sample.lib"), "TT", None)?;
        assert_eq!(readback, golden);
        assert_eq!(readback.cells.len(), 2);

        Ok(())
    }

    /// Grab the full path of resource-file `fname`
    fn resource(rname: &str) -> String {
        format!("{}/resources/{}", env!("CARGO_MANIFEST_DIR"), rname)
    }
}
