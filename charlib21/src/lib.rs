//!
//! # CharLib21 Standard-Cell Characterization Extraction, Interchange & Patching
//!
//! CharLib21 pulls a structured, typed model of standard-cell
//! characterization data (timing arcs, internal-power arcs, leakage entries,
//! and pin capacitances) out of a Liberty-format cell library, serializes
//! that model to a compact JSON interchange document, and applies targeted
//! edits from such a document back onto the original library while leaving
//! everything not explicitly edited untouched.
//!
//! The data flows in two independent directions over the same model shape:
//!
//! * **Extraction**: Liberty source → [liberty21] attribute tree →
//!   [LibProjector](extract::LibProjector) → [CharLibrary] snapshot →
//!   JSON document.
//! * **Patching**: edited JSON document → [CharLibrary] snapshot →
//!   [patch engine](patch::patch_tree) + the original attribute tree →
//!   mutated tree → Liberty destination.
//!
//! Patching is update-only and key-driven: cells match by name, leakage
//! entries by `(when, related_pg_pin)`, pins by direction-selected name,
//! timing arcs by `(when, related_pin, timing_type)`, and power arcs by
//! `(when, related_pin, related_pg_pin)`. Tree entities without a snapshot
//! counterpart are untouched; snapshot entities without a tree counterpart
//! are ignored. Note the companion caveat: a matched arc has *every* table
//! slot rewritten, so a document that omits a slot erases that slot's data
//! on patch.
//!
//! Both traversals are single-threaded and synchronous, and each call owns
//! its tree exclusively for the duration. The model and document types are
//! plain data, freely shareable read-only across threads.
//!

// Standard Lib Imports
use std::path::Path;

// Workspace Imports
use charlib21utils::SerializationFormat::Json;
use liberty21::LibertyTree;

pub mod data;
pub use data::*;

pub mod extract;
pub mod patch;
pub use patch::PatchStats;

#[cfg(test)]
mod tests;

/// Extract a [CharLibrary] snapshot from Liberty source file `lib_file`.
///
/// The process corner is supplied as a string tag ("SS"/"TT"/"FF"; anything
/// else yields an empty corner encoding). When `dump_json` is given, the
/// snapshot is additionally encoded to an interchange document at that path.
///
/// Errors cover an unreadable or unparsable source, a malformed numeric
/// table, and an unwritable dump path.
pub fn extract(
    lib_file: impl AsRef<Path>,
    corner: &str,
    dump_json: Option<&Path>,
) -> CharResult<CharLibrary> {
    let tree = LibertyTree::open(lib_file)?;
    let lib = extract::extract_tree(&tree, corner)?;
    if let Some(fname) = dump_json {
        Json.save(&lib, fname)?;
    }
    Ok(lib)
}

/// Patch Liberty source `lib_file` from edit document `edit_file`, writing
/// the result to `dest_file`.
///
/// The edit document is decoded first, so a malformed document aborts before
/// the source is opened, and the destination is written only after a complete
/// patch traversal; a partial destination is never produced. Individual
/// attribute-rewrite failures do not abort the pass; they are tallied in the
/// returned [PatchStats].
pub fn patch(
    lib_file: impl AsRef<Path>,
    edit_file: impl AsRef<Path>,
    dest_file: impl AsRef<Path>,
) -> CharResult<PatchStats> {
    let snapshot: CharLibrary = Json.open(edit_file)?;
    let mut tree = LibertyTree::open(lib_file)?;
    let stats = patch::patch_tree(&mut tree, &snapshot);
    tree.save(dest_file)?;
    Ok(stats)
}
