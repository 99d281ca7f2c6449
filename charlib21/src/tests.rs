use charlib21utils::SerializationFormat::Json;
use liberty21::read::parse_str;

use super::extract::extract_tree;
use super::patch::patch_tree;
use super::*;

/// Shared sample source: an inverter with timing, power, leakage, and
/// capacitance data, a buffer, and an unmodeled inout pin.
const SAMPLE: &str = r#"
library (sample) {
    nom_voltage : 1.1;
    nom_temperature : 25;
    cell (INV1) {
        leakage_power () {
            value : 0.0021;
            when : "!A";
            related_pg_pin : VDD;
        }
        pin (A) {
            direction : input;
            rise_capacitance : 0.0021;
            fall_capacitance : 0.0019;
            rise_capacitance_range (0.0018, 0.0024);
        }
        pin (Y) {
            direction : output;
            function : "!A";
            timing () {
                related_pin : "A";
                timing_type : combinational;
                timing_sense : negative_unate;
                cell_rise (delay_template) {
                    index_1 ("0.01, 0.02");
                    values ( \
                        "0.1", \
                        "0.2" \
                    );
                }
                cell_fall (delay_template) {
                    index_1 ("0.01, 0.02");
                    values ( \
                        "0.3", \
                        "0.4" \
                    );
                }
            }
            internal_power () {
                related_pin : "A";
                related_pg_pin : VDD;
                rise_power (power_template) {
                    index_1 ("0.01, 0.02");
                    index_2 ("0.1, 0.2");
                    values ( \
                        "0.5, 0.6", \
                        "0.7, 0.8" \
                    );
                }
                fall_power (power_template) {
                    index_1 ("0.01, 0.02");
                    values ("0.9, 1.0");
                }
            }
        }
        pin (Z) {
            direction : inout;
        }
    }
    cell (BUF1) {
        pin (A) {
            direction : input;
            capacitance : 0.004;
        }
        pin (Y) {
            direction : output;
            function : "A";
            timing () {
                related_pin : "A";
                timing_type : combinational;
                cell_rise (delay_template) {
                    index_1 ("0.03, 0.04");
                    values ("0.5, 0.6");
                }
            }
        }
    }
}
"#;

#[test]
fn it_extracts_the_sample() -> CharResult<()> {
    let tree = parse_str(SAMPLE)?;
    let lib = extract_tree(&tree, "TT")?;

    // Operating point: voltage and temperature from the tree, corner from the caller
    assert_eq!(lib.pvt.voltage, 1.1);
    assert_eq!(lib.pvt.temperature, 25);
    assert_eq!(lib.pvt.process, vec![2]);

    assert_eq!(lib.cells.len(), 2);
    let inv = &lib.cells[0];
    assert_eq!(inv.cell_name, "INV1");

    // The inout pin Z is dropped; one input and one output remain
    assert_eq!(inv.input_pins.len(), 1);
    assert_eq!(inv.output_pins.len(), 1);

    let a = &inv.input_pins[0];
    assert_eq!(a.pin_name, "A");
    assert_eq!(a.capacitance, None);
    assert_eq!(a.rise_capacitance, Some(0.0021));
    assert_eq!(a.fall_capacitance, Some(0.0019));
    assert_eq!(a.rise_capacitance_range, Some(CapRange::new(0.0018, 0.0024)));
    assert_eq!(a.fall_capacitance_range, None);

    let y = &inv.output_pins[0];
    assert_eq!(y.pin_name, "Y");
    assert_eq!(y.function, "!A");
    assert_eq!(y.timing_arcs.len(), 1);
    let arc = &y.timing_arcs[0];
    assert_eq!(arc.when, "");
    assert_eq!(arc.related_pin, "A");
    assert_eq!(arc.timing_type, "combinational");
    assert_eq!(arc.timing_sense, "negative_unate");
    assert_eq!(arc.cell_rise.index1, vec![0.01, 0.02]);
    assert!(arc.cell_rise.index2.is_empty());
    assert_eq!(arc.cell_rise.values, vec![vec![0.1], vec![0.2]]);
    assert_eq!(arc.cell_fall.values, vec![vec![0.3], vec![0.4]]);
    assert!(arc.rise_transition.is_empty());

    assert_eq!(y.power_arcs.len(), 1);
    let parc = &y.power_arcs[0];
    assert_eq!(parc.related_pin, "A");
    assert_eq!(parc.related_pg_pin, "VDD");
    assert_eq!(parc.cell_rise.index2, vec![0.1, 0.2]);
    assert_eq!(parc.cell_rise.values, vec![vec![0.5, 0.6], vec![0.7, 0.8]]);
    assert_eq!(parc.cell_fall.values, vec![vec![0.9, 1.0]]);

    assert_eq!(inv.leakage_power.len(), 1);
    let leakage = &inv.leakage_power[0];
    assert_eq!(leakage.value, 0.0021);
    assert_eq!(leakage.when, "!A");
    assert_eq!(leakage.related_pg_pin, "VDD");
    Ok(())
}

#[test]
fn it_maps_process_corners() {
    assert_eq!(Pvt::with_corner("SS").process, vec![1]);
    assert_eq!(Pvt::with_corner("TT").process, vec![2]);
    assert_eq!(Pvt::with_corner("FF").process, vec![3]);
    // Unrecognized corner tags map to the empty encoding
    assert_eq!(Pvt::with_corner("FS").process, Vec::<i32>::new());
    assert_eq!(Pvt::with_corner("ff").process, Vec::<i32>::new());
    assert_eq!(Pvt::with_corner("").process, Vec::<i32>::new());
}

#[test]
fn it_roundtrips_the_codec() -> CharResult<()> {
    let lib = extract_tree(&parse_str(SAMPLE)?, "FF")?;
    let doc = Json.to_string(&lib)?;
    let back: CharLibrary = Json.from_str(&doc)?;
    // Every present field is preserved, every absent field stays absent
    assert_eq!(lib, back);
    // Empty and absent optional fields are omitted outright
    assert!(!doc.contains("rise_constraint"));
    assert!(!doc.contains("fall_capacitance_range"));
    assert!(!doc.contains("\"when\": \"\""));
    Ok(())
}

#[test]
fn it_encodes_luts() -> CharResult<()> {
    let lut = Lut {
        index1: vec![0.1, 0.2],
        index2: Vec::new(),
        values: vec![vec![1.0, 2.0], vec![3.0, 4.0]],
    };
    let doc = Json.to_string(&lut)?;
    // 1-D tables omit `index2` entirely
    assert!(!doc.contains("index2"));
    let back: Lut = Json.from_str(&doc)?;
    assert_eq!(lut, back);
    Ok(())
}

#[test]
fn it_rejects_malformed_documents() {
    // Top level must be an object
    assert!(Json.from_str::<CharLibrary>("[1, 2, 3]").is_err());
    // Array-typed fields must hold arrays
    assert!(Json.from_str::<CharLibrary>(r#"{"cells": 5}"#).is_err());
    // Capacitance ranges are two-element arrays
    let doc = r#"{"cells": [{"cell_name": "X", "input_pins": [
        {"pin_name": "A", "rise_capacitance_range": [1.0]}]}]}"#;
    assert!(Json.from_str::<CharLibrary>(doc).is_err());
}

#[test]
fn it_defaults_absent_document_fields() -> CharResult<()> {
    // Omitted optional fields decode as absent, not zero...
    let doc = r#"{"cells": [{"cell_name": "X", "input_pins": [{"pin_name": "A"}],
        "leakage_power": [{"when": "!A"}]}]}"#;
    let lib: CharLibrary = Json.from_str(doc)?;
    let cell = &lib.cells[0];
    assert_eq!(cell.input_pins[0].capacitance, None);
    assert_eq!(cell.input_pins[0].rise_capacitance_range, None);
    // ...except the non-optional leakage value, which defaults to zero
    assert_eq!(cell.leakage_power[0].value, 0.0);
    assert_eq!(cell.leakage_power[0].when, "!A");
    Ok(())
}

#[test]
fn it_errors_on_malformed_numerics() -> CharResult<()> {
    let src = r#"
    library (l) {
        cell (c) {
            pin (p) {
                direction : input;
                timing () {
                    cell_rise (t) {
                        index_1 ("0.1, zz");
                    }
                }
            }
        }
    }
    "#;
    let tree = parse_str(src)?;
    assert!(extract_tree(&tree, "TT").is_err());
    Ok(())
}

#[test]
fn it_patches_values() -> CharResult<()> {
    let mut tree = parse_str(SAMPLE)?;
    let mut snapshot = extract_tree(&tree, "TT")?;

    // Edit a table, a leakage value, and a capacitance scalar
    snapshot.cells[0].output_pins[0].timing_arcs[0].cell_rise.values =
        vec![vec![9.9], vec![8.8]];
    snapshot.cells[0].leakage_power[0].value = 0.5;
    snapshot.cells[0].input_pins[0].rise_capacitance = Some(0.0055);

    let stats = patch_tree(&mut tree, &snapshot);
    assert_eq!(stats.cells_matched, 2);
    assert_eq!(stats.leakages_updated, 1);
    assert_eq!(stats.input_pins_updated, 2);
    assert_eq!(stats.output_pins_updated, 2);
    assert_eq!(stats.timing_arcs_updated, 2);
    assert_eq!(stats.power_arcs_updated, 1);
    assert_eq!(stats.attr_failures, 0);

    let back = extract_tree(&tree, "TT")?;
    let inv = &back.cells[0];
    assert_eq!(
        inv.output_pins[0].timing_arcs[0].cell_rise.values,
        vec![vec![9.9], vec![8.8]]
    );
    assert_eq!(inv.leakage_power[0].value, 0.5);
    assert_eq!(inv.input_pins[0].rise_capacitance, Some(0.0055));
    // Values the edit left alone are untouched
    assert_eq!(inv.input_pins[0].fall_capacitance, Some(0.0019));
    assert_eq!(inv.output_pins[0].power_arcs[0].cell_fall.values, vec![vec![0.9, 1.0]]);
    Ok(())
}

#[test]
fn it_patches_idempotently() -> CharResult<()> {
    let mut snapshot = extract_tree(&parse_str(SAMPLE)?, "TT")?;
    snapshot.cells[0].output_pins[0].timing_arcs[0].cell_fall.values =
        vec![vec![1.5], vec![2.5]];

    // First application
    let mut tree1 = parse_str(SAMPLE)?;
    patch_tree(&mut tree1, &snapshot);
    let once = tree1.to_string()?;

    // Second application, over the first's output
    let mut tree2 = parse_str(&once)?;
    patch_tree(&mut tree2, &snapshot);
    let twice = tree2.to_string()?;

    assert_eq!(once, twice);
    Ok(())
}

#[test]
fn it_matches_arcs_ignoring_sense() -> CharResult<()> {
    let mut tree = parse_str(SAMPLE)?;
    let mut snapshot = extract_tree(&tree, "TT")?;

    // The snapshot arc's sense disagrees with the tree's, but the identity
    // key (when, related_pin, timing_type) still matches
    let arc = &mut snapshot.cells[0].output_pins[0].timing_arcs[0];
    arc.timing_sense = "positive_unate".to_string();
    arc.cell_rise.values = vec![vec![7.7], vec![6.6]];

    let stats = patch_tree(&mut tree, &snapshot);
    assert_eq!(stats.timing_arcs_updated, 2);

    let back = extract_tree(&tree, "TT")?;
    let arc = &back.cells[0].output_pins[0].timing_arcs[0];
    assert_eq!(arc.cell_rise.values, vec![vec![7.7], vec![6.6]]);
    // The sense itself is descriptive and not a patched attribute
    assert_eq!(arc.timing_sense, "negative_unate");
    Ok(())
}

#[test]
fn it_skips_unmatched_cells() -> CharResult<()> {
    // An empty edit document patches nothing and changes nothing
    let mut tree = parse_str(SAMPLE)?;
    let stats = patch_tree(&mut tree, &CharLibrary::new());
    assert_eq!(stats, PatchStats::default());
    assert_eq!(tree.to_string()?, parse_str(SAMPLE)?.to_string()?);

    // An edit document whose cell list omits INV1 leaves INV1 untouched
    let mut snapshot = extract_tree(&parse_str(SAMPLE)?, "TT")?;
    snapshot.cells.retain(|c| c.cell_name == "BUF1");
    snapshot.cells[0].output_pins[0].timing_arcs[0].cell_rise.values = vec![vec![42.0]];

    let mut tree = parse_str(SAMPLE)?;
    let baseline = parse_str(SAMPLE)?;
    let stats = patch_tree(&mut tree, &snapshot);
    assert_eq!(stats.cells_matched, 1);

    let patched_inv = tree.groups[0].sub_groups("cell").next().unwrap();
    let baseline_inv = baseline.groups[0].sub_groups("cell").next().unwrap();
    assert_eq!(patched_inv, baseline_inv);

    // And BUF1 did change
    let back = extract_tree(&tree, "TT")?;
    assert_eq!(
        back.cells[1].output_pins[0].timing_arcs[0].cell_rise.values,
        vec![vec![42.0]]
    );
    Ok(())
}

#[test]
fn it_erases_omitted_slots() -> CharResult<()> {
    // An edit document that sets the arc's cell_fall and omits cell_rise:
    // the matched arc has every slot rewritten, so the omitted cell_rise
    // is erased while cell_fall takes the document's data.
    let doc = r#"{
        "voltage": 1.1, "temperature": 25, "process": [2],
        "cells": [{
            "cell_name": "INV1",
            "output_pins": [{
                "pin_name": "Y",
                "timing_arcs": [{
                    "related_pin": "A",
                    "timing_type": "combinational",
                    "cell_fall": {"index1": [0.05, 0.06], "values": [[0.55], [0.66]]}
                }]
            }]
        }]
    }"#;
    let snapshot: CharLibrary = Json.from_str(doc)?;
    let mut tree = parse_str(SAMPLE)?;
    let stats = patch_tree(&mut tree, &snapshot);
    assert_eq!(stats.timing_arcs_updated, 1);

    let back = extract_tree(&tree, "TT")?;
    let arc = &back.cells[0].output_pins[0].timing_arcs[0];
    assert_eq!(arc.cell_fall.index1, vec![0.05, 0.06]);
    assert_eq!(arc.cell_fall.values, vec![vec![0.55], vec![0.66]]);
    assert!(arc.cell_rise.is_empty());
    Ok(())
}

#[test]
fn it_keys_arcs_as_records() {
    // Identity keys are derived-equality records over their field tuples
    let mut arc = TimingArc {
        when: "!B".to_string(),
        related_pin: "A".to_string(),
        timing_type: "combinational".to_string(),
        timing_sense: "positive_unate".to_string(),
        ..Default::default()
    };
    let key = arc.key();
    arc.timing_sense = "negative_unate".to_string();
    assert_eq!(arc.key(), key);
    arc.when = "B".to_string();
    assert_ne!(arc.key(), key);
}

#[test]
fn it_writes_schema() -> CharResult<()> {
    // Create the [schemars] JSON-Schema for [CharLibrary]
    use schemars::schema_for;
    let schema = schema_for!(CharLibrary);
    let doc = Json.to_string(&schema)?;
    assert!(doc.contains("\"cells\""));
    assert!(doc.contains("\"voltage\""));
    Ok(())
}
