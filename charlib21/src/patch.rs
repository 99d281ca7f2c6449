//!
//! # Characterization Patch Module
//!
//! Applies a decoded [CharLibrary] snapshot back onto a parsed Liberty tree,
//! locating matching entities by identity key and rewriting only their
//! targeted attributes in place. Entities present only in the tree are left
//! untouched, and entities present only in the snapshot are ignored: this is
//! an update-only pass, never an insertion pass.
//!
//! Matching runs top-down with no backtracking: cells by name, then (within
//! a matched cell) leakage entries, then pins, then each pin's arcs. In every
//! collection the *first* snapshot entity with an equal key wins.
//!
//! Tree-mutation failures are tolerated per attribute: the offending rewrite
//! is abandoned, counted in [PatchStats::attr_failures], and the traversal
//! continues. A library holds thousands of independent arcs; one failed
//! attribute must not abort the rest.
//!

// Workspace Imports
use charlib21utils::EnumStr;
use liberty21::{
    LibertyAttr, LibertyAttrKind, LibertyGroup, LibertyResult, LibertyTree, LibertyValue,
};

// Local imports
use super::data::*;

/// Patch `tree` in place from `snapshot`, returning update counters
pub fn patch_tree(tree: &mut LibertyTree, snapshot: &CharLibrary) -> PatchStats {
    let mut patcher = LibPatcher::new(snapshot);
    for scope in tree.groups.iter_mut() {
        patcher.patch_scope(scope);
    }
    patcher.stats
}

/// # Patch Counters
///
/// Accumulated over one patch traversal. Lookup misses (tree entities with no
/// snapshot counterpart, and vice versa) are silent no-ops by design and are
/// not counted; `attr_failures` counts per-attribute rewrites abandoned after
/// a tree-mutation error.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct PatchStats {
    pub cells_matched: usize,
    pub leakages_updated: usize,
    pub input_pins_updated: usize,
    pub output_pins_updated: usize,
    pub timing_arcs_updated: usize,
    pub power_arcs_updated: usize,
    pub attr_failures: usize,
}

/// # Library Patcher
/// Top-down, first-match-wins walker over cell, leakage, pin, and arc groups
struct LibPatcher<'lib> {
    /// Snapshot of target values, decoded from an edit document
    snapshot: &'lib CharLibrary,
    /// Update counters
    stats: PatchStats,
}
impl<'lib> LibPatcher<'lib> {
    fn new(snapshot: &'lib CharLibrary) -> Self {
        Self {
            snapshot,
            stats: PatchStats::default(),
        }
    }
    /// Patch every matched cell within one library scope.
    /// Cells absent from the snapshot are skipped whole, leakage and pins included.
    fn patch_scope(&mut self, scope: &mut LibertyGroup) {
        let snapshot = self.snapshot;
        for cell_group in scope.sub_groups_mut(GroupKind::Cell.to_str()) {
            let name = match cell_group.name() {
                Some(n) => n.to_string(),
                None => continue,
            };
            let cell = match snapshot.cells.iter().find(|c| c.cell_name == name) {
                Some(c) => c,
                None => continue,
            };
            self.stats.cells_matched += 1;
            self.patch_leakages(cell_group, &cell.leakage_power);
            self.patch_pins(cell_group, cell);
        }
    }
    /// Update the leakage groups matched by `(when, related_pg_pin)`
    fn patch_leakages(&mut self, cell_group: &mut LibertyGroup, leakages: &[LeakagePower]) {
        for group in cell_group.sub_groups_mut(GroupKind::LeakagePower.to_str()) {
            let key = LeakageKey {
                when: AttrKey::When.string_of(group),
                related_pg_pin: AttrKey::RelatedPgPin.string_of(group),
            };
            let leakage = match leakages.iter().find(|l| l.key() == key) {
                Some(l) => l,
                None => continue,
            };
            // `value` is written unconditionally, created if absent
            group.set_simple(AttrKey::Value.to_str(), leakage.value);
            if !leakage.when.is_empty() {
                group.set_simple(AttrKey::When.to_str(), leakage.when.as_str());
            }
            if !leakage.related_pg_pin.is_empty() {
                group.set_simple(AttrKey::RelatedPgPin.to_str(), leakage.related_pg_pin.as_str());
            }
            self.stats.leakages_updated += 1;
        }
    }
    /// Update the pin groups within a matched cell.
    /// The tree's `direction` attribute selects which snapshot collection to
    /// search; the match itself is by pin name alone.
    fn patch_pins(&mut self, cell_group: &mut LibertyGroup, cell: &CharCell) {
        for pin_group in cell_group.sub_groups_mut(GroupKind::Pin.to_str()) {
            let direction = pin_group
                .simple_str(AttrKey::Direction.to_str())
                .and_then(PinDirection::from_str);
            let name = match pin_group.name() {
                Some(n) => n.to_string(),
                None => continue,
            };
            match direction {
                Some(PinDirection::Input) => {
                    if let Some(pin) = cell.input_pins.iter().find(|p| p.pin_name == name) {
                        self.patch_input_capacitance(pin_group, pin);
                        self.patch_timing_arcs(pin_group, &pin.timing_arcs);
                        self.patch_power_arcs(pin_group, &pin.power_arcs);
                        self.stats.input_pins_updated += 1;
                    }
                }
                Some(PinDirection::Output) => {
                    if let Some(pin) = cell.output_pins.iter().find(|p| p.pin_name == name) {
                        self.patch_timing_arcs(pin_group, &pin.timing_arcs);
                        self.patch_power_arcs(pin_group, &pin.power_arcs);
                        self.stats.output_pins_updated += 1;
                    }
                }
                _ => continue,
            }
        }
    }
    /// Overwrite an input pin's capacitance data.
    /// Scalars are set only where the snapshot value is present *and* the tree
    /// already carries the attribute; ranges are deleted and recreated
    /// whenever the snapshot provides either bound.
    fn patch_input_capacitance(&mut self, pin_group: &mut LibertyGroup, pin: &InputPin) {
        let scalars = [
            (AttrKey::Capacitance, pin.capacitance),
            (AttrKey::RiseCapacitance, pin.rise_capacitance),
            (AttrKey::FallCapacitance, pin.fall_capacitance),
        ];
        for (key, value) in scalars {
            let value = match value {
                Some(v) => v,
                None => continue, // Absent snapshot values leave the tree untouched
            };
            if let Some(attr) = pin_group.find_attr_mut(key.to_str()) {
                match attr {
                    LibertyAttr::Simple { value: slot, .. } => *slot = LibertyValue::Float(value),
                    LibertyAttr::Complex { .. } => self.stats.attr_failures += 1,
                }
            }
        }
        let ranges = [
            (AttrKey::RiseCapacitanceRange, &pin.rise_capacitance_range),
            (AttrKey::FallCapacitanceRange, &pin.fall_capacitance_range),
        ];
        for (key, range) in ranges {
            let range = match range {
                Some(r) if r.is_present() => r,
                _ => continue,
            };
            match recreate_complex(pin_group, key.to_str()) {
                Ok(attr) => {
                    // Bounds are appended independently; an absent bound is not written
                    for bound in [range.min, range.max].into_iter().flatten() {
                        if attr.push_value(bound).is_err() {
                            self.stats.attr_failures += 1;
                        }
                    }
                }
                Err(_) => self.stats.attr_failures += 1,
            }
        }
    }
    /// Update the timing groups matched by `(when, related_pin, timing_type)`.
    /// `timing_sense` is deliberately not part of the key: two arcs differing
    /// only in sense are treated as the same arc, and the first snapshot arc
    /// with a matching key wins.
    fn patch_timing_arcs(&mut self, pin_group: &mut LibertyGroup, arcs: &[TimingArc]) {
        for group in pin_group.sub_groups_mut(GroupKind::Timing.to_str()) {
            let key = TimingArcKey {
                when: AttrKey::When.string_of(group),
                related_pin: AttrKey::RelatedPin.string_of(group),
                timing_type: AttrKey::TimingType.string_of(group),
            };
            if let Some(arc) = arcs.iter().find(|a| a.key() == key) {
                // Every slot is rewritten, empty snapshot slots included
                for (kind, lut) in arc.slots() {
                    self.rewrite_lut(group, kind, lut);
                }
                self.stats.timing_arcs_updated += 1;
            }
        }
    }
    /// Update the internal-power groups matched by `(when, related_pin, related_pg_pin)`
    fn patch_power_arcs(&mut self, pin_group: &mut LibertyGroup, arcs: &[PowerArc]) {
        for group in pin_group.sub_groups_mut(GroupKind::InternalPower.to_str()) {
            let key = PowerArcKey {
                when: AttrKey::When.string_of(group),
                related_pin: AttrKey::RelatedPin.string_of(group),
                related_pg_pin: AttrKey::RelatedPgPin.string_of(group),
            };
            if let Some(arc) = arcs.iter().find(|a| a.key() == key) {
                for (kind, lut) in arc.slots() {
                    self.rewrite_lut(group, kind, lut);
                }
                self.stats.power_arcs_updated += 1;
            }
        }
    }
    /// Rewrite the table attributes of every sub-group tagged `kind`.
    ///
    /// Existing `index_1`/`index_2`/`values` complex attributes are deleted
    /// and recreated from scratch. `index_1` and `values` are written even
    /// when the snapshot table is empty, erasing the prior axis and value
    /// data; `index_2` is written only for 2-D tables. Snapshots meant for
    /// partial edits must therefore round-trip every slot they keep.
    fn rewrite_lut(&mut self, parent: &mut LibertyGroup, kind: GroupKind, lut: &Lut) {
        for group in parent.sub_groups_mut(kind.to_str()) {
            match recreate_complex(group, AttrKey::Index1.to_str()) {
                Ok(attr) => {
                    if attr.push_value(join_floats(&lut.index1)).is_err() {
                        self.stats.attr_failures += 1;
                    }
                }
                Err(_) => {
                    // Abandon this sub-group's rewrite entirely
                    self.stats.attr_failures += 1;
                    continue;
                }
            }
            if !lut.index2.is_empty() {
                match recreate_complex(group, AttrKey::Index2.to_str()) {
                    Ok(attr) => {
                        if attr.push_value(join_floats(&lut.index2)).is_err() {
                            self.stats.attr_failures += 1;
                        }
                    }
                    Err(_) => self.stats.attr_failures += 1,
                }
            }
            match recreate_complex(group, AttrKey::Values.to_str()) {
                Ok(attr) => {
                    // One string-encoded row per appended value
                    for row in lut.values.iter() {
                        if attr.push_value(join_floats(row)).is_err() {
                            self.stats.attr_failures += 1;
                            break;
                        }
                    }
                }
                Err(_) => self.stats.attr_failures += 1,
            }
        }
    }
}

/// Delete any existing attribute `name` from `group` and create a fresh
/// complex one in its place
fn recreate_complex<'gr>(
    group: &'gr mut LibertyGroup,
    name: &str,
) -> LibertyResult<&'gr mut LibertyAttr> {
    group.delete_attr(name);
    group.create_attr(name, LibertyAttrKind::Complex)
}

/// Join floats into the comma-separated string form of table attributes.
/// Uses the shortest round-trip decimal form of each value.
fn join_floats(vals: &[f64]) -> String {
    vals.iter()
        .map(|v| v.to_string())
        .collect::<Vec<String>>()
        .join(", ")
}
