//!
//! # Characterization Extraction Module
//!
//! Projects a parsed Liberty attribute tree into a [CharLibrary] snapshot:
//! a depth-first walk over the tree's groups, dispatching on each group's
//! type tag. Unrecognized group types are silently skipped, so unknown
//! nested content never aborts extraction; an absent attribute simply
//! leaves its model field unset. Only an unparsable numeric token inside a
//! present attribute is a hard error.
//!

// Crates.io Imports
use serde::{Deserialize, Serialize};

// Workspace Imports
use charlib21utils::{EnumStr, ErrorHelper};
use liberty21::{LibertyGroup, LibertyTree, LibertyValue};

// Local imports
use super::data::*;

/// Extract a [CharLibrary] snapshot from `tree`.
/// The process corner is supplied by the caller as a string tag ("SS"/"TT"/"FF");
/// unrecognized tags yield an empty corner encoding. The corner is never read
/// from the tree itself.
pub fn extract_tree(tree: &LibertyTree, corner: &str) -> CharResult<CharLibrary> {
    LibProjector::new(corner).extract(tree)
}

/// Enumerated extraction contexts, largely for capturing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractContext {
    Library,
    Cell,
    Pin,
    TimingArc,
    PowerArc,
    Leakage,
    Lut,
}

/// Pin extraction outcome: the `direction` attribute selects the model type
enum CharPin {
    Input(InputPin),
    Output(OutputPin),
}

/// # Library Projector
///
/// Walks one or more library scopes depth-first, populating the typed model.
/// Single-use: consumed by `extract`.
pub struct LibProjector {
    /// Operating point under construction
    pvt: Pvt,
    /// Context Stack
    ctx: Vec<ExtractContext>,
}
impl LibProjector {
    /// Create a new [LibProjector] at process corner `corner`
    pub fn new(corner: &str) -> Self {
        Self {
            pvt: Pvt::with_corner(corner),
            ctx: Vec::new(),
        }
    }
    /// Extract a [CharLibrary] from `tree`
    pub fn extract(mut self, tree: &LibertyTree) -> CharResult<CharLibrary> {
        let mut cells = Vec::new();
        for scope in tree.groups.iter() {
            self.extract_scope(scope, &mut cells)?;
        }
        Ok(CharLibrary {
            pvt: self.pvt,
            cells,
        })
    }
    /// Extract one library scope: its operating point and its cells
    fn extract_scope(
        &mut self,
        scope: &LibertyGroup,
        cells: &mut Vec<CharCell>,
    ) -> CharResult<()> {
        self.ctx.push(ExtractContext::Library);
        // Nominal operating point. Absent attributes leave the defaults in place.
        if let Some(v) = scope.simple_value(AttrKey::NomVoltage.to_str()) {
            self.pvt.voltage = self.unwrap(v.to_f64(), "Unparsable nom_voltage value")?;
        }
        if let Some(v) = scope.simple_value(AttrKey::NomTemperature.to_str()) {
            self.pvt.temperature = self.unwrap(v.to_i64(), "Unparsable nom_temperature value")?;
        }
        for group in scope.groups.iter() {
            match GroupKind::from_str(&group.group_type) {
                Some(GroupKind::Cell) => cells.push(self.extract_cell(group)?),
                _ => continue, // Unrecognized group types never abort extraction
            }
        }
        self.ctx.pop();
        Ok(())
    }
    /// Extract one cell: pins first, then the sibling leakage groups
    fn extract_cell(&mut self, group: &LibertyGroup) -> CharResult<CharCell> {
        self.ctx.push(ExtractContext::Cell);
        let mut input_pins = Vec::new();
        let mut output_pins = Vec::new();
        for sub in group.groups.iter() {
            match GroupKind::from_str(&sub.group_type) {
                Some(GroupKind::Pin) => match self.extract_pin(sub)? {
                    Some(CharPin::Input(pin)) => input_pins.push(pin),
                    Some(CharPin::Output(pin)) => output_pins.push(pin),
                    None => continue,
                },
                _ => continue,
            }
        }
        // Leakage entries are siblings of the pin groups, processed after all pins
        let mut leakage_power = Vec::new();
        for sub in group.groups.iter() {
            match GroupKind::from_str(&sub.group_type) {
                Some(GroupKind::LeakagePower) => leakage_power.push(self.extract_leakage(sub)?),
                _ => continue,
            }
        }
        let cell = CharCellBuilder::default()
            .cell_name(group.name().unwrap_or_default())
            .output_pins(output_pins)
            .input_pins(input_pins)
            .leakage_power(leakage_power)
            .build()?;
        self.ctx.pop();
        Ok(cell)
    }
    /// Extract one pin group.
    /// The `direction` attribute selects the model type; pins without one,
    /// and `inout`/`internal` pins, are currently dropped.
    fn extract_pin(&mut self, group: &LibertyGroup) -> CharResult<Option<CharPin>> {
        self.ctx.push(ExtractContext::Pin);
        let direction = group
            .simple_str(AttrKey::Direction.to_str())
            .and_then(PinDirection::from_str);
        let rv = match direction {
            Some(PinDirection::Input) => Some(CharPin::Input(self.extract_input_pin(group)?)),
            Some(PinDirection::Output) => Some(CharPin::Output(self.extract_output_pin(group)?)),
            _ => None,
        };
        self.ctx.pop();
        Ok(rv)
    }
    /// Extract an output pin: its function and arcs
    fn extract_output_pin(&mut self, group: &LibertyGroup) -> CharResult<OutputPin> {
        let pin = OutputPinBuilder::default()
            .pin_name(group.name().unwrap_or_default())
            .function(AttrKey::Function.string_of(group))
            .timing_arcs(self.extract_timing_arcs(group)?)
            .power_arcs(self.extract_power_arcs(group)?)
            .build()?;
        Ok(pin)
    }
    /// Extract an input pin: its capacitance data and arcs
    fn extract_input_pin(&mut self, group: &LibertyGroup) -> CharResult<InputPin> {
        let mut pin = InputPinBuilder::default()
            .pin_name(group.name().unwrap_or_default())
            .timing_arcs(self.extract_timing_arcs(group)?)
            .power_arcs(self.extract_power_arcs(group)?);
        if let Some(v) = self.opt_float(group, AttrKey::Capacitance)? {
            pin = pin.capacitance(v);
        }
        if let Some(v) = self.opt_float(group, AttrKey::RiseCapacitance)? {
            pin = pin.rise_capacitance(v);
        }
        if let Some(v) = self.opt_float(group, AttrKey::FallCapacitance)? {
            pin = pin.fall_capacitance(v);
        }
        if let Some(range) = self.opt_range(group, AttrKey::RiseCapacitanceRange)? {
            pin = pin.rise_capacitance_range(range);
        }
        if let Some(range) = self.opt_range(group, AttrKey::FallCapacitanceRange)? {
            pin = pin.fall_capacitance_range(range);
        }
        Ok(pin.build()?)
    }
    /// Extract a pin's timing arcs and their table slots
    fn extract_timing_arcs(&mut self, pin: &LibertyGroup) -> CharResult<Vec<TimingArc>> {
        let mut arcs = Vec::new();
        for group in pin.groups.iter() {
            if GroupKind::from_str(&group.group_type) != Some(GroupKind::Timing) {
                continue;
            }
            self.ctx.push(ExtractContext::TimingArc);
            let mut arc = TimingArcBuilder::default()
                .when(AttrKey::When.string_of(group))
                .related_pin(AttrKey::RelatedPin.string_of(group))
                .timing_type(AttrKey::TimingType.string_of(group))
                .timing_sense(AttrKey::TimingSense.string_of(group))
                .build()?;
            for sub in group.groups.iter() {
                match GroupKind::from_str(&sub.group_type) {
                    Some(GroupKind::CellRise) => self.fill_lut(sub, &mut arc.cell_rise)?,
                    Some(GroupKind::RiseTransition) => {
                        self.fill_lut(sub, &mut arc.rise_transition)?
                    }
                    Some(GroupKind::CellFall) => self.fill_lut(sub, &mut arc.cell_fall)?,
                    Some(GroupKind::FallTransition) => {
                        self.fill_lut(sub, &mut arc.fall_transition)?
                    }
                    Some(GroupKind::RiseConstraint) => {
                        self.fill_lut(sub, &mut arc.rise_constraint)?
                    }
                    Some(GroupKind::FallConstraint) => {
                        self.fill_lut(sub, &mut arc.fall_constraint)?
                    }
                    _ => continue,
                }
            }
            self.ctx.pop();
            arcs.push(arc);
        }
        Ok(arcs)
    }
    /// Extract a pin's internal-power arcs and their table slots
    fn extract_power_arcs(&mut self, pin: &LibertyGroup) -> CharResult<Vec<PowerArc>> {
        let mut arcs = Vec::new();
        for group in pin.groups.iter() {
            if GroupKind::from_str(&group.group_type) != Some(GroupKind::InternalPower) {
                continue;
            }
            self.ctx.push(ExtractContext::PowerArc);
            let mut arc = PowerArcBuilder::default()
                .when(AttrKey::When.string_of(group))
                .related_pin(AttrKey::RelatedPin.string_of(group))
                .related_pg_pin(AttrKey::RelatedPgPin.string_of(group))
                .build()?;
            for sub in group.groups.iter() {
                match GroupKind::from_str(&sub.group_type) {
                    Some(GroupKind::RisePower) => self.fill_lut(sub, &mut arc.cell_rise)?,
                    Some(GroupKind::FallPower) => self.fill_lut(sub, &mut arc.cell_fall)?,
                    _ => continue,
                }
            }
            self.ctx.pop();
            arcs.push(arc);
        }
        Ok(arcs)
    }
    /// Extract one leakage entry
    fn extract_leakage(&mut self, group: &LibertyGroup) -> CharResult<LeakagePower> {
        self.ctx.push(ExtractContext::Leakage);
        let mut leakage = LeakagePowerBuilder::default()
            .when(AttrKey::When.string_of(group))
            .related_pg_pin(AttrKey::RelatedPgPin.string_of(group))
            .build()?;
        if let Some(v) = self.opt_float(group, AttrKey::Value)? {
            leakage.value = v;
        }
        self.ctx.pop();
        Ok(leakage)
    }
    /// Fill table `lut` from the attributes of `group`.
    /// Only the attributes present in the group are overwritten.
    fn fill_lut(&mut self, group: &LibertyGroup, lut: &mut Lut) -> CharResult<()> {
        self.ctx.push(ExtractContext::Lut);
        if let Some(values) = group.complex_values(AttrKey::Index1.to_str()) {
            lut.index1 = self.axis_floats(values)?;
        }
        if let Some(values) = group.complex_values(AttrKey::Index2.to_str()) {
            lut.index2 = self.axis_floats(values)?;
        }
        if let Some(values) = group.complex_values(AttrKey::Values.to_str()) {
            lut.values = self.table_floats(values)?;
        }
        self.ctx.pop();
        Ok(())
    }
    /// Flatten complex-attribute values into a single axis of floats.
    /// String values are tokenized on commas and newlines with empty tokens
    /// skipped; numeric values contribute directly.
    fn axis_floats(&self, values: &[LibertyValue]) -> CharResult<Vec<f64>> {
        let mut floats = Vec::new();
        for value in values.iter() {
            match value {
                LibertyValue::String(s) => {
                    for token in s.split(|c| c == ',' || c == '\n') {
                        let token = token.trim();
                        if token.is_empty() {
                            continue;
                        }
                        floats.push(self.parse_float(token)?);
                    }
                }
                LibertyValue::Float(v) => floats.push(*v),
                LibertyValue::Int(v) => floats.push(*v as f64),
            }
        }
        Ok(floats)
    }
    /// Tokenize complex-attribute values into rows of floats.
    /// Each string value contributes one row per newline-separated line;
    /// numeric values each form a single-element (scalar-table) row.
    fn table_floats(&self, values: &[LibertyValue]) -> CharResult<Vec<Vec<f64>>> {
        let mut rows = Vec::new();
        for value in values.iter() {
            match value {
                LibertyValue::String(s) => {
                    for line in s.split('\n') {
                        let mut row = Vec::new();
                        for token in line.split(',') {
                            let token = token.trim();
                            if token.is_empty() {
                                continue;
                            }
                            row.push(self.parse_float(token)?);
                        }
                        if !row.is_empty() {
                            rows.push(row);
                        }
                    }
                }
                LibertyValue::Float(v) => rows.push(vec![*v]),
                LibertyValue::Int(v) => rows.push(vec![*v as f64]),
            }
        }
        Ok(rows)
    }
    /// Parse a single numeric token. Failure here is a malformed-source error.
    fn parse_float(&self, token: &str) -> CharResult<f64> {
        match token.parse::<f64>() {
            Ok(v) => Ok(v),
            Err(_) => self.fail(format!("Unparsable numeric token '{}'", token)),
        }
    }
    /// Read optional float attribute `key` from `group`.
    /// Absent attributes are simply "not present"; a present but unparsable
    /// value is a hard error.
    fn opt_float(&self, group: &LibertyGroup, key: AttrKey) -> CharResult<Option<f64>> {
        match group.simple_value(key.to_str()) {
            None => Ok(None),
            Some(v) => match v.to_f64() {
                Some(f) => Ok(Some(f)),
                None => self.fail(format!("Unparsable {} value", key)),
            },
        }
    }
    /// Read optional capacitance-range attribute `key` from `group`.
    /// Ranges are only modeled as complete (min, max) pairs.
    fn opt_range(&self, group: &LibertyGroup, key: AttrKey) -> CharResult<Option<CapRange>> {
        let values = match group.complex_values(key.to_str()) {
            None => return Ok(None),
            Some(v) => v,
        };
        let floats = self.axis_floats(values)?;
        if floats.len() == 2 {
            Ok(Some(CapRange::new(floats[0], floats[1])))
        } else {
            Ok(None)
        }
    }
}
impl ErrorHelper for LibProjector {
    type Error = CharError;
    /// Extraction failures capture the projector's current context stack
    fn err(&self, msg: impl Into<String>) -> Self::Error {
        CharError::Extract {
            msg: msg.into(),
            ctx: self.ctx.clone(),
        }
    }
}
