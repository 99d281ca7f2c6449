//!
//! # Characterization Data Model
//!
//! Typed model of one standard-cell characterization scope: an operating
//! point plus cells, pins, timing/power arcs, leakage entries, and their
//! lookup tables. The [serde] attributes on these types *are* the interchange
//! document schema: absent optional fields are omitted outright on encode and
//! read back as absent on decode, never as zero placeholders.
//!

// Crates.io Imports
use derive_builder::Builder;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Workspace Imports
use charlib21utils::{enumstr, EnumStr};
use liberty21::LibertyGroup;

/// # Operating Point
///
/// Process, voltage, and temperature for one characterization scope.
/// Voltage and temperature are read from the library source; the process
/// corner is supplied by the caller and carried as an integer-sequence
/// encoding (SS=1, TT=2, FF=3, unrecognized=empty).
#[derive(Default, Clone, Builder, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[builder(pattern = "owned", setter(into))]
pub struct Pvt {
    /// Nominal Voltage
    #[serde(default)]
    #[builder(default)]
    pub voltage: f64,
    /// Nominal Temperature
    #[serde(default)]
    #[builder(default)]
    pub temperature: i64,
    /// Process-Corner Encoding
    #[serde(default)]
    #[builder(default)]
    pub process: Vec<i32>,
}
impl Pvt {
    /// Create a new [Pvt] at corner `corner`, with default voltage and temperature.
    /// Unrecognized corner tags yield an empty process encoding.
    pub fn with_corner(corner: &str) -> Pvt {
        let process = match ProcessCorner::from_str(corner) {
            Some(c) => c.encoding(),
            None => Vec::new(),
        };
        Pvt {
            process,
            ..Default::default()
        }
    }
}

enumstr!(
    /// # Process Corner
    /// The enumerated corner tags accepted from callers
    ProcessCorner {
        SlowSlow: "SS",
        TypicalTypical: "TT",
        FastFast: "FF",
    }
);
impl ProcessCorner {
    /// Integer-sequence encoding, as carried in [Pvt::process]
    pub fn encoding(&self) -> Vec<i32> {
        match self {
            Self::SlowSlow => vec![1],
            Self::TypicalTypical => vec![2],
            Self::FastFast => vec![3],
        }
    }
}

/// # Lookup Table
///
/// Numeric 1-D or 2-D table with optional index axes, `values` row-major.
/// Row and column counts are expected to correspond to the axis cardinalities
/// but are not enforced; partial tables (e.g. `index1` plus `values` only)
/// are legal and common.
#[derive(Default, Clone, Builder, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[builder(pattern = "owned", setter(into))]
pub struct Lut {
    /// First (row) Index Axis
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub index1: Vec<f64>,
    /// Second (column) Index Axis
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub index2: Vec<f64>,
    /// Table Values, row-major
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub values: Vec<Vec<f64>>,
}
impl Lut {
    /// Boolean indication of an entirely empty table.
    /// A table slot is "present" iff any of its three fields is non-empty.
    pub fn is_empty(&self) -> bool {
        self.index1.is_empty() && self.index2.is_empty() && self.values.is_empty()
    }
}

/// # Timing Arc
///
/// A timing relationship from `related_pin` under condition `when`,
/// owning up to six named table slots. Matched during patching by
/// [TimingArcKey]; `timing_sense` is descriptive and not part of the key.
#[derive(Default, Clone, Builder, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[builder(pattern = "owned", setter(into))]
pub struct TimingArc {
    /// Condition Expression
    #[serde(default, skip_serializing_if = "String::is_empty")]
    #[builder(default)]
    pub when: String,
    /// Related Pin Name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    #[builder(default)]
    pub related_pin: String,
    /// Timing Type, e.g. "combinational", "setup_rising"
    #[serde(default, skip_serializing_if = "String::is_empty")]
    #[builder(default)]
    pub timing_type: String,
    /// Timing Sense, e.g. "positive_unate". Descriptive, non-key.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    #[builder(default)]
    pub timing_sense: String,

    // Table Slots
    #[serde(default, skip_serializing_if = "Lut::is_empty")]
    #[builder(default)]
    pub cell_rise: Lut,
    #[serde(default, skip_serializing_if = "Lut::is_empty")]
    #[builder(default)]
    pub rise_transition: Lut,
    #[serde(default, skip_serializing_if = "Lut::is_empty")]
    #[builder(default)]
    pub cell_fall: Lut,
    #[serde(default, skip_serializing_if = "Lut::is_empty")]
    #[builder(default)]
    pub fall_transition: Lut,
    #[serde(default, skip_serializing_if = "Lut::is_empty")]
    #[builder(default)]
    pub rise_constraint: Lut,
    #[serde(default, skip_serializing_if = "Lut::is_empty")]
    #[builder(default)]
    pub fall_constraint: Lut,
}
impl TimingArc {
    /// Get the arc's identity key
    pub fn key(&self) -> TimingArcKey {
        TimingArcKey {
            when: self.when.clone(),
            related_pin: self.related_pin.clone(),
            timing_type: self.timing_type.clone(),
        }
    }
    /// Table slots paired with their tree group-type tags, in write order
    pub fn slots(&self) -> [(GroupKind, &Lut); 6] {
        [
            (GroupKind::CellRise, &self.cell_rise),
            (GroupKind::RiseTransition, &self.rise_transition),
            (GroupKind::CellFall, &self.cell_fall),
            (GroupKind::FallTransition, &self.fall_transition),
            (GroupKind::RiseConstraint, &self.rise_constraint),
            (GroupKind::FallConstraint, &self.fall_constraint),
        ]
    }
}

/// # Timing-Arc Identity Key
/// Derived-equality record used for tree-to-snapshot matching
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimingArcKey {
    pub when: String,
    pub related_pin: String,
    pub timing_type: String,
}

/// # Power Arc
///
/// An internal-power relationship, owning rise and fall table slots.
/// Stored under `cell_rise`/`cell_fall` in documents, while living in
/// `rise_power`/`fall_power` sub-groups of the tree.
#[derive(Default, Clone, Builder, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[builder(pattern = "owned", setter(into))]
pub struct PowerArc {
    /// Condition Expression
    #[serde(default, skip_serializing_if = "String::is_empty")]
    #[builder(default)]
    pub when: String,
    /// Related Pin Name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    #[builder(default)]
    pub related_pin: String,
    /// Related Power/Ground Pin Name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    #[builder(default)]
    pub related_pg_pin: String,

    // Table Slots
    #[serde(default, skip_serializing_if = "Lut::is_empty")]
    #[builder(default)]
    pub cell_rise: Lut,
    #[serde(default, skip_serializing_if = "Lut::is_empty")]
    #[builder(default)]
    pub cell_fall: Lut,
}
impl PowerArc {
    /// Get the arc's identity key
    pub fn key(&self) -> PowerArcKey {
        PowerArcKey {
            when: self.when.clone(),
            related_pin: self.related_pin.clone(),
            related_pg_pin: self.related_pg_pin.clone(),
        }
    }
    /// Table slots paired with their tree group-type tags, in write order
    pub fn slots(&self) -> [(GroupKind, &Lut); 2] {
        [
            (GroupKind::RisePower, &self.cell_rise),
            (GroupKind::FallPower, &self.cell_fall),
        ]
    }
}

/// # Power-Arc Identity Key
/// Derived-equality record used for tree-to-snapshot matching
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PowerArcKey {
    pub when: String,
    pub related_pin: String,
    pub related_pg_pin: String,
}

/// # Leakage Power Entry
/// A cell may carry several, one per leakage condition.
#[derive(Default, Clone, Builder, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[builder(pattern = "owned", setter(into))]
pub struct LeakagePower {
    /// Leakage Value. Non-optional in the model; absent document fields decode to zero.
    #[serde(default)]
    #[builder(default)]
    pub value: f64,
    /// Condition Expression
    #[serde(default, skip_serializing_if = "String::is_empty")]
    #[builder(default)]
    pub when: String,
    /// Related Power/Ground Pin Name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    #[builder(default)]
    pub related_pg_pin: String,
}
impl LeakagePower {
    /// Get the entry's identity key
    pub fn key(&self) -> LeakageKey {
        LeakageKey {
            when: self.when.clone(),
            related_pg_pin: self.related_pg_pin.clone(),
        }
    }
}

/// # Leakage Identity Key
/// Derived-equality record used for tree-to-snapshot matching
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LeakageKey {
    pub when: String,
    pub related_pg_pin: String,
}

/// # Capacitance Range
///
/// A (min, max) pair with independently-optional bounds.
/// On the wire it is a two-element number array; an absent bound encodes
/// as 0.0, and both bounds of a decoded range are always present.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct CapRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}
impl CapRange {
    /// Create a new [CapRange] with both bounds present
    pub fn new(min: f64, max: f64) -> CapRange {
        CapRange {
            min: Some(min),
            max: Some(max),
        }
    }
    /// Boolean indication of whether either bound is present
    pub fn is_present(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}
impl Serialize for CapRange {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(&self.min.unwrap_or(0.0))?;
        seq.serialize_element(&self.max.unwrap_or(0.0))?;
        seq.end()
    }
}
impl<'de> Deserialize<'de> for CapRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bounds = Vec::<f64>::deserialize(deserializer)?;
        if bounds.len() != 2 {
            return Err(serde::de::Error::invalid_length(
                bounds.len(),
                &"a two-element capacitance range",
            ));
        }
        Ok(CapRange::new(bounds[0], bounds[1]))
    }
}
impl JsonSchema for CapRange {
    fn schema_name() -> String {
        "CapRange".to_string()
    }
    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        // Wire form: an array of numbers
        gen.subschema_for::<Vec<f64>>()
    }
}

/// # Input Pin
/// Owns optional capacitance scalars and ranges, plus arc collections.
#[derive(Default, Clone, Builder, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[builder(pattern = "owned", setter(into))]
pub struct InputPin {
    /// Pin Name
    pub pin_name: String,

    // Optional capacitance data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub capacitance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub rise_capacitance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub fall_capacitance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub rise_capacitance_range: Option<CapRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub fall_capacitance_range: Option<CapRange>,

    /// Timing Arcs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub timing_arcs: Vec<TimingArc>,
    /// Power Arcs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub power_arcs: Vec<PowerArc>,
}

/// # Output Pin
/// Owns the pin's logic function plus arc collections.
#[derive(Default, Clone, Builder, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[builder(pattern = "owned", setter(into))]
pub struct OutputPin {
    /// Pin Name
    pub pin_name: String,
    /// Logic Function
    #[serde(default, skip_serializing_if = "String::is_empty")]
    #[builder(default)]
    pub function: String,
    /// Timing Arcs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub timing_arcs: Vec<TimingArc>,
    /// Power Arcs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub power_arcs: Vec<PowerArc>,
}

/// # Characterized Cell
/// Owns ordered pin and leakage collections, matched by `cell_name`.
#[derive(Default, Clone, Builder, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[builder(pattern = "owned", setter(into))]
pub struct CharCell {
    /// Cell Name
    pub cell_name: String,
    /// Output Pins
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub output_pins: Vec<OutputPin>,
    /// Input Pins
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub input_pins: Vec<InputPin>,
    /// Leakage Entries, one per condition
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub leakage_power: Vec<LeakagePower>,
}
impl CharCell {
    /// Create a new and initially empty [CharCell] with name `name`
    pub fn new(name: impl Into<String>) -> CharCell {
        let cell_name = name.into();
        CharCell {
            cell_name,
            ..Default::default()
        }
    }
}

/// # Characterization Library Snapshot
///
/// One operating point plus an ordered collection of cells: the unit produced
/// by extraction and consumed by patching. Built once per extraction or
/// decode, consumed, and discarded; not a persistent store.
#[derive(Default, Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct CharLibrary {
    /// Operating Point, flattened to the document's top level
    #[serde(flatten)]
    pub pvt: Pvt,
    /// Cells
    #[serde(default)]
    pub cells: Vec<CharCell>,
}
impl CharLibrary {
    /// Create a new and initially empty [CharLibrary].
    /// Also available via [Default].
    pub fn new() -> CharLibrary {
        CharLibrary::default()
    }
}

enumstr!(
    /// # Characterization Group Kinds
    ///
    /// The closed set of tree group-type tags the extraction and patch
    /// traversals dispatch on. Tags outside this set are skipped, never
    /// errored on: unknown nested groups must not abort either traversal.
    GroupKind {
        Cell: "cell",
        Pin: "pin",
        Timing: "timing",
        InternalPower: "internal_power",
        LeakagePower: "leakage_power",
        CellRise: "cell_rise",
        RiseTransition: "rise_transition",
        CellFall: "cell_fall",
        FallTransition: "fall_transition",
        RiseConstraint: "rise_constraint",
        FallConstraint: "fall_constraint",
        RisePower: "rise_power",
        FallPower: "fall_power",
    }
);

enumstr!(
    /// # Characterization Attribute Keys
    /// The attribute names read and written within the [GroupKind] groups
    AttrKey {
        NomVoltage: "nom_voltage",
        NomTemperature: "nom_temperature",
        Direction: "direction",
        Function: "function",
        When: "when",
        RelatedPin: "related_pin",
        TimingType: "timing_type",
        TimingSense: "timing_sense",
        RelatedPgPin: "related_pg_pin",
        Value: "value",
        Capacitance: "capacitance",
        RiseCapacitance: "rise_capacitance",
        FallCapacitance: "fall_capacitance",
        RiseCapacitanceRange: "rise_capacitance_range",
        FallCapacitanceRange: "fall_capacitance_range",
        Index1: "index_1",
        Index2: "index_2",
        Values: "values",
    }
);
impl AttrKey {
    /// Read `self` from `group` as a string.
    /// Empty for absent attributes and for non-string values, matching the
    /// empty-means-absent convention of the model's key fields.
    pub fn string_of(&self, group: &LibertyGroup) -> String {
        group.simple_str(self.to_str()).unwrap_or_default().to_string()
    }
}

enumstr!(
    /// # Pin Direction
    /// `inout` and `internal` pins are recognized but not modeled
    PinDirection {
        Input: "input",
        Output: "output",
        Inout: "inout",
        Internal: "internal",
    }
);

use super::extract::ExtractContext;

/// # Char Error Enumeration
#[derive(Debug)]
pub enum CharError {
    /// Tree-engine errors: source open, parse, and write failures
    Tree(liberty21::LibertyError),
    /// Interchange-document errors: unreadable, malformed, or mistyped content
    Codec(charlib21utils::Error),
    /// Extraction errors, carrying the projector's context stack
    Extract {
        msg: String,
        ctx: Vec<ExtractContext>,
    },
    /// Wrapped errors, generally from other crates
    Boxed(Box<dyn std::error::Error>),
    /// String message-valued errors
    Str(String),
}
impl From<liberty21::LibertyError> for CharError {
    fn from(e: liberty21::LibertyError) -> Self {
        Self::Tree(e)
    }
}
impl From<charlib21utils::Error> for CharError {
    fn from(e: charlib21utils::Error) -> Self {
        Self::Codec(e)
    }
}
impl From<std::io::Error> for CharError {
    fn from(e: std::io::Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl From<String> for CharError {
    /// Convert string-based errors by wrapping them
    fn from(e: String) -> Self {
        Self::Str(e)
    }
}
impl From<&str> for CharError {
    /// Convert string-based errors by wrapping them
    fn from(e: &str) -> Self {
        Self::Str(e.into())
    }
}
impl std::fmt::Display for CharError {
    /// Delegates to the [Debug] implementation
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        std::fmt::Debug::fmt(self, f)
    }
}
impl std::error::Error for CharError {}

/// CharLib21 Library-Wide Result Type
pub type CharResult<T> = Result<T, CharError>;

// Implement the serialization to/from file trait for snapshots and cells
impl charlib21utils::SerdeFile for CharLibrary {}
impl charlib21utils::SerdeFile for CharCell {}
