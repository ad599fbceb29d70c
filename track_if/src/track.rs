//! # Race track
//!
//! An ordered, named collection of gates plus the initial and final flight
//! states of the race. The race track owns the track file format: it writes
//! the boundary states, the order list, then one record per gate in order,
//! and reads the same layout back.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info, warn};
use nalgebra::Vector3;
use serde_yaml::{Mapping, Value};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::{
    emit::{self, EmitterConfig},
    error::{SerializationError, ValidationError},
    gate::Gate,
    shape::OutlineOptions,
    state::FlightState,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

pub const INIT_STATE_KEY: &str = "initState";
pub const END_STATE_KEY: &str = "endState";

/// Key of the order list written by this crate.
pub const ORDER_KEY: &str = "orders";

/// Order list key used by older track files, accepted when reading.
pub const LEGACY_ORDER_KEY: &str = "Order";

/// File stem used when saving a track with no name.
pub const DEFAULT_FILE_STEM: &str = "racetrack";

const FILE_EXTENSION: &str = "yaml";

/// Top level keys of the track file, which gates cannot be named after.
const RESERVED_KEYS: &[&str] = &[INIT_STATE_KEY, END_STATE_KEY, ORDER_KEY, LEGACY_ORDER_KEY];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A race course.
///
/// The order list is always exactly the set of gate names, in the order the
/// gates were added.
#[derive(Debug, Clone)]
pub struct RaceTrack {
    pub init_state: FlightState,
    pub end_state: FlightState,
    pub name: Option<String>,

    order: Vec<String>,
    gates: HashMap<String, Gate>,

    /// Highest auto-name index issued so far, never reset
    gate_counter: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RaceTrack {
    /// Create a track with no gates.
    pub fn new(init_state: FlightState, end_state: FlightState) -> Self {
        Self {
            init_state,
            end_state,
            name: None,
            order: Vec::new(),
            gates: HashMap::new(),
            gate_counter: 0,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Add a gate at the end of the course, returning its name.
    ///
    /// Without an explicit name the gate is called `Gate<N>`, with `N` one
    /// more than the highest index ever issued by this track. Explicit names
    /// must be unique and must not be one of the track file's top level keys.
    pub fn add_gate(&mut self, gate: Gate, name: Option<&str>) -> Result<String, ValidationError> {
        let name = match name {
            Some(n) => {
                if RESERVED_KEYS.contains(&n) {
                    return Err(ValidationError::ReservedGateName(n.to_string()));
                }
                if self.gates.contains_key(n) {
                    return Err(ValidationError::DuplicateGateName(n.to_string()));
                }
                n.to_string()
            }
            None => self.next_gate_name(),
        };

        debug!("Adding {} gate {}", gate.kind().name(), name);

        self.order.push(name.clone());
        self.gates.insert(name.clone(), gate);

        Ok(name)
    }

    /// Remove every gate. The auto-name counter is kept.
    pub fn clear_gates(&mut self) {
        self.order.clear();
        self.gates.clear();
    }

    /// Remove a gate by name. The auto-name counter is kept.
    pub fn remove_gate(&mut self, name: &str) -> Option<Gate> {
        let gate = self.gates.remove(name)?;
        self.order.retain(|n| n != name);
        Some(gate)
    }

    pub fn gate(&self, name: &str) -> Option<&Gate> {
        self.gates.get(name)
    }

    /// Gate names in course order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Iterate over `(name, gate)` in course order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Gate)> {
        self.order
            .iter()
            .filter_map(move |n| self.gates.get(n).map(|g| (n.as_str(), g)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Closed outline of every gate, in course order.
    pub fn outlines(&self, opts: &OutlineOptions) -> Vec<(String, Vec<Vector3<f64>>)> {
        self.iter()
            .map(|(n, g)| (n.to_string(), g.outline(opts)))
            .collect()
    }

    // ---- SERIALIZATION ----

    /// Write the track in the track file format.
    ///
    /// Each top level entry is written as its own block, separated by a
    /// blank line.
    pub fn serialize(&self, cfg: &EmitterConfig) -> String {
        let mut entries = vec![
            (
                INIT_STATE_KEY.to_string(),
                Value::Mapping(self.init_state.to_fields()),
            ),
            (
                END_STATE_KEY.to_string(),
                Value::Mapping(self.end_state.to_fields()),
            ),
            (
                ORDER_KEY.to_string(),
                Value::Sequence(self.order.iter().cloned().map(Value::String).collect()),
            ),
        ];

        for (name, gate) in self.iter() {
            entries.push((name.to_string(), Value::Mapping(gate.to_record())));
        }

        entries
            .into_iter()
            .map(|(k, v)| {
                let mut block = Mapping::new();
                block.insert(Value::String(k), v);
                emit::to_string(&Value::Mapping(block), cfg)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Write the track with the default layout.
    pub fn to_yaml_string(&self) -> String {
        self.serialize(&EmitterConfig::default())
    }

    /// Parse a track from the track file format.
    pub fn from_yaml_str(text: &str) -> Result<Self, SerializationError> {
        let doc = parse_document(text)?;

        let mut track = Self::new(doc.init_state, doc.end_state);
        for (name, gate) in doc.gates {
            track.add_gate(gate, Some(&name))?;
        }

        Ok(track)
    }

    /// Replace the states and gates of this track with those in `text`.
    ///
    /// Gates are added in order list order under their recorded names. On
    /// error the track is left unchanged.
    pub fn deserialize(&mut self, text: &str) -> Result<(), SerializationError> {
        let doc = parse_document(text)?;

        self.init_state = doc.init_state;
        self.end_state = doc.end_state;
        self.clear_gates();
        for (name, gate) in doc.gates {
            self.add_gate(gate, Some(&name))?;
        }

        Ok(())
    }

    // ---- FILES ----

    /// Save the track into `dir` as `<name>.yaml`, or `racetrack.yaml` if
    /// the track has no name.
    ///
    /// If `overwrite` is false and the file exists, `_1`, `_2`, ... are
    /// appended to the stem until a free name is found. The file is written
    /// to a temporary file then renamed into place.
    pub fn save_to_dir<P: AsRef<Path>>(
        &self,
        dir: P,
        overwrite: bool,
        cfg: &EmitterConfig,
    ) -> Result<PathBuf, SerializationError> {
        if self.is_empty() {
            return Err(SerializationError::NoGates);
        }

        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| SerializationError::Io(dir.to_path_buf(), e))?;

        let stem = self.name.as_deref().unwrap_or(DEFAULT_FILE_STEM);
        let mut path = dir.join(format!("{}.{}", stem, FILE_EXTENSION));

        if !overwrite {
            let mut counter = 1;
            while path.exists() {
                path = dir.join(format!("{}_{}.{}", stem, counter, FILE_EXTENSION));
                counter += 1;
            }
            if counter > 1 {
                warn!("Track file already exists, saving as {:?} instead", path);
            }
        }

        let tmp_path = dir.join(format!(".{}.{}.tmp", stem, std::process::id()));
        fs::write(&tmp_path, self.serialize(cfg))
            .map_err(|e| SerializationError::Io(tmp_path.clone(), e))?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            SerializationError::Io(path.clone(), e)
        })?;

        info!("Race track saved to {:?}", path);

        Ok(path)
    }

    /// Load a track file. The track is named after the file stem.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SerializationError> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).map_err(|e| SerializationError::Io(path.to_path_buf(), e))?;

        let mut track = Self::from_yaml_str(&text)?;
        track.name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(String::from);

        info!(
            "Loaded race track {:?} with {} gates from {:?}",
            track.name.as_deref().unwrap_or(DEFAULT_FILE_STEM),
            track.len(),
            path
        );

        Ok(track)
    }

    fn next_gate_name(&mut self) -> String {
        loop {
            self.gate_counter += 1;
            let name = format!("Gate{}", self.gate_counter);
            if !self.gates.contains_key(&name) {
                return name;
            }
        }
    }
}

/// Tracks are equal if their states, order lists and gates are equal. The
/// name and auto-name counter are not compared.
impl PartialEq for RaceTrack {
    fn eq(&self, other: &Self) -> bool {
        self.init_state == other.init_state
            && self.end_state == other.end_state
            && self.order == other.order
            && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Fully parsed contents of a track document.
struct TrackDocument {
    init_state: FlightState,
    end_state: FlightState,
    gates: Vec<(String, Gate)>,
}

fn parse_document(text: &str) -> Result<TrackDocument, SerializationError> {
    let root: Value = serde_yaml::from_str(text).map_err(SerializationError::Parse)?;
    let root = match root {
        Value::Mapping(m) => m,
        _ => {
            return Err(SerializationError::InvalidStructure(
                "the document is not a mapping".into(),
            ))
        }
    };

    let init_state = FlightState::from_fields(section(&root, INIT_STATE_KEY)?)?;
    let end_state = FlightState::from_fields(section(&root, END_STATE_KEY)?)?;

    let order_key = match (
        root.contains_key(ORDER_KEY),
        root.contains_key(LEGACY_ORDER_KEY),
    ) {
        (true, false) => ORDER_KEY,
        (false, true) => LEGACY_ORDER_KEY,
        (true, true) => return Err(SerializationError::UnexpectedKey(LEGACY_ORDER_KEY.into())),
        (false, false) => return Err(SerializationError::MissingKey(ORDER_KEY.into())),
    };

    let order: Vec<String> = match root.get(order_key) {
        Some(Value::Sequence(s)) => s
            .iter()
            .map(|v| match v {
                Value::String(n) => Ok(n.clone()),
                _ => Err(SerializationError::InvalidStructure(format!(
                    "`{}` must be a list of gate names",
                    order_key
                ))),
            })
            .collect::<Result<_, _>>()?,
        Some(Value::Null) => Vec::new(),
        _ => {
            return Err(SerializationError::InvalidStructure(format!(
                "`{}` must be a list of gate names",
                order_key
            )))
        }
    };

    for (i, name) in order.iter().enumerate() {
        if RESERVED_KEYS.contains(&name.as_str()) {
            return Err(ValidationError::ReservedGateName(name.clone()).into());
        }
        if order[..i].contains(name) {
            return Err(ValidationError::DuplicateGateName(name.clone()).into());
        }
    }

    for key in root.keys() {
        let known = match key.as_str() {
            Some(k) => {
                k == INIT_STATE_KEY
                    || k == END_STATE_KEY
                    || k == order_key
                    || order.iter().any(|n| n == k)
            }
            None => false,
        };
        if !known {
            return Err(SerializationError::UnexpectedKey(match key.as_str() {
                Some(k) => k.to_string(),
                None => format!("{:?}", key),
            }));
        }
    }

    let gates = order
        .into_iter()
        .map(|name| {
            let gate = Gate::from_record(section(&root, &name)?)?;
            Ok((name, gate))
        })
        .collect::<Result<Vec<_>, SerializationError>>()?;

    Ok(TrackDocument {
        init_state,
        end_state,
        gates,
    })
}

/// Get a top level section which must be a mapping.
fn section<'a>(root: &'a Mapping, key: &str) -> Result<&'a Mapping, SerializationError> {
    match root.get(key) {
        Some(Value::Mapping(m)) => Ok(m),
        Some(_) => Err(SerializationError::InvalidStructure(format!(
            "`{}` must be a mapping",
            key
        ))),
        None => Err(SerializationError::MissingKey(key.to_string())),
    }
}
