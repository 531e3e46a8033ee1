//! [`Record`]: the unit of work the pool and the mining loop pass around —
//! a position, its optional parent, and whatever analysis has accumulated
//! for it so far. Serializes to the JSON object shape described in the
//! protocol's external interfaces: FEN strings for the positions, UCI
//! strings for moves, a structured array for the analysis grid.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::analysis::{Analysis, Output};
use crate::board::Position;

#[derive(Debug, Clone)]
pub struct Record {
    pub position: Position,
    pub parent: Option<Position>,
    pub engine: Option<String>,
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub analysis: Analysis,
    /// Set when this record's analysis failed; never serialized. A mining
    /// wave skips records carrying one rather than emitting or expanding them.
    pub error: Option<String>,
}

impl Record {
    pub fn new(position: Position) -> Record {
        Record {
            position,
            parent: None,
            engine: None,
            tags: Vec::new(),
            description: None,
            analysis: Analysis::new(),
            error: None,
        }
    }

    pub fn with_parent(position: Position, parent: Position) -> Record {
        Record { parent: Some(parent), ..Record::new(position) }
    }

    /// Renders this record as a JSON object, with `"kind"` inserted as the
    /// first key when given, for the mining loop's streaming sink.
    pub fn to_json_value(&self, kind: Option<&str>) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        if let Some(kind) = kind {
            map.insert("kind".to_owned(), serde_json::Value::String(kind.to_owned()));
        }
        map.insert("position".to_owned(), serde_json::Value::String(self.position.to_fen()));
        if let Some(parent) = &self.parent {
            map.insert("parent".to_owned(), serde_json::Value::String(parent.to_fen()));
        }
        if let Some(engine) = &self.engine {
            map.insert("engine".to_owned(), serde_json::Value::String(engine.clone()));
        }
        map.insert(
            "tags".to_owned(),
            serde_json::Value::Array(self.tags.iter().cloned().map(serde_json::Value::String).collect()),
        );
        if let Some(description) = &self.description {
            map.insert("description".to_owned(), serde_json::Value::String(description.clone()));
        }
        let outputs: Vec<&Output> = self.analysis.outputs().collect();
        map.insert(
            "analysis".to_owned(),
            serde_json::to_value(outputs).expect("Output serializes without error"),
        );
        serde_json::Value::Object(map)
    }
}

/// Mirrors the wire shape of [`Record::to_json_value`] without the `kind`
/// prefix, for plain (de)serialization via `serde_json`/`serde`.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let outputs: Vec<&Output> = self.analysis.outputs().collect();
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("position", &self.position.to_fen())?;
        if let Some(parent) = &self.parent {
            map.serialize_entry("parent", &parent.to_fen())?;
        }
        if let Some(engine) = &self.engine {
            map.serialize_entry("engine", engine)?;
        }
        map.serialize_entry("tags", &self.tags)?;
        if let Some(description) = &self.description {
            map.serialize_entry("description", description)?;
        }
        map.serialize_entry("analysis", &outputs)?;
        map.end()
    }
}

#[derive(Deserialize)]
struct RecordWire {
    position: String,
    parent: Option<String>,
    engine: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    description: Option<String>,
    #[serde(default)]
    analysis: Vec<Output>,
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = RecordWire::deserialize(deserializer)?;
        let position = Position::from_fen(&wire.position).map_err(de::Error::custom)?;
        let parent = wire.parent.map(|fen| Position::from_fen(&fen)).transpose().map_err(de::Error::custom)?;
        let mut analysis = Analysis::new();
        for output in wire.analysis {
            analysis.insert(output);
        }
        Ok(Record {
            position,
            parent,
            engine: wire.engine,
            tags: wire.tags,
            description: wire.description,
            analysis,
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let mut record = Record::new(crate::board::Position::starting());
        record.tags.push("opening".to_owned());
        record.engine = Some("stockfish".to_owned());
        record.analysis.insert(Output { pv_index: 1, depth: 3, ..Default::default() });

        let text = serde_json::to_string(&record).unwrap();
        let back: Record = serde_json::from_str(&text).unwrap();
        assert_eq!(back.position, record.position);
        assert_eq!(back.tags, record.tags);
        assert_eq!(back.engine, record.engine);
        assert_eq!(back.analysis.size(), 1);
    }

    #[test]
    fn streaming_value_puts_kind_first() {
        let record = Record::new(crate::board::Position::starting());
        let value = record.to_json_value(Some("puzzle"));
        let obj = value.as_object().unwrap();
        assert_eq!(obj.keys().next().map(String::as_str), Some("kind"));
        assert_eq!(obj.get("kind").unwrap().as_str(), Some("puzzle"));
    }

    #[test]
    fn plain_serialize_omits_kind() {
        let record = Record::new(crate::board::Position::starting());
        let text = serde_json::to_string(&record).unwrap();
        assert!(!text.contains("\"kind\""));
    }
}
