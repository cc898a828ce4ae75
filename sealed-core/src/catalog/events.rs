//! Streaming JSON event walker
//!
//! Drives a `serde_json` deserializer over a reader and reports every
//! structural step as an event with an ijson-style path (`item` marks array
//! elements). Nothing is materialized: a map key or a scalar is handed to the
//! sink and dropped again.

use serde::de::{self, DeserializeSeed, MapAccess, SeqAccess, Visitor};
use std::fmt;
use std::io::{BufReader, Read};

/// One step of the path from the document root to the current value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Item,
}

impl PathSegment {
    pub fn key(&self) -> Option<&str> {
        match self {
            PathSegment::Key(key) => Some(key),
            PathSegment::Item => None,
        }
    }
}

/// Render a path the way ijson prefixes look (`data.ABC.cards.item`)
pub fn format_path(path: &[PathSegment]) -> String {
    path.iter()
        .map(|segment| match segment {
            PathSegment::Key(key) => key.as_str(),
            PathSegment::Item => "item",
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// A leaf value in the document
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Str(&'a str),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Null,
}

impl Scalar<'_> {
    /// Text form of strings and numbers; `None` for bools and null
    pub fn to_text(&self) -> Option<String> {
        match self {
            Scalar::Str(s) => Some((*s).to_string()),
            Scalar::Int(n) => Some(n.to_string()),
            Scalar::UInt(n) => Some(n.to_string()),
            Scalar::Float(n) => Some(n.to_string()),
            Scalar::Bool(_) | Scalar::Null => None,
        }
    }
}

/// Structural events, reported at the path of the value they belong to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JsonEvent<'a> {
    StartMap,
    /// A key of the map at the current path; the value follows at `path.key`
    MapKey(&'a str),
    EndMap,
    StartArray,
    EndArray,
    Scalar(Scalar<'a>),
}

/// Receiver of walker events
pub trait EventSink {
    fn on_event(&mut self, path: &[PathSegment], event: JsonEvent<'_>);
}

/// Walk a JSON document from `reader`, forwarding every event to `sink`.
///
/// Single forward pass; the reader is never rewound.
pub fn walk_reader<R: Read, S: EventSink>(reader: R, sink: &mut S) -> serde_json::Result<()> {
    let mut deserializer = serde_json::Deserializer::from_reader(BufReader::new(reader));
    let mut path = Vec::new();

    Walk {
        sink,
        path: &mut path,
    }
    .deserialize(&mut deserializer)?;

    deserializer.end()
}

/// Walk an in-memory JSON document
pub fn walk_slice<S: EventSink>(bytes: &[u8], sink: &mut S) -> serde_json::Result<()> {
    walk_reader(bytes, sink)
}

struct Walk<'s, S> {
    sink: &'s mut S,
    path: &'s mut Vec<PathSegment>,
}

impl<'s, S: EventSink> Walk<'s, S> {
    fn emit(&mut self, event: JsonEvent<'_>) {
        self.sink.on_event(self.path.as_slice(), event);
    }

    fn child(&mut self) -> Walk<'_, S> {
        Walk {
            sink: &mut *self.sink,
            path: &mut *self.path,
        }
    }
}

impl<'de, S: EventSink> DeserializeSeed<'de> for Walk<'_, S> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de, S: EventSink> Visitor<'de> for Walk<'_, S> {
    type Value = ();

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(mut self, value: bool) -> Result<(), E> {
        self.emit(JsonEvent::Scalar(Scalar::Bool(value)));
        Ok(())
    }

    fn visit_i64<E: de::Error>(mut self, value: i64) -> Result<(), E> {
        self.emit(JsonEvent::Scalar(Scalar::Int(value)));
        Ok(())
    }

    fn visit_u64<E: de::Error>(mut self, value: u64) -> Result<(), E> {
        self.emit(JsonEvent::Scalar(Scalar::UInt(value)));
        Ok(())
    }

    fn visit_f64<E: de::Error>(mut self, value: f64) -> Result<(), E> {
        self.emit(JsonEvent::Scalar(Scalar::Float(value)));
        Ok(())
    }

    fn visit_str<E: de::Error>(mut self, value: &str) -> Result<(), E> {
        self.emit(JsonEvent::Scalar(Scalar::Str(value)));
        Ok(())
    }

    fn visit_unit<E: de::Error>(mut self) -> Result<(), E> {
        self.emit(JsonEvent::Scalar(Scalar::Null));
        Ok(())
    }

    fn visit_none<E: de::Error>(self) -> Result<(), E> {
        self.visit_unit()
    }

    fn visit_seq<A>(mut self, mut seq: A) -> Result<(), A::Error>
    where
        A: SeqAccess<'de>,
    {
        self.emit(JsonEvent::StartArray);
        self.path.push(PathSegment::Item);
        while seq.next_element_seed(self.child())?.is_some() {}
        self.path.pop();
        self.emit(JsonEvent::EndArray);
        Ok(())
    }

    fn visit_map<M>(mut self, mut map: M) -> Result<(), M::Error>
    where
        M: MapAccess<'de>,
    {
        self.emit(JsonEvent::StartMap);
        while let Some(key) = map.next_key::<String>()? {
            self.emit(JsonEvent::MapKey(&key));
            self.path.push(PathSegment::Key(key));
            map.next_value_seed(self.child())?;
            self.path.pop();
        }
        self.emit(JsonEvent::EndMap);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Recorder {
        lines: Vec<String>,
    }

    impl EventSink for Recorder {
        fn on_event(&mut self, path: &[PathSegment], event: JsonEvent<'_>) {
            let event = match event {
                JsonEvent::StartMap => "start_map".to_string(),
                JsonEvent::MapKey(key) => format!("map_key {key}"),
                JsonEvent::EndMap => "end_map".to_string(),
                JsonEvent::StartArray => "start_array".to_string(),
                JsonEvent::EndArray => "end_array".to_string(),
                JsonEvent::Scalar(value) => format!("scalar {:?}", value.to_text()),
            };
            self.lines.push(format!("{} {}", format_path(path), event).trim().to_string());
        }
    }

    #[test]
    fn test_events_follow_ijson_prefixes() {
        let json = br#"{"ABC": {"cards": [{"number": "1", "uuid": null}]}}"#;
        let mut recorder = Recorder::default();
        walk_slice(json, &mut recorder).unwrap();

        assert_eq!(
            recorder.lines,
            vec![
                "start_map",
                "map_key ABC",
                "ABC start_map",
                "ABC map_key cards",
                "ABC.cards start_array",
                "ABC.cards.item start_map",
                "ABC.cards.item map_key number",
                "ABC.cards.item.number scalar Some(\"1\")",
                "ABC.cards.item map_key uuid",
                "ABC.cards.item.uuid scalar None",
                "ABC.cards.item end_map",
                "ABC.cards end_array",
                "ABC end_map",
                "end_map",
            ]
        );
    }

    #[test]
    fn test_numbers_and_bools() {
        let json = br#"[1, -2, 2.5, true]"#;
        let mut recorder = Recorder::default();
        walk_slice(json, &mut recorder).unwrap();

        assert_eq!(
            recorder.lines,
            vec![
                "start_array",
                "item scalar Some(\"1\")",
                "item scalar Some(\"-2\")",
                "item scalar Some(\"2.5\")",
                "item scalar None",
                "end_array",
            ]
        );
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let mut recorder = Recorder::default();
        assert!(walk_slice(br#"{"ABC": {"cards": [}"#, &mut recorder).is_err());
    }

    #[test]
    fn test_trailing_garbage_is_rejected() {
        let mut recorder = Recorder::default();
        assert!(walk_slice(br#"{} {}"#, &mut recorder).is_err());
    }
}
