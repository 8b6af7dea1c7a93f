//! Loading JSON documents into a graph
//!
//! Objects become `HashMap` nodes keyed by string, arrays become `List`
//! nodes. Integral numbers that fit an `i64` become `Int`, every other number
//! `Float`.

use serde_json::Value as Json;

use super::graph::Graph;
use super::value::Value;
use crate::errors::Result;

impl Graph {
    /// Import a JSON document, returning its root value
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the node arena is exhausted.
    pub fn import_json(&mut self, json: &Json) -> Result<Value> {
        let value = match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            Json::String(s) => Value::Str(s.clone()),
            Json::Array(items) => {
                let list = self.new_list()?;
                for item in items {
                    let element = self.import_json(item)?;
                    self.push(list, element)?;
                }
                Value::Node(list)
            }
            Json::Object(fields) => {
                let map = self.hash_map()?;
                for (key, item) in fields {
                    let element = self.import_json(item)?;
                    self.insert(map, key.as_str(), element)?;
                }
                Value::Node(map)
            }
        };
        Ok(value)
    }

    /// Parse and import a JSON text
    ///
    /// # Errors
    ///
    /// Returns `Serialization` for malformed JSON.
    pub fn import_json_str(&mut self, text: &str) -> Result<Value> {
        let json: Json = serde_json::from_str(text)?;
        self.import_json(&json)
    }
}
