use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde_json::{Value, json};
use tracing::debug;

use crate::query::Query;
use crate::{Document, DocumentStream, Engine, EngineError};

/// Virtual collection listing every user collection with its document count.
pub const SYSTEM_COLLECTIONS: &str = "$collections";

/// Engine over named collections of JSON documents held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
	collections: BTreeMap<String, Vec<Document>>,
}

impl MemoryEngine {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Add (or replace) a collection.
	#[must_use]
	pub fn with_collection(mut self, name: impl Into<String>, documents: Vec<Document>) -> Self {
		self.collections.insert(name.into(), documents);
		self
	}

	/// Load collections from a JSON file shaped as `{ "name": [doc, ...], ... }`.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, EngineError> {
		let path = path.as_ref();
		let file = File::open(path)
			.map_err(|err| EngineError::Resource(format!("{}: {err}", path.display())))?;
		let engine = Self::from_reader(BufReader::new(file))?;
		debug!(
			path = %path.display(),
			collections = engine.collections.len(),
			"loaded document collections"
		);
		Ok(engine)
	}

	pub fn from_reader(reader: impl Read) -> Result<Self, EngineError> {
		let root: Value = serde_json::from_reader(reader)?;
		let Value::Object(entries) = root else {
			return Err(EngineError::Load(
				"top level must be an object of collections".into(),
			));
		};

		let mut collections = BTreeMap::new();
		for (name, value) in entries {
			let Value::Array(documents) = value else {
				return Err(EngineError::Load(format!(
					"collection '{name}' must be an array of documents"
				)));
			};
			collections.insert(name, documents);
		}

		Ok(Self { collections })
	}

	pub fn len(&self) -> usize {
		self.collections.len()
	}

	pub fn is_empty(&self) -> bool {
		self.collections.is_empty()
	}

	fn system_collections(&self) -> Vec<Document> {
		self.collections
			.iter()
			.map(|(name, documents)| json!({ "name": name, "count": documents.len() }))
			.collect()
	}
}

impl Engine for MemoryEngine {
	fn run(&self, text: &str) -> Result<DocumentStream<'_>, EngineError> {
		let query = Query::parse(text)?;

		let source: Box<dyn Iterator<Item = Document> + '_> =
			if query.collection == SYSTEM_COLLECTIONS {
				Box::new(self.system_collections().into_iter())
			} else {
				let documents = self
					.collections
					.get(&query.collection)
					.ok_or_else(|| EngineError::UnknownCollection(query.collection.clone()))?;
				Box::new(documents.iter().cloned())
			};

		let Query {
			projection,
			filter,
			limit,
			offset,
			..
		} = query;

		let matching = source
			.filter(move |document| filter.as_ref().is_none_or(|filter| filter.matches(document)))
			.skip(offset)
			.take(limit.unwrap_or(usize::MAX))
			.map(move |document| Ok(projection.apply(&document)));

		Ok(Box::new(matching))
	}

	fn collection_names(&self) -> Vec<String> {
		self.collections.keys().cloned().collect()
	}

	fn system_collection_names(&self) -> Vec<String> {
		vec![SYSTEM_COLLECTIONS.to_string()]
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use super::*;

	fn customers() -> MemoryEngine {
		MemoryEngine::new().with_collection(
			"customers",
			vec![
				json!({ "_id": 1, "name": "Ada", "active": true, "address": { "city": "Oslo" } }),
				json!({ "_id": 2, "name": "Lin", "active": false }),
				json!({ "_id": 3, "name": "Sam", "active": true }),
			],
		)
	}

	fn collect(engine: &MemoryEngine, query: &str) -> Vec<Document> {
		engine
			.run(query)
			.expect("run")
			.collect::<Result<_, _>>()
			.expect("documents")
	}

	#[test]
	fn select_whole_documents() {
		let docs = collect(&customers(), "SELECT $ FROM customers");
		assert_eq!(docs.len(), 3);
		assert_eq!(docs[0]["name"], "Ada");
	}

	#[test]
	fn where_limit_and_offset_apply_in_order() {
		let docs = collect(
			&customers(),
			"SELECT name FROM customers WHERE active = true LIMIT 1 OFFSET 1",
		);
		assert_eq!(docs, vec![json!({ "name": "Sam" })]);
	}

	#[test]
	fn nested_paths_project_last_segment() {
		let docs = collect(&customers(), "SELECT $.address.city FROM customers LIMIT 1");
		assert_eq!(docs, vec![json!({ "city": "Oslo" })]);
	}

	#[test]
	fn system_collections_are_listed_apart_from_user_ones() {
		let engine = customers();
		assert_eq!(engine.collection_names(), vec!["customers".to_string()]);
		assert_eq!(engine.system_collection_names(), vec![SYSTEM_COLLECTIONS.to_string()]);
	}

	#[test]
	fn unknown_collection_is_reported_before_streaming() {
		let err = customers().run("SELECT $ FROM orders").err().expect("error");
		assert_eq!(err, EngineError::UnknownCollection("orders".into()));
	}

	#[test]
	fn stream_is_lazy_and_can_be_dropped_early() {
		let docs: Vec<Document> = (0..10_000).map(|i| json!({ "i": i })).collect();
		let engine = MemoryEngine::new().with_collection("big", docs);
		let mut stream = engine.run("SELECT $ FROM big").expect("run");
		assert_eq!(stream.next().and_then(Result::ok), Some(json!({ "i": 0 })));
		drop(stream);
	}

	#[test]
	fn system_collection_lists_counts() {
		let docs = collect(&customers(), "SELECT $ FROM $collections");
		assert_eq!(docs, vec![json!({ "name": "customers", "count": 3 })]);
	}

	#[test]
	fn loads_collections_from_file() {
		let mut file = tempfile::NamedTempFile::new().expect("temp file");
		write!(file, r#"{{ "orders": [{{ "total": 5 }}], "empty": [] }}"#).expect("write");

		let engine = MemoryEngine::open(file.path()).expect("open");
		assert_eq!(engine.collection_names(), vec!["empty", "orders"]);
		assert_eq!(collect(&engine, "SELECT total FROM orders"), vec![json!({ "total": 5 })]);
	}

	#[test]
	fn rejects_non_array_collections() {
		let err = MemoryEngine::from_reader(r#"{ "bad": 1 }"#.as_bytes()).unwrap_err();
		assert!(matches!(err, EngineError::Load(_)));
	}
}
