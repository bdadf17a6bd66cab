//! Execution engine boundary consumed by the `qlanes` lane workers.
//!
//! An [`Engine`] turns query text into a lazily produced [`DocumentStream`].
//! Lane workers pull at most a display-limit worth of documents and then drop
//! the stream, so implementations must release whatever they hold when the
//! iterator is dropped early.
//!
//! [`MemoryEngine`] is the bundled implementation: JSON collections held in
//! memory and a small `SELECT ... FROM ...` dialect.
//!
//! ```
//! use qlanes_engine::{Engine, MemoryEngine};
//! use serde_json::json;
//!
//! let engine = MemoryEngine::new()
//!     .with_collection("customers", vec![json!({ "name": "Ada" }), json!({ "name": "Lin" })]);
//!
//! let names: Vec<_> = engine
//!     .run("SELECT name FROM customers LIMIT 1")
//!     .unwrap()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(names, vec![json!({ "name": "Ada" })]);
//! ```

mod error;
mod memory;
mod query;

pub use error::EngineError;
pub use memory::{MemoryEngine, SYSTEM_COLLECTIONS};
pub use query::{Filter, Projection, Query};

/// Result document produced by an engine.
pub type Document = serde_json::Value;

/// Lazily produced query results. Dropping the iterator closes the stream.
pub type DocumentStream<'a> = Box<dyn Iterator<Item = Result<Document, EngineError>> + 'a>;

/// Synchronous query executor shared by every lane.
pub trait Engine: Send + Sync {
	/// Prepare `query` and return a stream over its results.
	///
	/// Errors detected before the first document (syntax, unknown collection)
	/// are returned directly; faults hit while producing documents surface as
	/// `Err` items inside the stream.
	fn run(&self, query: &str) -> Result<DocumentStream<'_>, EngineError>;

	/// Names of the collections a consumer may browse.
	fn collection_names(&self) -> Vec<String> {
		Vec::new()
	}

	/// Virtual collections the engine answers about itself.
	fn system_collection_names(&self) -> Vec<String> {
		Vec::new()
	}
}

impl<E: Engine + ?Sized> Engine for std::sync::Arc<E> {
	fn run(&self, query: &str) -> Result<DocumentStream<'_>, EngineError> {
		(**self).run(query)
	}

	fn collection_names(&self) -> Vec<String> {
		(**self).collection_names()
	}

	fn system_collection_names(&self) -> Vec<String> {
		(**self).system_collection_names()
	}
}
