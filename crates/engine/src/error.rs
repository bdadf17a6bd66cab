use thiserror::Error;

/// Failures raised by an [`Engine`](crate::Engine) while preparing or producing results.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
	/// The query text could not be parsed.
	#[error("invalid query at offset {offset}: {message}")]
	InvalidQuery { offset: usize, message: String },

	/// The query referenced a collection the engine does not hold.
	#[error("collection '{0}' does not exist")]
	UnknownCollection(String),

	/// The engine failed while producing documents.
	#[error("execution failed: {0}")]
	Execution(String),

	/// An underlying resource (file, handle, memory) was unavailable.
	#[error("resource unavailable: {0}")]
	Resource(String),

	/// A data source could not be loaded into the engine.
	#[error("failed to load data: {0}")]
	Load(String),
}

impl EngineError {
	pub fn invalid_query(offset: usize, message: impl Into<String>) -> Self {
		Self::InvalidQuery {
			offset,
			message: message.into(),
		}
	}
}

impl From<serde_json::Error> for EngineError {
	fn from(err: serde_json::Error) -> Self {
		Self::Load(err.to_string())
	}
}

impl From<std::io::Error> for EngineError {
	fn from(err: std::io::Error) -> Self {
		Self::Resource(err.to_string())
	}
}
