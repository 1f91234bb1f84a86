use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

use super::types::{MoveId, Transition};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
	#[error("request failed: {0}")]
	Network(String),

	#[error("server answered {status} {status_text}")]
	Status { status: u16, status_text: String },

	#[error("could not encode request body: {0}")]
	Encode(String),
}

impl From<JsValue> for ApiError {
	fn from(value: JsValue) -> Self {
		let message = value
			.dyn_ref::<js_sys::Error>()
			.map(|err| String::from(err.message()))
			.or_else(|| value.as_string())
			.unwrap_or_else(|| format!("{:?}", value));
		ApiError::Network(message)
	}
}

impl From<serde_json::Error> for ApiError {
	fn from(err: serde_json::Error) -> Self {
		ApiError::Encode(err.to_string())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConnectError {
	#[error("move {0} cannot transition to itself")]
	SelfLoop(MoveId),

	#[error("transition {0} already exists")]
	Duplicate(Transition),
}
