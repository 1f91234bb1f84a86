use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

use super::error::ApiError;
use super::types::MoveId;

/// The four writes the move map makes. Each is a JSON POST whose response
/// body is ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StoreRequest {
	CreateTransition {
		from_move_id: MoveId,
		to_move_id: MoveId,
	},
	DeleteTransition {
		from_move_id: MoveId,
		to_move_id: MoveId,
	},
	SavePosition {
		id: MoveId,
		x: i32,
		y: i32,
	},
	DeleteMove {
		move_id: MoveId,
	},
}

impl StoreRequest {
	pub fn path(&self) -> &'static str {
		match self {
			StoreRequest::CreateTransition { .. } => "/create_transition",
			StoreRequest::DeleteTransition { .. } => "/delete_transition",
			StoreRequest::SavePosition { .. } => "/save_position",
			StoreRequest::DeleteMove { .. } => "/delete_move",
		}
	}

	pub fn body(&self) -> Result<String, ApiError> {
		Ok(serde_json::to_string(self)?)
	}
}

#[derive(Clone, Debug, Default)]
pub struct ApiClient {
	base_url: String,
}

impl ApiClient {
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into().trim_end_matches('/').to_owned(),
		}
	}

	pub fn url(&self, request: &StoreRequest) -> String {
		format!("{}{}", self.base_url, request.path())
	}

	pub async fn send(&self, request: &StoreRequest) -> Result<(), ApiError> {
		let opts = RequestInit::new();
		opts.set_method("POST");
		opts.set_mode(RequestMode::Cors);

		let headers = Headers::new()?;
		headers.append("Content-Type", "application/json")?;
		opts.set_headers(&headers);
		opts.set_body(&request.body()?.into());

		let fetch_request = Request::new_with_str_and_init(&self.url(request), &opts)?;
		let window = web_sys::window().ok_or_else(|| ApiError::Network("no window".into()))?;
		let resp: Response = JsFuture::from(window.fetch_with_request(&fetch_request))
			.await?
			.dyn_into()?;

		if !resp.ok() {
			return Err(ApiError::Status {
				status: resp.status(),
				status_text: resp.status_text(),
			});
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn body(request: &StoreRequest) -> serde_json::Value {
		serde_json::from_str(&request.body().unwrap()).unwrap()
	}

	#[test]
	fn bodies_carry_the_expected_fields() {
		assert_eq!(
			body(&StoreRequest::CreateTransition {
				from_move_id: MoveId(1),
				to_move_id: MoveId(2)
			}),
			json!({"from_move_id": 1, "to_move_id": 2})
		);
		assert_eq!(
			body(&StoreRequest::SavePosition {
				id: MoveId(3),
				x: 140,
				y: -12
			}),
			json!({"id": 3, "x": 140, "y": -12})
		);
		assert_eq!(
			body(&StoreRequest::DeleteMove { move_id: MoveId(9) }),
			json!({"move_id": 9})
		);
	}

	#[test]
	fn urls_join_base_and_path() {
		let request = StoreRequest::DeleteTransition {
			from_move_id: MoveId(1),
			to_move_id: MoveId(2),
		};
		assert_eq!(ApiClient::default().url(&request), "/delete_transition");
		assert_eq!(
			ApiClient::new("https://bjj.example/").url(&request),
			"https://bjj.example/delete_transition"
		);
	}
}
