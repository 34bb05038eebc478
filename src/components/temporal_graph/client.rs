use serde::Deserialize;
use thiserror::Error;

use super::types::{EdgeInput, NodeInput};

pub const DEFAULT_ENDPOINT: &str = "/graph-data";

/// Failure surface of the subgraph query.
#[derive(Debug, Error)]
pub enum FetchError {
	#[error("request failed: {0}")]
	Transport(#[from] reqwest::Error),
	#[error("server error ({status}): {message}")]
	Server { status: u16, message: String },
	#[error("malformed response: {0}")]
	Decode(String),
}

/// Wire format of the data service. `nodes` and `links` must both be present;
/// a missing field fails the whole fetch rather than leaking partial data
/// into the model.
#[derive(Debug, Deserialize)]
struct SubgraphResponse {
	nodes: Vec<NodeRecord>,
	links: Vec<LinkRecord>,
	min_timestamp: i64,
	max_timestamp: i64,
}

#[derive(Debug, Deserialize)]
struct NodeRecord {
	id: String,
	label: Option<String>,
	degree: u32,
}

#[derive(Debug, Deserialize)]
struct LinkRecord {
	source: String,
	target: String,
	timestamp: i64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
	error: String,
}

/// A validated, normalized subgraph ready to merge into the model.
#[derive(Debug)]
pub struct Subgraph {
	pub nodes: Vec<NodeInput>,
	pub edges: Vec<EdgeInput>,
	pub min_timestamp: i64,
	pub max_timestamp: i64,
}

/// Requests a time-windowed subgraph from the data service.
pub struct SubgraphClient {
	http: reqwest::Client,
	endpoint: String,
}

impl SubgraphClient {
	pub fn new(endpoint: impl Into<String>) -> Self {
		Self {
			http: reqwest::Client::new(),
			endpoint: endpoint.into(),
		}
	}

	/// Fetch the subgraph whose relation timestamps fall in `[start, end]`.
	/// Absent bounds mean "entire dataset" (the bootstrap request).
	pub async fn fetch(
		&self,
		start: Option<i64>,
		end: Option<i64>,
	) -> Result<Subgraph, FetchError> {
		let mut query: Vec<(&str, String)> = Vec::new();
		if let Some(start) = start {
			query.push(("start_time", start.to_string()));
		}
		if let Some(end) = end {
			query.push(("end_time", end.to_string()));
		}

		let response = self
			.http
			.get(self.endpoint.as_str())
			.query(&query)
			.send()
			.await?;
		let status = response.status();
		let body = response.text().await?;

		if !status.is_success() {
			return Err(FetchError::Server {
				status: status.as_u16(),
				message: server_message(&body, status.as_u16()),
			});
		}

		parse_subgraph(&body)
	}
}

/// Pull a human-readable message out of a failure body when the service
/// supplied one, else fall back to the status line.
fn server_message(body: &str, status: u16) -> String {
	serde_json::from_str::<ErrorBody>(body)
		.map(|b| b.error)
		.unwrap_or_else(|_| format!("request rejected with status {status}"))
}

fn parse_subgraph(body: &str) -> Result<Subgraph, FetchError> {
	let raw: SubgraphResponse =
		serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

	let nodes = raw
		.nodes
		.into_iter()
		.map(|record| NodeInput {
			label: record.label.unwrap_or_else(|| record.id.clone()),
			id: record.id,
			degree: record.degree,
		})
		.collect();
	let edges = raw
		.links
		.into_iter()
		.map(|record| EdgeInput {
			source: record.source,
			target: record.target,
			timestamp: record.timestamp,
		})
		.collect();

	Ok(Subgraph {
		nodes,
		edges,
		min_timestamp: raw.min_timestamp,
		max_timestamp: raw.max_timestamp,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_a_full_response() {
		let body = r#"{
			"nodes": [
				{"id": "a", "label": "Channel A", "degree": 2},
				{"id": "b", "degree": 0}
			],
			"links": [{"source": "a", "target": "b", "timestamp": 1000}],
			"min_timestamp": 1000,
			"max_timestamp": 2000
		}"#;

		let subgraph = parse_subgraph(body).unwrap();
		assert_eq!(subgraph.nodes.len(), 2);
		assert_eq!(subgraph.nodes[0].label, "Channel A");
		assert_eq!(subgraph.nodes[1].label, "b");
		assert_eq!(subgraph.edges.len(), 1);
		assert_eq!(subgraph.min_timestamp, 1000);
		assert_eq!(subgraph.max_timestamp, 2000);
	}

	#[test]
	fn missing_links_field_fails_fast() {
		let body = r#"{"nodes": [], "min_timestamp": 0, "max_timestamp": 0}"#;
		assert!(matches!(parse_subgraph(body), Err(FetchError::Decode(_))));
	}

	#[test]
	fn negative_degree_is_rejected() {
		let body = r#"{
			"nodes": [{"id": "a", "degree": -3}],
			"links": [],
			"min_timestamp": 0,
			"max_timestamp": 0
		}"#;
		assert!(matches!(parse_subgraph(body), Err(FetchError::Decode(_))));
	}

	#[test]
	fn server_message_prefers_the_error_body() {
		let msg = server_message(r#"{"error": "database connection not available"}"#, 503);
		assert_eq!(msg, "database connection not available");
	}

	#[test]
	fn server_message_falls_back_to_status() {
		assert_eq!(
			server_message("<html>oops</html>", 500),
			"request rejected with status 500"
		);
	}
}
