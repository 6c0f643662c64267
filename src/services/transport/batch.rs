//! Batch coalescing for JSON-RPC calls.
//!
//! Combines logical calls issued within a short scheduling window into one
//! physical JSON-RPC batch request, cutting round trips to the daemon.
//! Responses are correlated back to their requests by id and returned in
//! caller order regardless of backend ordering. Daemons without batch
//! support degrade transparently to sequential dispatch.

use std::{
	collections::HashMap,
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
	time::Duration,
};

use serde_json::Value;
use tokio::sync::{oneshot, Mutex};
use tracing::warn;

use crate::{
	models::{RpcRequest, RpcResponse},
	services::transport::{HttpTransport, TransportError},
};

/// One parked logical call waiting for the window to flush.
struct PendingCall {
	request: RpcRequest,
	reply: oneshot::Sender<Result<RpcResponse, TransportError>>,
}

/// Coalesces concurrent JSON-RPC calls into physical batch requests.
///
/// Callers park on [`BatchCoalescer::submit`]; the pending queue flushes
/// after the scheduling window elapses or as soon as `max_batch` requests
/// are queued. A queue of one is dispatched as a plain single call.
pub struct BatchCoalescer {
	transport: Arc<HttpTransport>,
	window: Duration,
	max_batch: usize,
	/// Sticky: cleared the first time the daemon rejects an array payload.
	supports_batching: AtomicBool,
	queue: Mutex<Vec<PendingCall>>,
}

impl BatchCoalescer {
	/// Creates a coalescer in front of the given transport.
	///
	/// # Arguments
	/// * `transport` - Transport for the primary daemon
	/// * `window` - How long the first queued request holds the batch open
	/// * `max_batch` - Flush threshold for the pending queue
	pub fn new(transport: Arc<HttpTransport>, window: Duration, max_batch: usize) -> Self {
		Self {
			transport,
			window,
			max_batch: max_batch.max(1),
			supports_batching: AtomicBool::new(true),
			queue: Mutex::new(Vec::new()),
		}
	}

	/// Submits one logical call for coalesced dispatch.
	///
	/// The returned response may carry a JSON-RPC error object; mapping it
	/// to an error is the caller's concern.
	pub async fn submit(self: &Arc<Self>, request: RpcRequest) -> Result<RpcResponse, TransportError> {
		let method = request.method.clone();
		let (tx, rx) = oneshot::channel();

		{
			let mut queue = self.queue.lock().await;
			queue.push(PendingCall { request, reply: tx });

			if queue.len() >= self.max_batch {
				let drained = std::mem::take(&mut *queue);
				let coalescer = self.clone();
				tokio::spawn(async move { coalescer.dispatch(drained).await });
			} else if queue.len() == 1 {
				// First request of a new window: schedule the flush
				let coalescer = self.clone();
				tokio::spawn(async move {
					tokio::time::sleep(coalescer.window).await;
					let drained = {
						let mut queue = coalescer.queue.lock().await;
						std::mem::take(&mut *queue)
					};
					if !drained.is_empty() {
						coalescer.dispatch(drained).await;
					}
				});
			}
		}

		rx.await.map_err(|_| {
			TransportError::network(method, "batch dispatch dropped the reply channel")
		})?
	}

	/// Issues one physical batch call for `requests` and returns responses
	/// in caller order.
	///
	/// Falls back to sequential dispatch when the daemon does not accept
	/// batch payloads; callers observe no difference in shape.
	pub async fn batch(
		&self,
		requests: &[RpcRequest],
	) -> Result<Vec<RpcResponse>, TransportError> {
		if requests.is_empty() {
			return Ok(Vec::new());
		}

		if self.supports_batching.load(Ordering::Relaxed) {
			let body = serde_json::to_value(requests).map_err(|e| {
				TransportError::protocol("batch", format!("failed to encode batch: {}", e))
			})?;
			let raw = self
				.transport
				.post_json(&body, self.transport.default_timeout(), true, "batch")
				.await?;

			match raw {
				Value::Array(items) => return correlate(requests, items),
				// A single object instead of an array means the daemon
				// rejected the batch payload outright
				_ => {
					self.supports_batching.store(false, Ordering::Relaxed);
					warn!(
						source = self.transport.source_name(),
						"daemon rejected batch payload, switching to sequential dispatch"
					);
				}
			}
		}

		self.sequential(requests).await
	}

	/// Whether the daemon is still believed to support batch payloads.
	pub fn supports_batching(&self) -> bool {
		self.supports_batching.load(Ordering::Relaxed)
	}

	async fn sequential(
		&self,
		requests: &[RpcRequest],
	) -> Result<Vec<RpcResponse>, TransportError> {
		let mut responses = Vec::with_capacity(requests.len());
		for request in requests {
			responses.push(self.transport.call_raw(request).await?);
		}
		Ok(responses)
	}

	async fn dispatch(&self, mut pendings: Vec<PendingCall>) {
		if pendings.len() == 1 {
			let pending = pendings.remove(0);
			let result = self.transport.call_raw(&pending.request).await;
			let _ = pending.reply.send(result);
			return;
		}

		let requests: Vec<RpcRequest> = pendings.iter().map(|p| p.request.clone()).collect();
		match self.batch(&requests).await {
			Ok(responses) => {
				for (pending, response) in pendings.into_iter().zip(responses) {
					let _ = pending.reply.send(Ok(response));
				}
			}
			Err(error) => {
				for pending in pendings {
					let _ = pending.reply.send(Err(error.clone()));
				}
			}
		}
	}
}

/// Reorders raw batch items into caller order by request id.
///
/// A response list shorter than the request list, an entry without an id,
/// or an id with no matching request is a protocol error.
fn correlate(
	requests: &[RpcRequest],
	items: Vec<Value>,
) -> Result<Vec<RpcResponse>, TransportError> {
	let mut by_id: HashMap<String, RpcResponse> = HashMap::with_capacity(items.len());
	for item in items {
		let response: RpcResponse = serde_json::from_value(item).map_err(|e| {
			TransportError::protocol("batch", format!("malformed batch entry: {}", e))
		})?;
		let id = response.correlation_id().ok_or_else(|| {
			TransportError::protocol("batch", "batch entry is missing a response id")
		})?;
		by_id.insert(id, response);
	}

	let mut ordered = Vec::with_capacity(requests.len());
	for request in requests {
		let response = by_id.remove(&request.id).ok_or_else(|| {
			TransportError::protocol(
				&request.method,
				format!("no batch response for request id '{}'", request.id),
			)
		})?;
		ordered.push(response);
	}

	if !by_id.is_empty() {
		return Err(TransportError::protocol(
			"batch",
			format!("{} batch responses matched no request", by_id.len()),
		));
	}

	Ok(ordered)
}
