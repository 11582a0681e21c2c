//! Cursor-walking pagination over Deezer list endpoints.
//!
//! Deezer list envelopes carry a `next` field holding a fully qualified follow-up URL.
//! [`fetch_all`] walks those cursors strictly sequentially through any
//! [`PageFetcher`] (the [`ApiClient`] implements it), merging items in arrival order.
//! The walk has exactly two states: fetching (a cursor is still in hand) and done,
//! reached by natural exhaustion, by the accumulated-item safety cap, or by the
//! search-specific offset pre-stop that skips a follow-up known to 404.

// self
use crate::{
	_prelude::*,
	api::{envelope::Extractor, request::UnsignedRequest},
	client::{ApiClient, ApiResponse},
	error::ConfigError,
	http::ApiHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Safety cap on accumulated items for a single walk.
pub const DEFAULT_PAGE_CAP: usize = 1_000;

/// Boxed future returned by [`PageFetcher::fetch`].
pub type PageFuture<'a> = Pin<Box<dyn Future<Output = Result<ApiResponse>> + 'a + Send>>;

/// One signed HTTP call; the seam the walker composes with.
pub trait PageFetcher
where
	Self: Send + Sync,
{
	/// Executes the request and returns the decoded page.
	fn fetch(&self, request: UnsignedRequest) -> PageFuture<'_>;
}
impl<C, M> PageFetcher for ApiClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fetch(&self, request: UnsignedRequest) -> PageFuture<'_> {
		Box::pin(self.execute(request))
	}
}

impl<C, M> ApiClient<C, M>
where
	C: ?Sized + ApiHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Walks a list endpoint to completion using its configured extractor and policy.
	///
	/// Single-object endpoints complete in one call, yielding their body as the only
	/// item.
	pub async fn execute_endpoint_all(&self, endpoint: &crate::api::Endpoint) -> Result<PageWalk> {
		let request = endpoint.request(&self.config.api_base)?;

		match endpoint.extractor() {
			Some(extractor) => fetch_all(self, request, extractor, endpoint.page_policy()).await,
			None => {
				let response = self.execute(request).await?;

				Ok(PageWalk { items: vec![response.body], truncated: false })
			},
		}
	}
}

/// Per-walk pagination policy, configured alongside each endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PagePolicy {
	/// Maximum number of accumulated items before the walk stops.
	pub cap: usize,
	/// Stops before requesting a cursor whose offset reached the cap; the search
	/// endpoints hard-fail past offset 1000, so the capped request would only 404.
	pub offset_hard_limit: bool,
}
impl PagePolicy {
	/// Policy for the `/search/...` endpoints.
	pub fn search() -> Self {
		Self { offset_hard_limit: true, ..Self::default() }
	}
}
impl Default for PagePolicy {
	fn default() -> Self {
		Self { cap: DEFAULT_PAGE_CAP, offset_hard_limit: false }
	}
}

/// Fully materialized result of a pagination walk.
///
/// `truncated` makes the cap observable: the items are valid, but the server had more
/// and the walk chose not to fetch them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageWalk {
	/// Accumulated items, in arrival order.
	pub items: Vec<Value>,
	/// True when the walk stopped at the safety cap instead of natural exhaustion.
	pub truncated: bool,
}

/// Walks a list endpoint to completion, or to the policy's cap.
///
/// Follow-up requests reuse the initial descriptor's method, headers, and body, take
/// the cursor URL verbatim, and clear previously set query parameters (the cursor
/// already embeds them). Page N+1 is never requested before page N's items are merged.
pub async fn fetch_all(
	fetcher: &dyn PageFetcher,
	initial: UnsignedRequest,
	extractor: Extractor,
	policy: PagePolicy,
) -> Result<PageWalk> {
	const KIND: CallKind = CallKind::Paginate;

	let span = CallSpan::new(KIND, "fetch_all");

	obs::record_call_outcome(KIND, CallOutcome::Attempt);

	let result = span
		.instrument(async move {
			let mut walk = PageWalk::default();
			let mut request = initial;

			loop {
				let page = fetcher.fetch(request.clone()).await?;

				walk.items.extend(extractor.items(&page.body));

				let Some(cursor) = extractor.next_cursor(&page.body) else {
					break;
				};

				if walk.items.len() >= policy.cap {
					walk.truncated = true;

					break;
				}

				let cursor_url = Url::parse(&cursor)
					.map_err(|source| ConfigError::InvalidEndpoint { source })?;

				if policy.offset_hard_limit
					&& cursor_offset(&cursor_url).is_some_and(|offset| offset >= policy.cap)
				{
					walk.truncated = true;

					break;
				}

				request = request.follow_cursor(cursor_url);
			}

			if walk.truncated {
				obs::warn_pages_truncated(walk.items.len(), policy.cap);
				obs::record_pages_truncated();
			}

			Ok(walk)
		})
		.await;

	match &result {
		Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
		Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
	}

	result
}

// Deezer pages with `index`; `offset` is accepted for gateways that rewrite cursors.
fn cursor_offset(cursor: &Url) -> Option<usize> {
	cursor
		.query_pairs()
		.find(|(key, _)| key == "index" || key == "offset")
		.and_then(|(_, value)| value.parse().ok())
}
