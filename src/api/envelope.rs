//! Envelope projections for Deezer list responses.
//!
//! List endpoints wrap their results in an envelope whose shape varies: most return a
//! top-level `data` array with an optional `next` URL, while composite endpoints (the
//! chart overview) nest the same pair one level down. Every endpoint carries an explicit
//! [`Extractor`] configured next to its URL builder instead of inferring the shape at
//! runtime.

// self
use crate::_prelude::*;

/// Path into a page at which a projection reads its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Projection {
	/// Top-level field.
	Field(&'static str),
	/// Field nested one envelope down.
	Nested(&'static str, &'static str),
}
impl Projection {
	fn resolve<'v>(&self, page: &'v Value) -> Option<&'v Value> {
		match self {
			Self::Field(name) => page.get(name),
			Self::Nested(outer, inner) => page.get(outer).and_then(|section| section.get(inner)),
		}
	}
}

/// Items + cursor projection pair configured per endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Extractor {
	/// Where the page's result items live.
	pub items: Projection,
	/// Where the page's next-page URL lives.
	pub cursor: Projection,
}
impl Extractor {
	/// The common Deezer list shape: top-level `data` array with a sibling `next` URL.
	pub const DATA: Self =
		Self { items: Projection::Field("data"), cursor: Projection::Field("next") };

	/// Envelope-in-envelope shape used by composite endpoints, reading
	/// `<section>.data` and `<section>.next`.
	pub const fn nested(section: &'static str) -> Self {
		Self {
			items: Projection::Nested(section, "data"),
			cursor: Projection::Nested(section, "next"),
		}
	}

	/// Extracts the page's items, cloned into an owned vector. A missing or non-array
	/// projection yields no items.
	pub fn items(&self, page: &Value) -> Vec<Value> {
		match self.items.resolve(page) {
			Some(Value::Array(entries)) => entries.clone(),
			_ => Vec::new(),
		}
	}

	/// Reads the next-page cursor. Absent, `null`, or non-string values all mean the
	/// result set is exhausted.
	pub fn next_cursor(&self, page: &Value) -> Option<String> {
		match self.cursor.resolve(page) {
			Some(Value::String(next)) if !next.is_empty() => Some(next.clone()),
			_ => None,
		}
	}
}
