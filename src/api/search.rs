//! Typed builder for Deezer's advanced search queries.

// self
use crate::_prelude::*;

/// Result ordering accepted by the search endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchOrder {
	/// Deezer's default relevance ranking.
	Ranking,
	/// Track title, ascending.
	TrackAsc,
	/// Track title, descending.
	TrackDesc,
	/// Artist name, ascending.
	ArtistAsc,
	/// Artist name, descending.
	ArtistDesc,
	/// Album title, ascending.
	AlbumAsc,
	/// Album title, descending.
	AlbumDesc,
	/// Rating, ascending.
	RatingAsc,
	/// Rating, descending.
	RatingDesc,
	/// Duration, ascending.
	DurationAsc,
	/// Duration, descending.
	DurationDesc,
}
impl SearchOrder {
	/// Returns the wire value for the `order` parameter.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Ranking => "RANKING",
			Self::TrackAsc => "TRACK_ASC",
			Self::TrackDesc => "TRACK_DESC",
			Self::ArtistAsc => "ARTIST_ASC",
			Self::ArtistDesc => "ARTIST_DESC",
			Self::AlbumAsc => "ALBUM_ASC",
			Self::AlbumDesc => "ALBUM_DESC",
			Self::RatingAsc => "RATING_ASC",
			Self::RatingDesc => "RATING_DESC",
			Self::DurationAsc => "DURATION_ASC",
			Self::DurationDesc => "DURATION_DESC",
		}
	}
}
impl Display for SearchOrder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Advanced search query: a free-text keyword plus Deezer's documented filters,
/// rendered into the `q` parameter (`eye of the tiger artist:"survivor" dur_min:180`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchQuery {
	keyword: String,
	artist: Option<String>,
	album: Option<String>,
	track: Option<String>,
	label: Option<String>,
	dur_min: Option<u32>,
	dur_max: Option<u32>,
	bpm_min: Option<u32>,
	bpm_max: Option<u32>,
}
impl SearchQuery {
	/// Creates a query from a free-text keyword.
	pub fn keyword(keyword: impl Into<String>) -> Self {
		Self { keyword: keyword.into(), ..Self::default() }
	}

	/// Filters by artist name.
	pub fn artist(mut self, artist: impl Into<String>) -> Self {
		self.artist = Some(artist.into());

		self
	}

	/// Filters by album title.
	pub fn album(mut self, album: impl Into<String>) -> Self {
		self.album = Some(album.into());

		self
	}

	/// Filters by track title.
	pub fn track(mut self, track: impl Into<String>) -> Self {
		self.track = Some(track.into());

		self
	}

	/// Filters by label name.
	pub fn label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());

		self
	}

	/// Filters by minimum duration in seconds.
	pub fn dur_min(mut self, seconds: u32) -> Self {
		self.dur_min = Some(seconds);

		self
	}

	/// Filters by maximum duration in seconds.
	pub fn dur_max(mut self, seconds: u32) -> Self {
		self.dur_max = Some(seconds);

		self
	}

	/// Filters by minimum BPM.
	pub fn bpm_min(mut self, bpm: u32) -> Self {
		self.bpm_min = Some(bpm);

		self
	}

	/// Filters by maximum BPM.
	pub fn bpm_max(mut self, bpm: u32) -> Self {
		self.bpm_max = Some(bpm);

		self
	}

	/// Renders the query into Deezer's `q` parameter syntax.
	pub fn render(&self) -> String {
		let mut parts = Vec::new();

		if !self.keyword.is_empty() {
			parts.push(self.keyword.clone());
		}

		push_quoted(&mut parts, "artist", self.artist.as_deref());
		push_quoted(&mut parts, "album", self.album.as_deref());
		push_quoted(&mut parts, "track", self.track.as_deref());
		push_quoted(&mut parts, "label", self.label.as_deref());
		push_numeric(&mut parts, "dur_min", self.dur_min);
		push_numeric(&mut parts, "dur_max", self.dur_max);
		push_numeric(&mut parts, "bpm_min", self.bpm_min);
		push_numeric(&mut parts, "bpm_max", self.bpm_max);

		parts.join(" ")
	}
}
impl Display for SearchQuery {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.render())
	}
}
impl From<&str> for SearchQuery {
	fn from(keyword: &str) -> Self {
		Self::keyword(keyword)
	}
}

fn push_quoted(parts: &mut Vec<String>, name: &str, value: Option<&str>) {
	if let Some(value) = value {
		// Embedded double quotes would break out of the quoted filter value.
		let sanitized = value.replace('"', "");

		parts.push(format!("{name}:\"{sanitized}\""));
	}
}

fn push_numeric(parts: &mut Vec<String>, name: &str, value: Option<u32>) {
	if let Some(value) = value {
		parts.push(format!("{name}:{value}"));
	}
}
