//! Typed dispatch for the Deezer endpoint surface.
//!
//! Each invokable (resource, operation) pair is one enum variant carrying its
//! parameters; [`Endpoint::request`] is the pure URL builder and
//! [`Endpoint::extractor`] / [`Endpoint::page_policy`] supply the envelope projection
//! and pagination policy configured alongside it, with exhaustiveness checked by the
//! compiler instead of a string-keyed dispatch table.

// crates.io
use oauth2::http::Method;
// self
use crate::{
	_prelude::*,
	api::{
		envelope::Extractor,
		request::UnsignedRequest,
		search::{SearchOrder, SearchQuery},
	},
	error::ConfigError,
	pager::PagePolicy,
};

/// User selector for user-scoped endpoints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserRef {
	/// The user the credential belongs to (`/user/me`).
	Me,
	/// An explicit user identifier.
	Id(u64),
}
impl Display for UserRef {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Me => f.write_str("me"),
			Self::Id(id) => write!(f, "{id}"),
		}
	}
}

/// One invokable Deezer operation with its parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
	/// `GET /album/{id}`.
	AlbumGet {
		/// Album identifier.
		id: u64,
	},
	/// `GET /album/{id}/tracks`.
	AlbumTracks {
		/// Album identifier.
		id: u64,
	},
	/// `GET /album/{id}/fans`.
	AlbumFans {
		/// Album identifier.
		id: u64,
	},
	/// `GET /search/album`.
	AlbumSearch {
		/// Search query.
		query: SearchQuery,
		/// Optional result ordering.
		order: Option<SearchOrder>,
	},

	/// `GET /artist/{id}`.
	ArtistGet {
		/// Artist identifier.
		id: u64,
	},
	/// `GET /artist/{id}/top`.
	ArtistTopTracks {
		/// Artist identifier.
		id: u64,
	},
	/// `GET /artist/{id}/albums`.
	ArtistAlbums {
		/// Artist identifier.
		id: u64,
	},
	/// `GET /artist/{id}/fans`.
	ArtistFans {
		/// Artist identifier.
		id: u64,
	},
	/// `GET /artist/{id}/related`.
	ArtistRelated {
		/// Artist identifier.
		id: u64,
	},
	/// `GET /artist/{id}/radio`.
	ArtistRadio {
		/// Artist identifier.
		id: u64,
	},
	/// `GET /artist/{id}/playlists`.
	ArtistPlaylists {
		/// Artist identifier.
		id: u64,
	},
	/// `GET /search/artist`.
	ArtistSearch {
		/// Search query.
		query: SearchQuery,
		/// Optional result ordering.
		order: Option<SearchOrder>,
	},

	/// `GET /playlist/{id}`.
	PlaylistGet {
		/// Playlist identifier.
		id: u64,
	},
	/// `POST /user/me/playlists`.
	PlaylistCreate {
		/// Title of the playlist to create.
		title: String,
	},
	/// `DELETE /playlist/{id}`.
	PlaylistDelete {
		/// Playlist identifier.
		id: u64,
	},
	/// `GET /playlist/{id}/fans`.
	PlaylistFans {
		/// Playlist identifier.
		id: u64,
	},
	/// `GET /playlist/{id}/tracks`.
	PlaylistTracks {
		/// Playlist identifier.
		id: u64,
	},
	/// `POST /playlist/{id}/tracks`.
	PlaylistAddTracks {
		/// Playlist identifier.
		id: u64,
		/// Track identifiers to append.
		tracks: Vec<u64>,
	},
	/// `DELETE /playlist/{id}/tracks`.
	PlaylistRemoveTracks {
		/// Playlist identifier.
		id: u64,
		/// Track identifiers to remove.
		tracks: Vec<u64>,
	},
	/// `GET /playlist/{id}/radio`.
	PlaylistRadio {
		/// Playlist identifier.
		id: u64,
	},
	/// `GET /search/playlist`.
	PlaylistSearch {
		/// Search query.
		query: SearchQuery,
		/// Optional result ordering.
		order: Option<SearchOrder>,
	},

	/// `GET /track/{id}`.
	TrackGet {
		/// Track identifier.
		id: u64,
	},
	/// `GET /search/track`.
	TrackSearch {
		/// Search query.
		query: SearchQuery,
		/// Optional result ordering.
		order: Option<SearchOrder>,
	},

	/// `GET /chart` (composite overview; tracks section is walked).
	ChartOverview,
	/// `GET /chart/tracks`.
	ChartTracks,
	/// `GET /chart/albums`.
	ChartAlbums,
	/// `GET /chart/artists`.
	ChartArtists,
	/// `GET /chart/playlists`.
	ChartPlaylists,
	/// `GET /chart/podcasts`.
	ChartPodcasts,

	/// `GET /user/{user}`.
	UserProfile {
		/// User selector.
		user: UserRef,
	},
	/// `GET /user/{user}/playlists`.
	UserPlaylists {
		/// User selector.
		user: UserRef,
	},
	/// `GET /user/{user}/tracks`.
	UserFavoriteTracks {
		/// User selector.
		user: UserRef,
	},
	/// `GET /user/{user}/albums`.
	UserFavoriteAlbums {
		/// User selector.
		user: UserRef,
	},
	/// `GET /user/{user}/artists`.
	UserFavoriteArtists {
		/// User selector.
		user: UserRef,
	},
	/// `GET /user/{user}/podcasts`.
	UserFavoritePodcasts {
		/// User selector.
		user: UserRef,
	},
	/// `GET /user/{user}/radios`.
	UserFavoriteRadios {
		/// User selector.
		user: UserRef,
	},
	/// `GET /user/{user}/flow`.
	UserFlow {
		/// User selector.
		user: UserRef,
	},
	/// `GET /user/{user}/followings`.
	UserFollowings {
		/// User selector.
		user: UserRef,
	},
	/// `GET /user/{user}/followers`.
	UserFollowers {
		/// User selector.
		user: UserRef,
	},
	/// `GET /user/{user}/history`.
	UserHistory {
		/// User selector.
		user: UserRef,
	},

	/// `GET /podcast/{id}`.
	PodcastGet {
		/// Podcast identifier.
		id: u64,
	},
	/// `GET /podcast/{id}/episodes`.
	PodcastEpisodes {
		/// Podcast identifier.
		id: u64,
	},
	/// `GET /search/podcast`.
	PodcastSearch {
		/// Search query.
		query: SearchQuery,
		/// Optional result ordering.
		order: Option<SearchOrder>,
	},
}
impl Endpoint {
	/// Builds the unsigned request descriptor for this operation against `api_base`.
	pub fn request(&self, api_base: &Url) -> Result<UnsignedRequest, ConfigError> {
		match self {
			Self::AlbumGet { id } => get(api_base, &format!("album/{id}")),
			Self::AlbumTracks { id } => get(api_base, &format!("album/{id}/tracks")),
			Self::AlbumFans { id } => get(api_base, &format!("album/{id}/fans")),
			Self::AlbumSearch { query, order } => search(api_base, "album", query, *order),
			Self::ArtistGet { id } => get(api_base, &format!("artist/{id}")),
			Self::ArtistTopTracks { id } => get(api_base, &format!("artist/{id}/top")),
			Self::ArtistAlbums { id } => get(api_base, &format!("artist/{id}/albums")),
			Self::ArtistFans { id } => get(api_base, &format!("artist/{id}/fans")),
			Self::ArtistRelated { id } => get(api_base, &format!("artist/{id}/related")),
			Self::ArtistRadio { id } => get(api_base, &format!("artist/{id}/radio")),
			Self::ArtistPlaylists { id } => get(api_base, &format!("artist/{id}/playlists")),
			Self::ArtistSearch { query, order } => search(api_base, "artist", query, *order),
			Self::PlaylistGet { id } => get(api_base, &format!("playlist/{id}")),
			Self::PlaylistCreate { title } => Ok(UnsignedRequest::new(
				Method::POST,
				join(api_base, "user/me/playlists")?,
			)
			.query("title", title.clone())),
			Self::PlaylistDelete { id } =>
				Ok(UnsignedRequest::new(Method::DELETE, join(api_base, &format!("playlist/{id}"))?)),
			Self::PlaylistFans { id } => get(api_base, &format!("playlist/{id}/fans")),
			Self::PlaylistTracks { id } => get(api_base, &format!("playlist/{id}/tracks")),
			Self::PlaylistAddTracks { id, tracks } => Ok(UnsignedRequest::new(
				Method::POST,
				join(api_base, &format!("playlist/{id}/tracks"))?,
			)
			.query("songs", join_ids(tracks))),
			Self::PlaylistRemoveTracks { id, tracks } => Ok(UnsignedRequest::new(
				Method::DELETE,
				join(api_base, &format!("playlist/{id}/tracks"))?,
			)
			.query("songs", join_ids(tracks))),
			Self::PlaylistRadio { id } => get(api_base, &format!("playlist/{id}/radio")),
			Self::PlaylistSearch { query, order } => search(api_base, "playlist", query, *order),
			Self::TrackGet { id } => get(api_base, &format!("track/{id}")),
			Self::TrackSearch { query, order } => search(api_base, "track", query, *order),
			Self::ChartOverview => get(api_base, "chart"),
			Self::ChartTracks => get(api_base, "chart/tracks"),
			Self::ChartAlbums => get(api_base, "chart/albums"),
			Self::ChartArtists => get(api_base, "chart/artists"),
			Self::ChartPlaylists => get(api_base, "chart/playlists"),
			Self::ChartPodcasts => get(api_base, "chart/podcasts"),
			Self::UserProfile { user } => get(api_base, &format!("user/{user}")),
			Self::UserPlaylists { user } => get(api_base, &format!("user/{user}/playlists")),
			Self::UserFavoriteTracks { user } => get(api_base, &format!("user/{user}/tracks")),
			Self::UserFavoriteAlbums { user } => get(api_base, &format!("user/{user}/albums")),
			Self::UserFavoriteArtists { user } => get(api_base, &format!("user/{user}/artists")),
			Self::UserFavoritePodcasts { user } => get(api_base, &format!("user/{user}/podcasts")),
			Self::UserFavoriteRadios { user } => get(api_base, &format!("user/{user}/radios")),
			Self::UserFlow { user } => get(api_base, &format!("user/{user}/flow")),
			Self::UserFollowings { user } => get(api_base, &format!("user/{user}/followings")),
			Self::UserFollowers { user } => get(api_base, &format!("user/{user}/followers")),
			Self::UserHistory { user } => get(api_base, &format!("user/{user}/history")),
			Self::PodcastGet { id } => get(api_base, &format!("podcast/{id}")),
			Self::PodcastEpisodes { id } => get(api_base, &format!("podcast/{id}/episodes")),
			Self::PodcastSearch { query, order } => search(api_base, "podcast", query, *order),
		}
	}

	/// Returns the envelope extractor for list operations, `None` for single-object ones.
	pub fn extractor(&self) -> Option<Extractor> {
		match self {
			Self::AlbumGet { .. }
			| Self::ArtistGet { .. }
			| Self::PlaylistGet { .. }
			| Self::PlaylistCreate { .. }
			| Self::PlaylistDelete { .. }
			| Self::PlaylistAddTracks { .. }
			| Self::PlaylistRemoveTracks { .. }
			| Self::TrackGet { .. }
			| Self::UserProfile { .. }
			| Self::PodcastGet { .. } => None,
			Self::ChartOverview => Some(Extractor::nested("tracks")),
			_ => Some(Extractor::DATA),
		}
	}

	/// Returns the pagination policy for this operation.
	pub fn page_policy(&self) -> PagePolicy {
		if self.is_search() { PagePolicy::search() } else { PagePolicy::default() }
	}

	/// Returns true for the `/search/...` operations, which hard-fail past offset 1000.
	pub fn is_search(&self) -> bool {
		matches!(
			self,
			Self::AlbumSearch { .. }
				| Self::ArtistSearch { .. }
				| Self::PlaylistSearch { .. }
				| Self::TrackSearch { .. }
				| Self::PodcastSearch { .. }
		)
	}

	/// Stable resource label for spans and metrics.
	pub fn resource(&self) -> &'static str {
		match self {
			Self::AlbumGet { .. }
			| Self::AlbumTracks { .. }
			| Self::AlbumFans { .. }
			| Self::AlbumSearch { .. } => "album",
			Self::ArtistGet { .. }
			| Self::ArtistTopTracks { .. }
			| Self::ArtistAlbums { .. }
			| Self::ArtistFans { .. }
			| Self::ArtistRelated { .. }
			| Self::ArtistRadio { .. }
			| Self::ArtistPlaylists { .. }
			| Self::ArtistSearch { .. } => "artist",
			Self::PlaylistGet { .. }
			| Self::PlaylistCreate { .. }
			| Self::PlaylistDelete { .. }
			| Self::PlaylistFans { .. }
			| Self::PlaylistTracks { .. }
			| Self::PlaylistAddTracks { .. }
			| Self::PlaylistRemoveTracks { .. }
			| Self::PlaylistRadio { .. }
			| Self::PlaylistSearch { .. } => "playlist",
			Self::TrackGet { .. } | Self::TrackSearch { .. } => "track",
			Self::ChartOverview
			| Self::ChartTracks
			| Self::ChartAlbums
			| Self::ChartArtists
			| Self::ChartPlaylists
			| Self::ChartPodcasts => "chart",
			Self::UserProfile { .. }
			| Self::UserPlaylists { .. }
			| Self::UserFavoriteTracks { .. }
			| Self::UserFavoriteAlbums { .. }
			| Self::UserFavoriteArtists { .. }
			| Self::UserFavoritePodcasts { .. }
			| Self::UserFavoriteRadios { .. }
			| Self::UserFlow { .. }
			| Self::UserFollowings { .. }
			| Self::UserFollowers { .. }
			| Self::UserHistory { .. } => "user",
			Self::PodcastGet { .. } | Self::PodcastEpisodes { .. } | Self::PodcastSearch { .. } =>
				"podcast",
		}
	}
}

fn join(api_base: &Url, path: &str) -> Result<Url, ConfigError> {
	api_base.join(path).map_err(|_| ConfigError::InvalidPath { path: path.to_owned() })
}

fn get(api_base: &Url, path: &str) -> Result<UnsignedRequest, ConfigError> {
	Ok(UnsignedRequest::get(join(api_base, path)?))
}

fn search(
	api_base: &Url,
	kind: &str,
	query: &SearchQuery,
	order: Option<SearchOrder>,
) -> Result<UnsignedRequest, ConfigError> {
	let mut request =
		UnsignedRequest::get(join(api_base, &format!("search/{kind}"))?).query("q", query.render());

	if let Some(order) = order {
		request = request.query("order", order.as_str());
	}

	Ok(request)
}

fn join_ids(ids: &[u64]) -> String {
	ids.iter().map(u64::to_string).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn base() -> Url {
		Url::parse("https://api.deezer.com/").expect("API base fixture should parse.")
	}

	#[test]
	fn path_builders_join_onto_the_base() {
		let request = Endpoint::AlbumTracks { id: 302_127 }
			.request(&base())
			.expect("Album tracks request should build.");

		assert_eq!(request.url.as_str(), "https://api.deezer.com/album/302127/tracks");
		assert_eq!(request.method, Method::GET);
	}

	#[test]
	fn search_builders_render_query_and_order() {
		let request = Endpoint::TrackSearch {
			query: SearchQuery::keyword("harder better").artist("daft punk"),
			order: Some(SearchOrder::RatingDesc),
		}
		.request(&base())
		.expect("Track search request should build.");

		assert_eq!(request.url.as_str(), "https://api.deezer.com/search/track");
		assert!(
			request
				.query
				.contains(&("q".to_owned(), "harder better artist:\"daft punk\"".to_owned()))
		);
		assert!(request.query.contains(&("order".to_owned(), "RATING_DESC".to_owned())));
	}

	#[test]
	fn playlist_mutations_carry_songs_parameter() {
		let request = Endpoint::PlaylistAddTracks { id: 908_622_995, tracks: vec![1, 2, 3] }
			.request(&base())
			.expect("Playlist mutation request should build.");

		assert_eq!(request.method, Method::POST);
		assert!(request.query.contains(&("songs".to_owned(), "1,2,3".to_owned())));

		let removal = Endpoint::PlaylistRemoveTracks { id: 908_622_995, tracks: vec![7] }
			.request(&base())
			.expect("Playlist removal request should build.");

		assert_eq!(removal.method, Method::DELETE);
	}

	#[test]
	fn extractors_match_endpoint_shape() {
		assert!(Endpoint::AlbumGet { id: 1 }.extractor().is_none());
		assert_eq!(Endpoint::AlbumTracks { id: 1 }.extractor(), Some(Extractor::DATA));
		assert_eq!(Endpoint::ChartOverview.extractor(), Some(Extractor::nested("tracks")));
	}

	#[test]
	fn search_endpoints_get_the_offset_capped_policy() {
		let search = Endpoint::PodcastSearch { query: "serial".into(), order: None };

		assert!(search.is_search());
		assert!(search.page_policy().offset_hard_limit);
		assert!(!Endpoint::UserHistory { user: UserRef::Me }.page_policy().offset_hard_limit);
	}

	#[test]
	fn user_selector_renders_me_and_ids() {
		let me = Endpoint::UserPlaylists { user: UserRef::Me }
			.request(&base())
			.expect("User playlists request should build.");

		assert_eq!(me.url.as_str(), "https://api.deezer.com/user/me/playlists");

		let other = Endpoint::UserProfile { user: UserRef::Id(2_529) }
			.request(&base())
			.expect("User profile request should build.");

		assert_eq!(other.url.as_str(), "https://api.deezer.com/user/2529");
	}
}
