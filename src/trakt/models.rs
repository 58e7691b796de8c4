// Trakt API wire types

use serde::{Deserialize, Serialize};

/// External identifiers attached to a movie
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraktIds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trakt: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imdb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmdb: Option<u64>,
}

/// Identifiers of a user list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListIds {
    pub trakt: u64,
    pub slug: String,
}

/// A user list as returned by the lists endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktList {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub privacy: Option<String>,
    #[serde(default)]
    pub item_count: u64,
    pub ids: ListIds,
}

/// Request body for list creation
#[derive(Debug, Serialize)]
pub struct CreateListRequest<'a> {
    pub name: String,
    pub description: &'a str,
    pub privacy: &'a str,
    pub display_numbers: bool,
    pub allow_comments: bool,
    pub sort_by: &'a str,
    pub sort_how: &'a str,
}

/// A movie record; with `extended=full` the extra metadata fields
/// (tagline, overview, released, ...) are carried through verbatim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub title: String,
    #[serde(default)]
    pub year: Option<u32>,
    pub ids: TraktIds,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One entry of a list; only movie-typed entries take part in clear/add
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listed_at: Option<String>,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie: Option<Movie>,
}

impl ListItem {
    pub fn is_movie(&self) -> bool {
        self.item_type == "movie" && self.movie.is_some()
    }
}

/// Reference to a movie by its ids, for add/remove payloads
#[derive(Debug, Serialize)]
pub struct MovieRef {
    pub ids: TraktIds,
}

impl MovieRef {
    pub fn by_imdb(imdb_id: impl Into<String>) -> Self {
        Self {
            ids: TraktIds {
                imdb: Some(imdb_id.into()),
                ..TraktIds::default()
            },
        }
    }

    pub fn by_trakt(trakt_id: u64) -> Self {
        Self {
            ids: TraktIds {
                trakt: Some(trakt_id),
                ..TraktIds::default()
            },
        }
    }
}

/// Request body for the list items add/remove endpoints
#[derive(Debug, Serialize)]
pub struct MoviesPayload {
    pub movies: Vec<MovieRef>,
}

impl MoviesPayload {
    pub fn from_imdb_ids(imdb_ids: &[String]) -> Self {
        Self {
            movies: imdb_ids.iter().map(MovieRef::by_imdb).collect(),
        }
    }
}

/// Per-type counters in sync responses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncCounts {
    #[serde(default)]
    pub movies: u64,
}

/// Summary of the list attached to an items-remove response
#[derive(Debug, Clone, Deserialize)]
pub struct ListSummary {
    pub item_count: u64,
}

/// Response of the items-remove endpoint; `list.item_count` is the
/// post-removal size the workflow verifies against
#[derive(Debug, Deserialize)]
pub struct RemoveItemsResponse {
    #[serde(default)]
    pub deleted: SyncCounts,
    pub list: ListSummary,
}

/// Response of the items-add endpoint
#[derive(Debug, Deserialize)]
pub struct AddItemsResponse {
    #[serde(default)]
    pub added: SyncCounts,
    #[serde(default)]
    pub existing: SyncCounts,
}

/// One result of the id-lookup endpoint
#[derive(Debug, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub movie: Option<Movie>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_item_movie_filter() {
        let json = serde_json::json!([
            {
                "rank": 1,
                "id": 101,
                "listed_at": "2024-03-01T10:00:00.000Z",
                "type": "movie",
                "movie": {
                    "title": "The Shawshank Redemption",
                    "year": 1994,
                    "ids": { "trakt": 1, "slug": "the-shawshank-redemption-1994", "imdb": "tt0111161" }
                }
            },
            {
                "rank": 2,
                "id": 102,
                "listed_at": "2024-03-01T10:00:00.000Z",
                "type": "show"
            }
        ]);

        let items: Vec<ListItem> = serde_json::from_value(json).unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_movie());
        assert!(!items[1].is_movie());
        assert_eq!(
            items[0].movie.as_ref().unwrap().ids.imdb.as_deref(),
            Some("tt0111161")
        );
    }

    #[test]
    fn test_movie_extended_metadata_round_trips() {
        let json = serde_json::json!({
            "title": "Heat",
            "year": 1995,
            "ids": { "trakt": 3, "imdb": "tt0113277" },
            "tagline": "A Los Angeles crime saga",
            "runtime": 170
        });

        let movie: Movie = serde_json::from_value(json).unwrap();
        assert_eq!(movie.extra["tagline"], "A Los Angeles crime saga");

        let back = serde_json::to_value(&movie).unwrap();
        assert_eq!(back["runtime"], 170);
        assert_eq!(back["title"], "Heat");
    }

    #[test]
    fn test_movies_payload_keeps_caller_order_and_duplicates() {
        let ids = vec![
            "tt0111161".to_string(),
            "tt0068646".to_string(),
            "tt0111161".to_string(),
        ];
        let payload = MoviesPayload::from_imdb_ids(&ids);

        let value = serde_json::to_value(&payload).unwrap();
        let movies = value["movies"].as_array().unwrap();
        assert_eq!(movies.len(), 3);
        assert_eq!(movies[0]["ids"]["imdb"], "tt0111161");
        assert_eq!(movies[1]["ids"]["imdb"], "tt0068646");
        assert_eq!(movies[2]["ids"]["imdb"], "tt0111161");
        // Only the imdb namespace is sent for caller-supplied ids
        assert!(movies[0]["ids"].get("trakt").is_none());
    }

    #[test]
    fn test_remove_response_exposes_item_count() {
        let json = serde_json::json!({
            "deleted": { "movies": 2, "shows": 0 },
            "not_found": { "movies": [] },
            "list": { "item_count": 0, "updated_at": "2024-03-01T10:00:00.000Z" }
        });

        let response: RemoveItemsResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.deleted.movies, 2);
        assert_eq!(response.list.item_count, 0);
    }
}
