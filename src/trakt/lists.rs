// List operations against the Trakt API

use reqwest::StatusCode;

use crate::error::ApiError;

use super::client::TraktClient;
use super::models::{
    AddItemsResponse, CreateListRequest, ListItem, Movie, MoviesPayload, RemoveItemsResponse,
    SearchResult, TraktList,
};

/// Description attached to lists created by this service
const LIST_DESCRIPTION: &str = "List created by trakt-gateway";

impl TraktClient {
    /// Fetch all lists of a user.
    pub async fn user_lists(&self, user: &str) -> Result<Vec<TraktList>, ApiError> {
        let response = self.get(&format!("/users/{}/lists", user)).await?;
        Ok(response.json().await?)
    }

    /// Create a new list with the service's fixed defaults.
    ///
    /// `display_name` is the space-separated form; Trakt derives the slug.
    pub async fn create_list(&self, user: &str, display_name: &str) -> Result<TraktList, ApiError> {
        let request = CreateListRequest {
            name: display_name.to_string(),
            description: LIST_DESCRIPTION,
            privacy: "public",
            display_numbers: true,
            allow_comments: true,
            sort_by: "rank",
            sort_how: "asc",
        };

        let response = self
            .post(&format!("/users/{}/lists", user), &request)
            .await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::UpstreamHttp {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    /// Fetch the movie items of a list, extended with full metadata.
    pub async fn list_items(&self, user: &str, slug: &str) -> Result<Vec<ListItem>, ApiError> {
        let response = self
            .get(&format!(
                "/users/{}/lists/{}/items/movies?extended=full",
                user, slug
            ))
            .await?;
        Ok(response.json().await?)
    }

    /// Remove the referenced movies from a list.
    pub async fn remove_list_items(
        &self,
        user: &str,
        slug: &str,
        payload: &MoviesPayload,
    ) -> Result<RemoveItemsResponse, ApiError> {
        let response = self
            .post(
                &format!("/users/{}/lists/{}/items/remove", user, slug),
                payload,
            )
            .await?;
        Ok(response.json().await?)
    }

    /// Add the referenced movies to a list in one batch call.
    pub async fn add_list_items(
        &self,
        user: &str,
        slug: &str,
        payload: &MoviesPayload,
    ) -> Result<AddItemsResponse, ApiError> {
        let response = self
            .post(&format!("/users/{}/lists/{}/items", user, slug), payload)
            .await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::UpstreamHttp {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    /// Look up a single movie by its IMDb id.
    pub async fn lookup_movie(&self, imdb_id: &str) -> Result<Movie, ApiError> {
        let response = self
            .get(&format!(
                "/search/imdb/{}?type=movie&extended=full",
                imdb_id
            ))
            .await?;

        let results: Vec<SearchResult> = response.json().await?;
        results
            .into_iter()
            .filter(|r| r.item_type == "movie")
            .find_map(|r| r.movie)
            .ok_or_else(|| ApiError::UpstreamHttp {
                status: 404,
                body: format!("No movie found for IMDb id '{}'", imdb_id),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{TokenManager, TraktCredentials};
    use crate::secrets::MemoryStore;
    use chrono::Utc;
    use std::sync::Arc;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> TraktClient {
        let blob = serde_json::to_string(&TraktCredentials {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            oauth_token: "access-token".to_string(),
            oauth_refresh_token: "refresh-token".to_string(),
            oauth_expires_at: Utc::now().timestamp() + 3600,
        })
        .unwrap();

        let store = Arc::new(MemoryStore::with_secret("TRAKT_SECRET", blob));
        let manager =
            Arc::new(TokenManager::new(store, "TRAKT_SECRET", base_url, 300).unwrap());
        TraktClient::new(manager, base_url, 5, 10).unwrap()
    }

    #[tokio::test]
    async fn test_create_list_sends_fixed_defaults() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/users/testuser/lists"))
            .and(body_partial_json(serde_json::json!({
                "name": "top movies",
                "privacy": "public",
                "display_numbers": true,
                "allow_comments": true,
                "sort_by": "rank",
                "sort_how": "asc"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "name": "top movies",
                "privacy": "public",
                "item_count": 0,
                "ids": { "trakt": 55, "slug": "top-movies" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let list = client.create_list("testuser", "top movies").await.unwrap();
        assert_eq!(list.ids.slug, "top-movies");
        assert_eq!(list.ids.trakt, 55);
    }

    #[tokio::test]
    async fn test_create_list_requires_created_status() {
        let server = MockServer::start().await;

        // A 200 is a success for the wrapper but not a created list
        Mock::given(method("POST"))
            .and(path("/users/testuser/lists"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.create_list("testuser", "top movies").await;

        match result {
            Err(ApiError::UpstreamHttp { status, .. }) => assert_eq!(status, 200),
            other => panic!("Expected UpstreamHttp error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_lookup_movie_filters_non_movie_results() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search/imdb/tt0111161"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "type": "episode" },
                {
                    "type": "movie",
                    "score": 1000.0,
                    "movie": {
                        "title": "The Shawshank Redemption",
                        "year": 1994,
                        "ids": { "trakt": 1, "imdb": "tt0111161" }
                    }
                }
            ])))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let movie = client.lookup_movie("tt0111161").await.unwrap();
        assert_eq!(movie.title, "The Shawshank Redemption");
        assert_eq!(movie.year, Some(1994));
    }

    #[tokio::test]
    async fn test_lookup_movie_empty_result() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search/imdb/tt0000000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.lookup_movie("tt0000000").await;

        match result {
            Err(ApiError::UpstreamHttp { status, body }) => {
                assert_eq!(status, 404);
                assert!(body.contains("tt0000000"));
            }
            other => panic!("Expected UpstreamHttp error, got {:?}", other.map(|_| ())),
        }
    }
}
