// List sync workflow
// Replaces the contents of a named Trakt list with a caller-supplied
// set of IMDb movie ids

use std::sync::Arc;

use crate::error::ApiError;
use crate::trakt::models::{ListItem, MoviesPayload, TraktList};
use crate::trakt::TraktClient;

/// Orchestrates lookup, creation/clearing and repopulation of a named list.
pub struct SyncService {
    client: Arc<TraktClient>,

    /// Trakt account the lists live under
    user: String,
}

impl SyncService {
    pub fn new(client: Arc<TraktClient>, user: impl Into<String>) -> Self {
        Self {
            client,
            user: user.into(),
        }
    }

    /// Replace the contents of the list named by `name` with `imdb_ids`.
    ///
    /// `name` is the hyphenated slug form; the remote list is matched and
    /// created under its de-hyphenated display name. The ids are forwarded
    /// in caller order, duplicates included (Trakt de-duplicates).
    ///
    /// Returns the repopulated item set with full metadata. Failure at any
    /// step aborts the whole workflow; there is no rollback of completed
    /// steps, so a failed add after a successful clear leaves the list empty.
    pub async fn replace_list(
        &self,
        name: &str,
        imdb_ids: &[String],
    ) -> Result<Vec<ListItem>, ApiError> {
        let display_str = display_name(name);

        let slug = match self.find_list(&display_str).await? {
            Some(list) => {
                tracing::info!(
                    "List '{}' exists (slug '{}', {} items), clearing it",
                    display_str,
                    list.ids.slug,
                    list.item_count
                );
                self.clear_list(&list.ids.slug).await?;
                list.ids.slug
            }
            None => {
                tracing::info!("List '{}' not found, creating it", display_str);
                let created = self.client.create_list(&self.user, &display_str).await?;
                created.ids.slug
            }
        };

        let payload = MoviesPayload::from_imdb_ids(imdb_ids);
        let added = self
            .client
            .add_list_items(&self.user, &slug, &payload)
            .await?;
        tracing::info!(
            "Added {} movies to '{}' ({} already present)",
            added.added.movies,
            slug,
            added.existing.movies
        );

        self.client.list_items(&self.user, &slug).await
    }

    /// Find a user list whose display name exactly matches `display_name`.
    ///
    /// Case-sensitive scan over all lists; callers manage few lists, so the
    /// linear scan is fine. First match wins on duplicate names.
    async fn find_list(&self, display_name: &str) -> Result<Option<TraktList>, ApiError> {
        let lists = self.client.user_lists(&self.user).await?;
        Ok(lists.into_iter().find(|list| list.name == display_name))
    }

    /// Remove every movie-typed item from the list and verify it is empty.
    async fn clear_list(&self, slug: &str) -> Result<(), ApiError> {
        let items = self.client.list_items(&self.user, slug).await?;

        let movies = items
            .iter()
            .filter(|item| item.is_movie())
            .filter_map(|item| item.movie.as_ref()?.ids.trakt)
            .map(crate::trakt::models::MovieRef::by_trakt)
            .collect();

        let response = self
            .client
            .remove_list_items(&self.user, slug, &MoviesPayload { movies })
            .await?;

        // The workflow only manages movie items; a non-zero count after the
        // remove call means the clear did not complete. No partial-clear retry.
        if response.list.item_count != 0 {
            return Err(ApiError::Invariant(format!(
                "Failed to clear all movies from the list '{}': {} items remain",
                slug, response.list.item_count
            )));
        }

        tracing::info!("Cleared {} movies from '{}'", response.deleted.movies, slug);
        Ok(())
    }
}

/// De-hyphenate a caller-supplied list name into the remote display name.
///
/// The hyphen/space substitution is part of the public contract: the caller
/// sends "top-movies", the remote system stores "top movies".
pub fn display_name(name: &str) -> String {
    name.replace('-', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_display_name_dehyphenates() {
        assert_eq!(display_name("top-movies"), "top movies");
        assert_eq!(display_name("watchlist"), "watchlist");
        assert_eq!(display_name("best-of-2024"), "best of 2024");
    }

    proptest! {
        /// The substitution is a bijection on hyphenated names built from
        /// hyphen-free words, so the caller's name always round-trips.
        #[test]
        fn display_name_round_trips(name in "[a-z0-9]{1,8}(-[a-z0-9]{1,8}){0,4}") {
            let display = display_name(&name);
            prop_assert!(!display.contains('-'));
            prop_assert_eq!(display.replace(' ', "-"), name);
        }
    }
}
