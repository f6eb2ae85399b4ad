// SPDX-License-Identifier: GPL-3.0-or-later

#[cfg(test)]
mod tests {
    use crate::{SpotifyClient, SpotifyError};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MACKLEMORE_ID: &str = "3JhNCzhSMTxs9WLGJJxWOY";
    const RYAN_LEWIS_ID: &str = "4myTppRgh0rojLxx8RycOp";

    fn artist_response() -> serde_json::Value {
        serde_json::json!({
            "id": MACKLEMORE_ID,
            "name": "Macklemore",
            "genres": ["hip hop", "seattle hip hop"],
            "popularity": 72
        })
    }

    async fn client_for(server: &MockServer) -> SpotifyClient {
        SpotifyClient::builder()
            .base_url(server.uri())
            .bearer_token("test-token")
            .build()
            .expect("client should build")
    }

    #[tokio::test]
    async fn artist_lookup_returns_genres() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/artists/{}", MACKLEMORE_ID)))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(artist_response()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let artist = client.artist(MACKLEMORE_ID).await.expect("lookup succeeds");

        assert_eq!(artist.name, "Macklemore");
        assert_eq!(artist.genres, vec!["hip hop", "seattle hip hop"]);
        assert_eq!(artist.popularity, Some(72));
    }

    #[tokio::test]
    async fn artist_lookup_maps_404_to_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/artists/unknown"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let result = client.artist("unknown").await;

        assert!(matches!(result, Err(SpotifyError::NotFound(_))));
    }

    #[tokio::test]
    async fn artist_lookup_maps_429_to_rate_limit() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/artists/{}", MACKLEMORE_ID)))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let result = client.artist(MACKLEMORE_ID).await;

        assert!(matches!(result, Err(SpotifyError::RateLimitExceeded)));
    }

    #[tokio::test]
    async fn batched_lookup_drops_null_slots() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/artists"))
            .and(query_param(
                "ids",
                format!("{},{}", MACKLEMORE_ID, RYAN_LEWIS_ID),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "artists": [artist_response(), null]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let artists = client
            .artists(&[MACKLEMORE_ID, RYAN_LEWIS_ID])
            .await
            .expect("batch lookup succeeds");

        assert_eq!(artists.len(), 1);
        assert_eq!(artists[0].id, MACKLEMORE_ID);
    }

    #[tokio::test]
    async fn batched_lookup_rejects_oversized_batches() {
        let client = SpotifyClient::builder()
            .base_url("http://localhost:1")
            .build()
            .unwrap();

        let ids: Vec<String> = (0..51).map(|i| format!("id{}", i)).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();

        let result = client.artists(&refs).await;
        assert!(matches!(result, Err(SpotifyError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn search_prefers_highest_popularity() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("type", "artist"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "artists": {
                    "items": [
                        {"id": "a", "name": "Macklemore Tribute", "genres": [], "popularity": 10},
                        {"id": "b", "name": "Macklemore", "genres": ["hip hop"], "popularity": 72},
                        {"id": "c", "name": "Macklemore Karaoke", "genres": [], "popularity": 5}
                    ]
                }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let best = client
            .search_artist("Macklemore")
            .await
            .expect("search succeeds")
            .expect("a candidate is returned");

        assert_eq!(best.id, "b");
    }

    #[tokio::test]
    async fn search_breaks_popularity_ties_by_return_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "artists": {
                    "items": [
                        {"id": "first", "name": "Boston", "popularity": 50},
                        {"id": "second", "name": "Boston", "popularity": 50}
                    ]
                }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let best = client.search_artist("Boston").await.unwrap().unwrap();

        assert_eq!(best.id, "first");
    }

    #[tokio::test]
    async fn search_with_no_candidates_returns_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "artists": {"items": []}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let best = client.search_artist("Nobody").await.unwrap();

        assert!(best.is_none());
    }

    #[tokio::test]
    async fn related_artists_parses_envelope() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/artists/{}/related-artists", MACKLEMORE_ID)))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "artists": [
                    {"id": "x", "name": "Grieves", "genres": ["hip hop"], "popularity": 40},
                    {"id": "y", "name": "Atmosphere", "genres": ["underground hip hop"], "popularity": 55}
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let related = client.related_artists(MACKLEMORE_ID).await.unwrap();

        assert_eq!(related.len(), 2);
        assert_eq!(related[1].name, "Atmosphere");
    }
}
