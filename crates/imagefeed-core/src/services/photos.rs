//! Paginated photo feed with like/unlike.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use reqwest::Method;
use url::Url;

use super::flight::{FlightGuard, FlightSlot};
use super::observers::{Observers, Subscription};
use super::{endpoint, RequestOutcome};
use crate::auth::token::{require_token, TokenStore};
use crate::models::{Photo, PhotoId, PhotoResult};
use crate::transport::{ApiRequest, HttpTransport};
use crate::util::lock;
use crate::Result;

/// Page size requested from `GET /photos`.
pub const PHOTOS_PER_PAGE: u32 = 10;

/// Emitted after every merged page, even when nothing new was appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotosChanged {
    pub old_count: usize,
    pub new_count: usize,
}

#[derive(Debug, Default)]
struct PhotoListState {
    photos: Vec<Photo>,
    last_loaded_page: Option<u32>,
    flight: FlightSlot,
    /// Bumped by `reset` so responses to older requests are discarded.
    generation: u64,
}

/// Owns the photo collection and its pagination cursor.
///
/// Consumers read snapshots; all mutation goes through
/// [`fetch_next_page`](Self::fetch_next_page), [`change_like`](Self::change_like)
/// and [`reset`](Self::reset). Fetches and like changes share one in-flight
/// slot.
#[derive(Clone)]
pub struct PhotoListService {
    api_base: Url,
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<dyn TokenStore>,
    state: Arc<Mutex<PhotoListState>>,
    observers: Observers<PhotosChanged>,
}

impl PhotoListService {
    pub fn new(api_base: Url, transport: Arc<dyn HttpTransport>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            api_base,
            transport,
            tokens,
            state: Arc::new(Mutex::new(PhotoListState::default())),
            observers: Observers::default(),
        }
    }

    /// Snapshot of the whole collection in server order.
    pub fn photos(&self) -> Vec<Photo> {
        lock(&self.state).photos.clone()
    }

    /// Snapshot of the photos at positions `start..`.
    pub fn photos_from(&self, start: usize) -> Vec<Photo> {
        lock(&self.state)
            .photos
            .get(start..)
            .map(<[Photo]>::to_vec)
            .unwrap_or_default()
    }

    pub fn photo_count(&self) -> usize {
        lock(&self.state).photos.len()
    }

    pub fn photo(&self, id: &PhotoId) -> Option<Photo> {
        lock(&self.state)
            .photos
            .iter()
            .find(|photo| &photo.id == id)
            .cloned()
    }

    pub fn last_loaded_page(&self) -> Option<u32> {
        lock(&self.state).last_loaded_page
    }

    pub fn is_request_pending(&self) -> bool {
        lock(&self.state).flight.is_active()
    }

    /// Observe collection growth until the subscription is dropped.
    pub fn subscribe(&self, callback: impl Fn(&PhotosChanged) + Send + Sync + 'static) -> Subscription {
        self.observers.subscribe(callback)
    }

    /// Fetch the page after the last loaded one and append its unseen photos.
    ///
    /// Resolves with only the newly appended photos.
    pub async fn fetch_next_page(&self) -> Result<RequestOutcome<Vec<Photo>>> {
        let (id, page, generation) = {
            let mut state = lock(&self.state);
            let Some(id) = state.flight.try_begin() else {
                tracing::debug!("Photo request already in flight; ignoring next-page fetch");
                return Ok(RequestOutcome::Skipped);
            };
            (
                id,
                state.last_loaded_page.map_or(1, |page| page + 1),
                state.generation,
            )
        };
        let guard = FlightGuard::new(&self.state, |state| &mut state.flight, id);

        let token = require_token(self.tokens.as_ref())?;
        let request = ApiRequest::new(Method::GET, self.page_url(page)?).with_bearer(token);
        let results: Vec<PhotoResult> = match self.transport.send(request).await {
            Ok(response) => response.decode(),
            Err(failure) => Err(failure.into()),
        }
        .inspect_err(|error| tracing::warn!("Failed to fetch photos page {}: {}", page, error))?;

        let (appended, change) = {
            let mut state = lock(&self.state);
            if state.generation != generation {
                tracing::debug!("Discarding photos page {} fetched before reset", page);
                return Ok(RequestOutcome::Completed(Vec::new()));
            }

            let mut seen: HashSet<PhotoId> =
                state.photos.iter().map(|photo| photo.id.clone()).collect();
            let appended: Vec<Photo> = results
                .into_iter()
                .map(Photo::from)
                .filter(|photo| seen.insert(photo.id.clone()))
                .collect();

            let old_count = state.photos.len();
            state.photos.extend(appended.iter().cloned());
            state.last_loaded_page = Some(page);
            let change = PhotosChanged {
                old_count,
                new_count: state.photos.len(),
            };
            (appended, change)
        };
        drop(guard);

        tracing::debug!(
            "Loaded photos page {}: {} new ({} -> {})",
            page,
            appended.len(),
            change.old_count,
            change.new_count
        );
        self.observers.notify(&change);
        Ok(RequestOutcome::Completed(appended))
    }

    /// Like (`POST`) or unlike (`DELETE`) a photo.
    ///
    /// The cached `is_liked` flag changes only after the server confirms.
    pub async fn change_like(&self, photo_id: &PhotoId, like: bool) -> Result<RequestOutcome<()>> {
        let (id, generation) = {
            let mut state = lock(&self.state);
            let Some(id) = state.flight.try_begin() else {
                tracing::warn!("Photo request already in flight; dropping like change for {}", photo_id);
                return Ok(RequestOutcome::Skipped);
            };
            (id, state.generation)
        };
        let _guard = FlightGuard::new(&self.state, |state| &mut state.flight, id);

        let token = require_token(self.tokens.as_ref())?;
        let method = if like { Method::POST } else { Method::DELETE };
        let url = endpoint(&self.api_base, &["photos", photo_id.as_str(), "like"])?;
        let request = ApiRequest::new(method, url).with_bearer(token);
        match self.transport.send(request).await {
            Ok(response) => response.ensure_success().map(drop),
            Err(failure) => Err(failure.into()),
        }
        .inspect_err(|error| tracing::warn!("Failed to change like for {}: {}", photo_id, error))?;

        let mut state = lock(&self.state);
        if state.generation == generation {
            if let Some(photo) = state.photos.iter_mut().find(|photo| &photo.id == photo_id) {
                photo.is_liked = like;
            }
        }
        Ok(RequestOutcome::Completed(()))
    }

    /// Forget every photo and the pagination cursor.
    pub fn reset(&self) {
        let mut state = lock(&self.state);
        state.photos.clear();
        state.last_loaded_page = None;
        state.generation += 1;
        tracing::debug!("Photo list reset");
    }

    fn page_url(&self, page: u32) -> Result<Url> {
        let mut url = endpoint(&self.api_base, &["photos"])?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &PHOTOS_PER_PAGE.to_string());
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemoryTokenStore, Token};
    use crate::testing::{photo_json, photo_page, ScriptedTransport};
    use crate::{Error, NetworkFailure};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn service_with(transport: &Arc<ScriptedTransport>, tokens: Arc<MemoryTokenStore>) -> PhotoListService {
        PhotoListService::new(
            Url::parse("https://api.unsplash.com/").unwrap(),
            transport.clone(),
            tokens,
        )
    }

    fn signed_in(transport: &Arc<ScriptedTransport>) -> PhotoListService {
        service_with(transport, Arc::new(MemoryTokenStore::with_token("bearer-1")))
    }

    fn ids(photos: &[Photo]) -> Vec<String> {
        photos.iter().map(|photo| photo.id.to_string()).collect()
    }

    #[tokio::test(flavor = "current_thread")]
    async fn first_fetch_requests_page_one_with_bearer() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.reply(200, photo_page(1, 10));
        let service = signed_in(&transport);

        let appended = service.fetch_next_page().await.unwrap().completed().unwrap();

        assert_eq!(appended.len(), 10);
        assert_eq!(service.last_loaded_page(), Some(1));
        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url.path(), "/photos");
        assert_eq!(request.query_value("page").as_deref(), Some("1"));
        assert_eq!(request.query_value("per_page").as_deref(), Some("10"));
        assert_eq!(request.bearer, Some(Token::new("bearer-1")));
        assert!(!service.is_request_pending());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn overlapping_page_is_deduplicated_in_order() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.reply(200, photo_page(1, 10));
        transport.reply(200, photo_page(8, 17));
        let service = signed_in(&transport);

        service.fetch_next_page().await.unwrap();
        let appended = service.fetch_next_page().await.unwrap().completed().unwrap();

        assert_eq!(ids(&appended), (11..=17).map(|i| format!("p{i}")).collect::<Vec<_>>());
        assert_eq!(
            ids(&service.photos()),
            (1..=17).map(|i| format!("p{i}")).collect::<Vec<_>>()
        );
        assert_eq!(service.last_loaded_page(), Some(2));
        assert_eq!(transport.requests()[1].query_value("page").as_deref(), Some("2"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn missing_token_fails_without_request() {
        let transport = Arc::new(ScriptedTransport::new());
        let service = service_with(&transport, Arc::new(MemoryTokenStore::default()));

        let error = service.fetch_next_page().await.unwrap_err();

        assert_eq!(error, Error::MissingToken);
        assert!(transport.requests().is_empty());
        assert!(service.photos().is_empty());
        assert_eq!(service.last_loaded_page(), None);
        assert!(!service.is_request_pending());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn fetch_while_pending_is_ignored() {
        let transport = Arc::new(ScriptedTransport::new());
        let gate = transport.reply_gated(200, photo_page(1, 10));
        let service = signed_in(&transport);

        let first = service.fetch_next_page();
        let second = async {
            while !service.is_request_pending() {
                tokio::task::yield_now().await;
            }
            let like = service.change_like(&PhotoId::from("p1"), true).await;
            let fetch = service.fetch_next_page().await;
            let _ = gate.send(());
            (like, fetch)
        };
        let (first, (like, fetch)) = tokio::join!(first, second);

        assert_eq!(first.unwrap().completed().map(|photos| photos.len()), Some(10));
        assert!(like.unwrap().is_skipped());
        assert!(fetch.unwrap().is_skipped());
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(service.last_loaded_page(), Some(1));
        assert_eq!(service.photo_count(), 10);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn observers_receive_old_and_new_counts() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.reply(200, photo_page(1, 10));
        transport.reply(200, photo_page(1, 10));
        let service = signed_in(&transport);
        let events = Arc::new(Mutex::new(Vec::new()));

        let sink = events.clone();
        let _subscription = service.subscribe(move |change| lock(&sink).push(*change));
        service.fetch_next_page().await.unwrap();
        service.fetch_next_page().await.unwrap();

        assert_eq!(
            *lock(&events),
            vec![
                PhotosChanged { old_count: 0, new_count: 10 },
                PhotosChanged { old_count: 10, new_count: 10 },
            ]
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn decode_failure_leaves_collection_untouched() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.reply(200, photo_page(1, 3));
        transport.reply(200, r#"{"photos": []}"#);
        let service = signed_in(&transport);
        let notified = Arc::new(AtomicUsize::new(0));
        let counter = notified.clone();
        let _subscription = service.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        service.fetch_next_page().await.unwrap();
        let error = service.fetch_next_page().await.unwrap_err();

        assert!(matches!(error, Error::Decode(_)));
        assert_eq!(service.photo_count(), 3);
        assert_eq!(service.last_loaded_page(), Some(1));
        assert_eq!(notified.load(Ordering::SeqCst), 1);
        assert!(!service.is_request_pending());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn like_success_updates_only_that_photo() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.reply(200, photo_page(1, 3));
        transport.reply(201, r#"{"photo":{"id":"p2"}}"#);
        let service = signed_in(&transport);
        service.fetch_next_page().await.unwrap();

        let outcome = service.change_like(&PhotoId::from("p2"), true).await.unwrap();

        assert_eq!(outcome, RequestOutcome::Completed(()));
        let liked: Vec<bool> = service.photos().iter().map(|photo| photo.is_liked).collect();
        assert_eq!(liked, vec![false, true, false]);
        let request = &transport.requests()[1];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url.path(), "/photos/p2/like");
        assert_eq!(request.bearer, Some(Token::new("bearer-1")));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn unlike_uses_delete() {
        let transport = Arc::new(ScriptedTransport::new());
        let page = serde_json::Value::Array(vec![photo_json("liked", true)]).to_string();
        transport.reply(200, page);
        transport.reply(200, "{}");
        let service = signed_in(&transport);
        service.fetch_next_page().await.unwrap();

        service.change_like(&PhotoId::from("liked"), false).await.unwrap();

        assert_eq!(transport.requests()[1].method, Method::DELETE);
        assert!(!service.photo(&PhotoId::from("liked")).unwrap().is_liked);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn like_failure_leaves_flag_unchanged() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.reply(200, photo_page(1, 2));
        transport.reply(500, "");
        let service = signed_in(&transport);
        service.fetch_next_page().await.unwrap();

        let error = service.change_like(&PhotoId::from("p1"), true).await.unwrap_err();

        assert_eq!(
            error,
            Error::Network(NetworkFailure::Status {
                status: 500,
                message: "HTTP 500".to_string(),
            })
        );
        assert!(!service.photo(&PhotoId::from("p1")).unwrap().is_liked);
        assert!(!service.is_request_pending());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn like_for_unknown_photo_succeeds_without_change() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.reply(201, "{}");
        let service = signed_in(&transport);

        let outcome = service.change_like(&PhotoId::from("gone"), true).await.unwrap();
        assert_eq!(outcome, RequestOutcome::Completed(()));
        assert!(service.photos().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn like_without_token_fails() {
        let transport = Arc::new(ScriptedTransport::new());
        let service = service_with(&transport, Arc::new(MemoryTokenStore::default()));

        let error = service.change_like(&PhotoId::from("p1"), true).await.unwrap_err();
        assert_eq!(error, Error::MissingToken);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn reset_clears_collection_and_cursor() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.reply(200, photo_page(1, 10));
        transport.reply(200, photo_page(1, 10));
        let service = signed_in(&transport);
        service.fetch_next_page().await.unwrap();

        service.reset();
        assert!(service.photos().is_empty());
        assert_eq!(service.last_loaded_page(), None);

        service.fetch_next_page().await.unwrap();
        assert_eq!(transport.requests()[1].query_value("page").as_deref(), Some("1"));
        assert_eq!(service.photo_count(), 10);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn page_fetched_before_reset_is_discarded() {
        let transport = Arc::new(ScriptedTransport::new());
        let gate = transport.reply_gated(200, photo_page(1, 10));
        let service = signed_in(&transport);

        let fetch = service.fetch_next_page();
        let reset = async {
            while !service.is_request_pending() {
                tokio::task::yield_now().await;
            }
            service.reset();
            let _ = gate.send(());
        };
        let (fetch, ()) = tokio::join!(fetch, reset);

        assert_eq!(fetch.unwrap(), RequestOutcome::Completed(Vec::new()));
        assert!(service.photos().is_empty());
        assert_eq!(service.last_loaded_page(), None);
        assert!(!service.is_request_pending());
    }

    #[test]
    fn photos_from_out_of_range_is_empty() {
        let transport = Arc::new(ScriptedTransport::new());
        let service = signed_in(&transport);
        assert!(service.photos_from(5).is_empty());
    }
}
