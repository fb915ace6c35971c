//! Shared types and paging infrastructure for the Vimeo API client.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::collections::VecDeque;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};
use tokio_stream::Stream;

type OneFuturePage<'a, F, T> =
    Pin<Box<dyn Future<Output = eyre::Result<(F, (VecDeque<T>, Option<u32>))>> + 'a + Send>>;

/// A stream over a page-numbered list endpoint that fetches the next page only once the
/// current one has been consumed.
///
/// The fetcher receives a 1-based page number and returns that page's items along with the
/// number of the page to fetch next, if any. A failed fetch is yielded as a single error and
/// ends the stream.
pub struct PagedStream<'a, T, F> {
    /// Items of the most recent page not yet handed out
    current_items: VecDeque<T>,
    /// The request for the next page, if one is due
    pending_request: Option<OneFuturePage<'a, F, T>>,
    is_done: bool,
}

impl<'a, T, F> PagedStream<'a, T, F> {
    pub fn new<Fut>(fetcher: F) -> Self
    where
        F: Fn(u32) -> Fut,
        F: Send + 'a,
        Fut: Future<Output = eyre::Result<(VecDeque<T>, Option<u32>)>> + Send + 'a,
    {
        let first_page = async move {
            let results = fetcher(1).await?;
            Ok((fetcher, results))
        };
        Self {
            pending_request: Some(Box::pin(first_page)),
            current_items: VecDeque::new(),
            is_done: false,
        }
    }
}

impl<'a, T: Unpin, F> Unpin for PagedStream<'a, T, F> {}

impl<'a, T: Unpin, F, Fut> Stream for PagedStream<'a, T, F>
where
    F: Fn(u32) -> Fut,
    F: Send + 'a,
    Fut: Future<Output = eyre::Result<(VecDeque<T>, Option<u32>)>> + Send + 'a,
{
    type Item = eyre::Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(item) = self.current_items.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }

            if self.is_done {
                return Poll::Ready(None);
            }

            let Some(pending) = self.pending_request.as_mut() else {
                self.is_done = true;
                return Poll::Ready(None);
            };

            match pending.as_mut().poll(cx) {
                Poll::Ready(Ok((fetcher, (items, next_page)))) => {
                    self.current_items.extend(items);

                    if let Some(next_page) = next_page {
                        // set up the next page, but leave it unpolled until these items are gone
                        self.pending_request = Some(Box::pin(async move {
                            let results = fetcher(next_page).await?;
                            Ok((fetcher, results))
                        }));
                    } else {
                        self.is_done = true;
                        self.pending_request = None;
                    }
                }
                Poll::Ready(Err(e)) => {
                    self.pending_request = None;
                    self.is_done = true;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// One page of a list endpoint.
///
/// Every field is optional: an error body, or an empty one, decodes to an empty page. Items
/// are kept as raw JSON until [`Page::into_items`], so one malformed item does not cost the
/// rest of the page.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    /// Total number of items across all pages.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub per_page: Option<u64>,
    #[serde(default)]
    data: Option<Vec<serde_json::Value>>,
    #[serde(skip)]
    item: PhantomData<fn() -> T>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            total: None,
            page: None,
            per_page: None,
            data: None,
            item: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> Page<T> {
    /// Number of items the API sent, including any that will not decode.
    pub fn len(&self) -> usize {
        self.data.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decodes the items, dropping (and logging) any that do not fit `T`.
    pub fn into_items(self) -> Vec<T> {
        self.data
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping list item that does not decode");
                    None
                }
            })
            .collect()
    }
}

/// Reads a count or size the API may send as an integer, a float or a numeric string.
///
/// Anything else (including negative numbers) reads as absent rather than failing the
/// surrounding resource.
pub fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    fn from_f64(f: f64) -> Option<u64> {
        (f.is_finite() && f >= 0.0).then(|| f.trunc() as u64)
    }

    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        serde_json::Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(from_f64)),
        serde_json::Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(from_f64))
        }
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn test_paged_stream_walks_pages_in_order() {
        let calls = std::sync::Mutex::new(Vec::new());
        let stream = PagedStream::new(|page| {
            calls.lock().unwrap().push(page);
            async move {
                let items: VecDeque<u32> = match page {
                    1 => [1, 2].into(),
                    2 => [3].into(),
                    _ => unreachable!("no page {page}"),
                };
                Ok::<_, eyre::Report>((items, (page == 1).then_some(2)))
            }
        });
        let items: Vec<u32> = stream.map(|r| r.unwrap()).collect().await;
        assert_eq!(items, [1, 2, 3]);
        assert_eq!(*calls.lock().unwrap(), [1, 2]);
    }

    #[tokio::test]
    async fn test_paged_stream_stops_after_error() {
        let stream = PagedStream::new(|page| async move {
            if page == 1 {
                Ok((VecDeque::from([10u32]), Some(2)))
            } else {
                Err(eyre::eyre!("page {page} exploded"))
            }
        });
        let results: Vec<_> = stream.collect().await;
        assert_eq!(results.len(), 2);
        assert_eq!(*results[0].as_ref().unwrap(), 10);
        assert_eq!(results[1].as_ref().unwrap_err().to_string(), "page 2 exploded");
    }

    #[test]
    fn test_page_skips_items_that_do_not_decode() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Item {
            name: String,
        }

        let page: Page<Item> = serde_json::from_value(serde_json::json!({
            "total": "3",
            "per_page": 2.0,
            "data": [{"name": "a"}, {"name": 7}, {"name": "c"}],
        }))
        .unwrap();
        assert_eq!(page.total, Some(3));
        assert_eq!(page.per_page, Some(2));
        assert_eq!(page.len(), 3);
        assert_eq!(
            page.into_items(),
            [Item { name: "a".into() }, Item { name: "c".into() }]
        );
    }

    #[test]
    fn test_lenient_counts() {
        #[derive(Deserialize)]
        struct Count {
            #[serde(default, deserialize_with = "lenient_u64")]
            n: Option<u64>,
        }
        let read = |json: serde_json::Value| serde_json::from_value::<Count>(json).unwrap().n;

        assert_eq!(read(serde_json::json!({"n": 12})), Some(12));
        assert_eq!(read(serde_json::json!({"n": 12.5})), Some(12));
        assert_eq!(read(serde_json::json!({"n": " 40 "})), Some(40));
        assert_eq!(read(serde_json::json!({"n": -1})), None);
        assert_eq!(read(serde_json::json!({"n": "soon"})), None);
        assert_eq!(read(serde_json::json!({"n": [1]})), None);
        assert_eq!(read(serde_json::json!({"n": null})), None);
        assert_eq!(read(serde_json::json!({})), None);
    }

    #[test]
    fn test_empty_body_is_empty_page() {
        let page: Page<serde_json::Value> = serde_json::from_str("{}").unwrap();
        assert!(page.total.is_none());
        assert!(page.into_items().is_empty());

        let page: Page<serde_json::Value> =
            serde_json::from_str(r#"{"total": null, "data": null}"#).unwrap();
        assert!(page.into_items().is_empty());
    }
}
