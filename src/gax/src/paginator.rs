// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use futures::stream::{self, BoxStream, unfold};
use futures::{Stream, StreamExt};
use pin_project::pin_project;
use std::future::Future;
use std::pin::Pin;

/// Describes a type that can be iterated over asyncly when used with [Paginator].
pub trait PageableResponse {
    type PageItem: Send;

    /// Consumes the page, returning its items in order.
    fn items(self) -> Vec<Self::PageItem>;

    /// The continuation token for the next page. Empty when this is the last
    /// page.
    fn next_page_token(&self) -> String;
}

/// An adapter that converts list RPCs as defined by [AIP-4233](https://google.aip.dev/client-libraries/4233)
/// into a [futures::Stream] that can be iterated over in an async fashion.
///
/// The stream is lazy and forward-only. Each page is requested only when the
/// consumer asks for it, using the continuation token from the previous page,
/// so at most one page is ever held ahead of the consumer.
#[pin_project]
pub struct Paginator<T, E> {
    #[pin]
    stream: BoxStream<'static, Result<T, E>>,
}

type ControlFlow = std::ops::ControlFlow<(), String>;

impl<T, E> Paginator<T, E>
where
    T: PageableResponse + Send + 'static,
    E: Send + 'static,
{
    /// Creates a new [Paginator] given the initial page token and a function
    /// to fetch the next [PageableResponse].
    ///
    /// No page is fetched until the stream is polled.
    pub fn new<F, X>(seed_token: String, execute: X) -> Self
    where
        X: Fn(String) -> F + Clone + Send + 'static,
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self {
            stream: pages(ControlFlow::Continue(seed_token), execute),
        }
    }

    /// Creates a new [Paginator] from a page that was already fetched.
    ///
    /// The stream yields `first` and then continues with the token returned
    /// in `first`, if any.
    pub fn resume<F, X>(first: T, execute: X) -> Self
    where
        X: Fn(String) -> F + Clone + Send + 'static,
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        let token = first.next_page_token();
        let state = if token.is_empty() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(token)
        };
        let head = stream::once(async move { Ok(first) });
        Self {
            stream: head.chain(pages(state, execute)).boxed(),
        }
    }

    /// Returns the next mutation of the wrapped stream.
    pub fn next(&mut self) -> futures::stream::Next<'_, Self> {
        StreamExt::next(self)
    }

    /// Converts the page stream into a stream of the items in each page.
    pub fn items(self) -> ItemPaginator<T::PageItem, E> {
        let stream = self
            .stream
            .flat_map(|page| {
                let items = match page {
                    Ok(p) => p.items().into_iter().map(Ok).collect::<Vec<_>>(),
                    Err(e) => vec![Err(e)],
                };
                stream::iter(items)
            })
            .boxed();
        ItemPaginator { stream }
    }
}

fn pages<T, E, F, X>(state: ControlFlow, execute: X) -> BoxStream<'static, Result<T, E>>
where
    T: PageableResponse + Send + 'static,
    E: Send + 'static,
    X: Fn(String) -> F + Clone + Send + 'static,
    F: Future<Output = Result<T, E>> + Send + 'static,
{
    unfold(state, move |state| {
        let execute = execute.clone();
        async move {
            let token = match state {
                ControlFlow::Continue(token) => token,
                ControlFlow::Break(_) => return None,
            };
            match execute(token).await {
                Ok(page_resp) => {
                    let tok = page_resp.next_page_token();
                    let next_state = if tok.is_empty() {
                        ControlFlow::Break(())
                    } else {
                        ControlFlow::Continue(tok)
                    };
                    Some((Ok(page_resp), next_state))
                }
                Err(e) => Some((Err(e), ControlFlow::Break(()))),
            }
        }
    })
    .boxed()
}

impl<T, E> Stream for Paginator<T, E> {
    type Item = Result<T, E>;

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        self.project().stream.poll_next(cx)
    }
}

/// A [futures::Stream] over the items of a list RPC, across all pages.
///
/// Created by [Paginator::items]. An error fetching a page is yielded once and
/// ends the stream.
#[pin_project]
pub struct ItemPaginator<I, E> {
    #[pin]
    stream: BoxStream<'static, Result<I, E>>,
}

impl<I, E> ItemPaginator<I, E> {
    /// Returns the next item.
    pub fn next(&mut self) -> futures::stream::Next<'_, Self> {
        StreamExt::next(self)
    }
}

impl<I, E> Stream for ItemPaginator<I, E> {
    type Item = Result<I, E>;

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        self.project().stream.poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    type TestError = Box<dyn std::error::Error + Send + Sync>;

    struct TestResponse {
        items: Vec<PageItem>,
        next_page_token: String,
    }

    #[derive(Clone, Debug, PartialEq)]
    struct PageItem {
        name: String,
    }

    impl PageableResponse for TestResponse {
        type PageItem = PageItem;
        fn items(self) -> Vec<PageItem> {
            self.items
        }
        fn next_page_token(&self) -> String {
            self.next_page_token.clone()
        }
    }

    fn page(names: &[&str], token: &str) -> TestResponse {
        TestResponse {
            items: names
                .iter()
                .map(|n| PageItem {
                    name: n.to_string(),
                })
                .collect(),
            next_page_token: token.to_string(),
        }
    }

    #[tokio::test]
    async fn test_paginator() {
        let seed = "token1".to_string();
        let responses = VecDeque::from([page(&["item1", "item2"], "token2"), page(&["item3"], "")]);
        let expected_tokens = VecDeque::from(["token1".to_string(), "token2".to_string()]);

        let state = Arc::new(Mutex::new(responses));
        let tokens = Arc::new(Mutex::new(expected_tokens));

        let execute = move |token: String| {
            let expected_token = tokens.lock().unwrap().pop_front().unwrap();
            assert_eq!(token, expected_token);
            let resp = state.lock().unwrap().pop_front().unwrap();
            async move { Ok::<_, TestError>(resp) }
        };

        let mut resps = vec![];
        let mut stream = Paginator::new(seed, execute);
        while let Some(resp) = stream.next().await {
            if let Ok(resp) = resp {
                resps.push(resp)
            }
        }
        assert_eq!(resps.len(), 2);
        assert_eq!(resps[0].items[0].name, "item1");
        assert_eq!(resps[0].items[1].name, "item2");
        assert_eq!(resps[1].items[0].name, "item3");
    }

    #[tokio::test]
    async fn test_paginator_is_lazy() {
        let calls = Arc::new(Mutex::new(0_usize));
        let counter = calls.clone();
        let execute = move |token: String| {
            *counter.lock().unwrap() += 1;
            let resp = match token.as_str() {
                "" => page(&["a"], "t1"),
                "t1" => page(&["b"], "t2"),
                _ => page(&["c"], ""),
            };
            async move { Ok::<_, TestError>(resp) }
        };
        let mut stream = Paginator::new(String::new(), execute);
        assert_eq!(*calls.lock().unwrap(), 0);
        let _ = stream.next().await;
        assert_eq!(*calls.lock().unwrap(), 1);
        let _ = stream.next().await;
        assert_eq!(*calls.lock().unwrap(), 2);
        drop(stream);
        assert_eq!(*calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_paginator_resume() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let recorder = calls.clone();
        let execute = move |token: String| {
            recorder.lock().unwrap().push(token.clone());
            async move { Ok::<_, TestError>(page(&["item3"], "")) }
        };
        let mut stream = Paginator::resume(page(&["item1", "item2"], "token2"), execute);
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.items.len(), 2);
        assert!(calls.lock().unwrap().is_empty());
        let second = stream.next().await.unwrap().unwrap();
        assert_eq!(second.items[0].name, "item3");
        assert_eq!(*calls.lock().unwrap(), vec!["token2".to_string()]);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_paginator_resume_single_page() {
        let execute =
            |_: String| async { Err::<TestResponse, TestError>("unexpected fetch".into()) };
        let mut stream = Paginator::resume(page(&["only"], ""), execute);
        let first = stream.next().await;
        assert!(matches!(first, Some(Ok(_))));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_items() {
        let execute = |token: String| async move {
            let resp = match token.as_str() {
                "" => page(&["item1", "item2"], "t1"),
                _ => page(&["item3"], ""),
            };
            Ok::<_, TestError>(resp)
        };
        let mut items = Paginator::new(String::new(), execute).items();
        let mut names = Vec::new();
        while let Some(item) = items.next().await {
            names.push(item.unwrap().name);
        }
        assert_eq!(names, vec!["item1", "item2", "item3"]);
    }

    #[tokio::test]
    async fn test_paginator_error() {
        let execute = |_| async { Err::<TestResponse, TestError>("err".into()) };

        let mut paginator = Paginator::new(String::new(), execute);
        let mut count = 0;
        while let Some(resp) = paginator.next().await {
            match resp {
                Ok(_) => {
                    panic!("Should not succeed");
                }
                Err(e) => {
                    assert_eq!(e.to_string(), "err");
                    count += 1;
                }
            }
        }
        assert_eq!(count, 1);
    }
}
