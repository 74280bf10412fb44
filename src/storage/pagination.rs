// Lazy object iteration over a paged two-stream listing
use crate::error::{BackendSnafu, ListingInterruptedSnafu, Result};
use crate::storage::backend::FileShare;
use crate::storage::mapper::{format_dir_item, format_file_item};
use crate::storage::object::Object;
use crate::storage::utils::cancel::cancellable;
use crate::storage::utils::path::PathResolver;
use futures::Stream;
use snafu::ResultExt;
use std::collections::VecDeque;
use std::mem;
use tokio_util::sync::CancellationToken;

/// Cursor of one listing: where it lists and where the next page starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageStatus {
    pub prefix: String,
    pub marker: Option<String>,
    pub max_results: u32,
}

impl PageStatus {
    pub fn new(prefix: String, max_results: u32) -> Self {
        Self {
            prefix,
            marker: None,
            max_results,
        }
    }
}

#[derive(Debug)]
enum IteratorState {
    Ready(PageStatus),
    /// The cursor is moved into the in-flight fetch.
    Fetching,
    Exhausted,
}

/// Single-pass iterator over the objects below a directory.
///
/// Pages are fetched on demand. Within a page directories come before files, in
/// backend order; pages follow each other. After the backend signals completion,
/// or after any error, the iterator yields nothing more.
pub struct ObjectIterator<'a, B> {
    backend: &'a B,
    resolver: &'a PathResolver,
    cancel: Option<CancellationToken>,
    prefix: String,
    state: IteratorState,
    buffered: VecDeque<Object>,
    pages: usize,
}

impl<'a, B: FileShare> ObjectIterator<'a, B> {
    pub fn new(
        backend: &'a B,
        resolver: &'a PathResolver,
        status: PageStatus,
        cancel: Option<CancellationToken>,
    ) -> Self {
        Self {
            backend,
            resolver,
            cancel,
            prefix: status.prefix.clone(),
            state: IteratorState::Ready(status),
            buffered: VecDeque::new(),
            pages: 0,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Number of pages fetched so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages
    }

    pub fn is_exhausted(&self) -> bool {
        self.buffered.is_empty() && matches!(self.state, IteratorState::Exhausted)
    }

    /// Yield the next object, fetching a page when the buffer runs dry.
    ///
    /// `Ok(None)` marks the end of the listing.
    pub async fn next(&mut self) -> Result<Option<Object>> {
        loop {
            if let Some(object) = self.buffered.pop_front() {
                return Ok(Some(object));
            }

            let status = match mem::replace(&mut self.state, IteratorState::Fetching) {
                IteratorState::Ready(status) => status,
                IteratorState::Exhausted => {
                    self.state = IteratorState::Exhausted;
                    return Ok(None);
                }
                IteratorState::Fetching => {
                    // A previous fetch was dropped before it finished; the cursor is gone.
                    self.state = IteratorState::Exhausted;
                    return ListingInterruptedSnafu {
                        prefix: self.prefix.as_str(),
                    }
                    .fail();
                }
            };

            match self.next_page(status).await {
                Ok(next) => {
                    self.pages += 1;
                    self.state = next.map_or(IteratorState::Exhausted, IteratorState::Ready);
                }
                Err(err) => {
                    self.state = IteratorState::Exhausted;
                    return Err(err);
                }
            }
        }
    }

    /// Fetch one page into the buffer and return the cursor for the following one.
    async fn next_page(&mut self, mut status: PageStatus) -> Result<Option<PageStatus>> {
        log::trace!(
            "list segment prefix={} marker={:?} max_results={}",
            status.prefix,
            status.marker,
            status.max_results
        );
        let fetch = async {
            self.backend
                .list_segment(&status.prefix, status.marker.as_deref(), status.max_results)
                .await
                .context(BackendSnafu {
                    op: "list",
                    path: status.prefix.as_str(),
                })
        };
        let segment = cancellable(self.cancel.as_ref(), "list", &status.prefix, fetch).await?;

        for item in &segment.directory_items {
            self.buffered.push_back(format_dir_item(self.resolver, item));
        }
        for item in &segment.file_items {
            self.buffered.push_back(format_file_item(self.resolver, item));
        }

        if !segment.next_marker.not_done() {
            return Ok(None);
        }
        status.marker = segment.next_marker.into_inner();
        Ok(Some(status))
    }

    /// Turn the iterator into a `Stream` of objects.
    pub fn into_stream(self) -> impl Stream<Item = Result<Object>> + 'a
    where
        B: 'a,
    {
        futures::stream::try_unfold(self, |mut iter| async move {
            Ok(iter.next().await?.map(|object| (object, iter)))
        })
    }

    /// Drain the remaining objects into a vector.
    pub async fn collect(mut self) -> Result<Vec<Object>> {
        let mut objects = Vec::new();
        while let Some(object) = self.next().await? {
            objects.push(object);
        }
        Ok(objects)
    }
}
