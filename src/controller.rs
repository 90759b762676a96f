//! Drives one submission from the URL field to a terminal page state.

use tracing::{debug, error, info};

use crate::api::{ApiError, MetadataService};
use crate::model::{MetadataResponse, SubmissionState};
use crate::page::{Element, PageView};
use crate::renderer::FormatRenderer;

/// Shown whenever a request fails, regardless of the server's wording
pub const FAILURE_HINT: &str = "Could not fetch data. Check the link and try again.";

pub struct RequestController<S, V> {
    service: S,
    page: V,
    renderer: FormatRenderer,
}

/// Hides the progress bar and re-enables the form when dropped, so a
/// submission that errors or is dropped mid-request still ends interactive.
struct Finalize<V: PageView> {
    page: V,
}

impl<V: PageView> Drop for Finalize<V> {
    fn drop(&mut self) {
        self.page.set_visible(Element::TopBar, false);
        self.page.set_submit_enabled(true);
    }
}

/// An accepted submission: the page is already busy and the form disabled.
/// Finalizes the page when dropped, completed or not.
pub struct Submission<V: PageView> {
    url: String,
    _finalize: Finalize<V>,
}

impl<V: PageView> Submission<V> {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl<S: MetadataService, V: PageView + Clone> RequestController<S, V> {
    pub fn new(service: S, page: V) -> Self {
        Self {
            service,
            page,
            renderer: FormatRenderer,
        }
    }

    /// Handles a form submission.
    ///
    /// Returns `None` when the trimmed input is empty and nothing happened,
    /// otherwise the state the page was left in. Concurrent calls are not
    /// serialized: whichever response resolves last owns the page.
    pub async fn submit(&self, raw_url: &str) -> Option<SubmissionState> {
        let submission = self.begin(raw_url)?;
        Some(self.complete(submission).await)
    }

    /// Accepts a submission synchronously: trims the input, puts the page
    /// in the busy state and disables the form before anything is awaited.
    pub fn begin(&self, raw_url: &str) -> Option<Submission<V>> {
        let url = raw_url.trim();
        if url.is_empty() {
            debug!("ignoring empty submission");
            return None;
        }

        let submission = Submission {
            url: url.to_owned(),
            _finalize: Finalize {
                page: self.page.clone(),
            },
        };
        self.enter_busy();
        Some(submission)
    }

    /// Requests metadata for an accepted submission and applies the result.
    pub async fn complete(&self, submission: Submission<V>) -> SubmissionState {
        let url = submission.url();
        info!(url, "requesting metadata");

        match self.service.fetch_info(url).await {
            Ok(info) => self.enter_ready(url, info),
            Err(err) => self.enter_error(&err),
        }
    }

    fn show_state(&self, state: SubmissionState) {
        debug!(?state, "submission state");
        self.page.set_state(state);
        self.page.set_visible(Element::Spinner, state.is_busy());
    }

    fn enter_busy(&self) {
        self.show_state(SubmissionState::Busy);
        self.page.set_submit_enabled(false);
        self.page.set_visible(Element::TopBar, true);
        self.page.set_visible(Element::Skeleton, true);
        self.page.set_visible(Element::ContentHead, false);
        self.page.set_visible(Element::Formats, false);
        self.page.set_visible(Element::Result, true);
        self.page.set_hint("");
        self.renderer.clear(&self.page);
    }

    fn enter_ready(&self, url: &str, info: MetadataResponse) -> SubmissionState {
        info!(formats = info.formats.len(), "metadata received");
        self.page.set_details(info.details());
        self.renderer.render(&self.page, url, &info.formats);

        self.page.set_visible(Element::Skeleton, false);
        self.page.set_visible(Element::ContentHead, true);
        self.page.set_visible(Element::Formats, true);
        self.show_state(SubmissionState::Ready);
        SubmissionState::Ready
    }

    fn enter_error(&self, err: &ApiError) -> SubmissionState {
        error!(error = %err, server_message = err.server_message(), "metadata request failed");
        self.show_state(SubmissionState::Error);
        self.page.set_visible(Element::Skeleton, false);
        self.page.set_hint(FAILURE_HINT);
        SubmissionState::Error
    }
}
