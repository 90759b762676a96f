//! Page state shared between the request controller and the GUI.
//!
//! The controller only talks to [`PageView`]; the GUI reads a
//! [`PageState`] snapshot every frame.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::model::{DownloadLinkEntry, SubmissionState, VideoDetails};

/// Page regions that can be shown or hidden
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    /// Container for everything below the form
    Result,
    /// Thumbnail, title and uploader
    ContentHead,
    /// The download entries
    Formats,
    /// Thin progress bar at the top of the window
    TopBar,
    /// Spinner next to the state indicator
    Spinner,
    /// Placeholder shown while metadata loads
    Skeleton,
}

/// UI operations the request controller relies on
pub trait PageView: Send + Sync {
    fn set_state(&self, state: SubmissionState);
    fn set_visible(&self, element: Element, visible: bool);
    fn set_submit_enabled(&self, enabled: bool);
    fn set_hint(&self, text: &str);
    fn set_details(&self, details: VideoDetails);
    fn replace_formats(&self, entries: Vec<DownloadLinkEntry>);
}

impl<T: PageView + ?Sized> PageView for Arc<T> {
    fn set_state(&self, state: SubmissionState) {
        (**self).set_state(state)
    }

    fn set_visible(&self, element: Element, visible: bool) {
        (**self).set_visible(element, visible)
    }

    fn set_submit_enabled(&self, enabled: bool) {
        (**self).set_submit_enabled(enabled)
    }

    fn set_hint(&self, text: &str) {
        (**self).set_hint(text)
    }

    fn set_details(&self, details: VideoDetails) {
        (**self).set_details(details)
    }

    fn replace_formats(&self, entries: Vec<DownloadLinkEntry>) {
        (**self).replace_formats(entries)
    }
}

/// Everything the GUI needs to draw one frame
#[derive(Debug, Clone)]
pub struct PageState {
    pub state: SubmissionState,
    pub result_visible: bool,
    pub content_head_visible: bool,
    pub formats_visible: bool,
    pub top_bar_visible: bool,
    pub spinner_visible: bool,
    pub skeleton_visible: bool,
    pub submit_enabled: bool,
    pub hint: String,
    pub details: VideoDetails,
    pub formats: Vec<DownloadLinkEntry>,
    /// When the current format list was rendered, drives the staggered reveal
    pub formats_rendered_at: Option<Instant>,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            state: SubmissionState::Idle,
            result_visible: false,
            content_head_visible: false,
            formats_visible: false,
            top_bar_visible: false,
            spinner_visible: false,
            skeleton_visible: false,
            submit_enabled: true,
            hint: String::new(),
            details: VideoDetails::default(),
            formats: Vec::new(),
            formats_rendered_at: None,
        }
    }
}

impl PageState {
    pub fn is_visible(&self, element: Element) -> bool {
        match element {
            Element::Result => self.result_visible,
            Element::ContentHead => self.content_head_visible,
            Element::Formats => self.formats_visible,
            Element::TopBar => self.top_bar_visible,
            Element::Spinner => self.spinner_visible,
            Element::Skeleton => self.skeleton_visible,
        }
    }

    pub fn set_visible(&mut self, element: Element, visible: bool) {
        let flag = match element {
            Element::Result => &mut self.result_visible,
            Element::ContentHead => &mut self.content_head_visible,
            Element::Formats => &mut self.formats_visible,
            Element::TopBar => &mut self.top_bar_visible,
            Element::Spinner => &mut self.spinner_visible,
            Element::Skeleton => &mut self.skeleton_visible,
        };
        *flag = visible;
    }

    pub fn replace_formats(&mut self, entries: Vec<DownloadLinkEntry>) {
        self.formats_rendered_at = (!entries.is_empty()).then(Instant::now);
        self.formats = entries;
    }
}

type Notifier = Arc<dyn Fn() + Send + Sync>;

/// Cloneable handle to the page state, created once at startup
#[derive(Clone)]
pub struct SharedPage {
    inner: Arc<Mutex<PageState>>,
    notify: Option<Notifier>,
}

impl Default for SharedPage {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedPage {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(PageState::default())),
            notify: None,
        }
    }

    /// Calls `notify` after every change, typically to request a repaint
    pub fn with_notifier(mut self, notify: impl Fn() + Send + Sync + 'static) -> Self {
        self.notify = Some(Arc::new(notify));
        self
    }

    pub fn snapshot(&self) -> PageState {
        self.inner.lock().clone()
    }

    fn update(&self, change: impl FnOnce(&mut PageState)) {
        change(&mut *self.inner.lock());
        if let Some(notify) = &self.notify {
            notify();
        }
    }
}

impl PageView for SharedPage {
    fn set_state(&self, state: SubmissionState) {
        self.update(|page| page.state = state);
    }

    fn set_visible(&self, element: Element, visible: bool) {
        self.update(|page| page.set_visible(element, visible));
    }

    fn set_submit_enabled(&self, enabled: bool) {
        self.update(|page| page.submit_enabled = enabled);
    }

    fn set_hint(&self, text: &str) {
        self.update(|page| page.hint = text.to_owned());
    }

    fn set_details(&self, details: VideoDetails) {
        self.update(|page| page.details = details);
    }

    fn replace_formats(&self, entries: Vec<DownloadLinkEntry>) {
        self.update(|page| page.replace_formats(entries));
    }
}
