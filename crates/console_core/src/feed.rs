//! Paginated stream feed: filter epochs, in-flight guard and `has_more`.
//!
//! Every filter transition starts a new epoch. Page requests carry the epoch
//! they were issued in, and a response is merged only if it answers the
//! request that is currently in flight for the current epoch. Responses from
//! older epochs are dropped without touching the state.

use console_logging::console_debug;

use crate::{FilterKey, StreamRecord};

/// Generation counter of the feed, bumped on every filter transition.
pub type Epoch = u64;

/// Default number of records requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub epoch: Epoch,
    pub page: u32,
    pub page_size: u32,
    pub filter: FilterKey,
}

/// How a page response (or failure) was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Replaced,
    Appended,
    Failed,
    /// The response belongs to an older epoch or to no outstanding request.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedState {
    items: Vec<StreamRecord>,
    page: u32,
    page_size: u32,
    total: u64,
    has_more: bool,
    first_page_loaded: bool,
    in_flight: Option<PageRequest>,
    epoch: Epoch,
    filter: Option<FilterKey>,
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl FeedState {
    pub fn new(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            page_size: page_size.max(1),
            total: 0,
            has_more: false,
            first_page_loaded: false,
            in_flight: None,
            epoch: 0,
            filter: None,
        }
    }

    /// Switch to `key`. Returns the page-1 request to issue, or `None` when the
    /// key equals the current filter.
    pub fn set_filter(&mut self, key: FilterKey) -> Option<PageRequest> {
        if self.filter.as_ref() == Some(&key) {
            return None;
        }
        self.filter = Some(key);
        self.reset_epoch()
    }

    /// Reload page 1 of the current filter in a fresh epoch.
    pub fn refresh(&mut self) -> Option<PageRequest> {
        self.reset_epoch()
    }

    /// Request the next page unless a fetch is outstanding or the server
    /// reported no further data.
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() || !self.has_more {
            return None;
        }
        let next = if self.first_page_loaded {
            self.page + 1
        } else {
            1
        };
        self.begin(next)
    }

    /// Merge a successful page. Page 1 replaces, later pages append.
    pub fn apply_page(
        &mut self,
        epoch: Epoch,
        page: u32,
        records: Vec<StreamRecord>,
        total: u64,
    ) -> PageOutcome {
        if !self.take_in_flight(epoch, page) {
            return PageOutcome::Stale;
        }

        let outcome = if page == 1 {
            self.items = records;
            PageOutcome::Replaced
        } else {
            self.items.extend(records);
            PageOutcome::Appended
        };
        self.page = page;
        self.first_page_loaded = true;
        self.total = total;
        self.has_more = u64::from(page) * u64::from(self.page_size) < total;
        outcome
    }

    /// Record a failed page. Cursor, items and `has_more` stay as they were.
    pub fn apply_failure(&mut self, epoch: Epoch, page: u32) -> PageOutcome {
        if !self.take_in_flight(epoch, page) {
            return PageOutcome::Stale;
        }
        PageOutcome::Failed
    }

    pub fn items(&self) -> &[StreamRecord] {
        &self.items
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn pending_request(&self) -> Option<&PageRequest> {
        self.in_flight.as_ref()
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn filter(&self) -> Option<&FilterKey> {
        self.filter.as_ref()
    }

    fn reset_epoch(&mut self) -> Option<PageRequest> {
        self.filter.as_ref()?;
        self.epoch += 1;
        self.page = 1;
        self.items.clear();
        self.total = 0;
        self.has_more = true;
        self.first_page_loaded = false;
        // An older epoch's request may still be running; its response is
        // dropped on arrival.
        self.in_flight = None;
        self.begin(1)
    }

    fn begin(&mut self, page: u32) -> Option<PageRequest> {
        let filter = self.filter.clone()?;
        let request = PageRequest {
            epoch: self.epoch,
            page,
            page_size: self.page_size,
            filter,
        };
        self.in_flight = Some(request.clone());
        Some(request)
    }

    fn take_in_flight(&mut self, epoch: Epoch, page: u32) -> bool {
        match &self.in_flight {
            Some(pending) if pending.epoch == epoch && pending.page == page => {
                self.in_flight = None;
                true
            }
            _ => {
                console_debug!(
                    "dropping stale page response epoch={} page={} (current epoch={})",
                    epoch,
                    page,
                    self.epoch
                );
                false
            }
        }
    }
}
