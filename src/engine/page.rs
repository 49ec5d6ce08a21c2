//! Page navigation

use tracing::debug;

use super::{Dispatch, MappingEngine};
use crate::state::Page;

impl MappingEngine {
    /// Current page
    pub fn page(&self) -> Page {
        self.session.page
    }

    /// Navigate to the next page, clamped at the last page
    pub(crate) fn next_page(&mut self) -> Dispatch {
        match self.session.page.next() {
            Some(page) => self.change_page(page),
            None => {
                debug!("Already on last page {}", self.session.page);
                Dispatch::default()
            }
        }
    }

    /// Navigate to the previous page, clamped at the first page
    pub(crate) fn prev_page(&mut self) -> Dispatch {
        match self.session.page.prev() {
            Some(page) => self.change_page(page),
            None => {
                debug!("Already on first page {}", self.session.page);
                Dispatch::default()
            }
        }
    }

    fn change_page(&mut self, page: Page) -> Dispatch {
        let old = self.session.page;
        self.session.page = page;
        debug!("Page {} → {}", old, page);
        Dispatch::status(self.status_line())
    }
}
