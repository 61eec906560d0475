//! Loading a site's report and holding the result.
//!
//! Each load is stamped with a generation number when it starts. When the
//! fetch finishes, the result is applied only if no newer load has started
//! in the meantime, so the last site requested is the one shown even if an
//! older fetch completes later.

use crate::reports::generate_site_report;
use crate::source::RowSource;
use crate::types::{DuplicateKey, ReportTable, SiteId};
use chrono::{Local, NaiveDateTime};
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum ReportState {
    Idle,
    Loading { site_id: SiteId },
    NoSiteSelected,
    Failed { site_id: SiteId, message: String },
    /// The fetch succeeded with no rows; `table` is the metadata-only table.
    Empty { table: ReportTable },
    Ready {
        table: ReportTable,
        duplicates: Vec<DuplicateKey>,
    },
}

impl ReportState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ReportState::Loading { .. })
    }

    pub fn table(&self) -> Option<&ReportTable> {
        match self {
            ReportState::Empty { table } | ReportState::Ready { table, .. } => Some(table),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer load started before this one finished; its result was dropped.
    Superseded,
}

struct Inner {
    generation: u64,
    state: ReportState,
}

pub struct ReportSession<S> {
    source: S,
    clock: fn() -> NaiveDateTime,
    inner: Mutex<Inner>,
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl<S: RowSource> ReportSession<S> {
    pub fn new(source: S) -> Self {
        Self::with_clock(source, local_now)
    }

    pub fn with_clock(source: S, clock: fn() -> NaiveDateTime) -> Self {
        ReportSession {
            source,
            clock,
            inner: Mutex::new(Inner {
                generation: 0,
                state: ReportState::Idle,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> ReportState {
        self.lock().state.clone()
    }

    /// Load the report of `site_id` (zero or missing means no site).
    pub async fn load(&self, site_id: Option<u32>) -> LoadOutcome {
        let Some(site_id) = site_id.and_then(SiteId::new) else {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.state = ReportState::NoSiteSelected;
            return LoadOutcome::Applied;
        };

        let ticket = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.state = ReportState::Loading { site_id };
            inner.generation
        };
        info!(site = %site_id, ticket, "loading site report");

        let fetched = self.source.fetch_aggregated_report(site_id).await;

        let mut inner = self.lock();
        if inner.generation != ticket {
            info!(site = %site_id, ticket, latest = inner.generation, "dropping superseded site report");
            return LoadOutcome::Superseded;
        }

        inner.state = match fetched.and_then(|rows| generate_site_report(site_id, &rows, (self.clock)())) {
            Err(e) => {
                warn!(site = %site_id, error = %e, "site report failed");
                ReportState::Failed {
                    site_id,
                    message: e.to_string(),
                }
            }
            Ok((table, pivot)) if pivot.is_empty() => {
                info!(site = %site_id, "site report has no data");
                ReportState::Empty { table }
            }
            Ok((table, pivot)) => {
                info!(
                    site = %site_id,
                    indicators = pivot.rows.len(),
                    years = pivot.years.len(),
                    duplicates = pivot.duplicates.len(),
                    "site report ready"
                );
                ReportState::Ready {
                    table,
                    duplicates: pivot.duplicates,
                }
            }
        };
        LoadOutcome::Applied
    }
}
