//! Maps navigation inputs onto store transitions and re-renders after each
//! committed one.

use lapse_catalog::CatalogClient;
use lapse_ops::Journal;
use lapse_types::{
    capture::{AvailableDates, DateKey, ImageDescriptor, Step},
    config::{NavigationConfig, StaleResponsePolicy},
    events::{EventPayload, LifecyclePhase},
};
use tracing::{debug, info, warn};

use crate::{
    input::NavInput,
    store::{TimelineState, TimelineStore},
    view::{render, RenderScope, ViewSink},
};

/// A day fetch issued by the controller, tagged with a request token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRequest {
    pub token: u64,
    pub date: DateKey,
}

impl DayRequest {
    pub async fn resolve(self, catalog: &CatalogClient) -> DayResponse {
        let images = catalog.fetch_day_images(&self.date).await;
        DayResponse {
            request: self,
            images,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayResponse {
    pub request: DayRequest,
    pub images: Vec<ImageDescriptor>,
}

/// Result of handing one input to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Committed,
    Ignored,
    UiOnly,
    /// A day switch is waiting on this fetch.
    Pending(DayRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    Committed,
    Rejected,
    Stale,
}

pub struct NavigationController<V: ViewSink> {
    store: TimelineStore,
    catalog: CatalogClient,
    view: V,
    journal: Journal,
    stale_responses: StaleResponsePolicy,
    announce_failed_switch: bool,
    last_token: u64,
}

impl<V: ViewSink> NavigationController<V> {
    /// Mounts the view: the initial state is rendered in full.
    pub fn new(
        state: TimelineState,
        catalog: CatalogClient,
        view: V,
        journal: Journal,
        config: &NavigationConfig,
    ) -> Self {
        let mut controller = Self {
            store: TimelineStore::new(state),
            catalog,
            view,
            journal,
            stale_responses: config.stale_responses,
            announce_failed_switch: config.announce_failed_switch,
            last_token: 0,
        };
        controller.render(RenderScope::Day);
        controller
            .journal
            .record(EventPayload::Lifecycle(LifecyclePhase::Mounted));
        controller
    }

    pub fn state(&self) -> &TimelineState {
        self.store.state()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub async fn load_available_dates(&mut self) {
        let dates = self.catalog.fetch_available_dates().await;
        self.apply_available_dates(dates);
    }

    pub fn apply_available_dates(&mut self, dates: AvailableDates) {
        let count = dates.len();
        self.store.set_available_dates(dates);
        info!("{} capture days available", count);
        self.journal.record(EventPayload::DatesLoaded { count });
    }

    /// Synchronous part of every input. Same-day changes complete here; day
    /// switches stop at fetch issuance and finish in [`Self::complete`].
    pub fn handle(&mut self, input: NavInput) -> Dispatch {
        match input {
            NavInput::SelectIndex(index) => self.select(index),
            NavInput::StepImage(step) => {
                let Some(current) = self.state().current_index() else {
                    debug!("Image step ignored: day has no captures");
                    return Dispatch::Ignored;
                };
                let target = match step {
                    Step::Previous => current.checked_sub(1),
                    Step::Next => current.checked_add(1),
                };
                match target {
                    Some(index) => self.select(index),
                    None => Dispatch::Ignored,
                }
            }
            NavInput::StepDay(step) => {
                let state = self.state();
                let Some(neighbor) = state
                    .available_dates()
                    .neighbor(state.current_date(), step)
                    .cloned()
                else {
                    debug!("Day step {:?} ignored at {}", step, state.current_date());
                    return Dispatch::Ignored;
                };
                Dispatch::Pending(self.issue(neighbor))
            }
            NavInput::JumpToDate(date) => {
                if !self.state().available_dates().contains(&date) {
                    debug!("Jump to unknown date {} ignored", date);
                    return Dispatch::Ignored;
                }
                Dispatch::Pending(self.issue(date))
            }
            NavInput::OpenDatePicker => {
                self.view.open_date_picker();
                Dispatch::UiOnly
            }
        }
    }

    /// Commits or discards a resolved day fetch.
    pub fn complete(&mut self, response: DayResponse) -> SwitchOutcome {
        let DayResponse { request, images } = response;

        if self.stale_responses == StaleResponsePolicy::Discard && request.token != self.last_token
        {
            warn!(
                "Discarding response for {} (token {}, latest {})",
                request.date, request.token, self.last_token
            );
            self.journal.record(EventPayload::StaleResponseDiscarded {
                date: request.date,
                token: request.token,
                latest: self.last_token,
            });
            return SwitchOutcome::Stale;
        }

        match self.store.replace_day(request.date.clone(), images) {
            Ok(state) => {
                let image_count = state.images().len();
                info!("Switched to {} with {} captures", request.date, image_count);
                self.render(RenderScope::Day);
                self.journal.record(EventPayload::DaySwitched {
                    date: request.date,
                    image_count,
                    token: request.token,
                });
                SwitchOutcome::Committed
            }
            Err(rejection) => {
                debug!("Day switch rejected: {rejection}");
                if self.announce_failed_switch {
                    self.view.notice(&format!("Couldn't load {}", request.date));
                }
                self.journal.record(EventPayload::SwitchRejected {
                    date: request.date,
                    token: request.token,
                });
                SwitchOutcome::Rejected
            }
        }
    }

    /// Handles an input to completion, awaiting the fetch of a day switch.
    pub async fn dispatch(&mut self, input: NavInput) -> Dispatch {
        match self.handle(input) {
            Dispatch::Pending(request) => {
                let response = request.resolve(&self.catalog).await;
                match self.complete(response) {
                    SwitchOutcome::Committed => Dispatch::Committed,
                    SwitchOutcome::Rejected | SwitchOutcome::Stale => Dispatch::Ignored,
                }
            }
            other => other,
        }
    }

    fn select(&mut self, index: usize) -> Dispatch {
        let previous = self.state().current_index();
        match self.store.select_index(index) {
            Ok(state) => {
                let date = state.current_date().clone();
                self.render(RenderScope::Selection { previous });
                self.journal.record(EventPayload::IndexSelected { date, index });
                Dispatch::Committed
            }
            Err(rejection) => {
                debug!("Selection ignored: {rejection}");
                Dispatch::Ignored
            }
        }
    }

    fn issue(&mut self, date: DateKey) -> DayRequest {
        self.last_token += 1;
        debug!("Fetching {} (token {})", date, self.last_token);
        DayRequest {
            token: self.last_token,
            date,
        }
    }

    fn render(&mut self, scope: RenderScope) {
        let frame = render(self.store.state(), scope);
        self.view.apply(&frame);
    }
}

impl<V: ViewSink> Drop for NavigationController<V> {
    fn drop(&mut self) {
        self.journal
            .record(EventPayload::Lifecycle(LifecyclePhase::Unmounted));
    }
}
