//! Per-user state and the event-driven render loop.
//!
//! A [`Session`] owns everything one user can change: pie settings, refresh settings, the
//! weather history and the auto-refresh timer. Each event is applied to that state and
//! followed by exactly one render pass of the active page.

use crate::config::DashboardConfig;
use crate::pie::page::{pie_header, PieEvent, PiePage, PieSettings};
use crate::refresh::RefreshDriver;
use crate::view::{Notice, RenderedPage};
use crate::weather::history::SessionHistory;
use crate::weather::page::{WeatherEvent, WeatherPage, WeatherSettings};
use log::{debug, info};
use tokio::sync::mpsc;

const EVENT_QUEUE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivePage {
    #[default]
    Pie,
    Weather,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    ShowPage(ActivePage),
    Pie(PieEvent),
    Weather(WeatherEvent),
    /// Ends the session and cancels its timer.
    Close,
}

/// What [`Session::dispatch`] did with an event.
#[derive(Debug, Clone)]
pub enum Dispatch {
    Rendered(Box<RenderedPage>),
    /// Stale event (e.g. a timer tick after auto refresh was switched off).
    Ignored,
    Closed,
}

pub struct Session {
    id: u64,
    active: ActivePage,
    pie_settings: PieSettings,
    weather_settings: WeatherSettings,
    history: SessionHistory,
    pie: PiePage,
    weather: WeatherPage,
    refresh: RefreshDriver,
    sender: mpsc::Sender<DashboardEvent>,
    events: mpsc::Receiver<DashboardEvent>,
}

impl Session {
    pub(crate) fn new(id: u64, config: &DashboardConfig, pie: PiePage, weather: WeatherPage) -> Self {
        let (sender, events) = mpsc::channel(EVENT_QUEUE);
        Self {
            id,
            active: ActivePage::default(),
            pie_settings: PieSettings::default(),
            weather_settings: WeatherSettings::new(config.refresh_interval),
            history: SessionHistory::new(),
            pie,
            weather,
            refresh: RefreshDriver::new(sender.clone()),
            sender,
            events,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn active_page(&self) -> ActivePage {
        self.active
    }

    pub fn pie_settings(&self) -> &PieSettings {
        &self.pie_settings
    }

    pub fn weather_settings(&self) -> &WeatherSettings {
        &self.weather_settings
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    pub fn is_auto_refreshing(&self) -> bool {
        self.refresh.is_running()
    }

    /// Handle for feeding events into [`run`](Self::run) from other tasks.
    pub fn sender(&self) -> mpsc::Sender<DashboardEvent> {
        self.sender.clone()
    }

    /// Applies `event` and renders the active page once.
    pub async fn dispatch(&mut self, event: DashboardEvent) -> Dispatch {
        debug!("Session {} handling {:?}", self.id, event);
        match event {
            DashboardEvent::Close => {
                self.refresh.stop();
                info!("Session {} closed", self.id);
                return Dispatch::Closed;
            }
            DashboardEvent::ShowPage(page) => self.active = page,
            DashboardEvent::Pie(event) => self.pie_settings.apply(event),
            DashboardEvent::Weather(WeatherEvent::SetInterval(secs)) => {
                self.weather_settings.set_interval_secs(secs)
            }
            DashboardEvent::Weather(WeatherEvent::SetAutoRefresh(on)) => {
                self.weather_settings.auto_refresh = on
            }
            DashboardEvent::Weather(WeatherEvent::Refresh) => {}
            DashboardEvent::Weather(WeatherEvent::Tick(generation)) => {
                if !self.refresh.is_current(generation) {
                    return Dispatch::Ignored;
                }
                self.weather.invalidate().await;
            }
        }
        self.sync_refresh();
        Dispatch::Rendered(Box::new(self.render().await))
    }

    /// Auto refresh only runs while the weather page is shown with the toggle on.
    fn sync_refresh(&mut self) {
        let wanted = self.active == ActivePage::Weather && self.weather_settings.auto_refresh;
        self.refresh
            .configure(wanted.then(|| self.weather_settings.interval()));
    }

    /// One render pass of the active page.
    pub async fn render(&mut self) -> RenderedPage {
        match self.active {
            ActivePage::Pie => {
                let stem = format!("session-{}-pie", self.id);
                match self.pie.render(&self.pie_settings, &stem).await {
                    Ok(view) => RenderedPage::Pie(view),
                    Err(e) => RenderedPage::Halted {
                        header: pie_header(),
                        notice: Notice::error(e.to_string()),
                    },
                }
            }
            ActivePage::Weather => {
                let stem = format!("session-{}-weather", self.id);
                let view = self
                    .weather
                    .render(&mut self.history, &self.weather_settings, &stem)
                    .await;
                RenderedPage::Weather(view)
            }
        }
    }

    /// Renders once, then handles queued events until [`DashboardEvent::Close`].
    pub async fn run<F>(mut self, mut on_render: F)
    where
        F: FnMut(&RenderedPage),
    {
        let first = self.render().await;
        on_render(&first);

        while let Some(event) = self.events.recv().await {
            match self.dispatch(event).await {
                Dispatch::Rendered(page) => on_render(page.as_ref()),
                Dispatch::Ignored => {}
                Dispatch::Closed => break,
            }
        }
    }
}
