/// Time source and the dashboard's timer lifecycle

use chrono::{DateTime, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use gloo_timers::callback::Interval;
use std::cell::Cell;
use std::rc::Rc;

/// Source of "now" and of the local calendar
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Wall-clock time of `at` in the user's zone
    fn to_local(&self, at: DateTime<Utc>) -> NaiveDateTime;

    /// Interpret a wall-clock time in the user's zone
    fn from_local(&self, local: NaiveDateTime) -> Option<DateTime<Utc>>;

    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        self.to_local(at).date()
    }

    fn today(&self) -> NaiveDate {
        self.local_date(self.now())
    }
}

/// The browser's clock and time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn to_local(&self, at: DateTime<Utc>) -> NaiveDateTime {
        at.with_timezone(&Local).naive_local()
    }

    fn from_local(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        resolve(Local.from_local_datetime(&local))
    }
}

/// A settable clock pinned to a fixed UTC offset
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Cell<DateTime<Utc>>,
    offset: FixedOffset,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        FixedClock {
            now: Cell::new(now),
            offset,
        }
    }

    pub fn utc(now: DateTime<Utc>) -> Self {
        Self::new(now, Utc.fix())
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }

    fn to_local(&self, at: DateTime<Utc>) -> NaiveDateTime {
        at.with_timezone(&self.offset).naive_local()
    }

    fn from_local(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        resolve(self.offset.from_local_datetime(&local))
    }
}

// Ambiguous wall times (DST fall-back) take the earlier instant
fn resolve<Tz: TimeZone>(result: LocalResult<DateTime<Tz>>) -> Option<DateTime<Utc>> {
    result.earliest().map(|dt| dt.with_timezone(&Utc))
}

/// Header text: `HH:mm:ss` and `YYYY/MM/DD`
pub struct DashboardClock<C: Clock> {
    clock: C,
}

impl<C: Clock> DashboardClock<C> {
    pub fn new(clock: C) -> Self {
        DashboardClock { clock }
    }

    pub fn time_text(&self) -> String {
        self.clock
            .to_local(self.clock.now())
            .format("%H:%M:%S")
            .to_string()
    }

    pub fn date_text(&self) -> String {
        self.clock.today().format("%Y/%m/%d").to_string()
    }
}

/// A repeating timer that can be started and stopped
pub trait Ticker {
    fn start(&mut self, period_ms: u32, on_tick: Rc<dyn Fn()>);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

/// `setInterval` backed ticker
#[derive(Default)]
pub struct IntervalTicker {
    interval: Option<Interval>,
}

impl Ticker for IntervalTicker {
    fn start(&mut self, period_ms: u32, on_tick: Rc<dyn Fn()>) {
        self.stop();
        self.interval = Some(Interval::new(period_ms, move || on_tick()));
    }

    fn stop(&mut self) {
        if let Some(interval) = self.interval.take() {
            interval.cancel();
        }
    }

    fn is_running(&self) -> bool {
        self.interval.is_some()
    }
}

/// The clock tick and the date rollover tick, paused while the page is hidden
pub struct ClockLifecycle<T: Ticker> {
    clock_ticker: T,
    date_ticker: T,
    on_clock_tick: Rc<dyn Fn()>,
    on_date_tick: Rc<dyn Fn()>,
    clock_period_ms: u32,
    date_period_ms: u32,
}

impl<T: Ticker> ClockLifecycle<T> {
    pub fn new(
        clock_ticker: T,
        date_ticker: T,
        on_clock_tick: Rc<dyn Fn()>,
        on_date_tick: Rc<dyn Fn()>,
    ) -> Self {
        ClockLifecycle {
            clock_ticker,
            date_ticker,
            on_clock_tick,
            on_date_tick,
            clock_period_ms: crate::config::CLOCK_TICK_MS,
            date_period_ms: crate::config::DATE_TICK_MS,
        }
    }

    /// Refresh immediately, then start both tickers
    pub fn resume(&mut self) {
        if self.is_running() {
            return;
        }
        (self.on_clock_tick)();
        (self.on_date_tick)();
        self.clock_ticker
            .start(self.clock_period_ms, self.on_clock_tick.clone());
        self.date_ticker
            .start(self.date_period_ms, self.on_date_tick.clone());
        log::debug!("Clock timers started");
    }

    pub fn suspend(&mut self) {
        if !self.is_running() {
            return;
        }
        self.clock_ticker.stop();
        self.date_ticker.stop();
        log::debug!("Clock timers stopped");
    }

    /// Map a `visibilitychange` onto suspend/resume
    pub fn set_hidden(&mut self, hidden: bool) {
        if hidden {
            self.suspend();
        } else {
            self.resume();
        }
    }

    pub fn is_running(&self) -> bool {
        self.clock_ticker.is_running() || self.date_ticker.is_running()
    }
}

impl<T: Ticker> Drop for ClockLifecycle<T> {
    fn drop(&mut self) {
        self.clock_ticker.stop();
        self.date_ticker.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeTicker {
        period_ms: Option<u32>,
        on_tick: Option<Rc<dyn Fn()>>,
        starts: Rc<Cell<u32>>,
    }

    impl FakeTicker {
        fn fire(&self) {
            if let Some(on_tick) = &self.on_tick {
                on_tick();
            }
        }
    }

    impl Ticker for FakeTicker {
        fn start(&mut self, period_ms: u32, on_tick: Rc<dyn Fn()>) {
            self.period_ms = Some(period_ms);
            self.on_tick = Some(on_tick);
            self.starts.set(self.starts.get() + 1);
        }

        fn stop(&mut self) {
            self.period_ms = None;
            self.on_tick = None;
        }

        fn is_running(&self) -> bool {
            self.period_ms.is_some()
        }
    }

    fn counting_lifecycle() -> (ClockLifecycle<FakeTicker>, Rc<RefCell<Vec<&'static str>>>) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let clock_events = events.clone();
        let date_events = events.clone();
        let lifecycle = ClockLifecycle::new(
            FakeTicker::default(),
            FakeTicker::default(),
            Rc::new(move || clock_events.borrow_mut().push("clock")),
            Rc::new(move || date_events.borrow_mut().push("date")),
        );
        (lifecycle, events)
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_fixed_clock_local_date_uses_offset() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let clock = FixedClock::new(at(2024, 5, 1, 20, 0, 0), tokyo);

        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
    }

    #[test]
    fn test_fixed_clock_from_local_round_trips() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let clock = FixedClock::new(at(2024, 1, 1, 0, 0, 0), offset);
        let instant = at(2024, 7, 4, 18, 15, 0);

        let local = clock.to_local(instant);

        assert_eq!(local.format("%H:%M").to_string(), "13:15");
        assert_eq!(clock.from_local(local), Some(instant));
    }

    #[test]
    fn test_fixed_clock_advance() {
        let clock = FixedClock::utc(at(2024, 1, 1, 23, 59, 59));
        clock.advance(chrono::Duration::seconds(1));

        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn test_dashboard_clock_text() {
        let offset = FixedOffset::east_opt(8 * 3600).unwrap();
        let dashboard = DashboardClock::new(FixedClock::new(at(2024, 12, 31, 16, 5, 9), offset));

        assert_eq!(dashboard.time_text(), "00:05:09");
        assert_eq!(dashboard.date_text(), "2025/01/01");
    }

    #[test]
    fn test_resume_refreshes_and_starts_both_tickers() {
        let (mut lifecycle, events) = counting_lifecycle();

        lifecycle.resume();

        assert!(lifecycle.is_running());
        assert_eq!(*events.borrow(), vec!["clock", "date"]);
        assert_eq!(lifecycle.clock_ticker.period_ms, Some(1_000));
        assert_eq!(lifecycle.date_ticker.period_ms, Some(3_600_000));
    }

    #[test]
    fn test_ticks_reach_callbacks() {
        let (mut lifecycle, events) = counting_lifecycle();
        lifecycle.resume();
        events.borrow_mut().clear();

        lifecycle.clock_ticker.fire();
        lifecycle.clock_ticker.fire();
        lifecycle.date_ticker.fire();

        assert_eq!(*events.borrow(), vec!["clock", "clock", "date"]);
    }

    #[test]
    fn test_hidden_page_stops_tickers() {
        let (mut lifecycle, _) = counting_lifecycle();
        lifecycle.resume();

        lifecycle.set_hidden(true);

        assert!(!lifecycle.is_running());
        assert!(!lifecycle.clock_ticker.is_running());
        assert!(!lifecycle.date_ticker.is_running());
    }

    #[test]
    fn test_visible_again_restarts_once() {
        let (mut lifecycle, events) = counting_lifecycle();
        let starts = lifecycle.clock_ticker.starts.clone();

        lifecycle.set_hidden(false);
        lifecycle.set_hidden(false);
        lifecycle.set_hidden(true);
        lifecycle.set_hidden(false);

        assert_eq!(starts.get(), 2);
        assert_eq!(events.borrow().len(), 4);
        assert!(lifecycle.is_running());
    }
}
