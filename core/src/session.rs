use std::sync::mpsc::Receiver;

use log::debug;

use crate::notify::Change;
use crate::store::OutlineStore;
use crate::timer::{Clock, FocusTimer, SystemClock};

/// One editing session: the outline store and the focus timer bound to its
/// active line.
///
/// Every operation that can move the active pointer checks whether the
/// active line's identity changed and, if so, resets the timer so each line
/// starts from the configured duration.
#[derive(Debug)]
pub struct Session<C: Clock = SystemClock> {
    store: OutlineStore,
    timer: FocusTimer,
    clock: C,
    tracked_line: String,
}

impl Default for Session<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl Session<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(OutlineStore::new(), FocusTimer::default(), SystemClock)
    }
}

impl<C: Clock> Session<C> {
    pub fn with_clock(store: OutlineStore, timer: FocusTimer, clock: C) -> Self {
        let tracked_line = store.active_line().id.clone();
        Self {
            store,
            timer,
            clock,
            tracked_line,
        }
    }

    pub fn store(&self) -> &OutlineStore {
        &self.store
    }

    pub fn timer(&self) -> &FocusTimer {
        &self.timer
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn subscribe(&mut self) -> Receiver<Change> {
        self.store.subscribe()
    }

    fn sync_active_line(&mut self) {
        let active = &self.store.active_line().id;
        if *active == self.tracked_line {
            return;
        }
        self.tracked_line = active.clone();
        self.timer.reset();
        debug!("timer: reset for line {}", self.tracked_line);
        self.store.publish(Change::Timer);
    }

    fn pause_if_running(&mut self) {
        if self.timer.is_running() {
            self.timer.pause();
            self.store.publish(Change::Timer);
        }
    }

    // --- Outline operations ---

    pub fn update_content(&mut self, id: &str, raw: &str) {
        self.store.update_content(id, raw);
    }

    pub fn insert_after(&mut self, index: usize) -> usize {
        let index = self.store.insert_after(index);
        self.sync_active_line();
        index
    }

    pub fn delete(&mut self, index: usize) {
        self.store.delete(index);
        self.sync_active_line();
    }

    pub fn set_active(&mut self, index: usize) {
        self.store.set_active(index);
        self.sync_active_line();
    }

    pub fn reindent(&mut self, index: usize, deeper: bool) {
        self.store.reindent(index, deeper);
    }

    /// Enter or leave focus mode. Leaving pauses a running timer.
    pub fn toggle_focus_mode(&mut self) {
        self.store.toggle_focus_mode();
        if !self.store.is_focus_mode() {
            self.pause_if_running();
        }
    }

    /// Complete the active line, which also ends the focus session
    pub fn complete_active(&mut self) {
        self.store.complete_active();
        self.pause_if_running();
    }

    pub fn uncomplete_active(&mut self) {
        self.store.uncomplete_active();
    }

    pub fn add_to_stash(&mut self, text: impl Into<String>) {
        self.store.add_to_stash(text);
    }

    pub fn pop_from_stash(&mut self, index: usize) {
        self.store.pop_from_stash(index);
        self.sync_active_line();
    }

    pub fn accrue_time(&mut self, id: &str, seconds: u64) {
        self.store.accrue_time(id, seconds);
    }

    pub fn toggle_show_time_spent(&mut self) {
        self.store.toggle_show_time_spent();
    }

    pub fn set_show_time_spent(&mut self, show: bool) {
        self.store.set_show_time_spent(show);
    }

    // --- Timer operations ---

    /// Start the timer for the active line. Returns whether it started.
    pub fn start_timer(&mut self) -> bool {
        self.sync_active_line();
        let now = self.clock.now();
        let started = self.timer.start(now, &self.tracked_line);
        if started {
            self.store.publish(Change::Timer);
        }
        started
    }

    pub fn pause_timer(&mut self) {
        self.pause_if_running();
    }

    /// Start when stopped, pause when running
    pub fn toggle_timer(&mut self) {
        if self.timer.is_running() {
            self.pause_timer();
        } else {
            self.start_timer();
        }
    }

    pub fn reset_timer(&mut self) {
        self.timer.reset();
        self.store.publish(Change::Timer);
    }

    pub fn set_timer_duration(&mut self, minutes: u32) {
        self.timer.set_duration(minutes);
        self.store.publish(Change::Timer);
    }

    /// Manually edit the timer. Rejected while it is running.
    pub fn set_timer_remaining(&mut self, minutes: u32, seconds: u32) -> bool {
        let accepted = self.timer.set_remaining(minutes, seconds);
        if accepted {
            self.store.publish(Change::Timer);
        }
        accepted
    }

    /// Advance the timer to the clock's current time and credit the elapsed
    /// seconds to the line the run belongs to.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        if let Some(accrual) = self.timer.tick(now) {
            self.store.accrue_time(&accrual.line_id, accrual.seconds);
            self.store.publish(Change::Timer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Line;
    use crate::timer::{ManualClock, TimerState};
    use std::time::Duration;

    fn session(lines: Vec<Line>, secs: u32) -> (Session<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let mut timer = FocusTimer::default();
        timer.set_remaining(secs / 60, secs % 60);
        let session = Session::with_clock(OutlineStore::from_lines(lines), timer, clock.clone());
        (session, clock)
    }

    fn three_lines() -> Vec<Line> {
        vec![
            Line::new_header("Project".to_string(), 0),
            Line::new("write tests".to_string(), 1),
            Line::new("ship".to_string(), 1),
        ]
    }

    #[test]
    fn test_tick_accrues_to_active_line() {
        let (mut session, clock) = session(three_lines(), 5);
        session.set_active(1);
        assert!(session.start_timer());

        clock.advance(Duration::from_millis(5200));
        session.tick();

        assert_eq!(session.timer().remaining_secs(), 0);
        assert_eq!(session.timer().state(), TimerState::Expired);
        assert_eq!(session.store().lines()[1].time_spent, Some(5));
    }

    #[test]
    fn test_late_tick_credits_full_elapsed_time() {
        let (mut session, clock) = session(three_lines(), 3);
        session.set_active(1);
        session.start_timer();

        clock.advance(Duration::from_millis(10_400));
        session.tick();

        assert_eq!(session.timer().remaining_secs(), 0);
        assert_eq!(session.timer().state(), TimerState::Expired);
        assert_eq!(session.store().lines()[1].time_spent, Some(10));
    }

    #[test]
    fn test_set_duration_while_running_resets() {
        let (mut session, clock) = session(three_lines(), 60);
        session.start_timer();
        clock.advance(Duration::from_secs(4));
        session.tick();

        session.set_timer_duration(10);

        assert_eq!(session.timer().state(), TimerState::Idle);
        assert_eq!(session.timer().remaining_secs(), 600);
        assert_eq!(session.timer().duration_secs(), 600);
        clock.advance(Duration::from_secs(5));
        session.tick();
        assert_eq!(session.store().lines()[0].time_spent, Some(4));
    }

    #[test]
    fn test_switching_lines_resets_timer() {
        let (mut session, clock) = session(three_lines(), 60);
        session.set_active(1);
        session.start_timer();
        clock.advance(Duration::from_secs(10));
        session.tick();

        session.set_active(2);

        assert_eq!(session.timer().state(), TimerState::Idle);
        assert_eq!(session.timer().remaining_secs(), 60);
        clock.advance(Duration::from_secs(10));
        session.tick();
        assert_eq!(session.store().lines()[1].time_spent, Some(10));
        assert_eq!(session.store().lines()[2].time_spent, None);
    }

    #[test]
    fn test_setting_same_line_keeps_timer_running() {
        let (mut session, clock) = session(three_lines(), 60);
        session.start_timer();
        session.set_active(0);
        session.set_active(99);

        clock.advance(Duration::from_secs(3));
        session.tick();

        assert!(session.timer().is_running());
        assert_eq!(session.store().lines()[0].time_spent, Some(3));
    }

    #[test]
    fn test_insert_moves_timer_to_new_line() {
        let (mut session, _clock) = session(three_lines(), 60);
        session.start_timer();

        session.insert_after(0);

        assert_eq!(session.timer().state(), TimerState::Idle);
    }

    #[test]
    fn test_deleting_active_line_resets_timer() {
        let (mut session, clock) = session(three_lines(), 60);
        session.set_active(2);
        session.start_timer();

        session.delete(2);
        clock.advance(Duration::from_secs(5));
        session.tick();

        assert_eq!(session.store().active_index(), 1);
        assert_eq!(session.timer().state(), TimerState::Idle);
        assert_eq!(session.store().lines()[1].time_spent, None);
    }

    #[test]
    fn test_deleting_other_line_keeps_timer() {
        let (mut session, _clock) = session(three_lines(), 60);
        session.set_active(2);
        session.start_timer();

        session.delete(0);

        assert_eq!(session.store().active_index(), 1);
        assert!(session.timer().is_running());
    }

    #[test]
    fn test_complete_ends_focus_and_pauses_timer() {
        let (mut session, _clock) = session(three_lines(), 60);
        session.set_active(1);
        session.toggle_focus_mode();
        session.start_timer();

        session.complete_active();

        assert!(!session.store().is_focus_mode());
        assert!(session.store().lines()[1].completed);
        assert_eq!(session.timer().state(), TimerState::Idle);
    }

    #[test]
    fn test_leaving_focus_pauses_timer() {
        let (mut session, _clock) = session(three_lines(), 60);
        session.toggle_focus_mode();
        session.start_timer();

        session.toggle_focus_mode();

        assert!(!session.timer().is_running());
    }

    #[test]
    fn test_timer_edit_rejected_while_running() {
        let (mut session, _clock) = session(three_lines(), 60);
        session.start_timer();
        assert!(!session.set_timer_remaining(5, 0));
        session.pause_timer();
        assert!(session.set_timer_remaining(5, 0));
        assert_eq!(session.timer().remaining_secs(), 300);
    }

    #[test]
    fn test_toggle_timer() {
        let (mut session, _clock) = session(three_lines(), 60);
        session.toggle_timer();
        assert!(session.timer().is_running());
        session.toggle_timer();
        assert!(!session.timer().is_running());
    }

    #[test]
    fn test_pop_from_stash_resets_timer() {
        let (mut session, _clock) = session(three_lines(), 60);
        session.add_to_stash("idea");
        session.start_timer();

        session.pop_from_stash(0);

        assert_eq!(session.store().active_line().content, "idea");
        assert!(!session.timer().is_running());
    }

    #[test]
    fn test_timer_changes_are_published() {
        let (mut session, clock) = session(three_lines(), 60);
        let rx = session.subscribe();

        session.start_timer();
        clock.advance(Duration::from_secs(1));
        session.tick();

        let changes: Vec<Change> = rx.try_iter().collect();
        assert_eq!(changes, vec![Change::Timer, Change::Lines, Change::Timer]);
    }
}
