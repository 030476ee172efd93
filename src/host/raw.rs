//! Low-level input collection: non-blocking crossterm draining, per-frame mouse
//! wheel accumulation, and translation into primitive events the terminal
//! poller consumes.

use crate::error::Result;
use ratatui::crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use std::collections::VecDeque;
use std::time::Duration;

/// Upper bound on events drained in one frame so a flood cannot stall the loop.
const MAX_EVENTS_PER_FRAME: usize = 256;

/// Low-level events surfaced by the raw input collector.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInputEvent {
    Key { code: KeyCode, kind: KeyEventKind },
    MouseDown(MouseButton),
    MouseUp(MouseButton),
    /// Net wheel ticks since the last drain, positive is up
    Scroll(i32),
    Resize { width: u16, height: u16 },
    FocusLost,
    /// Ctrl+C, which raw mode no longer turns into a signal
    Interrupt,
}

/// Sums wheel ticks until the frame boundary.
#[derive(Debug, Clone, Default)]
pub struct ScrollAccumulator {
    pending: i32,
}

impl ScrollAccumulator {
    pub fn push(&mut self, ticks: i32) {
        self.pending = self.pending.saturating_add(ticks);
    }

    /// Take the accumulated ticks, if any.
    pub fn flush(&mut self) -> Option<i32> {
        match std::mem::take(&mut self.pending) {
            0 => None,
            ticks => Some(ticks),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending == 0
    }
}

/// Collector that drains crossterm without blocking and applies wheel accumulation.
#[derive(Debug, Default)]
pub struct RawInputCollector {
    scroll: ScrollAccumulator,
    pending_events: VecDeque<RawInputEvent>,
}

impl RawInputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether the collector has no pending events or wheel ticks.
    pub fn is_idle(&self) -> bool {
        self.pending_events.is_empty() && self.scroll.is_empty()
    }

    /// Process a synthetic event (primarily used by unit tests).
    pub fn process_event(&mut self, event: Event) {
        self.enqueue_event(event);
    }

    /// Everything queued so far, with accumulated wheel ticks last.
    pub fn take_frame(&mut self) -> Vec<RawInputEvent> {
        self.flush_pending_scroll();
        self.pending_events.drain(..).collect()
    }

    /// Read every event crossterm already has buffered and return the frame's batch.
    pub fn drain(&mut self) -> Result<Vec<RawInputEvent>> {
        let mut read = 0;
        while read < MAX_EVENTS_PER_FRAME && event::poll(Duration::ZERO)? {
            let event = event::read()?;
            self.enqueue_event(event);
            read += 1;
        }
        Ok(self.take_frame())
    }

    fn enqueue_event(&mut self, event: Event) {
        match event {
            Event::Key(key_event)
                if key_event.code == KeyCode::Char('c')
                    && key_event.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                self.pending_events.push_back(RawInputEvent::Interrupt);
            }
            Event::Key(key_event) => {
                self.pending_events.push_back(RawInputEvent::Key {
                    code: key_event.code,
                    kind: key_event.kind,
                });
            }
            Event::Resize(width, height) => {
                self.pending_events
                    .push_back(RawInputEvent::Resize { width, height });
            }
            Event::Mouse(mouse_event) => self.handle_mouse_event(mouse_event),
            Event::FocusLost => {
                self.flush_pending_scroll();
                self.pending_events.push_back(RawInputEvent::FocusLost);
            }
            _ => {}
        }
    }

    fn handle_mouse_event(&mut self, mouse_event: MouseEvent) {
        match mouse_event.kind {
            MouseEventKind::ScrollUp => self.scroll.push(1),
            MouseEventKind::ScrollDown => self.scroll.push(-1),
            MouseEventKind::Down(button) => {
                self.pending_events
                    .push_back(RawInputEvent::MouseDown(button));
            }
            MouseEventKind::Up(button) => {
                self.pending_events.push_back(RawInputEvent::MouseUp(button));
            }
            _ => {}
        }
    }

    fn flush_pending_scroll(&mut self) {
        if let Some(ticks) = self.scroll.flush() {
            self.pending_events.push_back(RawInputEvent::Scroll(ticks));
        }
    }
}
