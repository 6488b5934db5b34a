//! Terminal input and the frame clock.
//!
//! Input is read on a blocking task and forwarded over a channel.  Frames
//! come from a separate interval so animation keeps its cadence no matter
//! how busy the input side is.

use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent};
use tokio::sync::mpsc;
use tokio::time::{interval, Interval, MissedTickBehavior};

/// ~60 fps, the cadence a browser would give animation frame callbacks.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// How long one input poll waits before checking whether the receiver is
/// still alive.
const POLL_TIMEOUT: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
}

/// Spawn the input reader.  It stops once the receiver is dropped.
pub fn spawn_event_reader() -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::task::spawn_blocking(move || loop {
        if tx.is_closed() {
            break;
        }
        match event::poll(POLL_TIMEOUT) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(err) => {
                tracing::warn!(%err, "terminal poll failed");
                break;
            }
        }
        let app_event = match event::read() {
            Ok(CtEvent::Key(k)) => AppEvent::Key(k),
            Ok(CtEvent::Mouse(m)) => AppEvent::Mouse(m),
            Ok(CtEvent::Resize(w, h)) => AppEvent::Resize(w, h),
            Ok(_) => continue,
            Err(err) => {
                tracing::warn!(%err, "terminal read failed");
                break;
            }
        };
        if tx.send(app_event).is_err() {
            break;
        }
    });

    rx
}

/// Frame clock.  Late frames are skipped, not replayed in a burst.
pub fn frame_clock() -> Interval {
    let mut clock = interval(FRAME_INTERVAL);
    clock.set_missed_tick_behavior(MissedTickBehavior::Skip);
    clock
}
