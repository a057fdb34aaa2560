//! Surface events and the sink they are reported through
//!
//! Events are emitted synchronously, in dispatch order, while the frame that
//! caused them is being decoded. A sink must return quickly: long-running work
//! belongs on a separate task fed by the sink.

use super::segment::DisplayCell;
use super::state::{VPotMode, MODE_CELLS, TIME_CELLS};

/// State change reported by the decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// LED velocity changed (also sent for repeated values)
    Led { index: u8, velocity: u8 },
    /// V-Pot LED ring update
    VPot { index: u8, mode: VPotMode, ring: u8, center: bool },
    /// Time code display snapshot
    Time([DisplayCell; TIME_CELLS]),
    /// Assignment display snapshot
    Mode([DisplayCell; MODE_CELLS]),
    /// Meter level (0-15)
    Meter { index: u8, level: u8 },
    /// Fader moved to a new position
    Fader { channel: u8, value: u16 },
    /// LCD contents after a write, as (upper row, lower row)
    Lcd { top: String, bottom: String },
    /// Handshake completed
    Online,
    /// Host sent "go offline"
    Offline,
    /// Host reset the surface
    Reset,
}

impl SurfaceEvent {
    /// Short name, used for logging
    pub fn kind(&self) -> &'static str {
        match self {
            SurfaceEvent::Led { .. } => "led",
            SurfaceEvent::VPot { .. } => "vpot",
            SurfaceEvent::Time(_) => "time",
            SurfaceEvent::Mode(_) => "mode",
            SurfaceEvent::Meter { .. } => "meter",
            SurfaceEvent::Fader { .. } => "fader",
            SurfaceEvent::Lcd { .. } => "lcd",
            SurfaceEvent::Online => "online",
            SurfaceEvent::Offline => "offline",
            SurfaceEvent::Reset => "reset",
        }
    }
}

/// Receiver of surface events
pub trait EventSink {
    fn notify(&mut self, event: &SurfaceEvent);
}

impl<F> EventSink for F
where
    F: FnMut(&SurfaceEvent),
{
    fn notify(&mut self, event: &SurfaceEvent) {
        self(event)
    }
}

/// Records every event, mostly useful in tests
impl EventSink for Vec<SurfaceEvent> {
    fn notify(&mut self, event: &SurfaceEvent) {
        self.push(event.clone());
    }
}

/// Discards events
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn notify(&mut self, _event: &SurfaceEvent) {}
}

/// Ordered list of sinks; each event reaches every sink in registration order
#[derive(Default)]
pub struct EventFanout {
    sinks: Vec<Box<dyn EventSink + Send>>,
}

impl EventFanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, sink: impl EventSink + Send + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventSink for EventFanout {
    fn notify(&mut self, event: &SurfaceEvent) {
        for sink in &mut self.sinks {
            sink.notify(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_closure_sink() {
        let mut count = 0;
        {
            let mut sink = |_: &SurfaceEvent| count += 1;
            sink.notify(&SurfaceEvent::Online);
            sink.notify(&SurfaceEvent::Offline);
        }
        assert_eq!(count, 2);
    }

    #[test]
    fn test_fanout_preserves_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut fanout = EventFanout::new();

        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            fanout.subscribe(move |e: &SurfaceEvent| {
                seen.lock().unwrap().push(format!("{}:{}", tag, e.kind()));
            });
        }

        fanout.notify(&SurfaceEvent::Reset);

        assert_eq!(fanout.len(), 2);
        assert_eq!(*seen.lock().unwrap(), vec!["first:reset", "second:reset"]);
    }
}
