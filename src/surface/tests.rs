//! End-to-end tests for a surface session

use super::*;
use crate::error::{SurfaceError, TransportError};
use crate::transport::Transport;
use parking_lot::Mutex;
use proptest::prelude::*;

/// Transport that records every frame, or refuses them all
#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<Vec<u8>>>,
    offline: bool,
}

impl RecordingTransport {
    fn offline() -> Self {
        Self { offline: true, ..Self::default() }
    }

    fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().clone()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, bytes: &[u8]) -> Result<(), TransportError> {
        if self.offline {
            return Err(TransportError::NotConnected);
        }
        self.sent.lock().push(bytes.to_vec());
        Ok(())
    }
}

type TestSession = Session<RecordingTransport, Vec<SurfaceEvent>>;

fn make_session() -> TestSession {
    Session::new(DeviceIdentity::default(), RecordingTransport::default(), Vec::new())
}

fn sysex(command: u8, payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![0xF0, 0x00, 0x00, 0x66, 0x14, command];
    frame.extend_from_slice(payload);
    frame.push(0xF7);
    frame
}

fn online_session() -> TestSession {
    let mut session = make_session();
    session.handle_frame(&sysex(0x00, &[])).unwrap();
    session.handle_frame(&sysex(0x02, b"abcd")).unwrap();
    session.transport().sent.lock().clear();
    session.sink_mut().clear();
    session
}

#[test]
fn test_handshake() {
    let mut session = make_session();
    assert_eq!(session.state().phase(), ConnectionPhase::AwaitingHandshake);

    session.handle_frame(&sysex(0x00, &[])).unwrap();

    let sent = session.transport().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0], sysex(0x01, b"MCS0001a1b2"));
    assert!(session.sink().is_empty());
    assert!(!session.state().is_online());

    session.handle_frame(&sysex(0x02, b"wxyz")).unwrap();

    let sent = session.transport().sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1], sysex(0x03, b"MCS0001"));
    assert_eq!(*session.sink(), vec![SurfaceEvent::Online]);
    assert!(session.state().is_online());
}

#[test]
fn test_version_request_and_go_offline() {
    let mut session = online_session();

    session.handle_frame(&sysex(0x13, &[])).unwrap();
    assert_eq!(session.transport().sent(), vec![sysex(0x14, b"1.0.0")]);

    session.handle_frame(&sysex(0x0F, &[])).unwrap();
    assert_eq!(session.state().phase(), ConnectionPhase::Offline);
    assert_eq!(*session.sink(), vec![SurfaceEvent::Offline]);

    // A fresh device query restarts the handshake
    session.handle_frame(&sysex(0x00, &[])).unwrap();
    assert_eq!(session.state().phase(), ConnectionPhase::AwaitingHandshake);
}

#[test]
fn test_all_leds_off() {
    let mut session = online_session();
    session.handle_frame(&[0x90, ButtonId::Record as u8, 0x7F]).unwrap();
    session.handle_frame(&[0x90, ButtonId::Play as u8, 0x01]).unwrap();
    session.sink_mut().clear();

    session.handle_frame(&sysex(0x62, &[])).unwrap();

    let events = session.sink();
    assert_eq!(events.len(), 128);
    for (index, event) in events.iter().enumerate() {
        assert_eq!(*event, SurfaceEvent::Led { index: index as u8, velocity: 0 });
    }
    assert_eq!(session.state().led(ButtonId::Record), Some(0));
    assert_eq!(session.state().led(ButtonId::Play), Some(0));
    assert!(session.transport().sent().is_empty());
}

#[test]
fn test_lcd_writes() {
    let mut session = online_session();

    session.handle_frame(&sysex(0x12, &[0x00, b'H', b'e', b'l', b'l', b'o'])).unwrap();
    session.handle_frame(&sysex(0x12, &[54, b'A', b'B', b'C', b'D'])).unwrap();

    let (top, bottom) = session.state().lcd();
    assert_eq!(top.len(), 56);
    assert!(top.starts_with("Hello "));
    assert!(top.ends_with("AB"));
    assert!(bottom.starts_with("CD "));

    match session.sink().last() {
        Some(SurfaceEvent::Lcd { top: t, bottom: b }) => {
            assert_eq!(*t, top);
            assert_eq!(*b, bottom);
        }
        other => panic!("expected LCD event, got {:?}", other),
    }
}

#[test]
fn test_lcd_last_cell_and_overflow() {
    let mut session = online_session();

    session.handle_frame(&sysex(0x12, &[111, b'Z', b'!', b'!'])).unwrap();
    assert_eq!(session.state().lcd_cells()[111], b'Z');
    assert_eq!(session.sink().len(), 1);

    session.handle_frame(&sysex(0x12, &[112, b'X'])).unwrap();
    assert_eq!(session.sink().len(), 1);
    assert!(!session.state().lcd_cells().contains(&b'X'));
}

#[test]
fn test_lcd_write_with_interleaved_clock() {
    let mut session = online_session();

    let mut frame = sysex(0x12, &[0x00, b'a', b'b']);
    frame.insert(8, 0xF8);
    session.handle_frame(&frame).unwrap();

    assert_eq!(&session.state().lcd_cells()[..3], b"ab ");
    assert_eq!(session.sink().len(), 1);
}

#[test]
fn test_time_display_right_to_left() {
    let mut session = online_session();

    // "12" in segment encoding: digits are 0x30-0x39
    session.handle_frame(&sysex(0x10, &[0x32, 0x31])).unwrap();

    let time = session.state().time();
    assert_eq!(time[9], DisplayCell { ch: '2', dot: false });
    assert_eq!(time[8], DisplayCell { ch: '1', dot: false });
    assert_eq!(time[0], DisplayCell::BLANK);
    assert_eq!(session.sink().len(), 1);
}

#[test]
fn test_reset_keeps_phase() {
    let mut session = online_session();
    session.handle_frame(&[0xE3, 0x10, 0x20]).unwrap();
    session.handle_frame(&[0xD0, 0x25]).unwrap();

    session.handle_frame(&sysex(0x63, &[])).unwrap();

    assert_eq!(session.state().fader(3), Some(0));
    assert_eq!(session.state().meter(2), Some(0));
    assert!(session.state().is_online());
    assert_eq!(session.sink().last(), Some(&SurfaceEvent::Reset));
}

#[test]
fn test_press_release_tap() {
    let mut session = online_session();

    session.press(ButtonId::Stop).unwrap();
    assert_eq!(session.state().button(ButtonId::Stop), Some(true));

    session.release(ButtonId::Stop).unwrap();
    assert_eq!(session.state().button(ButtonId::Stop), Some(false));

    session.tap(ButtonId::Play).unwrap();
    assert_eq!(session.state().button(ButtonId::Play), Some(false));

    let stop = ButtonId::Stop as u8;
    let play = ButtonId::Play as u8;
    assert_eq!(
        session.transport().sent(),
        vec![
            vec![0x90, stop, 0x7F],
            vec![0x90, stop, 0x00],
            vec![0x90, play, 0x7F],
            vec![0x90, play, 0x00],
        ]
    );
}

#[test]
fn test_switch_toggles() {
    let mut session = online_session();
    let id = ButtonId::Solo3;

    session.switch(id).unwrap();
    assert_eq!(session.state().button(id), Some(true));
    session.switch(id).unwrap();
    assert_eq!(session.state().button(id), Some(false));

    let sent = session.transport().sent();
    assert_eq!(sent[0][2], 0x7F);
    assert_eq!(sent[1][2], 0x00);
}

#[test]
fn test_rejected_argument_sends_nothing() {
    let mut session = online_session();

    let err = session.press(200u8).unwrap_err();
    assert!(matches!(err, SurfaceError::InvalidArgument { value: 200, max: 127, .. }));

    assert!(session.fader(9, 100).is_err());
    assert!(session.vpot_rotate(8, 1).is_err());
    assert!(session.touch_fader(9, true).is_err());
    assert!(session.transport().sent().is_empty());
}

#[test]
fn test_transport_error_leaves_state_untouched() {
    let events: Vec<SurfaceEvent> = Vec::new();
    let mut session = Session::new(DeviceIdentity::default(), RecordingTransport::offline(), events);

    let err = session.press(ButtonId::Record).unwrap_err();
    assert!(matches!(err, SurfaceError::Transport(TransportError::NotConnected)));
    assert_eq!(session.state().button(ButtonId::Record), Some(false));

    assert!(session.external_controller(90).is_err());
    assert_eq!(session.state().external_controller(), 0);

    // The decoder still applied the query even though the reply failed
    assert!(session.handle_frame(&sysex(0x00, &[])).is_err());
    assert_eq!(session.state().phase(), ConnectionPhase::AwaitingHandshake);
}

#[test]
fn test_unsent_confirm_keeps_surface_offline() {
    let events: Vec<SurfaceEvent> = Vec::new();
    let mut session = Session::new(DeviceIdentity::default(), RecordingTransport::offline(), events);

    assert!(session.handle_frame(&sysex(0x02, b"abcd")).is_err());

    assert_eq!(session.state().phase(), ConnectionPhase::AwaitingHandshake);
    assert!(!session.state().is_online());
}

#[test]
fn test_touch_fader_tracks_button_state() {
    let mut session = online_session();

    session.touch_fader(0, true).unwrap();
    assert_eq!(session.state().button(ButtonId::FaderTouch1), Some(true));

    session.switch(ButtonId::FaderTouch1).unwrap();
    assert_eq!(session.state().button(ButtonId::FaderTouch1), Some(false));

    session.touch_fader(8, true).unwrap();
    assert_eq!(session.state().button(ButtonId::FaderTouchMaster), Some(true));

    assert_eq!(
        session.transport().sent(),
        vec![vec![0x90, 104, 0x7F], vec![0x90, 104, 0x00], vec![0x90, 112, 0x7F]]
    );
}

#[test]
fn test_external_controller_recorded() {
    let mut session = online_session();

    session.external_controller(500).unwrap();

    assert_eq!(session.state().external_controller(), 127);
    assert_eq!(session.transport().sent(), vec![vec![0xB0, 0x2E, 0x7F]]);
}

#[test]
fn test_close_returns_transport() {
    let mut session = online_session();
    session.jog_wheel(-3).unwrap();
    session.touch_fader(8, true).unwrap();

    let transport = session.close();
    assert_eq!(transport.sent(), vec![vec![0xB0, 0x3C, 0x43], vec![0x90, 112, 0x7F]]);
}

#[test]
fn test_fanout_sink_in_session() {
    use std::sync::{Arc, Mutex as StdMutex};

    let kinds = Arc::new(StdMutex::new(Vec::new()));
    let mut fanout = EventFanout::new();
    let seen = Arc::clone(&kinds);
    fanout.subscribe(move |e: &SurfaceEvent| seen.lock().unwrap().push(e.kind()));
    fanout.subscribe(NullSink);

    let mut session =
        Session::new(DeviceIdentity::default(), RecordingTransport::default(), fanout);
    session.handle_frame(&sysex(0x00, &[])).unwrap();
    session.handle_frame(&sysex(0x02, b"abcd")).unwrap();
    session.handle_frame(&[0xB0, 0x30, 0x51]).unwrap();

    assert_eq!(*kinds.lock().unwrap(), vec!["online", "vpot"]);
}

proptest! {
    #[test]
    fn prop_fader_round_trip(channel in 0u8..9, value in 0i32..=20000) {
        let frame = encoder::fader(channel, value).unwrap();

        let mut decoder = Decoder::new(DeviceIdentity::default());
        let mut events: Vec<SurfaceEvent> = Vec::new();
        let reply = decoder.dispatch(&frame, &mut events);

        prop_assert!(reply.is_none());
        prop_assert_eq!(decoder.state().fader(channel), Some(value.min(16383) as u16));
    }

    #[test]
    fn prop_arbitrary_frames_never_reply_outside_handshake(
        frame in proptest::collection::vec(0u8..0xF0, 1..16)
    ) {
        // Without a sysex start byte nothing can ask for a reply
        let mut decoder = Decoder::new(DeviceIdentity::default());
        prop_assert!(decoder.dispatch(&frame, &mut NullSink).is_none());
    }
}
