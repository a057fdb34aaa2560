//! Named button ids of the Mackie Control surface
//!
//! Each button is addressed by its note number on channel 1. The same note
//! number addresses the LED behind the button.

use std::fmt;

macro_rules! buttons {
    ($($name:ident = $value:literal => $label:literal,)+) => {
        /// Button (and LED) id, 0-118
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum ButtonId {
            $($name = $value,)+
        }

        impl ButtonId {
            /// All named buttons, in note order
            pub const ALL: &'static [ButtonId] = &[$(ButtonId::$name,)+];

            /// Short label, as printed on the surface
            pub fn label(&self) -> &'static str {
                match self {
                    $(ButtonId::$name => $label,)+
                }
            }
        }

        impl TryFrom<u8> for ButtonId {
            type Error = u8;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok(ButtonId::$name),)+
                    other => Err(other),
                }
            }
        }
    };
}

buttons! {
    Rec1 = 0 => "REC 1",
    Rec2 = 1 => "REC 2",
    Rec3 = 2 => "REC 3",
    Rec4 = 3 => "REC 4",
    Rec5 = 4 => "REC 5",
    Rec6 = 5 => "REC 6",
    Rec7 = 6 => "REC 7",
    Rec8 = 7 => "REC 8",
    Solo1 = 8 => "SOLO 1",
    Solo2 = 9 => "SOLO 2",
    Solo3 = 10 => "SOLO 3",
    Solo4 = 11 => "SOLO 4",
    Solo5 = 12 => "SOLO 5",
    Solo6 = 13 => "SOLO 6",
    Solo7 = 14 => "SOLO 7",
    Solo8 = 15 => "SOLO 8",
    Mute1 = 16 => "MUTE 1",
    Mute2 = 17 => "MUTE 2",
    Mute3 = 18 => "MUTE 3",
    Mute4 = 19 => "MUTE 4",
    Mute5 = 20 => "MUTE 5",
    Mute6 = 21 => "MUTE 6",
    Mute7 = 22 => "MUTE 7",
    Mute8 = 23 => "MUTE 8",
    Select1 = 24 => "SELECT 1",
    Select2 = 25 => "SELECT 2",
    Select3 = 26 => "SELECT 3",
    Select4 = 27 => "SELECT 4",
    Select5 = 28 => "SELECT 5",
    Select6 = 29 => "SELECT 6",
    Select7 = 30 => "SELECT 7",
    Select8 = 31 => "SELECT 8",
    VSelect1 = 32 => "V-SELECT 1",
    VSelect2 = 33 => "V-SELECT 2",
    VSelect3 = 34 => "V-SELECT 3",
    VSelect4 = 35 => "V-SELECT 4",
    VSelect5 = 36 => "V-SELECT 5",
    VSelect6 = 37 => "V-SELECT 6",
    VSelect7 = 38 => "V-SELECT 7",
    VSelect8 = 39 => "V-SELECT 8",
    Track = 40 => "TRACK",
    Send = 41 => "SEND",
    Pan = 42 => "PAN/SURROUND",
    Plugin = 43 => "PLUG-IN",
    Eq = 44 => "EQ",
    Instrument = 45 => "INSTRUMENT",
    BankLeft = 46 => "BANK <",
    BankRight = 47 => "BANK >",
    ChannelLeft = 48 => "CHANNEL <",
    ChannelRight = 49 => "CHANNEL >",
    Flip = 50 => "FLIP",
    GlobalView = 51 => "GLOBAL VIEW",
    Name = 52 => "NAME/VALUE",
    Smpte = 53 => "SMPTE/BEATS",
    F1 = 54 => "F1",
    F2 = 55 => "F2",
    F3 = 56 => "F3",
    F4 = 57 => "F4",
    F5 = 58 => "F5",
    F6 = 59 => "F6",
    F7 = 60 => "F7",
    F8 = 61 => "F8",
    MidiTracks = 62 => "MIDI TRACKS",
    Inputs = 63 => "INPUTS",
    AudioTracks = 64 => "AUDIO TRACKS",
    AudioInstrument = 65 => "AUDIO INST",
    Aux = 66 => "AUX",
    Busses = 67 => "BUSSES",
    Outputs = 68 => "OUTPUTS",
    User = 69 => "USER",
    Shift = 70 => "SHIFT",
    Option = 71 => "OPTION",
    Control = 72 => "CONTROL",
    Cmd = 73 => "CMD/ALT",
    Read = 74 => "READ/OFF",
    Write = 75 => "WRITE",
    Trim = 76 => "TRIM",
    Touch = 77 => "TOUCH",
    Latch = 78 => "LATCH",
    Group = 79 => "GROUP",
    Save = 80 => "SAVE",
    Undo = 81 => "UNDO",
    Cancel = 82 => "CANCEL",
    Enter = 83 => "ENTER",
    Marker = 84 => "MARKER",
    Nudge = 85 => "NUDGE",
    Cycle = 86 => "CYCLE",
    Drop = 87 => "DROP",
    Replace = 88 => "REPLACE",
    Click = 89 => "CLICK",
    Solo = 90 => "SOLO",
    Rewind = 91 => "REWIND",
    FastFwd = 92 => "FAST FWD",
    Stop = 93 => "STOP",
    Play = 94 => "PLAY",
    Record = 95 => "RECORD",
    CursorUp = 96 => "CURSOR UP",
    CursorDown = 97 => "CURSOR DOWN",
    CursorLeft = 98 => "CURSOR LEFT",
    CursorRight = 99 => "CURSOR RIGHT",
    Zoom = 100 => "ZOOM",
    Scrub = 101 => "SCRUB",
    UserSwitchA = 102 => "USER A",
    UserSwitchB = 103 => "USER B",
    FaderTouch1 = 104 => "FADER TOUCH 1",
    FaderTouch2 = 105 => "FADER TOUCH 2",
    FaderTouch3 = 106 => "FADER TOUCH 3",
    FaderTouch4 = 107 => "FADER TOUCH 4",
    FaderTouch5 = 108 => "FADER TOUCH 5",
    FaderTouch6 = 109 => "FADER TOUCH 6",
    FaderTouch7 = 110 => "FADER TOUCH 7",
    FaderTouch8 = 111 => "FADER TOUCH 8",
    FaderTouchMaster = 112 => "FADER TOUCH MASTER",
    SmpteLed = 113 => "SMPTE LED",
    BeatsLed = 114 => "BEATS LED",
    RudeSoloLight = 115 => "RUDE SOLO",
    RelayClick = 118 => "RELAY CLICK",
}

impl From<ButtonId> for u8 {
    fn from(id: ButtonId) -> Self {
        id as u8
    }
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_u8() {
        for &id in ButtonId::ALL {
            assert_eq!(ButtonId::try_from(u8::from(id)), Ok(id));
        }
    }

    #[test]
    fn test_unassigned_notes() {
        assert_eq!(ButtonId::try_from(116), Err(116));
        assert_eq!(ButtonId::try_from(117), Err(117));
        assert_eq!(ButtonId::try_from(119), Err(119));
    }

    #[test]
    fn test_transport_notes() {
        assert_eq!(u8::from(ButtonId::Rewind), 91);
        assert_eq!(u8::from(ButtonId::Play), 94);
        assert_eq!(u8::from(ButtonId::Record), 95);
        assert_eq!(ButtonId::ALL.len(), 117);
    }

    #[test]
    fn test_display_uses_label() {
        assert_eq!(ButtonId::BankLeft.to_string(), "BANK <");
    }
}
