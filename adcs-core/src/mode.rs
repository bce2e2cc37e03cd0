//! Operating modes and the command-driven transition between them.

use crate::hal::Flywheel;
use crate::system::AdcsShared;

/// Command opcodes as they appear on the wire.
pub mod opcode {
    pub const STANDBY: u16 = 0xC0;
    pub const HEARTBEAT: u16 = 0xA0;
    pub const TEST_BASIC_MOTION: u16 = 0xA1;
    pub const TEST_BASIC_AD: u16 = 0xA2;
    pub const TEST_BASIC_AC: u16 = 0xA3;
    pub const TEST_SIMPLE_DETUMBLE: u16 = 0xA4;
    pub const TEST_SIMPLE_ORIENT: u16 = 0xA5;
    pub const TEST_PHOTODIODES: u16 = 0xA6;
    pub const TEST_BLDC: u16 = 0xA7;
    pub const TEST_MTX: u16 = 0xA8;
    pub const ORIENT_DEFAULT: u16 = 0xB0;
    pub const ORIENT_X_POS: u16 = 0xB1;
    pub const ORIENT_Y_POS: u16 = 0xB2;
    pub const ORIENT_X_NEG: u16 = 0xB3;
    pub const ORIENT_Y_NEG: u16 = 0xB4;
    /// Known to the TES but never entered as a mode.
    pub const DESATURATE: u16 = 0xD0;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Standby,
    Heartbeat,
    TestBasicMotion,
    /// Attitude determination, not implemented yet.
    TestBasicAd,
    /// Attitude control, not implemented yet.
    TestBasicAc,
    TestSimpleDetumble,
    TestSimpleOrient,
    TestPhotodiodes,
    TestBldc,
    TestMtx,
    OrientDefault,
    OrientXPos,
    OrientYPos,
    OrientXNeg,
    OrientYNeg,
}

impl Mode {
    pub const fn opcode(self) -> u16 {
        match self {
            Mode::Standby => opcode::STANDBY,
            Mode::Heartbeat => opcode::HEARTBEAT,
            Mode::TestBasicMotion => opcode::TEST_BASIC_MOTION,
            Mode::TestBasicAd => opcode::TEST_BASIC_AD,
            Mode::TestBasicAc => opcode::TEST_BASIC_AC,
            Mode::TestSimpleDetumble => opcode::TEST_SIMPLE_DETUMBLE,
            Mode::TestSimpleOrient => opcode::TEST_SIMPLE_ORIENT,
            Mode::TestPhotodiodes => opcode::TEST_PHOTODIODES,
            Mode::TestBldc => opcode::TEST_BLDC,
            Mode::TestMtx => opcode::TEST_MTX,
            Mode::OrientDefault => opcode::ORIENT_DEFAULT,
            Mode::OrientXPos => opcode::ORIENT_X_POS,
            Mode::OrientYPos => opcode::ORIENT_Y_POS,
            Mode::OrientXNeg => opcode::ORIENT_X_NEG,
            Mode::OrientYNeg => opcode::ORIENT_Y_NEG,
        }
    }

    /// The mode a command opcode selects. DESATURATE and anything unknown
    /// yield `None`.
    pub const fn from_opcode(op: u16) -> Option<Mode> {
        Some(match op {
            opcode::STANDBY => Mode::Standby,
            opcode::HEARTBEAT => Mode::Heartbeat,
            opcode::TEST_BASIC_MOTION => Mode::TestBasicMotion,
            opcode::TEST_BASIC_AD => Mode::TestBasicAd,
            opcode::TEST_BASIC_AC => Mode::TestBasicAc,
            opcode::TEST_SIMPLE_DETUMBLE => Mode::TestSimpleDetumble,
            opcode::TEST_SIMPLE_ORIENT => Mode::TestSimpleOrient,
            opcode::TEST_PHOTODIODES => Mode::TestPhotodiodes,
            opcode::TEST_BLDC => Mode::TestBldc,
            opcode::TEST_MTX => Mode::TestMtx,
            opcode::ORIENT_DEFAULT => Mode::OrientDefault,
            opcode::ORIENT_X_POS => Mode::OrientXPos,
            opcode::ORIENT_Y_POS => Mode::OrientYPos,
            opcode::ORIENT_X_NEG => Mode::OrientXNeg,
            opcode::ORIENT_Y_NEG => Mode::OrientYNeg,
            _ => return None,
        })
    }

    /// Heartbeat telemetry is suppressed while idle and while the
    /// photodiode test owns the console.
    pub const fn emits_heartbeat(self) -> bool {
        !matches!(self, Mode::Standby | Mode::TestPhotodiodes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    /// Already in the requested mode; nothing was touched.
    Unchanged(Mode),
    Entered { from: Mode, to: Mode },
    /// Opcode does not name an enterable mode; the mode was left alone.
    Rejected { opcode: u16, current: Mode },
}

/// The only writer of the shared mode cell.
///
/// Every accepted or rejected request that differs from the current mode
/// stops the flywheel before the new mode becomes visible.
pub struct ModeSwitch<'a, F: Flywheel> {
    shared: &'a AdcsShared,
    flywheel: F,
}

impl<'a, F: Flywheel> ModeSwitch<'a, F> {
    pub fn new(shared: &'a AdcsShared, flywheel: F) -> Self {
        Self { shared, flywheel }
    }

    pub fn current(&self) -> Mode {
        self.shared.mode()
    }

    pub fn transition(&mut self, op: u16) -> Transition {
        let flywheel = &mut self.flywheel;
        let outcome = self.shared.mode_cell().update_with(|current| {
            if current.opcode() == op {
                return (None, Transition::Unchanged(current));
            }
            flywheel.stop();
            match Mode::from_opcode(op) {
                Some(next) => (Some(next), Transition::Entered { from: current, to: next }),
                None => (None, Transition::Rejected { opcode: op, current }),
            }
        });

        match outcome {
            Transition::Entered { from, to } => info!("mode {:?} -> {:?}", from, to),
            Transition::Rejected { opcode, current } => {
                warn!("rejected opcode {:#x} in {:?}", opcode, current)
            }
            Transition::Unchanged(_) => {}
        }
        outcome
    }

    pub fn transition_to(&mut self, mode: Mode) -> Transition {
        self.transition(mode.opcode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeFlywheel;

    #[test]
    fn opcodes_round_trip() {
        for op in 0..=0xFFu16 {
            if let Some(mode) = Mode::from_opcode(op) {
                assert_eq!(mode.opcode(), op);
            }
        }
        assert_eq!(Mode::from_opcode(opcode::DESATURATE), None);
    }

    #[test]
    fn starts_in_standby() {
        let shared = AdcsShared::new();
        assert_eq!(shared.mode(), Mode::Standby);
    }

    #[test]
    fn repeated_transition_stops_once() {
        let shared = AdcsShared::new();
        let fw = FakeFlywheel::new();
        let mut switch = ModeSwitch::new(&shared, &fw);

        assert_eq!(
            switch.transition(opcode::HEARTBEAT),
            Transition::Entered {
                from: Mode::Standby,
                to: Mode::Heartbeat
            }
        );
        assert_eq!(switch.transition(opcode::HEARTBEAT), Transition::Unchanged(Mode::Heartbeat));
        assert_eq!(shared.mode(), Mode::Heartbeat);
        assert_eq!(fw.stops(), 1);
    }

    #[test]
    fn unknown_opcode_leaves_mode() {
        let shared = AdcsShared::new();
        let fw = FakeFlywheel::new();
        let mut switch = ModeSwitch::new(&shared, &fw);

        switch.transition(opcode::TEST_SIMPLE_ORIENT);
        switch.transition(opcode::TEST_SIMPLE_ORIENT);
        let seq_before = shared.mode_cell().read_with_seq().1;
        assert_eq!(
            switch.transition(0xFF),
            Transition::Rejected {
                opcode: 0xFF,
                current: Mode::TestSimpleOrient
            }
        );
        assert_eq!(shared.mode(), Mode::TestSimpleOrient);
        assert_eq!(shared.mode_cell().read_with_seq().1, seq_before);
    }

    #[test]
    fn desaturate_is_rejected() {
        let shared = AdcsShared::new();
        let fw = FakeFlywheel::new();
        let mut switch = ModeSwitch::new(&shared, &fw);
        assert!(matches!(
            switch.transition(opcode::DESATURATE),
            Transition::Rejected { .. }
        ));
        assert_eq!(shared.mode(), Mode::Standby);
    }

    #[test]
    fn flywheel_is_stopped_before_mode_is_visible() {
        static SHARED: AdcsShared = AdcsShared::new();
        let fw = FakeFlywheel::new();
        fw.watch_mode(&SHARED);
        let mut switch = ModeSwitch::new(&SHARED, &fw);
        switch.transition(opcode::TEST_BASIC_MOTION);
        assert_eq!(fw.mode_seen_at_stop(), Some(Mode::Standby));
        assert_eq!(SHARED.mode(), Mode::TestBasicMotion);
    }

    #[test]
    fn heartbeat_gating() {
        assert!(!Mode::Standby.emits_heartbeat());
        assert!(!Mode::TestPhotodiodes.emits_heartbeat());
        assert!(Mode::Heartbeat.emits_heartbeat());
        assert!(Mode::TestBldc.emits_heartbeat());
    }
}
