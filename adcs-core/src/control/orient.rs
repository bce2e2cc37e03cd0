use crate::state::{MotorDirection, PdChannel, PhotodiodeReadings};

/// Brightest of the four lateral faces.
///
/// Faces are scanned X+, X-, Y+, Y- and a reading equal to the running
/// maximum replaces it, so among equal readings the last one scanned wins.
pub fn brightest_lateral(readings: &PhotodiodeReadings) -> PdChannel {
    let mut best = PdChannel::XPos;
    let mut max = f32::NEG_INFINITY;
    for channel in PdChannel::LATERAL {
        let value = readings.get(channel);
        if value >= max {
            max = value;
            best = channel;
        }
    }
    best
}

/// Spin direction that brings `channel` toward X+.
pub fn direction_for(channel: PdChannel) -> MotorDirection {
    match channel {
        PdChannel::XPos => MotorDirection::Idle,
        PdChannel::XNeg | PdChannel::YNeg => MotorDirection::Forward,
        PdChannel::YPos => MotorDirection::Reverse,
        PdChannel::ZPos | PdChannel::ZNeg => MotorDirection::Idle,
    }
}

pub fn decide_direction(readings: &PhotodiodeReadings) -> MotorDirection {
    direction_for(brightest_lateral(readings))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lateral(xp: f32, xn: f32, yp: f32, yn: f32) -> PhotodiodeReadings {
        PhotodiodeReadings::new([xp, xn, yp, yn, 0.0, 0.0])
    }

    #[test]
    fn tie_goes_to_last_scanned() {
        let r = lateral(2.0, 2.0, 1.0, 1.0);
        for _ in 0..10 {
            assert_eq!(brightest_lateral(&r), PdChannel::XNeg);
            assert_eq!(decide_direction(&r), MotorDirection::Forward);
        }
    }

    #[test]
    fn lookup_table() {
        assert_eq!(decide_direction(&lateral(9.0, 1.0, 1.0, 1.0)), MotorDirection::Idle);
        assert_eq!(decide_direction(&lateral(1.0, 9.0, 1.0, 1.0)), MotorDirection::Forward);
        assert_eq!(decide_direction(&lateral(1.0, 1.0, 9.0, 1.0)), MotorDirection::Reverse);
        assert_eq!(decide_direction(&lateral(1.0, 1.0, 1.0, 9.0)), MotorDirection::Forward);
    }

    #[test]
    fn z_faces_are_ignored() {
        let r = PhotodiodeReadings::new([1.0, 0.0, 0.0, 0.0, 100.0, 100.0]);
        assert_eq!(brightest_lateral(&r), PdChannel::XPos);
    }

    #[test]
    fn all_dark_resolves_to_y_neg() {
        assert_eq!(brightest_lateral(&lateral(0.0, 0.0, 0.0, 0.0)), PdChannel::YNeg);
    }
}
