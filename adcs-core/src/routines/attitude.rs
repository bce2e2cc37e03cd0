use crate::mode::Mode;
use crate::system::AdcsShared;

/// Mode-gated slot for the attitude determination and attitude control
/// algorithms. Keeps the polling cadence; does no work yet.
pub struct AttitudePlaceholder<'a> {
    shared: &'a AdcsShared,
    mode: Mode,
    was_active: bool,
}

impl<'a> AttitudePlaceholder<'a> {
    pub fn determination(shared: &'a AdcsShared) -> Self {
        Self::new(shared, Mode::TestBasicAd)
    }

    pub fn control(shared: &'a AdcsShared) -> Self {
        Self::new(shared, Mode::TestBasicAc)
    }

    fn new(shared: &'a AdcsShared, mode: Mode) -> Self {
        Self {
            shared,
            mode,
            was_active: false,
        }
    }

    /// Returns whether the trigger mode is active.
    pub fn cycle(&mut self) -> bool {
        let active = self.shared.mode() == self.mode;
        if active && !self.was_active {
            info!("{:?} has no algorithm yet", self.mode);
        }
        self.was_active = active;
        active
    }
}
