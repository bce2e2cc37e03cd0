use crate::cell::DataCell;
use crate::mode::Mode;
use crate::state::ImuData;

/// State shared by every task: the active mode and the latest IMU
/// snapshot.
///
/// The firmware keeps one of these in a `static` and hands `&AdcsShared`
/// to each task. The mode cell is written only through
/// [`ModeSwitch`](crate::mode::ModeSwitch); the IMU cell only by the
/// sampler.
pub struct AdcsShared {
    mode: DataCell<Mode>,
    imu: DataCell<ImuData>,
}

impl AdcsShared {
    pub const fn new() -> Self {
        Self {
            mode: DataCell::new(Mode::Standby),
            imu: DataCell::new(ImuData::ZERO),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode.read()
    }

    pub fn imu(&self) -> ImuData {
        self.imu.read()
    }

    pub fn imu_with_seq(&self) -> (ImuData, u32) {
        self.imu.read_with_seq()
    }

    pub fn publish_imu(&self, data: ImuData) {
        self.imu.update(data);
    }

    /// Mode and IMU snapshot taken under the IMU guard, so the pair is
    /// consistent with a single sampler publish.
    pub fn snapshot(&self) -> (Mode, ImuData) {
        self.imu.with_locked(|imu| (self.mode.read(), imu))
    }

    /// [`snapshot`](Self::snapshot) plus the IMU publish count, for loops
    /// that act once per sample.
    pub fn snapshot_with_seq(&self) -> (Mode, ImuData, u32) {
        self.imu.with_locked_seq(|imu, seq| (self.mode.read(), imu, seq))
    }

    /// Run `f` only if `mode` is active, holding the mode lock so no
    /// transition can land while `f` commands an actuator.
    pub fn while_in<R>(&self, mode: Mode, f: impl FnOnce() -> R) -> Option<R> {
        self.mode.with_locked(|current| (current == mode).then(f))
    }

    pub(crate) fn mode_cell(&self) -> &DataCell<Mode> {
        &self.mode
    }
}

impl Default for AdcsShared {
    fn default() -> Self {
        Self::new()
    }
}
