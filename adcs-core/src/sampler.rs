//! Producer side of the IMU pipeline.

use crate::error::SensorError;
use crate::hal::Imu;
use crate::state::{ImuData, ImuSample};
use crate::system::AdcsShared;

pub const DECIMATION: usize = 4;
pub const AVERAGE_WINDOW: usize = 8;

/// Two-stage gyro smoother: block-average `D` raw samples into one
/// decimated sample, then take the moving average of the last `W`
/// decimated samples.
///
/// Until the window has filled, the average covers only the decimated
/// samples seen so far.
pub struct GyroFilter<const D: usize, const W: usize> {
    acc: [f32; 3],
    acc_count: usize,
    window: [[f32; 3]; W],
    head: usize,
    filled: usize,
    output: [f32; 3],
}

impl<const D: usize, const W: usize> GyroFilter<D, W> {
    pub const fn new() -> Self {
        Self {
            acc: [0.0; 3],
            acc_count: 0,
            window: [[0.0; 3]; W],
            head: 0,
            filled: 0,
            output: [0.0; 3],
        }
    }

    /// Feed one raw sample. Returns the new smoothed value when this sample
    /// completed a decimation block.
    pub fn push(&mut self, sample: [f32; 3]) -> Option<[f32; 3]> {
        for (acc, s) in self.acc.iter_mut().zip(sample) {
            *acc += s;
        }
        self.acc_count += 1;
        if self.acc_count < D {
            return None;
        }

        let mut decimated = [0.0; 3];
        for (d, acc) in decimated.iter_mut().zip(self.acc) {
            *d = acc / D as f32;
        }
        self.acc = [0.0; 3];
        self.acc_count = 0;

        self.window[self.head] = decimated;
        self.head = (self.head + 1) % W;
        self.filled = (self.filled + 1).min(W);

        let mut sum = [0.0; 3];
        for slot in &self.window[..self.filled] {
            for axis in 0..3 {
                sum[axis] += slot[axis];
            }
        }
        for axis in 0..3 {
            self.output[axis] = sum[axis] / self.filled as f32;
        }
        Some(self.output)
    }

    /// Latest smoothed value.
    pub fn output(&self) -> [f32; 3] {
        self.output
    }
}

impl<const D: usize, const W: usize> Default for GyroFilter<D, W> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleOutcome {
    Published(ImuData),
    /// No unit had a fresh sample this cycle.
    NotReady { streak: u16 },
    Fault(SensorError),
}

/// Reads one or two IMUs each cycle and publishes the filtered snapshot.
///
/// With a second unit present, the gyro axes of both are averaged before
/// filtering and the magnetometer comes from the primary unit. Both units
/// have to report ready for a cycle to count.
pub struct ImuSampler<'a, P: Imu, S: Imu> {
    shared: &'a AdcsShared,
    primary: P,
    secondary: Option<S>,
    filter: GyroFilter<DECIMATION, AVERAGE_WINDOW>,
    not_ready: u16,
    stall_threshold: u16,
}

impl<'a, P: Imu> ImuSampler<'a, P, P> {
    pub fn single(shared: &'a AdcsShared, imu: P, stall_threshold: u16) -> Self {
        Self::new(shared, imu, None, stall_threshold)
    }
}

impl<'a, P: Imu, S: Imu> ImuSampler<'a, P, S> {
    pub fn new(shared: &'a AdcsShared, primary: P, secondary: Option<S>, stall_threshold: u16) -> Self {
        Self {
            shared,
            primary,
            secondary,
            filter: GyroFilter::new(),
            not_ready: 0,
            stall_threshold,
        }
    }

    pub async fn cycle(&mut self) -> SampleOutcome {
        match self.sample().await {
            Ok(Some(sample)) => {
                self.not_ready = 0;
                self.filter.push(sample.gyro);
                let data = ImuData {
                    mag: sample.mag,
                    gyro: self.filter.output(),
                };
                self.shared.publish_imu(data);
                trace!("imu gyro z {}", data.gyro[2]);
                SampleOutcome::Published(data)
            }
            Ok(None) => {
                self.not_ready = self.not_ready.saturating_add(1);
                if self.not_ready == self.stall_threshold {
                    warn!("imu stalled for {} cycles", self.not_ready);
                }
                SampleOutcome::NotReady {
                    streak: self.not_ready,
                }
            }
            Err(e) => {
                warn!("imu read failed: {:?}", e);
                SampleOutcome::Fault(e)
            }
        }
    }

    async fn sample(&mut self) -> Result<Option<ImuSample>, SensorError> {
        if !self.primary.data_ready().await? {
            return Ok(None);
        }
        if let Some(secondary) = self.secondary.as_mut() {
            if !secondary.data_ready().await? {
                return Ok(None);
            }
        }

        let mut sample = self.primary.read().await?;
        if let Some(secondary) = self.secondary.as_mut() {
            let other = secondary.read().await?;
            for axis in 0..3 {
                sample.gyro[axis] = (sample.gyro[axis] + other.gyro[axis]) / 2.0;
            }
        }
        Ok(Some(sample))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeImu;
    use embassy_futures::block_on;

    #[test]
    fn decimates_then_averages() {
        let mut f: GyroFilter<4, 8> = GyroFilter::new();
        for _ in 0..3 {
            assert_eq!(f.push([4.0, 0.0, -4.0]), None);
        }
        assert_eq!(f.push([4.0, 0.0, -4.0]), Some([4.0, 0.0, -4.0]));
        for _ in 0..3 {
            f.push([0.0; 3]);
        }
        // Window holds one block of 4.0 and one of 0.0.
        assert_eq!(f.push([0.0; 3]), Some([2.0, 0.0, -2.0]));
    }

    #[test]
    fn old_blocks_fall_out_of_window() {
        let mut f: GyroFilter<1, 2> = GyroFilter::new();
        f.push([10.0; 3]);
        f.push([2.0; 3]);
        assert_eq!(f.push([4.0; 3]), Some([3.0; 3]));
    }

    #[test]
    fn publishes_mag_and_filtered_gyro() {
        let shared = AdcsShared::new();
        let imu = FakeImu::new();
        imu.push(ImuSample {
            mag: [10.0, 20.0, 30.0],
            gyro: [1.0, 2.0, 3.0],
        });
        let mut sampler = ImuSampler::single(&shared, &imu, 10);
        let out = block_on(sampler.cycle());
        assert!(matches!(out, SampleOutcome::Published(_)));
        let snap = shared.imu();
        assert_eq!(snap.mag, [10.0, 20.0, 30.0]);
        // First block not complete yet.
        assert_eq!(snap.gyro, [0.0; 3]);

        for _ in 0..3 {
            imu.push(ImuSample {
                mag: [10.0, 20.0, 30.0],
                gyro: [1.0, 2.0, 3.0],
            });
            block_on(sampler.cycle());
        }
        assert_eq!(shared.imu().gyro, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn averages_two_units() {
        let shared = AdcsShared::new();
        let a = FakeImu::new();
        let b = FakeImu::new();
        for _ in 0..4 {
            a.push(ImuSample {
                mag: [1.0; 3],
                gyro: [2.0, 4.0, 6.0],
            });
            b.push(ImuSample {
                mag: [9.0; 3],
                gyro: [0.0, 0.0, 2.0],
            });
        }
        let mut sampler = ImuSampler::new(&shared, &a, Some(&b), 10);
        for _ in 0..4 {
            block_on(sampler.cycle());
        }
        let snap = shared.imu();
        assert_eq!(snap.gyro, [1.0, 2.0, 4.0]);
        assert_eq!(snap.mag, [1.0; 3]);
    }

    #[test]
    fn not_ready_counts_streak_without_publishing() {
        let shared = AdcsShared::new();
        let imu = FakeImu::new();
        let mut sampler = ImuSampler::single(&shared, &imu, 2);
        assert_eq!(block_on(sampler.cycle()), SampleOutcome::NotReady { streak: 1 });
        assert_eq!(block_on(sampler.cycle()), SampleOutcome::NotReady { streak: 2 });
        assert_eq!(shared.imu_with_seq().1, 0);
    }

    #[test]
    fn fault_is_reported() {
        let shared = AdcsShared::new();
        let imu = FakeImu::new();
        imu.fail_with(SensorError::Bus);
        let mut sampler = ImuSampler::single(&shared, &imu, 2);
        assert_eq!(block_on(sampler.cycle()), SampleOutcome::Fault(SensorError::Bus));
    }
}
