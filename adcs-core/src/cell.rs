//! Synchronized containers for state shared between tasks.

use core::cell::{Cell, RefCell};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::mutex::Mutex as AsyncMutex;

use crate::error::{LinkError, SensorError};
use crate::hal::{
    Coil, CommandLink, Flywheel, Imu, Magnetorquer, PhotodiodeArray, PowerMonitor, TelemetrySink,
};
use crate::state::{ImuSample, MotorDirection, PdChannel, PhotodiodeReadings, PowerReading};

/// Single-slot overwrite cell.
///
/// Writers replace the value wholesale inside a critical section, so a
/// reader always gets one complete value. Each write bumps a sequence
/// number that readers can use to detect fresh data.
pub struct DataCell<T: Copy> {
    slot: Mutex<CriticalSectionRawMutex, Cell<(T, u32)>>,
}

impl<T: Copy> DataCell<T> {
    pub const fn new(init: T) -> Self {
        Self {
            slot: Mutex::new(Cell::new((init, 0))),
        }
    }

    pub fn update(&self, data: T) {
        self.slot.lock(|cell| {
            let (_, seq) = cell.get();
            cell.set((data, seq.wrapping_add(1)));
        });
    }

    pub fn read(&self) -> T {
        self.slot.lock(|cell| cell.get().0)
    }

    /// Value together with the number of writes so far. Comparing counts
    /// between two reads tells whether the value was republished.
    pub fn read_with_seq(&self) -> (T, u32) {
        self.slot.lock(|cell| cell.get())
    }

    /// Read-modify-write under the cell's lock. `f` returns the value to
    /// commit (if any) and a result for the caller. Nothing else can write
    /// the cell while `f` runs.
    pub fn update_with<R>(&self, f: impl FnOnce(T) -> (Option<T>, R)) -> R {
        self.slot.lock(|cell| {
            let (current, seq) = cell.get();
            let (next, result) = f(current);
            if let Some(next) = next {
                cell.set((next, seq.wrapping_add(1)));
            }
            result
        })
    }

    /// Run `f` with the lock held, without touching the value.
    pub fn with_locked<R>(&self, f: impl FnOnce(T) -> R) -> R {
        self.slot.lock(|cell| f(cell.get().0))
    }

    /// [`with_locked`](Self::with_locked), also passing the write count.
    pub fn with_locked_seq<R>(&self, f: impl FnOnce(T, u32) -> R) -> R {
        self.slot.lock(|cell| {
            let (value, seq) = cell.get();
            f(value, seq)
        })
    }
}

/// An actuator reachable from several tasks.
///
/// Access goes through a critical section, so calls are short register
/// writes only. `&SharedActuator<T>` implements the same actuator trait as
/// `T`.
pub struct SharedActuator<T> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<T>>,
}

impl<T> SharedActuator<T> {
    pub const fn new(actuator: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(actuator)),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}

impl<T: Flywheel> Flywheel for &SharedActuator<T> {
    fn run(&mut self, direction: MotorDirection, power: u8) {
        self.with(|fw| fw.run(direction, power))
    }

    fn stop(&mut self) {
        self.with(|fw| fw.stop())
    }

    fn frequency(&self) -> u8 {
        self.inner.lock(|cell| cell.borrow().frequency())
    }

    fn is_enabled(&self) -> bool {
        self.inner.lock(|cell| cell.borrow().is_enabled())
    }
}

impl<T: Magnetorquer> Magnetorquer for &SharedActuator<T> {
    fn drive(&mut self, coil: Coil, direction: MotorDirection, power: u8) {
        self.with(|m| m.drive(coil, direction, power))
    }

    fn stop(&mut self) {
        self.with(|m| m.stop())
    }

    fn is_enabled(&self, coil: Coil) -> bool {
        self.inner.lock(|cell| cell.borrow().is_enabled(coil))
    }
}

/// A bus-backed device shared by several tasks behind an async mutex.
///
/// `&SharedDevice<T>` implements the same sensor/link trait as `T`; each
/// call holds the lock for one complete transaction.
pub struct SharedDevice<T> {
    inner: AsyncMutex<CriticalSectionRawMutex, T>,
}

impl<T> SharedDevice<T> {
    pub const fn new(device: T) -> Self {
        Self {
            inner: AsyncMutex::new(device),
        }
    }
}

impl<T: Imu> Imu for &SharedDevice<T> {
    async fn data_ready(&mut self) -> Result<bool, SensorError> {
        self.inner.lock().await.data_ready().await
    }

    async fn read(&mut self) -> Result<ImuSample, SensorError> {
        self.inner.lock().await.read().await
    }
}

impl<T: PowerMonitor> PowerMonitor for &SharedDevice<T> {
    async fn read(&mut self) -> Result<PowerReading, SensorError> {
        self.inner.lock().await.read().await
    }
}

impl<T: PhotodiodeArray> PhotodiodeArray for &SharedDevice<T> {
    async fn read_channel(&mut self, channel: PdChannel) -> Result<f32, SensorError> {
        self.inner.lock().await.read_channel(channel).await
    }

    async fn read_all(&mut self) -> Result<PhotodiodeReadings, SensorError> {
        self.inner.lock().await.read_all().await
    }

    async fn read_filtered(&mut self) -> Result<PhotodiodeReadings, SensorError> {
        self.inner.lock().await.read_filtered().await
    }
}

impl<T: CommandLink> CommandLink for &SharedDevice<T> {
    async fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        self.inner.lock().await.read_available(buf).await
    }
}

impl<T: TelemetrySink> TelemetrySink for &SharedDevice<T> {
    async fn send(&mut self, frame: &[u8]) -> Result<(), LinkError> {
        self.inner.lock().await.send(frame).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn holds_initial_value() {
        let cell = DataCell::new(42);
        assert_eq!(cell.read(), 42);
        assert_eq!(cell.read_with_seq(), (42, 0));
    }

    #[test]
    fn update_overwrites_and_counts() {
        let cell = DataCell::new(0);
        cell.update(100);
        cell.update(200);
        assert_eq!(cell.read_with_seq(), (200, 2));
    }

    #[test]
    fn update_with_commits_only_when_asked() {
        let cell = DataCell::new(1u8);
        let r = cell.update_with(|v| (None, v + 1));
        assert_eq!(r, 2);
        assert_eq!(cell.read_with_seq(), (1, 0));
        cell.update_with(|v| (Some(v * 10), ()));
        assert_eq!(cell.read_with_seq(), (10, 1));
    }

    #[derive(Clone, Copy, PartialEq, Debug)]
    struct Triple {
        x: u32,
        y: u32,
        z: u32,
    }

    #[test]
    fn concurrent_reader_never_sees_torn_value() {
        let cell = Arc::new(DataCell::new(Triple { x: 0, y: 0, z: 0 }));
        let writer = {
            let cell = cell.clone();
            thread::spawn(move || {
                for i in 1..=1000u32 {
                    cell.update(Triple { x: i, y: i, z: i });
                    thread::yield_now();
                }
            })
        };

        let mut last = 0;
        while last < 1000 {
            let t = cell.read();
            assert!(t.x == t.y && t.y == t.z, "torn read {:?}", t);
            assert!(t.x >= last, "went backwards {} -> {}", last, t.x);
            last = t.x;
        }
        writer.join().unwrap();
    }

    #[test]
    fn shared_device_forwards_to_inner() {
        struct Fixed;
        impl PowerMonitor for Fixed {
            async fn read(&mut self) -> Result<PowerReading, SensorError> {
                Ok(PowerReading {
                    voltage: 3.3,
                    current_ma: 20.0,
                })
            }
        }
        let dev = SharedDevice::new(Fixed);
        let mut handle = &dev;
        let reading = embassy_futures::block_on(PowerMonitor::read(&mut handle)).unwrap();
        assert_eq!(reading.voltage, 3.3);
    }
}
