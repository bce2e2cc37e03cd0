//! Recording fakes for the collaborator traits.
//!
//! Each fake uses interior mutability and implements its trait for `&Fake`,
//! so a test can hand a reference to the routine and inspect the fake
//! afterwards.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use crate::error::{LinkError, SensorError};
use crate::hal::{Coil, CommandLink, Flywheel, Imu, Magnetorquer, PhotodiodeArray, PowerMonitor, TelemetrySink};
use crate::mode::Mode;
use crate::state::{ImuSample, MotorDirection, PdChannel, PowerReading};
use crate::system::AdcsShared;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelEvent {
    Run(MotorDirection, u8),
    Stop,
}

#[derive(Default)]
pub struct FakeFlywheel {
    events: RefCell<Vec<WheelEvent>>,
    enabled: Cell<bool>,
    frequency: Cell<u8>,
    watched: Cell<Option<&'static AdcsShared>>,
    mode_at_stop: Cell<Option<Mode>>,
}

impl FakeFlywheel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<WheelEvent> {
        self.events.borrow().clone()
    }

    pub fn stops(&self) -> usize {
        self.events.borrow().iter().filter(|e| **e == WheelEvent::Stop).count()
    }

    pub fn last(&self) -> Option<WheelEvent> {
        self.events.borrow().last().copied()
    }

    pub fn set_frequency(&self, rps: u8) {
        self.frequency.set(rps);
    }

    /// Record the mode visible to other tasks at the moment `stop` runs.
    pub fn watch_mode(&self, shared: &'static AdcsShared) {
        self.watched.set(Some(shared));
    }

    pub fn mode_seen_at_stop(&self) -> Option<Mode> {
        self.mode_at_stop.get()
    }
}

impl Flywheel for &FakeFlywheel {
    fn run(&mut self, direction: MotorDirection, power: u8) {
        if direction == MotorDirection::Idle {
            return self.stop();
        }
        self.enabled.set(true);
        self.events.borrow_mut().push(WheelEvent::Run(direction, power));
    }

    fn stop(&mut self) {
        if let Some(shared) = self.watched.get() {
            self.mode_at_stop.set(Some(shared.mode()));
        }
        self.enabled.set(false);
        self.events.borrow_mut().push(WheelEvent::Stop);
    }

    fn frequency(&self) -> u8 {
        self.frequency.get()
    }

    fn is_enabled(&self) -> bool {
        self.enabled.get()
    }
}

#[derive(Default)]
pub struct FakeMagnetorquer {
    drives: RefCell<Vec<(Coil, MotorDirection, u8)>>,
    enabled: Cell<[bool; 2]>,
    stops: Cell<usize>,
}

impl FakeMagnetorquer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drives(&self) -> Vec<(Coil, MotorDirection, u8)> {
        self.drives.borrow().clone()
    }

    pub fn stops(&self) -> usize {
        self.stops.get()
    }
}

impl Magnetorquer for &FakeMagnetorquer {
    fn drive(&mut self, coil: Coil, direction: MotorDirection, power: u8) {
        let mut enabled = self.enabled.get();
        enabled[coil as usize] = direction != MotorDirection::Idle;
        self.enabled.set(enabled);
        self.drives.borrow_mut().push((coil, direction, power));
    }

    fn stop(&mut self) {
        self.enabled.set([false; 2]);
        self.stops.set(self.stops.get() + 1);
    }

    fn is_enabled(&self, coil: Coil) -> bool {
        self.enabled.get()[coil as usize]
    }
}

#[derive(Default)]
pub struct FakeImu {
    queue: RefCell<VecDeque<ImuSample>>,
    fault: Cell<Option<SensorError>>,
}

impl FakeImu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, sample: ImuSample) {
        self.queue.borrow_mut().push_back(sample);
    }

    pub fn fail_with(&self, e: SensorError) {
        self.fault.set(Some(e));
    }
}

impl Imu for &FakeImu {
    async fn data_ready(&mut self) -> Result<bool, SensorError> {
        match self.fault.get() {
            Some(e) => Err(e),
            None => Ok(!self.queue.borrow().is_empty()),
        }
    }

    async fn read(&mut self) -> Result<ImuSample, SensorError> {
        self.queue.borrow_mut().pop_front().ok_or(SensorError::NotReady)
    }
}

pub struct FakePower {
    reading: Cell<Result<PowerReading, SensorError>>,
}

impl FakePower {
    pub fn new(voltage: f32, current_ma: f32) -> Self {
        Self {
            reading: Cell::new(Ok(PowerReading { voltage, current_ma })),
        }
    }

    pub fn fail_with(&self, e: SensorError) {
        self.reading.set(Err(e));
    }
}

impl PowerMonitor for &FakePower {
    async fn read(&mut self) -> Result<PowerReading, SensorError> {
        self.reading.get()
    }
}

#[derive(Default)]
pub struct FakePhotodiodes {
    channels: Cell<[f32; 6]>,
    fault: Cell<Option<SensorError>>,
    reads: Cell<usize>,
}

impl FakePhotodiodes {
    pub fn new(channels: [f32; 6]) -> Self {
        let pd = Self::default();
        pd.channels.set(channels);
        pd
    }

    pub fn set(&self, channels: [f32; 6]) {
        self.channels.set(channels);
    }

    pub fn fail_with(&self, e: SensorError) {
        self.fault.set(Some(e));
    }

    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl PhotodiodeArray for &FakePhotodiodes {
    async fn read_channel(&mut self, channel: PdChannel) -> Result<f32, SensorError> {
        if let Some(e) = self.fault.get() {
            return Err(e);
        }
        self.reads.set(self.reads.get() + 1);
        Ok(self.channels.get()[channel.index()])
    }
}

#[derive(Default)]
pub struct FakeLink {
    incoming: RefCell<VecDeque<Result<Vec<u8>, LinkError>>>,
}

impl FakeLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, bytes: &[u8]) {
        self.incoming.borrow_mut().push_back(Ok(bytes.to_vec()));
    }

    pub fn push_error(&self, e: LinkError) {
        self.incoming.borrow_mut().push_back(Err(e));
    }
}

impl CommandLink for &FakeLink {
    async fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        match self.incoming.borrow_mut().pop_front() {
            None => Ok(0),
            Some(Err(e)) => Err(e),
            Some(Ok(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
        }
    }
}

#[derive(Default)]
pub struct FakeSink {
    sent: RefCell<Vec<Vec<u8>>>,
    fault: Cell<Option<LinkError>>,
}

impl FakeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.borrow().clone()
    }

    /// First byte of every frame sent so far.
    pub fn statuses(&self) -> Vec<u8> {
        self.sent.borrow().iter().map(|f| f[0]).collect()
    }

    pub fn fail_with(&self, e: LinkError) {
        self.fault.set(Some(e));
    }
}

impl TelemetrySink for &FakeSink {
    async fn send(&mut self, frame: &[u8]) -> Result<(), LinkError> {
        if let Some(e) = self.fault.get() {
            return Err(e);
        }
        self.sent.borrow_mut().push(frame.to_vec());
        Ok(())
    }
}
