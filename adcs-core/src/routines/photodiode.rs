use crate::error::SensorError;
use crate::hal::PhotodiodeArray;
use crate::mode::Mode;
use crate::state::PhotodiodeReadings;
use crate::system::AdcsShared;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhotodiodeOutcome {
    Inactive,
    Sampled(PhotodiodeReadings),
    Fault(SensorError),
}

/// Raw photodiode dump, active in TEST_PHOTODIODES.
pub struct PhotodiodeTest<'a, D> {
    shared: &'a AdcsShared,
    photodiodes: D,
}

impl<'a, D: PhotodiodeArray> PhotodiodeTest<'a, D> {
    pub fn new(shared: &'a AdcsShared, photodiodes: D) -> Self {
        Self { shared, photodiodes }
    }

    pub async fn cycle(&mut self) -> PhotodiodeOutcome {
        if self.shared.mode() != Mode::TestPhotodiodes {
            return PhotodiodeOutcome::Inactive;
        }
        match self.photodiodes.read_all().await {
            Ok(readings) => PhotodiodeOutcome::Sampled(readings),
            Err(e) => PhotodiodeOutcome::Fault(e),
        }
    }
}
