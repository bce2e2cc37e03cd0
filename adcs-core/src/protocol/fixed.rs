#[allow(unused_imports)]
use micromath::F32Ext;

/// Signed 5.3 fixed-point number as carried on the wire.
///
/// Range is -16.0 ..= 15.875 in steps of 0.125. Conversion from `f32`
/// rounds to nearest and saturates at both ends; NaN maps to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Fixed5_3(i8);

impl Fixed5_3 {
    pub const FRAC_BITS: u32 = 3;
    pub const SCALE: f32 = (1 << Self::FRAC_BITS) as f32;
    pub const MIN: Fixed5_3 = Fixed5_3(i8::MIN);
    pub const MAX: Fixed5_3 = Fixed5_3(i8::MAX);
    pub const ZERO: Fixed5_3 = Fixed5_3(0);

    pub fn from_f32(value: f32) -> Self {
        // `as` saturates and sends NaN to 0.
        Self((value * Self::SCALE).round() as i8)
    }

    pub fn to_f32(self) -> f32 {
        self.0 as f32 / Self::SCALE
    }

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits as i8)
    }

    pub const fn to_bits(self) -> u8 {
        self.0 as u8
    }
}

pub fn float_to_fixed(value: f32) -> Fixed5_3 {
    Fixed5_3::from_f32(value)
}

pub fn fixed_to_float(value: Fixed5_3) -> f32 {
    value.to_f32()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_representable_value_round_trips() {
        for raw in i8::MIN..=i8::MAX {
            let v = raw as f32 * 0.125;
            assert_eq!(fixed_to_float(float_to_fixed(v)), v, "raw {}", raw);
        }
    }

    #[test]
    fn out_of_range_saturates() {
        assert_eq!(float_to_fixed(100.0), Fixed5_3::MAX);
        assert_eq!(float_to_fixed(15.95), Fixed5_3::MAX);
        assert_eq!(float_to_fixed(-16.1), Fixed5_3::MIN);
        assert_eq!(float_to_fixed(f32::NEG_INFINITY), Fixed5_3::MIN);
        assert_eq!(float_to_fixed(f32::NAN), Fixed5_3::ZERO);
        assert_eq!(Fixed5_3::MAX.to_bits(), 0x7F);
        assert_eq!(Fixed5_3::MIN.to_bits(), 0x80);
    }

    #[test]
    fn rounds_to_nearest_step() {
        assert_eq!(float_to_fixed(1.06).to_f32(), 1.0);
        assert_eq!(float_to_fixed(1.07).to_f32(), 1.125);
        assert_eq!(float_to_fixed(-0.3).to_f32(), -0.25);
    }
}
