//! Fixed-width primitive slots.

use eyre::Result;

use crate::abi::read_array;

macro_rules! scalar_readers {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            #[inline]
            pub fn $name(data: &[u8], row: usize) -> Result<$ty> {
                Ok(<$ty>::from_le_bytes(read_array(data, row)?))
            }
        )*
    };
}

scalar_readers! {
    read_i8 => i8,
    read_i16 => i16,
    read_i32 => i32,
    read_i64 => i64,
    read_u8 => u8,
    read_u16 => u16,
    read_u32 => u32,
    read_u64 => u64,
    read_f32 => f32,
    read_f64 => f64,
}

#[inline]
pub fn read_bool(data: &[u8], row: usize) -> Result<bool> {
    Ok(read_array::<1>(data, row)?[0] != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_slots() {
        let mut data = Vec::new();
        for v in [1i32, -2, i32::MAX] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        assert_eq!(read_i32(&data, 1).unwrap(), -2);
        assert_eq!(read_i32(&data, 2).unwrap(), i32::MAX);
        assert!(read_i32(&data, 3).is_err());
    }

    #[test]
    fn unsigned_slots_keep_top_bit() {
        let data = u64::MAX.to_le_bytes();
        assert_eq!(read_u64(&data, 0).unwrap(), u64::MAX);
        assert_eq!(read_u8(&data, 7).unwrap(), 0xFF);
    }

    #[test]
    fn bool_is_any_non_zero_byte() {
        let data = [0u8, 1, 2];
        assert!(!read_bool(&data, 0).unwrap());
        assert!(read_bool(&data, 1).unwrap());
        assert!(read_bool(&data, 2).unwrap());
    }

    #[test]
    fn floats_round_trip_bits() {
        let data = 1.5f64.to_le_bytes();
        assert_eq!(read_f64(&data, 0).unwrap(), 1.5);
        let data = (-0.25f32).to_le_bytes();
        assert_eq!(read_f32(&data, 0).unwrap(), -0.25);
    }
}
