mod cursor;

pub use cursor::{read_i16_le, read_i32_le, read_u16_le, ByteCursor};
