//! Element data types used by tiled GEMM kernels

use serde::{Deserialize, Serialize};
use std::fmt;

/// Element data type of a kernel operand, accumulator or output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dtype {
    Fp32,
    Fp16,
    Bfloat16,
    E4m3,     // FP8 E4M3
    E5m2,     // FP8 E5M2
    E2m1,     // FP4 E2M1 with block scaling factors
    MxE2m1,   // OCP MX FP4
    MxE4m3,   // OCP MX FP8
    Ue8m0,    // Scaling-factor exponent
    Int32,
    #[serde(rename = "uint32")]
    UInt32,
}

impl Dtype {
    /// Number of bits per element
    pub fn num_bits(&self) -> usize {
        match self {
            Dtype::Fp32 | Dtype::Int32 | Dtype::UInt32 => 32,
            Dtype::Fp16 | Dtype::Bfloat16 => 16,
            Dtype::E4m3 | Dtype::E5m2 | Dtype::MxE4m3 | Dtype::Ue8m0 => 8,
            Dtype::E2m1 | Dtype::MxE2m1 => 4,
        }
    }

    /// Check if elements carry per-block scaling factors
    pub fn is_block_format(&self) -> bool {
        matches!(self, Dtype::E2m1 | Dtype::MxE2m1 | Dtype::MxE4m3)
    }

    /// Bytes needed for `elements` values of this type
    ///
    /// Returns `None` on overflow.
    pub fn bytes_for(&self, elements: usize) -> Option<usize> {
        elements.checked_mul(self.num_bits()).map(|bits| bits / 8)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dtype::Fp32 => "fp32",
            Dtype::Fp16 => "fp16",
            Dtype::Bfloat16 => "bfloat16",
            Dtype::E4m3 => "e4m3",
            Dtype::E5m2 => "e5m2",
            Dtype::E2m1 => "e2m1",
            Dtype::MxE2m1 => "mx_e2m1",
            Dtype::MxE4m3 => "mx_e4m3",
            Dtype::Ue8m0 => "ue8m0",
            Dtype::Int32 => "int32",
            Dtype::UInt32 => "uint32",
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Integer division rounding up
pub fn ceil_div(m: usize, n: usize) -> usize {
    m.div_ceil(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_bits() {
        assert_eq!(Dtype::Fp32.num_bits(), 32);
        assert_eq!(Dtype::Bfloat16.num_bits(), 16);
        assert_eq!(Dtype::E4m3.num_bits(), 8);
        assert_eq!(Dtype::E2m1.num_bits(), 4);
        assert_eq!(Dtype::UInt32.num_bits(), 32);
    }

    #[test]
    fn test_block_format() {
        assert!(Dtype::E2m1.is_block_format());
        assert!(Dtype::MxE4m3.is_block_format());
        assert!(!Dtype::E4m3.is_block_format());
        assert!(!Dtype::Fp32.is_block_format());
    }

    #[test]
    fn test_bytes_for() {
        assert_eq!(Dtype::E2m1.bytes_for(128), Some(64));
        assert_eq!(Dtype::Fp16.bytes_for(10), Some(20));
        assert_eq!(Dtype::Fp32.bytes_for(usize::MAX), None);
    }

    #[test]
    fn test_serde_names() {
        let dtype: Dtype = serde_json::from_str("\"mx_e2m1\"").unwrap();
        assert_eq!(dtype, Dtype::MxE2m1);
        assert_eq!(serde_json::to_string(&Dtype::Bfloat16).unwrap(), "\"bfloat16\"");
        assert_eq!(Dtype::E4m3.to_string(), "e4m3");
    }

    #[test]
    fn test_ceil_div() {
        assert_eq!(ceil_div(0, 64), 0);
        assert_eq!(ceil_div(1, 64), 1);
        assert_eq!(ceil_div(128, 64), 2);
        assert_eq!(ceil_div(129, 64), 3);
    }
}
