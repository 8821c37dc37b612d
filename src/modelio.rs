//! Saving and loading parameter sets.
//!
//! # `.bpat` Checkpoint Format
//!
//! A trained parameter set is stored as a flat list of tensors:
//!
//! ```text
//! ┌────────────┬────────────┬─────────────────────┐
//! │ Header     │ Tensor N   │ Tensor N+1 …        │
//! ├────────────┼────────────┼─────────────────────┤
//! │ "bpat"[4]  │ u64: ndim  │ u64: ndim           │
//! │ u8: count  │ [u64; ndim] shape                │
//! │            │ [f64; prod(shape)] data          │
//! └────────────┴──────────────────────────────────┘
//! ```
//!
//! All integers and floats are little-endian. Tensors come back in the order
//! they were written, which is the model's parameter order.
//!
//! # Limitations
//! - `f64` elements only
//! - At most 255 tensors per file
//! - No per-tensor names
//!
//! # Example
//!
//! ```rust
//! use descent::{model::{self, Linear, Model}, modelio};
//!
//! # fn main() -> descent::Result<()> {
//! let trained = Linear::zeros(2, 1);
//! let mut buf = Vec::new();
//! modelio::write_parameters(&mut buf, trained.parameters())?;
//!
//! let mut restored = Linear::zeros(2, 1);
//! model::assign(&mut restored, modelio::read_parameters(buf.as_slice())?)?;
//! assert_eq!(restored, trained);
//! # Ok(())
//! # }
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use briny::prelude::*;

use crate::error::{Result, TrainError};
use crate::tensors::{Ten64, Tensor};

const BPAT_MAGIC: &[u8; 4] = b"bpat";

/// A tensor as read off the wire, before its shape and data are trusted.
struct PackedTensor {
    shape: Vec<u64>,
    data: Vec<f64>,
}

impl Validate for PackedTensor {
    fn validate(&self) -> core::result::Result<(), ValidationError> {
        let expected = self.shape.iter().try_fold(1u64, |acc, &d| acc.checked_mul(d));
        if expected != Some(self.data.len() as u64) {
            return Err(ValidationError);
        }
        Ok(())
    }
}

fn read_u64(reader: &mut impl Read) -> Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Writes `tensors` in `.bpat` form.
///
/// # Errors
/// - [`TrainError::Checkpoint`] if there are more than 255 tensors.
/// - [`TrainError::Io`] if writing fails.
pub fn write_parameters<W: Write>(mut writer: W, tensors: &[Ten64]) -> Result<()> {
    let count = u8::try_from(tensors.len()).map_err(|_| TrainError::Checkpoint("more than 255 tensors"))?;

    writer.write_all(BPAT_MAGIC)?;
    writer.write_all(&[count])?;

    for tensor in tensors {
        writer.write_all(&(tensor.shape.len() as u64).to_le_bytes())?;
        for &dim in &tensor.shape {
            writer.write_all(&(dim as u64).to_le_bytes())?;
        }
        for &val in &tensor.data {
            writer.write_all(&val.to_le_bytes())?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Reads a `.bpat` stream back into tensors.
///
/// # Errors
/// - [`TrainError::Checkpoint`] on a bad magic header or a tensor whose data
///   does not fill its shape.
/// - [`TrainError::Io`] on truncated input.
pub fn read_parameters<R: Read>(mut reader: R) -> Result<Vec<Ten64>> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != BPAT_MAGIC {
        return Err(TrainError::Checkpoint("invalid magic header"));
    }

    let mut count = [0u8; 1];
    reader.read_exact(&mut count)?;
    let count = count[0] as usize;

    let mut tensors = Vec::with_capacity(count);
    for _ in 0..count {
        let ndim = read_u64(&mut reader)?;
        let shape = (0..ndim).map(|_| read_u64(&mut reader)).collect::<Result<Vec<u64>>>()?;

        let size = shape
            .iter()
            .try_fold(1u64, |acc, &d| acc.checked_mul(d))
            .ok_or(TrainError::Checkpoint("tensor shape overflows"))?;
        let data = (0..size)
            .map(|_| read_u64(&mut reader).map(f64::from_bits))
            .collect::<Result<Vec<f64>>>()?;

        let trusted = TrustedData::new(PackedTensor { shape, data })
            .map_err(|_| TrainError::Checkpoint("tensor data does not match its shape"))?;
        let inner = trusted.into_inner();
        let shape: Vec<usize> = inner.shape.iter().map(|&d| d as usize).collect();
        tensors.push(Tensor::new(shape, inner.data));
    }

    Ok(tensors)
}

/// Saves a parameter set to a `.bpat` file, replacing any existing file.
pub fn save_parameters(path: impl AsRef<Path>, tensors: &[Ten64]) -> Result<()> {
    let path = path.as_ref();
    write_parameters(BufWriter::new(File::create(path)?), tensors)?;
    tracing::debug!(path = %path.display(), tensors = tensors.len(), "saved parameters");
    Ok(())
}

/// Loads a parameter set from a `.bpat` file.
pub fn load_parameters(path: impl AsRef<Path>) -> Result<Vec<Ten64>> {
    let path = path.as_ref();
    let tensors = read_parameters(BufReader::new(File::open(path)?))?;
    tracing::debug!(path = %path.display(), tensors = tensors.len(), "loaded parameters");
    Ok(tensors)
}
