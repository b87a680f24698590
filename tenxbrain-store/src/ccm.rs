//! Reading and writing `.ccm` columnar count-matrix files.
//!
//! Layout: an 8-byte magic, row and column counts as little-endian `u64`,
//! then the counts as little-endian `u32` in column-major order. Columns
//! being contiguous on disk is the property the whole package leans on:
//! a block of columns is a single contiguous byte range.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use memmap2::Mmap;
use ndarray::{Array2, ShapeBuilder};

use tenxbrain_core::BlockSource;

use super::error::{Result, StoreError};

/// Magic bytes opening every `.ccm` file (the trailing byte is a format
/// version).
pub const CCM_MAGIC: [u8; 8] = *b"CCMATRX\x01";

/// Header length in bytes: magic + rows (`u64`) + columns (`u64`).
pub const CCM_HEADER_LEN: usize = 24;

const VALUE_LEN: usize = 4;

/// Streaming writer producing a `.ccm` file one column at a time.
///
/// The header is written up front from the declared dimensions;
/// [`finish`](Self::finish) refuses to close a file with missing columns.
pub struct CcmWriter {
    out: BufWriter<File>,
    rows: usize,
    columns: usize,
    written: usize,
}

impl CcmWriter {
    /// Create a `.ccm` file for a `rows x columns` matrix.
    pub fn create<P: AsRef<Path>>(path: P, rows: usize, columns: usize) -> Result<Self> {
        let file = File::create(path)?;
        let mut out = BufWriter::new(file);
        out.write_all(&CCM_MAGIC)?;
        out.write_u64::<LittleEndian>(rows as u64)?;
        out.write_u64::<LittleEndian>(columns as u64)?;
        Ok(CcmWriter {
            out,
            rows,
            columns,
            written: 0,
        })
    }

    /// Append the next column. Columns must arrive in order and `values`
    /// must hold exactly one count per row.
    pub fn write_column(&mut self, values: &[u32]) -> Result<()> {
        if self.written == self.columns {
            return Err(StoreError::ColumnOverflow {
                index: self.written,
                columns: self.columns,
            });
        }
        if values.len() != self.rows {
            return Err(StoreError::ColumnLength {
                got: values.len(),
                rows: self.rows,
            });
        }
        for &value in values {
            self.out.write_u32::<LittleEndian>(value)?;
        }
        self.written += 1;
        Ok(())
    }

    /// Flush and close, verifying every declared column was written.
    pub fn finish(mut self) -> Result<()> {
        if self.written != self.columns {
            return Err(StoreError::IncompleteWrite {
                written: self.written,
                columns: self.columns,
            });
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Write an in-memory dense matrix as a `.ccm` file.
pub fn write_dense<P: AsRef<Path>>(path: P, matrix: &Array2<u32>) -> Result<()> {
    let (rows, columns) = matrix.dim();
    let mut writer = CcmWriter::create(path, rows, columns)?;
    let mut column = vec![0u32; rows];
    for j in 0..columns {
        for (i, slot) in column.iter_mut().enumerate() {
            *slot = matrix[(i, j)];
        }
        writer.write_column(&column)?;
    }
    writer.finish()
}

/// Memory-mapped, lazily sliceable view of a `.ccm` file.
///
/// Opening validates the magic and that the file length matches the header
/// dimensions exactly. Reads decode only the requested byte range, so
/// resident memory stays proportional to the block being served.
pub struct CcmReader {
    map: Mmap,
    path: PathBuf,
    rows: usize,
    columns: usize,
}

impl CcmReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        // read-only map of an immutable dataset file
        let map = unsafe { Mmap::map(&file)? };

        if map.len() < CCM_HEADER_LEN || map[..CCM_MAGIC.len()] != CCM_MAGIC {
            return Err(StoreError::BadMagic(path));
        }
        let rows = LittleEndian::read_u64(&map[8..16]) as usize;
        let columns = LittleEndian::read_u64(&map[16..24]) as usize;

        let expected = rows
            .checked_mul(columns)
            .and_then(|cells| cells.checked_mul(VALUE_LEN))
            .and_then(|body| body.checked_add(CCM_HEADER_LEN))
            .ok_or_else(|| StoreError::DimensionOverflow(path.clone()))?;
        if map.len() != expected {
            return Err(StoreError::Truncated {
                path,
                rows,
                columns,
                expected,
                actual: map.len(),
            });
        }

        Ok(CcmReader {
            map,
            path,
            rows,
            columns,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode columns `[start, end)` into a dense block.
    pub fn read_block(&self, start: usize, end: usize) -> Result<Array2<u32>> {
        if start > end || end > self.columns {
            return Err(StoreError::ColumnRangeOutOfBounds {
                start,
                end,
                columns: self.columns,
            });
        }
        let width = end - start;
        let offset = CCM_HEADER_LEN + start * self.rows * VALUE_LEN;
        let len = width * self.rows * VALUE_LEN;

        let mut values = vec![0u32; self.rows * width];
        LittleEndian::read_u32_into(&self.map[offset..offset + len], &mut values);

        // the file is column-major, so build the block in f-order
        let block = Array2::from_shape_vec((self.rows, width).f(), values)
            .expect("decoded value count matches block shape");
        Ok(block)
    }
}

impl BlockSource for CcmReader {
    type Error = StoreError;

    fn shape(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    fn read_block(&self, start: usize, end: usize) -> Result<Array2<u32>> {
        CcmReader::read_block(self, start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use std::io::Write as _;
    use tenxbrain_core::{ChunkPlan, reduce};

    #[fixture]
    fn matrix() -> Array2<u32> {
        arr2(&[[1, 0, 2, 7], [3, 4, 0, 0], [0, 5, 6, 1]])
    }

    #[rstest]
    fn round_trip_blocks(matrix: Array2<u32>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.ccm");
        write_dense(&path, &matrix).unwrap();

        let reader = CcmReader::open(&path).unwrap();
        assert_eq!((reader.rows(), reader.columns()), (3, 4));

        assert_eq!(reader.read_block(0, 4).unwrap(), matrix);
        assert_eq!(
            reader.read_block(1, 3).unwrap(),
            arr2(&[[0, 2], [4, 0], [5, 6]])
        );
        // empty block at the boundary is legal and empty
        assert_eq!(reader.read_block(4, 4).unwrap().dim(), (3, 0));
    }

    #[rstest]
    fn reduction_over_a_ccm_file(matrix: Array2<u32>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.ccm");
        write_dense(&path, &matrix).unwrap();

        let reader = CcmReader::open(&path).unwrap();
        let plan = ChunkPlan::new(4, 3).unwrap();
        let from_disk = reduce(&reader, &plan).unwrap();
        let in_memory = reduce(&matrix, &plan).unwrap();
        assert_eq!(from_disk, in_memory);
    }

    #[rstest]
    fn out_of_bounds_read_is_rejected(matrix: Array2<u32>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.ccm");
        write_dense(&path, &matrix).unwrap();

        let reader = CcmReader::open(&path).unwrap();
        assert!(matches!(
            reader.read_block(2, 5),
            Err(StoreError::ColumnRangeOutOfBounds {
                start: 2,
                end: 5,
                columns: 4
            })
        ));
    }

    #[rstest]
    fn foreign_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notccm.bin");
        let mut file = File::create(&path).unwrap();
        file.write_all(b"definitely not a count matrix").unwrap();
        drop(file);

        assert!(matches!(
            CcmReader::open(&path),
            Err(StoreError::BadMagic(_))
        ));
    }

    #[rstest]
    fn truncated_file_is_rejected(matrix: Array2<u32>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cut.ccm");
        write_dense(&path, &matrix).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() - 5]).unwrap();

        assert!(matches!(
            CcmReader::open(&path),
            Err(StoreError::Truncated { .. })
        ));
    }

    #[rstest]
    fn writer_enforces_declared_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strict.ccm");

        let mut writer = CcmWriter::create(&path, 2, 2).unwrap();
        assert!(matches!(
            writer.write_column(&[1, 2, 3]),
            Err(StoreError::ColumnLength { got: 3, rows: 2 })
        ));

        writer.write_column(&[1, 2]).unwrap();
        assert!(matches!(
            writer.finish(),
            Err(StoreError::IncompleteWrite {
                written: 1,
                columns: 2
            })
        ));
    }

    #[rstest]
    fn writer_rejects_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extra.ccm");

        let mut writer = CcmWriter::create(&path, 1, 1).unwrap();
        writer.write_column(&[9]).unwrap();
        assert!(matches!(
            writer.write_column(&[9]),
            Err(StoreError::ColumnOverflow {
                index: 1,
                columns: 1
            })
        ));
    }
}
