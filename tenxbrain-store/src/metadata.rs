//! Gene and barcode metadata tables.
//!
//! The tables ship as plain TSV next to the matrix: a two-column gene table
//! (Ensembl id, symbol) with one line per matrix row, and a barcode list
//! with one line per matrix column. Both may be gzip-compressed.

use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use super::error::{Result, StoreError};

/// One row of the gene table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneRecord {
    /// Stable gene identifier (Ensembl).
    pub id: String,
    /// Display symbol.
    pub symbol: String,
}

/// Get a reader for either a gzip'd or non-gzip'd file.
fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path)?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };
    Ok(BufReader::new(file))
}

/// Read the gene table, one record per matrix row.
///
/// Lines must carry at least id and symbol, tab-separated; extra columns
/// are ignored.
pub fn read_gene_table<P: AsRef<Path>>(path: P) -> Result<Vec<GeneRecord>> {
    let reader = get_dynamic_reader(path.as_ref())?;
    let mut genes = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split('\t');
        let (id, symbol) = match (fields.next(), fields.next()) {
            (Some(id), Some(symbol)) if !id.is_empty() => (id, symbol),
            _ => {
                return Err(StoreError::MalformedGeneRecord {
                    line: index + 1,
                    text: line.clone(),
                });
            }
        };
        genes.push(GeneRecord {
            id: id.to_string(),
            symbol: symbol.to_string(),
        });
    }
    Ok(genes)
}

/// Read the barcode list, one barcode per matrix column.
pub fn read_barcodes<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let reader = get_dynamic_reader(path.as_ref())?;
    let mut barcodes = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if !line.is_empty() {
            barcodes.push(line);
        }
    }
    Ok(barcodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::io::Write;

    const GENES_TSV: &str = "ENSMUSG00000051951\tXkr4\nENSMUSG00000089699\tGm1992\n";

    #[rstest]
    fn reads_plain_gene_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genes.tsv");
        std::fs::write(&path, GENES_TSV).unwrap();

        let genes = read_gene_table(&path).unwrap();
        assert_eq!(genes.len(), 2);
        assert_eq!(
            genes[0],
            GeneRecord {
                id: "ENSMUSG00000051951".into(),
                symbol: "Xkr4".into()
            }
        );
    }

    #[rstest]
    fn reads_gzipped_gene_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genes.tsv.gz");
        let file = File::create(&path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(GENES_TSV.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let genes = read_gene_table(&path).unwrap();
        assert_eq!(genes.len(), 2);
        assert_eq!(genes[1].symbol, "Gm1992");
    }

    #[rstest]
    fn rejects_malformed_gene_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genes.tsv");
        std::fs::write(&path, "ENSMUSG00000051951\tXkr4\nno-tab-here\n").unwrap();

        assert!(matches!(
            read_gene_table(&path),
            Err(StoreError::MalformedGeneRecord { line: 2, .. })
        ));
    }

    #[rstest]
    fn reads_barcodes_skipping_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("barcodes.tsv");
        std::fs::write(&path, "AAACCTGAGATAGGAG-1\n\nAAACCTGAGCGGCTTC-1\n").unwrap();

        let barcodes = read_barcodes(&path).unwrap();
        assert_eq!(
            barcodes,
            vec!["AAACCTGAGATAGGAG-1", "AAACCTGAGCGGCTTC-1"]
        );
    }
}
