//! Two-column band-structure data files.
//!
//! The format is whitespace-delimited numeric text as produced by most DFT
//! post-processing tools (`bands.dat.gnu` of Quantum ESPRESSO, `p4vasp` exports,
//! ...): first column the k coordinate along the path, second column the raw band
//! energy. Every band usually restarts at `k = 0`, which is what the renderer splits
//! segments on.
use std::{
    fmt::Write as _,
    fs,
    path::Path,
    str::FromStr,
};

use log::debug;

use crate::{
    error::BandError,
    types::{
        Matrix,
        Vector,
    },
};


/// Raw (k, E) samples loaded from a band file.
#[derive(Debug, Clone, PartialEq)]
pub struct BandData {
    pub kpoints:  Vector<f64>,
    pub energies: Vector<f64>,
}


impl BandData {
    pub fn from_file(path: &(impl AsRef<Path> + ?Sized)) -> Result<Self, BandError> {
        let path = path.as_ref();
        let txt = fs::read_to_string(path)?;
        debug!("Read {} bytes from {:?}", txt.len(), path);
        txt.parse()
    }

    /// Build from explicit `(k, E)` rows, at least one is required.
    pub fn from_rows(rows: &[(f64, f64)]) -> Result<Self, BandError> {
        if rows.is_empty() {
            return Err(BandError::InvalidInputData("no data rows found".to_owned()));
        }

        Ok(Self {
            kpoints:  rows.iter().map(|r| r.0).collect(),
            energies: rows.iter().map(|r| r.1).collect(),
        })
    }

    pub fn nrows(&self) -> usize {
        self.kpoints.len()
    }

    /// Minimum and maximum of the raw energies.
    pub fn energy_range(&self) -> (f64, f64) {
        self.energies.iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &e| (lo.min(e), hi.max(e)))
    }

    /// Largest k coordinate on the path.
    pub fn kmax(&self) -> f64 {
        self.kpoints.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Energies relative to `reference`.
    pub fn shifted_energies(&self, reference: f64) -> Vector<f64> {
        &self.energies - reference
    }

    /// Format the samples back into the two-column text format.
    ///
    /// A blank line is emitted before every segment restart so gnuplot draws each
    /// band separately; the loader skips blank lines.
    pub fn to_text(&self, comment: &str) -> String {
        let mut s = String::with_capacity(self.nrows() * 32);
        let _ = writeln!(s, "# {}", comment.trim());
        for (i, (k, e)) in self.kpoints.iter().zip(self.energies.iter()).enumerate() {
            if i != 0 && *k == 0.0 {
                s.push('\n');
            }
            let _ = writeln!(s, "  {:12.6}  {:12.6}", k, e);
        }
        s
    }
}


impl FromStr for BandData {
    type Err = BandError;

    fn from_str(txt: &str) -> Result<Self, Self::Err> {
        let mut ncol = 0usize;
        let mut nrow = 0usize;
        let mut values = Vec::<f64>::new();

        for (iline, line) in txt.lines().enumerate() {
            let line = match line.find('#') {
                Some(pos) => &line[.. pos],
                None      => line,
            }.trim();
            if line.is_empty() {
                continue;
            }

            let row = line.split_whitespace()
                .map(|tok| {
                    tok.parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite())
                        .ok_or_else(|| BandError::InvalidInputData(
                                format!("line {}: {:?} is not a finite number", iline + 1, tok)))
                })
                .collect::<Result<Vec<f64>, _>>()?;

            if nrow == 0 {
                if row.len() < 2 {
                    return Err(BandError::InvalidInputData(
                            format!("line {}: at least two columns (k and E) are required, found {}",
                                    iline + 1, row.len())));
                }
                ncol = row.len();
            } else if row.len() != ncol {
                return Err(BandError::InvalidInputData(
                        format!("line {}: expected {} columns, found {}", iline + 1, ncol, row.len())));
            }

            values.extend(row);
            nrow += 1;
        }

        if nrow == 0 {
            return Err(BandError::InvalidInputData("no data rows found".to_owned()));
        }

        let mat = Matrix::from_shape_vec((nrow, ncol), values)
            .map_err(|e| BandError::InvalidInputData(e.to_string()))?;
        debug!("Parsed band data matrix of shape {:?}", mat.shape());

        Ok(Self {
            kpoints:  mat.column(0).to_owned(),
            energies: mat.column(1).to_owned(),
        })
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() {
        let txt = r#"
# k      E
  0.0000  -1.0
  1.0000   0.0   # inline comment
  2.0000   1.0

  0.0000   2.0
  1.0000   3.0
  2.0000   4.0
"#;
        let data: BandData = txt.parse().unwrap();
        assert_eq!(data.nrows(), 6);
        assert_eq!(data.kpoints.to_vec(), vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0]);
        assert_eq!(data.energies.to_vec(), vec![-1.0, 0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(data.energy_range(), (-1.0, 4.0));
        assert_eq!(data.kmax(), 2.0);
        assert_eq!(data.shifted_energies(1.0).to_vec(), vec![-2.0, -1.0, 0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_parse_extra_columns() {
        let data: BandData = "0 1 9\n1 2 9\n".parse().unwrap();
        assert_eq!(data.kpoints.to_vec(), vec![0.0, 1.0]);
        assert_eq!(data.energies.to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_parse_invalid() {
        let cases = [
            "",
            "# only a comment\n\n",
            "0.0\n1.0\n",
            "0.0 1.0\n1.0 2.0 3.0\n",
            "0.0 1.0\n1.0 abc\n",
            "0.0 1.0\n1.0 nan\n",
            "0.0 1.0\n1.0 inf\n",
        ];
        for txt in cases {
            assert!(matches!(txt.parse::<BandData>(), Err(BandError::InvalidInputData(_))),
                    "{:?} should be rejected", txt);
        }
    }

    #[test]
    fn test_from_rows() {
        assert!(matches!(BandData::from_rows(&[]), Err(BandError::InvalidInputData(_))));
        let data = BandData::from_rows(&[(0.0, -1.0), (0.5, 1.0)]).unwrap();
        assert_eq!(data.nrows(), 2);
        assert_eq!(data.energy_range(), (-1.0, 1.0));
    }

    #[test]
    fn test_text_roundtrip_keeps_segments() {
        let data = BandData::from_rows(&[(0.0, -1.0), (1.0, 0.5), (0.0, 2.0), (1.0, 3.0)]).unwrap();
        let txt = data.to_text("k  E");
        assert!(txt.starts_with("# k  E\n"));
        assert_eq!(txt.lines().filter(|l| l.is_empty()).count(), 1);
        assert_eq!(txt.parse::<BandData>().unwrap(), data);
    }
}
