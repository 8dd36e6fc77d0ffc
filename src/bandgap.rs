use crate::error::BandError;


/// Band gap straddling the reference level.
///
/// `highest_negative` is the largest energy strictly below the reference (the
/// valence side) and `lowest_positive` the smallest energy strictly above it (the
/// conduction side). Both are shifted energies, so the reference sits at zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapEstimate {
    pub gap:              f64,
    pub highest_negative: f64,
    pub lowest_positive:  f64,
}


impl GapEstimate {
    /// Returns true if `energy` equals one of the two gap boundaries.
    pub fn is_boundary(&self, energy: f64) -> bool {
        energy == self.highest_negative || energy == self.lowest_positive
    }

    /// Indices of every sample sitting exactly on a gap boundary.
    ///
    /// Ties are not broken: if several samples share a boundary energy all of them
    /// are reported.
    pub fn boundary_indices<'a, I>(&self, energies: I) -> Vec<usize>
    where
        I: IntoIterator<Item = &'a f64>,
    {
        energies.into_iter()
            .enumerate()
            .filter(|(_, &e)| self.is_boundary(e))
            .map(|(i, _)| i)
            .collect()
    }
}


/// Estimate the band gap from energies already shifted by the reference level.
///
/// Values exactly equal to zero belong to neither side and are skipped, as are NaNs.
/// If no value lies on one of the two sides the gap is undefined and
/// `BandError::DegenerateGap` is returned.
pub fn estimate_gap<'a, I>(energies: I) -> Result<GapEstimate, BandError>
where
    I: IntoIterator<Item = &'a f64>,
{
    let (highest_negative, lowest_positive) = energies.into_iter()
        .copied()
        .fold((None, None), |(neg, pos): (Option<f64>, Option<f64>), e| {
            if e > 0.0 {
                (neg, Some(pos.map_or(e, |p: f64| p.min(e))))
            } else if e < 0.0 {
                (Some(neg.map_or(e, |n: f64| n.max(e))), pos)
            } else {
                (neg, pos)
            }
        });

    match (highest_negative, lowest_positive) {
        (Some(highest_negative), Some(lowest_positive)) => Ok(GapEstimate {
            gap: (highest_negative - lowest_positive).abs(),
            highest_negative,
            lowest_positive,
        }),
        (None, Some(_)) => Err(BandError::DegenerateGap(
                "all energies lie above the reference level".to_owned())),
        (Some(_), None) => Err(BandError::DegenerateGap(
                "all energies lie below the reference level".to_owned())),
        (None, None) => Err(BandError::DegenerateGap(
                "all energies coincide with the reference level".to_owned())),
    }
}


/// Where the gap boundaries occur along the k path.
#[derive(Debug, Clone, PartialEq)]
pub struct GapSummary {
    pub estimate:     GapEstimate,
    pub vbm_kpoints:  Vec<f64>,
    pub cbm_kpoints:  Vec<f64>,
}


impl GapSummary {
    /// Estimate the gap and collect the k coordinates of every boundary sample.
    pub fn new<'a, K, E>(kpoints: K, energies: E) -> Result<Self, BandError>
    where
        K: IntoIterator<Item = &'a f64>,
        E: IntoIterator<Item = &'a f64> + Clone,
    {
        let estimate = estimate_gap(energies.clone())?;

        let mut vbm_kpoints = vec![];
        let mut cbm_kpoints = vec![];
        for (&k, &e) in kpoints.into_iter().zip(energies) {
            if e == estimate.highest_negative {
                vbm_kpoints.push(k);
            } else if e == estimate.lowest_positive {
                cbm_kpoints.push(k);
            }
        }

        Ok(Self { estimate, vbm_kpoints, cbm_kpoints })
    }

    /// Direct gap: the two boundaries share at least one k coordinate.
    pub fn is_direct(&self) -> bool {
        self.vbm_kpoints.iter()
            .any(|k| self.cbm_kpoints.contains(k))
    }
}
