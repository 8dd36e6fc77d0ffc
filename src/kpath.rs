use std::{
    fmt,
    str::FromStr,
};

use anyhow::{
    anyhow,
    Context,
};
use indexmap::IndexMap;
use serde::{
    Serialize,
    Deserialize,
};


/// Labels offered for the common high-symmetry points.
pub const PREDEFINED_LABELS: &[&str] = &[
    "Γ", "M", "R", "X", "K", "L", "U", "W", "H", "N", "P", "A",
];


/// Spell the Gamma point as `Γ`, keeping every other label untouched.
pub fn normalize_label(label: &str) -> String {
    let label = label.trim();
    match label {
        "G" | "g" | "Gamma" | "GAMMA" | "gamma" | "\\Gamma" => "Γ".to_owned(),
        _ => label.to_owned(),
    }
}


/// One labeled k coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KPointLabel {
    pub k:     f64,
    pub label: String,
}


/// Parse `<k>:<label>`, e.g. `0.5:X` or `0:G`.
impl FromStr for KPointLabel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, label) = s.split_once(':')
            .ok_or_else(|| anyhow!("K-point label {:?} should be written as `<k>:<label>`", s))?;
        let k = k.trim().parse::<f64>()
            .with_context(|| format!("Invalid k coordinate in {:?}", s))?;
        let label = normalize_label(label);
        if label.is_empty() {
            return Err(anyhow!("Empty label in {:?}", s));
        }
        if !k.is_finite() {
            return Err(anyhow!("K coordinate in {:?} must be finite", s));
        }
        Ok(Self { k, label })
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct KKey(u64);

impl From<f64> for KKey {
    fn from(k: f64) -> Self {
        // -0.0 + 0.0 == +0.0
        Self((k + 0.0).to_bits())
    }
}


/// High-symmetry points along the path, kept in insertion order.
///
/// Inserting a k coordinate that is already present replaces its label but keeps
/// its original position, the usual ordered-map semantics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<KPointLabel>", into = "Vec<KPointLabel>")]
pub struct HighSymmetryPoints {
    points: IndexMap<KKey, KPointLabel>,
}


impl HighSymmetryPoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the replaced label if `k` was already present.
    pub fn insert(&mut self, k: f64, label: impl Into<String>) -> Option<String> {
        let label = label.into();
        let k = k + 0.0;
        self.points.insert(KKey::from(k), KPointLabel { k, label })
            .map(|old| old.label)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, &str)> {
        self.points.values().map(|p| (p.k, p.label.as_str()))
    }

    pub fn get(&self, k: f64) -> Option<&str> {
        self.points.get(&KKey::from(k)).map(|p| p.label.as_str())
    }
}


impl From<Vec<KPointLabel>> for HighSymmetryPoints {
    fn from(v: Vec<KPointLabel>) -> Self {
        v.into_iter().collect()
    }
}

impl From<HighSymmetryPoints> for Vec<KPointLabel> {
    fn from(p: HighSymmetryPoints) -> Self {
        p.points.into_values().collect()
    }
}

impl FromIterator<KPointLabel> for HighSymmetryPoints {
    fn from_iter<T: IntoIterator<Item = KPointLabel>>(iter: T) -> Self {
        let mut ret = Self::new();
        for p in iter {
            ret.insert(p.k, p.label);
        }
        ret
    }
}

impl fmt::Display for HighSymmetryPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.iter()
            .map(|(k, label)| format!("{}:{}", k, label))
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{}", s)
    }
}
