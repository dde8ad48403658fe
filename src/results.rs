use std::collections::BTreeMap;

use serde::Serialize;

use crate::attack::Strike;
use crate::dist::Dist;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Entry {
    pub total: u32,
    pub probability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JointEntry {
    pub hits: u32,
    pub crits: u32,
    pub probability: f64,
}

impl JointEntry {
    #[must_use]
    pub fn strike(&self) -> Strike {
        Strike::new(self.hits, self.crits)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackResults {
    pub expected_hits: f64,
    pub expected_crits: f64,
    pub expected_total: f64,
    pub distribution: Vec<Entry>,
    #[serde(rename = "distributionByHitsCrits")]
    pub joint: Vec<JointEntry>,
    pub cumulative: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefenseResults {
    pub expected_blocks: f64,
    pub distribution: Vec<Entry>,
    pub cumulative: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WoundsResults {
    pub expected_wounds: f64,
    pub distribution: Vec<Entry>,
    pub cumulative: Vec<Entry>,
}

/// Probability of every total in `0..=max` plus the matching "at least"
/// table. The cumulative column starts at exactly one.
fn tabulate<I>(mass: I) -> (f64, Vec<Entry>, Vec<Entry>)
where
    I: IntoIterator<Item = (u32, f64)>,
{
    let mut dense: Vec<f64> = Vec::new();
    for (total, p) in mass {
        let i = total as usize;
        if dense.len() <= i {
            dense.resize(i + 1, 0.0);
        }
        dense[i] += p;
    }
    if dense.is_empty() {
        dense.push(1.0);
    }

    let mut expected = 0.0;
    let mut remaining = 1.0_f64;
    let mut distribution = Vec::with_capacity(dense.len());
    let mut cumulative = Vec::with_capacity(dense.len());
    for (total, p) in (0u32..).zip(dense) {
        expected += f64::from(total) * p;
        distribution.push(Entry {
            total,
            probability: p,
        });
        cumulative.push(Entry {
            total,
            probability: remaining.max(0.0),
        });
        remaining -= p;
    }
    (expected, distribution, cumulative)
}

fn masses(dist: &Dist<u32>) -> impl Iterator<Item = (u32, f64)> + '_ {
    dist.values().iter().copied().zip(dist.probabilities())
}

impl From<&Dist<Strike>> for AttackResults {
    fn from(dist: &Dist<Strike>) -> Self {
        let joint: Vec<JointEntry> = dist
            .values()
            .iter()
            .zip(dist.probabilities())
            .map(|(strike, probability)| JointEntry {
                hits: strike.hits,
                crits: strike.crits,
                probability,
            })
            .collect();
        let expected_hits: f64 = joint.iter().map(|e| f64::from(e.hits) * e.probability).sum();
        let expected_crits: f64 = joint.iter().map(|e| f64::from(e.crits) * e.probability).sum();
        let (_, distribution, cumulative) =
            tabulate(joint.iter().map(|e| (e.hits + e.crits, e.probability)));

        Self {
            expected_hits,
            expected_crits,
            expected_total: dist.mean(),
            distribution,
            joint,
            cumulative,
        }
    }
}

impl From<&Dist<u32>> for DefenseResults {
    fn from(dist: &Dist<u32>) -> Self {
        let (_, distribution, cumulative) = tabulate(masses(dist));
        Self {
            expected_blocks: dist.mean(),
            distribution,
            cumulative,
        }
    }
}

impl From<&Dist<u32>> for WoundsResults {
    fn from(dist: &Dist<u32>) -> Self {
        let (_, distribution, cumulative) = tabulate(masses(dist));
        Self {
            expected_wounds: dist.mean(),
            distribution,
            cumulative,
        }
    }
}

impl WoundsResults {
    #[must_use]
    pub fn from_mass(mass: &BTreeMap<u32, f64>) -> Self {
        let (expected_wounds, distribution, cumulative) =
            tabulate(mass.iter().map(|(total, p)| (*total, *p)));
        Self {
            expected_wounds,
            distribution,
            cumulative,
        }
    }
}

impl AttackResults {
    /// Outcomes the attack can actually produce.
    pub fn strikes(&self) -> impl Iterator<Item = &JointEntry> + '_ {
        self.joint.iter().filter(|e| e.probability > 0.0)
    }
}
