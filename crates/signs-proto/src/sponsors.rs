//! Sponsor logo bookkeeping.
//!
//! The sponsor endpoint returns a flat list of image filenames. The banner
//! shows a few at a time and tries not to repeat a logo until every sponsor
//! has had a turn in the current cycle.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::rotator::Rotator;

/// How the banner chooses the next logos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    /// Random picks, no repeats within a cycle, never the logos just shown.
    #[default]
    Random,
    /// Contiguous pages through the list in server order.
    Window,
}

#[derive(Debug, Clone, Default)]
pub struct SponsorSet {
    images: Vec<String>,
    used: HashSet<String>,
}

impl SponsorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Number of logos already shown in the current cycle.
    pub fn used_count(&self) -> usize {
        self.used.len()
    }

    /// Install a freshly fetched list. The cycle restarts whenever the list
    /// differs from the one held. Returns `true` on change.
    pub fn replace(&mut self, images: Vec<String>) -> bool {
        if images == self.images {
            return false;
        }
        self.images = images;
        self.used.clear();
        true
    }

    /// Pick one logo not yet used this cycle.
    pub fn pick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<String> {
        self.pick_avoiding(rng, &[])
    }

    /// Pick one logo, preferring ones that are neither used this cycle nor
    /// in `avoid`. Falls back to relaxing `avoid` and then the cycle.
    pub fn pick_avoiding<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        avoid: &[String],
    ) -> Option<String> {
        if self.images.is_empty() {
            return None;
        }
        if self.used.len() >= self.images.len() {
            self.used.clear();
        }

        let fresh: Vec<&String> = self
            .images
            .iter()
            .filter(|img| !self.used.contains(*img))
            .collect();
        let preferred: Vec<&String> = fresh
            .iter()
            .copied()
            .filter(|img| !avoid.contains(img))
            .collect();
        let not_avoided: Vec<&String> = self
            .images
            .iter()
            .filter(|img| !avoid.contains(img))
            .collect();

        let pool = if !preferred.is_empty() {
            preferred
        } else if !not_avoided.is_empty() {
            not_avoided
        } else {
            self.images.iter().collect()
        };

        let chosen = pool.choose(rng).map(|s| (*s).clone())?;
        self.used.insert(chosen.clone());
        Some(chosen)
    }

    /// Pick up to `count` distinct logos for a banner, avoiding the ones in
    /// `current` where the list is long enough to allow it.
    pub fn pick_many<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        count: usize,
        current: &[String],
    ) -> Vec<String> {
        let count = count.min(self.images.len());
        let mut picked: Vec<String> = Vec::with_capacity(count);
        while picked.len() < count {
            let mut avoid: Vec<String> = picked.clone();
            avoid.extend(current.iter().cloned());
            let Some(next) = self.pick_avoiding(rng, &avoid) else {
                break;
            };
            if picked.contains(&next) {
                // only duplicates remain
                break;
            }
            picked.push(next);
        }
        picked
    }

    /// The logos in a contiguous window, in server order.
    pub fn window(&self, rotator: &Rotator) -> Vec<String> {
        rotator.slice(&self.images).to_vec()
    }
}

/// Human-friendly label for a logo filename: extension dropped, separators
/// turned into spaces. `"red_hat-logo.png"` → `"red hat logo"`.
pub fn display_name(file: &str) -> String {
    let stem = match file.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => file,
    };
    stem.split(['_', '-', ' '])
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
