// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-document effect configuration sampling.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::types::{ColorSpace, EffectConfig, EffectField, RandomRanges, RandomSettings};

/// Produces the effect configuration for one document.
///
/// Every numeric field is drawn independently and uniformly from its range;
/// the two categorical fields are drawn only when their gate is set.
pub struct ConfigGenerator;

impl ConfigGenerator {
    /// Sample a configuration from `ranges`, starting from `base`.
    pub fn generate<R: Rng>(
        base: &EffectConfig,
        ranges: &RandomRanges,
        rng: &mut R,
    ) -> EffectConfig {
        let mut config = base.clone();

        for field in EffectField::ALL {
            let range = ranges.range(field);
            field.set(&mut config, rng.gen_range(range.min..=range.max));
        }

        if ranges.border {
            config.border = rng.gen_bool(0.5);
        }
        if ranges.colorspace {
            config.colorspace = ColorSpace::ALL
                .choose(rng)
                .copied()
                .unwrap_or(base.colorspace);
        }

        config
    }

    /// Configuration for one document of a batch: sampled when randomization
    /// is on, otherwise an identical copy of `base`.
    pub fn for_document<R: Rng>(
        base: &EffectConfig,
        settings: &RandomSettings,
        rng: &mut R,
    ) -> EffectConfig {
        if settings.enabled {
            Self::generate(base, &settings.ranges, rng)
        } else {
            base.clone()
        }
    }

    /// Validate the inputs a batch will sample from.
    pub fn validate(base: &EffectConfig, settings: &RandomSettings) -> Result<()> {
        base.validate()?;
        if settings.enabled {
            settings.ranges.validate()?;
        }
        Ok(())
    }
}

/// Seedable source of per-document random streams.
///
/// Each call to [`RandomSource::fork`] hands out a fresh, independently
/// seeded generator, so one document's draws never depend on how many values
/// another document consumed.
pub struct RandomSource {
    master: StdRng,
}

impl RandomSource {
    /// Reproducible source for tests and `--seed` runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            master: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            master: StdRng::from_entropy(),
        }
    }

    /// Independent generator for the next document.
    pub fn fork(&mut self) -> StdRng {
        StdRng::seed_from_u64(self.master.r#gen())
    }
}
