//! Options controlling a render, as opposed to describing the scene.

/// Options for [`Renderer`](crate::render::Renderer).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
pub struct RenderSettings {
    /// Maximum number of surface interactions per path.
    pub max_depth: u32,

    #[allow(missing_docs)]
    pub scene: SceneSettings,

    #[allow(missing_docs)]
    pub emitters: EmitterSettings,

    /// Base of every pixel sample's random seed.
    pub seed: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            max_depth: 5,
            scene: SceneSettings::default(),
            emitters: EmitterSettings::default(),
            seed: 0,
        }
    }
}

/// How light passes through translucent surfaces and how the sun is sampled.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
pub struct SceneSettings {
    /// Upper limit on each channel of the transmittance of a translucent surface when
    /// `fancier_translucency` is on.
    pub transmissivity_cap: f32,

    /// Use the hue-preserving translucency model, in which colored glass scatters diffusely
    /// in proportion to its saturation and tints without darkening.
    pub fancier_translucency: bool,

    /// Sample the sun directly at diffuse bounces.
    pub sun_sampling: bool,

    /// Scale direct sunlight by [`Sun::luminosity`](crate::environment::Sun::luminosity).
    pub sun_luminosity: bool,

    /// Block direct light, from the sun or from emitters, which would pass through a
    /// change in index of refraction.
    pub strict_direct_light: bool,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            transmissivity_cap: 1.0,
            fancier_translucency: true,
            sun_sampling: true,
            sun_luminosity: false,
            strict_direct_light: false,
        }
    }
}

/// Whether and how emissive blocks are sampled.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
pub struct EmitterSettings {
    /// If false, emissive blocks emit nothing at all.
    pub enabled: bool,

    /// Multiplier on all light emitted by blocks.
    pub intensity: f32,

    #[allow(missing_docs)]
    pub strategy: EmitterSamplingStrategy,

    /// When next-event estimation is in use, count light from a path hitting an emitter only
    /// on the first bounce, since later bounces already counted it by sampling.
    pub prevent_double_counting: bool,
}

impl EmitterSettings {
    /// The strategy actually used: while emitters are enabled, [`None`] acts as
    /// [`OneBlock`].
    ///
    /// [`None`]: EmitterSamplingStrategy::None
    /// [`OneBlock`]: EmitterSamplingStrategy::OneBlock
    pub fn effective_strategy(&self) -> EmitterSamplingStrategy {
        match self.strategy {
            EmitterSamplingStrategy::None if self.enabled => EmitterSamplingStrategy::OneBlock,
            other => other,
        }
    }
}

impl Default for EmitterSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            intensity: 13.0,
            strategy: EmitterSamplingStrategy::OneBlock,
            prevent_double_counting: true,
        }
    }
}

/// Which emitters, and which of their faces, a diffuse bounce samples.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[expect(clippy::exhaustive_enums)]
pub enum EmitterSamplingStrategy {
    /// No sampling; emitters contribute only when paths hit them.
    None,
    /// One face of one randomly chosen emitter.
    One,
    /// Every face of one randomly chosen emitter.
    #[default]
    OneBlock,
    /// Every face of every emitter near the surface.
    All,
}

impl EmitterSamplingStrategy {
    /// Numeric code, 0 to 3, used by packed scene descriptions.
    pub const fn code(self) -> u32 {
        match self {
            Self::None => 0,
            Self::One => 1,
            Self::OneBlock => 2,
            Self::All => 3,
        }
    }

    /// Inverse of [`Self::code()`].
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::One),
            2 => Some(Self::OneBlock),
            3 => Some(Self::All),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(true, EmitterSamplingStrategy::None, EmitterSamplingStrategy::OneBlock)]
    #[case(false, EmitterSamplingStrategy::None, EmitterSamplingStrategy::None)]
    #[case(true, EmitterSamplingStrategy::One, EmitterSamplingStrategy::One)]
    #[case(true, EmitterSamplingStrategy::All, EmitterSamplingStrategy::All)]
    fn effective_strategy(
        #[case] enabled: bool,
        #[case] strategy: EmitterSamplingStrategy,
        #[case] expected: EmitterSamplingStrategy,
    ) {
        let settings = EmitterSettings {
            enabled,
            strategy,
            ..EmitterSettings::default()
        };
        assert_eq!(settings.effective_strategy(), expected);
    }

    #[test]
    fn codes() {
        for code in 0..4 {
            assert_eq!(
                EmitterSamplingStrategy::from_code(code).map(EmitterSamplingStrategy::code),
                Some(code)
            );
        }
        assert_eq!(EmitterSamplingStrategy::from_code(4), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json() {
        let settings: RenderSettings =
            serde_json::from_str(r#"{"max_depth": 8, "emitters": {"strategy": "all"}}"#).unwrap();
        assert_eq!(settings.max_depth, 8);
        assert_eq!(settings.emitters.strategy, EmitterSamplingStrategy::All);
        assert_eq!(settings.emitters.intensity, 13.0);
        assert_eq!(settings.scene, SceneSettings::default());
    }
}
