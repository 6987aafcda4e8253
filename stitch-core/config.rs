use crate::error::{StitchError, StitchResult};
use crate::{ProjectionMode, ProjectionParameters};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Keypoint detection and description settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FeatureConfig {
    /// FAST intensity threshold (1-127)
    pub threshold: u8,
    /// Contiguous arc length on the 16-pixel circle (9-16)
    pub arc_length: u8,
    /// Odd patch size for orientation and descriptor sampling
    pub patch_size: usize,
    /// Keep at most this many keypoints per image, strongest first
    pub max_keypoints: usize,
    pub nms_distance: f32,
    /// Seed of the BRIEF sampling pattern
    pub pattern_seed: u64,
    /// Keep only mutual nearest-neighbour matches
    pub cross_check: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            threshold: 20,
            arc_length: 9,
            patch_size: 31,
            max_keypoints: 2000,
            nms_distance: 3.0,
            pattern_seed: 0x5EED,
            cross_check: false,
        }
    }
}

/// Good-match filter applied to raw matcher output
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MatchConfig {
    /// Keep matches scoring below `ratio * reference`
    pub ratio: f64,
    /// Reference used in place of a best score of zero
    pub zero_score_reference: f64,
    /// Upper bound on the reference (minimum) score
    pub max_reference_score: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            ratio: 3.0,
            zero_score_reference: 1.0,
            max_reference_score: 100.0,
        }
    }
}

/// Translation-only RANSAC settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RansacConfig {
    /// Per-axis agreement tolerance in pixels
    pub tolerance: f64,
    /// Number of trials; `None` runs one trial per correspondence
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub trials: Option<usize>,
    pub seed: u64,
    /// Fewer correspondences than this is an error
    pub min_correspondences: usize,
    /// Fail instead of falling back when no hypothesis gains consensus
    pub require_consensus: bool,
}

impl Default for RansacConfig {
    fn default() -> Self {
        Self {
            tolerance: 3.0,
            trials: None,
            seed: 0,
            min_correspondences: 1,
            require_consensus: false,
        }
    }
}

/// Canvas allocation heuristic
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CanvasConfig {
    /// Width each additional image contributes, as a fraction of the first image
    pub overlap: f64,
    /// Canvas height as a multiple of the first image height
    pub height_scale: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            overlap: 0.5,
            height_scale: 1.2,
        }
    }
}

/// Complete stitching configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StitchConfig {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub name: Option<String>,
    pub n_threads: usize,
    pub projection: ProjectionParameters,
    pub features: FeatureConfig,
    pub matching: MatchConfig,
    pub ransac: RansacConfig,
    pub canvas: CanvasConfig,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            name: None,
            n_threads: num_cpus::get().max(1),
            projection: ProjectionParameters::default(),
            features: FeatureConfig::default(),
            matching: MatchConfig::default(),
            ransac: RansacConfig::default(),
            canvas: CanvasConfig::default(),
        }
    }
}

impl StitchConfig {
    /// Fewer keypoints and a looser FAST threshold for quick previews
    pub fn fast_preset() -> Self {
        Self {
            features: FeatureConfig {
                threshold: 30,
                patch_size: 15,
                max_keypoints: 500,
                nms_distance: 5.0,
                ..FeatureConfig::default()
            },
            name: Some("Fast".to_string()),
            ..Self::default()
        }
    }

    /// Denser keypoints with mutual-match filtering
    pub fn quality_preset() -> Self {
        Self {
            features: FeatureConfig {
                threshold: 15,
                max_keypoints: 5000,
                nms_distance: 2.0,
                cross_check: true,
                ..FeatureConfig::default()
            },
            name: Some("Quality".to_string()),
            ..Self::default()
        }
    }

    pub fn with_projection(mut self, mode: ProjectionMode, focal_length: f64) -> Self {
        self.projection = ProjectionParameters { mode, focal_length };
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "StitchConfig: {} f={}, FAST threshold={} arc={}, ratio={}, tolerance={}, trials={}, seed={}, canvas overlap={} height x{}",
            self.projection.mode,
            self.projection.focal_length,
            self.features.threshold,
            self.features.arc_length,
            self.matching.ratio,
            self.ransac.tolerance,
            self.ransac.trials.map_or_else(|| "auto".to_string(), |t| t.to_string()),
            self.ransac.seed,
            self.canvas.overlap,
            self.canvas.height_scale
        )
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> StitchResult<()> {
        let invalid = |msg: String| Err(StitchError::InvalidConfig(msg));

        if !(self.projection.focal_length.is_finite() && self.projection.focal_length > 0.0) {
            return invalid(format!("focal length must be positive, got {}", self.projection.focal_length));
        }
        if self.features.threshold == 0 || self.features.threshold > 127 {
            return invalid(format!("FAST threshold must be 1-127, got {}", self.features.threshold));
        }
        if !(9..=16).contains(&self.features.arc_length) {
            return invalid(format!("FAST arc length must be 9-16, got {}", self.features.arc_length));
        }
        if self.features.patch_size % 2 == 0 {
            return invalid(format!("patch size must be odd, got {}", self.features.patch_size));
        }
        if !(self.matching.ratio > 0.0) {
            return invalid(format!("match ratio must be positive, got {}", self.matching.ratio));
        }
        if !(self.matching.zero_score_reference > 0.0) || !(self.matching.max_reference_score > 0.0) {
            return invalid(format!(
                "reference scores must be positive, got {} and {}",
                self.matching.zero_score_reference, self.matching.max_reference_score
            ));
        }
        if !(self.ransac.tolerance > 0.0) {
            return invalid(format!("RANSAC tolerance must be positive, got {}", self.ransac.tolerance));
        }
        if self.ransac.trials == Some(0) {
            return invalid("RANSAC trial count must be at least 1".to_string());
        }
        if !(self.canvas.overlap >= 0.0) || !(self.canvas.height_scale >= 1.0) {
            return invalid(format!(
                "canvas overlap must be >= 0 and height scale >= 1, got {} and {}",
                self.canvas.overlap, self.canvas.height_scale
            ));
        }
        if self.n_threads == 0 {
            return invalid("thread count must be at least 1".to_string());
        }
        Ok(())
    }

    /// Save configuration to JSON file
    #[cfg(feature = "serde")]
    pub fn save_json<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load configuration from JSON file
    #[cfg(feature = "serde")]
    pub fn load_json<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Save configuration to TOML file
    #[cfg(feature = "serde")]
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Load configuration from TOML file
    #[cfg(feature = "serde")]
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load from a `.toml` or `.json` file, chosen by extension
    #[cfg(feature = "serde")]
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let is_toml = path
            .as_ref()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml { Self::load_toml(path) } else { Self::load_json(path) }
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "serde")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    #[cfg(feature = "serde")]
    pub fn from_toml(toml_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }
}
