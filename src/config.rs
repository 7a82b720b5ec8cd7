//! Run configuration: classification policy and output settings.
//!
//! Thresholds are domain policy, so every one of them can be set from the
//! command line or the environment.

use clap::Args;
use std::path::PathBuf;

use crate::abc::AbcThresholds;
use crate::error::{SegmentError, SegmentResult};
use crate::kraljic::DEFAULT_RISK_CUTOFF;

#[derive(Debug, Clone, Args)]
pub struct AnalysisArgs {
    /// Cumulative share up to which a product is tier A
    #[arg(long = "abc-a", env = "SEGMENT_ABC_A", default_value_t = 0.7, global = true)]
    pub abc_a: f64,

    /// Cumulative share up to which a product is tier B
    #[arg(long = "abc-b", env = "SEGMENT_ABC_B", default_value_t = 0.9, global = true)]
    pub abc_b: f64,

    /// Risk index at or above which a supplier counts as high risk
    #[arg(long, env = "SEGMENT_RISK_CUTOFF", default_value_t = DEFAULT_RISK_CUTOFF, global = true)]
    pub risk_cutoff: f64,

    /// Directory report files are written to
    #[arg(long, env = "SEGMENT_OUT_DIR", default_value = ".", global = true)]
    pub out_dir: PathBuf,

    /// Rows shown per table in the console preview
    #[arg(long, default_value_t = 5, global = true)]
    pub preview_rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub thresholds: AbcThresholds,
    pub risk_cutoff: f64,
    pub out_dir: PathBuf,
    pub preview_rows: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            thresholds: AbcThresholds::default(),
            risk_cutoff: DEFAULT_RISK_CUTOFF,
            out_dir: PathBuf::from("."),
            preview_rows: 5,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> SegmentResult<()> {
        self.thresholds.validate()?;
        if !self.risk_cutoff.is_finite() || self.risk_cutoff < 0.0 {
            return Err(SegmentError::invalid_input(
                "risk_cutoff",
                format!("expected a non-negative number, got {}", self.risk_cutoff),
            ));
        }
        Ok(())
    }

    pub fn out_path(&self, file_name: &str) -> PathBuf {
        self.out_dir.join(file_name)
    }
}

impl TryFrom<AnalysisArgs> for AnalysisConfig {
    type Error = SegmentError;

    fn try_from(args: AnalysisArgs) -> SegmentResult<Self> {
        let config = AnalysisConfig {
            thresholds: AbcThresholds::new(args.abc_a, args.abc_b)?,
            risk_cutoff: args.risk_cutoff,
            out_dir: args.out_dir,
            preview_rows: args.preview_rows,
        };
        config.validate()?;
        Ok(config)
    }
}
