//! Purchase funnel.

use serde::{Deserialize, Serialize};

use crate::aggregate::percent;
use crate::dataset::DatasetView;
use crate::records::FunnelStage;

/// One stage of the funnel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelStep {
    pub stage: FunnelStage,
    pub label: String,
    pub sessions: u64,
    /// Percentage of the previous stage that reached this one
    pub rate_from_previous: f64,
    /// Percentage of all sessions that reached this one
    pub rate_from_start: f64,
}

/// Counts sessions reaching each stage.
///
/// A session counts toward every stage up to its furthest one, so the
/// counts never increase along the funnel.
pub fn build_funnel(view: &DatasetView<'_>) -> Vec<FunnelStep> {
    let mut reached = [0u64; FunnelStage::ALL.len()];
    for session in &view.sessions {
        for (i, stage) in FunnelStage::ALL.iter().enumerate() {
            if session.furthest_stage >= *stage {
                reached[i] += 1;
            }
        }
    }

    let start = reached[0];
    let mut previous = start;
    FunnelStage::ALL
        .iter()
        .zip(reached)
        .map(|(stage, sessions)| {
            let step = FunnelStep {
                stage: *stage,
                label: stage.label().to_string(),
                sessions,
                rate_from_previous: percent(sessions as f64, previous as f64),
                rate_from_start: percent(sessions as f64, start as f64),
            };
            previous = sessions;
            step
        })
        .collect()
}

/// Whether step counts never increase.
pub fn is_non_increasing(steps: &[FunnelStep]) -> bool {
    steps.windows(2).all(|w| w[0].sessions >= w[1].sessions)
}
