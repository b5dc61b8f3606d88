//! Post-classification annotation passes
//!

mod bfb;
mod double_minutes;
mod line_elements;

pub use line_elements::mark_line_clusters;

use itertools::Itertools;

use crate::analyser::SampleContext;
use crate::breakend_pairs::Foldbacks;
use crate::clustering::Cluster;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, strum::Display)]
pub enum ClusterAnnotation {
    #[strum(serialize = "DM")]
    DoubleMinute,

    #[strum(serialize = "BFB")]
    Bfb,
}

/// Run each enabled annotation pass on a classified cluster
pub fn annotate_cluster(ctx: &SampleContext, foldbacks: &Foldbacks, cluster: &mut Cluster) {
    if ctx.config.annotate_double_minutes {
        double_minutes::annotate_double_minute(ctx, cluster);
    }
    if ctx.config.annotate_bfb {
        bfb::annotate_bfb(ctx, foldbacks, cluster);
    }
}

/// Annotation labels joined for output, or "NONE"
pub fn annotation_label(cluster: &Cluster) -> String {
    if cluster.annotations.is_empty() {
        "NONE".to_string()
    } else {
        cluster.annotations.iter().join(";")
    }
}
