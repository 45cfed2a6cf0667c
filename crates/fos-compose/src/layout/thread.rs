//! Cluster thread: a flat cluster arena overlaid by runs
//!
//! A cluster position is a plain index into the arena; each [`Run`] owns a
//! contiguous index range. Splitting and joining runs is range arithmetic.

use std::sync::Arc;

use super::cluster::{Cluster, Penalty};
use super::glyph::Justification;
use super::run::{Run, RunKind};
use crate::shaping::ShapedRun;
use crate::style::CharacterStyle;

/// Ordered clusters grouped into runs
#[derive(Debug, Clone, Default)]
pub struct ClusterThread {
    clusters: Vec<Cluster>,
    runs: Vec<Run>,
}

impl ClusterThread {
    /// Empty thread
    pub fn new() -> Self {
        Self::default()
    }

    /// All clusters, in text order
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// All clusters, mutably
    pub fn clusters_mut(&mut self) -> &mut [Cluster] {
        &mut self.clusters
    }

    /// All runs, in text order
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Clusters owned by run `index`
    pub fn run_clusters(&self, index: usize) -> &[Cluster] {
        &self.clusters[self.runs[index].range()]
    }

    /// A run together with its clusters, mutably
    pub(crate) fn run_parts_mut(&mut self, index: usize) -> (&mut Run, &mut [Cluster]) {
        let run = &mut self.runs[index];
        let clusters = &mut self.clusters[run.range.clone()];
        (run, clusters)
    }

    /// Run owning the cluster at `cluster`
    pub fn run_index_of(&self, cluster: usize) -> Option<usize> {
        self.runs.iter().position(|r| r.range.contains(&cluster))
    }

    /// Number of clusters
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// Whether the thread holds no clusters
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Characters covered by all clusters
    pub fn span(&self) -> usize {
        Run::span(&self.clusters)
    }

    /// Summed width of all clusters
    pub fn width(&self) -> f32 {
        Run::width(&self.clusters)
    }

    /// Append the output of one shaping call as a new run
    ///
    /// Returns the new run's index, or `None` when nothing was shaped.
    pub fn push_run(&mut self, style: Arc<CharacterStyle>, shaped: ShapedRun) -> Option<usize> {
        if shaped.clusters.is_empty() {
            return None;
        }

        if shaped.forbid_break_before {
            if let Some(prev) = self.clusters.last_mut() {
                prev.penalty = Penalty::NEVER;
            }
        }

        let start = self.clusters.len();
        self.clusters.extend(shaped.clusters);

        let mut run = Run::new(style, shaped.kind, start..self.clusters.len());
        if let Some(height) = shaped.height {
            run.height = height;
        }
        self.runs.push(run);
        Some(self.runs.len() - 1)
    }

    /// Append clusters as a run without going through a shaper
    pub fn push_clusters(
        &mut self,
        style: Arc<CharacterStyle>,
        kind: RunKind,
        clusters: Vec<Cluster>,
    ) {
        let start = self.clusters.len();
        self.clusters.extend(clusters);
        if self.clusters.len() > start {
            self.runs
                .push(Run::new(style, kind, start..self.clusters.len()));
        }
    }

    /// Index of the first cluster of the trailing whitespace
    ///
    /// Equals `len()` when the thread does not end in whitespace and `0`
    /// when it is all whitespace.
    pub fn trailing_whitespace(&self) -> usize {
        self.clusters
            .iter()
            .rposition(|cl| !cl.is_whitespace())
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    /// Width up to the trailing whitespace
    pub fn content_width(&self) -> f32 {
        Run::width(&self.clusters[..self.trailing_whitespace()])
    }

    /// Move clusters `at..` and their runs into a new thread
    ///
    /// A run straddling `at` is split in two; both halves keep its style.
    pub fn split_off(&mut self, at: usize) -> ClusterThread {
        if at >= self.clusters.len() {
            return ClusterThread::new();
        }

        let clusters = self.clusters.split_off(at);
        let mut runs = Vec::new();
        let mut keep = Vec::with_capacity(self.runs.len());

        for run in self.runs.drain(..) {
            if run.range.end <= at {
                keep.push(run);
            } else if run.range.start >= at {
                let mut tail = run;
                tail.range = tail.range.start - at..tail.range.end - at;
                runs.push(tail);
            } else {
                let mut head = run.clone();
                head.range.end = at;
                let mut tail = run;
                tail.range = 0..tail.range.end - at;
                keep.push(head);
                runs.push(tail);
            }
        }

        self.runs = keep;
        ClusterThread { clusters, runs }
    }

    /// Move every cluster and run of `other` onto the end of this thread
    pub fn append(&mut self, other: ClusterThread) {
        let offset = self.clusters.len();
        self.clusters.extend(other.clusters);
        self.runs.extend(other.runs.into_iter().map(|mut run| {
            run.range = run.range.start + offset..run.range.end + offset;
            run
        }));
    }

    /// Join adjacent runs that can share output
    pub fn merge_runs(&mut self) {
        let mut merged: Vec<Run> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            if let Some(last) = merged.last_mut() {
                if last.range.end == run.range.start && last.joinable(&run) {
                    last.range.end = run.range.end;
                    last.height = last.height.max(run.height);
                    continue;
                }
            }
            merged.push(run);
        }
        self.runs = merged;
    }

    /// Move tracking off the last visible glyph onto the trailing whitespace
    pub fn trim_trailing_whitespace(&mut self, tracking: f32) {
        if tracking == 0.0 {
            return;
        }

        let tw = self.trailing_whitespace();
        if tw == 0 || !Run::untrack(&mut self.clusters[tw - 1], tracking) {
            return;
        }

        if let Some(g) = self.clusters.get_mut(tw).and_then(Cluster::front_mut) {
            g.kern(tracking);
        }
    }

    /// Shrink trailing whitespace so it fits into `margin`
    ///
    /// Flush glue keeps the width justification gave it.
    pub fn fit_trailing_whitespace(&mut self, margin: f32) {
        let tw = self.trailing_whitespace();
        let count = self.clusters.len() - tw;
        if count == 0 {
            return;
        }

        let per_cluster = margin.max(0.0) / count as f32;
        for cl in &mut self.clusters[tw..] {
            if let Some(g) = cl.front_mut() {
                if g.class != Justification::Fill {
                    let excess = per_cluster - g.advance();
                    g.kern(excess.min(0.0));
                }
            }
        }
    }
}
