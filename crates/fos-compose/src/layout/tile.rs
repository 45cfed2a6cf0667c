//! Tiles: the runs that fill one rectangular region of a line
//!
//! A tile is filled with more text than it can hold, then `break_into`
//! picks the best break point and moves everything after it into the next
//! tile. Once a line is settled the tile is re-filled with exactly its span
//! and aligned (tabs, justification, trailing whitespace).

use std::sync::Arc;

use super::cluster::{Cluster, Penalty};
use super::glyph::{Justification, StretchTable};
use super::metrics::{LineMetrics, PageSide};
use super::run::{Adjustment, Run};
use super::thread::ClusterThread;
use crate::font::FaceCache;
use crate::geometry::Rect;
use crate::host::TextSource;
use crate::shaping;
use crate::style::{Alignment, CharacterStyle, ParagraphStyle, TabAlignment, TabStop};
use crate::{ComposeError, Result};

/// Result of [`Tile::break_into`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakOutcome {
    /// Everything stays in the tile
    Fits,
    /// The tail moved into the rest tile
    Broken,
    /// No acceptable break exists; the tile keeps more than fits
    Overset,
    /// A mandatory break ended the tile; the tail starts the next line
    Forced,
}

/// Result of [`Tile::justify`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JustifyOutcome {
    Applied,
    /// Content already has the target width
    Unchanged,
    /// Nothing can absorb the remaining width; the tile keeps its natural widths
    Skipped,
}

/// Cubic badness of stretching by `stretch` when `total` is available
pub fn badness(stretch: f32, total: f32) -> f32 {
    if stretch == 0.0 {
        return 0.0;
    }
    if total <= 0.0 {
        return f32::INFINITY;
    }
    (stretch.abs() / total).powi(3)
}

/// Demerits of a break: badness squared plus the signed squared penalty
pub fn demerits(badness: f32, penalty: Penalty) -> f32 {
    badness * badness + penalty.signed_square()
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    demerits: f32,
}

fn improve(slot: &mut Option<Candidate>, index: usize, demerits: f32) {
    match slot {
        Some(c) if c.demerits < demerits => {}
        _ => *slot = Some(Candidate { index, demerits }),
    }
}

/// Horizontal slice of a line that holds text
#[derive(Debug, Clone, Default)]
pub struct Tile {
    /// Area the tile may fill, in frame coordinates
    pub region: Rect,
    thread: ClusterThread,
}

impl Tile {
    /// Empty tile covering `region`
    pub fn new(region: Rect) -> Self {
        Self {
            region,
            thread: ClusterThread::new(),
        }
    }

    /// Clusters and runs held by this tile
    pub fn thread(&self) -> &ClusterThread {
        &self.thread
    }

    /// Mutable cluster thread
    pub fn thread_mut(&mut self) -> &mut ClusterThread {
        &mut self.thread
    }

    /// All clusters, in text order
    pub fn clusters(&self) -> &[Cluster] {
        self.thread.clusters()
    }

    /// All runs, in text order
    pub fn runs(&self) -> &[Run] {
        self.thread.runs()
    }

    /// Number of clusters
    pub fn len(&self) -> usize {
        self.thread.len()
    }

    /// Whether the tile holds no clusters
    pub fn is_empty(&self) -> bool {
        self.thread.is_empty()
    }

    /// Characters held by this tile
    pub fn span(&self) -> usize {
        self.thread.span()
    }

    /// Current width of all clusters
    pub fn width(&self) -> f32 {
        self.thread.width()
    }

    /// Shape `span` characters starting at `offset` into this tile
    ///
    /// Stops early when the source runs out of text. Every run gets the
    /// style's desired word and letter spacing.
    pub fn fill_by_span(
        &mut self,
        source: &dyn TextSource,
        faces: &mut FaceCache,
        offset: usize,
        span: usize,
    ) -> Result<()> {
        let end = offset + span;
        let mut at = offset;

        while at < end {
            let Some(chunk) = source.text_at(at) else {
                return Ok(());
            };
            let style = chunk.style.ok_or(ComposeError::MissingStyle(at))?;
            let mut text = take_chars(chunk.text, end - at);

            while !text.is_empty() {
                let shaped = shaping::create_run(faces, source, &style, text, at);
                let consumed = shaped.consumed;
                if consumed == 0 {
                    return Err(ComposeError::ShapingFailed(format!(
                        "nothing consumed at offset {}",
                        at
                    )));
                }

                if let Some(index) = self.thread.push_run(Arc::clone(&style), shaped) {
                    let (run, clusters) = self.thread.run_parts_mut(index);
                    run.apply_desired_widths(clusters);
                }

                at += consumed;
                text = skip_chars(text, consumed);
            }
        }

        Ok(())
    }

    /// Find the best break and move what follows it into `rest`
    ///
    /// Candidates with badness below 1 compete on demerits. A second
    /// candidate scored against the width divided by `fallback_factor`
    /// is used when no regular candidate exists. A mandatory break that
    /// fits ends the tile even when more text would fit after it.
    pub fn break_into(
        &mut self,
        rest: &mut Tile,
        para: &ParagraphStyle,
        fallback_factor: f32,
    ) -> BreakOutcome {
        let len = self.thread.len();
        if len == 0 {
            return BreakOutcome::Fits;
        }

        let ratios = StretchTable::ratios(para);
        let clusters = self.thread.clusters();
        let factor = if fallback_factor > 0.0 { fallback_factor } else { 1.0 };

        let mut totals = StretchTable::default();
        let mut pending = StretchTable::default();
        let mut advance = 0.0;
        let mut pending_width = 0.0;
        let mut desired = self.region.width;

        let mut best: Option<Candidate> = None;
        let mut fallback: Option<Candidate> = None;
        let mut forced: Option<usize> = None;
        let mut overflowed = false;

        'walk: for run in self.thread.runs() {
            desired = self.region.width + run.style.altered_letter_space;
            let run_clusters = &clusters[run.range()];

            if run.style.no_break {
                advance += pending_width + Run::width(run_clusters);
                pending_width = 0.0;
                totals.merge(&pending);
                pending = StretchTable::default();
                Run::calculate_stretch(run_clusters, &ratios, &mut totals);
                continue;
            }

            for (k, cl) in run_clusters.iter().enumerate() {
                let index = run.range().start + k;

                if cl.is_whitespace() {
                    pending_width += cl.width();
                    cl.calculate_stretch(&ratios, &mut pending);
                } else {
                    advance += pending_width + cl.width();
                    pending_width = 0.0;
                    totals.merge(&pending);
                    pending = StretchTable::default();
                    cl.calculate_stretch(&ratios, &mut totals);
                }

                let stretch = desired - advance;
                let b = badness(stretch, totals.total(stretch > 0.0));

                if stretch < 0.0 {
                    overflowed = true;
                    if best.is_none() {
                        best = fallback;
                    }
                }

                if cl.penalty.is_never() {
                    continue;
                }

                if cl.penalty.is_mandatory() && index + 1 < len {
                    if stretch >= 0.0 {
                        forced = Some(index);
                    }
                    break 'walk;
                }

                if b < 1.0 {
                    improve(&mut best, index, demerits(b, cl.penalty));
                }
                if stretch > 0.0 {
                    let fb = (stretch / (desired / factor)).powi(3);
                    if fb < 1.0 {
                        improve(&mut fallback, index, demerits(fb, cl.penalty));
                    }
                }

                if stretch < 0.0 && b >= 1.0 {
                    break 'walk;
                }
            }
        }

        if advance > desired {
            overflowed = true;
        }

        let (chosen, outcome) = match (forced, best.or(fallback)) {
            (Some(index), _) => (index, BreakOutcome::Forced),
            (None, _) if !overflowed => return BreakOutcome::Fits,
            (None, Some(c)) => (c.index, BreakOutcome::Broken),
            (None, None) => {
                let index = clusters
                    .iter()
                    .position(|cl| !cl.penalty.is_never())
                    .unwrap_or(len - 1);
                (index, BreakOutcome::Overset)
            }
        };

        let mut split_at = chosen + 1;
        if forced.is_none() {
            while split_at < len && clusters[split_at].is_whitespace() {
                split_at += 1;
            }
        }

        tracing::trace!(
            split_at,
            len,
            forced = forced.is_some(),
            ?outcome,
            "break_into"
        );

        if split_at >= len {
            return if outcome == BreakOutcome::Overset {
                BreakOutcome::Overset
            } else {
                BreakOutcome::Fits
            };
        }

        let mut tail = self.thread.split_off(split_at);
        tail.append(std::mem::take(&mut rest.thread));
        rest.thread = tail;
        outcome
    }

    /// Distribute the difference between region and content width
    ///
    /// Classes absorb the difference in priority order, each within its
    /// bounds. A positive remainder goes to word spaces, else letters;
    /// with neither the tile is left alone.
    pub fn justify(&mut self, para: &ParagraphStyle) -> JustifyOutcome {
        let tw = self.thread.trailing_whitespace();
        let content = self.thread.content_width();
        let mut stretch = self.region.width - content;
        if tw == 0 || stretch == 0.0 {
            return JustifyOutcome::Unchanged;
        }

        let ratios = StretchTable::ratios(para);
        let clusters = self.thread.clusters();
        let mut totals = StretchTable::default();
        Run::calculate_stretch(&clusters[..tw], &ratios, &mut totals);
        for g in clusters[tw..].iter().flat_map(Cluster::glyphs) {
            if g.class == Justification::Fill {
                totals.accumulate(Justification::Fill, g.width, &ratios);
            }
        }

        // The final letter takes no letter spacing
        let last_letter = clusters[..tw].iter().enumerate().rev().find_map(|(ci, cl)| {
            cl.glyphs()
                .iter()
                .rposition(|g| g.class == Justification::Letter)
                .map(|gi| (ci, gi, cl.glyphs()[gi].width))
        });
        if let Some((_, _, width)) = last_letter {
            let ratio = *ratios.class(Justification::Letter);
            let letters = totals.class_mut(Justification::Letter);
            letters.min -= width * ratio.min;
            letters.max -= width * ratio.max;
            letters.num = letters.num.saturating_sub(1);
        }

        let shrinking = stretch < 0.0;
        let mut alloc = [0.0f32; 4];
        for (slot, class) in alloc.iter_mut().zip(Justification::PRIORITY) {
            let capacity = totals.class(class);
            *slot = if shrinking {
                (-capacity.min).max(stretch)
            } else {
                capacity.max.min(stretch)
            };
            stretch -= *slot;
        }

        if stretch > 0.0 {
            if totals.class(Justification::Space).num > 0 {
                alloc[1] += stretch;
            } else if totals.class(Justification::Letter).num > 0 {
                alloc[2] += stretch;
            } else {
                tracing::debug!(
                    remaining = stretch,
                    "justification skipped, no stretchable glyphs"
                );
                return JustifyOutcome::Skipped;
            }
        }

        let per_unit = |amount: f32, class: Justification| {
            let num = totals.class(class).num;
            if num == 0 { 0.0 } else { amount / num as f32 }
        };
        let adj = Adjustment {
            fill: per_unit(alloc[0], Justification::Fill),
            word: per_unit(alloc[1], Justification::Space),
            letter: per_unit(alloc[2], Justification::Letter),
            glyph_scale: if content > 0.0 { alloc[3] / content } else { 0.0 },
        };

        for i in 0..self.thread.runs().len() {
            let (run, run_clusters) = self.thread.run_parts_mut(i);
            let range = run.range();
            let local = tw.clamp(range.start, range.end) - range.start;
            let (body, trailing) = run_clusters.split_at_mut(local);
            run.adjust_widths(body, &adj);
            run.adjust_widths(trailing, &adj.fill_only());
        }

        if let Some((ci, gi, _)) = last_letter {
            if let Some(g) = self.thread.clusters_mut()[ci].glyphs_mut().get_mut(gi) {
                g.kern(-adj.letter);
            }
        }

        JustifyOutcome::Applied
    }

    /// Size tab glue so the text after each tab meets its stop
    ///
    /// Stops are measured from the tile's left edge. The end of the line
    /// acts as a final stop for the last tab.
    pub fn apply_tab_widths(&mut self, para: &ParagraphStyle) {
        let tw = self.thread.trailing_whitespace();
        let limit = self.region.width;

        let runs: Vec<(std::ops::Range<usize>, Arc<CharacterStyle>)> = self
            .thread
            .runs()
            .iter()
            .map(|r| (r.range(), Arc::clone(&r.style)))
            .collect();

        let mut pos = 0.0;
        let mut width = 0.0;
        let mut align_width = f32::INFINITY;
        let mut tab: Option<usize> = None;
        let mut stop = TabStop::new(0.0, TabAlignment::Left);

        'runs: for (range, style) in runs {
            for i in range {
                if i >= tw || pos >= limit {
                    break 'runs;
                }

                let cl = &self.thread.clusters()[i];
                if cl.is_tab() {
                    width += self.process_tab(tab, pos, &stop, width, align_width);
                    pos += width;
                    stop = para.tab_stop_after(pos);
                    tab = Some(i);
                    width = 0.0;
                    align_width = f32::INFINITY;
                } else {
                    if width < align_width
                        && style
                            .host_font
                            .glyph_id(stop.align_char)
                            .is_some_and(|gid| cl.is_glyph(gid))
                    {
                        align_width = width;
                    }
                    width += cl.width();
                }
            }
        }

        self.process_tab(tab, pos, &stop, width, align_width);
    }

    fn process_tab(
        &mut self,
        tab: Option<usize>,
        pos: f32,
        stop: &TabStop,
        width: f32,
        align_width: f32,
    ) -> f32 {
        let Some(index) = tab else {
            return 0.0;
        };

        let mut tab_width = stop.position - pos;
        if tab_width > 0.0 {
            tab_width -= match stop.alignment {
                TabAlignment::Left => 0.0,
                TabAlignment::Center => (width / 2.0).min(tab_width),
                TabAlignment::Right => width.min(tab_width),
                TabAlignment::Char => align_width.min(width).min(tab_width),
            };
        }

        match self.thread.clusters_mut()[index].front_mut() {
            Some(g) => {
                g.kern(tab_width.max(0.0) - g.advance());
                g.advance()
            }
            None => 0.0,
        }
    }

    /// Final alignment of a settled tile, returns the x offset of its content
    ///
    /// `ends_paragraph` marks the paragraph's last line, which justify-left,
    /// justify-center and justify-right leave unjustified unless it has to
    /// shrink.
    pub fn align_text(
        &mut self,
        para: &ParagraphStyle,
        page_side: PageSide,
        ends_paragraph: bool,
    ) -> f32 {
        let Some(last) = self.thread.clusters().last() else {
            return 0.0;
        };
        let last_line = ends_paragraph || last.penalty.is_mandatory();

        let tracking = self
            .thread
            .runs()
            .last()
            .map(|r| r.style.altered_letter_space)
            .unwrap_or(0.0);
        self.thread.trim_trailing_whitespace(tracking);
        self.apply_tab_widths(para);

        let mut ws = self.region.width - self.thread.content_width();
        let mut offset = 0.0;

        let justify = match para.alignment {
            Alignment::JustifyFull => true,
            Alignment::JustifyLeft | Alignment::JustifyCenter | Alignment::JustifyRight => {
                !last_line || ws < 0.0
            }
            _ => false,
        };

        if justify {
            if self.justify(para) != JustifyOutcome::Skipped {
                ws = 0.0;
            }
        } else {
            let right = match para.alignment {
                Alignment::Right | Alignment::JustifyRight => true,
                Alignment::ToBinding => page_side == PageSide::Left,
                Alignment::AwayBinding => page_side == PageSide::Right,
                _ => false,
            };

            if right {
                offset = ws;
                ws = 0.0;
            } else if matches!(para.alignment, Alignment::Center | Alignment::JustifyCenter) {
                ws /= 2.0;
                offset = ws;
            }
        }

        self.thread.fit_trailing_whitespace(ws);
        offset
    }

    /// Keep the first `count` clusters as a drop cap enlarged `lines` times
    ///
    /// The remainder moves to `rest`, whose left edge is pushed past the
    /// drop cap. Returns the drop cap width.
    pub fn break_drop_caps(&mut self, lines: usize, count: usize, rest: &mut Tile) -> f32 {
        let at = count.min(self.thread.len());
        let mut tail = self.thread.split_off(at);
        tail.append(std::mem::take(&mut rest.thread));
        rest.thread = tail;

        self.scale(lines as f32);

        let width = self.thread.width();
        self.region.width = width;
        let left = rest.region.left().max(self.region.right());
        rest.region.set_left(left);
        width
    }

    /// Enlarge every run by `factor`
    pub fn scale(&mut self, factor: f32) {
        for i in 0..self.thread.runs().len() {
            let (run, clusters) = self.thread.run_parts_mut(i);
            run.scale(clusters, factor);
        }
    }

    /// Fold every style used by this tile into `metrics`
    pub fn update_line_metrics(&self, metrics: &mut LineMetrics) {
        for run in self.thread.runs() {
            metrics.add_style(&run.style);
            if run.is_inline_object() {
                metrics.ascent = metrics.ascent.max(run.height);
                metrics.leading = metrics.leading.max(run.height);
            }
        }
    }
}

/// Prefix of `text` holding at most `n` characters
fn take_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((at, _)) => &text[..at],
        None => text,
    }
}

/// `text` without its first `n` characters
fn skip_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((at, _)) => &text[at..],
        None => "",
    }
}
