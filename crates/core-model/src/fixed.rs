//! Deterministic reference implementation of [`TextLayout`].
//!
//! Every grapheme cluster advances by the same amount; no font is involved.
//! Good enough to exercise caret, selection and hit-testing logic with exact
//! expected coordinates.
//!
//! Rules:
//! * `\n`, `\r\n` and `\r` end the line (zero-width break glyph).
//! * Greedy wrapping: a cluster that would overflow the container width moves
//!   to the next line unless it is the first cluster on the line.
//! * Clusters starting with a Hebrew/Arabic code point are strong RTL, other
//!   alphabetic clusters strong LTR, everything else neutral. A neutral takes
//!   the direction of its strong neighbours when they agree, else the
//!   paragraph direction.
//! * Runs are ordered visually per line: RTL runs are reversed internally, and
//!   in an RTL paragraph the run order itself is reversed and the line is
//!   flushed right.

use crate::{LineMetrics, Rect, TextDirection, TextLayout};
use core_text::utf16_len;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone)]
struct Glyph {
    start: usize,
    end: usize,
    line: usize,
    x: f32,
    width: f32,
    direction: TextDirection,
    hard_break: bool,
}

#[derive(Debug, Clone)]
struct Line {
    start: usize,
    // Excludes the terminating break.
    end: usize,
    glyphs: std::ops::Range<usize>,
}

#[derive(Debug, Clone)]
pub struct FixedAdvanceLayout {
    advance: f32,
    line_height: f32,
    base: TextDirection,
    width: f32,
    len: usize,
    text: String,
    glyphs: Vec<Glyph>,
    lines: Vec<Line>,
}

fn strong_direction(cluster: &str) -> Option<TextDirection> {
    let c = cluster.chars().next()?;
    let rtl = ('\u{0590}'..='\u{08FF}').contains(&c)
        || ('\u{FB1D}'..='\u{FDFF}').contains(&c)
        || ('\u{FE70}'..='\u{FEFF}').contains(&c);
    if rtl {
        Some(TextDirection::Rtl)
    } else if c.is_alphabetic() {
        Some(TextDirection::Ltr)
    } else {
        None
    }
}

impl FixedAdvanceLayout {
    pub fn new(advance: f32, line_height: f32) -> Self {
        Self {
            advance,
            line_height,
            base: TextDirection::Ltr,
            width: 0.0,
            len: 0,
            text: String::new(),
            glyphs: Vec::new(),
            lines: vec![Line {
                start: 0,
                end: 0,
                glyphs: 0..0,
            }],
        }
    }

    pub fn with_direction(mut self, direction: TextDirection) -> Self {
        self.base = direction;
        self
    }

    fn line_y(&self, line: usize) -> f32 {
        line as f32 * self.line_height
    }

    fn glyph_index(&self, offset: usize) -> Option<usize> {
        if offset >= self.len {
            return None;
        }
        Some(self.glyphs.partition_point(|g| g.end <= offset))
    }

    fn tail_metrics(&self) -> LineMetrics {
        let (x, line, direction) = match self.glyphs.last() {
            Some(g) if !g.hard_break => {
                let edge = match g.direction {
                    TextDirection::Ltr => g.x + g.width,
                    TextDirection::Rtl => g.x,
                };
                (edge, g.line, g.direction)
            }
            _ => {
                let edge = match self.base {
                    TextDirection::Ltr => 0.0,
                    TextDirection::Rtl => self.width,
                };
                (edge, self.lines.len() - 1, self.base)
            }
        };
        LineMetrics {
            rect: Rect::new(x, self.line_y(line), 0.0, self.line_height),
            direction,
            line_height: self.line_height,
        }
    }

    fn resolve_directions(
        &mut self,
        strong: &[Option<TextDirection>],
        range: std::ops::Range<usize>,
    ) {
        for i in range.clone() {
            if let Some(d) = strong[i] {
                self.glyphs[i].direction = d;
                continue;
            }
            let prev = strong[range.start..i].iter().rev().find_map(|d| *d).unwrap_or(self.base);
            let next = strong[i + 1..range.end].iter().find_map(|d| *d).unwrap_or(self.base);
            self.glyphs[i].direction = if prev == next { prev } else { self.base };
        }
    }

    fn place_line(&mut self, range: std::ops::Range<usize>) {
        let mut runs: Vec<Vec<usize>> = Vec::new();
        for i in range.clone().filter(|i| !self.glyphs[*i].hard_break) {
            let dir = self.glyphs[i].direction;
            let same = runs
                .last()
                .is_some_and(|r| self.glyphs[r[0]].direction == dir);
            if same {
                if let Some(run) = runs.last_mut() {
                    run.push(i);
                }
            } else {
                runs.push(vec![i]);
            }
        }
        if self.base == TextDirection::Rtl {
            runs.reverse();
        }
        let count: usize = runs.iter().map(Vec::len).sum();
        let line_width = count as f32 * self.advance;
        let start_x = match self.base {
            TextDirection::Ltr => 0.0,
            TextDirection::Rtl => (self.width - line_width).max(0.0),
        };
        let mut x = start_x;
        for mut run in runs {
            if self.glyphs[run[0]].direction == TextDirection::Rtl {
                run.reverse();
            }
            for i in run {
                self.glyphs[i].x = x;
                x += self.advance;
            }
        }
        for i in range {
            if self.glyphs[i].hard_break {
                self.glyphs[i].x = match self.base {
                    TextDirection::Ltr => x,
                    TextDirection::Rtl => start_x,
                };
                self.glyphs[i].direction = self.base;
            }
        }
    }
}

impl TextLayout for FixedAdvanceLayout {
    fn layout(&mut self, text: &str, width: f32) {
        self.text = text.to_owned();
        self.width = width;
        self.glyphs.clear();
        self.lines.clear();

        let mut strong = Vec::new();
        let mut unit = 0usize;
        let mut line = 0usize;
        let mut used = 0.0f32;
        let mut line_start = 0usize;
        let mut first = 0usize;
        for g in text.graphemes(true) {
            let w = utf16_len(g);
            let hard = matches!(g, "\n" | "\r\n" | "\r");
            if !hard && used > 0.0 && used + self.advance > width {
                self.lines.push(Line {
                    start: line_start,
                    end: unit,
                    glyphs: first..self.glyphs.len(),
                });
                line += 1;
                used = 0.0;
                line_start = unit;
                first = self.glyphs.len();
            }
            self.glyphs.push(Glyph {
                start: unit,
                end: unit + w,
                line,
                x: 0.0,
                width: if hard { 0.0 } else { self.advance },
                direction: self.base,
                hard_break: hard,
            });
            strong.push(if hard { None } else { strong_direction(g) });
            unit += w;
            if hard {
                self.lines.push(Line {
                    start: line_start,
                    end: unit - w,
                    glyphs: first..self.glyphs.len(),
                });
                line += 1;
                used = 0.0;
                line_start = unit;
                first = self.glyphs.len();
            } else {
                used += self.advance;
            }
        }
        self.lines.push(Line {
            start: line_start,
            end: unit,
            glyphs: first..self.glyphs.len(),
        });
        self.len = unit;

        let ranges: Vec<_> = self.lines.iter().map(|l| l.glyphs.clone()).collect();
        for range in ranges {
            self.resolve_directions(&strong, range.clone());
            self.place_line(range);
        }
    }

    fn line_metrics(&self, offset: usize) -> Option<LineMetrics> {
        if offset > self.len {
            return None;
        }
        let Some(i) = self.glyph_index(offset) else {
            return Some(self.tail_metrics());
        };
        let g = &self.glyphs[i];
        Some(LineMetrics {
            rect: Rect::new(g.x, self.line_y(g.line), g.width, self.line_height),
            direction: g.direction,
            line_height: self.line_height,
        })
    }

    fn word_boundary(&self, offset: usize) -> (usize, usize) {
        let mut unit = 0usize;
        let mut last = None;
        for word in self.text.split_word_bounds() {
            let end = unit + utf16_len(word);
            if offset >= unit && offset < end {
                return (unit, end);
            }
            last = Some((unit, end));
            unit = end;
        }
        match last {
            Some(span) if offset >= self.len => span,
            _ => (offset, offset),
        }
    }

    fn line_boundary(&self, offset: usize) -> (usize, usize) {
        let line = match self.glyph_index(offset) {
            Some(i) => &self.lines[self.glyphs[i].line],
            None => &self.lines[self.lines.len() - 1],
        };
        (line.start, line.end)
    }

    fn offset_for_point(&self, x: f32, y: f32) -> usize {
        let li = if self.line_height > 0.0 && y > 0.0 {
            ((y / self.line_height) as usize).min(self.lines.len() - 1)
        } else {
            0
        };
        let line = &self.lines[li];
        let mut visual: Vec<&Glyph> = self.glyphs[line.glyphs.clone()]
            .iter()
            .filter(|g| !g.hard_break)
            .collect();
        visual.sort_by(|a, b| a.x.total_cmp(&b.x));
        let Some(rightmost) = visual.last() else {
            return line.start;
        };
        for g in &visual {
            if x < g.x + g.width {
                let left_half = x < g.x + g.width / 2.0;
                return match (g.direction, left_half) {
                    (TextDirection::Ltr, true) | (TextDirection::Rtl, false) => g.start,
                    _ => g.end,
                };
            }
        }
        match rightmost.direction {
            TextDirection::Ltr => rightmost.end,
            TextDirection::Rtl => rightmost.start,
        }
    }

    fn rects_for_range(&self, start: usize, end: usize) -> Vec<Rect> {
        let mut hits: Vec<&Glyph> = self
            .glyphs
            .iter()
            .filter(|g| !g.hard_break && g.start < end && g.end > start)
            .collect();
        hits.sort_by(|a, b| a.line.cmp(&b.line).then(a.x.total_cmp(&b.x)));
        let mut out: Vec<Rect> = Vec::new();
        for g in hits {
            let y = self.line_y(g.line);
            match out.last_mut() {
                Some(r) if r.y == y && (r.right() - g.x).abs() < f32::EPSILON => {
                    r.width += g.width;
                }
                _ => out.push(Rect::new(g.x, y, g.width, self.line_height)),
            }
        }
        out
    }

    fn width(&self) -> f32 {
        self.width
    }

    fn default_line_height(&self) -> f32 {
        self.line_height
    }

    fn paragraph_direction(&self) -> TextDirection {
        self.base
    }
}
