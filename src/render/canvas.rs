//! Character-grid plotting of [`Chart`] descriptions.
//!
//! Every series shares one pair of axis ranges. Cells remember which series
//! drew them last so the glyph and colour can be chosen at print time.

use colored::{Color, Colorize};

use crate::charts::{Chart, ChartKind};

/// Glyphs cycled across series of line and scatter charts.
const GLYPHS: [char; 6] = ['*', 'o', '+', 'x', '#', '@'];
const BAR_GLYPH: char = '█';
const COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::Red,
    Color::Blue,
];

/// Width of the y-axis label gutter.
const GUTTER: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Range {
    min: f64,
    max: f64,
}

impl Range {
    fn of(values: impl Iterator<Item = f64>) -> Option<Self> {
        values.fold(None, |acc, v| match acc {
            None => Some(Range { min: v, max: v }),
            Some(r) => Some(Range {
                min: r.min.min(v),
                max: r.max.max(v),
            }),
        })
    }

    /// Map `v` onto `0..cells`.
    fn scale(&self, v: f64, cells: usize) -> usize {
        let last = cells.saturating_sub(1);
        let span = self.max - self.min;
        if span <= f64::EPSILON {
            return last / 2;
        }
        let pos = ((v - self.min) / span * last as f64).round();
        (pos.max(0.0) as usize).min(last)
    }
}

struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Option<usize>>,
}

impl Grid {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    fn put(&mut self, col: usize, row: usize, series: usize) {
        if col < self.width && row < self.height {
            self.cells[row * self.width + col] = Some(series);
        }
    }

    fn get(&self, col: usize, row: usize) -> Option<usize> {
        self.cells[row * self.width + col]
    }

    /// Straight segment between two cells.
    fn segment(&mut self, from: (usize, usize), to: (usize, usize), series: usize) {
        let (c0, r0) = (from.0 as i64, from.1 as i64);
        let (c1, r1) = (to.0 as i64, to.1 as i64);
        let steps = (c1 - c0).abs().max((r1 - r0).abs()).max(1);
        for i in 0..=steps {
            let c = c0 + (c1 - c0) * i / steps;
            let r = r0 + (r1 - r0) * i / steps;
            self.put(c as usize, r as usize, series);
        }
    }
}

/// Render one chart as a block of text lines.
pub fn plot(chart: &Chart, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(3);
    let mut out = String::new();

    out.push_str(&format!("{}\n", chart.title.bold()));

    let points = chart.series.iter().flat_map(|s| s.points.iter());
    let (Some(x_range), Some(y_range)) = (
        Range::of(points.clone().map(|p| p.0)),
        Range::of(points.map(|p| p.1)),
    ) else {
        out.push_str(&format!("  {}\n", "(no data)".dimmed()));
        return out;
    };

    // Bars grow from zero.
    let y_range = if chart.kind == ChartKind::Bar {
        Range {
            min: y_range.min.min(0.0),
            max: y_range.max.max(0.0),
        }
    } else {
        y_range
    };

    let gutter = GUTTER;
    let mut grid = Grid::new(width, height);
    let to_cell = |(x, y): (f64, f64)| {
        (
            x_range.scale(x, width),
            height - 1 - y_range.scale(y, height),
        )
    };

    for (idx, series) in chart.series.iter().enumerate() {
        match chart.kind {
            ChartKind::Line => {
                let mut prev = None;
                for &p in &series.points {
                    let cell = to_cell(p);
                    match prev {
                        Some(from) => grid.segment(from, cell, idx),
                        None => grid.put(cell.0, cell.1, idx),
                    }
                    prev = Some(cell);
                }
            }
            ChartKind::Bar => {
                let base = height - 1 - y_range.scale(0.0, height);
                for &p in &series.points {
                    let (col, row) = to_cell(p);
                    let (top, bottom) = if row <= base { (row, base) } else { (base, row) };
                    for r in top..=bottom {
                        grid.put(col, r, idx);
                    }
                }
            }
            ChartKind::Scatter => {
                for &p in &series.points {
                    let (col, row) = to_cell(p);
                    grid.put(col, row, idx);
                }
            }
        }
    }

    out.push_str(&format!("  {}\n", chart.y_label.dimmed()));
    for row in 0..height {
        let label = if row == 0 {
            format_value(y_range.max)
        } else if row == height - 1 {
            format_value(y_range.min)
        } else {
            String::new()
        };
        out.push_str(&format!("{label:>gutter$} |"));
        for col in 0..width {
            match grid.get(col, row) {
                Some(idx) => {
                    let glyph = if chart.kind == ChartKind::Bar {
                        BAR_GLYPH
                    } else {
                        GLYPHS[idx % GLYPHS.len()]
                    };
                    out.push_str(&glyph.to_string().color(COLORS[idx % COLORS.len()]).to_string());
                }
                None => out.push(' '),
            }
        }
        out.push('\n');
    }

    out.push_str(&format!("{:>gutter$} +{}\n", "", "-".repeat(width)));
    let lo = format_value(x_range.min);
    let hi = format_value(x_range.max);
    let pad = width.saturating_sub(lo.len() + hi.len());
    out.push_str(&format!("{:>gutter$}  {lo}{}{hi}\n", "", " ".repeat(pad)));
    out.push_str(&format!("{:>gutter$}  {}\n", "", chart.x_label.dimmed()));

    if chart.series.len() > 1 || chart.kind != ChartKind::Bar {
        for (idx, series) in chart.series.iter().enumerate() {
            let glyph = if chart.kind == ChartKind::Bar {
                BAR_GLYPH
            } else {
                GLYPHS[idx % GLYPHS.len()]
            };
            out.push_str(&format!(
                "  {} {}\n",
                glyph.to_string().color(COLORS[idx % COLORS.len()]),
                series.name
            ));
        }
    }

    out
}

/// Compact axis number: integers plain, fractions to two places.
pub fn format_value(v: f64) -> String {
    if v.fract() == 0.0 || v.abs() >= 1000.0 {
        format!("{v:.0}")
    } else {
        let s = format!("{v:.2}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
