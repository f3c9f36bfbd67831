// src/plot_object.rs

use crate::contour::{finite_range, Contour};
use crate::series::{Series, SpanAxis, SpanLine, Stroke};

/// What a registered handle points at.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotKind {
    Series(Series),
    Span(SpanLine),
    Contour(Contour),
}

/// A registered plotted object and the axes it was drawn into.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotObject {
    /// Position of the owning axes in the figure.
    pub axes: usize,
    pub kind: PlotKind,
}

/// Per-axis data extents; `None` where the object has no data on that axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Extents {
    pub x: Option<(f64, f64)>,
    pub y: Option<(f64, f64)>,
    pub z: Option<(f64, f64)>,
}

fn merge(a: Option<(f64, f64)>, b: Option<(f64, f64)>) -> Option<(f64, f64)> {
    match (a, b) {
        (Some((a0, a1)), Some((b0, b1))) => Some((a0.min(b0), a1.max(b1))),
        (a, None) => a,
        (None, b) => b,
    }
}

impl Extents {
    pub fn union(self, other: Extents) -> Extents {
        Extents {
            x: merge(self.x, other.x),
            y: merge(self.y, other.y),
            z: merge(self.z, other.z),
        }
    }
}

impl PlotObject {
    pub fn label(&self) -> Option<&str> {
        match &self.kind {
            PlotKind::Series(s) => s.label.as_deref(),
            PlotKind::Span(s) => s.label.as_deref(),
            PlotKind::Contour(c) => c.label.as_deref(),
        }
    }

    pub fn is_3d(&self) -> bool {
        match &self.kind {
            PlotKind::Series(s) => s.is_3d(),
            PlotKind::Span(s) => s.axis == SpanAxis::Z,
            PlotKind::Contour(c) => c.kind.is_3d(),
        }
    }

    pub fn as_series(&self) -> Option<&Series> {
        match &self.kind {
            PlotKind::Series(s) => Some(s),
            _ => None,
        }
    }

    /// Line style of series and span lines; contours are colored by level instead.
    pub(crate) fn stroke_mut(&mut self) -> Option<&mut Stroke> {
        match &mut self.kind {
            PlotKind::Series(s) => Some(&mut s.stroke),
            PlotKind::Span(s) => Some(&mut s.stroke),
            PlotKind::Contour(_) => None,
        }
    }

    /// Applies a recipe line width unless the caller pinned one.
    pub(crate) fn restyle_width(&mut self, width: f64) {
        match &mut self.kind {
            PlotKind::Series(s) if !s.stroke.explicit_width => s.stroke.line_width = width,
            PlotKind::Span(s) if !s.stroke.explicit_width => s.stroke.line_width = width,
            PlotKind::Contour(c) => c.line_width = width,
            _ => {}
        }
    }

    pub fn extents(&self) -> Extents {
        match &self.kind {
            PlotKind::Series(s) => Extents {
                x: finite_range(s.x.iter().copied()),
                y: finite_range(s.y.iter().copied()),
                z: finite_range(s.z.iter().copied()),
            },
            PlotKind::Span(s) => {
                let at = Some((s.value, s.value));
                match s.axis {
                    SpanAxis::X => Extents { x: at, ..Extents::default() },
                    SpanAxis::Y => Extents { y: at, ..Extents::default() },
                    SpanAxis::Z => Extents { z: at, ..Extents::default() },
                }
            }
            PlotKind::Contour(c) => Extents {
                x: finite_range(c.x.iter().copied()),
                y: finite_range(c.y.iter().copied()),
                z: if c.kind.is_3d() { c.value_range() } else { None },
            },
        }
    }
}
