//! Objective tracking: current and best values, the iteration each best was
//! reached, saved orderings for every objective, and the optional Pareto
//! frontier between a pair of objectives.

use crate::crossings::CrossingCounter;
use crate::graph::{LayeredGraph, OrderSnapshot};
use crate::stretch;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    TotalCrossings,
    BottleneckCrossings,
    TotalStretch,
    BottleneckStretch,
    FavoredCrossings,
}

/// A best ordering together with the iteration that produced it.
#[derive(Debug, Clone)]
pub struct SavedOrder {
    pub order: OrderSnapshot,
    pub iteration: usize,
}

/// One tracked objective. `best` is monotone non-increasing; the first
/// iteration to reach a value wins and later ties are ignored.
#[derive(Debug, Clone)]
pub struct ObjectiveRecord<T> {
    pub current: T,
    pub best: T,
    pub best_iteration: usize,
    saved: Option<SavedOrder>,
    improved_last_update: bool,
    improved_since_check: bool,
}

impl<T: PartialOrd + Copy> ObjectiveRecord<T> {
    fn new(value: T, iteration: usize, g: &LayeredGraph) -> Self {
        Self {
            current: value,
            best: value,
            best_iteration: iteration,
            saved: Some(SavedOrder {
                order: g.save_order(),
                iteration,
            }),
            improved_last_update: true,
            improved_since_check: true,
        }
    }

    fn update(&mut self, value: T, iteration: usize, g: &LayeredGraph) {
        self.current = value;
        if value < self.best {
            self.best = value;
            self.best_iteration = iteration;
            self.saved = Some(SavedOrder {
                order: g.save_order(),
                iteration,
            });
            self.improved_last_update = true;
            self.improved_since_check = true;
        } else {
            self.improved_last_update = false;
        }
    }

    /// True iff the most recent update strictly lowered `best`.
    pub fn has_improved(&self) -> bool {
        self.improved_last_update
    }

    pub fn best_order(&self) -> Option<&SavedOrder> {
        self.saved.as_ref()
    }

    fn take_improved(&mut self) -> bool {
        std::mem::take(&mut self.improved_since_check)
    }
}

#[derive(Debug, Clone)]
pub struct Tracker {
    pub total_crossings: ObjectiveRecord<u64>,
    pub bottleneck_crossings: ObjectiveRecord<u64>,
    pub total_stretch: ObjectiveRecord<f64>,
    pub bottleneck_stretch: ObjectiveRecord<f64>,
    pub favored_crossings: ObjectiveRecord<u64>,
    pub pareto: ParetoFrontier,
}

impl Tracker {
    /// Captures the state of a freshly counted graph as iteration zero.
    pub fn new(
        g: &LayeredGraph,
        crossings: &CrossingCounter,
        favored: &[usize],
        pareto: ParetoMode,
    ) -> Self {
        let mut tracker = Self {
            total_crossings: ObjectiveRecord::new(crossings.total(), 0, g),
            bottleneck_crossings: ObjectiveRecord::new(crossings.max_edge_crossings(g), 0, g),
            total_stretch: ObjectiveRecord::new(stretch::total_stretch(g), 0, g),
            bottleneck_stretch: ObjectiveRecord::new(stretch::bottleneck_stretch(g), 0, g),
            favored_crossings: ObjectiveRecord::new(favored_crossings(g, favored), 0, g),
            pareto: ParetoFrontier::new(pareto),
        };
        tracker.pareto_update(g, crossings);
        tracker
    }

    /// Recomputes every current value (the counters must be fresh) and
    /// refreshes best values, best iterations, and saved orders.
    pub fn update_all(
        &mut self,
        g: &LayeredGraph,
        crossings: &CrossingCounter,
        favored: &[usize],
        iteration: usize,
    ) {
        self.total_crossings.update(crossings.total(), iteration, g);
        self.bottleneck_crossings
            .update(crossings.max_edge_crossings(g), iteration, g);
        self.total_stretch
            .update(stretch::total_stretch(g), iteration, g);
        self.bottleneck_stretch
            .update(stretch::bottleneck_stretch(g), iteration, g);
        self.favored_crossings
            .update(favored_crossings(g, favored), iteration, g);
    }

    pub fn has_improved(&self, objective: Objective) -> bool {
        match objective {
            Objective::TotalCrossings => self.total_crossings.has_improved(),
            Objective::BottleneckCrossings => self.bottleneck_crossings.has_improved(),
            Objective::TotalStretch => self.total_stretch.has_improved(),
            Objective::BottleneckStretch => self.bottleneck_stretch.has_improved(),
            Objective::FavoredCrossings => self.favored_crossings.has_improved(),
        }
    }

    pub fn best_order(&self, objective: Objective) -> Option<&SavedOrder> {
        match objective {
            Objective::TotalCrossings => self.total_crossings.best_order(),
            Objective::BottleneckCrossings => self.bottleneck_crossings.best_order(),
            Objective::TotalStretch => self.total_stretch.best_order(),
            Objective::BottleneckStretch => self.bottleneck_stretch.best_order(),
            Objective::FavoredCrossings => self.favored_crossings.best_order(),
        }
    }

    /// True iff any objective improved since the previous call; clears the
    /// accumulated flags. The termination predicate consults this once per
    /// pass.
    pub fn take_any_improved(&mut self) -> bool {
        // evaluate all of them so every flag is cleared
        let improved = [
            self.total_crossings.take_improved(),
            self.bottleneck_crossings.take_improved(),
            self.total_stretch.take_improved(),
            self.bottleneck_stretch.take_improved(),
            self.favored_crossings.take_improved(),
        ];
        improved.iter().any(|&b| b)
    }

    /// Like [`Tracker::take_any_improved`] but without clearing; used for
    /// the "still improving" notice when an iteration bound fires.
    pub fn any_improved_pending(&self) -> bool {
        self.total_crossings.improved_since_check
            || self.bottleneck_crossings.improved_since_check
            || self.total_stretch.improved_since_check
            || self.bottleneck_stretch.improved_since_check
            || self.favored_crossings.improved_since_check
    }

    /// Feeds the current point to the Pareto frontier, if a pair is being
    /// tracked.
    pub fn pareto_update(&mut self, g: &LayeredGraph, crossings: &CrossingCounter) {
        let point = match self.pareto.mode {
            ParetoMode::None => return,
            ParetoMode::BottleneckTotal => (
                crossings.max_edge_crossings(g) as f64,
                crossings.total() as f64,
            ),
            ParetoMode::StretchTotal => (stretch::total_stretch(g), crossings.total() as f64),
            ParetoMode::BottleneckStretch => (
                crossings.max_edge_crossings(g) as f64,
                stretch::total_stretch(g),
            ),
        };
        self.pareto.insert(point.0, point.1, g);
    }
}

fn favored_crossings(g: &LayeredGraph, favored: &[usize]) -> u64 {
    favored.iter().map(|&e| g.edges[e].crossings).sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParetoMode {
    #[default]
    None,
    /// x = bottleneck crossings, y = total crossings
    BottleneckTotal,
    /// x = total stretch, y = total crossings
    StretchTotal,
    /// x = bottleneck crossings, y = total stretch
    BottleneckStretch,
}

#[derive(Debug, Clone)]
pub struct ParetoPoint {
    pub x: f64,
    pub y: f64,
    pub order: OrderSnapshot,
}

/// Non-dominated `(x, y)` points, kept sorted by decreasing `x` (and hence
/// increasing `y`).
#[derive(Debug, Clone)]
pub struct ParetoFrontier {
    pub mode: ParetoMode,
    points: Vec<ParetoPoint>,
}

impl ParetoFrontier {
    pub fn new(mode: ParetoMode) -> Self {
        Self {
            mode,
            points: Vec::new(),
        }
    }

    pub fn points(&self) -> &[ParetoPoint] {
        &self.points
    }

    fn insert(&mut self, x: f64, y: f64, g: &LayeredGraph) {
        if self.points.iter().any(|p| p.x <= x && p.y <= y) {
            return;
        }
        self.points.retain(|p| !(p.x >= x && p.y >= y));
        let at = self
            .points
            .iter()
            .position(|p| p.x < x)
            .unwrap_or(self.points.len());
        self.points.insert(
            at,
            ParetoPoint {
                x,
                y,
                order: g.save_order(),
            },
        );
    }

    /// The `x1^y1;x2^y2;...` line consumed by the Pareto collection
    /// scripts, or `None` when no pair is tracked.
    pub fn report_line(&self) -> Option<String> {
        if self.mode == ParetoMode::None {
            return None;
        }
        let (x_integral, y_integral) = match self.mode {
            ParetoMode::None => unreachable!(),
            ParetoMode::BottleneckTotal => (true, true),
            ParetoMode::StretchTotal => (false, true),
            ParetoMode::BottleneckStretch => (true, false),
        };
        let format_value = |v: f64, integral: bool| {
            if integral {
                format!("{}", v as u64)
            } else {
                format!("{v:.2}")
            }
        };
        Some(
            self.points
                .iter()
                .map(|p| {
                    format!(
                        "{}^{}",
                        format_value(p.x, x_integral),
                        format_value(p.y, y_integral)
                    )
                })
                .collect::<Vec<_>>()
                .join(";"),
        )
    }
}

/// The four always-on objective values at one instant of the run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObjectiveSnapshot {
    pub total_crossings: u64,
    pub bottleneck_crossings: u64,
    pub total_stretch: f64,
    pub bottleneck_stretch: f64,
}

impl ObjectiveSnapshot {
    pub fn capture(g: &LayeredGraph, crossings: &CrossingCounter) -> Self {
        Self {
            total_crossings: crossings.total(),
            bottleneck_crossings: crossings.max_edge_crossings(g),
            total_stretch: stretch::total_stretch(g),
            bottleneck_stretch: stretch::bottleneck_stretch(g),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BestValue {
    pub value: f64,
    pub iteration: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphStats {
    pub name: String,
    pub nodes: usize,
    pub edges: usize,
    pub layers: usize,
    pub isolated_nodes: usize,
}

/// Everything the run produced, in one serializable record.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub graph: GraphStats,
    pub heuristic: Option<String>,
    pub preprocessor: Option<String>,
    pub beginning: ObjectiveSnapshot,
    pub after_preprocessing: Option<ObjectiveSnapshot>,
    pub after_heuristic: ObjectiveSnapshot,
    pub after_post_processing: Option<ObjectiveSnapshot>,
    pub best_total_crossings: BestValue,
    pub best_bottleneck_crossings: BestValue,
    pub best_total_stretch: BestValue,
    pub best_bottleneck_stretch: BestValue,
    pub iterations: usize,
    pub passes: usize,
    pub post_processing_iterations: usize,
    pub runtime_seconds: f64,
    pub pareto: Option<String>,
}
