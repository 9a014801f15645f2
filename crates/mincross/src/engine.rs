//! The engine value that bundles the graph, the counters, the objective
//! tracker, and the run configuration. Drivers in [`crate::heuristics`]
//! borrow it; nothing here touches process-wide state.

use crate::crossings::CrossingCounter;
use crate::error::Result;
use crate::graph::LayeredGraph;
use crate::sorting::{self, WeightCarry};
use crate::stats::{
    GraphStats, Objective, ObjectiveSnapshot, ParetoMode, RunReport, Tracker,
};
use crate::stretch;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use std::str::FromStr;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heuristic {
    Median,
    Barycenter,
    ModBarycenter,
    MaxCrossingsNode,
    Sifting,
    MaxCrossingsEdge,
    MaxCrossingsEdgeWithSifting,
    MaxStretchEdge,
}

impl Heuristic {
    pub fn as_str(self) -> &'static str {
        match self {
            Heuristic::Median => "median",
            Heuristic::Barycenter => "bary",
            Heuristic::ModBarycenter => "mod_bary",
            Heuristic::MaxCrossingsNode => "mcn",
            Heuristic::Sifting => "sifting",
            Heuristic::MaxCrossingsEdge => "mce",
            Heuristic::MaxCrossingsEdgeWithSifting => "mce_s",
            Heuristic::MaxStretchEdge => "mse",
        }
    }
}

impl FromStr for Heuristic {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s {
            "median" => Ok(Heuristic::Median),
            "bary" => Ok(Heuristic::Barycenter),
            "mod_bary" => Ok(Heuristic::ModBarycenter),
            "mcn" => Ok(Heuristic::MaxCrossingsNode),
            "sifting" => Ok(Heuristic::Sifting),
            "mce" => Ok(Heuristic::MaxCrossingsEdge),
            "mce_s" => Ok(Heuristic::MaxCrossingsEdgeWithSifting),
            "mse" => Ok(Heuristic::MaxStretchEdge),
            other => Err(format!("unknown heuristic '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preprocessor {
    Bfs,
    Dfs,
    Mds,
}

impl Preprocessor {
    pub fn as_str(self) -> &'static str {
        match self {
            Preprocessor::Bfs => "bfs",
            Preprocessor::Dfs => "dfs",
            Preprocessor::Mds => "mds",
        }
    }
}

impl FromStr for Preprocessor {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s {
            "bfs" => Ok(Preprocessor::Bfs),
            "dfs" => Ok(Preprocessor::Dfs),
            "mds" => Ok(Preprocessor::Mds),
            other => Err(format!("unknown preprocessor '{other}'")),
        }
    }
}

/// How a pass of the maximum-crossings-edge heuristic decides which
/// endpoints to sift and when to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MceOption {
    /// Sift each not-yet-fixed endpoint; the pass ends once every node is
    /// fixed.
    #[default]
    Nodes,
    /// Always sift both endpoints; the pass ends once every edge is fixed.
    Edges,
    /// Like `Nodes`, but the pass ends as soon as the chosen edge has both
    /// endpoints fixed.
    Early,
    /// Sift only the endpoint carrying more crossings.
    OneNode,
}

impl FromStr for MceOption {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s {
            "nodes" => Ok(MceOption::Nodes),
            "edges" => Ok(MceOption::Edges),
            "early" => Ok(MceOption::Early),
            "one_node" => Ok(MceOption::OneNode),
            other => Err(format!("unknown mce option '{other}'")),
        }
    }
}

/// Order in which the sifting heuristic visits nodes. Only `Degree` is
/// implemented; the others are accepted for command compatibility and
/// behave like `Degree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SiftOption {
    Layer,
    #[default]
    Degree,
    Random,
}

impl FromStr for SiftOption {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s {
            "layer" => Ok(SiftOption::Layer),
            "degree" => Ok(SiftOption::Degree),
            "random" => Ok(SiftOption::Random),
            other => Err(format!("unknown sifting option '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub heuristic: Option<Heuristic>,
    pub preprocessor: Option<Preprocessor>,
    /// Run the swap optimizer after the heuristic, on the best total order.
    pub post_processing: bool,
    pub max_iterations: usize,
    pub max_passes: usize,
    pub max_runtime: Option<Duration>,
    /// Stop when a whole pass improves nothing. Cleared when an iteration
    /// or runtime bound is given.
    pub standard_termination: bool,
    pub weight_carry: WeightCarry,
    /// Average the two directed means when weighting against both
    /// neighboring layers.
    pub balanced_weight: bool,
    pub mce_option: MceOption,
    pub sift_option: SiftOption,
    pub pareto: ParetoMode,
    /// Write the ordering through the capture sink when this iteration
    /// ends.
    pub capture_iteration: Option<usize>,
    /// `None` silences tracing; `Some(0)` prints end-of-pass lines only;
    /// `Some(k)` prints every `k` iterations.
    pub trace_freq: Option<usize>,
    /// Seeding this turns on randomization (currently: the sifting order).
    pub random_seed: Option<u64>,
    /// Edges whose crossings are tracked as the favored-crossings
    /// objective.
    pub favored_edges: Vec<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            heuristic: None,
            preprocessor: None,
            post_processing: false,
            max_iterations: usize::MAX,
            max_passes: usize::MAX,
            max_runtime: None,
            standard_termination: true,
            weight_carry: WeightCarry::default(),
            balanced_weight: false,
            mce_option: MceOption::default(),
            sift_option: SiftOption::default(),
            pareto: ParetoMode::default(),
            capture_iteration: None,
            trace_freq: None,
            random_seed: None,
            favored_edges: Vec::new(),
        }
    }
}

/// Receives the current ordering when a capture iteration fires. The
/// engine itself never opens a file.
pub trait CaptureSink {
    fn capture(&mut self, graph: &LayeredGraph, iteration: usize) -> Result<()>;
}

pub struct Engine<'g> {
    pub(crate) graph: &'g mut LayeredGraph,
    pub(crate) crossings: CrossingCounter,
    pub(crate) tracker: Tracker,
    pub(crate) config: EngineConfig,
    pub(crate) rng: Option<StdRng>,
    pub(crate) iteration: usize,
    pub(crate) pass: usize,
    pub(crate) post_processing_iterations: usize,
    pub(crate) start: Instant,
    pub(crate) trace: Option<Box<dyn Write>>,
    pub(crate) capture: Option<Box<dyn CaptureSink>>,
    pub(crate) sift_order: Vec<usize>,
    pub(crate) banner_printed: bool,
    pub(crate) previous_trace_iteration: usize,
    beginning: ObjectiveSnapshot,
    after_preprocessing: Option<ObjectiveSnapshot>,
    after_heuristic: Option<ObjectiveSnapshot>,
    after_post_processing: Option<ObjectiveSnapshot>,
}

impl<'g> Engine<'g> {
    pub fn new(graph: &'g mut LayeredGraph, config: EngineConfig) -> Self {
        let crossings = CrossingCounter::new(graph);
        let tracker = Tracker::new(graph, &crossings, &config.favored_edges, config.pareto);
        let beginning = ObjectiveSnapshot::capture(graph, &crossings);
        let rng = config.random_seed.map(StdRng::seed_from_u64);
        Self {
            graph,
            crossings,
            tracker,
            config,
            rng,
            iteration: 0,
            pass: 0,
            post_processing_iterations: 0,
            start: Instant::now(),
            trace: None,
            capture: None,
            sift_order: Vec::new(),
            banner_printed: false,
            previous_trace_iteration: 0,
            beginning,
            after_preprocessing: None,
            after_heuristic: None,
            after_post_processing: None,
        }
    }

    /// Injects the writer for trace lines and termination notices.
    pub fn set_trace_writer(&mut self, writer: Box<dyn Write>) {
        self.trace = Some(writer);
    }

    pub fn set_capture_sink(&mut self, sink: Box<dyn CaptureSink>) {
        self.capture = Some(sink);
    }

    pub fn graph(&self) -> &LayeredGraph {
        self.graph
    }

    pub fn crossings(&self) -> &CrossingCounter {
        &self.crossings
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn iterations(&self) -> usize {
        self.iteration
    }

    /// Runs preprocessor, heuristic, and (optionally) the swap optimizer,
    /// then reports. The graph is left in the state the last phase
    /// produced; use [`Engine::restore_best`] to pick an ordering.
    pub fn run(&mut self) -> Result<RunReport> {
        self.start = Instant::now();
        if let Some(pre) = self.config.preprocessor {
            self.run_preprocessor(pre);
            self.crossings.full_recount(self.graph);
            self.after_preprocessing =
                Some(ObjectiveSnapshot::capture(self.graph, &self.crossings));
        }
        // iteration 0 covers parsing and preprocessing
        self.end_of_iteration()?;
        if let Some(heuristic) = self.config.heuristic {
            self.run_heuristic(heuristic)?;
        }
        self.after_heuristic = Some(ObjectiveSnapshot::capture(self.graph, &self.crossings));
        if self.config.post_processing {
            self.post_process()?;
        }
        Ok(self.report())
    }

    /// Restores the best total-crossings order and runs the swap optimizer
    /// on it. [`Engine::run`] does this when configured; callers that want
    /// to look at the graph between the phases invoke it themselves.
    pub fn post_process(&mut self) -> Result<()> {
        self.restore_best(Objective::TotalCrossings);
        self.swapping()?;
        self.after_post_processing = Some(ObjectiveSnapshot::capture(self.graph, &self.crossings));
        Ok(())
    }

    /// Restores the best ordering seen for `objective` and refreshes the
    /// counters. Returns false when nothing was ever saved.
    pub fn restore_best(&mut self, objective: Objective) -> bool {
        let Some(saved) = self.tracker.best_order(objective) else {
            return false;
        };
        let order = saved.order.clone();
        self.graph.restore_order(&order);
        self.crossings.full_recount(self.graph);
        true
    }

    pub fn report(&self) -> RunReport {
        RunReport {
            graph: GraphStats {
                name: self.graph.name.clone(),
                nodes: self.graph.number_of_nodes(),
                edges: self.graph.number_of_edges(),
                layers: self.graph.number_of_layers(),
                isolated_nodes: self.graph.number_of_isolated_nodes(),
            },
            heuristic: self.config.heuristic.map(|h| h.as_str().to_string()),
            preprocessor: self.config.preprocessor.map(|p| p.as_str().to_string()),
            beginning: self.beginning,
            after_preprocessing: self.after_preprocessing,
            after_heuristic: self.after_heuristic.unwrap_or(self.beginning),
            after_post_processing: self.after_post_processing,
            best_total_crossings: best_value(
                self.tracker.total_crossings.best as f64,
                self.tracker.total_crossings.best_iteration,
            ),
            best_bottleneck_crossings: best_value(
                self.tracker.bottleneck_crossings.best as f64,
                self.tracker.bottleneck_crossings.best_iteration,
            ),
            best_total_stretch: best_value(
                self.tracker.total_stretch.best,
                self.tracker.total_stretch.best_iteration,
            ),
            best_bottleneck_stretch: best_value(
                self.tracker.bottleneck_stretch.best,
                self.tracker.bottleneck_stretch.best_iteration,
            ),
            iterations: self.iteration,
            passes: self.pass,
            post_processing_iterations: self.post_processing_iterations,
            runtime_seconds: self.start.elapsed().as_secs_f64(),
            pareto: self.tracker.pareto.report_line(),
        }
    }

    fn run_preprocessor(&mut self, preprocessor: Preprocessor) {
        match preprocessor {
            Preprocessor::Dfs => {
                sorting::assign_dfs_weights(self.graph);
                for layer in 0..self.graph.number_of_layers() {
                    sorting::layer_sort(self.graph, layer);
                }
            }
            Preprocessor::Bfs => {
                sorting::assign_bfs_weights(self.graph);
                for layer in 0..self.graph.number_of_layers() {
                    sorting::layer_sort(self.graph, layer);
                }
            }
            Preprocessor::Mds => {
                for layer in 0..self.graph.number_of_layers() {
                    sorting::middle_degree_sort(self.graph, layer);
                }
            }
        }
    }

    /// One unit of local work ends here: capture if requested, refresh the
    /// tracker, and report whether an iteration or runtime bound fired.
    pub(crate) fn end_of_iteration(&mut self) -> Result<bool> {
        if self.config.capture_iteration == Some(self.iteration) {
            if let Some(sink) = self.capture.as_mut() {
                sink.capture(self.graph, self.iteration)?;
            }
        }
        self.tracker.update_all(
            self.graph,
            &self.crossings,
            &self.config.favored_edges,
            self.iteration,
        );
        self.tracker.pareto_update(self.graph, &self.crossings);
        let done = self.iteration >= self.config.max_iterations || self.runtime_exceeded();
        if done && self.tracker.any_improved_pending() {
            let notice = format!(
                "$$$ still improving but max iterations or runtime reached: iteration {}, runtime {:.3}, graph {}",
                self.iteration,
                self.start.elapsed().as_secs_f64(),
                self.graph.name,
            );
            self.note(&notice);
        }
        self.iteration += 1;
        Ok(done)
    }

    /// Consulted at the start of every pass.
    pub(crate) fn terminate(&mut self) -> bool {
        let improved = self.tracker.take_any_improved();
        if !improved && !self.banner_printed {
            let banner = format!(
                "=== standard termination here: iteration {} crossings {} bottleneck {} graph {} ===",
                self.iteration,
                self.tracker.total_crossings.best,
                self.tracker.bottleneck_crossings.best,
                self.graph.name,
            );
            self.note(&banner);
            self.banner_printed = true;
        }
        if self.config.standard_termination && !improved {
            return true;
        }
        if self.iteration >= self.config.max_iterations {
            return true;
        }
        if self.runtime_exceeded() {
            return true;
        }
        if self.pass >= self.config.max_passes {
            return true;
        }
        self.pass += 1;
        false
    }

    fn runtime_exceeded(&self) -> bool {
        self.config
            .max_runtime
            .is_some_and(|limit| self.start.elapsed() >= limit)
    }

    /// Unconditional notice to the injected writer.
    pub(crate) fn note(&mut self, message: &str) {
        if let Some(writer) = self.trace.as_mut() {
            let _ = writeln!(writer, "{message}");
        }
    }

    /// A trace line subject to the configured frequency. Pass-level
    /// messages carry no layer and also appear at low frequencies.
    pub(crate) fn trace_line(&mut self, layer: Option<usize>, message: &str) {
        const PASS_MESSAGE_THRESHOLD: usize = 2;
        let Some(freq) = self.config.trace_freq else {
            return;
        };
        if freq > 0
            && self.iteration % freq == 0
            && self.iteration > self.previous_trace_iteration
        {
            self.print_trace(layer, message);
            if layer.is_some() {
                self.previous_trace_iteration = self.iteration;
            }
        } else if freq <= PASS_MESSAGE_THRESHOLD && layer.is_none() {
            self.print_trace(layer, message);
        }
    }

    fn print_trace(&mut self, layer: Option<usize>, message: &str) {
        let line = format!(
            "{}iteration {:4} | layer {:2} | crossings {:3} | best {:3} | bottleneck {:2} | best {:2} | stretch {:5.2} | best {:5.2} | time {:4.2} | {}",
            if layer.is_none() { "+" } else { "" },
            self.iteration,
            layer.map(|l| l as i64).unwrap_or(-1),
            self.crossings.total(),
            self.tracker.total_crossings.best,
            self.crossings.max_edge_crossings(self.graph),
            self.tracker.bottleneck_crossings.best,
            stretch::total_stretch(self.graph),
            self.tracker.total_stretch.best,
            self.start.elapsed().as_secs_f64(),
            message,
        );
        if let Some(writer) = self.trace.as_mut() {
            let _ = writeln!(writer, "{line}");
        }
    }
}

fn best_value(value: f64, iteration: usize) -> crate::stats::BestValue {
    crate::stats::BestValue { value, iteration }
}
