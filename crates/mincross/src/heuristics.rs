//! The named heuristics: alternating sweeps, sifting, and the
//! maximum-crossings family, plus the post-processing swap optimizer.
//! Every driver runs passes until the engine's termination predicate
//! fires, checking it only at iteration boundaries.

use crate::crossings;
use crate::engine::{Engine, Heuristic, MceOption};
use crate::error::Result;
use crate::sifting;
use crate::sorting::{self, Orientation};
use crate::stretch;
use rand::seq::SliceRandom;

/// One more unproductive pass than this ends sifting under standard
/// termination (the value used by Matuszewski et al.).
const MAX_FAILS: usize = 1;

#[derive(Clone, Copy)]
enum SiftDirection {
    Increasing,
    Decreasing,
}

impl Engine<'_> {
    pub(crate) fn run_heuristic(&mut self, heuristic: Heuristic) -> Result<()> {
        match heuristic {
            Heuristic::Median => self.sweep_heuristic(true),
            Heuristic::Barycenter => self.sweep_heuristic(false),
            Heuristic::ModBarycenter => self.modified_barycenter(),
            Heuristic::MaxCrossingsNode => self.maximum_crossings_node(),
            Heuristic::Sifting => self.sifting(),
            Heuristic::MaxCrossingsEdge => self.maximum_crossings_edge(),
            Heuristic::MaxCrossingsEdgeWithSifting => self.maximum_crossings_edge_with_sifting(),
            Heuristic::MaxStretchEdge => self.maximum_stretch_edge(),
        }
    }

    fn heuristic_name(&self) -> &'static str {
        self.config.heuristic.map_or("none", |h| h.as_str())
    }

    /// median / barycenter: alternate upward and downward sweeps until a
    /// whole pass improves nothing.
    fn sweep_heuristic(&mut self, median: bool) -> Result<()> {
        let start = if median {
            "^^^ start median"
        } else {
            "^^^ start barycenter"
        };
        self.trace_line(None, start);
        if self.graph.number_of_layers() < 2 {
            return Ok(());
        }
        let top = self.graph.number_of_layers() - 2;
        while !self.terminate() {
            if self.up_sweep(1, median)? {
                return Ok(());
            }
            if self.down_sweep(top, median)? {
                return Ok(());
            }
            self.trace_line(None, "--- end of pass");
        }
        Ok(())
    }

    /// Sorts layers `start ..` against their downward neighbors. Returns
    /// true when an iteration bound fired.
    fn up_sweep(&mut self, start: usize, median: bool) -> Result<bool> {
        for layer in start..self.graph.number_of_layers() {
            self.sort_one_layer(layer, Orientation::Downward, median);
            self.trace_line(Some(layer), "up sweep");
            if self.end_of_iteration()? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Sorts layers `start ..= 0` (descending) against their upward
    /// neighbors.
    fn down_sweep(&mut self, start: usize, median: bool) -> Result<bool> {
        for layer in (0..=start).rev() {
            self.sort_one_layer(layer, Orientation::Upward, median);
            self.trace_line(Some(layer), "down sweep");
            if self.end_of_iteration()? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn sort_one_layer(&mut self, layer: usize, orientation: Orientation, median: bool) {
        if median {
            sorting::median_weights(self.graph, layer, orientation, self.config.weight_carry);
        } else {
            sorting::barycenter_weights(
                self.graph,
                layer,
                orientation,
                self.config.balanced_weight,
                self.config.weight_carry,
            );
        }
        sorting::layer_sort(self.graph, layer);
        self.crossings.recount_around_layer(self.graph, layer);
    }

    /// mod_bary: repeatedly fix the worst unfixed layer, sort it against
    /// both neighbors, and sweep outward from it.
    fn modified_barycenter(&mut self) -> Result<()> {
        self.trace_line(None, "^^^ start modified barycenter");
        while !self.terminate() {
            self.graph.clear_fixed_layers();
            loop {
                let Some(layer) = self.crossings.max_crossings_layer(self.graph) else {
                    break;
                };
                self.graph.layers[layer].fixed = true;
                sorting::barycenter_weights(
                    self.graph,
                    layer,
                    Orientation::Both,
                    self.config.balanced_weight,
                    self.config.weight_carry,
                );
                sorting::layer_sort(self.graph, layer);
                self.crossings.recount_around_layer(self.graph, layer);
                self.trace_line(Some(layer), "max crossings layer");
                if self.end_of_iteration()? {
                    return Ok(());
                }
                if self.up_sweep(layer + 1, false)? {
                    return Ok(());
                }
                if layer > 0 && self.down_sweep(layer - 1, false)? {
                    return Ok(());
                }
                self.trace_line(None, "--- mod_bary end of pass");
            }
            self.trace_line(None, "=== mod_bary, all layers fixed");
        }
        Ok(())
    }

    /// Sifts every node, largest degree first; an unproductive decreasing
    /// pass is retried in increasing order before giving up.
    fn sifting(&mut self) -> Result<()> {
        self.sift_order = (0..self.graph.number_of_nodes()).collect();
        sorting::sort_by_degree(self.graph, &mut self.sift_order);

        let mut fail_count = 0;
        while (self.config.standard_termination && fail_count < MAX_FAILS) || !self.terminate() {
            let crossings_before = self.crossings.total();
            self.shuffle_sift_order();
            let mut fail = !self.sift_pass(SiftDirection::Decreasing, crossings_before)?;
            if self.iteration >= self.config.max_iterations {
                break;
            }
            self.trace_line(None, "--- end of sifting pass");
            if fail {
                fail_count += 1;
                self.shuffle_sift_order();
                fail = !self.sift_pass(SiftDirection::Increasing, crossings_before)?;
                if self.end_of_iteration()? {
                    break;
                }
            } else {
                self.shuffle_sift_order();
                fail = !self.sift_pass(SiftDirection::Decreasing, crossings_before)?;
                if self.end_of_iteration()? {
                    break;
                }
            }
            self.trace_line(None, "--- end of sifting pass");
            if fail {
                fail_count += 1;
            }
        }
        Ok(())
    }

    /// Permutes the working list and re-sorts by degree, so equal-degree
    /// nodes come up in a fresh order. Does nothing without a seed.
    fn shuffle_sift_order(&mut self) {
        if let Some(rng) = self.rng.as_mut() {
            self.sift_order.shuffle(rng);
            sorting::sort_by_degree(self.graph, &mut self.sift_order);
        }
    }

    /// One sweep over the working list. Improvement is judged against the
    /// crossings at the start of the enclosing pass.
    fn sift_pass(&mut self, direction: SiftDirection, initial_crossings: u64) -> Result<bool> {
        let sequence: Vec<usize> = match direction {
            SiftDirection::Decreasing => self.sift_order.iter().rev().copied().collect(),
            SiftDirection::Increasing => self.sift_order.clone(),
        };
        for node in sequence {
            sifting::sift_node(self.graph, &mut self.crossings, node);
            let message = format!(
                "$$$ sift, node = {}, pos = {}",
                self.graph.nodes[node].name, self.graph.nodes[node].position,
            );
            self.trace_line(Some(self.graph.nodes[node].layer), &message);
            if self.end_of_iteration()? {
                break;
            }
        }
        Ok(self.crossings.total() < initial_crossings
            && self.iteration < self.config.max_iterations)
    }

    /// mcn: total-sift the unfixed node with the most crossings until all
    /// nodes are fixed.
    fn maximum_crossings_node(&mut self) -> Result<()> {
        self.trace_line(None, "^^^ start maximum crossings node");
        while !self.terminate() {
            self.graph.clear_fixed_nodes();
            loop {
                let Some(node) = self.crossings.max_crossings_node(self.graph) else {
                    break;
                };
                if self.sift_iteration(node)? {
                    return Ok(());
                }
            }
            self.trace_line(None, "$$$ mcn, all nodes fixed");
        }
        Ok(())
    }

    /// Total-sifts one node and handles the bookkeeping around it.
    fn sift_iteration(&mut self, node: usize) -> Result<bool> {
        sifting::sift_node(self.graph, &mut self.crossings, node);
        self.graph.nodes[node].fixed = true;
        let message = format!(
            "$$$ {}, node = {}",
            self.heuristic_name(),
            self.graph.nodes[node].name,
        );
        self.trace_line(Some(self.graph.nodes[node].layer), &message);
        self.end_of_iteration()
    }

    /// mce: pick the unfixed edge with the most crossings and sift its
    /// endpoints toward a smaller bottleneck.
    fn maximum_crossings_edge(&mut self) -> Result<()> {
        self.trace_line(None, "^^^ start maximum crossings edge");
        while !self.terminate() {
            self.graph.clear_fixed_nodes();
            self.graph.clear_fixed_edges();
            loop {
                let Some(edge) = self.crossings.max_crossings_edge(self.graph) else {
                    break;
                };
                let message = format!(
                    "->- mce, edge {} -> {}",
                    self.graph.nodes[self.graph.edges[edge].down].name,
                    self.graph.nodes[self.graph.edges[edge].up].name,
                );
                self.trace_line(Some(self.graph.nodes[self.graph.edges[edge].up].layer), &message);
                if self.end_mce_pass(edge) {
                    break;
                }
                if self.edge_sift_iteration(edge)? {
                    return Ok(());
                }
                self.graph.edges[edge].fixed = true;
            }
            self.trace_line(None, "--- mce, end pass");
        }
        Ok(())
    }

    fn end_mce_pass(&self, edge: usize) -> bool {
        match self.config.mce_option {
            MceOption::Early => {
                self.graph.nodes[self.graph.edges[edge].up].fixed
                    && self.graph.nodes[self.graph.edges[edge].down].fixed
            }
            MceOption::Nodes => self.graph.all_nodes_fixed(),
            MceOption::Edges | MceOption::OneNode => false,
        }
    }

    /// Edge-sifts none, one, or both endpoints of `edge`, as the mce mode
    /// dictates.
    fn edge_sift_iteration(&mut self, edge: usize) -> Result<bool> {
        let up = self.graph.edges[edge].up;
        let down = self.graph.edges[edge].down;
        let mut sift_up = self.config.mce_option == MceOption::Edges || !self.graph.nodes[up].fixed;
        let mut sift_down =
            self.config.mce_option == MceOption::Edges || !self.graph.nodes[down].fixed;
        if self.config.mce_option == MceOption::OneNode && sift_up && sift_down {
            if self.graph.nodes[down].crossings() > self.graph.nodes[up].crossings() {
                sift_up = false;
            } else {
                sift_down = false;
            }
        }
        for node in [up, down] {
            let wanted = if node == up { sift_up } else { sift_down };
            if !wanted {
                continue;
            }
            sifting::sift_node_for_edge_crossings(self.graph, &mut self.crossings, edge, node);
            self.graph.nodes[node].fixed = true;
            let message = format!(
                "$$$ {}, node = {}, position = {}",
                self.heuristic_name(),
                self.graph.nodes[node].name,
                self.graph.nodes[node].position,
            );
            self.trace_line(Some(self.graph.nodes[node].layer), &message);
            if self.end_of_iteration()? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// mce_s: like mce in nodes mode, but endpoints get the total sifter.
    fn maximum_crossings_edge_with_sifting(&mut self) -> Result<()> {
        self.trace_line(None, "^^^ start maximum crossings edge with sifting");
        while !self.terminate() {
            self.graph.clear_fixed_nodes();
            self.graph.clear_fixed_edges();
            loop {
                let Some(edge) = self.crossings.max_crossings_edge(self.graph) else {
                    break;
                };
                if self.graph.all_nodes_fixed() {
                    break;
                }
                let up = self.graph.edges[edge].up;
                let down = self.graph.edges[edge].down;
                let message = format!(
                    "->- mce_s, edge {} -> {}",
                    self.graph.nodes[down].name, self.graph.nodes[up].name,
                );
                self.trace_line(Some(self.graph.nodes[up].layer), &message);
                if !self.graph.nodes[up].fixed && self.sift_iteration(up)? {
                    return Ok(());
                }
                if !self.graph.nodes[down].fixed && self.sift_iteration(down)? {
                    return Ok(());
                }
                self.graph.edges[edge].fixed = true;
            }
            self.trace_line(None, "--- mce with sifting, end pass");
        }
        Ok(())
    }

    /// mse: like mce_s, but driven by stretch and the stretch sifter.
    fn maximum_stretch_edge(&mut self) -> Result<()> {
        self.trace_line(None, "^^^ start maximum stretch edge");
        while !self.terminate() {
            self.graph.clear_fixed_nodes();
            self.graph.clear_fixed_edges();
            loop {
                let Some(edge) = stretch::max_stretch_edge(self.graph) else {
                    break;
                };
                if self.graph.all_nodes_fixed() {
                    break;
                }
                let up = self.graph.edges[edge].up;
                let down = self.graph.edges[edge].down;
                let message = format!(
                    "->- mse, edge {} -> {}",
                    self.graph.nodes[down].name, self.graph.nodes[up].name,
                );
                self.trace_line(Some(self.graph.nodes[up].layer), &message);
                if !self.graph.nodes[up].fixed && self.total_stretch_sift_iteration(up)? {
                    return Ok(());
                }
                if !self.graph.nodes[down].fixed && self.total_stretch_sift_iteration(down)? {
                    return Ok(());
                }
                self.graph.edges[edge].fixed = true;
            }
            self.trace_line(None, "--- mse, end pass");
        }
        Ok(())
    }

    fn total_stretch_sift_iteration(&mut self, node: usize) -> Result<bool> {
        sifting::sift_node_for_total_stretch(self.graph, &mut self.crossings, node);
        self.graph.nodes[node].fixed = true;
        let message = format!(
            "$$$ {}, node = {}, position = {}",
            self.heuristic_name(),
            self.graph.nodes[node].name,
            self.graph.nodes[node].position,
        );
        self.trace_line(Some(self.graph.nodes[node].layer), &message);
        self.end_of_iteration()
    }

    /// Post-processing: alternate even and odd swap passes while any pass
    /// improves the total, refreshing every tracker after an improvement.
    pub(crate) fn swapping(&mut self) -> Result<()> {
        let mut improved = true;
        let mut current = self.crossings.total() as i64;
        let mut previous_best = current;
        self.post_processing_iterations = 0;
        self.trace_line(None, "<-> start swapping");
        while improved {
            current = self.swapping_iteration(current, 0);
            self.post_processing_iterations += 1;
            if current < previous_best {
                improved = true;
                previous_best = current;
                self.refresh_trackers();
            } else {
                improved = false;
            }
            self.post_processing_iterations += 1;

            current = self.swapping_iteration(current, 1);
            if current < previous_best {
                improved = true;
                previous_best = current;
                self.refresh_trackers();
            }
            // improvement in the even half keeps the loop going even when
            // the odd half came up empty
            self.post_processing_iterations += 1;
            self.trace_line(None, "-- end of swapping pass");
        }
        Ok(())
    }

    /// Tries every swap of neighbors `i, i+1` on every layer where both
    /// the layer number and `i` share the given parity; commits the swap
    /// when it strictly reduces the two affected channels.
    fn swapping_iteration(&mut self, mut current: i64, parity: usize) -> i64 {
        let mut layer = parity;
        while layer < self.graph.number_of_layers() {
            let mut i = parity;
            while i + 1 < self.graph.layers[layer].len() {
                let a = self.graph.node_at(layer, i);
                let b = self.graph.node_at(layer, i + 1);
                let before = crossings::node_crossings(self.graph, a, b) as i64;
                let after = crossings::node_crossings(self.graph, b, a) as i64;
                let diff = before - after;
                if diff > 0 {
                    self.graph.swap_positions(layer, i, i + 1);
                    current -= diff;
                }
                i += 2;
            }
            self.trace_line(Some(layer), "<-> swapping");
            layer += 2;
        }
        current
    }

    fn refresh_trackers(&mut self) {
        self.crossings.full_recount(self.graph);
        self.tracker.update_all(
            self.graph,
            &self.crossings,
            &self.config.favored_edges,
            self.iteration,
        );
        self.tracker.pareto_update(self.graph, &self.crossings);
    }
}
