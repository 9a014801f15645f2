use mincross::stats::RunReport;
use mincross::{
    CaptureSink, Engine, EngineConfig, Heuristic, LayeredGraph, MceOption, Objective, ParetoMode,
    Preprocessor, SiftOption, WeightCarry,
};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const USAGE: &str = "\
Usage: mincross [opts] graph.sgf
       mincross [opts] graph.dot graph.ord
 where opts is one or more of the following
  -h HEURISTIC  median | bary | mod_bary | mcn | sifting | mce | mce_s | mse
  -p PREPROC    bfs | dfs | mds
  -z            post-process with repeated swaps until no improvement
  -i N          maximum number of iterations
  -r SECONDS    maximum runtime
  -R SEED       randomize tie-breaking order between passes
  -c ITER       capture the ordering after iteration ITER in a file
  -P PAIR       b_t | s_t | b_s  pair of objectives for Pareto optima
  -O TAG        t | b | s | bs  write best order for the objective to stdout (sgf)
  -o BASE       write per-objective output files; -o _ uses the input stem
  -w POLICY     none | avg | left  weights for nodes with no neighbors
  -b            average the two neighboring layers' averages
  -s ORDER      layer | degree | random  sifting order
  -e MODE       nodes | edges | early | one_node  mce pass variation
  -v            verbose graph information
  -t FREQ       trace printout; 0 = end of pass only, k = every k iterations
  --json        print the run report as JSON";

#[derive(Debug)]
enum CliError {
    Usage(String),
    Io(std::io::Error),
    Min(mincross::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Min(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<mincross::Error> for CliError {
    fn from(value: mincross::Error) -> Self {
        Self::Min(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Sgf,
    Ord,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Sgf => "sgf",
            Format::Ord => "ord",
        }
    }

    fn render(self, graph: &LayeredGraph) -> String {
        match self {
            Format::Sgf => mincross::sgf::write_sgf(graph),
            Format::Ord => mincross::ord::write_ord(graph),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    heuristic: Option<Heuristic>,
    preprocessor: Option<Preprocessor>,
    post_processing: bool,
    max_iterations: Option<usize>,
    max_runtime: Option<f64>,
    seed: Option<u64>,
    capture_iteration: Option<usize>,
    pareto: ParetoMode,
    stdout_objective: Option<Objective>,
    output_base: Option<String>,
    weight_carry: WeightCarry,
    balanced_weight: bool,
    sift_option: SiftOption,
    mce_option: MceOption,
    verbose: bool,
    trace_freq: Option<usize>,
    json: bool,
    inputs: Vec<String>,
}

fn usage(message: impl Into<String>) -> CliError {
    let message = message.into();
    if message.is_empty() {
        CliError::Usage(USAGE.to_string())
    } else {
        CliError::Usage(format!("{message}\n{USAGE}"))
    }
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        weight_carry: WeightCarry::Left,
        ..Default::default()
    };
    let mut iter = argv.iter().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| usage(format!("option {flag} needs a value")))
        };
        match arg.as_str() {
            "-h" => args.heuristic = Some(parse_value(&value("-h")?)?),
            "-p" => args.preprocessor = Some(parse_value(&value("-p")?)?),
            "-z" => args.post_processing = true,
            "-i" => args.max_iterations = Some(parse_number(&value("-i")?, "-i")?),
            "-r" => args.max_runtime = Some(parse_number(&value("-r")?, "-r")?),
            "-R" => args.seed = Some(parse_number(&value("-R")?, "-R")?),
            "-c" => args.capture_iteration = Some(parse_number(&value("-c")?, "-c")?),
            "-P" => {
                args.pareto = match value("-P")?.as_str() {
                    "b_t" => ParetoMode::BottleneckTotal,
                    "s_t" => ParetoMode::StretchTotal,
                    "b_s" => ParetoMode::BottleneckStretch,
                    other => return Err(usage(format!("bad value '{other}' for option -P"))),
                }
            }
            "-O" => {
                args.stdout_objective = Some(match value("-O")?.as_str() {
                    "t" => Objective::TotalCrossings,
                    "b" => Objective::BottleneckCrossings,
                    "s" => Objective::TotalStretch,
                    "bs" => Objective::BottleneckStretch,
                    other => return Err(usage(format!("bad value '{other}' for option -O"))),
                })
            }
            "-o" => args.output_base = Some(value("-o")?),
            "-w" => {
                args.weight_carry = match value("-w")?.as_str() {
                    "none" => WeightCarry::None,
                    "left" => WeightCarry::Left,
                    "avg" => WeightCarry::Avg,
                    other => return Err(usage(format!("bad value '{other}' for option -w"))),
                }
            }
            "-b" => args.balanced_weight = true,
            "-s" => args.sift_option = parse_value(&value("-s")?)?,
            "-e" => args.mce_option = parse_value(&value("-e")?)?,
            "-v" => args.verbose = true,
            "-t" => args.trace_freq = Some(parse_number(&value("-t")?, "-t")?),
            "--json" => args.json = true,
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(usage(format!("unknown option {flag}")));
            }
            _ => args.inputs.push(arg.clone()),
        }
    }
    if args.inputs.is_empty() || args.inputs.len() > 2 {
        return Err(usage("need either one sgf file or a dot and ord file"));
    }
    Ok(args)
}

fn parse_value<T: FromStr<Err = String>>(text: &str) -> Result<T, CliError> {
    T::from_str(text).map_err(usage)
}

fn parse_number<T: FromStr>(text: &str, flag: &str) -> Result<T, CliError> {
    text.parse()
        .map_err(|_| usage(format!("bad value '{text}' for option {flag}")))
}

/// Writes `capture-<iteration>` files in the input's own format.
struct FileCapture {
    stem: String,
    format: Format,
}

impl CaptureSink for FileCapture {
    fn capture(&mut self, graph: &LayeredGraph, iteration: usize) -> mincross::Result<()> {
        let name = format!(
            "{}-capture-{iteration}.{}",
            self.stem,
            self.format.extension()
        );
        std::fs::write(name, self.format.render(graph))?;
        Ok(())
    }
}

fn input_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "graph".to_string())
}

fn run(args: Args) -> Result<(), CliError> {
    let format = if args.inputs.len() == 1 {
        Format::Sgf
    } else {
        Format::Ord
    };

    let mut graph = match format {
        Format::Sgf => {
            let text = std::fs::read_to_string(&args.inputs[0])?;
            let read = mincross::sgf::read_sgf(&text)?;
            for warning in &read.warnings {
                eprintln!("warning: {}: {warning}", args.inputs[0]);
            }
            read.graph
        }
        Format::Ord => {
            let dot_text = std::fs::read_to_string(&args.inputs[0])?;
            let ord_text = std::fs::read_to_string(&args.inputs[1])?;
            mincross::graph_io::read_dot_and_ord(&dot_text, &ord_text)?
        }
    };

    let command_line: Vec<String> = std::env::args().collect();
    graph.comments.push(command_line.join(" "));

    if args.verbose {
        println!(
            "graph {}: nodes={} edges={} layers={} isolated_nodes={}",
            graph.name,
            graph.number_of_nodes(),
            graph.number_of_edges(),
            graph.number_of_layers(),
            graph.number_of_isolated_nodes(),
        );
    }

    let output_stem = args.output_base.as_deref().map(|base| {
        if base == "_" {
            input_stem(&args.inputs[0])
        } else {
            base.to_string()
        }
    });

    let config = EngineConfig {
        heuristic: args.heuristic,
        preprocessor: args.preprocessor,
        post_processing: false, // driven below so files land between phases
        max_iterations: args.max_iterations.unwrap_or(usize::MAX),
        max_runtime: args.max_runtime.map(Duration::from_secs_f64),
        standard_termination: args.max_iterations.is_none() && args.max_runtime.is_none(),
        weight_carry: args.weight_carry,
        balanced_weight: args.balanced_weight,
        mce_option: args.mce_option,
        sift_option: args.sift_option,
        pareto: args.pareto,
        capture_iteration: args.capture_iteration,
        trace_freq: args.trace_freq,
        random_seed: args.seed,
        ..Default::default()
    };

    let heuristic_tag = config.heuristic.map_or("none", |h| h.as_str()).to_string();

    let mut engine = Engine::new(&mut graph, config);
    engine.set_trace_writer(Box::new(std::io::stderr()));
    if args.capture_iteration.is_some() {
        engine.set_capture_sink(Box::new(FileCapture {
            stem: output_stem
                .clone()
                .unwrap_or_else(|| input_stem(&args.inputs[0])),
            format,
        }));
    }

    engine.run()?;

    let write_output = |engine: &Engine<'_>, stem: &str, appendix: &str| -> Result<(), CliError> {
        let name = format!("{stem}-{heuristic_tag}{appendix}.{}", format.extension());
        std::fs::write(name, format.render(engine.graph()))?;
        Ok(())
    };

    if let Some(stem) = output_stem.as_deref() {
        // ordering after the heuristic, before post-processing
        engine.restore_best(Objective::TotalCrossings);
        write_output(&engine, stem, "")?;
    }

    if args.post_processing {
        engine.post_process()?;
        if let Some(stem) = output_stem.as_deref() {
            write_output(&engine, stem, "-post")?;
        }
    }

    if let Some(stem) = output_stem.as_deref() {
        engine.restore_best(Objective::BottleneckCrossings);
        write_output(&engine, stem, "-edge")?;
        engine.restore_best(Objective::TotalStretch);
        write_output(&engine, stem, "-stretch")?;
        engine.restore_best(Objective::BottleneckStretch);
        write_output(&engine, stem, "-bs")?;
    }

    if let Some(objective) = args.stdout_objective {
        engine.restore_best(objective);
        print!("{}", mincross::sgf::write_sgf(engine.graph()));
    }

    let report = engine.report();
    if let Some(line) = &report.pareto {
        println!("{line}");
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if args.stdout_objective.is_none() {
        print_report(&report);
    }
    Ok(())
}

fn fmt_count(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as u64)
    } else {
        format!("{value:.2}")
    }
}

fn print_report(report: &RunReport) {
    println!(
        "graph {}: nodes={} edges={} layers={} isolated_nodes={}",
        report.graph.name,
        report.graph.nodes,
        report.graph.edges,
        report.graph.layers,
        report.graph.isolated_nodes,
    );
    println!(
        "beginning: crossings={} bottleneck={} stretch={:.2} bottleneck_stretch={:.2}",
        report.beginning.total_crossings,
        report.beginning.bottleneck_crossings,
        report.beginning.total_stretch,
        report.beginning.bottleneck_stretch,
    );
    if let Some(pre) = &report.after_preprocessing {
        println!(
            "after {}: crossings={} bottleneck={} stretch={:.2} bottleneck_stretch={:.2}",
            report.preprocessor.as_deref().unwrap_or("preprocessing"),
            pre.total_crossings,
            pre.bottleneck_crossings,
            pre.total_stretch,
            pre.bottleneck_stretch,
        );
    }
    println!(
        "after {}: crossings={} bottleneck={} stretch={:.2} bottleneck_stretch={:.2}",
        report.heuristic.as_deref().unwrap_or("no heuristic"),
        report.after_heuristic.total_crossings,
        report.after_heuristic.bottleneck_crossings,
        report.after_heuristic.total_stretch,
        report.after_heuristic.bottleneck_stretch,
    );
    if let Some(post) = &report.after_post_processing {
        println!(
            "after post-processing: crossings={} bottleneck={} stretch={:.2} bottleneck_stretch={:.2}",
            post.total_crossings,
            post.bottleneck_crossings,
            post.total_stretch,
            post.bottleneck_stretch,
        );
    }
    println!(
        "best: crossings={} (iteration {}) bottleneck={} (iteration {}) stretch={} (iteration {}) bottleneck_stretch={} (iteration {})",
        fmt_count(report.best_total_crossings.value),
        report.best_total_crossings.iteration,
        fmt_count(report.best_bottleneck_crossings.value),
        report.best_bottleneck_crossings.iteration,
        fmt_count(report.best_total_stretch.value),
        report.best_total_stretch.iteration,
        fmt_count(report.best_bottleneck_stretch.value),
        report.best_bottleneck_stretch.iteration,
    );
    println!(
        "iterations={} passes={} post_processing_iterations={} runtime={:.3}s",
        report.iterations, report.passes, report.post_processing_iterations, report.runtime_seconds,
    );
}

fn main() {
    let argv: Vec<String> = std::env::args().collect();
    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };
    match run(args) {
        Ok(()) => {}
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
