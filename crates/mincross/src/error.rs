pub type Result<T> = std::result::Result<T, Error>;

/// Fatal conditions raised while building a graph from an input file.
///
/// Hitting an iteration or runtime bound is *not* an error; the engine
/// returns normally with the best orders seen so far. Invariant violations
/// inside the engine are programming errors and panic instead of surfacing
/// here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("line {line}: node '{name}' is not defined")]
    DanglingEndpoint { line: usize, name: String },

    #[error("line {line}: node '{name}' defined more than once")]
    DuplicateNode { line: usize, name: String },

    #[error("line {line}: nodes '{source_node}' and '{target}' are both on layer {layer}")]
    SameLayerEdge {
        line: usize,
        source_node: String,
        target: String,
        layer: usize,
    },

    #[error(
        "line {line}: nodes '{source_node}' (layer {source_layer}) and '{target}' (layer {target_layer}) are not on adjacent layers"
    )]
    NonAdjacentEdge {
        line: usize,
        source_node: String,
        target: String,
        source_layer: usize,
        target_layer: usize,
    },

    #[error("line {line}: position {position} appears twice on layer {layer}")]
    DuplicatePosition {
        line: usize,
        layer: usize,
        position: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
