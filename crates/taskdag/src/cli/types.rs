//! CLI value enums and their conversions to output types.

use clap::ValueEnum;

use crate::output::GraphFormat;

/// Snapshot format for `taskdag graph`
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphFormatArg {
    /// One line per task, prerequisites indented below
    #[default]
    Text,
    /// JSON snapshot
    Json,
    /// Graphviz DOT (pipe into `dot -Tsvg`)
    Dot,
}

impl std::fmt::Display for GraphFormatArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
            Self::Dot => write!(f, "dot"),
        }
    }
}

impl From<GraphFormatArg> for GraphFormat {
    fn from(arg: GraphFormatArg) -> Self {
        match arg {
            GraphFormatArg::Text => GraphFormat::Text,
            GraphFormatArg::Json => GraphFormat::Json,
            GraphFormatArg::Dot => GraphFormat::Dot,
        }
    }
}
