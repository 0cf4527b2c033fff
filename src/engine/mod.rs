pub mod pipeline;
pub mod state;

pub use pipeline::{
    ConnectionTopology, ElementTopology, InitReport, Pipeline, PipelineConfig, PipelineTopology,
    RunReport, TickReport,
};
pub use state::PipelineState;
