/// What the scheduler does when an element's process() call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Propagate the error up (stops the pipeline)
    Propagate,

    /// Discard anything the failing call staged and try again next tick
    SkipTick,

    /// Stop scheduling the failing element; the rest of the graph keeps
    /// running
    Isolate,
}
