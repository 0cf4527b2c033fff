use anyhow::Result;
use crossbeam_channel::bounded;
use framewire::core::{DataType, InputPin, OutputPin, PipelineElement};
use framewire::elements::{FrameStats, TestFrameSource};
use framewire::engine::{Pipeline, PipelineConfig};

/// Externally-triggered capture: a worker thread stands in for a camera,
/// signalling the source element whenever a frame is "captured". The
/// scheduler never blocks on it; readiness simply follows the channel.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("Framewire - Triggered Capture Demo");
    println!("===================================\n");

    let (capture_tx, capture_rx) = bounded(16);
    std::thread::spawn(move || {
        for _ in 0..10 {
            if capture_tx.send(()).is_err() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(30));
        }
    });

    let mut pipeline = Pipeline::with_config(PipelineConfig {
        stall_threshold: 200,
        tick_interval_ms: 5,
        ..Default::default()
    });

    let mut source = PipelineElement::new(
        "camera",
        Box::new(TestFrameSource::with_trigger(64, 48, capture_rx)),
    );
    source.add_output_pin(OutputPin::new(TestFrameSource::OUTPUT, DataType::Frame))?;

    let mut sink = PipelineElement::new("stats", Box::new(FrameStats::new("Captured")));
    sink.add_input_pin(InputPin::new(FrameStats::INPUT, DataType::Frame))?;

    pipeline.add_element(source)?;
    pipeline.add_element(sink)?;
    pipeline.connect("camera", TestFrameSource::OUTPUT, "stats", FrameStats::INPUT)?;

    pipeline.init().await?;
    let report = pipeline.run(100).await?;
    pipeline.stop()?;

    println!(
        "\nDone: {} process() calls over {} ticks, {} stalls",
        report.processed, report.ticks, report.stalls
    );
    println!("\n{}", pipeline.monitor().generate_report());

    Ok(())
}
