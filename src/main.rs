use anyhow::Result;
use framewire::engine::Pipeline;
use framewire::registry::ElementRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("Framewire - Frame Pipeline Demo");
    println!("================================\n");

    let registry = ElementRegistry::discover()?;
    let mut types = registry.list_types();
    types.sort();
    println!("Registered element types: {types:?}\n");

    // Source -> Brightness -> Stats, with a passive tap on the source
    let config = serde_json::json!({
        "pipeline_config": {
            "stall_threshold": 50,
            "queue_capacity": 64
        },
        "elements": [
            {
                "id": "source",
                "type": "testframesource",
                "config": {
                    "width": 64,
                    "height": 48,
                    "frame_limit": 10
                }
            },
            {
                "id": "bright",
                "type": "brightness",
                "config": {
                    "offset": 24.0
                }
            },
            {
                "id": "stats",
                "type": "framestats",
                "config": {
                    "label": "Final Output"
                }
            },
            {
                "id": "tap",
                "type": "passivetap",
                "config": {}
            }
        ],
        "connections": [
            {"from": "source.out", "to": "bright.in"},
            {"from": "bright.out", "to": "stats.in"},
            {"from": "source.out", "to": "tap.in"}
        ]
    });

    println!("Building pipeline from config...");
    let mut pipeline = Pipeline::from_json(config, &registry).await?;

    let init = pipeline.init().await?;
    println!(
        "Initialized {} elements ({} failures)\n",
        init.initialized.len(),
        init.failures.len()
    );

    println!("Running 20 ticks...\n");
    let report = pipeline.run(20).await?;
    pipeline.stop()?;

    println!(
        "\nDone: {} process() calls over {} ticks, {} stalls",
        report.processed, report.ticks, report.stalls
    );
    println!("\n{}", pipeline.monitor().generate_report());

    println!(
        "\nTopology:\n{}",
        serde_json::to_string_pretty(&pipeline.topology())?
    );

    Ok(())
}
