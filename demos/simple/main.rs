use std::sync::Arc;

use procmine::{AnalysisRequest, EngineBuilder, EventLog};

fn main() {
    let engine = EngineBuilder::new().build().unwrap();

    let text = include_str!("./log.json");
    let log = Arc::new(EventLog::from_json(text).unwrap());

    for metric in log.metrics() {
        println!("Metric: {} ({}), {} samples", metric.metric_name, metric.metric_unit, metric.sample_count);
    }

    let requests = [
        r#"{"analysis_type": "process-map"}"#,
        r#"{"analysis_type": "organization", "aggregation_level": "department"}"#,
        r#"{"analysis_type": "path-outcome", "metric_name": "revenue"}"#,
        r#"{"analysis_type": "segment-comparison", "metric_name": "revenue", "segment_mode": "top25"}"#,
    ]
    .into_iter()
    .map(|r| AnalysisRequest::from_json(r).unwrap())
    .collect::<Vec<_>>();

    for request in requests {
        let analysis_type = request.analysis_type();
        match engine.run_blocking(request, log.clone()) {
            Ok(output) => {
                let json: serde_json::Value = serde_json::from_str(&output.to_json().unwrap()).unwrap();
                println!("{}: {:#}", analysis_type, json["result"]);
            }
            Err(e) => println!("{} failed: {}", analysis_type, e),
        }
    }
}
