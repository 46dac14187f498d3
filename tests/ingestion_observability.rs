use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use rust_data_consolidation::IngestionError;
use rust_data_consolidation::ingestion::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionOptions,
    IngestionSeverity, IngestionStats, TracingObserver, ingest_batch, load_from_path,
};

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<(String, IngestionStats)>>,
    failures: Mutex<Vec<(String, IngestionSeverity)>>,
    alerts: Mutex<Vec<IngestionSeverity>>,
}

impl IngestionObserver for RecordingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.successes.lock().unwrap().push((ctx.name.clone(), stats));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.failures.lock().unwrap().push((ctx.name.clone(), severity));
    }

    fn on_alert(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

#[test]
fn observer_receives_failure_and_alert_on_critical_io_error() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = IngestionOptions {
        observer: Some(obs.clone()),
        alert_at_or_above: IngestionSeverity::Critical,
        ..Default::default()
    };

    // Missing file -> Io error -> Critical
    let _ = load_from_path("tests/fixtures/does_not_exist.csv", &opts).unwrap_err();

    let failures = obs.failures.lock().unwrap().clone();
    let alerts = obs.alerts.lock().unwrap().clone();
    assert_eq!(
        failures,
        vec![("does_not_exist.csv".to_string(), IngestionSeverity::Critical)]
    );
    assert_eq!(alerts, vec![IngestionSeverity::Critical]);
}

#[test]
fn batch_reports_each_outcome_with_its_severity() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = IngestionOptions {
        observer: Some(obs.clone()),
        alert_at_or_above: IngestionSeverity::Error,
        ..Default::default()
    };
    let files = vec![
        (b"Produto,Valor\nCaneta,1\nLapis,2\n".to_vec(), "ok.csv"),
        (b"x".to_vec(), "foto.png"),
        (b"a,a\n1,2\n".to_vec(), "conflito.csv"),
    ];

    let _ = ingest_batch(files, &opts).unwrap();

    assert_eq!(
        obs.successes.lock().unwrap().clone(),
        vec![("ok.csv".to_string(), IngestionStats { tables: 1, rows: 2 })]
    );
    assert_eq!(
        obs.failures.lock().unwrap().clone(),
        vec![
            ("foto.png".to_string(), IngestionSeverity::Warning),
            ("conflito.csv".to_string(), IngestionSeverity::Error),
        ]
    );
    // Only the label conflict reaches the Error threshold.
    assert_eq!(obs.alerts.lock().unwrap().clone(), vec![IngestionSeverity::Error]);
}

#[test]
fn composite_and_file_observers_fan_out() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let log_path = std::env::temp_dir().join(format!("rust-data-consolidation-audit-{nanos}.log"));

    let recording = Arc::new(RecordingObserver::default());
    let composite = CompositeObserver::new(vec![
        recording.clone() as Arc<dyn IngestionObserver>,
        Arc::new(FileObserver::new(&log_path)),
        Arc::new(TracingObserver),
    ]);
    let opts = IngestionOptions {
        observer: Some(Arc::new(composite)),
        ..Default::default()
    };

    let _ = load_from_path("tests/fixtures/vendas_janeiro.csv", &opts).unwrap();
    let _ = load_from_path("tests/fixtures/missing.csv", &opts).unwrap_err();

    assert_eq!(recording.successes.lock().unwrap().len(), 1);
    assert_eq!(recording.failures.lock().unwrap().len(), 1);

    let log = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains(" ok format=Some(Csv) name=vendas_janeiro.csv tables=1 rows=5"));
    assert!(lines[1].contains(" fail severity=Critical"));
    assert!(lines[2].contains(" ALERT severity=Critical"));

    std::fs::remove_file(&log_path).unwrap();
}
