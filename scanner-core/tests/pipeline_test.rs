//! Integration tests for the scan pipeline
//! Drives the pipeline with in-memory input and a recording transport

use async_trait::async_trait;
use scanner_core::catalog::ModeCatalog;
use scanner_core::models::{Action, HttpMethod, ModeDefinition, OutgoingPayload};
use scanner_core::pipeline::{DispatchOutcome, ExitReason, ScanPipeline};
use scanner_core::state::ModeStateMachine;
use scanner_core::transport::{
    DispatchRequest, HttpTransport, TransportError, TransportResponse,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use url::Url;

/// Records every request and answers from a script (200 once the script runs out)
#[derive(Clone, Default)]
struct RecordingTransport {
    sent: Arc<Mutex<Vec<DispatchRequest>>>,
    script: Arc<Mutex<VecDeque<Result<u16, String>>>>,
}

impl RecordingTransport {
    fn scripted(responses: Vec<Result<u16, String>>) -> Self {
        Self {
            sent: Arc::default(),
            script: Arc::new(Mutex::new(responses.into())),
        }
    }

    fn sent(&self) -> Vec<DispatchRequest> {
        self.sent.lock().unwrap().clone()
    }

    fn payloads(&self) -> Vec<OutgoingPayload> {
        self.sent().into_iter().map(|r| r.payload).collect()
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn send(&self, request: &DispatchRequest) -> Result<TransportResponse, TransportError> {
        self.sent.lock().unwrap().push(request.clone());
        match self.script.lock().unwrap().pop_front() {
            None | Some(Ok(200)) => Ok(TransportResponse {
                status: 200,
                body: "ok".to_string(),
            }),
            Some(Ok(status)) => Ok(TransportResponse {
                status,
                body: "rejected".to_string(),
            }),
            Some(Err(message)) => Err(TransportError::InvalidRequest(message)),
        }
    }

    fn name(&self) -> &str {
        "recording"
    }
}

fn mode(name: &str) -> ModeDefinition {
    let endpoint = format!("http://scanner.test/{}", name.to_lowercase());
    ModeDefinition::new(name, Url::parse(&endpoint).unwrap())
}

fn catalog() -> ModeCatalog {
    let default = mode("DEFAULT");

    let mut inventory = mode("INVENTORY");
    inventory.exact_triggers = vec!["MODE-INV".to_string()];

    let mut stock = mode("STOCK");
    stock.prefix_triggers = vec!["S-".to_string()];
    stock.strip_prefix = true;

    let mut count = mode("COUNT");
    count.exact_triggers = vec!["MODE-COUNT".to_string()];
    count.enable_input = true;
    count.enable_trigger_request = true;

    let mut notes = mode("NOTES");
    notes.exact_triggers = vec!["MODE-NOTES".to_string()];
    notes.prefix_triggers = vec!["N-".to_string()];
    notes.enable_input = true;
    notes.eval_math_ops = false;
    notes.method = HttpMethod::Get;

    ModeCatalog::load(vec![default, inventory, stock, count, notes]).unwrap()
}

fn pipeline(
    transport: RecordingTransport,
    idle_timeout: Option<Duration>,
) -> (
    ScanPipeline<RecordingTransport, Vec<u8>>,
    mpsc::Sender<String>,
) {
    let machine = ModeStateMachine::new(Arc::new(catalog()), "DEFAULT").unwrap();
    let (tx, rx) = mpsc::channel(16);
    let pipeline = ScanPipeline::new(machine, idle_timeout, rx, transport, Vec::new());
    (pipeline, tx)
}

async fn feed(tx: &mpsc::Sender<String>, lines: &[&str]) {
    for line in lines {
        tx.send(line.to_string()).await.unwrap();
    }
}

#[tokio::test]
async fn test_plain_scan_goes_to_default_mode() {
    let transport = RecordingTransport::default();
    let (mut pipeline, tx) = pipeline(transport.clone(), None);

    feed(&tx, &["4006381333931"]).await;
    drop(tx);

    assert_eq!(
        pipeline.run(std::future::pending()).await,
        ExitReason::EndOfInput
    );

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method, HttpMethod::Post);
    assert_eq!(sent[0].endpoint.as_str(), "http://scanner.test/default");
    assert_eq!(
        sent[0].payload,
        OutgoingPayload::scan("4006381333931", "DEFAULT")
    );
}

#[tokio::test]
async fn test_exact_trigger_switches_without_dispatch() {
    let transport = RecordingTransport::default();
    let (mut pipeline, tx) = pipeline(transport.clone(), None);

    feed(&tx, &["MODE-INV", "111", "222"]).await;
    drop(tx);
    pipeline.run(std::future::pending()).await;

    assert_eq!(pipeline.machine().current_mode().name, "INVENTORY");
    assert_eq!(
        transport.payloads(),
        vec![
            OutgoingPayload::scan("111", "INVENTORY"),
            OutgoingPayload::scan("222", "INVENTORY"),
        ]
    );
}

#[tokio::test]
async fn test_trigger_request_announces_switch() {
    let transport = RecordingTransport::default();
    let (mut pipeline, _tx) = pipeline(transport.clone(), None);

    let outcomes = pipeline.process_line("MODE-COUNT").await;
    assert_eq!(outcomes, vec![DispatchOutcome::Sent { status: 200 }]);

    let sent = transport.sent();
    assert_eq!(sent[0].endpoint.as_str(), "http://scanner.test/count");
    assert_eq!(sent[0].payload.action, Action::Mode);
    assert_eq!(sent[0].payload.barcode, "MODE-COUNT");
    assert_eq!(sent[0].payload.mode, "COUNT");
}

#[tokio::test]
async fn test_prefix_override_is_one_shot() {
    let transport = RecordingTransport::default();
    let (mut pipeline, _tx) = pipeline(transport.clone(), None);

    pipeline.process_line("S-42").await;
    pipeline.process_line("43").await;

    assert_eq!(pipeline.machine().current_mode().name, "DEFAULT");
    assert_eq!(
        transport.payloads(),
        vec![
            OutgoingPayload::scan("42", "STOCK").with_raw_barcode("S-42"),
            OutgoingPayload::scan("43", "DEFAULT"),
        ]
    );
    assert_eq!(transport.sent()[0].endpoint.as_str(), "http://scanner.test/stock");
}

#[tokio::test]
async fn test_supplemental_input_is_evaluated() {
    let transport = RecordingTransport::default();
    let (mut pipeline, tx) = pipeline(transport.clone(), None);

    pipeline.process_line("MODE-COUNT").await;
    feed(&tx, &["12 * 3"]).await;
    pipeline.process_line("ITEM-7").await;

    let payloads = transport.payloads();
    assert_eq!(payloads.len(), 2);
    assert_eq!(
        payloads[1],
        OutgoingPayload::scan("ITEM-7", "COUNT").with_input("36")
    );
}

#[tokio::test]
async fn test_supplemental_input_kept_raw_when_evaluation_disabled() {
    let transport = RecordingTransport::default();
    let (mut pipeline, tx) = pipeline(transport.clone(), None);

    feed(&tx, &["1+1"]).await;
    pipeline.process_line("N-55").await;

    let payload = &transport.payloads()[0];
    assert_eq!(payload.mode, "NOTES");
    assert_eq!(payload.barcode, "N-55");
    assert_eq!(payload.raw_barcode, None);
    assert_eq!(payload.input.as_deref(), Some("1+1"));
    assert_eq!(payload.action, Action::ScanWithInput);
}

#[tokio::test]
async fn test_unevaluable_input_falls_back_to_text() {
    let transport = RecordingTransport::default();
    let (mut pipeline, tx) = pipeline(transport.clone(), None);

    pipeline.process_line("MODE-COUNT").await;
    feed(&tx, &["box of 12"]).await;
    pipeline.process_line("ITEM-8").await;

    assert_eq!(transport.payloads()[1].input.as_deref(), Some("box of 12"));
}

#[tokio::test]
async fn test_empty_supplemental_input_is_omitted() {
    let transport = RecordingTransport::default();
    let (mut pipeline, tx) = pipeline(transport.clone(), None);

    pipeline.process_line("MODE-COUNT").await;
    feed(&tx, &["   "]).await;
    pipeline.process_line("ITEM-9").await;

    assert_eq!(
        transport.payloads()[1],
        OutgoingPayload::scan("ITEM-9", "COUNT")
    );
}

#[tokio::test]
async fn test_blank_and_escape_only_lines_are_skipped() {
    let transport = RecordingTransport::default();
    let (mut pipeline, tx) = pipeline(transport.clone(), None);

    feed(&tx, &["", "   ", "\u{1b}[A", "\u{1b}[B77\u{1b}[C"]).await;
    drop(tx);
    pipeline.run(std::future::pending()).await;

    assert_eq!(
        transport.payloads(),
        vec![OutgoingPayload::scan("77", "DEFAULT")]
    );
}

#[tokio::test]
async fn test_failures_do_not_stop_processing() {
    let transport = RecordingTransport::scripted(vec![
        Ok(500),
        Err("connection refused".to_string()),
        Ok(200),
    ]);
    let (mut pipeline, _tx) = pipeline(transport.clone(), None);

    assert_eq!(
        pipeline.process_line("1").await,
        vec![DispatchOutcome::Rejected {
            status: 500,
            body: "rejected".to_string()
        }]
    );
    assert!(matches!(
        pipeline.process_line("2").await.as_slice(),
        [DispatchOutcome::Failed { .. }]
    ));
    assert_eq!(
        pipeline.process_line("3").await,
        vec![DispatchOutcome::Sent { status: 200 }]
    );
    assert_eq!(transport.sent().len(), 3);
}

#[tokio::test]
async fn test_console_output_reports_dispatches() {
    let transport = RecordingTransport::scripted(vec![Ok(404)]);
    let (mut pipeline, tx) = pipeline(transport, None);

    feed(&tx, &["MODE-INV", "X1"]).await;
    drop(tx);
    pipeline.run(std::future::pending()).await;

    let output = String::from_utf8(pipeline.into_output()).unwrap();
    assert!(output.contains("Switched mode to"));
    assert!(output.contains("INVENTORY"));
    assert!(output.contains("404"));
    assert!(output.contains(r#""barcode":"X1""#));
}

#[tokio::test]
async fn test_shutdown_signal_interrupts() {
    let transport = RecordingTransport::default();
    let (mut pipeline, _tx) = pipeline(transport.clone(), None);

    let reason = pipeline.run(async {}).await;

    assert_eq!(reason, ExitReason::Interrupted);
    assert!(transport.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_idle_timeout_reverts_to_default() {
    let transport = RecordingTransport::default();
    let (mut pipeline, tx) = pipeline(transport.clone(), Some(Duration::from_secs(10)));

    let driver = async move {
        feed(&tx, &["MODE-INV", "A1"]).await;
        sleep(Duration::from_secs(11)).await;
        feed(&tx, &["A2"]).await;
    };

    let (reason, _) = tokio::join!(pipeline.run(std::future::pending()), driver);

    assert_eq!(reason, ExitReason::EndOfInput);
    assert_eq!(
        transport.payloads(),
        vec![
            OutgoingPayload::scan("A1", "INVENTORY"),
            OutgoingPayload::scan("A2", "DEFAULT"),
        ]
    );
    assert!(!pipeline.is_idle_timer_armed());
}

#[tokio::test(start_paused = true)]
async fn test_activity_restarts_idle_countdown() {
    let transport = RecordingTransport::default();
    let (mut pipeline, tx) = pipeline(transport.clone(), Some(Duration::from_secs(10)));

    let driver = async move {
        feed(&tx, &["MODE-INV"]).await;
        sleep(Duration::from_secs(7)).await;
        feed(&tx, &["B1"]).await;
        sleep(Duration::from_secs(7)).await;
        feed(&tx, &["B2"]).await;
    };

    tokio::join!(pipeline.run(std::future::pending()), driver);

    assert_eq!(
        transport.payloads(),
        vec![
            OutgoingPayload::scan("B1", "INVENTORY"),
            OutgoingPayload::scan("B2", "INVENTORY"),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_prefix_override_leaves_idle_countdown_running() {
    let transport = RecordingTransport::default();
    let (mut pipeline, tx) = pipeline(transport.clone(), Some(Duration::from_secs(10)));

    let driver = async move {
        feed(&tx, &["MODE-INV"]).await;
        sleep(Duration::from_secs(6)).await;
        feed(&tx, &["S-1"]).await;
        sleep(Duration::from_secs(5)).await;
        feed(&tx, &["C1"]).await;
    };

    tokio::join!(pipeline.run(std::future::pending()), driver);

    assert_eq!(
        transport.payloads(),
        vec![
            OutgoingPayload::scan("1", "STOCK").with_raw_barcode("S-1"),
            OutgoingPayload::scan("C1", "DEFAULT"),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_no_idle_timeout_keeps_mode() {
    let transport = RecordingTransport::default();
    let (mut pipeline, tx) = pipeline(transport.clone(), None);

    let driver = async move {
        feed(&tx, &["MODE-INV"]).await;
        sleep(Duration::from_secs(3600)).await;
        feed(&tx, &["D1"]).await;
    };

    tokio::join!(pipeline.run(std::future::pending()), driver);

    assert_eq!(
        transport.payloads(),
        vec![OutgoingPayload::scan("D1", "INVENTORY")]
    );
    assert_eq!(pipeline.machine().current_mode().name, "INVENTORY");
}
