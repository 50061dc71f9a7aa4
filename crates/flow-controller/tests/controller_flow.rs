//! # Controller Flow Tests
//!
//! Drives the wired controller with packet sequences the way the switch
//! would: unrecorded flows are dropped on query, an admission request records
//! the flow, later queries pass.

use std::sync::Arc;

use flow_controller::{Controller, ControllerConfig, MiningWorker, ObservedPacket, Verdict};
use flow_ledger::{FlowIntent, LedgerConfig};

fn config(offload_mining: bool) -> ControllerConfig {
    ControllerConfig {
        ledger: LedgerConfig::with_difficulty(1),
        offload_mining,
        ..ControllerConfig::default()
    }
}

fn packet(line: &str) -> ObservedPacket {
    line.parse().expect("well-formed packet line")
}

async fn run_sequence(controller: &Controller) {
    let handler = &controller.handler;

    assert_eq!(
        handler.handle(&packet("10.0.0.1 10.0.0.2 GET /data HTTP/1.1")).await,
        Verdict::Drop
    );
    assert_eq!(
        handler.handle(&packet("10.0.0.1 10.0.0.2 GET /add HTTP/1.1")).await,
        Verdict::Forward
    );
    assert_eq!(
        handler.handle(&packet("10.0.0.1 10.0.0.2 GET /data HTTP/1.1")).await,
        Verdict::Forward
    );
    // Reverse direction is a different flow
    assert_eq!(
        handler.handle(&packet("10.0.0.2 10.0.0.1 GET /data HTTP/1.1")).await,
        Verdict::Drop
    );
    // Plain traffic never touches the ledger
    assert_eq!(
        handler.handle(&packet("10.0.0.3 10.0.0.2 GET /index.html HTTP/1.1")).await,
        Verdict::Forward
    );
}

#[tokio::test]
async fn test_inline_controller_sequence() {
    let controller = Controller::new(&config(false)).unwrap();
    run_sequence(&controller).await;

    assert_eq!(controller.service.chain_len(), 2);
    assert!(controller.service.audit().is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_offloaded_controller_sequence() {
    let controller = Controller::new(&config(true)).unwrap();
    run_sequence(&controller).await;

    assert_eq!(controller.service.chain_len(), 2);
    assert!(controller.service.audit().is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_admissions_serialize_on_append() {
    let controller = Controller::new(&config(true)).unwrap();
    let worker = Arc::new(MiningWorker::new(Arc::clone(&controller.service)));

    let tasks: Vec<_> = (0..6)
        .map(|i| {
            let worker = Arc::clone(&worker);
            tokio::spawn(async move {
                let flow = format!("10.0.0.1 -> 10.0.4.{i}").parse().unwrap();
                flow_controller::FlowGate::decide(worker.as_ref(), FlowIntent::Admit, flow).await
            })
        })
        .collect();

    let mut admitted = 0;
    for task in tasks {
        if task.await.unwrap() {
            admitted += 1;
        }
    }

    assert!(admitted >= 1);
    assert_eq!(controller.service.chain_len(), admitted + 1);
    assert!(controller.service.audit().is_ok());
}

#[test]
fn test_invalid_difficulty_refuses_to_start() {
    let bad = ControllerConfig {
        ledger: LedgerConfig::with_difficulty(0),
        ..ControllerConfig::default()
    };
    assert!(Controller::new(&bad).is_err());
}
