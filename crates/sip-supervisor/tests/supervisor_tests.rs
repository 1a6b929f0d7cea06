mod common;

use common::{test_config, wait_until, CountingHandler, FakePjsua};
use fetap_sip_supervisor::{SipSupervisor, SupervisorCallState, SupervisorError};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;

struct Harness {
    pjsua: FakePjsua,
    handler: Arc<CountingHandler>,
    supervisor: SipSupervisor,
    _binary: NamedTempFile,
}

async fn start() -> Harness {
    let binary = NamedTempFile::new().unwrap();
    let pjsua = FakePjsua::new();
    let handler = Arc::new(CountingHandler::default());
    let supervisor = SipSupervisor::start(test_config(binary.path()), &pjsua, handler.clone())
        .await
        .unwrap();
    Harness {
        pjsua,
        handler,
        supervisor,
        _binary: binary,
    }
}

#[tokio::test]
async fn launches_unbuffered_pjsua_in_cli_mode() {
    let h = start().await;

    let (program, args) = h.pjsua.launched().unwrap();
    assert_eq!(program, PathBuf::from("stdbuf"));
    assert_eq!(args[0], "-o0");
    assert_eq!(PathBuf::from(&args[1]), h._binary.path());
    assert!(PathBuf::from(&args[1]).is_absolute());
    assert!(args.contains(&"--use-cli".to_string()));
    assert!(args.contains(&"--max-calls=3".to_string()));
}

#[tokio::test]
async fn relative_binary_is_launched_by_absolute_path() {
    let cwd = std::env::current_dir().unwrap();
    let binary = NamedTempFile::new_in(&cwd).unwrap();
    let relative = binary.path().strip_prefix(&cwd).unwrap().to_path_buf();
    assert!(relative.is_relative());

    let pjsua = FakePjsua::new();
    let supervisor = SipSupervisor::start(
        test_config(&relative),
        &pjsua,
        Arc::new(CountingHandler::default()),
    )
    .await
    .unwrap();

    let (_, args) = pjsua.launched().unwrap();
    assert_eq!(PathBuf::from(&args[1]), binary.path());
    supervisor.stop().await.unwrap();
}

#[tokio::test]
async fn commands_use_the_shell_syntax() {
    let h = start().await;

    assert_eq!(h.supervisor.call("alice@example.org").await.unwrap(), "OK");
    h.supervisor.accept_call().await.unwrap();
    h.supervisor.hangup_all().await.unwrap();

    assert!(h.pjsua.has_received("call new sip:alice@example.org"));
    assert!(h.pjsua.has_received("call answer 200"));
    assert!(h.pjsua.has_received("call hangup_all"));
}

#[tokio::test]
async fn polls_call_list_while_idle() {
    let h = start().await;

    wait_until(|| h.pjsua.received().iter().filter(|c| *c == "call list").count() >= 3).await;
    assert_eq!(h.supervisor.call_state(), SupervisorCallState::Idle);
    assert_eq!(h.handler.counts(), (0, 0, 0));
}

#[tokio::test]
async fn confirmed_call_connects_exactly_once() {
    let h = start().await;

    h.pjsua.set_calls(&["#0 sip:bob@example.org [CONFIRMED]"]);
    wait_until(|| h.handler.connected.load(std::sync::atomic::Ordering::SeqCst) == 1).await;

    // Several more polls see the same state
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.handler.counts(), (0, 1, 0));
    assert_eq!(h.supervisor.call_state(), SupervisorCallState::InCall);
}

#[tokio::test]
async fn inbound_call_lifecycle() {
    let h = start().await;
    let mut states = h.supervisor.subscribe();

    h.pjsua.set_calls(&["#0 sip:carol@example.org [INCOMING]"]);
    states.changed().await.unwrap();
    assert_eq!(*states.borrow(), SupervisorCallState::Incoming);
    assert_eq!(h.handler.counts(), (1, 0, 0));

    h.supervisor.accept_call().await.unwrap();
    h.pjsua.set_calls(&["#0 sip:carol@example.org [CONFIRMED]"]);
    states.changed().await.unwrap();
    assert_eq!(*states.borrow(), SupervisorCallState::InCall);
    assert_eq!(h.handler.counts(), (1, 1, 0));

    h.pjsua.set_calls(&[]);
    states.changed().await.unwrap();
    assert_eq!(*states.borrow(), SupervisorCallState::Idle);
    assert_eq!(h.handler.counts(), (1, 1, 1));
}

#[tokio::test]
async fn abandoned_outbound_attempt_reports_hangup() {
    let h = start().await;

    h.pjsua.set_calls(&["#0 sip:dave@example.org [CALLING]"]);
    wait_until(|| h.supervisor.call_state() == SupervisorCallState::Calling).await;
    assert_eq!(h.handler.counts(), (0, 0, 0));

    h.pjsua.set_calls(&[]);
    wait_until(|| h.supervisor.call_state() == SupervisorCallState::Idle).await;
    assert_eq!(h.handler.counts(), (0, 0, 1));
}

#[tokio::test]
async fn late_response_is_discarded() {
    let h = start().await;
    h.pjsua
        .delay_response("call answer 200", Duration::from_millis(300));

    let err = h
        .supervisor
        .send_command("call answer 200", Duration::from_millis(100))
        .await
        .unwrap_err();
    assert!(matches!(err, SupervisorError::Timeout { .. }));
    assert!(!err.is_fatal());

    // The late "OK" must not be mistaken for the next response
    let listing = h.supervisor.call_list().await.unwrap();
    assert!(listing.starts_with("Call list:"), "got {:?}", listing);
}

#[tokio::test]
async fn process_exit_is_fatal() {
    let h = start().await;

    h.pjsua.exit(1);
    let result = tokio::time::timeout(Duration::from_secs(2), h.supervisor.wait())
        .await
        .unwrap();

    assert!(matches!(
        result,
        Err(SupervisorError::ProcessDied { code: Some(1) })
    ));
}

#[tokio::test]
async fn closed_output_is_fatal() {
    let h = start().await;

    h.pjsua.close_output();
    let result = tokio::time::timeout(Duration::from_secs(2), h.supervisor.wait())
        .await
        .unwrap();

    assert!(matches!(result, Err(SupervisorError::ProcessDied { .. })));
}

#[tokio::test]
async fn crash_during_startup_fails_start() {
    let binary = NamedTempFile::new().unwrap();
    let pjsua = FakePjsua::crashing_on_startup();

    let result = SipSupervisor::start(
        test_config(binary.path()),
        &pjsua,
        Arc::new(CountingHandler::default()),
    )
    .await;

    assert!(matches!(result, Err(SupervisorError::ProcessDied { .. })));
}

#[tokio::test]
async fn stop_terminates_the_process() {
    let h = start().await;

    h.supervisor.stop().await.unwrap();

    assert!(h.pjsua.was_killed());
    assert!(matches!(
        h.supervisor.call_list().await,
        Err(SupervisorError::NotRunning)
    ));
    // Stopping twice is harmless
    h.supervisor.stop().await.unwrap();
}
