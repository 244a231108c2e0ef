//! Restart sequencer state machine behavior

mod common;

use std::sync::Arc;
use std::time::Duration;

use palisade::notifications::Notifier;
use palisade::presence::{PresenceTracker, TrackerConfig};
use palisade::rcon::{RconConnector, RconSession};
use palisade::restart::{RestartFlag, RestartOutcome, RestartSequencer, RestartState};

use common::{
    harness, quick_stages, PanickingNotifier, ScriptedConnector, Step, NOTIFY_CHANNEL,
};

/// A full run: two warnings, the final broadcast, save, quit.
fn completed_run_steps() -> Vec<Step> {
    vec![
        Step::reply("ok"),
        Step::reply("ok"),
        Step::reply("ok"),
        Step::reply("World saved"),
        Step::reply("Quit"),
    ]
}

#[tokio::test(start_paused = true)]
async fn test_sequence_completes_in_order() {
    let h = harness(completed_run_steps());

    let outcome = h.sequencer.run().await;
    assert_eq!(outcome, RestartOutcome::Completed);
    assert!(outcome.is_success());
    assert_eq!(h.sequencer.state().await, RestartState::Completed);

    assert_eq!(
        h.connector.sent_commands().await,
        vec![
            String::from("servermsg \"restart in 20 seconds\""),
            String::from("servermsg \"restart in 10 seconds\""),
            String::from("servermsg \"Server restarting now...\""),
            String::from("save"),
            String::from("quit"),
        ],
    );

    let texts = h.notifier.sent_texts().await;
    assert!(texts[0].contains("20 seconds"));
    assert!(texts[1].contains("restarting now"));
    assert!(texts[2].contains("shortly"));
}

#[tokio::test(start_paused = true)]
async fn test_completed_sequence_clears_presence() {
    let mut steps = vec![Step::reply("Players connected (1): Alice")];
    steps.extend(completed_run_steps());
    let h = harness(steps);

    h.presence.poll().await;
    assert_eq!(h.presence.online_count().await, 1);

    assert_eq!(h.sequencer.run().await, RestartOutcome::Completed);
    assert_eq!(h.presence.online_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_flag_is_released_after_every_outcome() {
    let h = harness(completed_run_steps());

    assert!(!h.flag.is_set());
    h.sequencer.run().await;
    assert!(!h.flag.is_set());

    // Exhaust a second run through the save-failure path.
    let h = harness(vec![
        Step::reply("ok"),
        Step::reply("ok"),
        Step::reply("ok"),
        Step::ExecFail,
        Step::ExecFail,
        Step::ExecFail,
    ]);
    assert_eq!(h.sequencer.run().await, RestartOutcome::SaveFailed);
    assert!(!h.flag.is_set());
}

#[tokio::test(start_paused = true)]
async fn test_save_failure_aborts_before_quit() {
    let mut steps = vec![Step::reply("Players connected (1): Alice")];
    steps.extend(vec![
        Step::reply("ok"),
        Step::reply("ok"),
        Step::reply("ok"),
        Step::ExecFail,
        Step::ExecFail,
        Step::ExecFail,
    ]);
    let h = harness(steps);

    h.presence.poll().await;

    let outcome = h.sequencer.run().await;
    assert_eq!(outcome, RestartOutcome::SaveFailed);
    assert!(!outcome.is_success());
    assert_eq!(h.sequencer.state().await, RestartState::Aborted);

    // Quit was never attempted and the presence set was not cleared.
    let commands = h.connector.sent_commands().await;
    assert!(!commands.iter().any(|c| c == "quit"));
    assert_eq!(h.presence.online_count().await, 1);

    let texts = h.notifier.sent_texts().await;
    assert!(texts.iter().any(|t| t.contains("Save command failed")));
    assert!(!h.flag.is_set());
}

#[tokio::test(start_paused = true)]
async fn test_quit_failure_keeps_presence() {
    let mut steps = vec![Step::reply("Players connected (1): Alice")];
    steps.extend(vec![
        Step::reply("ok"),
        Step::reply("ok"),
        Step::reply("ok"),
        Step::reply("World saved"),
        Step::ExecFail,
        Step::ExecFail,
        Step::ExecFail,
    ]);
    let h = harness(steps);

    h.presence.poll().await;

    let outcome = h.sequencer.run().await;
    assert_eq!(outcome, RestartOutcome::QuitFailed);
    assert_eq!(h.sequencer.state().await, RestartState::Aborted);

    // Server state is unknown; the presence set must survive.
    assert_eq!(h.presence.online_count().await, 1);

    let texts = h.notifier.sent_texts().await;
    assert!(texts.iter().any(|t| t.contains("Manual intervention")));
    assert!(!h.flag.is_set());
}

#[tokio::test(start_paused = true)]
async fn test_failed_warnings_do_not_halt_countdown() {
    // Every broadcast fails (three attempts each), save and quit succeed.
    let mut steps = Vec::new();
    for _ in 0..9 {
        steps.push(Step::ExecFail);
    }
    steps.push(Step::reply("World saved"));
    steps.push(Step::reply("Quit"));
    let h = harness(steps);

    assert_eq!(h.sequencer.run().await, RestartOutcome::Completed);
}

#[tokio::test(start_paused = true)]
async fn test_second_trigger_reports_already_running() {
    let h = harness(completed_run_steps());

    let first = {
        let sequencer = Arc::clone(&h.sequencer);
        tokio::spawn(async move { sequencer.run().await })
    };

    // Let the first sequence reach its first stage wait.
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(h.flag.is_set());

    let second = h.sequencer.run().await;
    assert_eq!(second, RestartOutcome::AlreadyRunning);

    // The first sequence is unaffected by the rejected trigger.
    assert_eq!(first.await.unwrap(), RestartOutcome::Completed);
    assert!(!h.flag.is_set());
}

#[tokio::test(start_paused = true)]
async fn test_panic_in_sequence_releases_flag() {
    let connector = Arc::new(ScriptedConnector::new(vec![Step::reply("ok")]));
    let session = Arc::new(RconSession::new(
        Arc::clone(&connector) as Arc<dyn RconConnector>
    ));
    let notifier: Arc<dyn Notifier> = Arc::new(PanickingNotifier::new());
    let presence = Arc::new(PresenceTracker::new(
        Arc::clone(&session),
        Arc::clone(&notifier),
        NOTIFY_CHANNEL,
        TrackerConfig::default(),
    ));
    let flag = Arc::new(RestartFlag::new());
    let sequencer = RestartSequencer::new(
        session,
        notifier,
        NOTIFY_CHANNEL,
        presence,
        Arc::clone(&flag),
        quick_stages(),
    );

    // The first stage's Discord notice panics; the sequence reports a
    // generic failure and the flag is still released.
    let outcome = sequencer.run().await;
    assert_eq!(outcome, RestartOutcome::Failed);
    assert_eq!(sequencer.state().await, RestartState::Aborted);
    assert!(!flag.is_set());
}
