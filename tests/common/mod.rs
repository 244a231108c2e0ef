//! Common test fixtures
//!
//! A scripted RCON transport and a recording notifier, so the session
//! manager, presence tracker, and restart sequencer can be exercised
//! end-to-end without a game server or a Discord gateway.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use palisade::notifications::{MessageRef, Notifier, NotifyError, NotifyResult};
use palisade::presence::{PresenceTracker, TrackerConfig};
use palisade::rcon::{RconConnector, RconError, RconLink, RconResult, RconSession};
use palisade::restart::{RestartFlag, RestartSequencer, RestartStage, StageTable};

/// One scripted transport step, consumed in order
pub enum Step {
    /// The next connect attempt fails
    ConnectFail,
    /// The next command succeeds with this response
    Reply(String),
    /// The next command succeeds, then the link reports itself stale
    ReplyThenDeauth(String),
    /// The next command fails
    ExecFail,
}

impl Step {
    pub fn reply(text: &str) -> Self {
        Self::Reply(text.to_string())
    }
}

/// Scripted [`RconConnector`] with call counters
pub struct ScriptedConnector {
    script: Arc<Mutex<VecDeque<Step>>>,
    pub connects: Arc<AtomicUsize>,
    pub execs: Arc<AtomicUsize>,
    pub commands: Arc<Mutex<Vec<String>>>,
}

impl ScriptedConnector {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            script: Arc::new(Mutex::new(steps.into())),
            connects: Arc::new(AtomicUsize::new(0)),
            execs: Arc::new(AtomicUsize::new(0)),
            commands: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Commands executed so far, in order
    pub async fn sent_commands(&self) -> Vec<String> {
        self.commands.lock().await.clone()
    }

    /// Steps not yet consumed
    pub async fn remaining_steps(&self) -> usize {
        self.script.lock().await.len()
    }
}

struct ScriptedLink {
    script: Arc<Mutex<VecDeque<Step>>>,
    execs: Arc<AtomicUsize>,
    commands: Arc<Mutex<Vec<String>>>,
    authed: AtomicBool,
}

#[async_trait]
impl RconLink for ScriptedLink {
    async fn exec(&mut self, command: &str) -> RconResult<String> {
        self.execs.fetch_add(1, Ordering::SeqCst);
        self.commands.lock().await.push(command.to_string());

        match self.script.lock().await.pop_front() {
            // An exhausted script keeps succeeding with an empty response.
            None => Ok(String::new()),
            Some(Step::Reply(text)) => Ok(text),
            Some(Step::ReplyThenDeauth(text)) => {
                self.authed.store(false, Ordering::SeqCst);
                Ok(text)
            }
            Some(Step::ExecFail) | Some(Step::ConnectFail) => {
                Err(RconError::Exec(String::from("scripted failure")))
            }
        }
    }

    fn is_authenticated(&self) -> bool {
        self.authed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RconConnector for ScriptedConnector {
    async fn connect(&self) -> RconResult<Box<dyn RconLink>> {
        self.connects.fetch_add(1, Ordering::SeqCst);

        let mut script = self.script.lock().await;
        if matches!(script.front(), Some(Step::ConnectFail)) {
            script.pop_front();
            return Err(RconError::Connect(String::from("scripted refusal")));
        }

        Ok(Box::new(ScriptedLink {
            script: Arc::clone(&self.script),
            execs: Arc::clone(&self.execs),
            commands: Arc::clone(&self.commands),
            authed: AtomicBool::new(true),
        }))
    }
}

/// Recording [`Notifier`] for asserting what would have been announced
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(u64, String)>>,
    pub deleted: Mutex<Vec<MessageRef>>,
    pub fail_sends: AtomicBool,
    next_id: AtomicU64,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            fail_sends: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
        }
    }

    /// Texts sent so far, in order
    pub async fn sent_texts(&self) -> Vec<String> {
        self.sent.lock().await.iter().map(|(_, t)| t.clone()).collect()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn deleted_count(&self) -> usize {
        self.deleted.lock().await.len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, channel_id: u64, text: &str) -> NotifyResult<MessageRef> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(NotifyError::Platform(String::from("scripted failure")));
        }

        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().await.push((channel_id, text.to_string()));
        Ok(MessageRef {
            channel_id,
            message_id,
        })
    }

    async fn delete(&self, message: &MessageRef) -> NotifyResult<()> {
        self.deleted.lock().await.push(*message);
        Ok(())
    }
}

/// Notifier that panics on its first send, for the unexpected-failure path
pub struct PanickingNotifier {
    tripped: AtomicBool,
}

impl PanickingNotifier {
    pub fn new() -> Self {
        Self {
            tripped: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Notifier for PanickingNotifier {
    async fn send(&self, channel_id: u64, _text: &str) -> NotifyResult<MessageRef> {
        if !self.tripped.swap(true, Ordering::SeqCst) {
            panic!("scripted notifier panic");
        }
        Ok(MessageRef {
            channel_id,
            message_id: 1,
        })
    }

    async fn delete(&self, _message: &MessageRef) -> NotifyResult<()> {
        Ok(())
    }
}

/// Channel id used by all fixtures
pub const NOTIFY_CHANNEL: u64 = 99;

/// A two-stage countdown table with short waits, for paused-time tests
pub fn quick_stages() -> StageTable {
    StageTable::new(vec![
        RestartStage::with_notice(
            "20 seconds",
            20,
            "restart in 20 seconds",
            "**restart in 20 seconds**",
            std::time::Duration::from_secs(1),
        ),
        RestartStage::quiet(
            "10 seconds",
            10,
            "restart in 10 seconds",
            std::time::Duration::from_secs(1),
        ),
    ])
    .expect("quick stage table is valid")
}

/// Everything wired together over a scripted transport
pub struct Harness {
    pub connector: Arc<ScriptedConnector>,
    pub session: Arc<RconSession>,
    pub notifier: Arc<RecordingNotifier>,
    pub presence: Arc<PresenceTracker>,
    pub flag: Arc<RestartFlag>,
    pub sequencer: Arc<RestartSequencer>,
}

/// Build a full harness over the given transport script
pub fn harness(steps: Vec<Step>) -> Harness {
    let connector = Arc::new(ScriptedConnector::new(steps));
    let session = Arc::new(RconSession::new(
        Arc::clone(&connector) as Arc<dyn RconConnector>
    ));
    let notifier = Arc::new(RecordingNotifier::new());
    let presence = Arc::new(PresenceTracker::new(
        Arc::clone(&session),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
        NOTIFY_CHANNEL,
        TrackerConfig::default(),
    ));
    let flag = Arc::new(RestartFlag::new());
    let sequencer = Arc::new(RestartSequencer::new(
        Arc::clone(&session),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
        NOTIFY_CHANNEL,
        Arc::clone(&presence),
        Arc::clone(&flag),
        quick_stages(),
    ));

    Harness {
        connector,
        session,
        notifier,
        presence,
        flag,
        sequencer,
    }
}
