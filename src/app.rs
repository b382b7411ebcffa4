//! Headless Bevy integration
//!
//! Wraps the battle controller in a resource and drives it from the Bevy
//! schedule: console commands become intents, `Time` deltas advance the
//! turn clock, and published notices are rendered and written to the
//! session transcript.

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use std::io::BufRead;
use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;

use crate::audio::ConsoleAudio;
use crate::battle::script::{INTRO_MESSAGES, REWARD_MESSAGES};
use crate::battle::{BattleController, Combatant, GameMode, TutorialAction, TutorialPhase};
use crate::config_watcher::{ConfigWatcher, check_config_changes};
use crate::constants::CONSOLE_FPS;
use crate::debug_logging::DebugLogConfig;
use crate::events::{EventBus, Intent, Notice, TranscriptConfig, TranscriptLogger};
use crate::settings::{CurrentSettings, InitSettings, save_settings_system};
use crate::tuning::{BattleTuning, load_global_tuning};

pub type ConsoleController = BattleController<EventBus, ConsoleAudio>;

/// The running game session
#[derive(Resource)]
pub struct GameSession {
    pub controller: ConsoleController,
}

/// Lines typed on the console, fed by a reader thread
#[derive(Resource)]
pub struct ConsoleInput(pub Mutex<Receiver<String>>);

impl ConsoleInput {
    pub fn from_receiver(rx: Receiver<String>) -> Self {
        Self(Mutex::new(rx))
    }

    /// Spawn a thread forwarding stdin lines. The channel disconnects at EOF.
    pub fn spawn_stdin() -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self::from_receiver(rx)
    }
}

// =============================================================================
// CONSOLE COMMANDS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Intent(Intent),
    /// Pick one of the displayed choices (1-based)
    Choose(usize),
    Help,
    Status,
    ToggleMute,
    Quit,
}

pub const HELP_TEXT: &str = "\
Commands:
  <enter> | next        advance the tutorial text
  listen                hear the Dissonant Beast's next interval
  bend | jump | brace   answer higher | lower | same
  start                 start a battle
  1, 2, 3 | cast <name> cast a spell
  theme                 play the Great Harmony theme
  sound <note> [note]   play one or two notes
  status | mute | help | quit
  <topic> [payload]     post any intent by topic name";

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, Some(rest.trim())),
        None => (line, None),
    };

    let command = match word.to_lowercase().as_str() {
        "" | "n" | "next" => Command::Intent(Intent::AdvanceTutorial),
        "listen" => Command::Intent(Intent::PlayNextTutorialAttack),
        "bend" => Command::Intent(Intent::HandleTutorialAction(TutorialAction::Bend)),
        "jump" => Command::Intent(Intent::HandleTutorialAction(TutorialAction::Jump)),
        "brace" => Command::Intent(Intent::HandleTutorialAction(TutorialAction::Brace)),
        "start" | "fight" => Command::Intent(Intent::StartBattle),
        "theme" => Command::Intent(Intent::PlayGreatHarmonyTheme),
        "cast" => Command::Intent(Intent::from_topic("player-action", rest)?),
        "sound" => Command::Intent(Intent::from_topic("play-sound", rest)?),
        "help" | "?" => Command::Help,
        "status" => Command::Status,
        "mute" => Command::ToggleMute,
        "q" | "quit" | "exit" => Command::Quit,
        other => match other.parse::<usize>() {
            Ok(n) if n > 0 => Command::Choose(n),
            Ok(_) => return Err("Choices start at 1".to_string()),
            Err(_) => Command::Intent(Intent::from_topic(word, rest)?),
        },
    };
    Ok(command)
}

// =============================================================================
// CONSOLE VIEW
// =============================================================================

/// Presentation state rebuilt from published notices
#[derive(Resource, Debug, Default)]
pub struct ConsoleView {
    pub mode: GameMode,
    pub phase: TutorialPhase,
    pub player_health: Option<i32>,
    pub enemy_health: Option<i32>,
    pub choices: Vec<String>,
}

impl ConsoleView {
    /// Apply a notice and return the line to show, if any
    pub fn render(&mut self, notice: &Notice) -> Option<String> {
        match notice {
            Notice::Message(text) => Some(text.clone()),
            Notice::UpdateHealth { combatant, health } => {
                let label = match combatant {
                    Combatant::Player => {
                        self.player_health = Some(*health);
                        "You"
                    }
                    Combatant::Enemy => {
                        self.enemy_health = Some(*health);
                        "Enemy"
                    }
                };
                Some(format!("[{} HP: {}]", label, health))
            }
            Notice::SetGameState(mode) => {
                self.mode = *mode;
                match mode {
                    GameMode::Battle => Some("=== BATTLE ===".to_string()),
                    GameMode::Tutorial => None,
                }
            }
            Notice::SetTutorialPhase(phase) => {
                self.phase = *phase;
                match phase {
                    TutorialPhase::LearningPitch => Some(
                        "Type 'listen' to hear the Dissonant Beast, then answer: \
                         bend (higher), jump (lower) or brace (same)."
                            .to_string(),
                    ),
                    TutorialPhase::Reward => Some(REWARD_MESSAGES[0].to_string()),
                    _ => None,
                }
            }
            Notice::SetTutorialMessageIndex(index) => {
                let script: &[&str] = match self.phase {
                    TutorialPhase::Intro => &INTRO_MESSAGES,
                    TutorialPhase::Reward => &REWARD_MESSAGES,
                    _ => &[],
                };
                script.get(*index).map(|text| text.to_string())
            }
            Notice::SetTutorialCombatIndex(_) => None,
            Notice::SetChoices(choices) => {
                self.choices = choices.clone();
                let listed: Vec<String> = choices
                    .iter()
                    .enumerate()
                    .map(|(i, name)| format!("{}) {}", i + 1, name))
                    .collect();
                Some(format!("Choose: {}", listed.join("   ")))
            }
        }
    }

    pub fn status(&self) -> String {
        let hp = |h: Option<i32>| h.map_or("-".to_string(), |h| h.to_string());
        format!(
            "mode: {}  phase: {}  you: {}  enemy: {}",
            self.mode,
            self.phase,
            hp(self.player_health),
            hp(self.enemy_health)
        )
    }
}

// =============================================================================
// SYSTEMS
// =============================================================================

/// Open the transcript for this session
pub fn start_transcript(mut transcript: ResMut<TranscriptLogger>) {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    transcript.start_session(&timestamp);
}

pub fn begin_session(mut session: ResMut<GameSession>, settings: Option<Res<CurrentSettings>>) {
    session.controller.begin();
    if settings.is_some_and(|s| s.settings.skip_tutorial) {
        session.controller.channel_mut().post(Intent::StartBattle);
    }
}

/// Turn console lines into intents
pub fn read_console_input(
    input: Option<Res<ConsoleInput>>,
    mut session: ResMut<GameSession>,
    view: Res<ConsoleView>,
    mut settings: Option<ResMut<CurrentSettings>>,
) {
    let Some(input) = input else {
        return;
    };
    let Ok(rx) = input.0.lock() else {
        warn!("Console input lock poisoned");
        return;
    };

    loop {
        let line = match rx.try_recv() {
            Ok(line) => line,
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                debug!("Console input closed");
                session.controller.shutdown();
                break;
            }
        };

        match parse_command(&line) {
            Ok(Command::Intent(intent)) => session.controller.channel_mut().post(intent),
            Ok(Command::Choose(n)) => match view.choices.get(n - 1) {
                Some(name) => session
                    .controller
                    .channel_mut()
                    .post(Intent::PlayerAction(name.clone())),
                None => println!("No choice {}", n),
            },
            Ok(Command::Help) => println!("{}", HELP_TEXT),
            Ok(Command::Status) => println!("{}", view.status()),
            Ok(Command::ToggleMute) => {
                let audio = session.controller.audio_mut();
                audio.muted = !audio.muted;
                println!("Audio {}", if audio.muted { "muted" } else { "on" });
                if let Some(settings) = settings.as_mut() {
                    settings.settings.audio_enabled = !audio.muted;
                    settings.mark_dirty();
                }
            }
            Ok(Command::Quit) => {
                session.controller.shutdown();
                break;
            }
            Err(e) => println!("{} (type 'help')", e),
        }
    }
}

pub fn pump_intents(mut session: ResMut<GameSession>) {
    session.controller.pump();
}

/// Feed frame time into the turn clock
pub fn tick_turn_clock(time: Res<Time>, mut session: ResMut<GameSession>) {
    let elapsed_ms = time.elapsed().as_millis().min(u32::MAX as u128) as u32;
    session.controller.channel_mut().set_elapsed_ms(elapsed_ms);
    session.controller.update(time.delta());
}

/// Render and log everything the controller published this frame
pub fn publish_notices(
    mut session: ResMut<GameSession>,
    mut view: ResMut<ConsoleView>,
    mut transcript: Option<ResMut<TranscriptLogger>>,
) {
    for event in session.controller.channel_mut().drain() {
        if let Some(transcript) = transcript.as_mut() {
            transcript.log(&event);
        }
        if let Some(line) = view.render(&event.notice) {
            println!("{}", line);
        }
    }
    session.controller.channel_mut().clear_processed();
}

/// Close the transcript and exit once the session has shut down
pub fn finish_session(
    session: Res<GameSession>,
    transcript: Option<ResMut<TranscriptLogger>>,
    mut exit: MessageWriter<AppExit>,
) {
    if session.controller.is_active() {
        return;
    }
    if let Some(mut transcript) = transcript
        && transcript.is_active()
    {
        transcript.end_session();
    }
    exit.write(AppExit::Success);
}

// =============================================================================
// APP BUILDER
// =============================================================================

/// Builder for the headless game app
pub struct HeadlessAppBuilder {
    settings: InitSettings,
    tuning: Option<BattleTuning>,
    input: Option<ConsoleInput>,
    logging: Option<DebugLogConfig>,
}

impl HeadlessAppBuilder {
    pub fn new() -> Self {
        Self {
            settings: InitSettings::default(),
            tuning: None,
            input: None,
            logging: None,
        }
    }

    pub fn with_settings(mut self, settings: InitSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Use fixed tuning instead of config/battle_tuning.json
    pub fn with_tuning(mut self, tuning: BattleTuning) -> Self {
        self.tuning = Some(tuning);
        self
    }

    pub fn with_input(mut self, input: ConsoleInput) -> Self {
        self.input = Some(input);
        self
    }

    /// Install a LogPlugin configured from `config`
    pub fn with_logging(mut self, config: DebugLogConfig) -> Self {
        self.logging = Some(config);
        self
    }

    /// Build the app with minimal plugins and the session resources
    pub fn build(self) -> App {
        let mut app = App::new();

        app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(
            Duration::from_secs_f32(1.0 / CONSOLE_FPS),
        )));
        if let Some(logging) = &self.logging {
            app.add_plugins(logging.log_plugin());
        }

        let audio = ConsoleAudio::new(!self.settings.audio_enabled);
        let controller = match self.settings.seed {
            Some(seed) => BattleController::with_seed(EventBus::new(), audio, seed),
            None => BattleController::new(EventBus::new(), audio),
        };
        let tuning = self.tuning.unwrap_or_else(load_global_tuning);
        app.insert_resource(GameSession {
            controller: controller.with_tuning(tuning),
        });

        app.insert_resource(TranscriptLogger::new(TranscriptConfig {
            log_dir: self.settings.transcript_dir.clone().into(),
            enabled: self.settings.transcript_enabled,
        }));
        app.init_resource::<ConsoleView>();
        app.init_resource::<ConfigWatcher>();
        app.insert_resource(CurrentSettings::new(self.settings));
        if let Some(input) = self.input {
            app.insert_resource(input);
        }

        app.add_systems(Startup, (start_transcript, begin_session).chain());
        app.add_systems(
            Update,
            (
                read_console_input,
                pump_intents,
                tick_turn_clock,
                check_config_changes,
                publish_notices,
                save_settings_system,
                finish_session,
            )
                .chain(),
        );

        app
    }
}

impl Default for HeadlessAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
