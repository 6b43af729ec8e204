//! Fire-and-forget playback. A [`Player`] starts a clip and returns at once;
//! nothing reports back when the clip ends. Starting a new clip replaces the
//! current one and `stop` is safe to call when nothing is playing.

use std::io;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::config::Settings;

/// How often a looping clip checks whether it has to restart.
const LOOP_POLL: Duration = Duration::from_millis(50);

pub trait Player {
    /// Start playing `path`, replacing whatever is playing now.
    fn play(&mut self, path: &Path, looped: bool) -> Result<()>;
    /// Halt playback. Idempotent.
    fn stop(&mut self) -> Result<()>;
}

/// Pick the player named in the settings, falling back to a platform default
/// and finally to the desktop's default handler.
pub fn from_settings(settings: &Settings) -> Box<dyn Player> {
    let configured = settings
        .player
        .as_ref()
        .filter(|command| !command.is_empty())
        .cloned();

    match configured.or_else(platform_command) {
        Some(mut command) => {
            let program = command.remove(0);
            info!("playing clips with `{program}`");
            Box::new(CommandPlayer::new(program, command))
        }
        None => {
            info!("no player command available, using the system opener");
            Box::new(SystemOpener)
        }
    }
}

fn platform_command() -> Option<Vec<String>> {
    if cfg!(target_os = "linux") {
        Some(vec!["aplay".to_string(), "-q".to_string()])
    } else if cfg!(target_os = "macos") {
        Some(vec!["afplay".to_string()])
    } else {
        None
    }
}

/// Plays clips by running an external command with the clip path as its last
/// argument. Looping restarts the command from a background thread until
/// [`Player::stop`] is called or another clip starts.
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
    current: Option<Playback>,
}

struct Playback {
    child: Arc<Mutex<Option<Child>>>,
    cancelled: Arc<AtomicBool>,
}

impl CommandPlayer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            current: None,
        }
    }
}

impl Player for CommandPlayer {
    fn play(&mut self, path: &Path, looped: bool) -> Result<()> {
        self.stop()?;

        let child = spawn(&self.program, &self.args, path)
            .with_context(|| format!("failed to start `{}`", self.program))?;
        debug!("playing {} (loop: {looped})", path.display());

        let playback = Playback {
            child: Arc::new(Mutex::new(Some(child))),
            cancelled: Arc::new(AtomicBool::new(false)),
        };

        if looped {
            let child = Arc::clone(&playback.child);
            let cancelled = Arc::clone(&playback.cancelled);
            let program = self.program.clone();
            let args = self.args.clone();
            let path = path.to_path_buf();
            thread::Builder::new()
                .name("soundboard-loop".to_string())
                .spawn(move || keep_looping(&child, &cancelled, &program, &args, &path))
                .context("failed to start loop thread")?;
        }

        self.current = Some(playback);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let Some(playback) = self.current.take() else {
            return Ok(());
        };
        playback.cancelled.store(true, Ordering::SeqCst);

        if let Some(mut child) = lock(&playback.child).take() {
            if let Err(err) = child.kill() {
                debug!("player already gone: {err}");
            }
            if let Err(err) = child.wait() {
                warn!("failed to reap player process: {err}");
            }
        }
        Ok(())
    }
}

impl Drop for CommandPlayer {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn spawn(program: &str, args: &[String], path: &Path) -> io::Result<Child> {
    Command::new(program)
        .args(args)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
}

fn keep_looping(
    child: &Mutex<Option<Child>>,
    cancelled: &AtomicBool,
    program: &str,
    args: &[String],
    path: &Path,
) {
    loop {
        thread::sleep(LOOP_POLL);
        if cancelled.load(Ordering::SeqCst) {
            break;
        }

        let mut slot = lock(child);
        let finished = match slot.as_mut() {
            Some(running) => !matches!(running.try_wait(), Ok(None)),
            None => break,
        };
        if !finished {
            continue;
        }

        match spawn(program, args, path) {
            Ok(next) => *slot = Some(next),
            Err(err) => {
                warn!("stopping loop of {}: {err}", path.display());
                *slot = None;
                break;
            }
        }
    }
}

fn lock(child: &Mutex<Option<Child>>) -> MutexGuard<'_, Option<Child>> {
    child.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Hands the clip to the operating system's default application. That
/// application owns playback from then on, so looping and stopping are not
/// available.
pub struct SystemOpener;

impl Player for SystemOpener {
    fn play(&mut self, path: &Path, looped: bool) -> Result<()> {
        if looped {
            warn!("the system opener cannot loop {}", path.display());
        }
        open::that(path).with_context(|| format!("failed to open {}", path.display()))
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Instant;

    /// `sh -c 'sleep 30' sh <path>`: runs long enough that only `stop` ends it.
    fn sleeper() -> CommandPlayer {
        CommandPlayer::new(
            "sh",
            vec!["-c".to_string(), "sleep 30".to_string(), "sh".to_string()],
        )
    }

    #[test]
    fn stop_without_playback_is_a_no_op() {
        let mut player = sleeper();
        player.stop().unwrap();
        player.stop().unwrap();
    }

    #[test]
    fn stop_halts_a_running_clip() {
        let mut player = sleeper();
        let started = Instant::now();
        player.play(Path::new("/tmp/clip.wav"), false).unwrap();
        player.stop().unwrap();
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(player.current.is_none());
    }

    #[test]
    fn looping_clip_stops_too() {
        let mut player = sleeper();
        player.play(Path::new("/tmp/clip.wav"), true).unwrap();
        thread::sleep(LOOP_POLL * 3);
        player.stop().unwrap();
        assert!(player.current.is_none());
    }

    #[test]
    fn missing_program_is_reported() {
        let mut player = CommandPlayer::new("soundboard-no-such-player", Vec::new());
        assert!(player.play(Path::new("/tmp/clip.wav"), false).is_err());
    }
}
