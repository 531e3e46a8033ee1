//! One external engine process: spawn, UCI handshake, option configuration,
//! and `position`/`go` request/response cycles.
//!
//! A dedicated reader thread is spawned alongside the child process and
//! forwards each stdout line over a channel; [`Engine::analyse`] and the
//! handshake both block on that channel with a timeout, which is how a
//! wedged or crashed engine is detected without relying on platform-specific
//! pipe read timeouts. Everything else about the driver is synchronous:
//! callers own an `Engine` exclusively and call into it from one thread at
//! a time, matching the pool's ownership model.

use std::io::Write;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::analysis::Analysis;
use crate::board::{Move, Position};
use crate::engine::parser::{parse_bestmove_line, parse_info_line};
use crate::engine::protocol::ProtocolConfig;
use crate::engine::EngineError;

const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

enum EngineLine {
    Line(String),
    Closed,
}

pub struct Engine {
    id: String,
    child: Child,
    stdin: ChildStdin,
    lines: Receiver<EngineLine>,
    protocol: ProtocolConfig,
    handshake_timeout: Duration,
    needs_newgame: bool,
    configured_multipv: Option<u32>,
}

impl Engine {
    pub fn spawn(id: impl Into<String>, protocol: ProtocolConfig) -> Result<Engine, EngineError> {
        Self::spawn_with_timeout(id, protocol, DEFAULT_HANDSHAKE_TIMEOUT)
    }

    pub fn spawn_with_timeout(
        id: impl Into<String>,
        protocol: ProtocolConfig,
        handshake_timeout: Duration,
    ) -> Result<Engine, EngineError> {
        let id = id.into();
        protocol.validate()?;

        let mut child = Command::new(&protocol.executable)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| EngineError::Spawn { path: protocol.executable.clone(), source })?;

        let stdout = child.stdout.take().expect("piped stdout is present");
        let stdin = child.stdin.take().expect("piped stdin is present");
        let lines = spawn_reader_thread(stdout);

        let mut engine = Engine {
            id,
            child,
            stdin,
            lines,
            protocol,
            handshake_timeout,
            needs_newgame: false,
            configured_multipv: None,
        };

        engine.handshake()?;
        Ok(engine)
    }

    fn handshake(&mut self) -> Result<(), EngineError> {
        let show_uci = self.protocol.show_uci.clone();
        self.send_line(&show_uci)?;
        self.await_token(&self.protocol.uci_ok_token.clone())?;
        debug!(engine_id = %self.id, "uci handshake: identification complete");

        for line in self.protocol.setup.clone() {
            self.send_line(&line)?;
        }

        let isready = self.protocol.isready.clone();
        self.send_line(&isready)?;
        self.await_token(&self.protocol.readyok_token.clone())?;
        debug!(engine_id = %self.id, "uci handshake: ready");
        Ok(())
    }

    pub fn set_multipv(&mut self, n: u32) -> Result<(), EngineError> {
        if self.configured_multipv == Some(n) {
            return Ok(());
        }
        let Some(template) = self.protocol.multipv_template.clone() else {
            return Err(EngineError::MissingTemplate("multipv_template"));
        };
        self.send_line(&ProtocolConfig::fill_int(&template, n as i64))?;
        self.configured_multipv = Some(n);
        self.sync_ready()
    }

    pub fn set_threads(&mut self, n: u32) -> Result<(), EngineError> {
        let Some(template) = self.protocol.threads_template.clone() else {
            return Err(EngineError::MissingTemplate("threads_template"));
        };
        self.send_line(&ProtocolConfig::fill_int(&template, n as i64))?;
        self.sync_ready()
    }

    pub fn set_hash_mb(&mut self, mb: u32) -> Result<(), EngineError> {
        let Some(template) = self.protocol.hash_template.clone() else {
            return Err(EngineError::MissingTemplate("hash_template"));
        };
        self.send_line(&ProtocolConfig::fill_int(&template, mb as i64))?;
        self.sync_ready()
    }

    pub fn set_chess960(&mut self, on: bool) -> Result<(), EngineError> {
        let Some(template) = self.protocol.chess960_template.clone() else {
            return Err(EngineError::MissingTemplate("chess960_template"));
        };
        self.send_line(&ProtocolConfig::fill_bool(&template, on))?;
        self.sync_ready()
    }

    pub fn set_wdl(&mut self, on: bool) -> Result<(), EngineError> {
        let Some(template) = self.protocol.wdl_template.clone() else {
            return Err(EngineError::MissingTemplate("wdl_template"));
        };
        self.send_line(&ProtocolConfig::fill_bool(&template, on))?;
        self.sync_ready()
    }

    /// Analyzes `position` under both a node cap and a wall-time cap,
    /// whichever the engine hits first. `accel`, if given, is consulted
    /// after every parsed `info` line; once it can no longer pass given
    /// what's in the grid so far, `stop` is sent early.
    pub fn analyse(
        &mut self,
        position: &Position,
        max_nodes: u64,
        max_time_ms: u64,
        mut accel: Option<&mut dyn FnMut(&Analysis) -> bool>,
    ) -> Result<Analysis, EngineError> {
        if self.needs_newgame {
            if let Some(newgame) = self.protocol.newgame.clone() {
                self.send_line(&newgame)?;
            }
            self.needs_newgame = false;
        }

        let position_cmd = ProtocolConfig::fill_str(&self.protocol.position_template, &position.to_fen());
        self.send_line(&position_cmd)?;
        self.sync_ready()?;

        let go_nodes = ProtocolConfig::fill_int(&self.protocol.go_nodes_template, max_nodes as i64);
        let go_time = ProtocolConfig::fill_int(&self.protocol.go_time_template, max_time_ms as i64);
        self.send_line(&go_nodes)?;
        self.send_line(&go_time)?;

        let mut analysis = Analysis::new();
        let deadline = Instant::now() + Duration::from_millis(max_time_ms.saturating_add(2000).max(1000));
        let mut stopped_early = false;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() && !stopped_early {
                self.send_line(&self.protocol.stop.clone())?;
                stopped_early = true;
            }
            match self.lines.recv_timeout(remaining.max(Duration::from_millis(1))) {
                Ok(EngineLine::Line(line)) => {
                    if let Some((_best, _ponder)) = parse_bestmove_line(&line) {
                        break;
                    }
                    match parse_info_line(&line) {
                        Some(output) => {
                            analysis.insert(output);
                            if !stopped_early {
                                if let Some(accel) = accel.as_deref_mut() {
                                    if !accel(&analysis) {
                                        self.send_line(&self.protocol.stop.clone())?;
                                        stopped_early = true;
                                    }
                                }
                            }
                        }
                        None if line.starts_with("info") => {
                            warn!(engine_id = %self.id, line = %line, "unparsable info line, skipped");
                        }
                        None => {}
                    }
                }
                Ok(EngineLine::Closed) | Err(RecvTimeoutError::Disconnected) => {
                    return Err(EngineError::UnexpectedExit);
                }
                Err(RecvTimeoutError::Timeout) => continue,
            }
        }

        self.needs_newgame = true;
        Ok(analysis)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn close(mut self) {
        let quit = self.protocol.quit.clone();
        let _ = self.send_line(&quit);
        let _ = self.child.wait();
    }

    fn sync_ready(&mut self) -> Result<(), EngineError> {
        let isready = self.protocol.isready.clone();
        self.send_line(&isready)?;
        self.await_token(&self.protocol.readyok_token.clone())
    }

    fn send_line(&mut self, line: &str) -> Result<(), EngineError> {
        writeln!(self.stdin, "{line}")?;
        self.stdin.flush()?;
        Ok(())
    }

    fn await_token(&mut self, token: &str) -> Result<(), EngineError> {
        let deadline = Instant::now() + self.handshake_timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(EngineError::HandshakeTimeout {
                    path: self.protocol.executable.clone(),
                    timeout_ms: self.handshake_timeout.as_millis() as u64,
                });
            }
            match self.lines.recv_timeout(remaining) {
                Ok(EngineLine::Line(line)) if line.trim() == token => return Ok(()),
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout) => {
                    return Err(EngineError::HandshakeTimeout {
                        path: self.protocol.executable.clone(),
                        timeout_ms: self.handshake_timeout.as_millis() as u64,
                    });
                }
                Err(RecvTimeoutError::Disconnected) => return Err(EngineError::UnexpectedExit),
            }
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn spawn_reader_thread(stdout: std::process::ChildStdout) -> Receiver<EngineLine> {
    use std::io::{BufRead, BufReader};

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let reader = BufReader::new(stdout);
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if tx.send(EngineLine::Line(line)).is_err() {
                        return;
                    }
                }
                Err(_) => break,
            }
        }
        let _ = tx.send(EngineLine::Closed);
    });
    rx
}

/// `Move`s accepted from bestmove lines may legitimately be `NO_MOVE`
/// (`"0000"`) in stalemate/mate edge cases some engines report; callers
/// treat that as "no best move available" rather than an error.
pub const NO_BEST_MOVE: Move = Move::NO_MOVE;
