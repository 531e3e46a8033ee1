//! JSON-Lines output sinks for the mining loop: a batched sink that appends
//! a wave's results to two files once the wave completes, and a streaming
//! sink that prints each record as soon as its analysis does, with `kind`
//! as the object's first key.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use crate::engine::Record;
use crate::mining::MiningError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Puzzle,
    NonPuzzle,
}

impl Kind {
    fn as_str(self) -> &'static str {
        match self {
            Kind::Puzzle => "puzzle",
            Kind::NonPuzzle => "nonpuzzle",
        }
    }
}

pub enum Sink {
    Batched { puzzles: BufWriter<File>, nonpuzzles: BufWriter<File> },
    Streaming { out: Mutex<Box<dyn Write + Send>> },
}

impl Sink {
    /// Opens (creating if absent) both output files before the first wave
    /// runs, so downstream tooling sees them even if the run produces
    /// nothing.
    pub fn batched(puzzles_path: impl AsRef<Path>, nonpuzzles_path: impl AsRef<Path>) -> Result<Sink, MiningError> {
        let open = |path: &Path| -> io::Result<File> { OpenOptions::new().create(true).append(true).open(path) };
        let puzzles = BufWriter::new(open(puzzles_path.as_ref())?);
        let nonpuzzles = BufWriter::new(open(nonpuzzles_path.as_ref())?);
        Ok(Sink::Batched { puzzles, nonpuzzles })
    }

    pub fn streaming(out: Box<dyn Write + Send>) -> Sink {
        Sink::Streaming { out: Mutex::new(out) }
    }

    pub fn streaming_stdout() -> Sink {
        Sink::streaming(Box::new(io::stdout()))
    }

    /// Writes one record. Batched mode appends (without `kind`) to the
    /// matching file; streaming mode writes immediately with `kind` as the
    /// object's first key.
    pub fn emit(&mut self, record: &Record, kind: Kind) -> Result<(), MiningError> {
        match self {
            Sink::Batched { puzzles, nonpuzzles } => {
                let writer = match kind {
                    Kind::Puzzle => puzzles,
                    Kind::NonPuzzle => nonpuzzles,
                };
                writeln!(writer, "{}", serde_json::to_string(record)?)?;
                Ok(())
            }
            Sink::Streaming { out } => {
                let value = record.to_json_value(Some(kind.as_str()));
                let mut out = out.lock().expect("streaming sink mutex not poisoned");
                writeln!(out, "{}", serde_json::to_string(&value)?)?;
                out.flush()?;
                Ok(())
            }
        }
    }

    /// Flushes buffered output; batched mode's per-wave flush point.
    pub fn flush(&mut self) -> Result<(), MiningError> {
        match self {
            Sink::Batched { puzzles, nonpuzzles } => {
                puzzles.flush()?;
                nonpuzzles.flush()?;
            }
            Sink::Streaming { out } => out.lock().expect("streaming sink mutex not poisoned").flush()?,
        }
        Ok(())
    }
}

#[cfg(test)]
struct Captured(std::sync::Arc<Mutex<Vec<u8>>>);

#[cfg(test)]
impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("capture mutex not poisoned").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::board::Position;

    #[test]
    fn streaming_sink_puts_kind_first() {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let mut sink = Sink::streaming(Box::new(Captured(captured.clone())));
        let record = Record::new(Position::starting());
        sink.emit(&record, Kind::Puzzle).unwrap();

        let text = String::from_utf8(captured.lock().unwrap().clone()).unwrap();
        assert!(text.starts_with("{\"kind\":\"puzzle\""));
    }

    #[test]
    fn batched_sink_touches_both_files_eagerly() {
        let dir = std::env::temp_dir().join(format!("chesstide-sink-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let puzzles = dir.join("puzzles.jsonl");
        let nonpuzzles = dir.join("nonpuzzles.jsonl");
        let _sink = Sink::batched(&puzzles, &nonpuzzles).unwrap();
        assert!(puzzles.exists());
        assert!(nonpuzzles.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
