// src/monitor.rs
use std::io::{self, BufRead};
use std::time::{Duration, Instant};

use crate::config::{ErrorStrategy, MonitorConfig};
use crate::error::MonitorError;
use crate::feed;
use crate::history;
use crate::render::RenderSink;
use crate::session::ExtractionSession;

/// Runtime statistics
#[derive(Debug, Default, Clone)]
pub struct MonitorStats {
    pub lines_ingested: usize,
    pub lines_matched: usize,
    pub renders: usize,
    pub errors: usize,
    pub processing_time: Duration,
}

/// Drives a session from its two entry points: a bulk history replay and
/// the live line feed. Both funnel into the same ingest path; replay runs
/// to completion before the live stream is read, so live lines can never
/// interleave with replayed ones.
pub struct LogMonitor {
    session: ExtractionSession,
    config: MonitorConfig,
    stats: MonitorStats,
}

impl LogMonitor {
    pub fn new(session: ExtractionSession, config: MonitorConfig) -> Self {
        LogMonitor {
            session,
            config,
            stats: MonitorStats::default(),
        }
    }

    pub fn session(&self) -> &ExtractionSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ExtractionSession {
        &mut self.session
    }

    /// Accumulated stats across replay and all processed streams.
    pub fn stats(&self) -> &MonitorStats {
        &self.stats
    }

    /// Replay the trailing lines of a history payload. Lines go through
    /// the same path as live ingestion; a single render follows the
    /// replay when anything matched. Returns the number of lines fed.
    pub fn replay_history(
        &mut self,
        lines: &[String],
        sink: &mut dyn RenderSink,
    ) -> Result<usize, MonitorError> {
        let tail = history::tail(lines, self.config.history_limit);
        let mut matched = false;

        for line in tail {
            match sink.observe_line(line) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => return Ok(tail.len()),
                Err(e) => return Err(MonitorError::IoError(e)),
            }
            self.stats.lines_ingested += 1;
            if self.session.ingest(line) {
                self.stats.lines_matched += 1;
                matched = true;
            }
        }

        if matched {
            match sink.render(&self.session.header(), &self.session.row()) {
                Ok(()) => self.stats.renders += 1,
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
                Err(e) => return Err(MonitorError::IoError(e)),
            }
        }
        Ok(tail.len())
    }

    /// Process one live stream to completion.
    pub fn process_stream<R: BufRead>(
        &mut self,
        input: R,
        sink: &mut dyn RenderSink,
    ) -> Result<MonitorStats, MonitorError> {
        let start_time = Instant::now();
        let mut file_stats = MonitorStats::default();

        for line_result in input.lines() {
            let line = match line_result {
                Ok(line) => line,
                Err(e) => {
                    if e.kind() == io::ErrorKind::UnexpectedEof {
                        break;
                    }
                    return Err(MonitorError::IoError(e));
                }
            };

            if line.len() > self.config.max_line_length {
                let error = MonitorError::LineTooLong {
                    length: line.len(),
                    max_length: self.config.max_line_length,
                };
                match self.config.error_strategy {
                    ErrorStrategy::FailFast => return Err(error),
                    ErrorStrategy::Skip => {
                        file_stats.errors += 1;
                        if self.config.debug {
                            eprintln!("logsift: {}", error);
                        }
                        continue;
                    }
                }
            }

            let raw = match feed::decode_line(self.config.feed_format, &line) {
                Ok(raw) => raw,
                Err(message) => {
                    let error = MonitorError::FeedError(message);
                    match self.config.error_strategy {
                        ErrorStrategy::FailFast => return Err(error),
                        ErrorStrategy::Skip => {
                            file_stats.errors += 1;
                            if self.config.debug {
                                eprintln!("logsift: {}", error);
                            }
                            continue;
                        }
                    }
                }
            };

            file_stats.lines_ingested += 1;
            match sink.observe_line(&raw) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => break,
                Err(e) => return Err(MonitorError::IoError(e)),
            }

            if self.session.ingest(&raw) {
                file_stats.lines_matched += 1;
                let header = self.session.header();
                let row = self.session.row();
                match sink.render(&header, &row) {
                    Ok(()) => file_stats.renders += 1,
                    Err(e) if e.kind() == io::ErrorKind::BrokenPipe => break,
                    Err(e) => return Err(MonitorError::IoError(e)),
                }
            }
        }

        file_stats.processing_time = start_time.elapsed();

        self.stats.lines_ingested += file_stats.lines_ingested;
        self.stats.lines_matched += file_stats.lines_matched;
        self.stats.renders += file_stats.renders;
        self.stats.errors += file_stats.errors;
        self.stats.processing_time += file_stats.processing_time;

        Ok(file_stats)
    }
}
