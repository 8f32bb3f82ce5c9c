use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress display shared by the reader workers.
///
/// `ProgressBar` is internally synchronised, so a `&ProgressReporter` can be
/// handed to every worker thread.
#[derive(Debug)]
pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
}

impl ProgressReporter {
    /// Byte-counting bar; falls back to a spinner when the input size is unknown.
    pub fn new_bytes(total: Option<u64>, message: &str, silent: bool) -> Self {
        if silent {
            return Self::silent();
        }

        let pb = match total {
            Some(total) => {
                let pb = ProgressBar::new(total);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template(concat!(
                            "{msg}\n{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] ",
                            "{bytes}/{total_bytes} ({bytes_per_sec}, {eta})"
                        ))
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("#>-"),
                );
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.green} {msg} {bytes} ({bytes_per_sec})")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                pb
            }
        };
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            progress_bar: Some(pb),
        }
    }

    pub fn silent() -> Self {
        Self { progress_bar: None }
    }

    pub fn increment(&self, delta: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(delta);
        }
    }

    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(message.to_string());
        }
    }

    pub fn finish_with_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_reporter_ignores_updates() {
        let progress = ProgressReporter::new_bytes(Some(1024), "Reading...", true);
        assert!(progress.progress_bar.is_none());
        progress.increment(512);
        progress.set_message("still reading");
        progress.finish_with_message("done");
    }
}
