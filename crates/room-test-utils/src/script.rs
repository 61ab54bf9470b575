//! Scripted completions for mocked asynchronous calls.

use room_controller::ServiceError;
use std::collections::VecDeque;
use std::time::Duration;

/// How one mocked call completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scripted {
    /// `None` never completes.
    result: Option<Result<(), ServiceError>>,
    delay: Duration,
}

impl Scripted {
    /// Complete with `(0, nil)`.
    #[must_use]
    pub fn success() -> Self {
        Self {
            result: Some(Ok(())),
            delay: Duration::ZERO,
        }
    }

    /// Complete with `(code, message)`.
    #[must_use]
    pub fn failure(code: i32, message: impl Into<String>) -> Self {
        Self {
            result: Some(Err(ServiceError::new(code, message))),
            delay: Duration::ZERO,
        }
    }

    /// Never complete.
    #[must_use]
    pub fn never() -> Self {
        Self {
            result: None,
            delay: Duration::ZERO,
        }
    }

    /// Complete only after `delay` (use with a paused tokio clock).
    #[must_use]
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Wait out the script and produce its result.
    pub async fn run(&self) -> Result<(), ServiceError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.result {
            Some(result) => result.clone(),
            None => std::future::pending().await,
        }
    }
}

impl Default for Scripted {
    fn default() -> Self {
        Self::success()
    }
}

/// Per-call scripts: queued entries are used once each, then `fallback`.
#[derive(Debug, Clone, Default)]
pub struct ScriptQueue {
    queued: VecDeque<Scripted>,
    fallback: Scripted,
}

impl ScriptQueue {
    #[must_use]
    pub fn new(fallback: Scripted) -> Self {
        Self {
            queued: VecDeque::new(),
            fallback,
        }
    }

    pub fn push(&mut self, script: Scripted) {
        self.queued.push_back(script);
    }

    pub fn set_fallback(&mut self, script: Scripted) {
        self.fallback = script;
    }

    /// Script for the next call.
    pub fn next(&mut self) -> Scripted {
        self.queued
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_falls_back_after_queued_entries() {
        let mut queue = ScriptQueue::new(Scripted::success());
        queue.push(Scripted::failure(7, "once"));

        assert_eq!(queue.next(), Scripted::failure(7, "once"));
        assert_eq!(queue.next(), Scripted::success());
        assert_eq!(queue.next(), Scripted::success());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_failure() {
        let script = Scripted::failure(101, "rtc-err").after(Duration::from_millis(30));
        let result = script.run().await;
        assert_eq!(result, Err(ServiceError::new(101, "rtc-err")));
    }
}
