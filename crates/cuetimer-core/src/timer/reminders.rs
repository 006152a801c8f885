//! Mid-session reminders.
//!
//! A reminder's `at_seconds` uses the same scale as the engine's model time:
//! remaining seconds in countdown, elapsed seconds in countup. Each reminder
//! is delivered at most once per run; `due_at` marks what it returns.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::config::{TimerConfig, TimerMode};
use crate::error::ValidationError;

/// Offset used for the suggested time of a new countup reminder.
const COUNTUP_DEFAULT_OFFSET_SECS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReminderId(Uuid);

impl ReminderId {
    fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ReminderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reminder {
    id: ReminderId,
    at_seconds: u64,
    message: Option<String>,
    fired: bool,
}

impl Reminder {
    pub fn id(&self) -> ReminderId {
        self.id
    }

    pub fn at_seconds(&self) -> u64 {
        self.at_seconds
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn fired(&self) -> bool {
        self.fired
    }

    /// Message to show when the reminder fires.
    pub fn text(&self) -> &str {
        self.message.as_deref().unwrap_or("Time's up")
    }

    pub fn draft(&self) -> ReminderDraft {
        ReminderDraft {
            at_seconds: self.at_seconds,
            message: self.message.clone(),
        }
    }
}

/// Persisted form of a reminder: no id, no fired flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderDraft {
    pub at_seconds: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ReminderSet {
    reminders: Vec<Reminder>,
}

fn normalize_message(message: Option<String>) -> Option<String> {
    message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

impl ReminderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted drafts. Ids are fresh and nothing is fired.
    /// Drafts that no longer fit the configuration are dropped.
    pub fn from_drafts(drafts: &[ReminderDraft], config: &TimerConfig) -> Self {
        let mut set = Self::new();
        for draft in drafts {
            let at = i64::try_from(draft.at_seconds).unwrap_or(i64::MAX);
            if let Err(e) = set.add(at, draft.message.clone(), config) {
                tracing::warn!("dropping stored reminder: {e}");
            }
        }
        set
    }

    /// Check a trigger point against the current configuration.
    ///
    /// # Errors
    /// Negative times, and countdown times past the target.
    pub fn validate_at(at_seconds: i64, config: &TimerConfig) -> Result<u64, ValidationError> {
        if at_seconds < 0 {
            return Err(ValidationError::NegativeReminder { at: at_seconds });
        }
        let at = at_seconds as u64;
        if config.mode == TimerMode::Countdown && at > config.target_seconds {
            return Err(ValidationError::ReminderBeyondTarget {
                at: at_seconds,
                target: config.target_seconds,
            });
        }
        Ok(at)
    }

    /// Check stored trigger points against a configuration about to be
    /// applied. Reports the latest reminder that would not fit.
    ///
    /// # Errors
    /// [`ValidationError::ReminderBeyondTarget`] when a countdown target is
    /// below an existing reminder.
    pub fn check_fits(
        at_seconds: impl IntoIterator<Item = u64>,
        config: &TimerConfig,
    ) -> Result<(), ValidationError> {
        let latest = at_seconds.into_iter().max();
        match latest {
            Some(at) if config.mode == TimerMode::Countdown && at > config.target_seconds => {
                Err(ValidationError::ReminderBeyondTarget {
                    at: i64::try_from(at).unwrap_or(i64::MAX),
                    target: config.target_seconds,
                })
            }
            _ => Ok(()),
        }
    }

    /// Whether every reminder still fits `config`.
    ///
    /// # Errors
    /// See [`check_fits`](Self::check_fits).
    pub fn fits(&self, config: &TimerConfig) -> Result<(), ValidationError> {
        Self::check_fits(self.reminders.iter().map(|r| r.at_seconds), config)
    }

    /// Suggested trigger point for a newly added reminder.
    pub fn default_at_seconds(config: &TimerConfig) -> u64 {
        match config.mode {
            TimerMode::Countdown => 0,
            TimerMode::Countup => config
                .target_seconds
                .saturating_add(COUNTUP_DEFAULT_OFFSET_SECS),
        }
    }

    pub fn add(
        &mut self,
        at_seconds: i64,
        message: Option<String>,
        config: &TimerConfig,
    ) -> Result<ReminderId, ValidationError> {
        let at_seconds = Self::validate_at(at_seconds, config)?;
        let id = ReminderId::fresh();
        self.reminders.push(Reminder {
            id,
            at_seconds,
            message: normalize_message(message),
            fired: false,
        });
        Ok(id)
    }

    /// Edit a reminder. Any edit re-arms it.
    pub fn update(
        &mut self,
        id: ReminderId,
        at_seconds: Option<i64>,
        message: Option<String>,
        config: &TimerConfig,
    ) -> Result<(), ValidationError> {
        let at_seconds = at_seconds
            .map(|at| Self::validate_at(at, config))
            .transpose()?;
        let reminder = self
            .reminders
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(ValidationError::UnknownReminder(id))?;

        if let Some(at) = at_seconds {
            reminder.at_seconds = at;
        }
        if let Some(message) = message {
            reminder.message = normalize_message(Some(message));
        }
        reminder.fired = false;
        Ok(())
    }

    pub fn remove(&mut self, id: ReminderId) -> Result<Reminder, ValidationError> {
        let pos = self
            .reminders
            .iter()
            .position(|r| r.id == id)
            .ok_or(ValidationError::UnknownReminder(id))?;
        Ok(self.reminders.remove(pos))
    }

    pub fn unfire_all(&mut self) {
        for r in &mut self.reminders {
            r.fired = false;
        }
    }

    /// Unfired reminders whose trigger second equals the rounded model time.
    /// Returned reminders are marked fired.
    pub fn due_at(&mut self, model_seconds: f64) -> Vec<Reminder> {
        let second = model_seconds.round();
        if second < 0.0 {
            return Vec::new();
        }
        let second = second as u64;

        let mut due = Vec::new();
        for r in &mut self.reminders {
            if !r.fired && r.at_seconds == second {
                r.fired = true;
                due.push(r.clone());
            }
        }
        due
    }

    pub fn get(&self, id: ReminderId) -> Option<&Reminder> {
        self.reminders.iter().find(|r| r.id == id)
    }

    /// Reminders in presentation order (ascending trigger time).
    pub fn sorted(&self) -> Vec<&Reminder> {
        let mut out: Vec<&Reminder> = self.reminders.iter().collect();
        out.sort_by_key(|r| r.at_seconds);
        out
    }

    pub fn drafts(&self) -> Vec<ReminderDraft> {
        self.sorted().into_iter().map(Reminder::draft).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reminder> {
        self.reminders.iter()
    }

    pub fn len(&self) -> usize {
        self.reminders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reminders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorter_countdown_must_still_hold_every_reminder() {
        let mut set = ReminderSet::new();
        set.add(120, None, &countdown(600)).unwrap();
        set.add(500, None, &countdown(600)).unwrap();

        assert_eq!(set.fits(&countdown(500)), Ok(()));
        assert_eq!(
            set.fits(&countdown(300)),
            Err(ValidationError::ReminderBeyondTarget { at: 500, target: 300 })
        );
        // count-up has no upper bound for reminders
        assert_eq!(set.fits(&TimerConfig::countup(60)), Ok(()));
        assert_eq!(ReminderSet::new().fits(&countdown(1)), Ok(()));
    }

    fn countdown(target: u64) -> TimerConfig {
        TimerConfig::countdown(target)
    }

    #[test]
    fn add_rejects_negative_and_out_of_range() {
        let mut set = ReminderSet::new();
        assert_eq!(
            set.add(-1, None, &countdown(60)),
            Err(ValidationError::NegativeReminder { at: -1 })
        );
        assert_eq!(
            set.add(61, None, &countdown(60)),
            Err(ValidationError::ReminderBeyondTarget { at: 61, target: 60 })
        );
        assert!(set.is_empty());

        // countup has no upper bound
        assert!(set.add(10_000, None, &TimerConfig::countup(60)).is_ok());
    }

    #[test]
    fn due_at_fires_once() {
        let mut set = ReminderSet::new();
        let id = set.add(3, Some("stretch".into()), &countdown(10)).unwrap();

        assert!(set.due_at(4.0).is_empty());
        let due = set.due_at(3.0);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id(), id);
        assert_eq!(due[0].text(), "stretch");
        assert!(set.due_at(3.0).is_empty());
        assert!(set.get(id).unwrap().fired());
    }

    #[test]
    fn due_at_rounds_sub_second_noise() {
        let mut set = ReminderSet::new();
        set.add(3, None, &countdown(10)).unwrap();
        assert_eq!(set.due_at(2.6).len(), 1);
        assert!(set.due_at(3.4).is_empty());
    }

    #[test]
    fn update_rearms_and_validates() {
        let config = countdown(10);
        let mut set = ReminderSet::new();
        let id = set.add(3, None, &config).unwrap();
        set.due_at(3.0);

        set.update(id, Some(5), None, &config).unwrap();
        let r = set.get(id).unwrap();
        assert_eq!(r.at_seconds(), 5);
        assert!(!r.fired());

        assert!(set.update(id, Some(11), None, &config).is_err());
        assert_eq!(set.get(id).unwrap().at_seconds(), 5);
    }

    #[test]
    fn blank_messages_become_none() {
        let mut set = ReminderSet::new();
        let id = set.add(1, Some("   ".into()), &countdown(10)).unwrap();
        assert_eq!(set.get(id).unwrap().message(), None);
        assert_eq!(set.get(id).unwrap().text(), "Time's up");
    }

    #[test]
    fn remove_unknown_is_an_error() {
        let mut set = ReminderSet::new();
        let id = set.add(1, None, &countdown(10)).unwrap();
        set.remove(id).unwrap();
        assert_eq!(set.remove(id), Err(ValidationError::UnknownReminder(id)));
    }

    #[test]
    fn sorted_orders_by_trigger_time() {
        let config = countdown(100);
        let mut set = ReminderSet::new();
        set.add(50, None, &config).unwrap();
        set.add(10, None, &config).unwrap();
        set.add(30, None, &config).unwrap();
        let times: Vec<u64> = set.sorted().iter().map(|r| r.at_seconds()).collect();
        assert_eq!(times, vec![10, 30, 50]);
    }

    #[test]
    fn drafts_reload_with_fresh_state() {
        let config = countdown(100);
        let mut set = ReminderSet::new();
        let id = set.add(20, Some("hydrate".into()), &config).unwrap();
        set.due_at(20.0);

        let reloaded = ReminderSet::from_drafts(&set.drafts(), &config);
        let r = reloaded.sorted()[0];
        assert_ne!(r.id(), id);
        assert!(!r.fired());
        assert_eq!(r.message(), Some("hydrate"));
    }

    #[test]
    fn default_time_depends_on_mode() {
        assert_eq!(ReminderSet::default_at_seconds(&countdown(600)), 0);
        assert_eq!(ReminderSet::default_at_seconds(&TimerConfig::countup(600)), 900);
        assert_eq!(ReminderSet::default_at_seconds(&TimerConfig::countup(0)), 300);
    }
}
