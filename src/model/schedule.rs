//! `temporal_schedule` data model
//!
//! Every attribute with a server default is an `Option` in configuration;
//! `apply_defaults` fills them in before validation and before anything is
//! sent to the server.

use crate::client::{
    OverlapPolicy, ScheduleDefinition, ScheduleDescription, SchedulePolicy, ScheduleSpec,
    ScheduleState, StartWorkflowAction,
};
use crate::duration::{format_std_duration, parse_std_duration, same_duration};
use crate::error::{ProviderError, Result};
use crate::spec::{parse_spec, CalendarSpec, Field, IntervalSpec, ScheduleRange, SpecKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_CATCHUP_WINDOW: &str = "1m0s";
pub const DEFAULT_JITTER: &str = "0s";
pub const DEFAULT_TASK_TIMEOUT: &str = "10s";

/// One `start[-end][/step]` entry of a calendar field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeModel {
    pub start: u32,
    /// Defaults to `start`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u32>,
    /// Defaults to 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<u32>,
}

impl RangeModel {
    pub fn to_range(&self) -> ScheduleRange {
        ScheduleRange {
            start: self.start,
            end: self.end.unwrap_or(self.start),
            step: self.step.unwrap_or(1),
        }
    }

    pub fn from_range(range: &ScheduleRange) -> Self {
        Self {
            start: range.start,
            end: Some(range.end),
            step: Some(range.step),
        }
    }
}

/// Structured calendar. Second, minute and hour match 0 when unset; the
/// other fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<Vec<RangeModel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute: Option<Vec<RangeModel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<Vec<RangeModel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<Vec<RangeModel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<Vec<RangeModel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<Vec<RangeModel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<Vec<RangeModel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl CalendarModel {
    fn field(&self, field: Field) -> Option<&Vec<RangeModel>> {
        match field {
            Field::Second => self.second.as_ref(),
            Field::Minute => self.minute.as_ref(),
            Field::Hour => self.hour.as_ref(),
            Field::DayOfMonth => self.day_of_month.as_ref(),
            Field::Month => self.month.as_ref(),
            Field::DayOfWeek => self.day_of_week.as_ref(),
            Field::Year => self.year.as_ref(),
        }
    }

    pub fn to_spec(&self) -> CalendarSpec {
        let comment = self
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        let mut spec = CalendarSpec {
            comment,
            ..Default::default()
        };
        for field in Field::ALL {
            let ranges = match self.field(field) {
                Some(ranges) => ranges.iter().map(RangeModel::to_range).collect(),
                None if matches!(field, Field::Second | Field::Minute | Field::Hour) => {
                    vec![ScheduleRange::single(0)]
                }
                None => Vec::new(),
            };
            *spec.field_mut(field) = ranges;
        }
        spec
    }

    pub fn from_spec(spec: &CalendarSpec) -> Self {
        let ranges = |field: Field| {
            Some(
                spec.field(field)
                    .iter()
                    .map(RangeModel::from_range)
                    .collect(),
            )
        };
        Self {
            second: ranges(Field::Second),
            minute: ranges(Field::Minute),
            hour: ranges(Field::Hour),
            day_of_month: ranges(Field::DayOfMonth),
            month: ranges(Field::Month),
            day_of_week: ranges(Field::DayOfWeek),
            year: ranges(Field::Year),
            comment: spec.comment.clone(),
        }
    }

    fn validate(&self, attribute: &str) -> Result<()> {
        for field in Field::ALL {
            for range in self.field(field).into_iter().flatten() {
                field.validate(&range.to_range()).map_err(|err| match err {
                    ProviderError::InvalidSpec { reason, .. } => ProviderError::validation(
                        &format!("{}.{}", attribute, field.name().replace('-', "_")),
                        reason,
                    ),
                    other => other,
                })?;
            }
        }
        Ok(())
    }
}

/// Fixed interval with optional phase offset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalModel {
    pub every: String,
    /// Defaults to `0s`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
}

impl IntervalModel {
    pub fn to_spec(&self) -> Result<IntervalSpec> {
        let every = parse_std_duration(&self.every)?;
        if every.is_zero() {
            return Err(ProviderError::invalid_spec(&self.every, "interval must be positive"));
        }
        let offset = match &self.offset {
            Some(offset) => parse_std_duration(offset)?,
            None => Duration::ZERO,
        };
        Ok(IntervalSpec::new(every).with_offset(offset))
    }

    pub fn from_spec(spec: &IntervalSpec) -> Self {
        Self {
            every: format_std_duration(spec.every),
            offset: Some(format_std_duration(spec.offset)),
        }
    }
}

/// `schedule` block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSpecModel {
    /// Cron-style spec strings, compiled into calendars or intervals
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub crons: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub calendars: Vec<CalendarModel>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intervals: Vec<IntervalModel>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jitter: Option<String>,

    /// IANA zone name; empty means UTC
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,

    /// Computed: canonical rendering of every calendar and interval the
    /// server holds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective: Option<Vec<String>>,
}

impl ScheduleSpecModel {
    /// Compile crons, calendars and intervals into a server spec
    pub fn compile(&self) -> Result<ScheduleSpec> {
        let mut calendars = Vec::new();
        let mut intervals = Vec::new();
        let mut cron_zone: Option<String> = None;

        for cron in &self.crons {
            let parsed = parse_spec(cron)?;
            if let Some(zone) = parsed.time_zone {
                if let Some(existing) = &cron_zone {
                    if *existing != zone {
                        return Err(ProviderError::invalid_spec(
                            cron,
                            format!("time zone {} conflicts with {}", zone, existing),
                        ));
                    }
                }
                cron_zone = Some(zone);
            }
            match parsed.kind {
                SpecKind::Calendar(calendar) => calendars.push(calendar),
                SpecKind::Interval(interval) => intervals.push(interval),
            }
        }

        calendars.extend(self.calendars.iter().map(CalendarModel::to_spec));
        for interval in &self.intervals {
            intervals.push(interval.to_spec()?);
        }

        let time_zone = self.resolve_time_zone(cron_zone)?;
        let jitter = match &self.jitter {
            Some(jitter) => parse_std_duration(jitter)?,
            None => Duration::ZERO,
        };

        Ok(ScheduleSpec {
            calendars,
            intervals,
            jitter,
            time_zone,
        })
    }

    fn resolve_time_zone(&self, cron_zone: Option<String>) -> Result<String> {
        let configured = self.time_zone.as_deref().unwrap_or("").trim();
        let zone = match cron_zone {
            Some(cron_zone) if !configured.is_empty() && configured != cron_zone => {
                return Err(ProviderError::invalid_spec(
                    &format!("CRON_TZ={}", cron_zone),
                    format!("time zone conflicts with schedule.time_zone '{}'", configured),
                ));
            }
            Some(cron_zone) => cron_zone,
            None => configured.to_string(),
        };
        if !zone.is_empty() && zone.parse::<chrono_tz::Tz>().is_err() {
            return Err(ProviderError::validation(
                "schedule.time_zone",
                format!("unknown time zone '{}'", zone),
            ));
        }
        Ok(zone)
    }
}

/// `start_workflow` block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartWorkflowModel {
    /// Defaults to a random UUID, kept across plans once set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,

    /// Workflow type name
    pub workflow: String,

    pub task_queue: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_timeout: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_timeout: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_timeout: Option<String>,
}

impl StartWorkflowModel {
    pub fn new(workflow: impl Into<String>, task_queue: impl Into<String>) -> Self {
        Self {
            workflow: workflow.into(),
            task_queue: task_queue.into(),
            ..Default::default()
        }
    }
}

/// A schedule as written in configuration and kept in state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleModel {
    /// Schedule id. Changing it replaces the schedule.
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleSpecModel>,

    pub start_workflow: StartWorkflowModel,

    /// One of the `SCHEDULE_OVERLAP_POLICY_*` names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlap: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catchup_window: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pause_on_failure: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,

    /// Actions left before the schedule stops; 0 means unlimited
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_actions: Option<i64>,

    /// Take one action as soon as the schedule is created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_immediately: Option<bool>,
}

impl ScheduleModel {
    pub fn new(id: impl Into<String>, start_workflow: StartWorkflowModel) -> Self {
        Self {
            id: id.into(),
            start_workflow,
            ..Default::default()
        }
    }

    pub fn with_crons<I, S>(mut self, crons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schedule
            .get_or_insert_with(Default::default)
            .crons
            .extend(crons.into_iter().map(Into::into));
        self
    }

    pub fn with_interval(mut self, every: impl Into<String>, offset: Option<&str>) -> Self {
        self.schedule
            .get_or_insert_with(Default::default)
            .intervals
            .push(IntervalModel {
                every: every.into(),
                offset: offset.map(str::to_string),
            });
        self
    }

    pub fn with_calendar(mut self, calendar: CalendarModel) -> Self {
        self.schedule
            .get_or_insert_with(Default::default)
            .calendars
            .push(calendar);
        self
    }

    /// Fill defaults for unset attributes
    pub fn apply_defaults(&mut self) {
        let spec = self.schedule.get_or_insert_with(Default::default);
        spec.jitter.get_or_insert_with(|| DEFAULT_JITTER.to_string());
        spec.time_zone.get_or_insert_with(String::new);

        let action = &mut self.start_workflow;
        action
            .workflow_id
            .get_or_insert_with(|| uuid::Uuid::new_v4().to_string());
        action
            .task_timeout
            .get_or_insert_with(|| DEFAULT_TASK_TIMEOUT.to_string());

        self.overlap
            .get_or_insert_with(|| OverlapPolicy::Skip.as_str().to_string());
        self.catchup_window
            .get_or_insert_with(|| DEFAULT_CATCHUP_WINDOW.to_string());
        self.pause_on_failure.get_or_insert(false);
        self.note.get_or_insert_with(String::new);
        self.paused.get_or_insert(false);
        self.remaining_actions.get_or_insert(0);
        self.trigger_immediately.get_or_insert(false);
    }

    /// Keep prior computed values for attributes the configuration leaves unset
    pub fn carry_forward(&mut self, prior: &ScheduleModel) {
        if self.start_workflow.workflow_id.is_none() {
            self.start_workflow.workflow_id = prior.start_workflow.workflow_id.clone();
        }
        if self.note.is_none() {
            self.note = prior.note.clone();
        }
        if self.remaining_actions.is_none() {
            self.remaining_actions = prior.remaining_actions;
        }
        if self.trigger_immediately.is_none() {
            self.trigger_immediately = prior.trigger_immediately;
        }
        if let Some(prior_spec) = &prior.schedule {
            let spec = self.schedule.get_or_insert_with(Default::default);
            if spec.effective.is_none() {
                spec.effective = prior_spec.effective.clone();
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ProviderError::validation("id", "must not be empty"));
        }
        if self.start_workflow.workflow.trim().is_empty() {
            return Err(ProviderError::validation(
                "start_workflow.workflow",
                "must not be empty",
            ));
        }
        if self.start_workflow.task_queue.trim().is_empty() {
            return Err(ProviderError::validation(
                "start_workflow.task_queue",
                "must not be empty",
            ));
        }
        if let Some(overlap) = &self.overlap {
            overlap.parse::<OverlapPolicy>()?;
        }
        if let Some(remaining) = self.remaining_actions {
            if remaining < 0 {
                return Err(ProviderError::validation(
                    "remaining_actions",
                    format!("must not be negative, got {}", remaining),
                ));
            }
        }
        if let Some(spec) = &self.schedule {
            for (i, calendar) in spec.calendars.iter().enumerate() {
                calendar.validate(&format!("schedule.calendars[{}]", i))?;
            }
        }
        self.to_definition().map(|_| ())
    }

    /// Build the definition sent on create and update
    pub fn to_definition(&self) -> Result<ScheduleDefinition> {
        let spec = match &self.schedule {
            Some(spec) => spec.compile()?,
            None => ScheduleSpecModel::default().compile()?,
        };

        let action = &self.start_workflow;
        let action = StartWorkflowAction {
            workflow_id: action.workflow_id.clone().unwrap_or_default(),
            workflow_type: action.workflow.clone(),
            task_queue: action.task_queue.clone(),
            execution_timeout: optional_duration(&action.execution_timeout)?,
            run_timeout: optional_duration(&action.run_timeout)?,
            task_timeout: optional_duration(&action.task_timeout)?,
        };

        let policy = SchedulePolicy {
            overlap: match &self.overlap {
                Some(overlap) => overlap.parse()?,
                None => OverlapPolicy::default(),
            },
            catchup_window: match &self.catchup_window {
                Some(window) => parse_std_duration(window)?,
                None => SchedulePolicy::default().catchup_window,
            },
            pause_on_failure: self.pause_on_failure.unwrap_or(false),
        };

        let state = ScheduleState {
            note: self.note.clone().unwrap_or_default(),
            paused: self.paused.unwrap_or(false),
            remaining_actions: self.remaining_actions.unwrap_or(0).max(0) as u64,
        };

        Ok(ScheduleDefinition {
            spec,
            action,
            policy,
            state,
        })
    }

    /// Reconcile with the server's view
    ///
    /// Values the user wrote are kept when the server holds the same thing in
    /// another form (`60s` vs `1m0s`, crons vs the calendars they compile to).
    /// Anything that actually drifted is replaced by the server value.
    pub fn refresh(&mut self, desc: &ScheduleDescription) {
        let server = &desc.schedule;
        self.id = desc.id.clone();

        let spec = self.schedule.get_or_insert_with(Default::default);
        let compiled = spec.compile().ok();
        let same_timing = compiled.as_ref().map_or(false, |c| {
            c.calendars == server.spec.calendars && c.intervals == server.spec.intervals
        });
        if !same_timing {
            spec.crons.clear();
            spec.calendars = server
                .spec
                .calendars
                .iter()
                .map(CalendarModel::from_spec)
                .collect();
            spec.intervals = server
                .spec
                .intervals
                .iter()
                .map(IntervalModel::from_spec)
                .collect();
        }
        // once the crons are replaced they can no longer supply the zone
        let same_zone = same_timing
            && compiled
                .as_ref()
                .map_or(false, |c| c.time_zone == server.spec.time_zone);
        if !same_zone {
            spec.time_zone = Some(server.spec.time_zone.clone());
        }
        refresh_duration(&mut spec.jitter, server.spec.jitter);
        spec.effective = Some(effective_specs(&server.spec));

        let action = &mut self.start_workflow;
        action.workflow_id = Some(server.action.workflow_id.clone());
        action.workflow = server.action.workflow_type.clone();
        action.task_queue = server.action.task_queue.clone();
        refresh_optional_duration(&mut action.execution_timeout, server.action.execution_timeout);
        refresh_optional_duration(&mut action.run_timeout, server.action.run_timeout);
        refresh_optional_duration(&mut action.task_timeout, server.action.task_timeout);

        let same_overlap = self
            .overlap
            .as_deref()
            .and_then(|o| o.parse::<OverlapPolicy>().ok())
            == Some(server.policy.overlap);
        if !same_overlap {
            self.overlap = Some(server.policy.overlap.as_str().to_string());
        }
        refresh_duration(&mut self.catchup_window, server.policy.catchup_window);
        self.pause_on_failure = Some(server.policy.pause_on_failure);

        self.note = Some(server.state.note.clone());
        self.paused = Some(server.state.paused);
        self.remaining_actions = Some(server.state.remaining_actions as i64);
        self.trigger_immediately.get_or_insert(false);
    }

    /// Model for an imported schedule
    pub fn from_description(desc: &ScheduleDescription) -> Self {
        let mut model = Self::new(desc.id.clone(), StartWorkflowModel::default());
        model.refresh(desc);
        model
    }
}

fn optional_duration(value: &Option<String>) -> Result<Option<Duration>> {
    value.as_deref().map(parse_std_duration).transpose()
}

fn refresh_duration(current: &mut Option<String>, server: Duration) {
    let formatted = format_std_duration(server);
    match current {
        Some(value) if same_duration(value, &formatted) => {}
        _ => *current = Some(formatted),
    }
}

fn refresh_optional_duration(current: &mut Option<String>, server: Option<Duration>) {
    match server {
        Some(server) => refresh_duration(current, server),
        None => *current = None,
    }
}

fn effective_specs(spec: &ScheduleSpec) -> Vec<String> {
    spec.calendars
        .iter()
        .map(ToString::to_string)
        .chain(spec.intervals.iter().map(ToString::to_string))
        .collect()
}
