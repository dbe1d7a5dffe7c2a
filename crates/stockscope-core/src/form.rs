//! Raw form fields, visibility policy, and the commit step that publishes
//! snapshots to the orchestrators.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::{FilterMode, MaWindow, Period, PlotType};

/// One input field on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Ticker,
    FilterMode,
    Period,
    StartDate,
    EndDate,
    PlotType,
    Window,
}

impl Field {
    pub const ALL: [Self; 7] = [
        Self::Ticker,
        Self::FilterMode,
        Self::Period,
        Self::StartDate,
        Self::EndDate,
        Self::PlotType,
        Self::Window,
    ];

    const fn bit(self) -> u8 {
        1 << self as u8
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ticker => "ticker",
            Self::FilterMode => "filter_mode",
            Self::Period => "period",
            Self::StartDate => "start_date",
            Self::EndDate => "end_date",
            Self::PlotType => "plot_type",
            Self::Window => "window",
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Small set of [`Field`]s, used for dependency declarations and change sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FieldSet(u8);

impl FieldSet {
    pub const EMPTY: Self = Self(0);
    pub const ALL: Self = Self::of(&Field::ALL);

    pub const fn of(fields: &[Field]) -> Self {
        let mut bits = 0;
        let mut index = 0;
        while index < fields.len() {
            bits |= fields[index].bit();
            index += 1;
        }
        Self(bits)
    }

    #[must_use]
    pub const fn with(self, field: Field) -> Self {
        Self(self.0 | field.bit())
    }

    pub const fn contains(self, field: Field) -> bool {
        self.0 & field.bit() != 0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Field> {
        Field::ALL.into_iter().filter(move |field| self.contains(*field))
    }
}

/// A single user input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Ticker(String),
    FilterMode(FilterMode),
    Period(String),
    StartDate(String),
    EndDate(String),
    PlotType(PlotType),
    Window(u32),
}

impl FieldEdit {
    pub const fn field(&self) -> Field {
        match self {
            Self::Ticker(_) => Field::Ticker,
            Self::FilterMode(_) => Field::FilterMode,
            Self::Period(_) => Field::Period,
            Self::StartDate(_) => Field::StartDate,
            Self::EndDate(_) => Field::EndDate,
            Self::PlotType(_) => Field::PlotType,
            Self::Window(_) => Field::Window,
        }
    }
}

/// Raw field values exactly as entered. Values of hidden fields are retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSnapshot {
    pub ticker: String,
    pub filter_mode: FilterMode,
    pub period: String,
    pub start_date: String,
    pub end_date: String,
    pub plot_type: PlotType,
    pub window: u32,
}

impl Default for FormSnapshot {
    fn default() -> Self {
        Self {
            ticker: String::new(),
            filter_mode: FilterMode::ByPeriod,
            period: String::from(Period::DEFAULT),
            start_date: String::new(),
            end_date: String::new(),
            plot_type: PlotType::Close,
            window: u32::from(MaWindow::DEFAULT.get()),
        }
    }
}

impl FormSnapshot {
    /// Fields whose values differ between `self` and `other`.
    pub fn diff(&self, other: &Self) -> FieldSet {
        let mut changed = FieldSet::EMPTY;
        if self.ticker != other.ticker {
            changed = changed.with(Field::Ticker);
        }
        if self.filter_mode != other.filter_mode {
            changed = changed.with(Field::FilterMode);
        }
        if self.period != other.period {
            changed = changed.with(Field::Period);
        }
        if self.start_date != other.start_date {
            changed = changed.with(Field::StartDate);
        }
        if self.end_date != other.end_date {
            changed = changed.with(Field::EndDate);
        }
        if self.plot_type != other.plot_type {
            changed = changed.with(Field::PlotType);
        }
        if self.window != other.window {
            changed = changed.with(Field::Window);
        }
        changed
    }

    /// Apply an edit; returns whether the stored value changed.
    fn apply(&mut self, edit: FieldEdit) -> bool {
        fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
            if *slot == value {
                return false;
            }
            *slot = value;
            true
        }

        match edit {
            FieldEdit::Ticker(value) => replace(&mut self.ticker, value),
            FieldEdit::FilterMode(value) => replace(&mut self.filter_mode, value),
            FieldEdit::Period(value) => replace(&mut self.period, value),
            FieldEdit::StartDate(value) => replace(&mut self.start_date, value),
            FieldEdit::EndDate(value) => replace(&mut self.end_date, value),
            FieldEdit::PlotType(value) => replace(&mut self.plot_type, value),
            FieldEdit::Window(value) => replace(&mut self.window, value),
        }
    }
}

/// When field edits reach the orchestrators.
///
/// | Policy | Ordering seen by consumers |
/// |--------|----------------------------|
/// | `OnSubmit` | one snapshot per `submit()`, carrying every change since the previous one |
/// | `Live` | one snapshot per edit that changes a value |
/// | `RevealOnSubmit` | nothing before the first `submit()`, then live |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitPolicy {
    #[default]
    OnSubmit,
    Live,
    RevealOnSubmit,
}

impl CommitPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OnSubmit => "on-submit",
            Self::Live => "live",
            Self::RevealOnSubmit => "reveal-on-submit",
        }
    }
}

impl Display for CommitPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommitPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "on-submit" | "submit" => Ok(Self::OnSubmit),
            "live" => Ok(Self::Live),
            "reveal-on-submit" | "reveal" => Ok(Self::RevealOnSubmit),
            other => Err(format!(
                "invalid commit policy '{other}', expected on-submit, live or reveal-on-submit"
            )),
        }
    }
}

/// A committed snapshot plus the fields that changed since the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub snapshot: FormSnapshot,
    pub changed: FieldSet,
}

/// Owns the form fields; the only writer of form state.
#[derive(Debug)]
pub struct FormController {
    policy: CommitPolicy,
    fields: FormSnapshot,
    published: Option<FormSnapshot>,
    submitted: bool,
}

impl FormController {
    pub fn new(policy: CommitPolicy) -> Self {
        Self::with_fields(policy, FormSnapshot::default())
    }

    pub fn with_fields(policy: CommitPolicy, fields: FormSnapshot) -> Self {
        Self {
            policy,
            fields,
            published: None,
            submitted: false,
        }
    }

    pub const fn policy(&self) -> CommitPolicy {
        self.policy
    }

    /// Current values, including unpublished edits.
    pub const fn fields(&self) -> &FormSnapshot {
        &self.fields
    }

    /// Last snapshot handed to the orchestrators.
    pub fn published(&self) -> Option<&FormSnapshot> {
        self.published.as_ref()
    }

    pub const fn has_submitted(&self) -> bool {
        self.submitted
    }

    /// Record an input event. Returns a publication when the policy says the
    /// change reaches the orchestrators now.
    pub fn apply(&mut self, edit: FieldEdit) -> Option<Publication> {
        if !self.fields.apply(edit) {
            return None;
        }

        match self.policy {
            CommitPolicy::Live => Some(self.publish()),
            CommitPolicy::RevealOnSubmit if self.submitted => Some(self.publish()),
            CommitPolicy::OnSubmit | CommitPolicy::RevealOnSubmit => None,
        }
    }

    /// The explicit commit step. Publishes every change since the previous
    /// publication (all fields on the first one).
    pub fn submit(&mut self) -> Publication {
        self.submitted = true;
        self.publish()
    }

    /// Submission needs a ticker.
    pub fn can_submit(&self) -> bool {
        !self.fields.ticker.trim().is_empty()
    }

    /// Fields shown for the current mode and plot type.
    pub fn visible_fields(&self) -> FieldSet {
        let mut visible = FieldSet::of(&[Field::Ticker, Field::FilterMode, Field::PlotType]);
        visible = match self.fields.filter_mode {
            FilterMode::ByPeriod => visible.with(Field::Period),
            FilterMode::ByDateRange => visible.with(Field::StartDate).with(Field::EndDate),
        };
        if self.fields.plot_type == PlotType::MovingAverage {
            visible = visible.with(Field::Window);
        }
        visible
    }

    fn publish(&mut self) -> Publication {
        let changed = match &self.published {
            Some(previous) => previous.diff(&self.fields),
            None => FieldSet::ALL,
        };
        self.published = Some(self.fields.clone());
        Publication {
            snapshot: self.fields.clone(),
            changed,
        }
    }
}
