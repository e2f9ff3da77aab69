//! Danger event types.
//!
//! This module defines the closed set of danger categories, the ordered
//! severity scale, reported events and the statistics derived from them.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::{self, Coordinate};

/// Category of a reported danger.
///
/// Serialized as its snake_case name. Unrecognized names read back from
/// storage become [`DangerType::Other`], so they get the fallback lifetime and
/// radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", from = "String")]
pub enum DangerType {
    /// Vehicle collision
    Accident,
    /// Construction or maintenance on the road
    RoadWork,
    /// Fog, ice, flooding and similar conditions
    Weather,
    /// Slow or stopped traffic
    TrafficJam,
    /// Police checkpoint
    Police,
    /// Obstacle or other hazard on the road
    Hazard,
    /// Anything else
    Other,
}

impl DangerType {
    /// Every danger type, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Accident,
        Self::RoadWork,
        Self::Weather,
        Self::TrafficJam,
        Self::Police,
        Self::Hazard,
        Self::Other,
    ];

    /// Converts to string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Accident => "accident",
            Self::RoadWork => "road_work",
            Self::Weather => "weather",
            Self::TrafficJam => "traffic_jam",
            Self::Police => "police",
            Self::Hazard => "hazard",
            Self::Other => "other",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "accident" => Some(Self::Accident),
            "road_work" => Some(Self::RoadWork),
            "weather" => Some(Self::Weather),
            "traffic_jam" => Some(Self::TrafficJam),
            "police" => Some(Self::Police),
            "hazard" => Some(Self::Hazard),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Human-readable label used in notification titles.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Accident => "Accident",
            Self::RoadWork => "Road work",
            Self::Weather => "Weather conditions",
            Self::TrafficJam => "Traffic jam",
            Self::Police => "Police check",
            Self::Hazard => "Hazard",
            Self::Other => "Alert",
        }
    }

    /// How long a report of this type stays on the map.
    ///
    /// Police checks are short-lived (30 minutes); road work lasts a day.
    #[must_use]
    pub fn lifetime(&self) -> Duration {
        let minutes = match self {
            Self::Accident => 2 * 60,
            Self::RoadWork => 24 * 60,
            Self::Weather => 6 * 60,
            Self::TrafficJam => 60,
            Self::Police => 30,
            Self::Hazard => 12 * 60,
            Self::Other => 4 * 60,
        };
        Duration::minutes(minutes)
    }

    /// Default alert radius in meters when the reporter doesn't give one.
    #[must_use]
    pub const fn default_radius(&self) -> f64 {
        match self {
            Self::Accident | Self::Other => 1_000.0,
            Self::RoadWork => 2_000.0,
            Self::Weather => 5_000.0,
            Self::TrafficJam => 1_500.0,
            Self::Police => 800.0,
            Self::Hazard => 1_200.0,
        }
    }
}

impl From<DangerType> for &'static str {
    fn from(danger_type: DangerType) -> Self {
        danger_type.as_str()
    }
}

impl From<String> for DangerType {
    fn from(s: String) -> Self {
        Self::parse(&s).unwrap_or(Self::Other)
    }
}

impl std::fmt::Display for DangerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How serious a danger is. Ordered from `Low` to `Critical`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DangerSeverity {
    /// Minor inconvenience
    #[default]
    Low,
    /// Worth slowing down for
    Medium,
    /// Significant risk
    High,
    /// Immediate danger
    Critical,
}

impl DangerSeverity {
    /// Every severity, from lowest to highest.
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Numeric rank used for threshold comparisons (low = 1 ... critical = 4).
    #[must_use]
    pub const fn ordinal(&self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    /// Maps a zero-based slider position to a severity.
    ///
    /// Out-of-range positions fall back to [`DangerSeverity::Low`].
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }

    /// Zero-based slider position of this severity.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.ordinal() as usize - 1
    }

    /// Human-readable label used in notification bodies.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Moderate",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

/// A report submitted by a user, before the registry turns it into an event.
///
/// # Example
///
/// ```
/// use danger_alert_core::danger::{DangerReport, DangerSeverity, DangerType};
/// use danger_alert_core::geo::Coordinate;
///
/// let report = DangerReport::new(
///     DangerType::Police,
///     DangerSeverity::Medium,
///     Coordinate::new(48.8566, 2.3522),
/// )
/// .with_description("Checkpoint on the bridge");
///
/// assert_eq!(report.effective_radius(), 800.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DangerReport {
    /// Category of the danger
    #[serde(rename = "type")]
    pub danger_type: DangerType,

    /// Severity chosen by the reporter
    pub severity: DangerSeverity,

    /// Where the danger is
    pub position: Coordinate,

    /// Optional free-text details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Alert radius in meters; the type default applies when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

impl DangerReport {
    /// Creates a report without description or explicit radius.
    #[must_use]
    pub const fn new(
        danger_type: DangerType,
        severity: DangerSeverity,
        position: Coordinate,
    ) -> Self {
        Self {
            danger_type,
            severity,
            position,
            description: None,
            radius: None,
        }
    }

    /// Adds a free-text description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Overrides the type's default alert radius.
    #[must_use]
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    /// Radius the resulting event will use.
    ///
    /// A zero radius counts as "not given", matching how the map form leaves
    /// the field at zero when untouched.
    #[must_use]
    pub fn effective_radius(&self) -> f64 {
        match self.radius {
            Some(radius) if radius > 0.0 => radius,
            _ => self.danger_type.default_radius(),
        }
    }
}

/// A reported danger tracked by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DangerEvent {
    /// Unique identifier assigned at creation
    pub id: String,

    /// Category of the danger
    #[serde(rename = "type")]
    pub danger_type: DangerType,

    /// Severity chosen by the reporter
    pub severity: DangerSeverity,

    /// Where the danger is
    pub position: Coordinate,

    /// Optional free-text details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// When the danger was reported (UTC)
    pub reported_at: DateTime<Utc>,

    /// When the danger is swept from the registry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Cleared when a user dismisses the danger
    pub is_active: bool,

    /// Number of reports, including confirmations
    pub report_count: u32,

    /// Alert radius in meters
    pub radius: f64,
}

impl DangerEvent {
    /// Builds a fresh, active event from a report.
    ///
    /// Expiration and radius are derived from the danger type unless the
    /// report gives a radius.
    #[must_use]
    pub fn from_report(id: String, report: DangerReport, now: DateTime<Utc>) -> Self {
        let radius = report.effective_radius();
        Self {
            id,
            danger_type: report.danger_type,
            severity: report.severity,
            position: report.position,
            description: report.description,
            reported_at: now,
            expires_at: Some(now + report.danger_type.lifetime()),
            is_active: true,
            report_count: 1,
            radius,
        }
    }

    /// Returns whether the event has expired as of `now`.
    ///
    /// Events without an expiration never expire.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    /// Returns whether the event has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Distance in meters from `position` to this event.
    #[must_use]
    pub fn distance_from(&self, position: &Coordinate) -> f64 {
        geo::distance(position, &self.position)
    }

    /// Display label for the distance from `position` ("850m", "1.2km").
    #[must_use]
    pub fn distance_label_from(&self, position: &Coordinate) -> String {
        geo::format_distance(self.distance_from(position))
    }

    /// Relative age label for the map's detail card.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{Duration, Utc};
    /// use danger_alert_core::danger::{DangerEvent, DangerReport, DangerSeverity, DangerType};
    /// use danger_alert_core::geo::Coordinate;
    ///
    /// let now = Utc::now();
    /// let report = DangerReport::new(DangerType::Hazard, DangerSeverity::High, Coordinate::new(0.0, 0.0));
    /// let event = DangerEvent::from_report("abc".to_string(), report, now);
    ///
    /// assert_eq!(event.age_label(now), "Just now");
    /// assert_eq!(event.age_label(now + Duration::minutes(5)), "5 min ago");
    /// assert_eq!(event.age_label(now + Duration::hours(3)), "3h ago");
    /// ```
    #[must_use]
    pub fn age_label(&self, now: DateTime<Utc>) -> String {
        let minutes = (now - self.reported_at).num_minutes();
        if minutes < 1 {
            return "Just now".to_string();
        }
        if minutes < 60 {
            return format!("{minutes} min ago");
        }
        let hours = minutes / 60;
        if hours < 24 {
            return format!("{hours}h ago");
        }
        format!("{}d ago", hours / 24)
    }
}

/// Event counts split by lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Active and not yet expired
    pub active: usize,
    /// Dismissed by a user
    pub inactive: usize,
    /// Active but past expiration, awaiting the next sweep
    pub expired: usize,
}

/// Summary of the registry's contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DangerStats {
    /// Number of events, whatever their state
    pub total: usize,
    /// Number of events per type; types with no events are absent
    pub by_type: BTreeMap<DangerType, usize>,
    /// Number of events per lifecycle state
    pub by_status: StatusCounts,
}

impl DangerStats {
    /// Computes statistics over `events` as of `now`.
    ///
    /// Dismissed events count as inactive even when also expired.
    #[must_use]
    pub fn compute<'a>(
        events: impl IntoIterator<Item = &'a DangerEvent>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut stats = Self::default();
        for event in events {
            stats.total += 1;
            *stats.by_type.entry(event.danger_type).or_insert(0) += 1;

            if !event.is_active {
                stats.by_status.inactive += 1;
            } else if event.is_expired_at(now) {
                stats.by_status.expired += 1;
            } else {
                stats.by_status.active += 1;
            }
        }
        stats
    }
}
