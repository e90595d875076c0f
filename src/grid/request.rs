//! Demand requests and their consumer priority classes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::GridError;
use crate::sim::clock::Timestamp;

/// Consumer class of a demand request.
///
/// Variants are declared lowest priority first so the derived `Ord` matches
/// the numeric rank: `Residential < Commercial < Industrial`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityClass {
    /// Households; shed first.
    Residential = 1,
    /// Offices and retail.
    Commercial = 2,
    /// Plants and heavy consumers; served first.
    Industrial = 3,
}

impl PriorityClass {
    /// All classes, lowest priority first.
    pub const ALL: [Self; 3] = [Self::Residential, Self::Commercial, Self::Industrial];

    /// Numeric rank (1 = lowest).
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Short command-line token (`res`, `com`, `ind`).
    pub fn token(self) -> &'static str {
        match self {
            Self::Residential => "res",
            Self::Commercial => "com",
            Self::Industrial => "ind",
        }
    }
}

impl fmt::Display for PriorityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Residential => "residential",
            Self::Commercial => "commercial",
            Self::Industrial => "industrial",
        };
        f.write_str(name)
    }
}

impl FromStr for PriorityClass {
    type Err = GridError;

    /// Accepts the short tokens and the full names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "res" | "residential" => Ok(Self::Residential),
            "com" | "commercial" => Ok(Self::Commercial),
            "ind" | "industrial" => Ok(Self::Industrial),
            _ => Err(GridError::InvalidClass(s.to_string())),
        }
    }
}

/// Lifecycle of a demand request.
///
/// `Created → Queued → {Allocated | Shed}`. `Completed` is part of the
/// vocabulary but the current allocation policy never produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    Created,
    Queued,
    Allocated,
    Shed,
    Completed,
}

impl RequestState {
    /// Returns `true` once the request can no longer change state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Allocated | Self::Shed | Self::Completed)
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Created => "CREATED",
            Self::Queued => "QUEUED",
            Self::Allocated => "ALLOCATED",
            Self::Shed => "SHED",
            Self::Completed => "COMPLETED",
        };
        f.write_str(label)
    }
}

/// A single consumer's request for power.
///
/// Everything except the lifecycle state is fixed at construction; the state
/// is advanced only by the scheduler.
///
/// # Examples
///
/// ```
/// use grid_dr::grid::request::{DemandRequest, PriorityClass, RequestState};
///
/// let req = DemandRequest::new("C101", PriorityClass::Residential, 25.5, 0).unwrap();
/// assert_eq!(req.state(), RequestState::Created);
/// assert_eq!(req.class().rank(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandRequest {
    consumer_id: String,
    class: PriorityClass,
    megawatts: f64,
    created_at: Timestamp,
    state: RequestState,
}

impl DemandRequest {
    /// Creates a request in the `Created` state.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDemand`] if `megawatts` is not finite or
    /// not strictly positive.
    pub fn new(
        consumer_id: impl Into<String>,
        class: PriorityClass,
        megawatts: f64,
        created_at: Timestamp,
    ) -> Result<Self, GridError> {
        let consumer_id = consumer_id.into();
        if !megawatts.is_finite() || megawatts <= 0.0 {
            return Err(GridError::InvalidDemand {
                consumer_id,
                megawatts,
            });
        }
        Ok(Self {
            consumer_id,
            class,
            megawatts,
            created_at,
            state: RequestState::Created,
        })
    }

    /// Parses the class token and creates the request.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidClass`] for an unknown token, or
    /// [`GridError::InvalidDemand`] for a bad power value. Nothing is created
    /// in either case.
    pub fn parse(
        consumer_id: impl Into<String>,
        class: &str,
        megawatts: f64,
        created_at: Timestamp,
    ) -> Result<Self, GridError> {
        let class = class.parse::<PriorityClass>()?;
        Self::new(consumer_id, class, megawatts, created_at)
    }

    pub fn consumer_id(&self) -> &str {
        &self.consumer_id
    }

    pub fn class(&self) -> PriorityClass {
        self.class
    }

    pub fn megawatts(&self) -> f64 {
        self.megawatts
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: RequestState) {
        self.state = state;
    }
}
