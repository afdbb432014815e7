//! Status lifecycles for orders, consolidations and payments
//!
//! Order:          pending → in_transit → at_customs → delivered
//!                              ↘ delayed ↙         (delayed resumes)
//! Consolidation:  pending → active → completed
//! Payment:        pending → processed | failed
//!
//! Status is stored as text; every write goes through `validate_transition`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Unknown {entity} status: {value}")]
    UnknownStatus { entity: &'static str, value: String },
    #[error("Cannot move {entity} from {from} to {to}")]
    IllegalTransition {
        entity: &'static str,
        from: String,
        to: String,
    },
}

/// A closed status set with a transition table
pub trait Lifecycle:
    Copy + Eq + 'static + std::fmt::Display + std::str::FromStr<Err = TransitionError>
{
    /// Entity name used in error messages
    const ENTITY: &'static str;

    /// Status every new record starts in
    fn initial() -> Self;

    /// Whether `self → next` is a legal single step
    fn can_transition_to(self, next: Self) -> bool;

    /// Human-readable label for the dashboard
    fn label(self) -> &'static str;

    fn is_terminal(self) -> bool {
        Self::all().iter().all(|next| !self.can_transition_to(*next))
    }

    fn all() -> &'static [Self];
}

/// Check a requested status change. Re-setting the current status is allowed.
pub fn validate_transition<S: Lifecycle>(from: S, to: S) -> Result<S, TransitionError> {
    if from == to || from.can_transition_to(to) {
        Ok(to)
    } else {
        Err(TransitionError::IllegalTransition {
            entity: S::ENTITY,
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

/// Parse the stored and requested statuses, then validate the move
pub fn transition_from_str<S: Lifecycle>(current: &str, requested: &str) -> Result<S, TransitionError> {
    let from: S = current.parse()?;
    let to: S = requested.parse()?;
    validate_transition(from, to)
}

fn unknown(entity: &'static str, value: &str) -> TransitionError {
    TransitionError::UnknownStatus {
        entity,
        value: value.to_string(),
    }
}

/// Order shipping status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InTransit,
    AtCustoms,
    Delivered,
    Delayed,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::InTransit => write!(f, "in_transit"),
            OrderStatus::AtCustoms => write!(f, "at_customs"),
            OrderStatus::Delivered => write!(f, "delivered"),
            OrderStatus::Delayed => write!(f, "delayed"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = TransitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "in_transit" => Ok(OrderStatus::InTransit),
            "at_customs" => Ok(OrderStatus::AtCustoms),
            "delivered" => Ok(OrderStatus::Delivered),
            "delayed" => Ok(OrderStatus::Delayed),
            _ => Err(unknown(Self::ENTITY, s)),
        }
    }
}

impl Lifecycle for OrderStatus {
    const ENTITY: &'static str = "order";

    fn initial() -> Self {
        OrderStatus::Pending
    }

    fn can_transition_to(self, next: Self) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, InTransit)
                | (InTransit, AtCustoms)
                | (AtCustoms, Delivered)
                | (InTransit, Delayed)
                | (AtCustoms, Delayed)
                | (Delayed, InTransit)
                | (Delayed, AtCustoms)
                | (Delayed, Delivered)
        )
    }

    fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::InTransit => "In Transit",
            OrderStatus::AtCustoms => "At Customs",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Delayed => "Delayed",
        }
    }

    fn all() -> &'static [Self] {
        &[
            OrderStatus::Pending,
            OrderStatus::InTransit,
            OrderStatus::AtCustoms,
            OrderStatus::Delivered,
            OrderStatus::Delayed,
        ]
    }
}

/// Consolidation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsolidationStatus {
    Pending,
    Active,
    Completed,
}

impl std::fmt::Display for ConsolidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsolidationStatus::Pending => write!(f, "pending"),
            ConsolidationStatus::Active => write!(f, "active"),
            ConsolidationStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for ConsolidationStatus {
    type Err = TransitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ConsolidationStatus::Pending),
            "active" => Ok(ConsolidationStatus::Active),
            "completed" => Ok(ConsolidationStatus::Completed),
            _ => Err(unknown(Self::ENTITY, s)),
        }
    }
}

impl Lifecycle for ConsolidationStatus {
    const ENTITY: &'static str = "consolidation";

    fn initial() -> Self {
        ConsolidationStatus::Pending
    }

    fn can_transition_to(self, next: Self) -> bool {
        use ConsolidationStatus::*;
        matches!((self, next), (Pending, Active) | (Active, Completed))
    }

    fn label(self) -> &'static str {
        match self {
            ConsolidationStatus::Pending => "Pending",
            ConsolidationStatus::Active => "Active",
            ConsolidationStatus::Completed => "Completed",
        }
    }

    fn all() -> &'static [Self] {
        &[
            ConsolidationStatus::Pending,
            ConsolidationStatus::Active,
            ConsolidationStatus::Completed,
        ]
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Processed,
    Failed,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Processed => write!(f, "processed"),
            PaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = TransitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "processed" => Ok(PaymentStatus::Processed),
            "failed" => Ok(PaymentStatus::Failed),
            _ => Err(unknown(Self::ENTITY, s)),
        }
    }
}

impl Lifecycle for PaymentStatus {
    const ENTITY: &'static str = "payment";

    fn initial() -> Self {
        PaymentStatus::Pending
    }

    fn can_transition_to(self, next: Self) -> bool {
        use PaymentStatus::*;
        matches!((self, next), (Pending, Processed) | (Pending, Failed))
    }

    fn label(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Processed => "Processed",
            PaymentStatus::Failed => "Failed",
        }
    }

    fn all() -> &'static [Self] {
        &[PaymentStatus::Pending, PaymentStatus::Processed, PaymentStatus::Failed]
    }
}
