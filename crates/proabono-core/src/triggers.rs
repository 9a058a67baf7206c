//! Webhook trigger catalog
//!
//! Every event category ProAbono can notify a webhook about, as exchanged on
//! the wire in the `Triggers` / `TypeTrigger` fields. The connector treats
//! these as opaque tags; the family grouping only matters for presentation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trigger families as shown in the subscription form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerFamily {
    Customer,
    Subscription,
    Invoice,
    PaymentMethod,
}

/// Webhook trigger tags
///
/// Variant names are the exact wire tags, so serde's default unit-variant
/// representation round-trips them unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    // Customer events
    CustomerAdded,
    CustomerBillingAddressUpdated,
    CustomerPaymentMethodUpdated,
    CustomerBillingSucceeded,
    CustomerBillingFailed,
    CustomerChargingSucceeded,
    CustomerChargingPending,
    CustomerChargingFailed,
    CustomerChargingAutoFailedNoPermission,
    CustomerChargingAutoFailedNoRetry,
    CustomerSuspended,
    CustomerEnabled,
    CustomerIsGreyListed,

    // Subscription events
    SubscriptionStarted,
    SubscriptionRenewed,
    SubscriptionSuspendedAgent,
    SubscriptionRestarted,
    SubscriptionSuspendedPaymentInfoMissing,
    SubscriptionSuspendedPaymentDue,
    SubscriptionTerminatedAtRenewal,
    SubscriptionTerminated,
    SubscriptionHistory,
    SubscriptionDeleted,
    SubscriptionUpdated,
    SubscriptionFeaturesUpdated,
    SubscriptionUpgraded,
    SubscriptionTerminatedForUpgrade,
    SubscriptionDateTermUpdated,

    // Invoice and credit-note events
    InvoiceDebitIssuedPaymentAuto,
    InvoiceDebitIssuedPaymentOffline,
    InvoiceDebitPaid,
    InvoiceDebitRefunded,
    InvoiceDebitCancelled,
    InvoiceDebitPaymentAutoFailed,
    InvoiceDebitPaymentAutoRequestedAuto,
    InvoiceDebitOverdue,
    InvoiceDebitDisputed,
    InvoiceDebitUncollectible,
    InvoiceCreditIssued,

    // Payment method events
    GatewayPermissionSoonExpired,
    GatewayPermissionExpired,
    GatewayPermissionDefective,
    GatewayPermissionInsufficientFunds,
    GatewayPermissionPaymentIssues,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CustomerAdded => "CustomerAdded",
            Self::CustomerBillingAddressUpdated => "CustomerBillingAddressUpdated",
            Self::CustomerPaymentMethodUpdated => "CustomerPaymentMethodUpdated",
            Self::CustomerBillingSucceeded => "CustomerBillingSucceeded",
            Self::CustomerBillingFailed => "CustomerBillingFailed",
            Self::CustomerChargingSucceeded => "CustomerChargingSucceeded",
            Self::CustomerChargingPending => "CustomerChargingPending",
            Self::CustomerChargingFailed => "CustomerChargingFailed",
            Self::CustomerChargingAutoFailedNoPermission => "CustomerChargingAutoFailedNoPermission",
            Self::CustomerChargingAutoFailedNoRetry => "CustomerChargingAutoFailedNoRetry",
            Self::CustomerSuspended => "CustomerSuspended",
            Self::CustomerEnabled => "CustomerEnabled",
            Self::CustomerIsGreyListed => "CustomerIsGreyListed",
            Self::SubscriptionStarted => "SubscriptionStarted",
            Self::SubscriptionRenewed => "SubscriptionRenewed",
            Self::SubscriptionSuspendedAgent => "SubscriptionSuspendedAgent",
            Self::SubscriptionRestarted => "SubscriptionRestarted",
            Self::SubscriptionSuspendedPaymentInfoMissing => "SubscriptionSuspendedPaymentInfoMissing",
            Self::SubscriptionSuspendedPaymentDue => "SubscriptionSuspendedPaymentDue",
            Self::SubscriptionTerminatedAtRenewal => "SubscriptionTerminatedAtRenewal",
            Self::SubscriptionTerminated => "SubscriptionTerminated",
            Self::SubscriptionHistory => "SubscriptionHistory",
            Self::SubscriptionDeleted => "SubscriptionDeleted",
            Self::SubscriptionUpdated => "SubscriptionUpdated",
            Self::SubscriptionFeaturesUpdated => "SubscriptionFeaturesUpdated",
            Self::SubscriptionUpgraded => "SubscriptionUpgraded",
            Self::SubscriptionTerminatedForUpgrade => "SubscriptionTerminatedForUpgrade",
            Self::SubscriptionDateTermUpdated => "SubscriptionDateTermUpdated",
            Self::InvoiceDebitIssuedPaymentAuto => "InvoiceDebitIssuedPaymentAuto",
            Self::InvoiceDebitIssuedPaymentOffline => "InvoiceDebitIssuedPaymentOffline",
            Self::InvoiceDebitPaid => "InvoiceDebitPaid",
            Self::InvoiceDebitRefunded => "InvoiceDebitRefunded",
            Self::InvoiceDebitCancelled => "InvoiceDebitCancelled",
            Self::InvoiceDebitPaymentAutoFailed => "InvoiceDebitPaymentAutoFailed",
            Self::InvoiceDebitPaymentAutoRequestedAuto => "InvoiceDebitPaymentAutoRequestedAuto",
            Self::InvoiceDebitOverdue => "InvoiceDebitOverdue",
            Self::InvoiceDebitDisputed => "InvoiceDebitDisputed",
            Self::InvoiceDebitUncollectible => "InvoiceDebitUncollectible",
            Self::InvoiceCreditIssued => "InvoiceCreditIssued",
            Self::GatewayPermissionSoonExpired => "GatewayPermissionSoonExpired",
            Self::GatewayPermissionExpired => "GatewayPermissionExpired",
            Self::GatewayPermissionDefective => "GatewayPermissionDefective",
            Self::GatewayPermissionInsufficientFunds => "GatewayPermissionInsufficientFunds",
            Self::GatewayPermissionPaymentIssues => "GatewayPermissionPaymentIssues",
        }
    }

    /// Get the family this trigger belongs to
    pub fn family(&self) -> TriggerFamily {
        match self {
            Self::CustomerAdded
            | Self::CustomerBillingAddressUpdated
            | Self::CustomerPaymentMethodUpdated
            | Self::CustomerBillingSucceeded
            | Self::CustomerBillingFailed
            | Self::CustomerChargingSucceeded
            | Self::CustomerChargingPending
            | Self::CustomerChargingFailed
            | Self::CustomerChargingAutoFailedNoPermission
            | Self::CustomerChargingAutoFailedNoRetry
            | Self::CustomerSuspended
            | Self::CustomerEnabled
            | Self::CustomerIsGreyListed => TriggerFamily::Customer,
            Self::SubscriptionStarted
            | Self::SubscriptionRenewed
            | Self::SubscriptionSuspendedAgent
            | Self::SubscriptionRestarted
            | Self::SubscriptionSuspendedPaymentInfoMissing
            | Self::SubscriptionSuspendedPaymentDue
            | Self::SubscriptionTerminatedAtRenewal
            | Self::SubscriptionTerminated
            | Self::SubscriptionHistory
            | Self::SubscriptionDeleted
            | Self::SubscriptionUpdated
            | Self::SubscriptionFeaturesUpdated
            | Self::SubscriptionUpgraded
            | Self::SubscriptionTerminatedForUpgrade
            | Self::SubscriptionDateTermUpdated => TriggerFamily::Subscription,
            Self::InvoiceDebitIssuedPaymentAuto
            | Self::InvoiceDebitIssuedPaymentOffline
            | Self::InvoiceDebitPaid
            | Self::InvoiceDebitRefunded
            | Self::InvoiceDebitCancelled
            | Self::InvoiceDebitPaymentAutoFailed
            | Self::InvoiceDebitPaymentAutoRequestedAuto
            | Self::InvoiceDebitOverdue
            | Self::InvoiceDebitDisputed
            | Self::InvoiceDebitUncollectible
            | Self::InvoiceCreditIssued => TriggerFamily::Invoice,
            Self::GatewayPermissionSoonExpired
            | Self::GatewayPermissionExpired
            | Self::GatewayPermissionDefective
            | Self::GatewayPermissionInsufficientFunds
            | Self::GatewayPermissionPaymentIssues => TriggerFamily::PaymentMethod,
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown trigger tag error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown trigger tag: {0}")]
pub struct UnknownTrigger(pub String);

impl FromStr for Trigger {
    type Err = UnknownTrigger;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| UnknownTrigger(s.to_string()))
    }
}
