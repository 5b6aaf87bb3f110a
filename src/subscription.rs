//! Subscription plan catalogue for agency accounts.
//!
//! Prices are held in integer cents. Yearly billing is twelve months at a
//! 20% discount.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum BillingCycle {
    #[default]
    Monthly,
    Yearly,
}

/// SubscriptionPlan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SubscriptionPlan {
    pub id: String,
    pub name: String,
    pub monthly_price_cents: u64,
    pub property_limit: u32,
    pub features: Vec<String>,
    pub recommended: bool,
}

impl SubscriptionPlan {
    pub fn price_cents(&self, cycle: BillingCycle) -> u64 {
        match cycle {
            BillingCycle::Monthly => self.monthly_price_cents,
            BillingCycle::Yearly => self.monthly_price_cents * 12 * 4 / 5,
        }
    }

    /// e.g. `$9.99/month`, `$95.90/year`
    pub fn price_label(&self, cycle: BillingCycle) -> String {
        let cents = self.price_cents(cycle);
        let unit = match cycle {
            BillingCycle::Monthly => "month",
            BillingCycle::Yearly => "year",
        };
        format!("${}.{:02}/{}", cents / 100, cents % 100, unit)
    }

    pub fn quote(&self, cycle: BillingCycle) -> PlanQuote {
        PlanQuote {
            plan: self.clone(),
            billing_cycle: cycle,
            price_cents: self.price_cents(cycle),
            label: self.price_label(cycle),
        }
    }
}

/// PlanQuote
///
/// A plan priced for one billing cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PlanQuote {
    pub plan: SubscriptionPlan,
    pub billing_cycle: BillingCycle,
    pub price_cents: u64,
    pub label: String,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PlanQuery {
    #[serde(default)]
    pub billing_cycle: BillingCycle,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SubscribeRequest {
    pub plan_id: String,
    #[serde(default)]
    pub billing_cycle: BillingCycle,
}

/// SubscriptionCheckout
///
/// Result of choosing a plan: the priced quote and where the client goes to pay.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SubscriptionCheckout {
    pub quote: PlanQuote,
    pub checkout_path: String,
}

fn plan(
    id: &str,
    monthly_price_cents: u64,
    property_limit: u32,
    features: &[&str],
    recommended: bool,
) -> SubscriptionPlan {
    SubscriptionPlan {
        id: id.to_string(),
        name: id.to_string(),
        monthly_price_cents,
        property_limit,
        features: features.iter().map(|f| f.to_string()).collect(),
        recommended,
    }
}

pub fn plans() -> Vec<SubscriptionPlan> {
    vec![
        plan(
            "Basic",
            999,
            5,
            &[
                "5 property listings",
                "Standard visibility",
                "Basic analytics",
                "Email support",
                "Single agent account",
            ],
            false,
        ),
        plan(
            "Standard",
            2499,
            15,
            &[
                "15 property listings",
                "Enhanced visibility",
                "Advanced analytics",
                "Priority email support",
                "Up to 3 agent accounts",
                "Featured listings (2 per month)",
            ],
            true,
        ),
        plan(
            "Premium",
            4999,
            50,
            &[
                "50 property listings",
                "Maximum visibility",
                "Comprehensive analytics",
                "Priority phone & email support",
                "Unlimited agent accounts",
                "Featured listings (5 per month)",
                "Social media promotion",
                "Virtual tours integration",
            ],
            false,
        ),
    ]
}

pub fn find_plan(id: &str) -> Option<SubscriptionPlan> {
    plans().into_iter().find(|p| p.id == id)
}
