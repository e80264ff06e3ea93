use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizationId(pub String);

impl fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

/// Tenant (clinic, pharmacy, employer) owning a stream of audit events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub organization_id: OrganizationId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AuditSeverity {
    pub const fn ordered() -> [Self; 4] {
        [Self::Low, Self::Medium, Self::High, Self::Critical]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }

    pub fn parse_label(raw: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|severity| severity.label().eq_ignore_ascii_case(raw.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Login,
    LoginFailed,
    Logout,
    Create,
    Update,
    Delete,
    View,
    Export,
    Sale,
    Dispense,
    StockAdjustment,
    #[serde(other)]
    Other,
}

impl AuditAction {
    const KNOWN: [Self; 11] = [
        Self::Login,
        Self::LoginFailed,
        Self::Logout,
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::View,
        Self::Export,
        Self::Sale,
        Self::Dispense,
        Self::StockAdjustment,
    ];

    /// Actions on the inventory module that count as stock changes.
    pub const INVENTORY_CHANGES: [Self; 4] =
        [Self::Create, Self::Update, Self::Delete, Self::StockAdjustment];

    pub const fn code(self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::LoginFailed => "LOGIN_FAILED",
            Self::Logout => "LOGOUT",
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::View => "VIEW",
            Self::Export => "EXPORT",
            Self::Sale => "SALE",
            Self::Dispense => "DISPENSE",
            Self::StockAdjustment => "STOCK_ADJUSTMENT",
            Self::Other => "OTHER",
        }
    }

    /// Unknown codes map to [`AuditAction::Other`].
    pub fn parse_code(raw: &str) -> Self {
        let raw = raw.trim();
        Self::KNOWN
            .into_iter()
            .find(|action| action.code().eq_ignore_ascii_case(raw))
            .unwrap_or(Self::Other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditModule {
    Auth,
    Sales,
    Pharmacy,
    Inventory,
    Occupational,
    Admin,
    #[serde(other)]
    Other,
}

impl AuditModule {
    const KNOWN: [Self; 6] = [
        Self::Auth,
        Self::Sales,
        Self::Pharmacy,
        Self::Inventory,
        Self::Occupational,
        Self::Admin,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Sales => "sales",
            Self::Pharmacy => "pharmacy",
            Self::Inventory => "inventory",
            Self::Occupational => "occupational",
            Self::Admin => "admin",
            Self::Other => "other",
        }
    }

    pub fn parse_code(raw: &str) -> Self {
        let raw = raw.trim();
        Self::KNOWN
            .into_iter()
            .find(|module| module.code().eq_ignore_ascii_case(raw))
            .unwrap_or(Self::Other)
    }
}

/// Single recorded system action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: EventId,
    pub organization_id: OrganizationId,
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    pub severity: AuditSeverity,
    pub module: AuditModule,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub ip_address: Option<IpAddr>,
    pub success: bool,
    #[serde(default)]
    pub description: String,
}

impl AuditEvent {
    pub fn occurred_on(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    pub fn is_login_success(&self) -> bool {
        self.action == AuditAction::Login && self.success
    }

    pub fn is_login_failure(&self) -> bool {
        self.action == AuditAction::LoginFailed
            || (self.action == AuditAction::Login && !self.success)
    }

    pub fn is_sale(&self) -> bool {
        self.module == AuditModule::Sales && self.action == AuditAction::Sale
    }

    pub fn is_dispensation(&self) -> bool {
        self.action == AuditAction::Dispense
    }

    pub fn is_inventory_change(&self) -> bool {
        self.module == AuditModule::Inventory
            && AuditAction::INVENTORY_CHANGES.contains(&self.action)
    }
}

/// Field-level change captured alongside an audit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEventDetail {
    pub detail_id: String,
    pub event_id: EventId,
    pub field: String,
    #[serde(default)]
    pub old_value: Option<String>,
    #[serde(default)]
    pub new_value: Option<String>,
}

/// Precomputed rollup of one day's events for one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditDailySummary {
    pub organization_id: OrganizationId,
    pub date: NaiveDate,
    pub total_events: usize,
    pub login_count: usize,
    pub failed_login_count: usize,
    pub sales_count: usize,
    pub dispense_count: usize,
    pub inventory_change_count: usize,
    pub critical_count: usize,
    pub high_severity_count: usize,
    pub failed_action_count: usize,
    pub active_users: usize,
    pub unique_ips: usize,
}

impl AuditDailySummary {
    pub fn empty(organization_id: OrganizationId, date: NaiveDate) -> Self {
        Self {
            organization_id,
            date,
            total_events: 0,
            login_count: 0,
            failed_login_count: 0,
            sales_count: 0,
            dispense_count: 0,
            inventory_change_count: 0,
            critical_count: 0,
            high_severity_count: 0,
            failed_action_count: 0,
            active_users: 0,
            unique_ips: 0,
        }
    }

    pub fn key(&self) -> (&OrganizationId, NaiveDate) {
        (&self.organization_id, self.date)
    }
}
